pub mod repo;

pub use repo::{GitLogSource, GitRepo};
