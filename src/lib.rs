//! Git contribution analysis.
//!
//! Commit logs are parsed into [`model::CommitRecord`]s, attributed to
//! canonical authors by [`resolve::AuthorResolver`], filtered to a
//! [`model::DateWindow`], and folded into author, repository, daily and
//! per-commit tables by [`aggregate::Aggregator`]. [`pipeline::run`] drives
//! the whole thing over every configured repository.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod filter;
pub mod git;
pub mod logging;
pub mod model;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod tables;
pub mod timeline;
pub mod util;
