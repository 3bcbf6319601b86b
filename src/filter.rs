use crate::model::{CommitRecord, DateWindow};
use crate::resolve::AuthorResolver;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub excluded_author: usize,
    pub outside_window: usize,
}

/// Drops commits by excluded identities and commits dated outside the window.
/// Survivors keep their input order.
pub fn filter(
    commits: Vec<CommitRecord>,
    window: &DateWindow,
    resolver: &AuthorResolver,
) -> (Vec<CommitRecord>, FilterStats) {
    let mut stats = FilterStats::default();
    let kept: Vec<CommitRecord> = commits
        .into_iter()
        .filter(|c| {
            if resolver.is_excluded(&c.raw_identity) {
                stats.excluded_author += 1;
                false
            } else if !window.contains(c.date()) {
                stats.outside_window += 1;
                false
            } else {
                true
            }
        })
        .collect();
    stats.kept = kept.len();
    (kept, stats)
}
