//! Graph assembly: merge per-branch commit lists into one deduplicated set.

use super::types::{BranchCommits, CommitSet};

/// Union all branch commit lists into a single set keyed by sha.
///
/// Merge bases show up in several branch histories, so duplicates are
/// expected; the first record seen for a sha wins. Iteration follows the
/// branch list order, never fetch completion order, so network timing can't
/// change the assembled graph.
pub fn assemble(branch_data: &[BranchCommits]) -> CommitSet {
    let mut set = CommitSet::default();

    for branch in branch_data {
        for record in &branch.commits {
            if !set.index.contains_key(&record.sha) {
                set.index.insert(record.sha.clone(), set.records.len());
                set.records.push(record.clone());
            }
        }
    }

    tracing::debug!(
        branches = branch_data.len(),
        commits = set.len(),
        "assembled commit set"
    );
    set
}
