//! Lane assignment: walk each branch's first-parent chain and claim columns.
//!
//! Non-trunk branches walk first and claim greedily in branch-list order;
//! the trunk walks last, never steals a column, but marks every commit it
//! reaches as main history. Commits no walk reaches fall back to lane 0.

use super::types::{BranchRef, ColumnAssignment, CommitSet};
use std::collections::{HashMap, HashSet};

/// Pick the trunk branch: the first ref named `main` or `master`, falling
/// back to the first ref in the list. `None` when the list is empty.
pub fn trunk_branch(branches: &[BranchRef]) -> Option<&BranchRef> {
    branches
        .iter()
        .find(|b| b.name == "main" || b.name == "master")
        .or_else(|| branches.first())
}

/// Lane numbers per branch: trunk at 0, the rest fanned symmetrically
/// around it (+1, -1, +2, -2, ...) in branch-list order.
fn branch_lanes(branches: &[BranchRef], trunk: &str) -> HashMap<String, i32> {
    let mut lanes = HashMap::new();
    lanes.insert(trunk.to_string(), 0);

    let mut magnitude = 1;
    let mut sign = 1;
    for branch in branches {
        if branch.name == trunk || lanes.contains_key(&branch.name) {
            continue;
        }
        lanes.insert(branch.name.clone(), sign * magnitude);
        if sign < 0 {
            magnitude += 1;
        }
        sign = -sign;
    }
    lanes
}

/// Walk every branch and produce the per-sha lane assignment map.
///
/// Each walk follows first parents only, linearizing the branch to its
/// primary ancestry line, and stops at the history horizon (a parent
/// outside the fetched set). Column and branch name are first-writer-wins;
/// the trunk's `is_main` mark applies to every commit its walk visits,
/// claimed or not, so shared history keeps a feature lane while still
/// reading as trunk history.
pub fn assign_columns(
    set: &CommitSet,
    branches: &[BranchRef],
) -> HashMap<String, ColumnAssignment> {
    let mut assignments: HashMap<String, ColumnAssignment> = HashMap::new();

    let Some(trunk) = trunk_branch(branches) else {
        // No branches at all: everything sits unclaimed on lane 0.
        for record in &set.records {
            assignments.insert(
                record.sha.clone(),
                ColumnAssignment {
                    column: 0,
                    branch_name: None,
                    is_main: false,
                },
            );
        }
        return assignments;
    };
    let trunk_name = trunk.name.clone();

    let lanes = branch_lanes(branches, &trunk_name);
    let walk_order = branches
        .iter()
        .filter(|b| b.name != trunk_name)
        .chain(branches.iter().filter(|b| b.name == trunk_name));

    for branch in walk_order {
        let is_trunk = branch.name == trunk_name;
        let lane = lanes.get(&branch.name).copied().unwrap_or(0);

        // Guard against parent cycles in malformed data.
        let mut visited: HashSet<&str> = HashSet::new();
        let mut cursor = branch.head_sha.as_str();

        loop {
            let Some(record) = set.get(cursor) else {
                break; // history horizon, not an error
            };
            if !visited.insert(&record.sha) {
                break;
            }

            let entry = assignments
                .entry(record.sha.clone())
                .or_insert_with(|| ColumnAssignment {
                    column: lane,
                    branch_name: Some(branch.name.clone()),
                    is_main: false,
                });
            if is_trunk {
                // The main flag is not sticky the way the column is: it
                // overlays onto commits already claimed by a feature walk.
                entry.is_main = true;
            }

            match record.parents.first() {
                Some(parent) => cursor = &parent.sha,
                None => break,
            }
        }
    }

    // Orphans within the fetched window default to the trunk lane.
    for record in &set.records {
        assignments
            .entry(record.sha.clone())
            .or_insert_with(|| ColumnAssignment {
                column: 0,
                branch_name: None,
                is_main: true,
            });
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble::assemble;
    use crate::graph::types::{
        BranchCommits, CommitAuthor, CommitMeta, CommitRecord, ParentRef,
    };

    fn commit(sha: &str, parents: &[&str]) -> CommitRecord {
        CommitRecord {
            sha: sha.into(),
            parents: parents.iter().map(|p| ParentRef { sha: (*p).into() }).collect(),
            author: None,
            commit: CommitMeta {
                author: CommitAuthor {
                    name: "dev".into(),
                    date: "2024-05-01T12:00:00Z".parse().unwrap(),
                },
                message: format!("commit {sha}"),
            },
            stats: None,
            url: String::new(),
            html_url: String::new(),
        }
    }

    fn branch_ref(name: &str, head: &str) -> BranchRef {
        BranchRef {
            name: name.into(),
            head_sha: head.into(),
        }
    }

    fn branch(name: &str, head: &str, commits: Vec<CommitRecord>) -> BranchCommits {
        BranchCommits {
            branch: branch_ref(name, head),
            commits,
        }
    }

    /// main: A -> C, feat: B -> C. The feat walk runs first and claims B and
    /// C; main claims A and overlays its mark on C.
    fn shared_history() -> (CommitSet, Vec<BranchRef>) {
        let data = vec![
            branch("main", "A", vec![commit("A", &["C"]), commit("C", &[])]),
            branch("feat", "B", vec![commit("B", &["C"]), commit("C", &[])]),
        ];
        let branches = vec![branch_ref("main", "A"), branch_ref("feat", "B")];
        (assemble(&data), branches)
    }

    #[test]
    fn shared_history_example() {
        let (set, branches) = shared_history();
        assert_eq!(set.len(), 3);

        let assignments = assign_columns(&set, &branches);

        let a = &assignments["A"];
        assert_eq!(a.column, 0);
        assert_eq!(a.branch_name.as_deref(), Some("main"));
        assert!(a.is_main);

        let b = &assignments["B"];
        assert_eq!(b.column, 1);
        assert_eq!(b.branch_name.as_deref(), Some("feat"));
        assert!(!b.is_main);

        // C was claimed by feat but is also trunk history.
        let c = &assignments["C"];
        assert_eq!(c.column, 1);
        assert_eq!(c.branch_name.as_deref(), Some("feat"));
        assert!(c.is_main);
    }

    #[test]
    fn trunk_walk_marks_main_without_stealing_column() {
        let (set, branches) = shared_history();
        let assignments = assign_columns(&set, &branches);
        // Column sticky, main flag not sticky.
        assert_eq!(assignments["C"].column, assignments["B"].column);
        assert!(assignments["C"].is_main);
        assert!(!assignments["B"].is_main);
    }

    #[test]
    fn reordering_input_with_trunk_fixed_keeps_assignments() {
        let (set, branches) = shared_history();
        let forward = assign_columns(&set, &branches);

        let reversed: Vec<BranchRef> = branches.iter().rev().cloned().collect();
        let backward = assign_columns(&set, &reversed);

        // main is still detected as trunk by name, so feat still walks
        // first and every claim lands identically.
        for sha in ["A", "B", "C"] {
            assert_eq!(forward[sha].column, backward[sha].column, "column of {sha}");
            assert_eq!(forward[sha].is_main, backward[sha].is_main, "main flag of {sha}");
            assert_eq!(forward[sha].branch_name, backward[sha].branch_name);
        }
    }

    #[test]
    fn lanes_fan_symmetrically_around_trunk() {
        let branches = vec![
            branch_ref("main", "m"),
            branch_ref("one", "1"),
            branch_ref("two", "2"),
            branch_ref("three", "3"),
            branch_ref("four", "4"),
        ];
        let lanes = branch_lanes(&branches, "main");
        assert_eq!(lanes["main"], 0);
        assert_eq!(lanes["one"], 1);
        assert_eq!(lanes["two"], -1);
        assert_eq!(lanes["three"], 2);
        assert_eq!(lanes["four"], -2);
    }

    #[test]
    fn first_branch_is_trunk_when_no_main_or_master() {
        let branches = vec![branch_ref("develop", "d"), branch_ref("feat", "f")];
        assert_eq!(trunk_branch(&branches).unwrap().name, "develop");
    }

    #[test]
    fn orphan_commit_defaults_to_trunk_lane() {
        // Z is in the fetched window but unreachable from any head.
        let data = vec![branch(
            "main",
            "A",
            vec![commit("A", &[]), commit("Z", &["gone"])],
        )];
        let set = assemble(&data);
        let branches = vec![branch_ref("main", "A")];

        let assignments = assign_columns(&set, &branches);
        let z = &assignments["Z"];
        assert_eq!(z.column, 0);
        assert!(z.branch_name.is_none());
        assert!(z.is_main);
    }

    #[test]
    fn walk_stops_at_history_horizon() {
        // B's parent was never fetched; the walk ends there quietly.
        let data = vec![branch(
            "main",
            "A",
            vec![commit("A", &["B"]), commit("B", &["outside"])],
        )];
        let set = assemble(&data);
        let assignments = assign_columns(&set, &[branch_ref("main", "A")]);
        assert!(assignments["A"].is_main);
        assert!(assignments["B"].is_main);
        assert!(!assignments.contains_key("outside"));
    }

    #[test]
    fn parent_cycle_terminates() {
        let data = vec![branch(
            "main",
            "A",
            vec![commit("A", &["B"]), commit("B", &["A"])],
        )];
        let set = assemble(&data);
        let assignments = assign_columns(&set, &[branch_ref("main", "A")]);
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn empty_branch_list_assigns_lane_zero_without_main() {
        let data = vec![branch("ignored", "A", vec![commit("A", &[])])];
        let set = assemble(&data);
        let assignments = assign_columns(&set, &[]);
        let a = &assignments["A"];
        assert_eq!(a.column, 0);
        assert!(!a.is_main);
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let assignments = assign_columns(&CommitSet::default(), &[]);
        assert!(assignments.is_empty());
    }

    #[test]
    fn first_parent_only_ignores_merged_in_branches() {
        // M is a merge of A (first parent) and X (second). The walk from M
        // must continue through A and never visit X.
        let data = vec![branch(
            "main",
            "M",
            vec![commit("M", &["A", "X"]), commit("A", &[]), commit("X", &[])],
        )];
        let set = assemble(&data);
        let assignments = assign_columns(&set, &[branch_ref("main", "M")]);
        assert_eq!(assignments["A"].branch_name.as_deref(), Some("main"));
        // X only gets the lane-0 fallback, no branch claim.
        assert!(assignments["X"].branch_name.is_none());
    }
}
