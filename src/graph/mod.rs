//! Commit graph pipeline: assembly, lane assignment, timeline ordering and
//! spatial projection.

pub mod assemble;
pub mod columns;
pub mod layout;
pub mod timeline;
pub mod types;

pub use assemble::assemble;
pub use columns::assign_columns;
pub use layout::{project, LayoutConfig};
pub use timeline::order_timeline;
pub use types::{
    BranchCommits, BranchRef, CommitEdge, CommitRecord, GraphNode, NodeShape, RaceGraph, Vec3,
};

/// Run the whole static pipeline over fetched branch data: assemble,
/// assign columns, order by recency, project into space.
pub fn build_race(branch_data: &[BranchCommits], config: &LayoutConfig) -> RaceGraph {
    let branches: Vec<BranchRef> = branch_data.iter().map(|b| b.branch.clone()).collect();
    let set = assemble(branch_data);
    let assignments = assign_columns(&set, &branches);
    let ordered = order_timeline(&set, &assignments);
    project(ordered, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::types::{CommitAuthor, CommitMeta, ParentRef};

    fn commit(sha: &str, parents: &[&str], date: &str) -> CommitRecord {
        CommitRecord {
            sha: sha.into(),
            parents: parents.iter().map(|p| ParentRef { sha: (*p).into() }).collect(),
            author: None,
            commit: CommitMeta {
                author: CommitAuthor {
                    name: "dev".into(),
                    date: date.parse().unwrap(),
                },
                message: String::new(),
            },
            stats: None,
            url: String::new(),
            html_url: String::new(),
        }
    }

    /// The full pipeline over the shared-history shape: main A -> C,
    /// feat B -> C, with B the newest commit.
    #[test]
    fn pipeline_end_to_end() {
        let data = vec![
            BranchCommits {
                branch: BranchRef {
                    name: "main".into(),
                    head_sha: "A".into(),
                },
                commits: vec![
                    commit("A", &["C"], "2024-05-02T10:00:00Z"),
                    commit("C", &[], "2024-05-01T10:00:00Z"),
                ],
            },
            BranchCommits {
                branch: BranchRef {
                    name: "feat".into(),
                    head_sha: "B".into(),
                },
                commits: vec![
                    commit("B", &["C"], "2024-05-03T10:00:00Z"),
                    commit("C", &[], "2024-05-01T10:00:00Z"),
                ],
            },
        ];

        let config = LayoutConfig::default();
        let graph = build_race(&data, &config);

        // Deduplicated, newest first.
        assert_eq!(graph.len(), 3);
        let reveal: Vec<&str> = graph.nodes.iter().map(|n| n.sha()).collect();
        assert_eq!(reveal, vec!["B", "A", "C"]);

        // feat walked before main: B and C sit on feat's lane, A on trunk.
        let a = graph.get_node("A").unwrap();
        let b = graph.get_node("B").unwrap();
        let c = graph.get_node("C").unwrap();
        assert_eq!(a.column, 0);
        assert_eq!(b.column, 1);
        assert_eq!(c.column, 1);
        assert!(a.is_main_branch);
        assert!(!b.is_main_branch);
        assert!(c.is_main_branch, "shared history is tinted as trunk");

        // Geometry follows lane and rank.
        assert_eq!(b.position.x, config.lane_width);
        assert_eq!(c.position.z, -2.0 * config.timeline_gap);

        // Two resolvable child->parent edges (A->C, B->C).
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.to_sha == "C" && !e.is_merge_edge));
    }

    #[test]
    fn empty_input_builds_an_empty_graph() {
        let graph = build_race(&[], &LayoutConfig::default());
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.labels.is_empty());
    }
}
