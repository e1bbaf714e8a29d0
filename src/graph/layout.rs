//! Spatial projection: map (column, timeline index, change magnitude) to a
//! 3D position and visual weight, and emit drawable edges.
//!
//! The graph grows along the negative Z axis as commits get older, which is
//! what makes the reveal read as forward motion.

use super::types::{BranchLabel, CommitEdge, GraphNode, RaceGraph, Vec3};
use std::collections::{HashMap, HashSet};

/// Geometry and camera-follow tuning, threaded explicitly through the
/// pipeline instead of living as module globals.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent lanes.
    pub lane_width: f32,
    /// Depth distance between consecutive timeline steps.
    pub timeline_gap: f32,
    /// Changed-lines-to-world-height scale.
    pub height_scale: f32,
    /// Vertical level of the floor the shapes sit on.
    pub baseline_offset: f32,
    /// Constant offset from the look-at point to the ideal camera position,
    /// above and behind the motion direction.
    pub camera_offset: Vec3,
    /// Per-frame interpolation fraction for camera following.
    pub damping: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_width: 5.0,
            timeline_gap: 5.0,
            height_scale: 0.05,
            baseline_offset: -4.0,
            camera_offset: Vec3::new(0.0, 20.0, 40.0),
            damping: 0.05,
        }
    }
}

/// Fill in position, height and color weight for every ordered node, then
/// resolve child->parent edges and branch label anchors.
pub fn project(mut nodes: Vec<GraphNode>, config: &LayoutConfig) -> RaceGraph {
    // Never below 1.0 so the ratio stays defined on an all-default graph.
    let max_change = nodes
        .iter()
        .map(|n| n.record.change_total())
        .fold(1.0_f32, f32::max);

    for node in &mut nodes {
        let magnitude = node.record.change_total();
        node.height = magnitude * config.height_scale;
        node.position = Vec3::new(
            node.column as f32 * config.lane_width,
            // Centered half a height up, so shapes share a floor instead of
            // being centered through it.
            config.baseline_offset + node.height / 2.0,
            -(node.timeline_index as f32) * config.timeline_gap,
        );
        // Square root compresses the range so a few huge commits don't wash
        // every other node out to one extreme.
        node.color_weight = (magnitude / max_change).sqrt();
    }

    let index: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.record.sha.clone(), i))
        .collect();

    // Edges only for parents inside the fetched window; a dangling parent
    // is a pagination horizon, not an error.
    let mut edges = Vec::new();
    for node in &nodes {
        let is_merge = node.record.is_merge();
        for parent in &node.record.parents {
            if index.contains_key(&parent.sha) {
                edges.push(CommitEdge {
                    from_sha: node.record.sha.clone(),
                    to_sha: parent.sha.clone(),
                    is_merge_edge: is_merge,
                });
            }
        }
    }

    let labels = branch_labels(&nodes, config);

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        max_change,
        "projected race layout"
    );

    RaceGraph {
        nodes,
        index,
        edges,
        labels,
        max_change,
    }
}

/// One label per branch, floating above that branch's newest claimed node
/// and one timeline step toward the viewer.
fn branch_labels(nodes: &[GraphNode], config: &LayoutConfig) -> Vec<BranchLabel> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut labels = Vec::new();
    let label_height = -config.baseline_offset + 2.0;

    for node in nodes {
        let Some(name) = node.branch_name.as_deref() else {
            continue;
        };
        if seen.insert(name) {
            labels.push(BranchLabel {
                name: name.to_string(),
                sha: node.record.sha.clone(),
                anchor: Vec3::new(
                    node.position.x,
                    label_height,
                    node.position.z + config.timeline_gap,
                ),
            });
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{
        ChangeStats, CommitAuthor, CommitMeta, CommitRecord, NodeShape, ParentRef,
    };

    fn node(sha: &str, parents: &[&str], column: i32, index: usize, total: Option<u32>) -> GraphNode {
        let record = CommitRecord {
            sha: sha.into(),
            parents: parents.iter().map(|p| ParentRef { sha: (*p).into() }).collect(),
            author: None,
            commit: CommitMeta {
                author: CommitAuthor {
                    name: "dev".into(),
                    date: "2024-05-01T12:00:00Z".parse().unwrap(),
                },
                message: String::new(),
            },
            stats: total.map(|t| ChangeStats {
                additions: t,
                deletions: 0,
                total: t,
            }),
            url: String::new(),
            html_url: String::new(),
        };
        let shape = if record.is_merge() {
            NodeShape::Merge
        } else {
            NodeShape::Regular
        };
        GraphNode {
            record,
            column,
            branch_name: Some("main".into()),
            is_main_branch: column == 0,
            timeline_index: index,
            position: Vec3::ZERO,
            height: 0.0,
            color_weight: 0.0,
            shape,
        }
    }

    #[test]
    fn position_follows_column_and_timeline_index() {
        let config = LayoutConfig::default();
        let graph = project(vec![node("A", &[], 2, 3, Some(100))], &config);

        let a = graph.get_node("A").unwrap();
        assert_eq!(a.position.x, 2.0 * config.lane_width);
        assert_eq!(a.position.z, -3.0 * config.timeline_gap);
        assert_eq!(a.height, 100.0 * config.height_scale);
        // Shapes sit on a common floor.
        assert!((a.position.y - a.height / 2.0 - config.baseline_offset).abs() < 1e-6);
    }

    #[test]
    fn missing_stats_defaults_to_unit_magnitude() {
        let config = LayoutConfig::default();
        let graph = project(vec![node("A", &[], 0, 0, None)], &config);
        let a = graph.get_node("A").unwrap();
        assert_eq!(a.height, config.height_scale);
        assert!(a.height > 0.0, "no degenerate zero-height nodes");
    }

    #[test]
    fn color_weight_is_sqrt_of_relative_magnitude() {
        let graph = project(
            vec![
                node("big", &[], 0, 0, Some(400)),
                node("small", &[], 0, 1, Some(100)),
            ],
            &LayoutConfig::default(),
        );
        assert_eq!(graph.max_change, 400.0);
        assert!((graph.get_node("big").unwrap().color_weight - 1.0).abs() < 1e-6);
        assert!((graph.get_node("small").unwrap().color_weight - 0.5).abs() < 1e-6);
    }

    #[test]
    fn edges_skip_unresolved_parents() {
        let graph = project(
            vec![
                node("A", &["B", "outside"], 0, 0, None),
                node("B", &[], 0, 1, None),
            ],
            &LayoutConfig::default(),
        );
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from_sha, "A");
        assert_eq!(graph.edges[0].to_sha, "B");
    }

    #[test]
    fn merge_nodes_get_merge_shape_and_edges() {
        let graph = project(
            vec![
                node("M", &["A", "B"], 0, 0, None),
                node("A", &[], 0, 1, None),
                node("B", &[], 1, 2, None),
            ],
            &LayoutConfig::default(),
        );
        let m = graph.get_node("M").unwrap();
        assert_eq!(m.shape, NodeShape::Merge);
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.is_merge_edge));
    }

    #[test]
    fn one_label_per_branch_at_newest_node() {
        let mut newer = node("A", &[], 1, 0, None);
        newer.branch_name = Some("feat".into());
        let mut older = node("B", &[], 1, 1, None);
        older.branch_name = Some("feat".into());

        let config = LayoutConfig::default();
        let graph = project(vec![newer, older], &config);

        assert_eq!(graph.labels.len(), 1);
        let label = &graph.labels[0];
        assert_eq!(label.name, "feat");
        assert_eq!(label.sha, "A");
        // Anchored off the newest (timeline index 0) node.
        assert_eq!(label.anchor.x, config.lane_width);
        assert_eq!(label.anchor.z, config.timeline_gap);
    }
}
