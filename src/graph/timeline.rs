//! Timeline ordering: rank commits by recency and build the reveal list.

use super::types::{ColumnAssignment, CommitSet, GraphNode, NodeShape, Vec3};
use std::collections::HashMap;

/// Sort the assembled commits newest-first and assign each a dense timeline
/// index. The sort is stable, so ties keep their collection order. The
/// returned order doubles as the playback reveal order; geometry is filled
/// in by the layout projector.
pub fn order_timeline(
    set: &CommitSet,
    assignments: &HashMap<String, ColumnAssignment>,
) -> Vec<GraphNode> {
    let mut order: Vec<usize> = (0..set.records.len()).collect();
    order.sort_by(|&a, &b| {
        set.records[b]
            .commit
            .author
            .date
            .cmp(&set.records[a].commit.author.date)
    });

    order
        .into_iter()
        .enumerate()
        .map(|(timeline_index, i)| {
            let record = set.records[i].clone();
            let assignment = assignments.get(&record.sha);
            let shape = if record.is_merge() {
                NodeShape::Merge
            } else {
                NodeShape::Regular
            };
            GraphNode {
                column: assignment.map(|a| a.column).unwrap_or(0),
                branch_name: assignment.and_then(|a| a.branch_name.clone()),
                is_main_branch: assignment.map(|a| a.is_main).unwrap_or(false),
                timeline_index,
                position: Vec3::ZERO,
                height: 0.0,
                color_weight: 0.0,
                shape,
                record,
            }
        })
        .collect()
}
