//! Graph data types matching the GitHub API response, plus the derived
//! node/edge model produced by the layout pipeline.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A branch head as seen by the fetch layer. Only branches whose commit
/// list actually arrived are represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub head_sha: String,
}

/// Parent pointer on a commit. May reference a commit outside the fetched
/// window; such references are simply not drawn.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ParentRef {
    pub sha: String,
}

/// GitHub user attached to a commit (absent for unmapped authors).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorInfo {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

/// The `commit` sub-object: authorship metadata and message.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitMeta {
    pub author: CommitAuthor,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Change statistics, only present on commit detail responses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChangeStats {
    pub additions: u32,
    pub deletions: u32,
    pub total: u32,
}

/// A single commit as returned by the GitHub API. Immutable once fetched;
/// everything derived lives on `GraphNode`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(default)]
    pub author: Option<AuthorInfo>,
    pub commit: CommitMeta,
    #[serde(default)]
    pub stats: Option<ChangeStats>,
    pub url: String,
    pub html_url: String,
}

impl CommitRecord {
    /// Total changed lines, defaulting to 1 so no node degenerates to zero
    /// height when stats are missing.
    pub fn change_total(&self) -> f32 {
        self.stats.map(|s| s.total as f32).unwrap_or(1.0)
    }

    /// Display name: GitHub login when mapped, otherwise the git author name.
    pub fn author_label(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.login.as_deref())
            .unwrap_or(&self.commit.author.name)
    }

    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(7)]
    }

    /// A commit with more than one parent is a merge.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// The commits fetched for one branch, in head-first API order.
#[derive(Debug, Clone)]
pub struct BranchCommits {
    pub branch: BranchRef,
    pub commits: Vec<CommitRecord>,
}

/// Deduplicated commit set produced by graph assembly. Records keep their
/// first-seen order (branch order, then list order within a branch).
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    pub records: Vec<CommitRecord>,
    pub index: HashMap<String, usize>,
}

impl CommitSet {
    pub fn get(&self, sha: &str) -> Option<&CommitRecord> {
        self.index.get(sha).map(|&i| &self.records[i])
    }

    pub fn contains(&self, sha: &str) -> bool {
        self.index.contains_key(sha)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lane assignment for one commit, tracked separately from the records so
/// the walk order is the only thing that decides claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignment {
    pub column: i32,
    pub branch_name: Option<String>,
    pub is_main: bool,
}

/// Visual category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Regular,
    Merge,
}

/// A commit with every derived field filled in: lane, recency rank, spatial
/// position and visual weight.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub record: CommitRecord,
    pub column: i32,
    pub branch_name: Option<String>,
    pub is_main_branch: bool,
    /// Dense rank by recency; 0 = newest.
    pub timeline_index: usize,
    pub position: Vec3,
    pub height: f32,
    /// Relative change magnitude in [0, 1], sqrt-compressed.
    pub color_weight: f32,
    pub shape: NodeShape,
}

impl GraphNode {
    pub fn sha(&self) -> &str {
        &self.record.sha
    }
}

/// Child -> parent edge between two fetched commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEdge {
    pub from_sha: String,
    pub to_sha: String,
    pub is_merge_edge: bool,
}

/// Floating label anchoring a branch name in the scene.
#[derive(Debug, Clone)]
pub struct BranchLabel {
    pub name: String,
    /// The branch's newest claimed commit; the label appears when it does.
    pub sha: String,
    pub anchor: Vec3,
}

/// The fully laid-out graph. `nodes` is in timeline order, which is also
/// the reveal order for playback.
#[derive(Debug, Clone, Default)]
pub struct RaceGraph {
    pub nodes: Vec<GraphNode>,
    pub index: HashMap<String, usize>,
    pub edges: Vec<CommitEdge>,
    pub labels: Vec<BranchLabel>,
    /// Largest change total across all nodes, for color normalization.
    pub max_change: f32,
}

impl RaceGraph {
    /// Selected-commit hand-off: resolve a sha to its enriched node.
    pub fn get_node(&self, sha: &str) -> Option<&GraphNode> {
        self.index.get(sha).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Minimal 3D vector for layout and camera math.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Unit vector, or zero when the input has no length.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            Vec3::ZERO
        }
    }

    /// Linear interpolation toward `other` by fraction `t`.
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}
