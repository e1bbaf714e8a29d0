//! Camera following and screen projection.
//!
//! While playback is revealing, the camera chases the frontier node: it
//! looks at the node's floor position and sits a fixed offset above and
//! behind it, snapping on the first frame and exponentially smoothing on
//! every later one. When playback is idle the tracker never touches the
//! camera, so manual pan/dolly input persists.

use crate::graph::layout::LayoutConfig;
use crate::graph::types::Vec3;
use egui::{Pos2, Rect};

/// Vertical field of view of the scene painter.
const FOV_Y_DEGREES: f32 = 45.0;
const NEAR_PLANE: f32 = 0.1;
const MIN_DOLLY_DISTANCE: f32 = 5.0;
const MAX_DOLLY_DISTANCE: f32 = 400.0;

const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Live camera: where it is, what it looks at, and whether the tracker has
/// snapped to its first target yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub snapped: bool,
}

impl CameraState {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 20.0, 50.0),
            target: Vec3::ZERO,
            snapped: false,
        }
    }

    /// Forget the follow state so the next tracked frame snaps instead of
    /// sweeping over from wherever the camera was left.
    pub fn reset_follow(&mut self) {
        self.snapped = false;
    }

    /// Orthonormal view basis: right, up, forward.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.position).normalized();
        let mut right = forward.cross(WORLD_UP).normalized();
        if right == Vec3::ZERO {
            // Looking straight up or down; any horizontal right works.
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = right.cross(forward);
        (right, up, forward)
    }

    /// Manual control: slide position and target together in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (right, up, _) = self.basis();
        let shift = right * dx + up * dy;
        self.position += shift;
        self.target += shift;
    }

    /// Manual control: move along the view direction, keeping the target
    /// between the near and far distance bounds.
    pub fn dolly(&mut self, amount: f32) {
        let (_, _, forward) = self.basis();
        let distance = (self.target - self.position).length();
        let new_distance = (distance - amount).clamp(MIN_DOLLY_DISTANCE, MAX_DOLLY_DISTANCE);
        self.position = self.target - forward * new_distance;
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new()
    }
}

/// One follow step. Pure: current state plus the frontier node's position
/// in, next state out. The look-at point sits at the baseline level under
/// the frontier, ignoring the node's height.
pub fn advance_camera(state: &CameraState, frontier: Vec3, config: &LayoutConfig) -> CameraState {
    let target = Vec3::new(frontier.x, config.baseline_offset, frontier.z);
    let ideal_position = target + config.camera_offset;

    if !state.snapped {
        // First tracked frame: hard cut, no sweep from the stale position.
        return CameraState {
            position: ideal_position,
            target,
            snapped: true,
        };
    }

    CameraState {
        position: state.position.lerp(ideal_position, config.damping),
        target: state.target.lerp(target, config.damping),
        snapped: true,
    }
}

/// A world point mapped into the viewport.
#[derive(Debug, Clone, Copy)]
pub struct Projected {
    pub screen: Pos2,
    /// Pixels per world unit at this point's depth.
    pub scale: f32,
}

/// Perspective-project a world point through the camera into `rect`.
/// Returns `None` for points at or behind the near plane.
pub fn world_to_screen(point: Vec3, camera: &CameraState, rect: Rect) -> Option<Projected> {
    let (right, up, forward) = camera.basis();
    let rel = point - camera.position;

    let depth = rel.dot(forward);
    if depth <= NEAR_PLANE {
        return None;
    }

    let focal = (rect.height() / 2.0) / (FOV_Y_DEGREES.to_radians() / 2.0).tan();
    let scale = focal / depth;
    let center = rect.center();
    Some(Projected {
        screen: Pos2::new(
            center.x + rel.dot(right) * scale,
            center.y - rel.dot(up) * scale,
        ),
        scale,
    })
}
