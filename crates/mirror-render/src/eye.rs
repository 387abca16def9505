//! Stereo eye position resolution.

use glam::Vec3;
use mirror_core::{Camera, StereoEye, TrackedNode, TrackingSource, XrNode};

/// Returns the tracked node kind of an eye.
#[must_use]
pub fn eye_node(eye: StereoEye) -> XrNode {
    match eye {
        StereoEye::Left => XrNode::LeftEye,
        StereoEye::Right => XrNode::RightEye,
    }
}

/// Finds the node of the given kind, falling back to the first node.
///
/// Returns `None` only when nothing is tracked.
pub fn find_node(nodes: &[TrackedNode], node: XrNode) -> Option<&TrackedNode> {
    nodes
        .iter()
        .find(|candidate| candidate.node == node)
        .or_else(|| nodes.first())
}

/// Returns the local-space offset of an eye with its depth component zeroed.
///
/// Missing nodes and nodes without a valid position yield a zero offset.
pub fn eye_offset(nodes: &[TrackedNode], eye: StereoEye) -> Vec3 {
    let offset = find_node(nodes, eye_node(eye))
        .and_then(|state| state.position)
        .unwrap_or(Vec3::ZERO);
    Vec3::new(offset.x, offset.y, 0.0)
}

/// Returns the world-space position of an eye of `camera`.
pub fn eye_world_position(camera: &Camera, nodes: &[TrackedNode], eye: StereoEye) -> Vec3 {
    camera.position() + camera.transform.transform_vector(eye_offset(nodes, eye))
}

/// Resolves eye positions, reusing one node buffer across polls.
#[derive(Debug, Default)]
pub struct EyeResolver {
    nodes: Vec<TrackedNode>,
}

impl EyeResolver {
    /// Creates a resolver with an empty node buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls `tracking` and returns the world position of `eye`.
    pub fn resolve(
        &mut self,
        tracking: &dyn TrackingSource,
        camera: &Camera,
        eye: StereoEye,
    ) -> Vec3 {
        tracking.node_states(&mut self.nodes);
        eye_world_position(camera, &self.nodes, eye)
    }

    /// Returns the nodes seen by the last poll.
    pub fn nodes(&self) -> &[TrackedNode] {
        &self.nodes
    }
}
