//! Tracked head-pose nodes reported by an XR runtime.

use glam::Vec3;

/// Kind of a tracked node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrNode {
    /// Left eye.
    LeftEye,
    /// Right eye.
    RightEye,
    /// Point between the eyes.
    CenterEye,
    /// Head.
    Head,
    /// Left hand controller.
    LeftHand,
    /// Right hand controller.
    RightHand,
    /// Anything else the runtime reports.
    Other,
}

/// State of one tracked node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedNode {
    /// What the node represents.
    pub node: XrNode,
    /// Position relative to the tracking origin, if currently valid.
    pub position: Option<Vec3>,
}

impl TrackedNode {
    /// Creates a node with a valid position.
    #[must_use]
    pub fn new(node: XrNode, position: Vec3) -> Self {
        Self {
            node,
            position: Some(position),
        }
    }

    /// Creates a node whose position is currently unavailable.
    #[must_use]
    pub fn untracked(node: XrNode) -> Self {
        Self {
            node,
            position: None,
        }
    }
}

/// Source of tracked node states, polled once per stereo eye render.
pub trait TrackingSource {
    /// Replaces the contents of `out` with the currently tracked nodes.
    fn node_states(&self, out: &mut Vec<TrackedNode>);
}

/// A tracking source that never reports any node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTracking;

impl TrackingSource for NoTracking {
    fn node_states(&self, out: &mut Vec<TrackedNode>) {
        out.clear();
    }
}

impl TrackingSource for [TrackedNode] {
    fn node_states(&self, out: &mut Vec<TrackedNode>) {
        out.clear();
        out.extend_from_slice(self);
    }
}

impl TrackingSource for Vec<TrackedNode> {
    fn node_states(&self, out: &mut Vec<TrackedNode>) {
        self.as_slice().node_states(out);
    }
}
