//! A CPU-only render host.
//!
//! [`HeadlessHost`] allocates texture handles without a GPU and records every
//! camera submission, including the render state active during the draw. It
//! backs the demo and the integration tests.

use std::collections::{BTreeSet, HashMap};

use glam::{Mat4, Vec3, Vec4};
use mirror_core::{Camera, CameraId, CameraKind, ClipDepth, LayerMask, TextureHandle};
use mirror_render::{RenderContext, RenderError, RenderHost, RenderResult, RenderTargetDesc};

/// A camera draw recorded by [`HeadlessHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub camera_id: CameraId,
    pub target: Option<TextureHandle>,
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub clip_depth: ClipDepth,
    pub culling_mask: LayerMask,
    pub near: f32,
    pub far: f32,
    pub invert_culling: bool,
    pub pixel_light_count: u32,
    pub inside_reflection: bool,
}

impl Submission {
    /// Returns the clip-space position of a world point.
    pub fn clip_position(&self, point: Vec3) -> Vec4 {
        self.projection * self.view * point.extend(1.0)
    }

    /// Returns whether a world point survives frustum clipping.
    pub fn is_visible(&self, point: Vec3) -> bool {
        let c = self.clip_position(point);
        if c.w <= 0.0 || c.x.abs() > c.w || c.y.abs() > c.w || c.z > c.w {
            return false;
        }
        match self.clip_depth {
            ClipDepth::NegOneToOne => c.z >= -c.w,
            ClipDepth::ZeroToOne => c.z >= 0.0,
        }
    }
}

/// Render host that records instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_texture: u64,
    next_camera: u32,
    attempts: usize,
    targets: HashMap<TextureHandle, RenderTargetDesc>,
    fail_at: BTreeSet<usize>,
    /// Number of render targets allocated so far.
    pub created_targets: usize,
    /// Number of render targets released so far.
    pub destroyed_targets: usize,
    /// Secondary cameras discarded by mirror surfaces.
    pub destroyed_cameras: Vec<CameraId>,
    /// Successful submissions, in order.
    pub submissions: Vec<Submission>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host camera with the next free id.
    pub fn create_camera(&mut self, kind: CameraKind) -> Camera {
        self.next_camera += 1;
        Camera::new(CameraId(self.next_camera), kind)
    }

    /// Makes the submission attempt with the given zero-based index fail.
    pub fn fail_submission(&mut self, attempt: usize) {
        self.fail_at.insert(attempt);
    }

    /// Returns the number of submission attempts, failed ones included.
    pub fn submission_attempts(&self) -> usize {
        self.attempts
    }

    /// Returns the number of render targets currently allocated.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Returns the description a live target was allocated with.
    pub fn target(&self, texture: TextureHandle) -> Option<&RenderTargetDesc> {
        self.targets.get(&texture)
    }

    /// Returns the last successful submission.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.submissions.last()
    }
}

impl RenderHost for HeadlessHost {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<TextureHandle> {
        if desc.size == 0 {
            return Err(RenderError::TargetAllocationFailed(format!(
                "{} has zero size",
                desc.label
            )));
        }
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.targets.insert(handle, desc.clone());
        self.created_targets += 1;
        Ok(handle)
    }

    fn destroy_render_target(&mut self, texture: TextureHandle) {
        if self.targets.remove(&texture).is_some() {
            self.destroyed_targets += 1;
        } else {
            log::warn!("destroying unknown render target {texture}");
        }
    }

    fn submit_camera(&mut self, ctx: &mut RenderContext, camera: &Camera) -> RenderResult<()> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at.contains(&attempt) {
            return Err(RenderError::SubmissionFailed(format!(
                "injected failure at submission {attempt}"
            )));
        }
        if let Some(target) = camera.target_texture {
            if !self.targets.contains_key(&target) {
                return Err(RenderError::UnknownTarget(target));
            }
        }

        self.submissions.push(Submission {
            camera_id: camera.id,
            target: camera.target_texture,
            position: camera.position(),
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            clip_depth: camera.clip_depth,
            culling_mask: camera.culling_mask,
            near: camera.near,
            far: camera.far,
            invert_culling: ctx.invert_culling,
            pixel_light_count: ctx.pixel_light_count,
            inside_reflection: ctx.inside_reflection,
        });
        Ok(())
    }

    fn destroy_camera(&mut self, camera: &Camera) {
        self.destroyed_cameras.push(camera.id);
    }
}
