//! Per-frame orchestration of a mirror surface.
//!
//! The host calls [`MirrorSurface::on_before_camera_render`] once for every
//! camera it is about to draw. The surface decides whether a reflection is
//! needed, renders one pass per eye through the host and publishes the
//! resulting textures on its material.

use glam::{Mat4, Vec3, Vec4};
use mirror_core::{
    Camera, CameraId, CameraKind, MeshRenderer, MirrorSurfaceConfig, ReflectionPlane, Result,
    StereoEye, TextureHandle, TrackingSource, Transform,
};

use crate::cache::MirrorCameraCache;
use crate::context::{RenderContext, SavedState};
use crate::error::RenderResult;
use crate::eye::EyeResolver;
use crate::host::RenderHost;
use crate::oblique::oblique_projection;
use crate::reflection::{camera_space_plane, plane_reflection_matrix};
use crate::sync::sync_camera_properties;
use crate::target::{RenderTargetDesc, RenderTargetPair};

/// Returns the material property receiving the reflection of an eye.
pub fn reflection_texture_property(eye: StereoEye) -> String {
    format!("_ReflectionTex{eye}")
}

/// Why a notification did not produce a reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The camera or the surface is not eligible.
    Ineligible,
    /// A reflection pass is already in progress.
    Reentrant,
    /// The update throttle skipped this notification.
    Throttled,
}

/// Result of one camera notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Skipped(SkipReason),
    Rendered {
        left: TextureHandle,
        /// `None` for monoscopic cameras and for a failed right eye.
        right: Option<TextureHandle>,
    },
}

impl RenderOutcome {
    /// Returns whether at least one eye was rendered.
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// The reflection pass rendered for one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeRender {
    pub eye: StereoEye,
    /// Target the pass rendered into.
    pub texture: TextureHandle,
    /// Secondary camera used for the pass.
    pub camera_id: CameraId,
    /// Reflected world-to-camera matrix.
    pub view: Mat4,
    /// Projection submitted with the pass (oblique unless it fell back).
    pub projection: Mat4,
    /// Reflected eye position.
    pub position: Vec3,
    /// Camera-space clip plane.
    pub clip_plane: Vec4,
    /// Whether the oblique near plane was applied.
    pub oblique: bool,
}

/// A planar mirror in the scene.
#[derive(Debug)]
pub struct MirrorSurface {
    name: String,
    config: MirrorSurfaceConfig,
    transform: Transform,
    enabled: bool,
    renderer: Option<MeshRenderer>,
    cameras: MirrorCameraCache,
    targets: RenderTargetPair,
    eye_resolver: EyeResolver,
    frame_counter: u32,
    last_renders: [Option<EyeRender>; 2],
}

impl MirrorSurface {
    /// Creates an enabled surface without a renderer.
    pub fn new(name: impl Into<String>, config: MirrorSurfaceConfig) -> Result<Self> {
        config.validate()?;
        let name = name.into();
        Ok(Self {
            cameras: MirrorCameraCache::new(name.clone()),
            name,
            config,
            transform: Transform::identity(),
            enabled: true,
            renderer: None,
            targets: RenderTargetPair::new(),
            eye_resolver: EyeResolver::new(),
            frame_counter: 0,
            last_renders: [None; 2],
        })
    }

    /// Sets the world transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Attaches the renderer whose materials receive the reflection.
    #[must_use]
    pub fn with_renderer(mut self, renderer: MeshRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &MirrorSurfaceConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// Render targets pick up a new resolution on the next render.
    pub fn set_config(&mut self, config: MirrorSurfaceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn renderer(&self) -> Option<&MeshRenderer> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut MeshRenderer> {
        self.renderer.as_mut()
    }

    pub fn set_renderer(&mut self, renderer: Option<MeshRenderer>) {
        self.renderer = renderer;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            log::info!("enabling mirror '{}'", self.name);
            self.enabled = true;
        }
    }

    /// Disables the surface and releases its cameras and render targets.
    pub fn disable(&mut self, host: &mut dyn RenderHost) {
        if self.enabled {
            log::info!("disabling mirror '{}'", self.name);
        }
        self.enabled = false;
        self.release(host);
    }

    /// Destroys every secondary camera and render target.
    pub fn release(&mut self, host: &mut dyn RenderHost) {
        self.cameras.release(host);
        self.targets.release(host);
        self.last_renders = [None; 2];
    }

    /// Returns the secondary camera cache.
    pub fn cameras(&self) -> &MirrorCameraCache {
        &self.cameras
    }

    /// Returns the render targets.
    pub fn targets(&self) -> &RenderTargetPair {
        &self.targets
    }

    /// Returns the most recent pass rendered for an eye.
    pub fn last_render(&self, eye: StereoEye) -> Option<&EyeRender> {
        self.last_renders[eye.index()].as_ref()
    }

    /// Returns the remaining notifications the throttle will skip.
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Forgets the secondary camera of a camera the host destroyed.
    pub fn on_camera_removed(&mut self, camera: CameraId, host: &mut dyn RenderHost) -> bool {
        self.cameras.remove_viewing_camera(camera, host)
    }

    /// Returns whether `camera` should see a reflection on this surface.
    pub fn is_eligible(&self, camera: &Camera) -> bool {
        let kind_ok = matches!(camera.kind, CameraKind::Game | CameraKind::SceneView);
        let renderer_ok = self
            .renderer
            .as_ref()
            .is_some_and(|r| r.enabled && r.shared_material().is_some());
        self.enabled && kind_ok && !camera.is_mirror_camera() && renderer_ok
    }

    /// Host callback, invoked before `camera` is drawn.
    ///
    /// A left eye failure is returned after the render state has been
    /// restored. A right eye failure is logged and the left eye result kept.
    pub fn on_before_camera_render(
        &mut self,
        ctx: &mut RenderContext,
        camera: &Camera,
        host: &mut dyn RenderHost,
        tracking: &dyn TrackingSource,
    ) -> RenderResult<RenderOutcome> {
        if !self.is_eligible(camera) {
            return Ok(RenderOutcome::Skipped(SkipReason::Ineligible));
        }
        if ctx.is_inside_reflection() {
            log::trace!("mirror '{}' skipped nested render of {}", self.name, camera.id);
            return Ok(RenderOutcome::Skipped(SkipReason::Reentrant));
        }
        if self.frame_counter > 0 {
            self.frame_counter -= 1;
            log::trace!(
                "mirror '{}' throttled for {} ({} left)",
                self.name,
                camera.id,
                self.frame_counter
            );
            return Ok(RenderOutcome::Skipped(SkipReason::Throttled));
        }
        self.frame_counter = self.config.frames_needed_to_update;

        if !camera.stereo_enabled() {
            let left = self.render_camera(ctx, camera, StereoEye::Left, host, tracking)?;
            return Ok(RenderOutcome::Rendered { left, right: None });
        }

        let left = self.render_camera(ctx, camera, StereoEye::Left, host, tracking)?;
        let right = match self.render_camera(ctx, camera, StereoEye::Right, host, tracking) {
            Ok(texture) => Some(texture),
            Err(err) => {
                log::error!("mirror '{}' failed to render right eye: {err}", self.name);
                None
            }
        };
        Ok(RenderOutcome::Rendered { left, right })
    }

    /// Renders one eye with the render state restored afterwards.
    fn render_camera(
        &mut self,
        ctx: &mut RenderContext,
        camera: &Camera,
        eye: StereoEye,
        host: &mut dyn RenderHost,
        tracking: &dyn TrackingSource,
    ) -> RenderResult<TextureHandle> {
        let saved = SavedState::capture(ctx);
        ctx.inside_reflection = true;
        let result = self.render_eye(ctx, camera, eye, host, tracking);
        saved.restore(ctx);
        result
    }

    fn render_eye(
        &mut self,
        ctx: &mut RenderContext,
        camera: &Camera,
        eye: StereoEye,
        host: &mut dyn RenderHost,
        tracking: &dyn TrackingSource,
    ) -> RenderResult<TextureHandle> {
        // The idle eye must not keep sampling a target of the old size
        for (stale, texture) in self.targets.refresh_stale(&self.config, &self.name, host)? {
            if stale != eye {
                if let Some(renderer) = &self.renderer {
                    renderer.bind_texture(&reflection_texture_property(stale), texture);
                }
                self.last_renders[stale.index()] = None;
            }
        }
        let desc = RenderTargetDesc::for_eye(&self.config, eye, &self.name);
        let texture = self.targets.ensure(eye, &desc, host)?;

        let plane = ReflectionPlane::from_surface(
            &self.transform,
            self.config.projection_direction,
            self.config.clip_plane_offset,
        );
        if self.config.disable_pixel_lights {
            ctx.pixel_light_count = 0;
        }

        let reflection = plane_reflection_matrix(&plane);
        let (view, projection, eye_position) = if camera.stereo_enabled() {
            (
                camera.stereo_view_matrix(eye),
                camera.stereo_projection_matrix(eye),
                self.eye_resolver.resolve(tracking, camera, eye),
            )
        } else {
            (
                camera.view_matrix(),
                camera.projection_matrix(),
                camera.position(),
            )
        };

        let reflected_view = view * reflection;
        let reflected_position = reflection.transform_point3(eye_position);
        let clip_plane = camera_space_plane(
            reflected_view,
            plane.origin(),
            plane.normal(),
            1.0,
            self.config.clip_plane_offset,
        );
        let (projection, oblique) =
            match oblique_projection(projection, clip_plane, camera.clip_depth) {
                Ok(oblique) => (oblique, true),
                Err(err) => {
                    log::debug!(
                        "mirror '{}' keeps the regular projection for {}: {err}",
                        self.name,
                        camera.id
                    );
                    (projection, false)
                }
            };

        let mirror_camera = self.cameras.get_or_create(camera, &self.transform);
        sync_camera_properties(camera, Some(&mut *mirror_camera), self.config.far_clip);
        mirror_camera.near = mirror_camera.near.max(self.config.near_clip_limit);
        mirror_camera.transform.translation = reflected_position;
        mirror_camera.transform.rotation = camera.transform.rotation;
        mirror_camera.set_view_matrix(reflected_view);
        mirror_camera.set_projection_matrix(projection);
        mirror_camera.clip_depth = camera.clip_depth;
        mirror_camera.culling_mask = self.config.layer_mask;
        mirror_camera.target_texture = Some(texture);

        // Reflection flips winding
        let culling = ctx.invert_culling;
        ctx.invert_culling = true;
        let submitted = host.submit_camera(ctx, mirror_camera);
        ctx.invert_culling = culling;
        submitted?;
        let camera_id = mirror_camera.id;

        if let Some(renderer) = &self.renderer {
            renderer.bind_texture(&reflection_texture_property(eye), texture);
        }

        self.last_renders[eye.index()] = Some(EyeRender {
            eye,
            texture,
            camera_id,
            view: reflected_view,
            projection,
            position: reflected_position,
            clip_plane,
            oblique,
        });
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::host::tests::CountingHost;
    use mirror_core::{shared, Material, NoTracking, SharedMaterial, StereoMatrices};

    fn material() -> SharedMaterial {
        shared(
            Material::new("mirror")
                .with_texture_property("_ReflectionTexLeft")
                .with_texture_property("_ReflectionTexRight"),
        )
    }

    fn surface(config: MirrorSurfaceConfig) -> (MirrorSurface, SharedMaterial) {
        let material = material();
        let surface = MirrorSurface::new("mirror", config)
            .unwrap()
            .with_renderer(MeshRenderer::new(vec![material.clone()]));
        (surface, material)
    }

    fn viewer() -> Camera {
        Camera::new(CameraId(1), CameraKind::Game).looking_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
        )
    }

    fn notify(
        surface: &mut MirrorSurface,
        ctx: &mut RenderContext,
        camera: &Camera,
        host: &mut CountingHost,
    ) -> RenderOutcome {
        surface
            .on_before_camera_render(ctx, camera, host, &NoTracking)
            .unwrap()
    }

    #[test]
    fn test_property_names() {
        assert_eq!(reflection_texture_property(StereoEye::Left), "_ReflectionTexLeft");
        assert_eq!(reflection_texture_property(StereoEye::Right), "_ReflectionTexRight");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = MirrorSurfaceConfig::new().with_texture_size(0);
        assert!(MirrorSurface::new("bad", config).is_err());
    }

    #[test]
    fn test_ineligible_cameras_are_skipped() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();

        let preview = Camera::new(CameraId(2), CameraKind::Preview);
        let reflection = Camera::new(CameraId(3), CameraKind::Reflection);
        let mut tagged = viewer();
        tagged.tag = mirror_core::MIRROR_CAMERA_TAG.to_string();

        for camera in [&preview, &reflection, &tagged] {
            assert_eq!(
                notify(&mut surface, &mut ctx, camera, &mut host),
                RenderOutcome::Skipped(SkipReason::Ineligible)
            );
        }
        assert!(host.submitted.is_empty());
        assert!(surface.cameras().is_empty());
    }

    #[test]
    fn test_requires_enabled_renderer_with_material() {
        let mut surface = MirrorSurface::new("mirror", MirrorSurfaceConfig::new()).unwrap();
        assert!(!surface.is_eligible(&viewer()));

        surface.set_renderer(Some(MeshRenderer::new(Vec::new())));
        assert!(!surface.is_eligible(&viewer()));

        let mut renderer = MeshRenderer::new(vec![material()]);
        renderer.enabled = false;
        surface.set_renderer(Some(renderer));
        assert!(!surface.is_eligible(&viewer()));

        surface.renderer_mut().unwrap().enabled = true;
        assert!(surface.is_eligible(&viewer()));
    }

    #[test]
    fn test_render_binds_left_texture() {
        let (mut surface, material) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::new(4);
        let mut host = CountingHost::default();

        let outcome = notify(&mut surface, &mut ctx, &viewer(), &mut host);
        let RenderOutcome::Rendered { left, right } = outcome else {
            panic!("expected a render, got {outcome:?}");
        };
        assert!(right.is_none());
        assert_eq!(material.read().unwrap().texture("_ReflectionTexLeft"), Some(left));
        assert_eq!(material.read().unwrap().texture("_ReflectionTexRight"), None);

        let submitted = &host.submitted[0];
        assert!(submitted.is_mirror_camera());
        assert_eq!(submitted.target_texture, Some(left));
        assert_eq!(submitted.far, 30.0);
        assert!(submitted.near >= 0.2);
        assert_eq!(host.culling_during_submit, vec![true]);

        assert!(!ctx.inside_reflection);
        assert!(!ctx.invert_culling);
        assert_eq!(ctx.pixel_light_count, 4);
    }

    #[test]
    fn test_reflected_camera_sits_behind_mirror() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();
        notify(&mut surface, &mut ctx, &viewer(), &mut host);

        let render = surface.last_render(StereoEye::Left).unwrap();
        assert!(render.oblique);
        assert!((render.position - Vec3::new(0.0, 0.0, -5.0)).length() < 0.01);
        assert!((host.submitted[0].position() - render.position).length() < 1e-5);
    }

    #[test]
    fn test_guard_skips_without_side_effects() {
        let (mut surface, material) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        ctx.inside_reflection = true;
        let mut host = CountingHost::default();

        assert_eq!(
            notify(&mut surface, &mut ctx, &viewer(), &mut host),
            RenderOutcome::Skipped(SkipReason::Reentrant)
        );
        assert!(host.submitted.is_empty());
        assert_eq!(host.created, 0);
        assert_eq!(material.read().unwrap().texture("_ReflectionTexLeft"), None);
        assert!(ctx.inside_reflection);
    }

    #[test]
    fn test_throttle_cadence() {
        let config = MirrorSurfaceConfig::new().with_frames_needed_to_update(2);
        let (mut surface, _) = surface(config);
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();

        let rendered: Vec<bool> = (0..6)
            .map(|_| notify(&mut surface, &mut ctx, &viewer(), &mut host).is_rendered())
            .collect();
        assert_eq!(rendered, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn test_left_failure_restores_state() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::new(4);
        let mut host = CountingHost::default();
        host.fail_submissions = true;

        let result = surface.on_before_camera_render(&mut ctx, &viewer(), &mut host, &NoTracking);
        assert!(matches!(result, Err(RenderError::SubmissionFailed(_))));
        assert!(!ctx.inside_reflection);
        assert!(!ctx.invert_culling);
        assert_eq!(ctx.pixel_light_count, 4);
        assert!(surface.last_render(StereoEye::Left).is_none());
    }

    #[test]
    fn test_stereo_renders_both_eyes() {
        let (mut surface, material) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();

        let base = viewer();
        let view = base.view_matrix();
        let projection = base.projection_matrix();
        let camera = base.with_stereo(StereoMatrices {
            view: [view, view],
            projection: [projection, projection],
        });

        let outcome = notify(&mut surface, &mut ctx, &camera, &mut host);
        let RenderOutcome::Rendered { left, right: Some(right) } = outcome else {
            panic!("expected both eyes, got {outcome:?}");
        };
        assert_ne!(left, right);
        assert_eq!(host.submitted.len(), 2);
        assert_eq!(surface.cameras().len(), 1);
        assert_eq!(surface.targets().len(), 2);
        assert_eq!(material.read().unwrap().texture("_ReflectionTexRight"), Some(right));
    }

    #[test]
    fn test_orthographic_falls_back_to_regular_projection() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();
        let mut camera = viewer();
        camera.orthographic = true;

        assert!(notify(&mut surface, &mut ctx, &camera, &mut host).is_rendered());
        let render = surface.last_render(StereoEye::Left).unwrap();
        assert!(!render.oblique);
        assert_eq!(render.projection, camera.projection_matrix());
    }

    #[test]
    fn test_disable_releases_everything() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();
        notify(&mut surface, &mut ctx, &viewer(), &mut host);

        surface.disable(&mut host);
        assert!(surface.cameras().is_empty());
        assert!(surface.targets().is_empty());
        assert_eq!(host.destroyed, 1);
        assert_eq!(host.destroyed_cameras, 1);
        assert_eq!(
            notify(&mut surface, &mut ctx, &viewer(), &mut host),
            RenderOutcome::Skipped(SkipReason::Ineligible)
        );
    }

    #[test]
    fn test_camera_removal_drops_entry() {
        let (mut surface, _) = surface(MirrorSurfaceConfig::new());
        let mut ctx = RenderContext::default();
        let mut host = CountingHost::default();
        notify(&mut surface, &mut ctx, &viewer(), &mut host);

        assert!(surface.on_camera_removed(CameraId(1), &mut host));
        assert!(surface.cameras().is_empty());
        assert!(!surface.on_camera_removed(CameraId(1), &mut host));
    }
}
