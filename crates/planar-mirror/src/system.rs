//! Registry of mirror surfaces and host callback dispatch.

use mirror_core::{Camera, CameraId, MirrorError, Result, TrackingSource};
use mirror_render::{MirrorSurface, RenderContext, RenderHost, RenderOutcome};

/// Counts of what one camera notification did across all surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Surfaces that rendered at least one eye.
    pub rendered: usize,
    /// Surfaces that skipped the notification.
    pub skipped: usize,
    /// Surfaces whose render failed.
    pub failed: usize,
}

/// All mirror surfaces of a scene.
///
/// Surfaces are identified by name and dispatched in registration order.
#[derive(Debug, Default)]
pub struct MirrorSystem {
    surfaces: Vec<MirrorSurface>,
}

impl MirrorSystem {
    /// Creates an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface.
    ///
    /// Returns an error if a surface with the same name already exists.
    pub fn register(&mut self, surface: MirrorSurface) -> Result<()> {
        if self.contains(surface.name()) {
            return Err(MirrorError::SurfaceExists(surface.name().to_string()));
        }
        log::info!("registered mirror '{}'", surface.name());
        self.surfaces.push(surface);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&MirrorSurface> {
        self.surfaces.iter().find(|s| s.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MirrorSurface> {
        self.surfaces.iter_mut().find(|s| s.name() == name)
    }

    /// Removes a surface and releases its cameras and render targets.
    pub fn remove(&mut self, name: &str, host: &mut dyn RenderHost) -> Result<MirrorSurface> {
        let index = self
            .surfaces
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| MirrorError::SurfaceNotFound(name.to_string()))?;
        let mut surface = self.surfaces.remove(index);
        surface.release(host);
        log::info!("removed mirror '{name}'");
        Ok(surface)
    }

    /// Enables or disables a surface. Disabling releases its resources.
    pub fn set_enabled(&mut self, name: &str, enabled: bool, host: &mut dyn RenderHost) -> Result<()> {
        let surface = self
            .get_mut(name)
            .ok_or_else(|| MirrorError::SurfaceNotFound(name.to_string()))?;
        if enabled {
            surface.enable();
        } else {
            surface.disable(host);
        }
        Ok(())
    }

    /// Forwards the host's "before camera render" callback to every surface.
    pub fn on_before_camera_render(
        &mut self,
        ctx: &mut RenderContext,
        camera: &Camera,
        host: &mut dyn RenderHost,
        tracking: &dyn TrackingSource,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for surface in &mut self.surfaces {
            match surface.on_before_camera_render(ctx, camera, host, tracking) {
                Ok(RenderOutcome::Rendered { .. }) => summary.rendered += 1,
                Ok(RenderOutcome::Skipped(_)) => summary.skipped += 1,
                Err(err) => {
                    log::warn!(
                        "mirror '{}' failed to render for {}: {err}",
                        surface.name(),
                        camera.id
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Drops the secondary cameras created for a destroyed host camera.
    ///
    /// Returns the number of surfaces that held one.
    pub fn notify_camera_removed(&mut self, camera: CameraId, host: &mut dyn RenderHost) -> usize {
        let mut removed = 0;
        for surface in &mut self.surfaces {
            if surface.on_camera_removed(camera, host) {
                removed += 1;
            }
        }
        removed
    }

    /// Releases the resources of every surface, keeping them registered.
    pub fn release_all(&mut self, host: &mut dyn RenderHost) {
        for surface in &mut self.surfaces {
            surface.release(host);
        }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Returns an iterator over all surfaces.
    pub fn iter(&self) -> impl Iterator<Item = &MirrorSurface> {
        self.surfaces.iter()
    }
}
