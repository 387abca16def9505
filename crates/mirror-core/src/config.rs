//! Configuration for mirror surfaces.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::layer::LayerMask;

/// Default far clip distance for reflection cameras.
///
/// Reflections are a local effect, so the secondary camera never needs to see
/// as far as the camera it mirrors.
pub const DEFAULT_REFLECTION_FAR_CLIP: f32 = 30.0;

/// User-authored settings for a single mirror surface.
///
/// Owned by the surface and read-only to every other component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSurfaceConfig {
    /// Plane normal in the surface's local space.
    pub projection_direction: Vec3,

    /// Which render layers the reflection may see.
    pub layer_mask: LayerMask,

    /// Side length of the square render target, in pixels.
    pub texture_size: u32,

    /// Bias pushing the clip plane off the surface to avoid self-clipping.
    pub clip_plane_offset: f32,

    /// Minimum near plane distance of the reflection camera.
    pub near_clip_limit: f32,

    /// Whether dynamic per-pixel lights are disabled during the reflection pass.
    pub disable_pixel_lights: bool,

    /// Number of notifications skipped between reflection updates.
    pub frames_needed_to_update: u32,

    /// Far clip distance forced onto the reflection camera.
    pub far_clip: f32,

    /// Multisample count of the render targets.
    pub msaa_samples: u32,

    /// Depth buffer precision of the render targets.
    pub depth_bits: u32,
}

impl Default for MirrorSurfaceConfig {
    fn default() -> Self {
        Self {
            projection_direction: Vec3::Z,
            layer_mask: LayerMask::ALL,
            texture_size: 1024,
            clip_plane_offset: 0.001,
            near_clip_limit: 0.2,
            disable_pixel_lights: true,
            frames_needed_to_update: 0,
            far_clip: DEFAULT_REFLECTION_FAR_CLIP,
            msaa_samples: 4,
            depth_bits: 24,
        }
    }
}

impl MirrorSurfaceConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local-space plane normal.
    #[must_use]
    pub fn with_projection_direction(mut self, direction: Vec3) -> Self {
        self.projection_direction = direction;
        self
    }

    /// Sets the culling layer mask.
    #[must_use]
    pub fn with_layer_mask(mut self, mask: LayerMask) -> Self {
        self.layer_mask = mask;
        self
    }

    /// Sets the render target resolution.
    #[must_use]
    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    /// Sets the clip plane bias.
    #[must_use]
    pub fn with_clip_plane_offset(mut self, offset: f32) -> Self {
        self.clip_plane_offset = offset;
        self
    }

    /// Sets the minimum near plane distance.
    #[must_use]
    pub fn with_near_clip_limit(mut self, limit: f32) -> Self {
        self.near_clip_limit = limit;
        self
    }

    /// Sets whether pixel lights are disabled while rendering the reflection.
    #[must_use]
    pub fn with_disable_pixel_lights(mut self, disable: bool) -> Self {
        self.disable_pixel_lights = disable;
        self
    }

    /// Sets the update throttle interval.
    #[must_use]
    pub fn with_frames_needed_to_update(mut self, frames: u32) -> Self {
        self.frames_needed_to_update = frames;
        self
    }

    /// Sets the far clip distance of the reflection camera.
    #[must_use]
    pub fn with_far_clip(mut self, far: f32) -> Self {
        self.far_clip = far;
        self
    }

    /// Sets the multisample count of the render targets.
    #[must_use]
    pub fn with_msaa_samples(mut self, samples: u32) -> Self {
        self.msaa_samples = samples;
        self
    }

    /// Checks that the configuration can drive a reflection pass.
    pub fn validate(&self) -> Result<()> {
        if self.texture_size == 0 {
            return Err(MirrorError::InvalidTextureSize(self.texture_size));
        }
        if !self.projection_direction.is_finite()
            || self.projection_direction.length_squared() <= f32::EPSILON
        {
            return Err(MirrorError::InvalidProjectionDirection(
                self.projection_direction.to_array(),
            ));
        }
        if !self.clip_plane_offset.is_finite() || self.clip_plane_offset < 0.0 {
            return Err(MirrorError::InvalidClipPlaneOffset(self.clip_plane_offset));
        }
        if !self.near_clip_limit.is_finite() || self.near_clip_limit <= 0.0 {
            return Err(MirrorError::InvalidNearClipLimit(self.near_clip_limit));
        }
        if !self.far_clip.is_finite() || self.far_clip <= 0.0 {
            return Err(MirrorError::InvalidFarClip(self.far_clip));
        }
        if !matches!(self.msaa_samples, 1 | 2 | 4 | 8) {
            return Err(MirrorError::InvalidSampleCount(self.msaa_samples));
        }
        Ok(())
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("loaded mirror config from {}", path.as_ref().display());
        Ok(config)
    }
}
