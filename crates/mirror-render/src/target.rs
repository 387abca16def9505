//! Render targets for reflection cameras.
//!
//! A [`RenderTargetPair`] owns up to one target per eye and recreates a target
//! exactly when the configured resolution or sampling differs from the
//! allocated one.

use mirror_core::{MirrorError, MirrorSurfaceConfig, StereoEye, TextureHandle};

use crate::error::RenderResult;
use crate::host::RenderHost;

/// Color format of reflection targets.
pub const REFLECTION_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Description of a reflection render target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDesc {
    /// Debug label.
    pub label: String,
    /// Width and height in pixels.
    pub size: u32,
    /// Depth buffer precision in bits (0 = no depth buffer).
    pub depth_bits: u32,
    /// Multisample count.
    pub sample_count: u32,
    /// Color format.
    pub format: wgpu::TextureFormat,
    /// Hint that the target is sampled like a power-of-two texture.
    pub power_of_two: bool,
}

impl RenderTargetDesc {
    /// Describes the target of one eye of a surface.
    pub fn for_eye(config: &MirrorSurfaceConfig, eye: StereoEye, owner: &str) -> Self {
        Self {
            label: format!("__MirrorReflection{eye}_{owner}"),
            size: config.texture_size,
            depth_bits: config.depth_bits,
            sample_count: config.msaa_samples,
            format: REFLECTION_COLOR_FORMAT,
            power_of_two: true,
        }
    }

    /// Returns the depth attachment format, if the target has depth.
    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        match self.depth_bits {
            0 => None,
            1..=16 => Some(wgpu::TextureFormat::Depth16Unorm),
            17..=24 => Some(wgpu::TextureFormat::Depth24Plus),
            _ => Some(wgpu::TextureFormat::Depth32Float),
        }
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.size,
            height: self.size,
            depth_or_array_layers: 1,
        }
    }

    /// Returns whether the color attachment is multisampled.
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    /// Returns the wgpu descriptor of the color attachment.
    ///
    /// A single-sampled attachment is sampled directly by the mirror
    /// material. A multisampled one is only rendered to and resolved.
    pub fn to_wgpu_descriptor(&self) -> wgpu::TextureDescriptor<'_> {
        let usage = if self.is_multisampled() {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            Self::sampled_usage()
        };
        wgpu::TextureDescriptor {
            label: Some(self.label.as_str()),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage,
            view_formats: &[],
        }
    }

    /// Returns the wgpu descriptor of the single-sampled resolve texture
    /// of a multisampled target.
    pub fn to_wgpu_resolve_descriptor(&self) -> Option<wgpu::TextureDescriptor<'_>> {
        if !self.is_multisampled() {
            return None;
        }
        Some(wgpu::TextureDescriptor {
            label: Some(self.label.as_str()),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: Self::sampled_usage(),
            view_formats: &[],
        })
    }

    fn sampled_usage() -> wgpu::TextureUsages {
        wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
    }

    /// Returns the wgpu descriptor of the depth attachment.
    pub fn to_wgpu_depth_descriptor(&self) -> Option<wgpu::TextureDescriptor<'_>> {
        let format = self.depth_format()?;
        Some(wgpu::TextureDescriptor {
            label: Some(self.label.as_str()),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }
}

/// GPU textures backing one reflection target.
pub struct WgpuRenderTarget {
    /// Color attachment, multisampled when MSAA is on.
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    /// Single-sampled resolve texture of a multisampled target.
    pub resolve: Option<wgpu::Texture>,
    pub resolve_view: Option<wgpu::TextureView>,
    /// Depth attachment.
    pub depth: Option<wgpu::Texture>,
    pub depth_view: Option<wgpu::TextureView>,
}

impl WgpuRenderTarget {
    /// Returns the texture the mirror material samples.
    pub fn sampled_texture(&self) -> &wgpu::Texture {
        self.resolve.as_ref().unwrap_or(&self.color)
    }

    /// Returns the view the mirror material samples.
    pub fn sampled_view(&self) -> &wgpu::TextureView {
        self.resolve_view.as_ref().unwrap_or(&self.color_view)
    }

    /// Releases the GPU memory of every texture.
    pub fn destroy(&self) {
        self.color.destroy();
        if let Some(resolve) = &self.resolve {
            resolve.destroy();
        }
        if let Some(depth) = &self.depth {
            depth.destroy();
        }
    }
}

/// Allocates the textures of a reflection target on a wgpu device.
///
/// Intended for [`RenderHost`] implementations backed by wgpu.
pub fn create_wgpu_target(device: &wgpu::Device, desc: &RenderTargetDesc) -> WgpuRenderTarget {
    let color = device.create_texture(&desc.to_wgpu_descriptor());
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

    let resolve = desc
        .to_wgpu_resolve_descriptor()
        .map(|resolve_desc| device.create_texture(&resolve_desc));
    let resolve_view = resolve
        .as_ref()
        .map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default()));

    let depth = desc
        .to_wgpu_depth_descriptor()
        .map(|depth_desc| device.create_texture(&depth_desc));
    let depth_view = depth
        .as_ref()
        .map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default()));

    WgpuRenderTarget {
        color,
        color_view,
        resolve,
        resolve_view,
        depth,
        depth_view,
    }
}

/// A render target allocated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    /// Host handle.
    pub handle: TextureHandle,
    /// Width and height in pixels.
    pub size: u32,
    pub sample_count: u32,
    pub depth_bits: u32,
}

impl RenderTarget {
    /// Returns whether the target was allocated for `desc`.
    pub fn matches(&self, desc: &RenderTargetDesc) -> bool {
        self.size == desc.size
            && self.sample_count == desc.sample_count
            && self.depth_bits == desc.depth_bits
    }
}

/// Left and right eye render targets of one surface.
#[derive(Debug, Default)]
pub struct RenderTargetPair {
    slots: [Option<RenderTarget>; 2],
}

impl RenderTargetPair {
    /// Creates an empty pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the target of an eye, if allocated.
    pub fn get(&self, eye: StereoEye) -> Option<&RenderTarget> {
        self.slots[eye.index()].as_ref()
    }

    /// Returns the number of allocated targets.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns whether no target is allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the target of `eye`, (re)allocating it if it is missing or was
    /// allocated for a different size or sampling than `desc`.
    pub fn ensure(
        &mut self,
        eye: StereoEye,
        desc: &RenderTargetDesc,
        host: &mut dyn RenderHost,
    ) -> RenderResult<TextureHandle> {
        if desc.size == 0 {
            return Err(MirrorError::InvalidTextureSize(desc.size).into());
        }

        let slot = &mut self.slots[eye.index()];
        if let Some(target) = *slot {
            if target.matches(desc) {
                return Ok(target.handle);
            }
            log::debug!(
                "recreating {} ({}px x{} -> {}px x{})",
                desc.label,
                target.size,
                target.sample_count,
                desc.size,
                desc.sample_count
            );
            host.destroy_render_target(target.handle);
            *slot = None;
        }

        let handle = host.create_render_target(desc)?;
        log::debug!("created {} ({handle}, {}px)", desc.label, desc.size);
        *slot = Some(RenderTarget {
            handle,
            size: desc.size,
            sample_count: desc.sample_count,
            depth_bits: desc.depth_bits,
        });
        Ok(handle)
    }

    /// Reallocates every allocated target that no longer matches `config`.
    ///
    /// Keeps the eye that is not being rendered this frame in step with the
    /// configuration. Returns the eyes whose texture changed.
    pub fn refresh_stale(
        &mut self,
        config: &MirrorSurfaceConfig,
        owner: &str,
        host: &mut dyn RenderHost,
    ) -> RenderResult<Vec<(StereoEye, TextureHandle)>> {
        let mut refreshed = Vec::new();
        for eye in StereoEye::ALL {
            let desc = RenderTargetDesc::for_eye(config, eye, owner);
            let stale = self.slots[eye.index()].is_some_and(|target| !target.matches(&desc));
            if stale {
                refreshed.push((eye, self.ensure(eye, &desc, host)?));
            }
        }
        Ok(refreshed)
    }

    /// Destroys the target of one eye.
    pub fn destroy(&mut self, eye: StereoEye, host: &mut dyn RenderHost) {
        if let Some(target) = self.slots[eye.index()].take() {
            host.destroy_render_target(target.handle);
        }
    }

    /// Destroys both targets.
    pub fn release(&mut self, host: &mut dyn RenderHost) {
        for eye in StereoEye::ALL {
            self.destroy(eye, host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests::CountingHost;

    fn desc(size: u32) -> RenderTargetDesc {
        RenderTargetDesc::for_eye(
            &MirrorSurfaceConfig::new().with_texture_size(size),
            StereoEye::Left,
            "test",
        )
    }

    #[test]
    fn test_desc_for_eye() {
        let desc = desc(512);
        assert_eq!(desc.label, "__MirrorReflectionLeft_test");
        assert_eq!(desc.size, 512);
        assert_eq!(desc.sample_count, 4);
        assert_eq!(desc.depth_format(), Some(wgpu::TextureFormat::Depth24Plus));
        assert!(desc.power_of_two);
    }

    #[test]
    fn test_wgpu_descriptor() {
        let desc = desc(256);
        let wgpu_desc = desc.to_wgpu_descriptor();
        assert_eq!(wgpu_desc.size.width, 256);
        assert_eq!(wgpu_desc.size.height, 256);
        assert_eq!(wgpu_desc.sample_count, 4);
        assert_eq!(wgpu_desc.format, REFLECTION_COLOR_FORMAT);
        assert!(wgpu_desc
            .usage
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        // Multisampled textures cannot be bound as regular 2D textures
        assert!(!wgpu_desc
            .usage
            .contains(wgpu::TextureUsages::TEXTURE_BINDING));

        let resolve = desc.to_wgpu_resolve_descriptor().unwrap();
        assert_eq!(resolve.sample_count, 1);
        assert_eq!(resolve.size, wgpu_desc.size);
        assert!(resolve.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));

        let depth = desc.to_wgpu_depth_descriptor().unwrap();
        assert_eq!(depth.format, wgpu::TextureFormat::Depth24Plus);

        let mut no_depth = desc.clone();
        no_depth.depth_bits = 0;
        assert!(no_depth.to_wgpu_depth_descriptor().is_none());
    }

    #[test]
    fn test_single_sampled_target_is_sampled_directly() {
        let mut desc = desc(128);
        desc.sample_count = 1;
        assert!(desc.to_wgpu_resolve_descriptor().is_none());
        assert!(desc
            .to_wgpu_descriptor()
            .usage
            .contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn test_ensure_allocates_once() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();

        let first = pair.ensure(StereoEye::Left, &desc(128), &mut host).unwrap();
        let second = pair.ensure(StereoEye::Left, &desc(128), &mut host).unwrap();
        assert_eq!(first, second);
        assert_eq!(host.created, 1);
        assert_eq!(host.destroyed, 0);
        assert_eq!(pair.len(), 1);
        assert!(pair.get(StereoEye::Right).is_none());
    }

    #[test]
    fn test_ensure_recreates_on_resize() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();

        let old = pair.ensure(StereoEye::Left, &desc(128), &mut host).unwrap();
        let new = pair.ensure(StereoEye::Left, &desc(256), &mut host).unwrap();
        assert_ne!(old, new);
        assert_eq!(host.created, 2);
        assert_eq!(host.destroyed, 1);
        assert_eq!(pair.get(StereoEye::Left).unwrap().size, 256);
    }

    #[test]
    fn test_ensure_recreates_on_sample_count_change() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();

        pair.ensure(StereoEye::Left, &desc(128), &mut host).unwrap();
        let mut single = desc(128);
        single.sample_count = 1;
        pair.ensure(StereoEye::Left, &single, &mut host).unwrap();
        assert_eq!(host.created, 2);
        assert_eq!(pair.get(StereoEye::Left).unwrap().sample_count, 1);
    }

    #[test]
    fn test_refresh_stale_resizes_idle_eye() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();
        let small = MirrorSurfaceConfig::new().with_texture_size(256);
        for eye in StereoEye::ALL {
            pair.ensure(eye, &RenderTargetDesc::for_eye(&small, eye, "test"), &mut host)
                .unwrap();
        }

        let large = MirrorSurfaceConfig::new().with_texture_size(512);
        let refreshed = pair.refresh_stale(&large, "test", &mut host).unwrap();
        assert_eq!(refreshed.len(), 2);
        for eye in StereoEye::ALL {
            assert_eq!(pair.get(eye).unwrap().size, 512);
        }
        assert_eq!(host.destroyed, 2);

        // Nothing left to refresh, and missing slots stay missing
        assert!(pair.refresh_stale(&large, "test", &mut host).unwrap().is_empty());
        pair.destroy(StereoEye::Right, &mut host);
        assert_eq!(pair.refresh_stale(&small, "test", &mut host).unwrap().len(), 1);
        assert!(pair.get(StereoEye::Right).is_none());
    }

    #[test]
    fn test_ensure_rejects_zero_size() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();
        assert!(pair.ensure(StereoEye::Left, &desc(0), &mut host).is_err());
        assert_eq!(host.created, 0);
    }

    #[test]
    fn test_release_destroys_both() {
        let mut host = CountingHost::default();
        let mut pair = RenderTargetPair::new();
        pair.ensure(StereoEye::Left, &desc(64), &mut host).unwrap();
        pair.ensure(StereoEye::Right, &desc(64), &mut host).unwrap();

        pair.release(&mut host);
        assert!(pair.is_empty());
        assert_eq!(host.destroyed, 2);
    }
}
