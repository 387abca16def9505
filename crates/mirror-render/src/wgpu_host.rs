//! A render host backed by a wgpu device.
//!
//! [`WgpuHost`] owns one set of GPU textures per render target and encodes a
//! pass per submitted camera: the target is cleared according to the camera's
//! clear flags, multisampled targets are resolved, and the camera matrices are
//! uploaded to a [`MirrorUniformBuffer`] for the scene pipelines to bind.

use std::collections::HashMap;

use mirror_core::{Camera, ClearFlags, TextureHandle};

use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::host::RenderHost;
use crate::target::{create_wgpu_target, RenderTargetDesc, WgpuRenderTarget};
use crate::uniforms::{MirrorUniformBuffer, MirrorUniforms};

/// Render host drawing into wgpu textures.
pub struct WgpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_texture: u64,
    targets: HashMap<TextureHandle, WgpuRenderTarget>,
    uniforms: MirrorUniformBuffer,
    /// Number of passes submitted to the queue.
    pub submitted: usize,
}

impl WgpuHost {
    /// Creates a host on an existing device.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let uniforms = MirrorUniformBuffer::new(&device);
        Self {
            device,
            queue,
            next_texture: 0,
            targets: HashMap::new(),
            uniforms,
            submitted: 0,
        }
    }

    /// Creates a host on a device without a surface.
    pub async fn new_headless() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mirror device (headless)"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        log::info!("headless mirror host on {}", adapter.get_info().name);
        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the GPU textures of a live target.
    pub fn target(&self, texture: TextureHandle) -> Option<&WgpuRenderTarget> {
        self.targets.get(&texture)
    }

    /// Returns the number of render targets currently allocated.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn uniforms(&self) -> &MirrorUniformBuffer {
        &self.uniforms
    }
}

fn color_load_op(camera: &Camera) -> wgpu::LoadOp<wgpu::Color> {
    match camera.clear_flags {
        // No sky pipeline here, the sky clears to the background color
        ClearFlags::Skybox | ClearFlags::SolidColor => {
            let c = camera.background_color;
            wgpu::LoadOp::Clear(wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            })
        }
        ClearFlags::Depth | ClearFlags::Nothing => wgpu::LoadOp::Load,
    }
}

fn depth_load_op(camera: &Camera) -> wgpu::LoadOp<f32> {
    match camera.clear_flags {
        ClearFlags::Nothing => wgpu::LoadOp::Load,
        _ => wgpu::LoadOp::Clear(1.0),
    }
}

impl RenderHost for WgpuHost {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<TextureHandle> {
        let max = self.device.limits().max_texture_dimension_2d;
        if desc.size == 0 || desc.size > max {
            return Err(RenderError::TargetAllocationFailed(format!(
                "{} size {} outside 1..={max}",
                desc.label, desc.size
            )));
        }
        // 2x and 8x need adapter-specific format features
        let adapter_specific = self
            .device
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);
        if !matches!(desc.sample_count, 1 | 4) && !adapter_specific {
            return Err(RenderError::TargetAllocationFailed(format!(
                "{} requests {}x MSAA",
                desc.label, desc.sample_count
            )));
        }
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.targets.insert(handle, create_wgpu_target(&self.device, desc));
        log::debug!("allocated {} as {handle}", desc.label);
        Ok(handle)
    }

    fn destroy_render_target(&mut self, texture: TextureHandle) {
        match self.targets.remove(&texture) {
            Some(target) => target.destroy(),
            None => log::warn!("destroying unknown render target {texture}"),
        }
    }

    fn submit_camera(&mut self, _ctx: &mut RenderContext, camera: &Camera) -> RenderResult<()> {
        let Some(texture) = camera.target_texture else {
            return Err(RenderError::SubmissionFailed(format!(
                "{} has no target texture",
                camera.id
            )));
        };
        let target = self
            .targets
            .get(&texture)
            .ok_or(RenderError::UnknownTarget(texture))?;

        self.uniforms
            .write(&self.queue, &MirrorUniforms::from_camera(camera));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mirror Encoder"),
            });
        {
            let depth_stencil_attachment =
                target
                    .depth_view
                    .as_ref()
                    .map(|view| wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: depth_load_op(camera),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    });
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mirror Reflection Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    resolve_target: target.resolve_view.as_ref(),
                    ops: wgpu::Operations {
                        load: color_load_op(camera),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.submitted += 1;
        Ok(())
    }
}
