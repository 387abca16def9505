//! GPU uniforms describing one reflection pass.

use glam::Mat4;
use mirror_core::{Camera, StereoTargetEye};
use wgpu::util::DeviceExt;

use crate::surface::EyeRender;

/// GPU representation of the reflection camera of one eye.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MirrorUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Camera-space clip plane.
    pub clip_plane: [f32; 4],
    pub eye_position: [f32; 3],
    pub eye_index: u32,
}

impl Default for MirrorUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            clip_plane: [0.0, 0.0, 1.0, 0.0],
            eye_position: [0.0; 3],
            eye_index: 0,
        }
    }
}

impl From<&EyeRender> for MirrorUniforms {
    fn from(render: &EyeRender) -> Self {
        Self {
            view: render.view.to_cols_array_2d(),
            projection: render.projection.to_cols_array_2d(),
            clip_plane: render.clip_plane.to_array(),
            eye_position: render.position.to_array(),
            eye_index: render.eye.index() as u32,
        }
    }
}

impl MirrorUniforms {
    /// Builds the uniforms of a submitted camera.
    ///
    /// The clip plane is already folded into an oblique projection, so the
    /// plane written here keeps every point.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            clip_plane: [0.0, 0.0, 0.0, 1.0],
            eye_position: camera.position().to_array(),
            eye_index: u32::from(camera.stereo_target_eye == StereoTargetEye::Right),
        }
    }
}

/// Uniform buffer and bind group for [`MirrorUniforms`].
///
/// For hosts that render reflection cameras with their own wgpu pipeline.
pub struct MirrorUniformBuffer {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl MirrorUniformBuffer {
    /// Creates the buffer and its bind group.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mirror Uniform Buffer"),
            contents: bytemuck::cast_slice(&[MirrorUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mirror Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mirror Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Uploads the matrices of an eye render.
    pub fn update(&self, queue: &wgpu::Queue, render: &EyeRender) {
        self.write(queue, &MirrorUniforms::from(render));
    }

    pub fn write(&self, queue: &wgpu::Queue, uniforms: &MirrorUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}
