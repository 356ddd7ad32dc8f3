use wgpu::util::DeviceExt;

use crate::Uniform;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AmbientLightUniform {
    pub color: [f32; 4], // RGB already multiplied by intensity
}

pub struct LightingSystem {}

impl LightingSystem {
    pub fn create_ambient_light(
        device: &wgpu::Device,
        color: [f32; 4],
    ) -> (wgpu::BindGroup, wgpu::BindGroupLayout) {
        let uniform = AmbientLightUniform { color };
        let buffer = LightingSystem::create_uniform_buffer(device, &uniform);
        let layout = LightingSystem::create_uniform_bind_group_layout(device);
        let bind_group = LightingSystem::create_uniform_bind_group(device, &buffer, &layout);
        (bind_group, layout)
    }

    fn create_uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Ambient Light Bind Group Layout"),
        })
    }
}

impl Uniform for LightingSystem {
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ambient Light Uniform Buffer"),
            contents: bytemuck::bytes_of(data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Ambient Light Bind Group"),
        })
    }
}
