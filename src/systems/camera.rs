use wgpu::util::DeviceExt;

use crate::{
    components::camera::{Camera, CameraComponent, CameraUniform},
    Uniform,
};

pub struct CameraSystem {}

impl CameraSystem {
    pub fn create_camera_component(device: &wgpu::Device, camera: &Camera) -> CameraComponent {
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);

        let camera_buffer = CameraSystem::create_uniform_buffer(device, &camera_uniform);
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Camera Component Uniform Bind Group Layout"),
            });

        let camera_bind_group = CameraSystem::create_uniform_bind_group(
            device,
            &camera_buffer,
            &camera_bind_group_layout,
        );

        CameraComponent {
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            camera_bind_group_layout,
        }
    }

    pub fn write_camera(queue: &wgpu::Queue, component: &mut CameraComponent, camera: &Camera) {
        component.camera_uniform.update_view_proj(camera);
        queue.write_buffer(
            &component.camera_buffer,
            0,
            bytemuck::cast_slice(&[component.camera_uniform]),
        );
    }
}

impl Uniform for CameraSystem {
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Component Uniform Buffer"),
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
            label: Some("Camera Component Uniform Bind Group"),
        })
    }
}
