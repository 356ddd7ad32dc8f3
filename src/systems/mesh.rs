use wgpu::util::DeviceExt;

use crate::components::mesh::{MeshComponent, Vertex};

pub struct MeshSystem {}

impl MeshSystem {
    pub fn create_vertex_buffer(device: &wgpu::Device, data: &[Vertex]) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_index_buffer(device: &wgpu::Device, data: &[u32]) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_model_matrix_buffer(
        device: &wgpu::Device,
        model_matrix: [[f32; 4]; 4],
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Matrix Buffer"),
            contents: bytemuck::cast_slice(&[model_matrix]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_model_matrix_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
            label: Some("Model Matrix Bind Group Layout"),
        })
    }

    pub fn create_model_matrix_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Model Matrix Bind Group"),
        })
    }

    pub fn create_mesh_component(
        device: &wgpu::Device,
        vertices: &[Vertex],
        indices: &[u32],
        model_matrix: [[f32; 4]; 4],
    ) -> MeshComponent {
        let model_matrix_bind_group_layout = MeshSystem::create_model_matrix_bind_group_layout(device);
        let model_matrix_buffer = MeshSystem::create_model_matrix_buffer(device, model_matrix);
        let model_matrix_bind_group = MeshSystem::create_model_matrix_bind_group(
            device,
            &model_matrix_bind_group_layout,
            &model_matrix_buffer,
        );

        MeshComponent {
            vertex_buffer: MeshSystem::create_vertex_buffer(device, vertices),
            index_buffer: MeshSystem::create_index_buffer(device, indices),
            num_indices: indices.len() as u32,
            model_matrix_bind_group_layout,
            model_matrix_bind_group,
            model_matrix_buffer,
        }
    }

    pub fn write_model_matrix(
        queue: &wgpu::Queue,
        mesh: &MeshComponent,
        model_matrix: [[f32; 4]; 4],
    ) {
        queue.write_buffer(
            &mesh.model_matrix_buffer,
            0,
            bytemuck::cast_slice(&[model_matrix]),
        );
    }

    /// UV sphere as a triangle list. Row `iy` runs from the north pole
    /// (v = 0) to the south pole, column `ix` from the -180° seam eastwards,
    /// so texel (u, v) of an equirectangular map lands on the same point
    /// `CoordinatesSystem::lat_lon_to_cartesian` gives for that lat/lon.
    pub fn generate_sphere_mesh(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    ) -> (Vec<Vertex>, Vec<u32>) {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        let mut indices = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;

            // poles are a single point, centre the uv of each pole vertex
            // on its triangle
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let theta = u * 2.0 * std::f32::consts::PI;
                let phi = v * std::f32::consts::PI;

                vertices.push(Vertex {
                    position: [
                        -radius * theta.cos() * phi.sin(),
                        radius * phi.cos(),
                        radius * theta.sin() * phi.sin(),
                    ],
                    tex_coords: [u + u_offset, v],
                });
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        (vertices, indices)
    }

    /// Quad in the local XY plane facing +Z, centred on the origin.
    pub fn generate_square_mesh(width: f32, height: f32) -> (Vec<Vertex>, Vec<u32>) {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let vertices = vec![
            Vertex {
                position: [-hw, hh, 0.0],
                tex_coords: [0.0, 0.0],
            },
            Vertex {
                position: [-hw, -hh, 0.0],
                tex_coords: [0.0, 1.0],
            },
            Vertex {
                position: [hw, -hh, 0.0],
                tex_coords: [1.0, 1.0],
            },
            Vertex {
                position: [hw, hh, 0.0],
                tex_coords: [1.0, 0.0],
            },
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        (vertices, indices)
    }
}
