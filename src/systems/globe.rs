use cgmath::SquareMatrix;

use crate::{
    components::{
        camera::CameraComponent,
        globe::{GlobeComponent, PinsComponent, SkyboxComponent},
        marker::{Billboard, Placement},
        material::MaterialComponent,
        mesh::MeshComponent,
        render_pipelines::RenderPipelineComponent,
    },
    config::GlobeConfig,
    matrix4_to_array,
    scene::Scene,
};

use super::{
    billboard::BillboardSystem,
    lighting::LightingSystem,
    material::{MaterialSystem, RgbaImage},
    mesh::MeshSystem,
    pipelines::SphereRenderPipelineSystem,
};

pub struct GlobeSystem {}

impl GlobeSystem {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        camera_component: &CameraComponent,
        config: &GlobeConfig,
        image: RgbaImage,
    ) -> GlobeComponent {
        let (vertices, indices) = MeshSystem::generate_sphere_mesh(
            config.globe_radius,
            config.globe_segments,
            config.globe_segments,
        );
        let mesh_component = MeshSystem::create_mesh_component(
            device,
            &vertices,
            &indices,
            matrix4_to_array(cgmath::Matrix4::identity()),
        );

        let (bind_group, bind_group_layout) =
            MaterialSystem::create_2d_texture(device, queue, image, "Globe");
        let material_component = MaterialComponent {
            bind_group,
            bind_group_layout,
            shader: device.create_shader_module(wgpu::include_wgsl!("../shaders/globe_shader.wgsl")),
        };

        let (lighting_bind_group, lighting_bind_group_layout) =
            LightingSystem::create_ambient_light(device, config.ambient_light);

        let layouts: &[&wgpu::BindGroupLayout] = &[
            &camera_component.camera_bind_group_layout,
            &material_component.bind_group_layout,
            &mesh_component.model_matrix_bind_group_layout,
            &lighting_bind_group_layout,
        ];
        let render_pipeline_component = sphere_pipeline(
            device,
            layouts,
            &material_component.shader,
            texture_format,
            wgpu::Face::Back,
            "Globe",
        );

        GlobeComponent {
            mesh_component,
            material_component,
            render_pipeline_component,
            lighting_bind_group,
        }
    }
}

pub struct SkyboxSystem {}

impl SkyboxSystem {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        camera_component: &CameraComponent,
        config: &GlobeConfig,
        image: RgbaImage,
    ) -> SkyboxComponent {
        let (vertices, indices) = MeshSystem::generate_sphere_mesh(
            config.skybox_radius,
            config.skybox_segments,
            config.skybox_segments,
        );
        let mesh_component = MeshSystem::create_mesh_component(
            device,
            &vertices,
            &indices,
            matrix4_to_array(cgmath::Matrix4::identity()),
        );

        let (bind_group, bind_group_layout) =
            MaterialSystem::create_2d_texture(device, queue, image, "Skybox");
        let material_component = MaterialComponent {
            bind_group,
            bind_group_layout,
            shader: device
                .create_shader_module(wgpu::include_wgsl!("../shaders/skybox_shader.wgsl")),
        };

        let layouts: &[&wgpu::BindGroupLayout] = &[
            &camera_component.camera_bind_group_layout,
            &material_component.bind_group_layout,
            &mesh_component.model_matrix_bind_group_layout,
        ];
        // we sit inside the sphere, so its outward faces are the back ones
        let render_pipeline_component = sphere_pipeline(
            device,
            layouts,
            &material_component.shader,
            texture_format,
            wgpu::Face::Front,
            "Skybox",
        );

        SkyboxComponent {
            mesh_component,
            material_component,
            render_pipeline_component,
        }
    }
}

pub struct PinsSystem {}

impl PinsSystem {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        camera_component: &CameraComponent,
        scene: &mut Scene,
        image: RgbaImage,
    ) -> Option<PinsComponent> {
        let meshes: Vec<(bevy_ecs::entity::Entity, MeshComponent)> = scene
            .markers()
            .into_iter()
            .map(|(entity, placement, billboard)| {
                (
                    entity,
                    BillboardSystem::create_billboard_mesh(device, &placement, &billboard),
                )
            })
            .collect();

        let material_component = BillboardSystem::create_billboard_material(device, queue, image);
        let render_pipeline_component = BillboardSystem::create_render_pipeline(
            device,
            camera_component,
            &material_component,
            &meshes.first()?.1,
            &texture_format,
        );

        Some(PinsComponent {
            meshes,
            material_component,
            render_pipeline_component,
        })
    }

    /// Pushes every marker's current placement and orientation to its model
    /// matrix buffer.
    pub fn write_model_matrices(queue: &wgpu::Queue, pins: &PinsComponent, scene: &Scene) {
        for (entity, mesh) in pins.meshes.iter() {
            let (Some(placement), Some(billboard)) = (
                scene.world.get::<Placement>(*entity),
                scene.world.get::<Billboard>(*entity),
            ) else {
                continue;
            };
            MeshSystem::write_model_matrix(
                queue,
                mesh,
                BillboardSystem::model_matrix(placement, billboard),
            );
        }
    }
}

fn sphere_pipeline(
    device: &wgpu::Device,
    layouts: &[&wgpu::BindGroupLayout],
    shader: &wgpu::ShaderModule,
    texture_format: wgpu::TextureFormat,
    cull_mode: wgpu::Face,
    label: &str,
) -> RenderPipelineComponent {
    let render_pipeline_layout = SphereRenderPipelineSystem::layout_desc(device, layouts, label);
    let render_pipeline = SphereRenderPipelineSystem::pipeline_desc(
        device,
        &render_pipeline_layout,
        shader,
        texture_format,
        cull_mode,
        label,
    );
    RenderPipelineComponent {
        render_pipeline,
        render_pipeline_layout,
    }
}
