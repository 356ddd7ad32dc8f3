use super::{
    material::MaterialComponent, mesh::MeshComponent, render_pipelines::RenderPipelineComponent,
};

pub struct GlobeComponent {
    pub mesh_component: MeshComponent,
    pub material_component: MaterialComponent,
    pub render_pipeline_component: RenderPipelineComponent,
    pub lighting_bind_group: wgpu::BindGroup,
}

pub struct SkyboxComponent {
    pub mesh_component: MeshComponent,
    pub material_component: MaterialComponent,
    pub render_pipeline_component: RenderPipelineComponent,
}

/// Pins share one material and pipeline, each pin has its own mesh so it can
/// carry its own model matrix.
pub struct PinsComponent {
    pub meshes: Vec<(bevy_ecs::entity::Entity, MeshComponent)>,
    pub material_component: MaterialComponent,
    pub render_pipeline_component: RenderPipelineComponent,
}
