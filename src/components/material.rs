pub struct MaterialComponent {
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub shader: wgpu::ShaderModule,
}
