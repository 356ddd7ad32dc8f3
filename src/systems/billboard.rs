use bevy_ecs::prelude::{Query, Res, Resource};
use cgmath::{InnerSpace, Matrix3, Quaternion, Vector3};
use image::{ImageBuffer, Rgba};

use crate::{
    components::{
        camera::CameraComponent,
        marker::{Billboard, Placement},
        material::MaterialComponent,
        mesh::MeshComponent,
        render_pipelines::RenderPipelineComponent,
    },
    matrix4_to_array,
};

use super::{material::MaterialSystem, mesh::MeshSystem, pipelines::BillboardRenderPipelineSystem};

const DEGENERATE: f32 = 1e-12;

/// The point every billboard turns towards this frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint(pub Vector3<f32>);

pub struct BillboardSystem {}

impl BillboardSystem {
    /// Rotation taking local +Z onto the direction from `position` to
    /// `viewpoint`, keeping local +Y as close to world +Y as it can.
    /// `current` is returned when there is no direction to face.
    pub fn face_point(
        position: Vector3<f32>,
        viewpoint: Vector3<f32>,
        current: Quaternion<f32>,
    ) -> Quaternion<f32> {
        let to_viewpoint = viewpoint - position;
        if to_viewpoint.magnitude2() < DEGENERATE {
            return current;
        }
        let forward = to_viewpoint.normalize();

        let mut right = Vector3::unit_y().cross(forward);
        if right.magnitude2() < DEGENERATE {
            // looking straight up or down, pick another reference
            right = Vector3::unit_z().cross(forward);
        }
        let right = right.normalize();
        let up = forward.cross(right);

        Quaternion::from(Matrix3::from_cols(right, up, forward)).normalize()
    }

    pub fn update<'a>(
        markers: impl IntoIterator<Item = (&'a Placement, &'a mut Billboard)>,
        viewpoint: Vector3<f32>,
    ) {
        for (placement, billboard) in markers {
            billboard.orientation = BillboardSystem::face_point(
                placement.position_f32(),
                viewpoint,
                billboard.orientation,
            );
        }
    }

    pub fn model_matrix(placement: &Placement, billboard: &Billboard) -> [[f32; 4]; 4] {
        matrix4_to_array(
            cgmath::Matrix4::from_translation(placement.position_f32())
                * cgmath::Matrix4::from(billboard.orientation),
        )
    }

    pub fn create_billboard_mesh(
        device: &wgpu::Device,
        placement: &Placement,
        billboard: &Billboard,
    ) -> MeshComponent {
        let [width, height] = billboard.size;
        let (billboard_vertices_vec, billboard_indices_vec) =
            MeshSystem::generate_square_mesh(width, height);

        MeshSystem::create_mesh_component(
            device,
            billboard_vertices_vec.as_slice(),
            billboard_indices_vec.as_slice(),
            BillboardSystem::model_matrix(placement, billboard),
        )
    }

    pub fn create_billboard_material(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: ImageBuffer<Rgba<u8>, Vec<u8>>,
    ) -> MaterialComponent {
        let (material_bind_group, material_bind_group_layout) =
            MaterialSystem::create_2d_texture(device, queue, image, "Pin");
        MaterialComponent {
            bind_group: material_bind_group,
            bind_group_layout: material_bind_group_layout,
            shader: device
                .create_shader_module(wgpu::include_wgsl!("../shaders/billboard_shader.wgsl")),
        }
    }

    pub fn create_render_pipeline(
        device: &wgpu::Device,
        camera: &CameraComponent,
        material: &MaterialComponent,
        mesh: &MeshComponent,
        texture_format: &wgpu::TextureFormat,
    ) -> RenderPipelineComponent {
        let billboard_pipeline_layouts: &[&wgpu::BindGroupLayout] = &[
            &camera.camera_bind_group_layout,
            &material.bind_group_layout,
            &mesh.model_matrix_bind_group_layout,
        ];
        let billboard_render_pipeline_layout =
            BillboardRenderPipelineSystem::layout_desc(device, billboard_pipeline_layouts);
        let billboard_render_pipeline = BillboardRenderPipelineSystem::pipeline_desc(
            device,
            &billboard_render_pipeline_layout,
            &material.shader,
            texture_format,
        );
        RenderPipelineComponent {
            render_pipeline: billboard_render_pipeline,
            render_pipeline_layout: billboard_render_pipeline_layout,
        }
    }
}

/// Turns every marker towards the current [`Viewpoint`].
pub fn billboard_system(viewpoint: Res<Viewpoint>, mut markers: Query<(&Placement, &mut Billboard)>) {
    for (placement, mut billboard) in markers.iter_mut() {
        let orientation =
            BillboardSystem::face_point(placement.position_f32(), viewpoint.0, billboard.orientation);
        // skip the write so change detection only fires on real motion
        if orientation != billboard.orientation {
            billboard.orientation = orientation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn identity() -> Quaternion<f32> {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    fn placement(x: f64, y: f64, z: f64) -> Placement {
        Placement {
            position: Vector3::new(x, y, z),
            sphere_radius: (x * x + y * y + z * z).sqrt(),
        }
    }

    fn billboard() -> Billboard {
        Billboard {
            orientation: identity(),
            size: [0.05, 0.1],
        }
    }

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < EPSILON, "{a:?} != {b:?}");
    }

    #[test]
    fn forward_axis_points_at_the_viewpoint() {
        let position = Vector3::new(0.3, 0.8, 0.6);
        let viewpoint = Vector3::new(-1.0, 0.5, 2.5);
        let q = BillboardSystem::face_point(position, viewpoint, identity());
        assert_close(q * Vector3::unit_z(), (viewpoint - position).normalize());
    }

    #[test]
    fn up_axis_stays_upright() {
        let q = BillboardSystem::face_point(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 3.0),
            identity(),
        );
        assert_close(q * Vector3::unit_y(), Vector3::unit_y());
        assert_close(q * Vector3::unit_x(), Vector3::unit_x());
    }

    #[test]
    fn viewpoint_on_the_marker_keeps_orientation() {
        let current = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let position = Vector3::new(0.0, 1.03, 0.0);
        assert_eq!(BillboardSystem::face_point(position, position, current), current);
    }

    #[test]
    fn viewpoint_straight_above_still_faces_it() {
        let position = Vector3::new(0.0, 1.03, 0.0);
        let viewpoint = Vector3::new(0.0, 3.0, 0.0);
        let q = BillboardSystem::face_point(position, viewpoint, identity());
        assert_close(q * Vector3::unit_z(), Vector3::unit_y());
    }

    #[test]
    fn update_is_idempotent() {
        let placements = vec![placement(0.0, 0.0, 1.03), placement(0.5, 0.7, -0.6)];
        let mut billboards = vec![billboard(), billboard()];
        let viewpoint = Vector3::new(0.4, 1.2, 2.1);

        BillboardSystem::update(placements.iter().zip(billboards.iter_mut()), viewpoint);
        let first: Vec<_> = billboards.iter().map(|b| b.orientation).collect();

        BillboardSystem::update(placements.iter().zip(billboards.iter_mut()), viewpoint);
        let second: Vec<_> = billboards.iter().map(|b| b.orientation).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn ecs_system_turns_every_marker() {
        let mut world = bevy_ecs::world::World::new();
        let viewpoint = Vector3::new(0.0, 0.0, 2.5);
        world.insert_resource(Viewpoint(viewpoint));
        let entity = world.spawn((placement(1.03, 0.0, 0.0), billboard())).id();

        let mut schedule = bevy_ecs::schedule::Schedule::default();
        schedule.add_systems(billboard_system);
        schedule.run(&mut world);

        let q = world
            .get::<Billboard>(entity)
            .expect("marker keeps its billboard")
            .orientation;
        let expected = (viewpoint - Vector3::new(1.03, 0.0, 0.0)).normalize();
        assert_close(q * Vector3::unit_z(), expected);
    }

    #[test]
    fn model_matrix_translates_to_the_placement() {
        let placement = placement(0.1, 0.2, 1.0);
        let m = BillboardSystem::model_matrix(&placement, &billboard());
        assert!((m[3][0] - 0.1).abs() < EPSILON);
        assert!((m[3][1] - 0.2).abs() < EPSILON);
        assert!((m[3][2] - 1.0).abs() < EPSILON);
    }
}
