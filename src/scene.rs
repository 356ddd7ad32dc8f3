use bevy_ecs::{entity::Entity, schedule::Schedule, world::World};
use cgmath::{EuclideanSpace, Quaternion, Vector3};

use crate::{
    components::{
        camera::{Camera, OrbitController},
        marker::{Billboard, GeoPoint, MarkerInfo, Placement},
        popup::Popup,
    },
    config::GlobeConfig,
    systems::{
        billboard::{billboard_system, BillboardSystem, Viewpoint},
        geospatial::coordinates::CoordinatesSystem,
        window::{Ray, WindowSystem},
    },
};

/// Everything the render loop and the input handlers share. Owned by
/// `State`, handed out by reference.
pub struct Scene {
    pub world: World,
    pub camera: Camera,
    pub controls: OrbitController,
    pub popup: Popup,
    pub globe_radius: f32,
    pub popup_offset: f32,
    schedule: Schedule,
}

impl Scene {
    pub fn new(config: &GlobeConfig, width: u32, height: u32) -> Self {
        let mut world = World::new();
        let camera = Camera::new(&config.camera, width, height);
        world.insert_resource(Viewpoint(camera.eye.to_vec()));

        for location in &config.locations {
            let placement = CoordinatesSystem::place(
                GeoPoint {
                    latitude: location.lat,
                    longitude: location.lon,
                },
                config.pin_radius,
            );
            // pins start out facing the globe centre until the first frame
            // turns them to the camera
            let orientation = BillboardSystem::face_point(
                placement.position_f32(),
                Vector3::new(0.0, 0.0, 0.0),
                Quaternion::new(1.0, 0.0, 0.0, 0.0),
            );
            world.spawn((
                placement,
                Billboard {
                    orientation,
                    size: config.pin_size,
                },
                MarkerInfo {
                    label: location.name.to_string(),
                    image_ref: location.image.to_string(),
                },
            ));
            tracing::debug!(name = location.name, lat = location.lat, lon = location.lon, "placed marker");
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(billboard_system);

        Self {
            world,
            camera,
            controls: OrbitController::new(&config.controls),
            popup: Popup::default(),
            globe_radius: config.globe_radius,
            popup_offset: config.popup_offset,
            schedule,
        }
    }

    /// One frame of scene logic: move the camera, then turn the pins to it.
    pub fn update(&mut self) {
        self.controls.update_camera(&mut self.camera);
        self.world
            .insert_resource(Viewpoint(self.camera.eye.to_vec()));
        self.schedule.run(&mut self.world);
    }

    pub fn markers(&mut self) -> Vec<(Entity, Placement, Billboard)> {
        let mut query = self.world.query::<(Entity, &Placement, &Billboard)>();
        query
            .iter(&self.world)
            .map(|(entity, placement, billboard)| (entity, *placement, *billboard))
            .collect()
    }

    pub fn marker_info(&self, entity: Entity) -> Option<&MarkerInfo> {
        self.world.get::<MarkerInfo>(entity)
    }

    pub fn ray_at(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        WindowSystem::ray_from_screen(&self.camera, x, y, width, height)
    }

    /// The marker under a screen position, nearest first.
    pub fn hovered_marker(&mut self, x: f32, y: f32, width: f32, height: f32) -> Option<Entity> {
        let ray = self.ray_at(x, y, width, height)?;
        let markers = self.markers();
        WindowSystem::pick_marker(
            &ray,
            markers
                .iter()
                .map(|(entity, placement, billboard)| (*entity, placement, billboard)),
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = Camera::aspect_ratio(width, height);
    }
}
