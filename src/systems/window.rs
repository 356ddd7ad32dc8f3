use cgmath::{EuclideanSpace, InnerSpace, SquareMatrix, Vector3, Vector4};

use crate::components::{
    camera::Camera,
    marker::{Billboard, Placement},
};

use super::geospatial::coordinates::CoordinatesSystem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

pub struct WindowSystem {}

impl WindowSystem {
    /// Pixel position (origin top left) to normalized device coordinates.
    pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
        (
            (x / width.max(1.0)) * 2.0 - 1.0,
            1.0 - (y / height.max(1.0)) * 2.0,
        )
    }

    /// World space ray under a pixel. `None` when the camera matrix can't be
    /// inverted (zero sized viewport, eye on target).
    pub fn ray_from_screen(
        camera: &Camera,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Option<Ray> {
        let (ndc_x, ndc_y) = WindowSystem::screen_to_ndc(x, y, width, height);
        let inverse = camera.build_view_projection_matrix().invert()?;

        // wgpu depth is 0 at the near plane, unproject there and shoot from the eye
        let near = inverse * Vector4::new(ndc_x, ndc_y, 0.0, 1.0);
        if near.w == 0.0 {
            return None;
        }
        let near = near.truncate() / near.w;

        let origin = camera.eye.to_vec();
        let direction = near - origin;
        if direction.magnitude2() == 0.0 {
            return None;
        }

        Some(Ray {
            origin,
            direction: direction.normalize(),
        })
    }

    /// Distance along the ray to the first hit on a sphere centred on the
    /// origin, ignoring hits behind the ray origin.
    pub fn intersect_sphere(ray: &Ray, radius: f32) -> Option<f32> {
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.origin.dot(ray.direction);
        let c = ray.origin.dot(ray.origin) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let discriminant_sqrt = discriminant.sqrt();
        let t1 = (-b - discriminant_sqrt) / (2.0 * a);
        let t2 = (-b + discriminant_sqrt) / (2.0 * a);

        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Latitude/longitude of the point the ray first touches on the globe.
    pub fn globe_coordinates(ray: &Ray, radius: f32) -> Option<(f64, f64)> {
        let t = WindowSystem::intersect_sphere(ray, radius)?;
        let hit = ray.at(t).map(f64::from);
        Some(CoordinatesSystem::cartesian_to_lat_lon(hit))
    }

    /// Distance along the ray to a marker's quad, `None` on a miss. Quads are
    /// double sided.
    pub fn intersect_billboard(ray: &Ray, placement: &Placement, billboard: &Billboard) -> Option<f32> {
        let center = placement.position_f32();
        let normal = billboard.orientation * Vector3::unit_z();

        let denominator = ray.direction.dot(normal);
        if denominator.abs() < 1e-8 {
            return None;
        }

        let t = (center - ray.origin).dot(normal) / denominator;
        if t < 0.0 {
            return None;
        }

        let local = billboard.orientation.conjugate() * (ray.at(t) - center);
        let [width, height] = billboard.size;
        if local.x.abs() <= width / 2.0 && local.y.abs() <= height / 2.0 {
            Some(t)
        } else {
            None
        }
    }

    /// Nearest marker under the ray.
    pub fn pick_marker<'a, K>(
        ray: &Ray,
        markers: impl IntoIterator<Item = (K, &'a Placement, &'a Billboard)>,
    ) -> Option<K> {
        markers
            .into_iter()
            .filter_map(|(key, placement, billboard)| {
                WindowSystem::intersect_billboard(ray, placement, billboard).map(|t| (t, key))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, key)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use cgmath::Quaternion;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), WIDTH as u32, HEIGHT as u32)
    }

    fn facing_camera_at(z: f64) -> (Placement, Billboard) {
        (
            Placement {
                position: Vector3::new(0.0, 0.0, z),
                sphere_radius: z.abs(),
            },
            Billboard {
                orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
                size: [0.05, 0.1],
            },
        )
    }

    #[test]
    fn screen_corners_map_to_ndc_corners() {
        assert_eq!(WindowSystem::screen_to_ndc(0.0, 0.0, WIDTH, HEIGHT), (-1.0, 1.0));
        assert_eq!(WindowSystem::screen_to_ndc(WIDTH, HEIGHT, WIDTH, HEIGHT), (1.0, -1.0));
        assert_eq!(WindowSystem::screen_to_ndc(400.0, 300.0, WIDTH, HEIGHT), (0.0, 0.0));
    }

    #[test]
    fn centre_ray_looks_down_negative_z() {
        let ray = WindowSystem::ray_from_screen(&camera(), 400.0, 300.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        assert!((ray.direction.z + 1.0).abs() < 1e-4, "{:?}", ray.direction);
        assert!(ray.direction.x.abs() < 1e-4);
        assert!(ray.direction.y.abs() < 1e-4);
    }

    #[test]
    fn centre_ray_hits_the_front_of_the_globe() {
        let ray = WindowSystem::ray_from_screen(&camera(), 400.0, 300.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        let t = WindowSystem::intersect_sphere(&ray, 1.0).expect("globe is in view");
        assert!((ray.at(t).z - 1.0).abs() < 1e-3);

        let (lat, lon) = WindowSystem::globe_coordinates(&ray, 1.0).expect("globe is in view");
        assert!(lat.abs() < 0.1, "lat = {lat}");
        assert!((lon + 90.0).abs() < 0.1, "lon = {lon}");
    }

    #[test]
    fn corner_ray_misses_the_globe() {
        let ray = WindowSystem::ray_from_screen(&camera(), 0.0, 0.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        assert!(WindowSystem::intersect_sphere(&ray, 1.0).is_none());
    }

    #[test]
    fn ray_from_inside_hits_the_far_wall() {
        let ray = Ray {
            origin: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(1.0, 0.0, 0.0),
        };
        assert_eq!(WindowSystem::intersect_sphere(&ray, 50.0), Some(50.0));
    }

    #[test]
    fn billboard_under_the_pointer_is_hit() {
        let ray = WindowSystem::ray_from_screen(&camera(), 400.0, 300.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        let (placement, billboard) = facing_camera_at(1.03);
        let t = WindowSystem::intersect_billboard(&ray, &placement, &billboard).expect("hit");
        assert!((ray.at(t).z - 1.03).abs() < 1e-4);
    }

    #[test]
    fn billboard_beside_the_pointer_is_missed() {
        let ray = WindowSystem::ray_from_screen(&camera(), 500.0, 300.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        let (placement, billboard) = facing_camera_at(1.03);
        assert!(WindowSystem::intersect_billboard(&ray, &placement, &billboard).is_none());
    }

    #[test]
    fn edge_on_billboard_is_missed() {
        let ray = Ray {
            origin: Vector3::new(0.0, 0.0, 3.0),
            direction: Vector3::new(1.0, 0.0, 0.0),
        };
        let (placement, billboard) = facing_camera_at(1.03);
        assert!(WindowSystem::intersect_billboard(&ray, &placement, &billboard).is_none());
    }

    #[test]
    fn pick_prefers_the_nearest_marker() {
        let ray = WindowSystem::ray_from_screen(&camera(), 400.0, 300.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        let (far_placement, far_billboard) = facing_camera_at(-1.03);
        let (near_placement, near_billboard) = facing_camera_at(1.03);
        let picked = WindowSystem::pick_marker(
            &ray,
            [
                ("far", &far_placement, &far_billboard),
                ("near", &near_placement, &near_billboard),
            ],
        );
        assert_eq!(picked, Some("near"));
    }

    #[test]
    fn pick_with_nothing_under_the_pointer() {
        let ray = WindowSystem::ray_from_screen(&camera(), 10.0, 10.0, WIDTH, HEIGHT)
            .expect("camera inverts");
        let (placement, billboard) = facing_camera_at(1.03);
        let picked = WindowSystem::pick_marker(&ray, [(0usize, &placement, &billboard)]);
        assert_eq!(picked, None);
    }

    #[test]
    fn off_centre_ray_passes_through_the_point_drawn_there() {
        let camera = camera();
        let point = Vector3::new(0.4, 0.3, 0.9);
        let clip = camera.build_view_projection_matrix() * point.extend(1.0);
        let x = (clip.x / clip.w + 1.0) / 2.0 * WIDTH;
        let y = (1.0 - clip.y / clip.w) / 2.0 * HEIGHT;

        let ray = WindowSystem::ray_from_screen(&camera, x, y, WIDTH, HEIGHT).expect("camera inverts");
        let expected = (point - camera.eye.to_vec()).normalize();
        assert!((ray.direction - expected).magnitude() < 1e-4, "{:?} vs {:?}", ray.direction, expected);
    }
}

