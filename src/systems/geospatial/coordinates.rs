use cgmath::{InnerSpace, Vector3};

use crate::components::marker::{GeoPoint, Placement};

pub struct CoordinatesSystem {}

impl CoordinatesSystem {
    // longitude 0 sits on the back seam and the north pole on +y, which is
    // how the globe mesh lays out its uvs
    pub fn lat_lon_to_cartesian(lat: f64, lon: f64, radius: f64) -> Vector3<f64> {
        let phi = (90.0 - lat).to_radians();
        let theta = (lon + 180.0).to_radians();

        let x = -radius * phi.sin() * theta.cos();
        let z = radius * phi.sin() * theta.sin();
        let y = radius * phi.cos();

        Vector3::new(x, y, z)
    }

    /// Inverse of [`CoordinatesSystem::lat_lon_to_cartesian`]. Longitude comes
    /// back in `(-180, 180]`.
    pub fn cartesian_to_lat_lon(point: Vector3<f64>) -> (f64, f64) {
        let normalized = point.normalize();

        let latitude = 90.0 - normalized.y.clamp(-1.0, 1.0).acos().to_degrees();
        let theta = normalized.z.atan2(-normalized.x).to_degrees();
        let mut longitude = theta - 180.0;
        if longitude <= -180.0 {
            longitude += 360.0;
        }

        (latitude, longitude)
    }

    pub fn place(geo: GeoPoint, radius: f64) -> Placement {
        Placement {
            position: CoordinatesSystem::lat_lon_to_cartesian(geo.latitude, geo.longitude, radius),
            sphere_radius: radius,
        }
    }
}
