use bevy_ecs::component::Component;
use cgmath::{Quaternion, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a marker sits. `position` is always `sphere_radius` away from the
/// globe centre.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f64>,
    pub sphere_radius: f64,
}

impl Placement {
    pub fn position_f32(&self) -> Vector3<f32> {
        self.position.map(|c| c as f32)
    }
}

/// Orientation of a flat marker. The quad's local +Z is its face.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    pub orientation: Quaternion<f32>,
    pub size: [f32; 2],
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct MarkerInfo {
    pub label: String,
    pub image_ref: String,
}
