//! Every tunable of the globe lives here. `GlobeConfig::default()` is the
//! stock scene; nothing reads globals.

/// A literal location record, the input the pins are built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub name: &'static str,
    pub image: &'static str,
}

pub const LOCATIONS: [Location; 5] = [
    Location {
        lat: 40.7128,
        lon: -74.0060,
        name: "New York",
        image: "images/newyork.jpg",
    },
    Location {
        lat: 51.5074,
        lon: -0.1278,
        name: "London",
        image: "images/london.jpeg",
    },
    Location {
        lat: 35.6762,
        lon: 139.6503,
        name: "Tokyo",
        image: "images/tokyo.jpeg",
    },
    Location {
        lat: 43.2965,
        lon: 5.3698,
        name: "Marseille",
        image: "images/marseille.jpeg",
    },
    Location {
        lat: -28.0167,
        lon: 153.4000,
        name: "Gold Coast",
        image: "images/goldcoast.jpeg",
    },
];

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 2.5],
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlsConfig {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 0.5,
            zoom_speed: 1.0,
            min_distance: 1.5,
            max_distance: 4.0,
        }
    }
}

/// Where the three textures come from. Paths are relative to the page on web
/// and to the working directory on native; `http(s)://` works on both.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    pub globe: String,
    pub skybox: String,
    pub pin: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            globe: "https://threejs.org/examples/textures/land_ocean_ice_cloud_2048.jpg".into(),
            skybox: "images/galaxy3.png".into(),
            pin: "images/placeholder.png".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GlobeConfig {
    pub globe_radius: f32,
    pub globe_segments: u32,
    /// Pins sit slightly above the surface so they never sink into it.
    pub pin_radius: f64,
    pub pin_size: [f32; 2],
    pub skybox_radius: f32,
    pub skybox_segments: u32,
    /// `0x404040` at intensity 3.5.
    pub ambient_light: [f32; 4],
    pub popup_offset: f32,
    pub container_id: String,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub textures: TextureConfig,
    pub locations: Vec<Location>,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        let ambient = (64.0 / 255.0) * 3.5;
        Self {
            globe_radius: 1.0,
            globe_segments: 64,
            pin_radius: 1.03,
            pin_size: [0.05, 0.1],
            skybox_radius: 50.0,
            skybox_segments: 64,
            ambient_light: [ambient, ambient, ambient, 1.0],
            popup_offset: 10.0,
            container_id: "scene-container".into(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            textures: TextureConfig::default(),
            locations: LOCATIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_float_above_the_globe() {
        let config = GlobeConfig::default();
        assert!(config.pin_radius > config.globe_radius as f64);
    }

    #[test]
    fn default_config_carries_all_locations_in_order() {
        let config = GlobeConfig::default();
        let names: Vec<_> = config.locations.iter().map(|l| l.name).collect();
        assert_eq!(
            names,
            vec!["New York", "London", "Tokyo", "Marseille", "Gold Coast"]
        );
    }

    #[test]
    fn camera_starts_inside_the_distance_clamp() {
        let config = GlobeConfig::default();
        let eye = config.camera.eye;
        let distance = (eye[0] * eye[0] + eye[1] * eye[1] + eye[2] * eye[2]).sqrt();
        assert!(distance >= config.controls.min_distance);
        assert!(distance <= config.controls.max_distance);
    }
}
