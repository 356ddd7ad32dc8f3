use crate::{scene::Scene, systems::overlay::Overlay, systems::window::WindowSystem};

/// The three things the page reacts to. Positions are physical pixels
/// relative to the canvas' top left corner.
pub trait InputHandler {
    fn on_pointer_move(&mut self, scene: &mut Scene, x: f32, y: f32);
    fn on_click(&mut self, scene: &mut Scene, x: f32, y: f32);
    fn on_resize(&mut self, scene: &mut Scene, width: u32, height: u32);
}

/// Hover popups and the (deliberately inert) click handler.
pub struct GlobeController {
    width: u32,
    height: u32,
    scale_factor: f32,
    overlay: Box<dyn Overlay>,
}

impl GlobeController {
    pub fn new(width: u32, height: u32, scale_factor: f32, overlay: Box<dyn Overlay>) -> Self {
        Self {
            width,
            height,
            scale_factor,
            overlay,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl InputHandler for GlobeController {
    fn on_pointer_move(&mut self, scene: &mut Scene, x: f32, y: f32) {
        let (width, height) = self.size();
        scene.controls.drag_to(x, y, height);

        let hovered = scene
            .hovered_marker(x, y, width, height)
            .and_then(|entity| scene.marker_info(entity).cloned());

        match hovered {
            Some(info) => {
                // the overlay works in css pixels
                let offset = scene.popup_offset;
                scene.popup.show(
                    &info,
                    x / self.scale_factor,
                    y / self.scale_factor,
                    offset,
                );
            }
            None => scene.popup.hide(),
        }
        self.overlay.present(&scene.popup);
    }

    fn on_click(&mut self, scene: &mut Scene, x: f32, y: f32) {
        let (width, height) = self.size();
        if let Some(entity) = scene.hovered_marker(x, y, width, height) {
            let label = scene
                .marker_info(entity)
                .map(|info| info.label.as_str())
                .unwrap_or_default();
            tracing::info!(label, "Location clicked, but no action performed.");
            return;
        }

        if let Some((lat, lon)) = scene
            .ray_at(x, y, width, height)
            .and_then(|ray| WindowSystem::globe_coordinates(&ray, scene.globe_radius))
        {
            tracing::debug!(lat, lon, "clicked globe");
        }
    }

    fn on_resize(&mut self, scene: &mut Scene, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        scene.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::popup::Popup, config::GlobeConfig};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<Popup>>>);

    impl Overlay for Recorder {
        fn present(&mut self, popup: &Popup) {
            self.0.borrow_mut().push(popup.clone());
        }
    }

    fn setup() -> (GlobeController, Scene, Recorder) {
        let recorder = Recorder::default();
        let controller = GlobeController::new(800, 600, 1.0, Box::new(recorder.clone()));
        let mut scene = Scene::new(&GlobeConfig::default(), 800, 600);
        scene.update();
        (controller, scene, recorder)
    }

    fn screen_position(scene: &mut Scene, label: &str) -> (f32, f32) {
        let markers = scene.markers();
        let (_, placement, _) = markers
            .iter()
            .find(|(entity, _, _)| scene.marker_info(*entity).is_some_and(|i| i.label == label))
            .expect("marker exists");
        let clip = scene.camera.build_view_projection_matrix() * placement.position_f32().extend(1.0);
        (
            (clip.x / clip.w + 1.0) / 2.0 * 800.0,
            (1.0 - clip.y / clip.w) / 2.0 * 600.0,
        )
    }

    #[test]
    fn hovering_a_marker_shows_its_popup() {
        let (mut controller, mut scene, recorder) = setup();
        let (x, y) = screen_position(&mut scene, "London");

        controller.on_pointer_move(&mut scene, x, y);

        let shown = recorder.0.borrow();
        let popup = shown.last().expect("overlay presented");
        assert!(popup.visible);
        assert_eq!(popup.label, "London");
        assert_eq!(popup.image, "images/london.jpeg");
        assert!((popup.left - (x + 10.0)).abs() < 1e-4);
        assert!((popup.top - (y + 10.0)).abs() < 1e-4);
    }

    #[test]
    fn moving_off_a_marker_hides_the_popup() {
        let (mut controller, mut scene, recorder) = setup();
        let (x, y) = screen_position(&mut scene, "London");

        controller.on_pointer_move(&mut scene, x, y);
        controller.on_pointer_move(&mut scene, 3.0, 3.0);

        let shown = recorder.0.borrow();
        assert_eq!(shown.len(), 2);
        assert!(!shown[1].visible);
    }

    #[test]
    fn popup_position_is_in_css_pixels() {
        let recorder = Recorder::default();
        let mut controller = GlobeController::new(800, 600, 2.0, Box::new(recorder.clone()));
        let mut scene = Scene::new(&GlobeConfig::default(), 800, 600);
        scene.update();
        let (x, y) = screen_position(&mut scene, "Marseille");

        controller.on_pointer_move(&mut scene, x, y);

        let shown = recorder.0.borrow();
        let popup = shown.last().expect("overlay presented");
        assert!(popup.visible);
        assert!((popup.left - (x / 2.0 + 10.0)).abs() < 1e-4);
    }

    #[test]
    fn click_changes_nothing() {
        let (mut controller, mut scene, recorder) = setup();
        let (x, y) = screen_position(&mut scene, "Tokyo");
        let before = scene.markers();

        controller.on_click(&mut scene, x, y);
        controller.on_click(&mut scene, 400.0, 300.0);

        assert!(recorder.0.borrow().is_empty());
        assert_eq!(scene.popup, Popup::default());
        assert_eq!(scene.markers(), before);
    }

    #[test]
    fn resize_ignores_zero_sizes() {
        let (mut controller, mut scene, _) = setup();
        controller.on_resize(&mut scene, 0, 0);
        assert!((scene.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        controller.on_resize(&mut scene, 1000, 500);
        assert!((scene.camera.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn click_at_the_end_of_a_drag_still_reaches_the_marker() {
        let (mut controller, mut scene, recorder) = setup();
        let (x, y) = screen_position(&mut scene, "London");

        scene.controls.begin_rotate(x - 40.0, y);
        controller.on_pointer_move(&mut scene, x, y);
        scene.controls.end_rotate();
        let presented = recorder.0.borrow().len();

        // the hover under the release point is what the click sees
        assert_eq!(
            scene.hovered_marker(x, y, 800.0, 600.0).and_then(|e| scene.marker_info(e).map(|i| i.label.clone())),
            Some("London".to_string())
        );
        controller.on_click(&mut scene, x, y);
        assert_eq!(recorder.0.borrow().len(), presented);
        assert!(scene.popup.visible);
    }
}

