use super::marker::MarkerInfo;

/// What the hover overlay should currently look like. Positions are in
/// logical pixels relative to the canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Popup {
    pub visible: bool,
    pub left: f32,
    pub top: f32,
    pub label: String,
    pub image: String,
}

impl Popup {
    pub fn show(&mut self, info: &MarkerInfo, x: f32, y: f32, offset: f32) {
        self.visible = true;
        // offset so the cursor doesn't cover the popup
        self.left = x + offset;
        self.top = y + offset;
        self.label.clone_from(&info.label);
        self.image.clone_from(&info.image_ref);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn inner_html(&self) -> String {
        format!(
            "<div style=\"position: relative; border: 1px solid lightblue; padding: 5px; display: inline-block;\">\
             <img src=\"{image}\" alt=\"{label}\" style=\"width: 180px; height: auto; border: 2px solid lightblue;\">\
             <h3>{label}</h3>\
             </div>",
            image = self.image,
            label = self.label,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> MarkerInfo {
        MarkerInfo {
            label: "London".into(),
            image_ref: "images/london.jpeg".into(),
        }
    }

    #[test]
    fn show_offsets_from_the_pointer() {
        let mut popup = Popup::default();
        popup.show(&london(), 100.0, 40.0, 10.0);
        assert!(popup.visible);
        assert_eq!((popup.left, popup.top), (110.0, 50.0));
        assert_eq!(popup.label, "London");
    }

    #[test]
    fn hide_keeps_last_content() {
        let mut popup = Popup::default();
        popup.show(&london(), 0.0, 0.0, 10.0);
        popup.hide();
        assert!(!popup.visible);
        assert_eq!(popup.image, "images/london.jpeg");
    }

    #[test]
    fn html_carries_label_and_image() {
        let mut popup = Popup::default();
        popup.show(&london(), 0.0, 0.0, 10.0);
        let html = popup.inner_html();
        assert!(html.contains("<h3>London</h3>"));
        assert!(html.contains("src=\"images/london.jpeg\""));
        assert!(html.contains("width: 180px"));
    }
}
