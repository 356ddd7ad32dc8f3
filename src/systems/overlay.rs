use crate::components::popup::Popup;

/// Somewhere to show the hover popup.
pub trait Overlay {
    fn present(&mut self, popup: &Popup);
}

/// Native builds have no DOM, popups are reported through tracing instead.
/// Only transitions are logged, not every pointer move.
#[derive(Debug, Default)]
pub struct LogOverlay {
    showing: Option<String>,
}

impl LogOverlay {
    pub fn showing(&self) -> Option<&str> {
        self.showing.as_deref()
    }
}

impl Overlay for LogOverlay {
    fn present(&mut self, popup: &Popup) {
        if popup.visible {
            if self.showing.as_deref() != Some(popup.label.as_str()) {
                tracing::info!(label = %popup.label, image = %popup.image, x = popup.left, y = popup.top, "showing popup");
                self.showing = Some(popup.label.clone());
            }
        } else if let Some(label) = self.showing.take() {
            tracing::info!(%label, "hiding popup");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomOverlay;

#[cfg(target_arch = "wasm32")]
mod dom {
    use anyhow::Context;

    use super::Overlay;
    use crate::components::popup::Popup;

    const POPUP_STYLE: &str = "position: absolute; background-color: white; padding: 10px; \
        border: 2px solid lightblue; border-radius: 5px; font-family: Roboto, sans-serif; \
        box-sizing: border-box; z-index: 1000;";

    /// Absolutely positioned `div` on top of the canvas.
    pub struct DomOverlay {
        element: web_sys::Element,
        canvas: web_sys::Element,
    }

    impl DomOverlay {
        pub fn new(canvas: web_sys::Element) -> anyhow::Result<Self> {
            let document = web_sys::window()
                .and_then(|win| win.document())
                .context("no document")?;
            let element = document
                .create_element("div")
                .map_err(|e| anyhow::anyhow!("creating popup element: {e:?}"))?;
            element
                .set_attribute("style", &format!("{POPUP_STYLE} display: none;"))
                .map_err(|e| anyhow::anyhow!("styling popup element: {e:?}"))?;
            document
                .body()
                .context("document has no body")?
                .append_child(&element)
                .map_err(|e| anyhow::anyhow!("attaching popup element: {e:?}"))?;

            Ok(Self { element, canvas })
        }
    }

    impl Overlay for DomOverlay {
        fn present(&mut self, popup: &Popup) {
            let style = if popup.visible {
                // popup coordinates are canvas relative, the div lives in the page
                let rect = self.canvas.get_bounding_client_rect();
                let (scroll_x, scroll_y) = web_sys::window()
                    .map(|win| (win.scroll_x().unwrap_or(0.0), win.scroll_y().unwrap_or(0.0)))
                    .unwrap_or((0.0, 0.0));
                self.element.set_inner_html(&popup.inner_html());
                format!(
                    "{POPUP_STYLE} display: block; left: {}px; top: {}px;",
                    rect.left() + scroll_x + popup.left as f64,
                    rect.top() + scroll_y + popup.top as f64,
                )
            } else {
                format!("{POPUP_STYLE} display: none;")
            };

            if let Err(e) = self.element.set_attribute("style", &style) {
                tracing::warn!(error = ?e, "failed to update popup");
            }
        }
    }
}
