use anyhow::Context;

use super::material::{MaterialSystem, RgbaImage};

pub struct AssetSystem {}

impl AssetSystem {
    pub fn is_remote(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn load_bytes(source: &str) -> anyhow::Result<Vec<u8>> {
        if AssetSystem::is_remote(source) {
            let response = reqwest::get(source)
                .await
                .with_context(|| format!("requesting {source}"))?
                .error_for_status()
                .with_context(|| format!("fetching {source}"))?;
            let bytes = response
                .bytes()
                .await
                .with_context(|| format!("reading body of {source}"))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(source)
                .await
                .with_context(|| format!("reading {source}"))
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn load_bytes(source: &str) -> anyhow::Result<Vec<u8>> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let js_error = |e: wasm_bindgen::JsValue| anyhow::anyhow!("{source}: {e:?}");

        let mut opts = web_sys::RequestInit::new();
        opts.method("GET");
        opts.mode(web_sys::RequestMode::Cors);

        let request = web_sys::Request::new_with_str_and_init(source, &opts).map_err(js_error)?;
        let window = web_sys::window().context("no browser window")?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: web_sys::Response = response.dyn_into().map_err(js_error)?;
        if !response.ok() {
            anyhow::bail!("fetching {source}: HTTP {}", response.status());
        }

        let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    pub async fn load_image(source: &str) -> anyhow::Result<RgbaImage> {
        let bytes = AssetSystem::load_bytes(source).await?;
        MaterialSystem::decode_image(&bytes).with_context(|| format!("decoding {source}"))
    }

    /// Loads an image, handing back `fallback()` when anything goes wrong so a
    /// missing texture never stops the globe from rendering.
    pub async fn load_image_or(source: &str, fallback: impl FnOnce() -> RgbaImage) -> RgbaImage {
        match AssetSystem::load_image(source).await {
            Ok(image) => {
                tracing::info!(source, width = image.width(), height = image.height(), "loaded texture");
                image
            }
            Err(error) => {
                tracing::warn!(source, error = %format!("{error:#}"), "texture failed to load, using fallback");
                fallback()
            }
        }
    }
}
