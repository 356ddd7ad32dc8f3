#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    pinsphere::run().await;
}

// the browser build starts through wasm_bindgen(start) in the library
#[cfg(target_arch = "wasm32")]
fn main() {}
