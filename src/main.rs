mod config;
mod logging;

// The native binary only serves the bundle; the page modules build for the
// browser and for tests.
#[cfg(any(target_arch = "wasm32", test))]
mod content;
#[cfg(any(target_arch = "wasm32", test))]
mod face;
#[cfg(any(target_arch = "wasm32", test))]
mod frame_loop;
#[cfg(any(target_arch = "wasm32", test))]
mod hover;
#[cfg(any(target_arch = "wasm32", test))]
mod lifecycle;
#[cfg(any(target_arch = "wasm32", test))]
mod raycast;
#[cfg(any(target_arch = "wasm32", test))]
mod reveal;
#[cfg(any(target_arch = "wasm32", test))]
mod scene;
#[cfg(any(target_arch = "wasm32", test))]
mod visuals;

#[cfg(target_arch = "wasm32")]
mod frontend;
#[cfg(target_arch = "wasm32")]
mod stage;
#[cfg(target_arch = "wasm32")]
mod webgl;

#[cfg(not(target_arch = "wasm32"))]
mod server;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(error) = server::run().await {
        eprintln!("server error: {error}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
