#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod app;
mod app_router;
mod boot;
mod dom_surface;
mod puzzle_image;

fn main() {
    #[cfg(target_arch = "wasm32")]
    app::run();
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("puzzledrop runs in the browser; build it for wasm32-unknown-unknown (trunk serve)");
}
