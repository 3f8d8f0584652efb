// The page logic only runs in the browser; native builds exist to host tests.
#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod app;
mod cards;
mod config;
mod contact;
mod decorations;
mod logging;
mod modal;
mod nav;
mod notification;
mod page;
mod scroll_effects;
mod smooth_scroll;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(test)]
mod mock_page;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
