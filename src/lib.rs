#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Birthday bouquet page: a drifting particle background and a spinning 3D
//! bouquet on two canvases, started and stopped with page visibility.
//!
//! Everything outside [`wasm`] is plain Rust and is tested on the host.

pub mod activation;
pub mod animation;
pub mod camera;
pub mod celebration;
pub mod config;
mod error;
pub mod gesture;
pub mod lifecycle;
pub mod loader;
pub mod mesh;
pub mod particles;

pub use error::{Error, Result};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
