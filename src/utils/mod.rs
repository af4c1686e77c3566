//! Small helpers for the binaries.
//!
//! - [`FpsCounter`]: frame rate over fixed windows, logged by the viewer

pub mod fps_counter;

pub use fps_counter::FpsCounter;
