//! Error Types
//!
//! This module defines the error types used throughout the renderer and the
//! offline prefilter tool.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers:
//! - GPU initialization failures (adapter, device, surface)
//! - Shader compilation and pipeline validation failures
//! - Asset loading, decoding and encoding errors
//! - Scene file parsing errors
//! - Command-line input errors of the bundled binaries
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, UmbraError>`.
//!
//! ```rust,ignore
//! use umbra::errors::{UmbraError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the renderer.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Failed to acquire the next swapchain texture.
    #[error("Surface error: {0}")]
    SurfaceError(#[from] wgpu::SurfaceError),

    /// A shader module or pipeline failed wgpu validation.
    #[error("Shader '{label}' failed to build: {message}")]
    Shader {
        /// Label of the module or pipeline being built
        label: String,
        /// Validation message reported by wgpu
        message: String,
    },

    /// Mapping a readback buffer failed.
    #[error("GPU readback failed: {0}")]
    Readback(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    /// Window creation error (winit).
    #[cfg(feature = "winit")]
    #[error("Window creation error: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// Writing an image file failed.
    #[error("Failed to write image {path}: {message}")]
    ImageEncodeError {
        /// Destination path
        path: PathBuf,
        /// Encoder message
        message: String,
    },

    /// Cube map validation error.
    #[error("Cube map error: {0}")]
    CubeMapError(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// Scene file syntax or schema error.
    #[error("Scene file error at line {line}: {message}")]
    SceneParse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid command-line input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for UmbraError {
    fn from(err: image::ImageError) -> Self {
        UmbraError::ImageDecodeError(err.to_string())
    }
}

impl From<wgpu::BufferAsyncError> for UmbraError {
    fn from(err: wgpu::BufferAsyncError) -> Self {
        UmbraError::Readback(err.to_string())
    }
}

impl From<wgpu::PollError> for UmbraError {
    fn from(err: wgpu::PollError) -> Self {
        UmbraError::Readback(format!("device poll failed: {err}"))
    }
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
