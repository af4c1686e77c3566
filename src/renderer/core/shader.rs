//! Shader compilation with explicit error reporting.
//!
//! wgpu reports invalid WGSL and pipeline mismatches asynchronously through
//! the device error callback. Wrapping creation in a validation error scope
//! turns those reports into an `Err` at the call site, so a pass whose shader
//! does not build fails construction instead of drawing garbage.

use std::borrow::Cow;

use crate::errors::{Result, UmbraError};

/// Shared WGSL helpers prepended to every pass shader.
pub const COMMON_WGSL: &str = include_str!("../shaders/common.wgsl");
/// Camera and G-buffer bindings plus `load_surface`, for screen-space lighting.
pub const GBUFFER_WGSL: &str = include_str!("../shaders/gbuffer.wgsl");
/// Hammersley and GGX importance sampling, for the offline bakes.
pub const SAMPLING_WGSL: &str = include_str!("../shaders/sampling.wgsl");

/// Runs `create` inside a validation error scope and returns its result, or
/// the validation error labelled with `label`.
pub fn validated<T>(device: &wgpu::Device, label: &str, create: impl FnOnce() -> T) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(scope.pop()) {
        None => Ok(value),
        Some(error) => {
            log::error!("{label}: {error}");
            Err(UmbraError::Shader {
                label: label.to_string(),
                message: error.to_string(),
            })
        }
    }
}

/// Compiles a pass shader with the common helpers prepended.
pub fn compile(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule> {
    compile_with(device, label, &[], source)
}

/// Like [`compile`], with extra include chunks placed between the common
/// helpers and `source`, in order.
pub fn compile_with(
    device: &wgpu::Device,
    label: &str,
    includes: &[&str],
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let mut code = String::with_capacity(
        COMMON_WGSL.len() + source.len() + includes.iter().map(|s| s.len() + 1).sum::<usize>() + 1,
    );
    code.push_str(COMMON_WGSL);
    for include in includes {
        code.push('\n');
        code.push_str(include);
    }
    code.push('\n');
    code.push_str(source);
    validated(device, label, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(code)),
        })
    })
}
