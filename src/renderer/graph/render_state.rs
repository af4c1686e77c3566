//! Fixed-function pass state.
//!
//! Every pass declares the complete depth/stencil/blend/cull configuration it
//! draws with as a [`PassState`] value. Pipelines are built from these values
//! only, so the state one pass uses can never leak into the next.
//!
//! | Pass                    | Depth        | Stencil                           | Blend    | Cull  |
//! |-------------------------|--------------|-----------------------------------|----------|-------|
//! | Geometry                | Less, write  | Always, replace with marker       | Replace  | Back  |
//! | Sky                     | off          | Equal 0 under marker mask         | Replace  | none  |
//! | Directional / IBL / Emissive | off     | Equal marker under marker mask    | Additive | none  |
//! | Light volume stencil    | Less, no write | back: depth-fail incr, front: depth-fail decr | no color | none |
//! | Light volume shading    | off          | NotEqual 0                        | Additive | Front |
//! | Shadow depth            | Less, write  | off                               | no color | none  |
//! | Post-processing         | no attachment| no attachment                     | Replace  | none  |

use wgpu::{CompareFunction, StencilFaceState, StencilOperation};

const KEEP_ALWAYS: StencilFaceState = StencilFaceState {
    compare: CompareFunction::Always,
    fail_op: StencilOperation::Keep,
    depth_fail_op: StencilOperation::Keep,
    pass_op: StencilOperation::Keep,
};

const fn keep_if(compare: CompareFunction) -> StencilFaceState {
    StencilFaceState {
        compare,
        fail_op: StencilOperation::Keep,
        depth_fail_op: StencilOperation::Keep,
        pass_op: StencilOperation::Keep,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Replace,
    /// `src * 1 + dst * 1`, for light accumulation.
    Additive,
}

impl BlendMode {
    #[must_use]
    pub fn state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Replace => wgpu::BlendState::REPLACE,
            BlendMode::Additive => {
                let add = wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                };
                wgpu::BlendState { color: add, alpha: add }
            }
        }
    }
}

/// Everything a pass needs from the fixed-function stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassState {
    pub depth_compare: CompareFunction,
    pub depth_write: bool,
    pub stencil_front: StencilFaceState,
    pub stencil_back: StencilFaceState,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub stencil_reference: u32,
    pub depth_bias_constant: i32,
    /// `f32` bits, so the state stays `Eq + Hash`.
    pub depth_bias_slope_bits: u32,
    pub blend: BlendMode,
    pub color_writes: bool,
    pub cull: Option<wgpu::Face>,
}

impl PassState {
    /// G-buffer fill: nearest surface wins, covered pixels get the marker.
    pub const GEOMETRY: PassState = PassState {
        depth_compare: CompareFunction::Less,
        depth_write: true,
        stencil_front: StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Replace,
        },
        stencil_back: StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Replace,
        },
        stencil_read_mask: 0xFF,
        stencil_write_mask: 0xFF,
        stencil_reference: 128,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Replace,
        color_writes: true,
        cull: Some(wgpu::Face::Back),
    };

    /// Background only: pixels whose marker bit is clear.
    pub const SKY: PassState = PassState {
        depth_compare: CompareFunction::Always,
        depth_write: false,
        stencil_front: keep_if(CompareFunction::Equal),
        stencil_back: keep_if(CompareFunction::Equal),
        stencil_read_mask: 128,
        stencil_write_mask: 0,
        stencil_reference: 0,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Replace,
        color_writes: true,
        cull: None,
    };

    /// Full-screen accumulation over covered pixels.
    pub const SURFACE_LIGHTING: PassState = PassState {
        depth_compare: CompareFunction::Always,
        depth_write: false,
        stencil_front: keep_if(CompareFunction::Equal),
        stencil_back: keep_if(CompareFunction::Equal),
        stencil_read_mask: 128,
        stencil_write_mask: 0,
        stencil_reference: 128,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Additive,
        color_writes: true,
        cull: None,
    };

    /// Proxy sphere counting pass. After drawing both faces, a pixel holds a
    /// non-zero count iff its surface lies inside the sphere.
    pub const LIGHT_VOLUME_STENCIL: PassState = PassState {
        depth_compare: CompareFunction::Less,
        depth_write: false,
        stencil_front: StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::DecrementWrap,
            pass_op: StencilOperation::Keep,
        },
        stencil_back: StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::IncrementWrap,
            pass_op: StencilOperation::Keep,
        },
        stencil_read_mask: 0xFF,
        stencil_write_mask: 0xFF,
        stencil_reference: 0,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Replace,
        color_writes: false,
        cull: None,
    };

    /// Shading through the back faces of the proxy, so the camera may sit
    /// inside the volume.
    pub const LIGHT_VOLUME_SHADING: PassState = PassState {
        depth_compare: CompareFunction::Always,
        depth_write: false,
        stencil_front: keep_if(CompareFunction::NotEqual),
        stencil_back: keep_if(CompareFunction::NotEqual),
        stencil_read_mask: 0xFF,
        stencil_write_mask: 0,
        stencil_reference: 0,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Additive,
        color_writes: true,
        cull: Some(wgpu::Face::Front),
    };

    /// Depth-only render from a light. Culling is off so thin and open
    /// meshes still cast.
    pub const SHADOW_DEPTH: PassState = PassState {
        depth_compare: CompareFunction::Less,
        depth_write: true,
        stencil_front: KEEP_ALWAYS,
        stencil_back: KEEP_ALWAYS,
        stencil_read_mask: 0,
        stencil_write_mask: 0,
        stencil_reference: 0,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Replace,
        color_writes: false,
        cull: None,
    };

    /// Full-screen image processing without depth or stencil attachments.
    pub const POST: PassState = PassState {
        depth_compare: CompareFunction::Always,
        depth_write: false,
        stencil_front: KEEP_ALWAYS,
        stencil_back: KEEP_ALWAYS,
        stencil_read_mask: 0,
        stencil_write_mask: 0,
        stencil_reference: 0,
        depth_bias_constant: 0,
        depth_bias_slope_bits: 0,
        blend: BlendMode::Replace,
        color_writes: true,
        cull: None,
    };

    #[must_use]
    pub const fn with_stencil_marker(mut self, marker: u32) -> Self {
        if self.stencil_reference != 0 {
            self.stencil_reference = marker;
        }
        if self.stencil_read_mask == 128 {
            self.stencil_read_mask = marker;
        }
        self
    }

    #[must_use]
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        self.depth_bias_constant = constant;
        self.depth_bias_slope_bits = slope_scale.to_bits();
        self
    }

    #[must_use]
    pub fn uses_stencil(&self) -> bool {
        self.stencil_read_mask != 0 || self.stencil_write_mask != 0
    }

    // ========================================================================
    // wgpu descriptors
    // ========================================================================

    #[must_use]
    pub fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: self.depth_compare,
            stencil: wgpu::StencilState {
                front: self.stencil_front,
                back: self.stencil_back,
                read_mask: self.stencil_read_mask,
                write_mask: self.stencil_write_mask,
            },
            bias: wgpu::DepthBiasState {
                constant: self.depth_bias_constant,
                slope_scale: f32::from_bits(self.depth_bias_slope_bits),
                clamp: 0.0,
            },
        }
    }

    #[must_use]
    pub fn color_target(&self, format: wgpu::TextureFormat) -> Option<wgpu::ColorTargetState> {
        // stencil-only draws share a pass with a color attachment, so they
        // keep the target and mask every channel
        Some(wgpu::ColorTargetState {
            format,
            blend: self.color_writes.then(|| self.blend.state()),
            write_mask: if self.color_writes {
                wgpu::ColorWrites::ALL
            } else {
                wgpu::ColorWrites::empty()
            },
        })
    }

    #[must_use]
    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull,
            ..Default::default()
        }
    }

    // ========================================================================
    // CPU evaluation of the stencil stage
    // ========================================================================

    /// Whether the stencil test passes for a stored value.
    #[must_use]
    pub fn stencil_test(&self, face: wgpu::Face, stored: u8) -> bool {
        let state = self.face(face);
        let mask = self.stencil_read_mask;
        compare(state.compare, self.stencil_reference & mask, u32::from(stored) & mask)
    }

    /// Stencil value after a fragment of `face` is processed.
    #[must_use]
    pub fn stencil_update(&self, face: wgpu::Face, stored: u8, depth_passed: bool) -> u8 {
        let state = self.face(face);
        let op = if !self.stencil_test(face, stored) {
            state.fail_op
        } else if depth_passed {
            state.pass_op
        } else {
            state.depth_fail_op
        };
        let updated = apply(op, stored, self.stencil_reference as u8);
        let write = self.stencil_write_mask as u8;
        (stored & !write) | (updated & write)
    }

    fn face(&self, face: wgpu::Face) -> &StencilFaceState {
        match face {
            wgpu::Face::Front => &self.stencil_front,
            wgpu::Face::Back => &self.stencil_back,
        }
    }
}

fn compare(function: CompareFunction, reference: u32, stored: u32) -> bool {
    match function {
        CompareFunction::Never => false,
        CompareFunction::Less => reference < stored,
        CompareFunction::Equal => reference == stored,
        CompareFunction::LessEqual => reference <= stored,
        CompareFunction::Greater => reference > stored,
        CompareFunction::NotEqual => reference != stored,
        CompareFunction::GreaterEqual => reference >= stored,
        CompareFunction::Always => true,
    }
}

fn apply(op: StencilOperation, stored: u8, reference: u8) -> u8 {
    match op {
        StencilOperation::Keep => stored,
        StencilOperation::Zero => 0,
        StencilOperation::Replace => reference,
        StencilOperation::Invert => !stored,
        StencilOperation::IncrementClamp => stored.saturating_add(1),
        StencilOperation::DecrementClamp => stored.saturating_sub(1),
        StencilOperation::IncrementWrap => stored.wrapping_add(1),
        StencilOperation::DecrementWrap => stored.wrapping_sub(1),
    }
}
