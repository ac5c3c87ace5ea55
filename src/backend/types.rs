//! Backend selection types shared by both hosts

use crate::backend::traits::{BackendError, BackendResult};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two backends the demo knows how to drive
///
/// On the web these are the browser's WebGPU and WebGL2 APIs. On native hosts
/// `WebGpu` maps to wgpu's primary backends (Vulkan, Metal, DX12) and `WebGl2`
/// to its GL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// GPU-compute capable backend
    WebGpu,
    /// Widely supported rasterization backend
    WebGl2,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::WebGpu => "WebGPU",
            BackendKind::WebGl2 => "WebGL2",
        }
    }

    /// wgpu backend mask used when creating the instance
    pub fn wgpu_backends(&self) -> wgpu::Backends {
        match self {
            #[cfg(target_arch = "wasm32")]
            BackendKind::WebGpu => wgpu::Backends::BROWSER_WEBGPU,
            #[cfg(not(target_arch = "wasm32"))]
            BackendKind::WebGpu => wgpu::Backends::PRIMARY,
            BackendKind::WebGl2 => wgpu::Backends::GL,
        }
    }

    /// Device limits requested from the adapter
    pub fn limits(&self) -> wgpu::Limits {
        match self {
            BackendKind::WebGpu => wgpu::Limits::default(),
            BackendKind::WebGl2 => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability probe results, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendProbe {
    pub webgpu: bool,
    pub webgl2: bool,
}

impl BackendProbe {
    pub fn new(webgpu: bool, webgl2: bool) -> Self {
        Self { webgpu, webgl2 }
    }

    pub fn is_available(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::WebGpu => self.webgpu,
            BackendKind::WebGl2 => self.webgl2,
        }
    }
}

/// Backend selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPolicy {
    /// WebGPU when available, WebGL2 otherwise
    #[default]
    PreferGpuCompute,
    /// WebGPU only
    ForceGpuCompute,
    /// WebGL2 only
    ForceRasterization,
}

impl BackendPolicy {
    /// Pick a backend from the probe results
    pub fn select(self, probe: &BackendProbe) -> BackendResult<BackendKind> {
        let wanted = match self {
            BackendPolicy::PreferGpuCompute => {
                return if probe.webgpu {
                    Ok(BackendKind::WebGpu)
                } else if probe.webgl2 {
                    Ok(BackendKind::WebGl2)
                } else {
                    Err(BackendError::NoBackendAvailable {
                        webgpu: probe.webgpu,
                        webgl2: probe.webgl2,
                    })
                };
            }
            BackendPolicy::ForceGpuCompute => BackendKind::WebGpu,
            BackendPolicy::ForceRasterization => BackendKind::WebGl2,
        };

        if probe.is_available(wanted) {
            Ok(wanted)
        } else {
            Err(BackendError::Unavailable(wanted))
        }
    }

    /// Backend to retry with after `failed` turned out to have no adapter
    ///
    /// Browsers can expose `navigator.gpu` and still hand out no adapter, so
    /// only the preferring policy steps down to WebGL2.
    pub fn fallback_after(self, failed: BackendKind, probe: &BackendProbe) -> Option<BackendKind> {
        match (self, failed) {
            (BackendPolicy::PreferGpuCompute, BackendKind::WebGpu) if probe.webgl2 => {
                Some(BackendKind::WebGl2)
            }
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown backend policy '{0}' (expected auto, webgpu or webgl)")]
pub struct ParsePolicyError(pub String);

impl FromStr for BackendPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" | "prefer" => Ok(BackendPolicy::PreferGpuCompute),
            "webgpu" | "gpu" => Ok(BackendPolicy::ForceGpuCompute),
            "webgl" | "webgl2" | "gl" => Ok(BackendPolicy::ForceRasterization),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` value in sRGB space
    pub fn from_srgb_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f64 / 255.0);
        Self::rgba(channel(16), channel(8), channel(0), 1.0)
    }

    /// Convert for a render target. Non-sRGB targets need the encoding applied
    /// by hand.
    pub fn to_wgpu(&self, encode_srgb: bool) -> wgpu::Color {
        if encode_srgb {
            wgpu::Color {
                r: linear_to_srgb(self.r),
                g: linear_to_srgb(self.g),
                b: linear_to_srgb(self.b),
                a: self.a,
            }
        } else {
            wgpu::Color {
                r: self.r,
                g: self.g,
                b: self.b,
                a: self.a,
            }
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Options for renderer construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    pub backend: BackendKind,
    pub antialias: bool,
    pub vsync: bool,
}
