//! Per-iteration render request snapshot

use crate::render::camera::Camera;
use serde::{Deserialize, Serialize};

/// Rendering method driven by the iteration loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMethod {
    /// Progressive photon mapping with a per-iteration shrinking search radius
    ProgressivePhotonMapping,

    /// Bidirectional path tracing with vertex connection and merging
    VertexConnectionMerging,
}

impl std::fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProgressivePhotonMapping => write!(f, "progressive photon mapping"),
            Self::VertexConnectionMerging => write!(f, "vertex connection and merging"),
        }
    }
}

/// Immutable parameter snapshot for one render pass
///
/// Built fresh from current application state at the top of every iteration
/// and never mutated afterwards, so a camera move or resize arriving mid-pass
/// cannot tear the parameters of the pass already in flight.
#[derive(Debug, Clone)]
pub struct RenderRequestDetails {
    /// Camera pose for this pass
    pub camera: Camera,

    /// Name of the scene the pass renders
    pub scene_name: String,

    /// Rendering method selector
    pub method: RenderMethod,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// PPM radius shrink exponent
    pub ppm_alpha: f64,

    /// Sequence number, bumped on every restart that invalidates accumulation
    pub sequence: u64,
}
