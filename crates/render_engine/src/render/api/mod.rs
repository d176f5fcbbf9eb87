//! Capability seam to the GPU-side renderer
//!
//! The engine never talks to a GPU directly; it consumes an implementation of
//! [`RenderCapability`] and treats it as an opaque service.

mod render_capability;

pub use render_capability::{CapabilityError, CapabilityResult, ComputeDevice, RenderCapability};
