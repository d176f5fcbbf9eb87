//! Render capability trait and its error taxonomy
//!
//! This trait abstracts over the device-side renderer (ray-tracing kernels,
//! photon maps, acceleration structures) and provides the consistent surface
//! the iteration driver schedules against. Implementations are expected to be
//! synchronous: `render_next_iteration` returns once the pass has completed
//! on the device.

use crate::render::request::RenderRequestDetails;
use crate::scene::SceneDescriptor;
use thiserror::Error;

/// Result type for capability operations
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Descriptor of the compute device the renderer should run on
///
/// Device enumeration happens outside the engine; whatever picked the device
/// hands this descriptor through so the capability can bind to it.
#[derive(Debug, Clone, Default)]
pub struct ComputeDevice {
    /// Device ordinal as understood by the capability
    pub ordinal: u32,

    /// Human-readable device name for logs and error messages
    pub name: String,
}

impl ComputeDevice {
    /// Create a descriptor for the device at `ordinal`
    pub fn new(ordinal: u32, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
        }
    }
}

/// Errors a capability can raise, by failure site
///
/// The taxonomy matters to the operator: an initialization failure requires a
/// fresh engine start, a compile failure is recoverable by fixing or swapping
/// the scene, and a render failure is recoverable by resuming since retrying
/// reuses unchanged state.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// Device/engine setup failed; fatal to the current run
    #[error("Error during initialization: {0}")]
    Initialization(String),

    /// The scene could not be built on the device
    #[error("Scene compilation failed: {0}")]
    Compile(String),

    /// A single render pass failed
    #[error("Render pass failed: {0}")]
    Render(String),
}

/// The GPU-side renderer consumed by the iteration driver
pub trait RenderCapability {
    /// Bind the renderer to a compute device and build its one-time resources
    ///
    /// Per-method GPU programs and material objects are constructed here,
    /// during engine initialization, so resource creation order is explicit
    /// rather than hidden behind first use.
    fn initialize(&mut self, device: &ComputeDevice) -> CapabilityResult<()>;

    /// Compile the given scene onto the device
    fn init_scene(&mut self, scene: &SceneDescriptor) -> CapabilityResult<()>;

    /// Run one render pass
    ///
    /// `iteration` and `local_iteration` are both the 0-based index of this
    /// pass (they differ only in distributed setups, which this engine does
    /// not drive). `emit_output` tells the pass to produce displayable pixels;
    /// [`RenderCapability::get_output_buffer`] is only valid after a pass that
    /// had it set.
    fn render_next_iteration(
        &mut self,
        iteration: u64,
        local_iteration: u64,
        radius: f64,
        emit_output: bool,
        details: &RenderRequestDetails,
    ) -> CapabilityResult<()>;

    /// Copy the most recent pass's pixel data into `destination`
    ///
    /// `destination` holds interleaved RGB `f32` samples and is at least
    /// `width() * height() * 3` elements long.
    fn get_output_buffer(&mut self, destination: &mut [f32]) -> CapabilityResult<()>;

    /// Output width of the most recent pass in pixels
    fn width(&self) -> u32;

    /// Output height of the most recent pass in pixels
    fn height(&self) -> u32;

    /// Photons emitted per PPM iteration, as declared by the implementation
    fn emitted_photons_per_iteration(&self) -> u64;
}
