//! # Render Engine
//!
//! Host-side orchestration engine for a progressive GPU ray tracer supporting
//! progressive photon mapping (PPM) and vertex connection and merging (VCM).
//!
//! The engine drives repeated render passes on a dedicated render-loop thread,
//! adapts per-iteration parameters (notably the shrinking PPM search radius),
//! tracks scene (re)compilation state, and hands completed frames to a display
//! consumer through a lock-protected frame exchange.
//!
//! The GPU kernels themselves live behind the [`RenderCapability`] trait; this
//! crate owns everything on the host side of that seam.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_engine::prelude::*;
//! # struct MyCapability;
//! # impl RenderCapability for MyCapability {
//! #     fn initialize(&mut self, _: &ComputeDevice) -> Result<(), CapabilityError> { Ok(()) }
//! #     fn init_scene(&mut self, _: &SceneDescriptor) -> Result<(), CapabilityError> { Ok(()) }
//! #     fn render_next_iteration(&mut self, _: u64, _: u64, _: f64, _: bool,
//! #         _: &RenderRequestDetails) -> Result<(), CapabilityError> { Ok(()) }
//! #     fn get_output_buffer(&mut self, _: &mut [f32]) -> Result<(), CapabilityError> { Ok(()) }
//! #     fn width(&self) -> u32 { 1 }
//! #     fn height(&self) -> u32 { 1 }
//! #     fn emitted_photons_per_iteration(&self) -> u64 { 0 }
//! # }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = RenderSettings::default();
//!     let manager = RenderManager::spawn(MyCapability, ComputeDevice::default(), settings)?;
//!     let scene = manager.register_scene(SceneDescriptor::named("cornell"));
//!     manager.set_scene(scene)?;
//!     manager.start()?;
//!     for event in manager.events().iter() {
//!         if let RenderEvent::FrameReady { display_iteration } = event {
//!             println!("frame {display_iteration} ready");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod manager;
pub mod render;
pub mod scene;

pub use manager::{Command, ManagerError, RenderEvent, RenderManager};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, DisplaySettings, OutputSettings, PpmSettings, RenderSettings},
        manager::{Command, ManagerError, RenderEvent, RenderManager},
        render::{
            api::{CapabilityError, ComputeDevice, RenderCapability},
            camera::Camera,
            frame_exchange::FrameExchange,
            request::{RenderMethod, RenderRequestDetails},
            state::{RendererPhase, RunState},
            statistics::RenderStatistics,
        },
        scene::{SceneDescriptor, SceneKey, SceneRegistry},
    };
}
