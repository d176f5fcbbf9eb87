//! Render manager: public handle around the render-loop thread
//!
//! The manager owns the dedicated thread that runs the iteration driver. The
//! application talks to the loop exclusively through commands; the loop talks
//! back through events and the shared frame exchange. No engine state is ever
//! mutated across threads directly.

mod driver;

use crate::config::{ConfigError, RenderSettings};
use crate::render::api::{ComputeDevice, RenderCapability};
use crate::render::camera::Camera;
use crate::render::frame_exchange::FrameExchange;
use crate::render::request::RenderMethod;
use crate::render::state::{RendererPhase, RunState};
use crate::render::statistics::RenderStatistics;
use crate::scene::{SceneDescriptor, SceneKey, SceneRegistry};
use crossbeam::channel::{unbounded, Receiver, Sender};
use driver::IterationDriver;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use thiserror::Error;

/// Commands consumed by the render-loop thread
///
/// The loop drains pending commands between iterations; a command can never
/// interrupt a pass already in flight.
#[derive(Debug, Clone)]
pub enum Command {
    /// Start or resume scheduling iterations, initializing the engine first
    /// if it has never been initialized
    Start,

    /// Suspend scheduling after the current iteration completes
    Pause,

    /// Pause when running, start otherwise
    TogglePause,

    /// Reset iteration counters and the PPM radius for a new sequence
    RestartSequence,

    /// Select the rendering method; restarts the sequence when it changes
    SetRenderMethod(RenderMethod),

    /// Bind a registered scene; flags a recompile when it differs
    SetScene(SceneKey),

    /// Update the camera pose; restarts the sequence
    SetCamera(Camera),

    /// Change the output dimensions; restarts the sequence
    Resize {
        /// New output width in pixels
        width: u32,
        /// New output height in pixels
        height: u32,
    },

    /// Run the next iteration if still running (posted by the loop to itself)
    Continue,

    /// Stop the loop and let the thread exit
    Shutdown,
}

/// Events produced by the render-loop thread
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// A display iteration finished and its pixels were published
    ///
    /// `display_iteration` is 1-based for human-readable labeling; read the
    /// pixels through [`RenderManager::frame_exchange`].
    FrameReady {
        /// 1-based iteration number of the published frame
        display_iteration: u64,
    },

    /// A capability failure, as a human-readable message
    Error(String),

    /// The run state changed
    RunningStatusChanged(RunState),

    /// The renderer lifecycle phase changed
    PhaseChanged(RendererPhase),

    /// The rendering method changed
    RenderMethodChanged(RenderMethod),
}

/// Errors surfaced by the manager handle
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Settings failed validation before the loop was started
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The render-loop thread could not be spawned
    #[error("Failed to spawn render loop thread: {0}")]
    Thread(#[from] std::io::Error),

    /// The render-loop thread is gone; commands can no longer be delivered
    #[error("Render loop is no longer running")]
    Disconnected,
}

/// Handle to the render loop
///
/// Dropping the manager shuts the loop down and joins the thread.
pub struct RenderManager {
    commands: Sender<Command>,
    events: Receiver<RenderEvent>,
    exchange: Arc<FrameExchange>,
    statistics: Arc<Mutex<RenderStatistics>>,
    scenes: Arc<Mutex<SceneRegistry>>,
    thread: Option<JoinHandle<()>>,
}

impl RenderManager {
    /// Validate `settings` and spawn the render-loop thread
    ///
    /// The capability is moved onto the loop thread; `initialize` runs there
    /// on the first [`Command::Start`], after the caller has had a chance to
    /// hook up the event receiver, so initialization errors are observable.
    pub fn spawn<R>(
        capability: R,
        device: ComputeDevice,
        settings: RenderSettings,
    ) -> Result<Self, ManagerError>
    where
        R: RenderCapability + Send + 'static,
    {
        settings.validate()?;

        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let exchange = Arc::new(FrameExchange::new(
            settings.output.max_width,
            settings.output.max_height,
        ));
        let statistics = Arc::new(Mutex::new(RenderStatistics::default()));
        let scenes = Arc::new(Mutex::new(SceneRegistry::new()));

        let driver = IterationDriver::new(
            capability,
            device,
            settings,
            Arc::clone(&scenes),
            Arc::clone(&exchange),
            Arc::clone(&statistics),
            command_rx,
            command_tx.clone(),
            event_tx,
        );
        let thread = std::thread::Builder::new()
            .name("render-loop".into())
            .spawn(move || driver.run())?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            exchange,
            statistics,
            scenes,
            thread: Some(thread),
        })
    }

    /// Register a scene and return its opaque key
    pub fn register_scene(&self, descriptor: SceneDescriptor) -> SceneKey {
        self.scenes.lock().unwrap().insert(descriptor)
    }

    /// Start or resume rendering
    pub fn start(&self) -> Result<(), ManagerError> {
        self.send(Command::Start)
    }

    /// Pause after the in-flight iteration, if any, completes
    pub fn pause(&self) -> Result<(), ManagerError> {
        self.send(Command::Pause)
    }

    /// Toggle between running and paused
    pub fn toggle_pause(&self) -> Result<(), ManagerError> {
        self.send(Command::TogglePause)
    }

    /// Restart the render sequence (iteration counters and PPM radius)
    pub fn restart_sequence(&self) -> Result<(), ManagerError> {
        self.send(Command::RestartSequence)
    }

    /// Bind a registered scene
    pub fn set_scene(&self, key: SceneKey) -> Result<(), ManagerError> {
        self.send(Command::SetScene(key))
    }

    /// Update the camera pose; restarts the sequence
    pub fn set_camera(&self, camera: Camera) -> Result<(), ManagerError> {
        self.send(Command::SetCamera(camera))
    }

    /// Select the rendering method
    pub fn set_render_method(&self, method: RenderMethod) -> Result<(), ManagerError> {
        self.send(Command::SetRenderMethod(method))
    }

    /// Change the output dimensions; restarts the sequence
    pub fn resize(&self, width: u32, height: u32) -> Result<(), ManagerError> {
        self.send(Command::Resize { width, height })
    }

    /// Event stream produced by the loop, in emission order
    pub fn events(&self) -> &Receiver<RenderEvent> {
        &self.events
    }

    /// Shared frame exchange for reading published frames
    pub fn frame_exchange(&self) -> Arc<FrameExchange> {
        Arc::clone(&self.exchange)
    }

    /// Snapshot of the current render statistics
    pub fn statistics(&self) -> RenderStatistics {
        self.statistics.lock().unwrap().clone()
    }

    /// Stop the loop and join the render thread
    pub fn shutdown(mut self) {
        self.close();
    }

    /// Send a raw command to the loop
    pub fn send_command(&self, command: Command) -> Result<(), ManagerError> {
        self.send(command)
    }

    fn send(&self, command: Command) -> Result<(), ManagerError> {
        self.commands
            .send(command)
            .map_err(|_| ManagerError::Disconnected)
    }

    fn close(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                log::error!("render loop thread panicked during shutdown");
            }
        }
    }
}

impl Drop for RenderManager {
    fn drop(&mut self) {
        self.close();
    }
}
