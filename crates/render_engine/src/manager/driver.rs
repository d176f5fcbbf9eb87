//! The iteration driver: the render loop's control logic
//!
//! Runs on the dedicated render-loop thread. Owns every piece of mutable
//! engine state (iteration counters, radius estimator, scene binding, run
//! state, renderer phase) and mutates it only between iterations, while
//! draining the command channel. Self-schedules by posting [`Command::Continue`]
//! to its own queue, guarded by a single-outstanding-request flag so repeated
//! triggers cannot pile up continuation requests faster than the loop drains
//! them.

use super::{Command, RenderEvent};
use crate::config::RenderSettings;
use crate::render::api::{CapabilityError, CapabilityResult, ComputeDevice, RenderCapability};
use crate::render::camera::Camera;
use crate::render::frame_exchange::FrameExchange;
use crate::render::radius::RadiusEstimator;
use crate::render::request::{RenderMethod, RenderRequestDetails};
use crate::render::state::{IterationState, RendererPhase, RunState, SceneBinding};
use crate::render::statistics::{IterationTiming, RenderStatistics};
use crate::scene::SceneRegistry;
use crossbeam::channel::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub(super) struct IterationDriver<R: RenderCapability> {
    capability: R,
    device: ComputeDevice,
    settings: RenderSettings,
    scenes: Arc<Mutex<SceneRegistry>>,
    exchange: Arc<FrameExchange>,
    statistics: Arc<Mutex<RenderStatistics>>,
    commands: Receiver<Command>,
    self_sender: Sender<Command>,
    events: Sender<RenderEvent>,

    run_state: RunState,
    phase: RendererPhase,
    binding: SceneBinding,
    iterations: IterationState,
    estimator: RadiusEstimator,
    timing: IterationTiming,
    camera: Camera,
    method: RenderMethod,
    sequence: u64,
    width: u32,
    height: u32,
    // Single-flight guard: true while a Continue request sits in the queue.
    continue_pending: bool,
}

impl<R: RenderCapability> IterationDriver<R> {
    pub(super) fn new(
        capability: R,
        device: ComputeDevice,
        settings: RenderSettings,
        scenes: Arc<Mutex<SceneRegistry>>,
        exchange: Arc<FrameExchange>,
        statistics: Arc<Mutex<RenderStatistics>>,
        commands: Receiver<Command>,
        self_sender: Sender<Command>,
        events: Sender<RenderEvent>,
    ) -> Self {
        let estimator = RadiusEstimator::new(settings.ppm.initial_radius);
        let width = settings.output.width;
        let height = settings.output.height;
        Self {
            capability,
            device,
            settings,
            scenes,
            exchange,
            statistics,
            commands,
            self_sender,
            events,
            run_state: RunState::Stopped,
            phase: RendererPhase::NotInitialized,
            binding: SceneBinding::default(),
            iterations: IterationState::default(),
            estimator,
            timing: IterationTiming::default(),
            camera: Camera::default(),
            method: RenderMethod::ProgressivePhotonMapping,
            sequence: 0,
            width,
            height,
            continue_pending: false,
        }
    }

    /// Block on the command channel until shutdown
    pub(super) fn run(mut self) {
        log::info!("render loop thread started");
        while let Ok(command) = self.commands.recv() {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle_command(command);
        }
        log::info!("render loop thread stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start_running(),
            Command::Pause => self.set_run_state(RunState::Paused),
            Command::TogglePause => {
                if self.run_state == RunState::Running {
                    self.set_run_state(RunState::Paused);
                } else {
                    self.start_running();
                }
            }
            Command::RestartSequence => self.restart_sequence(),
            Command::SetRenderMethod(method) => {
                if self.method != method {
                    self.method = method;
                    log::info!("render method changed to {method}");
                    let _ = self.events.send(RenderEvent::RenderMethodChanged(method));
                    self.restart_sequence();
                }
            }
            Command::SetScene(key) => {
                self.binding.bind(key);
                self.schedule_next();
            }
            Command::SetCamera(camera) => {
                self.camera = camera;
                self.restart_sequence();
            }
            Command::Resize { width, height } => self.resize(width, height),
            Command::Continue => {
                // The guard clears only once the loop actually begins
                // executing the queued request.
                self.continue_pending = false;
                self.iterate();
            }
            Command::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    /// Start or resume, initializing the engine on first start
    fn start_running(&mut self) {
        if self.phase == RendererPhase::NotInitialized {
            self.set_phase(RendererPhase::InitializingEngine);
            log::info!("initializing renderer on device '{}'", self.device.name);
            if let Err(error) = self.capability.initialize(&self.device) {
                // Engine initialization failures require a fresh start.
                self.set_phase(RendererPhase::NotInitialized);
                self.pause_with_error(&error);
                return;
            }
        }
        self.set_run_state(RunState::Running);
        self.schedule_next();
    }

    /// Reset iteration and radius state for a new sequence
    fn restart_sequence(&mut self) {
        self.sequence += 1;
        self.iterations.restart();
        self.estimator.reset();
        self.timing.reset();
        log::debug!("sequence restarted (sequence {})", self.sequence);
        self.schedule_next();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (max_width, max_height) = self.exchange.max_dimensions();
        if width == 0 || height == 0 || width > max_width || height > max_height {
            let message =
                format!("unsupported output size {width}x{height} (maximum {max_width}x{max_height})");
            log::warn!("{message}");
            let _ = self.events.send(RenderEvent::Error(message));
            return;
        }
        self.width = width;
        self.height = height;
        // A dimension change invalidates everything accumulated so far.
        self.restart_sequence();
    }

    /// Request the next iteration if still running, at most one outstanding
    fn schedule_next(&mut self) {
        if self.run_state == RunState::Running && !self.continue_pending {
            self.continue_pending = true;
            let _ = self.self_sender.send(Command::Continue);
        }
    }

    /// Run one iteration if the loop is running and a scene is bound
    fn iterate(&mut self) {
        if self.run_state != RunState::Running || self.binding.active_scene.is_none() {
            return;
        }
        match self.run_one_iteration() {
            Ok(()) => self.schedule_next(),
            Err(error) => self.pause_with_error(&error),
        }
    }

    /// One full pass: compile if needed, render, shrink, publish, account
    ///
    /// The ordering here is load-bearing: the radius shrinks using the
    /// iteration index *before* it is incremented, and the increment is the
    /// final step of a successful pass, so a failed pass leaves the counter
    /// untouched and a resume retries the same index.
    fn run_one_iteration(&mut self) -> CapabilityResult<()> {
        let Some(key) = self.binding.active_scene else {
            return Ok(());
        };
        let pass_timer = Instant::now();

        let descriptor = self
            .scenes
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| CapabilityError::Compile("active scene is no longer registered".into()))?;

        if self.binding.needs_compile {
            self.set_phase(RendererPhase::InitializingScene);
            log::info!("compiling scene '{}'", descriptor.name);
            self.capability.init_scene(&descriptor)?;
            self.binding.needs_compile = false;
            self.set_phase(RendererPhase::StartingRendering);
        }

        let iteration = self.iterations.next_iteration;
        let emit_output = self.settings.display.is_display_iteration(iteration);

        let details = RenderRequestDetails {
            camera: self.camera.clone(),
            scene_name: descriptor.name,
            method: self.method,
            width: self.width,
            height: self.height,
            ppm_alpha: self.settings.ppm.alpha,
            sequence: self.sequence,
        };

        self.capability.render_next_iteration(
            iteration,
            iteration,
            self.estimator.current(),
            emit_output,
            &details,
        )?;
        self.estimator.shrink_after(iteration, self.settings.ppm.alpha);

        // The first pass pays one-time initialization and device sync cost,
        // so steady state is only declared after it completes.
        if self.phase != RendererPhase::Rendering {
            self.set_phase(RendererPhase::Rendering);
        }

        if emit_output {
            let exchange = Arc::clone(&self.exchange);
            let capability = &mut self.capability;
            exchange.publish_with(iteration, self.width, self.height, |dest| {
                capability.get_output_buffer(dest)
            })?;
            let _ = self.events.send(RenderEvent::FrameReady {
                display_iteration: iteration + 1,
            });
            log::debug!("published frame for iteration {}", iteration + 1);
        } else {
            self.exchange.mark_completed(iteration);
        }
        self.iterations.last_completed = Some(iteration);

        self.timing.record(pass_timer.elapsed());
        self.fill_statistics();

        self.iterations.next_iteration += 1;
        Ok(())
    }

    fn fill_statistics(&mut self) {
        let completed = self.iterations.next_iteration + 1;
        self.statistics.lock().unwrap().fill(
            completed,
            self.estimator.current(),
            self.method,
            self.capability.emitted_photons_per_iteration(),
            self.timing.mean(),
        );
    }

    fn pause_with_error(&mut self, error: &CapabilityError) {
        log::error!("{error}");
        self.set_run_state(RunState::Paused);
        let _ = self.events.send(RenderEvent::Error(error.to_string()));
    }

    fn set_run_state(&mut self, state: RunState) {
        if self.run_state != state {
            log::info!("run state: {:?} -> {:?}", self.run_state, state);
            self.run_state = state;
            let _ = self.events.send(RenderEvent::RunningStatusChanged(state));
        }
    }

    fn set_phase(&mut self, phase: RendererPhase) {
        if self.phase != phase {
            log::debug!("renderer phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            let _ = self.events.send(RenderEvent::PhaseChanged(phase));
        }
    }
}
