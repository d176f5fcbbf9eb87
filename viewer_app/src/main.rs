//! Headless viewer demo
//!
//! Stands in for the GUI as the engine's external consumer: it registers a
//! couple of scenes, drives the render loop with a deterministic software
//! capability, and logs frame-ready and error events as they arrive. Run with
//! an optional path to a TOML settings file:
//!
//! ```text
//! viewer [render_settings.toml]
//! ```

use render_engine::prelude::*;

/// Display frames to collect before pausing and shutting down
const FRAMES_TO_COLLECT: u64 = 5;

/// Software capability producing a deterministic accumulating test pattern
///
/// Each pass adds one sample of a gradient to the accumulation buffer, the
/// way a progressive estimator accumulates radiance; the consumer divides by
/// the displayed iteration count to normalize.
struct TestPatternCapability {
    width: u32,
    height: u32,
    accumulation: Vec<f32>,
    sequence: u64,
    scene_seed: f32,
}

impl TestPatternCapability {
    fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            accumulation: Vec::new(),
            sequence: 0,
            scene_seed: 0.0,
        }
    }

    fn reset_accumulation(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.accumulation.clear();
        self.accumulation
            .resize(width as usize * height as usize * 3, 0.0);
    }
}

impl RenderCapability for TestPatternCapability {
    fn initialize(&mut self, device: &ComputeDevice) -> Result<(), CapabilityError> {
        log::info!("test pattern capability bound to device '{}'", device.name);
        Ok(())
    }

    fn init_scene(&mut self, scene: &SceneDescriptor) -> Result<(), CapabilityError> {
        // Different scenes tint the pattern differently.
        self.scene_seed = scene.name.len() as f32 * 0.1;
        self.accumulation.fill(0.0);
        Ok(())
    }

    fn render_next_iteration(
        &mut self,
        iteration: u64,
        _local_iteration: u64,
        radius: f64,
        _emit_output: bool,
        details: &RenderRequestDetails,
    ) -> Result<(), CapabilityError> {
        if details.width != self.width || details.height != self.height {
            self.reset_accumulation(details.width, details.height);
        }
        if details.sequence != self.sequence {
            self.sequence = details.sequence;
            self.accumulation.fill(0.0);
        }

        let width = self.width as usize;
        let height = self.height as usize;
        for y in 0..height {
            for x in 0..width {
                let offset = (y * width + x) * 3;
                let u = x as f32 / width as f32;
                let v = y as f32 / height as f32;
                self.accumulation[offset] += u + self.scene_seed;
                self.accumulation[offset + 1] += v;
                self.accumulation[offset + 2] += 1.0 - u;
            }
        }
        log::debug!("pass {iteration} done (radius {radius:.3})");
        Ok(())
    }

    fn get_output_buffer(&mut self, destination: &mut [f32]) -> Result<(), CapabilityError> {
        destination.copy_from_slice(&self.accumulation);
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn emitted_photons_per_iteration(&self) -> u64 {
        512 * 512
    }
}

fn load_settings() -> Result<RenderSettings, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading settings from {path}");
            RenderSettings::load_from_file(&path)
        }
        None => Ok(RenderSettings::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = load_settings()?;
    settings.validate()?;

    let manager = RenderManager::spawn(
        TestPatternCapability::new(),
        ComputeDevice::new(0, "software"),
        settings,
    )?;

    let cornell = manager.register_scene(SceneDescriptor::named("cornell"));
    manager.register_scene(SceneDescriptor::named("conference"));
    manager.set_scene(cornell)?;
    manager.set_render_method(RenderMethod::ProgressivePhotonMapping)?;
    manager.start()?;

    let exchange = manager.frame_exchange();
    let mut pixels = Vec::new();
    let mut frames_seen = 0;

    for event in manager.events().iter() {
        match event {
            RenderEvent::FrameReady { display_iteration } => {
                let info = exchange
                    .consume_into(&mut pixels)
                    .expect("frame-ready implies a published frame");
                log::info!(
                    "frame {display_iteration}: {}x{} ({} samples)",
                    info.width,
                    info.height,
                    pixels.len()
                );
                frames_seen += 1;
                if frames_seen >= FRAMES_TO_COLLECT {
                    manager.pause()?;
                }
            }
            RenderEvent::RunningStatusChanged(state) => {
                log::info!("running status: {state:?}");
                if state == RunState::Paused {
                    break;
                }
            }
            RenderEvent::PhaseChanged(phase) => log::debug!("renderer phase: {phase:?}"),
            RenderEvent::RenderMethodChanged(method) => log::info!("render method: {method}"),
            RenderEvent::Error(message) => {
                log::error!("render error: {message}");
                break;
            }
        }
    }

    let stats = manager.statistics();
    log::info!(
        "completed {} iterations, radius {:.4}, {} photons emitted",
        stats.iterations_completed,
        stats.current_radius,
        stats.total_photons
    );
    manager.shutdown();
    Ok(())
}
