//! Run-state bookkeeping for the iteration loop
//!
//! All of this state is owned exclusively by the render-loop thread. The
//! application influences it only through commands the loop drains between
//! iterations, never by direct cross-thread mutation.

use crate::scene::SceneKey;

/// Whether the loop is scheduling iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No sequence has been started yet
    Stopped,

    /// Iterations are being scheduled
    Running,

    /// Scheduling is suspended; an explicit start resumes it
    Paused,
}

/// Lifecycle phase of the device-side renderer
///
/// Phases only move forward during normal operation. An error pauses the run;
/// whether the phase rewinds depends on the failure site: engine
/// initialization failures reset to [`RendererPhase::NotInitialized`], while
/// compile and render failures keep the current phase so a resume retries
/// with unchanged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererPhase {
    /// No device resources exist yet
    NotInitialized,

    /// `initialize` is running against the compute device
    InitializingEngine,

    /// The active scene is being compiled onto the device
    InitializingScene,

    /// Scene is compiled; the first pass has not completed yet
    StartingRendering,

    /// Steady state; at least one pass has completed
    ///
    /// The transition out of [`RendererPhase::StartingRendering`] happens
    /// after the first successful pass, which pays one-time driver sync cost
    /// and is therefore excluded from steady-state timing.
    Rendering,
}

/// Binding between the loop and the scene it renders
#[derive(Debug, Clone)]
pub struct SceneBinding {
    /// Key of the scene the loop renders, if any has been bound
    pub active_scene: Option<SceneKey>,

    /// Set whenever the bound scene changed; cleared only by a successful
    /// compile
    pub needs_compile: bool,
}

impl Default for SceneBinding {
    fn default() -> Self {
        // Whatever scene gets bound first has never been compiled.
        Self {
            active_scene: None,
            needs_compile: true,
        }
    }
}

impl SceneBinding {
    /// Bind `key`, flagging a recompile when it differs from the active scene
    ///
    /// Idempotent: rebinding the already-active scene changes nothing.
    pub fn bind(&mut self, key: SceneKey) {
        if self.active_scene != Some(key) {
            self.active_scene = Some(key);
            self.needs_compile = true;
        }
    }
}

/// Iteration counters for the current render sequence
#[derive(Debug, Clone, Default)]
pub struct IterationState {
    /// 0-based index of the next pass to run; increases by exactly 1 per
    /// completed pass
    pub next_iteration: u64,

    /// 0-based index of the most recently completed pass in any sequence
    pub last_completed: Option<u64>,
}

impl IterationState {
    /// Reset for a new sequence (camera or scene-parameter change)
    pub fn restart(&mut self) {
        self.next_iteration = 0;
    }
}
