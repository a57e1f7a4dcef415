// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interactive state of a Mandelbrot explorer: where it is looking,
//! how hard it is looking, and how many workers it uses.  Every input
//! event moves the state and then renders it, synchronously, so there
//! is never more than one pass in flight.

use log::{debug, warn};
use num::clamp;

use crate::engine::{self, CancelToken, Frame, RenderParams};
use crate::errors::RenderError;
use crate::palette::Palette;
use crate::planes::ViewWindow;
use crate::tiles::Schedule;
pub use crate::tiles::WorkerMode;

/// Default image width.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default image height.
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Iteration bound at start-up and after a reset.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
/// How far one press of the iteration buttons moves the bound.
pub const ITERATION_STEP: i32 = 10;

/// The inputs the explorer understands.  Each one triggers exactly one
/// render pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A click at this pixel: zoom in by `ZOOM_FACTOR`.
    Zoom {
        /// Column clicked.
        x: u32,
        /// Row clicked, counted from the top of the window.
        y: u32,
    },
    /// Raise or lower the iteration bound.  It never drops below zero.
    AdjustIterations(i32),
    /// Switch between single and multi worker rendering.
    SelectWorkers(WorkerMode),
    /// Go back to the start-up view and iteration bound.
    Reset,
}

/// The start-up view for an image of the given size: a scale of a
/// quarter of the height in pixels per unit, with the real axis
/// centered on zero and the imaginary axis starting at -2.
pub fn default_view(width: u32, height: u32) -> Result<ViewWindow, RenderError> {
    let scale = f64::from(height / 4);
    ViewWindow::new(-f64::from(width) / scale / 2.0, -2.0, scale)
}

/// The owned state of an explorer session.
pub struct Explorer {
    width: u32,
    height: u32,
    view: ViewWindow,
    max_iterations: u32,
    palette: Palette,
    mode: WorkerMode,
    processors: usize,
    cancel: CancelToken,
    frame: Option<Frame>,
}

impl Explorer {
    /// An explorer for a `width` by `height` image, using every
    /// processor the machine has.  Nothing is rendered until the first
    /// event or `rerender`.
    pub fn new(width: u32, height: u32) -> Result<Explorer, RenderError> {
        Explorer::with_processors(width, height, num_cpus::get())
    }

    /// As `new`, but with an explicit processor count for the multi
    /// worker mode.
    pub fn with_processors(
        width: u32,
        height: u32,
        processors: usize,
    ) -> Result<Explorer, RenderError> {
        if processors == 0 {
            return Err(RenderError::InvalidWorkerCount);
        }
        Ok(Explorer {
            width,
            height,
            view: default_view(width, height)?,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            palette: Palette::new(DEFAULT_MAX_ITERATIONS),
            mode: WorkerMode::Multi,
            processors,
            cancel: CancelToken::new(),
            frame: None,
        })
    }

    /// Starts from a different iteration bound.  `Event::Reset` still
    /// returns to `DEFAULT_MAX_ITERATIONS`.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Explorer {
        self.set_max_iterations(max_iterations);
        self
    }

    /// The parameters the next pass will render.
    pub fn params(&self) -> RenderParams {
        RenderParams {
            width: self.width,
            height: self.height,
            max_iterations: self.max_iterations,
            view: self.view,
        }
    }

    /// The current view window.
    pub fn view(&self) -> ViewWindow {
        self.view
    }

    /// The current iteration bound.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// The palette for the current iteration bound.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The current worker mode.
    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    /// Processors available to the multi worker mode.
    pub fn processors(&self) -> usize {
        self.processors
    }

    /// How many workers the next pass will use.
    pub fn workers(&self) -> usize {
        match self.mode {
            WorkerMode::Single => 1,
            WorkerMode::Multi => self.processors,
        }
    }

    /// The last pass that completed.  A failed pass leaves this alone.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// A handle that cancels the pass in flight, or the next one to
    /// start if none is running.  The flag is lowered again when that
    /// pass ends.
    pub fn canceller(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Applies one event and renders the result.
    pub fn apply(&mut self, event: Event) -> Result<&Frame, RenderError> {
        debug!("Applying {:?}", event);
        match event {
            Event::Zoom { x, y } => {
                self.view = self.view.zoomed(x, y, self.width, self.height);
            }
            Event::AdjustIterations(delta) => {
                let bound = i64::from(self.max_iterations) + i64::from(delta);
                self.set_max_iterations(clamp(bound, 0, i64::from(u32::max_value())) as u32);
            }
            Event::SelectWorkers(mode) => {
                self.mode = mode;
            }
            Event::Reset => {
                self.view = default_view(self.width, self.height)?;
                self.set_max_iterations(DEFAULT_MAX_ITERATIONS);
            }
        }
        self.rerender()
    }

    /// Renders the current state again.  This is how the first frame is
    /// produced, and how a caller retries after a failed pass.
    pub fn rerender(&mut self) -> Result<&Frame, RenderError> {
        let params = self.params();
        let schedule = Schedule::for_workers(self.workers());
        let result = engine::render(&params, &self.palette, schedule, &self.cancel);
        self.cancel.reset();
        match result {
            Ok(frame) => Ok(self.frame.insert(frame.in_mode(self.mode))),
            Err(e) => {
                warn!("Render pass failed: {}", e);
                Err(e)
            }
        }
    }

    fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
        self.palette = Palette::new(max_iterations);
    }
}
