#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot explorer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c`, starting from
//! zero, never runs off to infinity.  Points outside the set are
//! colored by how many iterations it takes them to escape the circle
//! of radius two; points that never escape within the iteration bound
//! are painted black.
//!
//! Rendering a view is embarrassingly parallel.  The image is split
//! into vertical strips, one per worker, and every strip is rendered
//! on its own scoped thread straight into its own slice of a shared
//! framebuffer.  The strips never overlap, so the workers never need
//! to coordinate; the pass simply waits for all of them to finish.
//!
//! The `Explorer` wraps all of this in the little state machine an
//! interactive front end needs: zoom where the user clicks, raise or
//! lower the iteration bound, switch between one worker and many, and
//! reset.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod engine;
pub mod errors;
pub mod escape;
pub mod explorer;
pub mod palette;
pub mod planes;
pub mod tiles;

pub use engine::{render, render_with, CancelToken, Frame, Framebuffer, RenderParams};
pub use errors::RenderError;
pub use escape::escape_time;
pub use explorer::{Event, Explorer, WorkerMode};
pub use palette::Palette;
pub use planes::{Pixel, ViewWindow};
pub use tiles::{partition, Schedule, Tile};
