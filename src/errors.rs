// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a render pass from completing.

use failure::Fail;

/// The reasons a render pass, or the request for one, can fail.  A
/// failed pass never hands back a framebuffer, partial or otherwise.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// Asked to split the image among zero workers.
    #[fail(display = "Worker count must be at least 1")]
    InvalidWorkerCount,

    /// The view window's scale must be a positive, finite number.
    #[fail(display = "View scale must be positive and finite, got {}", _0)]
    InvalidScale(f64),

    /// The tiles handed to the engine overlap or fall outside the image.
    #[fail(display = "Tiles overlap or fall outside the image")]
    InvalidTiling,

    /// The palette was built for a different iteration bound than the
    /// one being rendered.
    #[fail(
        display = "Palette holds {} colors but the pass needs {}",
        found, expected
    )]
    PaletteMismatch {
        /// The iteration bound of the pass.
        expected: u32,
        /// The length of the palette supplied.
        found: u32,
    },

    /// A worker died before it could be joined.
    #[fail(display = "A render worker panicked")]
    WorkerPanicked,

    /// The pass was cancelled before every tile finished.
    #[fail(display = "Render pass cancelled")]
    Cancelled,
}
