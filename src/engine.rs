// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render engine.  A pass allocates a fresh framebuffer, cuts it
//! into one disjoint set of row segments per tile, hands each set to a
//! worker, and waits for every worker before anything is returned.
//! Because the segments are separate `&mut` borrows, no two workers
//! can ever touch the same pixel and nothing needs a lock.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::thread::ScopedJoinHandle;
use itertools::Itertools;
use log::{debug, info};

use crate::errors::RenderError;
use crate::escape::escape_time;
use crate::palette::{channels, Palette, Rgb};
use crate::planes::{flip_row, Pixel, ViewWindow};
use crate::tiles::{partition, Schedule, Tile, WorkerMode};

/// Everything one render pass needs to know.  Workers share it by
/// reference and nobody changes it while a pass is running.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Iterations after which a point is taken to be inside the set.
    pub max_iterations: u32,
    /// Where on the complex plane the image looks.
    pub view: ViewWindow,
}

/// A row-major grid of packed pixels, top row first.  Only the engine
/// can write one; everyone else gets it after the pass has joined.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    fn blank(width: u32, height: u32) -> Framebuffer {
        Framebuffer {
            width,
            height,
            pixels: vec![0 as Rgb; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel in column `x` of framebuffer row `row`.
    pub fn get(&self, x: u32, row: u32) -> Option<Rgb> {
        if x >= self.width || row >= self.height {
            return None;
        }
        Some(self.pixels[row as usize * self.width as usize + x as usize])
    }

    /// Every pixel, top row first.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// The pixels as consecutive red, green, blue bytes, ready for an
    /// image encoder.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&channels(*pixel));
        }
        bytes
    }
}

/// The result of a completed pass, as handed to whatever presents it.
#[derive(Clone, Debug)]
pub struct Frame {
    framebuffer: Framebuffer,
    elapsed: Duration,
    max_iterations: u32,
    mode: WorkerMode,
    workers: usize,
}

impl Frame {
    /// The finished image.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Wall-clock time the pass took.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Wall-clock time the pass took, in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// The iteration bound the image was rendered with.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// The worker mode the pass ran in.
    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    /// How many workers shared the pass.
    pub fn workers(&self) -> usize {
        self.workers
    }

    // A multi-worker pass on a one-processor machine runs on a single
    // tile, so the caller's mode wins over the schedule's.
    pub(crate) fn in_mode(mut self, mode: WorkerMode) -> Frame {
        self.mode = mode;
        self
    }
}

/// A flag the workers of a pass poll once per row.  Raising it makes
/// the pass fail with `RenderError::Cancelled`; clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been raised.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Ask any pass watching this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Lower the flag so the next pass can run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether the flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// A framebuffer row number and the slice of that row owned by a tile.
type Segment<'a> = (u32, &'a mut [Rgb]);

/// Cuts the framebuffer into the pieces each tile owns.  Tiles must
/// lie inside the image, must not overlap, and together must cover
/// every pixel; anything else is refused rather than rendered with
/// holes.
fn carve<'a>(
    pixels: &'a mut [Rgb],
    width: u32,
    height: u32,
    tiles: &[Tile],
) -> Result<Vec<Vec<Segment<'a>>>, RenderError> {
    let inside = |t: &Tile| {
        t.x_offset.checked_add(t.width).map_or(false, |r| r <= width)
            && t.y_offset.checked_add(t.height).map_or(false, |top| top <= height)
    };
    if !tiles.iter().all(inside)
        || tiles.iter().tuple_combinations().any(|(a, b)| a.overlaps(b))
        || tiles.iter().map(Tile::len).sum::<usize>() != pixels.len()
    {
        return Err(RenderError::InvalidTiling);
    }

    let mut order: Vec<usize> = (0..tiles.len()).collect();
    order.sort_by_key(|&i| tiles[i].x_offset);

    let mut jobs: Vec<Vec<Segment<'a>>> = tiles.iter().map(|_| Vec::new()).collect();
    if width == 0 {
        return Ok(jobs);
    }
    for (row, line) in pixels.chunks_mut(width as usize).enumerate() {
        let row = row as u32;
        let y = flip_row(row, height);
        let mut rest = line;
        let mut cursor = 0;
        for &i in &order {
            let tile = &tiles[i];
            if tile.is_empty() || y < tile.y_offset || y >= tile.top() {
                continue;
            }
            let (_, tail) = mem::take(&mut rest).split_at_mut((tile.x_offset - cursor) as usize);
            let (segment, tail) = tail.split_at_mut(tile.width as usize);
            jobs[i].push((row, segment));
            rest = tail;
            cursor = tile.right();
        }
    }
    Ok(jobs)
}

/// Fills every pixel of one tile.  Returns early, with nothing but an
/// error to show for it, if the pass is cancelled.  `carve` has already
/// checked that the segments cover the tile exactly.
fn fill_tile<F>(
    segments: Vec<Segment<'_>>,
    tile: &Tile,
    height: u32,
    cancel: &CancelToken,
    pixel_fn: &F,
) -> Result<(), RenderError>
where
    F: Fn(Pixel) -> Rgb,
{
    for (row, segment) in segments {
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        let y = flip_row(row, height);
        for (x, cell) in (tile.x_offset..).zip(segment.iter_mut()) {
            *cell = pixel_fn(Pixel(x, y));
        }
    }
    debug!("Tile {:?} finished", tile);
    Ok(())
}

/// Runs the lone tile of a single-worker pass on the calling thread.
fn run_inline<F>(
    jobs: Vec<Vec<Segment<'_>>>,
    tiles: &[Tile],
    height: u32,
    cancel: &CancelToken,
    pixel_fn: &F,
) -> Result<(), RenderError>
where
    F: Fn(Pixel) -> Rgb,
{
    for (segments, tile) in jobs.into_iter().zip(tiles) {
        match panic::catch_unwind(AssertUnwindSafe(|| {
            fill_tile(segments, tile, height, cancel, pixel_fn)
        })) {
            Ok(outcome) => outcome?,
            Err(_) => return Err(RenderError::WorkerPanicked),
        }
    }
    Ok(())
}

/// Gives every tile its own scoped thread and joins them all.  A
/// panicked worker outranks any other failure, since its tile is in an
/// unknown state.
fn run_scoped<F>(
    jobs: Vec<Vec<Segment<'_>>>,
    tiles: &[Tile],
    height: u32,
    cancel: &CancelToken,
    pixel_fn: &F,
) -> Result<(), RenderError>
where
    F: Fn(Pixel) -> Rgb + Sync,
{
    let joined = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Result<(), RenderError>>> = jobs
            .into_iter()
            .zip(tiles)
            .map(|(segments, tile)| {
                spawner.spawn(move |_| fill_tile(segments, tile, height, cancel, pixel_fn))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    })
    .map_err(|_| RenderError::WorkerPanicked)?;

    let mut outcome = Ok(());
    for result in joined {
        match result {
            Err(_) => return Err(RenderError::WorkerPanicked),
            Ok(Err(e)) => outcome = Err(e),
            Ok(Ok(())) => {}
        }
    }
    outcome
}

/// Runs `pixel_fn` over every pixel of a `width` by `height` image,
/// split among workers according to `schedule`, and returns the filled
/// framebuffer along with how long it took.  Pixel coordinates are
/// passed with y growing upward; the result lands on the flipped row.
pub fn render_with<F>(
    width: u32,
    height: u32,
    schedule: Schedule,
    cancel: &CancelToken,
    pixel_fn: F,
) -> Result<(Framebuffer, Duration), RenderError>
where
    F: Fn(Pixel) -> Rgb + Sync,
{
    let start = Instant::now();
    let tiles = partition(width, height, schedule)?;
    let mut framebuffer = Framebuffer::blank(width, height);
    {
        let jobs = carve(&mut framebuffer.pixels, width, height, &tiles)?;
        match schedule {
            Schedule::Single => run_inline(jobs, &tiles, height, cancel, &pixel_fn)?,
            Schedule::Strips(_) => run_scoped(jobs, &tiles, height, cancel, &pixel_fn)?,
        }
    }
    Ok((framebuffer, start.elapsed()))
}

/// Renders the Mandelbrot set for `params`.  The palette must have
/// been built for the same iteration bound.
pub fn render(
    params: &RenderParams,
    palette: &Palette,
    schedule: Schedule,
    cancel: &CancelToken,
) -> Result<Frame, RenderError> {
    if palette.max_iterations() != params.max_iterations {
        return Err(RenderError::PaletteMismatch {
            expected: params.max_iterations,
            found: palette.max_iterations(),
        });
    }
    let view = params.view;
    let limit = params.max_iterations;
    let (framebuffer, elapsed) =
        render_with(params.width, params.height, schedule, cancel, |pixel| {
            palette.color(escape_time(view.pixel_to_point(&pixel), limit))
        })?;
    info!(
        "Rendered {}x{} at {} iterations on {} worker(s) in {}ms",
        params.width,
        params.height,
        limit,
        schedule.workers(),
        elapsed.as_millis()
    );
    Ok(Frame {
        framebuffer,
        elapsed,
        max_iterations: limit,
        mode: schedule.mode(),
        workers: schedule.workers(),
    })
}
