// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits an image into the rectangles handed to render workers.

use crate::errors::RenderError;

/// A rectangle of the integral plane.  Offsets are measured from the
/// pixel at 0,0, with y growing upward like the complex plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Leftmost column.
    pub x_offset: u32,
    /// Lowest row.
    pub y_offset: u32,
    /// Columns covered.
    pub width: u32,
    /// Rows covered.
    pub height: u32,
}

impl Tile {
    /// The number of pixels in the tile.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// A tile may legitimately cover nothing when there are more
    /// workers than columns.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the rightmost column.
    pub fn right(&self) -> u32 {
        self.x_offset + self.width
    }

    /// One past the highest row.
    pub fn top(&self) -> u32 {
        self.y_offset + self.height
    }

    /// Whether the two tiles share any pixel.  Empty tiles share
    /// nothing.
    pub fn overlaps(&self, other: &Tile) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x_offset < other.right()
            && other.x_offset < self.right()
            && self.y_offset < other.top()
            && other.y_offset < self.top()
    }
}

/// Whether passes run on one worker or on every available processor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerMode {
    /// One worker, on the calling thread.
    Single,
    /// One worker per available processor.
    Multi,
}

/// How a pass is split among workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// One tile, rendered on the calling thread.  No threads are
    /// spawned, so there is no scheduling overhead at all.
    Single,
    /// That many vertical strips, one scoped thread each.
    Strips(usize),
}

impl Schedule {
    /// The schedule for a given number of workers: one worker renders
    /// inline, more than one get a strip each.
    pub fn for_workers(workers: usize) -> Schedule {
        match workers {
            1 => Schedule::Single,
            n => Schedule::Strips(n),
        }
    }

    /// The number of workers, and so of tiles, this schedule uses.
    pub fn workers(&self) -> usize {
        match *self {
            Schedule::Single => 1,
            Schedule::Strips(n) => n,
        }
    }

    /// The worker mode this schedule runs in when nothing else says
    /// otherwise.
    pub fn mode(&self) -> WorkerMode {
        match *self {
            Schedule::Single => WorkerMode::Single,
            Schedule::Strips(_) => WorkerMode::Multi,
        }
    }
}

/// Partitions a `width` by `height` image according to `schedule`.
/// Strips are equal width, and the last one takes whatever columns
/// the division leaves over, so the tiles always cover the image
/// exactly once.
pub fn partition(width: u32, height: u32, schedule: Schedule) -> Result<Vec<Tile>, RenderError> {
    match schedule {
        Schedule::Single => Ok(vec![Tile {
            x_offset: 0,
            y_offset: 0,
            width,
            height,
        }]),
        Schedule::Strips(0) => Err(RenderError::InvalidWorkerCount),
        Schedule::Strips(n) => {
            // More strips than columns leaves the extras empty.
            let strip = (width as usize / n) as u32;
            Ok((0..n)
                .map(|i| {
                    let x_offset = strip * i as u32;
                    let w = if i == n - 1 { width - x_offset } else { strip };
                    Tile {
                        x_offset,
                        y_offset: 0,
                        width: w,
                        height,
                    }
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    fn coverage(width: u32, height: u32, tiles: &[Tile]) -> Vec<u32> {
        let mut hits = vec![0u32; (width * height) as usize];
        for tile in tiles {
            for (x, y) in iproduct!(tile.x_offset..tile.right(), tile.y_offset..tile.top()) {
                hits[(y * width + x) as usize] += 1;
            }
        }
        hits
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert_eq!(
            partition(10, 10, Schedule::Strips(0)),
            Err(RenderError::InvalidWorkerCount)
        );
    }

    #[test]
    fn single_covers_everything() {
        let tiles = partition(7, 3, Schedule::Single).unwrap();
        assert_eq!(
            tiles,
            vec![Tile {
                x_offset: 0,
                y_offset: 0,
                width: 7,
                height: 3
            }]
        );
    }

    #[test]
    fn strips_are_exact_cover() {
        let shapes = iproduct!(vec![1, 4, 7, 33], vec![1, 5], vec![1, 2, 3, 4, 8, 40]);
        for (width, height, n) in shapes {
            let tiles = partition(width, height, Schedule::Strips(n)).unwrap();
            assert_eq!(tiles.len(), n);
            assert!(coverage(width, height, &tiles).iter().all(|&h| h == 1));
            let total: usize = tiles.iter().map(Tile::len).sum();
            assert_eq!(total, (width * height) as usize);
        }
    }

    #[test]
    fn last_strip_takes_the_remainder() {
        let tiles = partition(10, 2, Schedule::Strips(3)).unwrap();
        let widths: Vec<u32> = tiles.iter().map(|t| t.width).collect();
        assert_eq!(widths, vec![3, 3, 4]);
        assert_eq!(tiles[2].x_offset, 6);
    }

    #[test]
    fn surplus_workers_get_empty_strips() {
        let tiles = partition(2, 2, Schedule::Strips(4)).unwrap();
        assert_eq!(tiles.iter().filter(|t| t.is_empty()).count(), 3);
        assert_eq!(tiles[3].width, 2);
    }

    #[test]
    fn strips_never_overlap() {
        let tiles = partition(33, 4, Schedule::Strips(5)).unwrap();
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
        let a = Tile { x_offset: 0, y_offset: 0, width: 3, height: 3 };
        let b = Tile { x_offset: 2, y_offset: 2, width: 3, height: 3 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn schedule_for_workers() {
        assert_eq!(Schedule::for_workers(1), Schedule::Single);
        assert_eq!(Schedule::for_workers(6), Schedule::Strips(6));
        assert_eq!(Schedule::Strips(6).workers(), 6);
        assert_eq!(Schedule::Single.workers(), 1);
        assert_eq!(Schedule::Single.mode(), WorkerMode::Single);
        assert_eq!(Schedule::Strips(1).mode(), WorkerMode::Multi);
    }
}
