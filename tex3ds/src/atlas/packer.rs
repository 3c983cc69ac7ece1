//! Best-fit rectangle packer.
//!
//! Rectangles are committed largest-first onto a set of candidate anchor
//! points. Every anchor is scored for both orientations; the score is the
//! total length of borders shared with already-placed rectangles and the
//! canvas edges, so placements hug their neighbors and leave the free
//! space contiguous. Before scoring, a candidate slides up or left until
//! it touches a neighbor; an anchor adjacent to nothing scores zero and
//! is skipped.

use std::collections::BTreeSet;

/// A rectangle still to place, in source order.
pub(crate) struct Block {
    pub source: usize,
    pub w: u32,
    pub h: u32,
}

/// A committed rectangle.
pub(crate) struct Placed {
    pub source: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
}

pub(crate) struct Packer {
    /// Committed rectangles ordered by (x, y); the score loop relies on
    /// this to stop early.
    placed: Vec<Placed>,
    /// Candidate top-left anchors.
    free: BTreeSet<(u32, u32)>,
    /// Rectangles to place; pre-sorted ascending by area, popped from the
    /// back.
    next: Vec<Block>,
    width: u32,
    height: u32,
}

impl Packer {
    pub fn new(next: Vec<Block>, width: u32, height: u32) -> Self {
        let mut free = BTreeSet::new();
        free.insert((0, 0));

        Self {
            placed: Vec::new(),
            free,
            next,
            width,
            height,
        }
    }

    /// Place every rectangle, or `None` if any fails to fit.
    pub fn solve(mut self) -> Option<Vec<Placed>> {
        while let Some(block) = self.next.pop() {
            let mut best: Option<(u32, u32)> = None;
            let mut best_score = 0u32;
            let mut best_rotated = false;

            for &(ax, ay) in &self.free {
                let score = self.score(ax, ay, block.w, block.h);
                if score > best_score {
                    best = Some((ax, ay));
                    best_score = score;
                    best_rotated = false;
                }

                if block.w != block.h {
                    // The rotated orientation commits only on strict
                    // improvement.
                    let score = self.score(ax, ay, block.h, block.w);
                    if score > best_score {
                        best = Some((ax, ay));
                        best_score = score;
                        best_rotated = true;
                    }
                }
            }

            let anchor = best?;

            let (w, h) = if best_rotated {
                (block.h, block.w)
            } else {
                (block.w, block.h)
            };

            let (mut x, mut y) = anchor;
            self.slide(&mut x, &mut y);

            let insert_at = self
                .placed
                .partition_point(|p| (p.x, p.y) < (x, y));
            self.placed.insert(
                insert_at,
                Placed {
                    source: block.source,
                    x,
                    y,
                    w,
                    h,
                    rotated: best_rotated,
                },
            );

            self.free.remove(&anchor);
            self.add_free(x + w, y);
            self.add_free(x, y + h);
            self.fixup();
        }

        Some(self.placed)
    }

    fn intersects_placed(&self, x: u32, y: u32) -> bool {
        self.placed
            .iter()
            .any(|p| x >= p.x && x < p.x + p.w && y >= p.y && y < p.y + p.h)
    }

    fn add_free(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        if self.intersects_placed(x, y) {
            return;
        }
        self.free.insert((x, y));
    }

    /// Drop anchors swallowed by the latest placement.
    fn fixup(&mut self) {
        let placed = std::mem::take(&mut self.placed);
        self.free
            .retain(|&(x, y)| !placed.iter().any(|p| x >= p.x && x < p.x + p.w && y >= p.y && y < p.y + p.h));
        self.placed = placed;
    }

    /// Slide a candidate position up or left until it hugs a neighbor or
    /// the canvas edge. Returns false for a strictly interior position,
    /// which cannot come from a valid anchor and scores zero.
    fn slide(&self, x: &mut u32, y: &mut u32) -> bool {
        let left = *x == 0 || self.intersects_placed(*x - 1, *y);
        let up = *y == 0 || self.intersects_placed(*x, *y - 1);

        match (left, up) {
            (false, false) => false,
            (true, true) => true,
            (true, false) => {
                // Adjacent on the left; move up as far as possible.
                *y -= 1;
                while *y > 0 && !self.intersects_placed(*x, *y - 1) {
                    *y -= 1;
                }
                true
            }
            (false, true) => {
                // Adjacent above; move left as far as possible.
                *x -= 1;
                while *x > 0 && !self.intersects_placed(*x - 1, *y) {
                    *x -= 1;
                }
                true
            }
        }
    }

    /// Score a tentative placement; zero means unusable.
    fn score(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let (mut x, mut y) = (x, y);
        if !self.slide(&mut x, &mut y) {
            return 0;
        }

        if x + w > self.width || y + h > self.height {
            return 0;
        }

        let mut score = 0;

        for p in &self.placed {
            if x + w < p.x {
                break;
            }

            if x < p.x + p.w && x + w > p.x && y < p.y + p.h && y + h > p.y {
                return 0;
            }

            // Shared vertical border.
            if x == p.x + p.w || x + w == p.x {
                let start = y.max(p.y);
                let end = (y + h).min(p.y + p.h);
                if end > start {
                    score += end - start;
                }
            }

            // Shared horizontal border.
            if y == p.y + p.h || y + h == p.y {
                let start = x.max(p.x);
                let end = (x + w).min(p.x + p.w);
                if end > start {
                    score += end - start;
                }
            }
        }

        if x == 0 {
            score += h;
        }
        if x + w == self.width {
            score += h;
        }
        if y == 0 {
            score += w;
        }
        if y + h == self.height {
            score += w;
        }

        score
    }
}
