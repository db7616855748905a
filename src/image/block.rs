//! Tile-block splitting over an occupancy bitmap.
//!
//! When a region copy spans many tiles, the tiles already in cache have
//! been blitted and the rest must be generated. Generating them one tile
//! at a time wastes the fixed per-call overhead most operators have;
//! generating the whole span in one call recomputes tiles that were
//! cached. [`TileBlock::best_split`] walks the middle ground: it
//! partitions the uncached cells of the span into few large axis-aligned
//! rectangles, each generated with a single region-fill call.
//!
//! The partition is greedy and single-pass: it scans row by row,
//! extends each unfilled run downward while the same span stays free,
//! and claims the resulting rectangle. That is not a provably minimal
//! rectangle cover, but it is linear-time and in practice produces a
//! handful of large blocks. Each block carries a benefit (new tiles
//! produced) and work (area plus a fixed per-call constant) so callers
//! can judge a split's value.

use std::fmt;
use std::sync::Arc;

use bitvec::prelude::*;

/// Which tiles of a rectangular span are already cached.
///
/// Cell (0, 0) corresponds to tile coordinate
/// (`origin_x`, `origin_y`); a set bit means "already computed".
pub struct TileOccupancy {
    origin_x: i32,
    origin_y: i32,
    width: usize,
    height: usize,
    bits: BitVec,
}

impl TileOccupancy {
    /// An all-unoccupied map for a span of `width` × `height` tiles
    /// whose top-left tile is (`origin_x`, `origin_y`).
    pub fn new(origin_x: i32, origin_y: i32, width: usize, height: usize) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
            bits: bitvec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile coordinate of cell (0, 0).
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    fn index(&self, cx: usize, cy: usize) -> usize {
        debug_assert!(cx < self.width && cy < self.height);
        cy * self.width + cx
    }

    /// Mark the tile at absolute coordinate (`tile_x`, `tile_y`).
    pub fn set(&mut self, tile_x: i32, tile_y: i32, occupied: bool) {
        let cx = (tile_x - self.origin_x) as usize;
        let cy = (tile_y - self.origin_y) as usize;
        let i = self.index(cx, cy);
        self.bits.set(i, occupied);
    }

    /// Occupancy of the cell at bitmap position (`cx`, `cy`).
    pub fn cell(&self, cx: usize, cy: usize) -> bool {
        self.bits[self.index(cx, cy)]
    }

    /// Number of unoccupied cells in the whole map.
    pub fn unoccupied(&self) -> usize {
        self.width * self.height - self.bits.count_ones()
    }
}

/// A rectangular sub-region of an occupancy map, annotated with how many
/// uncomputed tiles it would produce.
pub struct TileBlock {
    map: Arc<TileOccupancy>,
    x_off: usize,
    y_off: usize,
    w: usize,
    h: usize,
    benefit: usize,
}

impl TileBlock {
    /// A block covering the entire occupancy map.
    pub fn spanning(map: Arc<TileOccupancy>) -> Self {
        let (w, h) = (map.width(), map.height());
        Self::over(map, 0, 0, w, h)
    }

    fn over(map: Arc<TileOccupancy>, x_off: usize, y_off: usize, w: usize, h: usize) -> Self {
        let mut benefit = 0;
        for y in 0..h {
            for x in 0..w {
                if !map.cell(x + x_off, y + y_off) {
                    benefit += 1;
                }
            }
        }
        Self {
            map,
            x_off,
            y_off,
            w,
            h,
            benefit,
        }
    }

    /// Tile x coordinate of this block's left edge.
    pub fn tile_x(&self) -> i32 {
        self.map.origin_x + self.x_off as i32
    }

    /// Tile y coordinate of this block's top edge.
    pub fn tile_y(&self) -> i32 {
        self.map.origin_y + self.y_off as i32
    }

    /// Block width in tiles.
    pub fn width(&self) -> usize {
        self.w
    }

    /// Block height in tiles.
    pub fn height(&self) -> usize {
        self.h
    }

    /// Number of not-yet-computed tiles this block produces.
    pub fn benefit(&self) -> usize {
        self.benefit
    }

    /// Approximate cost of generating this block: its area plus a fixed
    /// per-call constant.
    pub fn work(&self) -> usize {
        self.w * self.h + 1
    }

    /// Total work of a set of blocks.
    pub fn total_work(blocks: &[TileBlock]) -> usize {
        blocks.iter().map(TileBlock::work).sum()
    }

    /// Partition this block into regions worth generating.
    ///
    /// Returns `None` when every cell is already occupied (nothing to
    /// generate), the whole simplified block when no cell is occupied
    /// (one big fill wastes nothing), and otherwise the greedy partition
    /// of the unoccupied cells into maximal rectangles.
    pub fn best_split(mut self) -> Option<Vec<TileBlock>> {
        if self.simplify() {
            return None;
        }

        // Every cell unoccupied: the block itself is the optimal split.
        if self.benefit == self.w * self.h {
            return Some(vec![self]);
        }

        Some(self.split_one_go())
    }

    /// Trim fully occupied leading/trailing rows and columns, tightening
    /// the block to the bounding box of its unoccupied cells. Returns
    /// true if the block was simplified out of existence.
    fn simplify(&mut self) -> bool {
        while self.h > 0 && self.row_occupied(0) {
            self.y_off += 1;
            self.h -= 1;
        }

        if self.h == 0 {
            return true;
        }

        // At least one unoccupied cell exists from here on, so each of
        // the remaining trims terminates before emptying the block.
        while self.row_occupied(self.h - 1) {
            self.h -= 1;
        }
        while self.col_occupied(0) {
            self.x_off += 1;
            self.w -= 1;
        }
        while self.col_occupied(self.w - 1) {
            self.w -= 1;
        }

        false
    }

    fn row_occupied(&self, row: usize) -> bool {
        (0..self.w).all(|x| self.map.cell(x + self.x_off, row + self.y_off))
    }

    fn col_occupied(&self, col: usize) -> bool {
        (0..self.h).all(|y| self.map.cell(col + self.x_off, y + self.y_off))
    }

    /// Greedy single-pass partition of the unoccupied cells.
    ///
    /// Scans row-major; each unfilled run is extended downward while the
    /// same horizontal span stays free in each subsequent row, claiming
    /// one maximal rectangle. Claimed cells are marked in a scratch copy
    /// so later scans skip them.
    fn split_one_go(&self) -> Vec<TileBlock> {
        let occ_w = self.map.width();
        let mut filled = self.map.bits.clone();
        let mut items = Vec::new();

        for y in self.y_off..self.y_off + self.h {
            let mut x = self.x_off;
            while x < self.x_off + self.w {
                if filled[y * occ_w + x] {
                    x += 1;
                    continue;
                }

                // Length of the free run in this row, filling as we go.
                let mut cw = self.x_off + self.w - x;
                let mut cx = x;
                while cx < x + cw {
                    if filled[y * occ_w + cx] {
                        cw = cx - x;
                    } else {
                        filled.set(y * occ_w + cx, true);
                        cx += 1;
                    }
                }

                // Extend down while the whole span stays free.
                let mut ch = 1;
                'rows: for cy in y + 1..self.y_off + self.h {
                    for cx in x..x + cw {
                        if filled[cy * occ_w + cx] {
                            // Partial row: stop here, a later scan
                            // claims the leftovers.
                            break 'rows;
                        }
                    }
                    for cx in x..x + cw {
                        filled.set(cy * occ_w + cx, true);
                    }
                    ch += 1;
                }

                items.push(TileBlock::over(
                    self.map.clone(),
                    x,
                    y,
                    cw,
                    ch,
                ));
                x += cw;
            }
        }

        items
    }
}

impl fmt::Debug for TileBlock {
    /// Renders the occupancy map ('*' computed, '.' missing) with this
    /// block's extent bracketed, which is the view you want when the
    /// split goes wrong.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TileBlock {{ at ({}, {}), {}x{} tiles, benefit {} }}",
            self.tile_x(),
            self.tile_y(),
            self.w,
            self.h,
            self.benefit
        )?;
        for y in 0..self.map.height() {
            let in_rows = y >= self.y_off && y < self.y_off + self.h;
            for x in 0..self.map.width() {
                let in_block = in_rows && x >= self.x_off && x < self.x_off + self.w;
                f.write_str(if in_block { "[" } else { " " })?;
                f.write_str(if self.map.cell(x, y) { "*" } else { "." })?;
                f.write_str(if in_block { "]" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a map from rows of '.'/'*' art.
    fn map_from(art: &[&str]) -> Arc<TileOccupancy> {
        let h = art.len();
        let w = art[0].len();
        let mut map = TileOccupancy::new(0, 0, w, h);
        for (y, row) in art.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                map.set(x as i32, y as i32, c == '*');
            }
        }
        Arc::new(map)
    }

    fn blocks_of(art: &[&str]) -> Option<Vec<TileBlock>> {
        TileBlock::spanning(map_from(art)).best_split()
    }

    #[test]
    fn test_fully_occupied_yields_no_blocks() {
        assert!(blocks_of(&["***", "***"]).is_none());
    }

    #[test]
    fn test_fully_unoccupied_yields_single_block() {
        let blocks = blocks_of(&["...", "...", "..."]).unwrap();
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!((b.tile_x(), b.tile_y()), (0, 0));
        assert_eq!((b.width(), b.height()), (3, 3));
        assert_eq!(b.benefit(), 9);
        assert_eq!(b.work(), 10);
    }

    #[test]
    fn test_simplify_trims_occupied_border() {
        let blocks = blocks_of(&[
            "*****", //
            "*..**", //
            "*..**", //
            "*****",
        ])
        .unwrap();
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!((b.tile_x(), b.tile_y()), (1, 1));
        assert_eq!((b.width(), b.height()), (2, 2));
        assert_eq!(b.benefit(), 4);
    }

    #[test]
    fn test_benefit_conservation() {
        let patterns: &[&[&str]] = &[
            &["*.*", ".*.", "*.*"],
            &["....", ".**.", ".**.", "...."],
            &["*...*", "*...*", "*****", "..*.."],
            &[".*.*.*"],
            &["*", ".", "*", ".", "*"],
        ];
        for art in patterns {
            let map = map_from(art);
            let expected = map.unoccupied();
            let blocks = TileBlock::spanning(map).best_split().unwrap();
            let total: usize = blocks.iter().map(TileBlock::benefit).sum();
            assert_eq!(total, expected, "benefit not conserved for {:?}", art);
        }
    }

    #[test]
    fn test_partition_is_disjoint_and_covers() {
        let art: &[&str] = &[
            "**...", //
            "*...*", //
            "..***", //
            ".....",
        ];
        let map = map_from(art);
        let w = map.width();
        let h = map.height();
        let blocks = TileBlock::spanning(map.clone()).best_split().unwrap();

        let mut covered = vec![0u8; w * h];
        for b in &blocks {
            for y in 0..b.height() {
                for x in 0..b.width() {
                    let cx = (b.tile_x() as usize) + x;
                    let cy = (b.tile_y() as usize) + y;
                    covered[cy * w + cx] += 1;
                    // Claimed cells were unoccupied.
                    assert!(!map.cell(cx, cy));
                }
            }
        }
        for y in 0..h {
            for x in 0..w {
                let expected = u8::from(!map.cell(x, y));
                assert_eq!(
                    covered[y * w + x],
                    expected,
                    "cell ({}, {}) covered {} times",
                    x,
                    y,
                    covered[y * w + x]
                );
            }
        }
    }

    #[test]
    fn test_greedy_extends_runs_downward() {
        // A free 2-wide column spanning all three rows becomes one
        // block, not three.
        let blocks = blocks_of(&[
            "*..*", //
            "*..*", //
            "*..*",
        ])
        .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].width(), blocks[0].height()), (2, 3));
    }

    #[test]
    fn test_origin_offsets_carry_into_tile_coords() {
        let mut map = TileOccupancy::new(10, -5, 3, 2);
        map.set(10, -5, true);
        let blocks = TileBlock::spanning(Arc::new(map)).best_split().unwrap();
        let total: usize = blocks.iter().map(TileBlock::benefit).sum();
        assert_eq!(total, 5);
        for b in &blocks {
            assert!(b.tile_x() >= 10 && b.tile_y() >= -5);
        }
    }
}
