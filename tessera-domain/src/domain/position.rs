use std::cmp::Ordering;

use super::Domain;
use crate::{Coordinate, Layout};

impl<T: Coordinate> Domain<T> {
    /// Computes the tile coordinates of a cell into `tile_coords` and returns the position of that
    /// tile in the tile order.
    ///
    /// Irregular tiling has a single conceptual tile: the position is `0` and `tile_coords` is left
    /// untouched.
    pub fn tile_id(&self, cell_coords: &[T], tile_coords: &mut [u64]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        debug_assert_eq!(cell_coords.len(), self.dim_num());
        debug_assert_eq!(tile_coords.len(), self.dim_num());

        for (d, tile_coord) in tile_coords.iter_mut().enumerate() {
            *tile_coord = cell_coords[d].offset_from(self.low(d)) / self.extent_cells[d];
        }
        self.get_tile_pos(tile_coords)
    }

    /// Linearizes tile coordinates of the whole domain in the tile order, using the cached offsets.
    pub fn get_tile_pos(&self, tile_coords: &[u64]) -> u64 {
        match self.tile_order {
            Layout::RowMajor => self.get_tile_pos_row(tile_coords),
            Layout::ColMajor => self.get_tile_pos_col(tile_coords),
        }
    }

    /// Row-major variant of [`Domain::get_tile_pos`].
    pub fn get_tile_pos_row(&self, tile_coords: &[u64]) -> u64 {
        linearize(tile_coords, &self.tile_offsets_row)
    }

    /// Column-major variant of [`Domain::get_tile_pos`].
    pub fn get_tile_pos_col(&self, tile_coords: &[u64]) -> u64 {
        linearize(tile_coords, &self.tile_offsets_col)
    }

    /// Linearizes tile coordinates relative to an arbitrary tile-aligned `domain`.
    ///
    /// The offsets are recomputed from `domain` on every call. This is the only correct variant
    /// for a sub-domain such as an expanded non-empty domain, whose tile counts differ from the
    /// array's even though the extents are shared.
    pub fn get_tile_pos_in(&self, domain: &[T], tile_coords: &[u64]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        debug_assert_eq!(domain.len(), 2 * self.dim_num());

        let tile_count = |d: usize| {
            (domain[2 * d + 1].offset_from(domain[2 * d]) / self.extent_cells[d]).saturating_add(1)
        };
        let mut pos = 0u64;
        let mut offset = 1u64;
        let mut step = |d: usize| {
            pos = pos.saturating_add(tile_coords[d].saturating_mul(offset));
            offset = offset.saturating_mul(tile_count(d));
        };
        match self.tile_order {
            Layout::RowMajor => (0..self.dim_num()).rev().for_each(&mut step),
            Layout::ColMajor => (0..self.dim_num()).for_each(&mut step),
        }
        pos
    }

    /// Position of a cell within its tile, following the cell order.
    pub fn get_cell_pos(&self, coords: &[T]) -> u64 {
        match self.cell_order {
            Layout::RowMajor => self.get_cell_pos_row(coords),
            Layout::ColMajor => self.get_cell_pos_col(coords),
        }
    }

    /// Row-major position of a cell within its tile. `0` for irregular tiling.
    ///
    /// Positions in tiles of more than `u64::MAX` cells saturate.
    pub fn get_cell_pos_row(&self, coords: &[T]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        let mut offset = 1u64;
        let mut pos = 0u64;
        for (d, extent) in self.extent_cells.iter().enumerate().rev() {
            let within = coords[d].offset_from(self.low(d)) % extent;
            pos = pos.saturating_add(within.saturating_mul(offset));
            offset = offset.saturating_mul(*extent);
        }
        pos
    }

    /// Column-major position of a cell within its tile. `0` for irregular tiling.
    ///
    /// Positions in tiles of more than `u64::MAX` cells saturate.
    pub fn get_cell_pos_col(&self, coords: &[T]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        let mut offset = 1u64;
        let mut pos = 0u64;
        for (d, extent) in self.extent_cells.iter().enumerate() {
            let within = coords[d].offset_from(self.low(d)) % extent;
            pos = pos.saturating_add(within.saturating_mul(offset));
            offset = offset.saturating_mul(*extent);
        }
        pos
    }

    /// Row-major position of a cell within a dense `subarray`.
    pub fn get_cell_pos_row_in(&self, subarray: &[T], coords: &[T]) -> u64 {
        let mut offset = 1u64;
        let mut pos = 0u64;
        for d in (0..self.dim_num()).rev() {
            let [low, high] = [subarray[2 * d], subarray[2 * d + 1]];
            pos = pos.saturating_add(coords[d].offset_from(low).saturating_mul(offset));
            offset = offset.saturating_mul(high.offset_from(low).saturating_add(1));
        }
        pos
    }

    /// Column-major position of a cell within a dense `subarray`.
    pub fn get_cell_pos_col_in(&self, subarray: &[T], coords: &[T]) -> u64 {
        let mut offset = 1u64;
        let mut pos = 0u64;
        for d in 0..self.dim_num() {
            let [low, high] = [subarray[2 * d], subarray[2 * d + 1]];
            pos = pos.saturating_add(coords[d].offset_from(low).saturating_mul(offset));
            offset = offset.saturating_mul(high.offset_from(low).saturating_add(1));
        }
        pos
    }

    /// Compares two cells by the cell order alone.
    pub fn cell_order_cmp(&self, a: &[T], b: &[T]) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        match self.cell_order {
            Layout::RowMajor => lexicographic(a.iter().zip(b)),
            Layout::ColMajor => lexicographic(a.iter().zip(b).rev()),
        }
    }

    /// Compares two cells by the position of the tiles they fall into, ignoring where in the tile
    /// they lie. `scratch` receives tile coordinates and must hold one slot per dimension.
    pub fn tile_order_cmp(&self, a: &[T], b: &[T], scratch: &mut [u64]) -> Ordering {
        let tile_a = self.tile_id(a, scratch);
        let tile_b = self.tile_id(b, scratch);
        tile_a.cmp(&tile_b)
    }

    /// Compares two cells in the global cell order: tile order first, cell order within a tile.
    pub fn tile_cell_order_cmp(&self, a: &[T], b: &[T], scratch: &mut [u64]) -> Ordering {
        self.tile_order_cmp(a, b, scratch)
            .then_with(|| self.cell_order_cmp(a, b))
    }
}

#[inline]
fn linearize(tile_coords: &[u64], offsets: &[u64]) -> u64 {
    tile_coords
        .iter()
        .zip(offsets)
        .fold(0u64, |pos, (coord, offset)| {
            pos.saturating_add(coord.saturating_mul(*offset))
        })
}

fn lexicographic<'a, T: PartialOrd + 'a>(pairs: impl Iterator<Item = (&'a T, &'a T)>) -> Ordering {
    for (x, y) in pairs {
        if x < y {
            return Ordering::Less;
        }
        if x > y {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}
