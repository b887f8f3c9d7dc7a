use super::Domain;
use crate::{Coordinate, Layout};

impl<T: Coordinate> Domain<T> {
    /// Advances `coords` to the next cell of `domain` under the cell order.
    ///
    /// The fastest-varying axis is incremented and carries into slower axes, which wrap to their
    /// low bound. Returns `false` once the slowest axis steps past its high bound; the vector is
    /// then left one past the last cell on that axis and at the low bound on every other axis.
    pub fn get_next_cell_coords(&self, domain: &[T], coords: &mut [T]) -> bool {
        match self.cell_order {
            Layout::RowMajor => step_forward(domain, coords, (0..coords.len()).rev()),
            Layout::ColMajor => step_forward(domain, coords, 0..coords.len()),
        }
    }

    /// Moves `coords` back to the previous cell of `domain` under the cell order.
    ///
    /// Mirrors [`Domain::get_next_cell_coords`]: returns `false` once the slowest axis steps
    /// below its low bound.
    pub fn get_previous_cell_coords(&self, domain: &[T], coords: &mut [T]) -> bool {
        match self.cell_order {
            Layout::RowMajor => step_backward(domain, coords, (0..coords.len()).rev()),
            Layout::ColMajor => step_backward(domain, coords, 0..coords.len()),
        }
    }

    /// Advances `tile_coords` to the next tile of `tile_domain` under the tile order.
    pub fn get_next_tile_coords(&self, tile_domain: &[u64], tile_coords: &mut [u64]) -> bool {
        match self.tile_order {
            Layout::RowMajor => step_forward(tile_domain, tile_coords, (0..tile_coords.len()).rev()),
            Layout::ColMajor => step_forward(tile_domain, tile_coords, 0..tile_coords.len()),
        }
    }
}

/// Odometer increment over `axes`, fastest-varying first.
fn step_forward<C: Coordinate>(
    bounds: &[C],
    coords: &mut [C],
    axes: impl Iterator<Item = usize>,
) -> bool {
    let mut axes = axes.peekable();
    while let Some(d) = axes.next() {
        let next = coords[d].successor();
        if let Some(next) = next.filter(|next| *next <= bounds[2 * d + 1]) {
            coords[d] = next;
            return true;
        }
        if axes.peek().is_none() {
            coords[d] = next.unwrap_or(coords[d]);
            return false;
        }
        coords[d] = bounds[2 * d];
    }
    false
}

/// Odometer decrement over `axes`, fastest-varying first.
fn step_backward<C: Coordinate>(
    bounds: &[C],
    coords: &mut [C],
    axes: impl Iterator<Item = usize>,
) -> bool {
    let mut axes = axes.peekable();
    while let Some(d) = axes.next() {
        let prev = coords[d].predecessor();
        if let Some(prev) = prev.filter(|prev| *prev >= bounds[2 * d]) {
            coords[d] = prev;
            return true;
        }
        if axes.peek().is_none() {
            coords[d] = prev.unwrap_or(coords[d]);
            return false;
        }
        coords[d] = bounds[2 * d + 1];
    }
    false
}
