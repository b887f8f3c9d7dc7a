//! The immutable coordinate space of an array and its tiling geometry.

mod iter;
mod position;
mod region;

use std::fmt::{Display, Formatter};

use tessera_dtype::PType;
use tessera_error::{TesseraResult, tessera_err};

pub use region::Overlap;

use crate::{Coordinate, Dimension, Layout};

/// An initialized, immutable N-dimensional domain.
///
/// All flat buffers follow the dimension order: bounds are laid out as
/// `[low_0, high_0, low_1, high_1, ...]`, extents and tile offsets hold one value per dimension.
/// A `Domain` is only obtainable from [`crate::DomainBuilder::build`], so every query method
/// operates on fully computed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain<T> {
    dimensions: Vec<Dimension<T>>,
    cell_order: Layout,
    tile_order: Layout,
    domain: Box<[T]>,
    tile_extents: Option<Box<[T]>>,
    // The tile extents as cell counts. Empty for irregular tiling.
    extent_cells: Box<[u64]>,
    cell_num_per_tile: u64,
    tile_domain: Option<Box<[u64]>>,
    tile_offsets_row: Box<[u64]>,
    tile_offsets_col: Box<[u64]>,
}

impl<T: Coordinate> Domain<T> {
    pub(crate) fn new(dimensions: Vec<Dimension<T>>, cell_order: Layout, tile_order: Layout) -> Self {
        let domain: Box<[T]> = dimensions.iter().flat_map(|dim| dim.domain()).collect();
        let tile_extents: Option<Box<[T]>> =
            dimensions.iter().map(|dim| dim.tile_extent()).collect();
        let extent_cells: Box<[u64]> = tile_extents
            .iter()
            .flat_map(|extents| extents.iter())
            .map(|extent| extent.as_cell_count().unwrap_or(1))
            .collect();

        let mut this = Self {
            dimensions,
            cell_order,
            tile_order,
            domain,
            tile_extents,
            extent_cells,
            cell_num_per_tile: 0,
            tile_domain: None,
            tile_offsets_row: Box::default(),
            tile_offsets_col: Box::default(),
        };
        this.compute_cell_num_per_tile();
        this.compute_tile_domain();
        this.compute_tile_offsets();
        this
    }

    fn compute_cell_num_per_tile(&mut self) {
        if self.is_irregular() {
            return;
        }
        self.cell_num_per_tile = self
            .extent_cells
            .iter()
            .fold(1u64, |acc, cells| acc.saturating_mul(*cells));
    }

    fn compute_tile_domain(&mut self) {
        if self.is_irregular() {
            return;
        }
        self.tile_domain = Some(
            self.dimensions
                .iter()
                .flat_map(|dim| [0, dim.tile_num().unwrap_or(1) - 1])
                .collect(),
        );
    }

    // Row-major offsets are prefix products growing from the last dimension backwards,
    // column-major offsets grow from the first dimension forwards.
    fn compute_tile_offsets(&mut self) {
        let Some(tile_domain) = &self.tile_domain else {
            return;
        };
        let tile_counts: Vec<u64> = tile_domain.chunks_exact(2).map(|r| r[1] + 1).collect();

        let mut offsets_col = Vec::with_capacity(tile_counts.len());
        let mut acc = 1u64;
        for count in &tile_counts {
            offsets_col.push(acc);
            acc = acc.saturating_mul(*count);
        }

        let mut offsets_row = vec![0u64; tile_counts.len()];
        let mut acc = 1u64;
        for (offset, count) in offsets_row.iter_mut().zip(&tile_counts).rev() {
            *offset = acc;
            acc = acc.saturating_mul(*count);
        }

        self.tile_offsets_col = offsets_col.into_boxed_slice();
        self.tile_offsets_row = offsets_row.into_boxed_slice();
    }

    /// The numeric kind shared by every dimension.
    pub fn ptype(&self) -> PType {
        T::PTYPE
    }

    /// The number of dimensions.
    pub fn dim_num(&self) -> usize {
        self.dimensions.len()
    }

    /// The dimensions, in coordinate order.
    pub fn dimensions(&self) -> &[Dimension<T>] {
        &self.dimensions
    }

    /// The `idx`-th dimension.
    pub fn dimension(&self, idx: usize) -> TesseraResult<&Dimension<T>> {
        self.dimensions
            .get(idx)
            .ok_or_else(|| tessera_err!(OutOfBounds: idx, 0, self.dimensions.len()))
    }

    /// The dimension called `name`, if any.
    pub fn dimension_by_name(&self, name: &str) -> Option<&Dimension<T>> {
        self.dimensions.iter().find(|dim| dim.name() == name)
    }

    /// Whether a dimension is called `name`.
    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension_by_name(name).is_some()
    }

    /// The order of cells within a tile.
    pub fn cell_order(&self) -> Layout {
        self.cell_order
    }

    /// The order of tiles within the domain.
    pub fn tile_order(&self) -> Layout {
        self.tile_order
    }

    /// The flat `[low_0, high_0, low_1, high_1, ...]` bounds of the whole domain.
    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    /// The `[low, high]` bounds of dimension `idx`.
    pub fn domain_of(&self, idx: usize) -> TesseraResult<[T; 2]> {
        self.dimension(idx).map(Dimension::domain)
    }

    /// The tile extents, one per dimension, or `None` for irregular tiling.
    pub fn tile_extents(&self) -> Option<&[T]> {
        self.tile_extents.as_deref()
    }

    /// The tile extent of dimension `idx`, `None` for irregular tiling.
    pub fn tile_extent(&self, idx: usize) -> TesseraResult<Option<T>> {
        self.dimension(idx).map(Dimension::tile_extent)
    }

    /// Whether the domain is irregularly tiled, i.e. no dimension has a tile extent.
    pub fn is_irregular(&self) -> bool {
        self.tile_extents.is_none()
    }

    /// The number of cells in a tile. `0` for irregular tiling.
    pub fn cell_num_per_tile(&self) -> u64 {
        self.cell_num_per_tile
    }

    /// The flat `[0, tile_count_d - 1]` ranges per dimension, or `None` for irregular tiling.
    pub fn tile_domain(&self) -> Option<&[u64]> {
        self.tile_domain.as_deref()
    }

    /// Cached offsets that linearize tile coordinates in row-major tile order.
    pub fn tile_offsets_row(&self) -> &[u64] {
        &self.tile_offsets_row
    }

    /// Cached offsets that linearize tile coordinates in column-major tile order.
    pub fn tile_offsets_col(&self) -> &[u64] {
        &self.tile_offsets_col
    }

    #[inline]
    fn low(&self, d: usize) -> T {
        self.domain[2 * d]
    }
}

impl<T: Coordinate> Display for Domain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Domain ===")?;
        writeln!(f, "- Cell order: {}", self.cell_order)?;
        writeln!(f, "- Tile order: {}", self.tile_order)?;
        for dim in &self.dimensions {
            writeln!(f)?;
            write!(f, "{dim}")?;
        }
        Ok(())
    }
}
