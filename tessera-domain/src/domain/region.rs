use num_enum::IntoPrimitive;
use tessera_error::{TesseraResult, tessera_bail, tessera_err};

use super::Domain;
use crate::{Coordinate, Layout};

/// How much of a region `b` is covered by its intersection with a region `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(u8)]
pub enum Overlap {
    /// The regions are disjoint.
    None = 0,
    /// `b` lies entirely within `a`.
    Full = 1,
    /// Part of `b` is covered, and the covered cells are scattered under the cell order.
    Partial = 2,
    /// Part of `b` is covered, and the covered cells form a single run under the cell order.
    Contiguous = 3,
}

impl<T: Coordinate> Domain<T> {
    /// The number of tiles covering the whole domain. `0` for irregular tiling.
    pub fn tile_num(&self) -> u64 {
        match &self.tile_domain {
            None => 0,
            Some(tile_domain) => tile_domain
                .chunks_exact(2)
                .fold(1u64, |acc, r| acc.saturating_mul(r[1] - r[0] + 1)),
        }
    }

    /// The number of tiles covering `range`, which must already be tile-aligned
    /// (see [`Domain::expand_domain`]). `0` for irregular tiling.
    pub fn tile_num_in(&self, range: &[T]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        self.extent_cells
            .iter()
            .enumerate()
            .fold(1u64, |acc, (d, extent)| {
                let tiles = range[2 * d + 1].offset_from(range[2 * d]) / extent;
                acc.saturating_mul(tiles.saturating_add(1))
            })
    }

    /// The number of cells in `range`, saturating at `u64::MAX`. `0` for floating point kinds,
    /// whose ranges are not countable.
    pub fn cell_num(&self, range: &[T]) -> u64 {
        if !T::INTEGRAL {
            return 0;
        }
        range.chunks_exact(2).fold(1u64, |acc, r| {
            acc.saturating_mul(r[1].offset_from(r[0]).saturating_add(1))
        })
    }

    /// Writes the tile-index ranges touched by `subarray`, without clamping them to the domain's
    /// upper bound.
    ///
    /// Tile indices cannot be negative: an axis that starts below the domain starts at tile `0`,
    /// and an axis that lies entirely below the domain is written as the empty range `[1, 0]`.
    pub fn get_tile_domain(&self, subarray: &[T], out: &mut [u64]) -> TesseraResult<()> {
        self.require_regular("get_tile_domain")?;
        for (d, extent) in self.extent_cells.iter().enumerate() {
            let low = self.low(d);
            if subarray[2 * d + 1] < low {
                out[2 * d] = 1;
                out[2 * d + 1] = 0;
                continue;
            }
            out[2 * d] = subarray[2 * d].offset_from(low) / extent;
            out[2 * d + 1] = subarray[2 * d + 1].offset_from(low) / extent;
        }
        Ok(())
    }

    /// Writes the full tile domain into `tile_domain` and the tile-index range of `subarray`,
    /// clamped to it, into `subarray_tile_domain`.
    ///
    /// An axis of `subarray` that misses the domain comes out with `low > high`, so there are no
    /// tiles to visit.
    pub fn get_subarray_tile_domain(
        &self,
        subarray: &[T],
        tile_domain: &mut [u64],
        subarray_tile_domain: &mut [u64],
    ) -> TesseraResult<()> {
        let Some(full) = &self.tile_domain else {
            tessera_bail!(InvalidDomain: "get_subarray_tile_domain requires regular tiling");
        };
        tile_domain.copy_from_slice(full);
        self.get_tile_domain(subarray, subarray_tile_domain)?;
        for (bounds, full) in subarray_tile_domain
            .chunks_exact_mut(2)
            .zip(full.chunks_exact(2))
        {
            bounds[0] = bounds[0].max(full[0]);
            bounds[1] = bounds[1].min(full[1]);
        }
        Ok(())
    }

    /// The cell range covered by the tile at `tile_coords`, written into `out`.
    ///
    /// For irregular tiling the single tile is the whole domain.
    pub fn get_tile_subarray(&self, tile_coords: &[u64], out: &mut [T]) {
        if self.is_irregular() {
            out.copy_from_slice(&self.domain);
            return;
        }
        for (d, extent) in self.extent_cells.iter().enumerate() {
            let start = tile_coords[d].saturating_mul(*extent);
            out[2 * d] = self.low(d).add_offset(start);
            out[2 * d + 1] = self.low(d).add_offset(start.saturating_add(extent - 1));
        }
    }

    /// Rounds `value` down to the start of the tile containing it along dimension `dim`.
    pub fn floor_to_tile(&self, value: T, dim: usize) -> TesseraResult<T> {
        let low = self.dimension(dim)?.low();
        let Some(extent) = self.extent_cells.get(dim) else {
            return Ok(low);
        };
        Ok(low.add_offset(value.offset_from(low) / extent * extent))
    }

    /// Grows `range` in place until every axis starts and ends on a tile boundary.
    ///
    /// Leaves `range` untouched for irregular tiling.
    pub fn expand_domain(&self, range: &mut [T]) {
        for (d, extent) in self.extent_cells.iter().enumerate() {
            let low = self.low(d);
            let first = range[2 * d].offset_from(low) / extent;
            let last = range[2 * d + 1].offset_from(low) / extent;
            range[2 * d] = low.add_offset(first.saturating_mul(*extent));
            range[2 * d + 1] =
                low.add_offset(last.saturating_add(1).saturating_mul(*extent) - 1);
        }
    }

    /// Clamps `range` in place to the bounds of the domain.
    pub fn crop_domain(&self, range: &mut [T]) {
        for (bounds, domain) in range.chunks_exact_mut(2).zip(self.domain.chunks_exact(2)) {
            if bounds[0] < domain[0] {
                bounds[0] = domain[0];
            }
            if bounds[1] > domain[1] {
                bounds[1] = domain[1];
            }
        }
    }

    /// Whether `inner` lies within `outer` on every axis.
    pub fn covered(&self, inner: &[T], outer: &[T]) -> bool {
        inner
            .chunks_exact(2)
            .zip(outer.chunks_exact(2))
            .all(|(i, o)| i[0] >= o[0] && i[1] <= o[1])
    }

    /// Whether `a` and `b` intersect on every axis.
    pub fn overlaps(&self, a: &[T], b: &[T]) -> bool {
        a.chunks_exact(2)
            .zip(b.chunks_exact(2))
            .all(|(a, b)| a[0] <= b[1] && b[0] <= a[1])
    }

    /// Classifies how much of `b` is covered by `a`, writing their intersection into `overlap`.
    ///
    /// When the result is [`Overlap::None`] at least one axis of `overlap` has `low > high`.
    pub fn subarray_overlap(&self, a: &[T], b: &[T], overlap: &mut [T]) -> Overlap {
        let n = self.dim_num();
        for d in 0..n {
            let [lo, hi] = [2 * d, 2 * d + 1];
            overlap[lo] = if a[lo] > b[lo] { a[lo] } else { b[lo] };
            overlap[hi] = if a[hi] < b[hi] { a[hi] } else { b[hi] };
        }

        if overlap.chunks_exact(2).any(|r| r[0] > r[1]) {
            return Overlap::None;
        }

        let axis_matches = |d: usize| overlap[2 * d..2 * d + 2] == b[2 * d..2 * d + 2];
        if (0..n).all(axis_matches) {
            return Overlap::Full;
        }

        // The intersection is one run when every axis but the slowest-varying one is whole.
        let contiguous = match self.cell_order {
            Layout::RowMajor => (1..n).all(axis_matches),
            Layout::ColMajor => (0..n - 1).all(axis_matches),
        };
        if contiguous {
            Overlap::Contiguous
        } else {
            Overlap::Partial
        }
    }

    /// Whether `range` lies within a single row of tiles, i.e. within one tile on every axis but
    /// the last. `false` for irregular tiling.
    pub fn is_contained_in_tile_slab_row(&self, range: &[T]) -> bool {
        let n = self.dim_num();
        !self.is_irregular() && (0..n - 1).all(|d| self.within_one_tile(range, d))
    }

    /// Whether `range` lies within a single column of tiles, i.e. within one tile on every axis
    /// but the first. `false` for irregular tiling.
    pub fn is_contained_in_tile_slab_col(&self, range: &[T]) -> bool {
        let n = self.dim_num();
        !self.is_irregular() && (1..n).all(|d| self.within_one_tile(range, d))
    }

    /// The number of cells of `subarray` in one tile-thick row slab: the first axis is capped at
    /// the tile extent, the remaining axes are taken whole. `0` for irregular tiling.
    pub fn tile_slab_row_cell_num(&self, subarray: &[T]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        self.slab_cell_num(subarray, 0)
    }

    /// The number of cells of `subarray` in one tile-thick column slab: the last axis is capped
    /// at the tile extent, the remaining axes are taken whole. `0` for irregular tiling.
    pub fn tile_slab_col_cell_num(&self, subarray: &[T]) -> u64 {
        if self.is_irregular() {
            return 0;
        }
        self.slab_cell_num(subarray, self.dim_num() - 1)
    }

    fn slab_cell_num(&self, subarray: &[T], capped: usize) -> u64 {
        (0..self.dim_num()).fold(1u64, |acc, d| {
            let len = subarray[2 * d + 1]
                .offset_from(subarray[2 * d])
                .saturating_add(1);
            let len = if d == capped {
                len.min(self.extent_cells[d])
            } else {
                len
            };
            acc.saturating_mul(len)
        })
    }

    fn within_one_tile(&self, range: &[T], d: usize) -> bool {
        let extent = self.extent_cells[d];
        let low = self.low(d);
        range[2 * d].offset_from(low) / extent == range[2 * d + 1].offset_from(low) / extent
    }

    fn require_regular(&self, op: &str) -> TesseraResult<()> {
        if self.is_irregular() {
            return Err(tessera_err!(InvalidDomain: "{} requires regular tiling", op));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tessera_error::TesseraError;

    use super::super::tests::dense_2d;
    use super::*;
    use crate::{Dimension, DomainBuilder};

    fn irregular_2d() -> Domain<i32> {
        DomainBuilder::new()
            .with_dimension(Dimension::try_new("dim1", [0, 9], None).unwrap())
            .unwrap()
            .with_dimension(Dimension::try_new("dim2", [0, 19], None).unwrap())
            .unwrap()
            .build(Layout::RowMajor, Layout::RowMajor)
            .unwrap()
    }

    #[test]
    fn whole_domain_tile_counts() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        assert_eq!(domain.tile_num(), 4);
        assert_eq!(domain.tile_num_in(domain.domain()), 4);
        assert_eq!(domain.tile_num_in(&[0, 9, 10, 19]), 2);
        assert_eq!(domain.cell_num(domain.domain()), 200);
        assert_eq!(irregular_2d().tile_num(), 0);
        assert_eq!(irregular_2d().tile_num_in(&[0, 9, 0, 19]), 0);
    }

    #[test]
    fn unaligned_domain_rounds_tiles_up() {
        let domain = DomainBuilder::new()
            .with_dimension(Dimension::try_new("x", [1i64, 95], Some(10)).unwrap())
            .unwrap()
            .build(Layout::RowMajor, Layout::RowMajor)
            .unwrap();
        assert_eq!(domain.tile_num(), 10);
        assert_eq!(domain.tile_domain(), Some(&[0, 9][..]));
    }

    #[rstest]
    #[case([3, 6, 12, 13], [0, 9, 10, 19])]
    #[case([0, 4, 10, 19], [0, 4, 10, 19])]
    #[case([4, 5, 9, 10], [0, 9, 0, 19])]
    fn expand_to_tile_boundaries(#[case] range: [i32; 4], #[case] expected: [i32; 4]) {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let mut range = range;
        domain.expand_domain(&mut range);
        assert_eq!(range, expected);
    }

    #[test]
    fn expand_respects_non_zero_low() {
        let domain = DomainBuilder::new()
            .with_dimension(Dimension::try_new("x", [1u32, 100], Some(10)).unwrap())
            .unwrap()
            .build(Layout::RowMajor, Layout::RowMajor)
            .unwrap();
        let mut range = [15, 23];
        domain.expand_domain(&mut range);
        assert_eq!(range, [11, 30]);
        assert_eq!(domain.floor_to_tile(23, 0).unwrap(), 21);
    }

    #[test]
    fn expand_is_a_no_op_when_irregular() {
        let mut range = [3, 6, 12, 13];
        irregular_2d().expand_domain(&mut range);
        assert_eq!(range, [3, 6, 12, 13]);
    }

    #[test]
    fn subarray_tile_domain_is_clamped() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let mut tile_domain = [0u64; 4];
        let mut subarray_tile_domain = [0u64; 4];

        domain
            .get_subarray_tile_domain(&[3, 6, -5, 100], &mut tile_domain, &mut subarray_tile_domain)
            .unwrap();
        assert_eq!(tile_domain, [0, 1, 0, 1]);
        assert_eq!(subarray_tile_domain, [0, 1, 0, 1]);

        domain
            .get_subarray_tile_domain(&[6, 9, 12, 13], &mut tile_domain, &mut subarray_tile_domain)
            .unwrap();
        assert_eq!(subarray_tile_domain, [1, 1, 1, 1]);

        let mut unclamped = [0u64; 4];
        domain.get_tile_domain(&[3, 6, 0, 100], &mut unclamped).unwrap();
        assert_eq!(unclamped, [0, 1, 0, 10]);
    }

    #[rstest]
    #[case([0, 3], [1, 0])]
    #[case([0, 12], [0, 0])]
    #[case([40, 50], [6, 3])]
    #[case([25, 50], [3, 3])]
    fn subarray_tile_domain_outside_the_domain(
        #[case] subarray: [i32; 2],
        #[case] expected: [u64; 2],
    ) {
        let domain = DomainBuilder::new()
            .with_dimension(Dimension::try_new("x", [10, 29], Some(5)).unwrap())
            .unwrap()
            .build(Layout::RowMajor, Layout::RowMajor)
            .unwrap();
        let mut tile_domain = [0u64; 2];
        let mut subarray_tile_domain = [0u64; 2];
        domain
            .get_subarray_tile_domain(&subarray, &mut tile_domain, &mut subarray_tile_domain)
            .unwrap();
        assert_eq!(tile_domain, [0, 3]);
        assert_eq!(subarray_tile_domain, expected);
    }

    #[test]
    fn disjoint_axis_empties_the_whole_tile_range() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let mut tile_domain = [0u64; 4];
        let mut subarray_tile_domain = [0u64; 4];
        domain
            .get_subarray_tile_domain(&[2, 7, -8, -1], &mut tile_domain, &mut subarray_tile_domain)
            .unwrap();
        assert_eq!(subarray_tile_domain, [0, 1, 1, 0]);

        let mut unclamped = [0u64; 4];
        domain.get_tile_domain(&[-20, -11, 0, 30], &mut unclamped).unwrap();
        assert_eq!(unclamped, [1, 0, 0, 3]);
    }

    #[test]
    fn subarray_tile_domain_needs_tiles() {
        let mut tile_domain = [0u64; 4];
        let mut subarray_tile_domain = [0u64; 4];
        assert!(matches!(
            irregular_2d().get_subarray_tile_domain(
                &[0, 1, 0, 1],
                &mut tile_domain,
                &mut subarray_tile_domain
            ),
            Err(TesseraError::InvalidDomain(..))
        ));
    }

    #[test]
    fn tile_geometry_helpers() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let mut tile = [0i32; 4];
        domain.get_tile_subarray(&[1, 1], &mut tile);
        assert_eq!(tile, [5, 9, 10, 19]);

        assert_eq!(domain.floor_to_tile(7, 0).unwrap(), 5);
        assert_eq!(domain.floor_to_tile(13, 1).unwrap(), 10);
        assert!(domain.floor_to_tile(0, 2).is_err());
        assert_eq!(irregular_2d().floor_to_tile(7, 0).unwrap(), 0);

        irregular_2d().get_tile_subarray(&[0, 0], &mut tile);
        assert_eq!(tile, [0, 9, 0, 19]);
    }

    #[test]
    fn crop_and_containment() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let mut range = [-3, 4, 15, 40];
        domain.crop_domain(&mut range);
        assert_eq!(range, [0, 4, 15, 19]);

        assert!(domain.covered(&[1, 2, 3, 4], &[0, 9, 0, 19]));
        assert!(!domain.covered(&[1, 12, 3, 4], &[0, 9, 0, 19]));
        assert!(domain.overlaps(&[0, 4, 0, 4], &[4, 9, 4, 9]));
        assert!(!domain.overlaps(&[0, 4, 0, 4], &[5, 9, 0, 4]));
    }

    #[test]
    fn float_ranges_have_no_cell_count() {
        let domain = DomainBuilder::new()
            .with_dimension(Dimension::try_new("t", [0.0f32, 1.0], None).unwrap())
            .unwrap()
            .build(Layout::RowMajor, Layout::RowMajor)
            .unwrap();
        assert_eq!(domain.cell_num(&[0.0, 1.0]), 0);
        assert_eq!(domain.tile_num(), 0);
    }

    #[rstest]
    #[case(Layout::RowMajor, [0, 9, 0, 19], [2, 3, 4, 5], Overlap::Full)]
    #[case(Layout::ColMajor, [0, 9, 0, 19], [2, 3, 4, 5], Overlap::Full)]
    #[case(Layout::RowMajor, [0, 4, 0, 19], [0, 9, 0, 19], Overlap::Contiguous)]
    #[case(Layout::ColMajor, [0, 4, 0, 19], [0, 9, 0, 19], Overlap::Partial)]
    #[case(Layout::RowMajor, [0, 9, 5, 8], [2, 3, 0, 19], Overlap::Partial)]
    #[case(Layout::ColMajor, [0, 9, 5, 8], [2, 3, 0, 19], Overlap::Contiguous)]
    #[case(Layout::RowMajor, [0, 5, 0, 5], [3, 9, 3, 9], Overlap::Partial)]
    #[case(Layout::RowMajor, [0, 2, 0, 5], [5, 9, 0, 5], Overlap::None)]
    fn overlap_classification(
        #[case] cell_order: Layout,
        #[case] a: [i32; 4],
        #[case] b: [i32; 4],
        #[case] expected: Overlap,
    ) {
        let domain = dense_2d(cell_order, Layout::RowMajor);
        let mut overlap = [0i32; 4];
        assert_eq!(domain.subarray_overlap(&a, &b, &mut overlap), expected);
        match expected {
            Overlap::Full => assert_eq!(overlap, b),
            Overlap::None => assert!(overlap.chunks_exact(2).any(|r| r[0] > r[1])),
            Overlap::Partial | Overlap::Contiguous => {
                assert!(domain.covered(&overlap, &a));
                assert!(domain.covered(&overlap, &b));
            }
        }
    }

    #[test]
    fn overlap_classification_is_consistent() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        let ranges = [
            [0, 9, 0, 19],
            [0, 4, 0, 9],
            [3, 7, 5, 15],
            [5, 9, 10, 19],
            [8, 9, 0, 2],
        ];
        let mut overlap = [0i32; 4];
        for a in &ranges {
            for b in &ranges {
                match domain.subarray_overlap(a, b, &mut overlap) {
                    Overlap::Full => assert!(domain.covered(b, a)),
                    Overlap::None => assert!(!domain.overlaps(a, b)),
                    Overlap::Partial | Overlap::Contiguous => {
                        assert!(domain.overlaps(a, b));
                        assert!(!domain.covered(b, a));
                    }
                }
            }
        }
    }

    #[test]
    fn one_dimensional_partial_overlap_is_contiguous() {
        let domain = DomainBuilder::new()
            .with_dimension(Dimension::try_new("x", [0u64, 99], None).unwrap())
            .unwrap()
            .build(Layout::ColMajor, Layout::ColMajor)
            .unwrap();
        let mut overlap = [0u64; 2];
        assert_eq!(
            domain.subarray_overlap(&[10, 20], &[15, 30], &mut overlap),
            Overlap::Contiguous
        );
        assert_eq!(overlap, [15, 20]);
        assert_eq!(u8::from(Overlap::Contiguous), 3);
    }

    #[test]
    fn tile_slabs() {
        let domain = dense_2d(Layout::RowMajor, Layout::RowMajor);
        assert!(domain.is_contained_in_tile_slab_row(&[0, 4, 3, 17]));
        assert!(!domain.is_contained_in_tile_slab_row(&[3, 6, 3, 4]));
        assert!(domain.is_contained_in_tile_slab_col(&[0, 9, 10, 19]));
        assert!(!domain.is_contained_in_tile_slab_col(&[0, 0, 5, 12]));

        assert_eq!(domain.tile_slab_row_cell_num(&[2, 8, 3, 5]), 15);
        assert_eq!(domain.tile_slab_col_cell_num(&[2, 8, 3, 5]), 21);
        assert_eq!(domain.tile_slab_col_cell_num(&[0, 9, 0, 19]), 100);

        let irregular = irregular_2d();
        assert!(!irregular.is_contained_in_tile_slab_row(&[0, 0, 0, 0]));
        assert!(!irregular.is_contained_in_tile_slab_col(&[0, 0, 0, 0]));
        assert_eq!(irregular.tile_slab_row_cell_num(&[0, 9, 0, 19]), 0);
    }
}
