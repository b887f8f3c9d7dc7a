use std::fmt::{Display, Formatter};

use tessera_dtype::PType;
use tessera_error::{TesseraResult, tessera_bail};

use crate::Coordinate;

/// One axis of a coordinate space.
///
/// A dimension owns its inclusive `[low, high]` bounds and, when the array is regularly tiled, the
/// number of cells a tile spans along this axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension<T> {
    name: String,
    domain: [T; 2],
    tile_extent: Option<T>,
}

impl<T: Coordinate> Dimension<T> {
    /// Checked constructor.
    ///
    /// Fails if a bound is NaN or `low > high`. A tile extent must be positive, must not exceed
    /// the number of cells in the domain and must leave at most `u64::MAX` tiles. Floating point
    /// kinds cannot carry one.
    pub fn try_new(
        name: impl Into<String>,
        domain: [T; 2],
        tile_extent: Option<T>,
    ) -> TesseraResult<Self> {
        let name = name.into();
        let [low, high] = domain;
        if low.is_nan() || high.is_nan() {
            tessera_bail!(InvalidDomain: "dimension '{}': domain bounds cannot be NaN", name);
        }
        if low > high {
            tessera_bail!(
                InvalidDomain: "dimension '{}': lower bound {} exceeds upper bound {}",
                name,
                low,
                high
            );
        }

        if let Some(extent) = tile_extent {
            if !T::INTEGRAL {
                tessera_bail!(
                    InvalidDomain: "dimension '{}': {} domains cannot be regularly tiled",
                    name,
                    T::PTYPE
                );
            }
            let Some(cells) = extent.as_cell_count().filter(|cells| *cells > 0) else {
                tessera_bail!(
                    InvalidDomain: "dimension '{}': tile extent {} must be positive",
                    name,
                    extent
                );
            };
            if u128::from(cells) > u128::from(high.offset_from(low)) + 1 {
                tessera_bail!(
                    InvalidDomain: "dimension '{}': tile extent {} exceeds domain [{}, {}]",
                    name,
                    extent,
                    low,
                    high
                );
            }
            if (high.offset_from(low) / cells).checked_add(1).is_none() {
                tessera_bail!(
                    InvalidDomain: "dimension '{}': domain [{}, {}] spans more than {} tiles of extent {}",
                    name,
                    low,
                    high,
                    u64::MAX,
                    extent
                );
            }
        }

        Ok(Self {
            name,
            domain,
            tile_extent,
        })
    }

    /// The name of the dimension. Empty until it is added to a domain.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The numeric kind of the dimension's coordinates.
    pub fn ptype(&self) -> PType {
        T::PTYPE
    }

    /// The inclusive `[low, high]` bounds.
    pub fn domain(&self) -> [T; 2] {
        self.domain
    }

    /// The lower bound.
    pub fn low(&self) -> T {
        self.domain[0]
    }

    /// The upper bound.
    pub fn high(&self) -> T {
        self.domain[1]
    }

    /// The tile extent, or `None` for irregular tiling.
    pub fn tile_extent(&self) -> Option<T> {
        self.tile_extent
    }

    /// Number of tiles needed to cover the domain, rounding the last partial tile up.
    ///
    /// `None` for irregular tiling.
    pub fn tile_num(&self) -> Option<u64> {
        let extent = self.tile_extent?.as_cell_count()?;
        Some((self.high().offset_from(self.low()) / extent).saturating_add(1))
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl<T: Coordinate> Display for Dimension<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "### Dimension ###")?;
        writeln!(f, "- Name: {}", self.name)?;
        writeln!(f, "- Type: {}", T::PTYPE)?;
        writeln!(f, "- Domain: [{},{}]", self.low(), self.high())?;
        match self.tile_extent {
            Some(extent) => writeln!(f, "- Tile extent: {extent}"),
            None => writeln!(f, "- Tile extent: null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tessera_error::TesseraError;

    use super::*;

    #[test]
    fn accessors() {
        let dim = Dimension::try_new("rows", [1i64, 100], Some(10)).unwrap();
        assert_eq!(dim.name(), "rows");
        assert_eq!(dim.ptype(), PType::I64);
        assert_eq!(dim.domain(), [1, 100]);
        assert_eq!(dim.tile_extent(), Some(10));
        assert_eq!(dim.tile_num(), Some(10));
    }

    #[test]
    fn partial_last_tile_counts() {
        let dim = Dimension::try_new("x", [0u8, 10], Some(4)).unwrap();
        assert_eq!(dim.tile_num(), Some(3));
    }

    #[test]
    fn full_width_narrow_kind() {
        let dim = Dimension::try_new("x", [i8::MIN, i8::MAX], Some(1)).unwrap();
        assert_eq!(dim.tile_num(), Some(256));
    }

    #[test]
    fn full_width_wide_kinds_need_more_than_one_cell_per_tile() {
        assert!(matches!(
            Dimension::try_new("x", [0u64, u64::MAX], Some(1)),
            Err(TesseraError::InvalidDomain(..))
        ));
        assert!(matches!(
            Dimension::try_new("x", [i64::MIN, i64::MAX], Some(1)),
            Err(TesseraError::InvalidDomain(..))
        ));

        let dim = Dimension::try_new("x", [0u64, u64::MAX], Some(2)).unwrap();
        assert_eq!(dim.tile_num(), Some(1 << 63));
        let dim = Dimension::try_new("x", [0u64, u64::MAX - 1], Some(1)).unwrap();
        assert_eq!(dim.tile_num(), Some(u64::MAX));
    }

    #[rstest]
    #[case([5, 4], None)]
    #[case([0, 9], Some(0))]
    #[case([0, 9], Some(-2))]
    #[case([0, 9], Some(11))]
    fn invalid_integer_dimensions(#[case] domain: [i32; 2], #[case] extent: Option<i32>) {
        assert!(matches!(
            Dimension::try_new("d", domain, extent),
            Err(TesseraError::InvalidDomain(..))
        ));
    }

    #[test]
    fn extent_may_equal_span() {
        assert!(Dimension::try_new("d", [0i32, 9], Some(10)).is_ok());
    }

    #[test]
    fn float_dimensions_are_irregular_only() {
        assert!(Dimension::try_new("lat", [-90.0f64, 90.0], None).is_ok());
        assert!(Dimension::try_new("lat", [-90.0f64, 90.0], Some(10.0)).is_err());
        assert!(Dimension::try_new("lat", [f32::NAN, 1.0], None).is_err());
    }

    #[test]
    fn display_dump() {
        let dim = Dimension::try_new("rows", [0u16, 7], None).unwrap();
        assert_eq!(
            dim.to_string(),
            "### Dimension ###\n- Name: rows\n- Type: u16\n- Domain: [0,7]\n- Tile extent: null\n"
        );
    }
}
