use num_traits::ToPrimitive;
use tessera_dtype::NativePType;

/// Coordinate arithmetic shared by every numeric kind a domain can be defined over.
///
/// Distances between two coordinates are measured in `u64` so that a span covering the full range
/// of a narrow kind (e.g. `i8` from -128 to 127) never overflows the kind itself.
pub trait Coordinate: NativePType {
    /// Whether the kind is an integer. Only integer domains can be regularly tiled.
    const INTEGRAL: bool;

    /// The distance `self - low`, or `0` when `self` precedes `low`.
    ///
    /// Fractional distances of floating point kinds are truncated.
    fn offset_from(self, low: Self) -> u64;

    /// `self + offset`, saturating at the largest value of the kind.
    fn add_offset(self, offset: u64) -> Self;

    /// The next coordinate along an axis, or `None` if it cannot be represented.
    fn successor(self) -> Option<Self>;

    /// The previous coordinate along an axis, or `None` if it cannot be represented.
    fn predecessor(self) -> Option<Self>;

    /// The value as a count of cells, for extents. `None` for negative or fractional kinds.
    fn as_cell_count(self) -> Option<u64>;
}

macro_rules! integer_coordinate {
    ($($T:ty),*) => {
        $(
            impl Coordinate for $T {
                const INTEGRAL: bool = true;

                #[inline]
                fn offset_from(self, low: Self) -> u64 {
                    u64::try_from(i128::from(self) - i128::from(low)).unwrap_or(0)
                }

                #[inline]
                fn add_offset(self, offset: u64) -> Self {
                    Self::try_from(i128::from(self) + i128::from(offset)).unwrap_or(Self::MAX)
                }

                #[inline]
                fn successor(self) -> Option<Self> {
                    self.checked_add(1)
                }

                #[inline]
                fn predecessor(self) -> Option<Self> {
                    self.checked_sub(1)
                }

                #[inline]
                fn as_cell_count(self) -> Option<u64> {
                    u64::try_from(self).ok()
                }
            }
        )*
    };
}

macro_rules! float_coordinate {
    ($($T:ty),*) => {
        $(
            impl Coordinate for $T {
                const INTEGRAL: bool = false;

                #[inline]
                fn offset_from(self, low: Self) -> u64 {
                    (self - low).to_u64().unwrap_or(0)
                }

                #[inline]
                fn add_offset(self, offset: u64) -> Self {
                    num_traits::cast::<u64, Self>(offset)
                        .map_or(Self::MAX, |offset| self + offset)
                }

                #[inline]
                fn successor(self) -> Option<Self> {
                    let next = self + 1.0;
                    (next != self).then_some(next)
                }

                #[inline]
                fn predecessor(self) -> Option<Self> {
                    let prev = self - 1.0;
                    (prev != self).then_some(prev)
                }

                #[inline]
                fn as_cell_count(self) -> Option<u64> {
                    None
                }
            }
        )*
    };
}

integer_coordinate!(u8, u16, u32, u64, i8, i16, i32, i64);
float_coordinate!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_span_the_full_kind() {
        assert_eq!(127i8.offset_from(-128), 255);
        assert_eq!(u64::MAX.offset_from(0), u64::MAX);
        assert_eq!(i64::MAX.offset_from(i64::MIN), u64::MAX);
        assert_eq!(3i32.offset_from(5), 0);
    }

    #[test]
    fn add_offset_saturates() {
        assert_eq!((-128i8).add_offset(255), 127);
        assert_eq!(250u8.add_offset(10), u8::MAX);
        assert_eq!(1.5f64.add_offset(2), 3.5);
    }

    #[test]
    fn steps_stop_at_the_edge_of_the_kind() {
        assert_eq!(u8::MAX.successor(), None);
        assert_eq!(0u8.predecessor(), None);
        assert_eq!((-4i16).successor(), Some(-3));
        assert_eq!(0.5f32.successor(), Some(1.5));
        assert_eq!(1e20f32.successor(), None);
    }

    #[test]
    fn cell_counts() {
        assert_eq!(5i32.as_cell_count(), Some(5));
        assert_eq!((-1i64).as_cell_count(), None);
        assert_eq!(2.0f64.as_cell_count(), None);
        assert_eq!(2.9f64.offset_from(0.0), 2);
    }
}
