//! Type-erased dimensions and domains, for callers that only learn the numeric kind at runtime,
//! e.g. when loading a persisted schema.

use std::fmt::{Display, Formatter};

use bytes::{Buf, BufMut, Bytes};
use tessera_dtype::{PType, match_each_native_ptype};
use tessera_error::{TesseraResult, tessera_err};

use crate::codec::{read_name, read_ptype};
use crate::{Coordinate, Dimension, Domain, DomainBuilder, Layout};

macro_rules! dyn_enum {
    ($(#[$meta:meta])* $name:ident, $inner:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            /// Coordinates of kind `u8`.
            U8($inner<u8>),
            /// Coordinates of kind `u16`.
            U16($inner<u16>),
            /// Coordinates of kind `u32`.
            U32($inner<u32>),
            /// Coordinates of kind `u64`.
            U64($inner<u64>),
            /// Coordinates of kind `i8`.
            I8($inner<i8>),
            /// Coordinates of kind `i16`.
            I16($inner<i16>),
            /// Coordinates of kind `i32`.
            I32($inner<i32>),
            /// Coordinates of kind `i64`.
            I64($inner<i64>),
            /// Coordinates of kind `f32`.
            F32($inner<f32>),
            /// Coordinates of kind `f64`.
            F64($inner<f64>),
        }
    };
}

macro_rules! dispatch {
    ($value:expr, $name:ident, | $inner:ident | $body:expr) => {
        match $value {
            $name::U8($inner) => $body,
            $name::U16($inner) => $body,
            $name::U32($inner) => $body,
            $name::U64($inner) => $body,
            $name::I8($inner) => $body,
            $name::I16($inner) => $body,
            $name::I32($inner) => $body,
            $name::I64($inner) => $body,
            $name::F32($inner) => $body,
            $name::F64($inner) => $body,
        }
    };
}

dyn_enum!(
    /// A [`Dimension`] of any numeric kind.
    DynDimension,
    Dimension
);

dyn_enum!(
    /// A [`DomainBuilder`] of any numeric kind.
    DynDomainBuilder,
    DomainBuilder
);

dyn_enum!(
    /// A frozen [`Domain`] of any numeric kind.
    DynDomain,
    Domain
);

/// A coordinate kind that can be moved in and out of the type-erased wrappers.
pub trait DynCoordinate: Coordinate {
    /// Unwraps a dimension of this kind, handing the wrapper back otherwise.
    fn dimension_from_dyn(dimension: DynDimension) -> Result<Dimension<Self>, DynDimension>;

    /// Unwraps a builder of this kind, handing the wrapper back otherwise.
    fn builder_from_dyn(builder: DynDomainBuilder) -> Result<DomainBuilder<Self>, DynDomainBuilder>;

    /// Borrows a builder of this kind mutably.
    fn builder_from_dyn_mut(builder: &mut DynDomainBuilder) -> Option<&mut DomainBuilder<Self>>;

    /// Borrows a domain of this kind.
    fn domain_from_dyn(domain: &DynDomain) -> Option<&Domain<Self>>;
}

macro_rules! dyn_coordinate {
    ($T:ty, $variant:ident) => {
        impl From<Dimension<$T>> for DynDimension {
            fn from(value: Dimension<$T>) -> Self {
                Self::$variant(value)
            }
        }

        impl From<DomainBuilder<$T>> for DynDomainBuilder {
            fn from(value: DomainBuilder<$T>) -> Self {
                Self::$variant(value)
            }
        }

        impl From<Domain<$T>> for DynDomain {
            fn from(value: Domain<$T>) -> Self {
                Self::$variant(value)
            }
        }

        impl DynCoordinate for $T {
            fn dimension_from_dyn(
                dimension: DynDimension,
            ) -> Result<Dimension<Self>, DynDimension> {
                match dimension {
                    DynDimension::$variant(dimension) => Ok(dimension),
                    other => Err(other),
                }
            }

            fn builder_from_dyn(
                builder: DynDomainBuilder,
            ) -> Result<DomainBuilder<Self>, DynDomainBuilder> {
                match builder {
                    DynDomainBuilder::$variant(builder) => Ok(builder),
                    other => Err(other),
                }
            }

            fn builder_from_dyn_mut(
                builder: &mut DynDomainBuilder,
            ) -> Option<&mut DomainBuilder<Self>> {
                match builder {
                    DynDomainBuilder::$variant(builder) => Some(builder),
                    _ => None,
                }
            }

            fn domain_from_dyn(domain: &DynDomain) -> Option<&Domain<Self>> {
                match domain {
                    DynDomain::$variant(domain) => Some(domain),
                    _ => None,
                }
            }
        }
    };
}

dyn_coordinate!(u8, U8);
dyn_coordinate!(u16, U16);
dyn_coordinate!(u32, U32);
dyn_coordinate!(u64, U64);
dyn_coordinate!(i8, I8);
dyn_coordinate!(i16, I16);
dyn_coordinate!(i32, I32);
dyn_coordinate!(i64, I64);
dyn_coordinate!(f32, F32);
dyn_coordinate!(f64, F64);

impl DynDimension {
    /// The numeric kind of the wrapped dimension.
    pub fn ptype(&self) -> PType {
        dispatch!(self, DynDimension, |dimension| dimension.ptype())
    }

    /// See [`Dimension::name`].
    pub fn name(&self) -> &str {
        dispatch!(self, DynDimension, |dimension| dimension.name())
    }

    /// Whether the dimension is regularly tiled.
    pub fn has_tile_extent(&self) -> bool {
        dispatch!(self, DynDimension, |dimension| dimension.tile_extent().is_some())
    }

    /// Recovers the typed dimension, failing if it is not of kind `T`.
    pub fn downcast<T: DynCoordinate>(self) -> TesseraResult<Dimension<T>> {
        T::dimension_from_dyn(self)
            .map_err(|other| tessera_err!(MismatchedTypes: T::PTYPE, other.ptype()))
    }

    /// See [`Dimension::serialize`].
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        dispatch!(self, DynDimension, |dimension| dimension.serialize(buf))
    }

    /// Decodes one dimension of whatever kind its tag names.
    pub fn deserialize<B: Buf>(buf: &mut B) -> TesseraResult<Self> {
        let name = read_name(buf)?;
        let ptype = read_ptype(buf)?;
        match_each_native_ptype!(ptype, |T| {
            Dimension::<T>::deserialize_as(name, ptype, buf).map(Self::from)
        })
    }
}

impl Display for DynDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, DynDimension, |dimension| Display::fmt(dimension, f))
    }
}

impl DynDomainBuilder {
    /// An empty builder for dimensions of kind `ptype`.
    pub fn new(ptype: PType) -> Self {
        match_each_native_ptype!(ptype, |T| { DomainBuilder::<T>::new().into() })
    }

    /// The numeric kind dimensions must have to be added.
    pub fn ptype(&self) -> PType {
        match self {
            Self::U8(_) => PType::U8,
            Self::U16(_) => PType::U16,
            Self::U32(_) => PType::U32,
            Self::U64(_) => PType::U64,
            Self::I8(_) => PType::I8,
            Self::I16(_) => PType::I16,
            Self::I32(_) => PType::I32,
            Self::I64(_) => PType::I64,
            Self::F32(_) => PType::F32,
            Self::F64(_) => PType::F64,
        }
    }

    /// The number of dimensions added so far.
    pub fn dim_num(&self) -> usize {
        dispatch!(self, DynDomainBuilder, |builder| builder.dim_num())
    }

    /// Appends `dimension`, which must share the builder's numeric kind.
    pub fn add_dimension(&mut self, dimension: DynDimension) -> TesseraResult<&mut Self> {
        match_each_native_ptype!(self.ptype(), |T| {
            self.add_typed::<T>(dimension)?;
        });
        Ok(self)
    }

    fn add_typed<T: DynCoordinate>(&mut self, dimension: DynDimension) -> TesseraResult<()> {
        let dimension = dimension.downcast::<T>()?;
        let ptype = self.ptype();
        T::builder_from_dyn_mut(self)
            .ok_or_else(|| tessera_err!(MismatchedTypes: T::PTYPE, ptype))?
            .add_dimension(dimension)?;
        Ok(())
    }

    /// Builder-style variant of [`DynDomainBuilder::add_dimension`].
    pub fn with_dimension(mut self, dimension: DynDimension) -> TesseraResult<Self> {
        self.add_dimension(dimension)?;
        Ok(self)
    }

    /// Freezes the dimensions into a [`DynDomain`], see [`DomainBuilder::build`].
    pub fn build(self, cell_order: Layout, tile_order: Layout) -> TesseraResult<DynDomain> {
        dispatch!(self, DynDomainBuilder, |builder| {
            builder.build(cell_order, tile_order).map(DynDomain::from)
        })
    }

    /// Recovers the typed builder, failing if it is not of kind `T`.
    pub fn downcast<T: DynCoordinate>(self) -> TesseraResult<DomainBuilder<T>> {
        T::builder_from_dyn(self)
            .map_err(|other| tessera_err!(MismatchedTypes: T::PTYPE, other.ptype()))
    }

    /// See [`DomainBuilder::serialize`].
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        dispatch!(self, DynDomainBuilder, |builder| builder.serialize(buf))
    }

    /// Decodes the dimensions of a persisted domain of any kind.
    ///
    /// The result is unfrozen: cell and tile orders are owned by the schema, not the domain bytes.
    pub fn deserialize<B: Buf>(buf: &mut B) -> TesseraResult<Self> {
        let ptype = read_ptype(buf)?;
        match_each_native_ptype!(ptype, |T| {
            DomainBuilder::<T>::deserialize_dimensions(buf).map(Self::from)
        })
    }
}

impl DynDomain {
    /// The numeric kind shared by every dimension.
    pub fn ptype(&self) -> PType {
        dispatch!(self, DynDomain, |domain| domain.ptype())
    }

    /// See [`Domain::dim_num`].
    pub fn dim_num(&self) -> usize {
        dispatch!(self, DynDomain, |domain| domain.dim_num())
    }

    /// See [`Domain::cell_order`].
    pub fn cell_order(&self) -> Layout {
        dispatch!(self, DynDomain, |domain| domain.cell_order())
    }

    /// See [`Domain::tile_order`].
    pub fn tile_order(&self) -> Layout {
        dispatch!(self, DynDomain, |domain| domain.tile_order())
    }

    /// See [`Domain::is_irregular`].
    pub fn is_irregular(&self) -> bool {
        dispatch!(self, DynDomain, |domain| domain.is_irregular())
    }

    /// See [`Domain::tile_num`].
    pub fn tile_num(&self) -> u64 {
        dispatch!(self, DynDomain, |domain| domain.tile_num())
    }

    /// See [`Domain::cell_num_per_tile`].
    pub fn cell_num_per_tile(&self) -> u64 {
        dispatch!(self, DynDomain, |domain| domain.cell_num_per_tile())
    }

    /// Borrows the typed domain, failing if it is not of kind `T`.
    pub fn as_typed<T: DynCoordinate>(&self) -> TesseraResult<&Domain<T>> {
        T::domain_from_dyn(self).ok_or_else(|| tessera_err!(MismatchedTypes: T::PTYPE, self.ptype()))
    }

    /// See [`Domain::serialize`].
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        dispatch!(self, DynDomain, |domain| domain.serialize(buf))
    }

    /// See [`Domain::to_bytes`].
    pub fn to_bytes(&self) -> TesseraResult<Bytes> {
        dispatch!(self, DynDomain, |domain| domain.to_bytes())
    }

    /// Decodes a persisted domain of any kind and freezes it with the given orders.
    pub fn deserialize<B: Buf>(
        buf: &mut B,
        cell_order: Layout,
        tile_order: Layout,
    ) -> TesseraResult<Self> {
        DynDomainBuilder::deserialize(buf)?.build(cell_order, tile_order)
    }
}

impl Display for DynDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, DynDomain, |domain| Display::fmt(domain, f))
    }
}
