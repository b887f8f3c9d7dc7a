//! The persisted binary form of dimensions and domains.
//!
//! A domain is written as `[type:u8][dim_num:u32]` followed by each dimension as
//! `[name_len:u32][name][type:u8][low][high][has_extent:u8][extent?]`. Every multi-byte value is
//! little-endian. The format carries no version; that belongs to whoever persists the schema.
//!
//! Cell and tile orders are not part of the format. They are supplied when a decoded
//! [`DomainBuilder`] is frozen into a [`Domain`].

use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tessera_dtype::{NativePType, PType};
use tessera_error::{TesseraResult, tessera_bail, tessera_err};

use crate::{Coordinate, Dimension, Domain, DomainBuilder, Layout};

impl<T: Coordinate> Dimension<T> {
    /// Appends the binary form of this dimension to `buf`.
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        buf.put_u32_le(u32::try_from(self.name().len())?);
        buf.put_slice(self.name().as_bytes());
        buf.put_u8(T::PTYPE.tag());
        self.low().write_le(buf);
        self.high().write_le(buf);
        match self.tile_extent() {
            Some(extent) => {
                buf.put_u8(1);
                extent.write_le(buf);
            }
            None => buf.put_u8(0),
        }
        Ok(())
    }

    /// Decodes one dimension, which must be of kind `T`.
    pub fn deserialize<B: Buf>(buf: &mut B) -> TesseraResult<Self> {
        let name = read_name(buf)?;
        let ptype = read_ptype(buf)?;
        Self::deserialize_as(name, ptype, buf)
    }

    /// Decodes the remainder of a dimension whose name and kind tag have been consumed.
    pub(crate) fn deserialize_as<B: Buf>(
        name: String,
        ptype: PType,
        buf: &mut B,
    ) -> TesseraResult<Self> {
        if ptype != T::PTYPE {
            tessera_bail!(MismatchedTypes: T::PTYPE, ptype);
        }
        let low = read_value::<T, _>(buf)?;
        let high = read_value::<T, _>(buf)?;
        let tile_extent = match read_u8(buf, "tile extent flag")? {
            0 => None,
            1 => Some(read_value::<T, _>(buf)?),
            flag => tessera_bail!(
                InvalidSerde: "dimension '{}': invalid tile extent flag {}",
                name,
                flag
            ),
        };
        log::trace!("Decoded {ptype} dimension '{name}'");
        Self::try_new(name, [low, high], tile_extent)
    }
}

impl<T: Coordinate> DomainBuilder<T> {
    /// Appends the binary form of the domain to `buf`.
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        serialize_dimensions(self.dimensions(), buf)
    }

    /// Decodes a domain of kind `T`, leaving it unfrozen.
    pub fn deserialize<B: Buf>(buf: &mut B) -> TesseraResult<Self> {
        let ptype = read_ptype(buf)?;
        if ptype != T::PTYPE {
            tessera_bail!(MismatchedTypes: T::PTYPE, ptype);
        }
        Self::deserialize_dimensions(buf)
    }

    /// Decodes the dimension count and dimensions following an already consumed domain tag.
    pub(crate) fn deserialize_dimensions<B: Buf>(buf: &mut B) -> TesseraResult<Self> {
        let dim_num = read_u32(buf, "dimension count")?;
        let mut builder = Self::new();
        for _ in 0..dim_num {
            let name = read_name(buf)?;
            let ptype = read_ptype(buf)?;
            builder.add_dimension(Dimension::deserialize_as(name, ptype, buf)?)?;
        }
        log::trace!("Decoded {} domain with {dim_num} dimensions", T::PTYPE);
        Ok(builder)
    }
}

impl<T: Coordinate> Domain<T> {
    /// Appends the binary form of the domain to `buf`.
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> TesseraResult<()> {
        serialize_dimensions(self.dimensions(), buf)
    }

    /// The binary form of the domain.
    pub fn to_bytes(&self) -> TesseraResult<Bytes> {
        let mut buf = BytesMut::new();
        self.serialize(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Writes the binary form of the domain to `write`.
    pub fn write_to<W: Write>(&self, write: &mut W) -> TesseraResult<()> {
        write.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Decodes a domain of kind `T` and freezes it with the given orders.
    pub fn deserialize<B: Buf>(
        buf: &mut B,
        cell_order: Layout,
        tile_order: Layout,
    ) -> TesseraResult<Self> {
        DomainBuilder::deserialize(buf)?.build(cell_order, tile_order)
    }
}

fn serialize_dimensions<T: Coordinate, B: BufMut>(
    dimensions: &[Dimension<T>],
    buf: &mut B,
) -> TesseraResult<()> {
    buf.put_u8(T::PTYPE.tag());
    buf.put_u32_le(u32::try_from(dimensions.len())?);
    for dim in dimensions {
        dim.serialize(buf)?;
    }
    Ok(())
}

fn ensure_remaining<B: Buf>(buf: &B, len: usize, what: &str) -> TesseraResult<()> {
    if buf.remaining() < len {
        tessera_bail!(
            InvalidSerde: "truncated input reading {}: needed {} bytes but {} remain",
            what,
            len,
            buf.remaining()
        );
    }
    Ok(())
}

fn read_u8<B: Buf>(buf: &mut B, what: &str) -> TesseraResult<u8> {
    ensure_remaining(buf, 1, what)?;
    Ok(buf.get_u8())
}

fn read_u32<B: Buf>(buf: &mut B, what: &str) -> TesseraResult<u32> {
    ensure_remaining(buf, 4, what)?;
    Ok(buf.get_u32_le())
}

fn read_value<T: NativePType, B: Buf>(buf: &mut B) -> TesseraResult<T> {
    ensure_remaining(buf, T::PTYPE.byte_width(), "coordinate")?;
    Ok(T::read_le(buf))
}

/// Reads a numeric kind tag.
pub(crate) fn read_ptype<B: Buf>(buf: &mut B) -> TesseraResult<PType> {
    PType::from_tag(read_u8(buf, "type tag")?)
}

/// Reads a length-prefixed UTF-8 dimension name.
pub(crate) fn read_name<B: Buf>(buf: &mut B) -> TesseraResult<String> {
    let len = usize::try_from(read_u32(buf, "dimension name length")?)?;
    ensure_remaining(buf, len, "dimension name")?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes)
        .map_err(|err| tessera_err!(InvalidSerde: "dimension name is not valid UTF-8: {}", err))
}
