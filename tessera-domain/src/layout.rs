use std::fmt::{Display, Formatter};

use num_enum::IntoPrimitive;
use tessera_error::{TesseraResult, tessera_bail};

/// The order in which cells within a tile, or tiles within a domain, are linearized.
///
/// Global order, unordered and Hilbert layouts are resolved by the query layer before they reach
/// the domain, so only the two dense orders are representable here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[repr(u8)]
pub enum Layout {
    /// The last dimension varies fastest.
    #[default]
    RowMajor = 0,
    /// The first dimension varies fastest.
    ColMajor = 1,
}

impl Layout {
    /// Decode a persisted layout code.
    pub fn from_code(code: u8) -> TesseraResult<Self> {
        match code {
            0 => Ok(Self::RowMajor),
            1 => Ok(Self::ColMajor),
            2 => tessera_bail!("global order cannot be used as a cell or tile order"),
            3 => tessera_bail!("unordered layout cannot be used as a cell or tile order"),
            4 => tessera_bail!("hilbert order is not supported by the domain"),
            _ => tessera_bail!("unknown layout code {}", code),
        }
    }

    /// The persisted code of this layout.
    pub fn code(self) -> u8 {
        self.into()
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowMajor => write!(f, "row-major"),
            Self::ColMajor => write!(f, "col-major"),
        }
    }
}
