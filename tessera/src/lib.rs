#![deny(missing_docs)]

//! Tessera: the domain and tile-indexing core of a tiled multi-dimensional array store.

pub use tessera_domain::*;
pub use {tessera_dtype as dtype, tessera_error as error};
