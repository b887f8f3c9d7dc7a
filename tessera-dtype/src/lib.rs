#![cfg(target_endian = "little")]
#![warn(missing_docs)]

//! The numeric type system for Tessera.
//!
//! Every coordinate space is defined over exactly one [`PType`]. Generic code is written once
//! against [`NativePType`] and instantiated per kind with [`match_each_native_ptype`].

pub use ptype::*;

mod ptype;
