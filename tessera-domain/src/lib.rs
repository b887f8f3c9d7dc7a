#![cfg(target_endian = "little")]
#![deny(missing_docs)]

//! The coordinate space of a tiled array.
//!
//! A [`Domain`] is an ordered set of [`Dimension`]s sharing one numeric kind, together with a
//! cell order and a tile order. Once built it answers every question the read and write paths ask
//! per cell or per tile: which tile a cell belongs to and where inside it, how many tiles or cells
//! cover a region, how two regions overlap, and what the next cell in the global order is.
//!
//! ```
//! use tessera_domain::{Dimension, DomainBuilder, Layout};
//!
//! let domain = DomainBuilder::new()
//!     .with_dimension(Dimension::try_new("rows", [0i32, 9], Some(5)).unwrap())
//!     .unwrap()
//!     .with_dimension(Dimension::try_new("cols", [0i32, 19], Some(10)).unwrap())
//!     .unwrap()
//!     .build(Layout::RowMajor, Layout::RowMajor)
//!     .unwrap();
//!
//! let mut tile_coords = [0u64; 2];
//! assert_eq!(domain.tile_id(&[3, 12], &mut tile_coords), 1);
//! assert_eq!(tile_coords, [0, 1]);
//! ```

pub use builder::*;
pub use coordinate::*;
pub use dimension::*;
pub use domain::*;
pub use dyn_domain::*;
pub use layout::*;

mod builder;
mod codec;
mod coordinate;
mod dimension;
mod domain;
mod dyn_domain;
mod layout;
