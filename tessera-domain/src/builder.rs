use tessera_error::{TesseraResult, tessera_bail};

use crate::{Coordinate, Dimension, Domain, Layout};

/// The mutable, pre-initialization form of a [`Domain`].
///
/// Dimensions are appended in order; the order defines the layout of coordinate vectors and the
/// meaning of row- and column-major. [`DomainBuilder::build`] freezes the builder and computes the
/// tiling geometry that every position query relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainBuilder<T> {
    dimensions: Vec<Dimension<T>>,
}

impl<T> Default for DomainBuilder<T> {
    fn default() -> Self {
        Self {
            dimensions: Vec::new(),
        }
    }
}

impl<T: Coordinate> DomainBuilder<T> {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a copy of `dimension`.
    ///
    /// An unnamed dimension is named `__dim_<i>` after its position. Names must be unique.
    pub fn add_dimension(&mut self, dimension: Dimension<T>) -> TesseraResult<&mut Self> {
        let mut dimension = dimension;
        if dimension.name().is_empty() {
            dimension.set_name(default_dimension_name(self.dimensions.len()));
        }
        if self.has_dimension(dimension.name()) {
            tessera_bail!(
                InvalidDomain: "dimension '{}' is already part of the domain",
                dimension.name()
            );
        }
        self.dimensions.push(dimension);
        Ok(self)
    }

    /// Builder-style variant of [`DomainBuilder::add_dimension`].
    pub fn with_dimension(mut self, dimension: Dimension<T>) -> TesseraResult<Self> {
        self.add_dimension(dimension)?;
        Ok(self)
    }

    /// The number of dimensions added so far.
    pub fn dim_num(&self) -> usize {
        self.dimensions.len()
    }

    /// The dimensions in the order they were added.
    pub fn dimensions(&self) -> &[Dimension<T>] {
        &self.dimensions
    }

    /// Whether a dimension called `name` has been added.
    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.iter().any(|dim| dim.name() == name)
    }

    /// Freezes the dimensions into an immutable [`Domain`].
    ///
    /// Fails if there are no dimensions, or if only some of them carry a tile extent.
    pub fn build(self, cell_order: Layout, tile_order: Layout) -> TesseraResult<Domain<T>> {
        if self.dimensions.is_empty() {
            tessera_bail!(InvalidDomain: "a domain needs at least one dimension");
        }

        let tiled = self
            .dimensions
            .iter()
            .filter(|dim| dim.tile_extent().is_some())
            .count();
        if tiled != 0 && tiled != self.dimensions.len() {
            tessera_bail!(
                InvalidDomain: "{} of {} dimensions have a tile extent; either all or none must",
                tiled,
                self.dimensions.len()
            );
        }

        let domain = Domain::new(self.dimensions, cell_order, tile_order);
        log::debug!(
            "Initialized {}-dimensional {} domain: {} tiles of {} cells, cell order {}, tile order {}",
            domain.dim_num(),
            T::PTYPE,
            domain.tile_num(),
            domain.cell_num_per_tile(),
            cell_order,
            tile_order,
        );
        Ok(domain)
    }
}

fn default_dimension_name(idx: usize) -> String {
    format!("__dim_{idx}")
}

#[cfg(test)]
mod tests {
    use tessera_error::TesseraError;

    use super::*;

    fn dim(name: &str, high: i32, extent: Option<i32>) -> Dimension<i32> {
        Dimension::try_new(name, [0, high], extent).unwrap()
    }

    #[test]
    fn unnamed_dimensions_get_positional_names() {
        let mut builder = DomainBuilder::new();
        builder.add_dimension(dim("", 9, None)).unwrap();
        builder.add_dimension(dim("y", 9, None)).unwrap();
        builder.add_dimension(dim("", 9, None)).unwrap();
        let names: Vec<_> = builder.dimensions().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["__dim_0", "y", "__dim_2"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let builder = DomainBuilder::new().with_dimension(dim("x", 9, None)).unwrap();
        assert!(matches!(
            builder.with_dimension(dim("x", 3, None)),
            Err(TesseraError::InvalidDomain(..))
        ));
    }

    #[test]
    fn empty_domain_is_rejected() {
        assert!(matches!(
            DomainBuilder::<u32>::new().build(Layout::RowMajor, Layout::RowMajor),
            Err(TesseraError::InvalidDomain(..))
        ));
    }

    #[test]
    fn partial_extents_are_rejected() {
        let builder = DomainBuilder::new()
            .with_dimension(dim("x", 9, Some(5)))
            .unwrap()
            .with_dimension(dim("y", 9, None))
            .unwrap();
        assert!(matches!(
            builder.build(Layout::RowMajor, Layout::RowMajor),
            Err(TesseraError::InvalidDomain(..))
        ));
    }

    #[test]
    fn build_keeps_dimension_order() {
        let domain = DomainBuilder::new()
            .with_dimension(dim("b", 3, Some(2)))
            .unwrap()
            .with_dimension(dim("a", 5, Some(3)))
            .unwrap()
            .build(Layout::ColMajor, Layout::RowMajor)
            .unwrap();
        assert_eq!(domain.dim_num(), 2);
        assert_eq!(domain.dimensions()[0].name(), "b");
        assert_eq!(domain.cell_order(), Layout::ColMajor);
        assert_eq!(domain.tile_order(), Layout::RowMajor);
    }
}
