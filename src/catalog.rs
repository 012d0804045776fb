//! Read-only resource catalogs.
//!
//! The workflow engine looks formations and rooms up through these
//! traits; record management lives outside this crate. Any storage that
//! can answer the two lookups can drive the engine.
//!
//! # Trait Composition
//!
//! [`Catalog`] is implemented for every type that implements both
//! [`FormationCatalog`] and [`InfrastructureCatalog`]:
//!
//! ```
//! use u_timetable::catalog::{Catalog, InMemoryCatalog};
//! use u_timetable::models::{FormationOffer, Infrastructure};
//!
//! fn room_count<C: Catalog>(catalog: &C) -> usize {
//!     catalog.infrastructures().len()
//! }
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_formation(FormationOffer::new("F1", "Mathematics"))
//!     .with_infrastructure(Infrastructure::classroom("C1").with_capacity(40));
//! assert_eq!(room_count(&catalog), 1);
//! ```

use crate::models::{FormationOffer, Infrastructure};

/// Formation lookup.
pub trait FormationCatalog {
    /// Returns the formation skeleton with this id.
    fn formation(&self, id: &str) -> Option<FormationOffer>;

    /// Lists all formations.
    fn formations(&self) -> Vec<FormationOffer>;
}

/// Infrastructure lookup.
pub trait InfrastructureCatalog {
    /// Lists all infrastructures.
    fn infrastructures(&self) -> Vec<Infrastructure>;
}

/// Composite bound for a catalog answering both lookups.
pub trait Catalog: FormationCatalog + InfrastructureCatalog {}

impl<T> Catalog for T where T: FormationCatalog + InfrastructureCatalog {}

/// Catalog backed by in-memory vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    formations: Vec<FormationOffer>,
    infrastructures: Vec<Infrastructure>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a formation.
    pub fn with_formation(mut self, formation: FormationOffer) -> Self {
        self.formations.push(formation);
        self
    }

    /// Adds an infrastructure.
    pub fn with_infrastructure(mut self, infrastructure: Infrastructure) -> Self {
        self.infrastructures.push(infrastructure);
        self
    }
}

impl FormationCatalog for InMemoryCatalog {
    fn formation(&self, id: &str) -> Option<FormationOffer> {
        self.formations.iter().find(|f| f.id == id).cloned()
    }

    fn formations(&self) -> Vec<FormationOffer> {
        self.formations.clone()
    }
}

impl InfrastructureCatalog for InMemoryCatalog {
    fn infrastructures(&self) -> Vec<Infrastructure> {
        self.infrastructures.clone()
    }
}

impl<T: FormationCatalog + ?Sized> FormationCatalog for &T {
    fn formation(&self, id: &str) -> Option<FormationOffer> {
        (**self).formation(id)
    }

    fn formations(&self) -> Vec<FormationOffer> {
        (**self).formations()
    }
}

impl<T: InfrastructureCatalog + ?Sized> InfrastructureCatalog for &T {
    fn infrastructures(&self) -> Vec<Infrastructure> {
        (**self).infrastructures()
    }
}
