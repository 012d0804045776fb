//! Infrastructure allocation.
//!
//! Holds the catalog's rooms with their selection flags. The selected
//! subset is the pool the session generator allocates from. Selections
//! are not sticky: [`InfrastructurePool::select`] replaces the whole
//! selection.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog::InfrastructureCatalog;
use crate::error::{Result, WorkflowError};
use crate::models::Infrastructure;

/// Rooms available to a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructurePool {
    items: Vec<Infrastructure>,
}

impl InfrastructurePool {
    /// Creates a pool; incoming `selected` flags are kept.
    pub fn new(items: Vec<Infrastructure>) -> Self {
        Self { items }
    }

    /// Loads every catalog room, all unselected.
    pub fn from_catalog<C: InfrastructureCatalog + ?Sized>(catalog: &C) -> Self {
        let items = catalog
            .infrastructures()
            .into_iter()
            .map(|mut i| {
                i.selected = false;
                i
            })
            .collect();
        Self { items }
    }

    /// All rooms, selected or not.
    pub fn list(&self) -> &[Infrastructure] {
        &self.items
    }

    /// Finds a room by id.
    pub fn get(&self, id: &str) -> Option<&Infrastructure> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Flips one room's selection flag, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| WorkflowError::UnknownInfrastructure(id.to_string()))?;
        item.selected = !item.selected;
        debug!("Infrastructure {} selected={}", id, item.selected);
        Ok(item.selected)
    }

    /// Replaces the selection with exactly `ids`.
    ///
    /// Unknown ids fail the whole call and leave the selection unchanged.
    pub fn select<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id.as_ref()).is_none()) {
            return Err(WorkflowError::UnknownInfrastructure(
                unknown.as_ref().to_string(),
            ));
        }
        for item in &mut self.items {
            item.selected = ids.iter().any(|id| id.as_ref() == item.id);
        }
        info!("Selected {} of {} infrastructures", self.selected_count(), self.items.len());
        Ok(())
    }

    /// Clears every selection flag.
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }

    /// Selected rooms in catalog order.
    pub fn selected(&self) -> Vec<&Infrastructure> {
        self.items.iter().filter(|i| i.selected).collect()
    }

    /// Number of selected rooms.
    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|i| i.selected).count()
    }

    /// Returns the selected rooms, failing with [`WorkflowError::EmptySelection`] if none.
    pub fn validate(&self) -> Result<Vec<Infrastructure>> {
        let selected: Vec<Infrastructure> = self.selected().into_iter().cloned().collect();
        if selected.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn pool() -> InfrastructurePool {
        let catalog = InMemoryCatalog::new()
            .with_infrastructure(Infrastructure::amphitheater("A1").with_capacity(200).selected())
            .with_infrastructure(Infrastructure::classroom("C1").with_capacity(40))
            .with_infrastructure(Infrastructure::laboratory("L1").with_capacity(24));
        InfrastructurePool::from_catalog(&catalog)
    }

    #[test]
    fn test_from_catalog_starts_unselected() {
        let p = pool();
        assert_eq!(p.list().len(), 3);
        assert_eq!(p.selected_count(), 0);
    }

    #[test]
    fn test_toggle() {
        let mut p = pool();
        assert!(p.toggle("C1").unwrap());
        assert_eq!(p.selected()[0].id, "C1");
        assert!(!p.toggle("C1").unwrap());
        assert_eq!(
            p.toggle("X9").unwrap_err(),
            WorkflowError::UnknownInfrastructure("X9".into())
        );
    }

    #[test]
    fn test_select_replaces() {
        let mut p = pool();
        p.select(&["A1", "C1"]).unwrap();
        assert_eq!(p.selected_count(), 2);

        p.select(&["L1"]).unwrap();
        let ids: Vec<&str> = p.selected().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["L1"]);
    }

    #[test]
    fn test_select_unknown_is_atomic() {
        let mut p = pool();
        p.select(&["A1"]).unwrap();
        assert!(p.select(&["C1", "nope"]).is_err());
        assert_eq!(p.selected()[0].id, "A1");
        assert_eq!(p.selected_count(), 1);
    }

    #[test]
    fn test_validate_empty_selection() {
        let mut p = pool();
        assert_eq!(p.validate().unwrap_err(), WorkflowError::EmptySelection);
        p.toggle("L1").unwrap();
        assert_eq!(p.validate().unwrap().len(), 1);
        p.clear();
        assert!(p.validate().is_err());
    }
}
