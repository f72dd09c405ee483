//! In-memory product collection.
//!
//! [`ProductStore`] is the single writer of the product list. It only ever
//! holds server-confirmed products, keeps insertion order, and guarantees at
//! most one entry per id. Readers get owned copies, so nothing handed out by
//! [`ProductStore::list`] can be used to corrupt the store.

use std::collections::HashSet;

use crate::models::{Product, ProductId};

/// A single mutation applied to the store, kept so it can be replayed on top
/// of a listing that was fetched before the mutation committed.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Added(Product),
    Replaced(Product),
    Removed(ProductId),
}

/// Ordered collection of server-confirmed products, unique by id.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a server listing. Duplicate ids keep their first
    /// occurrence.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut store = Self::new();
        store.reset(products);
        store
    }

    /// Snapshot of the collection in insertion order.
    pub fn list(&self) -> Vec<Product> {
        self.products.clone()
    }

    /// Borrowing view for callers that only need to read in place.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.position(id).map(|i| self.products[i].clone())
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.id).collect()
    }

    /// Append a server-confirmed product.
    ///
    /// If the id is somehow already present the existing entry is replaced
    /// in place instead, so the one-entry-per-id invariant always holds.
    pub fn add(&mut self, product: Product) {
        match self.position(product.id) {
            Some(i) => {
                tracing::warn!(
                    product_id = product.id,
                    "add for an id already in the store; replacing in place"
                );
                self.products[i] = product;
            }
            None => self.products.push(product),
        }
    }

    /// Replace the entry with the same id, keeping its position.
    ///
    /// Returns `false` and leaves the store untouched when the id is absent;
    /// a refresh that lands after its product was deleted must not resurrect it.
    pub fn replace(&mut self, updated: Product) -> bool {
        match self.position(updated.id) {
            Some(i) => {
                self.products[i] = updated;
                true
            }
            None => false,
        }
    }

    /// Remove the entry with the given id. Returns whether anything was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.products.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replace the whole collection with a fresh server listing.
    pub fn reset(&mut self, products: Vec<Product>) {
        let mut seen = HashSet::with_capacity(products.len());
        let mut deduped = Vec::with_capacity(products.len());
        for product in products {
            if seen.insert(product.id) {
                deduped.push(product);
            } else {
                tracing::warn!(
                    product_id = product.id,
                    "duplicate id in product listing; keeping first"
                );
            }
        }
        self.products = deduped;
    }

    /// Apply a recorded change. Returns whether the store was modified.
    ///
    /// Replaying `Added` for an id the listing already has refreshes it in
    /// place without the duplicate warning `add` emits.
    pub fn apply(&mut self, change: &StoreChange) -> bool {
        match change {
            StoreChange::Added(product) => {
                if !self.replace(product.clone()) {
                    self.products.push(product.clone());
                }
                true
            }
            StoreChange::Replaced(product) => self.replace(product.clone()),
            StoreChange::Removed(id) => self.remove(*id),
        }
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }
}
