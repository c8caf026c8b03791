//! Off-engine provenance audit.
//!
//! After reveal, anyone can fetch `base + i` for every id, digest the content
//! and recompute the commitment the engine stored before the sale.

use std::collections::HashMap;

use drop_primitives::{commitment::ProvenanceBuilder, ct_eq_hash, Hash256};
use tracing::{info, warn};

use crate::engine::DropEngine;
use crate::errors::AuditError;

/// Content-addressed storage the revealed metadata lives in.
pub trait ContentSource {
    fn fetch(&self, location: &str) -> Option<Vec<u8>>;
}

/// In-memory [`ContentSource`].
#[derive(Clone, Debug, Default)]
pub struct MemoryContentStore {
    items: HashMap<String, Vec<u8>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, location: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.items.insert(location.into(), content.into());
    }

    /// Publish `items[i]` at `base + i`.
    pub fn publish_collection<I, C>(&mut self, base: &str, items: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        for (i, content) in items.into_iter().enumerate() {
            self.publish(format!("{base}{i}"), content);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ContentSource for MemoryContentStore {
    fn fetch(&self, location: &str) -> Option<Vec<u8>> {
        self.items.get(location).cloned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub expected: Hash256,
    pub computed: Hash256,
    pub items: u64,
}

impl AuditReport {
    #[must_use]
    pub fn matches(&self) -> bool {
        ct_eq_hash(&self.expected, &self.computed)
    }
}

/// Recompute the commitment over `base + i` for `i in 0..items`.
pub fn audit_collection<S: ContentSource + ?Sized>(
    source: &S,
    base: &str,
    items: u64,
    expected: &Hash256,
) -> Result<AuditReport, AuditError> {
    let mut builder = ProvenanceBuilder::new();
    for i in 0..items {
        let location = format!("{base}{i}");
        let content = source.fetch(&location).ok_or(AuditError::Missing(location))?;
        builder.push_content(&content);
    }
    let report = AuditReport {
        expected: *expected,
        computed: builder.finish(),
        items,
    };
    if report.matches() {
        info!(items, "provenance verified");
    } else {
        warn!(
            items,
            expected = %hex::encode(report.expected),
            computed = %hex::encode(report.computed),
            "provenance mismatch"
        );
    }
    Ok(report)
}

/// Audit a revealed engine against `source` over the full collection.
pub fn audit_reveal<S: ContentSource + ?Sized>(
    engine: &DropEngine,
    source: &S,
) -> Result<AuditReport, AuditError> {
    let base = engine.base_uri().ok_or(AuditError::NotRevealed)?;
    audit_collection(source, base, engine.max_supply(), engine.provenance())
}
