use drop_primitives::Hash256;

use crate::errors::DropError;
use crate::types::TokenId;

/// Provenance commitment plus placeholder and (after reveal) base location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealRegistry {
    provenance: Hash256,
    placeholder: String,
    base: Option<String>,
}

impl RevealRegistry {
    #[must_use]
    pub const fn new(provenance: Hash256, placeholder: String) -> Self {
        Self {
            provenance,
            placeholder,
            base: None,
        }
    }

    /// Set the base location. Write-once.
    pub fn reveal(&mut self, base: String) -> Result<(), DropError> {
        if self.base.is_some() {
            return Err(DropError::AlreadyRevealed);
        }
        self.base = Some(base);
        Ok(())
    }

    /// Metadata reference for `id`. Callers check that `id` exists.
    #[must_use]
    pub fn resolve_uri(&self, id: TokenId) -> String {
        match &self.base {
            Some(base) => format!("{base}{id}"),
            None => self.placeholder.clone(),
        }
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.base.is_some()
    }

    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    #[must_use]
    pub const fn provenance(&self) -> &Hash256 {
        &self.provenance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_until_reveal_then_base_plus_id() {
        let mut r = RevealRegistry::new([1; 32], "ipfs://placeholder".into());
        assert_eq!(r.resolve_uri(0), "ipfs://placeholder");
        assert_eq!(r.resolve_uri(17), "ipfs://placeholder");
        r.reveal("loc/".into()).unwrap();
        assert_eq!(r.resolve_uri(1), "loc/1");
        assert_eq!(r.resolve_uri(120), "loc/120");
    }

    #[test]
    fn reveal_is_write_once() {
        let mut r = RevealRegistry::new([1; 32], "p".into());
        r.reveal("a/".into()).unwrap();
        assert_eq!(r.reveal("b/".into()), Err(DropError::AlreadyRevealed));
        assert_eq!(r.base(), Some("a/"));
        assert_eq!(r.provenance(), &[1; 32]);
    }
}
