//! Content digests and the provenance commitment.
//!
//! The commitment for an ordered collection of N items is
//! `SHA256( hex(d_0) || hex(d_1) || ... || hex(d_{N-1}) )` where each `d_i` is the
//! SHA-256 digest of the i-th item's content and `hex` is lowercase hex. Anyone
//! holding the revealed content can recompute it with ordinary tooling.

use sha2::{Digest, Sha256};

use crate::{ct_eq_hash, Hash256};

#[must_use]
pub fn sha256(input: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Digest of one item's raw content.
#[inline]
#[must_use]
pub fn content_digest(content: &[u8]) -> Hash256 {
    sha256(content)
}

#[inline]
#[must_use]
pub fn digest_hex(digest: &Hash256) -> String {
    hex::encode(digest)
}

/// Incremental provenance commitment over item digests in final order.
#[derive(Clone, Default)]
pub struct ProvenanceBuilder {
    hasher: Sha256,
    items: u64,
}

impl ProvenanceBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_digest(&mut self, digest: &Hash256) -> &mut Self {
        self.hasher.update(digest_hex(digest).as_bytes());
        self.items += 1;
        self
    }

    pub fn push_content(&mut self, content: &[u8]) -> &mut Self {
        self.push_digest(&content_digest(content))
    }

    #[must_use]
    pub const fn items(&self) -> u64 {
        self.items
    }

    #[must_use]
    pub fn finish(self) -> Hash256 {
        let digest = self.hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}

#[must_use]
pub fn provenance_commitment<'a>(digests: impl IntoIterator<Item = &'a Hash256>) -> Hash256 {
    let mut b = ProvenanceBuilder::new();
    for d in digests {
        b.push_digest(d);
    }
    b.finish()
}

/// Recompute the commitment over `digests` and compare it to `commitment`.
#[must_use]
pub fn verify_provenance<'a>(
    commitment: &Hash256,
    digests: impl IntoIterator<Item = &'a Hash256>,
) -> bool {
    ct_eq_hash(commitment, &provenance_commitment(digests))
}
