#![forbid(unsafe_code)]
#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]

//! Blind drop primitives: hashing, fixed-width little-endian encodings, sorted-pair Merkle trees.
//
// Shared by the drop engine and its off-engine tooling:
//
// - Domain-tagged SHA3-256 with length framing
// - Fixed-width little-endian integer encodings
// - Sorted-pair binary Merkle (odd node promoted) and proof verification
// - SHA-256 content digests and the provenance commitment
// - Constant-time equality helpers for 32-byte digests

use sha3::{Digest, Sha3_256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// 32-byte hash.
pub type Hash256 = [u8; 32];

/// 32-byte public key (Ed25519).
pub type Pk32 = [u8; 32];

/// 64-byte signature (Ed25519 canonical encoding).
pub type Sig64 = [u8; 64];

pub mod commitment;
pub mod constants;

pub use commitment::{
    content_digest, digest_hex, provenance_commitment, verify_provenance, ProvenanceBuilder,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Invalid(String),
    #[error("invalid length: expected {expected} bytes got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Convert an unsigned integer to fixed-width little-endian bytes.
///
/// The output is exactly `W` bytes (no overlong encodings).
#[must_use]
pub fn le_bytes<const W: usize>(mut x: u128) -> [u8; W] {
    let mut out = [0u8; W];
    let mut i = 0usize;
    while i < W {
        out[i] = (x & 0xFF) as u8;
        x >>= 8;
        i += 1;
    }
    out
}

/// Parse a 32-byte value from hex, accepting an optional `0x` prefix.
pub fn hash_from_hex(s: &str) -> Result<Hash256, HexError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| HexError::Invalid(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(HexError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Domain-tagged SHA3-256 with length framing:
/// `H(tag_ascii, parts[])` = `SHA3_256`( UTF8(tag) || Σ ( LE(|p|,8) || p ) )
#[must_use]
pub fn h_tag(tag: &str, parts: &[&[u8]]) -> Hash256 {
    debug_assert!(
        tag.starts_with("drop."),
        "non-drop.* tag used in protocol hashing: {tag}"
    );
    let mut hasher = Sha3_256::new();
    hasher.update(tag.as_bytes());
    for p in parts {
        let len_le = le_bytes::<8>(p.len() as u128);
        hasher.update(len_le);
        hasher.update(p);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tag_asserts {
    use super::*;

    #[test]
    fn all_public_tag_constants_are_drop_namespaced() {
        for t in constants::ALL_TAGS {
            assert!(t.starts_with("drop."), "tag not drop.*: {t}");
        }
    }

    #[test]
    fn tag_constants_match_expected_ascii() {
        let checks: &[(&str, &[u8])] = &[
            (constants::TAG_ALLOWLIST_LEAF, b"drop.allowlist.leaf"),
            (constants::TAG_MERKLE_NODE, b"drop.merkle.node"),
            (constants::TAG_MERKLE_EMPTY, b"drop.merkle.empty"),
            (constants::TAG_VOUCHER, b"drop.voucher"),
            (constants::TAG_ENGINE_ID, b"drop.engine.id"),
        ];
        for (actual, expected) in checks {
            assert_eq!(
                (*actual).as_bytes(),
                *expected,
                "tag ASCII mismatch: {actual}"
            );
        }
    }
}

/// Leaf hash of an allowlisted identity.
#[must_use]
pub fn allowlist_leaf(identity: &[u8]) -> Hash256 {
    h_tag(constants::TAG_ALLOWLIST_LEAF, &[identity])
}

/// Node hash of two children. Children are sorted before hashing, so the
/// result does not depend on which side a sibling sits.
#[must_use]
pub fn merkle_node(a: &Hash256, b: &Hash256) -> Hash256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut cat = [0u8; 64];
    cat[..32].copy_from_slice(lo);
    cat[32..].copy_from_slice(hi);
    h_tag(constants::TAG_MERKLE_NODE, &[&cat])
}

#[must_use]
pub fn merkle_empty_root() -> Hash256 {
    h_tag(constants::TAG_MERKLE_EMPTY, &[])
}

/// Sorted-pair binary Merkle tree. Leaves are sorted and deduplicated before
/// building; an unpaired node at the end of a level is promoted unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    // levels[0] = sorted leaves, last = [root]
    levels: Vec<Vec<Hash256>>,
}

impl MerkleTree {
    #[must_use]
    pub fn from_leaves(mut leaves: Vec<Hash256>) -> Self {
        leaves.sort_unstable();
        leaves.dedup();
        let mut levels = vec![leaves];
        while levels.last().is_some_and(|l| l.len() > 1) {
            let cur = &levels[levels.len() - 1];
            let next: Vec<Hash256> = cur
                .chunks(2)
                .map(|pair| match pair {
                    [l, r] => merkle_node(l, r),
                    // unpaired tail: promoted
                    [single, ..] => *single,
                    [] => merkle_empty_root(),
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    #[must_use]
    pub fn root(&self) -> Hash256 {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or_else(merkle_empty_root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, leaf: &Hash256) -> bool {
        self.levels
            .first()
            .is_some_and(|l| l.binary_search(leaf).is_ok())
    }

    /// Sibling hashes from `leaf` up to (not including) the root, or `None`
    /// if the leaf is not in the tree.
    #[must_use]
    pub fn proof(&self, leaf: &Hash256) -> Option<Vec<Hash256>> {
        let mut idx = self.levels.first()?.binary_search(leaf).ok()?;
        let mut out = Vec::with_capacity(self.levels.len());
        for level in &self.levels[..self.levels.len() - 1] {
            let sib = idx ^ 1;
            if sib < level.len() {
                out.push(level[sib]);
            }
            idx >>= 1;
        }
        Some(out)
    }
}

/// Fold `leaf` with `proof` using sorted-pair hashing and compare against `root`.
#[must_use]
pub fn merkle_verify_sorted(root: &Hash256, leaf: &Hash256, proof: &[Hash256]) -> bool {
    let h = proof.iter().fold(*leaf, |acc, sib| merkle_node(&acc, sib));
    ct_eq_hash(root, &h)
}

/// Constant-time equality for two 32-byte hashes.
#[must_use]
pub fn ct_eq_hash(a: &Hash256, b: &Hash256) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::missing_assert_message)]
mod tests {
    use super::*;

    fn leaves(n: u8) -> Vec<Hash256> {
        (0..n).map(|i| allowlist_leaf(&[i; 32])).collect()
    }

    #[test]
    fn merkle_empty_matches_tag() {
        let tree = MerkleTree::from_leaves(vec![]);
        assert!(tree.is_empty());
        assert!(ct_eq_hash(&tree.root(), &merkle_empty_root()));
        assert!(tree.proof(&[0u8; 32]).is_none());
    }

    #[test]
    fn single_leaf_root_is_leaf() {
        let l = leaves(1);
        let tree = MerkleTree::from_leaves(l.clone());
        assert_eq!(tree.root(), l[0]);
        let proof = tree.proof(&l[0]).unwrap();
        assert!(proof.is_empty());
        assert!(merkle_verify_sorted(&tree.root(), &l[0], &proof));
    }

    #[test]
    fn node_is_order_independent() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(merkle_node(&a, &b), merkle_node(&b, &a));
    }

    #[test]
    fn root_is_independent_of_insertion_order() {
        let l = leaves(7);
        let mut rev = l.clone();
        rev.reverse();
        assert_eq!(
            MerkleTree::from_leaves(l).root(),
            MerkleTree::from_leaves(rev).root()
        );
    }

    #[test]
    fn every_leaf_proves_for_odd_and_even_sizes() {
        for n in 1..=9u8 {
            let l = leaves(n);
            let tree = MerkleTree::from_leaves(l.clone());
            assert_eq!(tree.len(), n as usize);
            for leaf in &l {
                let proof = tree.proof(leaf).unwrap();
                assert!(merkle_verify_sorted(&tree.root(), leaf, &proof), "n={n}");
            }
        }
    }

    #[test]
    fn proof_for_one_leaf_does_not_verify_another() {
        let l = leaves(5);
        let tree = MerkleTree::from_leaves(l.clone());
        let proof0 = tree.proof(&l[0]).unwrap();
        assert!(!merkle_verify_sorted(&tree.root(), &l[1], &proof0));
    }

    #[test]
    fn duplicate_leaves_collapse() {
        let mut l = leaves(3);
        l.push(l[0]);
        assert_eq!(MerkleTree::from_leaves(l).len(), 3);
    }

    #[test]
    fn hash_from_hex_accepts_prefix_and_rejects_bad_length() {
        let h = [0xABu8; 32];
        let s = format!("0x{}", hex::encode(h));
        assert_eq!(hash_from_hex(&s).unwrap(), h);
        assert_eq!(
            hash_from_hex("abcd"),
            Err(HexError::InvalidLength {
                expected: 32,
                got: 2
            })
        );
        assert!(matches!(hash_from_hex("zz"), Err(HexError::Invalid(_))));
    }
}
