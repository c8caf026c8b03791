use drop_primitives::{allowlist_leaf, merkle_verify_sorted, Hash256, MerkleTree};

use crate::types::WalletId;

/// Engine-side allowlist: only the root is stored, never the members.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MerkleAllowlist {
    root: Hash256,
}

impl MerkleAllowlist {
    #[must_use]
    pub const fn new(root: Hash256) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> Hash256 {
        self.root
    }

    /// Replace the root. Owner gating is done by the engine.
    pub fn set_root(&mut self, root: Hash256) {
        self.root = root;
    }

    #[must_use]
    pub fn verify(&self, candidate: &WalletId, proof: &[Hash256]) -> bool {
        merkle_verify_sorted(&self.root, &wallet_leaf(candidate), proof)
    }
}

#[inline]
#[must_use]
pub fn wallet_leaf(wallet: &WalletId) -> Hash256 {
    allowlist_leaf(wallet.as_bytes())
}

/// Off-engine allowlist builder used to publish the root and hand out proofs.
#[derive(Clone, Debug)]
pub struct AllowlistTree {
    tree: MerkleTree,
}

impl AllowlistTree {
    #[must_use]
    pub fn from_wallets<'a>(wallets: impl IntoIterator<Item = &'a WalletId>) -> Self {
        let leaves = wallets.into_iter().map(wallet_leaf).collect();
        Self {
            tree: MerkleTree::from_leaves(leaves),
        }
    }

    #[must_use]
    pub fn root(&self) -> Hash256 {
        self.tree.root()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Proof for `wallet`, or `None` if it is not a member.
    #[must_use]
    pub fn proof(&self, wallet: &WalletId) -> Option<Vec<Hash256>> {
        self.tree.proof(&wallet_leaf(wallet))
    }
}
