//! End-to-end harness for the blind drop engine.
//!
//! Builds a metadata collection, commits to its shuffled order, configures an
//! engine in either pre-sale mode and hands out the off-engine tooling
//! (allowlist tree or voucher issuer) a campaign operator would hold.

#![forbid(unsafe_code)]

use blind_drop::{
    Amount, AllowlistTree, AuthMode, DropConfig, DropEngine, MemoryContentStore, VoucherIssuer,
    WalletId,
};
use drop_primitives::{
    commitment::{content_digest, provenance_commitment, sha256},
    Hash256,
};
use ed25519_dalek::SigningKey;

pub const PRICE: Amount = 80_000_000_000_000_000;
pub const MAX_SUPPLY: u64 = 20;
pub const MAX_PURCHASE: u64 = 5;
pub const OWNER: WalletId = WalletId([0xAA; 32]);
pub const PLACEHOLDER: &str = "ipfs://QmX3bDzkvdHrAHG72YSXKFqGHTyujHk2hiUrFPXbpW7s4t";
pub const BASE: &str = "ipfs://collection/";

#[must_use]
pub fn wallet(b: u8) -> WalletId {
    WalletId([b; 32])
}

/// Metadata items in their final, committed order.
#[derive(Clone, Debug)]
pub struct Collection {
    pub items: Vec<Vec<u8>>,
}

impl Collection {
    /// `n` metadata documents, reordered by a seed-keyed hash so the final
    /// order is not the generation order.
    #[must_use]
    pub fn shuffled(n: u64, seed: &[u8]) -> Self {
        let mut keyed: Vec<(Hash256, Vec<u8>)> = (0..n)
            .map(|i| {
                let doc = format!("{{\"name\":\"God #{i}\",\"image\":\"ipfs://images/{i}.png\"}}");
                let mut k = seed.to_vec();
                k.extend_from_slice(&i.to_le_bytes());
                (sha256(&k), doc.into_bytes())
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            items: keyed.into_iter().map(|(_, doc)| doc).collect(),
        }
    }

    #[must_use]
    pub fn commitment(&self) -> Hash256 {
        let digests: Vec<Hash256> = self.items.iter().map(|c| content_digest(c)).collect();
        provenance_commitment(&digests)
    }

    /// Content store holding the collection at `base + i`.
    #[must_use]
    pub fn publish(&self, base: &str) -> MemoryContentStore {
        let mut store = MemoryContentStore::new();
        store.publish_collection(base, self.items.iter().cloned());
        store
    }
}

/// A configured engine plus the operator-side tooling for it.
pub struct Campaign {
    pub engine: DropEngine,
    pub collection: Collection,
    pub allowlist: Option<AllowlistTree>,
    pub issuer: Option<VoucherIssuer>,
}

fn config(collection: &Collection, auth_mode: AuthMode) -> DropConfig {
    DropConfig::new(
        "GodsDrop",
        "GOD",
        MAX_SUPPLY,
        MAX_PURCHASE,
        PRICE,
        OWNER,
        PLACEHOLDER,
        collection.commitment(),
        auth_mode,
    )
    .with_network_id(31337)
}

impl Campaign {
    /// Campaign whose pre-sale is gated by an allowlist of `members`.
    ///
    /// # Panics
    /// If the generated configuration is rejected.
    #[must_use]
    pub fn with_allowlist(members: &[WalletId]) -> Self {
        let collection = Collection::shuffled(MAX_SUPPLY, b"allowlist-campaign");
        let tree = AllowlistTree::from_wallets(members);
        let engine = DropEngine::new(config(&collection, AuthMode::Allowlist(tree.root())))
            .expect("valid campaign config");
        Self {
            engine,
            collection,
            allowlist: Some(tree),
            issuer: None,
        }
    }

    /// Campaign whose pre-sale is gated by vouchers from a fixed issuer key.
    ///
    /// # Panics
    /// If the generated configuration is rejected.
    #[must_use]
    pub fn with_vouchers() -> Self {
        let collection = Collection::shuffled(MAX_SUPPLY, b"voucher-campaign");
        let key = SigningKey::from_bytes(&[0x42; 32]);
        let signer = key.verifying_key().to_bytes();
        let engine = DropEngine::new(config(&collection, AuthMode::Voucher(signer)))
            .expect("valid campaign config");
        let issuer = VoucherIssuer::new(key, engine.signing_domain());
        Self {
            engine,
            collection,
            allowlist: None,
            issuer: Some(issuer),
        }
    }

    /// Allowlist authorization for `w`; an empty proof if `w` is not a member.
    #[must_use]
    pub fn proof_for(&self, w: &WalletId) -> blind_drop::Authorization {
        let proof = self
            .allowlist
            .as_ref()
            .and_then(|t| t.proof(w))
            .unwrap_or_default();
        blind_drop::Authorization::Allowlist { proof }
    }

    /// Voucher authorization for `w` at its current engine nonce.
    ///
    /// # Panics
    /// If the campaign has no voucher issuer.
    #[must_use]
    pub fn voucher_for(&self, w: WalletId) -> blind_drop::Authorization {
        let issuer = self.issuer.as_ref().expect("voucher campaign");
        blind_drop::Authorization::Voucher(issuer.issue(w, "", self.engine.caller_nonce(&w)))
    }
}
