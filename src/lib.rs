#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation
)]

//! Blind drop engine.
//!
//! A fixed-supply collection is sold in phases: closed, an authorized
//! pre-sale (Merkle allowlist or signed single-use vouchers) and an open
//! public sale. Every token shows the same placeholder until the owner reveals
//! the real metadata location, and a SHA-256 provenance commitment recorded at
//! configuration lets anyone check afterwards that the revealed collection
//! was fixed before the sale.
//!
//! The engine is a single-writer state machine: every mutator validates fully
//! before writing, so a failed call leaves no trace. [`SharedDrop`] serializes
//! access from multiple threads.

pub mod allowlist;
pub mod config;
pub mod engine;
pub mod errors;
pub mod phase;
pub mod provenance;
pub mod reveal;
pub mod shared;
pub mod supply;
pub mod types;
pub mod voucher;

pub use allowlist::{AllowlistTree, MerkleAllowlist};
pub use config::{DropConfig, DropManifest};
pub use engine::DropEngine;
pub use errors::{AuditError, CodecError, ConfigError, DropError};
pub use phase::{AuthPath, PhaseController};
pub use provenance::{audit_collection, audit_reveal, AuditReport, ContentSource, MemoryContentStore};
pub use reveal::RevealRegistry;
pub use shared::SharedDrop;
pub use supply::SupplyLedger;
pub use types::{
    Amount, AuthMode, Authorization, IdRange, Ownership, Phase, SigningDomain, TokenId, Voucher,
    WalletId,
};
pub use voucher::{decode_voucher, encode_voucher, voucher_digest, CallerNonces, VoucherAuthority, VoucherIssuer};

pub use drop_primitives::{Hash256, Pk32, Sig64};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
