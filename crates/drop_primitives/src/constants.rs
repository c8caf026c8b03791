#![forbid(unsafe_code)]

pub const TAG_ALLOWLIST_LEAF: &str = "drop.allowlist.leaf";
pub const TAG_MERKLE_NODE: &str = "drop.merkle.node";
pub const TAG_MERKLE_EMPTY: &str = "drop.merkle.empty";

pub const TAG_VOUCHER: &str = "drop.voucher";
pub const TAG_ENGINE_ID: &str = "drop.engine.id";

/// Signing domain shared with off-engine voucher issuers.
pub const DEFAULT_SIGNING_DOMAIN_NAME: &str = "GOD-Voucher";
pub const DEFAULT_SIGNING_DOMAIN_VERSION: &str = "1";

pub const ALL_TAGS: &[&str] = &[
    TAG_ALLOWLIST_LEAF,
    TAG_MERKLE_NODE,
    TAG_MERKLE_EMPTY,
    TAG_VOUCHER,
    TAG_ENGINE_ID,
];
