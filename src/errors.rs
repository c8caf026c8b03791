use thiserror::Error;

/// Failures of engine operations. Every failure leaves engine state unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DropError {
    #[error("caller is not the owner")]
    Unauthorized,

    #[error("sale is not open")]
    SaleNotOpen,

    #[error("not in allow list")]
    NotAllowlisted,

    #[error("voucher wallet does not match caller")]
    InvalidWallet,

    #[error("invalid or unauthorized voucher")]
    InvalidOrUnauthorizedVoucher,

    #[error("quantity exceeds number of tokens per claim")]
    QuantityExceedsLimit,

    #[error("not enough tokens left")]
    InsufficientSupply,

    #[error("payment amount is not correct")]
    IncorrectPayment,

    #[error("collected proceeds would overflow")]
    ProceedsOverflow,

    #[error("collection already revealed")]
    AlreadyRevealed,

    #[error("allowlist mode is not configured")]
    AllowlistNotConfigured,

    #[error("token {0} does not exist")]
    NonexistentToken(u64),

    #[error("caller does not own token {0}")]
    NotTokenOwner(u64),
}

impl DropError {
    /// True for the pre-sale authorization sub-reasons.
    #[must_use]
    pub const fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::NotAllowlisted | Self::InvalidWallet | Self::InvalidOrUnauthorizedVoucher
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid hex in `{field}`: {source}")]
    Hex {
        field: &'static str,
        source: drop_primitives::HexError,
    },

    #[error("invalid voucher signer key")]
    InvalidSignerKey,

    #[error("exactly one of allowlist_root and voucher_signer must be set")]
    AuthMode,

    #[error("invalid limits: {0}")]
    Limits(&'static str),

    #[error("placeholder location must not be empty")]
    EmptyPlaceholder,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("input too short")]
    Short,
    #[error("trailing bytes after decode")]
    Trailing,
    #[error("input of {0} bytes exceeds the size cap")]
    Oversize(usize),
    #[error("voucher data of {0} bytes exceeds the length cap")]
    DataTooLong(usize),
    #[error("voucher data is not valid UTF-8")]
    Utf8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("no content published at {0}")]
    Missing(String),
    #[error("collection has not been revealed")]
    NotRevealed,
}
