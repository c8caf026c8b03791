use core::fmt;
use core::ops::Range;

use drop_primitives::{Hash256, Pk32, Sig64};

use crate::errors::DropError;

/// Payment amount in the smallest unit of the settlement currency.
pub type Amount = u128;
pub type TokenId = u64;
/// Half-open range of token ids assigned by one claim.
pub type IdRange = Range<TokenId>;

/// Opaque 32-byte wallet identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct WalletId(pub Pk32);

impl WalletId {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<Pk32> for WalletId {
    fn from(b: Pk32) -> Self {
        Self(b)
    }
}

impl From<&ed25519_dalek::VerifyingKey> for WalletId {
    fn from(vk: &ed25519_dalek::VerifyingKey) -> Self {
        Self(vk.to_bytes())
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletId({})", hex::encode(&self.0[..8]))
    }
}

/// Sale phase. Any phase may follow any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    #[default]
    NotStarted = 0,
    PreSale = 1,
    PublicSale = 2,
}

impl TryFrom<u8> for Phase {
    type Error = u8;
    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0 => Ok(Self::NotStarted),
            1 => Ok(Self::PreSale),
            2 => Ok(Self::PublicSale),
            other => Err(other),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not-started",
            Self::PreSale => "pre-sale",
            Self::PublicSale => "public-sale",
        };
        f.write_str(s)
    }
}

/// Pre-sale authorization mode, fixed at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Merkle root over allowlisted wallet leaves.
    Allowlist(Hash256),
    /// Ed25519 key of the trusted off-engine voucher signer.
    Voucher(Pk32),
}

/// Signed single-use authorization issued off-engine for one wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voucher {
    pub wallet: WalletId,
    pub data: String,
    pub signature: Sig64,
}

/// Authorization material presented with a claim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Authorization {
    #[default]
    None,
    Allowlist {
        /// Sibling hashes from the caller's leaf up to the root.
        proof: Vec<Hash256>,
    },
    Voucher(Voucher),
}

/// Domain mixed into every voucher digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub network_id: u64,
    pub engine_id: Hash256,
}

/// Ownership guard for owner-only operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ownership {
    owner: WalletId,
}

impl Ownership {
    #[must_use]
    pub const fn new(owner: WalletId) -> Self {
        Self { owner }
    }

    #[must_use]
    pub const fn owner(&self) -> WalletId {
        self.owner
    }

    pub fn ensure(&self, caller: &WalletId) -> Result<(), DropError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(DropError::Unauthorized)
        }
    }
}
