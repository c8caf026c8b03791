//! Signed single-use vouchers.
//!
//! A voucher is signed off-engine by the trusted issuer over
//!
//! `D = H("drop.voucher", [wallet, data, LE64(network_id), domain_name, domain_version, engine_id, LE64(caller_nonce)])`
//!
//! where `caller_nonce` is the wallet's nonce as held by the engine at issue
//! time. The engine bumps that nonce whenever a voucher claim commits, so a
//! voucher verifies at most once.

use std::collections::BTreeMap;

use drop_primitives::{constants::TAG_VOUCHER, h_tag, le_bytes, Hash256, Pk32, Sig64};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::errors::{CodecError, ConfigError, DropError};
use crate::types::{SigningDomain, Voucher, WalletId};

pub const MAX_VOUCHER_DATA_LEN: usize = 1024;
pub const MAX_VOUCHER_SIZE: usize = 32 + 4 + MAX_VOUCHER_DATA_LEN + 64;

#[must_use]
pub fn voucher_digest(domain: &SigningDomain, wallet: &WalletId, data: &str, nonce: u64) -> Hash256 {
    h_tag(
        TAG_VOUCHER,
        &[
            wallet.as_bytes(),
            data.as_bytes(),
            &le_bytes::<8>(u128::from(domain.network_id)),
            domain.name.as_bytes(),
            domain.version.as_bytes(),
            &domain.engine_id,
            &le_bytes::<8>(u128::from(nonce)),
        ],
    )
}

/// Engine-side voucher verification against the trusted signer.
#[derive(Clone, Debug)]
pub struct VoucherAuthority {
    signer: VerifyingKey,
    domain: SigningDomain,
}

impl VoucherAuthority {
    pub fn new(signer: &Pk32, domain: SigningDomain) -> Result<Self, ConfigError> {
        let signer = VerifyingKey::from_bytes(signer).map_err(|_| ConfigError::InvalidSignerKey)?;
        Ok(Self { signer, domain })
    }

    #[must_use]
    pub fn signer(&self) -> Pk32 {
        self.signer.to_bytes()
    }

    #[must_use]
    pub const fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// Check that `voucher` was issued for `caller` at `nonce` by the trusted signer.
    pub fn verify(&self, voucher: &Voucher, caller: &WalletId, nonce: u64) -> Result<(), DropError> {
        if voucher.wallet != *caller {
            return Err(DropError::InvalidWallet);
        }
        let digest = voucher_digest(&self.domain, &voucher.wallet, &voucher.data, nonce);
        let sig = Signature::from_bytes(&voucher.signature);
        self.signer
            .verify_strict(&digest, &sig)
            .map_err(|_| DropError::InvalidOrUnauthorizedVoucher)
    }
}

/// Off-engine voucher signer.
pub struct VoucherIssuer {
    key: SigningKey,
    domain: SigningDomain,
}

impl VoucherIssuer {
    #[must_use]
    pub const fn new(key: SigningKey, domain: SigningDomain) -> Self {
        Self { key, domain }
    }

    /// Issuer with a freshly generated key.
    #[must_use]
    pub fn generate(domain: SigningDomain) -> Self {
        let key = SigningKey::generate(&mut rand_core::OsRng);
        Self { key, domain }
    }

    /// Public key to configure as the engine's trusted signer.
    #[must_use]
    pub fn signer(&self) -> Pk32 {
        self.key.verifying_key().to_bytes()
    }

    /// Sign a voucher for `wallet`; `nonce` must be the engine's current nonce for it.
    #[must_use]
    pub fn issue(&self, wallet: WalletId, data: impl Into<String>, nonce: u64) -> Voucher {
        let data = data.into();
        let digest = voucher_digest(&self.domain, &wallet, &data, nonce);
        Voucher {
            wallet,
            data,
            signature: self.key.sign(&digest).to_bytes(),
        }
    }
}

/// Per-wallet replay counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallerNonces {
    nonces: BTreeMap<WalletId, u64>,
}

impl CallerNonces {
    #[must_use]
    pub fn get(&self, wallet: &WalletId) -> u64 {
        self.nonces.get(wallet).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, wallet: WalletId) -> u64 {
        let n = self.nonces.entry(wallet).or_insert(0);
        *n = n.saturating_add(1);
        *n
    }
}

// ——— Canonical voucher codec (wire format) ————————————————————————————
//
// wallet(32) || LE32(|data|) || data || signature(64)

const fn read_exact<'a>(src: &mut &'a [u8], n: usize) -> Result<&'a [u8], CodecError> {
    if src.len() < n {
        return Err(CodecError::Short);
    }
    let (a, b) = src.split_at(n);
    *src = b;
    Ok(a)
}

pub fn encode_voucher(v: &Voucher) -> Result<Vec<u8>, CodecError> {
    let data = v.data.as_bytes();
    if data.len() > MAX_VOUCHER_DATA_LEN {
        return Err(CodecError::DataTooLong(data.len()));
    }
    let mut out = Vec::with_capacity(32 + 4 + data.len() + 64);
    out.extend_from_slice(v.wallet.as_bytes());
    out.extend_from_slice(&le_bytes::<4>(data.len() as u128));
    out.extend_from_slice(data);
    out.extend_from_slice(&v.signature);
    Ok(out)
}

pub fn decode_voucher(mut src: &[u8]) -> Result<Voucher, CodecError> {
    if src.len() > MAX_VOUCHER_SIZE {
        return Err(CodecError::Oversize(src.len()));
    }
    let wallet = {
        let mut a = [0u8; 32];
        a.copy_from_slice(read_exact(&mut src, 32)?);
        WalletId(a)
    };
    let len = {
        let mut a = [0u8; 4];
        a.copy_from_slice(read_exact(&mut src, 4)?);
        u32::from_le_bytes(a) as usize
    };
    if len > MAX_VOUCHER_DATA_LEN {
        return Err(CodecError::DataTooLong(len));
    }
    let data = std::str::from_utf8(read_exact(&mut src, len)?)
        .map_err(|_| CodecError::Utf8)?
        .to_owned();
    let signature: Sig64 = {
        let mut s = [0u8; 64];
        s.copy_from_slice(read_exact(&mut src, 64)?);
        s
    };
    if !src.is_empty() {
        return Err(CodecError::Trailing);
    }
    Ok(Voucher {
        wallet,
        data,
        signature,
    })
}
