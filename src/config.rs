//! Drop configuration.
//!
//! [`DropConfig`] is the validated, immutable configuration an engine is built
//! from. [`DropManifest`] is its TOML file form, with identities and hashes
//! written as hex strings:
//!
//! ```toml
//! name = "TestDrop"
//! symbol = "TSD"
//! max_supply = 20
//! max_purchase = 5
//! price = "80000000000000000"
//! owner = "0101010101010101010101010101010101010101010101010101010101010101"
//! placeholder_uri = "ipfs://placeholder"
//! provenance = "d48783479c5fcc13fbd28099ef2c060d8394e26d0a58d29be0fbcb35f83444a2"
//! allowlist_root = "..."
//!
//! [signing]
//! network_id = 1
//! ```

use std::path::Path;

use drop_primitives::{
    constants::{DEFAULT_SIGNING_DOMAIN_NAME, DEFAULT_SIGNING_DOMAIN_VERSION, TAG_ENGINE_ID},
    h_tag, hash_from_hex, le_bytes, Hash256,
};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{Amount, AuthMode, SigningDomain, WalletId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropConfig {
    pub name: String,
    pub symbol: String,
    /// Collection-level metadata reference.
    pub contract_uri: String,
    pub max_supply: u64,
    /// Maximum quantity per claim call.
    pub max_purchase: u64,
    /// Unit price.
    pub price: Amount,
    pub owner: WalletId,
    pub placeholder_uri: String,
    pub provenance: Hash256,
    pub auth_mode: AuthMode,
    pub domain_name: String,
    pub domain_version: String,
    pub network_id: u64,
}

impl DropConfig {
    /// Build a config with the default signing domain on network 0.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        max_supply: u64,
        max_purchase: u64,
        price: Amount,
        owner: WalletId,
        placeholder_uri: impl Into<String>,
        provenance: Hash256,
        auth_mode: AuthMode,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            contract_uri: String::new(),
            max_supply,
            max_purchase,
            price,
            owner,
            placeholder_uri: placeholder_uri.into(),
            provenance,
            auth_mode,
            domain_name: DEFAULT_SIGNING_DOMAIN_NAME.to_string(),
            domain_version: DEFAULT_SIGNING_DOMAIN_VERSION.to_string(),
            network_id: 0,
        }
    }

    #[must_use]
    pub fn with_contract_uri(mut self, uri: impl Into<String>) -> Self {
        self.contract_uri = uri.into();
        self
    }

    #[must_use]
    pub const fn with_network_id(mut self, network_id: u64) -> Self {
        self.network_id = network_id;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_supply == 0 {
            return Err(ConfigError::Limits("max_supply must be at least 1"));
        }
        if self.max_purchase == 0 {
            return Err(ConfigError::Limits("max_purchase must be at least 1"));
        }
        if self.placeholder_uri.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }
        if let AuthMode::Voucher(pk) = &self.auth_mode {
            VerifyingKey::from_bytes(pk).map_err(|_| ConfigError::InvalidSignerKey)?;
        }
        Ok(())
    }

    /// Identity of the engine instance, bound into voucher digests.
    #[must_use]
    pub fn engine_id(&self) -> Hash256 {
        h_tag(
            TAG_ENGINE_ID,
            &[
                self.name.as_bytes(),
                self.symbol.as_bytes(),
                self.owner.as_bytes(),
                &self.provenance,
                &le_bytes::<8>(u128::from(self.network_id)),
            ],
        )
    }

    #[must_use]
    pub fn signing_domain(&self) -> SigningDomain {
        SigningDomain {
            name: self.domain_name.clone(),
            version: self.domain_version.clone(),
            network_id: self.network_id,
            engine_id: self.engine_id(),
        }
    }
}

/// File form of [`DropConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DropManifest {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub contract_uri: String,
    pub max_supply: u64,
    pub max_purchase: u64,
    /// Unit price in base units, written as a decimal string.
    #[serde(with = "amount_decimal")]
    pub price: Amount,
    pub owner: String,
    pub placeholder_uri: String,
    pub provenance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_signer: Option<String>,
    #[serde(default)]
    pub signing: SigningManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningManifest {
    #[serde(default = "default_domain_name")]
    pub name: String,
    #[serde(default = "default_domain_version")]
    pub version: String,
    #[serde(default)]
    pub network_id: u64,
}

impl Default for SigningManifest {
    fn default() -> Self {
        Self {
            name: default_domain_name(),
            version: default_domain_version(),
            network_id: 0,
        }
    }
}

fn default_domain_name() -> String {
    DEFAULT_SIGNING_DOMAIN_NAME.to_string()
}

fn default_domain_version() -> String {
    DEFAULT_SIGNING_DOMAIN_VERSION.to_string()
}

/// `Amount` as a decimal string. Bare TOML integers are accepted on read, but
/// they stop at `i64::MAX`.
mod amount_decimal {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::types::Amount;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Ok(Amount::from(n)),
            Repr::Text(s) => s
                .trim()
                .replace('_', "")
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid price: {s:?}"))),
        }
    }
}

fn hex_field(field: &'static str, s: &str) -> Result<Hash256, ConfigError> {
    hash_from_hex(s).map_err(|source| ConfigError::Hex { field, source })
}

impl DropManifest {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Decode hex fields, select the authorization mode and validate.
    pub fn into_config(self) -> Result<DropConfig, ConfigError> {
        let auth_mode = match (&self.allowlist_root, &self.voucher_signer) {
            (Some(root), None) => AuthMode::Allowlist(hex_field("allowlist_root", root)?),
            (None, Some(signer)) => AuthMode::Voucher(hex_field("voucher_signer", signer)?),
            _ => return Err(ConfigError::AuthMode),
        };
        let config = DropConfig {
            owner: WalletId(hex_field("owner", &self.owner)?),
            provenance: hex_field("provenance", &self.provenance)?,
            name: self.name,
            symbol: self.symbol,
            contract_uri: self.contract_uri,
            max_supply: self.max_supply,
            max_purchase: self.max_purchase,
            price: self.price,
            placeholder_uri: self.placeholder_uri,
            auth_mode,
            domain_name: self.signing.name,
            domain_version: self.signing.version,
            network_id: self.signing.network_id,
        };
        config.validate()?;
        Ok(config)
    }
}
