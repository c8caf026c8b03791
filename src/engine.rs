//! The drop engine: composes phase, authorization, supply and reveal state
//! behind the claim, owner and read surfaces.
//!
//! Every mutator runs its checks before touching state, so a failed call
//! leaves the engine exactly as it was.

use std::collections::BTreeMap;

use drop_primitives::Hash256;
use tracing::{debug, info, warn};

use crate::allowlist::MerkleAllowlist;
use crate::config::DropConfig;
use crate::errors::{ConfigError, DropError};
use crate::phase::{AuthPath, PhaseController};
use crate::reveal::RevealRegistry;
use crate::supply::SupplyLedger;
use crate::types::{
    Amount, AuthMode, Authorization, IdRange, Ownership, Phase, SigningDomain, TokenId, WalletId,
};
use crate::voucher::{CallerNonces, VoucherAuthority};

#[derive(Clone, Debug)]
enum Authorizer {
    Allowlist(MerkleAllowlist),
    Voucher(VoucherAuthority),
}

#[derive(Clone, Debug)]
pub struct DropEngine {
    config: DropConfig,
    ownership: Ownership,
    phase: PhaseController,
    authorizer: Authorizer,
    supply: SupplyLedger,
    reveal: RevealRegistry,
    nonces: CallerNonces,
    // owners[id] = current holder of token `id`
    owners: Vec<WalletId>,
    balances: BTreeMap<WalletId, u64>,
    proceeds: Amount,
}

impl DropEngine {
    pub fn new(config: DropConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let authorizer = match &config.auth_mode {
            AuthMode::Allowlist(root) => Authorizer::Allowlist(MerkleAllowlist::new(*root)),
            AuthMode::Voucher(signer) => {
                Authorizer::Voucher(VoucherAuthority::new(signer, config.signing_domain())?)
            }
        };
        info!(
            name = %config.name,
            symbol = %config.symbol,
            max_supply = config.max_supply,
            max_purchase = config.max_purchase,
            owner = %config.owner,
            "drop created"
        );
        Ok(Self {
            ownership: Ownership::new(config.owner),
            phase: PhaseController::default(),
            authorizer,
            supply: SupplyLedger::new(config.max_supply, config.max_purchase, config.price),
            reveal: RevealRegistry::new(config.provenance, config.placeholder_uri.clone()),
            nonces: CallerNonces::default(),
            owners: Vec::new(),
            balances: BTreeMap::new(),
            proceeds: 0,
            config,
        })
    }

    // ——— Claim ———————————————————————————————————————————————————————

    /// Buy `quantity` tokens for `caller`, paying exactly `payment`.
    ///
    /// Returns the half-open range of ids assigned to the caller.
    pub fn claim(
        &mut self,
        caller: WalletId,
        quantity: u64,
        authorization: &Authorization,
        payment: Amount,
    ) -> Result<IdRange, DropError> {
        let path = self.phase.required_auth(&self.auth_mode());
        debug!(caller = %caller, quantity, ?path, "claim");
        let voucher_used = match path {
            AuthPath::Closed => return Err(DropError::SaleNotOpen),
            AuthPath::Open => false,
            AuthPath::Allowlist | AuthPath::Voucher => self.authorize(&caller, authorization)?,
        };
        self.supply.check(quantity, payment)?;
        let proceeds = self
            .proceeds
            .checked_add(payment)
            .ok_or(DropError::ProceedsOverflow)?;
        let ids = self.supply.reserve(quantity, payment)?;

        // Nothing below can fail.
        self.owners.extend(ids.clone().map(|_| caller));
        *self.balances.entry(caller).or_insert(0) += quantity;
        self.proceeds = proceeds;
        if voucher_used {
            self.nonces.bump(caller);
        }
        info!(
            caller = %caller,
            quantity,
            first_id = ids.start,
            minted = self.supply.minted_count(),
            "claimed"
        );
        Ok(ids)
    }

    /// Returns whether the voucher path was used.
    fn authorize(&self, caller: &WalletId, authorization: &Authorization) -> Result<bool, DropError> {
        match &self.authorizer {
            Authorizer::Allowlist(list) => {
                let proof: &[Hash256] = match authorization {
                    Authorization::Allowlist { proof } => proof,
                    _ => &[],
                };
                if list.verify(caller, proof) {
                    Ok(false)
                } else {
                    warn!(caller = %caller, "allowlist proof rejected");
                    Err(DropError::NotAllowlisted)
                }
            }
            Authorizer::Voucher(authority) => {
                let Authorization::Voucher(voucher) = authorization else {
                    warn!(caller = %caller, "pre-sale claim without voucher");
                    return Err(DropError::InvalidOrUnauthorizedVoucher);
                };
                authority
                    .verify(voucher, caller, self.nonces.get(caller))
                    .inspect_err(|e| warn!(caller = %caller, error = %e, "voucher rejected"))?;
                Ok(true)
            }
        }
    }

    // ——— Owner surface ————————————————————————————————————————————————

    fn ensure_owner(&self, caller: &WalletId, op: &'static str) -> Result<(), DropError> {
        self.ownership
            .ensure(caller)
            .inspect_err(|_| warn!(caller = %caller, op, "owner-only operation rejected"))
    }

    pub fn change_phase(&mut self, caller: &WalletId, phase: Phase) -> Result<(), DropError> {
        self.ensure_owner(caller, "change_phase")?;
        let prev = self.phase.set(phase);
        info!(from = %prev, to = %phase, "phase changed");
        Ok(())
    }

    /// Publish the base location of the real metadata. Write-once.
    pub fn reveal(&mut self, caller: &WalletId, base: impl Into<String>) -> Result<(), DropError> {
        self.ensure_owner(caller, "reveal")?;
        let base = base.into();
        info!(base = %base, "revealing collection");
        self.reveal.reveal(base)
    }

    pub fn set_allowlist_root(&mut self, caller: &WalletId, root: Hash256) -> Result<(), DropError> {
        self.ensure_owner(caller, "set_allowlist_root")?;
        match &mut self.authorizer {
            Authorizer::Allowlist(list) => {
                list.set_root(root);
                self.config.auth_mode = AuthMode::Allowlist(root);
                info!(root = %hex::encode(root), "allowlist root rotated");
                Ok(())
            }
            Authorizer::Voucher(_) => Err(DropError::AllowlistNotConfigured),
        }
    }

    /// Take all collected proceeds.
    pub fn withdraw(&mut self, caller: &WalletId) -> Result<Amount, DropError> {
        self.ensure_owner(caller, "withdraw")?;
        let amount = core::mem::take(&mut self.proceeds);
        info!(amount = %amount, "proceeds withdrawn");
        Ok(amount)
    }

    // ——— Tokens ——————————————————————————————————————————————————————

    pub fn transfer(&mut self, caller: &WalletId, to: WalletId, id: TokenId) -> Result<(), DropError> {
        let holder = self.owner_of(id)?;
        if holder != *caller {
            return Err(DropError::NotTokenOwner(id));
        }
        let slot = usize::try_from(id).map_err(|_| DropError::NonexistentToken(id))?;
        self.owners[slot] = to;
        if let Some(b) = self.balances.get_mut(caller) {
            *b -= 1;
        }
        *self.balances.entry(to).or_insert(0) += 1;
        debug!(from = %caller, to = %to, id, "transfer");
        Ok(())
    }

    pub fn owner_of(&self, id: TokenId) -> Result<WalletId, DropError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.owners.get(i))
            .copied()
            .ok_or(DropError::NonexistentToken(id))
    }

    #[must_use]
    pub fn balance_of(&self, wallet: &WalletId) -> u64 {
        self.balances.get(wallet).copied().unwrap_or(0)
    }

    /// Metadata reference for a minted token: the shared placeholder before
    /// reveal, `base + id` after.
    pub fn token_uri(&self, id: TokenId) -> Result<String, DropError> {
        if id >= self.supply.minted_count() {
            return Err(DropError::NonexistentToken(id));
        }
        Ok(self.reveal.resolve_uri(id))
    }

    // ——— Reads ———————————————————————————————————————————————————————

    #[must_use]
    pub const fn config(&self) -> &DropConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    #[must_use]
    pub fn contract_uri(&self) -> &str {
        &self.config.contract_uri
    }

    #[must_use]
    pub const fn owner(&self) -> WalletId {
        self.ownership.owner()
    }

    #[must_use]
    pub const fn current_phase(&self) -> Phase {
        self.phase.current()
    }

    #[must_use]
    pub const fn minted_count(&self) -> u64 {
        self.supply.minted_count()
    }

    #[must_use]
    pub const fn max_supply(&self) -> u64 {
        self.supply.max_supply()
    }

    #[must_use]
    pub const fn max_purchase(&self) -> u64 {
        self.supply.max_purchase()
    }

    #[must_use]
    pub const fn price(&self) -> Amount {
        self.supply.price()
    }

    #[must_use]
    pub const fn provenance(&self) -> &Hash256 {
        self.reveal.provenance()
    }

    #[must_use]
    pub fn base_uri(&self) -> Option<&str> {
        self.reveal.base()
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.reveal.is_revealed()
    }

    /// Active authorization mode, with the current allowlist root.
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.config.auth_mode
    }

    /// Nonce an issuer must sign into the next voucher for `wallet`.
    #[must_use]
    pub fn caller_nonce(&self, wallet: &WalletId) -> u64 {
        self.nonces.get(wallet)
    }

    #[must_use]
    pub fn engine_id(&self) -> Hash256 {
        self.config.engine_id()
    }

    #[must_use]
    pub fn signing_domain(&self) -> SigningDomain {
        self.config.signing_domain()
    }

    #[must_use]
    pub const fn proceeds(&self) -> Amount {
        self.proceeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::AllowlistTree;
    use crate::types::Voucher;
    use crate::voucher::VoucherIssuer;
    use ed25519_dalek::SigningKey;

    const PRICE: Amount = 80_000_000_000_000_000;
    const OWNER: WalletId = WalletId([0xAA; 32]);
    const ALICE: WalletId = WalletId([1; 32]);
    const BOB: WalletId = WalletId([2; 32]);
    const CHARLIE: WalletId = WalletId([3; 32]);
    const OTHER: WalletId = WalletId([9; 32]);

    fn allowlist() -> AllowlistTree {
        AllowlistTree::from_wallets(&[ALICE, BOB, CHARLIE])
    }

    fn allowlist_engine() -> DropEngine {
        let cfg = DropConfig::new(
            "TestDrop",
            "TSD",
            20,
            5,
            PRICE,
            OWNER,
            "ipfs://placeholder",
            [0x11; 32],
            AuthMode::Allowlist(allowlist().root()),
        )
        .with_contract_uri("0123");
        DropEngine::new(cfg).unwrap()
    }

    fn voucher_engine() -> (DropEngine, VoucherIssuer) {
        let key = SigningKey::from_bytes(&[77; 32]);
        let signer = key.verifying_key().to_bytes();
        let cfg = DropConfig::new(
            "TestDrop",
            "TSD",
            20,
            5,
            PRICE,
            OWNER,
            "ipfs://placeholder",
            [0x11; 32],
            AuthMode::Voucher(signer),
        )
        .with_network_id(31337);
        let engine = DropEngine::new(cfg).unwrap();
        let issuer = VoucherIssuer::new(key, engine.signing_domain());
        (engine, issuer)
    }

    fn proof_for(w: &WalletId) -> Authorization {
        Authorization::Allowlist {
            proof: allowlist().proof(w).unwrap_or_default(),
        }
    }

    #[test]
    fn reads_reflect_config() {
        let e = allowlist_engine();
        assert_eq!(e.name(), "TestDrop");
        assert_eq!(e.symbol(), "TSD");
        assert_eq!(e.contract_uri(), "0123");
        assert_eq!(e.owner(), OWNER);
        assert_eq!(e.max_supply(), 20);
        assert_eq!(e.max_purchase(), 5);
        assert_eq!(e.price(), PRICE);
        assert_eq!(e.current_phase(), Phase::NotStarted);
        assert_eq!(e.minted_count(), 0);
        assert_eq!(e.provenance(), &[0x11; 32]);
        assert_eq!(e.base_uri(), None);
    }

    #[test]
    fn not_started_rejects_everyone() {
        let mut e = allowlist_engine();
        assert_eq!(e.claim(OTHER, 1, &Authorization::None, PRICE), Err(DropError::SaleNotOpen));
        assert_eq!(e.claim(ALICE, 1, &proof_for(&ALICE), PRICE), Err(DropError::SaleNotOpen));
    }

    #[test]
    fn presale_allowlist() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        assert_eq!(e.claim(OTHER, 1, &proof_for(&OTHER), PRICE), Err(DropError::NotAllowlisted));
        assert_eq!(e.claim(OTHER, 1, &proof_for(&ALICE), PRICE), Err(DropError::NotAllowlisted));
        assert_eq!(e.claim(ALICE, 1, &Authorization::None, PRICE), Err(DropError::NotAllowlisted));
        assert_eq!(e.claim(ALICE, 2, &proof_for(&ALICE), 2 * PRICE), Ok(0..2));
        assert_eq!(e.balance_of(&ALICE), 2);
        assert_eq!(e.owner_of(1), Ok(ALICE));
    }

    #[test]
    fn public_sale_open_to_all() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        assert_eq!(e.claim(ALICE, 2, &Authorization::None, 2 * PRICE), Ok(0..2));
        assert_eq!(e.claim(BOB, 2, &Authorization::None, 2 * PRICE), Ok(2..4));
        assert_eq!(e.balance_of(&ALICE), 2);
        assert_eq!(e.balance_of(&BOB), 2);
    }

    #[test]
    fn owner_ops_reject_strangers() {
        let mut e = allowlist_engine();
        assert_eq!(e.change_phase(&ALICE, Phase::PublicSale), Err(DropError::Unauthorized));
        assert_eq!(e.reveal(&ALICE, "x/"), Err(DropError::Unauthorized));
        assert_eq!(e.set_allowlist_root(&ALICE, [0; 32]), Err(DropError::Unauthorized));
        assert_eq!(e.withdraw(&ALICE), Err(DropError::Unauthorized));
        assert_eq!(e.current_phase(), Phase::NotStarted);
        assert!(!e.is_revealed());
    }

    #[test]
    fn voucher_presale_single_use() {
        let (mut e, issuer) = voucher_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        let v = issuer.issue(ALICE, "", e.caller_nonce(&ALICE));
        let auth = Authorization::Voucher(v);
        assert_eq!(e.claim(ALICE, 1, &auth, PRICE), Ok(0..1));
        assert_eq!(e.caller_nonce(&ALICE), 1);
        assert_eq!(
            e.claim(ALICE, 1, &auth, PRICE),
            Err(DropError::InvalidOrUnauthorizedVoucher)
        );
    }

    #[test]
    fn voucher_for_other_wallet_is_invalid_wallet() {
        let (mut e, issuer) = voucher_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        let v = issuer.issue(ALICE, "", 0);
        assert_eq!(
            e.claim(BOB, 1, &Authorization::Voucher(v), PRICE),
            Err(DropError::InvalidWallet)
        );
    }

    #[test]
    fn failed_voucher_claim_keeps_nonce_and_voucher_valid() {
        let (mut e, issuer) = voucher_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        let auth = Authorization::Voucher(issuer.issue(ALICE, "", 0));
        assert_eq!(e.claim(ALICE, 1, &auth, PRICE - 1), Err(DropError::IncorrectPayment));
        assert_eq!(e.caller_nonce(&ALICE), 0);
        assert_eq!(e.claim(ALICE, 1, &auth, PRICE), Ok(0..1));
    }

    #[test]
    fn public_sale_ignores_empty_voucher() {
        let (mut e, _issuer) = voucher_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        let empty = Authorization::Voucher(Voucher {
            wallet: WalletId::default(),
            data: String::new(),
            signature: [0; 64],
        });
        assert_eq!(e.claim(BOB, 2, &empty, 2 * PRICE), Ok(0..2));
        assert_eq!(e.caller_nonce(&BOB), 0);
    }

    #[test]
    fn presale_voucher_mode_needs_voucher() {
        let (mut e, _issuer) = voucher_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        assert_eq!(
            e.claim(ALICE, 1, &Authorization::None, PRICE),
            Err(DropError::InvalidOrUnauthorizedVoucher)
        );
        assert_eq!(
            e.set_allowlist_root(&OWNER, [1; 32]),
            Err(DropError::AllowlistNotConfigured)
        );
    }

    #[test]
    fn sells_out_at_max_supply() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        for i in 0..4u64 {
            assert_eq!(e.claim(OTHER, 5, &Authorization::None, 5 * PRICE), Ok(i * 5..i * 5 + 5));
        }
        assert_eq!(e.minted_count(), 20);
        assert_eq!(
            e.claim(ALICE, 1, &Authorization::None, PRICE),
            Err(DropError::InsufficientSupply)
        );
        assert_eq!(e.minted_count(), 20);
        assert_eq!(e.proceeds(), 20 * PRICE);
    }

    #[test]
    fn placeholder_then_reveal() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        e.claim(OWNER, 2, &Authorization::None, 2 * PRICE).unwrap();
        assert_eq!(e.token_uri(0).unwrap(), "ipfs://placeholder");
        assert_eq!(e.token_uri(1).unwrap(), "ipfs://placeholder");
        assert_eq!(e.token_uri(2), Err(DropError::NonexistentToken(2)));

        e.reveal(&OWNER, "ipfs://base/").unwrap();
        assert_eq!(e.token_uri(0).unwrap(), "ipfs://base/0");
        assert_eq!(e.token_uri(1).unwrap(), "ipfs://base/1");
        assert_eq!(e.reveal(&OWNER, "ipfs://other/"), Err(DropError::AlreadyRevealed));
        assert_eq!(e.base_uri(), Some("ipfs://base/"));
    }

    #[test]
    fn rotating_root_changes_who_may_claim() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PreSale).unwrap();
        let next = AllowlistTree::from_wallets(&[OTHER]);
        e.set_allowlist_root(&OWNER, next.root()).unwrap();
        assert_eq!(e.auth_mode(), AuthMode::Allowlist(next.root()));
        assert_eq!(e.config().auth_mode, e.auth_mode());
        assert_eq!(e.claim(ALICE, 1, &proof_for(&ALICE), PRICE), Err(DropError::NotAllowlisted));
        let auth = Authorization::Allowlist {
            proof: next.proof(&OTHER).unwrap(),
        };
        assert_eq!(e.claim(OTHER, 1, &auth, PRICE), Ok(0..1));
    }

    #[test]
    fn overflowing_proceeds_reject_claim() {
        let cfg = DropConfig::new(
            "Whale",
            "WHL",
            10,
            1,
            Amount::MAX,
            OWNER,
            "ipfs://placeholder",
            [0x11; 32],
            AuthMode::Allowlist([0; 32]),
        );
        let mut e = DropEngine::new(cfg).unwrap();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        assert_eq!(e.claim(ALICE, 1, &Authorization::None, Amount::MAX), Ok(0..1));
        assert_eq!(
            e.claim(BOB, 1, &Authorization::None, Amount::MAX),
            Err(DropError::ProceedsOverflow)
        );
        assert_eq!(e.minted_count(), 1);
        assert_eq!(e.balance_of(&BOB), 0);
        assert_eq!(e.proceeds(), Amount::MAX);

        assert_eq!(e.withdraw(&OWNER), Ok(Amount::MAX));
        assert_eq!(e.claim(BOB, 1, &Authorization::None, Amount::MAX), Ok(1..2));
    }

    #[test]
    fn transfer_moves_ownership() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        e.claim(ALICE, 2, &Authorization::None, 2 * PRICE).unwrap();
        assert_eq!(e.transfer(&BOB, CHARLIE, 0), Err(DropError::NotTokenOwner(0)));
        assert_eq!(e.transfer(&ALICE, BOB, 5), Err(DropError::NonexistentToken(5)));
        e.transfer(&ALICE, BOB, 0).unwrap();
        assert_eq!(e.owner_of(0), Ok(BOB));
        assert_eq!(e.balance_of(&ALICE), 1);
        assert_eq!(e.balance_of(&BOB), 1);
    }

    #[test]
    fn withdraw_drains_proceeds() {
        let mut e = allowlist_engine();
        e.change_phase(&OWNER, Phase::PublicSale).unwrap();
        e.claim(ALICE, 3, &Authorization::None, 3 * PRICE).unwrap();
        assert_eq!(e.withdraw(&OWNER), Ok(3 * PRICE));
        assert_eq!(e.proceeds(), 0);
        assert_eq!(e.withdraw(&OWNER), Ok(0));
    }
}
