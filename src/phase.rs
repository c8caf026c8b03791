use crate::types::{AuthMode, Phase};

/// Authorization a claim must satisfy in the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPath {
    Closed,
    Allowlist,
    Voucher,
    Open,
}

/// Current sale phase. Transitions are unrestricted so the owner can pause
/// or rewind a sale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseController {
    phase: Phase,
}

impl PhaseController {
    #[must_use]
    pub const fn current(&self) -> Phase {
        self.phase
    }

    /// Returns the previous phase.
    pub fn set(&mut self, phase: Phase) -> Phase {
        core::mem::replace(&mut self.phase, phase)
    }

    #[must_use]
    pub fn required_auth(&self, mode: &AuthMode) -> AuthPath {
        match (self.phase, mode) {
            (Phase::NotStarted, _) => AuthPath::Closed,
            (Phase::PreSale, AuthMode::Allowlist(_)) => AuthPath::Allowlist,
            (Phase::PreSale, AuthMode::Voucher(_)) => AuthPath::Voucher,
            (Phase::PublicSale, _) => AuthPath::Open,
        }
    }
}
