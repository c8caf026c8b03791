use crate::errors::DropError;
use crate::types::{Amount, IdRange};

/// Minted count, per-claim and total caps, exact-payment rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyLedger {
    max_supply: u64,
    max_purchase: u64,
    price: Amount,
    minted: u64,
}

impl SupplyLedger {
    #[must_use]
    pub const fn new(max_supply: u64, max_purchase: u64, price: Amount) -> Self {
        Self {
            max_supply,
            max_purchase,
            price,
            minted: 0,
        }
    }

    /// Validate a purchase without reserving. Checks run in a fixed order and
    /// the first failure is reported.
    pub fn check(&self, quantity: u64, payment: Amount) -> Result<(), DropError> {
        if quantity == 0 || quantity > self.max_purchase {
            return Err(DropError::QuantityExceedsLimit);
        }
        if quantity > self.remaining() {
            return Err(DropError::InsufficientSupply);
        }
        // An overflowing total can never be paid exactly.
        match self.price.checked_mul(Amount::from(quantity)) {
            Some(total) if total == payment => Ok(()),
            _ => Err(DropError::IncorrectPayment),
        }
    }

    /// Validate and, on success, assign the next `quantity` ids.
    pub fn reserve(&mut self, quantity: u64, payment: Amount) -> Result<IdRange, DropError> {
        self.check(quantity, payment)?;
        let first = self.minted;
        self.minted += quantity;
        Ok(first..self.minted)
    }

    #[must_use]
    pub const fn minted_count(&self) -> u64 {
        self.minted
    }

    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.max_supply - self.minted
    }

    #[must_use]
    pub const fn max_supply(&self) -> u64 {
        self.max_supply
    }

    #[must_use]
    pub const fn max_purchase(&self) -> u64 {
        self.max_purchase
    }

    #[must_use]
    pub const fn price(&self) -> Amount {
        self.price
    }
}
