//! Read-only balance snapshot used for eligibility checks.

use crate::amount::{TokenAmount, TokenKind};
use serde::{Deserialize, Serialize};

/// A voter's balances of both token kinds at the moment they were fetched.
///
/// Treated as ground truth for the call that fetched it; never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub night: TokenAmount,
    pub dust: TokenAmount,
}

impl Balances {
    pub fn new(night: u128, dust: u128) -> Self {
        Self {
            night: TokenAmount::new(night),
            dust: TokenAmount::new(dust),
        }
    }

    /// Balance of a single token kind.
    pub fn get(&self, kind: TokenKind) -> TokenAmount {
        match kind {
            TokenKind::Night => self.night,
            TokenKind::Dust => self.dust,
        }
    }

    /// Copy of this snapshot with one kind replaced.
    pub fn with(mut self, kind: TokenKind, amount: TokenAmount) -> Self {
        match kind {
            TokenKind::Night => self.night = amount,
            TokenKind::Dust => self.dust = amount,
        }
        self
    }
}
