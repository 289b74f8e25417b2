//! Nullable token ledger and wallet.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use umbra_governance::{LedgerError, TokenLedgerView, WalletProvider, WalletSession};
use umbra_types::{Balances, TokenAmount, TokenKind, VoterId};

/// In-memory balances and supplies.
///
/// Unknown accounts hold nothing. Circulating supply defaults to the sum of
/// all known balances unless set explicitly.
#[derive(Default)]
pub struct NullLedger {
    balances: RwLock<HashMap<VoterId, Balances>>,
    supplies: RwLock<HashMap<TokenKind, TokenAmount>>,
    connected: RwLock<Option<VoterId>>,
    unavailable: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style balance setup.
    pub fn with_balance(self, voter: &VoterId, night: u128, dust: u128) -> Self {
        self.set_balances(voter, Balances::new(night, dust));
        self
    }

    pub fn set_balances(&self, voter: &VoterId, balances: Balances) {
        self.balances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(voter.clone(), balances);
    }

    pub fn set_supply(&self, kind: TokenKind, amount: u128) {
        self.supplies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, TokenAmount::new(amount));
    }

    /// Make every subsequent call fail with `LedgerError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Forget the connected wallet.
    pub fn disconnect(&self) {
        *self.connected.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(LedgerError::Unavailable("null ledger switched off".into()))
        } else {
            Ok(())
        }
    }

    fn lookup(&self, voter: &VoterId) -> Balances {
        self.balances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(voter)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TokenLedgerView for NullLedger {
    async fn balances(&self, voter: &VoterId) -> Result<Balances, LedgerError> {
        self.check_available()?;
        Ok(self.lookup(voter))
    }

    async fn circulating_supply(&self, kind: TokenKind) -> Result<TokenAmount, LedgerError> {
        self.check_available()?;
        if let Some(supply) = self
            .supplies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
        {
            return Ok(*supply);
        }
        let total = self
            .balances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .fold(TokenAmount::ZERO, |acc, b| acc.saturating_add(b.get(kind)));
        Ok(total)
    }
}

#[async_trait::async_trait]
impl WalletProvider for NullLedger {
    /// `kind` names the identity to connect as. Any known or unknown voter id
    /// is accepted; an empty one is not.
    async fn connect(&self, kind: &str) -> Result<WalletSession, LedgerError> {
        self.check_available()?;
        let identity =
            VoterId::new(kind).map_err(|e| LedgerError::Other(format!("cannot connect: {e}")))?;
        let balances = self.lookup(&identity);
        *self.connected.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        Ok(WalletSession { identity, balances })
    }

    fn current_identity(&self) -> Option<VoterId> {
        self.connected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
