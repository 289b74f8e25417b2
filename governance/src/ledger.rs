//! Token balances and wallet sessions, as seen by the engine.
//!
//! Both are read-only views onto systems the engine does not own. Balances
//! are treated as ground truth at call time and never cached.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use umbra_types::{Balances, TokenAmount, TokenKind, VoterId};

/// Read-only view of voter balances across both token kinds.
#[async_trait::async_trait]
pub trait TokenLedgerView: Send + Sync {
    /// Current balances of `voter`.
    async fn balances(&self, voter: &VoterId) -> Result<Balances, LedgerError>;

    /// Total circulating supply of `kind`, used to size token-holder electorates.
    async fn circulating_supply(&self, kind: TokenKind) -> Result<TokenAmount, LedgerError>;
}

/// A connected wallet: who the user is and what they hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub identity: VoterId,
    pub balances: Balances,
}

/// The wallet/session layer the presentation side talks to.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect a wallet of the given kind (e.g. "lace").
    async fn connect(&self, kind: &str) -> Result<WalletSession, LedgerError>;

    /// The identity of the connected wallet, if any.
    fn current_identity(&self) -> Option<VoterId>;
}
