use crate::types::BalanceSnapshot;

/// Account balances settled by cashout results.
///
/// The backend is the authority here: `apply_cashout` overwrites
/// without validating against prior state.
#[derive(Debug, Default)]
pub struct WalletState {
    wallet_balance: f64,
    wagered_amount: f64,
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both balances with the settled values.
    pub fn apply_cashout(&mut self, balance: f64, wagered_amount: f64) {
        self.wallet_balance = balance;
        self.wagered_amount = wagered_amount;
    }

    /// Read-only view for display.
    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            wallet_balance: self.wallet_balance,
            wagered_amount: self.wagered_amount,
        }
    }
}
