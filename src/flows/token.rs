//! Token administration and state reads.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use std::fmt;

use crate::blockchain::contracts::mint_calldata;
use crate::flows::{FlowOutcome, FlowResult, Session};

/// Mint `amount` base units to `to`. The signer must hold the minter role.
pub async fn mint(session: &Session, to: Address, amount: U256) -> FlowResult<FlowOutcome> {
    tracing::info!(to = %to, amount = %amount, "Minting");
    session
        .dispatch(
            Some(session.token_address()?),
            mint_calldata(to, amount),
            false,
            Vec::new(),
        )
        .await
}

/// Every counter that gates a signed message or transaction for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceReport {
    pub account: Address,
    /// `SugarBounceToken.nonces`, consumed by `permit`.
    pub token_nonce: U256,
    /// `BuyCredit.getNonce`, consumed by `executeMetaTransaction`.
    pub relay_nonce: U256,
    /// `BuyCredit.getBuyCreditNonces`, consumed by `buyCredit`.
    pub buy_credit_nonce: U256,
    /// Sender nonce for raw transactions.
    pub transaction_count: u64,
    /// Base units.
    pub balance: U256,
    /// On-chain `decimals()`, used to render `balance`.
    pub decimals: u8,
    /// Amount the relay contract may pull from the account.
    pub allowance: U256,
}

impl fmt::Display for NonceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account:            {}", self.account)?;
        writeln!(f, "Token permit nonce: {}", self.token_nonce)?;
        writeln!(f, "Relay nonce:        {}", self.relay_nonce)?;
        writeln!(f, "BuyCredit salt:     {}", self.buy_credit_nonce)?;
        writeln!(f, "Transaction count:  {}", self.transaction_count)?;
        match format_units(self.balance, self.decimals) {
            Ok(tokens) => writeln!(f, "Token balance:      {} ({} base units)", tokens, self.balance)?,
            Err(_) => writeln!(f, "Token balance:      {} base units", self.balance)?,
        }
        write!(f, "Relay allowance:    {}", self.allowance)
    }
}

/// Read the three nonce domains plus balance and allowance.
pub async fn nonces(session: &Session, account: Option<Address>) -> FlowResult<NonceReport> {
    let account = session.account_or_signer(account)?;
    let token = session.token_address()?;
    let relay = session.buy_credit_address()?;
    let client = session.client();

    Ok(NonceReport {
        account,
        token_nonce: client.token_nonce(token, account).await?,
        relay_nonce: client.relay_nonce(relay, account).await?,
        buy_credit_nonce: client.buy_credit_nonce(relay, account).await?,
        transaction_count: client.get_transaction_count(account).await?,
        balance: client.balance_of(token, account).await?,
        decimals: client.decimals(token).await?,
        allowance: client.allowance(token, account, relay).await?,
    })
}
