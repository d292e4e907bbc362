//! Signed token transfers executed by `BuyCredit.buyCredit`.
//!
//! The message salt is the sender's `getBuyCreditNonces` counter, a nonce
//! domain separate from both the token permit nonce and the relay nonce.

use alloy::primitives::{Address, U256};

use crate::blockchain::contracts::buy_credit_calldata;
use crate::flows::{FlowOutcome, FlowResult, Session};
use crate::typed_data::{
    serialize_signature, BuyCredit, DomainDescriptor, SignatureParts, TypedPayload,
};

pub fn buy_credit_payload(
    domain: DomainDescriptor,
    from: Address,
    to: Address,
    amount: U256,
    deadline: U256,
    salt: U256,
) -> TypedPayload<BuyCredit> {
    TypedPayload::new(
        domain,
        BuyCredit {
            from,
            to,
            amount,
            deadline,
            salt,
        },
    )
}

/// Read the sender's salt counter and build the transfer message.
pub async fn build_buy_credit(
    session: &Session,
    from: Address,
    to: Address,
    amount: U256,
) -> FlowResult<TypedPayload<BuyCredit>> {
    let relay = session.buy_credit_address()?;
    let salt = session.client().buy_credit_nonce(relay, from).await?;

    tracing::debug!(from = %from, salt = %salt, "Read BuyCredit salt");

    Ok(buy_credit_payload(
        session.buy_credit_domain()?,
        from,
        to,
        amount,
        session.deadline(),
        salt,
    ))
}

/// Sign a transfer of `amount` from the signer to `to` and submit `buyCredit`.
pub async fn buy_credit(session: &Session, to: Address, amount: U256) -> FlowResult<FlowOutcome> {
    let wallet = session.wallet()?;
    let payload = build_buy_credit(session, wallet.address(), to, amount).await?;

    let signature = serialize_signature(&wallet.sign_typed(&payload).await?);
    let parts = SignatureParts::decompose(&signature)?;

    let message = payload.message();
    let calldata = buy_credit_calldata(message.from, message.to, message.amount, message.deadline, &parts);

    tracing::info!(
        from = %message.from,
        to = %message.to,
        amount = %message.amount,
        salt = %message.salt,
        "BuyCredit transfer signed"
    );

    session
        .dispatch(
            Some(session.buy_credit_address()?),
            calldata,
            false,
            vec![payload.to_json()],
        )
        .await
}
