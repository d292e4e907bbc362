//! Gasless permit: the signed `permitSBToken` call wrapped in a
//! `MetaTransaction` and executed by the BuyCredit contract.

use alloy::primitives::{Address, Bytes, U256};

use crate::blockchain::contracts::execute_meta_transaction_calldata;
use crate::flows::permit::sign_permit;
use crate::flows::{FlowOutcome, FlowResult, Session};
use crate::typed_data::{
    serialize_signature, DomainDescriptor, MetaTransaction, SignatureParts, TypedPayload,
};

/// MetaTransaction payload against the salted BuyCredit domain.
pub fn meta_transaction_payload(
    domain: DomainDescriptor,
    nonce: U256,
    from: Address,
    function_signature: Bytes,
) -> TypedPayload<MetaTransaction> {
    TypedPayload::new(
        domain,
        MetaTransaction {
            nonce,
            from,
            functionSignature: function_signature,
        },
    )
}

/// Sign `call` as a meta-transaction and return `executeMetaTransaction` calldata.
pub async fn wrap_meta_transaction(
    session: &Session,
    call: Bytes,
) -> FlowResult<(TypedPayload<MetaTransaction>, Bytes)> {
    let wallet = session.wallet()?;
    let relay = session.buy_credit_address()?;
    let nonce = session.client().relay_nonce(relay, wallet.address()).await?;

    tracing::debug!(user = %wallet.address(), nonce = %nonce, "Read relay nonce");

    let payload =
        meta_transaction_payload(session.buy_credit_domain()?, nonce, wallet.address(), call);
    let signature = serialize_signature(&wallet.sign_typed(&payload).await?);
    let parts = SignatureParts::decompose(&signature)?;

    let calldata = execute_meta_transaction_calldata(
        wallet.address(),
        payload.message().functionSignature.clone(),
        &parts,
    );

    tracing::info!(user = %wallet.address(), nonce = %nonce, "Meta-transaction signed");
    Ok((payload, calldata))
}

/// Sign a permit, wrap it, and submit through the relay when one is configured.
pub async fn relay_permit(session: &Session, value: U256) -> FlowResult<FlowOutcome> {
    let permit = sign_permit(session, value).await?;
    let (meta, calldata) = wrap_meta_transaction(session, permit.calldata()).await?;

    session
        .dispatch(
            Some(session.buy_credit_address()?),
            calldata,
            true,
            vec![permit.payload.to_json(), meta.to_json()],
        )
        .await
}
