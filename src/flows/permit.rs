//! Off-chain token approval forwarded through `BuyCredit.permitSBToken`.

use alloy::primitives::{Address, Bytes, U256};
use serde_json::Value;

use crate::blockchain::contracts::permit_sb_token_calldata;
use crate::flows::{FlowOutcome, FlowResult, Session};
use crate::typed_data::{
    serialize_signature, DomainDescriptor, Permit, SignatureParts, TypedPayload,
};

/// Permit payload against the token domain.
pub fn permit_payload(
    domain: DomainDescriptor,
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> TypedPayload<Permit> {
    TypedPayload::new(
        domain,
        Permit {
            owner,
            spender,
            value,
            nonce,
            deadline,
        },
    )
}

/// A permit signed by its owner.
#[derive(Debug, Clone)]
pub struct SignedPermit {
    pub payload: TypedPayload<Permit>,
    /// `0x` + 130 hex characters.
    pub signature: String,
    pub parts: SignatureParts,
}

impl SignedPermit {
    /// `permitSBToken(owner, value, deadline, v, r, s)` calldata.
    pub fn calldata(&self) -> Bytes {
        let message = self.payload.message();
        permit_sb_token_calldata(message.owner, message.value, message.deadline, &self.parts)
    }
}

/// Build the permit the signer would sign for `value`, granting BuyCredit.
pub async fn build_permit(
    session: &Session,
    owner: Address,
    value: U256,
) -> FlowResult<TypedPayload<Permit>> {
    let token = session.token_address()?;
    let spender = session.buy_credit_address()?;
    let nonce = session.client().token_nonce(token, owner).await?;

    tracing::debug!(owner = %owner, nonce = %nonce, "Read token permit nonce");

    Ok(permit_payload(
        session.token_domain()?,
        owner,
        spender,
        value,
        nonce,
        session.deadline(),
    ))
}

/// Sign a fresh permit for `value` with the session signer.
pub async fn sign_permit(session: &Session, value: U256) -> FlowResult<SignedPermit> {
    let wallet = session.wallet()?;
    let payload = build_permit(session, wallet.address(), value).await?;

    let signature = serialize_signature(&wallet.sign_typed(&payload).await?);
    let parts = SignatureParts::decompose(&signature)?;

    tracing::info!(
        owner = %wallet.address(),
        spender = %payload.message().spender,
        value = %value,
        nonce = %payload.message().nonce,
        "Permit signed"
    );

    Ok(SignedPermit {
        payload,
        signature,
        parts,
    })
}

/// Sign a permit and submit `permitSBToken` directly from the signer.
pub async fn permit(session: &Session, value: U256) -> FlowResult<FlowOutcome> {
    let signed = sign_permit(session, value).await?;
    let payloads: Vec<Value> = vec![signed.payload.to_json()];

    session
        .dispatch(
            Some(session.buy_credit_address()?),
            signed.calldata(),
            false,
            payloads,
        )
        .await
}
