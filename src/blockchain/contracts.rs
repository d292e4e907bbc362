//! ABI bindings for the deployed token and relay contracts, plus calldata
//! encoders for the signed calls.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::typed_data::SignatureParts;

sol! {
    /// SugarBounceToken: ERC-20 with permit.
    #[sol(rpc)]
    interface ISugarBounceToken {
        function mint(address to, uint256 amount) external;
        function nonces(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    /// BuyCredit: permit forwarding, meta-transactions and signed transfers.
    #[sol(rpc)]
    interface IBuyCredit {
        function permitSBToken(address owner, uint256 amount, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
        function executeMetaTransaction(address userAddress, bytes calldata functionSignature, bytes32 sigR, bytes32 sigS, uint8 sigV) external payable returns (bytes memory);
        function getNonce(address user) external view returns (uint256);
        function buyCredit(address from, address to, uint256 amount, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
        function getBuyCreditNonces(address user) external view returns (uint256);
    }
}

pub fn mint_calldata(to: Address, amount: U256) -> Bytes {
    ISugarBounceToken::mintCall { to, amount }.abi_encode().into()
}

pub fn permit_sb_token_calldata(
    owner: Address,
    amount: U256,
    deadline: U256,
    sig: &SignatureParts,
) -> Bytes {
    IBuyCredit::permitSBTokenCall {
        owner,
        amount,
        deadline,
        v: sig.v,
        r: sig.r,
        s: sig.s,
    }
    .abi_encode()
    .into()
}

/// `executeMetaTransaction(user, functionSignature, r, s, v)`. Note the
/// relay takes `v` last.
pub fn execute_meta_transaction_calldata(
    user: Address,
    function_signature: Bytes,
    sig: &SignatureParts,
) -> Bytes {
    IBuyCredit::executeMetaTransactionCall {
        userAddress: user,
        functionSignature: function_signature,
        sigR: sig.r,
        sigS: sig.s,
        sigV: sig.v,
    }
    .abi_encode()
    .into()
}

pub fn buy_credit_calldata(
    from: Address,
    to: Address,
    amount: U256,
    deadline: U256,
    sig: &SignatureParts,
) -> Bytes {
    IBuyCredit::buyCreditCall {
        from,
        to,
        amount,
        deadline,
        v: sig.v,
        r: sig.r,
        s: sig.s,
    }
    .abi_encode()
    .into()
}
