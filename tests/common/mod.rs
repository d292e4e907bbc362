//! Shared utilities for integration testing: a programmable mock JSON-RPC node.

use alloy::primitives::{keccak256, Address, B256, U256};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use buycredit_relay::config::AppConfig;

/// Anvil/Hardhat account #1 ("bob" in the sample scripts).
#[allow(dead_code)]
pub const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// Handler result: `Ok(result)` or `Err(error object)`.
pub type RpcReply = Result<Value, Value>;

/// A running mock node.
pub struct MockNode {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Methods received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|m| m.as_str() == method).count()
    }
}

/// Start a mock node on an ephemeral port; `handler(method, params)` answers each call.
pub async fn start_mock_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> RpcReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, handler, recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode { addr, calls }
}

async fn serve<F>(
    mut socket: TcpStream,
    handler: Arc<F>,
    recorded: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> RpcReply + Send + Sync + 'static,
{
    let body = read_request_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let method = request["method"].as_str().unwrap_or_default().to_string();
    recorded.lock().unwrap().push(method.clone());

    let response = match handler(&method, &request["params"]) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": request["id"], "error": error}),
    };
    let payload = response.to_string();

    let response_str = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    socket.write_all(response_str.as_bytes()).await?;
    socket.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}

async fn read_request_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf[header_end..].to_vec())
}

/// `0x`-prefixed quantity.
pub fn quantity(value: u64) -> Value {
    json!(format!("0x{:x}", value))
}

/// ABI-encoded `uint256` return data.
#[allow(dead_code)]
pub fn uint_word(value: u64) -> Value {
    json!(B256::from(U256::from(value)).to_string())
}

/// Hash of the raw transaction in `eth_sendRawTransaction` params.
#[allow(dead_code)]
pub fn raw_tx_hash(params: &Value) -> B256 {
    let raw = params[0].as_str().unwrap_or_default();
    let bytes = alloy::hex::decode(raw.trim_start_matches("0x")).unwrap_or_default();
    keccak256(bytes)
}

/// Minimal successful legacy receipt.
#[allow(dead_code)]
pub fn receipt(tx_hash: B256, block: u64, contract_address: Option<Address>) -> Value {
    json!({
        "type": "0x0",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": tx_hash.to_string(),
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11).to_string(),
        "blockNumber": quantity(block),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": Address::repeat_byte(0x01).to_string(),
        "to": contract_address.map_or(Value::from(Address::repeat_byte(0x02).to_string()), |_| Value::Null),
        "contractAddress": contract_address.map(|a| a.to_string()),
    })
}

/// Answers for the reads every flow performs: chain id 97, zero nonces, 1 gwei.
#[allow(dead_code)]
pub fn default_reply(method: &str) -> Option<RpcReply> {
    match method {
        "eth_chainId" => Some(Ok(quantity(97))),
        "eth_blockNumber" => Some(Ok(quantity(16))),
        "eth_getTransactionCount" => Some(Ok(quantity(0))),
        "eth_gasPrice" => Some(Ok(quantity(1_000_000_000))),
        "eth_call" => Some(Ok(uint_word(0))),
        _ => None,
    }
}

/// Config pointed at `node` with bob as signer and fast polling.
#[allow(dead_code)]
pub fn test_config(node: &MockNode) -> AppConfig {
    let mut config = AppConfig::default();
    config.network.rpc_url = node.url();
    config.network.chain_id = 97;
    config.network.rpc_timeout_secs = 5;
    config.signer.private_key = Some(BOB_KEY.to_string());
    config.submission.confirmation_timeout_secs = 1;
    config.submission.poll_interval_ms = 50;
    config
}
