// JSON-RPC client for a ledger node
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{CallRequest, Provider};
use crate::account::Address;
use crate::encoding::{decode_hex_data, parse_quantity};
use crate::error::ProviderError;
use crate::transaction::{RawTransaction, TxHash};

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(method, id, "RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        extract_result(json)
    }
}

/// Split a JSON-RPC response into its result or error member.
fn extract_result(mut json: Value) -> Result<Value, ProviderError> {
    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        return Err(ProviderError::Rpc {
            code: error["code"].as_i64().unwrap_or(0),
            message: error["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }
    match json.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ProviderError::Decode("response has no result".into())),
    }
}

fn as_str(value: &Value) -> Result<&str, ProviderError> {
    value
        .as_str()
        .ok_or_else(|| ProviderError::Decode(format!("expected a string, got {}", value)))
}

fn as_u64(quantity: u128) -> Result<u64, ProviderError> {
    u64::try_from(quantity).map_err(|_| ProviderError::Decode("quantity overflows u64".into()))
}

#[async_trait]
impl Provider for RpcClient {
    async fn get_transaction_count(&self, address: &Address) -> Result<u64, ProviderError> {
        let res = self
            .send_request(
                "eth_getTransactionCount",
                json!([address.to_checksum(), "pending"]),
            )
            .await?;
        as_u64(parse_quantity(as_str(&res)?)?)
    }

    async fn get_gas_price(&self) -> Result<u128, ProviderError> {
        let res = self.send_request("eth_gasPrice", json!([])).await?;
        parse_quantity(as_str(&res)?)
    }

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<TxHash, ProviderError> {
        let res = self
            .send_request("eth_sendRawTransaction", json!([raw.to_hex()]))
            .await?;
        as_str(&res)?.parse()
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        let mut tx = json!({
            "to": request.to.to_checksum(),
            "data": format!("0x{}", hex::encode(&request.data)),
        });
        if let Some(from) = request.from {
            tx["from"] = json!(from.to_checksum());
        }
        let res = self.send_request("eth_call", json!([tx, "latest"])).await?;
        decode_hex_data(as_str(&res)?)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let res = self.send_request("eth_chainId", json!([])).await?;
        as_u64(parse_quantity(as_str(&res)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_extract_result() {
        let ok = json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"});
        assert_eq!(extract_result(ok).unwrap(), json!("0x10"));

        let err = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "nonce too low"}
        });
        assert_eq!(
            extract_result(err).unwrap_err(),
            ProviderError::Rpc {
                code: -32000,
                message: "nonce too low".into()
            }
        );

        let empty = json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(extract_result(empty), Err(ProviderError::Decode(_))));

        let null_error = json!({"jsonrpc": "2.0", "id": 1, "error": null, "result": "0x1"});
        assert_eq!(extract_result(null_error).unwrap(), json!("0x1"));
    }

    /// Answer one HTTP JSON-RPC request with `result` and return the request body.
    async fn serve_once(listener: &TcpListener, result: Value) -> Value {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let body = loop {
            let mut chunk = [0u8; 4096];
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-request");
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break buf[end + 4..end + 4 + len].to_vec();
            }
        };

        let request: Value = serde_json::from_slice(&body).unwrap();
        let response = json!({"jsonrpc": "2.0", "id": request["id"], "result": result}).to_string();
        let reply = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            response.len(),
            response
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    }

    #[tokio::test]
    async fn test_request_bodies_on_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let mut word = "0x".to_string();
        word.push_str(&"00".repeat(31));
        word.push_str("01");
        let tx_hash = format!("0x{}", "cd".repeat(32));
        let results = vec![
            json!("0x7"),
            json!("0x3b9aca00"),
            json!("0x1b8"),
            json!(word),
            json!(tx_hash.clone()),
        ];
        let server = tokio::spawn(async move {
            let mut seen = Vec::new();
            for result in results {
                seen.push(serve_once(&listener, result).await);
            }
            seen
        });

        let client = RpcClient::new(url);
        let who = Address::from_bytes([0xab; 20]);
        let contract = Address::from_bytes([0x10; 20]);

        assert_eq!(client.get_transaction_count(&who).await.unwrap(), 7);
        assert_eq!(client.get_gas_price().await.unwrap(), 1_000_000_000);
        assert_eq!(client.chain_id().await.unwrap(), 440);
        let returned = client
            .call(&CallRequest {
                from: Some(who),
                to: contract,
                data: vec![0xde, 0xad],
            })
            .await
            .unwrap();
        assert_eq!(returned.len(), 32);
        assert_eq!(returned[31], 1);
        let hash = client
            .send_raw_transaction(&RawTransaction::new(vec![0xf8, 0x01]))
            .await
            .unwrap();
        assert_eq!(hash.to_string(), tx_hash);

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 5);
        for request in &seen {
            assert_eq!(request["jsonrpc"], "2.0");
        }

        assert_eq!(seen[0]["method"], "eth_getTransactionCount");
        // Pending-inclusive, so back-to-back writes get consecutive nonces.
        assert_eq!(seen[0]["params"], json!([who.to_checksum(), "pending"]));

        assert_eq!(seen[1]["method"], "eth_gasPrice");
        assert_eq!(seen[1]["params"], json!([]));

        assert_eq!(seen[2]["method"], "eth_chainId");
        assert_eq!(seen[2]["params"], json!([]));

        assert_eq!(seen[3]["method"], "eth_call");
        assert_eq!(
            seen[3]["params"],
            json!([
                {
                    "from": who.to_checksum(),
                    "to": contract.to_checksum(),
                    "data": "0xdead",
                },
                "latest"
            ])
        );

        assert_eq!(seen[4]["method"], "eth_sendRawTransaction");
        assert_eq!(seen[4]["params"], json!(["0xf801"]));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let client = RpcClient::new("http://127.0.0.1:1");
        let err = client.get_gas_price().await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
