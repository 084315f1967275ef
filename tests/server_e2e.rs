//! End-to-end tests: real TCP listener, reqwest client, programmable ledger

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use claim_core::mock::{LedgerMethod, MockLedger};
use claim_core::{normalize, AllocationEntry, AllocationIndex, GatewayError, TokenContracts};
use claim_server::config::ServerConfig;
use claim_server::{create_router, create_shared_state, RetryPolicy};
use serde_json::{json, Value};

const LISTED: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const UNLISTED: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

struct TestServer {
    addr: SocketAddr,
    ledger: Arc<MockLedger>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(config: ServerConfig) -> Self {
        let index = AllocationIndex::build(vec![AllocationEntry {
            address: LISTED.into(),
            amount: "100".into(),
            proof: vec![h(1).to_string(), h(2).to_string()],
        }])
        .unwrap();
        Self::start_with(index, config).await
    }

    async fn start_with(index: AllocationIndex, config: ServerConfig) -> Self {
        let ledger = Arc::new(MockLedger::new());
        let state = create_shared_state(Arc::new(index), Arc::clone(&ledger), tokens(), &config);
        let app = create_router(state, config.request_timeout, config.max_concurrent_requests);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            ledger,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("http://{}{}", self.addr, path))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("http://{}{}", self.addr, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

fn h(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

fn tokens() -> TokenContracts {
    TokenContracts {
        legacy: Address::repeat_byte(0x11),
        wrapped: Address::repeat_byte(0x22),
    }
}

fn config() -> ServerConfig {
    ServerConfig {
        ledger_timeout: Duration::from_millis(200),
        retry: RetryPolicy::new(2, Duration::from_millis(10)),
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn test_claim_state_changes_are_visible_immediately() {
    let server = TestServer::start(config()).await;
    let listed = normalize(LISTED).unwrap();
    server.ledger.set_claimable(listed, U256::from(100));

    let (status, body) = server.get(&format!("/api/check-claim/{LISTED}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["hasClaimed"], false);
    assert_eq!(body["claimableAmount"], "100");
    assert_eq!(body["merkleProof"], json!([h(1).to_string(), h(2).to_string()]));
    assert_eq!(
        server.ledger.last_claimable_args(),
        Some((U256::from(100), vec![h(1), h(2)]))
    );

    server.ledger.set_claimed(listed, true);
    server.ledger.set_claimable(listed, U256::ZERO);

    let (status, body) = server.get(&format!("/api/check-claim/{LISTED}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["hasClaimed"], true);
    assert_eq!(body["claimableAmount"], "0");
}

#[tokio::test]
async fn test_unlisted_address_gets_nothing() {
    let server = TestServer::start(config()).await;
    server
        .ledger
        .set_claimable(normalize(UNLISTED).unwrap(), U256::from(999));

    let (status, body) = server.get(&format!("/api/check-claim/{UNLISTED}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["claimableAmount"], "0");
    assert_eq!(body["merkleProof"], json!([]));
    assert_eq!(server.ledger.calls(LedgerMethod::ClaimableAmount), 0);
}

#[tokio::test]
async fn test_malformed_address_never_reaches_ledger() {
    let server = TestServer::start(config()).await;

    for path in [
        "/api/check-claim/0xZZZ",
        "/api/balance/wrapped/0xZZZ",
        "/api/balance/legacy/0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
    ] {
        let (status, body) = server.get(path).await;
        assert_eq!(status, 400, "{path}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_ADDRESS");
    }

    assert_eq!(server.ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_slow_ledger_fails_whole_resolution() {
    let server = TestServer::start(ServerConfig {
        retry: RetryPolicy::none(),
        ..config()
    })
    .await;
    server
        .ledger
        .set_delay(LedgerMethod::ClaimableAmount, Duration::from_secs(2));

    let (status, body) = server.get(&format!("/api/check-claim/{LISTED}")).await;
    assert_eq!(status, 500);
    assert_eq!(body["code"], "LEDGER_UNAVAILABLE");
    assert!(body.get("hasClaimed").is_none());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = TestServer::start(config()).await;
    server.ledger.fail_times(
        LedgerMethod::IsClaimEnabled,
        GatewayError::LedgerUnavailable("connection reset".into()),
        2,
    );
    server.ledger.set_claim_enabled(true);

    let (status, body) = server.get("/api/claim-status").await;
    assert_eq!(status, 200);
    assert_eq!(body["claimEnabled"], true);
    assert_eq!(server.ledger.calls(LedgerMethod::IsClaimEnabled), 3);
}

#[tokio::test]
async fn test_check_claim_retries_whole_resolution() {
    let server = TestServer::start(config()).await;
    server
        .ledger
        .set_claimable(normalize(LISTED).unwrap(), U256::from(100));
    server.ledger.fail_times(
        LedgerMethod::HasClaimed,
        GatewayError::LedgerUnavailable("connection reset".into()),
        1,
    );

    let (status, body) = server.get(&format!("/api/check-claim/{LISTED}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["hasClaimed"], false);
    assert_eq!(body["claimableAmount"], "100");
    assert_eq!(body["merkleProof"], json!([h(1).to_string(), h(2).to_string()]));
    assert_eq!(server.ledger.calls(LedgerMethod::HasClaimed), 2);
    assert!(server.ledger.calls(LedgerMethod::ClaimableAmount) >= 1);
}

#[tokio::test]
async fn test_reverts_are_not_retried() {
    let server = TestServer::start(config()).await;
    server.ledger.fail(
        LedgerMethod::Stats,
        GatewayError::LedgerCallReverted("execution reverted".into()),
    );

    let (status, body) = server.get("/api/claim-stats").await;
    assert_eq!(status, 500);
    assert_eq!(body["code"], "LEDGER_CALL_REVERTED");
    assert_eq!(server.ledger.calls(LedgerMethod::Stats), 1);
}

#[tokio::test]
async fn test_wrap_instructions() {
    let server = TestServer::start(config()).await;

    let (status, body) = server
        .post("/api/wrap", json!({ "amount": "12.5", "userAddress": LISTED }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["action"], "wrap");
    assert_eq!(body["amount"], "12500");
    let steps = body["instructions"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert!(steps[1].as_str().unwrap().contains("approveAndCall"));

    for bad in [json!("0"), json!("-5"), json!("abc"), json!("1.2345")] {
        let (status, body) = server
            .post("/api/unwrap", json!({ "amount": bad, "userAddress": LISTED }))
            .await;
        assert_eq!(status, 400, "amount {bad}");
        assert_eq!(body["code"], "INVALID_AMOUNT");
    }

    let (status, body) = server.post("/api/wrap", json!({ "amount": "1" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_REQUEST");

    assert_eq!(server.ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_sample_dataset_serves_proofs() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/allocations.json");
    let index = AllocationIndex::load(path).unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.merkle_root().is_some());

    let server = TestServer::start_with(index, config()).await;
    let address = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    server
        .ledger
        .set_claimable(normalize(address).unwrap(), U256::from(2500));

    let (status, body) = server.get(&format!("/api/check-claim/{address}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["address"], address);
    assert_eq!(body["claimableAmount"], "2500");
    assert_eq!(body["merkleProof"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(config()).await;
    let response = server
        .client
        .get(format!("http://{}/health", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}
