//! The oracle session: submission plus per-oracle event watchers.
//!
//! This is the event dispatcher. A session owns the node client, the
//! sender account, and one watcher task per oracle. Watchers install an
//! address+topic log filter and poll it, forwarding decoded answers over
//! an unbounded channel. Consumers (TUI runtime, one-shot commands) drain
//! that channel.
//!
//! Failure semantics are deliberately flat: a failed submission emits
//! `SubmitFailed` and is done; a poll or decode failure emits
//! `WatchError` and the watcher keeps polling. Nothing is retried and
//! filters live until `shutdown` cancels the watchers, which then release
//! them on the node best-effort.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::abi;
use crate::config::Config;
use crate::core::events::SessionEvent;
use crate::oracle::{self, Bindings, OracleBinding, OracleKind};
use crate::provider::{LogFilter, NodeClient, TransactionRequest, quantity};

/// Receiving half of the session event channel.
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

#[derive(Debug)]
struct Watcher {
    cancel: CancellationToken,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

/// A live connection to the node with running event watchers.
#[derive(Debug)]
pub struct OracleSession {
    client: Arc<NodeClient>,
    account: String,
    bindings: Bindings,
    gas: u64,
    value_wei: u64,
    chat_gateway_url: String,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<SessionEvent>,
    watchers: Vec<Watcher>,
}

impl OracleSession {
    /// Connects to the node, selects the sender account, and starts one
    /// event watcher per oracle.
    ///
    /// # Errors
    /// Returns an error if the node is unreachable, returns no accounts,
    /// the configured account index is out of range, or a contract
    /// address is missing.
    pub async fn connect(config: &Config) -> Result<(Self, SessionEventReceiver)> {
        let client = Arc::new(NodeClient::new(&config.rpc_url, config.request_timeout())?);

        let accounts = client
            .accounts()
            .await
            .context("fetch accounts from node")?;
        ensure!(
            !accounts.is_empty(),
            "node returned no accounts; check your node configuration"
        );
        let account = accounts
            .get(config.account_index)
            .cloned()
            .with_context(|| {
                format!(
                    "account index {} out of range (node returned {} accounts)",
                    config.account_index,
                    accounts.len()
                )
            })?;

        let bindings = Bindings::from_contracts(&config.contracts)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let mut session = Self {
            client,
            account,
            bindings,
            gas: config.gas,
            value_wei: config.value_wei,
            chat_gateway_url: config.chat_gateway_url.clone(),
            poll_interval: config.poll_interval(),
            tx,
            watchers: Vec::new(),
        };
        for kind in OracleKind::all() {
            session.spawn_watcher(kind);
        }
        Ok((session, rx))
    }

    /// The transaction sender account.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Requests a fresh price fetch from the price oracle.
    pub fn submit_price_update(&self) {
        let binding = self.bindings.get(OracleKind::DieselPrice);
        self.submit(OracleKind::DieselPrice, oracle::price_update_call(binding));
    }

    /// Sends a question to the knowledge oracle.
    pub fn submit_knowledge_query(&self, question: &str) {
        let binding = self.bindings.get(OracleKind::Knowledge);
        self.submit(
            OracleKind::Knowledge,
            oracle::knowledge_query_call(binding, question),
        );
    }

    /// Sends a question to the chat oracle.
    pub fn submit_chat_ask(&self, question: &str) {
        let binding = self.bindings.get(OracleKind::Chat);
        self.submit(
            OracleKind::Chat,
            oracle::chat_ask_call(binding, &self.chat_gateway_url, question),
        );
    }

    /// Stops the watchers. Each cancelled watcher releases its node-side
    /// filter before exiting.
    pub fn shutdown(&mut self) {
        for watcher in &self.watchers {
            watcher.cancel.cancel();
        }
    }

    fn submit(&self, kind: OracleKind, data: String) {
        let request = TransactionRequest {
            from: self.account.clone(),
            to: self.bindings.get(kind).address.clone(),
            gas: quantity(self.gas),
            value: quantity(self.value_wei),
            data,
        };
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.send_transaction(&request).await {
                Ok(tx_hash) => {
                    tracing::info!(%kind, %tx_hash, "request submitted");
                    SessionEvent::Submitted { kind, tx_hash }
                }
                Err(error) => {
                    tracing::error!(%kind, %error, "request submission failed");
                    SessionEvent::SubmitFailed {
                        kind,
                        message: error.to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_watcher(&mut self, kind: OracleKind) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watch_loop(
            Arc::clone(&self.client),
            self.bindings.get(kind).clone(),
            self.poll_interval,
            self.tx.clone(),
            cancel.clone(),
        ));
        self.watchers.push(Watcher { cancel, handle });
    }
}

impl Drop for OracleSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn watch_loop(
    client: Arc<NodeClient>,
    binding: OracleBinding,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) {
    let kind = binding.kind;
    let filter = LogFilter {
        address: binding.address.clone(),
        topics: vec![binding.event_topic.clone()],
    };

    let id = tokio::select! {
        () = cancel.cancelled() => return,
        installed = client.new_log_filter(&filter) => match installed {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(%kind, %error, "could not install event filter");
                let _ = tx.send(SessionEvent::WatchError {
                    kind,
                    message: format!("could not watch events: {error}"),
                });
                return;
            }
        }
    };
    tracing::debug!(%kind, filter = %id.0, "watching oracle events");

    'poll: loop {
        tokio::select! {
            () = cancel.cancelled() => break 'poll,
            () = tokio::time::sleep(poll_interval) => {
                match client.filter_changes(&id).await {
                    Ok(logs) => {
                        for log in logs {
                            let event = match abi::decode_string(&log.data) {
                                Ok(answer) => {
                                    tracing::debug!(%kind, len = answer.len(), "answer event");
                                    SessionEvent::Answer {
                                        kind,
                                        answer: (!answer.is_empty()).then_some(answer),
                                    }
                                }
                                Err(error) => {
                                    tracing::warn!(%kind, %error, "undecodable event data");
                                    SessionEvent::WatchError {
                                        kind,
                                        message: format!("undecodable event data: {error:#}"),
                                    }
                                }
                            };
                            if tx.send(event).is_err() {
                                break 'poll;
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%kind, %error, "event poll failed");
                        if tx.send(SessionEvent::WatchError {
                            kind,
                            message: error.to_string(),
                        }).is_err() {
                            break 'poll;
                        }
                    }
                }
            }
        }
    }

    if let Err(error) = client.uninstall_filter(&id).await {
        tracing::debug!(%kind, %error, "filter release failed");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::timeout;
    use wiremock::matchers::body_partial_json;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Contracts;

    fn test_config(server: &MockServer) -> Config {
        Config {
            rpc_url: server.uri(),
            account_index: 1,
            poll_interval_ms: 25,
            contracts: Contracts {
                diesel_price: "0x01".to_string(),
                knowledge: "0x02".to_string(),
                chat: "0x03".to_string(),
            },
            ..Config::default()
        }
    }

    async fn mount_rpc(server: &MockServer, method: &str, result: serde_json::Value) {
        Mock::given(body_partial_json(json!({"method": method})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": result
            })))
            .mount(server)
            .await;
    }

    async fn mount_baseline(server: &MockServer) {
        mount_rpc(server, "eth_accounts", json!(["0xa0", "0xa1"])).await;
        mount_rpc(server, "eth_newFilter", json!("0x1")).await;
        mount_rpc(server, "eth_getFilterChanges", json!([])).await;
        mount_rpc(server, "eth_uninstallFilter", json!(true)).await;
    }

    async fn next_event(rx: &mut SessionEventReceiver) -> SessionEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("session channel closed")
    }

    #[tokio::test]
    async fn test_connect_selects_configured_account() {
        let server = MockServer::start().await;
        mount_baseline(&server).await;

        let (session, _rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        assert_eq!(session.account(), "0xa1");
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_account_list() {
        let server = MockServer::start().await;
        mount_rpc(&server, "eth_accounts", json!([])).await;

        let err = OracleSession::connect(&test_config(&server))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no accounts"));
    }

    #[tokio::test]
    async fn test_connect_rejects_out_of_range_index() {
        let server = MockServer::start().await;
        mount_rpc(&server, "eth_accounts", json!(["0xa0"])).await;

        let mut config = test_config(&server);
        config.account_index = 5;
        let err = OracleSession::connect(&config).await.unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn test_submit_emits_submitted_with_hash() {
        let server = MockServer::start().await;
        mount_baseline(&server).await;
        mount_rpc(&server, "eth_sendTransaction", json!("0xfeed")).await;

        let (session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        session.submit_knowledge_query("why is the sky blue?");

        let event = next_event(&mut rx).await;
        assert_eq!(
            event,
            SessionEvent::Submitted {
                kind: OracleKind::Knowledge,
                tx_hash: "0xfeed".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_submit_failure_emits_submit_failed() {
        let server = MockServer::start().await;
        mount_baseline(&server).await;
        Mock::given(body_partial_json(json!({"method": "eth_sendTransaction"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1,
                "error": {"code": -32000, "message": "out of gas"}
            })))
            .mount(&server)
            .await;

        let (session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        session.submit_price_update();

        match next_event(&mut rx).await {
            SessionEvent::SubmitFailed { kind, message } => {
                assert_eq!(kind, OracleKind::DieselPrice);
                assert!(message.contains("out of gas"));
            }
            other => panic!("expected SubmitFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watcher_delivers_decoded_answer() {
        let server = MockServer::start().await;
        mount_rpc(&server, "eth_accounts", json!(["0xa0", "0xa1"])).await;
        mount_rpc(&server, "eth_newFilter", json!("0x1")).await;
        mount_rpc(&server, "eth_uninstallFilter", json!(true)).await;

        // Event data is a single ABI string; strip the selector from the
        // call encoding to build it.
        let call = abi::encode_call_string([0, 0, 0, 0], "the answer is 42");
        let data = format!("0x{}", &call[10..]);
        mount_rpc(
            &server,
            "eth_getFilterChanges",
            json!([{"data": data, "topics": [], "transactionHash": "0xabc"}]),
        )
        .await;

        let (_session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        // All three watchers share the mock, so take whichever fires first.
        match next_event(&mut rx).await {
            SessionEvent::Answer { answer, .. } => {
                assert_eq!(answer.as_deref(), Some("the answer is 42"));
            }
            other => panic!("expected Answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_answer_is_none() {
        let server = MockServer::start().await;
        mount_rpc(&server, "eth_accounts", json!(["0xa0", "0xa1"])).await;
        mount_rpc(&server, "eth_newFilter", json!("0x1")).await;
        mount_rpc(&server, "eth_uninstallFilter", json!(true)).await;

        let call = abi::encode_call_string([0, 0, 0, 0], "");
        let data = format!("0x{}", &call[10..]);
        mount_rpc(
            &server,
            "eth_getFilterChanges",
            json!([{"data": data, "topics": []}]),
        )
        .await;

        let (_session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        match next_event(&mut rx).await {
            SessionEvent::Answer { answer, .. } => assert_eq!(answer, None),
            other => panic!("expected Answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_failure_emits_watch_error_and_keeps_polling() {
        let server = MockServer::start().await;
        mount_rpc(&server, "eth_accounts", json!(["0xa0", "0xa1"])).await;
        mount_rpc(&server, "eth_newFilter", json!("0x1")).await;
        mount_rpc(&server, "eth_uninstallFilter", json!(true)).await;
        Mock::given(body_partial_json(json!({"method": "eth_getFilterChanges"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1,
                "error": {"code": -32000, "message": "filter not found"}
            })))
            .mount(&server)
            .await;

        let (_session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        let first = next_event(&mut rx).await;
        assert!(matches!(first, SessionEvent::WatchError { .. }));
        // Watchers survive poll failures.
        let second = next_event(&mut rx).await;
        assert!(matches!(second, SessionEvent::WatchError { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_channel() {
        let server = MockServer::start().await;
        mount_baseline(&server).await;

        let (session, mut rx) = OracleSession::connect(&test_config(&server)).await.unwrap();
        drop(session);

        let closed = timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok(), "watchers did not stop after shutdown");
    }
}
