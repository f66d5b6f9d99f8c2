//! Node boundary: Ethereum JSON-RPC over HTTP.
//!
//! The client covers exactly what the oracle session needs: listing
//! accounts, sending transactions, and the log-filter trio used to watch
//! contract events. Responses are matched by transport, not by id, since
//! every call awaits its own HTTP exchange.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Categories of provider errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// HTTP status error (4xx, 5xx) or transport failure
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse the response body
    Parse,
    /// JSON-RPC level error returned by the node
    Rpc,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Parse => write!(f, "parse"),
            ProviderErrorKind::Rpc => write!(f, "rpc"),
        }
    }
}

/// Structured error from the node with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: ProviderErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a JSON-RPC error from the node's error member.
    pub fn rpc(code: i64, message: &str) -> Self {
        Self {
            kind: ProviderErrorKind::Rpc,
            message: format!("node error {code}: {message}"),
            details: None,
        }
    }

    fn transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::new(ProviderErrorKind::Timeout, "node request timed out")
        } else {
            Self::new(
                ProviderErrorKind::HttpStatus,
                format!("node request failed: {error}"),
            )
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Transaction parameters for `eth_sendTransaction`.
///
/// All quantities are 0x-hex per the wire convention.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub gas: String,
    pub value: String,
    pub data: String,
}

/// Filter parameters for `eth_newFilter`.
#[derive(Debug, Clone, Serialize)]
pub struct LogFilter {
    pub address: String,
    pub topics: Vec<String>,
}

/// Node-assigned filter handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterId(pub String);

/// A single log entry returned by `eth_getFilterChanges`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub data: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Ethereum JSON-RPC client.
#[derive(Debug)]
pub struct NodeClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl NodeClient {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    /// Returns an error if the URL is not well-formed.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        url::Url::parse(rpc_url).with_context(|| format!("invalid node URL: {rpc_url}"))?;
        Ok(Self {
            http: reqwest::Client::new(),
            url: rpc_url.to_string(),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Lists the node's accounts.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the call fails.
    pub async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.call("eth_accounts", json!([])).await
    }

    /// Submits a transaction, returning its hash.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the call fails.
    pub async fn send_transaction(
        &self,
        tx: &TransactionRequest,
    ) -> Result<String, ProviderError> {
        self.call("eth_sendTransaction", json!([tx])).await
    }

    /// Installs a log filter on the node.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the call fails.
    pub async fn new_log_filter(&self, filter: &LogFilter) -> Result<FilterId, ProviderError> {
        self.call("eth_newFilter", json!([filter])).await
    }

    /// Returns logs accumulated since the previous poll of this filter.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the call fails.
    pub async fn filter_changes(&self, id: &FilterId) -> Result<Vec<LogEntry>, ProviderError> {
        self.call("eth_getFilterChanges", json!([id.0])).await
    }

    /// Releases a log filter on the node.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the call fails.
    pub async fn uninstall_filter(&self, id: &FilterId) -> Result<bool, ProviderError> {
        self.call("eth_uninstallFilter", json!([id.0])).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "node call");

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(&e))?;

        if !status.is_success() {
            return Err(ProviderError::http_status(status.as_u16(), &body));
        }

        let parsed: RpcResponse<T> = serde_json::from_str(&body).map_err(|e| ProviderError {
            kind: ProviderErrorKind::Parse,
            message: format!("malformed {method} response: {e}"),
            details: Some(body.clone()),
        })?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::rpc(error.code, &error.message));
        }
        parsed.result.ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::Parse,
                format!("{method} response carried no result"),
            )
        })
    }
}

/// Formats an integer as a 0x-hex quantity.
pub fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}
