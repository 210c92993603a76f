//! EtherestClient - main gateway client

use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

use crate::address::Address;
use crate::config::{Config, DEFAULT_SERVER};
use crate::transport::{Transport, TransportRequest};
use crate::types::TxOptions;
use crate::value::is_truthy;
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "apiKey";

static GLOBAL: OnceLock<EtherestClient> = OnceLock::new();

/// Etherest client for gateway communication
///
/// Holds the base endpoint and credential; both are fixed for the client's
/// lifetime. Address handles borrow the client, so any number of them can
/// share one instance.
pub struct EtherestClient {
    server: String,
    api_key: Option<String>,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for EtherestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtherestClient")
            .field("server", &self.server)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("transport", &"<dyn Transport>")
            .finish()
    }
}

impl EtherestClient {
    /// Create a new client with HTTP transport
    #[cfg(feature = "http")]
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }

    /// Create a client with a custom transport
    ///
    /// An empty `server` falls back to [`DEFAULT_SERVER`].
    pub fn with_transport(config: Config, transport: impl Transport + 'static) -> Self {
        let server = if config.server.is_empty() {
            DEFAULT_SERVER.to_string()
        } else {
            config.server
        };
        Self {
            server,
            api_key: config.api_key,
            transport: Box::new(transport),
        }
    }

    /// Process-wide default client.
    ///
    /// Built from [`Config::from_env`] on first use unless one was installed
    /// with [`EtherestClient::install_global`].
    #[cfg(feature = "http")]
    pub fn global() -> &'static EtherestClient {
        GLOBAL.get_or_init(|| EtherestClient::new(Config::from_env()))
    }

    /// Install the process-wide default client. Fails if one already exists.
    pub fn install_global(client: EtherestClient) -> Result<&'static EtherestClient, SdkError> {
        GLOBAL
            .set(client)
            .map_err(|_| SdkError::Config("global client already initialised".to_string()))?;
        GLOBAL
            .get()
            .ok_or_else(|| SdkError::Config("global client unavailable".to_string()))
    }

    /// Base endpoint
    pub fn server(&self) -> &str {
        &self.server
    }

    /// API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    // ==================== Addresses ====================

    /// Address handle bound to this client (network defaults to `main`)
    pub fn address(&self, address: impl Into<String>, network: Option<&str>) -> Address<'_> {
        let handle = Address::new(self, address);
        match network {
            Some(network) => handle.with_network(network),
            None => handle,
        }
    }

    /// Address handle with the operations of its published ABI installed
    pub async fn load_address(
        &self,
        address: impl Into<String>,
        network: Option<&str>,
    ) -> Result<Address<'_>, SdkError> {
        let mut handle = self.address(address, network);
        handle.load_abi().await?;
        Ok(handle)
    }

    // ==================== Dispatch ====================

    /// Issue a request and unwrap the response envelope.
    ///
    /// The API key header, when configured, replaces any caller-supplied
    /// header of the same name. Everything else is sent as given.
    pub async fn request(&self, mut request: TransportRequest) -> Result<Value, SdkError> {
        if let Some(key) = &self.api_key {
            request
                .headers
                .insert(API_KEY_HEADER.to_string(), key.clone());
        }

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            credential = self.api_key.is_some(),
            "dispatching gateway request"
        );

        let body = self.transport.execute(request).await?;
        parse_envelope(&body)
    }

    /// Execute a read-only call at `path` relative to the server
    pub async fn call(&self, path: &str) -> Result<Value, SdkError> {
        self.request(TransportRequest::get(self.url(path))).await
    }

    /// Send a transaction to `path` relative to the server
    pub async fn send_transaction(
        &self,
        path: &str,
        options: TxOptions,
    ) -> Result<Value, SdkError> {
        let options = options.with_defaults();
        let url = self.url(path);
        tracing::debug!(url = %url, options = ?options, "sending transaction");

        let form = options.to_form()?;
        self.request(TransportRequest::post_form(url, form)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }
}

/// Unwrap `{"response": ..., "error": ...}`
fn parse_envelope(body: &str) -> Result<Value, SdkError> {
    let envelope: Value =
        serde_json::from_str(body).map_err(|e| SdkError::EnvelopeParse(e.to_string()))?;

    let mut envelope = match envelope {
        Value::Object(map) => map,
        _ => return Ok(Value::Null),
    };

    if let Some(error) = envelope.remove("error").filter(is_truthy) {
        tracing::warn!(error = %error, "gateway returned an error");
        return Err(SdkError::Remote(error));
    }

    Ok(envelope.remove("response").unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpMethod, MockTransport};
    use serde_json::json;

    fn mock_client(api_key: Option<&str>) -> (EtherestClient, MockTransport) {
        let transport = MockTransport::new();
        let mut config = Config::default().with_server("http://gw/v1/");
        config.api_key = api_key.map(String::from);
        (EtherestClient::with_transport(config, transport.clone()), transport)
    }

    #[test]
    fn test_parse_envelope_response() {
        assert_eq!(parse_envelope(r#"{"response": [1, 2]}"#).unwrap(), json!([1, 2]));
        assert_eq!(parse_envelope(r#"{}"#).unwrap(), Value::Null);
        assert_eq!(parse_envelope("7").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_envelope_error() {
        let err = parse_envelope(r#"{"error": {"message": "bad method"}, "response": 1}"#)
            .unwrap_err();
        assert!(matches!(err, SdkError::Remote(v) if v == json!({"message": "bad method"})));
    }

    #[test]
    fn test_parse_envelope_empty_error_is_ignored() {
        assert_eq!(
            parse_envelope(r#"{"error": null, "response": "ok"}"#).unwrap(),
            json!("ok")
        );
        assert_eq!(
            parse_envelope(r#"{"error": "", "response": "ok"}"#).unwrap(),
            json!("ok")
        );
    }

    #[test]
    fn test_parse_envelope_malformed() {
        assert!(matches!(
            parse_envelope("<html>502</html>"),
            Err(SdkError::EnvelopeParse(_))
        ));
    }

    #[test]
    fn test_empty_server_uses_default() {
        let client = EtherestClient::with_transport(
            Config::default().with_server(""),
            MockTransport::new(),
        );
        assert_eq!(client.server(), DEFAULT_SERVER);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let (client, _) = mock_client(Some("secret"));
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn test_call_concatenates_path() {
        let (client, transport) = mock_client(None);
        transport.set_response("http://gw/v1/main/0xabc/", json!("ok"));

        assert_eq!(client.call("main/0xabc/").await.unwrap(), json!("ok"));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.form.is_none());
    }

    #[tokio::test]
    async fn test_call_empty_path_hits_server_root() {
        let (client, transport) = mock_client(None);
        transport.set_response("http://gw/v1/", json!({"version": 1}));

        assert_eq!(client.call("").await.unwrap(), json!({"version": 1}));
    }

    #[tokio::test]
    async fn test_request_injects_api_key() {
        let (client, transport) = mock_client(Some("secret"));
        transport.set_response("http://gw/v1/x", json!(1));

        let request = TransportRequest::get("http://gw/v1/x")
            .header("apiKey", "spoofed")
            .header("accept", "application/json");
        client.request(request).await.unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.headers.get(API_KEY_HEADER).map(String::as_str), Some("secret"));
        assert_eq!(sent.headers.get("accept").map(String::as_str), Some("application/json"));
    }

    #[tokio::test]
    async fn test_request_without_api_key_sends_no_header() {
        let (client, transport) = mock_client(None);
        transport.set_response("http://gw/v1/x", json!(1));

        client.call("x").await.unwrap();
        assert!(transport.last_request().unwrap().headers.is_empty());
    }

    #[tokio::test]
    async fn test_send_transaction_applies_defaults() {
        let (client, transport) = mock_client(None);
        transport.set_response("http://gw/v1/main/0xabc/f/", json!("0xtx"));

        let txid = client
            .send_transaction("main/0xabc/f/", TxOptions::new().from("0xme").gas_price(0))
            .await
            .unwrap();
        assert_eq!(txid, json!("0xtx"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://gw/v1/main/0xabc/f/");
        assert_eq!(request.form_value("from"), Some("0xme"));
        assert_eq!(request.form_value("gasLimit"), Some("200000"));
        assert_eq!(request.form_value("gasPrice"), Some("20"));
    }

    #[tokio::test]
    async fn test_send_transaction_empty_path() {
        let (client, transport) = mock_client(None);
        transport.set_response("http://gw/v1/", json!("0xtx"));

        client
            .send_transaction("", TxOptions::new().gas_limit(10))
            .await
            .unwrap();
        assert_eq!(transport.last_request().unwrap().form_value("gasLimit"), Some("10"));
    }

    #[tokio::test]
    async fn test_load_address() {
        let (client, transport) = mock_client(None);
        transport.set_response(
            "http://gw/v1/ropsten/0xabc/",
            json!({"abi": crate::abi::erc20()}),
        );

        let token = client.load_address("0xabc", Some("ropsten")).await.unwrap();
        assert_eq!(token.network(), "ropsten");
        assert!(token.has_operation("balanceOf"));
        assert!(token.has_operation("transferFrom"));
    }

    #[test]
    fn test_global_install_once() {
        let client = EtherestClient::with_transport(
            Config::default().with_server("http://global/"),
            MockTransport::new(),
        );
        let installed = EtherestClient::install_global(client).unwrap();
        assert_eq!(installed.server(), "http://global/");

        let again = EtherestClient::install_global(EtherestClient::with_transport(
            Config::default(),
            MockTransport::new(),
        ));
        assert!(matches!(again, Err(SdkError::Config(_))));

        #[cfg(feature = "http")]
        assert_eq!(EtherestClient::global().server(), "http://global/");
    }
}
