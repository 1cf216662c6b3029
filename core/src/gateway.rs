//! One-call access to the catalogue: build, execute, parse.
//!
//! `Gateway` pairs a `HostnineClient` with a `Transport`. Every method
//! issues exactly one GET and returns exactly one `Result`; there is no
//! retry and no timeout beyond whatever the transport itself applies.

use tracing::debug;

use crate::client::HostnineClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::params::Params;
use crate::types::{
    AccountFilters, AccountList, Detail, Envelope, LocationList, MessageList, MigrationList,
    MyAccount, NewsList, PackageList,
};

/// Executes a single HTTP round-trip.
///
/// Implementations must return non-2xx replies as data, never as `Err`;
/// `Err` means no exchange completed.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.call()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// Client plus transport. Cheap to clone when the transport is.
#[derive(Debug, Clone)]
pub struct Gateway<T = UreqTransport> {
    client: HostnineClient,
    transport: T,
}

impl Gateway<UreqTransport> {
    /// Gateway over the default ureq transport.
    pub fn connect(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(HostnineClient::new(config)?, UreqTransport::new()))
    }
}

impl<T: Transport> Gateway<T> {
    pub fn new(client: HostnineClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &HostnineClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(module = %request.module, "sending request");
        let response = self.transport.execute(&request).map_err(ApiError::Transport)?;
        debug!(module = %request.module, status = response.status, "received reply");
        Ok(response)
    }

    /// Call any module with raw params and get the normalized envelope.
    pub fn request(&self, module: &str, params: Params) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_request(module, params))?;
        self.client.parse_envelope(response)
    }

    pub fn view_my_account(&self) -> Result<MyAccount, ApiError> {
        let response = self.send(self.client.build_view_my_account())?;
        self.client.parse_view_my_account(response)
    }

    pub fn get_messages(&self, params: Params) -> Result<MessageList, ApiError> {
        let response = self.send(self.client.build_get_messages(params))?;
        self.client.parse_get_messages(response)
    }

    pub fn view_message(&self, message_id: &str) -> Result<Detail, ApiError> {
        let response = self.send(self.client.build_view_message(message_id))?;
        self.client.parse_view_message(response)
    }

    pub fn get_news_posts(&self, limit: Option<u32>) -> Result<NewsList, ApiError> {
        let response = self.send(self.client.build_get_news_posts(limit))?;
        self.client.parse_get_news_posts(response)
    }

    pub fn view_news_post(&self, news_id: &str) -> Result<Detail, ApiError> {
        let response = self.send(self.client.build_view_news_post(news_id))?;
        self.client.parse_view_news_post(response)
    }

    pub fn get_accounts(&self, filters: Option<&AccountFilters>) -> Result<AccountList, ApiError> {
        let response = self.send(self.client.build_get_accounts(filters))?;
        self.client.parse_get_accounts(response)
    }

    pub fn create_account(&self, params: Params) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_create_account(params))?;
        self.client.parse_create_account(response)
    }

    pub fn view_account(&self, domain: &str) -> Result<Detail, ApiError> {
        let response = self.send(self.client.build_view_account(domain))?;
        self.client.parse_view_account(response)
    }

    pub fn modify_account(&self, domain: &str, params: Params) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_modify_account(domain, params))?;
        self.client.parse_modify_account(response)
    }

    pub fn change_account_password(&self, domain: &str, password: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_change_account_password(domain, password))?;
        self.client.parse_change_account_password(response)
    }

    pub fn change_account_package(&self, domain: &str, pack: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_change_account_package(domain, pack))?;
        self.client.parse_change_account_package(response)
    }

    pub fn suspend_account(&self, domain: &str, reason: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_suspend_account(domain, reason))?;
        self.client.parse_suspend_account(response)
    }

    pub fn unsuspend_account(&self, domain: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_unsuspend_account(domain))?;
        self.client.parse_unsuspend_account(response)
    }

    pub fn terminate_account(&self, domain: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_terminate_account(domain))?;
        self.client.parse_terminate_account(response)
    }

    pub fn get_locations(&self) -> Result<LocationList, ApiError> {
        let response = self.send(self.client.build_get_locations())?;
        self.client.parse_get_locations(response)
    }

    pub fn get_network_status(&self) -> Result<LocationList, ApiError> {
        let response = self.send(self.client.build_get_network_status())?;
        self.client.parse_get_network_status(response)
    }

    pub fn get_packages(&self) -> Result<PackageList, ApiError> {
        let response = self.send(self.client.build_get_packages())?;
        self.client.parse_get_packages(response)
    }

    pub fn get_migrations(&self) -> Result<MigrationList, ApiError> {
        let response = self.send(self.client.build_get_migrations())?;
        self.client.parse_get_migrations(response)
    }

    pub fn add_migration(&self, domain: &str, location: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_add_migration(domain, location))?;
        self.client.parse_add_migration(response)
    }

    pub fn fix_permissions(&self, domain: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_fix_permissions(domain))?;
        self.client.parse_fix_permissions(response)
    }

    pub fn check_firewall_ban(&self, ip: &str, domain: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_check_firewall_ban(ip, domain))?;
        self.client.parse_check_firewall_ban(response)
    }

    pub fn remove_firewall_ban(&self, ip: &str, domain: &str) -> Result<Envelope, ApiError> {
        let response = self.send(self.client.build_remove_firewall_ban(ip, domain))?;
        self.client.parse_remove_firewall_ban(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    /// Replays a canned reply and records every request it sees.
    struct Canned {
        reply: Result<HttpResponse, String>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn ok(body: &str) -> Self {
            Self {
                reply: Ok(HttpResponse::ok(body)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(cause: &str) -> Self {
            Self {
                reply: Err(cause.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(TransportError::from)
        }
    }

    fn gateway(transport: Canned) -> Gateway<Canned> {
        let client = HostnineClient::new(ClientConfig::new("key").with_base_url("http://mock/api/")).unwrap();
        Gateway::new(client, transport)
    }

    #[test]
    fn transport_failure_is_classified() {
        let gw = gateway(Canned::failing("connection refused"));
        let err = gw.get_packages().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn one_request_per_call() {
        let gw = gateway(Canned::ok(r#"{"success":"TRUE","result":"Done"}"#));
        gw.unsuspend_account("example.com").unwrap();
        let seen = gw.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].module, "unsuspendAccount");
    }

    #[test]
    fn sentinel_is_never_success() {
        let gw = gateway(Canned::ok(r#"{"result":"Invalid Reseller Central API Key provided."}"#));
        let err = gw.view_my_account().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn raw_request_returns_envelope() {
        let gw = gateway(Canned::ok(r#"{"success":"true","result":"  pong ","extra":1}"#));
        let env = gw.request("ping", Params::new()).unwrap();
        assert!(env.success);
        assert_eq!(env.result.as_deref(), Some("pong"));
        assert_eq!(env.field("extra"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn requests_go_to_configured_base() {
        let gw = gateway(Canned::ok(r#"{"success":"TRUE","result":"Done"}"#));
        assert_eq!(gw.client().base_url(), "http://mock/api/");
        gw.fix_permissions("example.com").unwrap();
        let seen = gw.transport.seen.lock().unwrap();
        assert!(seen[0].url.starts_with(gw.client().base_url()));
    }
}
