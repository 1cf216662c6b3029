//! Stateless request builder and response parser for the reseller API.
//!
//! # Design
//! `HostnineClient` holds only the validated base URL and the API key.
//! Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! All of them funnel through `build_request` and `parse_envelope`, which
//! own the query encoding, the status check, normalization and sentinel
//! classification.

use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpRequest, HttpResponse};
use crate::normalize::{classify, normalize};
use crate::params::{format_filters, Params};
use crate::types::{
    AccountFilters, AccountList, Detail, Envelope, LocationList, MessageList, MigrationList,
    MyAccount, NewsList, PackageList,
};

/// Synchronous, stateless client for the reseller API.
#[derive(Clone)]
pub struct HostnineClient {
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for HostnineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostnineClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HostnineClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let base_url = Url::parse(&config.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(config.base_url));
        }
        Ok(Self {
            base_url,
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build a GET for `module` carrying `params`, the module selector and
    /// the API key. Caller-supplied `module` or `api_key` entries are
    /// overwritten.
    pub fn build_request(&self, module: &str, mut params: Params) -> HttpRequest {
        params.set("module", module);
        params.set("api_key", &self.api_key);

        let mut url = self.base_url.clone();
        url.query_pairs_mut().extend_pairs(params.iter());

        HttpRequest {
            module: module.to_string(),
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    /// Check, normalize and classify a reply.
    pub fn parse_envelope(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        let body = decode_body(response)?;
        let envelope = Envelope::from_normalized(body);
        if let Some(result) = envelope.result.as_deref() {
            if let Some(err) = classify(result) {
                warn!(kind = ?err.kind(), "upstream rejected the request");
                return Err(err);
            }
        }
        Ok(envelope)
    }

    // --- my account ---

    pub fn build_view_my_account(&self) -> HttpRequest {
        self.build_request("viewMyAccount", Params::new())
    }

    pub fn parse_view_my_account(&self, response: HttpResponse) -> Result<MyAccount, ApiError> {
        self.parse_envelope(response).map(MyAccount::from)
    }

    pub fn build_get_messages(&self, params: Params) -> HttpRequest {
        self.build_request("getMessages", params)
    }

    pub fn parse_get_messages(&self, response: HttpResponse) -> Result<MessageList, ApiError> {
        self.parse_envelope(response).map(MessageList::from)
    }

    pub fn build_view_message(&self, message_id: &str) -> HttpRequest {
        self.build_request("viewMessage", Params::new().with("message_id", message_id))
    }

    pub fn parse_view_message(&self, response: HttpResponse) -> Result<Detail, ApiError> {
        self.parse_envelope(response).map(Detail::from)
    }

    pub fn build_get_news_posts(&self, limit: Option<u32>) -> HttpRequest {
        let mut params = Params::new();
        if let Some(limit) = limit {
            params.set("limit", limit);
        }
        self.build_request("getNewsPosts", params)
    }

    pub fn parse_get_news_posts(&self, response: HttpResponse) -> Result<NewsList, ApiError> {
        self.parse_envelope(response).map(NewsList::from)
    }

    pub fn build_view_news_post(&self, news_id: &str) -> HttpRequest {
        self.build_request("viewNewsPost", Params::new().with("news_id", news_id))
    }

    pub fn parse_view_news_post(&self, response: HttpResponse) -> Result<Detail, ApiError> {
        self.parse_envelope(response).map(Detail::from)
    }

    // --- accounts ---

    /// `filters` is only sent when a filter set is given, even an empty one.
    pub fn build_get_accounts(&self, filters: Option<&AccountFilters>) -> HttpRequest {
        let mut params = Params::new();
        if let Some(filters) = filters {
            let encoded = format_filters(&filters.to_params(), Some(AccountFilters::ALLOWED));
            params.set("filters", encoded);
        }
        self.build_request("getAccounts", params)
    }

    pub fn parse_get_accounts(&self, response: HttpResponse) -> Result<AccountList, ApiError> {
        self.parse_envelope(response).map(AccountList::from)
    }

    /// A `pack` entry is sent as `pack_id` when numeric, else as `package`.
    pub fn build_create_account(&self, mut params: Params) -> HttpRequest {
        params.reroute_pack();
        self.build_request("createAccount", params)
    }

    pub fn parse_create_account(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_view_account(&self, domain: &str) -> HttpRequest {
        self.build_request("viewAccount", domain_params(domain))
    }

    pub fn parse_view_account(&self, response: HttpResponse) -> Result<Detail, ApiError> {
        self.parse_envelope(response).map(Detail::stripped)
    }

    pub fn build_modify_account(&self, domain: &str, mut params: Params) -> HttpRequest {
        params.route(domain, "domain_id", "domain");
        params.reroute_pack();
        self.build_request("modifyAccount", params)
    }

    pub fn parse_modify_account(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_change_account_password(&self, domain: &str, password: &str) -> HttpRequest {
        let mut params = Params::new().with("password", password);
        params.route(domain, "domain_id", "domain");
        self.build_request("changeAccountPassword", params)
    }

    pub fn parse_change_account_password(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_change_account_package(&self, domain: &str, pack: &str) -> HttpRequest {
        let mut params = domain_params(domain);
        params.route(pack, "pack_id", "package");
        self.build_request("changeAccountPackage", params)
    }

    pub fn parse_change_account_package(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_suspend_account(&self, domain: &str, reason: &str) -> HttpRequest {
        let mut params = Params::new().with("reason", reason);
        params.route(domain, "domain_id", "domain");
        self.build_request("suspendAccount", params)
    }

    pub fn parse_suspend_account(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_unsuspend_account(&self, domain: &str) -> HttpRequest {
        self.build_request("unsuspendAccount", domain_params(domain))
    }

    pub fn parse_unsuspend_account(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_terminate_account(&self, domain: &str) -> HttpRequest {
        self.build_request("terminateAccount", domain_params(domain))
    }

    pub fn parse_terminate_account(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    // --- locations & packages ---

    pub fn build_get_locations(&self) -> HttpRequest {
        self.build_request("getLocations", Params::new())
    }

    pub fn parse_get_locations(&self, response: HttpResponse) -> Result<LocationList, ApiError> {
        self.parse_envelope(response).map(LocationList::from)
    }

    pub fn build_get_network_status(&self) -> HttpRequest {
        self.build_request("getNetworkStatus", Params::new())
    }

    pub fn parse_get_network_status(&self, response: HttpResponse) -> Result<LocationList, ApiError> {
        self.parse_envelope(response).map(LocationList::from)
    }

    pub fn build_get_packages(&self) -> HttpRequest {
        self.build_request("getPackages", Params::new())
    }

    pub fn parse_get_packages(&self, response: HttpResponse) -> Result<PackageList, ApiError> {
        self.parse_envelope(response).map(PackageList::from)
    }

    // --- migrations ---

    pub fn build_get_migrations(&self) -> HttpRequest {
        self.build_request("getMigrations", Params::new())
    }

    pub fn parse_get_migrations(&self, response: HttpResponse) -> Result<MigrationList, ApiError> {
        self.parse_envelope(response).map(MigrationList::from)
    }

    pub fn build_add_migration(&self, domain: &str, location: &str) -> HttpRequest {
        let mut params = domain_params(domain);
        params.route(location, "location_id", "location");
        self.build_request("addMigration", params)
    }

    pub fn parse_add_migration(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    // --- scripts & tools ---

    pub fn build_fix_permissions(&self, domain: &str) -> HttpRequest {
        self.build_request("fixPermissions", domain_params(domain))
    }

    pub fn parse_fix_permissions(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_check_firewall_ban(&self, ip: &str, domain: &str) -> HttpRequest {
        let mut params = Params::new().with("ip", ip);
        params.route(domain, "domain_id", "domain");
        self.build_request("checkFirewallBan", params)
    }

    pub fn parse_check_firewall_ban(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }

    pub fn build_remove_firewall_ban(&self, ip: &str, domain: &str) -> HttpRequest {
        let mut params = Params::new().with("ip", ip);
        params.route(domain, "domain_id", "domain");
        self.build_request("removeFirewallBan", params)
    }

    pub fn parse_remove_firewall_ban(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        self.parse_envelope(response)
    }
}

fn domain_params(domain: &str) -> Params {
    let mut params = Params::new();
    params.route(domain, "domain_id", "domain");
    params
}

/// Accept only a 200 carrying a JSON object, then normalize it.
fn decode_body(response: HttpResponse) -> Result<Map<String, Value>, ApiError> {
    let HttpResponse { status, body, .. } = response;
    if status != 200 || body.trim().is_empty() {
        warn!(status, "unexpected reply from upstream");
        return Err(ApiError::MalformedResponse { status, body });
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(mut map)) => {
            normalize(&mut map);
            Ok(map)
        }
        _ => {
            warn!(status, "upstream reply is not a JSON object");
            Err(ApiError::MalformedResponse { status, body })
        }
    }
}
