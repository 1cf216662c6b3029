//! Result types returned by the endpoint catalogue.
//!
//! # Design
//! Every reply first becomes an `Envelope`. The per-endpoint types are
//! reshaped views of it built through `From<Envelope>`, so the gateway can
//! stay generic over the result type. Row data stays as JSON maps; the
//! upstream column set varies by account type and is not documented
//! precisely enough to pin down.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::params::{strip_numeric_keys, Params};

/// A normalized reply: success flag, cleaned result message and every
/// other top-level field as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    /// Split an already normalized body into an envelope.
    pub(crate) fn from_normalized(mut body: Map<String, Value>) -> Self {
        let success = matches!(body.remove("success"), Some(Value::Bool(true)));
        let result = match body.remove("result") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        Self {
            success,
            result,
            fields: body,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Rows of the `sql` field: an array, or an object keyed by index.
    /// Absent or scalar `sql` yields no rows.
    fn take_rows(&mut self) -> Vec<Value> {
        match self.fields.remove("sql") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Object(rows)) => {
                let mut rows: Vec<(String, Value)> = rows.into_iter().collect();
                rows.sort_by_key(|(key, _)| key.trim().parse::<i64>().unwrap_or(i64::MAX));
                rows.into_iter().map(|(_, row)| row).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Reply of `viewMyAccount`. `data` keeps the `result` message alongside
/// the account fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyAccount {
    pub success: bool,
    pub data: Map<String, Value>,
}

impl From<Envelope> for MyAccount {
    fn from(envelope: Envelope) -> Self {
        let mut data = strip_numeric_keys(&envelope.fields);
        if let Some(result) = envelope.result {
            data.insert("result".to_string(), Value::String(result));
        }
        Self {
            success: envelope.success,
            data,
        }
    }
}

/// Reply of the single-record lookups (`viewMessage`, `viewNewsPost`,
/// `viewAccount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub success: bool,
    pub result: Option<String>,
    pub data: Map<String, Value>,
}

impl From<Envelope> for Detail {
    fn from(envelope: Envelope) -> Self {
        Self {
            success: envelope.success,
            result: envelope.result,
            data: envelope.fields,
        }
    }
}

impl Detail {
    /// Same as `From<Envelope>` but with index-keyed duplicates removed.
    pub(crate) fn stripped(envelope: Envelope) -> Self {
        let mut detail = Self::from(envelope);
        detail.data = strip_numeric_keys(&detail.data);
        detail
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    pub success: bool,
    pub result: Option<String>,
    pub messages: Vec<Value>,
}

impl From<Envelope> for MessageList {
    fn from(mut envelope: Envelope) -> Self {
        let messages = envelope.take_rows();
        Self {
            success: envelope.success,
            result: envelope.result,
            messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsList {
    pub success: bool,
    pub result: Option<String>,
    pub posts: Vec<Value>,
}

impl From<Envelope> for NewsList {
    fn from(mut envelope: Envelope) -> Self {
        let posts = envelope.take_rows();
        Self {
            success: envelope.success,
            result: envelope.result,
            posts,
        }
    }
}

/// Search predicates accepted by `getAccounts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<String>,
}

impl AccountFilters {
    pub const ALLOWED: &'static [&'static str] = &["search", "status", "pack_id"];

    pub(crate) fn to_params(&self) -> Params {
        let mut params = Params::new();
        let fields = [
            ("search", &self.search),
            ("status", &self.status),
            ("pack_id", &self.pack_id),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                params.set(name, value);
            }
        }
        params
    }
}

/// Filter and sort echo of a `getAccounts` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    pub filters: Option<Value>,
    pub filtersstr: Option<Value>,
    pub sort: Option<Value>,
    pub sortstr: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountListData {
    pub meta: ListMeta,
    pub total_accounts: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountList {
    pub success: bool,
    pub result: Option<String>,
    pub data: AccountListData,
    pub accounts: Vec<Map<String, Value>>,
}

impl From<Envelope> for AccountList {
    fn from(mut envelope: Envelope) -> Self {
        let accounts = envelope
            .take_rows()
            .iter()
            .filter_map(Value::as_object)
            .map(strip_numeric_keys)
            .collect();
        let mut take = |key: &str| envelope.fields.remove(key);
        let data = AccountListData {
            meta: ListMeta {
                filters: take("filters"),
                filtersstr: take("filtersstr"),
                sort: take("sort"),
                sortstr: take("sortstr"),
            },
            total_accounts: take("accounts"),
        };
        Self {
            success: envelope.success,
            result: envelope.result,
            data,
            accounts,
        }
    }
}

/// Reply of `getLocations` and `getNetworkStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationList {
    pub success: bool,
    pub locations: Vec<Value>,
}

impl From<Envelope> for LocationList {
    fn from(mut envelope: Envelope) -> Self {
        let locations = envelope.take_rows();
        Self {
            success: envelope.success,
            locations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageList {
    pub success: bool,
    pub packages: Vec<Value>,
}

impl From<Envelope> for PackageList {
    fn from(mut envelope: Envelope) -> Self {
        let packages = envelope.take_rows();
        Self {
            success: envelope.success,
            packages,
        }
    }
}

/// Reply of `getMigrations`. The upstream omits `sql` entirely when there
/// are no migrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationList {
    pub success: bool,
    pub migrations: Vec<Value>,
}

impl From<Envelope> for MigrationList {
    fn from(mut envelope: Envelope) -> Self {
        let migrations = envelope.take_rows();
        Self {
            success: envelope.success,
            migrations,
        }
    }
}
