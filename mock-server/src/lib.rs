//! In-memory stand-in for the Hostnine reseller API.
//!
//! Speaks the upstream wire format: one GET route, the module and API key
//! in the query string, HTTP 200 for everything, `"TRUE"`/`"FALSE"` success
//! flags, HTML in result messages and rows duplicated under numeric keys.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const DEFAULT_API_KEY: &str = "test-key";

pub const INVALID_MODULE: &str = "Invalid Reseller Central API Module selected.";
pub const INVALID_KEY: &str = "Invalid Reseller Central API Key provided.";
pub const MISSING_KEY: &str = "No Reseller Central API Key provided.";

/// An IP seeded into the firewall block list at startup.
pub const SEEDED_BAN: &str = "192.0.2.10";

#[derive(Clone, Debug)]
pub struct Account {
    pub domain_id: u64,
    pub domain: String,
    pub username: String,
    pub email: String,
    pub pack_id: u64,
    pub status: String,
    pub location_id: u64,
    pub reason: String,
}

#[derive(Clone, Debug)]
struct Package {
    id: u64,
    name: &'static str,
}

#[derive(Clone, Debug)]
struct Location {
    id: u64,
    name: &'static str,
}

#[derive(Clone, Debug)]
struct Post {
    id: u64,
    subject: &'static str,
    body: &'static str,
}

#[derive(Clone, Debug)]
struct Migration {
    id: u64,
    domain_id: u64,
    location_id: u64,
}

#[derive(Debug)]
pub struct Store {
    api_key: String,
    accounts: BTreeMap<u64, Account>,
    next_id: u64,
    packages: Vec<Package>,
    locations: Vec<Location>,
    messages: Vec<Post>,
    news: Vec<Post>,
    migrations: Vec<Migration>,
    bans: BTreeSet<String>,
}

impl Store {
    fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            accounts: BTreeMap::new(),
            next_id: 1,
            packages: vec![
                Package { id: 1, name: "Starter" },
                Package { id: 2, name: "Business" },
            ],
            locations: vec![
                Location { id: 1, name: "Dallas" },
                Location { id: 2, name: "Amsterdam" },
            ],
            messages: vec![
                Post { id: 1, subject: "Welcome", body: "<p>Welcome to your reseller account.</p>" },
                Post { id: 2, subject: "Invoice", body: "<p>Your invoice is ready.</p>" },
            ],
            news: vec![
                Post { id: 1, subject: "Maintenance", body: "Scheduled maintenance  tonight." },
                Post { id: 2, subject: "New location", body: "Amsterdam is now available." },
                Post { id: 3, subject: "Price update", body: "Prices stay the same." },
            ],
            migrations: Vec::new(),
            bans: BTreeSet::from([SEEDED_BAN.to_string()]),
        }
    }

    fn find_account(&self, q: &HashMap<String, String>) -> Option<u64> {
        if let Some(id) = q.get("domain_id").and_then(|v| v.parse::<u64>().ok()) {
            return self.accounts.contains_key(&id).then_some(id);
        }
        let domain = q.get("domain")?;
        self.accounts.values().find(|a| &a.domain == domain).map(|a| a.domain_id)
    }

    fn find_package(&self, q: &HashMap<String, String>) -> Option<u64> {
        if let Some(id) = q.get("pack_id").and_then(|v| v.parse::<u64>().ok()) {
            return self.packages.iter().any(|p| p.id == id).then_some(id);
        }
        let name = q.get("package")?;
        self.packages.iter().find(|p| p.name == name.as_str()).map(|p| p.id)
    }

    fn find_location(&self, q: &HashMap<String, String>) -> Option<u64> {
        if let Some(id) = q.get("location_id").and_then(|v| v.parse::<u64>().ok()) {
            return self.locations.iter().any(|l| l.id == id).then_some(id);
        }
        let name = q.get("location")?;
        self.locations.iter().find(|l| l.name == name.as_str()).map(|l| l.id)
    }

    fn package_name(&self, id: u64) -> &'static str {
        self.packages.iter().find(|p| p.id == id).map(|p| p.name).unwrap_or("")
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app(api_key: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(api_key)));
    Router::new()
        .route("/api/", get(dispatch))
        .route("/api", get(dispatch))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn reply(success: bool, result: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("success".to_string(), json!(if success { "TRUE" } else { "FALSE" }));
    map.insert("result".to_string(), json!(result));
    map
}

fn failure(result: &str) -> Json<Value> {
    Json(Value::Object(reply(false, result)))
}

fn success(result: &str) -> Json<Value> {
    Json(Value::Object(reply(true, result)))
}

/// A row keyed both by column index and by column name.
fn row(columns: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (idx, (name, value)) in columns.iter().enumerate() {
        map.insert(idx.to_string(), value.clone());
        map.insert(name.to_string(), value.clone());
    }
    map
}

fn account_row(store: &Store, account: &Account) -> Map<String, Value> {
    row(&[
        ("domain_id", json!(account.domain_id.to_string())),
        ("domain", json!(account.domain)),
        ("username", json!(account.username)),
        ("email", json!(account.email)),
        ("pack_id", json!(account.pack_id.to_string())),
        ("package", json!(store.package_name(account.pack_id))),
        ("status", json!(account.status)),
        ("location_id", json!(account.location_id.to_string())),
        ("reason", json!(account.reason)),
    ])
}

/// Parse `%name:value%name:value` into pairs.
fn parse_filters(raw: &str) -> Vec<(String, String)> {
    raw.split('%')
        .filter(|seg| !seg.is_empty())
        .filter_map(|seg| {
            let (name, value) = seg.split_once(':')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn limit_of(q: &HashMap<String, String>) -> Option<usize> {
    q.get("limit").and_then(|v| v.parse().ok())
}

async fn dispatch(State(db): State<Db>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let module = q.get("module").cloned().unwrap_or_default();
    debug!(%module, "mock request");

    {
        let store = db.read().await;
        match q.get("api_key") {
            None => return failure(MISSING_KEY),
            Some(key) if key.is_empty() => return failure(MISSING_KEY),
            Some(key) if *key != store.api_key => return failure(INVALID_KEY),
            Some(_) => {}
        }
    }

    match module.as_str() {
        "viewMyAccount" => view_my_account(&db).await,
        "getMessages" => get_messages(&db, &q).await,
        "viewMessage" => view_post(&db, &q, "message_id", true).await,
        "getNewsPosts" => get_news_posts(&db, &q).await,
        "viewNewsPost" => view_post(&db, &q, "news_id", false).await,
        "getAccounts" => get_accounts(&db, &q).await,
        "createAccount" => create_account(&db, &q).await,
        "viewAccount" => view_account(&db, &q).await,
        "modifyAccount" => modify_account(&db, &q).await,
        "changeAccountPassword" => change_password(&db, &q).await,
        "changeAccountPackage" => change_package(&db, &q).await,
        "suspendAccount" => set_status(&db, &q, "suspended").await,
        "unsuspendAccount" => set_status(&db, &q, "active").await,
        "terminateAccount" => terminate_account(&db, &q).await,
        "getLocations" => get_locations(&db).await,
        "getNetworkStatus" => get_network_status(&db).await,
        "getPackages" => get_packages(&db).await,
        "getMigrations" => get_migrations(&db).await,
        "addMigration" => add_migration(&db, &q).await,
        "fixPermissions" => fix_permissions(&db, &q).await,
        "checkFirewallBan" => check_firewall_ban(&db, &q).await,
        "removeFirewallBan" => remove_firewall_ban(&db, &q).await,
        _ => failure(INVALID_MODULE),
    }
}

async fn view_my_account(db: &Db) -> Json<Value> {
    let store = db.read().await;
    let mut out = reply(true, "");
    out.extend(row(&[
        ("username", json!("reseller")),
        ("email", json!("reseller@example.com")),
        ("accounts", json!(store.accounts.len().to_string())),
        ("credit", json!("25.00")),
    ]));
    Json(Value::Object(out))
}

fn post_rows(posts: &[Post], limit: Option<usize>) -> Vec<Value> {
    posts
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|p| Value::Object(row(&[("id", json!(p.id.to_string())), ("subject", json!(p.subject))])))
        .collect()
}

async fn get_messages(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    let mut out = reply(true, "<b>Messages</b> retrieved");
    out.insert("sql".to_string(), Value::Array(post_rows(&store.messages, limit_of(q))));
    Json(Value::Object(out))
}

async fn get_news_posts(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    let mut out = reply(true, "<b>News</b> retrieved");
    out.insert("sql".to_string(), Value::Array(post_rows(&store.news, limit_of(q))));
    Json(Value::Object(out))
}

async fn view_post(db: &Db, q: &HashMap<String, String>, key: &str, message: bool) -> Json<Value> {
    let store = db.read().await;
    let posts = if message { &store.messages } else { &store.news };
    let id = q.get(key).and_then(|v| v.parse::<u64>().ok());
    let Some(post) = id.and_then(|id| posts.iter().find(|p| p.id == id)) else {
        return failure(if message { "Message not found." } else { "News post not found." });
    };
    let mut out = reply(true, "");
    out.extend(row(&[
        ("id", json!(post.id.to_string())),
        ("subject", json!(post.subject)),
        ("body", json!(post.body)),
    ]));
    Json(Value::Object(out))
}

async fn get_accounts(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    let raw = q.get("filters").cloned().unwrap_or_default();
    let filters = parse_filters(&raw);

    let keep = |a: &Account| {
        filters.iter().all(|(name, value)| match name.as_str() {
            "search" => a.domain.contains(value.as_str()) || a.username.contains(value.as_str()),
            "status" => a.status == *value,
            "pack_id" => a.pack_id.to_string() == *value,
            _ => false,
        })
    };
    let rows: Vec<Value> = store
        .accounts
        .values()
        .filter(|a| keep(a))
        .map(|a| Value::Object(account_row(&store, a)))
        .collect();

    let filter_map: Map<String, Value> = filters.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
    let mut out = reply(true, &format!("<b>{}</b> accounts found", rows.len()));
    out.insert("filters".to_string(), Value::Object(filter_map));
    out.insert("filtersstr".to_string(), json!(raw));
    out.insert("sort".to_string(), json!("domain"));
    out.insert("sortstr".to_string(), json!("domain ASC"));
    out.insert("accounts".to_string(), json!(rows.len().to_string()));
    out.insert("sql".to_string(), Value::Array(rows));
    Json(Value::Object(out))
}

async fn create_account(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    let Some(domain) = q.get("domain").filter(|d| !d.is_empty()) else {
        return failure("<b>Error:</b> A domain is required.");
    };
    if store.accounts.values().any(|a| &a.domain == domain) {
        return failure("<b>Error:</b> Domain already exists.");
    }
    let Some(pack_id) = store.find_package(q) else {
        return failure("<b>Error:</b> Invalid package selected.");
    };
    let location_id = store.find_location(q).unwrap_or(1);
    let domain_id = store.next_id;
    store.next_id += 1;

    let username = q
        .get("username")
        .cloned()
        .unwrap_or_else(|| domain.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect());
    let account = Account {
        domain_id,
        domain: domain.clone(),
        username,
        email: q.get("email").cloned().unwrap_or_default(),
        pack_id,
        status: "active".to_string(),
        location_id,
        reason: String::new(),
    };
    store.accounts.insert(domain_id, account);

    let mut out = reply(true, &format!("Account <b>{domain}</b>  has been created."));
    out.insert("domain_id".to_string(), json!(domain_id.to_string()));
    Json(Value::Object(out))
}

async fn view_account(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    let Some(id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    let mut out = reply(true, "<i>Account</i> details");
    out.extend(account_row(&store, &store.accounts[&id]));
    Json(Value::Object(out))
}

async fn modify_account(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    let Some(id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    let pack_id = if q.contains_key("pack_id") || q.contains_key("package") {
        match store.find_package(q) {
            Some(pack_id) => Some(pack_id),
            None => return failure("<b>Error:</b> Invalid package selected."),
        }
    } else {
        None
    };
    if let Some(account) = store.accounts.get_mut(&id) {
        if let Some(pack_id) = pack_id {
            account.pack_id = pack_id;
        }
        if let Some(email) = q.get("email") {
            account.email = email.clone();
        }
        if let Some(username) = q.get("username") {
            account.username = username.clone();
        }
    }
    success("Account has been <b>modified</b>.")
}

async fn change_password(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    if store.find_account(q).is_none() {
        return failure("Domain not found.");
    }
    match q.get("password") {
        Some(p) if p.len() >= 6 => success("Password has been <b>changed</b>."),
        _ => failure("<b>Error:</b> Password is too short."),
    }
}

async fn change_package(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    let Some(id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    let Some(pack_id) = store.find_package(q) else {
        return failure("<b>Error:</b> Invalid package selected.");
    };
    if let Some(account) = store.accounts.get_mut(&id) {
        account.pack_id = pack_id;
    }
    success("Package has been <b>changed</b>.")
}

async fn set_status(db: &Db, q: &HashMap<String, String>, status: &str) -> Json<Value> {
    let mut store = db.write().await;
    let Some(id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    let reason = q.get("reason").cloned().unwrap_or_default();
    if let Some(account) = store.accounts.get_mut(&id) {
        account.status = status.to_string();
        account.reason = reason;
    }
    success(&format!("Account is now <b>{status}</b>."))
}

async fn terminate_account(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    let Some(id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    store.accounts.remove(&id);
    store.migrations.retain(|m| m.domain_id != id);
    success("Account has been <b>terminated</b>.")
}

async fn get_locations(db: &Db) -> Json<Value> {
    let store = db.read().await;
    let rows = store
        .locations
        .iter()
        .map(|l| Value::Object(row(&[("id", json!(l.id.to_string())), ("name", json!(l.name))])))
        .collect();
    let mut out = reply(true, "");
    out.insert("sql".to_string(), Value::Array(rows));
    Json(Value::Object(out))
}

async fn get_network_status(db: &Db) -> Json<Value> {
    let store = db.read().await;
    let rows = store
        .locations
        .iter()
        .map(|l| Value::Object(row(&[("location", json!(l.name)), ("status", json!("online"))])))
        .collect();
    let mut out = reply(true, "");
    out.insert("sql".to_string(), Value::Array(rows));
    Json(Value::Object(out))
}

async fn get_packages(db: &Db) -> Json<Value> {
    let store = db.read().await;
    let rows = store
        .packages
        .iter()
        .map(|p| Value::Object(row(&[("id", json!(p.id.to_string())), ("name", json!(p.name))])))
        .collect();
    let mut out = reply(true, "");
    out.insert("sql".to_string(), Value::Array(rows));
    Json(Value::Object(out))
}

/// Omits `sql` when there is nothing to list, as the upstream does.
async fn get_migrations(db: &Db) -> Json<Value> {
    let store = db.read().await;
    let mut out = reply(true, "");
    if !store.migrations.is_empty() {
        let rows = store
            .migrations
            .iter()
            .map(|m| {
                Value::Object(row(&[
                    ("id", json!(m.id.to_string())),
                    ("domain_id", json!(m.domain_id.to_string())),
                    ("location_id", json!(m.location_id.to_string())),
                ]))
            })
            .collect();
        out.insert("sql".to_string(), Value::Array(rows));
    }
    Json(Value::Object(out))
}

async fn add_migration(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    let Some(domain_id) = store.find_account(q) else {
        return failure("Domain not found.");
    };
    let Some(location_id) = store.find_location(q) else {
        return failure("<b>Error:</b> Invalid location selected.");
    };
    let id = store.migrations.len() as u64 + 1;
    store.migrations.push(Migration { id, domain_id, location_id });
    success("Migration has been <b>scheduled</b>.")
}

async fn fix_permissions(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    match store.find_account(q) {
        Some(_) => success("Permissions have been <b>fixed</b>."),
        None => failure("Domain not found."),
    }
}

async fn check_firewall_ban(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let store = db.read().await;
    if store.find_account(q).is_none() {
        return failure("Domain not found.");
    }
    let ip = q.get("ip").cloned().unwrap_or_default();
    let banned = store.bans.contains(&ip);
    let mut out = reply(true, &format!("IP <b>{ip}</b> is {}blocked.", if banned { "" } else { "not " }));
    out.insert("banned".to_string(), json!(if banned { "TRUE" } else { "FALSE" }));
    Json(Value::Object(out))
}

async fn remove_firewall_ban(db: &Db, q: &HashMap<String, String>) -> Json<Value> {
    let mut store = db.write().await;
    if store.find_account(q).is_none() {
        return failure("Domain not found.");
    }
    let ip = q.get("ip").cloned().unwrap_or_default();
    if store.bans.remove(&ip) {
        success(&format!("IP <b>{ip}</b> has been unblocked."))
    } else {
        failure(&format!("IP <b>{ip}</b> is not blocked."))
    }
}
