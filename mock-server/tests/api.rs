use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, DEFAULT_API_KEY, INVALID_KEY, INVALID_MODULE, MISSING_KEY, SEEDED_BAN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn api_request(query: &str) -> Request<String> {
    Request::builder()
        .uri(format!("/api/?{query}"))
        .body(String::new())
        .unwrap()
}

fn keyed(query: &str) -> Request<String> {
    api_request(&format!("{query}&api_key={DEFAULT_API_KEY}"))
}

/// Send a sequence of requests to one app instance, returning each reply.
async fn replay(requests: Vec<Request<String>>) -> Vec<Value> {
    use tower::Service;

    let mut app = app(DEFAULT_API_KEY).into_service();
    let mut replies = Vec::new();
    for request in requests {
        let resp = ServiceExt::ready(&mut app).await.unwrap().call(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        replies.push(body_json(resp).await);
    }
    replies
}

// --- credentials & modules ---

#[tokio::test]
async fn missing_key_is_reported() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(api_request("module=getPackages"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], MISSING_KEY);
    assert_eq!(body["success"], "FALSE");
}

#[tokio::test]
async fn wrong_key_is_reported() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(api_request("module=getPackages&api_key=nope"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"], INVALID_KEY);
}

#[tokio::test]
async fn unknown_module_is_reported() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(keyed("module=launchRockets"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"], INVALID_MODULE);
}

#[tokio::test]
async fn route_without_trailing_slash() {
    let request = Request::builder()
        .uri(format!("/api?module=getLocations&api_key={DEFAULT_API_KEY}"))
        .body(String::new())
        .unwrap();
    let resp = app(DEFAULT_API_KEY).oneshot(request).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["success"], "TRUE");
    assert_eq!(body["sql"].as_array().unwrap().len(), 2);
}

// --- catalogue ---

#[tokio::test]
async fn packages_rows_have_numeric_duplicates() {
    let resp = app(DEFAULT_API_KEY).oneshot(keyed("module=getPackages")).await.unwrap();
    let body = body_json(resp).await;
    let first = &body["sql"][0];
    assert_eq!(first["name"], "Starter");
    assert_eq!(first["1"], "Starter");
}

#[tokio::test]
async fn migrations_omit_sql_when_empty() {
    let resp = app(DEFAULT_API_KEY).oneshot(keyed("module=getMigrations")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["success"], "TRUE");
    assert!(body.get("sql").is_none());
}

#[tokio::test]
async fn news_respects_limit() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(keyed("module=getNewsPosts&limit=2"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["sql"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn view_message_not_found() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(keyed("module=viewMessage&message_id=99"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["success"], "FALSE");
}

// --- account lifecycle ---

#[tokio::test]
async fn account_lifecycle() {
    let replies = replay(vec![
        keyed("module=createAccount&domain=shop.example&pack_id=1&email=a%40shop.example"),
        keyed("module=createAccount&domain=shop.example&pack_id=1"),
        keyed("module=viewAccount&domain=shop.example"),
        keyed("module=suspendAccount&domain_id=1&reason=abuse"),
        keyed("module=getAccounts&filters=%25status%3Asuspended"),
        keyed("module=changeAccountPackage&domain_id=1&package=Business"),
        keyed("module=viewAccount&domain_id=1"),
        keyed("module=addMigration&domain_id=1&location=Amsterdam"),
        keyed("module=getMigrations"),
        keyed("module=terminateAccount&domain=shop.example"),
        keyed("module=viewAccount&domain_id=1"),
    ])
    .await;

    assert_eq!(replies[0]["success"], "TRUE");
    assert_eq!(replies[0]["domain_id"], "1");
    assert_eq!(replies[1]["success"], "FALSE");

    assert_eq!(replies[2]["domain"], "shop.example");
    assert_eq!(replies[2]["0"], "1");
    assert_eq!(replies[2]["email"], "a@shop.example");

    assert_eq!(replies[3]["success"], "TRUE");

    assert_eq!(replies[4]["accounts"], "1");
    assert_eq!(replies[4]["filtersstr"], "%status:suspended");
    assert_eq!(replies[4]["sql"][0]["reason"], "abuse");

    assert_eq!(replies[5]["success"], "TRUE");
    assert_eq!(replies[6]["package"], "Business");

    assert_eq!(replies[7]["success"], "TRUE");
    assert_eq!(replies[8]["sql"][0]["location_id"], "2");

    assert_eq!(replies[9]["success"], "TRUE");
    assert_eq!(replies[10]["success"], "FALSE");
}

#[tokio::test]
async fn firewall_ban_check_and_removal() {
    let replies = replay(vec![
        keyed("module=createAccount&domain=fw.example&package=Starter"),
        keyed(&format!("module=checkFirewallBan&domain=fw.example&ip={SEEDED_BAN}")),
        keyed(&format!("module=removeFirewallBan&domain=fw.example&ip={SEEDED_BAN}")),
        keyed(&format!("module=checkFirewallBan&domain=fw.example&ip={SEEDED_BAN}")),
        keyed(&format!("module=removeFirewallBan&domain=fw.example&ip={SEEDED_BAN}")),
    ])
    .await;

    assert_eq!(replies[1]["banned"], "TRUE");
    assert_eq!(replies[2]["success"], "TRUE");
    assert_eq!(replies[3]["banned"], "FALSE");
    assert_eq!(replies[4]["success"], "FALSE");
}
