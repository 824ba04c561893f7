use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use staybook::{
    api::{self, SharedState, extract::LOGGEDIN_USER_HEADER},
    memory::InMemoryStore,
    notify::Target,
    prelude::*,
    server::app_state,
};

const HOST: &str = r#"{"_id":"h1","fullname":"Hana Host"}"#;
const BUYER: &str = r#"{"_id":"b1","fullname":"Ben Buyer"}"#;

fn setup() -> (SharedState, Router) {
    let state = app_state(Arc::new(DocumentStore::new(InMemoryStore::new())), 16);
    let router = api::router(Arc::clone(&state));
    (state, router)
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(user) = user {
        builder = builder.header(LOGGEDIN_USER_HEADER, user);
    }

    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

    (status, body)
}

fn stay_body(name: &str, city: &str, capacity: u32) -> Value {
    json!({
        "name": name,
        "type": "Apartment",
        "loc": { "country": "Portugal", "city": city },
        "capacity": capacity,
        "price": 80,
    })
}

#[tokio::test]
async fn order_lifecycle() {
    let (state, router) = setup();
    let mut events = state.push.subscribe();

    let (status, order) = send(
        &router,
        request("POST", "/api/order", Some(BUYER), Some(json!({ "hostId": "h1", "totalPrice": 250 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["buyer"]["_id"], "b1");
    assert!(order["createdAt"].as_i64().unwrap() > 0);

    let added = events.recv().await.unwrap();
    assert_eq!(added.kind, "order-added");
    assert_eq!(added.target, Target::User("h1".into()));

    let id = order["_id"].as_str().unwrap().to_string();

    let (status, orders) = send(&router, request("GET", "/api/order?hostId=h1&buyerId=", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, orders) = send(&router, request("GET", "/api/order?hostId=h2", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(orders.as_array().unwrap().is_empty());

    let (status, msg) = send(
        &router,
        request("POST", &format!("/api/order/{id}/msg"), Some(HOST), Some(json!({ "txt": "welcome" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["by"]["_id"], "h1");

    let msg_id = msg["id"].as_str().unwrap();
    let (status, removed) =
        send(&router, request("DELETE", &format!("/api/order/{id}/msg/{msg_id}"), Some(HOST), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, msg_id);

    let (status, removed) = send(&router, request("DELETE", &format!("/api/order/{id}"), Some(HOST), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, id.as_str());

    let removed_event = events.recv().await.unwrap();
    assert_eq!(removed_event.kind, "order-removed");
    assert_eq!(removed_event.target, Target::Everyone { except: Some("h1".into()) });

    let (status, _) = send(&router, request("GET", &format!("/api/order/{id}"), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_order_notifies_buyer() {
    let (state, router) = setup();

    let (_, order) = send(
        &router,
        request("POST", "/api/order", Some(BUYER), Some(json!({ "hostId": "h1", "totalPrice": 250 }))),
    )
    .await;

    let mut events = state.push.subscribe();
    let (status, updated) = send(
        &router,
        request(
            "PUT",
            "/api/order",
            None,
            Some(json!({ "_id": order["_id"], "buyer": order["buyer"], "totalPrice": 300 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["totalPrice"], 300.0);

    let event = events.recv().await.unwrap();
    assert_eq!(event.kind, "order-updated");
    assert_eq!(event.target, Target::User("b1".into()));

    let (_, stored) = send(&router, request("GET", &format!("/api/order/{}", order["_id"].as_str().unwrap()), None, None)).await;
    assert_eq!(stored["totalPrice"], 300.0);
    assert_eq!(stored["createdAt"], order["createdAt"]);
}

#[tokio::test]
async fn stay_listing_filters() {
    let (_, router) = setup();

    for (name, city, capacity) in [("loft", "Porto", 2), ("flat", "Lisbon", 5)] {
        let (status, _) =
            send(&router, request("POST", "/api/stay", Some(HOST), Some(stay_body(name, city, capacity)))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = send(&router, request("GET", "/api/stay?txt=&label=", None, None)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["vendor"], "h1");

    let (_, porto) = send(&router, request("GET", "/api/stay?txt=PORTO", None, None)).await;
    assert_eq!(porto.as_array().unwrap().len(), 1);
    assert_eq!(porto[0]["name"], "loft");

    let (_, roomy) = send(&router, request("GET", "/api/stay?guests=3&pageIdx=0", None, None)).await;
    assert_eq!(roomy.as_array().unwrap().len(), 1);
    assert_eq!(roomy[0]["name"], "flat");

    let flat_id = all[1]["_id"].as_str().unwrap();
    let (_, wished) = send(&router, request("GET", &format!("/api/stay?userWishlist={flat_id}"), None, None)).await;
    assert_eq!(wished.as_array().unwrap().len(), 1);
    assert_eq!(wished[0]["_id"], flat_id);

    let (_, later) = send(&router, request("GET", "/api/stay?pageIdx=1", None, None)).await;
    assert!(later.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stay_update_touches_price_and_vendor_only() {
    let (_, router) = setup();

    let (_, stay) = send(&router, request("POST", "/api/stay", Some(HOST), Some(stay_body("loft", "Porto", 2)))).await;
    let id = stay["_id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        request(
            "PUT",
            "/api/stay",
            Some(HOST),
            Some(json!({ "_id": id, "price": 200, "vendor": "v2", "name": "renamed" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, stored) = send(&router, request("GET", &format!("/api/stay/{id}"), None, None)).await;
    assert_eq!(stored["price"], 200.0);
    assert_eq!(stored["vendor"], "v2");
    assert_eq!(stored["name"], "loft");
}

#[tokio::test]
async fn failures_use_error_envelope() {
    let (_, router) = setup();

    let (status, body) = send(&router, request("GET", "/api/stay?userWishlist=nope", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "err": "Failed to get stays" }));

    let (status, body) = send(&router, request("GET", "/api/order/not-an-id", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "err": "Failed to get order" }));

    let (status, body) = send(
        &router,
        request("PUT", "/api/stay", Some(HOST), Some(json!({ "price": 10 }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "err": "Failed to update stay" }));

    let (status, body) = send(&router, request("GET", "/api/stay?guests=lots", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "err": "Malformed request" }));
}

#[tokio::test]
async fn missing_user_is_unauthorized() {
    let (_, router) = setup();

    let (status, body) = send(&router, request("POST", "/api/order", None, Some(json!({ "hostId": "h1" })))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["err"].is_string());

    let (status, _) = send(
        &router,
        request("POST", "/api/stay", Some("not json"), Some(stay_body("loft", "Porto", 2))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_stay_is_not_found() {
    let (_, router) = setup();

    let (status, body) = send(&router, request("GET", &format!("/api/stay/{}", EntityId::new()), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "err": "Unknown stay" }));
}
