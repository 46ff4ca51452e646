mod common;

use chrono::{Duration, Utc};
use common::{dec, decimal, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn admin_creates_transaction_with_vat_applied() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let due_on = Utc::now().date_naive() + Duration::days(30);

    let response = app
        .post_as_admin("/transactions", &json!({
            "payer_id": payer_id,
            "amount": "100.00",
            "vat_percentage": "20",
            "is_vat_inclusive": false,
            "due_on": due_on,
        }))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "outstanding");

    let transaction = &body["transaction"];
    assert_eq!(transaction["payer_id"], payer_id.to_string());
    assert_eq!(transaction["payer_name"], "Acme Ltd");
    assert_eq!(transaction["due_on"], due_on.format("%Y-%m-%d").to_string());
    assert_eq!(decimal(&transaction["total_due"]), dec("120"));
    assert_eq!(decimal(&transaction["total_paid"]), dec("0"));
    assert_eq!(decimal(&transaction["remaining"]), dec("120"));
    assert_eq!(transaction["payments"], json!([]));
}

#[tokio::test]
async fn vat_inclusive_amount_is_the_total() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let due_on = Utc::now().date_naive() + Duration::days(1);

    let transaction = app
        .create_transaction(payer_id, "100", "20", true, due_on)
        .await;

    assert_eq!(decimal(&transaction["total_due"]), dec("100"));
}

#[tokio::test]
async fn unknown_payer_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_as_admin("/transactions", &json!({
            "payer_id": Uuid::new_v4(),
            "amount": "10",
            "vat_percentage": "0",
            "is_vat_inclusive": false,
            "due_on": "2025-12-01",
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_amount_is_rejected() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;

    let response = app
        .post_as_admin("/transactions", &json!({
            "payer_id": payer_id,
            "amount": "-1",
            "vat_percentage": "20",
            "is_vat_inclusive": false,
            "due_on": "2025-12-01",
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_write() {
    let app = TestApp::spawn().await;
    let customer_id = app.create_customer("Acme Ltd").await;

    let response = app
        .as_customer(app.client.post(app.url("/transactions")), customer_id)
        .json(&json!({
            "payer_id": customer_id,
            "amount": "10",
            "vat_percentage": "0",
            "is_vat_inclusive": false,
            "due_on": "2025-12-01",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/transactions"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn payment_settles_transaction_even_when_past_due() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let today = Utc::now().date_naive();
    let transaction = app
        .create_transaction(payer_id, "100", "20", false, today - Duration::days(10))
        .await;
    let id = transaction["id"].as_str().unwrap();
    assert_eq!(transaction["status"], "overdue");

    let response = app.pay(id, "50", today).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "overdue");
    assert_eq!(decimal(&body["transaction"]["remaining"]), dec("70"));

    let response = app.pay(id, "70", today).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "paid");
    assert_eq!(decimal(&body["transaction"]["total_paid"]), dec("120"));
    assert_eq!(decimal(&body["transaction"]["remaining"]), dec("0"));
    assert_eq!(body["transaction"]["payments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn payment_on_missing_transaction_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .pay(&Uuid::new_v4().to_string(), "10", Utc::now().date_naive())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_payment_is_rejected() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let today = Utc::now().date_naive();
    let transaction = app
        .create_transaction(payer_id, "100", "0", false, today)
        .await;

    let response = app
        .pay(transaction["id"].as_str().unwrap(), "-5", today)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_only_see_their_own_transactions() {
    let app = TestApp::spawn().await;
    let acme = app.create_customer("Acme Ltd").await;
    let globex = app.create_customer("Globex").await;
    let today = Utc::now().date_naive();

    let acme_tx = app.create_transaction(acme, "10", "0", false, today).await;
    app.create_transaction(acme, "20", "0", false, today + Duration::days(5))
        .await;
    let globex_tx = app.create_transaction(globex, "30", "0", false, today).await;

    let response = app.get_as_customer("/transactions", acme).await;
    assert_eq!(response.status(), StatusCode::OK);
    let own: Vec<Value> = response.json().await.unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|t| t["payer_id"] == acme.to_string()));
    assert_eq!(decimal(&own[0]["amount"]), dec("20"));

    let response = app
        .get_as_customer(&format!("/transactions/{}", acme_tx["id"].as_str().unwrap()), acme)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get_as_customer(
            &format!("/transactions/{}", globex_tx["id"].as_str().unwrap()),
            acme,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_sees_every_transaction() {
    let app = TestApp::spawn().await;
    let acme = app.create_customer("Acme Ltd").await;
    let globex = app.create_customer("Globex").await;
    let today = Utc::now().date_naive();
    app.create_transaction(acme, "10", "0", false, today).await;
    app.create_transaction(globex, "30", "0", false, today).await;

    let response = app.get_as_admin("/transactions").await;
    let all: Vec<Value> = response.json().await.unwrap();

    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn missing_transaction_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .get_as_admin(&format!("/transactions/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_payments_are_all_recorded() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let today = Utc::now().date_naive();
    let transaction = app
        .create_transaction(payer_id, "1000", "0", false, today)
        .await;
    let id = transaction["id"].as_str().unwrap().to_string();

    let requests = (1..=20).map(|_| app.pay(&id, "1.50", today));
    let responses = futures::future::join_all(requests).await;
    assert!(responses.iter().all(|r| r.status() == StatusCode::OK));

    let response = app.get_as_admin(&format!("/transactions/{}", id)).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(decimal(&body["total_paid"]), dec("30"));
    assert_eq!(body["payments"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn amount_with_sub_cent_precision_is_rejected() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;

    let response = app
        .post_as_admin("/transactions", &json!({
            "payer_id": payer_id,
            "amount": "10.005",
            "vat_percentage": "20",
            "is_vat_inclusive": false,
            "due_on": "2025-12-01",
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let list: Vec<Value> = app.get_as_admin("/transactions").await.json().await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn sub_cent_payment_is_rejected() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let today = Utc::now().date_naive();
    let transaction = app
        .create_transaction(payer_id, "100", "0", false, today)
        .await;
    let id = transaction["id"].as_str().unwrap();

    let response = app.pay(id, "0.004", today).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = app
        .get_as_admin(&format!("/transactions/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["payments"], json!([]));
}

#[tokio::test]
async fn malformed_body_gets_json_bad_request() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;

    let response = app
        .post_as_admin("/transactions", &json!({
            "payer_id": payer_id,
            "amount": "10",
            "vat_percentage": "20",
            "is_vat_inclusive": false,
            "due_on": "not-a-date",
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_payment_date_gets_json_bad_request() {
    let app = TestApp::spawn().await;
    let payer_id = app.create_customer("Acme Ltd").await;
    let today = Utc::now().date_naive();
    let transaction = app
        .create_transaction(payer_id, "100", "0", false, today)
        .await;

    let response = app
        .post_as_admin(
            &format!("/transactions/{}/payments", transaction["id"].as_str().unwrap()),
            &json!({ "amount": "10", "paid_on": "2025-13-45" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert!(body["error"].is_string());
}
