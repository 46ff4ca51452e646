#![allow(dead_code)]

use chrono::NaiveDate;
use receivables_service::config::{DatabaseConfig, ReceivablesConfig};
use receivables_service::services::{InMemoryStore, TransactionStore};
use receivables_service::startup::Application;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::config::Config;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

pub fn test_config(database_url: &str) -> ReceivablesConfig {
    ReceivablesConfig {
        common: Config { port: 0 },
        service_name: "receivables-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
            min_connections: 1,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: Client,
    pub admin_id: Uuid,
}

impl TestApp {
    /// Run the real router on a random port against an in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn TransactionStore>) -> Self {
        let app = Application::build_with_store(test_config("postgres://unused"), store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        let test_app = TestApp {
            address,
            port,
            client,
            admin_id: Uuid::new_v4(),
        };
        let response = test_app
            .post_as_admin("/users", &json!({
                "user_id": test_app.admin_id,
                "name": "Back Office",
                "role": "admin",
            }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        test_app
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(USER_ID_HEADER, self.admin_id.to_string())
            .header(USER_ROLE_HEADER, "admin")
    }

    pub fn as_customer(&self, request: RequestBuilder, customer_id: Uuid) -> RequestBuilder {
        request
            .header(USER_ID_HEADER, customer_id.to_string())
            .header(USER_ROLE_HEADER, "customer")
    }

    pub async fn post_as_admin(&self, path: &str, body: &Value) -> Response {
        self.as_admin(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_as_admin(&self, path: &str) -> Response {
        self.as_admin(self.client.get(self.url(path)))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_as_customer(&self, path: &str, customer_id: Uuid) -> Response {
        self.as_customer(self.client.get(self.url(path)), customer_id)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a customer and return their id.
    pub async fn create_customer(&self, name: &str) -> Uuid {
        let customer_id = Uuid::new_v4();
        let response = self
            .post_as_admin("/users", &json!({
                "user_id": customer_id,
                "name": name,
                "role": "customer",
            }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        customer_id
    }

    /// Open a transaction and return the created view.
    pub async fn create_transaction(
        &self,
        payer_id: Uuid,
        amount: &str,
        vat_percentage: &str,
        is_vat_inclusive: bool,
        due_on: NaiveDate,
    ) -> Value {
        let response = self
            .post_as_admin("/transactions", &json!({
                "payer_id": payer_id,
                "amount": amount,
                "vat_percentage": vat_percentage,
                "is_vat_inclusive": is_vat_inclusive,
                "due_on": due_on,
            }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["transaction"].clone()
    }

    pub async fn pay(&self, transaction_id: &str, amount: &str, paid_on: NaiveDate) -> Response {
        self.post_as_admin(
            &format!("/transactions/{}/payments", transaction_id),
            &json!({ "amount": amount, "paid_on": paid_on }),
        )
        .await
    }
}

/// Numeric value of a decimal serialized as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    let raw = value.as_str().expect("decimal should serialize as a string");
    Decimal::from_str(raw).expect("invalid decimal")
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("invalid decimal")
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's events into a [`LogCapture`] until the guard drops.
///
/// Only sees events polled on the calling thread, which holds for the
/// default single-threaded `#[tokio::test]` runtime.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
