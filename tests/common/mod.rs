use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use reqwest::{Client, Response};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use firmgate::config::Config;
use firmgate::state::SharedState;

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub state: SharedState,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST the registration form and return the raw response.
    pub async fn post_register(&self, form: &[(&'static str, String)]) -> Response {
        self.client
            .post(self.url("/register"))
            .form(form)
            .send()
            .await
            .expect("register request failed")
    }

    /// GET a page, optionally with a Cookie header.
    pub async fn get_page(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header("cookie", cookie);
        }
        req.send().await.expect("get request failed")
    }

    /// Upsert a settings row directly in the test database.
    pub async fn set_setting(&self, key: &str, value: Value, kind: &str) {
        firmgate::db::settings::upsert(&self.pool, key, value, kind)
            .await
            .expect("failed to upsert setting");
    }

    pub async fn user_count(&self) -> i64 {
        firmgate::db::users::count_all(&self.pool)
            .await
            .expect("count users failed")
    }

    pub async fn company_count(&self) -> i64 {
        firmgate::db::companies::count_all(&self.pool)
            .await
            .expect("count companies failed")
    }
}

/// A complete valid registration form for the given email. Tests override
/// or drop entries with `set_field` / `remove_field`.
pub fn valid_form(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("first_name", "Jan".to_string()),
        ("last_name", "Kowalski".to_string()),
        ("company_name", "Kowalski Sp. z o.o.".to_string()),
        ("email", email.to_string()),
        ("password", "Str0ng!Pass1".to_string()),
        ("password_confirmation", "Str0ng!Pass1".to_string()),
        ("accept_privacy", "1".to_string()),
    ]
}

pub fn set_field(form: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if let Some(entry) = form.iter_mut().find(|(k, _)| *k == key) {
        entry.1 = value.to_string();
    } else {
        form.push((key, value.to_string()));
    }
}

pub fn remove_field(form: &mut Vec<(&'static str, String)>, key: &str) {
    form.retain(|(k, _)| *k != key);
}

/// Value of a cookie from the Set-Cookie response headers, if present.
pub fn cookie_value(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| {
            let rest = header.strip_prefix(&prefix)?;
            Some(rest.split(';').next().unwrap_or("").to_string())
        })
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

pub fn decode_flash(value: &str) -> firmgate::flash::FlashPayload {
    firmgate::flash::decode(value).expect("flash cookie did not decode")
}

/// In-memory log sink for asserting on tracing output.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
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

/// Subscriber that writes into the given capture; scope it over a future
/// with `WithSubscriber::with_subscriber`.
pub fn capture_subscriber(
    sink: LogCapture,
    max: tracing::Level,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(max)
        .finish()
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "firmgate_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 65_536,
        trusted_proxies: vec![],
        log_level: "warn".to_string(),
    };

    let (app, state) = firmgate::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        state,
        db_name,
    }
}

/// Drop stale test databases (useful after test crashes).
#[allow(dead_code)]
pub async fn cleanup_stale_test_dbs() {
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    if let Ok(admin_pool) = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
    {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT datname FROM pg_database WHERE datname LIKE 'firmgate_test_%'",
        )
        .fetch_all(&admin_pool)
        .await
        .unwrap_or_default();

        for db_name in rows {
            let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
                .execute(&admin_pool)
                .await;
        }
        admin_pool.close().await;
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
