//! Test helpers: an application over a fresh SQLite file and a small
//! cookie-aware request builder.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use dgas::config::{
    AdminConfig, Config, DatabaseConfig, JwtConfig, ObservabilityConfig, RootConfig,
    ServerConfig, SubscriptionConfig,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use temp_dir::TempDir;
use tower::ServiceExt;

pub const ADMIN_CODE: &str = "let-me-in";
pub const ROOT_EMAIL: &str = "root@dgas.localhost";
pub const ROOT_PASSWORD: &str = "root_password";
pub const PASSWORD: &str = "my_password";

pub struct TestApp {
    pub router: Router,
    pub state: dgas::AppState,
    _dir: TempDir,
}

pub fn test_config(url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            request_timeout: 30,
        },
        database: DatabaseConfig {
            url,
            max_connections: 4,
        },
        jwt: JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            issuer: "dgas".to_owned(),
            audience: "dgas".to_owned(),
            expiration_days: 7,
        },
        root: RootConfig {
            email: ROOT_EMAIL.to_owned(),
            password: ROOT_PASSWORD.to_owned(),
        },
        admin: AdminConfig {
            signup_code: ADMIN_CODE.to_owned(),
        },
        subscription: SubscriptionConfig {
            default_barrels: 1,
            validity_days: 30,
        },
        observability: ObservabilityConfig::default(),
    }
}

/// Application backed by a migrated database with the root admin seeded.
/// New customers start with one barrel.
pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let url = format!("sqlite:{}", path.to_str().unwrap());

    let pool = dgas::create_pool(&url, 4).await?;
    dgas::run_migrations(&pool).await?;

    let state = dgas::AppState::new(test_config(url), dgas_shared::State::single(pool));
    state.identity.seed_root(ROOT_EMAIL, ROOT_PASSWORD).await?;

    Ok(TestApp {
        router: dgas::create_app(state.clone()),
        state,
        _dir: dir,
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookies: Vec<String>,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` of a cookie set by the response. An empty value means
    /// the cookie was cleared.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .iter()
            .find(|cookie| cookie.starts_with(&format!("{name}=")))
            .cloned()
    }

    pub fn cleared(&self, name: &str) -> bool {
        self.cookie(name).is_some_and(|cookie| cookie == format!("{name}="))
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookies: &[&str],
        body: Option<Value>,
    ) -> anyhow::Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);

        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;

        read(response).await
    }

    pub async fn get(&self, uri: &str, cookies: &[&str]) -> anyhow::Result<TestResponse> {
        self.send(Method::GET, uri, cookies, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        cookies: &[&str],
        body: Value,
    ) -> anyhow::Result<TestResponse> {
        self.send(Method::POST, uri, cookies, Some(body)).await
    }

    /// Logs in through `portal` ("", "/delivery" or "/admin") and returns
    /// the session cookie.
    pub async fn login(&self, portal: &str, email: &str, password: &str) -> anyhow::Result<String> {
        let response = self
            .post(
                &format!("{portal}/login"),
                &[],
                json!({ "email": email, "password": password }),
            )
            .await?;

        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        response
            .cookie("auth_token")
            .ok_or_else(|| anyhow::anyhow!("login did not set a session cookie"))
    }

    /// Signs a customer up, saves an address when given and returns the
    /// account id with its session cookie.
    pub async fn customer(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> anyhow::Result<(String, String)> {
        let email = format!("{name}@dgas.localhost");
        let response = self
            .post(
                "/signup",
                &[],
                json!({ "email": email, "password": PASSWORD, "full_name": name }),
            )
            .await?;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let id = response.body["id"].as_str().unwrap_or_default().to_owned();
        let cookie = self.login("", &email, PASSWORD).await?;

        if let Some(address) = address {
            let response = self
                .post(
                    "/profile",
                    &[&cookie],
                    json!({ "full_name": name, "address": address }),
                )
                .await?;
            assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        }

        Ok((id, cookie))
    }

    pub async fn delivery_partner(&self, name: &str) -> anyhow::Result<String> {
        let email = format!("{name}@dgas.localhost");
        let response = self
            .post(
                "/delivery/signup",
                &[],
                json!({ "email": email, "password": PASSWORD, "full_name": name }),
            )
            .await?;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        self.login("/delivery", &email, PASSWORD).await
    }

    pub async fn root_admin(&self) -> anyhow::Result<String> {
        self.login("/admin", ROOT_EMAIL, ROOT_PASSWORD).await
    }

    /// Stores a draft then pays for it, returning the payment response.
    pub async fn book(
        &self,
        cookie: &str,
        cylinder_type: &str,
        delivery_slot: &str,
        payment: Value,
    ) -> anyhow::Result<TestResponse> {
        let draft = self
            .post(
                "/booking",
                &[cookie],
                json!({
                    "cylinder_type": cylinder_type,
                    "delivery_date": tomorrow(),
                    "delivery_slot": delivery_slot,
                }),
            )
            .await?;
        assert_eq!(draft.status, StatusCode::OK, "{}", draft.body);

        let draft_cookie = draft
            .cookie("booking_draft")
            .ok_or_else(|| anyhow::anyhow!("booking did not set a draft cookie"))?;

        self.post("/payment", &[cookie, &draft_cookie], payment).await
    }
}

async fn read(response: Response<Body>) -> anyhow::Result<TestResponse> {
    let status = response.status();
    let cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::to_owned)
        .collect();

    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok(TestResponse {
        status,
        cookies,
        body,
    })
}

pub fn tomorrow() -> String {
    (time::OffsetDateTime::now_utc().date() + time::Duration::days(1)).to_string()
}
