/// Common test utilities for integration tests
///
/// Shared infrastructure: database setup via migrations, per-test users
/// with JWT tokens, a built router, and a small request helper. Tests
/// require a running PostgreSQL pointed to by DATABASE_URL (plus a
/// JWT_SECRET of at least 32 characters).
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ladle_api::app::{build_router, AppState};
use ladle_api::config::Config;
use ladle_shared::auth::jwt::{create_token, Claims, TokenType};
use ladle_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db, &unique_email("test")).await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Issues an access token for an arbitrary user
    pub fn token_for(&self, user_id: Uuid) -> anyhow::Result<String> {
        let claims = Claims::new(user_id, TokenType::Access);
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Cleans up test data
    ///
    /// Deleting the user cascades to tags, ingredients, and recipes.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Generates a unique test email so parallel tests never collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

/// Creates a user directly through the model layer.
pub async fn create_test_user(db: &PgPool, email: &str) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: email.to_string(),
            // Not used by token-authenticated tests.
            password_hash: "test_hash".to_string(),
            name: Some("Test User".to_string()),
        },
    )
    .await?;

    Ok(user)
}

/// Sends a request through the router and returns status plus parsed body.
///
/// `token` of None sends an unauthenticated request. A 204 or otherwise
/// empty body parses as `Value::Null`.
pub async fn request(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Shorthand for an authenticated request as the context user.
pub async fn authed(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    request(ctx, method, uri, Some(&ctx.jwt_token), body).await
}
