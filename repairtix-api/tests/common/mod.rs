/// Common test utilities for integration tests
///
/// Shared infrastructure for the API tests:
/// - Database setup and per-test tenant creation
/// - JWT token generation
/// - Request helpers for driving the router with `tower::Service`
///
/// Tests expect `DATABASE_URL`, `JWT_SECRET`, and `CREDENTIAL_KEY` in the
/// environment (a `.env` file works).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use repairtix_api::app::{build_router, AppState};
use repairtix_api::config::Config;
use repairtix_shared::auth::jwt::{create_token, Claims, TokenType};
use repairtix_shared::auth::permissions::UserRole;
use repairtix_shared::crypto::CredentialCipher;
use repairtix_shared::models::company::{Company, CreateCompany};
use repairtix_shared::models::location::{CreateLocation, Location};
use repairtix_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub cipher: CredentialCipher,
    pub company: Company,
    pub location: Location,
    pub user: User,
    pub jwt_token: String,
}

/// A second tenant for isolation tests
pub struct OtherTenant {
    pub company: Company,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh company and owner
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../repairtix-shared/migrations").run(&db).await?;

        let cipher = CredentialCipher::from_hex_key(&config.credential_key)?;

        let (company, location, user, jwt_token) =
            create_tenant(&db, &config, "Test Shop").await?;

        let state = AppState::new(db.clone(), config.clone())?;
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            cipher,
            company,
            location,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second, unrelated tenant for isolation tests
    pub async fn other_tenant(&self) -> anyhow::Result<OtherTenant> {
        let (company, _location, user, jwt_token) =
            create_tenant(&self.db, &self.config, "Other Shop").await?;

        Ok(OtherTenant {
            company,
            user,
            jwt_token,
        })
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        delete_company(&self.db, self.company.id).await
    }

    /// Cleans up a second tenant
    pub async fn cleanup_other(&self, other: &OtherTenant) -> anyhow::Result<()> {
        delete_company(&self.db, other.company.id).await
    }
}

/// Creates a company with one location and an owner, returning a token
async fn create_tenant(
    db: &PgPool,
    config: &Config,
    name_prefix: &str,
) -> anyhow::Result<(Company, Location, User, String)> {
    let company = Company::create(
        db,
        CreateCompany {
            name: format!("{} {}", name_prefix, Uuid::new_v4()),
            email: Some(format!("shop-{}@example.com", Uuid::new_v4())),
            phone: None,
        },
    )
    .await?;

    let location = Location::create(
        db,
        company.id,
        CreateLocation {
            name: "Main".to_string(),
            address: None,
            phone: None,
        },
    )
    .await?;

    let user = User::create(
        db,
        CreateUser {
            company_id: company.id,
            email: format!("owner-{}@example.com", Uuid::new_v4()),
            password_hash: "test_hash".to_string(), // Not used in tests
            full_name: Some("Test Owner".to_string()),
            role: UserRole::Owner,
        },
    )
    .await?;

    let claims = Claims::new(user.id, company.id, TokenType::Access);
    let jwt_token = create_token(&claims, &config.jwt.secret)?;

    Ok((company, location, user, jwt_token))
}

/// Hard-deletes a company; cascades clean up everything tenant-scoped
async fn delete_company(db: &PgPool, company_id: Uuid) -> anyhow::Result<()> {
    // purchase_order_items.inventory_item_id is a NO ACTION FK, so the
    // company-level cascade can try to remove an inventory item while a
    // purchase-order line still references it. Clear purchase orders first
    // (their items cascade) so the inventory_items cascade has nothing left
    // pointing at it.
    sqlx::query("DELETE FROM purchase_orders WHERE company_id = $1")
        .bind(company_id)
        .execute(db)
        .await?;
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Sends a JSON request and returns (status, parsed body)
pub async fn request_json(
    app: &mut axum::Router,
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
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
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

/// Creates a customer through the API, returning its id
pub async fn create_test_customer(ctx: &mut TestContext, token: &str) -> Uuid {
    let (status, body) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/customers",
        Some(token),
        Some(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": format!("ada-{}@example.com", Uuid::new_v4()),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "customer create failed: {}", body);
    body["id"].as_str().unwrap().parse().unwrap()
}
