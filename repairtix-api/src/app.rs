/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/                    # register, login, refresh (public)
///     ├── /invitations/accept       # invitation acceptance (public)
///     └── <everything else>         # bearer-token protected
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Request logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (protected routes only)

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use repairtix_shared::{auth::middleware::jwt_auth_middleware, crypto::CredentialCipher};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; cheap because the
/// config and cipher sit behind `Arc`/`Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Cipher for integration credentials
    pub cipher: CredentialCipher,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Fails when the credential key is not a valid 32-byte hex string.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let cipher = CredentialCipher::from_hex_key(&config.credential_key)
            .map_err(|e| anyhow::anyhow!("Invalid CREDENTIAL_KEY: {}", e))?;

        Ok(Self {
            db,
            config: Arc::new(config),
            cipher,
        })
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let public_invitation_routes =
        Router::new().route("/accept", post(routes::users::accept_invitation));

    // Protected routes, one router per resource
    let company_routes = Router::new()
        .route("/", get(routes::company::get_company))
        .route("/", put(routes::company::update_company));

    let location_routes = Router::new()
        .route("/", post(routes::company::create_location))
        .route("/", get(routes::company::list_locations))
        .route("/:id", get(routes::company::get_location))
        .route("/:id", put(routes::company::update_location))
        .route("/:id", delete(routes::company::delete_location));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id/role", put(routes::users::set_user_role))
        .route("/:id", delete(routes::users::deactivate_user));

    let invitation_routes = Router::new()
        .route("/", post(routes::users::create_invitation))
        .route("/", get(routes::users::list_invitations))
        .route("/:id/revoke", post(routes::users::revoke_invitation));

    let customer_routes = Router::new()
        .route("/", post(routes::customers::create_customer))
        .route("/", get(routes::customers::list_customers))
        .route("/search", get(routes::customers::search_customers))
        .route("/:id", get(routes::customers::get_customer))
        .route("/:id", put(routes::customers::update_customer))
        .route("/:id", delete(routes::customers::delete_customer))
        .route("/:id/assets", get(routes::assets::list_customer_assets));

    let asset_routes = Router::new()
        .route("/", post(routes::assets::create_asset))
        .route("/", get(routes::assets::list_assets))
        .route("/:id", get(routes::assets::get_asset))
        .route("/:id", put(routes::assets::update_asset))
        .route("/:id", delete(routes::assets::delete_asset));

    let ticket_routes = Router::new()
        .route("/", post(routes::tickets::create_ticket))
        .route("/", get(routes::tickets::list_tickets))
        .route("/:id", get(routes::tickets::get_ticket))
        .route("/:id", put(routes::tickets::update_ticket))
        .route("/:id", delete(routes::tickets::delete_ticket))
        .route("/:id/status", put(routes::tickets::set_ticket_status))
        .route("/:id/assign", put(routes::tickets::assign_ticket));

    let catalog_routes = Router::new()
        .route("/brands", post(routes::catalog::create_brand))
        .route("/brands", get(routes::catalog::list_brands))
        .route("/brands/:id", delete(routes::catalog::delete_brand))
        .route("/brands/:id/models", post(routes::catalog::create_model))
        .route("/brands/:id/models", get(routes::catalog::list_models))
        .route("/models/:id", delete(routes::catalog::delete_model))
        .route("/categories", post(routes::catalog::create_category))
        .route("/categories", get(routes::catalog::list_categories))
        .route("/categories/:id", delete(routes::catalog::delete_category))
        .route(
            "/categories/:id/subcategories",
            post(routes::catalog::create_subcategory),
        )
        .route(
            "/categories/:id/subcategories",
            get(routes::catalog::list_subcategories),
        )
        .route(
            "/subcategories/:id",
            delete(routes::catalog::delete_subcategory),
        );

    let inventory_routes = Router::new()
        .route("/", post(routes::inventory::create_item))
        .route("/", get(routes::inventory::list_items))
        .route("/low-stock", get(routes::inventory::list_low_stock))
        .route("/:id", get(routes::inventory::get_item))
        .route("/:id", put(routes::inventory::update_item))
        .route("/:id", delete(routes::inventory::delete_item))
        .route("/:id/adjust", post(routes::inventory::adjust_quantity));

    let purchase_order_routes = Router::new()
        .route("/", post(routes::purchase_orders::create_purchase_order))
        .route("/", get(routes::purchase_orders::list_purchase_orders))
        .route("/:id", get(routes::purchase_orders::get_purchase_order))
        .route("/:id/order", post(routes::purchase_orders::mark_ordered))
        .route("/:id/receive", post(routes::purchase_orders::receive))
        .route("/:id/cancel", post(routes::purchase_orders::cancel))
        .route("/:id", delete(routes::purchase_orders::delete_purchase_order));

    let invoice_routes = Router::new()
        .route("/", post(routes::invoices::create_invoice))
        .route("/", get(routes::invoices::list_invoices))
        .route("/:id", get(routes::invoices::get_invoice))
        .route("/:id/send", post(routes::invoices::send_invoice))
        .route("/:id/void", post(routes::invoices::void_invoice))
        .route("/:id", delete(routes::invoices::delete_invoice))
        .route("/:id/payments", get(routes::payments::list_invoice_payments));

    let payment_routes = Router::new()
        .route("/", post(routes::payments::record_payment))
        .route("/", get(routes::payments::list_payments));

    let subscription_routes = Router::new()
        .route("/", post(routes::billing::create_subscription))
        .route("/", get(routes::billing::list_subscriptions))
        .route("/:id/plan", put(routes::billing::change_plan))
        .route("/:id/cancel", post(routes::billing::cancel_subscription));

    let integration_routes = Router::new()
        .route("/", get(routes::integrations::list_integrations))
        .route("/:provider", put(routes::integrations::upsert_integration))
        .route(
            "/:provider",
            delete(routes::integrations::delete_integration),
        );

    let protected = Router::new()
        .nest("/company", company_routes)
        .nest("/locations", location_routes)
        .nest("/users", user_routes)
        .nest("/invitations", invitation_routes)
        .nest("/customers", customer_routes)
        .nest("/assets", asset_routes)
        .nest("/tickets", ticket_routes)
        .nest("/catalog", catalog_routes)
        .nest("/inventory", inventory_routes)
        .nest("/purchase-orders", purchase_order_routes)
        .nest("/invoices", invoice_routes)
        .nest("/payments", payment_routes)
        .nest("/subscriptions", subscription_routes)
        .nest("/integrations", integration_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/invitations", public_invitation_routes)
        .merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(middleware::from_fn(move |req, next| {
            crate::middleware::security::security_headers(production, req, next)
        }))
        .with_state(state)
}

/// Authentication middleware layer
///
/// Delegates to the shared JWT middleware with this server's pool and
/// secret.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match jwt_auth_middleware(
        state.db.clone(),
        state.config.jwt.secret.clone(),
        req,
        next,
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
