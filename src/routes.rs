use axum::http::HeaderValue;
use axum::middleware;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::handlers;
use crate::middleware::require_auth;

/// Build the full application router.
pub fn app(pool: SqlitePool) -> Router {
    let protected = Router::new()
        .merge(account_routes())
        .merge(client_routes())
        .merge(vendor_routes())
        .merge(job_routes())
        .merge(invoice_routes())
        .merge(expense_routes())
        .merge(mileage_routes())
        .merge(receipt_routes())
        .layer(middleware::from_fn_with_state(pool.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn auth_routes() -> Router<SqlitePool> {
    use handlers::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/token", post(auth::token))
}

fn account_routes() -> Router<SqlitePool> {
    use handlers::account;

    Router::new()
        .route("/me/profile", get(account::get_profile).put(account::update_profile))
        .route("/business", get(account::get_business).put(account::update_business))
        .route("/users/me", delete(account::delete_me))
}

fn client_routes() -> Router<SqlitePool> {
    use handlers::clients;

    Router::new()
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/:id", axum::routing::put(clients::update).delete(clients::delete))
}

fn vendor_routes() -> Router<SqlitePool> {
    use handlers::vendors;

    Router::new()
        .route("/vendors", get(vendors::list).post(vendors::create))
        .route("/vendors/:id", axum::routing::put(vendors::update).delete(vendors::delete))
}

fn job_routes() -> Router<SqlitePool> {
    use handlers::jobs;

    Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/:id", axum::routing::put(jobs::update).delete(jobs::delete))
}

fn invoice_routes() -> Router<SqlitePool> {
    use handlers::invoices;

    Router::new()
        .route("/invoices", get(invoices::list).post(invoices::create))
        .route("/invoices/:id", axum::routing::put(invoices::update).delete(invoices::delete))
        .route("/invoices/:id/pdf", post(invoices::generate_pdf))
}

fn expense_routes() -> Router<SqlitePool> {
    use handlers::expenses;

    Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/:id", axum::routing::put(expenses::update).delete(expenses::delete))
}

fn mileage_routes() -> Router<SqlitePool> {
    use handlers::mileage;

    Router::new()
        .route("/mileage", get(mileage::list).post(mileage::create))
        .route("/mileage/:id", delete(mileage::delete))
}

fn receipt_routes() -> Router<SqlitePool> {
    use handlers::receipts;

    Router::new()
        .route("/receipts", get(receipts::list).post(receipts::create))
        .route("/receipts/presign", post(receipts::presign))
        .route("/receipts/:id", delete(receipts::delete))
}

/// CORS from configuration. A literal `*` keeps the permissive default;
/// anything else becomes an explicit origin allowlist.
fn cors_layer() -> CorsLayer {
    let origins = &config::config().cors_origins;

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> =
        origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}
