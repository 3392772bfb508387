use super::{auth, customer, error::ApiError, notes, AppState};
use axum::{
    http::Uri,
    middleware,
    routing::{get, patch, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub(super) fn setup(app_state: AppState) -> Router {
    let v1 = Router::new()
        .route("/customer/all", get(customer::all::get))
        .route("/customer/byId/{id}", get(customer::by_id::get))
        .route(
            "/customer/filterBy/{filter}/sortBy/{sort}",
            get(customer::filtered::get),
        )
        .route(
            "/customer/sortBy/{sort}/filterBy/{filter}",
            get(customer::filtered::get),
        )
        .route("/customer/filterBy/{filter}", get(customer::filtered::get))
        .route("/customer/sortBy/{sort}", get(customer::filtered::get))
        .route("/customer", patch(customer::status::patch))
        .route("/notes/byId/{id}", get(notes::by_id::get))
        .route("/notes/byCustomer/{id}", get(notes::by_customer::get))
        .route(
            "/notes",
            put(notes::put).patch(notes::patch).delete(notes::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_bearer_token,
        ));
    Router::new()
        .route("/", get(hello))
        .nest("/v1", v1)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn hello() -> &'static str {
    "CRM API is running"
}

pub async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
