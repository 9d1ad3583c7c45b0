/// HTTP routing
use crate::{api, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
///
/// Contact paths are served with and without the trailing slash.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/refresh", post(api::auth::refresh));

    let collection = get(api::contacts::list_contacts).post(api::contacts::create_contact);
    let member = get(api::contacts::get_contact)
        .put(api::contacts::replace_contact)
        .patch(api::contacts::update_contact)
        .delete(api::contacts::delete_contact);

    let contact_routes = Router::new()
        .route("/contacts", collection.clone())
        .route("/contacts/", collection)
        .route("/contacts/:id", member.clone())
        .route("/contacts/:id/", member)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(contact_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::expose_error_detail,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
