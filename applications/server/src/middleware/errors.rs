/// Debug-mode error detail
use crate::{error::ErrorDetail, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Add the detail of a failed request to its body when the server runs in
/// debug mode
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.debug {
        return response;
    }

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail { summary, detail }) => (
            response.status(),
            Json(json!({ "error": summary, "detail": detail })),
        )
            .into_response(),
        None => response,
    }
}
