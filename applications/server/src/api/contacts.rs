/// Contact API routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::contacts::Payload,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use contacts_core::Contact;
use serde_json::Value;

fn payload(body: std::result::Result<Json<Value>, JsonRejection>) -> Payload {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

/// GET /contacts/
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<Contact>>> {
    let contacts = state.contacts.list(&identity).await?;
    Ok(Json(contacts))
}

/// POST /contacts/
pub async fn create_contact(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = state.contacts.create(&identity, payload(body)).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /contacts/:id/
pub async fn get_contact(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Contact>> {
    let contact = state.contacts.retrieve(&identity, &id).await?;
    Ok(Json(contact))
}

/// PUT /contacts/:id/
pub async fn replace_contact(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Contact>> {
    let contact = state.contacts.update(&identity, &id, payload(body)).await?;
    Ok(Json(contact))
}

/// PATCH /contacts/:id/
pub async fn update_contact(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Contact>> {
    let contact = state
        .contacts
        .partial_update(&identity, &id, payload(body))
        .await?;
    Ok(Json(contact))
}

/// DELETE /contacts/:id/
pub async fn delete_contact(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.contacts.destroy(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
