//! Route handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{ApiError, AppState};
use crate::auth::{self, MaybeUser, RequireUser};
use crate::plan::GeneratedPlan;
use crate::store::{HistoryEntry, User};

/// Body of `POST /generate`
///
/// Fields accept any JSON value; non-strings are used as their JSON text.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub description: Option<Value>,
    pub deadline: Option<Value>,
}

/// Body of `POST /register` and `POST /login`
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Absent, null and whitespace-only values all count as missing
fn required(value: Option<String>) -> Result<String, ApiError> {
    value.filter(|v| !v.trim().is_empty()).ok_or(ApiError::MissingInput)
}

/// Text form of a loosely typed field; empty-ish values (`null`, `false`, `0`, `[]`, `{}`) give `None`
fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}

/// Generate a plan; logged-in callers also get it saved to their history
pub async fn generate(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "generate: unreadable body");
            return Err(ApiError::MissingInput);
        }
    };
    let description = required(field_text(request.description))?;
    let deadline = required(field_text(request.deadline))?;
    debug!(authenticated = user.is_some(), %deadline, "generate: called");

    match state.generator.generate(&description, &deadline).await {
        Ok(generation) => {
            if let Some(user) = &user {
                save_plan(&state, user, &generation.plan);
            }
            Ok(Json(generation.plan).into_response())
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "generate: no plan produced");
            Ok(Json(json!({ "error": e.to_string() })).into_response())
        }
    }
}

/// Saving is best effort; the caller gets the plan either way
fn save_plan(state: &AppState, user: &User, plan: &GeneratedPlan) {
    let data = match serde_json::to_string(plan) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "save_plan: failed to serialize plan");
            return;
        }
    };
    match state.store.create_project(user.id, plan.title(), &data) {
        Ok(project) => info!(project_id = project.id, user_id = user.id, "Saved plan '{}'", project.title),
        Err(e) => warn!(error = %e, user_id = user.id, "save_plan: failed to persist plan"),
    }
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Ok(Json(credentials)) = body else {
        return Err(ApiError::MissingInput);
    };
    let username = required(credentials.username)?.trim().to_string();
    let password = required(credentials.password)?;
    debug!(%username, "register: called");

    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;
    let user = state.store.create_user(&username, Some(&hash))?;
    let cookie = start_session(&state, &user)?;
    info!(user_id = user.id, "Registered user '{}'", user.username);

    let body = json!({ "message": "Registered successfully", "username": user.username });
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Ok(Json(credentials)) = body else {
        return Err(ApiError::InvalidCredentials);
    };
    let (Some(username), Some(password)) = (credentials.username, credentials.password) else {
        return Err(ApiError::InvalidCredentials);
    };
    let username = username.trim().to_string();
    debug!(%username, "login: called");

    let user = state
        .store
        .find_user_by_username(&username)?
        .ok_or(ApiError::InvalidCredentials)?;
    let hash = user.password_hash.clone().ok_or(ApiError::InvalidCredentials)?;

    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(ApiError::internal)?;
    if !verified {
        debug!(%username, "login: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let cookie = start_session(&state, &user)?;
    info!(user_id = user.id, "User '{}' logged in", user.username);

    let body = json!({ "message": "Login successful", "username": user.username });
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

fn start_session(state: &AppState, user: &User) -> Result<String, ApiError> {
    let ttl = chrono::Duration::hours(i64::from(state.auth.session_ttl_hours));
    let session = state.store.create_session(user.id, ttl)?;
    Ok(auth::session_cookie(&state.auth, &session.token))
}

fn end_session(state: &AppState, user: &User, headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(token) = auth::session_token(headers, &state.auth.cookie_name) {
        state.store.delete_session(&token)?;
    }
    info!(user_id = user.id, "User '{}' logged out", user.username);
    Ok(auth::clear_cookie(&state.auth))
}

pub async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cookie = end_session(&state, &user, &headers)?;
    Ok(([(SET_COOKIE, cookie)], Json(json!({ "message": "Logged out" }))).into_response())
}

/// Browser variant of logout: back to the landing page
pub async fn logout_redirect(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cookie = end_session(&state, &user, &headers)?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

pub async fn history(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    debug!(user_id = user.id, "history: called");
    Ok(Json(state.store.history(user.id)?))
}

/// A saved plan, only for its owner
pub async fn project(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    // Non-numeric ids can't name a project
    let Ok(Path(id)) = id else {
        return Err(ApiError::ProjectNotFound);
    };
    debug!(user_id = user.id, %id, "project: called");

    let project = state.store.get_project(id)?.ok_or(ApiError::ProjectNotFound)?;
    if !project.is_owned_by(user.id) {
        warn!(user_id = user.id, project_id = id, "project: requested by non-owner");
        return Err(ApiError::Forbidden);
    }

    let data = serde_json::from_str(&project.data).map_err(ApiError::internal)?;
    Ok(Json(data))
}

pub async fn auth_status(MaybeUser(user): MaybeUser) -> Json<Value> {
    match user {
        Some(user) => Json(json!({
            "logged_in": true,
            "username": user.username,
            "profile_pic": user.profile_pic,
        })),
        None => Json(json!({ "logged_in": false })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(required(None), Err(ApiError::MissingInput)));
        assert!(matches!(required(Some(String::new())), Err(ApiError::MissingInput)));
        assert!(matches!(required(Some(" \n\t".to_string())), Err(ApiError::MissingInput)));
    }

    #[test]
    fn test_field_text_stringifies_non_strings() {
        assert_eq!(field_text(Some(json!(20250901))).as_deref(), Some("20250901"));
        assert_eq!(field_text(Some(json!(1.5))).as_deref(), Some("1.5"));
        assert_eq!(field_text(Some(json!(true))).as_deref(), Some("true"));
        assert_eq!(field_text(Some(json!("3 months"))).as_deref(), Some("3 months"));
    }

    #[test]
    fn test_field_text_empty_values_are_missing() {
        for value in [json!(null), json!(false), json!(0), json!([]), json!({})] {
            assert_eq!(field_text(Some(value)), None);
        }
        assert_eq!(field_text(None), None);
    }

    #[test]
    fn test_required_keeps_value_verbatim() {
        assert_eq!(required(Some(" CRM app ".to_string())).unwrap(), " CRM app ");
    }
}
