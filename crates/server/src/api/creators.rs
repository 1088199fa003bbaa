//! Creator endpoints: registration, storefront lookup and payment
//! onboarding.
//!
//! Registration and onboarding act as the forwarded creator identity;
//! the storefront reads are public and keyed by username.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cratedig_core::catalog::{CatalogError, Creator, NewCreator};
use cratedig_core::publisher::{OnboardingLink, OnboardingStatus};
use cratedig_core::AuditEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::middleware::AuthUser;
use super::packs::{publish_error_response, ErrorResponse};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// JSON body for creator registration. The creator id itself comes from
/// the forwarded identity, not the body.
#[derive(Debug, Deserialize)]
pub struct RegisterCreatorRequest {
    pub username: String,
    /// Defaults to the username when absent.
    pub display_name: Option<String>,
}

/// A creator as returned by the API. The raw connected-account id stays
/// internal; callers only learn whether onboarding has been started.
#[derive(Debug, Serialize)]
pub struct CreatorResponse {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub has_connected_account: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Creator> for CreatorResponse {
    fn from(creator: Creator) -> Self {
        let has_connected_account = creator.has_connected_account();
        Self {
            id: creator.id,
            display_name: creator.display_name,
            username: creator.username,
            has_connected_account,
            created_at: creator.created_at.to_rfc3339(),
            updated_at: creator.updated_at.to_rfc3339(),
        }
    }
}

/// JSON body for starting onboarding. The URLs are where the provider
/// sends the creator after an expired or completed hosted session.
#[derive(Debug, Deserialize)]
pub struct StartOnboardingRequest {
    pub refresh_url: String,
    pub return_url: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register the acting creator in the catalog.
pub async fn register_creator(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
    Json(body): Json<RegisterCreatorRequest>,
) -> Result<(StatusCode, Json<CreatorResponse>), (StatusCode, Json<ErrorResponse>)> {
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Username must not be empty".to_string(),
                stage: None,
            }),
        ));
    }

    let request = NewCreator {
        id: creator_id,
        display_name: body.display_name.unwrap_or_else(|| username.clone()),
        username,
    };

    match state.creators().create_creator(request) {
        Ok(creator) => {
            state.audit().try_emit(AuditEvent::CreatorRegistered {
                creator_id: creator.id.clone(),
                username: creator.username.clone(),
            });
            Ok((StatusCode::CREATED, Json(CreatorResponse::from(creator))))
        }
        Err(CatalogError::DuplicateCreator(id)) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Creator already registered: {}", id),
                stage: None,
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to register creator: {}", e),
                stage: None,
            }),
        )),
    }
}

/// Fetch a creator's public profile by username.
pub async fn get_creator(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<CreatorResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.creators().get_creator_by_username(&username) {
        Ok(Some(creator)) => Ok(Json(CreatorResponse::from(creator))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Creator '{}' not found", username),
                stage: None,
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to load creator: {}", e),
                stage: None,
            }),
        )),
    }
}

/// Create the acting creator's connected account if needed and mint a
/// fresh onboarding link.
pub async fn start_onboarding(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
    Json(body): Json<StartOnboardingRequest>,
) -> Result<(StatusCode, Json<OnboardingLink>), (StatusCode, Json<ErrorResponse>)> {
    match state
        .publisher()
        .start_onboarding(&creator_id, &body.refresh_url, &body.return_url)
        .await
    {
        Ok(link) => Ok((StatusCode::CREATED, Json(link))),
        Err(error) => Err(publish_error_response(&error)),
    }
}

/// Report where the acting creator stands with payment onboarding.
pub async fn onboarding_status(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
) -> Result<Json<OnboardingStatus>, (StatusCode, Json<ErrorResponse>)> {
    match state.publisher().onboarding_status(&creator_id).await {
        Ok(status) => Ok(Json(status)),
        Err(error) => Err(publish_error_response(&error)),
    }
}
