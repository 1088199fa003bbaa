//! Pack endpoints: publication, update, deletion and public reads.
//!
//! Publication arrives as one multipart form carrying the metadata fields
//! and every asset file. The handler assembles a [`PublishRequest`] and
//! hands it to the pipeline; failure responses name the failed stage and a
//! caller-safe message, never provider detail.

use axum::{
    extract::{
        multipart::{Field, Multipart},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use cratedig_core::catalog::{Pack, Sample};
use cratedig_core::publisher::{
    DeletedPack, PublishError, PublishRequest, PublishedPack, UpdateRequest, UpdatedPack,
};
use cratedig_core::storage::AssetFile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::middleware::AuthUser;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// JSON body for pack updates.
#[derive(Debug, Deserialize)]
pub struct UpdatePackRequest {
    pub title: String,
    pub description: Option<String>,
    /// Price in major currency units, e.g. 9.99.
    pub price: f64,
}

/// A pack as returned by the public read endpoints.
#[derive(Debug, Serialize)]
pub struct PackResponse {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cover_url: String,
    pub payment_link: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Pack> for PackResponse {
    fn from(pack: Pack) -> Self {
        Self {
            slug: pack.slug,
            title: pack.title,
            description: pack.description,
            price_cents: pack.price_cents,
            cover_url: pack.cover_url,
            payment_link: pack.payment_link,
            created_at: pack.created_at.to_rfc3339(),
            updated_at: pack.updated_at.to_rfc3339(),
        }
    }
}

/// A preview sample on the pack detail endpoint.
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub url: String,
    pub title: String,
}

impl From<Sample> for SampleResponse {
    fn from(sample: Sample) -> Self {
        Self {
            url: sample.url,
            title: sample.title,
        }
    }
}

/// Response for the pack detail endpoint.
#[derive(Debug, Serialize)]
pub struct PackDetailResponse {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cover_url: String,
    pub payment_link: String,
    pub samples: Vec<SampleResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<(Pack, Vec<Sample>)> for PackDetailResponse {
    fn from((pack, samples): (Pack, Vec<Sample>)) -> Self {
        Self {
            slug: pack.slug,
            title: pack.title,
            description: pack.description,
            price_cents: pack.price_cents,
            cover_url: pack.cover_url,
            payment_link: pack.payment_link,
            samples: samples.into_iter().map(SampleResponse::from).collect(),
            created_at: pack.created_at.to_rfc3339(),
            updated_at: pack.updated_at.to_rfc3339(),
        }
    }
}

/// Response for the pack list endpoint.
#[derive(Debug, Serialize)]
pub struct PackListResponse {
    pub packs: Vec<PackResponse>,
    pub total: usize,
}

/// Error response for pack endpoints. `stage` is present when a pipeline
/// stage failed, so callers can tell a rejected request from a run that
/// left orphaned external objects behind.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Map a pipeline failure to an HTTP response.
///
/// Validation detail goes back to the caller verbatim; stage failures get
/// the caller-safe message only, with the diagnostic detail already in the
/// logs and the audit trail.
pub(super) fn publish_error_response(error: &PublishError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match error {
        PublishError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        PublishError::Unauthorized => StatusCode::FORBIDDEN,
        PublishError::NotFound(_) => StatusCode::NOT_FOUND,
        PublishError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    let message = match error {
        PublishError::ValidationFailed(_) | PublishError::NotFound(_) => error.to_string(),
        other => other.public_message().to_string(),
    };
    (
        status,
        Json(ErrorResponse {
            error: message,
            stage: error.stage().map(|s| s.as_str().to_string()),
        }),
    )
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            stage: None,
        }),
    )
}

fn not_found(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message,
            stage: None,
        }),
    )
}

fn internal_error(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message,
            stage: None,
        }),
    )
}

// =============================================================================
// Multipart Parsing
// =============================================================================

async fn asset_from_field(field: Field<'_>) -> Result<AssetFile, String> {
    let file_name = field.file_name().unwrap_or("").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| format!("Failed to read file field: {}", e))?;
    Ok(AssetFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// Assemble a [`PublishRequest`] from the multipart form. Field names:
/// `title`, `description` (optional), `price`, `cover`, `archive`, and one
/// `samples` entry per preview file. Unknown fields are ignored.
async fn read_publish_request(mut multipart: Multipart) -> Result<PublishRequest, String> {
    let mut title = None;
    let mut description = None;
    let mut price = None;
    let mut cover = None;
    let mut archive = None;
    let mut samples = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed multipart form: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| e.to_string())?);
            }
            "description" => {
                let text = field.text().await.map_err(|e| e.to_string())?;
                if !text.is_empty() {
                    description = Some(text);
                }
            }
            "price" => {
                let text = field.text().await.map_err(|e| e.to_string())?;
                let parsed = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Price is not a number: {}", text))?;
                price = Some(parsed);
            }
            "cover" => {
                cover = Some(asset_from_field(field).await?);
            }
            "archive" => {
                archive = Some(asset_from_field(field).await?);
            }
            "samples" => {
                samples.push(asset_from_field(field).await?);
            }
            _ => {}
        }
    }

    Ok(PublishRequest {
        title: title.ok_or_else(|| "Missing field: title".to_string())?,
        description,
        price: price.ok_or_else(|| "Missing field: price".to_string())?,
        cover: cover.ok_or_else(|| "Missing field: cover".to_string())?,
        archive: archive.ok_or_else(|| "Missing field: archive".to_string())?,
        samples,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Publish a new pack from a multipart submission.
pub async fn publish_pack(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PublishedPack>), (StatusCode, Json<ErrorResponse>)> {
    let request = read_publish_request(multipart).await.map_err(bad_request)?;

    match state.publisher().publish(&creator_id, request).await {
        Ok(published) => Ok((StatusCode::CREATED, Json(published))),
        Err(error) => Err(publish_error_response(&error)),
    }
}

/// Update a published pack's metadata and price.
pub async fn update_pack(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
    Path(slug): Path<String>,
    Json(body): Json<UpdatePackRequest>,
) -> Result<Json<UpdatedPack>, (StatusCode, Json<ErrorResponse>)> {
    let request = UpdateRequest {
        title: body.title,
        description: body.description,
        price: body.price,
    };

    match state.publisher().update(&creator_id, &slug, request).await {
        Ok(updated) => Ok(Json(updated)),
        Err(error) => Err(publish_error_response(&error)),
    }
}

/// Delete a pack. The response lists the storage keys and product id that
/// remain at the providers for out-of-band cleanup.
pub async fn delete_pack(
    State(state): State<Arc<AppState>>,
    AuthUser(creator_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<DeletedPack>, (StatusCode, Json<ErrorResponse>)> {
    match state.publisher().delete(&creator_id, &slug).await {
        Ok(deleted) => Ok(Json(deleted)),
        Err(error) => Err(publish_error_response(&error)),
    }
}

/// List a creator's packs, newest first.
pub async fn list_creator_packs(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<PackListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let creator = match state.creators().get_creator_by_username(&username) {
        Ok(Some(creator)) => creator,
        Ok(None) => return Err(not_found(format!("Creator '{}' not found", username))),
        Err(e) => return Err(internal_error(format!("Failed to load creator: {}", e))),
    };

    let packs = state
        .packs()
        .list_packs(&creator.id)
        .map_err(|e| internal_error(format!("Failed to list packs: {}", e)))?;

    let total = packs.len();
    Ok(Json(PackListResponse {
        packs: packs.into_iter().map(PackResponse::from).collect(),
        total,
    }))
}

/// Fetch one pack with its preview samples.
pub async fn get_creator_pack(
    State(state): State<Arc<AppState>>,
    Path((username, slug)): Path<(String, String)>,
) -> Result<Json<PackDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let creator = match state.creators().get_creator_by_username(&username) {
        Ok(Some(creator)) => creator,
        Ok(None) => return Err(not_found(format!("Creator '{}' not found", username))),
        Err(e) => return Err(internal_error(format!("Failed to load creator: {}", e))),
    };

    match state.packs().get_pack_with_samples(&creator.id, &slug) {
        Ok(Some(found)) => Ok(Json(PackDetailResponse::from(found))),
        Ok(None) => Err(not_found(format!("Pack '{}' not found", slug))),
        Err(e) => Err(internal_error(format!("Failed to load pack: {}", e))),
    }
}
