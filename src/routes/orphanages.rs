use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::debug;
use utoipa::ToSchema;

use crate::entities::orphanage;
use crate::error::AppError;
use crate::repositories::{OrphanageForm, OrphanageRepository};
use crate::AppState;

/// Multipart body of `POST /orphanages`.
/// Documentation only: the handler reads the parts with axum's `Multipart` extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateOrphanageRequest {
    /// Display name, must not be blank
    #[schema(example = "Lar Feliz")]
    pub name: String,
    /// Decimal latitude, stored with 2 fractional digits
    #[schema(example = "-27.21")]
    pub latitude: String,
    /// Decimal longitude, stored with 2 fractional digits
    #[schema(example = "-49.64")]
    pub longitude: String,
    pub about: String,
    #[schema(example = "bring ID")]
    pub instructions: String,
    #[schema(example = "08:00-18:00")]
    pub opening_hours: String,
    /// "true" or "false"; defaults to false
    #[schema(example = "true")]
    pub open_on_weekends: Option<String>,
    /// Photo, repeated once per file; accepted but not stored
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub images: Option<String>,
}

/// Register a new orphanage
#[utoipa::path(
    post,
    path = "/orphanages",
    tag = "orphanages",
    request_body(
        content = CreateOrphanageRequest,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Orphanage created", body = orphanage::Model),
        (status = 400, description = "Missing or invalid fields"),
        (status = 413, description = "Upload exceeds the configured body limit"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn create_orphanage(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<orphanage::Model>), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut form = OrphanageForm::default();
    let mut images = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "images" || field_name == "images[]" {
            // Drained so the stream can advance; storage is out of scope
            field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read image data", e))?;
            images += 1;
            continue;
        }

        let value = field.text().await.map_err(|e| {
            multipart_error(&format!("Failed to read field {}", field_name), e)
        })?;
        if !form.set_field(&field_name, value) {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    debug!(images, "Received orphanage submission");
    let created = OrphanageRepository::new(&state.db).insert(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Body limit hits surface as 413; anything else is a malformed request
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, err))
    }
}

/// List every registered orphanage
#[utoipa::path(
    get,
    path = "/orphanages",
    tag = "orphanages",
    responses(
        (status = 200, description = "All orphanages in insertion order", body = Vec<orphanage::Model>),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list_orphanages(
    State(state): State<AppState>,
) -> Result<Json<Vec<orphanage::Model>>, AppError> {
    let orphanages = OrphanageRepository::new(&state.db).list_all().await?;
    Ok(Json(orphanages))
}

/// Fetch one orphanage by id
#[utoipa::path(
    get,
    path = "/orphanages/{id}",
    tag = "orphanages",
    params(("id" = i32, Path, description = "Orphanage id")),
    responses(
        (status = 200, description = "The orphanage", body = orphanage::Model),
        (status = 400, description = "Id is not an integer"),
        (status = 404, description = "No orphanage with this id")
    )
)]
pub async fn show_orphanage(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<orphanage::Model>, AppError> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let orphanage = OrphanageRepository::new(&state.db).get_by_id(id).await?;
    Ok(Json(orphanage))
}
