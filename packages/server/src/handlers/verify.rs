use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use common::EscrituraEstado;
use common::access::{self, PageView, hidden_pages_from_value};
use common::datos::DatosCompletos;
use sea_orm::*;
use tracing::instrument;

use crate::entity::escritura;
use crate::error::{AppError, ErrorBody};
use crate::models::verify::PublicEscrituraResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{token}",
    tag = "Verification",
    operation_id = "verifyEscritura",
    summary = "Verify an escritura by its QR token",
    description = "Public, unauthenticated. Resolves a scanned verification token to the sanitized deed summary. Tokens of inactive or review-pending escrituras fail the lookup itself — no partial data is ever returned for them.",
    params(("token" = String, Path, description = "Verification token from the QR code")),
    responses(
        (status = 200, description = "Sanitized public view", body = PublicEscrituraResponse),
        (status = 404, description = "Unknown token (NOT_FOUND) or not publicly available (NOT_ACTIVE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn verify_escritura(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicEscrituraResponse>, AppError> {
    let escritura = find_active_by_token(&state.db, &token).await?;

    let datos = DatosCompletos::from_value(&escritura.datos_completos);
    let fields = access::resolve_fields(&datos, escritura.foto_url.as_deref(), false);
    let hidden = hidden_pages_from_value(&escritura.hidden_pages);

    Ok(Json(PublicEscrituraResponse {
        token: escritura.token,
        num_pages: escritura.num_pages,
        hidden_pages: hidden.into_iter().collect(),
        datos: fields.datos,
    }))
}

#[utoipa::path(
    get,
    path = "/{token}/pages/{page}",
    tag = "Verification",
    operation_id = "resolveEscrituraPage",
    summary = "Resolve one page of a verified escritura",
    description = "Public, unauthenticated. Returns `{hidden: true, pageNumber}` when the page is redacted, `{hidden: false, pageNumber}` when the external renderer may show it. Both outcomes are 200 — a verification page degrades gracefully instead of erroring. Out-of-range pages resolve as not hidden.",
    params(
        ("token" = String, Path, description = "Verification token from the QR code"),
        ("page" = u32, Path, description = "1-based page number"),
    ),
    responses(
        (status = 200, description = "Page resolution", body = PageView),
        (status = 404, description = "Unknown token (NOT_FOUND) or not publicly available (NOT_ACTIVE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn resolve_page(
    State(state): State<AppState>,
    Path((token, page)): Path<(String, u32)>,
) -> Result<Json<PageView>, AppError> {
    let escritura = find_active_by_token(&state.db, &token).await?;

    let hidden = hidden_pages_from_value(&escritura.hidden_pages);
    Ok(Json(access::resolve_page(&hidden, page, false)))
}

/// Token lookup with the `activo`-only gate.
///
/// This is the precondition the access controller relies on: inactive and
/// review-pending escrituras fail here, before any field resolution runs.
async fn find_active_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<escritura::Model, AppError> {
    let escritura = escritura::Entity::find()
        .filter(escritura::Column::Token.eq(token))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Escritura not found".into()))?;

    let estado = EscrituraEstado::from_str(&escritura.estado).map_err(|e| {
        AppError::Internal(format!("Corrupt estado on escritura {}: {e}", escritura.id))
    })?;

    if !estado.is_publicly_visible() {
        return Err(AppError::NotActive);
    }

    Ok(escritura)
}
