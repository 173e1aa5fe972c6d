use std::str::FromStr;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use common::EscrituraEstado;
use common::access::{hidden_pages_to_value, normalize_hidden_pages};
use common::datos::DatosCompletos;
use common::import::parse_personas_text;
use common::storage::ContentHash;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::escritura;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::escritura::*;
use crate::state::AppState;
use crate::utils::filename::validate_pdf_filename;
use crate::utils::token::generate_verification_token;

/// Body limit layer for the PDF upload route (64 MB).
pub fn pdf_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Escrituras",
    operation_id = "createEscritura",
    summary = "Create an escritura record",
    description = "Creates a new deed record in `revision_requerida` state with a freshly generated verification token. Requires `escritura:create` permission.",
    request_body = CreateEscrituraRequest,
    responses(
        (status = 201, description = "Escritura created", body = EscrituraResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_escritura(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEscrituraRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("escritura:create")?;

    let num_pages = payload.num_pages.unwrap_or(0);
    validate_num_pages(num_pages)?;
    if let Some(ref url) = payload.foto_url {
        validate_foto_url(url)?;
    }

    let datos = payload.datos_completos.unwrap_or_default();
    let now = chrono::Utc::now();

    // Token collisions are vanishingly rare but cheap to retry.
    let mut last_err = None;
    for _ in 0..3 {
        let new_escritura = escritura::ActiveModel {
            token: Set(generate_verification_token()),
            estado: Set(EscrituraEstado::default().to_string()),
            pdf_file_name: Set(None),
            pdf_hash: Set(None),
            num_pages: Set(num_pages),
            hidden_pages: Set(serde_json::Value::Array(Vec::new())),
            datos_completos: Set(serde_json::to_value(&datos)
                .map_err(|e| AppError::Internal(format!("datos serialization: {e}")))?),
            foto_url: Set(payload.foto_url.clone()),
            created_by: Set(auth_user.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match new_escritura.insert(&state.db).await {
            Ok(model) => {
                return Ok((StatusCode::CREATED, Json(EscrituraResponse::from(model))));
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => last_err = Some(e),
                _ => return Err(e.into()),
            },
        }
    }

    Err(AppError::Internal(format!(
        "Token generation kept colliding: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Escrituras",
    operation_id = "listEscrituras",
    summary = "List escrituras",
    description = "Returns a paginated list of deed records, newest first, with an optional estado filter. Requires `escritura:view` permission.",
    params(EscrituraListQuery),
    responses(
        (status = 200, description = "List of escrituras", body = EscrituraListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_escrituras(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EscrituraListQuery>,
) -> Result<Json<EscrituraListResponse>, AppError> {
    auth_user.require_permission("escritura:view")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = escritura::Entity::find();

    if let Some(ref estado) = query.estado {
        let estado = EscrituraEstado::from_str(estado)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        select = select.filter(escritura::Column::Estado.eq(estado.as_str()));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(escritura::Column::CreatedAt)
        .select_only()
        .column(escritura::Column::Id)
        .column(escritura::Column::Token)
        .column(escritura::Column::Estado)
        .column(escritura::Column::PdfFileName)
        .column(escritura::Column::NumPages)
        .column(escritura::Column::CreatedBy)
        .column(escritura::Column::CreatedAt)
        .column(escritura::Column::UpdatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<EscrituraListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(EscrituraListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Escrituras",
    operation_id = "getEscritura",
    summary = "Get an escritura by ID",
    description = "Returns the full staff view, including the raw (unsanitized) extracted fields and the photo URL. Requires `escritura:view` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    responses(
        (status = 200, description = "Escritura details", body = EscrituraResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_escritura(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EscrituraResponse>, AppError> {
    auth_user.require_permission("escritura:view")?;

    let model = find_escritura(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Escrituras",
    operation_id = "updateEscritura",
    summary = "Update an escritura",
    description = "Partially updates a deed record. `datos_completos` is replaced wholesale when provided; `foto_url` supports explicit null to clear. Requires `escritura:edit` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    request_body = UpdateEscrituraRequest,
    responses(
        (status = 200, description = "Escritura updated", body = EscrituraResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_escritura(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEscrituraRequest>,
) -> Result<Json<EscrituraResponse>, AppError> {
    auth_user.require_permission("escritura:edit")?;

    if let Some(num_pages) = payload.num_pages {
        validate_num_pages(num_pages)?;
    }
    if let Some(Some(ref url)) = payload.foto_url {
        validate_foto_url(url)?;
    }

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;
    let mut active: escritura::ActiveModel = existing.into();

    if let Some(num_pages) = payload.num_pages {
        active.num_pages = Set(num_pages);
    }
    if let Some(ref datos) = payload.datos_completos {
        active.datos_completos = Set(serde_json::to_value(datos)
            .map_err(|e| AppError::Internal(format!("datos serialization: {e}")))?);
    }
    match payload.foto_url {
        Some(Some(url)) => active.foto_url = Set(Some(url.trim().to_string())),
        Some(None) => active.foto_url = Set(None),
        None => {}
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/estado",
    tag = "Escrituras",
    operation_id = "changeEscrituraEstado",
    summary = "Change an escritura's publication state",
    description = "Switches between activo, revision_requerida, and inactivo. Activation requires an uploaded PDF. Requires `escritura:edit` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    request_body = ChangeEscrituraEstadoRequest,
    responses(
        (status = 200, description = "Estado changed", body = EscrituraResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cannot activate without a PDF (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, estado = %payload.estado))]
pub async fn change_escritura_estado(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ChangeEscrituraEstadoRequest>,
) -> Result<Json<EscrituraResponse>, AppError> {
    auth_user.require_permission("escritura:edit")?;

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;

    if payload.estado == EscrituraEstado::Activo && existing.pdf_hash.is_none() {
        return Err(AppError::Conflict(
            "Cannot activate an escritura without an uploaded PDF".into(),
        ));
    }

    let mut active: escritura::ActiveModel = existing.into();
    active.estado = Set(payload.estado.to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/hidden-pages",
    tag = "Escrituras",
    operation_id = "setHiddenPages",
    summary = "Replace the hidden-page set",
    description = "Replaces the escritura's hidden pages wholesale — the request carries the complete new set, never a delta, so re-applying the same set is a no-op. Hidden pages are redacted from the public verification view only; staff always see the full PDF. Requires `escritura:edit` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    request_body = UpdateHiddenPagesRequest,
    responses(
        (status = 200, description = "Hidden pages replaced", body = EscrituraResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn set_hidden_pages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHiddenPagesRequest>,
) -> Result<Json<EscrituraResponse>, AppError> {
    auth_user.require_permission("escritura:edit")?;

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;

    validate_hidden_pages(&payload.pages, existing.num_pages)?;
    let normalized = normalize_hidden_pages(&payload.pages);

    let mut active: escritura::ActiveModel = existing.into();
    active.hidden_pages = Set(hidden_pages_to_value(&normalized));
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/import-personas",
    tag = "Escrituras",
    operation_id = "importPersonas",
    summary = "Import otorgantes/beneficiarios from pasted text",
    description = "Runs the best-effort line parser over freeform pasted text, sanitizes the candidates, and appends them to the escritura's persona lists. Lines that cannot be parsed are dropped silently. Requires `escritura:edit` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    request_body = ImportPersonasRequest,
    responses(
        (status = 200, description = "Personas imported", body = ImportPersonasResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn import_personas(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ImportPersonasRequest>,
) -> Result<Json<ImportPersonasResponse>, AppError> {
    auth_user.require_permission("escritura:edit")?;

    if payload.texto.len() > 1024 * 1024 {
        return Err(AppError::Validation("Texto must be at most 1MB".into()));
    }

    let imported = parse_personas_text(&payload.texto, payload.destino_default);

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;

    let mut datos = DatosCompletos::from_value(&existing.datos_completos);
    datos.otorgantes.extend(imported.otorgantes.iter().cloned());
    datos
        .beneficiarios
        .extend(imported.beneficiarios.iter().cloned());
    let total_otorgantes = datos.otorgantes.len();
    let total_beneficiarios = datos.beneficiarios.len();

    let mut active: escritura::ActiveModel = existing.into();
    active.datos_completos = Set(serde_json::to_value(&datos)
        .map_err(|e| AppError::Internal(format!("datos serialization: {e}")))?);
    active.updated_at = Set(chrono::Utc::now());

    active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ImportPersonasResponse {
        imported,
        total_otorgantes,
        total_beneficiarios,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/pdf",
    tag = "Escrituras",
    operation_id = "uploadEscrituraPdf",
    summary = "Upload the escritura's PDF",
    description = "Stores the deed PDF in the content-addressed archive. The `file` multipart field is required; an optional `num_pages` field records the page count reported by the extraction pipeline. Re-uploading replaces the recorded file. Requires `escritura:edit` permission. Body limit: 64 MB.",
    params(("id" = i32, Path, description = "Escritura ID")),
    request_body(content_type = "multipart/form-data", description = "PDF upload with optional num_pages"),
    responses(
        (status = 201, description = "PDF stored", body = UploadPdfResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn upload_pdf(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("escritura:edit")?;

    find_escritura(&state.db, id).await?;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut num_pages: Option<i32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file_bytes = Some(data.to_vec());
            }
            Some("num_pages") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read num_pages: {e}")))?;
                let parsed: i32 = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("num_pages must be an integer".into()))?;
                validate_num_pages(parsed)?;
                num_pages = Some(parsed);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let filename =
        file_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let filename = validate_pdf_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let hash = state.pdf_store.put(&bytes).await?;

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;
    let mut active: escritura::ActiveModel = existing.into();
    active.pdf_hash = Set(Some(hash.to_hex()));
    active.pdf_file_name = Set(Some(filename.clone()));
    if let Some(pages) = num_pages {
        active.num_pages = Set(pages);
    }
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadPdfResponse {
            pdf_hash: hash.to_hex(),
            pdf_file_name: filename,
            size: bytes.len() as u64,
            num_pages: model.num_pages,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/pdf",
    tag = "Escrituras",
    operation_id = "downloadEscrituraPdf",
    summary = "Download the full PDF (staff view)",
    description = "Streams the stored deed PDF unmodified. Hidden pages only affect the public verification view, never this staff download. Requires `escritura:view` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    responses(
        (status = 200, description = "PDF content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura or PDF not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn download_pdf(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("escritura:view")?;

    let existing = find_escritura(&state.db, id).await?;
    let hash_hex = existing
        .pdf_hash
        .ok_or_else(|| AppError::NotFound("Escritura has no uploaded PDF".into()))?;
    let hash = ContentHash::from_hex(&hash_hex)
        .map_err(|e| AppError::Internal(format!("Corrupt pdf_hash on escritura {id}: {e}")))?;

    let reader = state.pdf_store.open_stream(&hash).await?;

    let filename = existing
        .pdf_file_name
        .unwrap_or_else(|| format!("escritura-{id}.pdf"));
    let content_type = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/pdf");

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(reader))))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Escrituras",
    operation_id = "deleteEscritura",
    summary = "Delete an escritura",
    description = "Deletes the record and its stored PDF. Active escrituras must be deactivated first. Requires `escritura:delete` permission.",
    params(("id" = i32, Path, description = "Escritura ID")),
    responses(
        (status = 204, description = "Escritura deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Escritura not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cannot delete an active escritura (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_escritura(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("escritura:delete")?;

    let txn = state.db.begin().await?;
    let existing = find_escritura(&txn, id).await?;

    if existing.estado == EscrituraEstado::Activo.as_str() {
        return Err(AppError::Conflict(
            "Deactivate the escritura before deleting it".into(),
        ));
    }

    let pdf_hash = existing.pdf_hash.clone();
    escritura::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    // Remove the stored PDF after the row is gone; other rows never share a
    // deed PDF, so this cannot orphan a live reference.
    if let Some(hash_hex) = pdf_hash
        && let Ok(hash) = ContentHash::from_hex(&hash_hex)
        && let Err(e) = state.pdf_store.delete(&hash).await
    {
        tracing::warn!("Failed to delete stored PDF {hash_hex}: {e}");
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_escritura<C: ConnectionTrait>(db: &C, id: i32) -> Result<escritura::Model, AppError> {
    escritura::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Escritura not found".into()))
}
