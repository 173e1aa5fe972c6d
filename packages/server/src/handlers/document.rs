use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::DocumentStatus;
use common::gaps::{self, GapAnalysis};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{document, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::document::*;
use crate::state::AppState;
use crate::utils::token;

#[utoipa::path(
    post,
    path = "/",
    tag = "Documents",
    operation_id = "createDocument",
    summary = "Create a tracked document",
    description = "Registers a new document in the tracking pipeline. Requires `document:create` permission. The protocol code must be unique; malformed codes are accepted and show up in the sequence-gap audit as invalid.",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate codigo (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(codigo = %payload.codigo))]
pub async fn create_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("document:create")?;
    validate_create_document(&payload)?;

    if let Some(user_id) = payload.asignado_a {
        find_user(&state.db, user_id).await?;
    }

    let now = chrono::Utc::now();
    let new_document = document::ActiveModel {
        codigo: Set(payload.codigo.trim().to_string()),
        tipo_documento: Set(payload.tipo_documento.trim().to_string()),
        cliente: Set(payload.cliente.trim().to_string()),
        telefono: Set(payload.telefono.map(|t| t.trim().to_string())),
        estado: Set(DocumentStatus::default().to_string()),
        asignado_a: Set(payload.asignado_a),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_document
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A document with this codigo already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Documents",
    operation_id = "listDocuments",
    summary = "List documents with pagination and search",
    description = "Returns a paginated document list with optional case-insensitive search over codigo and cliente, estado filter, and sorting by `created_at` (default, desc), `updated_at`, or `codigo`. Requires `document:view_all` permission.",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "List of documents", body = DocumentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<DocumentListResponse>, AppError> {
    auth_user.require_permission("document:view_all")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = document::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\');
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(document::Column::Codigo)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(document::Column::Cliente)))
                            .like(pattern),
                    ),
            );
        }
    }

    if let Some(ref estado) = query.estado {
        let estado = DocumentStatus::from_str(estado)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        select = select.filter(document::Column::Estado.eq(estado.as_str()));
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => document::Column::CreatedAt,
        "updated_at" => document::Column::UpdatedAt,
        "codigo" => document::Column::Codigo,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, codigo".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    select = select.order_by(sort_column, sort_order);
    let total_pages = total.div_ceil(per_page);

    let data = select
        .select_only()
        .column(document::Column::Id)
        .column(document::Column::Codigo)
        .column(document::Column::TipoDocumento)
        .column(document::Column::Cliente)
        .column(document::Column::Estado)
        .column(document::Column::AsignadoA)
        .column(document::Column::CreatedAt)
        .column(document::Column::UpdatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<DocumentListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(DocumentListResponse {
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
    path = "/sequence-gaps",
    tag = "Documents",
    operation_id = "getSequenceGaps",
    summary = "Audit protocol numbers for sequence gaps",
    description = "Groups all protocol numbers by prefix and reports missing sequence numbers per group, plus a count of codes that could not be split into prefix + sequence. Requires `document:view_all` permission.",
    responses(
        (status = 200, description = "Gap analysis", body = GapAnalysis),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_sequence_gaps(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<GapAnalysis>, AppError> {
    auth_user.require_permission("document:view_all")?;

    let codigos: Vec<String> = document::Entity::find()
        .select_only()
        .column(document::Column::Codigo)
        .into_tuple::<String>()
        .all(&state.db)
        .await?;

    Ok(Json(gaps::analyze(codigos)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Documents",
    operation_id = "getDocument",
    summary = "Get a document by ID",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document details", body = DocumentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DocumentResponse>, AppError> {
    auth_user.require_permission("document:view_all")?;

    let model = find_document(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Documents",
    operation_id = "updateDocument",
    summary = "Update a document",
    description = "Partially updates a document using PATCH semantics — only provided fields are modified; `telefono` and `asignado_a` support explicit nulls to clear. Status changes go through the estado endpoint, not here. Requires `document:edit` permission.",
    params(("id" = i32, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    auth_user.require_permission("document:edit")?;
    validate_update_document(&payload)?;

    if payload == UpdateDocumentRequest::default() {
        let existing = find_document(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    if let Some(Some(user_id)) = payload.asignado_a {
        find_user(&state.db, user_id).await?;
    }

    let txn = state.db.begin().await?;

    let existing = find_document(&txn, id).await?;
    let mut active: document::ActiveModel = existing.into();

    if let Some(ref tipo) = payload.tipo_documento {
        active.tipo_documento = Set(tipo.trim().to_string());
    }
    if let Some(ref cliente) = payload.cliente {
        active.cliente = Set(cliente.trim().to_string());
    }
    match payload.telefono {
        Some(Some(telefono)) => active.telefono = Set(Some(telefono.trim().to_string())),
        Some(None) => active.telefono = Set(None),
        None => {}
    }
    match payload.asignado_a {
        Some(Some(user_id)) => active.asignado_a = Set(Some(user_id)),
        Some(None) => active.asignado_a = Set(None),
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
    tag = "Documents",
    operation_id = "changeDocumentEstado",
    summary = "Move a document through its lifecycle",
    description = "Applies a guarded status transition. Moving to `listo` assigns a retrieval code. Moving to `entregado` requires `document:deliver` permission, the name of the person picking up, and — when the document carries a retrieval code — the matching code.",
    params(("id" = i32, Path, description = "Document ID")),
    request_body = ChangeDocumentEstadoRequest,
    responses(
        (status = 200, description = "Status changed", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Illegal transition (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, estado = %payload.estado))]
pub async fn change_document_estado(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ChangeDocumentEstadoRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    auth_user.require_permission("document:edit")?;

    let txn = state.db.begin().await?;
    let existing = find_document_for_update(&txn, id).await?;

    let current = DocumentStatus::from_str(&existing.estado)
        .map_err(|e| AppError::Internal(format!("Corrupt estado in document {id}: {e}")))?;
    let next = payload.estado;

    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move a document from {current} to {next}"
        )));
    }

    let mut active: document::ActiveModel = existing.clone().into();

    match next {
        DocumentStatus::Listo => {
            if existing.codigo_retiro.is_none() {
                active.codigo_retiro = Set(Some(token::generate_codigo_retiro()));
            }
        }
        DocumentStatus::Entregado => {
            auth_user.require_permission("document:deliver")?;

            let entregado_a = payload
                .entregado_a
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("entregado_a is required for delivery".into())
                })?;

            if let Some(ref expected) = existing.codigo_retiro {
                let quoted = payload.codigo_retiro.as_deref().map(str::trim);
                if quoted != Some(expected.as_str()) {
                    return Err(AppError::Validation(
                        "codigo_retiro does not match".into(),
                    ));
                }
            }

            active.entregado_a = Set(Some(entregado_a.to_string()));
        }
        DocumentStatus::EnProceso | DocumentStatus::Anulado => {}
    }

    active.estado = Set(next.to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Documents",
    operation_id = "deleteDocument",
    summary = "Delete a document",
    description = "Permanently deletes a document. Requires `document:delete` permission. Delivered documents cannot be deleted.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cannot delete a delivered document (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("document:delete")?;

    let txn = state.db.begin().await?;
    let existing = find_document_for_update(&txn, id).await?;

    if existing.estado == DocumentStatus::Entregado.as_str() {
        return Err(AppError::Conflict(
            "Cannot delete a delivered document".into(),
        ));
    }

    document::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_document<C: ConnectionTrait>(db: &C, id: i32) -> Result<document::Model, AppError> {
    document::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))
}

async fn find_document_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<document::Model, AppError> {
    use sea_orm::sea_query::LockType;
    document::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}
