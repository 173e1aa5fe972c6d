use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::notify;
use sea_orm::*;
use tracing::instrument;

use crate::entity::notification_template;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::template::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Templates",
    operation_id = "createTemplate",
    summary = "Create a WhatsApp notification template",
    description = "Creates a named message template with `{placeholder}` markers. Requires `template:manage` permission.",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate nombre (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(nombre = %payload.nombre))]
pub async fn create_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("template:manage")?;
    validate_create_template(&payload)?;

    let now = chrono::Utc::now();
    let new_template = notification_template::ActiveModel {
        nombre: Set(payload.nombre.trim().to_string()),
        mensaje: Set(payload.mensaje),
        activo: Set(payload.activo),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_template
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A template with this nombre already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Templates",
    operation_id = "listTemplates",
    summary = "List notification templates",
    description = "Returns all templates ordered by nombre. Requires `template:manage` permission.",
    responses(
        (status = 200, description = "List of templates", body = Vec<TemplateResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_templates(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TemplateResponse>>, AppError> {
    auth_user.require_permission("template:manage")?;

    let templates = notification_template::Entity::find()
        .order_by_asc(notification_template::Column::Nombre)
        .all(&state.db)
        .await?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(templates))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Templates",
    operation_id = "getTemplate",
    summary = "Get a template by ID",
    params(("id" = i32, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template details", body = TemplateResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Template not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TemplateResponse>, AppError> {
    auth_user.require_permission("template:manage")?;

    let model = find_template(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Templates",
    operation_id = "updateTemplate",
    summary = "Update a template",
    description = "Partially updates a template using PATCH semantics. Requires `template:manage` permission.",
    params(("id" = i32, Path, description = "Template ID")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Template not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate nombre (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    auth_user.require_permission("template:manage")?;
    validate_update_template(&payload)?;

    if payload == UpdateTemplateRequest::default() {
        let existing = find_template(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_template(&txn, id).await?;
    let mut active: notification_template::ActiveModel = existing.into();

    if let Some(ref nombre) = payload.nombre {
        active.nombre = Set(nombre.trim().to_string());
    }
    if let Some(mensaje) = payload.mensaje {
        active.mensaje = Set(mensaje);
    }
    if let Some(activo) = payload.activo {
        active.activo = Set(activo);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A template with this nombre already exists".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Templates",
    operation_id = "deleteTemplate",
    summary = "Delete a template",
    params(("id" = i32, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Template not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("template:manage")?;

    find_template(&state.db, id).await?;
    notification_template::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/preview",
    tag = "Templates",
    operation_id = "previewTemplate",
    summary = "Render a template with sample variables",
    description = "Renders the template body with the supplied variable map. Unknown placeholders stay verbatim so typos are visible in the preview. Requires `template:manage` permission.",
    params(("id" = i32, Path, description = "Template ID")),
    request_body = PreviewTemplateRequest,
    responses(
        (status = 200, description = "Rendered preview", body = PreviewTemplateResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Template not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn preview_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PreviewTemplateRequest>,
) -> Result<Json<PreviewTemplateResponse>, AppError> {
    auth_user.require_permission("template:manage")?;

    let template = find_template(&state.db, id).await?;

    Ok(Json(PreviewTemplateResponse {
        mensaje: notify::render_template(&template.mensaje, &payload.variables),
        variables: notify::template_variables(&template.mensaje),
    }))
}

async fn find_template<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<notification_template::Model, AppError> {
    notification_template::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".into()))
}
