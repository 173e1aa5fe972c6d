use chrono::{DateTime, Utc};
use common::DocumentStatus;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::{double_option, validate_short_text};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDocumentRequest {
    /// Protocol number (filing code). Malformed codes are accepted — the
    /// sequence-gap audit reports them instead of rejecting them here.
    #[schema(example = "20241701022P04128")]
    pub codigo: String,
    #[schema(example = "Escritura")]
    pub tipo_documento: String,
    #[schema(example = "JUAN CARLOS PEREZ")]
    pub cliente: String,
    #[schema(example = "0991234567")]
    pub telefono: Option<String>,
    /// Matrizador user ID to assign the document to.
    pub asignado_a: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateDocumentRequest {
    pub tipo_documento: Option<String>,
    pub cliente: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub telefono: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub asignado_a: Option<Option<i32>>,
}

/// Request body for a guarded status transition.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangeDocumentEstadoRequest {
    pub estado: DocumentStatus,
    /// Name of the person picking the document up. Required when moving to
    /// `entregado`.
    pub entregado_a: Option<String>,
    /// Retrieval code quoted at the counter. Must match the stored code
    /// when the document has one.
    pub codigo_retiro: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    pub id: i32,
    pub codigo: String,
    pub tipo_documento: String,
    pub cliente: String,
    pub telefono: Option<String>,
    pub estado: String,
    pub asignado_a: Option<i32>,
    pub codigo_retiro: Option<String>,
    pub entregado_a: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct DocumentListItem {
    pub id: i32,
    pub codigo: String,
    pub tipo_documento: String,
    pub cliente: String,
    pub estado: String,
    pub asignado_a: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentListResponse {
    pub data: Vec<DocumentListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive search over codigo and cliente.
    pub search: Option<String>,
    /// Filter by document status.
    pub estado: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<crate::entity::document::Model> for DocumentResponse {
    fn from(m: crate::entity::document::Model) -> Self {
        Self {
            id: m.id,
            codigo: m.codigo,
            tipo_documento: m.tipo_documento,
            cliente: m.cliente,
            telefono: m.telefono,
            estado: m.estado,
            asignado_a: m.asignado_a,
            codigo_retiro: m.codigo_retiro,
            entregado_a: m.entregado_a,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_document(req: &CreateDocumentRequest) -> Result<(), AppError> {
    validate_short_text(&req.codigo, "Codigo")?;
    validate_short_text(&req.tipo_documento, "Tipo de documento")?;
    validate_short_text(&req.cliente, "Cliente")?;
    if let Some(ref telefono) = req.telefono {
        validate_telefono(telefono)?;
    }
    Ok(())
}

pub fn validate_update_document(req: &UpdateDocumentRequest) -> Result<(), AppError> {
    if let Some(ref tipo) = req.tipo_documento {
        validate_short_text(tipo, "Tipo de documento")?;
    }
    if let Some(ref cliente) = req.cliente {
        validate_short_text(cliente, "Cliente")?;
    }
    if let Some(Some(ref telefono)) = req.telefono {
        validate_telefono(telefono)?;
    }
    Ok(())
}

fn validate_telefono(telefono: &str) -> Result<(), AppError> {
    let telefono = telefono.trim();
    if telefono.is_empty() || telefono.chars().count() > 32 {
        return Err(AppError::Validation(
            "Telefono must be 1-32 characters".into(),
        ));
    }
    if !telefono
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
    {
        return Err(AppError::Validation(
            "Telefono may contain only digits, spaces, '+' and '-'".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_codigo_is_accepted_at_creation() {
        // Codes without a trailing digit run are legal data; the gap audit
        // reports them as invalid instead of this endpoint rejecting them.
        let req = CreateDocumentRequest {
            codigo: "SIN-NUMERO".into(),
            tipo_documento: "Poder".into(),
            cliente: "ANA TORRES".into(),
            telefono: None,
            asignado_a: None,
        };
        assert!(validate_create_document(&req).is_ok());
    }

    #[test]
    fn telefono_rules() {
        assert!(validate_telefono("+593 99-123-4567").is_ok());
        assert!(validate_telefono("llamar al medio día").is_err());
        assert!(validate_telefono("").is_err());
    }
}
