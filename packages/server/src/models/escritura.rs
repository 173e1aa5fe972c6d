use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::EscrituraEstado;
use common::access::hidden_pages_from_value;
use common::datos::DatosCompletos;
use common::import::{ImportTarget, ImportedPersonas};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::Pagination;
use super::shared::double_option;

/// Upper bound on page counts and hidden-page indices; far above any real
/// deed, low enough to keep junk out of the column.
pub const MAX_PAGES: i32 = 5000;

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CreateEscrituraRequest {
    /// Page count reported by the extraction pipeline. May be omitted until
    /// the PDF is uploaded.
    pub num_pages: Option<i32>,
    /// Initial extracted field set.
    pub datos_completos: Option<DatosCompletos>,
    pub foto_url: Option<String>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateEscrituraRequest {
    pub num_pages: Option<i32>,
    /// Replaces the stored field set wholesale. Persona lists pass through
    /// the same quality gate as extracted data.
    pub datos_completos: Option<DatosCompletos>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub foto_url: Option<Option<String>>,
}

/// Request body for an estado change.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangeEscrituraEstadoRequest {
    pub estado: EscrituraEstado,
}

/// Wholesale replacement of the hidden-page set. The full new set is
/// supplied, never a delta, so there is no merge ambiguity and re-applying
/// the same set is a no-op.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateHiddenPagesRequest {
    /// 1-based page indices to redact from the public view.
    #[schema(example = json!([2, 3, 7]))]
    pub pages: Vec<u32>,
}

/// Freeform otorgante/beneficiario text pasted by a matrizador.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportPersonasRequest {
    pub texto: String,
    /// List a line lands in when it names no keyword.
    pub destino_default: ImportTarget,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportPersonasResponse {
    /// Parsed and sanitized candidates, already merged into the escritura.
    pub imported: ImportedPersonas,
    pub total_otorgantes: usize,
    pub total_beneficiarios: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EscrituraResponse {
    pub id: i32,
    pub token: String,
    pub estado: String,
    pub pdf_file_name: Option<String>,
    pub pdf_hash: Option<String>,
    pub num_pages: i32,
    pub hidden_pages: Vec<u32>,
    pub datos_completos: DatosCompletos,
    pub foto_url: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::escritura::Model> for EscrituraResponse {
    fn from(m: crate::entity::escritura::Model) -> Self {
        let hidden: BTreeSet<u32> = hidden_pages_from_value(&m.hidden_pages);
        Self {
            id: m.id,
            token: m.token,
            estado: m.estado,
            pdf_file_name: m.pdf_file_name,
            pdf_hash: m.pdf_hash,
            num_pages: m.num_pages,
            hidden_pages: hidden.into_iter().collect(),
            datos_completos: DatosCompletos::from_value(&m.datos_completos),
            foto_url: m.foto_url,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct EscrituraListItem {
    pub id: i32,
    pub token: String,
    pub estado: String,
    pub pdf_file_name: Option<String>,
    pub num_pages: i32,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EscrituraListResponse {
    pub data: Vec<EscrituraListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EscrituraListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by estado.
    pub estado: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadPdfResponse {
    pub pdf_hash: String,
    pub pdf_file_name: String,
    pub size: u64,
    pub num_pages: i32,
}

pub fn validate_num_pages(num_pages: i32) -> Result<(), AppError> {
    if !(0..=MAX_PAGES).contains(&num_pages) {
        return Err(AppError::Validation(format!(
            "num_pages must be 0-{MAX_PAGES}"
        )));
    }
    Ok(())
}

/// Validate a wholesale hidden-page replacement against the known page
/// count. Pages must be 1-based; indices beyond the PDF are rejected when
/// the page count is known (zero means "not uploaded yet").
pub fn validate_hidden_pages(pages: &[u32], num_pages: i32) -> Result<(), AppError> {
    if pages.len() > MAX_PAGES as usize {
        return Err(AppError::Validation(format!(
            "At most {MAX_PAGES} hidden pages"
        )));
    }
    if pages.contains(&0) {
        return Err(AppError::Validation("Page indices are 1-based".into()));
    }
    if num_pages > 0
        && let Some(&out) = pages.iter().find(|&&p| p > num_pages as u32)
    {
        return Err(AppError::Validation(format!(
            "Page {out} is beyond the document's {num_pages} pages"
        )));
    }
    Ok(())
}

pub fn validate_foto_url(url: &str) -> Result<(), AppError> {
    let url = url.trim();
    if url.is_empty() || url.len() > 1024 {
        return Err(AppError::Validation(
            "foto_url must be 1-1024 characters".into(),
        ));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Validation(
            "foto_url must be an http(s) URL".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_pages_must_fit_the_document() {
        assert!(validate_hidden_pages(&[1, 2, 3], 10).is_ok());
        assert!(validate_hidden_pages(&[11], 10).is_err());
        assert!(validate_hidden_pages(&[0], 10).is_err());
        // Unknown page count: any positive index is accepted for now.
        assert!(validate_hidden_pages(&[250], 0).is_ok());
    }

    #[test]
    fn num_pages_bounds() {
        assert!(validate_num_pages(0).is_ok());
        assert!(validate_num_pages(MAX_PAGES).is_ok());
        assert!(validate_num_pages(-1).is_err());
        assert!(validate_num_pages(MAX_PAGES + 1).is_err());
    }

    #[test]
    fn foto_url_must_be_http() {
        assert!(validate_foto_url("https://fotos.notaria.ec/a.jpg").is_ok());
        assert!(validate_foto_url("ftp://fotos/a.jpg").is_err());
        assert!(validate_foto_url("").is_err());
    }
}
