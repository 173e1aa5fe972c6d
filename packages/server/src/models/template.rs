use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_short_text;

/// Maximum WhatsApp template body length.
const MAX_MENSAJE_LEN: usize = 4096;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTemplateRequest {
    /// Template identifier, e.g. "documento_listo".
    #[schema(example = "documento_listo")]
    pub nombre: String,
    /// Message body with `{placeholder}` markers.
    #[schema(example = "Estimado/a {cliente}, su documento {codigo} está listo.")]
    pub mensaje: String,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTemplateRequest {
    pub nombre: Option<String>,
    pub mensaje: Option<String>,
    pub activo: Option<bool>,
}

/// Variable values for a preview rendering.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct PreviewTemplateRequest {
    #[schema(example = json!({"cliente": "JUAN PEREZ", "codigo": "20241701022P04128"}))]
    pub variables: BTreeMap<String, String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PreviewTemplateResponse {
    /// The rendered message; unknown placeholders stay verbatim.
    pub mensaje: String,
    /// Placeholders the template references, in first-use order.
    pub variables: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TemplateResponse {
    pub id: i32,
    pub nombre: String,
    pub mensaje: String,
    pub activo: bool,
    /// Placeholders the template references.
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::notification_template::Model> for TemplateResponse {
    fn from(m: crate::entity::notification_template::Model) -> Self {
        let variables = common::notify::template_variables(&m.mensaje);
        Self {
            id: m.id,
            nombre: m.nombre,
            mensaje: m.mensaje,
            activo: m.activo,
            variables,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_template(req: &CreateTemplateRequest) -> Result<(), AppError> {
    validate_short_text(&req.nombre, "Nombre")?;
    validate_mensaje(&req.mensaje)
}

pub fn validate_update_template(req: &UpdateTemplateRequest) -> Result<(), AppError> {
    if let Some(ref nombre) = req.nombre {
        validate_short_text(nombre, "Nombre")?;
    }
    if let Some(ref mensaje) = req.mensaje {
        validate_mensaje(mensaje)?;
    }
    Ok(())
}

fn validate_mensaje(mensaje: &str) -> Result<(), AppError> {
    if mensaje.trim().is_empty() || mensaje.len() > MAX_MENSAJE_LEN {
        return Err(AppError::Validation(format!(
            "Mensaje must be non-empty and at most {MAX_MENSAJE_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_template_validation() {
        let ok = CreateTemplateRequest {
            nombre: "documento_listo".into(),
            mensaje: "Hola {cliente}".into(),
            activo: true,
        };
        assert!(validate_create_template(&ok).is_ok());

        let empty = CreateTemplateRequest {
            nombre: "x".into(),
            mensaje: "  ".into(),
            activo: true,
        };
        assert!(validate_create_template(&empty).is_err());
    }
}
