#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication state of an escritura record.
///
/// Only `activo` escrituras are reachable through the public verification
/// token; the other two states make the token lookup itself fail.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum EscrituraEstado {
    /// Publicly verifiable via its token.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "activo"))]
    Activo,
    /// Extracted data needs staff review before publication.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "revision_requerida"))]
    RevisionRequerida,
    /// Withdrawn from public verification.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "inactivo"))]
    Inactivo,
}

impl EscrituraEstado {
    /// Returns true if a public visitor holding the token may see this record.
    pub fn is_publicly_visible(&self) -> bool {
        matches!(self, Self::Activo)
    }

    /// All possible estado values.
    pub const ALL: &'static [EscrituraEstado] =
        &[Self::Activo, Self::RevisionRequerida, Self::Inactivo];

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activo => "activo",
            Self::RevisionRequerida => "revision_requerida",
            Self::Inactivo => "inactivo",
        }
    }
}

impl fmt::Display for EscrituraEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for EscrituraEstado {
    fn default() -> Self {
        Self::RevisionRequerida
    }
}

/// Error when parsing an invalid estado string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEstadoError {
    invalid: String,
}

impl fmt::Display for ParseEstadoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid estado '{}'. Valid values: {}",
            self.invalid,
            EscrituraEstado::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseEstadoError {}

impl FromStr for EscrituraEstado {
    type Err = ParseEstadoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(Self::Activo),
            "revision_requerida" => Ok(Self::RevisionRequerida),
            "inactivo" => Ok(Self::Inactivo),
            _ => Err(ParseEstadoError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        for estado in EscrituraEstado::ALL {
            let json = serde_json::to_string(estado).unwrap();
            let parsed: EscrituraEstado = serde_json::from_str(&json).unwrap();
            assert_eq!(*estado, parsed);
        }
    }

    #[test]
    fn from_str() {
        assert_eq!(
            "activo".parse::<EscrituraEstado>().unwrap(),
            EscrituraEstado::Activo
        );
        assert!("Activo".parse::<EscrituraEstado>().is_err());
        assert!("borrado".parse::<EscrituraEstado>().is_err());
    }

    #[test]
    fn only_activo_is_public() {
        assert!(EscrituraEstado::Activo.is_publicly_visible());
        assert!(!EscrituraEstado::RevisionRequerida.is_publicly_visible());
        assert!(!EscrituraEstado::Inactivo.is_publicly_visible());
    }
}
