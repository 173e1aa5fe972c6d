#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a tracked document during its office lifecycle.
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
pub enum DocumentStatus {
    /// Being drafted/processed by a matrizador.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "en_proceso"))]
    EnProceso,
    /// Ready for pickup; the client has been (or will be) notified.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "listo"))]
    Listo,
    /// Handed over to the client.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "entregado"))]
    Entregado,
    /// Cancelled; no further processing.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "anulado"))]
    Anulado,
}

impl DocumentStatus {
    /// Returns true if the document has left the tracking pipeline.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Entregado | Self::Anulado)
    }

    /// Returns true if `next` is a legal transition from this status.
    ///
    /// `listo` may be sent back to `en_proceso` when a correction is needed;
    /// `anulado` is reachable from any non-final state; final states have no
    /// outgoing transitions.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        match self {
            Self::EnProceso => matches!(next, Self::Listo | Self::Anulado),
            Self::Listo => matches!(next, Self::Entregado | Self::EnProceso | Self::Anulado),
            Self::Entregado | Self::Anulado => false,
        }
    }

    /// All possible status values.
    pub const ALL: &'static [DocumentStatus] =
        &[Self::EnProceso, Self::Listo, Self::Entregado, Self::Anulado];

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnProceso => "en_proceso",
            Self::Listo => "listo",
            Self::Entregado => "entregado",
            Self::Anulado => "anulado",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        Self::EnProceso
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            DocumentStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for DocumentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_proceso" => Ok(Self::EnProceso),
            "listo" => Ok(Self::Listo),
            "entregado" => Ok(Self::Entregado),
            "anulado" => Ok(Self::Anulado),
            _ => Err(ParseStatusError {
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
        for status in DocumentStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: DocumentStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn pipeline_transitions() {
        use DocumentStatus::*;
        assert!(EnProceso.can_transition_to(Listo));
        assert!(Listo.can_transition_to(Entregado));
        assert!(Listo.can_transition_to(EnProceso));
        assert!(EnProceso.can_transition_to(Anulado));
        assert!(Listo.can_transition_to(Anulado));
    }

    #[test]
    fn final_states_have_no_outgoing_transitions() {
        use DocumentStatus::*;
        for &next in DocumentStatus::ALL {
            assert!(!Entregado.can_transition_to(next));
            assert!(!Anulado.can_transition_to(next));
        }
    }

    #[test]
    fn no_skipping_straight_to_entregado() {
        assert!(!DocumentStatus::EnProceso.can_transition_to(DocumentStatus::Entregado));
    }
}
