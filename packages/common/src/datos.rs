//! Structured extracted fields of an escritura (`datos_completos`).
//!
//! The extraction pipeline produces a loosely shaped JSON blob; the fields
//! the office actually works with are modeled explicitly so the sanitizer
//! and the public field view are statically checked. Anything else the
//! extractor emits is carried through untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::persona::{Persona, sanitize_personas};

/// Where the notarized act took place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ubicacion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provincia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canton: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parroquia: Option<String>,
}

/// The full extracted field set of one escritura.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatosCompletos {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub otorgantes: Vec<Persona>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beneficiarios: Vec<Persona>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<Ubicacion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notaria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acto_contrato: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuantia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_otorgamiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objeto_observaciones: Option<String>,
    /// Unmodeled extractor output, passed through verbatim.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl DatosCompletos {
    /// Parse from a raw JSONB column value. Anything that is not an object
    /// (including null) yields the empty default — extraction junk must
    /// never make a record unreadable.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Returns a copy with both persona lists run through the quality gate.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.otorgantes = sanitize_personas(out.otorgantes);
        out.beneficiarios = sanitize_personas(out.beneficiarios);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_round_trip_through_extra() {
        let raw = json!({
            "notario": "DR. PATRICIO SALAS",
            "cuantia": "USD 45.000,00",
            "campoDesconocido": {"x": 1},
        });
        let datos = DatosCompletos::from_value(&raw);
        assert_eq!(datos.notario.as_deref(), Some("DR. PATRICIO SALAS"));
        assert_eq!(datos.extra["campoDesconocido"], json!({"x": 1}));

        let back = serde_json::to_value(&datos).unwrap();
        assert_eq!(back["campoDesconocido"], json!({"x": 1}));
    }

    #[test]
    fn non_object_values_fall_back_to_default() {
        assert_eq!(DatosCompletos::from_value(&json!(null)), DatosCompletos::default());
        assert_eq!(DatosCompletos::from_value(&json!("junk")), DatosCompletos::default());
    }

    #[test]
    fn sanitized_filters_both_lists() {
        let raw = json!({
            "otorgantes": [
                {"nombre": "JUAN CARLOS PEREZ", "numero": "1712345678"},
                {"nombre": "CEDULA", "numero": ""},
            ],
            "beneficiarios": [
                {"nombre": "X"},
                {"nombre": "MARIA ELENA RIOFRIO"},
            ],
        });
        let datos = DatosCompletos::from_value(&raw).sanitized();
        assert_eq!(datos.otorgantes.len(), 1);
        assert_eq!(datos.beneficiarios.len(), 1);
        assert_eq!(datos.beneficiarios[0].nombre, "MARIA ELENA RIOFRIO");
    }
}
