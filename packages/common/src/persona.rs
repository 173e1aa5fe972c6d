//! Otorgante/beneficiario records and the data-quality gate applied to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of identity document attached to a persona.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentoTipo {
    #[default]
    Cedula,
    Ruc,
    Pasaporte,
}

impl DocumentoTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cedula => "cedula",
            Self::Ruc => "ruc",
            Self::Pasaporte => "pasaporte",
        }
    }
}

impl fmt::Display for DocumentoTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentoTipo {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cedula" => Ok(Self::Cedula),
            "ruc" => Ok(Self::Ruc),
            "pasaporte" => Ok(Self::Pasaporte),
            _ => Err(()),
        }
    }
}

/// A granting or benefiting party of an escritura.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub nombre: String,
    #[serde(default)]
    pub documento: DocumentoTipo,
    #[serde(default)]
    pub numero: String,
    /// Name of the legal representative, when the party acts through one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representado_por: Option<String>,
    /// Free-text role, e.g. "POR SUS PROPIOS DERECHOS".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nacionalidad: Option<String>,
}

/// Extraction-noise fragments that disqualify a persona name outright.
///
/// Upstream PDF text extraction frequently injects table headers and field
/// labels into the parsed party lists; any name containing one of these is
/// a fragment, not a person.
const NOISE_FRAGMENTS: &[&str] = &[
    "DOCUMENTO",
    "CEDULA",
    "CÉDULA",
    "PASAPORTE",
    "COMPARECIENTE",
    "IDENTIDAD",
    "IDENTIFICACION",
    "IDENTIFICACIÓN",
    "NACIONALIDAD",
    "OTORGANTE",
    "BENEFICIARIO",
    "A FAVOR DE",
    "NOMBRES Y APELLIDOS",
];

/// Returns true when a persona entry survives the data-quality gate.
///
/// An entry is discarded when its name: is shorter than 5 characters,
/// contains a known extraction-noise fragment, has no alphabetic content at
/// all, or has fewer than two whitespace-separated words. This is a quality
/// gate against OCR/table-header junk, not a business rule, and it runs
/// identically on pasted and machine-extracted input.
pub fn is_valid_persona(persona: &Persona) -> bool {
    let nombre = persona.nombre.trim();

    if nombre.chars().count() < 5 {
        return false;
    }

    let upper = nombre.to_uppercase();
    if NOISE_FRAGMENTS.iter().any(|frag| upper.contains(frag)) {
        return false;
    }

    if !nombre.chars().any(char::is_alphabetic) {
        return false;
    }

    if nombre.split_whitespace().count() < 2 {
        return false;
    }

    true
}

/// Filter a persona list down to the entries that pass the quality gate.
pub fn sanitize_personas(personas: Vec<Persona>) -> Vec<Persona> {
    personas.into_iter().filter(is_valid_persona).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(nombre: &str) -> Persona {
        Persona {
            nombre: nombre.to_string(),
            ..Persona::default()
        }
    }

    #[test]
    fn real_name_survives_noise_fragments_do_not() {
        let input = vec![
            named("JUAN CARLOS PEREZ"),
            named("DOCUMENTO DE IDENTIDAD"),
            named("12345"),
            named("X"),
        ];
        let result = sanitize_personas(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].nombre, "JUAN CARLOS PEREZ");
    }

    #[test]
    fn short_names_are_dropped() {
        assert!(!is_valid_persona(&named("AB C")));
        assert!(is_valid_persona(&named("ANA LI")));
    }

    #[test]
    fn single_word_names_are_dropped() {
        assert!(!is_valid_persona(&named("GONZALEZ")));
    }

    #[test]
    fn numeric_and_punctuation_only_are_dropped() {
        assert!(!is_valid_persona(&named("1712345678")));
        assert!(!is_valid_persona(&named("--- ***")));
    }

    #[test]
    fn noise_fragment_anywhere_in_the_name_drops_it() {
        assert!(!is_valid_persona(&named("MARIA COMPARECIENTE LOPEZ")));
        assert!(!is_valid_persona(&named("cedula de ciudadania")));
    }

    #[test]
    fn accented_names_are_fine() {
        assert!(is_valid_persona(&named("JOSÉ MARÍA ANDRADE")));
    }

    #[test]
    fn serde_uses_camel_case() {
        let persona = Persona {
            nombre: "ANA TORRES VACA".into(),
            documento: DocumentoTipo::Cedula,
            numero: "1712345678".into(),
            representado_por: Some("PEDRO VACA".into()),
            calidad: None,
            nacionalidad: None,
        };
        let value = serde_json::to_value(&persona).unwrap();
        assert_eq!(value["representadoPor"], "PEDRO VACA");
        assert_eq!(value["documento"], "cedula");
        assert!(value.get("calidad").is_none());
    }
}
