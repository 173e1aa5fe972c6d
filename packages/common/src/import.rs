//! Best-effort parser for bulk-pasted otorgante/beneficiario text.
//!
//! Matrizadores paste party lists copied out of minutas or old records, one
//! party per line. Each line is classified, scanned for an embedded national
//! ID, and turned into a persona candidate. Ambiguous or hopeless lines are
//! dropped, never reported as errors, and every candidate goes through the
//! same quality gate as machine-extracted data.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::persona::{DocumentoTipo, Persona, sanitize_personas};

/// A 9-13 character alphanumeric run: the shape of Ecuadorian cedulas (10
/// digits), RUCs (13 digits), and passport numbers.
static ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9]{9,13}\b").expect("valid regex"));

/// Fallback column separator: tabs or runs of two-plus spaces.
static COLUMN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("valid regex"));

/// Labels stripped off the front of a name portion before it is used.
const LINE_LABELS: &[&str] = &[
    "OTORGADO POR",
    "OTORGANTE",
    "COMPARECIENTE",
    "A FAVOR DE",
    "A FAVOR",
    "BENEFICIARIO",
];

/// Which persona list a parsed line lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportTarget {
    Otorgante,
    Beneficiario,
}

/// Result of one import pass, already sanitized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImportedPersonas {
    pub otorgantes: Vec<Persona>,
    pub beneficiarios: Vec<Persona>,
}

/// Parse freeform pasted text into persona candidates.
///
/// Lines that mention no classification keyword fall back to
/// `default_target`. Never errors: the worst outcome for a line is that no
/// candidate survives.
pub fn parse_personas_text(text: &str, default_target: ImportTarget) -> ImportedPersonas {
    let mut otorgantes = Vec::new();
    let mut beneficiarios = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let target = classify_target(line, default_target);
        let Some(persona) = parse_line(line) else {
            tracing::debug!(line, "import line yielded no persona candidate");
            continue;
        };

        match target {
            ImportTarget::Otorgante => otorgantes.push(persona),
            ImportTarget::Beneficiario => beneficiarios.push(persona),
        }
    }

    ImportedPersonas {
        otorgantes: sanitize_personas(otorgantes),
        beneficiarios: sanitize_personas(beneficiarios),
    }
}

fn classify_target(line: &str, default_target: ImportTarget) -> ImportTarget {
    let upper = line.to_uppercase();
    if upper.contains("BENEFICIARIO") || upper.contains("A FAVOR") {
        ImportTarget::Beneficiario
    } else if upper.contains("COMPARECIENTE")
        || upper.contains("OTORGANTE")
        || upper.contains("OTORGADO POR")
    {
        ImportTarget::Otorgante
    } else {
        default_target
    }
}

fn parse_line(line: &str) -> Option<Persona> {
    if let Some(token) = ID_TOKEN
        .find_iter(line)
        .find(|m| m.as_str().bytes().any(|b| b.is_ascii_digit()))
    {
        let nombre = clean_fragment(&line[..token.start()]);
        let calidad = clean_fragment(&line[token.end()..]);
        return build_candidate(
            nombre,
            classify_documento(token.as_str()),
            token.as_str().to_string(),
            calidad,
        );
    }

    // No ID anywhere: treat the line as columns, first is the name and the
    // last is the calidad.
    let columns: Vec<String> = COLUMN_SPLIT
        .split(line)
        .map(clean_fragment)
        .filter(|c| !c.is_empty())
        .collect();

    match columns.as_slice() {
        [] => None,
        [only] => build_candidate(only.clone(), DocumentoTipo::default(), String::new(), String::new()),
        [first, .., last] => build_candidate(
            first.clone(),
            DocumentoTipo::default(),
            String::new(),
            last.clone(),
        ),
    }
}

/// Classify a matched ID token into a document type.
///
/// Observed Ecuadorian formats: 10 digits is a cedula, 13 a RUC; anything
/// with letters or fewer than 10 digits is recorded as a passport. This is
/// best-effort, not authoritative.
fn classify_documento(token: &str) -> DocumentoTipo {
    if token.bytes().any(|b| b.is_ascii_alphabetic()) {
        return DocumentoTipo::Pasaporte;
    }
    match token.len() {
        10 => DocumentoTipo::Cedula,
        13 => DocumentoTipo::Ruc,
        _ => DocumentoTipo::Pasaporte,
    }
}

fn build_candidate(
    nombre: String,
    documento: DocumentoTipo,
    numero: String,
    calidad: String,
) -> Option<Persona> {
    if nombre.chars().count() <= 2 {
        return None;
    }
    Some(Persona {
        nombre,
        documento,
        numero,
        representado_por: None,
        calidad: (!calidad.is_empty()).then_some(calidad),
        nacionalidad: None,
    })
}

/// Strip line labels and surrounding separator punctuation off a fragment.
fn clean_fragment(fragment: &str) -> String {
    let mut rest = fragment.trim();

    loop {
        rest = rest.trim_start_matches([':', ',', ';', '-', '.', ' ']);
        let mut stripped = false;
        for label in LINE_LABELS {
            if let Some(tail) = strip_prefix_ci(rest, label) {
                rest = tail;
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }

    rest.trim_matches([':', ',', ';', '-', '.', ' ']).to_string()
}

/// ASCII-case-insensitive prefix strip.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cedula_line_with_label_and_calidad() {
        let result = parse_personas_text(
            "COMPARECIENTE: JUAN CARLOS PEREZ 1712345678 POR SUS PROPIOS DERECHOS",
            ImportTarget::Beneficiario,
        );

        assert!(result.beneficiarios.is_empty());
        assert_eq!(result.otorgantes.len(), 1);
        let p = &result.otorgantes[0];
        assert_eq!(p.nombre, "JUAN CARLOS PEREZ");
        assert_eq!(p.numero, "1712345678");
        assert_eq!(p.documento, DocumentoTipo::Cedula);
        assert_eq!(p.calidad.as_deref(), Some("POR SUS PROPIOS DERECHOS"));
    }

    #[test]
    fn ruc_goes_to_beneficiarios_on_a_favor() {
        let result = parse_personas_text(
            "A FAVOR DE INMOBILIARIA DEL VALLE 1791234567001",
            ImportTarget::Otorgante,
        );

        assert_eq!(result.beneficiarios.len(), 1);
        let p = &result.beneficiarios[0];
        assert_eq!(p.nombre, "INMOBILIARIA DEL VALLE");
        assert_eq!(p.documento, DocumentoTipo::Ruc);
    }

    #[test]
    fn lettered_token_is_a_passport() {
        let result = parse_personas_text(
            "MARIA FERNANDA SILVA AB1234567 COMPRADORA",
            ImportTarget::Otorgante,
        );
        let p = &result.otorgantes[0];
        assert_eq!(p.documento, DocumentoTipo::Pasaporte);
        assert_eq!(p.numero, "AB1234567");
    }

    #[test]
    fn nine_digit_token_is_a_passport() {
        let result =
            parse_personas_text("CARLOS ANDRADE MORA 123456789", ImportTarget::Otorgante);
        assert_eq!(result.otorgantes[0].documento, DocumentoTipo::Pasaporte);
    }

    #[test]
    fn fallback_splits_on_double_spaces_and_tabs() {
        let result = parse_personas_text(
            "PEDRO PABLO MONCAYO\t\tAPODERADO\nROSA ELVIRA CHILUISA   VENDEDORA",
            ImportTarget::Otorgante,
        );

        assert_eq!(result.otorgantes.len(), 2);
        assert_eq!(result.otorgantes[0].nombre, "PEDRO PABLO MONCAYO");
        assert_eq!(result.otorgantes[0].calidad.as_deref(), Some("APODERADO"));
        assert_eq!(result.otorgantes[0].numero, "");
        assert_eq!(result.otorgantes[1].calidad.as_deref(), Some("VENDEDORA"));
    }

    #[test]
    fn hopeless_lines_are_dropped_silently() {
        let result = parse_personas_text("123\n\n   \n--\nX Y", ImportTarget::Otorgante);
        assert!(result.otorgantes.is_empty());
        assert!(result.beneficiarios.is_empty());
    }

    #[test]
    fn candidates_still_pass_the_quality_gate() {
        // Parses fine, but a single-word name does not survive sanitization.
        let result = parse_personas_text("GONZALEZ 1712345678", ImportTarget::Otorgante);
        assert!(result.otorgantes.is_empty());
    }

    #[test]
    fn default_target_applies_without_keywords() {
        let result =
            parse_personas_text("LUIS ALFREDO TAPIA 1712345678", ImportTarget::Beneficiario);
        assert_eq!(result.beneficiarios.len(), 1);
        assert!(result.otorgantes.is_empty());
    }

    #[test]
    fn fourteen_character_runs_do_not_match_as_ids() {
        let result =
            parse_personas_text("ANA MARIA 12345678901234 VENDEDORA", ImportTarget::Otorgante);
        // The 14-digit run is not an ID; the line falls back to column
        // parsing and the whole of it stays out of `numero`.
        assert_eq!(result.otorgantes.len(), 1);
        assert_eq!(result.otorgantes[0].numero, "");
    }
}
