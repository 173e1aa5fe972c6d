//! Access control for escritura pages and extracted fields.
//!
//! Two capability tiers exist: privileged staff (matrizador/admin, editing
//! view) and a public visitor holding only the verification token. Both
//! resolutions are pure functions over already-loaded data; the server layer
//! enforces the `activo`-only precondition for public token lookups before
//! any of this runs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datos::DatosCompletos;

/// Resolution of one page request against the hidden-page set.
///
/// A hidden page serializes as `{"hidden": true, "pageNumber": n}` — the
/// redaction marker the public viewer renders in place of the page. This is
/// a normal outcome, not an error; the HTTP layer returns it with 200.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub hidden: bool,
    pub page_number: u32,
}

impl PageView {
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Field set handed back for one actor tier.
#[derive(Clone, Debug, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub datos: DatosCompletos,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
}

/// Resolve a page request.
///
/// Privileged actors always see the page. For a public actor the page is
/// redacted exactly when its number is in the hidden set; out-of-range
/// numbers are simply "not hidden".
pub fn resolve_page(hidden_pages: &BTreeSet<u32>, page_number: u32, privileged: bool) -> PageView {
    PageView {
        hidden: !privileged && hidden_pages.contains(&page_number),
        page_number,
    }
}

/// Resolve the extracted field set for an actor tier.
///
/// Privileged actors get the raw fields plus the photo URL for editing; the
/// public view is sanitized (persona quality gate on both lists) and never
/// includes the photo URL.
pub fn resolve_fields(
    datos: &DatosCompletos,
    foto_url: Option<&str>,
    privileged: bool,
) -> FieldView {
    if privileged {
        FieldView {
            datos: datos.clone(),
            foto_url: foto_url.map(str::to_string),
        }
    } else {
        FieldView {
            datos: datos.sanitized(),
            foto_url: None,
        }
    }
}

/// Normalize a wholesale hidden-page replacement.
///
/// The caller always supplies the complete new set, never a delta; zeros are
/// dropped (pages are 1-based) and duplicates collapse. Applying the same
/// set twice is a no-op.
pub fn normalize_hidden_pages(pages: &[u32]) -> BTreeSet<u32> {
    pages.iter().copied().filter(|&p| p > 0).collect()
}

/// Read a hidden-page set out of its JSONB column value.
///
/// Tolerates junk: a non-array value yields the empty set, and entries that
/// are not positive integers are skipped. Page lookups must never crash on
/// malformed stored data.
pub fn hidden_pages_from_value(value: &Value) -> BTreeSet<u32> {
    let Some(items) = value.as_array() else {
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(Value::as_u64)
        .filter(|&p| p > 0 && p <= u32::MAX as u64)
        .map(|p| p as u32)
        .collect()
}

/// Serialize a hidden-page set back into its JSONB column form.
pub fn hidden_pages_to_value(pages: &BTreeSet<u32>) -> Value {
    Value::Array(pages.iter().map(|&p| Value::from(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hidden(pages: &[u32]) -> BTreeSet<u32> {
        pages.iter().copied().collect()
    }

    #[test]
    fn public_actor_gets_marker_iff_page_is_hidden() {
        let set = hidden(&[2, 5]);
        for page in 1..=6 {
            let view = resolve_page(&set, page, false);
            assert_eq!(view.is_hidden(), set.contains(&page));
            assert_eq!(view.page_number, page);
        }
    }

    #[test]
    fn privileged_actor_never_gets_a_marker() {
        let set = hidden(&[1, 2, 3]);
        for page in 1..=3 {
            assert!(!resolve_page(&set, page, true).is_hidden());
        }
    }

    #[test]
    fn out_of_range_pages_are_not_hidden() {
        let set = hidden(&[2]);
        assert!(!resolve_page(&set, 999, false).is_hidden());
        assert!(!resolve_page(&set, 0, false).is_hidden());
    }

    #[test]
    fn hidden_marker_wire_shape() {
        let view = resolve_page(&hidden(&[3]), 3, false);
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({"hidden": true, "pageNumber": 3})
        );
    }

    #[test]
    fn replacement_is_wholesale_and_idempotent() {
        let first = normalize_hidden_pages(&[3, 1, 3, 0, 1]);
        assert_eq!(first, hidden(&[1, 3]));
        // Re-applying the normalized set changes nothing.
        let again: Vec<u32> = first.iter().copied().collect();
        assert_eq!(normalize_hidden_pages(&again), first);
    }

    #[test]
    fn junk_column_values_yield_empty_or_partial_sets() {
        assert!(hidden_pages_from_value(&json!(null)).is_empty());
        assert!(hidden_pages_from_value(&json!({"a": 1})).is_empty());
        assert_eq!(
            hidden_pages_from_value(&json!([2, "x", -1, 0, 7.5, 4])),
            hidden(&[2, 4])
        );
    }

    #[test]
    fn column_round_trip() {
        let set = hidden(&[1, 4, 9]);
        assert_eq!(hidden_pages_from_value(&hidden_pages_to_value(&set)), set);
    }

    #[test]
    fn public_fields_are_sanitized_and_photo_free() {
        let datos = DatosCompletos::from_value(&json!({
            "otorgantes": [
                {"nombre": "JUAN CARLOS PEREZ"},
                {"nombre": "DOCUMENTO DE IDENTIDAD"},
            ],
        }));

        let public = resolve_fields(&datos, Some("https://fotos/x.jpg"), false);
        assert_eq!(public.datos.otorgantes.len(), 1);
        assert_eq!(public.foto_url, None);

        let staff = resolve_fields(&datos, Some("https://fotos/x.jpg"), true);
        assert_eq!(staff.datos.otorgantes.len(), 2);
        assert_eq!(staff.foto_url.as_deref(), Some("https://fotos/x.jpg"));
    }
}
