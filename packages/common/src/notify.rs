//! WhatsApp message templating.
//!
//! Templates carry `{placeholder}` markers that get filled with document
//! data (client name, retrieval code, ...) right before the office sends
//! the message. Delivery itself happens outside this system; only the
//! rendering lives here.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// Substitute `{placeholder}` markers from the variable map.
///
/// Unknown placeholders are left verbatim — the office edits templates by
/// hand, and silently blanking a typo would hide it in the sent message.
pub fn render_template(template: &str, vars: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// List the distinct placeholders a template references, in first-use order.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let rendered = render_template(
            "Estimado/a {cliente}, su documento {codigo} está listo. Código de retiro: {codigo_retiro}.",
            &vars(&[
                ("cliente", "JUAN PEREZ"),
                ("codigo", "20241701022P04128"),
                ("codigo_retiro", "4821"),
            ]),
        );
        assert_eq!(
            rendered,
            "Estimado/a JUAN PEREZ, su documento 20241701022P04128 está listo. Código de retiro: 4821."
        );
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let rendered = render_template("Hola {cliente}, {typo_aqui}!", &vars(&[("cliente", "ANA")]));
        assert_eq!(rendered, "Hola ANA, {typo_aqui}!");
    }

    #[test]
    fn repeated_placeholders_all_render() {
        let rendered = render_template("{a} y {a}", &vars(&[("a", "x")]));
        assert_eq!(rendered, "x y x");
    }

    #[test]
    fn variables_are_listed_once_in_order() {
        assert_eq!(
            template_variables("{cliente} {codigo} {cliente}"),
            vec!["cliente", "codigo"]
        );
        assert!(template_variables("sin variables").is_empty());
    }
}
