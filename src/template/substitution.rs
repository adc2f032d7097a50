//! Variable substitution engine for templates

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::types::TemplateVariable;

/// Matches any `{{ key }}` placeholder, capturing the key.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("valid regex"));

/// Substitute `{{key}}` placeholders in an HTML body.
///
/// Variables are applied in order. Every occurrence of `{{`, optional
/// whitespace, the key, optional whitespace and `}}` is replaced by the value.
/// A missing or empty value puts back the canonical `{{key}}` so unresolved
/// variables stay visible. Entries with an empty key are skipped.
///
/// Values are inserted as raw HTML without escaping. Callers display the
/// result inside a sandboxed frame.
pub fn substitute(html: &str, variables: &[TemplateVariable]) -> String {
    let mut result = html.to_string();

    for variable in variables {
        if variable.key.is_empty() {
            continue;
        }

        let pattern = format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(&variable.key));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(key = %variable.key, error = %e, "Skipping unusable variable key");
                continue;
            }
        };

        let replacement = match variable.value.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => format!("{{{{{}}}}}", variable.key),
        };

        result = re.replace_all(&result, NoExpand(&replacement)).into_owned();
    }

    result
}

/// Distinct placeholder keys in order of first appearance.
pub fn extract_placeholders(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(key: &str, value: &str) -> TemplateVariable {
        TemplateVariable {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn test_substitute_simple() {
        let html = "<p>Hi {{name}}</p>";
        assert_eq!(substitute(html, &[var("name", "Sam")]), "<p>Hi Sam</p>");
    }

    #[test]
    fn test_substitute_whitespace_tolerant_and_global() {
        let html = "{{ name }} / {{name}} / {{   name}}";
        assert_eq!(substitute(html, &[var("name", "Ada")]), "Ada / Ada / Ada");
    }

    #[test]
    fn test_substitute_case_sensitive() {
        let html = "{{Name}} {{name}}";
        assert_eq!(substitute(html, &[var("name", "x")]), "{{Name}} x");
    }

    #[test]
    fn test_empty_value_restores_canonical_placeholder() {
        let html = "<h1>{{ title }}</h1>";
        assert_eq!(substitute(html, &[var("title", "")]), "<h1>{{title}}</h1>");

        let missing = TemplateVariable {
            key: "title".to_string(),
            value: None,
        };
        assert_eq!(substitute(html, &[missing]), "<h1>{{title}}</h1>");
    }

    #[test]
    fn test_unknown_keys_left_untouched() {
        let html = "Hello {{ first }} {{last}}";
        assert_eq!(
            substitute(html, &[var("first", "Grace")]),
            "Hello Grace {{last}}"
        );
    }

    #[test]
    fn test_empty_key_skipped() {
        let html = "{{}} {{ a }}";
        assert_eq!(substitute(html, &[var("", "boom"), var("a", "1")]), "{{}} 1");
    }

    #[test]
    fn test_value_is_literal() {
        // `$1` must not be treated as a capture reference
        let html = "Price: {{price}}";
        assert_eq!(substitute(html, &[var("price", "$1.00")]), "Price: $1.00");
    }

    #[test]
    fn test_key_with_regex_metacharacters() {
        let html = "{{user.name}} {{userXname}}";
        assert_eq!(
            substitute(html, &[var("user.name", "Lin")]),
            "Lin {{userXname}}"
        );
    }

    #[test]
    fn test_raw_html_not_escaped() {
        let html = "<div>{{body}}</div>";
        assert_eq!(
            substitute(html, &[var("body", "<b>bold</b>")]),
            "<div><b>bold</b></div>"
        );
    }

    #[test]
    fn test_substitution_idempotent() {
        let html = "<p>{{ a }} and {{b}} and {{c}}</p>";
        let vars = vec![var("a", "1"), var("b", "")];
        let once = substitute(html, &vars);
        let twice = substitute(&once, &vars);
        assert_eq!(once, twice);
        assert_eq!(once, "<p>1 and {{b}} and {{c}}</p>");
    }

    #[test]
    fn test_extract_placeholders() {
        let html = "{{ name }} {{company}} {{name}} {{ url }}";
        assert_eq!(extract_placeholders(html), vec!["name", "company", "url"]);
        assert!(extract_placeholders("<p>none</p>").is_empty());
    }
}
