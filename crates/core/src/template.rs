//! Contract template parsing, placeholder extraction, and filling.
//!
//! Template bodies are free text with embedded `{{ identifier }}` tokens.
//! [`parse`] tokenizes a body into [`Fragment`]s once; extraction and
//! rendering both work from the fragment list, so rendering never re-reads
//! its own output.
//!
//! There is no escape syntax. A `{{` that does not open a well-formed
//! placeholder is kept as literal text, one brace at a time, so
//! `{{{name}}}` renders as `{` + value + `}`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a template name in characters.
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 200;

/// Maximum length of a template body in bytes.
pub const MAX_TEMPLATE_CONTENT_LENGTH: usize = 200_000;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Fragment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    fragments: Vec<Fragment>,
}

impl Template {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Distinct placeholder names in first-seen order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for fragment in &self.fragments {
            if let Fragment::Placeholder(name) = fragment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholders with no non-empty value in `values`, first-seen order.
    pub fn missing<'a>(&'a self, values: &HashMap<String, String>) -> Vec<&'a str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !has_value(values, name))
            .collect()
    }

    /// Render the template, substituting each placeholder with its value.
    ///
    /// Placeholders without a non-empty value render as `[name]`.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => out.push_str(text),
                Fragment::Placeholder(name) => match values.get(name) {
                    Some(value) if !value.is_empty() => out.push_str(value),
                    _ => {
                        out.push('[');
                        out.push_str(name);
                        out.push(']');
                    }
                },
            }
        }
        out
    }
}

fn has_value(values: &HashMap<String, String>, name: &str) -> bool {
    values.get(name).is_some_and(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Tokenize a template body into literal and placeholder fragments.
///
/// Adjacent literal text is merged into a single fragment.
pub fn parse(text: &str) -> Template {
    let mut fragments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    loop {
        let Some(pos) = rest.find(OPEN) else {
            literal.push_str(rest);
            break;
        };
        literal.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        match match_placeholder(candidate) {
            Some((name, consumed)) => {
                if !literal.is_empty() {
                    fragments.push(Fragment::Literal(std::mem::take(&mut literal)));
                }
                fragments.push(Fragment::Placeholder(name.to_string()));
                rest = &candidate[consumed..];
            }
            None => {
                // Not a placeholder here; keep one brace and rescan from the next.
                literal.push('{');
                rest = &candidate[1..];
            }
        }
    }

    if !literal.is_empty() {
        fragments.push(Fragment::Literal(literal));
    }

    Template { fragments }
}

/// Try to read `{{ ident }}` at the start of `input`.
///
/// Returns the identifier and the number of bytes consumed.
fn match_placeholder(input: &str) -> Option<(&str, usize)> {
    let body = input.strip_prefix(OPEN)?;

    let after_lead = body.trim_start();
    let lead = body.len() - after_lead.len();

    let ident_len = after_lead
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if ident_len == 0 {
        return None;
    }
    let ident = &after_lead[..ident_len];

    let after_ident = &after_lead[ident_len..];
    let after_trail = after_ident.trim_start();
    let trail = after_ident.len() - after_trail.len();

    if !after_trail.starts_with(CLOSE) {
        return None;
    }

    Some((ident, OPEN.len() + lead + ident_len + trail + CLOSE.len()))
}

// ---------------------------------------------------------------------------
// Convenience wrappers
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated placeholder names in a template body.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    parse(text)
        .placeholders()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Parse and render a template body in one step.
pub fn fill_template(text: &str, values: &HashMap<String, String>) -> String {
    parse(text).render(values)
}

/// Flatten a JSON object of filled values into a string map.
///
/// Strings are used as-is, numbers and booleans are stringified, and
/// `null`, arrays, and nested objects are skipped. A non-object input
/// yields an empty map.
pub fn values_from_json(value: &serde_json::Value) -> HashMap<String, String> {
    let Some(object) = value.as_object() else {
        return HashMap::new();
    };
    object
        .iter()
        .filter_map(|(key, v)| {
            let text = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Template roles
// ---------------------------------------------------------------------------

/// Which kind of party a contract template is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateRole {
    Company,
    Freelancer,
    Mentor,
    Delivery,
}

impl TemplateRole {
    pub const ALL: [TemplateRole; 4] = [
        TemplateRole::Company,
        TemplateRole::Freelancer,
        TemplateRole::Mentor,
        TemplateRole::Delivery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateRole::Company => "company",
            TemplateRole::Freelancer => "freelancer",
            TemplateRole::Mentor => "mentor",
            TemplateRole::Delivery => "delivery",
        }
    }

    /// Placeholders the template editor suggests for this role.
    pub fn recommended_placeholders(self) -> &'static [&'static str] {
        match self {
            TemplateRole::Company => &[
                "company_name",
                "company_address",
                "contact_name",
                "contact_email",
                "service_description",
                "start_date",
                "end_date",
                "fee",
                "payment_terms",
                "contract_date",
            ],
            TemplateRole::Freelancer => &[
                "freelancer_name",
                "freelancer_address",
                "freelancer_email",
                "role_title",
                "day_rate",
                "start_date",
                "end_date",
                "contract_date",
            ],
            TemplateRole::Mentor => &[
                "mentor_name",
                "mentor_email",
                "mentee_name",
                "session_frequency",
                "start_date",
                "fee",
                "contract_date",
            ],
            TemplateRole::Delivery => &[
                "trainer_name",
                "course_title",
                "delivery_date",
                "venue",
                "participant_count",
                "fee",
                "contract_date",
            ],
        }
    }
}

impl fmt::Display for TemplateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid template type '{s}'. Must be one of: company, freelancer, mentor, delivery"
                )
            })
    }
}

/// Placeholders used by a template that are not in its role's recommended set.
pub fn unrecognised_placeholders(text: &str, role: TemplateRole) -> Vec<String> {
    let recommended = role.recommended_placeholders();
    extract_placeholders(text)
        .into_iter()
        .filter(|p| !recommended.contains(&p.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a template name: non-blank and within the length limit.
pub fn validate_template_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Template name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_TEMPLATE_NAME_LENGTH {
        return Err(format!(
            "Template name exceeds maximum length of {MAX_TEMPLATE_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a template body length.
pub fn validate_template_content(content: &str) -> Result<(), String> {
    if content.len() > MAX_TEMPLATE_CONTENT_LENGTH {
        return Err(format!(
            "Template content exceeds maximum length of {MAX_TEMPLATE_CONTENT_LENGTH} bytes"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -- extraction ----------------------------------------------------------

    #[test]
    fn duplicates_collapse_in_first_seen_order() {
        assert_eq!(
            extract_placeholders("{{a}} text {{a}} {{b}}"),
            vec!["a", "b"]
        );
    }

    #[test]
    fn order_follows_first_occurrence_not_alphabet() {
        assert_eq!(
            extract_placeholders("{{zeta}} {{alpha}} {{zeta}}"),
            vec!["zeta", "alpha"]
        );
    }

    #[test]
    fn internal_whitespace_is_tolerated() {
        assert_eq!(
            extract_placeholders("{{ name }} and {{\tdate\n}}"),
            vec!["name", "date"]
        );
    }

    #[test]
    fn spaced_and_unspaced_forms_are_the_same_placeholder() {
        assert_eq!(extract_placeholders("{{name}} {{ name }}"), vec!["name"]);
    }

    #[test]
    fn identifiers_allow_digits_and_underscores() {
        assert_eq!(
            extract_placeholders("{{line_1}} {{2nd}}"),
            vec!["line_1", "2nd"]
        );
    }

    #[test]
    fn malformed_tokens_are_not_placeholders() {
        assert!(extract_placeholders("{{}} {{ }} {{first name}} {{a-b}} {{open").is_empty());
    }

    #[test]
    fn single_braces_are_not_placeholders() {
        assert!(extract_placeholders("{name} }}{{").is_empty());
    }

    #[test]
    fn triple_brace_matches_inner_placeholder() {
        assert_eq!(extract_placeholders("{{{name}}}"), vec!["name"]);
    }

    #[test]
    fn empty_text_has_no_placeholders() {
        assert!(extract_placeholders("").is_empty());
    }

    // -- fragments -----------------------------------------------------------

    #[test]
    fn parse_produces_typed_fragments() {
        let template = parse("Dear {{name}}, welcome.");
        assert_eq!(
            template.fragments(),
            &[
                Fragment::Literal("Dear ".to_string()),
                Fragment::Placeholder("name".to_string()),
                Fragment::Literal(", welcome.".to_string()),
            ]
        );
    }

    #[test]
    fn failed_open_merges_into_surrounding_literal() {
        let template = parse("a {{ b c");
        assert_eq!(
            template.fragments(),
            &[Fragment::Literal("a {{ b c".to_string())]
        );
    }

    // -- filling -------------------------------------------------------------

    #[test]
    fn fill_substitutes_present_value() {
        assert_eq!(
            fill_template("Dear {{name}},", &values(&[("name", "Jane")])),
            "Dear Jane,"
        );
    }

    #[test]
    fn fill_marks_missing_value() {
        assert_eq!(fill_template("Dear {{name}},", &HashMap::new()), "Dear [name],");
    }

    #[test]
    fn fill_treats_empty_value_as_missing() {
        assert_eq!(
            fill_template("Dear {{name}},", &values(&[("name", "")])),
            "Dear [name],"
        );
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        assert_eq!(
            fill_template(
                "{{ name }} and {{name}} again",
                &values(&[("name", "Sam")])
            ),
            "Sam and Sam again"
        );
    }

    #[test]
    fn fill_keeps_malformed_text_verbatim() {
        assert_eq!(
            fill_template("{{ first name }} {{x}}", &values(&[("x", "1")])),
            "{{ first name }} 1"
        );
    }

    #[test]
    fn values_containing_braces_are_not_rescanned() {
        assert_eq!(
            fill_template("{{a}}", &values(&[("a", "{{b}}"), ("b", "nope")])),
            "{{b}}"
        );
    }

    #[test]
    fn rendering_twice_from_template_is_stable() {
        let template = parse("Hi {{name}}");
        let v = values(&[]);
        assert_eq!(template.render(&v), template.render(&v));
    }

    #[test]
    fn missing_lists_unfilled_names() {
        let template = parse("{{a}} {{b}} {{c}} {{a}}");
        let v = values(&[("b", "x"), ("c", "")]);
        assert_eq!(template.missing(&v), vec!["a", "c"]);
    }

    // -- json values ---------------------------------------------------------

    #[test]
    fn json_values_are_flattened() {
        let json = serde_json::json!({
            "name": "Jane",
            "rate": 250,
            "active": true,
            "none": null,
            "list": [1, 2]
        });
        let map = values_from_json(&json);
        assert_eq!(map.get("name").map(String::as_str), Some("Jane"));
        assert_eq!(map.get("rate").map(String::as_str), Some("250"));
        assert_eq!(map.get("active").map(String::as_str), Some("true"));
        assert!(!map.contains_key("none"));
        assert!(!map.contains_key("list"));
    }

    #[test]
    fn non_object_json_yields_empty_map() {
        assert!(values_from_json(&serde_json::json!("text")).is_empty());
    }

    // -- roles ---------------------------------------------------------------

    #[test]
    fn role_round_trips_through_str() {
        for role in TemplateRole::ALL {
            assert_eq!(role.as_str().parse::<TemplateRole>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("supplier".parse::<TemplateRole>().is_err());
        assert!("Company".parse::<TemplateRole>().is_err());
    }

    #[test]
    fn every_role_recommends_contract_date() {
        for role in TemplateRole::ALL {
            assert!(role.recommended_placeholders().contains(&"contract_date"));
        }
    }

    #[test]
    fn unrecognised_placeholders_are_reported() {
        let found = unrecognised_placeholders(
            "{{freelancer_name}} {{shoe_size}}",
            TemplateRole::Freelancer,
        );
        assert_eq!(found, vec!["shoe_size"]);
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn blank_template_name_rejected() {
        assert!(validate_template_name("   ").is_err());
        assert!(validate_template_name("Freelancer agreement").is_ok());
    }

    #[test]
    fn oversized_content_rejected() {
        let content = "a".repeat(MAX_TEMPLATE_CONTENT_LENGTH + 1);
        assert!(validate_template_content(&content).is_err());
    }
}
