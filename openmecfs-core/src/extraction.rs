//! Defensive parsing of reasoning-service output.
//!
//! The service claims to return JSON but may wrap it in prose or return
//! plain refusal text. Parsing yields a tagged [`ParsedExtraction`]
//! rather than an untyped map, so downstream code cannot mistake a
//! failure for valid data. "No usable extraction" is a normal, non-fatal
//! outcome for the hypothesis path.

use serde_json::Value;

/// Outcome of parsing a raw reasoning response.
#[derive(Debug, Clone)]
pub enum ParsedExtraction {
    /// A JSON value was recovered (possibly from inside prose).
    Parsed(Value),
    /// Nothing parseable was found; the raw text is retained for logging.
    Failure { raw: String },
}

impl ParsedExtraction {
    pub fn is_failure(&self) -> bool {
        matches!(self, ParsedExtraction::Failure { .. })
    }
}

/// Parse a raw response: direct parse first, then the first balanced
/// top-level `{...}` or `[...]` fragment, then give up.
pub fn parse_structured(raw: &str) -> ParsedExtraction {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return ParsedExtraction::Parsed(value);
    }
    if let Some(fragment) = find_json_fragment(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fragment)
    {
        return ParsedExtraction::Parsed(value);
    }
    ParsedExtraction::Failure {
        raw: raw.to_string(),
    }
}

/// Locate the first balanced `{...}` or `[...]` span, skipping over
/// string literals so braces inside text don't unbalance the scan.
fn find_json_fragment(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{' || b == b'[')?;
    let (open, close) = if bytes[start] == b'{' {
        (b'{', b'}')
    } else {
        (b'[', b']')
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Coerce a JSON value to a confidence in [0, 1].
///
/// Numbers (and numeric strings) are clamped; anything else, including a
/// missing value, defaults to 0.5.
pub fn coerce_confidence(value: Option<&Value>) -> f32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => (n as f32).clamp(0.0, 1.0),
        None => 0.5,
    }
}

/// Extract a list of trimmed, non-empty strings from a JSON array value.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Candidate fields for a single-paper evidence record, before
/// canonicalization.
#[derive(Debug, Clone)]
pub struct EvidenceDraft {
    pub one_sentence: String,
    pub technical_summary: String,
    pub patient_summary: String,
    pub mechanisms: Vec<String>,
    pub biomarkers: Vec<String>,
    pub confidence: f32,
}

/// Shape an extraction into an evidence draft. Returns `None` only for a
/// parse failure; a parsed object with missing keys yields defaults.
pub fn evidence_from_extraction(extraction: &ParsedExtraction) -> Option<EvidenceDraft> {
    let ParsedExtraction::Parsed(value) = extraction else {
        return None;
    };
    Some(EvidenceDraft {
        one_sentence: string_field(value, "one_sentence"),
        technical_summary: string_field(value, "technical_summary"),
        patient_summary: string_field(value, "patient_summary"),
        mechanisms: string_list(value.get("mechanisms")),
        biomarkers: string_list(value.get("biomarkers")),
        confidence: coerce_confidence(value.get("confidence")),
    })
}

/// Candidate fields for a synthesized hypothesis.
#[derive(Debug, Clone)]
pub struct HypothesisDraft {
    pub title: String,
    pub summary: String,
    pub confidence: f32,
    pub mechanisms: Vec<String>,
    pub biomarkers: Vec<String>,
    pub citations: Vec<String>,
}

/// Shape an extraction into hypothesis drafts.
///
/// Accepts either a bare array or an object wrapping one under a
/// `hypotheses` key. A parse failure or an item without a title yields
/// nothing — the caller proceeds with existing records only.
pub fn hypotheses_from_extraction(extraction: &ParsedExtraction) -> Vec<HypothesisDraft> {
    let ParsedExtraction::Parsed(value) = extraction else {
        return Vec::new();
    };
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => value
            .get("hypotheses")
            .and_then(|h| h.as_array())
            .map(|a| a.as_slice())
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let title = string_field(item, "title");
            if title.is_empty() {
                return None;
            }
            Some(HypothesisDraft {
                title,
                summary: string_field(item, "summary"),
                confidence: coerce_confidence(item.get("confidence")),
                mechanisms: string_list(item.get("mechanisms")),
                biomarkers: string_list(item.get("biomarkers")),
                citations: string_list(item.get("citations")),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_json() {
        let parsed = parse_structured(r#"{"one_sentence": "x"}"#);
        assert!(!parsed.is_failure());
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let raw = "Here are the hypotheses you asked for:\n\
                   [{\"title\": \"A\"}, {\"title\": \"B\"}]\n\
                   Let me know if you need more.";
        let ParsedExtraction::Parsed(value) = parse_structured(raw) else {
            panic!("expected recovery from prose");
        };
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_refusal_is_failure_not_panic() {
        let parsed = parse_structured("Sorry, I cannot comply.");
        assert!(parsed.is_failure());
        assert!(hypotheses_from_extraction(&parsed).is_empty());
        assert!(evidence_from_extraction(&parsed).is_none());
    }

    #[test]
    fn test_fragment_scan_skips_braces_in_strings() {
        let raw = r#"note: {"title": "uses { and } inside", "confidence": 0.9} trailing"#;
        let ParsedExtraction::Parsed(value) = parse_structured(raw) else {
            panic!("expected parse");
        };
        assert_eq!(value["confidence"], json!(0.9));
    }

    #[test]
    fn test_unbalanced_fragment_is_failure() {
        assert!(parse_structured("start { \"title\": \"broken\" ").is_failure());
    }

    #[test]
    fn test_coerce_confidence_clamps_and_defaults() {
        assert_eq!(coerce_confidence(Some(&json!(-0.4))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!(0.5))), 0.5);
        assert_eq!(coerce_confidence(Some(&json!(1.7))), 1.0);
        assert_eq!(coerce_confidence(Some(&json!("high"))), 0.5);
        assert_eq!(coerce_confidence(None), 0.5);
    }

    #[test]
    fn test_coerce_confidence_numeric_string() {
        assert_eq!(coerce_confidence(Some(&json!("0.75"))), 0.75);
    }

    #[test]
    fn test_string_list_filters_noise() {
        let value = json!(["IL-6", "  ", 42, "ATP "]);
        assert_eq!(
            string_list(Some(&value)),
            vec!["IL-6".to_string(), "ATP".to_string()]
        );
        assert!(string_list(Some(&json!("not a list"))).is_empty());
        assert!(string_list(None).is_empty());
    }

    #[test]
    fn test_evidence_draft_defaults_for_missing_keys() {
        let parsed = parse_structured(r#"{"one_sentence": "NK cytotoxicity deficit"}"#);
        let draft = evidence_from_extraction(&parsed).unwrap();
        assert_eq!(draft.one_sentence, "NK cytotoxicity deficit");
        assert!(draft.technical_summary.is_empty());
        assert!(draft.mechanisms.is_empty());
        assert_eq!(draft.confidence, 0.5);
    }

    #[test]
    fn test_hypotheses_from_wrapped_object() {
        let raw = r#"{"hypotheses": [
            {"title": "Microclot-driven hypoperfusion", "confidence": 0.8,
             "mechanisms": ["vascular"], "citations": ["40627437"]},
            {"summary": "no title, dropped"}
        ]}"#;
        let drafts = hypotheses_from_extraction(&parse_structured(raw));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Microclot-driven hypoperfusion");
        assert_eq!(drafts[0].confidence, 0.8);
        assert_eq!(drafts[0].citations, vec!["40627437".to_string()]);
    }
}
