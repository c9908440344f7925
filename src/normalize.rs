//! Field-name canonicalization for request bodies.
//!
//! Callers coming from the gateway's JavaScript SDK habitually spell
//! options in camelCase. The wire convention is snake_case. For a fixed
//! set of fields both spellings are accepted; before transport the
//! alternate is folded into the wire spelling. If a body contains both
//! spellings, the wire-form value wins and the alternate is dropped.

use serde_json::Value;

/// (alternate spelling, wire spelling) pairs recognized on request bodies.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("maxTokens", "max_tokens"),
    ("toolChoice", "tool_choice"),
    ("topP", "top_p"),
    ("frequencyPenalty", "frequency_penalty"),
    ("presencePenalty", "presence_penalty"),
    ("stopSequences", "stop_sequences"),
    ("cacheControl", "cache_control"),
    ("reasoningEffort", "reasoning_effort"),
    ("mcpServers", "mcp_servers"),
    ("requestTimeout", "request_timeout"),
];

/// Fold camelCase alternates into their wire-form spelling, in place.
///
/// A wire-form key already present is never overwritten. Non-object
/// values are left untouched.
pub(crate) fn canonicalize(body: &mut Value) {
    let Some(map) = body.as_object_mut() else {
        return;
    };
    for (alias, wire) in FIELD_ALIASES {
        if let Some(value) = map.remove(*alias) {
            map.entry((*wire).to_string()).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alias_folded_to_wire_form() {
        let mut body = json!({"model": "omni-large", "maxTokens": 256});
        canonicalize(&mut body);
        assert_eq!(body, json!({"model": "omni-large", "max_tokens": 256}));
    }

    #[test]
    fn wire_form_wins_when_both_present() {
        let mut body = json!({"max_tokens": 100, "maxTokens": 999});
        canonicalize(&mut body);
        assert_eq!(body, json!({"max_tokens": 100}));
    }

    #[test]
    fn wire_form_untouched_when_alone() {
        let mut body = json!({"max_tokens": 128, "tool_choice": "auto"});
        canonicalize(&mut body);
        assert_eq!(body, json!({"max_tokens": 128, "tool_choice": "auto"}));
    }

    #[test]
    fn all_aliases_recognized() {
        let mut body = json!({
            "maxTokens": 1,
            "toolChoice": "auto",
            "topP": 0.9,
            "frequencyPenalty": 0.1,
            "presencePenalty": 0.2,
            "stopSequences": ["x"],
            "cacheControl": {"type": "ephemeral"},
            "reasoningEffort": "high",
            "mcpServers": [{"url": "https://mcp.example.com"}],
            "requestTimeout": 30000,
        });
        canonicalize(&mut body);
        let map = body.as_object().unwrap();
        for (alias, wire) in FIELD_ALIASES {
            assert!(!map.contains_key(*alias), "{alias} should be folded");
            assert!(map.contains_key(*wire), "{wire} should be present");
        }
    }

    #[test]
    fn unknown_camel_case_fields_pass_through() {
        let mut body = json!({"someVendorOption": true});
        canonicalize(&mut body);
        assert_eq!(body, json!({"someVendorOption": true}));
    }

    #[test]
    fn non_object_body_untouched() {
        let mut body = json!(["not", "an", "object"]);
        canonicalize(&mut body);
        assert_eq!(body, json!(["not", "an", "object"]));
    }
}
