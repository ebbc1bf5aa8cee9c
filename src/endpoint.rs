//! Path template and query resolution.
//!
//! A template such as `/users/:id/posts` is split into literal text and
//! `:name` placeholders. A placeholder name is one or more ASCII letters,
//! digits or underscores; a colon followed by anything else is literal.
//! Substituted values are percent-encoded so each stays inside its segment.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::{Error, Result};

/// One piece of a tokenized path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits a template into literal and placeholder segments.
pub(crate) fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != ':' {
            continue;
        }

        let name_start = idx + 1;
        let mut name_end = name_start;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !is_name_char(next) {
                break;
            }
            name_end = next_idx + next.len_utf8();
            chars.next();
        }

        if name_end == name_start {
            // bare colon
            continue;
        }

        if literal_start < idx {
            segments.push(Segment::Literal(&template[literal_start..idx]));
        }
        segments.push(Segment::Placeholder(&template[name_start..name_end]));
        literal_start = name_end;
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }

    segments
}

/// Renders a parameter the way it appears in a path or query string.
pub(crate) fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Percent-encodes a value for use inside a single path segment.
///
/// Everything but ASCII alphanumerics and `*-._` is escaped, so `/`, `?`,
/// `#` and `%` cannot leak into the surrounding path.
pub(crate) fn encode_segment(value: &str) -> String {
    // form encoding writes spaces as `+`; a literal `+` is already `%2B`
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Resolves a path template and a set of query keys against a parameter bag.
///
/// Path and query lookups are independent: a key may feed both a placeholder
/// and a query parameter, and keys used by neither are ignored.
pub(crate) struct EndpointResolver<'a> {
    template: &'a str,
    query_keys: &'a [String],
}

impl<'a> EndpointResolver<'a> {
    pub(crate) fn new(template: &'a str, query_keys: &'a [String]) -> Self {
        Self {
            template,
            query_keys,
        }
    }

    /// Substitutes every placeholder in the template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPathParameter`] for the first placeholder the
    /// bag has no entry for.
    pub(crate) fn resolve_path(&self, params: &Map<String, Value>) -> Result<String> {
        let mut path = String::with_capacity(self.template.len());

        for segment in tokenize(self.template) {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(name) => {
                    let value = params.get(name).ok_or_else(|| {
                        tracing::warn!(
                            parameter = name,
                            template = self.template,
                            "Missing path parameter"
                        );
                        Error::MissingPathParameter {
                            name: name.to_string(),
                            template: self.template.to_string(),
                        }
                    })?;
                    path.push_str(&encode_segment(&param_to_string(value)));
                }
            }
        }

        Ok(path)
    }

    /// Collects query pairs for the configured keys, in key order.
    ///
    /// Keys absent from the bag, or mapped to `null`, are skipped. An array
    /// value yields one pair per element.
    pub(crate) fn resolve_query(&self, params: &Map<String, Value>) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        for key in self.query_keys {
            match params.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    pairs.extend(
                        items
                            .iter()
                            .map(|item| (key.clone(), param_to_string(item))),
                    );
                }
                Some(value) => pairs.push((key.clone(), param_to_string(value))),
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let resolver = EndpointResolver::new("/users/all", &[]);
        assert_eq!(resolver.resolve_path(&Map::new()).unwrap(), "/users/all");
    }

    #[test]
    fn test_substitutes_placeholder_in_place() {
        let resolver = EndpointResolver::new("/users/:id/posts", &[]);
        let path = resolver.resolve_path(&bag(json!({"id": 12}))).unwrap();
        assert_eq!(path, "/users/12/posts");
    }

    #[test]
    fn test_substitutes_multiple_placeholders() {
        let resolver = EndpointResolver::new("/orgs/:org_name/repos/:repo", &[]);
        let path = resolver
            .resolve_path(&bag(json!({"org_name": "rust-lang", "repo": "cargo"})))
            .unwrap();
        assert_eq!(path, "/orgs/rust-lang/repos/cargo");
    }

    #[test]
    fn test_placeholder_values_stay_in_their_segment() {
        let resolver = EndpointResolver::new("/users/:id/posts", &[]);

        let cases = [
            ("a/b", "/users/a%2Fb/posts"),
            ("50%", "/users/50%25/posts"),
            ("a/../b", "/users/a%2F..%2Fb/posts"),
            ("q?x#y", "/users/q%3Fx%23y/posts"),
            ("two words", "/users/two%20words/posts"),
            ("a+b", "/users/a%2Bb/posts"),
        ];

        for (value, expected) in cases {
            let path = resolver.resolve_path(&bag(json!({ "id": value }))).unwrap();
            assert_eq!(path, expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_missing_placeholder_is_an_error() {
        let resolver = EndpointResolver::new("/users/:id/posts/:post_id", &[]);
        let err = resolver.resolve_path(&bag(json!({"id": 1}))).unwrap_err();

        match err {
            Error::MissingPathParameter { name, template } => {
                assert_eq!(name, "post_id");
                assert_eq!(template, "/users/:id/posts/:post_id");
            }
            other => panic!("Expected MissingPathParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_colon_is_literal() {
        assert_eq!(
            tokenize("/time/12:/x"),
            vec![Segment::Literal("/time/12:/x")]
        );
    }

    #[test]
    fn test_tokenize_splits_segments() {
        assert_eq!(
            tokenize("/a/:b.json"),
            vec![
                Segment::Literal("/a/"),
                Segment::Placeholder("b"),
                Segment::Literal(".json"),
            ]
        );
    }

    #[test]
    fn test_query_includes_only_present_keys() {
        let keys = vec!["per_page".to_string(), "page".to_string(), "sort".to_string()];
        let resolver = EndpointResolver::new("/paged", &keys);

        let pairs = resolver.resolve_query(&bag(json!({"page": 3, "per_page": 300, "extra": 1})));

        assert_eq!(
            pairs,
            vec![
                ("per_page".to_string(), "300".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_skips_null_and_expands_arrays() {
        let keys = vec!["ids".to_string(), "q".to_string()];
        let resolver = EndpointResolver::new("/search", &keys);

        let pairs = resolver.resolve_query(&bag(json!({"ids": [1, 2], "q": null})));

        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "1".to_string()),
                ("ids".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_key_can_feed_path_and_query() {
        let keys = vec!["id".to_string()];
        let resolver = EndpointResolver::new("/users/:id", &keys);
        let params = bag(json!({"id": "abc"}));

        assert_eq!(resolver.resolve_path(&params).unwrap(), "/users/abc");
        assert_eq!(
            resolver.resolve_query(&params),
            vec![("id".to_string(), "abc".to_string())]
        );
    }

    #[test]
    fn test_param_to_string_renders_scalars() {
        assert_eq!(param_to_string(&json!("x y")), "x y");
        assert_eq!(param_to_string(&json!(1.5)), "1.5");
        assert_eq!(param_to_string(&json!(true)), "true");
        assert_eq!(param_to_string(&Value::Null), "");
    }
}
