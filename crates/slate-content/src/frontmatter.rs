//! Frontmatter extraction and parsing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ContentError;

const OPEN_MARKER: &str = "---\n";
const CLOSE_MARKER: &str = "\n---\n";

/// Parsed frontmatter from a Markdown document.
///
/// Every field falls back to its zero value when it is missing or has the
/// wrong type, so unknown or malformed keys never stop a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frontmatter {
    /// Post title
    pub title: String,

    /// Publication date (Unix epoch when absent)
    pub date: DateTime<Utc>,

    /// Tags in declaration order
    pub tags: Vec<String>,

    /// Short summary for listings and meta descriptions
    pub summary: String,
}

impl Frontmatter {
    /// Project a decoded JSON object onto the recognized fields.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            title: string_field(map, "title"),
            date: map.get("date").and_then(parse_date).unwrap_or_default(),
            tags: map.get("tags").and_then(string_list).unwrap_or_default(),
            summary: string_field(map, "summary"),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// A tag list is only accepted when every element is a string.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Extract frontmatter from a Markdown document.
///
/// Returns the parsed frontmatter and the body that follows the closing
/// marker. Content without a leading `---` line is returned unchanged with
/// empty metadata.
pub fn parse_frontmatter(source: &str) -> Result<(Frontmatter, &str), ContentError> {
    let Some(after_open) = source.strip_prefix(OPEN_MARKER) else {
        return Ok((Frontmatter::default(), source));
    };

    let Some(close_pos) = after_open.find(CLOSE_MARKER) else {
        return Err(ContentError::MalformedFrontmatter);
    };

    let block = &after_open[..close_pos];
    let body = &after_open[close_pos + CLOSE_MARKER.len()..];

    let map: Map<String, Value> =
        serde_json::from_str(block).map_err(ContentError::InvalidMetadataFormat)?;

    Ok((Frontmatter::from_map(&map), body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
{
  "title": "Hello",
  "date": "2024-03-01T10:30:00Z",
  "tags": ["rust", "web"],
  "summary": "A first post"
}
---

# Hello
"#;

        let (fm, body) = parse_frontmatter(source).unwrap();

        assert_eq!(fm.title, "Hello");
        assert_eq!(
            fm.date,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(fm.tags, vec!["rust".to_string(), "web".to_string()]);
        assert_eq!(fm.summary, "A first post");
        assert_eq!(body, "\n# Hello\n");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, body) = parse_frontmatter(source).unwrap();

        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, source);
    }

    #[test]
    fn leading_whitespace_disables_frontmatter() {
        let source = "\n---\n{\"title\":\"T\"}\n---\nBody";

        let (fm, body) = parse_frontmatter(source).unwrap();

        assert_eq!(fm.title, "");
        assert_eq!(body, source);
    }

    #[test]
    fn title_only_leaves_other_fields_zero() {
        let (fm, body) = parse_frontmatter("---\n{\"title\":\"T\"}\n---\nBody").unwrap();

        assert_eq!(fm.title, "T");
        assert_eq!(fm.date, DateTime::<Utc>::default());
        assert!(fm.tags.is_empty());
        assert_eq!(fm.summary, "");
        assert_eq!(body, "Body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = parse_frontmatter("---\n{}\nBody");

        assert!(matches!(result, Err(ContentError::MalformedFrontmatter)));
    }

    #[test]
    fn errors_on_invalid_json() {
        let result = parse_frontmatter("---\n{\"title\": \n---\nBody");

        assert!(matches!(result, Err(ContentError::InvalidMetadataFormat(_))));
    }

    #[test]
    fn errors_on_non_object_metadata() {
        let result = parse_frontmatter("---\n[\"title\"]\n---\nBody");

        assert!(matches!(result, Err(ContentError::InvalidMetadataFormat(_))));
    }

    #[test]
    fn mistyped_fields_fall_back_to_zero_values() {
        let source = "---\n{\"title\": 42, \"date\": \"yesterday\", \"tags\": [\"ok\", 1], \"summary\": null, \"draft\": true}\n---\n";

        let (fm, body) = parse_frontmatter(source).unwrap();

        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "");
    }

    #[test]
    fn accepts_plain_dates() {
        let (fm, _) = parse_frontmatter("---\n{\"date\": \"2024-02-01\"}\n---\n").unwrap();

        assert_eq!(fm.date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn converts_offsets_to_utc() {
        let (fm, _) =
            parse_frontmatter("---\n{\"date\": \"2024-02-01T02:00:00+02:00\"}\n---\n").unwrap();

        assert_eq!(fm.date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn preserves_body_whitespace() {
        let (_, body) = parse_frontmatter("---\n{}\n---\n\n\n  indented\n\n").unwrap();

        assert_eq!(body, "\n\n  indented\n\n");
    }
}
