/// Text processing utilities
pub mod text {
    /// Keep the first `max_chars` characters. Cuts on character boundaries so
    /// multi-byte text is never split.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => text[..byte_index].to_string(),
            None => text.to_string(),
        }
    }

    /// Replace every run of line breaks with a single space.
    pub fn collapse_newlines(text: &str) -> String {
        let mut collapsed = String::with_capacity(text.len());
        let mut in_break = false;

        for c in text.chars() {
            if c == '\n' || c == '\r' {
                if !in_break {
                    collapsed.push(' ');
                    in_break = true;
                }
            } else {
                collapsed.push(c);
                in_break = false;
            }
        }

        collapsed
    }

    /// Single-line excerpt of at most `max_chars` characters.
    pub fn excerpt(text: &str, max_chars: usize) -> String {
        truncate_chars(&collapse_newlines(text), max_chars)
    }
}

/// Loose readers for scraped JSON values
pub mod json {
    use serde_json::Value;

    /// JSON truthiness: `true`, non-zero numbers, and non-empty strings,
    /// arrays or objects.
    pub fn is_truthy(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    /// Best-effort non-negative count. Anything that is not a number (or a
    /// string holding one) counts as zero.
    pub fn coerce_count(value: Option<&Value>) -> u64 {
        match value {
            Some(Value::Number(n)) => {
                if let Some(u) = n.as_u64() {
                    u
                } else if n.is_i64() {
                    0
                } else {
                    n.as_f64().map(float_to_count).unwrap_or(0)
                }
            }
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if let Ok(u) = trimmed.parse::<u64>() {
                    u
                } else {
                    trimmed.parse::<f64>().map(float_to_count).unwrap_or(0)
                }
            }
            _ => 0,
        }
    }

    fn float_to_count(f: f64) -> u64 {
        if f.is_finite() && f > 0.0 {
            // `as` saturates at u64::MAX
            f.trunc() as u64
        } else {
            0
        }
    }

    /// Keep the JSON objects of a dataset dump, dropping anything else.
    /// Returns the objects and how many entries were skipped.
    pub fn object_items(values: Vec<Value>) -> (Vec<crate::types::RawItem>, usize) {
        let total = values.len();
        let items: Vec<_> = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let skipped = total - items.len();
        (items, skipped)
    }

    /// The string at `value`, or `None` for any other type.
    pub fn as_str(value: Option<&Value>) -> Option<&str> {
        value.and_then(Value::as_str)
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Only http(s) page URLs can be handed to the scraper.
    pub fn is_valid_page_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some()
        } else {
            false
        }
    }

    /// Competitor name taken from the last non-empty path segment, falling
    /// back to the host.
    pub fn competitor_name(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str.trim()).ok()?;

        let segment = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|s| s.to_string());

        segment.or_else(|| url.host_str().map(|h| h.to_string()))
    }
}
