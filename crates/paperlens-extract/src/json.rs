//! Recovering a JSON object from free-form model output.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;
use crate::record::ExtractionRecord;

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```\w*").unwrap());

/// Parse the first `{` .. last `}` span of `text` as JSON.
///
/// A leading code fence (with optional language tag) is removed, along with
/// everything from the last closing fence on.
pub fn parse_json_loose(text: &str) -> Result<Value, ParseError> {
    let mut text = Cow::Borrowed(text.trim());

    if text.starts_with("```") {
        let unfenced = FENCE_OPEN.replace(&text, "").into_owned();
        let body = match unfenced.rfind("```") {
            Some(close) => unfenced[..close].to_string(),
            None => unfenced,
        };
        text = Cow::Owned(body);
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(ParseError::NoJsonObject);
    };
    if end <= start {
        return Err(ParseError::NoJsonObject);
    }

    serde_json::from_str(&text[start..=end]).map_err(ParseError::InvalidJson)
}

/// [`parse_json_loose`] followed by lenient record decoding.
pub fn parse_record(text: &str) -> Result<ExtractionRecord, ParseError> {
    let value = parse_json_loose(text)?;
    serde_json::from_value(value).map_err(ParseError::Schema)
}
