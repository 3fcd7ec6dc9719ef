//! The extraction record shared by partial (per-chunk) and merged results.
//!
//! Model output is decoded leniently: unknown keys are ignored, `null` lists
//! become empty, numeric strings are accepted for `year` and `page`, and list
//! items of the wrong shape are dropped. A list field that is not a list is
//! still a decode error.

use serde::{Deserialize, Serialize};

/// A dataset mention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::page")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub quote: String,
}

/// A `{heading, explanation, page, quote}` list item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub heading: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient::page")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub quote: String,
}

/// A `(page, quote)` pair supporting an extracted claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default, deserialize_with = "lenient::page")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub quote: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub datasets: Vec<DatasetItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub limitations_addressed: Vec<HeadingItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub contributions: Vec<HeadingItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub methods: Vec<HeadingItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub paper_limitations: Vec<HeadingItem>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub evidence: Vec<EvidenceItem>,
    /// Set on the placeholder that replaces a failed chunk.
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// All-empty placeholder carrying the failure that produced it.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// The heading-object lists, mutably, with their field names.
    pub fn heading_lists_mut(&mut self) -> [(&'static str, &mut Vec<HeadingItem>); 4] {
        [
            ("limitations_addressed", &mut self.limitations_addressed),
            ("contributions", &mut self.contributions),
            ("methods", &mut self.methods),
            ("paper_limitations", &mut self.paper_limitations),
        ]
    }

    /// Drop list items whose page is missing or outside `first..=last`.
    /// Returns how many items were dropped.
    pub fn retain_pages_within(&mut self, first: u32, last: u32) -> usize {
        let in_range = |page: Option<u32>| page.is_some_and(|p| p >= first && p <= last);
        let mut dropped = 0;

        let before = self.datasets.len();
        self.datasets.retain(|d| in_range(d.page));
        dropped += before - self.datasets.len();

        for (_, list) in self.heading_lists_mut() {
            let before = list.len();
            list.retain(|h| in_range(h.page));
            dropped += before - list.len();
        }

        let before = self.evidence.len();
        self.evidence.retain(|e| in_range(e.page));
        dropped += before - self.evidence.len();

        dropped
    }

    /// Total number of list items across every list field.
    pub fn item_count(&self) -> usize {
        self.datasets.len()
            + self.limitations_addressed.len()
            + self.contributions.len()
            + self.methods.len()
            + self.paper_limitations.len()
            + self.evidence.len()
    }
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    fn integer(value: Option<Value>) -> Option<i64> {
        match value? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(integer(Option::<Value>::deserialize(d)?).and_then(|y| i32::try_from(y).ok()))
    }

    pub fn page<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(integer(Option::<Value>::deserialize(d)?)
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0))
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("Dropping malformed list item: {}", e);
                    None
                }
            })
            .collect())
    }
}
