//! Deterministic post-merge cleanup.

use std::collections::HashSet;

use tracing::debug;

use crate::record::{DatasetItem, ExtractionRecord, HeadingItem};

/// Identity of a dataset name: lowercase ASCII letters and digits only.
pub fn dataset_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Identity of a heading: trimmed and lowercased.
pub fn heading_key(heading: &str) -> String {
    heading.trim().to_lowercase()
}

/// First occurrence of each dataset key wins; blank names are dropped.
pub fn dedupe_datasets(items: Vec<DatasetItem>) -> Vec<DatasetItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|d| {
            let name = d.name.trim();
            !name.is_empty() && seen.insert(dataset_key(name))
        })
        .collect()
}

/// First occurrence of each heading key wins; blank headings are dropped.
pub fn dedupe_headings(items: Vec<HeadingItem>) -> Vec<HeadingItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|h| {
            let key = heading_key(&h.heading);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Dedupe datasets and every heading list in place. Evidence is untouched.
/// Returns the number of items removed.
pub fn deduplicate(record: &mut ExtractionRecord) -> usize {
    let before = record.item_count();

    record.datasets = dedupe_datasets(std::mem::take(&mut record.datasets));
    for (field, list) in record.heading_lists_mut() {
        let n = list.len();
        *list = dedupe_headings(std::mem::take(list));
        if list.len() < n {
            debug!("{}: removed {} duplicate headings", field, n - list.len());
        }
    }

    before - record.item_count()
}

/// Use `hint` as the title when the record has none.
pub fn apply_title_hint(record: &mut ExtractionRecord, hint: Option<&str>) {
    let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) else {
        return;
    };
    if record.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        record.title = Some(hint.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EvidenceItem;

    fn dataset(name: &str, page: u32) -> DatasetItem {
        DatasetItem {
            name: name.into(),
            page: Some(page),
            quote: String::new(),
        }
    }

    fn heading(h: &str, page: u32) -> HeadingItem {
        HeadingItem {
            heading: h.into(),
            page: Some(page),
            ..Default::default()
        }
    }

    #[test]
    fn test_dataset_key() {
        assert_eq!(dataset_key("ImageNet-1k"), "imagenet1k");
        assert_eq!(dataset_key(" image net 1K "), "imagenet1k");
        assert_eq!(dataset_key("---"), "");
    }

    #[test]
    fn test_dedupe_datasets_first_wins() {
        let out = dedupe_datasets(vec![
            dataset("ImageNet-1k", 3),
            dataset("imagenet 1K", 7),
            dataset("  ", 4),
            dataset("COCO", 5),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "ImageNet-1k");
        assert_eq!(out[0].page, Some(3));
        assert_eq!(out[1].name, "COCO");
    }

    #[test]
    fn test_punctuation_and_case_collapse() {
        let out = dedupe_datasets(vec![dataset("BERT", 1), dataset("bert", 2), dataset("BERT!!", 3)]);
        assert_eq!(out, vec![dataset("BERT", 1)]);

        let out = dedupe_headings(vec![heading("Data Leakage", 4), heading("data leakage ", 5)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].heading, "Data Leakage");
    }

    #[test]
    fn test_dedupe_headings() {
        let out = dedupe_headings(vec![
            heading("Sparse Attention", 2),
            heading("  sparse attention ", 6),
            heading("", 1),
            heading("Low-rank Adapters", 3),
        ]);
        let names: Vec<_> = out.iter().map(|h| h.heading.as_str()).collect();
        assert_eq!(names, vec!["Sparse Attention", "Low-rank Adapters"]);
    }

    #[test]
    fn test_deduplicate_is_idempotent_and_keeps_evidence() {
        let mut record = ExtractionRecord {
            datasets: vec![dataset("SQuAD", 1), dataset("squad", 2)],
            contributions: vec![heading("A", 1), heading("a", 2)],
            evidence: vec![
                EvidenceItem { page: Some(1), quote: "same".into() },
                EvidenceItem { page: Some(1), quote: "same".into() },
            ],
            ..Default::default()
        };

        assert_eq!(deduplicate(&mut record), 2);
        let once = record.clone();
        assert_eq!(deduplicate(&mut record), 0);
        assert_eq!(record, once);
        assert_eq!(record.evidence.len(), 2);
    }

    #[test]
    fn test_title_hint() {
        let mut record = ExtractionRecord::default();
        apply_title_hint(&mut record, Some("My Paper"));
        assert_eq!(record.title.as_deref(), Some("My Paper"));

        let mut record = ExtractionRecord {
            title: Some("".into()),
            ..Default::default()
        };
        apply_title_hint(&mut record, Some("My Paper"));
        assert_eq!(record.title.as_deref(), Some("My Paper"));

        let mut record = ExtractionRecord {
            title: Some("Real Title".into()),
            ..Default::default()
        };
        apply_title_hint(&mut record, Some("My Paper"));
        assert_eq!(record.title.as_deref(), Some("Real Title"));

        let mut record = ExtractionRecord::default();
        apply_title_hint(&mut record, Some("   "));
        assert_eq!(record.title, None);
        apply_title_hint(&mut record, None);
        assert_eq!(record.title, None);
    }
}
