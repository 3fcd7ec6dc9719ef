//! Prompt templates for the three model calls.

use paperlens_ingest::Chunk;

const RECORD_SCHEMA: &str = r#"{
  "title": null | string,
  "venue": null | string,
  "year": null | integer,
  "datasets": [{"name": string, "page": integer, "quote": string}],
  "limitations_addressed": [{"heading": string, "explanation": string, "page": integer, "quote": string}],
  "contributions": [{"heading": string, "explanation": string, "page": integer, "quote": string}],
  "methods": [{"heading": string, "explanation": string, "page": integer, "quote": string}],
  "paper_limitations": [{"heading": string, "explanation": string, "page": integer, "quote": string}],
  "evidence": [{"page": integer, "quote": string}]
}"#;

const CHUNK_TEMPLATE: &str = "\
You are an expert academic information extractor. Extract information ONLY from the CHUNK below.
Return EXACTLY one JSON object and nothing else.

Schema (types):
{schema}

Rules:
- Do not invent data. A field absent from this chunk is null (scalars) or [] (lists).
- Every list item carries its page and a short verbatim quote (at most 25 words).
- Page numbers are actual PDF pages, between {start_page} and {end_page}.
- Headings are short phrases (3-6 words); explanations are 1-2 concise sentences.
- No commentary and no markdown.

CHUNK PAGES: {start_page} - {end_page}
CHUNK TEXT:
---
{chunk_text}
---
";

const REDUCER_TEMPLATE: &str = "\
You are an expert data merger for structured JSON extracted from chunks of a PDF.
You are given a JSON array of partial extraction objects, each following the schema below.
Merge them into a single final JSON object with the same schema.

Schema of each partial:
{schema}

Merging rules:
- Scalars (title, venue, year): prefer non-null values backed by evidence, choosing the clearest quote. If different values conflict ambiguously, use null.
- Lists: combine all items and deduplicate by normalized key. Datasets: lowercase and strip non-alphanumeric characters. Headings: lowercase and trim. Keep the first occurrence's original name or heading.
- Evidence: unique items sorted by page.
- Do not invent missing information.

Return exactly one JSON object and nothing else.

Partials:
{partials_json}
";

const SUMMARY_TEMPLATE: &str = "\
You are an expert academic summarizer. Create a comprehensive summary of this research paper.

Paper content:
---
{paper_text}
---

Provide a structured summary with these sections:

**Abstract/Overview** (2-3 sentences): Main purpose and key findings
**Problem Statement** (1-2 sentences): What problem does this paper address?
**Methodology** (2-3 sentences): How did they approach the problem?
**Key Contributions** (3-4 bullet points): Main innovations or findings
**Results** (1-2 sentences): What were the main outcomes?
**Limitations** (1-2 sentences): What are the acknowledged limitations?
**Impact** (1-2 sentences): Why is this work important?

Keep it concise but comprehensive, focused on the most important aspects of the research.
";

/// Extraction prompt for one chunk. The chunk text is substituted last so
/// placeholders inside the paper itself are left alone.
pub fn chunk_prompt(chunk: &Chunk) -> String {
    CHUNK_TEMPLATE
        .replace("{schema}", RECORD_SCHEMA)
        .replace("{start_page}", &chunk.start_page.to_string())
        .replace("{end_page}", &chunk.end_page.to_string())
        .replace("{chunk_text}", &chunk.text)
}

/// Merge prompt over the serialized partial records.
pub fn reducer_prompt(partials_json: &str) -> String {
    REDUCER_TEMPLATE
        .replace("{schema}", RECORD_SCHEMA)
        .replace("{partials_json}", partials_json)
}

pub fn summary_prompt(paper_text: &str) -> String {
    SUMMARY_TEMPLATE.replace("{paper_text}", paper_text)
}
