//! Page chunking: groups consecutive pages into bounded model inputs.
//!
//! Pages are accumulated greedily. Before a page is added, the running chunk
//! is closed if the page would push it past the character budget or the page
//! limit. The check happens before the add, so a single oversized page still
//! forms its own chunk rather than being dropped.

use serde::Serialize;

use paperlens_core::ChunkingConfig;

use crate::pdf::Page;

/// Separator between page texts inside a chunk.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// A contiguous run of pages sent to the model as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub start_page: u32,
    pub end_page: u32,
    pub text: String,
}

impl Chunk {
    pub fn page_count(&self) -> usize {
        (self.end_page - self.start_page + 1) as usize
    }

    pub fn contains_page(&self, page: u32) -> bool {
        (self.start_page..=self.end_page).contains(&page)
    }
}

/// Greedy page chunker bounded by characters and page count.
#[derive(Debug, Clone, Copy)]
pub struct PageChunker {
    pub max_chars: usize,
    pub max_pages_per_chunk: usize,
}

impl PageChunker {
    pub fn new(max_chars: usize, max_pages_per_chunk: usize) -> Self {
        Self {
            max_chars,
            max_pages_per_chunk,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chars, config.max_pages_per_chunk)
    }

    pub fn chunk(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<&Page> = Vec::new();
        let mut current_len = 0usize;

        for page in pages {
            let add_len = page.char_len();
            let over_chars = current_len + add_len > self.max_chars;
            let over_pages = current.len() + 1 > self.max_pages_per_chunk;

            if !current.is_empty() && (over_chars || over_pages) {
                chunks.push(Self::close(&current));
                current.clear();
                current_len = 0;
            }

            current.push(page);
            current_len += add_len;
        }

        if !current.is_empty() {
            chunks.push(Self::close(&current));
        }

        chunks
    }

    fn close(pages: &[&Page]) -> Chunk {
        let text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);
        Chunk {
            start_page: pages[0].number,
            end_page: pages[pages.len() - 1].number,
            text,
        }
    }
}

impl Default for PageChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}
