use std::collections::HashMap;
use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use unicode_segmentation::UnicodeSegmentation;
use crate::core::types::{Asset, AssetId};
use crate::index::Indexer;

/// Words of two characters or less are not indexed.
pub const MIN_WORD_LEN: usize = 3;

/// Lowercase, unicode-segmented words longer than two characters, deduplicated
/// in first-seen order. Underscores and dots separate words, as in
/// `IMG_2041_beach.jpg`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut words: Vec<String> = Vec::new();
    for word in lowered.unicode_words().flat_map(|w| w.split(['_', '.'])) {
        if word.chars().count() >= MIN_WORD_LEN && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// Inverted word index over asset file names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextIndexer {
    postings: HashMap<String, RoaringBitmap>,
    doc_terms: HashMap<u32, Vec<String>>,  // reverse map so remove() is O(words)
}

impl TextIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_words(&self, words: &[String]) -> RoaringBitmap {
        let mut iter = words.iter();
        let Some(first) = iter.next() else {
            return RoaringBitmap::new();
        };
        let mut result = match self.postings.get(first) {
            Some(ids) => ids.clone(),
            None => return RoaringBitmap::new(),
        };
        for word in iter {
            match self.postings.get(word) {
                Some(ids) => result &= ids,
                None => return RoaringBitmap::new(),
            }
            if result.is_empty() {
                break;
            }
        }
        result
    }
}

impl Indexer for TextIndexer {
    type Query = str;

    fn add(&mut self, asset: &Asset) {
        self.remove(asset.id);

        let words = tokenize(&asset.filename);
        if words.is_empty() {
            return;
        }
        for word in &words {
            self.postings
                .entry(word.clone())
                .or_insert_with(RoaringBitmap::new)
                .insert(asset.id.0);
        }
        self.doc_terms.insert(asset.id.0, words);
    }

    fn remove(&mut self, id: AssetId) {
        let Some(words) = self.doc_terms.remove(&id.0) else {
            return;
        };
        for word in words {
            if let Some(ids) = self.postings.get_mut(&word) {
                ids.remove(id.0);
                if ids.is_empty() {
                    self.postings.remove(&word);
                }
            }
        }
    }

    /// Every query word must be present (AND).
    fn search(&self, query: &str) -> RoaringBitmap {
        self.search_words(&tokenize(query))
    }

    fn key_count(&self) -> usize {
        self.postings.len()
    }
}
