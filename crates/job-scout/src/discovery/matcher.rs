//! Three-tier keyword matching over a normalized corpus.
//!
//! Every keyword is first reduced to [`KeywordEvidence`]: whether the whole
//! phrase occurs verbatim, and how each qualifying word was found. The mode
//! decision and the relevance score both read that evidence, so the two never
//! disagree about what was present in the text.

use super::domain::{Keyword, SearchMode};
use super::vocabulary::VocabularyTable;

/// Strongest way a single keyword word was found in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WordHit {
    Miss,
    Category,
    Synonym,
    Direct,
}

impl WordHit {
    /// Direct or synonym hits; the bar moderate mode holds every word to.
    pub fn is_equivalent(self) -> bool {
        matches!(self, Self::Direct | Self::Synonym)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEvidence {
    pub word: String,
    pub hit: WordHit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEvidence {
    pub phrase_hit: bool,
    pub words: Vec<WordEvidence>,
}

impl KeywordEvidence {
    /// True when the keyword has no qualifying words and falls back to
    /// plain phrase search in every mode.
    pub fn is_phrase_only(&self) -> bool {
        self.words.is_empty()
    }

    /// Fraction of qualifying words satisfied directly or via a synonym.
    pub fn coverage(&self) -> f32 {
        if self.is_phrase_only() {
            return if self.phrase_hit { 1.0 } else { 0.0 };
        }
        let satisfied = self
            .words
            .iter()
            .filter(|word| word.hit.is_equivalent())
            .count();
        satisfied as f32 / self.words.len() as f32
    }

    /// Fraction of qualifying words reached only through a broad category.
    pub fn category_coverage(&self) -> f32 {
        if self.is_phrase_only() {
            return 0.0;
        }
        let categorized = self
            .words
            .iter()
            .filter(|word| word.hit == WordHit::Category)
            .count();
        categorized as f32 / self.words.len() as f32
    }

    pub fn matches(&self, mode: SearchMode) -> bool {
        if self.is_phrase_only() {
            return self.phrase_hit;
        }

        match mode {
            SearchMode::Strict => self.phrase_hit,
            SearchMode::Moderate => self.words.iter().all(|word| word.hit.is_equivalent()),
            SearchMode::Loose => self.words.iter().any(|word| word.hit != WordHit::Miss),
        }
    }
}

pub fn analyze(corpus: &str, keyword: &Keyword, vocabulary: &VocabularyTable) -> KeywordEvidence {
    if keyword.is_blank() {
        return KeywordEvidence {
            phrase_hit: false,
            words: Vec::new(),
        };
    }

    let phrase_hit = corpus.contains(keyword.normalized());
    let words = keyword
        .qualifying_words()
        .into_iter()
        .map(|word| WordEvidence {
            word: word.to_string(),
            hit: classify_word(corpus, word, vocabulary),
        })
        .collect();

    KeywordEvidence { phrase_hit, words }
}

/// Boolean acceptance of one keyword under one mode.
pub fn matches(
    corpus: &str,
    keyword: &Keyword,
    mode: SearchMode,
    vocabulary: &VocabularyTable,
) -> bool {
    analyze(corpus, keyword, vocabulary).matches(mode)
}

fn classify_word(corpus: &str, word: &str, vocabulary: &VocabularyTable) -> WordHit {
    if corpus.contains(word) {
        return WordHit::Direct;
    }

    let expansion = vocabulary.expand(word);
    if expansion.is_empty() {
        return WordHit::Miss;
    }
    if expansion.synonyms.iter().any(|term| corpus.contains(term.as_str())) {
        WordHit::Synonym
    } else if expansion
        .categories
        .iter()
        .any(|term| corpus.contains(term.as_str()))
    {
        WordHit::Category
    } else {
        WordHit::Miss
    }
}
