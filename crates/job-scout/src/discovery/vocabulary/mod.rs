mod standard;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Terms registered for a single base word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

/// Result of expanding one word. Unregistered words expand to empty sets.
#[derive(Debug, Clone, Copy)]
pub struct Expansion<'a> {
    pub synonyms: &'a BTreeSet<String>,
    pub categories: &'a BTreeSet<String>,
}

impl Expansion<'_> {
    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty() && self.categories.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vocabulary document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vocabulary section '{section}' contains a blank term")]
    BlankTerm { section: &'static str },
}

/// Process-wide term table: synonyms and broad categories per base word,
/// location aliases, and the phrases that mark a posting as remote.
///
/// Built once at startup and shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyTable {
    terms: BTreeMap<String, VocabularyEntry>,
    locations: BTreeMap<String, BTreeSet<String>>,
    remote_terms: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct VocabularyDocument {
    #[serde(default)]
    terms: BTreeMap<String, VocabularyEntry>,
    #[serde(default)]
    locations: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    remote_terms: Option<BTreeSet<String>>,
}

impl VocabularyTable {
    pub fn standard() -> Self {
        let mut table = Self::default();
        for (base, synonyms, categories) in standard::TERMS {
            table = table.with_term(base, synonyms.iter().copied(), categories.iter().copied());
        }
        for (location, aliases) in standard::LOCATIONS {
            table = table.with_location(location, aliases.iter().copied());
        }
        table.with_remote_terms(standard::REMOTE_TERMS.iter().copied())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VocabularyError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a JSON document. A document without `remote_terms` keeps the
    /// built-in remote phrases.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VocabularyError> {
        let document: VocabularyDocument = serde_json::from_reader(reader)?;

        let mut table = Self::default();
        for (base, entry) in document.terms {
            if is_blank(&base)
                || entry.synonyms.iter().any(|term| is_blank(term))
                || entry.categories.iter().any(|term| is_blank(term))
            {
                return Err(VocabularyError::BlankTerm { section: "terms" });
            }
            table = table.with_term(&base, entry.synonyms, entry.categories);
        }

        for (location, aliases) in document.locations {
            if is_blank(&location) || aliases.iter().any(|alias| is_blank(alias)) {
                return Err(VocabularyError::BlankTerm {
                    section: "locations",
                });
            }
            table = table.with_location(&location, aliases);
        }

        let remote_terms = match document.remote_terms {
            Some(terms) => terms,
            None => standard::REMOTE_TERMS
                .iter()
                .map(|term| term.to_string())
                .collect(),
        };
        if remote_terms.iter().any(|term| is_blank(term)) {
            return Err(VocabularyError::BlankTerm {
                section: "remote_terms",
            });
        }

        Ok(table.with_remote_terms(remote_terms))
    }

    /// Register (or extend) a base word. All terms are stored lower-cased.
    pub fn with_term<S, C>(mut self, base: &str, synonyms: S, categories: C) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let entry = self.terms.entry(normalize_term(base)).or_default();
        entry
            .synonyms
            .extend(synonyms.into_iter().map(|term| normalize_term(term.as_ref())));
        entry
            .categories
            .extend(categories.into_iter().map(|term| normalize_term(term.as_ref())));
        self
    }

    pub fn with_location<A>(mut self, location: &str, aliases: A) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        self.locations
            .entry(normalize_term(location))
            .or_default()
            .extend(aliases.into_iter().map(|alias| normalize_term(alias.as_ref())));
        self
    }

    /// Replace the remote phrase set.
    pub fn with_remote_terms<T>(mut self, terms: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        self.remote_terms = terms
            .into_iter()
            .map(|term| normalize_term(term.as_ref()))
            .collect();
        self
    }

    /// Exact, case-insensitive lookup. A miss is not an error.
    pub fn expand(&self, word: &str) -> Expansion<'_> {
        match self.terms.get(&normalize_term(word)) {
            Some(entry) => Expansion {
                synonyms: &entry.synonyms,
                categories: &entry.categories,
            },
            None => Expansion {
                synonyms: &EMPTY,
                categories: &EMPTY,
            },
        }
    }

    pub fn location_aliases(&self, location: &str) -> &BTreeSet<String> {
        self.locations
            .get(&normalize_term(location))
            .unwrap_or(&EMPTY)
    }

    pub fn remote_terms(&self) -> &BTreeSet<String> {
        &self.remote_terms
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

fn normalize_term(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
