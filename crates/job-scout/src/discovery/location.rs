use std::sync::Arc;

use super::domain::SearchRequest;
use super::vocabulary::VocabularyTable;

/// Where a candidate stands relative to the request's remote/location wishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationAssessment {
    pub is_remote: bool,
    /// Only evaluated for non-remote items when a location was requested.
    pub location_match: bool,
    pub remote_required: bool,
    pub location_requested: bool,
}

impl LocationAssessment {
    /// Remote-only searches drop non-remote items before any scoring work.
    pub fn rejects_before_scoring(&self) -> bool {
        self.remote_required && !self.is_remote
    }

    pub fn rejects_after_scoring(&self) -> bool {
        self.location_requested && !self.is_remote && !self.location_match
    }
}

#[derive(Debug, Clone)]
pub struct LocationClassifier {
    vocabulary: Arc<VocabularyTable>,
}

impl LocationClassifier {
    pub fn new(vocabulary: Arc<VocabularyTable>) -> Self {
        Self { vocabulary }
    }

    pub fn is_remote(&self, corpus: &str) -> bool {
        self.vocabulary
            .remote_terms()
            .iter()
            .any(|term| corpus.contains(term.as_str()))
    }

    /// A requested location that is itself a remote phrase ("remote",
    /// "anywhere") turns into a remote-only search with no place filter.
    pub fn classify(&self, corpus: &str, request: &SearchRequest) -> LocationAssessment {
        let requested = request.normalized_location();
        let location_is_remote = requested
            .as_deref()
            .is_some_and(|location| self.vocabulary.remote_terms().contains(location));

        let remote_required = request.remote_only || location_is_remote;
        let is_remote = self.is_remote(corpus);

        let location = requested.filter(|_| !location_is_remote);
        let location_requested = location.is_some();
        let location_match = match location {
            Some(location) if !is_remote => self.mentions_location(corpus, &location),
            _ => false,
        };

        LocationAssessment {
            is_remote,
            location_match,
            remote_required,
            location_requested,
        }
    }

    fn mentions_location(&self, corpus: &str, location: &str) -> bool {
        corpus.contains(location)
            || self
                .vocabulary
                .location_aliases(location)
                .iter()
                .any(|alias| corpus.contains(alias.as_str()))
    }
}
