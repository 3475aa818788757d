//! Relevance matching and multi-source discovery of job postings.

pub mod dedupe;
pub mod domain;
pub mod location;
pub mod matcher;
pub mod normalizer;
pub mod orchestrator;
pub mod scoring;
pub mod source;
pub mod vocabulary;

pub use dedupe::{Deduplicable, Deduplicator};
pub use domain::{
    CandidateItem, DiscoveryResult, DiscoveryStage, DiscoveryStatus, InvalidRequestError, Keyword,
    ParseSearchModeError, RejectionReason, ScoredItem, SearchMode, SearchRequest,
};
pub use location::{LocationAssessment, LocationClassifier};
pub use orchestrator::{DiscoveryOrchestrator, OrchestratorSettings};
pub use scoring::{
    AcceptanceDecision, ModeThresholds, RelevanceConfig, RelevanceEngine, RelevanceOutcome,
    ScoreComponent, ScoreSignal,
};
pub use source::{
    CandidateImportError, CsvCandidateImporter, FetchQuery, SourceFetchError, SourceFetcher,
    StaticSource, Throttled,
};
pub use tokio_util::sync::CancellationToken;
pub use vocabulary::{Expansion, VocabularyEntry, VocabularyError, VocabularyTable};
