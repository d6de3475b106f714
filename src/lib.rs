//! Multi-strategy voting engine that fuses independent industry-code
//! classifications into one ranked, quality-scored consensus.

pub mod consensus;
pub mod core;

pub use consensus::{
    ClassificationResult, CodeKey, CodeType, IndustryCode, RankedCode, StrategyVote,
    VotingConfig, VotingContext, VotingEngine, VotingError, VotingMetadata, VotingResult,
    VotingStrategy,
};
