use industry_voting_engine::consensus::quality::calculate_diversity;
use industry_voting_engine::consensus::stats::{calculate_mean, calculate_variance};
use industry_voting_engine::{
    ClassificationResult, CodeType, IndustryCode, StrategyVote, VotingConfig, VotingContext,
    VotingEngine, VotingError, VotingResult, VotingStrategy,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn result(code: &str, code_type: CodeType, confidence: f64) -> ClassificationResult {
    ClassificationResult::new(IndustryCode::new(code, code_type, ""), confidence)
        .with_match("keyword", vec![code.to_string()])
}

/// Keyword, description and name strategies classifying a grocery store.
fn grocery_ballots() -> Vec<StrategyVote> {
    vec![
        StrategyVote::new(
            "keyword_matching",
            0.8,
            0.9,
            vec![
                result("5411", CodeType::Sic, 0.92),
                result("445110", CodeType::Naics, 0.75),
            ],
        ),
        StrategyVote::new(
            "description_analysis",
            0.7,
            0.85,
            vec![
                result("5411", CodeType::Sic, 0.88),
                result("5411", CodeType::Mcc, 0.70),
            ],
        ),
        StrategyVote::new(
            "business_name",
            0.6,
            0.8,
            vec![result("5411", CodeType::Sic, 0.81)],
        ),
    ]
}

fn engine(strategy: VotingStrategy) -> VotingEngine {
    VotingEngine::new(VotingConfig::default().with_strategy(strategy))
}

fn assert_scores_in_range(result: &VotingResult) {
    for score in [
        result.voting_score,
        result.agreement,
        result.consistency,
        result.diversity,
    ] {
        assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
    }
}

#[test]
fn test_weighted_average_keeps_every_proposed_code() {
    let votes = grocery_ballots();
    let result = engine(VotingStrategy::WeightedAverage)
        .conduct_voting(&VotingContext::new(), &votes)
        .unwrap();

    assert_eq!(result.final_results.len(), 3);
    assert_eq!(result.final_results[0].code.code, "5411");
    assert_eq!(result.final_results[0].code.code_type, CodeType::Sic);
    assert_eq!(result.final_results[0].voter_count, 3);
    assert_eq!(result.voting_strategy, VotingStrategy::WeightedAverage);
    // SIC, NAICS and MCC all made the ranking
    assert_eq!(result.diversity, 1.0);
    assert_scores_in_range(&result);
}

#[test]
fn test_borda_count_with_differently_ranked_ballots() {
    let votes = vec![
        StrategyVote::new(
            "keyword_matching",
            0.8,
            0.85,
            vec![
                result("5411", CodeType::Sic, 0.85),
                result("722513", CodeType::Naics, 0.60),
            ],
        ),
        StrategyVote::new(
            "description_analysis",
            0.7,
            0.70,
            vec![
                result("722513", CodeType::Naics, 0.70),
                result("5411", CodeType::Sic, 0.55),
            ],
        ),
    ];

    let result = engine(VotingStrategy::BordaCount)
        .conduct_voting(&VotingContext::new(), &votes)
        .unwrap();

    assert_eq!(result.final_results.len(), 2);
    // 5411: 2*0.8 + 1*0.7 = 2.3, 722513: 1*0.8 + 2*0.7 = 2.2
    assert_eq!(result.final_results[0].code.code, "5411");
    assert_eq!(result.final_results[1].code.code, "722513");
    assert_scores_in_range(&result);
}

#[test]
fn test_majority_default_keeps_single_voter_codes() {
    let result = engine(VotingStrategy::Majority)
        .conduct_voting(&VotingContext::new(), &grocery_ballots())
        .unwrap();

    // 0.5 over three voters needs only one of them
    assert_eq!(result.final_results.len(), 3);
    assert_eq!(result.final_results[0].code.code, "5411");
    assert_eq!(result.final_results[0].score, 1.0);
    assert_scores_in_range(&result);
}

#[test]
fn test_insufficient_votes_returns_no_result() {
    let engine = VotingEngine::new(VotingConfig {
        min_voters: 3,
        ..Default::default()
    });
    let votes = vec![grocery_ballots().remove(0)];

    let err = engine
        .conduct_voting(&VotingContext::new(), &votes)
        .unwrap_err();
    assert_eq!(err, VotingError::InsufficientVotes { required: 3, actual: 1 });
}

#[test]
fn test_invalid_weight_rejected_under_every_strategy() {
    let mut votes = grocery_ballots();
    votes[1].weight = 1.5;

    for strategy in VotingStrategy::ALL {
        let err = engine(strategy)
            .conduct_voting(&VotingContext::new(), &votes)
            .unwrap_err();
        assert!(
            matches!(err, VotingError::InvalidWeight { strategy: ref name, .. } if name == "description_analysis"),
            "unexpected error: {:?}",
            err
        );
    }
}

#[test]
fn test_out_of_range_result_confidence_rejected() {
    for bad in [7.5, f64::NAN] {
        let mut votes = grocery_ballots();
        votes[2].results[0].confidence = bad;

        let err = engine(VotingStrategy::WeightedAverage)
            .conduct_voting(&VotingContext::new(), &votes)
            .unwrap_err();
        assert!(
            matches!(err, VotingError::InvalidWeight { strategy: ref name, field: "result confidence", .. } if name == "business_name"),
            "unexpected error: {:?}",
            err
        );
    }
}

#[test]
fn test_statistics_primitives() {
    assert_eq!(calculate_mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
    assert_eq!(calculate_mean(&[]), 0.0);
    assert_eq!(calculate_variance(&[1.0], 1.0), 0.0);
}

#[test]
fn test_outlier_filtering_drops_low_confidence_ballot() {
    let engine = VotingEngine::new(VotingConfig {
        enable_outlier_filtering: true,
        outlier_threshold: 1.0,
        ..Default::default()
    });
    let votes = vec![
        StrategyVote::new("keyword_matching", 0.8, 0.85, vec![result("5411", CodeType::Sic, 0.9)]),
        StrategyVote::new("business_name", 0.8, 0.1, vec![result("7011", CodeType::Sic, 0.3)]),
        StrategyVote::new("description_analysis", 0.8, 0.9, vec![result("5411", CodeType::Sic, 0.8)]),
    ];

    let result = engine.conduct_voting(&VotingContext::new(), &votes).unwrap();
    assert_eq!(result.metadata.valid_votes, 2);
    assert_eq!(result.metadata.outliers_removed, 1);
    assert!(result.final_results.iter().all(|r| r.code.code != "7011"));

    // two ballots are never filtered, whatever the threshold
    let strict = VotingEngine::new(VotingConfig {
        outlier_threshold: 0.001,
        ..Default::default()
    });
    let result = strict
        .conduct_voting(&VotingContext::new(), &votes[..2])
        .unwrap();
    assert_eq!(result.metadata.valid_votes, 2);
    assert_eq!(result.metadata.outliers_removed, 0);
}

#[test]
fn test_diversity_over_all_code_types() {
    assert_eq!(
        calculate_diversity([CodeType::Sic, CodeType::Naics, CodeType::Mcc]),
        1.0
    );
}

#[test]
fn test_final_results_come_from_surviving_votes() {
    let votes = grocery_ballots();
    let proposed: BTreeSet<(String, CodeType)> = votes
        .iter()
        .flat_map(|v| v.results.iter())
        .map(|r| (r.code.code.clone(), r.code.code_type))
        .collect();

    for strategy in VotingStrategy::ALL {
        let result = engine(strategy)
            .conduct_voting(&VotingContext::new(), &votes)
            .unwrap();

        assert_scores_in_range(&result);
        for (i, entry) in result.final_results.iter().enumerate() {
            assert_eq!(entry.rank, i + 1);
            assert!(proposed.contains(&(entry.code.code.clone(), entry.code.code_type)));
        }
    }
}

#[test]
fn test_consensus_yields_fewer_codes_than_weighted_average() {
    let votes = grocery_ballots();
    let consensus = VotingEngine::new(VotingConfig {
        strategy: VotingStrategy::Consensus,
        required_agreement: 0.7,
        ..Default::default()
    })
    .conduct_voting(&VotingContext::new(), &votes)
    .unwrap();
    let weighted = engine(VotingStrategy::WeightedAverage)
        .conduct_voting(&VotingContext::new(), &votes)
        .unwrap();

    assert_eq!(consensus.final_results.len(), 1);
    assert!(consensus.final_results.len() < weighted.final_results.len());
    // only SIC survives, so diversity drops to one third
    assert!((consensus.diversity - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_repeated_calls_are_identical() {
    let votes = grocery_ballots();

    for strategy in VotingStrategy::ALL {
        let engine = engine(strategy);
        let first = engine.conduct_voting(&VotingContext::new(), &votes).unwrap();
        let second = engine.conduct_voting(&VotingContext::new(), &votes).unwrap();

        assert_eq!(first.final_results, second.final_results);
        assert_eq!(first.voting_score.to_bits(), second.voting_score.to_bits());
        assert_eq!(first.agreement.to_bits(), second.agreement.to_bits());
        assert_eq!(first.consistency.to_bits(), second.consistency.to_bits());
        assert_eq!(first.diversity.to_bits(), second.diversity.to_bits());
    }
}

#[test]
fn test_ballot_batch_from_json() {
    let json = r#"[
        {
            "strategy_name": "keyword_matching",
            "weight": 0.8,
            "confidence": 0.9,
            "results": [
                { "code": { "code": "7372", "code_type": "SIC", "description": "Prepackaged Software" }, "confidence": 0.9 }
            ]
        },
        null
    ]"#;
    let ballots: Vec<Option<StrategyVote>> = serde_json::from_str(json).unwrap();

    let err = engine(VotingStrategy::WeightedAverage)
        .conduct_ballots(&VotingContext::new(), &ballots)
        .unwrap_err();
    assert_eq!(err, VotingError::NilVote { index: 1 });
}

#[tokio::test]
async fn test_shared_engine_serves_concurrent_calls() {
    let shared = Arc::new(engine(VotingStrategy::BordaCount));
    let votes = Arc::new(grocery_ballots());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let shared = shared.clone();
            let votes = votes.clone();
            tokio::spawn(async move {
                shared
                    .conduct_voting(&VotingContext::new(), &votes)
                    .map(|r| r.final_results)
            })
        })
        .collect();

    let mut rankings = Vec::new();
    for handle in handles {
        rankings.push(handle.await.unwrap().unwrap());
    }

    assert!(rankings.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(rankings[0][0].code.code, "5411");
}
