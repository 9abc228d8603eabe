//! Game-value protocols: how a social learning run becomes v(S)

use std::fmt;
use std::str::FromStr;

use nkgames_common::stats;
use nkgames_common::{Agent, ConfigError, NkError, Result};
use nkgames_dynamics::SimulationResult;
use serde::{Deserialize, Serialize};

/// Scalar value of a coalition's simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameValueProtocol {
    /// Mean final fitness of the coalition's members
    #[serde(alias = "avg_final")]
    AverageFinalScore,
    /// Best final fitness among the coalition's members
    MaxFinalScore,
}

impl Default for GameValueProtocol {
    fn default() -> Self {
        GameValueProtocol::AverageFinalScore
    }
}

impl GameValueProtocol {
    /// Members missing from the run's final scores count as 0.0; no members gives 0.0
    pub fn evaluate(&self, result: &SimulationResult, coalition: &[Agent]) -> f64 {
        let scores: Vec<f64> = coalition
            .iter()
            .map(|agent| {
                result
                    .final_scores
                    .get(&agent.agent_id)
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
        if scores.is_empty() {
            return 0.0;
        }
        match self {
            GameValueProtocol::AverageFinalScore => stats::mean(&scores),
            GameValueProtocol::MaxFinalScore => stats::max(&scores),
        }
    }
}

impl FromStr for GameValueProtocol {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average_final_score" | "avg_final" => Ok(GameValueProtocol::AverageFinalScore),
            "max_final_score" => Ok(GameValueProtocol::MaxFinalScore),
            _ => Err(ConfigError::unsupported("game value protocol", s).into()),
        }
    }
}

impl fmt::Display for GameValueProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameValueProtocol::AverageFinalScore => f.write_str("average_final_score"),
            GameValueProtocol::MaxFinalScore => f.write_str("max_final_score"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(scores: &[(usize, f64)]) -> SimulationResult {
        SimulationResult {
            history: Vec::new(),
            final_scores: scores.iter().copied().collect::<BTreeMap<_, _>>(),
            best_score: 0.0,
            best_state: None,
        }
    }

    #[test]
    fn test_average_and_max() {
        let run = result(&[(0, 0.2), (1, 0.6), (2, 1.0)]);
        let coalition = vec![Agent::new(0, vec![0]), Agent::new(1, vec![1])];
        let avg = GameValueProtocol::AverageFinalScore.evaluate(&run, &coalition);
        assert!((avg - 0.4).abs() < 1e-12);
        assert_eq!(GameValueProtocol::MaxFinalScore.evaluate(&run, &coalition), 0.6);
    }

    #[test]
    fn test_missing_member_counts_zero() {
        let run = result(&[(0, 0.8)]);
        let coalition = vec![Agent::new(0, vec![0]), Agent::new(5, vec![1])];
        let avg = GameValueProtocol::AverageFinalScore.evaluate(&run, &coalition);
        assert!((avg - 0.4).abs() < 1e-12);
        assert_eq!(GameValueProtocol::MaxFinalScore.evaluate(&run, &[]), 0.0);
    }

    #[test]
    fn test_aliases() {
        for name in ["average_final_score", "avg_final", "AVG_FINAL"] {
            assert_eq!(
                name.parse::<GameValueProtocol>().unwrap(),
                GameValueProtocol::AverageFinalScore
            );
        }
        assert_eq!(
            "max_final_score".parse::<GameValueProtocol>().unwrap(),
            GameValueProtocol::MaxFinalScore
        );
        assert!("median".parse::<GameValueProtocol>().is_err());
    }
}
