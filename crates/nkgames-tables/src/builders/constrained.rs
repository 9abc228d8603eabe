//! Constrained-search game tables
//!
//! A coalition's free bits are the union of its members' bits. Every trial
//! climbs from the shared baseline over those bits only, with its own
//! sub-seed; v(S) is the mean final fitness.

use nkgames_common::bits::union_sorted;
use nkgames_common::stats;
use nkgames_common::{
    ConfigError, Design, GameTableRecord, NkError, Player, Result, SearchPlayer, SUB_SEED_BOUND,
};
use nkgames_dynamics::{ConstrainedLocalSearchEngine, LocalSearchConfig};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use super::{annotate, empty_coalition_note};
use crate::coalition::enumerate_coalitions;

/// Builder for tables whose players own disjoint or overlapping free bits
pub struct ConstrainedTableBuilder<'a> {
    landscape: &'a NkLandscape,
    baseline: Design,
    players: Vec<SearchPlayer>,
    config: LocalSearchConfig,
    trials: usize,
    scenario_name: String,
    rng: ChaCha8Rng,
}

impl<'a> ConstrainedTableBuilder<'a> {
    /// `players: None` gives one player per bit, ids `"0".."N-1"`
    pub fn new(
        landscape: &'a NkLandscape,
        baseline: Design,
        players: Option<Vec<SearchPlayer>>,
        config: LocalSearchConfig,
        seed: u64,
    ) -> Result<Self> {
        NkError::check_len(landscape.n(), baseline.len())?;
        let players = players.unwrap_or_else(|| SearchPlayer::one_per_bit(landscape.n()));
        for player in &players {
            for &bit in player.bits() {
                ConfigError::check_bit(bit, landscape.n())?;
            }
        }
        Ok(Self {
            landscape,
            baseline,
            players,
            config,
            trials: 1,
            scenario_name: "levinthal1997".to_string(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn scenario_name(mut self, name: impl Into<String>) -> Self {
        self.scenario_name = name.into();
        self
    }

    pub fn players(&self) -> &[SearchPlayer] {
        &self.players
    }

    /// `scenario=<name>;N=..;K=..;trials=..`
    pub fn notes(&self) -> String {
        format!(
            "scenario={};N={};K={};trials={}",
            self.scenario_name,
            self.landscape.n(),
            self.landscape.k(),
            self.trials
        )
    }

    #[instrument(skip(self), fields(players = self.players.len(), trials = self.trials))]
    pub fn build_table(&mut self, max_size: Option<usize>) -> Result<Vec<GameTableRecord>> {
        if self.trials == 0 {
            return Err(ConfigError::NonPositiveCount { what: "trials" }.into());
        }
        self.config.validate()?;

        let notes = self.notes();
        let baseline_fitness = self.landscape.evaluate(&self.baseline)?;
        let mut records = Vec::new();

        for (coalition_id, coalition) in enumerate_coalitions(&self.players, max_size).enumerate() {
            let members: Vec<String> =
                coalition.iter().map(|p| p.player_id().to_string()).collect();
            let free_bits = union_sorted(coalition.iter().map(|&p| p.bits()));

            if free_bits.is_empty() {
                let notes = if coalition.is_empty() {
                    empty_coalition_note(&notes)
                } else {
                    annotate(&notes, "no free bits")
                };
                records.push(GameTableRecord {
                    coalition_id,
                    size: members.len(),
                    members,
                    mean_value: baseline_fitness,
                    std_value: 0.0,
                    runs: 0,
                    notes,
                });
                continue;
            }

            let mut values = Vec::with_capacity(self.trials);
            for _ in 0..self.trials {
                let sub_seed = self.rng.gen_range(0..SUB_SEED_BOUND);
                let mut engine = ConstrainedLocalSearchEngine::new(
                    self.landscape,
                    self.baseline.clone(),
                    free_bits.iter().copied(),
                    self.config.clone(),
                    sub_seed,
                )?;
                values.push(engine.run_once()?.final_fitness);
            }
            let (mean_value, std_value) = stats::summarize(&values);
            debug!(coalition_id, free_bits = free_bits.len(), mean_value, "Coalition valued");
            records.push(GameTableRecord {
                coalition_id,
                size: members.len(),
                members,
                mean_value,
                std_value,
                runs: self.trials,
                notes: notes.clone(),
            });
        }
        info!(records = records.len(), "Constrained search table built");
        Ok(records)
    }
}
