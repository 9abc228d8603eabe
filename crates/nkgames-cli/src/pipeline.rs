//! Scenario pipelines
//!
//! Each scenario builds its landscape and players from an [`Experiment`], runs
//! the matching table builder, and annotates rows with the parameters that
//! produced them.

use anyhow::{Context, Result};
use nkgames_common::{create_agents, Agent, GameTableRecord, ModuleDefinition};
use nkgames_dynamics::NetworkFactory;
use nkgames_landscape::{
    build_designer_modules, build_modular_landscape, build_true_modules, NkLandscape,
};
use nkgames_tables::{ConstrainedTableBuilder, ModularTableBuilder, SocialTableBuilder};
use tracing::{info, instrument};

use crate::config::{Experiment, PlayersBasis, ScenarioType};

/// Build the table for `experiment`, with an optional coalition-size override
#[instrument(skip(experiment), fields(scenario = experiment.scenario.name()))]
pub fn build_table(
    experiment: &Experiment,
    max_size_override: Option<usize>,
) -> Result<Vec<GameTableRecord>> {
    let max_size = max_size_override
        .filter(|&m| m > 0)
        .or(experiment.max_coalition_size);
    let table = match experiment.scenario {
        ScenarioType::Lazer2007 => social_table(experiment, max_size),
        ScenarioType::Levinthal1997 => constrained_table(experiment, max_size),
        ScenarioType::Ethiraj2004 => modular_table(experiment, max_size),
    }?;
    info!(rows = table.len(), "Game table ready");
    Ok(table)
}

fn landscape(experiment: &Experiment) -> Result<NkLandscape> {
    let plan = &experiment.landscape;
    let mut builder = NkLandscape::builder(plan.n, plan.k, plan.seed)
        .conflict_pairs(plan.conflict_pairs.iter().copied());
    if let Some((profile, bit_skills)) = &plan.skills {
        builder = builder.skills(profile.clone(), bit_skills.clone());
    }
    builder.build().context("Failed to build landscape")
}

/// One agent per locus, labelled with that locus's skill when one is mapped
fn agents(experiment: &Experiment) -> Vec<Agent> {
    let bit_skills = experiment.landscape.skills.as_ref().map(|(_, map)| map);
    create_agents(experiment.landscape.n)
        .into_iter()
        .map(|agent| {
            let skill = bit_skills.and_then(|map| map.get(&agent.agent_id)).cloned();
            match skill {
                Some(skill) => agent.with_skill(skill),
                None => agent,
            }
        })
        .collect()
}

fn social_table(experiment: &Experiment, max_size: Option<usize>) -> Result<Vec<GameTableRecord>> {
    let landscape = landscape(experiment)?;
    let agents = agents(experiment);
    let graph = NetworkFactory::new(experiment.topology, experiment.network_seed)
        .build(agents.len(), &experiment.network_params)
        .context("Failed to build communication network")?;
    let sim = &experiment.simulation;
    let notes = format!(
        "scenario=lazer2007;N={};K={};rounds={};velocity={:?};error={:?};runs={};network_type={};\
         landscape_seed={};random_seed={};network_seed={}",
        experiment.landscape.n,
        experiment.landscape.k,
        sim.rounds,
        sim.velocity,
        sim.error_rate,
        experiment.runs,
        experiment.topology,
        experiment.landscape.seed,
        experiment.random_seed,
        experiment.network_seed,
    );
    let table = SocialTableBuilder::new(
        &landscape,
        &agents,
        &graph,
        sim.clone(),
        experiment.random_seed,
    )
    .runs(experiment.runs)
    .protocol(experiment.protocol)
    .notes(notes)
    .build_table(max_size)?;
    Ok(table)
}

fn constrained_table(
    experiment: &Experiment,
    max_size: Option<usize>,
) -> Result<Vec<GameTableRecord>> {
    let landscape = landscape(experiment)?;
    let table = ConstrainedTableBuilder::new(
        &landscape,
        experiment.search_baseline.clone(),
        experiment.players.clone(),
        experiment.search.clone(),
        experiment.random_seed,
    )?
    .trials(experiment.runs)
    .scenario_name(ScenarioType::Levinthal1997.name())
    .build_table(max_size)?;
    Ok(table)
}

fn modular_table(experiment: &Experiment, max_size: Option<usize>) -> Result<Vec<GameTableRecord>> {
    let plan = &experiment.modular;
    let n = experiment.landscape.n;
    let true_modules = build_true_modules(n, plan.true_modules)?;
    let designer_modules = build_designer_modules(n, plan.designer_modules)?;
    let landscape = build_modular_landscape(
        n,
        experiment.landscape.k,
        &true_modules,
        plan.intra_density,
        experiment.landscape.seed,
    )?;
    let partition = match plan.players_basis {
        PlayersBasis::True => &true_modules,
        PlayersBasis::Designer => &designer_modules,
    };
    let players = ModuleDefinition::from_partition(plan.players_basis.prefix(), partition);
    let notes = format!(
        "scenario=ethiraj2004;true={};designer={};basis={}",
        plan.true_modules,
        plan.designer_modules,
        plan.players_basis.name(),
    );
    let table = ModularTableBuilder::from_coevolution(
        &landscape,
        players,
        plan.baseline.clone(),
        &designer_modules,
        &plan.coevolution,
        experiment.runs,
        experiment.random_seed,
    )?
    .basis(plan.value_basis)
    .notes(notes)
    .build_table(max_size)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;

    fn experiment(yaml: &str) -> Experiment {
        ExperimentConfig::from_yaml_str(yaml)
            .unwrap()
            .validate()
            .unwrap()
    }

    #[test]
    fn test_lazer_pipeline_notes_and_override() {
        let exp = experiment(
            "N: 4\nK: 1\nsimulation:\n  rounds: 5\ngame_table:\n  runs: 2\nseeds:\n  random: 3\n",
        );
        let table = build_table(&exp, Some(1)).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0].notes.split(';').last(), Some("empty coalition"));
        assert!(table[1]
            .notes
            .starts_with("scenario=lazer2007;N=4;K=1;rounds=5;velocity=1.0;error=0.0;runs=2;"));
        assert!(table[1].notes.contains("network_type=LINE;landscape_seed=3"));
        assert!(table[1].notes.ends_with("random_seed=3;network_seed=3"));
    }

    #[test]
    fn test_zero_size_override_falls_back_to_config() {
        let yaml = "N: 4\nK: 1\nsimulation:\n  rounds: 2\n\
                    game_table:\n  runs: 1\n  max_coalition_size: 1\n";
        let exp = experiment(yaml);
        assert_eq!(build_table(&exp, Some(0)).unwrap().len(), 5);
        assert_eq!(build_table(&exp, Some(2)).unwrap().len(), 11);
    }

    #[test]
    fn test_agents_carry_mapped_skills() {
        let yaml = r#"
N: 3
K: 1
landscape:
  skill_profile:
    ops: [0.5, 1.0]
  bit_skills:
    "1": OPS
"#;
        let exp = experiment(yaml);
        let agents = agents(&exp);
        assert_eq!(agents[0].skill, None);
        assert_eq!(agents[1].skill.as_deref(), Some("ops"));
    }

    #[test]
    fn test_levinthal_pipeline() {
        let exp = experiment(
            "N: 4\nK: 1\nscenario:\n  type: levinthal1997\nsearch:\n  max_steps: 40\n",
        );
        let table = build_table(&exp, None).unwrap();
        assert_eq!(table.len(), 16);
        assert!(table[0].notes.starts_with("scenario=levinthal1997;N=4;K=1;trials=3"));
        assert_eq!(table[15].runs, 3);
    }

    #[test]
    fn test_ethiraj_pipeline() {
        let yaml = "N: 6\nK: 2\nscenario:\n  type: ethiraj2004\ngame_table:\n  runs: 2\n\
                    ethiraj:\n  true_modules: 2\n  designer_modules: 3\n  firms: 3\n  rounds: 8\n";
        let exp = experiment(yaml);
        let table = build_table(&exp, None).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table[1].members, vec!["D0".to_string()]);
        assert_eq!(table[1].notes, "scenario=ethiraj2004;true=2;designer=3;basis=designer");
        assert_eq!(table[7].runs, 2);
    }
}
