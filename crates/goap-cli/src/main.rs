//! `goap` - run the camp sample headless on either planner backend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use goap_core::Vec3;
use goap_planner::{BackendKind, LogConfig, PlannerConfig};
use goap_tools::PlannerSnapshot;
use tracing_subscriber::{fmt, EnvFilter};

mod camp;

use camp::{spawn_position, CampAgent, Scene};

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Run the GOAP camp sample without a game engine")]
#[command(version)]
struct Cli {
    /// Planner backend; overrides the config file
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Planner configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of agents, each with its own planner
    #[arg(short, long, default_value_t = 4)]
    agents: usize,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 300)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.2)]
    dt: f32,

    /// Agent walking speed in units per second
    #[arg(long, default_value_t = 4.0)]
    speed: f32,

    /// Print each planner's final snapshot as JSON
    #[arg(long)]
    snapshot: bool,

    /// Verbose output, including planner search logs
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Sequential,
    Graph,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sequential => BackendKind::Sequential,
            Backend::Graph => BackendKind::Graph,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(&cli)?;
    run_camp(&cli, config)
}

fn load_config(cli: &Cli) -> Result<PlannerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("loading planner config from {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }
    if cli.verbose {
        config.log = LogConfig::all();
    }
    Ok(config)
}

fn run_camp(cli: &Cli, config: PlannerConfig) -> Result<()> {
    tracing::info!(
        backend = ?config.backend,
        agents = cli.agents,
        ticks = cli.ticks,
        "Starting camp"
    );

    let scene = Scene::new(Vec3::new(-8.0, 0.0, -8.0), Vec3::new(8.0, 0.0, 8.0));
    let mut agents = (0..cli.agents)
        .map(|i| {
            CampAgent::new(config.clone(), &scene, spawn_position(i, cli.agents), cli.dt)
                .with_context(|| format!("creating agent {i}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut goals: Vec<Option<String>> = vec![None; agents.len()];

    for tick in 0..cli.ticks {
        scene.move_player(tick as f32 * cli.dt);

        // Submit every agent's search before joining any, so graph jobs overlap.
        for agent in &mut agents {
            agent.lose_energy();
            agent.planner.update();
        }
        for (i, agent) in agents.iter_mut().enumerate() {
            agent.planner.late_update();
            agent.step(cli.speed, cli.dt);

            let goal = agent.planner.active_goal().map(|g| g.name().to_string());
            if goal != goals[i] {
                tracing::info!(
                    tick,
                    agent = i,
                    goal = goal.as_deref().unwrap_or("-"),
                    plan = ?agent.planner.active_plan_names(),
                    "Goal changed"
                );
                goals[i] = goal;
            }
        }
    }

    for (i, agent) in agents.iter().enumerate() {
        let body = agent.body();
        tracing::info!(
            agent = i,
            energy = body.energy,
            goal = goals[i].as_deref().unwrap_or("-"),
            action = agent.planner.active_action().map(|a| a.name()).unwrap_or("-"),
            "Final state"
        );
    }

    if cli.snapshot {
        let snapshots: Vec<PlannerSnapshot> = agents.iter().map(|a| a.planner.snapshot()).collect();
        let json = serde_json::to_string_pretty(&snapshots).context("serializing snapshots")?;
        println!("{json}");
    }

    Ok(())
}
