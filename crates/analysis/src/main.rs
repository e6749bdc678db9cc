//! Analysis tool for upset-downset games.
//!
//! Solves games exactly, approximates their outcome with search-driven
//! playouts, generates random games as JSON and benchmarks the agent
//! against the exact solver.

mod agent;

use agent::{Agent, Playout};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use updown_game::{GameRecord, Outcome, Player, RandomGameConfig, UpDown};

/// Upset-downset analysis tool.
#[derive(Parser)]
#[command(name = "updown")]
#[command(about = "Solve, approximate and generate upset-downset games")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exact outcome class of a game.
    Solve {
        #[command(flatten)]
        input: GameInput,
    },

    /// Outcome class estimated from greedy search playouts.
    Approximate {
        #[command(flatten)]
        input: GameInput,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// The search's move for one player.
    Predict {
        #[command(flatten)]
        input: GameInput,

        #[command(flatten)]
        search: SearchArgs,

        /// Player to move.
        #[arg(short, long, value_enum, default_value = "up")]
        player: Mover,
    },

    /// Print a uniformly random game as JSON.
    Random {
        /// Number of nodes.
        #[arg(short, long, default_value = "8")]
        nodes: usize,

        /// Color nodes uniformly Blue, Green or Red instead of all Green.
        #[arg(short, long)]
        colored: bool,

        /// Markov chain runs nodes^exponent steps.
        #[arg(long, default_value = "2")]
        exponent: u32,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Compare the agent with the exact solver on random games.
    Benchmark {
        /// Number of games.
        #[arg(short, long, default_value = "20")]
        games: usize,

        /// Nodes per game.
        #[arg(short, long, default_value = "6")]
        nodes: usize,

        /// Color nodes uniformly Blue, Green or Red instead of all Green.
        #[arg(short, long)]
        colored: bool,

        #[command(flatten)]
        search: SearchArgs,
    },
}

/// Where a game comes from: a JSON file or a structured family.
#[derive(Args)]
struct GameInput {
    /// JSON game file: {"dag": {...}, "coloring": {...}, "reduced": false}.
    #[arg(conflicts_with_all = ["nim", "bipartite"])]
    file: Option<PathBuf>,

    /// Nim heaps, e.g. `--nim 3,5`.
    #[arg(long, value_delimiter = ',', conflicts_with = "bipartite")]
    nim: Vec<usize>,

    /// Complete bipartite graphs as TOPxBOTTOM, e.g. `--bipartite 2x3,1x1`.
    #[arg(long, value_delimiter = ',', value_parser = parse_bipartite)]
    bipartite: Vec<(usize, usize)>,
}

#[derive(Args)]
struct SearchArgs {
    /// Number of search simulations per move.
    #[arg(short, long, default_value = "200")]
    simulations: usize,

    /// Maximum depth of random playouts at the leaves.
    #[arg(long, default_value = "50")]
    rollout_depth: usize,

    /// Evaluate leaves with uniform priors and value 0 instead of playouts.
    #[arg(long)]
    uniform: bool,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl SearchArgs {
    fn agent(&self) -> Agent {
        let playout = if self.uniform {
            Playout::Uniform
        } else {
            Playout::Rollout {
                depth: self.rollout_depth,
            }
        };
        Agent::new(self.simulations, playout, self.seed)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Mover {
    Up,
    Down,
}

impl From<Mover> for Player {
    fn from(mover: Mover) -> Self {
        match mover {
            Mover::Up => Player::Up,
            Mover::Down => Player::Down,
        }
    }
}

/// Parse `MxN` into `(m top, n bottom)`.
fn parse_bipartite(s: &str) -> std::result::Result<(usize, usize), String> {
    let (top, bottom) = s
        .split_once('x')
        .ok_or_else(|| format!("expected TOPxBOTTOM, got {:?}", s))?;
    let top = top.trim().parse().map_err(|e| format!("{:?}: {}", top, e))?;
    let bottom = bottom
        .trim()
        .parse()
        .map_err(|e| format!("{:?}: {}", bottom, e))?;
    Ok((top, bottom))
}

/// Build the game named by the command line.
fn load_game(input: &GameInput) -> Result<UpDown> {
    if let Some(path) = &input.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read game file: {:?}", path))?;
        let record: GameRecord = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse game file: {:?}", path))?;
        return record
            .into_game()
            .with_context(|| format!("Invalid game in {:?}", path));
    }
    if !input.nim.is_empty() {
        return Ok(UpDown::nim(&input.nim));
    }
    if !input.bipartite.is_empty() {
        return Ok(UpDown::complete_bipartite(&input.bipartite));
    }
    bail!("no game given: pass a JSON file, --nim or --bipartite")
}

fn cmd_solve(input: &GameInput) -> Result<()> {
    let game = load_game(input)?;
    info!(nodes = game.node_count(), edges = game.edge_count(), "solving");

    let start = Instant::now();
    let outcome = game.outcome();
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "solved");

    println!("{}", outcome);
    Ok(())
}

fn cmd_approximate(input: &GameInput, search: &SearchArgs) -> Result<()> {
    let game = load_game(input)?;
    info!(
        nodes = game.node_count(),
        simulations = search.simulations,
        "approximating"
    );
    let outcome = search
        .agent()
        .approximate_outcome(&game)
        .context("Search failed")?;
    println!("{}", outcome);
    Ok(())
}

fn cmd_predict(input: &GameInput, search: &SearchArgs, player: Player) -> Result<()> {
    let game = load_game(input)?;
    let node = search
        .agent()
        .predict_next_move(&game, player)
        .with_context(|| format!("No move for {}", player))?;
    println!("{}", node);
    Ok(())
}

fn cmd_random(nodes: usize, colored: bool, exponent: u32, seed: u64) -> Result<()> {
    let config = RandomGameConfig {
        markov_exponent: exponent,
        colored,
        ..RandomGameConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let game = UpDown::random(nodes, &config, &mut rng).context("Failed to generate game")?;
    let json = serde_json::to_string_pretty(&GameRecord::from(&game))
        .context("Failed to serialize game")?;
    println!("{}", json);
    Ok(())
}

/// One benchmark game: the exact and the approximate outcome.
fn benchmark_game(
    nodes: usize,
    config: &RandomGameConfig,
    agent: &Agent,
    seed: u64,
) -> Result<(Outcome, Outcome)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let game = UpDown::random(nodes, config, &mut rng)?;
    let exact = game.outcome();
    let approximate = agent.approximate_outcome(&game)?;
    debug!(seed, %exact, %approximate, "benchmark game");
    Ok((exact, approximate))
}

fn cmd_benchmark(games: usize, nodes: usize, colored: bool, search: &SearchArgs) -> Result<()> {
    let config = if colored {
        RandomGameConfig::colored()
    } else {
        RandomGameConfig::default()
    };
    let agent = search.agent();

    println!(
        "Benchmarking {} games of {} nodes with {} simulations/move",
        games, nodes, search.simulations
    );
    let start = Instant::now();

    let results: Vec<(Outcome, Outcome)> = (0..games)
        .into_par_iter()
        .map(|i| benchmark_game(nodes, &config, &agent, search.seed.wrapping_add(i as u64 * 1000)))
        .collect::<Result<_>>()
        .context("Benchmark game failed")?;

    let agreed = results.iter().filter(|(exact, approx)| exact == approx).count();
    let elapsed = start.elapsed();

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    for class in [Outcome::Next, Outcome::Previous, Outcome::Up, Outcome::Down] {
        let total = results.iter().filter(|(exact, _)| *exact == class).count();
        let hits = results
            .iter()
            .filter(|(exact, approx)| *exact == class && approx == exact)
            .count();
        println!("{:<9} {:>4}/{:<4}", class.to_string(), hits, total);
    }
    if games > 0 {
        println!(
            "Agreement: {}/{} ({:.1}%)",
            agreed,
            games,
            agreed as f64 / games as f64 * 100.0
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { input } => cmd_solve(&input),
        Commands::Approximate { input, search } => cmd_approximate(&input, &search),
        Commands::Predict {
            input,
            search,
            player,
        } => cmd_predict(&input, &search, player.into()),
        Commands::Random {
            nodes,
            colored,
            exponent,
            seed,
        } => cmd_random(nodes, colored, exponent, seed),
        Commands::Benchmark {
            games,
            nodes,
            colored,
            search,
        } => cmd_benchmark(games, nodes, colored, &search),
    }
}
