use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rush_hour_solver::{load_puzzle, solve, Algorithm, SearchLimits};

// Puzzle format:
// height,width
// id,x,y,H|V,length
// ...
// The vehicle with id X has to leave through the right edge.

/// Solve a Rush Hour puzzle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Puzzle definition file
    puzzle: PathBuf,

    /// Search algorithm
    #[arg(short, long, value_enum, default_value_t = Choice::Astar)]
    algorithm: Choice,

    /// Give up after this many seconds
    #[arg(short, long, default_value_t = 30.0)]
    time_limit: f64,

    /// Give up after expanding this many states
    #[arg(short, long, default_value_t = 200_000)]
    max_expansions: usize,

    /// Search until the state space is exhausted
    #[arg(long)]
    no_limits: bool,

    /// Print the board after every move
    #[arg(short, long)]
    replay: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Choice {
    Bfs,
    Astar,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let board = load_puzzle(&args.puzzle)
        .with_context(|| format!("failed to load {}", args.puzzle.display()))?;

    println!("Initial board ({}):", args.puzzle.display());
    println!("{}", board);
    println!("----");

    let limits = if args.no_limits {
        SearchLimits::unlimited()
    } else {
        let time_limit = Duration::try_from_secs_f64(args.time_limit)
            .with_context(|| format!("invalid time limit {}", args.time_limit))?;
        SearchLimits::new(time_limit, args.max_expansions)
    };
    let algorithm = match args.algorithm {
        Choice::Bfs => Algorithm::Bfs,
        Choice::Astar => Algorithm::AStar,
    };

    let search = solve(&board, algorithm, &limits);

    let Some(actions) = search.solution else {
        println!("No solution found");
        return Ok(());
    };

    println!("Found a solution in {} moves:", actions.len());
    for action in &actions {
        println!("  {}", action);
    }
    println!(
        "Expanded {} board positions (generated {} total).",
        search.expanded, search.generated
    );

    if args.replay {
        for (step, state) in board.replay(&actions)?.iter().enumerate().skip(1) {
            println!("----");
            println!("{}. {}", step, actions[step - 1]);
            println!("{}", state);
        }
    }

    Ok(())
}
