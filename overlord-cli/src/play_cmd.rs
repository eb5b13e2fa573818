//! Play command - AI self-play on a scenario
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_scenario(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use overlord_core::{GameResult, GreedyAi, Heuristics, Move, RandomDice, Scenario, Side};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Scenario JSON file (built-in skirmish if omitted)
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Maximum turns per game
    #[arg(long, default_value = "60")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    turns: u32,
    /// Medals won by the bottom and top player
    medals: [usize; 2],
    moves: Vec<Move>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    scenario: String,
    games: Vec<GameRecord>,
    allies_wins: usize,
    axis_wins: usize,
    unfinished: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let scenario = load_scenario(args.scenario.as_deref())?;

    tracing::info!(
        scenario = %scenario.name,
        games = args.games,
        max_turns = args.max_turns,
        "starting self-play"
    );

    let results = play_match(&scenario, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

pub(crate) fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario: {}", path.display())),
        None => Ok(Scenario::default()),
    }
}

fn play_match(scenario: &Scenario, args: &PlayArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let record = play_single_game(scenario, game_num + 1, args.max_turns, &mut rng)?;

        tracing::info!(
            game = record.game_number,
            result = ?record.result,
            turns = record.turns,
            "game finished"
        );

        games.push(record);
    }

    Ok(compute_match_statistics(scenario.name.clone(), games))
}

fn report_results(results: &MatchResults, args: &PlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(
    scenario: &Scenario,
    game_number: usize,
    max_turns: u32,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let state = scenario.to_game_state(rng)?;
    let mut ai = GreedyAi::with_seed(Heuristics::default(), rng.gen());
    let mut dice = RandomDice::new(rng.gen());

    let (final_state, moves) = ai.play_game(state, &mut dice, max_turns)?;

    Ok(GameRecord {
        game_number,
        result: final_state.result(),
        turns: final_state.turn,
        medals: [
            final_state.score().medal_count(0),
            final_state.score().medal_count(1),
        ],
        moves,
    })
}

fn compute_match_statistics(scenario: String, games: Vec<GameRecord>) -> MatchResults {
    let allies_wins = games
        .iter()
        .filter(|g| g.result == GameResult::Won(Side::Allies))
        .count();
    let axis_wins = games
        .iter()
        .filter(|g| g.result == GameResult::Won(Side::Axis))
        .count();
    let unfinished = games
        .iter()
        .filter(|g| g.result == GameResult::Ongoing)
        .count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        scenario,
        games,
        allies_wins,
        axis_wins,
        unfinished,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn result_label(result: GameResult) -> &'static str {
    match result {
        GameResult::Won(Side::Allies) => "Allies win",
        GameResult::Won(Side::Axis) => "Axis win",
        GameResult::Ongoing => "unfinished",
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        turns: u32,
        medals: [usize; 2],
        moves: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        scenario: String,
        total_games: usize,
        allies_wins: usize,
        axis_wins: usize,
        unfinished: usize,
        avg_turns: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        scenario: results.scenario.clone(),
        total_games: results.games.len(),
        allies_wins: results.allies_wins,
        axis_wins: results.axis_wins,
        unfinished: results.unfinished,
        avg_turns: results.avg_turns,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                turns: g.turns,
                medals: g.medals,
                moves: g.moves.iter().map(Move::to_string).collect(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== {} ===", results.scenario);
    println!("Total games: {}", total);
    println!(
        "Allies wins: {} ({:.1}%)",
        results.allies_wins,
        percent(results.allies_wins, total)
    );
    println!(
        "Axis wins:   {} ({:.1}%)",
        results.axis_wins,
        percent(results.axis_wins, total)
    );
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg turns:   {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} in {} turns, medals {}-{} ({} moves)",
            game.game_number,
            result_label(game.result),
            game.turns,
            game.medals[0],
            game.medals[1],
            game.moves.len()
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, result: GameResult, turns: u32) -> GameRecord {
        GameRecord {
            game_number,
            result,
            turns,
            medals: [0, 0],
            moves: vec![],
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics("s".into(), vec![]);
        assert_eq!(results.allies_wins, 0);
        assert_eq!(results.axis_wins, 0);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, GameResult::Won(Side::Allies), 10),
            record(2, GameResult::Won(Side::Axis), 20),
            record(3, GameResult::Won(Side::Allies), 30),
        ];

        let results = compute_match_statistics("s".into(), games);
        assert_eq!(results.allies_wins, 2);
        assert_eq!(results.axis_wins, 1);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_turns, 20.0);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_seeded_games_repeat() {
        let scenario = Scenario::default();
        let a = play_single_game(&scenario, 1, 6, &mut create_rng(Some(3))).unwrap();
        let b = play_single_game(&scenario, 1, 6, &mut create_rng(Some(3))).unwrap();
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_missing_scenario_file() {
        let err = load_scenario(Some(Path::new("/nonexistent/scenario.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load scenario"));
    }
}
