//! Show command - print a scenario's opening position

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use overlord_core::{
    BoardGeometry, GameState, Move, PlayerPosition, Side, Terrain, UnitKind,
};

use crate::play_cmd::{create_rng, load_scenario};

#[derive(Args)]
pub struct ShowArgs {
    /// Scenario JSON file (built-in skirmish if omitted)
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ShowArgs, seed: Option<u64>) -> Result<()> {
    let scenario = load_scenario(args.scenario.as_deref())?;
    let game = scenario.to_game_state(&mut create_rng(seed))?;
    let moves = game.legal_moves();

    if args.json {
        print_json(&scenario.name, &game, &moves)?;
    } else {
        println!("=== {} ===\n", scenario.name);
        println!("{}", render_board(&game));
        print_hands(&game);
        println!("\nLegal moves for {:?}:", game.active_player().side);
        for mv in &moves {
            println!("  {}", mv);
        }
    }

    Ok(())
}

fn print_hands(game: &GameState) {
    for position in [PlayerPosition::Bottom, PlayerPosition::Top] {
        let names: Vec<String> = game
            .hand(position)
            .iter()
            .map(|card| format!("{} ({})", card.name, card.id))
            .collect();
        println!("{:?} hand: {}", position, names.join(", "));
    }
}

fn print_json(name: &str, game: &GameState, moves: &[Move]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonUnit {
        id: u32,
        side: Side,
        kind: UnitKind,
        q: i32,
        r: i32,
        strength: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        scenario: &'a str,
        units: Vec<JsonUnit>,
        bottom_hand: Vec<String>,
        top_hand: Vec<String>,
        legal_moves: &'a [Move],
    }

    let hand_names = |position: PlayerPosition| -> Vec<String> {
        game.hand(position)
            .iter()
            .map(|card| card.name.clone())
            .collect()
    };

    let output = JsonOutput {
        scenario: name,
        units: game
            .all_units()
            .iter()
            .map(|u| JsonUnit {
                id: u.id().0,
                side: u.unit.side,
                kind: u.unit.kind,
                q: u.coord.q,
                r: u.coord.r,
                strength: u.state.strength,
            })
            .collect(),
        bottom_hand: hand_names(PlayerPosition::Bottom),
        top_hand: hand_names(PlayerPosition::Top),
        legal_moves: moves,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// ASCII board, row 0 at the top, odd rows shifted half a hex
fn render_board(game: &GameState) -> String {
    let mut out = String::new();
    let mut current_row = None;

    for &hex in BoardGeometry::get().all_hexes() {
        if current_row != Some(hex.r) {
            if current_row.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{} ", hex.r));
            if hex.r % 2 == 1 {
                out.push_str("  ");
            }
            current_row = Some(hex.r);
        }

        let terrain = terrain_symbol(game.terrain().terrain_at(hex));
        let unit = game
            .board()
            .unit_at(hex)
            .map_or(' ', |u| unit_symbol(u.kind, u.side));
        out.push(terrain);
        out.push(unit);
        out.push_str("  ");
    }
    out.push('\n');
    out
}

fn terrain_symbol(terrain: Terrain) -> char {
    match terrain {
        Terrain::Clear => '.',
        Terrain::Hill => 'h',
        Terrain::Woods => 'w',
        Terrain::Hedgerows => 'H',
        Terrain::Town(_) => 't',
    }
}

/// Allies upper case, Axis lower case
fn unit_symbol(kind: UnitKind, side: Side) -> char {
    let c = match kind {
        UnitKind::Infantry => 'I',
        UnitKind::Armor => 'A',
        UnitKind::Artillery => 'G',
    };
    match side {
        Side::Allies => c,
        Side::Axis => c.to_ascii_lowercase(),
    }
}
