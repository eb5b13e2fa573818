//! Integration tests for turn flow
//!
//! Drives whole turns through the public engine API: card play, ordering,
//! movement, battle, retreat, turn completion and undo.

use overlord_core::{
    standard_deck, CardId, CardLocation, DiceFace, FixedDice, GameConfig, GameError, GameResult,
    GameState, HexCoord, Move, Phase, PlayerPosition, RandomDice, Scenario, Side, Terrain, Unit,
    UnitId, UnitKind,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Unshuffled standard deck: the bottom hand holds Recon Left (0, 1) and
/// Recon Center (2, 3, 4)
const RECON_CENTER: CardId = CardId(2);

fn game_with(units: &[(u32, UnitKind, Side, (i32, i32))], config: GameConfig) -> GameState {
    let mut game = GameState::new(config, standard_deck());
    for &(id, kind, side, (q, r)) in units {
        game.place_unit(HexCoord::new(q, r), Unit::new(UnitId(id), kind, side))
            .unwrap();
    }
    game.finish_setup();
    game.deal_opening_hands();
    game
}

fn play(game: &mut GameState, mv: Move) {
    game.execute_move(&mv, &mut FixedDice::default())
        .unwrap_or_else(|e| panic!("{} failed: {}", mv, e));
}

fn play_with(game: &mut GameState, mv: Move, faces: Vec<DiceFace>) {
    game.execute_move(&mv, &mut FixedDice::new(faces))
        .unwrap_or_else(|e| panic!("{} failed: {}", mv, e));
}

/// Play Recon Center and order unit 1
fn order_unit_one(game: &mut GameState) {
    play(game, Move::PlayCard { card: RECON_CENTER });
    play(game, Move::OrderUnit { unit: UnitId(1) });
    play(game, Move::ConfirmOrders);
}

fn move_targets(game: &GameState, unit: UnitId) -> Vec<HexCoord> {
    game.legal_moves()
        .into_iter()
        .filter_map(|mv| match mv {
            Move::MoveUnit { unit: u, to, .. } if u == unit => Some(to),
            _ => None,
        })
        .collect()
}

// ============================================================================
// TURN COMPLETION
// ============================================================================

#[test]
fn test_end_to_end_turn() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 1)),
        ],
        GameConfig::default(),
    );
    let hand_before = game.hand(PlayerPosition::Bottom).len();
    assert_eq!(game.active_player().side, Side::Allies);

    play(&mut game, Move::PlayCard { card: RECON_CENTER });
    assert_eq!(game.active_card().map(|c| c.id), Some(RECON_CENTER));
    assert_eq!(game.deck().location_of(RECON_CENTER), Ok(CardLocation::BottomPlayerHand));

    play(&mut game, Move::OrderUnit { unit: UnitId(1) });
    assert!(game.board().state(UnitId(1)).unwrap().is_ordered);
    play(&mut game, Move::ConfirmOrders);
    play(&mut game, Move::EndMovements);
    assert_eq!(game.current_phase(), Some(&Phase::Battle));
    play(&mut game, Move::EndBattles);

    assert_eq!(game.deck().location_of(RECON_CENTER), Ok(CardLocation::DiscardPile));
    assert_eq!(game.active_card(), None);
    assert!(!game.board().state(UnitId(1)).unwrap().is_ordered);
    assert_eq!(game.active_player().side, Side::Axis);
    assert_eq!(game.hand(PlayerPosition::Bottom).len(), hand_before);
    assert_eq!(game.hand(PlayerPosition::Top).len(), 5);
    assert_eq!(game.current_phase(), Some(&Phase::PlayCard));
    assert_eq!(game.turn, 1);
}

#[test]
fn test_card_phase_offers_whole_hand() {
    let game = game_with(&[], GameConfig::default());
    let moves = game.legal_moves();
    let expected: Vec<Move> = (0..5).map(|i| Move::PlayCard { card: CardId(i) }).collect();
    assert_eq!(moves, expected);
}

#[test]
fn test_card_from_other_hand_is_illegal() {
    let mut game = game_with(&[], GameConfig::default());
    let err = game
        .execute_move(&Move::PlayCard { card: CardId(7) }, &mut FixedDice::default())
        .unwrap_err();
    assert!(matches!(err, GameError::IllegalMove(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_confirm_with_nothing_orderable() {
    let mut game = game_with(&[(1, UnitKind::Infantry, Side::Allies, (0, 7))], GameConfig::default());
    // Unit is on the left; the card orders the center
    play(&mut game, Move::PlayCard { card: RECON_CENTER });
    assert_eq!(game.legal_moves(), vec![Move::ConfirmOrders]);
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_probe_left_ordering() {
    // Only the Probe Left cards
    let mut cards = standard_deck();
    cards.retain(|c| c.name == "Probe Left");
    let mut game = GameState::new(GameConfig::default().with_hand_sizes(1, 1), cards);
    for (id, (q, r)) in [(1, (-2, 7)), (2, (-3, 8)), (3, (0, 7))] {
        game.place_unit(HexCoord::new(q, r), Unit::new(UnitId(id), UnitKind::Infantry, Side::Allies))
            .unwrap();
    }
    game.finish_setup();
    game.deal_opening_hands();
    let card = game.hand(PlayerPosition::Bottom)[0].id;

    play(&mut game, Move::PlayCard { card });
    let orders = game
        .legal_moves()
        .into_iter()
        .filter(|m| matches!(m, Move::OrderUnit { .. }))
        .count();
    assert_eq!(orders, 3);

    play(&mut game, Move::OrderUnit { unit: UnitId(3) });
    play(&mut game, Move::OrderUnit { unit: UnitId(1) });
    let mut moves = game.legal_moves();
    moves.sort_by_key(|m| m.to_string());
    assert_eq!(
        moves,
        vec![
            Move::ConfirmOrders,
            Move::UnorderUnit { unit: UnitId(1) },
            Move::UnorderUnit { unit: UnitId(3) },
        ]
    );

    play(&mut game, Move::UnorderUnit { unit: UnitId(1) });
    assert!(game.legal_moves().contains(&Move::OrderUnit { unit: UnitId(2) }));
}

#[test]
fn test_top_player_orders_mirrored_section() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (1, 1)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);
    play(&mut game, Move::EndBattles);

    // Axis hand: Recon Center 5, Recon Right 6 and 7, Probe Left 8 and 9.
    // (1, 1) is the bottom player's left, which is the top player's right.
    let mut left = game.fork();
    play(&mut left, Move::PlayCard { card: CardId(8) });
    assert_eq!(left.legal_moves(), vec![Move::ConfirmOrders]);

    play(&mut game, Move::PlayCard { card: CardId(6) });
    assert_eq!(
        game.legal_moves(),
        vec![Move::OrderUnit { unit: UnitId(2) }, Move::ConfirmOrders]
    );
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[test]
fn test_open_ground_movement() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (5, 5)),
            (2, UnitKind::Infantry, Side::Axis, (9, 0)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);

    let moves = game.legal_moves();
    assert_eq!(moves.len(), 19);
    assert_eq!(move_targets(&game, UnitId(1)).len(), 18);
    assert_eq!(moves.last(), Some(&Move::EndMovements));

    play(
        &mut game,
        Move::MoveUnit {
            unit: UnitId(1),
            from: HexCoord::new(5, 5),
            to: HexCoord::new(5, 4),
        },
    );
    assert_eq!(game.legal_moves(), vec![Move::EndMovements]);
    assert!(game.board().state(UnitId(1)).unwrap().has_moved);
}

#[test]
fn test_occupied_neighbor_blocks_movement() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (5, 5)),
            (2, UnitKind::Infantry, Side::Allies, (6, 5)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);

    let targets = move_targets(&game, UnitId(1));
    assert_eq!(targets.len(), 16);
    assert!(!targets.contains(&HexCoord::new(6, 5)));
    assert!(!targets.contains(&HexCoord::new(7, 5)));
}

#[test]
fn test_two_hex_move_skips_battle() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 3)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(
        &mut game,
        Move::MoveUnit {
            unit: UnitId(1),
            from: HexCoord::new(4, 6),
            to: HexCoord::new(4, 4),
        },
    );
    assert!(game.board().state(UnitId(1)).unwrap().skips_battle);
    play(&mut game, Move::EndMovements);
    assert_eq!(game.legal_moves(), vec![Move::EndBattles]);
}

#[test]
fn test_one_hex_move_may_battle() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 3)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(
        &mut game,
        Move::MoveUnit {
            unit: UnitId(1),
            from: HexCoord::new(4, 6),
            to: HexCoord::new(4, 5),
        },
    );
    play(&mut game, Move::EndMovements);
    assert!(game.legal_moves().contains(&Move::Battle {
        attacker: UnitId(1),
        target: UnitId(2),
    }));
}

#[test]
fn test_entering_woods_skips_battle() {
    let mut game = GameState::new(GameConfig::default(), standard_deck());
    game.place_unit(HexCoord::new(4, 6), Unit::new(UnitId(1), UnitKind::Infantry, Side::Allies))
        .unwrap();
    game.place_unit(HexCoord::new(4, 4), Unit::new(UnitId(2), UnitKind::Infantry, Side::Axis))
        .unwrap();
    game.set_terrain(HexCoord::new(4, 5), Terrain::Woods).unwrap();
    game.finish_setup();
    game.deal_opening_hands();

    order_unit_one(&mut game);
    play(
        &mut game,
        Move::MoveUnit {
            unit: UnitId(1),
            from: HexCoord::new(4, 6),
            to: HexCoord::new(4, 5),
        },
    );
    assert!(game.board().state(UnitId(1)).unwrap().skips_battle);
}

// ============================================================================
// BATTLE
// ============================================================================

#[test]
fn test_elimination_wins_game() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Armor, Side::Axis, (4, 5)),
        ],
        GameConfig::default().with_medals_to_win(1),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);

    let battle = Move::Battle {
        attacker: UnitId(1),
        target: UnitId(2),
    };
    play_with(&mut game, battle, vec![DiceFace::Grenade, DiceFace::Armor]);

    assert!(!game.board().contains_unit(UnitId(2)));
    assert_eq!(game.score().medal_count(0), 1);
    assert_eq!(game.score().medals(0)[0].id, UnitId(2));
    assert_eq!(game.result(), GameResult::Won(Side::Allies));
    assert!(game.legal_moves().is_empty());
    assert_eq!(
        game.execute_move(&Move::EndBattles, &mut FixedDice::default()),
        Err(GameError::GameOver)
    );

    let report = game.last_battle().unwrap();
    assert_eq!(report.hits, 3);
    assert!(report.eliminated);
}

#[test]
fn test_unit_battles_once() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 5)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);
    play_with(
        &mut game,
        Move::Battle {
            attacker: UnitId(1),
            target: UnitId(2),
        },
        vec![DiceFace::Star],
    );
    assert_eq!(game.board().battles_this_turn(UnitId(1)), Ok(1));
    assert_eq!(game.legal_moves(), vec![Move::EndBattles]);
}

#[test]
fn test_ranged_battle_needs_line_of_sight() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 4)),
            (3, UnitKind::Infantry, Side::Allies, (4, 5)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);
    assert_eq!(game.legal_moves(), vec![Move::EndBattles]);
}

#[test]
fn test_flag_forces_retreat() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 5)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);
    play_with(
        &mut game,
        Move::Battle {
            attacker: UnitId(1),
            target: UnitId(2),
        },
        vec![DiceFace::Flag, DiceFace::Star, DiceFace::Star],
    );

    assert_eq!(game.current_phase(), Some(&Phase::Retreat { unit: UnitId(2), flags: 1 }));
    assert_eq!(game.active_player().side, Side::Axis);
    assert_eq!(game.turn_player().side, Side::Allies);
    assert_eq!(
        game.legal_moves(),
        vec![
            Move::Retreat { unit: UnitId(2), to: HexCoord::new(4, 4) },
            Move::Retreat { unit: UnitId(2), to: HexCoord::new(5, 4) },
        ]
    );

    play(&mut game, Move::Retreat { unit: UnitId(2), to: HexCoord::new(5, 4) });
    assert_eq!(game.board().coord_of(UnitId(2)), Ok(HexCoord::new(5, 4)));
    assert_eq!(game.current_phase(), Some(&Phase::Battle));
    assert_eq!(game.active_player().side, Side::Allies);
}

#[test]
fn test_blocked_retreat_costs_strength() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 1)),
            (2, UnitKind::Infantry, Side::Axis, (4, 0)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    play(&mut game, Move::EndMovements);
    play_with(
        &mut game,
        Move::Battle {
            attacker: UnitId(1),
            target: UnitId(2),
        },
        vec![DiceFace::Flag, DiceFace::Flag, DiceFace::Infantry],
    );
    assert_eq!(game.board().strength(UnitId(2)), Ok(3));
    assert_eq!(game.legal_moves(), vec![Move::HoldGround { unit: UnitId(2) }]);

    play(&mut game, Move::HoldGround { unit: UnitId(2) });
    assert_eq!(game.board().strength(UnitId(2)), Ok(1));
    assert_eq!(game.current_phase(), Some(&Phase::Battle));
}

// ============================================================================
// UNDO AND SIMULATION
// ============================================================================

#[test]
fn test_execute_then_undo_restores_state() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 5)),
        ],
        GameConfig::default(),
    );
    let mut before = Vec::new();
    let script = [
        Move::PlayCard { card: RECON_CENTER },
        Move::OrderUnit { unit: UnitId(1) },
        Move::ConfirmOrders,
        Move::EndMovements,
        Move::Battle {
            attacker: UnitId(1),
            target: UnitId(2),
        },
        Move::EndBattles,
    ];
    for mv in script {
        before.push(game.clone());
        play_with(&mut game, mv, vec![DiceFace::Infantry, DiceFace::Star, DiceFace::Armor]);
    }

    while let Some(expected) = before.pop() {
        game.undo_move().unwrap();
        assert_eq!(game, expected);
    }
    assert_eq!(game.undo_move(), Err(GameError::NothingToUndo));
}

#[test]
fn test_fork_is_isolated() {
    let mut game = game_with(
        &[
            (1, UnitKind::Infantry, Side::Allies, (4, 6)),
            (2, UnitKind::Infantry, Side::Axis, (4, 5)),
        ],
        GameConfig::default(),
    );
    order_unit_one(&mut game);
    let original = game.clone();

    let mut sim = game.fork();
    play(&mut sim, Move::EndMovements);
    play_with(
        &mut sim,
        Move::Battle {
            attacker: UnitId(1),
            target: UnitId(2),
        },
        vec![DiceFace::Grenade; 3],
    );
    play(&mut sim, Move::EndBattles);

    assert_eq!(game, original);
    assert_eq!(game.board().strength(UnitId(2)), Ok(4));
    assert_eq!(sim.board().strength(UnitId(2)), Ok(1));
    assert_eq!(game.current_phase(), Some(&Phase::Movement));
}

/// Random play from the default scenario keeps board and deck bookkeeping
/// consistent and can be unwound move by move
#[test]
fn test_random_play_invariants() {
    let scenario = Scenario::default();
    let initial = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(5)).unwrap();

    for seed in 0..4 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut dice = RandomDice::new(seed);
        let mut game = initial.clone();
        let mut played = 0;

        while played < 300 {
            let moves = game.legal_moves();
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            game.execute_move(mv, &mut dice).unwrap();
            played += 1;

            for unit in game.all_units() {
                assert_eq!(game.board().unit_at(unit.coord).map(|u| u.id), Some(unit.id()));
                assert!(unit.state.strength > 0);
            }
            let hands = game.cards_in_location(CardLocation::BottomPlayerHand).len()
                + game.cards_in_location(CardLocation::TopPlayerHand).len();
            // The active card stays in hand until the turn ends
            assert_eq!(hands, 10);
            let total = [
                CardLocation::Deck,
                CardLocation::BottomPlayerHand,
                CardLocation::TopPlayerHand,
                CardLocation::DiscardPile,
            ]
            .into_iter()
            .map(|l| game.cards_in_location(l).len())
            .sum::<usize>();
            assert_eq!(total, 40);
        }

        for _ in 0..played {
            game.undo_move().unwrap();
        }
        assert_eq!(game, initial);
    }
}
