//! 浏览器环境下的端到端冒烟测试（wasm-pack test）。

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use serde_wasm_bindgen::{from_value, to_value};
use wasm_tictactoe::{
    compute_bot_move, create_board, valid_moves, Board, BotDecision, Coord, GameSession, Mark,
};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn bot_move_on_an_empty_board_is_legal() {
    let board = create_board().expect("board should serialize");
    let player = to_value(&Mark::X).expect("mark should serialize");

    let decision = compute_bot_move(board, player, "undefeated", Some(1))
        .expect("undefeated level should produce a move");
    let decision: BotDecision = from_value(decision).expect("decision should deserialize");

    let legal: Vec<Coord> = {
        let board = to_value(&Board::empty()).expect("board should serialize");
        let moves = valid_moves(board).expect("moves should serialize");
        from_value(moves).expect("moves should deserialize")
    };
    assert!(legal.contains(&decision.coord));
}

#[wasm_bindgen_test]
fn unknown_level_is_rejected_at_the_boundary() {
    let board = create_board().expect("board should serialize");
    let player = to_value(&Mark::X).expect("mark should serialize");

    let result = compute_bot_move(board, player, "medium", None);
    assert!(result.is_err(), "unknown level must not fall back");
}

#[wasm_bindgen_test]
fn session_plays_a_full_bot_game() {
    let mut session =
        GameSession::new(Some("undefeated".to_string()), Some(7)).expect("valid level");

    for _ in 0..9 {
        let status: serde_json::Value =
            serde_json::from_str(&session.status_json().expect("status should serialize"))
                .expect("status json");
        if status["type"] != "InProgress" {
            break;
        }
        session.play_bot_move().expect("bot should find a move");
    }

    let status: serde_json::Value =
        serde_json::from_str(&session.status_json().expect("status should serialize"))
            .expect("status json");
    assert_eq!(
        status["type"], "Drawn",
        "optimal self-play must end in a draw"
    );
}
