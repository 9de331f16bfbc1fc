use serde::{Deserialize, Serialize};

use super::board::{Board, Coord, GameStatus, Mark};

/// 在指定格子落子的请求。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceAction {
    pub player: Mark,
    pub coord: Coord,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    NotPlayerTurn { expected: Mark },
    OutOfBounds { row: usize, col: usize },
    CellOccupied { row: usize, col: usize },
    UnknownBotLevel { value: String },
    NoMovesAvailable,
    BotDisabled,
}

/// 对局事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlaced { player: Mark, coord: Coord },
    GameWon { winner: Mark },
    GameDrawn,
}

/// 一局游戏的会话状态，由表现层持有并在每次调用时传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Mark,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            current_player: Mark::X,
            turn: 1,
            event_log: Vec::new(),
        }
    }

    /// 对局结果由棋盘现算，不在状态里缓存。
    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_finished()
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn swap_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    pub fn reset(&mut self) {
        *self = GameState::new();
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub status: GameStatus,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let status = state.status();
        match status {
            GameStatus::Won { winner } => {
                let has_event = events
                    .iter()
                    .any(|event| matches!(event, GameEvent::GameWon { .. }));
                if !has_event {
                    events.push(GameEvent::GameWon { winner });
                }
            }
            GameStatus::Drawn => {
                if !events.contains(&GameEvent::GameDrawn) {
                    events.push(GameEvent::GameDrawn);
                }
            }
            GameStatus::InProgress => {}
        }

        Self {
            state,
            events,
            status,
        }
    }
}

#[derive(Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_in_progress(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_turn_owner(state: &GameState, player: Mark) -> Result<(), RuleError> {
        if state.current_player != player {
            return Err(RuleError::NotPlayerTurn {
                expected: state.current_player,
            });
        }
        Ok(())
    }

    fn ensure_cell_free(board: &Board, coord: Coord) -> Result<(), RuleError> {
        if !coord.in_bounds() {
            return Err(RuleError::OutOfBounds {
                row: coord.row,
                col: coord.col,
            });
        }
        if !board.is_empty(coord) {
            return Err(RuleError::CellOccupied {
                row: coord.row,
                col: coord.col,
            });
        }
        Ok(())
    }

    pub fn place_mark(
        &mut self,
        state: &mut GameState,
        action: PlaceAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_progress(state)?;
        Self::ensure_turn_owner(state, action.player)?;
        Self::ensure_cell_free(&state.board, action.coord)?;

        state.board.place(action.coord, action.player);

        let mut events = Vec::new();
        let placed = GameEvent::MovePlaced {
            player: action.player,
            coord: action.coord,
        };
        state.record_event(placed.clone());
        events.push(placed);

        match state.board.status() {
            GameStatus::Won { winner } => {
                let won = GameEvent::GameWon { winner };
                state.record_event(won.clone());
                events.push(won);
            }
            GameStatus::Drawn => {
                state.record_event(GameEvent::GameDrawn);
                events.push(GameEvent::GameDrawn);
            }
            GameStatus::InProgress => {
                state.turn += 1;
                state.swap_turn();
            }
        }

        Ok(events)
    }

    pub fn check_status(state: &GameState) -> GameStatus {
        state.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(state: &mut GameState, row: usize, col: usize) -> Vec<GameEvent> {
        let action = PlaceAction {
            player: state.current_player,
            coord: Coord::new(row, col),
        };
        RuleEngine::new()
            .place_mark(state, action)
            .expect("move should be accepted")
    }

    #[test]
    fn moves_alternate_between_players() {
        let mut state = GameState::new();
        assert_eq!(state.current_player, Mark::X);

        place(&mut state, 1, 1);
        assert_eq!(state.current_player, Mark::O);
        assert_eq!(state.turn, 2);

        place(&mut state, 0, 0);
        assert_eq!(state.current_player, Mark::X);
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut state = GameState::new();
        place(&mut state, 1, 1);

        let action = PlaceAction {
            player: state.current_player,
            coord: Coord::new(1, 1),
        };
        let err = RuleEngine::new()
            .place_mark(&mut state, action)
            .expect_err("occupied cell must be rejected");
        assert_eq!(err, RuleError::CellOccupied { row: 1, col: 1 });
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut state = GameState::new();
        let action = PlaceAction {
            player: Mark::X,
            coord: Coord::new(3, 0),
        };
        let err = RuleEngine::new()
            .place_mark(&mut state, action)
            .expect_err("out-of-bounds coordinate must be rejected");
        assert_eq!(err, RuleError::OutOfBounds { row: 3, col: 0 });
    }

    #[test]
    fn moving_out_of_turn_is_rejected() {
        let mut state = GameState::new();
        let action = PlaceAction {
            player: Mark::O,
            coord: Coord::new(0, 0),
        };
        let err = RuleEngine::new()
            .place_mark(&mut state, action)
            .expect_err("O cannot move first");
        assert_eq!(err, RuleError::NotPlayerTurn { expected: Mark::X });
    }

    #[test]
    fn winning_move_emits_game_won_and_freezes_the_game() {
        let mut state = GameState::new();
        place(&mut state, 0, 0); // X
        place(&mut state, 1, 0); // O
        place(&mut state, 0, 1); // X
        place(&mut state, 1, 1); // O
        let events = place(&mut state, 0, 2); // X completes the top row

        assert!(
            events.contains(&GameEvent::GameWon { winner: Mark::X }),
            "winning move should emit GameWon"
        );
        assert_eq!(state.status(), GameStatus::Won { winner: Mark::X });
        assert_eq!(
            state.current_player,
            Mark::X,
            "turn must not advance past the end of the game"
        );

        let action = PlaceAction {
            player: Mark::X,
            coord: Coord::new(2, 2),
        };
        let err = RuleEngine::new()
            .place_mark(&mut state, action)
            .expect_err("no moves are legal after the game is decided");
        assert_eq!(err, RuleError::GameFinished);
    }

    #[test]
    fn filling_the_board_without_a_line_emits_game_drawn() {
        let mut state = GameState::new();
        // X O X / X O O / O X X, played in legal alternation.
        for (row, col) in [
            (0, 0), // X
            (0, 1), // O
            (0, 2), // X
            (1, 1), // O
            (1, 0), // X
            (1, 2), // O
            (2, 1), // X
            (2, 0), // O
        ] {
            place(&mut state, row, col);
        }
        let events = place(&mut state, 2, 2); // X fills the last cell

        assert!(
            events.contains(&GameEvent::GameDrawn),
            "final move should emit GameDrawn"
        );
        assert_eq!(state.status(), GameStatus::Drawn);
    }

    #[test]
    fn resolution_carries_the_derived_status() {
        let state = GameState::new();
        let resolution = RuleResolution::new(state, Vec::new());
        assert_eq!(resolution.status, GameStatus::InProgress);
        assert!(resolution.events.is_empty());
    }
}
