//! 游戏核心逻辑模块（棋盘模型与规则引擎）。

pub mod board;
pub mod rules;

pub use board::{Board, Cell, Coord, GameStatus, Mark, MAX_COLUMN, MAX_ROW};
pub use rules::{GameEvent, GameState, PlaceAction, RuleEngine, RuleError, RuleResolution};
