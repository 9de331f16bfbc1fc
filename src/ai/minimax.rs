use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Coord, Mark, RuleError};

/// Hard 档位的固定搜索深度。
pub const HARD_SEARCH_DEPTH: u8 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotLevel {
    Easy,
    Hard,
    Undefeated,
}

impl FromStr for BotLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(BotLevel::Easy),
            "hard" | "2" => Ok(BotLevel::Hard),
            "undefeated" | "3" => Ok(BotLevel::Undefeated),
            _ => Err(()),
        }
    }
}

/// 搜索深度预算：有限层数或搜到终局为止。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBudget {
    Limited(u8),
    Unbounded,
}

impl DepthBudget {
    pub fn is_exhausted(self) -> bool {
        matches!(self, DepthBudget::Limited(0))
    }

    pub fn shallower(self) -> DepthBudget {
        match self {
            DepthBudget::Limited(depth) => DepthBudget::Limited(depth.saturating_sub(1)),
            DepthBudget::Unbounded => DepthBudget::Unbounded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth_reached: u8,
}

/// 机器人给出的落子决策。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotDecision {
    pub coord: Coord,
    pub score: i32,
    pub level: BotLevel,
    pub nodes: u64,
    pub depth_reached: u8,
}

pub struct BotAgent {
    rng: SmallRng,
}

impl BotAgent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 为 `player` 挑选一步棋。棋盘在调用返回时恢复原样。
    pub fn select_move(
        &mut self,
        board: &mut Board,
        player: Mark,
        level: BotLevel,
    ) -> Result<BotDecision, RuleError> {
        let moves = board.legal_moves();
        if moves.is_empty() {
            return Err(RuleError::NoMovesAvailable);
        }

        match level {
            BotLevel::Easy => Ok(self.random_move(board, player, moves)),
            BotLevel::Hard => {
                Ok(self.searched_move(board, player, moves, DepthBudget::Limited(HARD_SEARCH_DEPTH), level))
            }
            BotLevel::Undefeated => {
                Ok(self.searched_move(board, player, moves, DepthBudget::Unbounded, level))
            }
        }
    }

    fn random_move(&mut self, board: &mut Board, player: Mark, mut moves: Vec<Coord>) -> BotDecision {
        moves.shuffle(&mut self.rng);
        let coord = moves.swap_remove(0);

        board.place(coord, player);
        let score = board.evaluate();
        board.clear(coord);

        BotDecision {
            coord,
            score,
            level: BotLevel::Easy,
            nodes: 1,
            depth_reached: 1,
        }
    }

    fn searched_move(
        &mut self,
        board: &mut Board,
        player: Mark,
        moves: Vec<Coord>,
        budget: DepthBudget,
        level: BotLevel,
    ) -> BotDecision {
        let mut stats = SearchStats::default();
        let mut best_score = match player {
            Mark::X => i32::MIN,
            Mark::O => i32::MAX,
        };
        let mut ties: Vec<Coord> = Vec::new();

        // 每个根节点分支都用完整窗口搜索，保证并列最优的集合不被剪枝截断。
        for coord in moves {
            board.place(coord, player);
            let score = minimax(
                board,
                budget,
                player.opponent(),
                i32::MIN,
                i32::MAX,
                1,
                &mut stats,
            );
            board.clear(coord);

            let improved = match player {
                Mark::X => score > best_score,
                Mark::O => score < best_score,
            };
            if improved {
                ties.clear();
                ties.push(coord);
                best_score = score;
            } else if score == best_score {
                ties.push(coord);
            }
        }

        ties.shuffle(&mut self.rng);
        let coord = ties.swap_remove(0);

        BotDecision {
            coord,
            score: best_score,
            level,
            nodes: stats.nodes,
            depth_reached: stats.depth_reached,
        }
    }
}

impl Default for BotAgent {
    fn default() -> Self {
        BotAgent::new()
    }
}

fn minimax(
    board: &mut Board,
    budget: DepthBudget,
    to_move: Mark,
    mut alpha: i32,
    mut beta: i32,
    ply: u8,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;
    if ply > stats.depth_reached {
        stats.depth_reached = ply;
    }

    let moves = board.legal_moves();
    if moves.is_empty() || budget.is_exhausted() {
        return board.evaluate();
    }

    if to_move == Mark::X {
        let mut value = i32::MIN;
        for coord in moves {
            board.place(coord, Mark::X);
            let score = minimax(board, budget.shallower(), Mark::O, alpha, beta, ply + 1, stats);
            board.clear(coord);

            value = value.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        value
    } else {
        let mut value = i32::MAX;
        for coord in moves {
            board.place(coord, Mark::O);
            let score = minimax(board, budget.shallower(), Mark::X, alpha, beta, ply + 1, stats);
            board.clear(coord);

            value = value.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        value
    }
}
