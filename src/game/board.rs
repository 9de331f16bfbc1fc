use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MAX_ROW: usize = 3;
pub const MAX_COLUMN: usize = 3;

/// 落子方标记，X 先手。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// X 获胜记 +1，O 获胜记 -1。
    pub fn win_score(self) -> i32 {
        match self {
            Mark::X => 1,
            Mark::O => -1,
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Mark::X),
            "o" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 单个格子的状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// 棋盘坐标，行列都在 0..3 之内。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < MAX_ROW && self.col < MAX_COLUMN
    }
}

/// 胜负判定用的八条连线：三行、三列、两条对角线。
static WIN_LINES: Lazy<[[Coord; 3]; 8]> = Lazy::new(|| {
    let mut lines = [[Coord::new(0, 0); 3]; 8];
    for i in 0..MAX_ROW {
        for j in 0..MAX_COLUMN {
            lines[i][j] = Coord::new(i, j);
            lines[MAX_ROW + i][j] = Coord::new(j, i);
        }
    }
    for j in 0..MAX_COLUMN {
        lines[6][j] = Coord::new(j, j);
        lines[7][j] = Coord::new(j, MAX_COLUMN - 1 - j);
    }
    lines
});

/// 3×3 棋盘，按行优先存储。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub cells: [[Cell; MAX_COLUMN]; MAX_ROW],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [[Cell::Empty; MAX_COLUMN]; MAX_ROW],
        }
    }
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.row][coord.col]
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_empty()
    }

    pub fn place(&mut self, coord: Coord, mark: Mark) {
        self.cells[coord.row][coord.col] = mark.into();
    }

    pub fn clear(&mut self, coord: Coord) {
        self.cells[coord.row][coord.col] = Cell::Empty;
    }

    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    /// 检查八条连线，返回率先连成三子的一方。
    pub fn winner(&self) -> Option<Mark> {
        for line in WIN_LINES.iter() {
            let first = self.get(line[0]);
            if !first.is_empty() && first == self.get(line[1]) && first == self.get(line[2]) {
                return first.mark();
            }
        }
        None
    }

    /// 静态评估分：X 胜 +1，O 胜 -1，未分胜负为 0。
    pub fn evaluate(&self) -> i32 {
        self.winner().map(Mark::win_score).unwrap_or(0)
    }

    /// 按行优先顺序列出所有空格；已分出胜负时即使还有空格也返回空列表。
    pub fn legal_moves(&self) -> Vec<Coord> {
        if self.winner().is_some() {
            return Vec::new();
        }

        let mut moves = Vec::new();
        for row in 0..MAX_ROW {
            for col in 0..MAX_COLUMN {
                let coord = Coord::new(row, col);
                if self.is_empty(coord) {
                    moves.push(coord);
                }
            }
        }
        moves
    }

    pub fn status(&self) -> GameStatus {
        if let Some(winner) = self.winner() {
            return GameStatus::Won { winner };
        }
        if self.is_full() {
            GameStatus::Drawn
        } else {
            GameStatus::InProgress
        }
    }
}

/// 对局结果，始终由棋盘现算，不做缓存。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameStatus {
    InProgress,
    Drawn,
    Won { winner: Mark },
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}
