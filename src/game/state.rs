use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 棋盘格子数（3x3）。
pub const BOARD_CELLS: usize = 9;

/// 所有获胜连线：3 行、3 列、2 条对角线。
pub const WIN_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 棋子标记：X 为人类玩家，O 为电脑。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 对局状态：进行中、玩家获胜、电脑获胜或平局。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    InProgress,
    PlayerWins,
    OpponentWins,
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// 获胜一方的标记；进行中或平局时为 None。
    pub fn winner(self) -> Option<Mark> {
        match self {
            GameStatus::PlayerWins => Some(Mark::X),
            GameStatus::OpponentWins => Some(Mark::O),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }
}

/// 3x3 棋盘，按行优先排列的 9 个格子。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub cells: [Option<Mark>; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [None; BOARD_CELLS],
        }
    }
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// 按下标升序返回所有空格。
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BOARD_CELLS).filter(|&index| self.cells[index].is_none())
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(mark)).count()
    }

    /// 判断 `mark` 是否占满某条获胜连线。
    pub fn has_winning_line(&self, mark: Mark) -> bool {
        WIN_PATTERNS.iter().any(|pattern| {
            pattern
                .iter()
                .all(|&index| self.cells[index] == Some(mark))
        })
    }

    /// 每次落子后重新推导对局状态，不做缓存；
    /// 搜索中的假想棋盘也走同一条路径。
    pub fn evaluate(&self) -> GameStatus {
        if self.has_winning_line(Mark::X) {
            return GameStatus::PlayerWins;
        }
        if self.has_winning_line(Mark::O) {
            return GameStatus::OpponentWins;
        }
        if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }
}

/// 单局对战的整体状态：棋盘加上当前行动方。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Mark,
}

impl GameState {
    /// 新对局：空棋盘，玩家（X）先手。
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            current_player: Mark::X,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.board.evaluate()
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// 清空棋盘并把先手交还给玩家。
    pub fn reset(&mut self) {
        self.board = Board::empty();
        self.current_player = Mark::X;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
