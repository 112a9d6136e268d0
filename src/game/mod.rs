//! 游戏核心逻辑模块（棋盘状态、落子规则）。

pub mod rules;
pub mod state;

pub use rules::{MoveAction, MoveError, MoveResolution, RuleEngine};
pub use state::{Board, GameState, GameStatus, Mark, BOARD_CELLS, WIN_PATTERNS};
