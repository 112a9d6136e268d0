use serde::{Deserialize, Serialize};

use super::state::{GameState, GameStatus, Mark, BOARD_CELLS};

/// 一次落子请求：目标格子与落子方。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveAction {
    pub index: usize,
    pub mark: Mark,
}

/// 非法落子的具体原因。规则校验失败时棋盘保持原样。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MoveError {
    GameFinished { status: GameStatus },
    OutOfRange { index: usize },
    CellOccupied { index: usize },
    NotYourTurn { mark: Mark },
}

/// 每次状态变更后返回给前端的结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub state: GameState,
    pub status: GameStatus,
}

impl MoveResolution {
    pub fn new(state: GameState) -> Self {
        let status = state.status();
        Self { state, status }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_in_progress(state: &GameState) -> Result<(), MoveError> {
        let status = state.status();
        if status.is_terminal() {
            return Err(MoveError::GameFinished { status });
        }
        Ok(())
    }

    fn ensure_cell_free(state: &GameState, index: usize) -> Result<(), MoveError> {
        if index >= BOARD_CELLS {
            return Err(MoveError::OutOfRange { index });
        }
        if !state.board.is_empty_cell(index) {
            return Err(MoveError::CellOccupied { index });
        }
        Ok(())
    }

    fn ensure_turn_owner(state: &GameState, mark: Mark) -> Result<(), MoveError> {
        if state.current_player != mark {
            return Err(MoveError::NotYourTurn { mark });
        }
        Ok(())
    }

    /// 校验并执行一步棋：落子、交换行动方，并返回最新对局状态。
    pub fn apply_move(
        &self,
        state: &mut GameState,
        action: MoveAction,
    ) -> Result<GameStatus, MoveError> {
        Self::ensure_in_progress(state)?;
        Self::ensure_cell_free(state, action.index)?;
        Self::ensure_turn_owner(state, action.mark)?;

        state.board.cells[action.index] = Some(action.mark);
        state.current_player = action.mark.other();
        Ok(state.status())
    }
}
