use serde::{Deserialize, Serialize};

use crate::game::state::{Board, GameStatus, Mark};

/// 一次决策的结果：选中的格子、该格子的极小极大得分与访问的节点数。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub score: i32,
    pub nodes: u64,
}

struct SearchStats {
    nodes: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self { nodes: 0 }
    }
}

/// 穷举式极小极大引擎。`mark` 是极大化的一方（电脑），
/// 对手被假定为完全理性的极小化方。
#[derive(Debug, Clone, Copy)]
pub struct MinimaxEngine {
    mark: Mark,
}

impl Default for MinimaxEngine {
    fn default() -> Self {
        Self::new(Mark::O)
    }
}

impl MinimaxEngine {
    pub fn new(mark: Mark) -> Self {
        Self { mark }
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// 在所有空格中挑出得分最高的一格；棋盘已满时返回 None
    /// （调用方应先确认对局仍在进行中）。
    ///
    /// 平分时取下标最小的格子：按升序扫描并用严格大于比较，
    /// 后出现的同分格子不会覆盖先出现的。
    pub fn best_move(&self, board: &Board) -> Option<usize> {
        self.decide(board).index
    }

    /// 与 [`best_move`](Self::best_move) 相同的搜索，另外带回得分与节点数。
    pub fn decide(&self, board: &Board) -> AiDecision {
        let mut stats = SearchStats::new();
        // 在自己的副本上试探与回溯，调用方的棋盘原样不动。
        let mut scratch = board.clone();

        let mut best_index = None;
        let mut best_score = i32::MIN;
        for index in 0..scratch.cells.len() {
            if scratch.cells[index].is_some() {
                continue;
            }
            scratch.cells[index] = Some(self.mark);
            let score = self.minimax(&mut scratch, 1, false, &mut stats);
            scratch.cells[index] = None;
            if score > best_score {
                best_score = score;
                best_index = Some(index);
            }
        }

        AiDecision {
            index: best_index,
            score: if best_index.is_some() { best_score } else { 0 },
            nodes: stats.nodes,
        }
    }

    /// 终局得分带深度偏置：越早赢分越高，越晚输分越高，
    /// 胜负平的分类本身不受影响。
    fn terminal_score(&self, status: GameStatus, depth: i32) -> Option<i32> {
        match status.winner() {
            Some(winner) if winner == self.mark => Some(10 - depth),
            Some(_) => Some(depth - 10),
            None if status == GameStatus::Draw => Some(0),
            None => None,
        }
    }

    fn minimax(
        &self,
        board: &mut Board,
        depth: i32,
        maximizing: bool,
        stats: &mut SearchStats,
    ) -> i32 {
        stats.nodes += 1;
        if let Some(score) = self.terminal_score(board.evaluate(), depth) {
            return score;
        }

        let mark = if maximizing { self.mark } else { self.mark.other() };
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for index in 0..board.cells.len() {
            if board.cells[index].is_some() {
                continue;
            }
            board.cells[index] = Some(mark);
            let score = self.minimax(board, depth + 1, !maximizing, stats);
            board.cells[index] = None;
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::{MoveAction, RuleEngine};
    use crate::game::state::GameState;

    fn board_from(chars: [char; 9]) -> Board {
        let mut board = Board::empty();
        for (index, ch) in chars.iter().enumerate() {
            board.cells[index] = match ch {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        board
    }

    #[test]
    fn full_board_yields_no_move() {
        let board = board_from(['X', 'O', 'X', 'X', 'O', 'O', 'O', 'X', 'X']);
        assert_eq!(MinimaxEngine::default().best_move(&board), None);
    }

    #[test]
    fn the_input_board_is_left_untouched() {
        let board = board_from(['X', 'O', ' ', ' ', 'X', ' ', ' ', ' ', ' ']);
        let before = board.clone();
        MinimaxEngine::default().best_move(&board);
        assert_eq!(board, before);
    }

    #[test]
    fn immediate_win_is_taken() {
        // O 补全顶行，得分 10 - 1 为全场最高。
        let board = board_from(['O', 'O', ' ', 'X', 'X', ' ', ' ', ' ', ' ']);
        assert_eq!(MinimaxEngine::default().best_move(&board), Some(2));
    }

    #[test]
    fn threat_is_blocked() {
        // 除 2 之外的任何一步都放任 X 下回合连成顶行。
        let board = board_from(['X', 'X', ' ', 'O', ' ', ' ', ' ', ' ', ' ']);
        assert_eq!(MinimaxEngine::default().best_move(&board), Some(2));
    }

    #[test]
    fn winning_now_beats_winning_later() {
        // 两条路都能赢，但 8 立即获胜，深度偏置使其得分更高。
        let board = board_from(['O', 'X', 'X', ' ', 'O', 'X', ' ', ' ', ' ']);
        let decision = MinimaxEngine::default().decide(&board);
        assert_eq!(decision.index, Some(8));
        assert_eq!(decision.score, 9);
    }

    #[test]
    fn ties_break_toward_the_lowest_index() {
        // X 双线威胁（0-4-8 与 2-4-6），6、7、8 同样都在两步后落败，
        // 三格得分相同，必须返回先扫到的最小下标 6。
        let board = board_from(['X', 'O', 'X', 'O', 'X', 'O', ' ', ' ', ' ']);
        assert_eq!(board.evaluate(), GameStatus::InProgress);
        let decision = MinimaxEngine::default().decide(&board);
        assert_eq!(decision.index, Some(6));
        assert_eq!(decision.score, 2 - 10);
    }

    #[test]
    fn self_play_from_the_empty_board_is_a_draw() {
        let engine = RuleEngine::new();
        let mut state = GameState::new();
        while !state.is_finished() {
            let mark = state.current_player;
            let index = MinimaxEngine::new(mark)
                .best_move(&state.board)
                .expect("in-progress board has an empty cell");
            engine.apply_move(&mut state, MoveAction { index, mark }).unwrap();
        }
        assert_eq!(state.status(), GameStatus::Draw);
        assert!(state.board.is_full());
    }

    // 让对手在每个节点穷举全部应手，引擎照常应对；
    // 任何一条路径都不允许以对手获胜收场。
    fn assert_never_loses(state: &GameState, engine_mark: Mark) {
        let rules = RuleEngine::new();
        let opponent = engine_mark.other();
        for index in state.board.empty_cells().collect::<Vec<_>>() {
            let mut line = state.clone();
            rules
                .apply_move(&mut line, MoveAction { index, mark: opponent })
                .unwrap();
            let status = line.status();
            if status.is_terminal() {
                assert_ne!(status.winner(), Some(opponent), "lost after opponent {index}");
                continue;
            }

            let reply = MinimaxEngine::new(engine_mark)
                .best_move(&line.board)
                .expect("in-progress board has an empty cell");
            rules
                .apply_move(&mut line, MoveAction { index: reply, mark: engine_mark })
                .unwrap();
            let status = line.status();
            if status.is_terminal() {
                assert_ne!(status.winner(), Some(opponent));
            } else {
                assert_never_loses(&line, engine_mark);
            }
        }
    }

    #[test]
    fn the_engine_is_unbeatable_as_second_player() {
        assert_never_loses(&GameState::new(), Mark::O);
    }
}
