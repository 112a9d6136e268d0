//! AI 算法模块（极小极大搜索）。

pub mod minimax;

pub use minimax::{AiDecision, MinimaxEngine};
