pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiDecision, MinimaxEngine};
pub use game::{
    Board, GameState, GameStatus, Mark, MoveAction, MoveError, MoveResolution, RuleEngine,
    BOARD_CELLS, WIN_PATTERNS,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: MoveError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mark(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown mark: {value}")))
}

fn make_resolution_json(resolution: MoveResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<MoveResolution>,
}

/// 前端持有的对局引擎：棋盘状态、规则校验与电脑落子都经由它。
#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    rules: RuleEngine,
    ai: MinimaxEngine,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameEngine, JsValue> {
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameState::new()
        };
        Ok(GameEngine {
            state,
            rules: RuleEngine::new(),
            ai: MinimaxEngine::default(),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_value(&self.state.status()).map_err(JsValue::from)
    }

    /// 执行一步人类落子，返回更新后的状态与对局结果。
    pub fn apply_move(&mut self, index: usize, mark: &str) -> Result<String, JsValue> {
        let mark = parse_mark(mark)?;
        self.rules
            .apply_move(&mut self.state, MoveAction { index, mark })
            .map_err(to_js_error)?;
        make_resolution_json(MoveResolution::new(self.state.clone()))
    }

    /// 让电脑走一步：搜索最佳格子并立即落子。
    /// 棋盘已满时只返回决策（index 为空），不做任何改动。
    pub fn ai_move(&mut self) -> Result<String, JsValue> {
        let decision = self.ai.decide(&self.state.board);
        let applied = if let Some(index) = decision.index {
            self.rules
                .apply_move(
                    &mut self.state,
                    MoveAction {
                        index,
                        mark: self.ai.mark(),
                    },
                )
                .map_err(to_js_error)?;
            Some(MoveResolution::new(self.state.clone()))
        } else {
            None
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// “AI 思考中”的延迟版本：在棋盘副本上搜索，等待 `delay_ms`
    /// 毫秒后以 JSON 决策兑现 Promise，不落子。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let board = self.state.board.clone();
        let ai = self.ai;
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = ai.decide(&board);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// 开始新对局：清空棋盘，玩家先手。
    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.state.reset();
        make_resolution_json(MoveResolution::new(self.state.clone()))
    }
}

/// 返回一个全新对局状态，方便前端初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move(state: JsValue, action: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let action: MoveAction = from_value(action).map_err(JsValue::from)?;
    let rules = RuleEngine::new();
    match rules.apply_move(&mut state, action) {
        Ok(_) => to_value(&MoveResolution::new(state)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "evaluate")]
pub fn evaluate(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.evaluate()).map_err(JsValue::from)
}

/// 为电脑（O）挑选最佳落点；棋盘已满时返回 null。
#[wasm_bindgen(js_name = "bestMove")]
pub fn best_move(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let decision = MinimaxEngine::default().decide(&board);
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "resetBoard")]
pub fn reset_board(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    state.reset();
    to_value(&MoveResolution::new(state)).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
