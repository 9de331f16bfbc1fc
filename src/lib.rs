pub mod ai;
pub mod game;

use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{BotAgent, BotDecision, BotLevel, DepthBudget, SearchStats, HARD_SEARCH_DEPTH};
pub use game::{
    Board, Cell, Coord, GameEvent, GameState, GameStatus, Mark, PlaceAction, RuleEngine,
    RuleError, RuleResolution, MAX_COLUMN, MAX_ROW,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_level(value: &str) -> Result<BotLevel, JsValue> {
    BotLevel::from_str(value).map_err(|_| {
        to_js_error(RuleError::UnknownBotLevel {
            value: value.to_string(),
        })
    })
}

/// "off"/"0" 表示关闭机器人（双人对战），其余字符串必须是合法档位。
fn parse_session_level(value: &str) -> Result<Option<BotLevel>, JsValue> {
    if matches!(value.to_ascii_lowercase().as_str(), "off" | "0") {
        return Ok(None);
    }
    parse_level(value).map(Some)
}

fn make_agent(seed: Option<u64>) -> BotAgent {
    match seed {
        Some(seed) => BotAgent::with_seed(seed),
        None => BotAgent::new(),
    }
}

/// 返回一个空棋盘，方便前端初始化。
#[wasm_bindgen(js_name = "createBoard")]
pub fn create_board() -> Result<JsValue, JsValue> {
    to_value(&Board::empty()).map_err(JsValue::from)
}

/// 返回一局新游戏的会话状态。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

/// 现算棋盘当前的对局结果。
#[wasm_bindgen(js_name = "boardStatus")]
pub fn board_status(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.status()).map_err(JsValue::from)
}

/// 棋盘的静态评估分：X 胜 +1，O 胜 -1，否则 0。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<i32, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    Ok(board.evaluate())
}

/// 列出所有合法落子；对局已分出胜负时返回空列表。
#[wasm_bindgen(js_name = "validMoves")]
pub fn valid_moves(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.legal_moves()).map_err(JsValue::from)
}

/// 按规则落子，返回更新后的状态与触发事件。
#[wasm_bindgen(js_name = "placeMark")]
pub fn place_mark(state: JsValue, action: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let action: PlaceAction = from_value(action).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.place_mark(&mut state, action) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

/// 为指定玩家计算机器人落子。`level` 不合法时立即报错，绝不回退到默认档位。
#[wasm_bindgen(js_name = "computeBotMove")]
pub fn compute_bot_move(
    board: JsValue,
    player: JsValue,
    level: &str,
    seed: Option<u64>,
) -> Result<JsValue, JsValue> {
    let mut board: Board = from_value(board).map_err(JsValue::from)?;
    let player: Mark = from_value(player).map_err(JsValue::from)?;
    let level = parse_level(level)?;

    let mut agent = make_agent(seed);
    let decision = agent
        .select_move(&mut board, player, level)
        .map_err(to_js_error)?;
    web_sys::console::log_1(&format!("Best eval: {}", decision.score).into());
    to_value(&decision).map_err(JsValue::from)
}

/// 异步版本：先等待 `delay_ms` 再搜索，供前端展示“思考中”状态。
#[wasm_bindgen(js_name = "thinkBotMove")]
pub fn think_bot_move(
    board: JsValue,
    player: JsValue,
    level: &str,
    delay_ms: Option<u32>,
) -> Promise {
    let board: Result<Board, _> = from_value(board);
    let player: Result<Mark, _> = from_value(player);
    let level = level.to_string();
    let delay = delay_ms.unwrap_or(0);

    future_to_promise(async move {
        let mut board = board.map_err(JsValue::from)?;
        let player = player.map_err(JsValue::from)?;
        let level = parse_level(&level)?;

        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }

        let mut agent = BotAgent::new();
        let decision = agent
            .select_move(&mut board, player, level)
            .map_err(to_js_error)?;
        let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
        Ok(JsValue::from_str(&json))
    })
}

#[derive(Serialize)]
struct BotMoveResponse {
    decision: BotDecision,
    applied: RuleResolution,
}

/// 由表现层持有的一局会话：棋盘、执子方与机器人档位。
#[wasm_bindgen]
pub struct GameSession {
    state: GameState,
    bot_level: Option<BotLevel>,
    agent: BotAgent,
}

#[wasm_bindgen]
impl GameSession {
    /// `level` 省略或传 "off" 时机器人关闭，两名人类玩家轮流落子。
    #[wasm_bindgen(constructor)]
    pub fn new(level: Option<String>, seed: Option<u64>) -> Result<GameSession, JsValue> {
        let bot_level = match level.as_deref() {
            Some(value) => parse_session_level(value)?,
            None => None,
        };
        Ok(GameSession {
            state: GameState::new(),
            bot_level,
            agent: make_agent(seed),
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

    pub fn status_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.status()).map_err(serde_to_js_error)
    }

    pub fn current_player(&self) -> String {
        match self.state.current_player {
            Mark::X => "X".to_string(),
            Mark::O => "O".to_string(),
        }
    }

    /// 当前执子方在 (row, col) 落子。
    pub fn play_move(&mut self, row: usize, col: usize) -> Result<String, JsValue> {
        let action = PlaceAction {
            player: self.state.current_player,
            coord: Coord::new(row, col),
        };
        let mut engine = RuleEngine::new();
        let events = engine
            .place_mark(&mut self.state, action)
            .map_err(to_js_error)?;
        serde_json::to_string(&RuleResolution::new(self.state.clone(), events))
            .map_err(serde_to_js_error)
    }

    /// 让机器人替当前执子方落子并应用结果。
    pub fn play_bot_move(&mut self) -> Result<String, JsValue> {
        let level = self
            .bot_level
            .ok_or_else(|| to_js_error(RuleError::BotDisabled))?;
        let player = self.state.current_player;

        let decision = self
            .agent
            .select_move(&mut self.state.board, player, level)
            .map_err(to_js_error)?;
        web_sys::console::log_1(&format!("Best eval: {}", decision.score).into());

        let action = PlaceAction {
            player,
            coord: decision.coord,
        };
        let mut engine = RuleEngine::new();
        let events = engine
            .place_mark(&mut self.state, action)
            .map_err(to_js_error)?;

        let response = BotMoveResponse {
            decision,
            applied: RuleResolution::new(self.state.clone(), events),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 重开一局；档位调整只在重开时生效。
    pub fn reset(&mut self, level: Option<String>) -> Result<(), JsValue> {
        if let Some(value) = level.as_deref() {
            self.bot_level = parse_session_level(value)?;
        }
        self.state.reset();
        Ok(())
    }
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
