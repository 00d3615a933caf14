//! WebAssembly bindings for the rules engine.
//!
//! The presentation layer wires its drawn board through the `register*` and
//! `link*` calls, then drives play. In-play calls answer with a legality
//! object `{valid, value?, reason?, code?}` serialized as JSON; wiring and setup
//! mistakes are thrown as JS errors.

use crate::actions::GameAction;
use crate::board::{Board, Cell, HexId, HexSpec, RoadId, VertexId};
use crate::game::{GameConfig, GameState};
use crate::player::PlayerLedger;
use crate::rules::{Legality, Rejection};
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn check_json(result: Result<(), Rejection>) -> String {
    to_json(&Legality::check(result), r#"{"valid":false}"#)
}

fn value_json<T: Serialize>(result: Result<T, Rejection>) -> String {
    to_json(&Legality::from(result), r#"{"valid":false}"#)
}

fn parse_config(config_json: &str) -> Result<GameConfig, JsValue> {
    if config_json.trim().is_empty() {
        return Ok(GameConfig::default());
    }
    serde_json::from_str(config_json).map_err(|e| js_error(format!("Invalid config: {e}")))
}

fn cell(row: Option<u16>, col: Option<u16>) -> Option<Cell> {
    Some(Cell::new(row?, col?))
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// An empty board with the default four seats
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGame, JsValue> {
        let config = parse_config(config_json)?;
        Ok(WasmGame {
            state: GameState::with_config(Board::new(), PlayerLedger::standard(), config),
        })
    }

    /// A shuffled standard board with the default four seats
    #[wasm_bindgen(js_name = newStandard)]
    pub fn new_standard(config_json: &str) -> Result<WasmGame, JsValue> {
        let config = parse_config(config_json)?;
        let (state, _) = GameState::new_standard(config).map_err(js_error)?;
        Ok(WasmGame { state })
    }

    // ==================== Board Wiring ====================

    /// `hex_json` is a serialized `HexSpec`
    #[wasm_bindgen(js_name = registerHex)]
    pub fn register_hex(&mut self, id: u16, hex_json: &str) -> Result<(), JsValue> {
        let tile: HexSpec = serde_json::from_str(hex_json)
            .map_err(|e| js_error(format!("Invalid hex: {e}")))?;
        self.state
            .board_mut()
            .register_hex(HexId(id), tile)
            .map(|_| ())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = registerVertex)]
    pub fn register_vertex(
        &mut self,
        id: u16,
        row: Option<u16>,
        col: Option<u16>,
        adjacent_hexes: Vec<u16>,
    ) -> Result<(), JsValue> {
        let hexes: Vec<HexId> = adjacent_hexes.into_iter().map(HexId).collect();
        self.state
            .board_mut()
            .register_vertex(VertexId(id), cell(row, col), &hexes)
            .map(|_| ())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = registerRoad)]
    pub fn register_road(
        &mut self,
        id: u16,
        row: Option<u16>,
        col: Option<u16>,
        vertex_a: Option<u16>,
        vertex_b: Option<u16>,
    ) -> Result<(), JsValue> {
        let ends = vertex_a.zip(vertex_b).map(|(a, b)| (VertexId(a), VertexId(b)));
        self.state
            .board_mut()
            .register_road(RoadId(id), cell(row, col), ends)
            .map(|_| ())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = linkVertices)]
    pub fn link_vertices(&mut self, a: u16, b: u16) -> Result<(), JsValue> {
        self.state
            .board_mut()
            .link_vertices(VertexId(a), VertexId(b))
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = linkRoadToVertices)]
    pub fn link_road_to_vertices(&mut self, road: u16, a: u16, b: u16) -> Result<(), JsValue> {
        self.state
            .board_mut()
            .link_road_to_vertices(RoadId(road), VertexId(a), VertexId(b))
            .map_err(js_error)
    }

    /// Whatever is drawn at a grid cell, as JSON (or `null`)
    #[wasm_bindgen(js_name = entityAt)]
    pub fn entity_at(&self, row: u16, col: u16) -> String {
        to_json(&self.state.board().entity_at(Cell::new(row, col)), "null")
    }

    // ==================== Game Start ====================

    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self, starting_player: u8) -> Result<(), JsValue> {
        self.state.start_game(starting_player).map_err(js_error)
    }

    #[wasm_bindgen(js_name = beginSetup)]
    pub fn begin_setup(&mut self, first_player: u8) -> Result<(), JsValue> {
        self.state.begin_setup(first_player).map_err(js_error)
    }

    #[wasm_bindgen(js_name = placeInitialSettlement)]
    pub fn place_initial_settlement(&mut self, player: u8, vertex: u16) -> String {
        check_json(self.state.place_initial_settlement(player, VertexId(vertex)))
    }

    #[wasm_bindgen(js_name = placeInitialRoad)]
    pub fn place_initial_road(&mut self, player: u8, road: u16) -> String {
        check_json(self.state.place_initial_road(player, RoadId(road)))
    }

    // ==================== Turn Actions ====================

    /// `{valid, value}` where value is the dice total
    #[wasm_bindgen(js_name = rollDiceForCurrentPlayer)]
    pub fn roll_dice_for_current_player(&mut self) -> String {
        value_json(self.state.roll_dice_for_current_player().map(|roll| roll.total))
    }

    #[wasm_bindgen(js_name = applyMoveRobber)]
    pub fn apply_move_robber(&mut self, player: u8, hex: u16, victim: Option<u8>) -> String {
        check_json(
            self.state
                .apply_move_robber(player, HexId(hex), victim)
                .map(|_| ()),
        )
    }

    #[wasm_bindgen(js_name = canBuildRoad)]
    pub fn can_build_road(&self, player: u8, road: u16) -> String {
        check_json(self.state.can_build_road(player, RoadId(road)))
    }

    #[wasm_bindgen(js_name = applyBuildRoad)]
    pub fn apply_build_road(&mut self, player: u8, road: u16) -> String {
        check_json(self.state.apply_build_road(player, RoadId(road)))
    }

    #[wasm_bindgen(js_name = canBuildSettlement)]
    pub fn can_build_settlement(&self, player: u8, vertex: u16) -> String {
        check_json(self.state.can_build_settlement(player, VertexId(vertex)))
    }

    #[wasm_bindgen(js_name = applyBuildSettlement)]
    pub fn apply_build_settlement(&mut self, player: u8, vertex: u16) -> String {
        check_json(self.state.apply_build_settlement(player, VertexId(vertex)))
    }

    #[wasm_bindgen(js_name = canUpgradeCity)]
    pub fn can_upgrade_city(&self, player: u8, vertex: u16) -> String {
        check_json(self.state.can_upgrade_city(player, VertexId(vertex)))
    }

    #[wasm_bindgen(js_name = applyUpgradeCity)]
    pub fn apply_upgrade_city(&mut self, player: u8, vertex: u16) -> String {
        check_json(self.state.apply_upgrade_city(player, VertexId(vertex)))
    }

    #[wasm_bindgen(js_name = endTurn)]
    pub fn end_turn(&mut self) -> String {
        check_json(self.state.end_turn().map(|_| ()))
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| js_error(format!("Invalid action JSON: {e}")))?;
        let events = self.state.apply_action(player, action).map_err(js_error)?;
        Ok(to_json(&events, "[]"))
    }

    // ==================== Queries ====================

    /// Render snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        to_json(&self.state.view(), "{}")
    }

    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player()
    }

    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self, player: u8) -> String {
        to_json(&self.state.valid_actions(player), "[]")
    }

    #[wasm_bindgen(js_name = getVictoryPoints)]
    pub fn get_victory_points(&self, player: u8) -> Option<u32> {
        self.state.victory_points(player)
    }

    /// Events since the last call, for the game log
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        to_json(&self.state.drain_events(), "[]")
    }
}
