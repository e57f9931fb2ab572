//! WASM bindings for in-browser tournaments and match playback

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::arena::{Roster, SimulationRequest, TournamentRequest};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// List the builtin strategies as `[{name, description}]`
#[wasm_bindgen]
pub fn list_strategies() -> Result<JsValue, JsError> {
    to_js(&Roster::builtin().describe())
}

/// Run a round-robin over the builtin strategies
///
/// # Arguments
/// * `request` - `{rounds?, selectedStrategies?}`
///
/// # Returns
/// `{ranking, results, stats, config}`
#[wasm_bindgen]
pub fn run_tournament(request: JsValue) -> Result<JsValue, JsError> {
    let request: TournamentRequest = serde_wasm_bindgen::from_value(request)
        .map_err(|e| JsError::new(&format!("Invalid tournament request: {}", e)))?;

    let report = Roster::builtin()
        .run_tournament(&request)
        .map_err(|e| JsError::new(&e.to_string()))?;

    to_js(&report)
}

/// Trace a single match round by round
///
/// # Arguments
/// * `request` - `{strategyA, strategyB, rounds?}`
#[wasm_bindgen]
pub fn simulate_match(request: JsValue) -> Result<JsValue, JsError> {
    let request: SimulationRequest = serde_wasm_bindgen::from_value(request)
        .map_err(|e| JsError::new(&format!("Invalid simulation request: {}", e)))?;

    let simulation = Roster::builtin()
        .simulate(&request)
        .map_err(|e| JsError::new(&e.to_string()))?;

    to_js(&simulation)
}

/// Same as [`run_tournament`] over a JSON string, for callers that
/// already hold the request body as text
#[wasm_bindgen]
pub fn run_tournament_json(request_json: &str) -> Result<String, JsError> {
    let request: TournamentRequest = serde_json::from_str(request_json)
        .map_err(|e| JsError::new(&format!("Invalid tournament request: {}", e)))?;

    let report = Roster::builtin()
        .run_tournament(&request)
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_json::to_string(&report).map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
