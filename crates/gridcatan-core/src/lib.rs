//! GridCatan - a rules engine for Catan-style hex-grid games
//!
//! This crate provides the core game logic, including:
//! - Board topology built from caller-registered hexes, vertices and roads
//! - Player ledger with resources, holdings and victory points
//! - Placement rules for roads, settlements and cities
//! - Dice production, forced discards and the robber
//! - Longest Road calculation
//! - Turn state machine with opening placements
//!
//! # Architecture
//!
//! The engine owns no drawing and no canonical map. A presentation layer
//! registers its board geometry, then drives play through [`GameState`] (or
//! [`wasm::WasmGame`] from JavaScript). [`layout`] is a ready-made caller
//! that wires the standard 19-hex map.
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates used to derive wiring
//! - [`board`]: Hexes, vertices, roads and the grid cell index
//! - [`layout`]: Standard map wiring and tile shuffling
//! - [`player`]: Player state and resources
//! - [`rules`]: Build legality and rejection reasons
//! - [`production`]: Dice, production and the robber
//! - [`longest_road`]: Longest Road award
//! - [`game`]: Game state machine

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod layout;
pub mod longest_road;
pub mod player;
pub mod production;
pub mod rules;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{
    Board, Cell, EntityRef, Hex, HexId, HexSpec, PlayerId, Resource, Road, RoadId, TileKind,
    TopologyError, Vertex, VertexBuilding, VertexId, BOARD_COLS, BOARD_ROWS,
};
pub use game::{GameConfig, GameState, GameView, Phase, SetupError, TurnState};
pub use hex::{EdgeCoord, EdgeDirection, HexCoord, VertexCoord, VertexDirection};
pub use layout::{StandardLayout, Tile};
pub use player::{costs, Player, PlayerColor, PlayerKind, PlayerLedger, ResourceHand, TurnFlags};
pub use production::{DiceRoll, RobberMove, Theft};
pub use rules::{Legality, Rejection};
