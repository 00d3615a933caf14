//! Player moves and the events they produce.
//!
//! Both enums are internally tagged on `type`, so a front end can send and
//! receive them as plain JSON objects.

use crate::board::{HexId, PlayerId, Resource, RoadId, VertexId};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};

/// A move submitted through [`crate::game::GameState::apply_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    // ==================== Setup Phase ====================
    /// Place an opening settlement (free, no road needed)
    PlaceInitialSettlement { vertex: VertexId },
    /// Place an opening road touching the settlement just placed
    PlaceInitialRoad { road: RoadId },

    // ==================== Turn Actions ====================
    /// Roll for the turn; nothing else is legal before it
    RollDice,
    /// Move the robber after a 7, optionally naming who to rob
    MoveRobber {
        hex: HexId,
        victim: Option<PlayerId>,
    },

    // ==================== Building Actions ====================
    BuildRoad { road: RoadId },
    BuildSettlement { vertex: VertexId },
    UpgradeCity { vertex: VertexId },

    // ==================== Turn Management ====================
    /// End your turn
    EndTurn,
}

/// Something that changed, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Opening placements began
    SetupStarted { order: Vec<PlayerId> },

    /// Regular turns began
    GameStarted { first_player: PlayerId },

    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        dice: [u8; 2],
        total: u8,
    },

    /// Production paid out, one entry per player and resource
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    /// Player lost half their hand to a 7
    CardsDiscarded {
        player: PlayerId,
        cards: ResourceHand,
    },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, vertex: VertexId },

    /// A settlement was upgraded to a city
    CityBuilt { player: PlayerId, vertex: VertexId },

    /// A road was built
    RoadBuilt { player: PlayerId, road: RoadId },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: Option<HexId>,
        to: HexId,
    },

    /// A resource was stolen
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },
}
