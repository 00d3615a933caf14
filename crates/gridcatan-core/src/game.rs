//! Core game state machine.
//!
//! `GameState` is the single aggregate a session owns: the board, the
//! player ledger, the turn state and the random source. Every operation
//! validates fully before it mutates, so a rejected call leaves the game
//! exactly as it found it.

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, HexId, PlayerId, RoadId, TopologyError, VertexBuilding, VertexId};
use crate::layout::{self, StandardLayout};
use crate::longest_road::{self, MINIMUM_LENGTH};
use crate::player::{Player, PlayerLedger};
use crate::production::{self, DiceRoll, RobberMove};
use crate::rules::{self, Rejection};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info};

/// Hand size above which a 7 forces a discard
pub const DEFAULT_DISCARD_LIMIT: u32 = 7;

/// Where the current player is within their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening placements, or the game hasn't started yet
    #[default]
    Setup,
    /// Waiting for the dice
    Roll,
    /// A 7 was rolled; the robber must move
    Robber,
    /// Building is allowed; the turn may end
    Action,
    /// Transient hand-off to the next player
    End,
}

/// Per-turn bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnState {
    pub current_player: PlayerId,
    pub phase: Phase,
    pub last_roll: Option<DiceRoll>,
    pub longest_road_holder: Option<PlayerId>,
    /// Starts at 1 when regular turns begin
    pub turn_number: u32,
}

/// Session tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for dice, discards and theft; None draws from entropy
    pub seed: Option<u64>,
    pub discard_limit: u32,
    pub longest_road_minimum: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            discard_limit: DEFAULT_DISCARD_LIMIT,
            longest_road_minimum: MINIMUM_LENGTH,
        }
    }
}

impl GameConfig {
    /// Default rules with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Session set-up mistakes. These are caller bugs, not player moves.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SetupError {
    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is already seated")]
    DuplicatePlayer(PlayerId),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Snake-order opening placements still to make
#[derive(Debug, Clone)]
struct SetupProgress {
    first: PlayerId,
    /// Front is the player placing now
    remaining: VecDeque<PlayerId>,
    /// Settlement placed this setup turn, waiting for its road
    settlement: Option<VertexId>,
}

/// A building as shown in [`GameView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingView {
    pub vertex: VertexId,
    pub building: VertexBuilding,
}

/// An owned road as shown in [`GameView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadView {
    pub road: RoadId,
    pub owner: PlayerId,
}

/// Read-only snapshot for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub turn: TurnState,
    pub robber_hex: Option<HexId>,
    pub players: Vec<Player>,
    pub buildings: Vec<BuildingView>,
    pub roads: Vec<RoadView>,
    /// Opening placements still to come, current placer first
    pub setup_order: Vec<PlayerId>,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    players: PlayerLedger,
    turn: TurnState,
    config: GameConfig,
    setup: Option<SetupProgress>,
    events: Vec<GameEvent>,
    rng: StdRng,
}

fn rejected(action: &'static str, player: PlayerId, reason: Rejection) -> Rejection {
    debug!(action, player, %reason, "action rejected");
    reason
}

impl GameState {
    /// Create a game over a wired board with default rules
    pub fn new(board: Board, players: PlayerLedger) -> Self {
        Self::with_config(board, players, GameConfig::default())
    }

    /// Create a game over a wired board
    pub fn with_config(board: Board, players: PlayerLedger, config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::from_parts(board, players, config, rng)
    }

    /// Shuffle a standard board and seat the default four players
    pub fn new_standard(config: GameConfig) -> Result<(Self, StandardLayout), SetupError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (board, layout) = layout::standard_board(&mut rng)?;
        let game = Self::from_parts(board, PlayerLedger::standard(), config, rng);
        Ok((game, layout))
    }

    fn from_parts(board: Board, mut players: PlayerLedger, config: GameConfig, rng: StdRng) -> Self {
        players.recompute_all_victory_points();
        let turn = TurnState {
            current_player: players.ids().first().copied().unwrap_or_default(),
            ..TurnState::default()
        };
        Self {
            board,
            players,
            turn,
            config,
            setup: None,
            events: Vec::new(),
            rng,
        }
    }

    // ==================== Accessors ====================

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board access for registration and wiring calls
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn players(&self) -> &PlayerLedger {
        &self.players
    }

    /// Ledger access for seating players and awarding resources
    pub fn players_mut(&mut self) -> &mut PlayerLedger {
        &mut self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn.current_player
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.turn.last_roll
    }

    pub fn longest_road_holder(&self) -> Option<PlayerId> {
        self.turn.longest_road_holder
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn victory_points(&self, id: PlayerId) -> Option<u32> {
        self.players.victory_points(id)
    }

    /// Opening placements still to come, current placer first
    pub fn setup_order(&self) -> Vec<PlayerId> {
        self.setup
            .as_ref()
            .map(|s| s.remaining.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Hand over everything that happened since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for rendering
    pub fn view(&self) -> GameView {
        GameView {
            turn: self.turn.clone(),
            robber_hex: self.board.robber_hex(),
            players: self.players.iter().cloned().collect(),
            buildings: self
                .board
                .vertices()
                .filter(|v| v.owner().is_some())
                .map(|v| BuildingView {
                    vertex: v.id,
                    building: v.building,
                })
                .collect(),
            roads: self
                .board
                .roads()
                .filter_map(|r| r.owner.map(|owner| RoadView { road: r.id, owner }))
                .collect(),
            setup_order: self.setup_order(),
        }
    }

    // ==================== Game Start ====================

    /// Skip opening placements and start regular turns with `first`.
    ///
    /// An unknown player is a wiring bug and is returned as an error.
    pub fn start_game(&mut self, first: PlayerId) -> Result<(), SetupError> {
        if !self.players.contains(first) {
            return Err(SetupError::UnknownPlayer(first));
        }
        self.setup = None;
        self.begin_turns(first);
        Ok(())
    }

    /// Start snake-order opening placements with `first`
    pub fn begin_setup(&mut self, first: PlayerId) -> Result<(), SetupError> {
        let ids = self.players.ids();
        let start = ids
            .iter()
            .position(|id| *id == first)
            .ok_or(SetupError::UnknownPlayer(first))?;

        let mut order: Vec<PlayerId> = ids[start..].iter().chain(&ids[..start]).copied().collect();
        let back: Vec<PlayerId> = order.iter().rev().copied().collect();
        order.extend(back);

        for player in self.players.iter_mut() {
            player.reset_turn_flags();
        }
        self.turn = TurnState {
            current_player: first,
            phase: Phase::Setup,
            last_roll: None,
            longest_road_holder: self.turn.longest_road_holder,
            turn_number: 0,
        };
        info!(first, placements = order.len(), "opening placements started");
        self.events.push(GameEvent::SetupStarted {
            order: order.clone(),
        });
        self.setup = Some(SetupProgress {
            first,
            remaining: order.into(),
            settlement: None,
        });
        Ok(())
    }

    fn begin_turns(&mut self, first: PlayerId) {
        for player in self.players.iter_mut() {
            player.reset_turn_flags();
        }
        self.turn.current_player = first;
        self.turn.phase = Phase::Roll;
        self.turn.last_roll = None;
        self.turn.turn_number = 1;
        info!(first, "game started");
        self.events.push(GameEvent::GameStarted {
            first_player: first,
        });
    }

    // ==================== Opening Placements ====================

    /// Place a free opening settlement. Connectivity is not required.
    pub fn place_initial_settlement(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
    ) -> Result<(), Rejection> {
        let pending = self.setup.as_ref().map(|s| s.settlement);
        if pending != Some(None) {
            return Err(rejected("place_initial_settlement", player, Rejection::WrongPhase));
        }
        self.require_turn(player)
            .and_then(|_| rules::apply_initial_settlement(&mut self.board, &mut self.players, player, vertex))
            .map_err(|e| rejected("place_initial_settlement", player, e))?;

        if let Some(setup) = self.setup.as_mut() {
            setup.settlement = Some(vertex);
        }
        info!(player, %vertex, "opening settlement placed");
        self.events.push(GameEvent::SettlementBuilt { player, vertex });
        Ok(())
    }

    /// Place a free opening road touching the settlement just placed
    pub fn place_initial_road(&mut self, player: PlayerId, road: RoadId) -> Result<(), Rejection> {
        let Some(anchor) = self.setup.as_ref().and_then(|s| s.settlement) else {
            return Err(rejected("place_initial_road", player, Rejection::WrongPhase));
        };
        self.require_turn(player)
            .and_then(|_| rules::apply_initial_road(&mut self.board, &mut self.players, player, road, anchor))
            .map_err(|e| rejected("place_initial_road", player, e))?;

        info!(player, %road, "opening road placed");
        self.events.push(GameEvent::RoadBuilt { player, road });
        self.refresh_longest_road();
        self.advance_setup();
        Ok(())
    }

    fn advance_setup(&mut self) {
        let Some(setup) = self.setup.as_mut() else {
            return;
        };
        setup.remaining.pop_front();
        setup.settlement = None;
        match setup.remaining.front() {
            Some(&next) => self.turn.current_player = next,
            None => {
                let first = setup.first;
                self.setup = None;
                self.begin_turns(first);
            }
        }
    }

    // ==================== Turn Actions ====================

    fn require_turn(&self, player: PlayerId) -> Result<(), Rejection> {
        if !self.players.contains(player) {
            return Err(Rejection::InvalidPlayer(player));
        }
        if player != self.turn.current_player {
            return Err(Rejection::NotYourTurn(self.turn.current_player));
        }
        Ok(())
    }

    fn require_action_phase(&self, player: PlayerId) -> Result<(), Rejection> {
        self.require_turn(player)?;
        if self.turn.phase != Phase::Action {
            return Err(Rejection::WrongPhase);
        }
        Ok(())
    }

    /// Roll for whoever's turn it is, then pay out or start the robber sequence
    pub fn roll_dice_for_current_player(&mut self) -> Result<DiceRoll, Rejection> {
        let current = self.turn.current_player;
        let already = self.players.get(current).map(|p| p.flags.has_rolled);
        match already {
            None => return Err(rejected("roll_dice", current, Rejection::InvalidPlayer(current))),
            Some(true) => return Err(rejected("roll_dice", current, Rejection::AlreadyRolled)),
            Some(false) => {}
        }
        if self.turn.phase != Phase::Roll {
            return Err(rejected("roll_dice", current, Rejection::WrongPhase));
        }
        let roll = production::roll_dice(&mut self.rng);
        self.resolve_roll(roll);
        Ok(roll)
    }

    fn resolve_roll(&mut self, roll: DiceRoll) {
        let current = self.turn.current_player;
        self.turn.last_roll = Some(roll);
        info!(player = current, total = roll.total, "dice rolled");
        self.events.push(GameEvent::DiceRolled {
            player: current,
            dice: roll.dice,
            total: roll.total,
        });

        if roll.is_robber() {
            let discards =
                production::enforce_discards(&mut self.players, self.config.discard_limit, &mut self.rng);
            for (player, cards) in discards {
                self.events.push(GameEvent::CardsDiscarded { player, cards });
            }
            self.turn.phase = Phase::Robber;
        } else {
            let payouts = production::distribute_production(&self.board, &mut self.players, roll.total);
            let distributions: Vec<_> = payouts
                .iter()
                .flat_map(|(player, hand)| {
                    hand.kinds_in_stock()
                        .into_iter()
                        .map(move |r| (*player, r, hand.get(r)))
                })
                .collect();
            if !distributions.is_empty() {
                self.events.push(GameEvent::ResourcesDistributed { distributions });
            }
            self.turn.phase = Phase::Action;
        }

        if let Some(p) = self.players.get_mut(current) {
            p.flags.has_rolled = true;
            p.flags.awaiting_robber = roll.is_robber();
            p.flags.can_trade = !roll.is_robber();
        }
    }

    /// Can `player` move the robber to `hex` right now?
    pub fn can_move_robber(&self, player: PlayerId, hex: HexId) -> Result<(), Rejection> {
        self.require_turn(player)?;
        if self.turn.phase != Phase::Robber {
            return Err(Rejection::WrongPhase);
        }
        production::check_robber_target(&self.board, hex)
    }

    /// Move the robber and steal; `victim` is honoured when it is a valid candidate
    pub fn apply_move_robber(
        &mut self,
        player: PlayerId,
        hex: HexId,
        victim: Option<PlayerId>,
    ) -> Result<RobberMove, Rejection> {
        self.can_move_robber(player, hex)
            .and_then(|_| {
                production::move_robber(
                    &mut self.board,
                    &mut self.players,
                    player,
                    hex,
                    victim,
                    &mut self.rng,
                )
            })
            .map_err(|e| rejected("move_robber", player, e))
            .map(|outcome| self.finish_robber(player, outcome))
    }

    fn finish_robber(&mut self, player: PlayerId, outcome: RobberMove) -> RobberMove {
        self.events.push(GameEvent::RobberMoved {
            player,
            from: outcome.from,
            to: outcome.to,
        });
        if let Some(theft) = outcome.theft {
            self.events.push(GameEvent::ResourceStolen {
                thief: player,
                victim: theft.victim,
                resource: theft.resource,
            });
        }
        if let Some(p) = self.players.get_mut(player) {
            p.flags.awaiting_robber = false;
            p.flags.can_trade = true;
        }
        self.turn.phase = Phase::Action;
        outcome
    }

    pub fn can_build_road(&self, player: PlayerId, road: RoadId) -> Result<(), Rejection> {
        self.require_action_phase(player)?;
        rules::check_road(&self.board, &self.players, player, road)
    }

    pub fn apply_build_road(&mut self, player: PlayerId, road: RoadId) -> Result<(), Rejection> {
        self.require_action_phase(player)
            .and_then(|_| rules::apply_road(&mut self.board, &mut self.players, player, road))
            .map_err(|e| rejected("build_road", player, e))?;

        info!(player, %road, "road built");
        self.events.push(GameEvent::RoadBuilt { player, road });
        self.refresh_longest_road();
        Ok(())
    }

    pub fn can_build_settlement(&self, player: PlayerId, vertex: VertexId) -> Result<(), Rejection> {
        self.require_action_phase(player)?;
        rules::check_settlement(&self.board, &self.players, player, vertex)
    }

    pub fn apply_build_settlement(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), Rejection> {
        self.require_action_phase(player)
            .and_then(|_| rules::apply_settlement(&mut self.board, &mut self.players, player, vertex))
            .map_err(|e| rejected("build_settlement", player, e))?;

        info!(player, %vertex, "settlement built");
        self.events.push(GameEvent::SettlementBuilt { player, vertex });
        // A new settlement can cut an opponent's road
        self.refresh_longest_road();
        Ok(())
    }

    pub fn can_upgrade_city(&self, player: PlayerId, vertex: VertexId) -> Result<(), Rejection> {
        self.require_action_phase(player)?;
        rules::check_city(&self.board, &self.players, player, vertex)
    }

    pub fn apply_upgrade_city(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), Rejection> {
        self.require_action_phase(player)
            .and_then(|_| rules::apply_city(&mut self.board, &mut self.players, player, vertex))
            .map_err(|e| rejected("upgrade_city", player, e))?;

        info!(player, %vertex, "city built");
        self.events.push(GameEvent::CityBuilt { player, vertex });
        Ok(())
    }

    /// Pass the turn. Only allowed from the action phase.
    pub fn end_turn(&mut self) -> Result<PlayerId, Rejection> {
        let current = self.turn.current_player;
        if self.turn.phase != Phase::Action {
            return Err(rejected("end_turn", current, Rejection::WrongPhase));
        }
        let next = self
            .players
            .next_in_turn_order(current)
            .ok_or_else(|| rejected("end_turn", current, Rejection::InvalidPlayer(current)))?;

        self.turn.phase = Phase::End;
        if let Some(p) = self.players.get_mut(next) {
            p.reset_turn_flags();
        }
        self.turn.current_player = next;
        self.turn.phase = Phase::Roll;
        self.turn.last_roll = None;
        self.turn.turn_number += 1;

        info!(player = current, next, turn = self.turn.turn_number, "turn ended");
        self.events.push(GameEvent::TurnEnded {
            player: current,
            next_player: next,
        });
        Ok(next)
    }

    fn refresh_longest_road(&mut self) {
        let previous = self.turn.longest_road_holder;
        let standing = longest_road::update_longest_road(
            &self.board,
            &mut self.players,
            self.config.longest_road_minimum,
        );
        self.turn.longest_road_holder = standing.holder;
        if standing.holder != previous {
            info!(?previous, current = ?standing.holder, length = standing.length, "longest road changed");
            self.events.push(GameEvent::LongestRoadChanged {
                previous,
                current: standing.holder,
                length: standing.length,
            });
        }
    }

    // ==================== Action Dispatch ====================

    /// Apply an action on behalf of `player` and return the events it produced
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, Rejection> {
        let mark = self.events.len();
        match action {
            GameAction::PlaceInitialSettlement { vertex } => {
                self.place_initial_settlement(player, vertex)?
            }
            GameAction::PlaceInitialRoad { road } => self.place_initial_road(player, road)?,
            GameAction::RollDice => {
                self.require_turn(player)
                    .map_err(|e| rejected("roll_dice", player, e))?;
                self.roll_dice_for_current_player()?;
            }
            GameAction::MoveRobber { hex, victim } => {
                self.apply_move_robber(player, hex, victim)?;
            }
            GameAction::BuildRoad { road } => self.apply_build_road(player, road)?,
            GameAction::BuildSettlement { vertex } => self.apply_build_settlement(player, vertex)?,
            GameAction::UpgradeCity { vertex } => self.apply_upgrade_city(player, vertex)?,
            GameAction::EndTurn => {
                self.require_turn(player)
                    .map_err(|e| rejected("end_turn", player, e))?;
                self.end_turn()?;
            }
        }
        Ok(self.events.get(mark..).map(<[GameEvent]>::to_vec).unwrap_or_default())
    }

    /// Every action that would currently succeed for `player`
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if self.require_turn(player).is_err() {
            return actions;
        }

        match self.turn.phase {
            Phase::Setup => match self.setup.as_ref().map(|s| s.settlement) {
                Some(None) => {
                    for v in self.board.vertices() {
                        if rules::check_initial_settlement(&self.board, &self.players, player, v.id).is_ok() {
                            actions.push(GameAction::PlaceInitialSettlement { vertex: v.id });
                        }
                    }
                }
                Some(Some(anchor)) => {
                    for r in self.board.roads() {
                        if rules::check_initial_road(&self.board, &self.players, player, r.id, anchor).is_ok() {
                            actions.push(GameAction::PlaceInitialRoad { road: r.id });
                        }
                    }
                }
                None => {}
            },
            Phase::Roll => actions.push(GameAction::RollDice),
            Phase::Robber => {
                for hex in self.board.hexes() {
                    if self.can_move_robber(player, hex.id).is_ok() {
                        actions.push(GameAction::MoveRobber {
                            hex: hex.id,
                            victim: None,
                        });
                    }
                }
            }
            Phase::Action => {
                actions.push(GameAction::EndTurn);
                for r in self.board.roads() {
                    if self.can_build_road(player, r.id).is_ok() {
                        actions.push(GameAction::BuildRoad { road: r.id });
                    }
                }
                for v in self.board.vertices() {
                    if self.can_build_settlement(player, v.id).is_ok() {
                        actions.push(GameAction::BuildSettlement { vertex: v.id });
                    }
                    if self.can_upgrade_city(player, v.id).is_ok() {
                        actions.push(GameAction::UpgradeCity { vertex: v.id });
                    }
                }
            }
            Phase::End => {}
        }
        actions
    }
}
