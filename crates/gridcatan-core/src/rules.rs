//! Placement rules for roads, settlements and cities.
//!
//! Each build has a `check_*` function that answers "is this legal right
//! now?" without touching anything, and an `apply_*` function that runs the
//! same check and then commits the build. A failed apply leaves the board
//! and the ledger exactly as they were.
//!
//! Turn and phase gating lives in [`crate::game`]; these functions only
//! look at geometry, ownership and resources.

use crate::board::{Board, EntityRef, PlayerId, RoadId, VertexBuilding, VertexId};
use crate::player::{costs, PlayerLedger};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    #[error("player {0} is not in this game")]
    InvalidPlayer(PlayerId),

    #[error("it is player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("{0} does not exist")]
    InvalidTarget(EntityRef),

    #[error("{0} is not wired to two vertices")]
    RoadNotWired(RoadId),

    #[error("{0} is already taken")]
    AlreadyOwned(EntityRef),

    #[error("{0} belongs to someone else")]
    NotOwner(VertexId),

    #[error("{0} does not hold a settlement")]
    NotASettlement(VertexId),

    #[error("not enough resources")]
    InsufficientResources,

    #[error("{0} is too close to another building")]
    DistanceRule(VertexId),

    #[error("{0} is not connected to your network")]
    NotConnected(EntityRef),

    #[error("that is not allowed during this phase")]
    WrongPhase,

    #[error("dice have already been rolled this turn")]
    AlreadyRolled,

    #[error("the robber must move to a different hex")]
    RobberAlreadyPresent,
}

/// Legality result in the shape UI layers consume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legality<T = ()> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    /// Readable rejection text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Machine-readable rejection, `{reason, detail?}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Rejection>,
}

impl<T> From<Result<T, Rejection>> for Legality<T> {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(value) => Self {
                valid: true,
                value: Some(value),
                reason: None,
                code: None,
            },
            Err(rejection) => Self {
                valid: false,
                value: None,
                reason: Some(rejection.to_string()),
                code: Some(rejection),
            },
        }
    }
}

impl Legality<()> {
    /// Drop the unit payload so a successful check serializes as `{"valid":true}`
    pub fn check(result: Result<(), Rejection>) -> Self {
        let mut legality = Self::from(result);
        legality.value = None;
        legality
    }
}

fn require_player(ledger: &PlayerLedger, player: PlayerId) -> Result<(), Rejection> {
    if ledger.contains(player) {
        Ok(())
    } else {
        Err(Rejection::InvalidPlayer(player))
    }
}

/// Endpoints of a road, or why it can't be used
fn wired_endpoints(board: &Board, road: RoadId) -> Result<[VertexId; 2], Rejection> {
    let ends = board
        .road(road)
        .ok_or(Rejection::InvalidTarget(EntityRef::Road(road)))?
        .endpoints
        .ok_or(Rejection::RoadNotWired(road))?;
    if ends.iter().all(|v| board.vertex(*v).is_some()) {
        Ok(ends)
    } else {
        Err(Rejection::RoadNotWired(road))
    }
}

/// No building may sit on `vertex` or any of its neighbours
fn check_distance_rule(board: &Board, vertex: VertexId) -> Result<(), Rejection> {
    let v = board
        .vertex(vertex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Vertex(vertex)))?;
    let crowded = v
        .adjacent_vertices
        .iter()
        .filter_map(|n| board.vertex(*n))
        .any(|n| n.owner().is_some());
    if crowded {
        Err(Rejection::DistanceRule(vertex))
    } else {
        Ok(())
    }
}

fn check_unowned_vertex(board: &Board, vertex: VertexId) -> Result<(), Rejection> {
    let v = board
        .vertex(vertex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Vertex(vertex)))?;
    if v.owner().is_some() {
        return Err(Rejection::AlreadyOwned(EntityRef::Vertex(vertex)));
    }
    Ok(())
}

fn check_unowned_road(board: &Board, road: RoadId) -> Result<(), Rejection> {
    let r = board
        .road(road)
        .ok_or(Rejection::InvalidTarget(EntityRef::Road(road)))?;
    if r.owner.is_some() {
        return Err(Rejection::AlreadyOwned(EntityRef::Road(road)));
    }
    Ok(())
}

// ==================== Checks ====================

/// Can `player` pay for and place a road on `road`?
pub fn check_road(
    board: &Board,
    ledger: &PlayerLedger,
    player: PlayerId,
    road: RoadId,
) -> Result<(), Rejection> {
    require_player(ledger, player)?;
    check_unowned_road(board, road)?;
    if !ledger.can_afford(player, &costs::road()) {
        return Err(Rejection::InsufficientResources);
    }
    let ends = wired_endpoints(board, road)?;

    // An endpoint must hold the player's building or another of their roads
    let connected = ends.iter().any(|v| {
        board.vertex(*v).is_some_and(|vx| vx.owner() == Some(player))
            || board.vertex_has_player_road(*v, player)
    });
    if !connected {
        return Err(Rejection::NotConnected(EntityRef::Road(road)));
    }
    Ok(())
}

/// Can `player` pay for and place a settlement on `vertex`?
pub fn check_settlement(
    board: &Board,
    ledger: &PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    require_player(ledger, player)?;
    check_unowned_vertex(board, vertex)?;
    if !ledger.can_afford(player, &costs::settlement()) {
        return Err(Rejection::InsufficientResources);
    }
    check_distance_rule(board, vertex)?;
    if !board.vertex_has_player_road(vertex, player) {
        return Err(Rejection::NotConnected(EntityRef::Vertex(vertex)));
    }
    Ok(())
}

/// Can `player` pay for and upgrade the settlement on `vertex`?
pub fn check_city(
    board: &Board,
    ledger: &PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    require_player(ledger, player)?;
    let v = board
        .vertex(vertex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Vertex(vertex)))?;
    if v.owner() != Some(player) {
        return Err(Rejection::NotOwner(vertex));
    }
    if !matches!(v.building, VertexBuilding::Settlement(_)) {
        return Err(Rejection::NotASettlement(vertex));
    }
    if !ledger.can_afford(player, &costs::city()) {
        return Err(Rejection::InsufficientResources);
    }
    Ok(())
}

/// Opening settlement: free, needs no road, still obeys the distance rule
pub fn check_initial_settlement(
    board: &Board,
    ledger: &PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    require_player(ledger, player)?;
    check_unowned_vertex(board, vertex)?;
    check_distance_rule(board, vertex)
}

/// Opening road: free, must touch the settlement just placed
pub fn check_initial_road(
    board: &Board,
    ledger: &PlayerLedger,
    player: PlayerId,
    road: RoadId,
    anchor: VertexId,
) -> Result<(), Rejection> {
    require_player(ledger, player)?;
    check_unowned_road(board, road)?;
    let ends = wired_endpoints(board, road)?;
    if !ends.contains(&anchor) {
        return Err(Rejection::NotConnected(EntityRef::Road(road)));
    }
    Ok(())
}

// ==================== Builds ====================

/// Check, pay for and place a road
pub fn apply_road(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    road: RoadId,
) -> Result<(), Rejection> {
    check_road(board, ledger, player, road)?;
    place_road(board, ledger, player, road, true)
}

/// Check, pay for and place a settlement
pub fn apply_settlement(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    check_settlement(board, ledger, player, vertex)?;
    place_settlement(board, ledger, player, vertex, true)
}

/// Check, pay for and upgrade a settlement to a city
pub fn apply_city(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    check_city(board, ledger, player, vertex)?;
    let v = board
        .vertex_mut(vertex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Vertex(vertex)))?;
    let p = ledger.get_mut(player).ok_or(Rejection::InvalidPlayer(player))?;
    if !p.resources.try_subtract(&costs::city()) {
        return Err(Rejection::InsufficientResources);
    }
    v.building = VertexBuilding::City(player);
    p.settlements.retain(|s| *s != vertex);
    p.cities.push(vertex);
    p.recompute_victory_points();
    Ok(())
}

/// Place the free opening settlement
pub fn apply_initial_settlement(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
) -> Result<(), Rejection> {
    check_initial_settlement(board, ledger, player, vertex)?;
    place_settlement(board, ledger, player, vertex, false)
}

/// Place the free opening road next to `anchor`
pub fn apply_initial_road(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    road: RoadId,
    anchor: VertexId,
) -> Result<(), Rejection> {
    check_initial_road(board, ledger, player, road, anchor)?;
    place_road(board, ledger, player, road, false)
}

/// Every fallible lookup happens before the first write
fn place_road(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    road: RoadId,
    paid: bool,
) -> Result<(), Rejection> {
    let r = board
        .road_mut(road)
        .ok_or(Rejection::InvalidTarget(EntityRef::Road(road)))?;
    let p = ledger.get_mut(player).ok_or(Rejection::InvalidPlayer(player))?;
    if paid && !p.resources.try_subtract(&costs::road()) {
        return Err(Rejection::InsufficientResources);
    }
    r.owner = Some(player);
    p.roads.push(road);
    Ok(())
}

fn place_settlement(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    player: PlayerId,
    vertex: VertexId,
    paid: bool,
) -> Result<(), Rejection> {
    let v = board
        .vertex_mut(vertex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Vertex(vertex)))?;
    let p = ledger.get_mut(player).ok_or(Rejection::InvalidPlayer(player))?;
    if paid && !p.resources.try_subtract(&costs::settlement()) {
        return Err(Rejection::InsufficientResources);
    }
    v.building = VertexBuilding::Settlement(player);
    p.settlements.push(vertex);
    p.recompute_victory_points();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HexId, HexSpec, Resource};
    use crate::player::ResourceHand;
    use pretty_assertions::assert_eq;

    /// A straight line of vertices 0-1-2-3-4 joined by roads 0..=3
    /// (road i joins vertex i and i+1), plus an unwired road 9.
    fn line_board() -> Board {
        let mut board = Board::new();
        board
            .register_hex(HexId(0), HexSpec::resource(Resource::Wheat, 8))
            .unwrap();
        for v in 0..5 {
            board.register_vertex(VertexId(v), None, &[HexId(0)]).unwrap();
        }
        for i in 0..4 {
            board.link_vertices(VertexId(i), VertexId(i + 1)).unwrap();
            board
                .register_road(RoadId(i), None, Some((VertexId(i), VertexId(i + 1))))
                .unwrap();
        }
        board.register_road(RoadId(9), None, None).unwrap();
        board
    }

    fn rich_ledger() -> PlayerLedger {
        let mut ledger = PlayerLedger::standard();
        for id in ledger.ids() {
            for r in Resource::ALL {
                ledger.award(id, r, 5).unwrap();
            }
        }
        ledger
    }

    #[test]
    fn test_road_needs_connection() {
        let mut board = line_board();
        let mut ledger = rich_ledger();

        assert_eq!(
            check_road(&board, &ledger, 0, RoadId(1)),
            Err(Rejection::NotConnected(EntityRef::Road(RoadId(1))))
        );

        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(1)).unwrap();
        assert_eq!(check_road(&board, &ledger, 0, RoadId(1)), Ok(()));
        apply_road(&mut board, &mut ledger, 0, RoadId(1)).unwrap();

        // Extends from the end of the new road
        assert_eq!(check_road(&board, &ledger, 0, RoadId(2)), Ok(()));
        assert_eq!(
            check_road(&board, &ledger, 0, RoadId(3)),
            Err(Rejection::NotConnected(EntityRef::Road(RoadId(3))))
        );
    }

    #[test]
    fn test_road_rejections() {
        let mut board = line_board();
        let mut ledger = rich_ledger();
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(0)).unwrap();
        apply_road(&mut board, &mut ledger, 0, RoadId(0)).unwrap();

        assert_eq!(
            check_road(&board, &ledger, 1, RoadId(0)),
            Err(Rejection::AlreadyOwned(EntityRef::Road(RoadId(0))))
        );
        assert_eq!(
            check_road(&board, &ledger, 0, RoadId(9)),
            Err(Rejection::RoadNotWired(RoadId(9)))
        );
        assert_eq!(
            check_road(&board, &ledger, 0, RoadId(50)),
            Err(Rejection::InvalidTarget(EntityRef::Road(RoadId(50))))
        );
        assert_eq!(
            check_road(&board, &ledger, 8, RoadId(1)),
            Err(Rejection::InvalidPlayer(8))
        );
    }

    #[test]
    fn test_road_costs_brick_and_wood() {
        let mut board = line_board();
        let mut ledger = PlayerLedger::standard();
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(0)).unwrap();
        ledger.award(0, Resource::Brick, 1).unwrap();

        assert_eq!(
            apply_road(&mut board, &mut ledger, 0, RoadId(0)),
            Err(Rejection::InsufficientResources)
        );
        assert_eq!(board.road(RoadId(0)).unwrap().owner, None);
        assert_eq!(ledger.hand_size(0), Some(1));

        ledger.award(0, Resource::Wood, 1).unwrap();
        apply_road(&mut board, &mut ledger, 0, RoadId(0)).unwrap();
        assert_eq!(ledger.hand_size(0), Some(0));
        assert_eq!(ledger.get(0).unwrap().roads, vec![RoadId(0)]);
    }

    #[test]
    fn test_settlement_distance_rule_counts_every_owner() {
        let mut board = line_board();
        let mut ledger = rich_ledger();
        apply_initial_settlement(&mut board, &mut ledger, 1, VertexId(2)).unwrap();

        // Player 0 owns a road into vertex 3 but vertex 2 is taken next door
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(4)).unwrap();
        apply_road(&mut board, &mut ledger, 0, RoadId(3)).unwrap();
        assert_eq!(
            check_settlement(&board, &ledger, 0, VertexId(3)),
            Err(Rejection::DistanceRule(VertexId(3)))
        );
        // Own buildings block too
        assert_eq!(
            check_initial_settlement(&board, &ledger, 1, VertexId(1)),
            Err(Rejection::DistanceRule(VertexId(1)))
        );
    }

    #[test]
    fn test_settlement_needs_own_road() {
        let mut board = line_board();
        let mut ledger = rich_ledger();
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(0)).unwrap();
        apply_road(&mut board, &mut ledger, 0, RoadId(0)).unwrap();
        apply_road(&mut board, &mut ledger, 0, RoadId(1)).unwrap();

        assert_eq!(
            check_settlement(&board, &ledger, 1, VertexId(2)),
            Err(Rejection::NotConnected(EntityRef::Vertex(VertexId(2))))
        );
        apply_settlement(&mut board, &mut ledger, 0, VertexId(2)).unwrap();

        let player = ledger.get(0).unwrap();
        assert_eq!(player.settlements, vec![VertexId(0), VertexId(2)]);
        assert_eq!(player.victory_points, 2);
        assert_eq!(player.resources, ResourceHand::with_amounts(2, 2, 4, 4, 5));
    }

    #[test]
    fn test_settlement_on_owned_vertex() {
        let mut board = line_board();
        let mut ledger = rich_ledger();
        apply_initial_settlement(&mut board, &mut ledger, 2, VertexId(0)).unwrap();
        assert_eq!(
            check_settlement(&board, &ledger, 0, VertexId(0)),
            Err(Rejection::AlreadyOwned(EntityRef::Vertex(VertexId(0))))
        );
    }

    #[test]
    fn test_city_upgrade() {
        let mut board = line_board();
        let mut ledger = rich_ledger();
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(0)).unwrap();

        assert_eq!(
            check_city(&board, &ledger, 1, VertexId(0)),
            Err(Rejection::NotOwner(VertexId(0)))
        );
        assert_eq!(
            check_city(&board, &ledger, 0, VertexId(2)),
            Err(Rejection::NotOwner(VertexId(2)))
        );

        apply_city(&mut board, &mut ledger, 0, VertexId(0)).unwrap();
        assert_eq!(
            board.vertex(VertexId(0)).unwrap().building,
            VertexBuilding::City(0)
        );
        let player = ledger.get(0).unwrap();
        assert!(player.settlements.is_empty());
        assert_eq!(player.cities, vec![VertexId(0)]);
        assert_eq!(player.victory_points, 2);
        assert_eq!(player.resources.ore, 2);
        assert_eq!(player.resources.wheat, 3);

        assert_eq!(
            check_city(&board, &ledger, 0, VertexId(0)),
            Err(Rejection::NotASettlement(VertexId(0)))
        );
    }

    #[test]
    fn test_initial_road_must_touch_anchor() {
        let mut board = line_board();
        let mut ledger = PlayerLedger::standard();
        apply_initial_settlement(&mut board, &mut ledger, 0, VertexId(1)).unwrap();

        assert_eq!(
            apply_initial_road(&mut board, &mut ledger, 0, RoadId(2), VertexId(1)),
            Err(Rejection::NotConnected(EntityRef::Road(RoadId(2))))
        );
        apply_initial_road(&mut board, &mut ledger, 0, RoadId(1), VertexId(1)).unwrap();
        assert_eq!(board.road(RoadId(1)).unwrap().owner, Some(0));
        assert_eq!(ledger.hand_size(0), Some(0));
    }

    #[test]
    fn test_legality_serialization() {
        let ok = serde_json::to_string(&Legality::check(Ok(()))).unwrap();
        assert_eq!(ok, r#"{"valid":true}"#);

        let rolled = Legality::from(Ok::<u8, Rejection>(8));
        assert_eq!(serde_json::to_string(&rolled).unwrap(), r#"{"valid":true,"value":8}"#);

        let bad = Legality::check(Err(Rejection::InsufficientResources));
        assert_eq!(
            serde_json::to_string(&bad).unwrap(),
            r#"{"valid":false,"reason":"not enough resources","code":{"reason":"insufficient_resources"}}"#
        );

        let crowded = Legality::check(Err(Rejection::DistanceRule(VertexId(4))));
        let json = serde_json::to_value(&crowded).unwrap();
        assert_eq!(json["code"]["reason"].as_str(), Some("distance_rule"));
        assert_eq!(json["code"]["detail"].as_u64(), Some(4));
        let back: Legality = serde_json::from_value(json).unwrap();
        assert_eq!(back.code, Some(Rejection::DistanceRule(VertexId(4))));
    }
}
