//! Players, their hands and the seat-ordered ledger.
//!
//! [`PlayerLedger`] is the roster every other engine works against; its
//! order is the turn order. Hands are plain counters in [`ResourceHand`] and
//! build prices live in [`costs`].

use crate::board::{PlayerId, Resource, RoadId, VertexId};
use crate::game::SetupError;
use crate::rules::Rejection;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Victory points granted by the Longest Road card
pub const LONGEST_ROAD_BONUS: u32 = 2;
/// Victory points granted by the Largest Army card
pub const LARGEST_ARMY_BONUS: u32 = 2;

/// Player color, which doubles as the seat name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    /// Seat order of the default roster
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Green => "green",
            PlayerColor::Yellow => "yellow",
        }
    }
}

/// Who drives a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Automated,
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub wood: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, wood: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            brick,
            wood,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.wood + self.sheep + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Wood => self.wood,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Wood => &mut self.wood,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for r in Resource::ALL {
            self.add(r, other.get(r));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Try to subtract, returning false (and leaving the hand alone) if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for r in Resource::ALL {
            *self.slot(r) -= cost.get(r);
        }
        true
    }

    /// Resource kinds with at least one card
    pub fn kinds_in_stock(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|r| self.get(*r) > 0)
            .collect()
    }

    /// Remove one card chosen uniformly over every card held (for robber stealing)
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for r in Resource::ALL {
            let count = self.get(r);
            if pick < count {
                *self.slot(r) -= 1;
                return Some(r);
            }
            pick -= count;
        }
        None
    }

    /// Remove one card of a kind chosen uniformly among the kinds in stock
    pub fn discard_random_kind<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let resource = *self.kinds_in_stock().choose(rng)?;
        *self.slot(resource) -= 1;
        Some(resource)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 wood
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 wood, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }
}

/// Per-turn flags, reset whenever the turn passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlags {
    pub has_rolled: bool,
    pub can_trade: bool,
    pub awaiting_robber: bool,
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub color: PlayerColor,
    pub kind: PlayerKind,
    pub resources: ResourceHand,
    /// Vertices holding this player's settlements
    pub settlements: Vec<VertexId>,
    /// Vertices holding this player's cities
    pub cities: Vec<VertexId>,
    pub roads: Vec<RoadId>,
    /// Derived; see [`Player::recompute_victory_points`]
    pub victory_points: u32,
    /// Whether this player has the Longest Road card
    pub has_longest_road: bool,
    /// Whether this player has the Largest Army card
    pub has_largest_army: bool,
    pub flags: TurnFlags,
}

impl Player {
    /// Create a new player with nothing on the board
    pub fn new(id: PlayerId, name: impl Into<String>, color: PlayerColor, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            kind,
            resources: ResourceHand::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            victory_points: 0,
            has_longest_road: false,
            has_largest_army: false,
            flags: TurnFlags::default(),
        }
    }

    /// Recalculate victory points from holdings and awards
    pub fn recompute_victory_points(&mut self) -> u32 {
        let mut vp = self.settlements.len() as u32 + 2 * self.cities.len() as u32;
        if self.has_longest_road {
            vp += LONGEST_ROAD_BONUS;
        }
        if self.has_largest_army {
            vp += LARGEST_ARMY_BONUS;
        }
        self.victory_points = vp;
        vp
    }

    /// Clear the flags that only live for one turn
    pub fn reset_turn_flags(&mut self) {
        self.flags = TurnFlags::default();
    }
}

/// Every player in turn order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLedger {
    players: Vec<Player>,
}

impl PlayerLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-seat roster: red is human, the rest automated
    pub fn standard() -> Self {
        let players = PlayerColor::ALL
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                let kind = if color == PlayerColor::Red {
                    PlayerKind::Human
                } else {
                    PlayerKind::Automated
                };
                Player::new(i as PlayerId, color.name(), color, kind)
            })
            .collect();
        Self { players }
    }

    /// Append a player to the end of the turn order
    pub fn add_player(&mut self, player: Player) -> Result<(), SetupError> {
        if self.contains(player.id) {
            return Err(SetupError::DuplicatePlayer(player.id));
        }
        self.players.push(player);
        Ok(())
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    /// Player ids in turn order
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The player seated after `id`, wrapping around
    pub fn next_in_turn_order(&self, id: PlayerId) -> Option<PlayerId> {
        let pos = self.players.iter().position(|p| p.id == id)?;
        Some(self.players[(pos + 1) % self.players.len()].id)
    }

    /// Cards of one kind held by a player
    pub fn resource_count(&self, id: PlayerId, resource: Resource) -> Option<u32> {
        self.get(id).map(|p| p.resources.get(resource))
    }

    /// Total cards held by a player
    pub fn hand_size(&self, id: PlayerId) -> Option<u32> {
        self.get(id).map(|p| p.resources.total())
    }

    /// Total cards held by everyone
    pub fn cards_in_play(&self) -> u32 {
        self.players.iter().map(|p| p.resources.total()).sum()
    }

    /// Give cards to a player
    pub fn award(&mut self, id: PlayerId, resource: Resource, amount: u32) -> Result<(), Rejection> {
        let player = self.get_mut(id).ok_or(Rejection::InvalidPlayer(id))?;
        player.resources.add(resource, amount);
        Ok(())
    }

    /// Deduct a cost, all or nothing
    pub fn spend(&mut self, id: PlayerId, cost: &ResourceHand) -> Result<(), Rejection> {
        let player = self.get_mut(id).ok_or(Rejection::InvalidPlayer(id))?;
        if player.resources.try_subtract(cost) {
            Ok(())
        } else {
            Err(Rejection::InsufficientResources)
        }
    }

    pub fn can_afford(&self, id: PlayerId, cost: &ResourceHand) -> bool {
        self.get(id).is_some_and(|p| p.resources.can_afford(cost))
    }

    pub fn victory_points(&self, id: PlayerId) -> Option<u32> {
        self.get(id).map(|p| p.victory_points)
    }

    pub(crate) fn recompute_all_victory_points(&mut self) {
        for player in &mut self.players {
            player.recompute_victory_points();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
        assert_eq!(hand.get(Resource::Wheat), 4);
        assert_eq!(hand.kinds_in_stock().len(), 5);
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::with_amounts(2, 2, 2, 2, 2);
        assert!(hand.can_afford(&ResourceHand::with_amounts(1, 1, 1, 1, 1)));
        assert!(!hand.can_afford(&ResourceHand::with_amounts(3, 0, 0, 0, 0)));
    }

    #[test]
    fn test_try_subtract_is_all_or_nothing() {
        let mut hand = ResourceHand::with_amounts(0, 0, 0, 2, 2);
        assert!(!hand.try_subtract(&costs::city()));
        assert_eq!(hand, ResourceHand::with_amounts(0, 0, 0, 2, 2));

        hand.add(Resource::Ore, 1);
        assert!(hand.try_subtract(&costs::city()));
        assert!(hand.is_empty());
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::settlement().get(Resource::Ore), 0);
        assert_eq!(costs::city(), ResourceHand::with_amounts(0, 0, 0, 2, 3));
    }

    #[test]
    fn test_steal_random() {
        let mut hand = ResourceHand::with_amounts(0, 0, 0, 1, 0);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(hand.steal_random(&mut rng), Some(Resource::Wheat));
        assert!(hand.is_empty());
        assert_eq!(hand.steal_random(&mut rng), None);
    }

    #[test]
    fn test_steal_random_conserves_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hand = ResourceHand::with_amounts(3, 0, 1, 0, 2);
        for expected_left in (0..6).rev() {
            let taken = hand.steal_random(&mut rng).unwrap();
            assert_eq!(hand.total(), expected_left);
            assert!(taken != Resource::Wood && taken != Resource::Wheat);
        }
    }

    #[test]
    fn test_discard_random_kind_only_touches_stocked_kinds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut hand = ResourceHand::with_amounts(0, 4, 0, 0, 1);
        for _ in 0..5 {
            let kind = hand.discard_random_kind(&mut rng).unwrap();
            assert!(kind == Resource::Wood || kind == Resource::Ore);
        }
        assert!(hand.is_empty());
        assert_eq!(hand.discard_random_kind(&mut rng), None);
    }

    #[test]
    fn test_steal_weighted_by_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws = 10_000;
        let mut bricks = 0;
        for _ in 0..draws {
            let mut hand = ResourceHand::with_amounts(9, 0, 0, 0, 1);
            if hand.steal_random(&mut rng) == Some(Resource::Brick) {
                bricks += 1;
            }
        }
        // 9 of 10 cards are brick; picking by kind would land near half
        assert!((8_600..=9_400).contains(&bricks), "brick taken {bricks} times");
    }

    #[test]
    fn test_discard_uniform_by_kind() {
        let mut rng = StdRng::seed_from_u64(5);
        let trials = 4_000;
        let mut ore_lost = 0;
        for _ in 0..trials {
            let mut hand = ResourceHand::with_amounts(7, 0, 0, 0, 1);
            for _ in 0..4 {
                hand.discard_random_kind(&mut rng);
            }
            assert_eq!(hand.total(), 4);
            if hand.get(Resource::Ore) == 0 {
                ore_lost += 1;
            }
        }
        // Ore goes on a coin flip per card (~94%); weighting by count loses it half the time
        assert!(ore_lost >= 3_500, "ore lost in {ore_lost} of {trials} trials");
    }

    #[test]
    fn test_player_victory_points() {
        let mut player = Player::new(0, "red", PlayerColor::Red, PlayerKind::Human);
        assert_eq!(player.recompute_victory_points(), 0);

        player.settlements = vec![VertexId(1), VertexId(2)];
        player.cities = vec![VertexId(3)];
        assert_eq!(player.recompute_victory_points(), 4);

        player.has_longest_road = true;
        player.has_largest_army = true;
        assert_eq!(player.recompute_victory_points(), 8);
        assert_eq!(player.victory_points, 8);
    }

    #[test]
    fn test_standard_roster() {
        let ledger = PlayerLedger::standard();
        assert_eq!(ledger.ids(), vec![0, 1, 2, 3]);
        assert_eq!(ledger.get(0).unwrap().kind, PlayerKind::Human);
        assert_eq!(ledger.get(0).unwrap().name, "red");
        assert_eq!(ledger.get(3).unwrap().color, PlayerColor::Yellow);
        assert_eq!(ledger.get(2).unwrap().kind, PlayerKind::Automated);
    }

    #[test]
    fn test_turn_order_wraps() {
        let ledger = PlayerLedger::standard();
        assert_eq!(ledger.next_in_turn_order(0), Some(1));
        assert_eq!(ledger.next_in_turn_order(3), Some(0));
        assert_eq!(ledger.next_in_turn_order(9), None);
    }

    #[test]
    fn test_add_player_rejects_duplicates() {
        let mut ledger = PlayerLedger::new();
        ledger
            .add_player(Player::new(5, "east", PlayerColor::Blue, PlayerKind::Human))
            .unwrap();
        assert_eq!(
            ledger.add_player(Player::new(5, "again", PlayerColor::Green, PlayerKind::Human)),
            Err(SetupError::DuplicatePlayer(5))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_award_and_spend() {
        let mut ledger = PlayerLedger::standard();
        ledger.award(1, Resource::Brick, 1).unwrap();
        ledger.award(1, Resource::Wood, 1).unwrap();

        assert!(ledger.can_afford(1, &costs::road()));
        assert_eq!(
            ledger.spend(1, &costs::settlement()),
            Err(Rejection::InsufficientResources)
        );
        assert_eq!(ledger.hand_size(1), Some(2));

        ledger.spend(1, &costs::road()).unwrap();
        assert_eq!(ledger.hand_size(1), Some(0));
        assert_eq!(ledger.award(9, Resource::Ore, 1), Err(Rejection::InvalidPlayer(9)));
    }
}
