//! Dice, resource production and the robber.
//!
//! Everything here is a free function over the board and the ledger so the
//! pieces can be driven with a chosen total or a seeded RNG. Turn gating is
//! done by [`crate::game::GameState`] before these are called.

use crate::board::{Board, EntityRef, HexId, PlayerId, Resource};
use crate::player::{PlayerLedger, ResourceHand};
use crate::rules::Rejection;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The total that triggers discards and the robber
pub const ROBBER_TOTAL: u8 = 7;

/// Result of rolling two dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub dice: [u8; 2],
    pub total: u8,
}

impl DiceRoll {
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            dice: [a, b],
            total: a + b,
        }
    }

    pub fn is_robber(&self) -> bool {
        self.total == ROBBER_TOTAL
    }
}

/// Roll two fair six-sided dice
pub fn roll_dice<R: Rng>(rng: &mut R) -> DiceRoll {
    DiceRoll::new(rng.gen_range(1..=6), rng.gen_range(1..=6))
}

/// What every player would collect for `total`, without paying anything out
pub fn production_for_roll(board: &Board, total: u8) -> BTreeMap<PlayerId, ResourceHand> {
    let mut payouts: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
    if total == ROBBER_TOTAL {
        return payouts;
    }

    for hex in board.hexes().filter(|h| h.produces_on(total)) {
        let Some(resource) = hex.resource() else {
            continue;
        };
        for vertex in hex.vertices.iter().filter_map(|v| board.vertex(*v)) {
            if let Some(owner) = vertex.owner() {
                payouts
                    .entry(owner)
                    .or_default()
                    .add(resource, vertex.building.resource_multiplier());
            }
        }
    }
    payouts
}

/// Pay out production for `total` and return what each player received
pub fn distribute_production(
    board: &Board,
    ledger: &mut PlayerLedger,
    total: u8,
) -> BTreeMap<PlayerId, ResourceHand> {
    let payouts = production_for_roll(board, total);
    for (id, hand) in &payouts {
        if let Some(player) = ledger.get_mut(*id) {
            player.resources.add_hand(hand);
            debug!(player = *id, cards = hand.total(), "production paid");
        }
    }
    payouts
}

/// Everyone holding more than `limit` cards loses half (rounded down).
///
/// Each discarded card is taken from a kind chosen uniformly among the kinds
/// the player still holds. Returns what each affected player lost.
pub fn enforce_discards<R: Rng>(
    ledger: &mut PlayerLedger,
    limit: u32,
    rng: &mut R,
) -> Vec<(PlayerId, ResourceHand)> {
    let mut discarded = Vec::new();
    for player in ledger.iter_mut() {
        let total = player.resources.total();
        if total <= limit {
            continue;
        }
        let mut lost = ResourceHand::new();
        for _ in 0..total / 2 {
            match player.resources.discard_random_kind(rng) {
                Some(r) => lost.add(r, 1),
                None => break,
            }
        }
        info!(player = player.id, held = total, lost = lost.total(), "discarded on seven");
        discarded.push((player.id, lost));
    }
    discarded
}

/// Players other than `mover` with a building on a corner of `hex`
pub fn robbery_candidates(board: &Board, hex: HexId, mover: PlayerId) -> Vec<PlayerId> {
    board
        .players_adjacent_to_hex(hex)
        .into_iter()
        .filter(|p| *p != mover)
        .collect()
}

/// A card taken by the robber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theft {
    pub victim: PlayerId,
    /// None when the victim had nothing to take
    pub resource: Option<Resource>,
}

/// Outcome of a robber move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobberMove {
    pub from: Option<HexId>,
    pub to: HexId,
    pub theft: Option<Theft>,
}

/// Can the robber go to `hex`?
pub fn check_robber_target(board: &Board, hex: HexId) -> Result<(), Rejection> {
    let target = board
        .hex(hex)
        .ok_or(Rejection::InvalidTarget(EntityRef::Hex(hex)))?;
    if target.has_robber {
        return Err(Rejection::RobberAlreadyPresent);
    }
    Ok(())
}

/// Move the robber and steal one card for `mover`.
///
/// A requested victim is used when they are a valid candidate; otherwise a
/// candidate is drawn at random. No theft happens without candidates.
pub fn move_robber<R: Rng>(
    board: &mut Board,
    ledger: &mut PlayerLedger,
    mover: PlayerId,
    hex: HexId,
    requested_victim: Option<PlayerId>,
    rng: &mut R,
) -> Result<RobberMove, Rejection> {
    if !ledger.contains(mover) {
        return Err(Rejection::InvalidPlayer(mover));
    }
    check_robber_target(board, hex)?;

    let from = board.move_robber(hex);
    let candidates = robbery_candidates(board, hex, mover);
    let victim = match requested_victim {
        Some(v) if candidates.contains(&v) => Some(v),
        Some(v) => {
            warn!(player = mover, requested = v, %hex, "requested victim has no building there");
            candidates.choose(rng).copied()
        }
        None => candidates.choose(rng).copied(),
    };

    let theft = victim.map(|victim| {
        let resource = ledger
            .get_mut(victim)
            .and_then(|p| p.resources.steal_random(rng));
        if let (Some(r), Some(thief)) = (resource, ledger.get_mut(mover)) {
            thief.resources.add(r, 1);
        }
        Theft { victim, resource }
    });

    info!(player = mover, to = %hex, victim = ?theft.map(|t| t.victim), "robber moved");
    Ok(RobberMove {
        from,
        to: hex,
        theft,
    })
}
