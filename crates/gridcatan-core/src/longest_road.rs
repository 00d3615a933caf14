//! Longest Road.
//!
//! A player's roads form a graph where two roads are adjacent when they
//! share an endpoint that is not occupied by an opponent's building. The
//! length of a player's longest road is the longest simple path through
//! that graph, counted in roads.

use crate::board::{Board, PlayerId, RoadId};
use crate::player::PlayerLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Roads needed before the award is possible
pub const MINIMUM_LENGTH: u32 = 5;

/// Who holds the award after a recalculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestRoadStanding {
    pub holder: Option<PlayerId>,
    /// Length of the holder's road, or 0 without a holder
    pub length: u32,
    /// Every player's longest road, in turn order
    pub lengths: Vec<(PlayerId, u32)>,
}

/// Adjacency between one player's roads, indexed by position in `roads`
struct RoadGraph {
    roads: Vec<RoadId>,
    neighbors: Vec<Vec<usize>>,
}

impl RoadGraph {
    fn build(board: &Board, player: PlayerId) -> Self {
        let roads: Vec<RoadId> = board.roads_owned_by(player).map(|r| r.id).collect();
        let index: HashMap<RoadId, usize> =
            roads.iter().enumerate().map(|(i, r)| (*r, i)).collect();
        let mut neighbors = vec![Vec::new(); roads.len()];

        for vertex in board.vertices() {
            if vertex.owner().is_some_and(|o| o != player) {
                continue;
            }
            let here: Vec<usize> = vertex
                .adjacent_roads
                .iter()
                .filter_map(|r| index.get(r).copied())
                .collect();
            for (i, &a) in here.iter().enumerate() {
                for &b in &here[i + 1..] {
                    if !neighbors[a].contains(&b) {
                        neighbors[a].push(b);
                        neighbors[b].push(a);
                    }
                }
            }
        }
        Self { roads, neighbors }
    }

    /// Longest simple path, trying every road as a start
    fn longest_path(&self) -> u32 {
        let mut best = 0;
        let mut visited = vec![false; self.roads.len()];
        // (road, next neighbour to try)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.roads.len() {
            visited[start] = true;
            stack.push((start, 0));
            best = best.max(1);

            while let Some(frame) = stack.last_mut() {
                let road = frame.0;
                if let Some(&next) = self.neighbors[road].get(frame.1) {
                    frame.1 += 1;
                    if !visited[next] {
                        visited[next] = true;
                        stack.push((next, 0));
                        best = best.max(stack.len());
                    }
                } else {
                    visited[road] = false;
                    stack.pop();
                }
            }
        }
        best as u32
    }
}

/// Length of `player`'s longest continuous road
pub fn longest_road_length(board: &Board, player: PlayerId) -> u32 {
    RoadGraph::build(board, player).longest_path()
}

/// Work out who holds Longest Road.
///
/// Players are considered in turn order and a later player only takes the
/// lead with a strictly longer road, so ties stay with the earlier seat.
pub fn compute_standing(board: &Board, ledger: &PlayerLedger, minimum: u32) -> LongestRoadStanding {
    let mut holder = None;
    let mut length = 0;
    let mut lengths = Vec::with_capacity(ledger.len());

    for player in ledger.iter() {
        let len = longest_road_length(board, player.id);
        lengths.push((player.id, len));
        if len >= minimum && len > length {
            holder = Some(player.id);
            length = len;
        }
    }
    if holder.is_none() {
        length = 0;
    }
    LongestRoadStanding {
        holder,
        length,
        lengths,
    }
}

/// Recalculate the award, move the flag and refresh everyone's victory points
pub fn update_longest_road(
    board: &Board,
    ledger: &mut PlayerLedger,
    minimum: u32,
) -> LongestRoadStanding {
    let standing = compute_standing(board, ledger, minimum);
    for player in ledger.iter_mut() {
        player.has_longest_road = standing.holder == Some(player.id);
    }
    ledger.recompute_all_victory_points();
    standing
}
