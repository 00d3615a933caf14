//! The standard 19-hex map, wired through the public registration calls.
//!
//! Hex ids follow [`HexCoord::disk`] order (center first). Vertex and road
//! ids are handed out in the order they are first met while walking those
//! hexes, corners and edges clockwise.

use crate::board::{Board, HexId, HexSpec, Resource, RoadId, TileKind, TopologyError, VertexId};
use crate::hex::{EdgeCoord, HexCoord, VertexCoord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter;

/// Rings around the center hex
pub const STANDARD_RADIUS: u32 = 2;

/// Dice numbers dealt to the 18 producing tiles
pub const STANDARD_NUMBERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Resource tiles in the standard set, the desert aside
const STANDARD_RESOURCES: [(Resource, usize); 5] = [
    (Resource::Sheep, 4),
    (Resource::Wheat, 4),
    (Resource::Wood, 4),
    (Resource::Brick, 3),
    (Resource::Ore, 3),
];

/// One tile before it is placed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub dice_number: Option<u8>,
}

impl Tile {
    pub fn resource(resource: Resource, dice_number: u8) -> Self {
        Self {
            kind: TileKind::Resource(resource),
            dice_number: Some(dice_number),
        }
    }

    pub fn desert() -> Self {
        Self {
            kind: TileKind::Desert,
            dice_number: None,
        }
    }

    fn hex_spec(&self) -> HexSpec {
        HexSpec {
            kind: self.kind,
            dice_number: self.dice_number,
            has_robber: self.kind == TileKind::Desert,
            vertices: Vec::new(),
            cells: Vec::new(),
        }
    }
}

/// Shuffle the 19 standard tiles and deal numbers to every non-desert tile
pub fn shuffled_tiles<R: Rng>(rng: &mut R) -> Vec<Tile> {
    let mut kinds: Vec<TileKind> = STANDARD_RESOURCES
        .iter()
        .flat_map(|(r, n)| iter::repeat(TileKind::Resource(*r)).take(*n))
        .chain(iter::once(TileKind::Desert))
        .collect();
    kinds.shuffle(rng);

    let mut numbers = STANDARD_NUMBERS.to_vec();
    numbers.shuffle(rng);

    kinds
        .into_iter()
        .map(|kind| match kind {
            TileKind::Desert => Tile::desert(),
            TileKind::Resource(_) => Tile {
                kind,
                dice_number: numbers.pop(),
            },
        })
        .collect()
}

/// Where each coordinate ended up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardLayout {
    hexes: BTreeMap<HexCoord, HexId>,
    vertices: BTreeMap<VertexCoord, VertexId>,
    roads: BTreeMap<EdgeCoord, RoadId>,
}

impl StandardLayout {
    pub fn hex(&self, coord: HexCoord) -> Option<HexId> {
        self.hexes.get(&coord).copied()
    }

    pub fn vertex(&self, coord: VertexCoord) -> Option<VertexId> {
        self.vertices.get(&coord).copied()
    }

    /// Road on an edge; any of the edge's two spellings works
    pub fn road(&self, coord: EdgeCoord) -> Option<RoadId> {
        self.roads
            .get(&EdgeCoord::new(coord.hex, coord.direction))
            .copied()
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    fn assign(coords: &[HexCoord]) -> Self {
        let mut layout = Self::default();
        for (i, coord) in coords.iter().enumerate() {
            layout.hexes.insert(*coord, HexId(i as u16));
        }
        for coord in coords {
            for vertex in coord.vertices() {
                let next = VertexId(layout.vertices.len() as u16);
                layout.vertices.entry(vertex).or_insert(next);
            }
            for edge in coord.edges() {
                let next = RoadId(layout.roads.len() as u16);
                layout.roads.entry(edge).or_insert(next);
            }
        }
        layout
    }
}

/// Build the standard map with freshly shuffled tiles
pub fn standard_board<R: Rng>(rng: &mut R) -> Result<(Board, StandardLayout), TopologyError> {
    board_from_tiles(&shuffled_tiles(rng))
}

/// Build the standard map with tiles laid out in hex-id order
pub fn board_from_tiles(tiles: &[Tile]) -> Result<(Board, StandardLayout), TopologyError> {
    let coords = HexCoord::disk(STANDARD_RADIUS);
    if tiles.len() != coords.len() {
        return Err(TopologyError::TileCount {
            expected: coords.len(),
            found: tiles.len(),
        });
    }
    let layout = StandardLayout::assign(&coords);
    let mut board = Board::new();

    for (i, (coord, tile)) in coords.iter().zip(tiles).enumerate() {
        let corners = coord.vertices().into_iter().filter_map(|v| layout.vertex(v));
        board.register_hex(HexId(i as u16), tile.hex_spec().with_vertices(corners))?;
    }

    for (coord, id) in &layout.vertices {
        let hexes: Vec<HexId> = coord
            .touching_hexes()
            .into_iter()
            .filter_map(|h| layout.hex(h))
            .collect();
        board.register_vertex(*id, None, &hexes)?;
    }

    for (coord, id) in &layout.vertices {
        for neighbor in coord.adjacent_vertices() {
            if let Some(other) = layout.vertex(neighbor) {
                board.link_vertices(*id, other)?;
            }
        }
    }

    for (edge, id) in &layout.roads {
        let [a, b] = edge.endpoints();
        let ends = layout.vertex(a).zip(layout.vertex(b));
        board.register_road(*id, None, ends)?;
    }

    Ok((board, layout))
}
