//! Board topology: hexes, vertices, roads and the grid cells they cover.
//!
//! This module contains:
//! - Entity ids and the resource/tile vocabulary
//! - Registration of hexes, vertices and roads (setup time only)
//! - Idempotent wiring of vertex-vertex and road-vertex adjacency
//! - Lookups by id and by grid cell
//! - Ownership mutation used by the rules engine once a build is validated
//!
//! Geometry is supplied entirely by the caller. The board never invents a
//! hex, vertex or road on its own; see [`crate::layout`] for a caller that
//! wires the standard 19-hex map.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Player identifier, in the order players were added to the ledger
pub type PlayerId = u8;

/// Rows in the drawing grid
pub const BOARD_ROWS: u16 = 13;
/// Columns in the drawing grid
pub const BOARD_COLS: u16 = 36;

/// Most corners a hex can have
const MAX_HEX_VERTICES: usize = 6;
/// Most hexes that can meet at a vertex
const MAX_VERTEX_HEXES: usize = 3;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a hex tile
    HexId,
    "hex_"
);
entity_id!(
    /// Identifies a vertex (settlement/city spot)
    VertexId,
    "v_"
);
entity_id!(
    /// Identifies a road slot between two vertices
    RoadId,
    "road_"
);

/// The five tradeable commodities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Brick,
    Wood,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types, in ledger order
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Wood,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Brick => "brick",
            Resource::Wood => "wood",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        };
        f.write_str(name)
    }
}

/// What a hex produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Never produces
    Desert,
}

/// A position on the drawing grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
}

impl Cell {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    fn in_bounds(&self) -> bool {
        self.row < BOARD_ROWS && self.col < BOARD_COLS
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Reference to any registered board entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Hex(HexId),
    Vertex(VertexId),
    Road(RoadId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Hex(id) => id.fmt(f),
            EntityRef::Vertex(id) => id.fmt(f),
            EntityRef::Road(id) => id.fmt(f),
        }
    }
}

/// Errors raised while wiring the board.
///
/// These indicate a mis-built board, not a player mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TopologyError {
    #[error("{0} is already registered")]
    Duplicate(EntityRef),

    #[error("{0} is not registered")]
    Unknown(EntityRef),

    #[error("{0} cannot be linked to itself")]
    SelfLink(VertexId),

    #[error("{road} is already wired to {existing:?}")]
    RoadRewired { road: RoadId, existing: [VertexId; 2] },

    #[error("cell {0} is outside the board grid")]
    CellOutOfBounds(Cell),

    #[error("cell {cell} already belongs to {owner}")]
    CellTaken { cell: Cell, owner: EntityRef },

    #[error("dice number {0} is not a valid trigger (2-12, never 7)")]
    InvalidDiceNumber(u8),

    #[error("{0} lists more neighbours than the geometry allows")]
    TooManyNeighbors(EntityRef),

    #[error("{0} must touch at least one hex")]
    IsolatedVertex(VertexId),

    #[error("the robber is already on {0}")]
    RobberAlreadyPlaced(HexId),

    #[error("expected {expected} tiles, got {found}")]
    TileCount { expected: usize, found: usize },
}

/// Attributes supplied when registering a hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexSpec {
    pub kind: TileKind,
    /// Dice trigger, absent for the desert
    pub dice_number: Option<u8>,
    #[serde(default)]
    pub has_robber: bool,
    /// Corner vertices, in drawing order
    #[serde(default)]
    pub vertices: Vec<VertexId>,
    /// Grid cells covered by the tile
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl HexSpec {
    /// A producing hex
    pub fn resource(resource: Resource, dice_number: u8) -> Self {
        Self {
            kind: TileKind::Resource(resource),
            dice_number: Some(dice_number),
            has_robber: false,
            vertices: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// The desert, which starts with the robber
    pub fn desert() -> Self {
        Self {
            kind: TileKind::Desert,
            dice_number: None,
            has_robber: true,
            vertices: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn with_vertices(mut self, vertices: impl IntoIterator<Item = VertexId>) -> Self {
        self.vertices = vertices.into_iter().collect();
        self
    }

    pub fn with_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells = cells.into_iter().collect();
        self
    }
}

/// A registered hex tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub id: HexId,
    pub kind: TileKind,
    pub dice_number: Option<u8>,
    pub has_robber: bool,
    pub vertices: Vec<VertexId>,
    pub cells: Vec<Cell>,
}

impl Hex {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }

    /// Whether a roll of `total` makes this hex pay out
    pub fn produces_on(&self, total: u8) -> bool {
        self.dice_number == Some(total) && !self.has_robber && self.resource().is_some()
    }
}

/// What's built on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum VertexBuilding {
    #[default]
    Empty,
    /// 1 VP, 1 resource per adjacent producing hex
    Settlement(PlayerId),
    /// 2 VP, 2 resources per adjacent producing hex
    City(PlayerId),
}

impl VertexBuilding {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            VertexBuilding::Empty => None,
            VertexBuilding::Settlement(p) | VertexBuilding::City(p) => Some(*p),
        }
    }

    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        self.resource_multiplier()
    }

    /// How many cards each producing neighbour yields
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }
}

/// A registered vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub cell: Option<Cell>,
    pub building: VertexBuilding,
    pub adjacent_hexes: Vec<HexId>,
    pub adjacent_vertices: Vec<VertexId>,
    pub adjacent_roads: Vec<RoadId>,
}

impl Vertex {
    pub fn owner(&self) -> Option<PlayerId> {
        self.building.owner()
    }
}

/// A registered road slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub cell: Option<Cell>,
    pub owner: Option<PlayerId>,
    /// The two vertices joined, once wired
    pub endpoints: Option<[VertexId; 2]>,
}

impl Road {
    /// Whether `vertex` is one of this road's endpoints
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.endpoints.is_some_and(|ends| ends.contains(&vertex))
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// The board: every registered entity plus the cell index
#[derive(Debug, Clone, Default)]
pub struct Board {
    hexes: BTreeMap<HexId, Hex>,
    vertices: BTreeMap<VertexId, Vertex>,
    roads: BTreeMap<RoadId, Road>,
    cells: HashMap<Cell, EntityRef>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Registration ====================

    /// Register a hex tile and claim its cells
    pub fn register_hex(&mut self, id: HexId, tile: HexSpec) -> Result<&Hex, TopologyError> {
        let entity = EntityRef::Hex(id);
        if self.hexes.contains_key(&id) {
            return Err(TopologyError::Duplicate(entity));
        }
        if let Some(n) = tile.dice_number {
            if !(2..=12).contains(&n) || n == 7 {
                return Err(TopologyError::InvalidDiceNumber(n));
            }
        }
        if tile.has_robber {
            if let Some(existing) = self.robber_hex() {
                return Err(TopologyError::RobberAlreadyPlaced(existing));
            }
        }
        let mut vertices = Vec::with_capacity(tile.vertices.len());
        for v in tile.vertices {
            push_unique(&mut vertices, v);
        }
        if vertices.len() > MAX_HEX_VERTICES {
            return Err(TopologyError::TooManyNeighbors(entity));
        }
        self.claim_cells(&tile.cells, entity)?;

        let hex = Hex {
            id,
            kind: tile.kind,
            dice_number: tile.dice_number,
            has_robber: tile.has_robber,
            vertices,
            cells: tile.cells,
        };
        Ok(&*self.hexes.entry(id).or_insert(hex))
    }

    /// Register a vertex with the hexes it touches
    pub fn register_vertex(
        &mut self,
        id: VertexId,
        cell: Option<Cell>,
        adjacent_hexes: &[HexId],
    ) -> Result<&Vertex, TopologyError> {
        let entity = EntityRef::Vertex(id);
        if self.vertices.contains_key(&id) {
            return Err(TopologyError::Duplicate(entity));
        }
        if adjacent_hexes.is_empty() {
            return Err(TopologyError::IsolatedVertex(id));
        }
        let mut hexes = Vec::with_capacity(adjacent_hexes.len());
        for &hex in adjacent_hexes {
            if !self.hexes.contains_key(&hex) {
                return Err(TopologyError::Unknown(EntityRef::Hex(hex)));
            }
            push_unique(&mut hexes, hex);
        }
        if hexes.len() > MAX_VERTEX_HEXES {
            return Err(TopologyError::TooManyNeighbors(entity));
        }
        self.claim_cells(cell.as_slice(), entity)?;

        let vertex = Vertex {
            id,
            cell,
            building: VertexBuilding::Empty,
            adjacent_hexes: hexes,
            adjacent_vertices: Vec::new(),
            adjacent_roads: Vec::new(),
        };
        Ok(&*self.vertices.entry(id).or_insert(vertex))
    }

    /// Register a road, optionally wiring it to its endpoints straight away
    pub fn register_road(
        &mut self,
        id: RoadId,
        cell: Option<Cell>,
        endpoints: Option<(VertexId, VertexId)>,
    ) -> Result<&Road, TopologyError> {
        let entity = EntityRef::Road(id);
        if self.roads.contains_key(&id) {
            return Err(TopologyError::Duplicate(entity));
        }
        if let Some((a, b)) = endpoints {
            self.check_road_pair(a, b)?;
        }
        self.claim_cells(cell.as_slice(), entity)?;

        self.roads.insert(
            id,
            Road {
                id,
                cell,
                owner: None,
                endpoints: None,
            },
        );
        if let Some((a, b)) = endpoints {
            self.link_road_to_vertices(id, a, b)?;
        }
        self.road(id).ok_or(TopologyError::Unknown(entity))
    }

    /// Mark two vertices as neighbours (symmetric, idempotent)
    pub fn link_vertices(&mut self, a: VertexId, b: VertexId) -> Result<(), TopologyError> {
        self.check_road_pair(a, b)?;
        if let Some(va) = self.vertices.get_mut(&a) {
            push_unique(&mut va.adjacent_vertices, b);
        }
        if let Some(vb) = self.vertices.get_mut(&b) {
            push_unique(&mut vb.adjacent_vertices, a);
        }
        Ok(())
    }

    /// Wire a road to its two endpoints and record it on both vertices.
    ///
    /// Re-linking the same pair (in either order) is a no-op; a road can
    /// never be moved to a different pair.
    pub fn link_road_to_vertices(
        &mut self,
        road: RoadId,
        a: VertexId,
        b: VertexId,
    ) -> Result<(), TopologyError> {
        self.check_road_pair(a, b)?;
        let slot = self
            .roads
            .get_mut(&road)
            .ok_or(TopologyError::Unknown(EntityRef::Road(road)))?;
        match slot.endpoints {
            Some(existing) if existing == [a, b] || existing == [b, a] => {}
            Some(existing) => return Err(TopologyError::RoadRewired { road, existing }),
            None => slot.endpoints = Some([a, b]),
        }
        for v in [a, b] {
            if let Some(vertex) = self.vertices.get_mut(&v) {
                push_unique(&mut vertex.adjacent_roads, road);
            }
        }
        Ok(())
    }

    fn check_road_pair(&self, a: VertexId, b: VertexId) -> Result<(), TopologyError> {
        for v in [a, b] {
            if !self.vertices.contains_key(&v) {
                return Err(TopologyError::Unknown(EntityRef::Vertex(v)));
            }
        }
        if a == b {
            return Err(TopologyError::SelfLink(a));
        }
        Ok(())
    }

    /// Claim every cell or none of them
    fn claim_cells(&mut self, cells: &[Cell], entity: EntityRef) -> Result<(), TopologyError> {
        for cell in cells {
            if !cell.in_bounds() {
                return Err(TopologyError::CellOutOfBounds(*cell));
            }
            if let Some(owner) = self.cells.get(cell) {
                if *owner != entity {
                    return Err(TopologyError::CellTaken {
                        cell: *cell,
                        owner: *owner,
                    });
                }
            }
        }
        for cell in cells {
            self.cells.insert(*cell, entity);
        }
        Ok(())
    }

    // ==================== Query Methods ====================

    pub fn hex(&self, id: HexId) -> Option<&Hex> {
        self.hexes.get(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(&id)
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    /// Resolve a grid cell to whatever was registered there
    pub fn entity_at(&self, cell: Cell) -> Option<EntityRef> {
        self.cells.get(&cell).copied()
    }

    /// The hex currently holding the robber
    pub fn robber_hex(&self) -> Option<HexId> {
        self.hexes.values().find(|h| h.has_robber).map(|h| h.id)
    }

    /// Whether `player` owns any road ending at `vertex`
    pub fn vertex_has_player_road(&self, vertex: VertexId, player: PlayerId) -> bool {
        self.vertex(vertex).is_some_and(|v| {
            v.adjacent_roads
                .iter()
                .any(|r| self.road(*r).is_some_and(|road| road.owner == Some(player)))
        })
    }

    /// Players with a building on any corner of `hex`
    pub fn players_adjacent_to_hex(&self, hex: HexId) -> BTreeSet<PlayerId> {
        let Some(hex) = self.hex(hex) else {
            return BTreeSet::new();
        };
        hex.vertices
            .iter()
            .filter_map(|v| self.vertex(*v))
            .filter_map(Vertex::owner)
            .collect()
    }

    /// Roads owned by `player`
    pub fn roads_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Road> {
        self.roads.values().filter(move |r| r.owner == Some(player))
    }

    // ==================== Mutation Methods ====================

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub(crate) fn road_mut(&mut self, id: RoadId) -> Option<&mut Road> {
        self.roads.get_mut(&id)
    }

    /// Move the robber, returning where it came from
    pub(crate) fn move_robber(&mut self, to: HexId) -> Option<HexId> {
        let from = self.robber_hex();
        for hex in self.hexes.values_mut() {
            hex.has_robber = hex.id == to;
        }
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Two hexes sharing an edge; vertices 0..=3, one road between 1 and 2
    fn two_hex_board() -> Board {
        let mut board = Board::new();
        board
            .register_hex(
                HexId(0),
                HexSpec::resource(Resource::Wheat, 6)
                    .with_vertices([VertexId(0), VertexId(1), VertexId(2)])
                    .with_cells([Cell::new(3, 8), Cell::new(3, 9)]),
            )
            .unwrap();
        board
            .register_hex(HexId(1), HexSpec::desert().with_vertices([VertexId(1), VertexId(2), VertexId(3)]))
            .unwrap();
        board.register_vertex(VertexId(0), Some(Cell::new(2, 8)), &[HexId(0)]).unwrap();
        board.register_vertex(VertexId(1), Some(Cell::new(2, 10)), &[HexId(0), HexId(1)]).unwrap();
        board.register_vertex(VertexId(2), None, &[HexId(0), HexId(1)]).unwrap();
        board.register_vertex(VertexId(3), None, &[HexId(1)]).unwrap();
        board.register_road(RoadId(0), Some(Cell::new(2, 9)), None).unwrap();
        board
    }

    #[test]
    fn test_register_and_lookup() {
        let board = two_hex_board();
        assert_eq!(board.hex(HexId(0)).unwrap().resource(), Some(Resource::Wheat));
        assert_eq!(board.hex(HexId(1)).unwrap().resource(), None);
        assert_eq!(board.vertex(VertexId(1)).unwrap().adjacent_hexes, vec![HexId(0), HexId(1)]);
        assert!(board.hex(HexId(9)).is_none());
        assert!(board.vertex(VertexId(9)).is_none());
        assert!(board.road(RoadId(9)).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut board = two_hex_board();
        assert_eq!(
            board.register_vertex(VertexId(0), None, &[]).unwrap_err(),
            TopologyError::Duplicate(EntityRef::Vertex(VertexId(0)))
        );
        assert_eq!(
            board.register_road(RoadId(0), None, None).unwrap_err(),
            TopologyError::Duplicate(EntityRef::Road(RoadId(0)))
        );
    }

    #[test]
    fn test_vertex_requires_known_hexes() {
        let mut board = two_hex_board();
        assert_eq!(
            board.register_vertex(VertexId(7), None, &[]).unwrap_err(),
            TopologyError::IsolatedVertex(VertexId(7))
        );
        assert!(board.vertex(VertexId(7)).is_none());
        assert_eq!(
            board.register_vertex(VertexId(7), None, &[HexId(5)]).unwrap_err(),
            TopologyError::Unknown(EntityRef::Hex(HexId(5)))
        );
    }

    #[test]
    fn test_dice_number_validation() {
        let mut board = Board::new();
        assert_eq!(
            board.register_hex(HexId(0), HexSpec::resource(Resource::Ore, 7)).unwrap_err(),
            TopologyError::InvalidDiceNumber(7)
        );
        assert_eq!(
            board.register_hex(HexId(0), HexSpec::resource(Resource::Ore, 13)).unwrap_err(),
            TopologyError::InvalidDiceNumber(13)
        );
    }

    #[test]
    fn test_only_one_robber() {
        let mut board = two_hex_board();
        assert_eq!(board.robber_hex(), Some(HexId(1)));
        assert_eq!(
            board.register_hex(HexId(2), HexSpec::desert()).unwrap_err(),
            TopologyError::RobberAlreadyPlaced(HexId(1))
        );
    }

    #[test]
    fn test_link_vertices_is_symmetric_and_idempotent() {
        let mut board = two_hex_board();
        board.link_vertices(VertexId(0), VertexId(1)).unwrap();
        board.link_vertices(VertexId(1), VertexId(0)).unwrap();
        board.link_vertices(VertexId(0), VertexId(1)).unwrap();

        assert_eq!(board.vertex(VertexId(0)).unwrap().adjacent_vertices, vec![VertexId(1)]);
        assert_eq!(board.vertex(VertexId(1)).unwrap().adjacent_vertices, vec![VertexId(0)]);
        assert_eq!(
            board.link_vertices(VertexId(0), VertexId(0)).unwrap_err(),
            TopologyError::SelfLink(VertexId(0))
        );
    }

    #[test]
    fn test_link_road_populates_vertices_once() {
        let mut board = two_hex_board();
        board.link_road_to_vertices(RoadId(0), VertexId(1), VertexId(2)).unwrap();
        board.link_road_to_vertices(RoadId(0), VertexId(2), VertexId(1)).unwrap();

        assert_eq!(board.road(RoadId(0)).unwrap().endpoints, Some([VertexId(1), VertexId(2)]));
        assert_eq!(board.vertex(VertexId(1)).unwrap().adjacent_roads, vec![RoadId(0)]);
        assert_eq!(board.vertex(VertexId(2)).unwrap().adjacent_roads, vec![RoadId(0)]);
        assert!(board.vertex(VertexId(0)).unwrap().adjacent_roads.is_empty());
    }

    #[test]
    fn test_road_pair_is_immutable_once_wired() {
        let mut board = two_hex_board();
        board.link_road_to_vertices(RoadId(0), VertexId(1), VertexId(2)).unwrap();
        assert_eq!(
            board.link_road_to_vertices(RoadId(0), VertexId(2), VertexId(3)).unwrap_err(),
            TopologyError::RoadRewired {
                road: RoadId(0),
                existing: [VertexId(1), VertexId(2)],
            }
        );
        assert!(!board.vertex(VertexId(3)).unwrap().adjacent_roads.contains(&RoadId(0)));
    }

    #[test]
    fn test_register_road_with_endpoints_wires_it() {
        let mut board = two_hex_board();
        board.register_road(RoadId(1), None, Some((VertexId(2), VertexId(3)))).unwrap();
        assert!(board.road(RoadId(1)).unwrap().touches(VertexId(3)));
        assert_eq!(board.vertex(VertexId(3)).unwrap().adjacent_roads, vec![RoadId(1)]);
    }

    #[test]
    fn test_cell_lookup() {
        let board = two_hex_board();
        assert_eq!(board.entity_at(Cell::new(3, 9)), Some(EntityRef::Hex(HexId(0))));
        assert_eq!(board.entity_at(Cell::new(2, 10)), Some(EntityRef::Vertex(VertexId(1))));
        assert_eq!(board.entity_at(Cell::new(2, 9)), Some(EntityRef::Road(RoadId(0))));
        assert_eq!(board.entity_at(Cell::new(12, 35)), None);
    }

    #[test]
    fn test_cells_cannot_be_claimed_twice_or_out_of_grid() {
        let mut board = two_hex_board();
        assert_eq!(
            board.register_road(RoadId(5), Some(Cell::new(3, 8)), None).unwrap_err(),
            TopologyError::CellTaken {
                cell: Cell::new(3, 8),
                owner: EntityRef::Hex(HexId(0)),
            }
        );
        assert_eq!(
            board.register_road(RoadId(5), Some(Cell::new(13, 0)), None).unwrap_err(),
            TopologyError::CellOutOfBounds(Cell::new(13, 0))
        );
        // Failed registrations leave nothing behind
        assert!(board.road(RoadId(5)).is_none());
    }

    #[test]
    fn test_move_robber_keeps_exactly_one() {
        let mut board = two_hex_board();
        assert_eq!(board.move_robber(HexId(0)), Some(HexId(1)));
        assert_eq!(board.hexes().filter(|h| h.has_robber).count(), 1);
        assert_eq!(board.robber_hex(), Some(HexId(0)));
    }

    #[test]
    fn test_players_adjacent_to_hex() {
        let mut board = two_hex_board();
        board.vertex_mut(VertexId(0)).unwrap().building = VertexBuilding::Settlement(1);
        board.vertex_mut(VertexId(1)).unwrap().building = VertexBuilding::City(2);
        board.vertex_mut(VertexId(3)).unwrap().building = VertexBuilding::Settlement(3);

        let players: Vec<_> = board.players_adjacent_to_hex(HexId(0)).into_iter().collect();
        assert_eq!(players, vec![1, 2]);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(HexId(3).to_string(), "hex_3");
        assert_eq!(VertexId(12).to_string(), "v_12");
        assert_eq!(RoadId(71).to_string(), "road_71");
    }
}
