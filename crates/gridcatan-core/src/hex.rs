//! Axial hex coordinates used to derive board wiring.
//!
//! The rules engine itself only sees opaque hex, vertex and road ids. These
//! coordinates exist so that [`crate::layout`] can compute which vertices a
//! hex touches and which vertices a road joins, then feed that wiring through
//! the ordinary registration calls.
//!
//! Pointy-top orientation: every vertex is either the North corner of exactly
//! one hex or the South corner of exactly one hex, so `(hex, direction)` is
//! already a unique name for a vertex.

use serde::{Deserialize, Serialize};

/// Which pole of a hex a vertex sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexDirection {
    North,
    South,
}

/// Side of a hex, declared clockwise from NorthEast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeDirection {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

impl EdgeDirection {
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::NorthEast,
        EdgeDirection::East,
        EdgeDirection::SouthEast,
        EdgeDirection::SouthWest,
        EdgeDirection::West,
        EdgeDirection::NorthWest,
    ];

    /// Position in [`EdgeDirection::ALL`]
    const fn index(self) -> usize {
        self as usize
    }

    /// Axial step `(dq, dr)` to the hex across this side
    const fn offset(self) -> (i32, i32) {
        match self {
            EdgeDirection::NorthEast => (1, -1),
            EdgeDirection::East => (1, 0),
            EdgeDirection::SouthEast => (0, 1),
            EdgeDirection::SouthWest => (-1, 1),
            EdgeDirection::West => (-1, 0),
            EdgeDirection::NorthWest => (0, -1),
        }
    }

    /// The same side seen from the other hex
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }
}

/// Axial hex position; `q` grows eastward, `r` grows south-eastward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub const fn neighbor(&self, direction: EdgeDirection) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Steps from the origin
    pub fn ring(&self) -> u32 {
        let s = -self.q - self.r;
        self.q.unsigned_abs().max(self.r.unsigned_abs()).max(s.unsigned_abs())
    }

    /// Every hex within `radius` rings of the origin.
    ///
    /// Ordered center first, then each ring clockwise from its western-most hex.
    pub fn disk(radius: u32) -> Vec<HexCoord> {
        let mut coords = vec![HexCoord::default()];
        for ring in 1..=radius as i32 {
            let mut cursor = HexCoord::new(-ring, 0);
            for direction in EdgeDirection::ALL {
                for _ in 0..ring {
                    coords.push(cursor);
                    cursor = cursor.neighbor(direction);
                }
            }
        }
        coords
    }

    /// Corners clockwise from North.
    ///
    /// Corner `i` and corner `i + 1` bound the side `EdgeDirection::ALL[i]`.
    pub fn vertices(&self) -> [VertexCoord; 6] {
        use EdgeDirection::*;
        use VertexDirection::*;
        [
            VertexCoord::new(*self, North),
            VertexCoord::new(self.neighbor(NorthEast), South),
            VertexCoord::new(self.neighbor(SouthEast), North),
            VertexCoord::new(*self, South),
            VertexCoord::new(self.neighbor(SouthWest), North),
            VertexCoord::new(self.neighbor(NorthWest), South),
        ]
    }

    /// Sides in [`EdgeDirection::ALL`] order, canonicalized
    pub fn edges(&self) -> [EdgeCoord; 6] {
        EdgeDirection::ALL.map(|direction| EdgeCoord::new(*self, direction))
    }
}

/// A corner where up to three hexes meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexCoord {
    pub hex: HexCoord,
    pub direction: VertexDirection,
}

impl VertexCoord {
    pub const fn new(hex: HexCoord, direction: VertexDirection) -> Self {
        Self { hex, direction }
    }

    /// The two sides of the owning hex that meet at this pole
    const fn flanks(&self) -> (EdgeDirection, EdgeDirection) {
        match self.direction {
            VertexDirection::North => (EdgeDirection::NorthWest, EdgeDirection::NorthEast),
            VertexDirection::South => (EdgeDirection::SouthWest, EdgeDirection::SouthEast),
        }
    }

    /// The owning hex followed by the two hexes across its flanks
    pub fn touching_hexes(&self) -> [HexCoord; 3] {
        let (west, east) = self.flanks();
        [self.hex, self.hex.neighbor(west), self.hex.neighbor(east)]
    }

    /// The three sides ending here
    pub fn touching_edges(&self) -> [EdgeCoord; 3] {
        let (west, east) = self.flanks();
        [
            EdgeCoord::new(self.hex, west),
            EdgeCoord::new(self.hex, east),
            EdgeCoord::new(self.hex.neighbor(west), EdgeDirection::East),
        ]
    }

    /// Corners one side away
    pub fn adjacent_vertices(&self) -> [VertexCoord; 3] {
        self.touching_edges().map(|edge| match edge.endpoints() {
            [a, b] if a == *self => b,
            [a, _] => a,
        })
    }
}

/// A side shared by two hexes, where a road goes.
///
/// [`EdgeCoord::new`] names each side from the hex with the smaller `(q, r)`,
/// so both spellings of a side compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub hex: HexCoord,
    pub direction: EdgeDirection,
}

impl EdgeCoord {
    pub fn new(hex: HexCoord, direction: EdgeDirection) -> Self {
        let across = hex.neighbor(direction);
        if hex <= across {
            Self { hex, direction }
        } else {
            Self {
                hex: across,
                direction: direction.opposite(),
            }
        }
    }

    /// The two corners bounding this side, clockwise around `self.hex`
    pub fn endpoints(&self) -> [VertexCoord; 2] {
        let corners = self.hex.vertices();
        let i = self.direction.index();
        [corners[i], corners[(i + 1) % 6]]
    }
}
