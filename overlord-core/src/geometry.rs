//! Hex board geometry with axial coordinates
//!
//! The battlefield is a fixed nine-row board of offset hexes. Even rows hold
//! 13 hexes, odd rows hold 12 and sit half a hex inward. Axial `q` shifts by
//! one every two rows, so the six neighbour offsets are identical everywhere.
//!
//! Row 0 is the top edge of the board, row 8 the bottom edge.

use std::fmt;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Number of rows on the board
pub const BOARD_ROWS: i32 = 9;

/// Hexes on an even row
pub const WIDE_ROW_LEN: i32 = 13;

/// Hexes on an odd row
pub const NARROW_ROW_LEN: i32 = 12;

/// Total number of playable hexes
pub const HEX_COUNT: usize = 113;

/// Section boundaries in doubled-column units. A hex whose doubled column
/// equals a boundary straddles the two sections it separates.
const LEFT_CENTER_BOUNDARY: i32 = 7;
const CENTER_RIGHT_BOUNDARY: i32 = 17;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn east(self) -> Self {
        self.neighbor(Direction::East)
    }

    pub fn northeast(self) -> Self {
        self.neighbor(Direction::NorthEast)
    }

    pub fn northwest(self) -> Self {
        self.neighbor(Direction::NorthWest)
    }

    pub fn west(self) -> Self {
        self.neighbor(Direction::West)
    }

    pub fn southwest(self) -> Self {
        self.neighbor(Direction::SouthWest)
    }

    pub fn southeast(self) -> Self {
        self.neighbor(Direction::SouthEast)
    }

    /// Step one hex in the given direction (may leave the board)
    pub fn neighbor(self, direction: Direction) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// All six neighbours, on-board or not
    pub fn neighbors(self) -> [HexCoord; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Distance between two hexes
    pub fn distance_to(self, other: HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Horizontal position in half-hex units from the left board edge
    pub fn doubled_column(self) -> i32 {
        2 * self.q + self.r
    }

    /// Hexes crossed by the straight line to `other`, endpoints excluded.
    ///
    /// `nudge` offsets every sample point so a line running exactly along a
    /// hex edge falls consistently to one side; call with a positive and a
    /// negative nudge to get both candidate paths.
    pub fn line_to(self, other: HexCoord, nudge: f64) -> Vec<HexCoord> {
        let steps = self.distance_to(other);
        let (aq, ar) = (self.q as f64 + nudge, self.r as f64 + nudge);
        let (bq, br) = (other.q as f64 + nudge, other.r as f64 + nudge);

        (1..steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                cube_round(aq + (bq - aq) * t, ar + (br - ar) * t)
            })
            .collect()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Row-major order: top row first, then left to right
impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn cube_round(q: f64, r: f64) -> HexCoord {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    HexCoord::new(rq as i32, rr as i32)
}

/// The six hex directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),  // E
    (1, -1), // NE
    (0, -1), // NW
    (-1, 0), // W
    (-1, 1), // SW
    (0, 1),  // SE
];

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn offset(self) -> (i32, i32) {
        DIRECTIONS[self as usize]
    }
}

/// Which edge of the board a player sits at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPosition {
    Bottom,
    Top,
}

impl PlayerPosition {
    /// Table index: 0 for Bottom, 1 for Top
    pub fn index(self) -> usize {
        match self {
            PlayerPosition::Bottom => 0,
            PlayerPosition::Top => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            PlayerPosition::Bottom => PlayerPosition::Top,
            PlayerPosition::Top => PlayerPosition::Bottom,
        }
    }

    /// Directions that step back toward this player's own board edge
    pub fn retreat_directions(self) -> [Direction; 2] {
        match self {
            PlayerPosition::Bottom => [Direction::SouthWest, Direction::SouthEast],
            PlayerPosition::Top => [Direction::NorthWest, Direction::NorthEast],
        }
    }
}

/// Board section, named from the owning player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Left,
    Center,
    Right,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Left, Section::Center, Section::Right];

    /// The same physical section as seen from the opposite board edge
    pub fn mirrored(self) -> Self {
        match self {
            Section::Left => Section::Right,
            Section::Center => Section::Center,
            Section::Right => Section::Left,
        }
    }
}

/// Precomputed board shape and section membership.
///
/// Membership is stored from the bottom player's view; the top player's
/// left and right are mirrored on lookup.
#[derive(Debug)]
pub struct BoardGeometry {
    hexes: Vec<HexCoord>,
    membership: FxHashMap<HexCoord, [bool; 3]>,
}

static GEOMETRY: OnceLock<BoardGeometry> = OnceLock::new();

impl BoardGeometry {
    /// The process-wide board geometry
    pub fn get() -> &'static BoardGeometry {
        GEOMETRY.get_or_init(BoardGeometry::build)
    }

    fn build() -> Self {
        let mut hexes = Vec::with_capacity(HEX_COUNT);
        let mut membership = FxHashMap::default();

        for r in 0..BOARD_ROWS {
            let (first, len) = row_bounds(r);
            for q in first..first + len {
                let hex = HexCoord::new(q, r);
                let col = hex.doubled_column();
                let sections = [
                    col <= LEFT_CENTER_BOUNDARY,
                    (LEFT_CENTER_BOUNDARY..=CENTER_RIGHT_BOUNDARY).contains(&col),
                    col >= CENTER_RIGHT_BOUNDARY,
                ];
                hexes.push(hex);
                membership.insert(hex, sections);
            }
        }

        Self { hexes, membership }
    }

    /// Is this hex on the board?
    pub fn contains(&self, hex: HexCoord) -> bool {
        self.membership.contains_key(&hex)
    }

    /// Is the hex in `section` as seen by the player at `position`?
    pub fn is_hex_in_section(&self, hex: HexCoord, section: Section, position: PlayerPosition) -> bool {
        let section = match position {
            PlayerPosition::Bottom => section,
            PlayerPosition::Top => section.mirrored(),
        };
        self.membership
            .get(&hex)
            .map_or(false, |sections| sections[section as usize])
    }

    /// Every section the hex belongs to from `position`'s point of view
    pub fn sections_of(&self, hex: HexCoord, position: PlayerPosition) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|&s| self.is_hex_in_section(hex, s, position))
            .collect()
    }

    /// On-board neighbours of a hex
    pub fn valid_neighbors(&self, hex: HexCoord) -> Vec<HexCoord> {
        hex.neighbors()
            .into_iter()
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// All playable hexes in row-major order
    pub fn all_hexes(&self) -> &[HexCoord] {
        &self.hexes
    }
}

/// First axial `q` and hex count of a row
fn row_bounds(r: i32) -> (i32, i32) {
    let len = if r % 2 == 0 { WIDE_ROW_LEN } else { NARROW_ROW_LEN };
    (-(r / 2), len)
}
