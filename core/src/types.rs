use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Row-major position of an area, `y * width + x`.
pub type AreaIndex = usize;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

/// Boards are stored as `[height, width]` so the flat slice is row-major.
impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Adjacency rule of a board, fixed when the board is constructed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Classic grid, up to 8 neighbors.
    #[default]
    Square,
    /// Hexagonal cells in "odd-r" offset layout (odd rows shifted right), up to 6 neighbors.
    Hexagonal,
}

impl Topology {
    pub const fn max_neighbors(self) -> u8 {
        match self {
            Self::Square => 8,
            Self::Hexagonal => 6,
        }
    }

    fn displacements(self, row: Coord) -> &'static [(i16, i16)] {
        match self {
            Self::Square => &SQUARE_DISPLACEMENTS,
            Self::Hexagonal if row % 2 == 0 => &HEX_EVEN_ROW_DISPLACEMENTS,
            Self::Hexagonal => &HEX_ODD_ROW_DISPLACEMENTS,
        }
    }
}

const SQUARE_DISPLACEMENTS: [(i16, i16); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const HEX_EVEN_ROW_DISPLACEMENTS: [(i16, i16); 6] =
    [(-1, -1), (0, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

const HEX_ODD_ROW_DISPLACEMENTS: [(i16, i16); 6] =
    [(0, -1), (1, -1), (-1, 0), (1, 0), (0, 1), (1, 1)];

/// Shape of a board: its size and adjacency rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub size: Coord2,
    pub topology: Topology,
}

impl Geometry {
    pub const fn new(size: Coord2, topology: Topology) -> Self {
        Self { size, topology }
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Shape for `ndarray` constructors.
    pub fn nd_shape(&self) -> [usize; 2] {
        self.size.to_nd_index()
    }

    pub fn contains(&self, index: AreaIndex) -> bool {
        index < self.total_cells() as usize
    }

    /// Converts a row-major index to `(x, y)`, the caller is expected to have checked bounds.
    pub fn coords_of(&self, index: AreaIndex) -> Coord2 {
        let width = usize::from(self.size.0);
        ((index % width) as Coord, (index / width) as Coord)
    }

    pub fn index_of(&self, (x, y): Coord2) -> Option<AreaIndex> {
        if x < self.size.0 && y < self.size.1 {
            Some(usize::from(y) * usize::from(self.size.0) + usize::from(x))
        } else {
            None
        }
    }

    pub fn nd_index(&self, index: AreaIndex) -> [usize; 2] {
        self.coords_of(index).to_nd_index()
    }

    pub fn iter_neighbors(&self, index: AreaIndex) -> NeighborIter {
        let center = self.coords_of(index);
        NeighborIter::new(center, self.size, self.topology.displacements(center.1))
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i16, i16), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

/// Iterates the in-bounds neighbors of an area, yielding row-major indices.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    displacements: &'static [(i16, i16)],
    index: u8,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2, displacements: &'static [(i16, i16)]) -> Self {
        Self {
            center,
            bounds,
            displacements,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = AreaIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *self.displacements.get(usize::from(self.index))?;
            self.index += 1;

            if let Some((x, y)) = apply_delta(self.center, delta, self.bounds) {
                return Some(usize::from(y) * usize::from(self.bounds.0) + usize::from(x));
            }
        }
    }
}
