use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display color of a filled cell or an offered piece.
///
/// The eight base colors are drawn uniformly at random when a piece is
/// generated. [`BlockColor::Power`] is the distinct gradient identifier given
/// to power-tagged pieces; it is assigned, never sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockColor {
    Cyan,
    Pink,
    Yellow,
    Green,
    Purple,
    Orange,
    Red,
    Blue,
    /// Gradient identifier used for power pieces instead of a base color.
    Power,
}

impl BlockColor {
    /// Number of base colors (excludes [`BlockColor::Power`]).
    pub const BASE_LEN: usize = 8;

    pub(crate) const BASE_COLORS: [Self; Self::BASE_LEN] = [
        BlockColor::Cyan,
        BlockColor::Pink,
        BlockColor::Yellow,
        BlockColor::Green,
        BlockColor::Purple,
        BlockColor::Orange,
        BlockColor::Red,
        BlockColor::Blue,
    ];

    /// Returns `true` for the eight base colors, `false` for [`BlockColor::Power`].
    #[must_use]
    pub fn is_base(self) -> bool {
        self != BlockColor::Power
    }
}

/// Samples uniformly among the eight base colors.
///
/// [`BlockColor::Power`] is never produced by sampling; the generator
/// overrides the color of power pieces explicitly.
impl Distribution<BlockColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BlockColor {
        BlockColor::BASE_COLORS[rng.random_range(0..BlockColor::BASE_LEN)]
    }
}

/// Area-effect carried by a power piece.
///
/// Every cell stamped by a power piece carries the same kind and triggers the
/// effect independently at its own coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerKind {
    /// Clears the 3×3 neighborhood around the cell, clipped to the board.
    Bomb,
    /// Clears the cell's entire row and entire column.
    Lightning,
    /// Clears every cell on the board sharing the cell's exact color.
    Rainbow,
    /// Clears the cell's entire column only.
    Drill,
}

impl PowerKind {
    /// Number of power kinds (4).
    pub const LEN: usize = 4;
}

impl Distribution<PowerKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PowerKind {
        match rng.random_range(0..PowerKind::LEN) {
            0 => PowerKind::Bomb,
            1 => PowerKind::Lightning,
            2 => PowerKind::Rainbow,
            _ => PowerKind::Drill,
        }
    }
}

/// Fixed boolean pattern of a piece. Footprints are never rotated.
///
/// Rows are stored top to bottom; every row has the same width. At least one
/// cell is occupied.
#[derive(Debug, PartialEq, Eq)]
pub struct Footprint {
    rows: &'static [&'static [bool]],
}

impl Footprint {
    const fn new(rows: &'static [&'static [bool]]) -> Self {
        Self { rows }
    }

    /// Number of rows in the bounding box.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the bounding box.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|&&c| c).count())
            .sum()
    }

    /// Iterates over occupied `(row, col)` offsets in row-major order.
    ///
    /// This order also defines the stamp order of cells during placement,
    /// which in turn fixes the order power effects are applied in.
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, &cell)| cell.then_some((r, c)))
        })
    }
}

/// The fixed catalog of 17 piece footprints.
///
/// Lines (1-4 cells, both orientations), corner triominoes, the T/plus
/// pieces, squares, and the two S/Z offsets.
pub(crate) const FOOTPRINTS: [Footprint; SHAPE_COUNT] = {
    const C: bool = true;
    const E: bool = false;
    [
        Footprint::new(&[&[C]]),
        Footprint::new(&[&[C, C]]),
        Footprint::new(&[&[C, C, C]]),
        Footprint::new(&[&[C, C, C, C]]),
        Footprint::new(&[&[C], &[C]]),
        Footprint::new(&[&[C], &[C], &[C]]),
        Footprint::new(&[&[C], &[C], &[C], &[C]]),
        Footprint::new(&[&[C, C], &[C, E]]),
        Footprint::new(&[&[C, E], &[C, C]]),
        Footprint::new(&[&[C, C], &[E, C]]),
        Footprint::new(&[&[E, C], &[C, C]]),
        Footprint::new(&[&[C, C, C], &[E, C, E]]),
        Footprint::new(&[&[C, E], &[C, C], &[C, E]]),
        Footprint::new(&[&[C, C], &[C, C]]),
        Footprint::new(&[&[C, C, C], &[C, C, C]]),
        Footprint::new(&[&[C, C, E], &[E, C, C]]),
        Footprint::new(&[&[E, C, C], &[C, C, E]]),
    ]
};

/// Number of footprints in the catalog.
pub const SHAPE_COUNT: usize = 17;

/// Maximum number of cells a single piece can occupy.
///
/// Used as the capacity bound for per-placement cell lists.
pub const MAX_PIECE_CELLS: usize = 9;

/// Index into the footprint catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeId(u8);

impl ShapeId {
    /// Creates a shape id, returning `None` when `index` is out of catalog range.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < SHAPE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the catalog footprint this id refers to.
    #[must_use]
    pub fn footprint(self) -> &'static Footprint {
        &FOOTPRINTS[self.0 as usize]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Samples a catalog index uniformly over the 17 footprints.
impl Distribution<ShapeId> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeId {
        #[expect(clippy::cast_possible_truncation)]
        let index = rng.random_range(0..SHAPE_COUNT) as u8;
        ShapeId(index)
    }
}

impl Serialize for ShapeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let index = u8::deserialize(deserializer)?;
        ShapeId::new(index).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "shape index must be 0-{}, got {index}",
                SHAPE_COUNT - 1
            ))
        })
    }
}

/// Identity of a generated piece, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub(crate) u64);

/// An immutable piece offered to the player.
///
/// A piece pairs a catalog footprint with a display color and an optional
/// power. It is consumed exactly once, at successful placement. Power pieces
/// always carry [`BlockColor::Power`] as their display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    shape: ShapeId,
    color: BlockColor,
    power: Option<PowerKind>,
}

impl Piece {
    pub(crate) fn new(
        id: PieceId,
        shape: ShapeId,
        color: BlockColor,
        power: Option<PowerKind>,
    ) -> Self {
        Self {
            id,
            shape,
            color,
            power,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    #[must_use]
    pub fn footprint(&self) -> &'static Footprint {
        self.shape.footprint()
    }

    #[must_use]
    pub fn color(&self) -> BlockColor {
        self.color
    }

    #[must_use]
    pub fn power(&self) -> Option<PowerKind> {
        self.power
    }

    /// Iterates over the absolute `(row, col)` cells the piece would occupy
    /// when its top-left bounding-box corner is at the given origin.
    ///
    /// Order matches [`Footprint::occupied_offsets`].
    pub fn occupied_positions(
        &self,
        origin_row: usize,
        origin_col: usize,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.footprint()
            .occupied_offsets()
            .map(move |(r, c)| (origin_row + r, origin_col + c))
    }
}
