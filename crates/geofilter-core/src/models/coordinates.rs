//! Coordinate positions and arbitrarily nested coordinate trees.
//!
//! A tree node is a leaf iff its first element is not itself a sequence, so
//! `[x, y]` is a point while `[[x, y], [x, y]]` is a line. Depth is never
//! fixed by geometry type; traversal recurses until it meets a leaf.

use serde::{Deserialize, Serialize};

/// A single coordinate. Components may be `null`, and a position may hold
/// fewer than two components; such positions are carried through untouched
/// by every transform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub Vec<Option<f64>>);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(vec![Some(x), Some(y)])
    }

    pub fn x(&self) -> Option<f64> {
        self.0.first().copied().flatten()
    }

    pub fn y(&self) -> Option<f64> {
        self.0.get(1).copied().flatten()
    }

    /// Both planar components, if both are present
    pub fn xy(&self) -> Option<(f64, f64)> {
        Some((self.x()?, self.y()?))
    }

    /// Copy of this position with x and y replaced; trailing components are kept
    pub fn with_xy(&self, x: f64, y: f64) -> Self {
        let mut components = self.0.clone();
        if components.len() < 2 {
            components.resize(2, None);
        }
        components[0] = Some(x);
        components[1] = Some(y);
        Self(components)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All components as plain numbers, if none of them is null
    pub fn to_numbers(&self) -> Option<Vec<f64>> {
        self.0.iter().copied().collect()
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A coordinate, or an ordered sequence of coordinate trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateTree {
    Leaf(Position),
    Branch(Vec<CoordinateTree>),
}

impl CoordinateTree {
    pub fn point(x: f64, y: f64) -> Self {
        CoordinateTree::Leaf(Position::new(x, y))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, CoordinateTree::Leaf(_))
    }

    /// Nesting depth: 0 for a point, 1 for a line, 2 for a polygon, 3 for a multipolygon
    pub fn depth(&self) -> usize {
        match self {
            CoordinateTree::Leaf(_) => 0,
            CoordinateTree::Branch(children) => {
                1 + children.first().map(CoordinateTree::depth).unwrap_or(0)
            }
        }
    }

    /// Number of leaf positions in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            CoordinateTree::Leaf(_) => 1,
            CoordinateTree::Branch(children) => children.iter().map(CoordinateTree::leaf_count).sum(),
        }
    }

    pub(crate) fn as_position(&self) -> Option<Vec<f64>> {
        match self {
            CoordinateTree::Leaf(position) => position.to_numbers(),
            CoordinateTree::Branch(_) => None,
        }
    }

    pub(crate) fn as_positions(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            CoordinateTree::Branch(children) => children.iter().map(Self::as_position).collect(),
            CoordinateTree::Leaf(_) => None,
        }
    }

    pub(crate) fn as_rings(&self) -> Option<Vec<Vec<Vec<f64>>>> {
        match self {
            CoordinateTree::Branch(children) => children.iter().map(Self::as_positions).collect(),
            CoordinateTree::Leaf(_) => None,
        }
    }

    pub(crate) fn as_polygons(&self) -> Option<Vec<Vec<Vec<Vec<f64>>>>> {
        match self {
            CoordinateTree::Branch(children) => children.iter().map(Self::as_rings).collect(),
            CoordinateTree::Leaf(_) => None,
        }
    }
}

impl From<Position> for CoordinateTree {
    fn from(position: Position) -> Self {
        CoordinateTree::Leaf(position)
    }
}

impl From<[f64; 2]> for CoordinateTree {
    fn from(coordinate: [f64; 2]) -> Self {
        CoordinateTree::Leaf(coordinate.into())
    }
}

impl<T: Into<CoordinateTree>> From<Vec<T>> for CoordinateTree {
    fn from(children: Vec<T>) -> Self {
        CoordinateTree::Branch(children.into_iter().map(Into::into).collect())
    }
}
