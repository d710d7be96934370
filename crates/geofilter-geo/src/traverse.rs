//! Depth-agnostic traversal of coordinate trees.
//!
//! Every function recurses until it meets a leaf and never inspects the
//! leaf itself; callers decide what to do with short or null positions.

use geofilter_core::models::{CoordinateTree, Position};

/// Rebuild the tree with `f` applied to every leaf
pub fn map_coordinates<F>(tree: &CoordinateTree, f: &F) -> CoordinateTree
where
    F: Fn(&Position) -> Position,
{
    match tree {
        CoordinateTree::Leaf(position) => CoordinateTree::Leaf(f(position)),
        CoordinateTree::Branch(children) => {
            CoordinateTree::Branch(children.iter().map(|child| map_coordinates(child, f)).collect())
        }
    }
}

/// Like [`map_coordinates`], stopping at the first leaf that fails
pub fn try_map_coordinates<F, E>(tree: &CoordinateTree, f: &F) -> Result<CoordinateTree, E>
where
    F: Fn(&Position) -> Result<Position, E>,
{
    match tree {
        CoordinateTree::Leaf(position) => f(position).map(CoordinateTree::Leaf),
        CoordinateTree::Branch(children) => children
            .iter()
            .map(|child| try_map_coordinates(child, f))
            .collect::<Result<Vec<_>, E>>()
            .map(CoordinateTree::Branch),
    }
}

/// True if any leaf satisfies `predicate`, visiting depth-first left to right
/// and stopping at the first match
pub fn some_coordinates<P>(tree: &CoordinateTree, predicate: &P) -> bool
where
    P: Fn(&Position) -> bool,
{
    match tree {
        CoordinateTree::Leaf(position) => predicate(position),
        CoordinateTree::Branch(children) => {
            children.iter().any(|child| some_coordinates(child, predicate))
        }
    }
}

/// Fallible [`some_coordinates`]; an error aborts the walk
pub fn try_some_coordinates<P, E>(tree: &CoordinateTree, predicate: &P) -> Result<bool, E>
where
    P: Fn(&Position) -> Result<bool, E>,
{
    match tree {
        CoordinateTree::Leaf(position) => predicate(position),
        CoordinateTree::Branch(children) => {
            for child in children {
                if try_some_coordinates(child, predicate)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
