//! Clamping coordinate trees to a valid extent.
//!
//! Clamping is per axis: x is pulled into `[xmin, xmax]` and y into
//! `[ymin, ymax]` independently. This is not geometric clipping against the
//! extent's boundary.

use crate::transform::{frames_match, Reprojector};
use crate::traverse::{map_coordinates, some_coordinates, try_some_coordinates};
use geofilter_core::error::Result;
use geofilter_core::models::{CoordinateTree, Extent, Position};

/// Clamp every leaf into `extent`. Null components are left alone.
///
/// An inverted extent never panics; values above `max` are pulled to `max`
/// first.
pub fn clip_to_extent(tree: &CoordinateTree, extent: &Extent) -> CoordinateTree {
    map_coordinates(tree, &|position: &Position| clamp_position(position, extent))
}

/// True if any leaf with both components lies outside `extent`
pub fn has_out_of_bounds(tree: &CoordinateTree, extent: &Extent) -> bool {
    some_coordinates(tree, &|position: &Position| is_outside(position, extent))
}

fn clamp_position(position: &Position, extent: &Extent) -> Position {
    let mut components = position.0.clone();
    if let Some(Some(x)) = components.first_mut() {
        *x = extent.clamp_x(*x);
    }
    if let Some(Some(y)) = components.get_mut(1) {
        *y = extent.clamp_y(*y);
    }
    Position(components)
}

fn is_outside(position: &Position, extent: &Extent) -> bool {
    position.xy().is_some_and(|(x, y)| !extent.contains(x, y))
}

/// Frame-aware bounds detection and clipping.
///
/// An extent is expressed in some frame (usually geographic WGS 84) that may
/// differ from the frame of the coordinates being tested. When they differ,
/// leaves are reprojected into the extent's frame before being compared.
#[derive(Clone)]
pub struct BoundsClipper {
    reprojector: Reprojector,
}

impl BoundsClipper {
    pub fn new(reprojector: Reprojector) -> Self {
        Self { reprojector }
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    /// Whether any leaf of `tree` (in `tree_wkt`) falls outside `extent`
    /// (in `extent_wkt`). Leaves are projected one at a time and the walk
    /// stops at the first offender.
    pub fn has_out_of_bounds(
        &self,
        tree: &CoordinateTree,
        extent: &Extent,
        tree_wkt: &str,
        extent_wkt: &str,
    ) -> Result<bool> {
        if frames_match(tree_wkt, extent_wkt) {
            return Ok(has_out_of_bounds(tree, extent));
        }

        try_some_coordinates(tree, &|position: &Position| {
            let projected = self.reprojector.project_position(position, tree_wkt, extent_wkt)?;
            Ok(is_outside(&projected, extent))
        })
    }

    /// Clamp `tree` to `extent`, returning coordinates in `tree_wkt`.
    ///
    /// Across frames the whole tree is reprojected into `extent_wkt`,
    /// clamped, then reprojected back.
    pub fn clip(
        &self,
        tree: &CoordinateTree,
        extent: &Extent,
        tree_wkt: &str,
        extent_wkt: &str,
    ) -> Result<CoordinateTree> {
        if frames_match(tree_wkt, extent_wkt) {
            return Ok(clip_to_extent(tree, extent));
        }

        let in_extent_frame = self.reprojector.reproject(tree, tree_wkt, extent_wkt)?;
        let clamped = clip_to_extent(&in_extent_frame, extent);
        self.reprojector.reproject(&clamped, extent_wkt, tree_wkt)
    }

    /// Clip only when something is out of bounds; `None` means the tree was
    /// already within `extent`
    pub fn clip_if_needed(
        &self,
        tree: &CoordinateTree,
        extent: &Extent,
        tree_wkt: &str,
        extent_wkt: &str,
    ) -> Result<Option<CoordinateTree>> {
        if !self.has_out_of_bounds(tree, extent, tree_wkt, extent_wkt)? {
            return Ok(None);
        }
        self.clip(tree, extent, tree_wkt, extent_wkt).map(Some)
    }
}
