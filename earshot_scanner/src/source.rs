// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data seam between a scanner and the game world.

use earshot_navigator::Unavailable;
use kurbo::Point;

use crate::catalog::CatalogBuilder;

/// Game-side data for a [`SpatialScanner`](crate::SpatialScanner).
///
/// Closures of the shape `FnMut(&mut CatalogBuilder) -> Result<(), Unavailable>`
/// are sources too.
pub trait ScanSource {
    /// Push every scannable entry into `catalog`.
    fn scan(&mut self, catalog: &mut CatalogBuilder) -> Result<(), Unavailable>;

    /// Move the game's own navigation cursor to `position`.
    fn move_cursor(&mut self, position: Point) {
        let _ = position;
    }
}

impl<F> ScanSource for F
where
    F: FnMut(&mut CatalogBuilder) -> Result<(), Unavailable>,
{
    fn scan(&mut self, catalog: &mut CatalogBuilder) -> Result<(), Unavailable> {
        self(catalog)
    }
}
