// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot Scanner: find things on the map by category and distance.
//!
//! The scanner is a fixed four-level specialization of the navigator idea:
//! category, subcategory, group and item. Items in a group are sorted by
//! distance from a reference point (usually the player's navigation cursor),
//! and the catalog is rebuilt in full on every open and every rescan because
//! the map may have changed arbitrarily in between.
//!
//! - [`ScanSource`]: pushes [`ScanEntry`]s into a [`CatalogBuilder`].
//! - [`ScanCatalog`]: the built, read-only, distance-sorted tree.
//! - [`SpatialScanner`]: the [`Handler`](earshot_dispatch::Handler) that
//!   cycles levels, moves the cursor to items and reports distance and
//!   [`Compass`] direction.
//!
//! Coordinates are map units with +x east and +y north, as [`kurbo::Point`]s.

mod catalog;
mod compass;
mod scanner;
mod source;

pub use catalog::{
    CatalogBuilder, REFERENCE_EPSILON, ScanCatalog, ScanCategory, ScanEntry, ScanGroup, ScanItem,
    ScanSubcategory,
};
pub use compass::Compass;
pub use scanner::{ScanLevel, SpatialScanner};
pub use source::ScanSource;
