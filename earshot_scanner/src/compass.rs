// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eight-point compass directions from map deltas.

use std::fmt;

use kurbo::Vec2;

/// One of the eight compass points.
///
/// Map coordinates use +x for east and +y for north.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Compass {
    /// North.
    North,
    /// North-east.
    NorthEast,
    /// East.
    East,
    /// South-east.
    SouthEast,
    /// South.
    South,
    /// South-west.
    SouthWest,
    /// West.
    West,
    /// North-west.
    NorthWest,
}

impl Compass {
    /// All points, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Bucket the direction of `delta` into a 45° sector centred on a compass point.
    ///
    /// Returns `None` for a zero or non-finite vector.
    ///
    /// ```rust
    /// use earshot_scanner::Compass;
    /// use kurbo::Vec2;
    ///
    /// assert_eq!(Compass::from_delta(Vec2::new(0.0, 5.0)), Some(Compass::North));
    /// assert_eq!(Compass::from_delta(Vec2::new(3.0, -3.0)), Some(Compass::SouthEast));
    /// assert_eq!(Compass::from_delta(Vec2::ZERO), None);
    /// ```
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        if !delta.is_finite() || delta.hypot2() == 0.0 {
            return None;
        }
        // Clockwise from north, in [0, 360).
        let bearing = (90.0 - delta.atan2().to_degrees()).rem_euclid(360.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "The sector is a small non-negative integer in 0..=8."
        )]
        let sector = ((bearing + 22.5) / 45.0).floor() as usize;
        Some(Self::ALL[sector % Self::ALL.len()])
    }

    /// Lower-case spoken name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
