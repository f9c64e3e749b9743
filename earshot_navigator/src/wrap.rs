// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circular index arithmetic.

/// Wrap `index` into `0..count`.
///
/// Negative indices wrap from the end. Returns `None` when `count` is 0,
/// which is the empty-level sentinel.
///
/// ```rust
/// use earshot_navigator::wrap_index;
///
/// assert_eq!(wrap_index(-1, 3), Some(2));
/// assert_eq!(wrap_index(7, 3), Some(1));
/// assert_eq!(wrap_index(0, 0), None);
/// ```
pub fn wrap_index(index: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    // A level can never hold more than i64::MAX entries in practice.
    let modulus = i64::try_from(count).unwrap_or(i64::MAX);
    usize::try_from(index.rem_euclid(modulus)).ok()
}

/// Move `current` by `delta` positions in a circular list of `count` entries.
///
/// Stepping from no selection lands on the first entry going forward and the
/// last entry going backward.
pub fn step_index(current: Option<usize>, delta: i64, count: usize) -> Option<usize> {
    match current {
        _ if count == 0 => None,
        Some(i) => wrap_index(i64::try_from(i).unwrap_or(i64::MAX).saturating_add(delta), count),
        None if delta < 0 => Some(count - 1),
        None => Some(0),
    }
}

/// Move `current` by `delta` positions, stopping at either end.
pub(crate) fn clamp_step(current: Option<usize>, delta: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let last = count - 1;
    let from = current.unwrap_or(0);
    let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
    Some(if delta < 0 {
        from.saturating_sub(magnitude)
    } else {
        from.saturating_add(magnitude).min(last)
    })
}
