// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural comparison of settings values in their persisted shape.

use serde::Serialize;

/// Compare two values by their serialized JSON form.
///
/// Objects match when they hold the same keys with deep-equal values, in any
/// order; arrays match element-wise in order. A value that fails to
/// serialize is never equal to anything.
pub fn is_deeply_equal<A, B>(a: &A, b: &B) -> bool
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
