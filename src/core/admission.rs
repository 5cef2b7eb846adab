//! Geofence admission decision for clock-in.

use crate::core::geo::{Coord, distance_meters};
use crate::model::geofence::Geofence;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted { fence_id: u64, distance: f64 },
    Denied,
}

/// Decide whether `candidate` lies inside any of the given fences.
///
/// All fences are scored; among those whose center is within their own
/// radius of the candidate, the nearest center wins, so overlapping
/// zones resolve deterministically. Callers must pass only the fences
/// belonging to the worker's tenant admin. An empty slice always denies.
pub fn evaluate(candidate: Coord, fences: &[Geofence]) -> Admission {
    let mut best: Option<(u64, f64)> = None;

    for fence in fences {
        let center = Coord::new(fence.latitude, fence.longitude);
        let distance = distance_meters(candidate, center);
        if distance <= fence.radius {
            match best {
                Some((_, closest)) if closest <= distance => {}
                _ => best = Some((fence.id, distance)),
            }
        }
    }

    match best {
        Some((fence_id, distance)) => Admission::Admitted { fence_id, distance },
        None => Admission::Denied,
    }
}
