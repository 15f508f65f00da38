//! Overlap detection and line-of-sight probes
//!
//! Entities are axis-aligned boxes. The simulation only needs to know when
//! two boxes start touching; there is no collision response.

use glam::Vec2;

use super::kind::EntityKind;
use super::state::Entity;

/// Whether two entities' boxes overlap (touching edges count)
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
}

/// All overlapping pairs as (lower id, higher id), sorted
pub fn overlapping_pairs(entities: &[Entity]) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            if overlaps(a, b) {
                pairs.push((a.id.min(b.id), a.id.max(b.id)));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// Pairs in `current` that were not touching in `previous` (both sorted)
pub fn new_contacts(previous: &[(u32, u32)], current: &[(u32, u32)]) -> Vec<(u32, u32)> {
    current
        .iter()
        .filter(|pair| previous.binary_search(pair).is_err())
        .copied()
        .collect()
}

/// Distance along a ray to an entity's box, if the ray hits it
///
/// Slab test; `dir` must be normalized.
pub fn ray_hit(origin: Vec2, dir: Vec2, max_dist: f32, target: &Entity) -> Option<f32> {
    let (min, max) = (target.min(), target.max());
    let mut t_near = 0.0_f32;
    let mut t_far = max_dist;

    for axis in 0..2 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    Some(t_near)
}

/// Whether a ray hits any entity of `kind` other than `exclude`
pub fn ray_blocked(
    entities: &[Entity],
    origin: Vec2,
    dir: Vec2,
    max_dist: f32,
    kind: EntityKind,
    exclude: u32,
) -> bool {
    entities
        .iter()
        .filter(|e| e.kind == kind && e.id != exclude)
        .any(|e| ray_hit(origin, dir, max_dist, e).is_some())
}
