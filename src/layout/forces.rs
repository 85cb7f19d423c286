use eframe::egui::{Vec2, vec2};

use super::quadtree::Quad;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    /// Share of the correction applied to the target; degree-weighted.
    pub(super) bias: f32,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) distance_min_sq: f32,
    pub(super) distance_max_sq: f32,
    pub(super) theta_sq: f32,
}

/// Deterministic stand-in for a random nudge when two points coincide.
pub(super) fn jiggle(seed: usize) -> f32 {
    let phase = ((seed as f32) * 0.618_034 + 0.37).fract();
    (phase - 0.5) * 1e-6
}

pub(super) fn link_bias(degrees: &[usize], source: usize, target: usize) -> f32 {
    let source_degree = degrees[source] as f32;
    let total = source_degree + degrees[target] as f32;
    if total <= 0.0 { 0.5 } else { source_degree / total }
}

pub(super) fn apply_links(
    links: &[Link],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    strength: f32,
    alpha: f32,
) {
    for (index, link) in links.iter().enumerate() {
        let (source, target) = (link.source, link.target);
        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.x == 0.0 {
            delta.x = jiggle(index);
        }
        if delta.y == 0.0 {
            delta.y = jiggle(index + 1);
        }

        let length = delta.length();
        let correction = delta * (((length - distance) / length) * alpha * strength);
        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

pub(super) fn apply_charge(
    tree: &Quad,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    params: ChargeParams,
    alpha: f32,
) {
    for index in 0..positions.len() {
        let mut impulse = Vec2::ZERO;
        accumulate_charge(tree, index, positions, params, alpha, &mut impulse);
        velocities[index] += impulse;
    }
}

fn clamp_distance_sq(distance_sq: f32, params: ChargeParams) -> f32 {
    if distance_sq < params.distance_min_sq {
        (params.distance_min_sq * distance_sq).sqrt()
    } else {
        distance_sq
    }
}

fn accumulate_charge(
    quad: &Quad,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    alpha: f32,
    impulse: &mut Vec2,
) {
    if quad.count <= 0.0 {
        return;
    }

    let point = positions[index];

    if quad.is_leaf() {
        for &other in &quad.members {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            let mut distance_sq = delta.length_sq();
            if distance_sq >= params.distance_max_sq {
                continue;
            }
            if distance_sq == 0.0 {
                delta = vec2(jiggle(index + other), jiggle(index * 31 + other));
                distance_sq = delta.length_sq();
            }
            let distance_sq = clamp_distance_sq(distance_sq, params);
            *impulse += delta * (params.strength * alpha / distance_sq);
        }
        return;
    }

    let delta = quad.centroid - point;
    let distance_sq = delta.length_sq();
    let side = quad.bounds.side();
    let far_enough =
        !quad.bounds.contains(point) && (side * side) / params.theta_sq < distance_sq;

    if far_enough {
        if distance_sq < params.distance_max_sq {
            let distance_sq = clamp_distance_sq(distance_sq, params);
            *impulse += delta * (params.strength * quad.count * alpha / distance_sq);
        }
        return;
    }

    for child in quad.children() {
        accumulate_charge(child, index, positions, params, alpha, impulse);
    }
}

/// Recenters the mean position on `center` without touching velocities.
pub(super) fn apply_center(positions: &mut [Vec2], center: Vec2) {
    if positions.is_empty() {
        return;
    }

    let mean = positions.iter().copied().fold(Vec2::ZERO, |sum, p| sum + p)
        / positions.len() as f32;
    let shift = center - mean;
    for position in positions.iter_mut() {
        *position += shift;
    }
}

/// Pushes overlapping circles apart, judged on velocity-predicted positions.
/// `predicted` must be the positions the tree was built over.
pub(super) fn apply_collisions(
    tree: &Quad,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    collide_pairs(tree, tree, true, predicted, radii, strength, impulses);
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let mut delta = predicted[from] - predicted[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    if distance_sq == 0.0 {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        delta = vec2(angle.cos(), angle.sin()) * 1e-3;
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let total_sq = (from_sq + to_sq).max(f32::EPSILON);
    let from_share = to_sq / total_sq;

    impulses[from] += push * from_share;
    impulses[to] -= push * (1.0 - from_share);
}

fn collide_pairs(
    quad_a: &Quad,
    quad_b: &Quad,
    same_quad: bool,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    let reach = quad_a.max_radius + quad_b.max_radius;
    if quad_a.bounds.gap_sq(quad_b.bounds) > reach * reach {
        return;
    }

    match (quad_a.is_leaf(), quad_b.is_leaf()) {
        (true, true) if same_quad => {
            for (offset, &from) in quad_a.members.iter().enumerate() {
                for &to in &quad_a.members[offset + 1..] {
                    resolve_overlap(from, to, predicted, radii, strength, impulses);
                }
            }
        }
        (true, true) => {
            for &from in &quad_a.members {
                for &to in &quad_b.members {
                    resolve_overlap(from, to, predicted, radii, strength, impulses);
                }
            }
        }
        _ if same_quad => {
            let children = quad_a.children().collect::<Vec<_>>();
            for (offset, child) in children.iter().enumerate() {
                collide_pairs(child, child, true, predicted, radii, strength, impulses);
                for other in &children[offset + 1..] {
                    collide_pairs(child, other, false, predicted, radii, strength, impulses);
                }
            }
        }
        (leaf_a, leaf_b) => {
            let split_a = !leaf_a && (leaf_b || quad_a.bounds.half_extent >= quad_b.bounds.half_extent);
            if split_a {
                for child in quad_a.children() {
                    collide_pairs(child, quad_b, false, predicted, radii, strength, impulses);
                }
            } else {
                for child in quad_b.children() {
                    collide_pairs(quad_a, child, false, predicted, radii, strength, impulses);
                }
            }
        }
    }
}
