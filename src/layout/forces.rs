//! Force passes applied on every tick.
//!
//! Link and charge passes adjust velocities; the centering pass translates
//! positions directly. All of them are scaled by the current alpha except
//! centering, which only corrects drift.

use super::quadtree::QuadNode;
use super::state::StateBuffers;

/// Tiny deterministic offset used when two points coincide.
pub(super) fn jiggle(seed: usize) -> f32 {
    let unit = (seed as f32 * 0.618_034).fract();
    (unit - 0.5) * 1e-6
}

#[derive(Debug, Clone, Copy)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
    pub(super) strength: f32,
}

/// Spring pass over resolved links.
///
/// `bias[i]` is the share of link `i`'s correction given to its target;
/// the source receives the remainder.
pub(super) fn apply_links(
    buffers: &mut StateBuffers<'_>,
    links: &[(usize, usize)],
    bias: &[f32],
    params: LinkParams,
    alpha: f32,
) {
    for (i, &(source, target)) in links.iter().enumerate() {
        let mut dx = buffers.pos_x[target] + buffers.vel_x[target]
            - buffers.pos_x[source]
            - buffers.vel_x[source];
        let mut dy = buffers.pos_y[target] + buffers.vel_y[target]
            - buffers.pos_y[source]
            - buffers.vel_y[source];
        if dx == 0.0 {
            dx = jiggle(i * 2 + 1);
        }
        if dy == 0.0 {
            dy = jiggle(i * 2 + 2);
        }

        let distance = (dx * dx + dy * dy).sqrt();
        let l = (distance - params.distance) / distance * alpha * params.strength;
        dx *= l;
        dy *= l;

        let target_share = bias[i];
        buffers.vel_x[target] -= dx * target_share;
        buffers.vel_y[target] -= dy * target_share;
        let source_share = 1.0 - target_share;
        buffers.vel_x[source] += dx * source_share;
        buffers.vel_y[source] += dy * source_share;
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct ChargeParams {
    /// Negative values repel.
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) distance_min: f32,
}

/// Many-body pass: every node receives `delta * strength * alpha / dist²`
/// from every other node, with distant cells approximated by their centroid.
pub(super) fn apply_charge(buffers: &mut StateBuffers<'_>, params: ChargeParams, alpha: f32) {
    let Some(tree) = QuadNode::build(buffers.pos_x, buffers.pos_y) else {
        return;
    };

    let theta_sq = params.theta * params.theta;
    let distance_min_sq = params.distance_min * params.distance_min;
    let scale = params.strength * alpha;

    for index in 0..buffers.pos_x.len() {
        let (mut fx, mut fy) = (0.0, 0.0);
        accumulate_charge(
            &tree,
            index,
            buffers.pos_x,
            buffers.pos_y,
            theta_sq,
            distance_min_sq,
            &mut fx,
            &mut fy,
        );
        buffers.vel_x[index] += fx * scale;
        buffers.vel_y[index] += fy * scale;
    }
}

/// Sums `delta / dist²` contributions for `index`, weighted by cell mass.
#[allow(clippy::too_many_arguments)]
fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    xs: &[f32],
    ys: &[f32],
    theta_sq: f32,
    distance_min_sq: f32,
    fx: &mut f32,
    fy: &mut f32,
) {
    if node.mass <= 0.0 {
        return;
    }

    let (x, y) = (xs[index], ys[index]);

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut dx = xs[other] - x;
            let mut dy = ys[other] - y;
            if dx == 0.0 {
                dx = jiggle(index * 31 + other);
            }
            if dy == 0.0 {
                dy = jiggle(other * 17 + index);
            }
            let mut l = dx * dx + dy * dy;
            if l < distance_min_sq {
                l = (distance_min_sq * l).sqrt();
            }
            *fx += dx / l;
            *fy += dy / l;
        }
        return;
    }

    let dx = node.centroid_x - x;
    let dy = node.centroid_y - y;
    let l = dx * dx + dy * dy;
    let side = node.bounds.side_length();
    let far_enough = !node.bounds.contains(x, y) && side * side / theta_sq < l;

    if far_enough {
        let l = l.max(distance_min_sq);
        *fx += dx * node.mass / l;
        *fy += dy * node.mass / l;
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge(child, index, xs, ys, theta_sq, distance_min_sq, fx, fy);
    }
}

/// Translate free nodes so the centroid of all nodes moves toward `center`.
pub(super) fn apply_center(buffers: &mut StateBuffers<'_>, center: (f32, f32), strength: f32) {
    let n = buffers.pos_x.len();
    if n == 0 {
        return;
    }

    let sum_x: f32 = buffers.pos_x.iter().sum();
    let sum_y: f32 = buffers.pos_y.iter().sum();
    let shift_x = (sum_x / n as f32 - center.0) * strength;
    let shift_y = (sum_y / n as f32 - center.1) * strength;

    for i in 0..n {
        if buffers.fixed[i].is_some() {
            continue;
        }
        buffers.pos_x[i] -= shift_x;
        buffers.pos_y[i] -= shift_y;
    }
}

/// Velocity decay and position update; pinned nodes snap to their pin.
pub(super) fn integrate(buffers: &mut StateBuffers<'_>, velocity_decay: f32) {
    let keep = 1.0 - velocity_decay;
    for i in 0..buffers.pos_x.len() {
        match buffers.fixed[i] {
            Some((fx, fy)) => {
                buffers.pos_x[i] = fx;
                buffers.pos_y[i] = fy;
                buffers.vel_x[i] = 0.0;
                buffers.vel_y[i] = 0.0;
            }
            None => {
                buffers.vel_x[i] *= keep;
                buffers.vel_y[i] *= keep;
                buffers.pos_x[i] += buffers.vel_x[i];
                buffers.pos_y[i] += buffers.vel_y[i];
            }
        }
    }
}
