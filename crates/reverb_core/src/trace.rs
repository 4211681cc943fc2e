//! # Occlusion Tracing
//!
//! Voxel traversal between a sound source and a listener, summing how much
//! solid material lies in between. Runs on reader threads against a
//! [`BlockAccess`] proxy.
//!
//! Amanatides & Woo DDA: step from cell boundary to cell boundary along the
//! segment, always crossing the nearest boundary first.
//!
//! ```text
//!   from ●──┬──┬──┬──┬──● to
//!        │s │  │▓▓│  │t │     s, t excluded; ▓ adds its occlusion
//! ```

use reverb_shared::{BlockPos, Vec3};

use crate::access::BlockAccess;

/// Result of tracing one segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OcclusionTrace {
    /// Summed occlusion of the solid cells crossed.
    pub occlusion: f32,
    /// Number of solid cells crossed.
    pub blocks_hit: u32,
    /// Cells crossed the proxy had no data for (treated as air).
    pub unavailable: u32,
    /// Cell boundaries crossed.
    pub steps: u32,
    /// Whether the walk arrived at the target cell within `max_steps`.
    pub reached: bool,
}

/// Walks the cells between `from` and `to`, excluding both end cells.
///
/// A segment with a non-finite endpoint is not walked and never `reached`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn trace_occlusion(access: &dyn BlockAccess, from: Vec3, to: Vec3, max_steps: u32) -> OcclusionTrace {
    let mut trace = OcclusionTrace::default();
    if !(from.is_finite() && to.is_finite()) {
        return trace;
    }
    let target = BlockPos::floor(to);
    let mut cell = BlockPos::floor(from);

    if cell == target {
        trace.reached = true;
        return trace;
    }

    // Parameterized over t in [0, 1] along the segment
    let dir = to - from;
    let axis = |origin: f32, d: f32, start: i32| -> (i32, f32, f32) {
        if d > 0.0 {
            (1, (start as f32 + 1.0 - origin) / d, 1.0 / d)
        } else if d < 0.0 {
            (-1, (origin - start as f32) / -d, -1.0 / d)
        } else {
            (0, f32::INFINITY, f32::INFINITY)
        }
    };
    let (step_x, mut t_max_x, delta_x) = axis(from.x, dir.x, cell.x);
    let (step_y, mut t_max_y, delta_y) = axis(from.y, dir.y, cell.y);
    let (step_z, mut t_max_z, delta_z) = axis(from.z, dir.z, cell.z);

    while trace.steps < max_steps {
        let t = if t_max_x < t_max_y {
            if t_max_x < t_max_z {
                cell.x = cell.x.saturating_add(step_x);
                let t = t_max_x;
                t_max_x += delta_x;
                t
            } else {
                cell.z = cell.z.saturating_add(step_z);
                let t = t_max_z;
                t_max_z += delta_z;
                t
            }
        } else if t_max_y < t_max_z {
            cell.y = cell.y.saturating_add(step_y);
            let t = t_max_y;
            t_max_y += delta_y;
            t
        } else {
            cell.z = cell.z.saturating_add(step_z);
            let t = t_max_z;
            t_max_z += delta_z;
            t
        };
        trace.steps += 1;

        // Rounding can step past the target on a near-diagonal segment
        if cell == target || t > 1.0 {
            trace.reached = true;
            break;
        }

        match access.block_at(cell) {
            Some(state) if state.is_solid() => {
                trace.occlusion += state.occlusion();
                trace.blocks_hit += 1;
            }
            Some(_) => {}
            None => trace.unavailable += 1,
        }
    }

    trace
}
