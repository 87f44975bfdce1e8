//! Human-plausible mouse trajectory synthesis.
//!
//! Produces relative deltas from the current cursor position to an absolute
//! screen target. Three forces have to balance here: the path must arrive at
//! the exact target, it must not look machine-generated, and it must finish
//! within a bounded wall-clock time.
//!
//! The loop interpolates waypoints linearly but injects only the *residual*
//! between each waypoint and the re-queried actual position, so drift from
//! OS coalescing or from earlier jitter is corrected instead of accumulated.
//! Jitter (±1 px per axis) is applied everywhere except the final few steps,
//! where it would cause oscillation around the target.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::InputError;
use crate::geometry::Point;

/// Steps at the end of the trajectory where jitter is suppressed so the
/// cursor settles instead of oscillating.
const SETTLE_STEPS: u32 = 3;

/// Pacing and abort knobs for a trajectory run.
#[derive(Debug, Clone)]
pub struct TrajectoryOptions {
    /// Hard wall-clock ceiling; exceeding it aborts with `MoveTimeout`.
    pub timeout: Duration,
    /// Apply ±1 px jitter outside the settle window.
    pub jitter: bool,
    /// Sleep between steps. Disabled in tests for determinism and speed.
    pub paced: bool,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        TrajectoryOptions {
            timeout: Duration::from_secs(2),
            jitter: true,
            paced: true,
        }
    }
}

/// Step count as a function of Chebyshev distance.
///
/// Short moves get proportionally fewer, pixel-fine steps (floor 5);
/// medium moves use a fixed moderate count; long moves use progressively
/// fewer steps per pixel, capped at 40, so total duration stays bounded.
pub fn step_count(distance: i32) -> u32 {
    match distance {
        d if d < 100 => (d / 5).max(5) as u32,
        d if d < 500 => 20,
        d if d < 1000 => 30,
        _ => 40,
    }
}

/// Inter-step sleep. High step counts sleep less so long moves do not blow
/// the time budget; the pause still gives the OS a chance to register each
/// individual motion event.
fn step_delay(steps: u32) -> Duration {
    if steps > 20 {
        Duration::from_millis(3)
    } else {
        Duration::from_millis(5)
    }
}

/// Drives the cursor to `target` (screen coordinates).
///
/// `position` re-queries the actual cursor position; `inject` delivers one
/// relative delta. The cumulative injected delta equals exactly
/// `target - start` as long as `position` reflects injected motion.
pub fn drive(
    target: Point,
    position: &mut dyn FnMut() -> Result<Point, InputError>,
    inject: &mut dyn FnMut(i32, i32) -> Result<(), InputError>,
    options: &TrajectoryOptions,
) -> Result<(), InputError> {
    let start = position()?;
    let steps = step_count(start.chebyshev(target));
    let started = Instant::now();

    for i in 1..=steps {
        if started.elapsed() >= options.timeout {
            log::warn!(
                "trajectory: aborted after {:?} at step {}/{} toward ({}, {})",
                options.timeout,
                i,
                steps,
                target.x,
                target.y
            );
            return Err(InputError::MoveTimeout);
        }

        let waypoint = interpolate(start, target, i, steps);
        let current = position()?;
        let mut dx = waypoint.x - current.x;
        let mut dy = waypoint.y - current.y;

        let settling = i + SETTLE_STEPS > steps;
        if options.jitter && !settling {
            let mut rng = rand::thread_rng();
            dx += rng.gen_range(-1..=1);
            dy += rng.gen_range(-1..=1);
        }

        // Zero residual: already on the waypoint, nothing to correct.
        if dx == 0 && dy == 0 {
            continue;
        }

        inject(dx, dy)?;

        if options.paced {
            std::thread::sleep(step_delay(steps));
        }
    }

    Ok(())
}

/// Linearly interpolated waypoint for step `i` of `steps`.
fn interpolate(start: Point, target: Point, i: u32, steps: u32) -> Point {
    let i = i as i32;
    let steps = steps as i32;
    Point::new(
        start.x + (target.x - start.x) * i / steps,
        start.y + (target.y - start.y) * i / steps,
    )
}
