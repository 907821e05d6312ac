use super::constants::{BODY_RADIUS_MAX, BODY_RADIUS_MIN, FRAME_RATE, TURN_RATE};
use super::types::Point;
use std::f64::consts::PI;

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}

pub fn distance(a: Point, b: Point) -> f64 {
  ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Wraps a heading that drifted at most one turn past the -PI/PI seam.
pub fn wrap_angle(angle: f64) -> f64 {
  if angle > PI {
    angle - PI * 2.0
  } else if angle < -PI {
    angle + PI * 2.0
  } else {
    angle
  }
}

/// Signed difference from `current` to `target` along the shorter arc.
pub fn angle_delta(current: f64, target: f64) -> f64 {
  wrap_angle(target - current)
}

pub fn turn_toward(current: f64, target: f64, dt_seconds: f64) -> f64 {
  let delta = angle_delta(current, target);
  wrap_angle(current + delta * TURN_RATE * frame_scale(dt_seconds))
}

/// Converts elapsed seconds into 60fps frame units.
pub fn frame_scale(dt_seconds: f64) -> f64 {
  dt_seconds * FRAME_RATE
}

pub fn body_radius(segment_count: usize) -> f64 {
  clamp(
    BODY_RADIUS_MIN + segment_count as f64 / 50.0,
    BODY_RADIUS_MIN,
    BODY_RADIUS_MAX,
  )
}

pub fn circles_overlap(a: Point, b: Point, radius_sum: f64) -> bool {
  distance(a, b) < radius_sum
}
