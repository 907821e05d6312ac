use super::constants::{SEGMENT_DISTANCE, WORLD_SIZE};
use super::math::{clamp, frame_scale};
use super::types::Point;

/// Lays out `length` segments trailing backwards from `start` along `angle`.
pub fn create_snake(start: Point, angle: f64, length: usize) -> Vec<Point> {
    (0..length)
        .map(|index| Point {
            x: start.x - angle.cos() * index as f64 * SEGMENT_DISTANCE,
            y: start.y - angle.sin() * index as f64 * SEGMENT_DISTANCE,
        })
        .collect()
}

pub fn clamp_to_world(point: Point) -> Point {
    Point {
        x: clamp(point.x, 0.0, WORLD_SIZE),
        y: clamp(point.y, 0.0, WORLD_SIZE),
    }
}

pub fn is_on_boundary(point: Point) -> bool {
    point.x <= 0.0 || point.x >= WORLD_SIZE || point.y <= 0.0 || point.y >= WORLD_SIZE
}

/// Moves the head one step along `angle` and drags the body behind it. Length is unchanged.
pub fn advance_snake(segments: &mut Vec<Point>, angle: f64, speed: f64, dt_seconds: f64) {
    let Some(head) = segments.first().copied() else { return };
    let step = speed * frame_scale(dt_seconds);
    let new_head = clamp_to_world(Point {
        x: head.x + angle.cos() * step,
        y: head.y + angle.sin() * step,
    });
    segments.insert(0, new_head);
    segments.pop();
}

/// Appends `count` segments stacked on the current tail.
pub fn grow_snake(segments: &mut Vec<Point>, count: usize) {
    let Some(tail) = segments.last().copied() else { return };
    segments.extend(std::iter::repeat(tail).take(count));
}

/// Drops the tail segment together with one score point, never going below `min_length`.
pub fn shrink_snake(segments: &mut Vec<Point>, score: &mut i64, min_length: usize) -> bool {
    if segments.len() <= min_length {
        return false;
    }
    segments.pop();
    *score -= 1;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_snake_trails_behind_head() {
        let snake = create_snake(Point { x: 100.0, y: 100.0 }, 0.0, 4);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake[0], Point { x: 100.0, y: 100.0 });
        assert!((snake[3].x - 85.0).abs() < 1e-9);
    }

    #[test]
    fn advance_keeps_length_and_clamps() {
        let mut snake = create_snake(Point { x: WORLD_SIZE - 1.0, y: 50.0 }, 0.0, 6);
        advance_snake(&mut snake, 0.0, 3.0, 1.0 / 60.0);
        assert_eq!(snake.len(), 6);
        assert_eq!(snake[0].x, WORLD_SIZE);
        assert!(is_on_boundary(snake[0]));
    }

    #[test]
    fn advance_ignores_empty_snake() {
        let mut snake = Vec::new();
        advance_snake(&mut snake, 0.0, 3.0, 1.0 / 60.0);
        assert!(snake.is_empty());
    }

    #[test]
    fn shrink_respects_floor() {
        let mut snake = create_snake(Point { x: 10.0, y: 10.0 }, 0.0, 6);
        let mut score = 6;
        assert!(shrink_snake(&mut snake, &mut score, 5));
        assert!(!shrink_snake(&mut snake, &mut score, 5));
        assert_eq!(snake.len(), 5);
        assert_eq!(score, 5);
    }

    #[test]
    fn grow_duplicates_tail() {
        let mut snake = create_snake(Point { x: 10.0, y: 10.0 }, 0.0, 2);
        grow_snake(&mut snake, 3);
        assert_eq!(snake.len(), 5);
        assert_eq!(snake[4], snake[1]);
    }
}
