use super::constants::{MIN_LENGTH, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WORLD_SIZE};
use super::math::distance;
use super::types::{Food, Point};

/// Keeps this far from the edge before heading back to the middle of the world.
const EDGE_MARGIN: f64 = 120.0;
/// Food further away than this is worth spending length on.
const BOOST_DISTANCE: f64 = 400.0;
/// Length kept in reserve above the shrink floor before boosting.
const BOOST_RESERVE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Pointer position in viewport coordinates.
    pub pointer: Point,
    pub boost: bool,
}

/// Steers a headless player toward the nearest food, or back toward the world centre when it
/// drifts close to the edge. Boosts toward distant food while it can afford the length.
pub fn steer(head: Point, length: usize, foods: &[Food]) -> Steering {
    let nearest = foods
        .iter()
        .map(|food| Point {
            x: food.x,
            y: food.y,
        })
        .min_by(|a, b| distance(head, *a).total_cmp(&distance(head, *b)));
    let (target, boost) = match nearest {
        _ if near_edge(head) => (world_center(), false),
        Some(food) => {
            let far = distance(head, food) > BOOST_DISTANCE;
            (food, far && length > MIN_LENGTH + BOOST_RESERVE)
        }
        None => (world_center(), false),
    };
    Steering {
        pointer: Point {
            x: VIEWPORT_WIDTH / 2.0 + (target.x - head.x),
            y: VIEWPORT_HEIGHT / 2.0 + (target.y - head.y),
        },
        boost,
    }
}

fn near_edge(point: Point) -> bool {
    point.x < EDGE_MARGIN
        || point.y < EDGE_MARGIN
        || point.x > WORLD_SIZE - EDGE_MARGIN
        || point.y > WORLD_SIZE - EDGE_MARGIN
}

fn world_center() -> Point {
    Point {
        x: WORLD_SIZE / 2.0,
        y: WORLD_SIZE / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food_at(x: f64, y: f64) -> Food {
        Food {
            id: None,
            x,
            y,
            color: "#FF5722".to_string(),
            size: 4.0,
            kind: None,
            score: 2,
        }
    }

    #[test]
    fn points_at_nearest_food() {
        let head = Point { x: 1000.0, y: 1000.0 };
        let foods = vec![food_at(1400.0, 1000.0), food_at(1000.0, 1100.0)];
        let steering = steer(head, 40, &foods);
        assert_eq!(
            steering.pointer,
            Point {
                x: VIEWPORT_WIDTH / 2.0,
                y: VIEWPORT_HEIGHT / 2.0 + 100.0
            }
        );
        assert!(!steering.boost);
    }

    #[test]
    fn turns_back_near_edge() {
        let head = Point { x: 50.0, y: 1500.0 };
        let steering = steer(head, 40, &[food_at(10.0, 1500.0)]);
        assert!(steering.pointer.x > VIEWPORT_WIDTH / 2.0);
        assert!(!steering.boost);
    }

    #[test]
    fn boosts_toward_distant_food_only_with_spare_length() {
        let head = Point { x: 1000.0, y: 1000.0 };
        let foods = [food_at(1600.0, 1000.0)];
        assert!(steer(head, 40, &foods).boost);
        assert!(!steer(head, MIN_LENGTH + BOOST_RESERVE, &foods).boost);
        assert!(!steer(head, 40, &[]).boost);
    }
}
