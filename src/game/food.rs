use super::constants::{
    CORPSE_FOOD_STRIDE, FOOD_COLORS, FOOD_SIZE_MAX, FOOD_SIZE_MIN, MAX_FOOD_COUNT,
    NORMAL_FOOD_CHANCE, WORLD_SIZE,
};
use super::effects::Effect;
use super::types::{Food, FoodKind, Point};
use rand::Rng;

/// Appends up to `count` random food items without exceeding the cap. Returns how many were added.
pub fn spawn_food<R: Rng>(foods: &mut Vec<Food>, count: usize, rng: &mut R) -> usize {
    let mut added = 0;
    while added < count && foods.len() < MAX_FOOD_COUNT {
        foods.push(random_food(rng));
        added += 1;
    }
    added
}

pub fn random_food<R: Rng>(rng: &mut R) -> Food {
    let kind = roll_food_kind(rng);
    let color = match kind {
        Some(kind) => kind.effect.color().to_string(),
        None => roll_food_color(rng).to_string(),
    };
    let size = rng.gen::<f64>() * (FOOD_SIZE_MAX - FOOD_SIZE_MIN) + FOOD_SIZE_MIN;
    Food {
        id: Some(rng.gen()),
        x: rng.gen::<f64>() * WORLD_SIZE,
        y: rng.gen::<f64>() * WORLD_SIZE,
        color,
        size,
        kind,
        score: (size / 2.0).ceil() as i64,
    }
}

fn roll_food_kind<R: Rng>(rng: &mut R) -> Option<FoodKind> {
    let roll = rng.gen::<f64>();
    let mut cumulative = NORMAL_FOOD_CHANCE;
    if roll < cumulative {
        return None;
    }
    for effect in Effect::ALL {
        cumulative += effect.spawn_chance();
        if roll < cumulative {
            return Some(effect.into());
        }
    }
    None
}

fn roll_food_color<R: Rng>(rng: &mut R) -> &'static str {
    let roll = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for entry in &FOOD_COLORS {
        cumulative += entry.chance;
        if roll < cumulative {
            return entry.color;
        }
    }
    FOOD_COLORS[0].color
}

/// Turns every third body segment of a dead snake into plain food, stopping at the cap.
pub fn corpse_food<R: Rng>(
    foods: &mut Vec<Food>,
    segments: &[Point],
    color: &str,
    rng: &mut R,
) -> usize {
    let mut added = 0;
    for segment in segments.iter().step_by(CORPSE_FOOD_STRIDE) {
        if foods.len() >= MAX_FOOD_COUNT {
            break;
        }
        foods.push(Food {
            id: Some(rng.gen()),
            x: segment.x,
            y: segment.y,
            color: color.to_string(),
            size: FOOD_SIZE_MIN,
            kind: None,
            score: 1,
        });
        added += 1;
    }
    added
}

/// Resolves the position of an eaten item. A stable id wins over the index; an index that no
/// longer points at an item, or an id that is gone, resolves to nothing.
pub fn locate_food(foods: &[Food], index: usize, id: Option<u64>) -> Option<usize> {
    match id {
        Some(id) => foods.iter().position(|food| food.id == Some(id)),
        None => (index < foods.len()).then_some(index),
    }
}
