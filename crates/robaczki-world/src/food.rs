//! Food items scattered over the plane.

use crate::render::{scoped, Canvas};
use robaczki_core::{Color, FoodId, Position};
use serde::{Deserialize, Serialize};

const WHOLESOME_COLOR: Color = Color::rgb(220, 50, 50);
const POISON_COLOR: Color = Color::rgb(50, 200, 50);

/// A passive food item. Never changes after creation; removed from the world once eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Position,
    /// Health gained (or lost, when negative) by the creature that finishes eating it
    pub nutrition_value: f64,
    pub poisonous: bool,
    pub radius: f64,
}

impl Food {
    pub fn new(id: FoodId, position: Position, nutrition_value: f64, poisonous: bool) -> Self {
        Self {
            id,
            position,
            nutrition_value,
            poisonous,
            radius: 4.0,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        scoped(canvas, |c| {
            c.fill(if self.poisonous {
                POISON_COLOR
            } else {
                WHOLESOME_COLOR
            });
            c.ellipse(self.position, self.radius * 2.0, self.radius * 2.0);
        });
    }
}

/// The food with `id`, if it is still in the collection
pub fn find_food(foods: &[Food], id: FoodId) -> Option<&Food> {
    foods.iter().find(|food| food.id == id)
}
