//! The world aggregate and its per-frame loop.

use crate::creature::{Creature, CreatureData, CreatureOptions, CreatureState};
use crate::food::Food;
use crate::render::{Canvas, NullCanvas};
use robaczki_core::{create_rng, Bounds, Color, CreatureId, FoodId, Position, SimConfig, SimRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, event, info, instrument, Level};

const BACKGROUND: Color = Color::gray(220);
/// Frame time multiplier handed to creature updates
const FRAME_DT: f64 = 1.0;

/// Running totals over the lifetime of a world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub food_spawned: u64,
    pub food_eaten: u64,
    pub poison_eaten: u64,
    pub deaths: u64,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub spawned: Option<FoodId>,
    pub consumed: Vec<FoodId>,
    pub died: Vec<CreatureId>,
}

/// Serializable view of the whole world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame: u64,
    pub bounds: Bounds,
    pub foods: Vec<Food>,
    pub creatures: Vec<CreatureData>,
    pub stats: WorldStats,
}

pub struct World {
    config: SimConfig,
    bounds: Bounds,
    foods: Vec<Food>,
    creatures: Vec<Creature>,
    rng: SimRng,
    frame: u64,
    frames_since_spawn: u32,
    spawn_count: u64,
    next_food_id: u64,
    next_creature_id: u64,
    stats: WorldStats,
}

impl World {
    /// World sized from the configuration, populated with the initial creatures and food
    pub fn new(config: SimConfig) -> Self {
        let config = config.sanitized();
        let bounds = Bounds::new(config.world.width, config.world.height);
        Self::with_bounds(config, bounds)
    }

    /// Populated world on an explicit plane, e.g. one fitted to a render surface
    pub fn with_bounds(config: SimConfig, bounds: Bounds) -> Self {
        let mut world = Self::empty(config, bounds);
        world.populate();
        world
    }

    /// World with no creatures and no food
    pub fn empty(config: SimConfig, bounds: Bounds) -> Self {
        let config = config.sanitized();
        let rng = create_rng(config.world.seed);
        Self {
            config,
            bounds,
            foods: Vec::new(),
            creatures: Vec::new(),
            rng,
            frame: 0,
            frames_since_spawn: 0,
            spawn_count: 0,
            next_food_id: 0,
            next_creature_id: 0,
            stats: WorldStats::default(),
        }
    }

    fn populate(&mut self) {
        for _ in 0..self.config.world.initial_creatures {
            self.add_creature(CreatureOptions::default());
        }
        for _ in 0..self.config.world.initial_food {
            let position = Position::random_within(self.bounds, &mut self.rng);
            self.add_food(position, self.config.world.food_nutrition, false);
        }

        info!(
            event = "world_populated",
            creatures = self.creatures.len(),
            foods = self.foods.len(),
            width = self.bounds.width,
            height = self.bounds.height,
            seed = self.config.world.seed,
            "World populated"
        );
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Change the plane used for wrapping and spawning. Existing entities keep their
    /// coordinates; creatures re-enter the plane on their next move.
    pub fn resize(&mut self, bounds: Bounds) {
        debug!(
            event = "world_resized",
            width = bounds.width,
            height = bounds.height,
            "World resized"
        );
        self.bounds = bounds;
    }

    /// Add a creature. Without an explicit position it lands somewhere random on the plane.
    pub fn add_creature(&mut self, mut options: CreatureOptions) -> CreatureId {
        if options.position.is_none() {
            options.position = Some(Position::random_within(self.bounds, &mut self.rng));
        }

        let id = CreatureId(self.next_creature_id);
        self.next_creature_id += 1;
        let creature = Creature::new(
            id,
            options,
            &self.config.creature,
            &self.config.behavior,
            &mut self.rng,
        );

        debug!(
            event = "creature_added",
            creature_id = %id,
            x = creature.position.x,
            y = creature.position.y,
            view_angle = creature.vision.angle,
            color = %creature.color,
            "Creature added"
        );
        self.creatures.push(creature);
        id
    }

    /// Place a food item
    pub fn add_food(&mut self, position: Position, nutrition_value: f64, poisonous: bool) -> FoodId {
        let id = FoodId(self.next_food_id);
        self.next_food_id += 1;
        self.foods.push(
            Food::new(id, position, nutrition_value, poisonous)
                .with_radius(self.config.world.food_radius),
        );
        id
    }

    /// Spawn one food at a random position; every n-th spawn is poisonous.
    pub fn spawn_food(&mut self) -> FoodId {
        self.spawn_count += 1;
        let poisonous = self.spawn_count % self.config.world.poison_every == 0;
        let nutrition = if poisonous {
            self.config.world.poison_nutrition
        } else {
            self.config.world.food_nutrition
        };
        let position = Position::random_within(self.bounds, &mut self.rng);
        let id = self.add_food(position, nutrition, poisonous);
        self.stats.food_spawned += 1;

        debug!(
            event = "food_spawned",
            food_id = %id,
            spawn_count = self.spawn_count,
            poisonous = poisonous,
            x = position.x,
            y = position.y,
            "Food spawned"
        );
        id
    }

    fn tick_spawner(&mut self) -> Option<FoodId> {
        self.frames_since_spawn += 1;
        if self.frames_since_spawn < self.config.world.food_spawn_interval {
            return None;
        }
        self.frames_since_spawn = 0;
        Some(self.spawn_food())
    }

    /// Advance one frame without drawing
    pub fn step(&mut self) -> FrameReport {
        let mut canvas = NullCanvas::new(self.bounds.width, self.bounds.height);
        self.frame(&mut canvas)
    }

    /// Run one frame: spawn, draw food, then update, draw and settle each creature in turn.
    #[instrument(level = "trace", skip_all, fields(frame = self.frame + 1))]
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> FrameReport {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            spawned: self.tick_spawner(),
            ..Default::default()
        };

        canvas.background(BACKGROUND);
        for food in &self.foods {
            food.draw(canvas);
        }

        let bounds = self.bounds;
        for creature in self.creatures.iter_mut() {
            let before = creature.state();
            creature.update(
                FRAME_DT,
                Some(bounds),
                &self.foods,
                &self.config.behavior,
                &mut self.rng,
            );
            creature.draw(canvas);

            if before != creature.state() {
                log_transition(creature, before, self.frame);
            }
            if before.is_alive() && !creature.is_alive() {
                self.stats.deaths += 1;
                report.died.push(creature.id);
            }

            if let Some(food_id) = creature.take_last_consumed() {
                if let Some(index) = self.foods.iter().position(|f| f.id == food_id) {
                    let food = self.foods.remove(index);
                    self.stats.food_eaten += 1;
                    if food.poisonous {
                        self.stats.poison_eaten += 1;
                    }
                    debug!(
                        event = "food_consumed",
                        creature_id = %creature.id,
                        food_id = %food.id,
                        nutrition = food.nutrition_value,
                        poisonous = food.poisonous,
                        health = creature.health(),
                        energy = creature.energy(),
                        frame = self.frame,
                        "Food consumed"
                    );
                    report.consumed.push(food_id);
                }
            }
        }

        if self.frame % self.config.world.metrics_interval == 0 {
            self.emit_population_metrics();
        }

        report
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frame: self.frame,
            bounds: self.bounds,
            foods: self.foods.clone(),
            creatures: self.creatures.iter().map(CreatureData::from).collect(),
            stats: self.stats.clone(),
        }
    }

    fn emit_population_metrics(&self) {
        let alive: Vec<&Creature> = self.creatures.iter().filter(|c| c.is_alive()).collect();
        let sleeping = alive
            .iter()
            .filter(|c| c.state() == CreatureState::Sleeping)
            .count();
        let (avg_energy, avg_health) = if alive.is_empty() {
            (0.0, 0.0)
        } else {
            let n = alive.len() as f64;
            (
                alive.iter().map(|c| c.energy()).sum::<f64>() / n,
                alive.iter().map(|c| c.health()).sum::<f64>() / n,
            )
        };
        let poisonous_food = self.foods.iter().filter(|f| f.poisonous).count();

        info!(
            event = "population_metrics",
            frame = self.frame,
            creatures_alive = alive.len(),
            creatures_dead = self.creatures.len() - alive.len(),
            creatures_sleeping = sleeping,
            food_available = self.foods.len(),
            poisonous_food = poisonous_food,
            avg_energy = format!("{:.2}", avg_energy),
            avg_health = format!("{:.2}", avg_health),
            food_spawned_total = self.stats.food_spawned,
            food_eaten_total = self.stats.food_eaten,
            "Population metrics snapshot"
        );

        event!(
            Level::DEBUG,
            gauge_name = "food_available",
            gauge_value = self.foods.len(),
            frame = self.frame,
            "Food gauge"
        );
    }
}

fn log_transition(creature: &Creature, before: CreatureState, frame: u64) {
    match creature.state() {
        CreatureState::Dead => info!(
            event = "creature_death",
            creature_id = %creature.id,
            frame = frame,
            age = creature.age(),
            energy = creature.energy(),
            x = creature.position.x,
            y = creature.position.y,
            "Creature died"
        ),
        CreatureState::Sleeping => debug!(
            event = "creature_asleep",
            creature_id = %creature.id,
            frame = frame,
            sleep_duration = creature.sleep_duration(),
            "Creature ran out of energy and fell asleep"
        ),
        after => debug!(
            event = "creature_state",
            creature_id = %creature.id,
            frame = frame,
            from = ?before,
            to = ?after,
            target = ?creature.target(),
            "Creature changed state"
        ),
    }
}
