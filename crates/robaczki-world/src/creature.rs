//! Creature state and behavior.

use crate::food::{find_food, Food};
use crate::render::{scoped, Canvas};
use crate::vision::Vision;
use robaczki_core::clamp::{clamp_resource, resolve_finite, resolve_positive};
use robaczki_core::{
    normalize_angle, BehaviorConfig, Bounds, Color, CreatureConfig, CreatureId, FoodId, Position,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, TAU};

const BAR_WIDTH: f64 = 24.0;
const BAR_HEIGHT: f64 = 4.0;
const BAR_BACKDROP: Color = Color::rgba(0, 0, 0, 80);
const ENERGY_COLOR: Color = Color::rgb(0, 100, 255);
const HEALTH_COLOR: Color = Color::rgb(0, 200, 100);
const SLEEP_COLOR: Color = Color::rgba(200, 200, 255, 200);
const DEAD_COLOR: Color = Color::gray(90);
const VISION_ALPHA: u8 = 40;
const CONE_SEGMENTS: usize = 16;

/// Life-cycle state; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureState {
    Wandering,
    Hunting,
    Eating,
    Sleeping,
    Dead,
}

impl CreatureState {
    pub fn is_alive(&self) -> bool {
        *self != CreatureState::Dead
    }
}

/// Optional construction parameters. Anything left `None` or unusable falls back to a
/// default from [`CreatureConfig`] or a random draw.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureOptions {
    pub position: Option<Position>,
    pub direction: Option<f64>,
    pub speed: Option<f64>,
    pub energy: Option<f64>,
    pub health: Option<f64>,
    pub max_speed: Option<f64>,
    pub max_energy: Option<f64>,
    pub max_health: Option<f64>,
    pub color: Option<Color>,
    /// Vision cone opening in degrees
    pub view_angle: Option<f64>,
    pub view_range: Option<f64>,
    pub eating_duration: Option<u32>,
    pub sleep_duration: Option<u32>,
}

impl CreatureOptions {
    pub fn at(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn facing(mut self, direction: f64) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// A creature in the simulation
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: CreatureId,
    pub position: Position,
    /// Heading in radians
    pub direction: f64,
    pub color: Color,
    pub vision: Vision,
    speed: f64,
    energy: f64,
    health: f64,
    max_speed: f64,
    max_energy: f64,
    max_health: f64,
    eating_duration: u32,
    sleep_duration: u32,
    state: CreatureState,
    eat_remaining: u32,
    sleep_remaining: u32,
    target: Option<FoodId>,
    last_consumed: Option<FoodId>,
    age: u64,
}

impl Creature {
    pub fn new<R: Rng + ?Sized>(
        id: CreatureId,
        options: CreatureOptions,
        defaults: &CreatureConfig,
        behavior: &BehaviorConfig,
        rng: &mut R,
    ) -> Self {
        let max_speed = resolve_positive(options.max_speed, defaults.max_speed);
        let max_energy = resolve_positive(options.max_energy, defaults.max_energy);
        let max_health = resolve_positive(options.max_health, defaults.max_health);

        let position = match options.position {
            Some(p) if p.x.is_finite() && p.y.is_finite() => p,
            _ => Position::new(100.0, 100.0),
        };
        let direction = resolve_finite(options.direction, || rng.gen_range(0.0..TAU));
        let speed = resolve_finite(options.speed, || {
            random_between(rng, behavior.wander_min_speed, behavior.wander_max_speed)
        });
        let view_angle = match options.view_angle {
            Some(angle) if angle.is_finite() && angle > 0.0 => angle.min(360.0),
            _ => random_between(rng, defaults.min_view_angle, defaults.max_view_angle),
        };
        let color = options.color.unwrap_or_else(|| Color::random(rng));

        Self {
            id,
            position,
            direction,
            color,
            vision: Vision::new(
                view_angle,
                resolve_positive(options.view_range, defaults.view_range),
            ),
            speed: clamp_resource(speed, max_speed),
            energy: clamp_resource(resolve_finite(options.energy, || max_energy), max_energy),
            health: clamp_resource(resolve_finite(options.health, || max_health), max_health),
            max_speed,
            max_energy,
            max_health,
            eating_duration: options
                .eating_duration
                .filter(|d| *d > 0)
                .unwrap_or(defaults.eating_duration.max(1)),
            sleep_duration: options
                .sleep_duration
                .filter(|d| *d > 0)
                .unwrap_or(defaults.sleep_duration.max(1)),
            state: CreatureState::Wandering,
            eat_remaining: 0,
            sleep_remaining: 0,
            target: None,
            last_consumed: None,
            age: 0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn eating_duration(&self) -> u32 {
        self.eating_duration
    }

    pub fn sleep_duration(&self) -> u32 {
        self.sleep_duration
    }

    pub fn state(&self) -> CreatureState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn target(&self) -> Option<FoodId> {
        self.target
    }

    pub fn last_consumed(&self) -> Option<FoodId> {
        self.last_consumed
    }

    /// Read and clear the last-consumed signal
    pub fn take_last_consumed(&mut self) -> Option<FoodId> {
        self.last_consumed.take()
    }

    /// Number of updates this creature has received
    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn energy_ratio(&self) -> f64 {
        self.energy / self.max_energy
    }

    pub fn health_ratio(&self) -> f64 {
        self.health / self.max_health
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_resource(speed, self.max_speed);
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = clamp_resource(energy, self.max_energy);
    }

    pub fn set_health(&mut self, health: f64) {
        self.health = clamp_resource(health, self.max_health);
    }

    /// Whether `target` is inside this creature's vision cone
    pub fn is_in_fov(&self, target: Position) -> bool {
        self.vision.contains(self.position, self.direction, target)
    }

    /// Nearest food inside the vision cone
    pub fn find_nearest_food<'a>(&self, foods: &'a [Food]) -> Option<&'a Food> {
        self.vision.nearest(self.position, self.direction, foods)
    }

    /// Advance one tick.
    ///
    /// `dt` scales movement and energy drain; countdowns always advance by one. `foods` is
    /// only read: a finished meal is reported through [`Creature::take_last_consumed`].
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        bounds: Option<Bounds>,
        foods: &[Food],
        behavior: &BehaviorConfig,
        rng: &mut R,
    ) {
        self.age += 1;

        if self.state == CreatureState::Dead {
            self.speed = 0.0;
            return;
        }
        if self.health <= 0.0 {
            self.die();
            return;
        }
        if self.state == CreatureState::Sleeping {
            self.sleep_tick();
            return;
        }
        if self.energy <= 0.0 && self.state != CreatureState::Eating {
            self.fall_asleep();
            return;
        }
        if self.state == CreatureState::Eating {
            self.eat_tick(foods, behavior);
            return;
        }

        if self.forage(foods, behavior, rng) {
            self.travel(dt, bounds, behavior);
        }
    }

    fn die(&mut self) {
        self.state = CreatureState::Dead;
        self.speed = 0.0;
        self.target = None;
        self.eat_remaining = 0;
        self.sleep_remaining = 0;
    }

    fn fall_asleep(&mut self) {
        self.state = CreatureState::Sleeping;
        self.sleep_remaining = self.sleep_duration;
        self.target = None;
        self.speed = 0.0;
    }

    fn sleep_tick(&mut self) {
        self.speed = 0.0;
        self.sleep_remaining = self.sleep_remaining.saturating_sub(1);
        self.set_energy(self.energy + self.max_energy / self.sleep_duration as f64);

        if self.sleep_remaining == 0 {
            self.energy = self.max_energy;
            self.state = CreatureState::Wandering;
        }
    }

    fn eat_tick(&mut self, foods: &[Food], behavior: &BehaviorConfig) {
        self.speed = 0.0;
        self.eat_remaining = self.eat_remaining.saturating_sub(1);
        if self.eat_remaining > 0 {
            return;
        }

        // The meal may have been finished by another creature in the meantime
        if let Some(food) = self.target.and_then(|id| find_food(foods, id)) {
            self.set_health(self.health + food.nutrition_value);
            if food.poisonous {
                self.set_energy(self.energy - behavior.poison_energy_penalty);
            }
            self.last_consumed = Some(food.id);
        }
        self.state = CreatureState::Wandering;
        self.target = None;
    }

    /// Pick a target and set heading/speed. Returns false when the creature stopped to eat.
    fn forage<R: Rng + ?Sized>(
        &mut self,
        foods: &[Food],
        behavior: &BehaviorConfig,
        rng: &mut R,
    ) -> bool {
        if self.target.is_some_and(|id| find_food(foods, id).is_none()) {
            self.target = None;
        }
        if let Some(nearest) = self.find_nearest_food(foods) {
            self.target = Some(nearest.id);
        }

        match self.target.and_then(|id| find_food(foods, id)) {
            Some(food) => {
                self.direction = self.position.bearing_to(&food.position);
                if self.position.distance(&food.position) < behavior.arrival_threshold {
                    self.state = CreatureState::Eating;
                    self.eat_remaining = self.eating_duration;
                    self.speed = 0.0;
                    return false;
                }
                self.state = CreatureState::Hunting;
                self.set_speed(self.max_speed * behavior.hunt_speed_factor);
            }
            None => {
                self.state = CreatureState::Wandering;
                if rng.gen::<f64>() < behavior.wander_turn_chance && behavior.wander_turn_max > 0.0 {
                    let turn = rng.gen_range(-behavior.wander_turn_max..=behavior.wander_turn_max);
                    self.direction = normalize_angle(self.direction + turn);
                }
                let speed =
                    random_between(rng, behavior.wander_min_speed, behavior.wander_max_speed);
                self.set_speed(speed);
            }
        }
        true
    }

    fn travel(&mut self, dt: f64, bounds: Option<Bounds>, behavior: &BehaviorConfig) {
        let fatigue = behavior.fatigue_floor + (1.0 - behavior.fatigue_floor) * self.energy_ratio();
        self.set_speed(self.speed * fatigue);

        let (sin, cos) = self.direction.sin_cos();
        self.position = self
            .position
            .add(cos * self.speed * dt, sin * self.speed * dt);
        self.set_energy(self.energy - self.speed.abs() * behavior.energy_drain_rate * dt);

        if let Some(bounds) = bounds {
            self.position = self.position.wrap(bounds);
        }
    }

    /// Draw the creature. Reads state only.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        if !self.is_alive() {
            self.draw_dead_marker(canvas);
            return;
        }

        scoped(canvas, |c| {
            c.translate(self.position.x, self.position.y);
            c.rotate(self.direction);

            if !matches!(self.state, CreatureState::Eating | CreatureState::Sleeping) {
                c.fill(self.color.with_alpha(VISION_ALPHA));
                c.polygon(&self.cone_outline());
            }

            c.fill(self.color);
            c.triangle(
                Position::new(12.0, 0.0),
                Position::new(-8.0, -6.0),
                Position::new(-8.0, 6.0),
            );

            if self.state == CreatureState::Sleeping {
                c.fill(SLEEP_COLOR);
                c.ellipse(Position::new(-2.0, -16.0), 5.0, 5.0);
                c.ellipse(Position::new(4.0, -20.0), 3.0, 3.0);
            }

            draw_bar(c, -10.0, self.energy_ratio(), ENERGY_COLOR);
            draw_bar(c, -2.0, self.health_ratio(), HEALTH_COLOR);
        });
    }

    fn draw_dead_marker<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        scoped(canvas, |c| {
            c.translate(self.position.x, self.position.y);
            c.fill(DEAD_COLOR);
            for angle in [FRAC_PI_4, -FRAC_PI_4] {
                scoped(c, |arm| {
                    arm.rotate(angle);
                    arm.rounded_rect(Position::default(), 16.0, 3.0, 1.0);
                });
            }
        });
    }

    /// Vision cone in local coordinates (heading along +x)
    fn cone_outline(&self) -> Vec<Position> {
        let half = self.vision.half_angle();
        let mut points = Vec::with_capacity(CONE_SEGMENTS + 2);
        points.push(Position::default());
        for i in 0..=CONE_SEGMENTS {
            let angle = -half + 2.0 * half * i as f64 / CONE_SEGMENTS as f64;
            points.push(Position::new(
                self.vision.range * angle.cos(),
                self.vision.range * angle.sin(),
            ));
        }
        points
    }
}

fn draw_bar<C: Canvas + ?Sized>(canvas: &mut C, offset_y: f64, ratio: f64, color: Color) {
    let ratio = clamp_resource(ratio, 1.0);
    scoped(canvas, |c| {
        c.translate(0.0, offset_y);
        c.fill(BAR_BACKDROP);
        c.rounded_rect(Position::default(), BAR_WIDTH + 2.0, BAR_HEIGHT + 2.0, 2.0);
        c.fill(color);
        let filled = BAR_WIDTH * ratio;
        c.rounded_rect(
            Position::new(-BAR_WIDTH / 2.0 + filled / 2.0, 0.0),
            filled,
            BAR_HEIGHT,
            2.0,
        );
    });
}

fn random_between<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Serializable creature data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureData {
    pub id: CreatureId,
    pub position: Position,
    pub direction: f64,
    pub speed: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub health: f64,
    pub max_health: f64,
    pub state: CreatureState,
    pub target: Option<FoodId>,
    pub color: Color,
    pub vision: Vision,
    pub age: u64,
}

impl From<&Creature> for CreatureData {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id,
            position: creature.position,
            direction: creature.direction,
            speed: creature.speed,
            energy: creature.energy,
            max_energy: creature.max_energy,
            health: creature.health,
            max_health: creature.max_health,
            state: creature.state,
            target: creature.target,
            color: creature.color,
            vision: creature.vision,
            age: creature.age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingCanvas};
    use proptest::prelude::*;
    use robaczki_core::{create_rng, SimRng};

    fn spawn(options: CreatureOptions) -> (Creature, SimRng) {
        let mut rng = create_rng(7);
        let creature = Creature::new(
            CreatureId(1),
            options,
            &CreatureConfig::default(),
            &BehaviorConfig::default(),
            &mut rng,
        );
        (creature, rng)
    }

    fn facing_east_at(x: f64, y: f64) -> CreatureOptions {
        CreatureOptions {
            view_angle: Some(90.0),
            ..CreatureOptions::at(Position::new(x, y)).facing(0.0)
        }
    }

    #[test]
    fn test_creature_defaults() {
        let (creature, _) = spawn(CreatureOptions::default());

        assert_eq!(creature.position, Position::new(100.0, 100.0));
        assert_eq!(creature.energy(), 100.0);
        assert_eq!(creature.health(), 10.0);
        assert_eq!(creature.max_speed(), 4.0);
        assert!((0.5..2.0).contains(&creature.speed()));
        assert!((45.0..180.0).contains(&creature.vision.angle));
        assert_eq!(creature.vision.range, 150.0);
        assert!((0.0..TAU).contains(&creature.direction));
        assert_eq!(creature.eating_duration(), 180);
        assert_eq!(creature.state(), CreatureState::Wandering);
        assert_eq!(creature.color.a, 255);
    }

    #[test]
    fn test_invalid_options_fall_back() {
        let (creature, _) = spawn(CreatureOptions {
            position: Some(Position::new(f64::NAN, 1.0)),
            max_energy: Some(-5.0),
            energy: Some(500.0),
            health: Some(-3.0),
            speed: Some(99.0),
            view_range: Some(0.0),
            eating_duration: Some(0),
            sleep_duration: Some(0),
            ..Default::default()
        });

        assert_eq!(creature.position, Position::new(100.0, 100.0));
        assert_eq!(creature.max_energy(), 100.0);
        assert_eq!(creature.energy(), 100.0);
        assert_eq!(creature.health(), 0.0);
        assert_eq!(creature.speed(), 4.0);
        assert_eq!(creature.vision.range, 150.0);
        assert_eq!(creature.eating_duration(), 180);
        assert_eq!(creature.sleep_duration(), 300);
    }

    #[test]
    fn test_nan_resources_fall_back_to_full() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            energy: Some(f64::NAN),
            health: Some(f64::NAN),
            ..facing_east_at(50.0, 50.0)
        });
        assert_eq!(creature.energy(), 100.0);
        assert_eq!(creature.health(), 10.0);

        creature.update(1.0, None, &[], &BehaviorConfig::default(), &mut rng);
        assert_eq!(creature.state(), CreatureState::Wandering);
    }

    #[test]
    fn test_wide_wander_turn_does_not_panic() {
        let (mut creature, mut rng) = spawn(facing_east_at(50.0, 50.0));
        let behavior = robaczki_core::SimConfig::from_json_str(
            r#"{ "behavior": { "wander_turn_max": 1e308, "wander_turn_chance": 1.0 } }"#,
        )
        .unwrap()
        .behavior;

        for _ in 0..20 {
            creature.update(1.0, None, &[], &behavior, &mut rng);
            assert!(creature.direction.abs() <= std::f64::consts::PI);
        }
    }

    #[test]
    fn test_same_seed_same_creature() {
        let (a, _) = spawn(CreatureOptions::default());
        let (b, _) = spawn(CreatureOptions::default());
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.color, b.color);
        assert_eq!(a.vision, b.vision);
    }

    #[test]
    fn test_setters_clamp() {
        let (mut creature, _) = spawn(CreatureOptions::default());

        creature.set_energy(250.0);
        assert_eq!(creature.energy(), 100.0);
        creature.set_energy(-1.0);
        assert_eq!(creature.energy(), 0.0);
        creature.set_health(11.0);
        assert_eq!(creature.health(), 10.0);
        creature.set_speed(-2.0);
        assert_eq!(creature.speed(), 0.0);
        creature.set_speed(40.0);
        assert_eq!(creature.speed(), 4.0);
    }

    #[test]
    fn test_hunting_moves_towards_food() {
        let (mut creature, mut rng) = spawn(facing_east_at(0.0, 0.0));
        let foods = vec![Food::new(FoodId(1), Position::new(60.0, 0.0), 15.0, false)];

        creature.update(1.0, None, &foods, &BehaviorConfig::default(), &mut rng);

        assert_eq!(creature.state(), CreatureState::Hunting);
        assert_eq!(creature.target(), Some(FoodId(1)));
        assert!(creature.direction.abs() < 1e-12);
        assert!((creature.position.x - 3.2).abs() < 1e-9);
        assert!((creature.energy() - (100.0 - 3.2 * 0.02)).abs() < 1e-9);
    }

    #[test]
    fn test_fatigue_slows_tired_creature() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            energy: Some(50.0),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(1), Position::new(60.0, 0.0), 15.0, false)];

        creature.update(1.0, None, &foods, &BehaviorConfig::default(), &mut rng);

        let expected = 3.2 * (0.3 + 0.7 * 0.5);
        assert!((creature.speed() - expected).abs() < 1e-9);
        assert!((creature.position.x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_chasing_target_out_of_sight() {
        let (mut creature, mut rng) = spawn(facing_east_at(0.0, 0.0));
        let foods = vec![Food::new(FoodId(1), Position::new(60.0, 0.0), 15.0, false)];
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        // Turn away; the remembered target still pulls it back
        creature.direction = std::f64::consts::PI;
        creature.update(1.0, None, &foods, &behavior, &mut rng);

        assert_eq!(creature.state(), CreatureState::Hunting);
        assert!(creature.direction.abs() < 1e-12);
    }

    #[test]
    fn test_eating_sequence_applies_nutrition() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            health: Some(5.0),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(9), Position::new(5.0, 0.0), 3.0, false)];
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        assert_eq!(creature.state(), CreatureState::Eating);
        assert_eq!(creature.speed(), 0.0);

        let duration = creature.eating_duration();
        for _ in 0..duration - 1 {
            creature.update(1.0, None, &foods, &behavior, &mut rng);
            assert_eq!(creature.state(), CreatureState::Eating);
            assert_eq!(creature.health(), 5.0);
        }
        creature.update(1.0, None, &foods, &behavior, &mut rng);

        assert_eq!(creature.health(), 8.0);
        assert_eq!(creature.state(), CreatureState::Wandering);
        assert_eq!(creature.target(), None);
        assert_eq!(creature.take_last_consumed(), Some(FoodId(9)));
        assert_eq!(creature.last_consumed(), None);
        assert_eq!(creature.position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_nutrition_is_clamped() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            health: Some(9.0),
            eating_duration: Some(2),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(1), Position::new(5.0, 0.0), 15.0, false)];
        let behavior = BehaviorConfig::default();

        for _ in 0..3 {
            creature.update(1.0, None, &foods, &behavior, &mut rng);
        }
        assert_eq!(creature.health(), 10.0);
        assert_eq!(creature.last_consumed(), Some(FoodId(1)));
    }

    #[test]
    fn test_poison_drains_energy_and_can_kill() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            health: Some(5.0),
            eating_duration: Some(1),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(2), Position::new(5.0, 0.0), -10.0, true)];
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        creature.update(1.0, None, &foods, &behavior, &mut rng);

        assert_eq!(creature.health(), 0.0);
        assert_eq!(creature.energy(), 80.0);
        assert_eq!(creature.last_consumed(), Some(FoodId(2)));

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        assert_eq!(creature.state(), CreatureState::Dead);
    }

    #[test]
    fn test_vanished_meal_gives_nothing() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            health: Some(5.0),
            eating_duration: Some(2),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(4), Position::new(5.0, 0.0), 3.0, false)];
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        creature.update(1.0, None, &[], &behavior, &mut rng);
        creature.update(1.0, None, &[], &behavior, &mut rng);

        assert_eq!(creature.health(), 5.0);
        assert_eq!(creature.last_consumed(), None);
        assert_eq!(creature.state(), CreatureState::Wandering);
    }

    #[test]
    fn test_stale_target_is_dropped() {
        let (mut creature, mut rng) = spawn(facing_east_at(0.0, 0.0));
        let foods = vec![Food::new(FoodId(1), Position::new(60.0, 0.0), 15.0, false)];
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &foods, &behavior, &mut rng);
        creature.update(1.0, None, &[], &behavior, &mut rng);

        assert_eq!(creature.target(), None);
        assert_eq!(creature.state(), CreatureState::Wandering);
    }

    #[test]
    fn test_sleep_restores_full_energy() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            energy: Some(0.0),
            sleep_duration: Some(7),
            ..facing_east_at(50.0, 50.0)
        });
        let behavior = BehaviorConfig::default();

        creature.update(1.0, None, &[], &behavior, &mut rng);
        assert_eq!(creature.state(), CreatureState::Sleeping);
        assert_eq!(creature.energy(), 0.0);

        for tick in 1..=7 {
            creature.update(1.0, None, &[], &behavior, &mut rng);
            if tick < 7 {
                assert_eq!(creature.state(), CreatureState::Sleeping);
                assert!(creature.energy() < 100.0);
            }
            assert_eq!(creature.speed(), 0.0);
        }

        assert_eq!(creature.energy(), 100.0);
        assert_eq!(creature.state(), CreatureState::Wandering);
        assert_eq!(creature.position, Position::new(50.0, 50.0));
    }

    #[test]
    fn test_exhaustion_drops_target() {
        let (mut creature, mut rng) = spawn(CreatureOptions {
            energy: Some(0.0),
            ..facing_east_at(0.0, 0.0)
        });
        let foods = vec![Food::new(FoodId(1), Position::new(60.0, 0.0), 15.0, false)];

        creature.update(1.0, None, &foods, &BehaviorConfig::default(), &mut rng);

        assert_eq!(creature.state(), CreatureState::Sleeping);
        assert_eq!(creature.target(), None);
    }

    #[test]
    fn test_wraps_across_left_edge() {
        let bounds = Bounds::new(800.0, 600.0);
        let (mut creature, mut rng) =
            spawn(CreatureOptions::at(Position::new(0.1, 300.0)).facing(std::f64::consts::PI));

        creature.update(1.0, Some(bounds), &[], &BehaviorConfig::default(), &mut rng);

        assert!(creature.position.x > 800.0 - 2.1);
        assert!(creature.position.x <= 800.0);
        assert!(bounds.contains(&creature.position));
    }

    #[test]
    fn test_update_wraps_exactly_onto_opposite_edge() {
        let bounds = Bounds::new(800.0, 600.0);
        let behavior = BehaviorConfig {
            wander_turn_chance: 0.0,
            wander_min_speed: 0.0,
            wander_max_speed: 1e-300,
            ..BehaviorConfig::default()
        };
        let (mut creature, mut rng) = spawn(facing_east_at(-1.0, 300.0));

        creature.update(1.0, Some(bounds), &[], &behavior, &mut rng);

        assert_eq!(creature.position, Position::new(799.0, 300.0));
    }

    #[test]
    fn test_wanders_without_food() {
        let (mut creature, mut rng) = spawn(facing_east_at(300.0, 300.0));
        let behavior = BehaviorConfig::default();

        for _ in 0..50 {
            creature.update(1.0, None, &[], &behavior, &mut rng);
            assert_eq!(creature.state(), CreatureState::Wandering);
            assert!(creature.speed() <= 2.0);
        }
        assert!(creature.energy() < 100.0);
        assert_eq!(creature.age(), 50);
    }

    #[test]
    fn test_draw_awake_shows_cone_first() {
        let (creature, _) = spawn(facing_east_at(10.0, 10.0));
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        creature.draw(&mut canvas);

        let shapes: Vec<_> = canvas.commands().iter().filter(|c| c.is_shape()).collect();
        assert!(matches!(shapes[0], DrawCommand::Polygon(points) if points.len() == CONE_SEGMENTS + 2));
        assert!(matches!(shapes[1], DrawCommand::Triangle(_)));
        assert_eq!(shapes.len(), 6);
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    fn test_draw_eating_hides_cone() {
        let (mut creature, mut rng) = spawn(facing_east_at(0.0, 0.0));
        let foods = vec![Food::new(FoodId(1), Position::new(5.0, 0.0), 15.0, false)];
        creature.update(1.0, None, &foods, &BehaviorConfig::default(), &mut rng);

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        creature.draw(&mut canvas);

        assert!(!canvas
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Polygon(_))));
        assert_eq!(canvas.shape_count(), 5);
    }

    #[test]
    fn test_draw_dead_marker() {
        let (mut creature, mut rng) = spawn(facing_east_at(20.0, 20.0));
        creature.set_health(0.0);
        creature.update(1.0, None, &[], &BehaviorConfig::default(), &mut rng);

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        creature.draw(&mut canvas);

        assert!(canvas.commands().contains(&DrawCommand::Fill(DEAD_COLOR)));
        assert!(!canvas
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Triangle(_) | DrawCommand::Polygon(_))));
        assert_eq!(canvas.shape_count(), 2);
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    fn test_creature_data() {
        let (creature, _) = spawn(facing_east_at(5.0, 6.0));
        let data = CreatureData::from(&creature);
        assert_eq!(data.id, creature.id);
        assert_eq!(data.position, creature.position);
        assert_eq!(data.state, CreatureState::Wandering);
    }

    proptest! {
        #[test]
        fn resource_mutations_stay_in_range(
            deltas in proptest::collection::vec(-1.0e4f64..1.0e4, 1..20),
        ) {
            let (mut creature, _) = spawn(CreatureOptions::default());
            for delta in deltas {
                creature.set_energy(creature.energy() + delta);
                creature.set_health(creature.health() + delta);
                creature.set_speed(creature.speed() + delta);
                prop_assert!((0.0..=creature.max_energy()).contains(&creature.energy()));
                prop_assert!((0.0..=creature.max_health()).contains(&creature.health()));
                prop_assert!((0.0..=creature.max_speed()).contains(&creature.speed()));
            }
        }

        #[test]
        fn dead_is_terminal(
            revive in -50.0f64..50.0,
            energy in -50.0f64..200.0,
            food_x in -20.0f64..20.0,
            ticks in 1usize..30,
        ) {
            let (mut creature, mut rng) = spawn(facing_east_at(0.0, 0.0));
            let behavior = BehaviorConfig::default();
            creature.set_health(0.0);
            creature.update(1.0, None, &[], &behavior, &mut rng);
            prop_assert_eq!(creature.state(), CreatureState::Dead);

            let foods = vec![Food::new(FoodId(1), Position::new(food_x, 0.0), 15.0, false)];
            for _ in 0..ticks {
                creature.set_health(revive);
                creature.set_energy(energy);
                creature.update(1.0, Some(Bounds::new(100.0, 100.0)), &foods, &behavior, &mut rng);
                prop_assert_eq!(creature.state(), CreatureState::Dead);
                prop_assert_eq!(creature.speed(), 0.0);
                prop_assert_eq!(creature.last_consumed(), None);
            }
        }

        #[test]
        fn update_preserves_invariants(
            seed in any::<u64>(),
            energy in 0.0f64..100.0,
            health in 0.0f64..10.0,
            ticks in 1usize..200,
        ) {
            let mut rng = create_rng(seed);
            let behavior = BehaviorConfig::default();
            let mut creature = Creature::new(
                CreatureId(1),
                CreatureOptions { energy: Some(energy), health: Some(health), ..Default::default() },
                &CreatureConfig::default(),
                &behavior,
                &mut rng,
            );
            let bounds = Bounds::new(400.0, 300.0);
            let foods = vec![
                Food::new(FoodId(1), Position::new(120.0, 100.0), 15.0, false),
                Food::new(FoodId(2), Position::new(90.0, 80.0), -10.0, true),
            ];
            for _ in 0..ticks {
                creature.update(1.0, Some(bounds), &foods, &behavior, &mut rng);
                prop_assert!((0.0..=creature.max_energy()).contains(&creature.energy()));
                prop_assert!((0.0..=creature.max_health()).contains(&creature.health()));
                prop_assert!((0.0..=creature.max_speed()).contains(&creature.speed()));
                prop_assert!(bounds.contains(&creature.position));
                creature.take_last_consumed();
            }
        }
    }
}
