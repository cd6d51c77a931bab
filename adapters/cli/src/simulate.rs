//! Headless fixed-rate simulation with a scripted target walking the room chain.

use std::time::Duration;

use dungeon_sentinel_core::{
    Actor, Body, Command, Event, ExpiryReason, TargetSnapshot, Vector2, WorldRect,
    REFERENCE_TICK_RATE,
};
use dungeon_sentinel_system_generation::CorridorCarver;
use dungeon_sentinel_system_targeting::SentinelTargeting;
use dungeon_sentinel_world::{self as world, query, Level};
use serde::Serialize;
use tracing::{debug, info};

/// Edge length of the scripted target's bounding box.
const AVATAR_SIZE: f32 = 32.0;
/// Time between two strikes of the avatar against an adjacent sentinel.
const STRIKE_COOLDOWN: Duration = Duration::from_millis(500);
/// Strike reach measured in tiles between centers.
const STRIKE_REACH_TILES: f32 = 1.5;

/// Parameters of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimulationSettings {
    pub(crate) frames: u32,
    pub(crate) targeting_seed: u64,
    pub(crate) speed: f32,
}

/// Aggregate outcome of a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SimulationReport {
    pub(crate) frames: u32,
    pub(crate) attacks: u32,
    pub(crate) hits: u32,
    pub(crate) strikes: u32,
    pub(crate) sentinels_defeated: u32,
    pub(crate) sentinels_remaining: usize,
    pub(crate) reached_goal: bool,
}

/// Scripted target that walks a fixed route of waypoints.
#[derive(Clone, Debug)]
pub(crate) struct Avatar {
    body: Body,
    route: Vec<Vector2>,
    next: usize,
    speed: f32,
}

impl Avatar {
    pub(crate) fn new(start: Vector2, route: Vec<Vector2>, speed: f32) -> Self {
        let mut body = Body::at_rest(Vector2::ZERO, Vector2::new(AVATAR_SIZE, AVATAR_SIZE));
        body.center_on(start);
        Self {
            body,
            route,
            next: 0,
            speed,
        }
    }

    /// Follows every corridor of the level from the spawn room to the goal room.
    pub(crate) fn for_level(level: &Level, speed: f32) -> Self {
        let tile_size = query::tile_size(level);
        let route = CorridorCarver::route(query::rooms(level))
            .into_iter()
            .flat_map(|corridor| [corridor.start, corridor.elbow, corridor.end])
            .map(|tile| tile.world_center(tile_size))
            .chain(std::iter::once(query::goal_point(level)))
            .collect();
        Self::new(query::spawn_point(level), route, speed)
    }

    pub(crate) fn arrived(&self) -> bool {
        self.next >= self.route.len()
    }

    pub(crate) fn center(&self) -> Vector2 {
        self.body.center()
    }

    pub(crate) fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot::from_bounds(self.bounds())
    }
}

impl Actor for Avatar {
    fn position(&self) -> Vector2 {
        self.body.position
    }

    fn bounds(&self) -> WorldRect {
        self.body.bounds()
    }

    fn update(&mut self, dt: Duration) {
        let Some(&waypoint) = self.route.get(self.next) else {
            self.body.velocity = Vector2::ZERO;
            return;
        };

        let offset = waypoint - self.body.center();
        let reach = self.speed * REFERENCE_TICK_RATE as f32 * dt.as_secs_f32();
        if offset.magnitude() <= reach {
            self.body.center_on(waypoint);
            self.body.velocity = Vector2::ZERO;
            self.next += 1;
            return;
        }

        self.body.velocity = offset.normalize() * self.speed;
        self.body.update(dt);
    }
}

/// Runs the level at the reference tick rate for `settings.frames` frames.
///
/// Each frame the avatar moves, time advances, ready sentinels decide whether
/// to fire, projectiles touching the avatar are consumed as hits, and the
/// avatar strikes a sentinel within reach once its cooldown has elapsed.
pub(crate) fn run(level: &mut Level, settings: SimulationSettings) -> SimulationReport {
    let dt = Duration::from_secs(1) / REFERENCE_TICK_RATE;
    let reach = STRIKE_REACH_TILES * query::tile_size(level);
    let mut avatar = Avatar::for_level(level, settings.speed);
    let mut targeting = SentinelTargeting::new(settings.targeting_seed);
    let mut report = SimulationReport::default();
    let mut cooldown = Duration::ZERO;
    let mut events = Vec::new();
    let mut commands = Vec::new();

    for frame in 0..settings.frames {
        avatar.update(dt);
        let target = avatar.snapshot();
        cooldown = cooldown.saturating_sub(dt);

        events.clear();
        commands.clear();
        world::apply(level, Command::Tick { dt }, &mut events);

        let sentinels = query::sentinel_view(level);
        targeting.handle(
            &events,
            &sentinels,
            query::colliders(level),
            &target,
            query::tuning(level),
            query::tile_size(level),
            &mut commands,
        );

        for projectile in query::projectiles(level) {
            if projectile.bounds.intersects(target.bounds()) {
                commands.push(Command::RemoveProjectile {
                    projectile: projectile.id,
                });
            }
        }

        if cooldown.is_zero() {
            let adjacent = sentinels
                .iter()
                .find(|sentinel| (sentinel.center() - avatar.center()).magnitude() <= reach);
            if let Some(sentinel) = adjacent {
                commands.push(Command::DamageSentinel {
                    sentinel: sentinel.id,
                    amount: 1,
                });
                report.strikes += 1;
                cooldown = STRIKE_COOLDOWN;
            }
        }

        for command in commands.drain(..) {
            world::apply(level, command, &mut events);
        }

        for event in &events {
            match event {
                Event::AttackFired {
                    sentinel,
                    projectile,
                    direction,
                    ..
                } => {
                    report.attacks += 1;
                    info!(
                        frame,
                        sentinel = sentinel.get(),
                        projectile = projectile.get(),
                        dx = direction.x(),
                        dy = direction.y(),
                        "sentinel attacked"
                    );
                }
                Event::ProjectileExpired {
                    projectile,
                    reason: ExpiryReason::Removed,
                } => {
                    report.hits += 1;
                    debug!(frame, projectile = projectile.get(), "avatar hit");
                }
                Event::SentinelDefeated { sentinel, tile } => {
                    report.sentinels_defeated += 1;
                    info!(
                        frame,
                        sentinel = sentinel.get(),
                        column = tile.column(),
                        row = tile.row(),
                        "sentinel defeated by avatar"
                    );
                }
                _ => {}
            }
        }

        report.frames = frame + 1;
    }

    report.sentinels_remaining = query::sentinel_view(level).len();
    report.reached_goal = avatar.arrived();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_sentinel_system_generation::{GeneratorConfig, LevelGenerator};

    fn level(seed: u64) -> Level {
        LevelGenerator::new(GeneratorConfig {
            enemy_probability: 0.2,
            ..GeneratorConfig::default()
        })
        .expect("valid config")
        .generate_seeded(seed)
        .expect("level generates")
    }

    #[test]
    fn avatar_reaches_waypoints_in_order() {
        let start = Vector2::new(100.0, 100.0);
        let route = vec![Vector2::new(160.0, 100.0), Vector2::new(160.0, 40.0)];
        let mut avatar = Avatar::new(start, route, 3.0);
        let dt = Duration::from_secs(1) / REFERENCE_TICK_RATE;

        for _ in 0..19 {
            avatar.update(dt);
        }
        assert!(!avatar.arrived());
        assert!(avatar.center().x() > 150.0);

        for _ in 0..40 {
            avatar.update(dt);
        }
        assert!(avatar.arrived());
        assert_eq!(avatar.center(), Vector2::new(160.0, 40.0));
        assert_eq!(avatar.bounds().width(), AVATAR_SIZE);
    }

    #[test]
    fn avatar_route_starts_at_spawn_and_ends_at_goal() {
        let level = level(3);
        let mut avatar = Avatar::for_level(&level, 10.0);
        assert_eq!(avatar.center(), query::spawn_point(&level));

        let dt = Duration::from_secs(1) / REFERENCE_TICK_RATE;
        for _ in 0..20_000 {
            if avatar.arrived() {
                break;
            }
            avatar.update(dt);
        }
        assert!(avatar.arrived());
        assert_eq!(avatar.center(), query::goal_point(&level));
    }

    #[test]
    fn simulation_is_deterministic() {
        let settings = SimulationSettings {
            frames: 600,
            targeting_seed: 4,
            speed: 3.0,
        };

        let first = run(&mut level(9), settings);
        let second = run(&mut level(9), settings);

        assert_eq!(first, second);
        assert_eq!(first.frames, 600);
        assert!(first.hits <= first.attacks);
    }

    #[test]
    fn sentinel_count_balances() {
        let mut level = level(5);
        let before = query::sentinel_view(&level).len();
        let report = run(
            &mut level,
            SimulationSettings {
                frames: 900,
                targeting_seed: 1,
                speed: 4.0,
            },
        );

        assert_eq!(
            report.sentinels_remaining + report.sentinels_defeated as usize,
            before
        );
    }
}
