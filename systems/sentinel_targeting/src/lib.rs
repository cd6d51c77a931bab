#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns sentinel readiness into attack and rearm commands.

mod sight;

use dungeon_sentinel_core::{
    Collider, Command, Event, SentinelId, SentinelTuning, SentinelView, TargetSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

pub use sight::{can_see_target, trace_line_of_sight, LineOfSight};

/// Decides, for every sentinel that became ready, whether it attacks.
///
/// Thresholds for the next countdown are drawn from an owned seeded RNG so a
/// replay with the same seed and inputs yields the same commands.
#[derive(Debug)]
pub struct SentinelTargeting {
    rng: ChaCha8Rng,
    ready: Vec<SentinelId>,
}

impl SentinelTargeting {
    /// Creates a targeting system whose threshold draws derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            ready: Vec::new(),
        }
    }

    /// Consumes `SentinelReady` events and appends the resulting commands.
    ///
    /// A visible target yields `FireAttack` toward its center. Every ready
    /// sentinel that is still alive is rearmed afterwards, whether it fired or
    /// not. Readiness for sentinels missing from `sentinels` is dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        events: &[Event],
        sentinels: &SentinelView,
        colliders: &[Collider],
        target: &TargetSnapshot,
        tuning: &SentinelTuning,
        tile_size: f32,
        out: &mut Vec<Command>,
    ) {
        self.ready.clear();
        self.ready
            .extend(events.iter().filter_map(|event| match event {
                Event::SentinelReady { sentinel } => Some(*sentinel),
                _ => None,
            }));

        for id in &self.ready {
            let Some(sentinel) = sentinels.get(*id) else {
                continue;
            };

            if can_see_target(sentinel, target, colliders, tuning, tile_size) {
                let direction = (target.center() - sentinel.center()).normalize();
                trace!(
                    sentinel = id.get(),
                    x = direction.x(),
                    y = direction.y(),
                    "sentinel fires"
                );
                out.push(Command::FireAttack {
                    sentinel: *id,
                    direction,
                });
            }

            out.push(Command::RearmSentinel {
                sentinel: *id,
                threshold: tuning.draw_threshold(&mut self.rng),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_sentinel_core::{
        ColliderKind, Health, SentinelSnapshot, TilePos, Vector2, WorldRect,
    };
    use std::time::Duration;

    const TILE: f32 = 48.0;

    fn view() -> SentinelView {
        let snapshot = |id: u32, column: u32, row: u32| {
            let tile = TilePos::new(column, row);
            SentinelSnapshot {
                id: SentinelId::new(id),
                tile,
                position: tile.world_origin(TILE),
                bounds: WorldRect::from_tile(tile, TILE),
                health: Health::new(3),
                timer: Duration::from_millis(1_000),
                threshold: Duration::from_millis(1_000),
            }
        };
        SentinelView::from_snapshots(vec![snapshot(0, 10, 10), snapshot(1, 20, 10)])
    }

    fn target() -> TargetSnapshot {
        TargetSnapshot::centered(Vector2::new(480.0, 720.0), 32.0, 32.0)
    }

    fn ready(ids: &[u32]) -> Vec<Event> {
        ids.iter()
            .map(|id| Event::SentinelReady {
                sentinel: SentinelId::new(*id),
            })
            .collect()
    }

    #[test]
    fn visible_target_fires_then_rearms() {
        let mut targeting = SentinelTargeting::new(5);
        let mut out = Vec::new();

        targeting.handle(
            &ready(&[0]),
            &view(),
            &[],
            &target(),
            &SentinelTuning::default(),
            TILE,
            &mut out,
        );

        assert_eq!(out.len(), 2);
        let Command::FireAttack {
            sentinel,
            direction,
        } = out[0]
        else {
            panic!("expected an attack, got {:?}", out[0]);
        };
        assert_eq!(sentinel, SentinelId::new(0));
        assert!((direction.magnitude() - 1.0).abs() < 1e-5);
        assert!(direction.y() > 0.0 && direction.x() < 0.0);

        let Command::RearmSentinel { threshold, .. } = out[1] else {
            panic!("expected a rearm, got {:?}", out[1]);
        };
        assert!((900..=1_500).contains(&threshold.as_millis()));
    }

    #[test]
    fn blocked_sentinel_only_rearms() {
        let mut targeting = SentinelTargeting::new(5);
        let wall = Collider::new(ColliderKind::Wall, TilePos::new(10, 12), TILE);
        let mut out = Vec::new();

        targeting.handle(
            &ready(&[0]),
            &view(),
            &[wall],
            &target(),
            &SentinelTuning::default(),
            TILE,
            &mut out,
        );

        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0],
            Command::RearmSentinel { sentinel, .. } if sentinel == SentinelId::new(0)
        ));
    }

    #[test]
    fn unrelated_events_and_unknown_sentinels_are_ignored() {
        let mut targeting = SentinelTargeting::new(5);
        let mut events = ready(&[7]);
        events.push(Event::TimeAdvanced {
            dt: Duration::from_millis(33),
        });
        let mut out = Vec::new();

        targeting.handle(
            &events,
            &view(),
            &[],
            &target(),
            &SentinelTuning::default(),
            TILE,
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn output_is_appended_in_event_order() {
        let mut targeting = SentinelTargeting::new(5);
        let mut out = vec![Command::Tick {
            dt: Duration::from_millis(33),
        }];

        targeting.handle(
            &ready(&[1, 0]),
            &view(),
            &[],
            &target(),
            &SentinelTuning::default(),
            TILE,
            &mut out,
        );

        let order: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::RearmSentinel { sentinel, .. } => Some(sentinel.get()),
                _ => None,
            })
            .collect();
        assert!(matches!(out[0], Command::Tick { .. }));
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn same_seed_draws_same_thresholds() {
        let draw = |seed| {
            let mut targeting = SentinelTargeting::new(seed);
            let mut out = Vec::new();
            for _ in 0..4 {
                targeting.handle(
                    &ready(&[0, 1]),
                    &view(),
                    &[],
                    &target(),
                    &SentinelTuning::default(),
                    TILE,
                    &mut out,
                );
            }
            out
        };

        assert_eq!(draw(9), draw(9));
    }
}
