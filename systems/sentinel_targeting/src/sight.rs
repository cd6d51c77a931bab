//! Discrete ray march deciding whether a sentinel can see its target.

use dungeon_sentinel_core::{
    Collider, ColliderKind, SentinelSnapshot, SentinelTuning, TargetSnapshot, TilePos, Vector2,
    WorldRect,
};

/// Edge length of the probe rectangle stepped along the ray.
const PROBE_SIZE: f32 = 1.0;

/// Outcome of a single line-of-sight trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineOfSight {
    /// The probe reached the target, or ran out of steps without being blocked.
    Clear,
    /// The target lies at or beyond the maximum sight range.
    OutOfRange,
    /// A collider intersected the probe before the target did.
    Blocked {
        /// Tile of the blocking collider.
        tile: TilePos,
        /// Kind of the blocking collider.
        kind: ColliderKind,
    },
}

impl LineOfSight {
    /// Whether the target counts as visible.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }
}

/// Marches a 1x1 probe from `origin` toward the target center.
///
/// Probes start one step from the origin and are spaced `tuning.probe_step`
/// apart up to the maximum range. At each probe colliders are tested before
/// the target, so a wall sharing a probe with the target still blocks. The
/// collider on `ignore` is skipped; a sentinel passes its own tile there.
#[must_use]
pub fn trace_line_of_sight(
    origin: Vector2,
    target: &TargetSnapshot,
    colliders: &[Collider],
    ignore: Option<TilePos>,
    tuning: &SentinelTuning,
    tile_size: f32,
) -> LineOfSight {
    let offset = target.center() - origin;
    let max_range = tuning.max_range(tile_size);
    if offset.magnitude() >= max_range {
        return LineOfSight::OutOfRange;
    }

    let direction = offset.normalize();
    let steps = (max_range / tuning.probe_step).floor() as u32;
    for step in 1..=steps {
        let point = origin + direction * (tuning.probe_step * step as f32);
        let probe = WorldRect::new(point.x(), point.y(), PROBE_SIZE, PROBE_SIZE);

        let blocker = colliders
            .iter()
            .filter(|collider| Some(collider.tile()) != ignore)
            .find(|collider| collider.rect().intersects(&probe));
        if let Some(collider) = blocker {
            return LineOfSight::Blocked {
                tile: collider.tile(),
                kind: collider.kind(),
            };
        }

        if target.bounds().intersects(&probe) {
            return LineOfSight::Clear;
        }
    }

    LineOfSight::Clear
}

/// Returns whether `sentinel` has an unobstructed view of `target`.
///
/// The ray starts at the sentinel's center and ignores the collider on the
/// sentinel's own tile.
#[must_use]
pub fn can_see_target(
    sentinel: &SentinelSnapshot,
    target: &TargetSnapshot,
    colliders: &[Collider],
    tuning: &SentinelTuning,
    tile_size: f32,
) -> bool {
    trace_line_of_sight(
        sentinel.center(),
        target,
        colliders,
        Some(sentinel.tile),
        tuning,
        tile_size,
    )
    .is_clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_sentinel_core::{Health, SentinelId};
    use std::time::Duration;

    const TILE: f32 = 48.0;

    fn sentinel_at(column: u32, row: u32) -> SentinelSnapshot {
        let tile = TilePos::new(column, row);
        let bounds = WorldRect::from_tile(tile, TILE);
        SentinelSnapshot {
            id: SentinelId::new(0),
            tile,
            position: tile.world_origin(TILE),
            bounds,
            health: Health::new(3),
            timer: Duration::ZERO,
            threshold: Duration::from_millis(1_000),
        }
    }

    fn target_at(x: f32, y: f32) -> TargetSnapshot {
        TargetSnapshot::centered(Vector2::new(x, y), 32.0, 32.0)
    }

    fn wall(column: u32, row: u32) -> Collider {
        Collider::new(ColliderKind::Wall, TilePos::new(column, row), TILE)
    }

    #[test]
    fn target_below_with_nothing_between_is_visible() {
        let sentinel = sentinel_at(10, 10);
        assert_eq!(sentinel.position, Vector2::new(480.0, 480.0));

        let visible = can_see_target(
            &sentinel,
            &target_at(480.0, 720.0),
            &[],
            &SentinelTuning::default(),
            TILE,
        );
        assert!(visible);
    }

    #[test]
    fn target_beyond_range_is_rejected_before_stepping() {
        let sentinel = sentinel_at(10, 10);
        let tuning = SentinelTuning::default();
        let max_range = tuning.max_range(TILE);

        let cases = [
            (Vector2::new(1.0, 0.0), max_range),
            (Vector2::new(0.0, -1.0), max_range),
            (Vector2::new(-0.6, 0.8), max_range + 1.0),
        ];
        for (direction, distance) in cases {
            let center = sentinel.center() + direction * distance;
            let outcome = trace_line_of_sight(
                sentinel.center(),
                &target_at(center.x(), center.y()),
                &[],
                Some(sentinel.tile),
                &tuning,
                TILE,
            );
            assert_eq!(outcome, LineOfSight::OutOfRange);
        }
    }

    #[test]
    fn wall_between_sentinel_and_target_blocks() {
        let sentinel = sentinel_at(10, 10);
        let colliders = [wall(10, 12), wall(3, 3)];

        let outcome = trace_line_of_sight(
            sentinel.center(),
            &target_at(480.0, 720.0),
            &colliders,
            Some(sentinel.tile),
            &SentinelTuning::default(),
            TILE,
        );

        assert_eq!(
            outcome,
            LineOfSight::Blocked {
                tile: TilePos::new(10, 12),
                kind: ColliderKind::Wall,
            }
        );
    }

    #[test]
    fn own_tile_never_blocks() {
        let sentinel = sentinel_at(10, 10);
        let own = Collider::new(ColliderKind::EnemySpawn, sentinel.tile, TILE);

        assert!(can_see_target(
            &sentinel,
            &target_at(480.0, 720.0),
            &[own],
            &SentinelTuning::default(),
            TILE,
        ));
    }

    #[test]
    fn other_sentinel_tiles_block_like_walls() {
        let sentinel = sentinel_at(10, 10);
        let other = Collider::new(ColliderKind::EnemySpawn, TilePos::new(10, 12), TILE);

        assert!(!can_see_target(
            &sentinel,
            &target_at(480.0, 720.0),
            &[other],
            &SentinelTuning::default(),
            TILE,
        ));
    }

    #[test]
    fn walls_behind_the_target_are_irrelevant() {
        let sentinel = sentinel_at(10, 10);
        let colliders = [wall(10, 16), wall(10, 17)];

        assert!(can_see_target(
            &sentinel,
            &target_at(480.0, 720.0),
            &colliders,
            &SentinelTuning::default(),
            TILE,
        ));
    }

    #[test]
    fn target_on_the_origin_is_visible() {
        let sentinel = sentinel_at(4, 4);
        let center = sentinel.center();

        assert!(can_see_target(
            &sentinel,
            &target_at(center.x(), center.y()),
            &[wall(5, 4)],
            &SentinelTuning::default(),
            TILE,
        ));
    }
}
