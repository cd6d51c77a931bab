//! Authoritative sentinel state.

use std::time::Duration;

use dungeon_sentinel_core::{
    Actor, Body, Health, SentinelId, SentinelSnapshot, TilePos, Vector2, WorldRect,
};

/// Stationary hostile unit stored inside a level.
#[derive(Clone, Debug)]
pub(crate) struct SentinelState {
    pub(crate) id: SentinelId,
    pub(crate) tile: TilePos,
    pub(crate) health: Health,
    body: Body,
    timer: Duration,
    threshold: Duration,
    awaiting_decision: bool,
}

impl SentinelState {
    pub(crate) fn new(
        id: SentinelId,
        tile: TilePos,
        tile_size: f32,
        health: Health,
        threshold: Duration,
    ) -> Self {
        Self {
            id,
            tile,
            health,
            body: Body::at_rest(
                tile.world_origin(tile_size),
                Vector2::new(tile_size, tile_size),
            ),
            timer: Duration::ZERO,
            threshold,
            awaiting_decision: false,
        }
    }

    pub(crate) fn center(&self) -> Vector2 {
        self.body.center()
    }

    /// Reports readiness exactly once per countdown cycle.
    pub(crate) fn take_ready(&mut self) -> bool {
        if self.awaiting_decision || self.timer < self.threshold {
            return false;
        }

        self.awaiting_decision = true;
        true
    }

    pub(crate) fn rearm(&mut self, threshold: Duration) {
        self.timer = Duration::ZERO;
        self.threshold = threshold;
        self.awaiting_decision = false;
    }

    pub(crate) fn snapshot(&self) -> SentinelSnapshot {
        SentinelSnapshot {
            id: self.id,
            tile: self.tile,
            position: self.body.position,
            bounds: self.bounds(),
            health: self.health,
            timer: self.timer,
            threshold: self.threshold,
        }
    }
}

impl Actor for SentinelState {
    fn position(&self) -> Vector2 {
        self.body.position
    }

    fn bounds(&self) -> WorldRect {
        self.body.bounds()
    }

    fn update(&mut self, dt: Duration) {
        self.timer = self.timer.saturating_add(dt);
    }
}
