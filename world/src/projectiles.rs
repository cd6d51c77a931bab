//! In-flight attack projectiles.

use std::time::Duration;

use dungeon_sentinel_core::{
    Actor, Body, Collider, ExpiryReason, ProjectileId, ProjectileSnapshot, SentinelId, Vector2,
    WorldRect,
};

/// Edge length of a projectile's square bounding box in world units.
pub(crate) const PROJECTILE_SIZE: f32 = 8.0;

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    source: SentinelId,
    body: Body,
    travelled: f32,
}

impl ProjectileState {
    /// Launches a projectile centered on `origin` moving along `direction`.
    pub(crate) fn launch(
        id: ProjectileId,
        source: SentinelId,
        origin: Vector2,
        direction: Vector2,
        speed: f32,
    ) -> Self {
        let mut body = Body::at_rest(Vector2::ZERO, Vector2::new(PROJECTILE_SIZE, PROJECTILE_SIZE));
        body.center_on(origin);
        body.velocity = direction.normalize().scale(speed);
        Self {
            id,
            source,
            body,
            travelled: 0.0,
        }
    }

    /// Decides whether the projectile must leave the simulation.
    pub(crate) fn expiry(&self, walls: &[Collider], max_range: f32) -> Option<ExpiryReason> {
        let bounds = self.bounds();
        if walls.iter().any(|wall| wall.rect().intersects(&bounds)) {
            return Some(ExpiryReason::HitWall);
        }

        if self.travelled >= max_range {
            return Some(ExpiryReason::OutOfRange);
        }

        None
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            source: self.source,
            bounds: self.bounds(),
            velocity: self.body.velocity,
            travelled: self.travelled,
        }
    }
}

impl Actor for ProjectileState {
    fn position(&self) -> Vector2 {
        self.body.position
    }

    fn bounds(&self) -> WorldRect {
        self.body.bounds()
    }

    fn update(&mut self, dt: Duration) {
        self.travelled += self.body.integrate(dt).magnitude();
    }
}
