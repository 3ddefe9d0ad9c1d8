/// Component definitions for the simulation layer.
///
/// Entities are plain records: a position, a velocity, an axis-aligned
/// collider and optionally health and drag. What an entity *does* is decided
/// by its `Behavior` tag.

use bevy::prelude::*;

// ============================================================================
// Position & Physics Components
// ============================================================================

/// Centre of the entity in world units (pixels).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimPosition(pub Vec2);

/// World units per second.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimVelocity(pub Vec2);

/// Fraction of the velocity kept each tick (applied before integration).
#[derive(Component, Debug, Clone, Copy)]
pub struct Drag(pub f32);

impl Default for Drag {
    fn default() -> Self {
        Self(0.5)
    }
}

// ============================================================================
// Collision Components
// ============================================================================

/// Axis-aligned box centred on `SimPosition`, tested against `Wall` tiles.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub size: Vec2,
}

impl Collider {
    pub fn square(side: f32) -> Self {
        Self { size: Vec2::splat(side) }
    }

    #[inline]
    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_center_size(center, self.size)
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::square(10.0)
    }
}

// ============================================================================
// Gameplay Components
// ============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtract `amount`; returns true if this blow was the lethal one.
    pub fn damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_dead();
        self.current -= amount;
        was_alive && self.is_dead()
    }

    pub fn kill(&mut self) {
        self.current = 0.0;
    }
}

/// Point-sized shot moved along its velocity each tick.
///
/// Walls are found by raycasting the segment travelled this tick, bodies by
/// intersecting that segment with their colliders. Projectiles carry no
/// `Behavior`, so the body integrator and separation never see them.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub damage: f32,
    /// Seconds left before it expires.
    pub life: f32,
    /// Fraction of the velocity kept each tick.
    pub drag: f32,
    /// Speed fraction kept when bouncing off a wall; zero stops it there.
    pub restitution: f32,
}

/// Closed set of entity behaviours.
///
/// `Player` is the pursuit target and drives chunk streaming, `Enemy` follows
/// paths toward the player, `Dummy` never moves.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Player,
    Enemy,
    Dummy,
}

impl Behavior {
    #[inline]
    pub fn is_static(self) -> bool {
        matches!(self, Behavior::Dummy)
    }
}
