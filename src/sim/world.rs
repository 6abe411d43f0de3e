//! Collision world: typed obstacles and nearest-hit ray queries
//!
//! Every obstacle is an oriented box. The world is a read-only snapshot built
//! by the rules layer at the start of each tick; the ball sweep only reads it.

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{EPSILON, TIE_DISTANCE};
use crate::{normalize_angle, rotate};

/// Stable obstacle identifier (also the deterministic tie-break order)
pub type ObstacleId = u32;

/// End of the travel axis a goal guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Negative end of the travel axis (left in Pong, bottom in Breakout)
    Player,
    /// Positive end of the travel axis
    Opponent,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Obstacle kinds, each with its own collision response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Outer boundary, reflects specularly
    Wall,
    /// Shaped paddle surface
    Paddle,
    /// Destructible block
    Block,
    /// Trigger volume behind a paddle
    Goal(Side),
}

impl ObstacleKind {
    /// Collision category this kind belongs to
    pub fn category(&self) -> CollisionMask {
        match self {
            ObstacleKind::Wall => CollisionMask::WALLS,
            ObstacleKind::Paddle => CollisionMask::PADDLES,
            ObstacleKind::Block => CollisionMask::BLOCKS,
            ObstacleKind::Goal(_) => CollisionMask::GOALS,
        }
    }

    /// Triggers report entry but never block the ball
    pub fn is_trigger(&self) -> bool {
        matches!(self, ObstacleKind::Goal(_))
    }
}

/// Collision categories as bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionMask(u32);

impl CollisionMask {
    pub const NONE: Self = Self(0);
    pub const WALLS: Self = Self(1 << 0);
    pub const PADDLES: Self = Self(1 << 1);
    pub const BLOCKS: Self = Self(1 << 2);
    pub const GOALS: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if any category in `other` is set
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for CollisionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// An oriented box obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub center: Vec2,
    /// Half size along the local x (face) and local y (normal) axes
    pub half_extents: Vec2,
    /// Counter-clockwise rotation (radians) of the local frame
    pub rotation: f32,
}

impl Obstacle {
    /// Axis-aligned obstacle of the given full size
    pub fn new(id: ObstacleId, kind: ObstacleKind, center: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            center,
            half_extents: size.abs() * 0.5,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = normalize_angle(rotation);
        self
    }

    /// World direction of the local +y axis (a paddle's outward face normal)
    #[inline]
    pub fn up(&self) -> Vec2 {
        rotate(Vec2::Y, self.rotation)
    }

    /// Full extent along the local x axis
    #[inline]
    pub fn width(&self) -> f32 {
        self.half_extents.x * 2.0
    }

    /// Transform a world point into the obstacle's unscaled local frame
    #[inline]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate(point - self.center, -self.rotation)
    }

    /// Check whether a world point lies inside the box
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.half_extents.x && local.y.abs() <= self.half_extents.y
    }

    /// Ray/box slab test
    ///
    /// `direction` must be unit length. Returns the entry distance and the world
    /// normal of the entered face. Rays starting inside the box, or whose entry
    /// lies behind the origin, do not hit.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        let o = self.to_local(origin);
        let d = rotate(direction, -self.rotation);

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_normal = Vec2::ZERO;

        for (o_a, d_a, h, axis) in [
            (o.x, d.x, self.half_extents.x, Vec2::X),
            (o.y, d.y, self.half_extents.y, Vec2::Y),
        ] {
            if d_a.abs() < EPSILON {
                // Parallel to this slab: must already be between its faces
                if o_a.abs() > h {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d_a;
            let mut t1 = (-h - o_a) * inv;
            let mut t2 = (h - o_a) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_near {
                t_near = t1;
                near_normal = if d_a > 0.0 { -axis } else { axis };
            }
            t_far = t_far.min(t2);

            if t_near > t_far {
                return None;
            }
        }

        if t_near < 0.0 || t_near > max_distance || near_normal == Vec2::ZERO {
            return None;
        }

        Some((t_near, rotate(near_normal, self.rotation)))
    }
}

/// Nearest obstacle along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub point: Vec2,
    /// World normal of the entered face
    pub normal: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
    /// Snapshot of the obstacle that was hit
    pub obstacle: Obstacle,
}

/// Read-only obstacle snapshot for one tick
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    /// Registration order (the tie-break order for simultaneous hits)
    obstacles: Vec<Obstacle>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
        }
    }

    pub fn with_obstacles(obstacles: impl IntoIterator<Item = Obstacle>) -> Self {
        Self {
            obstacles: obstacles.into_iter().collect(),
        }
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn extend(&mut self, obstacles: impl IntoIterator<Item = Obstacle>) {
        self.obstacles.extend(obstacles);
    }

    /// Remove an obstacle, keeping the order of the rest
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let index = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(index))
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Closest obstacle of any category along a ray
    pub fn query(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        include_triggers: bool,
    ) -> Option<HitResult> {
        self.query_masked(origin, direction, max_distance, CollisionMask::ALL, include_triggers)
    }

    /// Closest obstacle whose category is in `mask` along a ray
    ///
    /// Hits within `TIE_DISTANCE` of each other are simultaneous: a goal wins
    /// over a solid obstacle, otherwise the earliest registered obstacle wins.
    pub fn query_masked(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
        include_triggers: bool,
    ) -> Option<HitResult> {
        self.query_excluding(origin, direction, max_distance, mask, include_triggers, &[])
    }

    /// Like `query_masked`, ignoring the obstacles listed in `skip`
    pub fn query_excluding(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
        include_triggers: bool,
        skip: &[ObstacleId],
    ) -> Option<HitResult> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || !(max_distance >= 0.0) {
            return None;
        }

        let mut best: Option<HitResult> = None;

        for obstacle in &self.obstacles {
            if !mask.intersects(obstacle.kind.category()) {
                continue;
            }
            if (obstacle.kind.is_trigger() && !include_triggers) || skip.contains(&obstacle.id) {
                continue;
            }
            let Some((distance, normal)) = obstacle.raycast(origin, direction, max_distance)
            else {
                continue;
            };

            let replace = match &best {
                None => true,
                Some(current) => {
                    if distance < current.distance - TIE_DISTANCE {
                        true
                    } else if distance <= current.distance + TIE_DISTANCE {
                        obstacle.kind.is_trigger() && !current.obstacle.kind.is_trigger()
                    } else {
                        false
                    }
                }
            };

            if replace {
                best = Some(HitResult {
                    point: origin + direction * distance,
                    normal,
                    distance,
                    obstacle: *obstacle,
                });
            }
        }

        best
    }
}
