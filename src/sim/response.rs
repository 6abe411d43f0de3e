//! Collision response rules
//!
//! Pure functions mapping an incoming velocity and impact data to an outgoing
//! velocity. None of this is physically realistic: paddles are shaped so edge
//! hits steer the ball outward, and blocks reflect about the travel axis.

use glam::Vec2;

use super::world::Obstacle;
use crate::consts::EPSILON;
use crate::settings::{SimulationParameters, TravelAxis};
use crate::{limit_angle, reflect, rotate};

/// Specular reflection off a flat wall
#[inline]
pub fn wall_response(velocity: Vec2, normal: Vec2) -> Vec2 {
    reflect(velocity, normal)
}

/// Lateral position of a contact on a paddle face
///
/// Normalized so the paddle edges are ±0.5. Zero-width paddles act flat.
pub fn impact_offset(point: Vec2, paddle: &Obstacle) -> f32 {
    let width = paddle.width();
    if width < EPSILON {
        return 0.0;
    }
    (paddle.to_local(point).x / width).clamp(-0.5, 0.5)
}

/// Paddle surface normal in the paddle's local frame
///
/// The paddle is modelled as the curve cos(0.5πx): flat in the middle and
/// bending away toward the edges. Its normal is (sin(0.5πx), 1), so a centre
/// hit bounces as off a flat paddle and an edge hit bounces outward.
pub fn paddle_fake_normal(offset: f32) -> Vec2 {
    let offset = offset.clamp(-0.5, 0.5);
    Vec2::new((0.5 * std::f32::consts::PI * offset).sin(), 1.0).normalize()
}

/// Velocity after hitting a shaped paddle
pub fn paddle_response(
    velocity: Vec2,
    point: Vec2,
    paddle: &Obstacle,
    params: &SimulationParameters,
) -> Vec2 {
    let offset = impact_offset(point, paddle);
    let normal = rotate(paddle_fake_normal(offset), paddle.rotation);
    let face = paddle.up();

    let mut out = reflect(velocity, normal);

    if let Some(max_change) = params.max_angle_change {
        let flat = reflect(velocity, face);
        out = limit_angle(out, flat, max_change);
    }

    out = limit_angle(out, face, params.max_ball_angle);
    out *= 1.0 + params.speed_increase_on_hit;
    speed_limit(out, params.speed_cap)
}

/// Velocity after hitting a block: reflect about the travel axis
#[inline]
pub fn block_response(velocity: Vec2, axis: TravelAxis) -> Vec2 {
    reflect(velocity, axis.unit())
}

/// Clamp speed to an optional cap
#[inline]
pub fn speed_limit(velocity: Vec2, cap: Option<f32>) -> Vec2 {
    match cap {
        Some(cap) => crate::clamp_length(velocity, cap),
        None => velocity,
    }
}

/// Keep the ball within `max_ball_angle` of the travel-axis end it is heading to
pub fn axis_angle_limit(velocity: Vec2, params: &SimulationParameters) -> Vec2 {
    let heading = params.travel_axis.heading(velocity);
    limit_angle(velocity, heading, params.max_ball_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signed_angle;
    use crate::sim::world::ObstacleKind;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn params() -> SimulationParameters {
        SimulationParameters {
            ball_speed: 5.0,
            max_ball_angle: 60f32.to_radians(),
            max_angle_change: None,
            serve_angle: 30f32.to_radians(),
            speed_increase_on_hit: 0.0,
            speed_cap: None,
            reset_wait: 0.5,
            travel_axis: TravelAxis::Vertical,
            spawn_origin: Vec2::ZERO,
            lateral_min: -3.0,
            lateral_max: 3.0,
            block_damage: 1.0,
        }
    }

    fn flat_paddle() -> Obstacle {
        Obstacle::new(1, ObstacleKind::Paddle, Vec2::new(0.0, -2.0), Vec2::new(2.0, 0.5))
    }

    #[test]
    fn test_wall_response() {
        let out = wall_response(Vec2::new(3.0, -4.0), Vec2::Y);
        assert!((out - Vec2::new(3.0, 4.0)).length() < 0.0001);
    }

    #[test]
    fn test_impact_offset() {
        let paddle = flat_paddle();
        assert!(impact_offset(Vec2::new(0.0, -1.75), &paddle).abs() < 0.0001);
        assert!((impact_offset(Vec2::new(0.5, -1.75), &paddle) - 0.25).abs() < 0.0001);
        // Beyond the edge clamps
        assert!((impact_offset(Vec2::new(-3.0, -1.75), &paddle) + 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_impact_offset_zero_width() {
        let paddle = Obstacle::new(1, ObstacleKind::Paddle, Vec2::ZERO, Vec2::new(0.0, 0.5));
        assert_eq!(impact_offset(Vec2::new(1.0, 0.25), &paddle), 0.0);
    }

    #[test]
    fn test_fake_normal_center_is_flat() {
        assert!((paddle_fake_normal(0.0) - Vec2::Y).length() < 0.0001);
    }

    #[test]
    fn test_fake_normal_edges_tilt_outward() {
        let right = paddle_fake_normal(0.5);
        let left = paddle_fake_normal(-0.5);
        assert!(right.x > 0.0 && left.x < 0.0);
        let tilt = signed_angle(Vec2::Y, right).abs();
        assert!(tilt > 30f32.to_radians() && tilt <= FRAC_PI_4);
    }

    #[test]
    fn test_paddle_center_hit_is_flat() {
        let paddle = flat_paddle();
        let out = paddle_response(Vec2::new(2.0, -5.0), Vec2::new(0.0, -1.75), &paddle, &params());
        assert!((out - Vec2::new(2.0, 5.0)).length() < 0.0001);
    }

    #[test]
    fn test_paddle_edge_hit_steers_outward() {
        let paddle = flat_paddle();
        let out = paddle_response(Vec2::new(0.0, -5.0), Vec2::new(0.9, -1.75), &paddle, &params());
        assert!(out.y > 0.0);
        assert!(out.x > 0.0);
    }

    #[test]
    fn test_paddle_rotated_face() {
        // Left paddle facing +x: a centre hit sends the ball back along +x
        let paddle =
            Obstacle::new(1, ObstacleKind::Paddle, Vec2::new(-8.0, 0.0), Vec2::new(2.0, 0.5))
                .with_rotation(-FRAC_PI_2);
        let out = paddle_response(Vec2::new(-5.0, 1.0), Vec2::new(-7.75, 0.0), &paddle, &params());
        assert!((out - Vec2::new(5.0, 1.0)).length() < 0.001);
    }

    #[test]
    fn test_paddle_max_angle_change() {
        let paddle = flat_paddle();
        let mut p = params();
        p.max_ball_angle = FRAC_PI_2;
        p.max_angle_change = Some(10f32.to_radians());
        let velocity = Vec2::new(0.0, -5.0);
        let out = paddle_response(velocity, Vec2::new(1.0, -1.75), &paddle, &p);
        let flat = reflect(velocity, Vec2::Y);
        assert!(signed_angle(flat, out).abs() <= 10f32.to_radians() + 1.0e-4);
    }

    #[test]
    fn test_paddle_speed_increase_capped() {
        let paddle = flat_paddle();
        let mut p = params();
        p.speed_increase_on_hit = 0.5;
        p.speed_cap = Some(6.0);
        let out = paddle_response(Vec2::new(0.0, -5.0), Vec2::new(0.0, -1.75), &paddle, &p);
        assert!((out.length() - 6.0).abs() < 0.0001);
    }

    #[test]
    fn test_block_response_flips_travel_component() {
        let out = block_response(Vec2::new(1.0, 4.0), TravelAxis::Vertical);
        assert!((out - Vec2::new(1.0, -4.0)).length() < 0.0001);
        let out = block_response(Vec2::new(1.0, 4.0), TravelAxis::Horizontal);
        assert!((out - Vec2::new(-1.0, 4.0)).length() < 0.0001);
    }

    #[test]
    fn test_axis_angle_limit() {
        let mut p = params();
        p.travel_axis = TravelAxis::Horizontal;
        // 80 degrees above -x
        let v = rotate(-Vec2::X, -80f32.to_radians()) * 5.0;
        let out = axis_angle_limit(v, &p);
        assert!(signed_angle(-Vec2::X, out).abs() <= p.max_ball_angle + 1.0e-4);
        assert!((out.length() - 5.0).abs() < 0.0001);
    }

    proptest! {
        #[test]
        fn prop_fake_normal_unit_and_monotonic(a in 0.0f32..0.5, b in 0.0f32..0.5) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for offset in [lo, hi, -lo, -hi] {
                prop_assert!((paddle_fake_normal(offset).length() - 1.0).abs() < 1.0e-5);
            }
            let tilt_lo = signed_angle(Vec2::Y, paddle_fake_normal(lo)).abs();
            let tilt_hi = signed_angle(Vec2::Y, paddle_fake_normal(-hi)).abs();
            prop_assert!(tilt_lo <= tilt_hi + 1.0e-6);
            prop_assert!(tilt_hi <= FRAC_PI_4 + 1.0e-6);
        }

        #[test]
        fn prop_paddle_response_respects_limits(
            theta in (PI + 0.1)..(2.0 * PI - 0.1),
            speed in 0.5f32..30.0,
            contact_x in -1.5f32..1.5,
            max_deg in 10.0f32..89.0,
            cap in 1.0f32..20.0,
        ) {
            let paddle = flat_paddle();
            let mut p = params();
            p.max_ball_angle = max_deg.to_radians();
            p.speed_increase_on_hit = 0.1;
            p.speed_cap = Some(cap);
            let velocity = Vec2::from_angle(theta) * speed;
            let out = paddle_response(velocity, Vec2::new(contact_x, -1.75), &paddle, &p);
            prop_assert!(out.length() <= cap + 1.0e-3);
            prop_assert!(signed_angle(paddle.up(), out).abs() <= p.max_ball_angle + 1.0e-3);
        }
    }
}
