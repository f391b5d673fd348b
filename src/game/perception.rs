//! Vision cone perception tests

use std::f32::consts::TAU;

use super::kinematics::Vec2;

/// A directional sensing cone anchored at an observer.
///
/// In the arena the cone is the player's flashlight: an enemy caught in the
/// beam notices the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensingCone {
    pub origin: Vec2,
    /// Facing direction in radians (atan2 range)
    pub facing: f32,
    /// Exclusive maximum sensing distance
    pub range: f32,
    /// Half-width of the cone in radians
    pub half_angle: f32,
    /// Disabled cones never detect anything
    pub enabled: bool,
}

/// Smallest absolute angle between two headings, in `[0, π]`.
///
/// A plain `|a - b|` reports nearly `2π` for headings on either side of the
/// ±π seam; folding it back gives the true separation.
pub fn shortest_angle_diff(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs();
    diff.min(TAU - diff)
}

/// Perception model
pub struct PerceptionModel;

impl PerceptionModel {
    /// Whether `target` lies strictly inside the cone.
    pub fn can_see(cone: &SensingCone, target: Vec2) -> bool {
        if !cone.enabled {
            return false;
        }

        let dist = cone.origin.distance_to(target);
        if !(dist < cone.range) {
            return false;
        }

        let delta = target - cone.origin;
        let bearing = delta.y.atan2(delta.x);
        shortest_angle_diff(cone.facing, bearing) < cone.half_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn cone(origin: Vec2, facing: f32) -> SensingCone {
        SensingCone {
            origin,
            facing,
            range: 220.0,
            half_angle: 0.6,
            enabled: true,
        }
    }

    #[test]
    fn disabled_cone_sees_nothing() {
        let mut c = cone(Vec2::new(100.0, 100.0), 0.0);
        c.enabled = false;
        for target in [
            Vec2::new(101.0, 100.0),
            Vec2::new(150.0, 100.0),
            Vec2::new(100.0, 150.0),
        ] {
            assert!(!PerceptionModel::can_see(&c, target));
        }
    }

    #[test]
    fn range_is_exclusive() {
        let c = cone(Vec2::new(0.0, 0.0), 0.0);
        assert!(!PerceptionModel::can_see(&c, Vec2::new(220.0, 0.0)));
        assert!(!PerceptionModel::can_see(&c, Vec2::new(500.0, 0.0)));
        assert!(PerceptionModel::can_see(&c, Vec2::new(219.0, 0.0)));
    }

    #[test]
    fn target_on_facing_ray_is_seen() {
        for facing in [0.0, FRAC_PI_2, -FRAC_PI_2, 2.5, -2.5] {
            let origin = Vec2::new(400.0, 300.0);
            let c = cone(origin, facing);
            let target = origin + Vec2::from_angle(facing, 100.0);
            assert!(PerceptionModel::can_see(&c, target), "facing {facing}");
        }
    }

    #[test]
    fn wraparound_near_pi_is_handled() {
        // Bearing -3.0 is only ~0.28 rad away from a facing of 3.0.
        let origin = Vec2::new(400.0, 300.0);
        let c = cone(origin, 3.0);
        let target = origin + Vec2::from_angle(-3.0, 100.0);
        assert!(PerceptionModel::can_see(&c, target));
        assert!((shortest_angle_diff(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-5);
    }

    #[test]
    fn outside_half_angle_is_not_seen() {
        let origin = Vec2::new(400.0, 300.0);
        let c = cone(origin, 0.0);
        let edge = origin + Vec2::from_angle(0.61, 100.0);
        assert!(!PerceptionModel::can_see(&c, edge));
        let behind = origin + Vec2::from_angle(PI, 100.0);
        assert!(!PerceptionModel::can_see(&c, behind));
    }

    #[test]
    fn flashlight_pointed_at_enemy_sees_it() {
        let player = Vec2::new(100.0, 250.0);
        let c = cone(player, -FRAC_PI_2);
        assert!(PerceptionModel::can_see(&c, Vec2::new(100.0, 100.0)));
    }
}
