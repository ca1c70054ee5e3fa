//! Per-tick kinematics and overlap tests for arcade games.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > 1e-6 { self * (1.0 / len) } else { Vec2::ZERO }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// A moving point mass. Units are pixels and pixels per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            acc: Vec2::ZERO,
        }
    }

    pub fn with_acceleration(mut self, acc: Vec2) -> Self {
        self.acc = acc;
        self
    }

    /// One semi-implicit Euler step: velocity first, then position.
    pub fn integrate(&mut self) {
        self.vel += self.acc;
        self.pos += self.vel;
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Strict axis-aligned overlap; touching edges do not count.
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Closest point of `rect` to the circle centre lies inside the circle.
pub fn circle_rect_overlap(circle: &Circle, rect: &Rect) -> bool {
    let closest = Vec2::new(
        circle.center.x.clamp(rect.x, rect.right()),
        circle.center.y.clamp(rect.y, rect.bottom()),
    );
    (circle.center - closest).length_squared() < circle.radius * circle.radius
}

/// Centre distance below the summed radii.
pub fn circle_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    (a.center - b.center).length_squared() < reach * reach
}

/// Which edges of the playfield bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Walls {
    pub const ALL: Walls = Walls {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    /// Side and top walls only; the floor is an exit.
    pub const NO_FLOOR: Walls = Walls {
        bottom: false,
        ..Walls::ALL
    };
}

/// Edges touched during [`reflect_in_bounds`].
///
/// `bottom` is also set when the floor is open and the body crossed it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflection {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Reflection {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Per-axis reflection of a round body of `radius` inside `bounds`.
///
/// A body past an active wall is clamped back inside and, if still heading
/// outwards, has that velocity component negated and scaled by `damping`.
pub fn reflect_in_bounds(
    body: &mut Body,
    radius: f32,
    bounds: &Rect,
    walls: Walls,
    damping: f32,
) -> Reflection {
    let mut hit = Reflection::default();

    if walls.left && body.pos.x < bounds.x + radius {
        body.pos.x = bounds.x + radius;
        if body.vel.x < 0.0 {
            body.vel.x = -body.vel.x * damping;
        }
        hit.left = true;
    }
    if walls.right && body.pos.x > bounds.right() - radius {
        body.pos.x = bounds.right() - radius;
        if body.vel.x > 0.0 {
            body.vel.x = -body.vel.x * damping;
        }
        hit.right = true;
    }
    if walls.top && body.pos.y < bounds.y + radius {
        body.pos.y = bounds.y + radius;
        if body.vel.y < 0.0 {
            body.vel.y = -body.vel.y * damping;
        }
        hit.top = true;
    }
    if body.pos.y > bounds.bottom() - radius {
        if walls.bottom {
            body.pos.y = bounds.bottom() - radius;
            if body.vel.y > 0.0 {
                body.vel.y = -body.vel.y * damping;
            }
        }
        hit.bottom = true;
    }
    hit
}

/// Wrap a cell coordinate onto a `cols x rows` torus.
pub fn wrap_cell(col: i32, row: i32, cols: i32, rows: i32) -> (i32, i32) {
    (col.rem_euclid(cols.max(1)), row.rem_euclid(rows.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_applies_velocity_after_acceleration() {
        let mut body = Body::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0))
            .with_acceleration(Vec2::new(0.0, 0.5));
        body.integrate();
        assert_eq!(body.vel, Vec2::new(1.0, 0.5));
        assert_eq!(body.pos, Vec2::new(1.0, 0.5));
        body.integrate();
        assert_eq!(body.pos, Vec2::new(2.0, 1.5));
    }

    #[test]
    fn left_wall_reflects_and_clamps() {
        let bounds = Rect::new(0.0, 0.0, 375.0, 500.0);
        let mut ball = Body::new(Vec2::new(10.0, 200.0), Vec2::new(-6.0, 3.0));
        ball.integrate();
        let hit = reflect_in_bounds(&mut ball, 8.0, &bounds, Walls::ALL, 1.0);
        assert!(hit.left);
        assert_eq!(ball.vel.x, 6.0);
        assert!(ball.pos.x >= 8.0);
        assert_eq!(ball.vel.y, 3.0);
    }

    #[test]
    fn damping_scales_reflected_component() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut ball = Body::new(Vec2::new(98.0, 50.0), Vec2::new(4.0, 0.0));
        let hit = reflect_in_bounds(&mut ball, 5.0, &bounds, Walls::ALL, 0.8);
        assert!(hit.right);
        assert!((ball.vel.x + 3.2).abs() < 1e-6);
        assert_eq!(ball.pos.x, 95.0);
    }

    #[test]
    fn open_floor_reports_without_reflecting() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut ball = Body::new(Vec2::new(50.0, 120.0), Vec2::new(0.0, 2.0));
        let hit = reflect_in_bounds(&mut ball, 5.0, &bounds, Walls::NO_FLOOR, 1.0);
        assert!(hit.bottom);
        assert_eq!(ball.vel.y, 2.0);
        assert_eq!(ball.pos.y, 120.0);
    }

    #[test]
    fn body_moving_away_is_not_flipped() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut ball = Body::new(Vec2::new(2.0, 50.0), Vec2::new(3.0, 0.0));
        reflect_in_bounds(&mut ball, 5.0, &bounds, Walls::ALL, 1.0);
        assert_eq!(ball.vel.x, 3.0);
        assert_eq!(ball.pos.x, 5.0);
    }

    #[test]
    fn rect_overlap_cases() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(rect_overlap(&a, &b));
        assert!(!rect_overlap(&a, &c));
        let touching = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert!(!rect_overlap(&a, &touching));
    }

    #[test]
    fn circle_rect_overlap_cases() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rect_overlap(&Circle::new(Vec2::new(14.0, 5.0), 5.0), &rect));
        assert!(!circle_rect_overlap(&Circle::new(Vec2::new(16.0, 5.0), 5.0), &rect));
        // Corner: distance sqrt(18) > 4.
        assert!(!circle_rect_overlap(&Circle::new(Vec2::new(13.0, 13.0), 4.0), &rect));
        assert!(circle_rect_overlap(&Circle::new(Vec2::new(5.0, 5.0), 1.0), &rect));
    }

    #[test]
    fn circle_overlap_uses_summed_radii() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 5.0);
        assert!(circle_overlap(&a, &Circle::new(Vec2::new(6.0, 8.0), 5.5)));
        assert!(!circle_overlap(&a, &Circle::new(Vec2::new(6.0, 8.0), 5.0)));
    }

    #[test]
    fn wrap_cell_handles_negatives() {
        assert_eq!(wrap_cell(-1, 0, 10, 10), (9, 0));
        assert_eq!(wrap_cell(10, 10, 10, 10), (0, 0));
        assert_eq!(wrap_cell(3, -11, 10, 10), (3, 9));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn reflection_keeps_ball_inside(
                x in -50.0f32..450.0,
                y in -50.0f32..550.0,
                dx in -20.0f32..20.0,
                dy in -20.0f32..20.0,
            ) {
                let bounds = Rect::new(0.0, 0.0, 375.0, 500.0);
                let mut ball = Body::new(Vec2::new(x, y), Vec2::new(dx, dy));
                ball.integrate();
                reflect_in_bounds(&mut ball, 8.0, &bounds, Walls::ALL, 1.0);
                prop_assert!(ball.pos.x >= 8.0 && ball.pos.x <= 367.0);
                prop_assert!(ball.pos.y >= 8.0 && ball.pos.y <= 492.0);
            }

            #[test]
            fn left_reflection_negates_dx(x in 0.0f32..8.0, dx in -10.0f32..-0.01) {
                let bounds = Rect::new(0.0, 0.0, 375.0, 500.0);
                let mut ball = Body::new(Vec2::new(x, 100.0), Vec2::new(dx, 0.0));
                let hit = reflect_in_bounds(&mut ball, 8.0, &bounds, Walls::ALL, 1.0);
                prop_assert!(hit.left);
                prop_assert_eq!(ball.vel.x, -dx);
                prop_assert!(ball.pos.x >= 8.0);
            }
        }
    }
}
