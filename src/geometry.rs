//! Axis-aligned rectangles used as quadtree boundaries and query ranges.

use glam::Vec2;

/// Origin plus extents. Containment is half-open: `[x, x+w) × [y, y+h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
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

    pub fn centered(center: Vec2, half_extent: f32) -> Self {
        Self::new(
            center.x - half_extent,
            center.y - half_extent,
            half_extent * 2.0,
            half_extent * 2.0,
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grows the far edges by one representable step so that points lying
    /// exactly on `right()` / `bottom()` become contained. Exact for
    /// rectangles anchored at the origin.
    pub fn closed_far_edges(&self) -> Self {
        Self::new(
            self.x,
            self.y,
            next_up(self.right()) - self.x,
            next_up(self.bottom()) - self.y,
        )
    }

    // NW, NE, SW, SE
    pub fn quadrants(&self) -> [Rect; 4] {
        let hw = self.w * 0.5;
        let hh = self.h * 0.5;
        let mid = Vec2::new(self.x + hw, self.y + hh);
        [
            Rect::new(self.x, self.y, hw, hh),
            Rect::new(mid.x, self.y, self.right() - mid.x, hh),
            Rect::new(self.x, mid.y, hw, self.bottom() - mid.y),
            Rect::new(mid.x, mid.y, self.right() - mid.x, self.bottom() - mid.y),
        ]
    }
}

fn next_up(value: f32) -> f32 {
    if value.is_nan() || value == f32::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f32::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(9.999, 4.999)));
        assert!(!r.contains(Vec2::new(10.0, 1.0)));
        assert!(!r.contains(Vec2::new(1.0, 5.0)));
        assert!(!r.contains(Vec2::new(-0.001, 1.0)));
        assert!(!r.contains(Vec2::new(f32::NAN, 1.0)));
    }

    #[test]
    fn intersection_rejects_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.intersects(&Rect::new(2.0, 2.0, 1.0, 1.0)));
        assert!(Rect::new(2.0, 2.0, 1.0, 1.0).intersects(&a));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(-20.0, -20.0, 5.0, 5.0)));
    }

    #[test]
    fn far_edges_become_contained() {
        let domain = Rect::new(0.0, 0.0, 800.0, 600.0);
        let closed = domain.closed_far_edges();
        assert!(!domain.contains(Vec2::new(800.0, 600.0)));
        assert!(closed.contains(Vec2::new(800.0, 600.0)));
        assert!(closed.contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        let [nw, ne, sw, se] = r.quadrants();
        assert_eq!(nw, Rect::new(10.0, 20.0, 50.0, 25.0));
        assert_eq!(ne.x, 60.0);
        assert_eq!(ne.right(), r.right());
        assert_eq!(sw.bottom(), r.bottom());
        assert_eq!(se.center(), Vec2::new(85.0, 57.5));
    }
}
