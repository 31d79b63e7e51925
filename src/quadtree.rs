//! Point quadtree rebuilt from scratch every tick.
//!
//! Each node exclusively owns its four children. A leaf holds up to
//! `capacity` points; inserting one more splits it into NW, NE, SW, SE
//! quadrants and moves every held point down. Nodes at [`MAX_TREE_DEPTH`]
//! never split and hold any overflow, so coincident points cannot recurse
//! forever.

use crate::constants::MAX_TREE_DEPTH;
use crate::geometry::Rect;
use glam::Vec2;

// `id` is the particle's index; equal positions are still distinct points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPoint {
    pub position: Vec2,
    pub id: usize,
}

#[derive(Debug)]
pub struct Quadtree {
    boundary: Rect,
    capacity: usize,
    depth: usize,
    points: Vec<QuadPoint>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(boundary: Rect, capacity: usize) -> Self {
        Self::with_depth(boundary, capacity.max(1), 0)
    }

    fn with_depth(boundary: Rect, capacity: usize, depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            depth,
            points: Vec::with_capacity(capacity),
            children: None,
        }
    }

    /// Builds a tree over `boundary` from an iterator of `(id, position)`.
    /// Returns the tree and the number of points that fell outside it.
    pub fn build<I>(boundary: Rect, capacity: usize, points: I) -> (Self, usize)
    where
        I: IntoIterator<Item = (usize, Vec2)>,
    {
        let mut tree = Self::new(boundary, capacity);
        let mut rejected = 0;
        for (id, position) in points {
            if !tree.insert(QuadPoint { position, id }) {
                rejected += 1;
            }
        }
        (tree, rejected)
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns `false` if the point lies outside this node's boundary.
    pub fn insert(&mut self, point: QuadPoint) -> bool {
        if !self.boundary.contains(point.position) {
            return false;
        }
        self.insert_contained(point);
        true
    }

    // Descends by midpoint comparison instead of re-testing child boundaries,
    // so rounding in the child extents can never lose a point.
    fn insert_contained(&mut self, point: QuadPoint) {
        if self.children.is_none() {
            if self.points.len() < self.capacity || self.depth >= MAX_TREE_DEPTH {
                self.points.push(point);
                return;
            }
            self.subdivide();
        }
        let q = quadrant_of(&self.boundary, point.position);
        if let Some(children) = self.children.as_mut() {
            children[q].insert_contained(point);
        }
    }

    fn subdivide(&mut self) {
        let depth = self.depth + 1;
        let [nw, ne, sw, se] = self.boundary.quadrants();
        let mut children = Box::new([
            Quadtree::with_depth(nw, self.capacity, depth),
            Quadtree::with_depth(ne, self.capacity, depth),
            Quadtree::with_depth(sw, self.capacity, depth),
            Quadtree::with_depth(se, self.capacity, depth),
        ]);
        for point in self.points.drain(..) {
            let q = quadrant_of(&self.boundary, point.position);
            children[q].insert_contained(point);
        }
        self.children = Some(children);
    }

    pub fn query(&self, range: &Rect) -> Vec<QuadPoint> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    /// Appends matches to `found` (which is not cleared). Order is depth-first
    /// NW, NE, SW, SE, then insertion order within a leaf.
    pub fn query_into(&self, range: &Rect, found: &mut Vec<QuadPoint>) {
        if !self.boundary.intersects(range) {
            return;
        }
        match &self.children {
            Some(children) => {
                for child in children.iter() {
                    child.query_into(range, found);
                }
            }
            None => found.extend(self.points.iter().filter(|p| range.contains(p.position))),
        }
    }

    pub fn len(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(Quadtree::len).sum(),
            None => self.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn for_each_leaf<F: FnMut(&Rect, usize, &[QuadPoint])>(&self, f: &mut F) {
        match &self.children {
            Some(children) => {
                for child in children.iter() {
                    child.for_each_leaf(f);
                }
            }
            None => f(&self.boundary, self.depth, &self.points),
        }
    }

    // Pre-order, root first
    pub fn boundaries(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        self.collect_boundaries(&mut out);
        out
    }

    fn collect_boundaries(&self, out: &mut Vec<Rect>) {
        out.push(self.boundary);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_boundaries(out);
            }
        }
    }
}

#[inline]
fn quadrant_of(boundary: &Rect, position: Vec2) -> usize {
    let mid = boundary.center();
    let east = position.x >= mid.x;
    let south = position.y >= mid.y;
    match (south, east) {
        (false, false) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (true, true) => 3,
    }
}
