//! Barnes-Hut quadtree for far-field repulsion
//!
//! Built fresh each tick from node positions. Cells far enough away (by the
//! `theta` opening criterion) are treated as a single body at their center of mass.

use crate::geometry::Vec2;
use crate::viewport::BoundingBox;

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Square region of the plane, by lower corner and side length
#[derive(Debug, Clone, Copy)]
struct Cell {
    origin: Vec2,
    size: f32,
}

impl Cell {
    /// Smallest square around `points` with a margin of one unit; `None` when empty
    fn enclosing(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let bounds = BoundingBox::from_points(points);
        if bounds.is_empty() {
            return None;
        }
        let size = bounds.width().max(bounds.height()).max(1.0) + 2.0;
        let half = size / 2.0;
        Some(Self {
            origin: bounds.center() - Vec2::new(half, half),
            size,
        })
    }

    fn midpoint(self) -> Vec2 {
        self.origin + Vec2::new(self.size / 2.0, self.size / 2.0)
    }

    /// Quadrant index: bit 0 set for the right half, bit 1 for the lower half
    fn quadrant(self, point: Vec2) -> usize {
        let mid = self.midpoint();
        usize::from(point.x >= mid.x) | usize::from(point.y >= mid.y) << 1
    }

    fn sub_cell(self, quadrant: usize) -> Self {
        let half = self.size / 2.0;
        let step = Vec2::new((quadrant & 1) as f32, (quadrant >> 1) as f32);
        Self {
            origin: self.origin + step * half,
            size: half,
        }
    }

    fn contains(self, point: Vec2) -> bool {
        let local = point - self.origin;
        (0.0..=self.size).contains(&local.x) && (0.0..=self.size).contains(&local.y)
    }
}

enum Body {
    /// Point indices handled exactly
    Leaf(Vec<usize>),
    /// Occupied quadrants only
    Split(Vec<QuadNode>),
}

pub(crate) struct QuadNode {
    cell: Cell,
    mass: f32,
    centroid: Vec2,
    body: Body,
}

impl QuadNode {
    /// Build a tree over the finite entries of `positions`; `None` when there are none
    pub(crate) fn build(positions: &[Vec2]) -> Option<Self> {
        let members: Vec<usize> = (0..positions.len())
            .filter(|&index| positions[index].is_finite())
            .collect();
        let cell = Cell::enclosing(members.iter().map(|&index| positions[index]))?;
        Some(Self::subdivide(cell, members, positions, 0))
    }

    fn subdivide(cell: Cell, members: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        let mut sum = Vec2::ZERO;
        for &index in &members {
            sum += positions[index];
            quadrants[cell.quadrant(positions[index])].push(index);
        }

        let mass = members.len() as f32;
        let centroid = if members.is_empty() { Vec2::ZERO } else { sum / mass };

        // Coincident points all land in one quadrant and are never split
        let occupied = quadrants.iter().filter(|q| !q.is_empty()).count();
        let body = if members.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH || occupied < 2 {
            Body::Leaf(members)
        } else {
            Body::Split(
                quadrants
                    .into_iter()
                    .enumerate()
                    .filter(|(_, quadrant)| !quadrant.is_empty())
                    .map(|(index, quadrant)| {
                        Self::subdivide(cell.sub_cell(index), quadrant, positions, depth + 1)
                    })
                    .collect(),
            )
        };

        Self {
            cell,
            mass,
            centroid,
            body,
        }
    }

    /// Accumulate the repulsion felt by `index` from every other point in the tree
    ///
    /// `pair_force(i, j)` yields the exact force on `i` from `j`; `body_force(delta, mass)`
    /// yields the approximated force from a distant cell.
    pub(crate) fn accumulate<P, B>(
        &self,
        index: usize,
        positions: &[Vec2],
        theta: f32,
        pair_force: &P,
        body_force: &B,
        force: &mut Vec2,
    ) where
        P: Fn(usize, usize) -> Vec2,
        B: Fn(Vec2, f32) -> Vec2,
    {
        if self.mass <= 0.0 {
            return;
        }

        let children = match &self.body {
            Body::Leaf(members) => {
                for &other in members {
                    if other != index {
                        *force += pair_force(index, other);
                    }
                }
                return;
            }
            Body::Split(children) => children,
        };

        let point = positions[index];
        let delta = point - self.centroid;
        let distance = delta.length().max(0.0001);
        if self.mass > 1.0 && !self.cell.contains(point) && self.cell.size / distance < theta {
            *force += body_force(delta, self.mass);
            return;
        }

        for child in children {
            child.accumulate(index, positions, theta, pair_force, body_force, force);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(positions: &[Vec2], index: usize) -> Vec2 {
        let mut total = Vec2::ZERO;
        for (other, &p) in positions.iter().enumerate() {
            if other != index {
                let delta = positions[index] - p;
                total += delta / delta.length_sq().max(1.0);
            }
        }
        total
    }

    fn grid(n: usize) -> Vec<Vec2> {
        (0..n * n)
            .map(|i| Vec2::new((i % n) as f32 * 10.0, (i / n) as f32 * 10.0))
            .collect()
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(QuadNode::build(&[]).is_none());
    }

    #[test]
    fn mass_and_centroid_cover_every_point() {
        let positions = grid(6);
        let tree = QuadNode::build(&positions).unwrap();
        assert_eq!(tree.mass, 36.0);
        assert!((tree.centroid - Vec2::new(25.0, 25.0)).length() < 1e-4);

        let Body::Split(children) = &tree.body else {
            panic!("expected a split root");
        };
        assert_eq!(children.iter().map(|c| c.mass).sum::<f32>(), 36.0);
        for child in children {
            assert!(tree.cell.contains(child.centroid));
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![Vec2::new(5.0, 5.0); 40];
        let tree = QuadNode::build(&positions).unwrap();
        match &tree.body {
            Body::Leaf(members) => assert_eq!(members.len(), 40),
            Body::Split(_) => panic!("coincident points were split"),
        }
    }

    #[test]
    fn non_finite_points_are_left_out() {
        let positions = vec![Vec2::new(1.0, 1.0), Vec2::new(f32::NAN, 0.0), Vec2::new(3.0, 1.0)];
        let tree = QuadNode::build(&positions).unwrap();
        assert_eq!(tree.mass, 2.0);
        assert_eq!(tree.centroid, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn quadrants_partition_the_cell() {
        let cell = Cell {
            origin: Vec2::ZERO,
            size: 8.0,
        };
        assert_eq!(cell.quadrant(Vec2::new(1.0, 1.0)), 0);
        assert_eq!(cell.quadrant(Vec2::new(5.0, 1.0)), 1);
        assert_eq!(cell.quadrant(Vec2::new(1.0, 5.0)), 2);
        assert_eq!(cell.quadrant(Vec2::new(5.0, 5.0)), 3);

        let lower_right = cell.sub_cell(3);
        assert_eq!(lower_right.origin, Vec2::new(4.0, 4.0));
        assert_eq!(lower_right.size, 4.0);
        assert!(lower_right.contains(Vec2::new(5.0, 5.0)));
        assert!(!lower_right.contains(Vec2::new(1.0, 5.0)));
    }

    #[test]
    fn zero_theta_matches_exact_sum() {
        let positions = grid(6);
        let tree = QuadNode::build(&positions).unwrap();
        let pair = |i: usize, j: usize| {
            let delta = positions[i] - positions[j];
            delta / delta.length_sq().max(1.0)
        };
        let body = |delta: Vec2, mass: f32| delta * mass / delta.length_sq().max(1.0);

        let mut force = Vec2::ZERO;
        tree.accumulate(7, &positions, 0.0, &pair, &body, &mut force);
        let expected = exact(&positions, 7);

        assert!((force - expected).length() < 1e-4);
    }

    #[test]
    fn approximation_stays_close_to_exact() {
        let positions = grid(12);
        let tree = QuadNode::build(&positions).unwrap();
        let pair = |i: usize, j: usize| {
            let delta = positions[i] - positions[j];
            delta / delta.length_sq().max(1.0)
        };
        let body = |delta: Vec2, mass: f32| delta * mass / delta.length_sq().max(1.0);

        let mut force = Vec2::ZERO;
        tree.accumulate(0, &positions, 0.8, &pair, &body, &mut force);
        let expected = exact(&positions, 0);

        let error = (force - expected).length() / expected.length();
        assert!(error < 0.2, "relative error {error}");
    }
}
