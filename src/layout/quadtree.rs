use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Bounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Bounds {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (span * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two boxes; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        (dx * dx) + (dy * dy)
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = vec2(
            if index & 1 == 0 { -quarter } else { quarter },
            if index & 2 == 0 { -quarter } else { quarter },
        );
        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }
}

/// Region quadtree over node positions, carrying aggregates for
/// Barnes–Hut repulsion and the largest radius for collision pruning.
pub(super) struct Quad {
    pub(super) bounds: Bounds,
    pub(super) centroid: Vec2,
    pub(super) count: f32,
    pub(super) max_radius: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<Quad>>; 4],
}

impl Quad {
    pub(super) fn build(points: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = Bounds::enclosing(points)?;
        Some(Self::subdivide(
            bounds,
            (0..points.len()).collect(),
            points,
            radii,
            0,
        ))
    }

    fn subdivide(
        bounds: Bounds,
        members: Vec<usize>,
        points: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let count = members.len() as f32;
        let mut centroid = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &members {
            centroid += points[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }
        if count > 0.0 {
            centroid /= count;
        }

        let mut quad = Self {
            bounds,
            centroid,
            count,
            max_radius,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || quad.members.len() <= LEAF_CAPACITY {
            return quad;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &quad.members {
            buckets[bounds.quadrant_of(points[index])].push(index);
        }

        // Coincident points would recurse to MAX_DEPTH without splitting.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return quad;
        }

        for (slot, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                quad.children[slot] = Some(Box::new(Self::subdivide(
                    bounds.quadrant(slot),
                    bucket,
                    points,
                    radii,
                    depth + 1,
                )));
            }
        }
        quad.members.clear();
        quad
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Quad> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_members(quad: &Quad, out: &mut Vec<usize>) {
        out.extend_from_slice(&quad.members);
        for child in quad.children() {
            leaf_members(child, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let points = (0..50)
            .map(|index| vec2((index % 7) as f32 * 13.0, (index / 7) as f32 * 29.0))
            .collect::<Vec<_>>();
        let radii = vec![5.0; points.len()];
        let tree = Quad::build(&points, &radii).expect("finite points");

        let mut members = Vec::new();
        leaf_members(&tree, &mut members);
        members.sort_unstable();
        assert_eq!(members, (0..50).collect::<Vec<_>>());
        assert!(!tree.is_leaf());
        assert_eq!(tree.count, 50.0);
        assert_eq!(tree.max_radius, 5.0);
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let points = vec![vec2(3.0, 3.0); 20];
        let radii = vec![1.0; 20];
        let tree = Quad::build(&points, &radii).expect("finite points");
        assert!(tree.is_leaf());
        assert_eq!(tree.members.len(), 20);
    }

    #[test]
    fn non_finite_points_yield_no_tree() {
        assert!(Quad::build(&[vec2(f32::NAN, 0.0)], &[1.0]).is_none());
        assert!(Quad::build(&[], &[]).is_none());
    }

    #[test]
    fn gap_is_zero_for_overlapping_boxes() {
        let a = Bounds {
            center: vec2(0.0, 0.0),
            half_extent: 5.0,
        };
        let b = Bounds {
            center: vec2(8.0, 0.0),
            half_extent: 5.0,
        };
        let c = Bounds {
            center: vec2(20.0, 0.0),
            half_extent: 5.0,
        };
        assert_eq!(a.gap_sq(b), 0.0);
        assert_eq!(a.gap_sq(c), 100.0);
        assert!(a.contains(vec2(5.0, -5.0)));
        assert_eq!(a.side(), 10.0);
    }
}
