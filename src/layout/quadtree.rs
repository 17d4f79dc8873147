//! Barnes-Hut quadtree over node positions.
//!
//! Each cell stores the count and centroid of the points below it so the
//! charge pass can treat a distant cell as a single aggregate body.

const QUADTREE_LEAF_CAPACITY: usize = 8;
const QUADTREE_MAX_DEPTH: usize = 12;

#[derive(Debug, Clone, Copy)]
pub(super) struct QuadBounds {
    pub(super) center_x: f32,
    pub(super) center_y: f32,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(xs: &[f32], ys: &[f32]) -> Option<Self> {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for (&x, &y) in xs.iter().zip(ys) {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
            return None;
        }

        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        Some(Self {
            center_x: (min_x + max_x) * 0.5,
            center_y: (min_y + max_y) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, x: f32, y: f32) -> bool {
        (x - self.center_x).abs() <= self.half_extent
            && (y - self.center_y).abs() <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let (dx, dy) = match quadrant {
            0 => (-quarter, -quarter),
            1 => (quarter, -quarter),
            2 => (-quarter, quarter),
            _ => (quarter, quarter),
        };

        Self {
            center_x: self.center_x + dx,
            center_y: self.center_y + dy,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, x: f32, y: f32) -> usize {
        match (x >= self.center_x, y >= self.center_y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }
}

pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) centroid_x: f32,
    pub(super) centroid_y: f32,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(xs: &[f32], ys: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::from_points(xs, ys)?;
        let indices = (0..xs.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, xs, ys, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        xs: &[f32],
        ys: &[f32],
        depth: usize,
    ) -> Self {
        let mut centroid_x = 0.0;
        let mut centroid_y = 0.0;
        for &index in &indices {
            centroid_x += xs[index];
            centroid_y += ys[index];
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            centroid_x /= mass;
            centroid_y /= mass;
        }

        let mut node = Self {
            bounds,
            centroid_x,
            centroid_y,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(xs[index], ys[index])].push(index);
        }

        // Coincident points would otherwise recurse to the depth limit.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                xs,
                ys,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}
