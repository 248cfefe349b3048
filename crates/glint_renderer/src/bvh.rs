//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built once over the bounding boxes of a primitive set and never mutated
//! afterwards. Nodes live in a flat arena and refer to contiguous ranges of
//! a permuted primitive index array, so traversal needs no allocation and
//! can run concurrently from any number of render threads.

use glint_math::{Aabb, Ray};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Traversal stack depth. Median splits keep the tree balanced, so this
/// covers far more primitives than fit in memory.
const MAX_DEPTH: usize = 64;

/// BVH node - either a branch with two children or a leaf with a range of
/// primitive indices.
#[derive(Debug, Clone, Copy)]
enum BvhNode {
    /// Internal node; children are arena indices.
    Branch { bbox: Aabb, left: u32, right: u32 },
    /// Leaf covering `indices[first..first + count]`.
    Leaf { bbox: Aabb, first: u32, count: u32 },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Index-based BVH over primitives identified by their position in the
/// bounds slice passed to [`Bvh::new`].
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
}

impl Bvh {
    /// Build a BVH from per-primitive bounding boxes.
    pub fn new(bounds: &[Aabb]) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(2 * bounds.len() / LEAF_MAX_SIZE + 1),
            indices: (0..bounds.len() as u32).collect(),
        };

        if !bounds.is_empty() {
            bvh.build(bounds, 0, bounds.len());
        }

        bvh
    }

    /// Recursive BVH construction over `indices[start..end]`.
    ///
    /// Simple median-split approach: sort primitives by centroid on the
    /// longest centroid axis, split in half, recurse. Returns the node index.
    fn build(&mut self, bounds: &[Aabb], start: usize, end: usize) -> u32 {
        let range = &mut self.indices[start..end];

        let bbox = range
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &bounds[i as usize]));

        let node_index = self.nodes.len() as u32;

        if range.len() <= LEAF_MAX_SIZE {
            self.nodes.push(BvhNode::Leaf {
                bbox,
                first: start as u32,
                count: range.len() as u32,
            });
            return node_index;
        }

        let centroid_bounds = Aabb::enclosing(range.iter().map(|&i| bounds[i as usize].centroid()));
        let axis = centroid_bounds.longest_axis();

        range.sort_unstable_by(|&a, &b| {
            let a_val = bounds[a as usize].centroid()[axis];
            let b_val = bounds[b as usize].centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        // Reserve this slot; children are filled in after recursion
        self.nodes.push(BvhNode::Leaf {
            bbox,
            first: 0,
            count: 0,
        });

        let mid = start + (end - start) / 2;
        let left = self.build(bounds, start, mid);
        let right = self.build(bounds, mid, end);

        self.nodes[node_index as usize] = BvhNode::Branch { bbox, left, right };
        node_index
    }

    /// Bounds of everything in the hierarchy.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| *n.bbox())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the closest primitive hit along `ray`.
    ///
    /// `hit(index, ray)` must only report hits inside `ray`'s current
    /// interval. Each accepted hit shrinks that interval, which both prunes
    /// farther nodes and guarantees later hits are closer.
    pub fn closest<T, F>(&self, ray: &Ray, mut hit: F) -> Option<(usize, f32, T)>
    where
        F: FnMut(usize, &Ray) -> Option<(f32, T)>,
    {
        let mut ray = *ray;
        let mut best = None;

        self.traverse(&mut ray, |index, ray| {
            if let Some((t, payload)) = hit(index, ray) {
                ray.end(t);
                best = Some((index, t, payload));
            }
            false
        });

        best
    }

    /// Whether any primitive is hit along `ray`; stops at the first one.
    pub fn any<F>(&self, ray: &Ray, mut hit: F) -> bool
    where
        F: FnMut(usize, &Ray) -> bool,
    {
        let mut ray = *ray;
        let mut found = false;

        self.traverse(&mut ray, |index, ray| {
            found = hit(index, ray);
            found
        });

        found
    }

    /// Stack-based traversal. `visit` returns true to stop early.
    fn traverse<F>(&self, ray: &mut Ray, mut visit: F)
    where
        F: FnMut(usize, &mut Ray) -> bool,
    {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = [0u32; MAX_DEPTH];
        let mut top = 1;

        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];

            if !node.bbox().hit(ray, ray.interval()) {
                continue;
            }

            match *node {
                BvhNode::Leaf { first, count, .. } => {
                    let first = first as usize;
                    for &index in &self.indices[first..first + count as usize] {
                        if visit(index as usize, ray) {
                            return;
                        }
                    }
                }
                BvhNode::Branch { left, right, .. } => {
                    // Left is popped first
                    stack[top] = right;
                    stack[top + 1] = left;
                    top += 2;
                }
            }
        }
    }
}
