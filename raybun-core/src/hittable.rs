//! BVH over the scene's finite primitives.
//!
//! Built as a flat arena (`Vec<BvhNode>`) rather than a boxed tree: indices
//! into `nodes` stand in for child pointers, which keeps the whole tree in
//! one contiguous allocation and sidesteps lifetime bookkeeping a recursive
//! `Box<Node>` tree would need.

use crate::aabb::Aabb;
use crate::material::HitRecord;
use crate::primitive::Primitive;
use crate::ray::Ray;

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        /// Indices into the scene's primitive list, 1 or 2 entries.
        prim_indices: Vec<usize>,
    },
    Interior {
        bbox: Aabb,
        left: usize,
        right: usize,
    },
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Interior { bbox, .. } => *bbox,
        }
    }
}

/// A BVH over a set of finite (boundable) primitives, stored by index into
/// an external primitive list the caller owns.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// `primitives` must all have a finite bounding box (the caller filters
    /// out planes before calling this — see `Scene::build`).
    pub fn build(primitives: &[Primitive]) -> Option<Self> {
        if primitives.is_empty() {
            return None;
        }
        let mut indices: Vec<usize> = (0..primitives.len()).collect();
        let boxes: Vec<Aabb> = primitives
            .iter()
            .map(|p| p.bounding_box().expect("boundable primitive"))
            .collect();

        let mut nodes = Vec::new();
        let root = build_recursive(&mut nodes, &boxes, &mut indices);
        Some(Self { nodes, root })
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes[self.root].bbox()
    }

    /// Traverse the tree, testing the ray against primitives in `primitives`
    /// whenever a leaf is reached. Returns the closest hit within `[tmin, tmax]`.
    pub fn hit(
        &self,
        primitives: &[Primitive],
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> Option<HitRecord> {
        self.hit_node(self.root, primitives, ray, tmin, tmax)
    }

    fn hit_node(
        &self,
        node_index: usize,
        primitives: &[Primitive],
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> Option<HitRecord> {
        let node = &self.nodes[node_index];
        if !node.bbox().hit(ray, tmin, tmax) {
            return None;
        }
        match node {
            BvhNode::Leaf { prim_indices, .. } => {
                let mut closest = tmax;
                let mut result = None;
                for &idx in prim_indices {
                    if let Some(rec) = primitives[idx].hit(ray, tmin, closest) {
                        closest = rec.t;
                        result = Some(rec);
                    }
                }
                result
            }
            BvhNode::Interior { left, right, .. } => {
                let hit_left = self.hit_node(*left, primitives, ray, tmin, tmax);
                let new_tmax = hit_left.as_ref().map(|r| r.t).unwrap_or(tmax);
                let hit_right = self.hit_node(*right, primitives, ray, tmin, new_tmax);
                hit_right.or(hit_left)
            }
        }
    }
}

/// Top-down median-split build. Splits on the longest axis of the current
/// subset's bounding box and allocates a leaf once `count <= 2`.
fn build_recursive(nodes: &mut Vec<BvhNode>, boxes: &[Aabb], indices: &mut [usize]) -> usize {
    let bbox = indices
        .iter()
        .map(|&i| boxes[i])
        .reduce(Aabb::union)
        .expect("non-empty subset");

    if indices.len() <= 2 {
        nodes.push(BvhNode::Leaf {
            bbox,
            prim_indices: indices.to_vec(),
        });
        return nodes.len() - 1;
    }

    let axis = bbox.longest_axis();
    indices.sort_by(|&a, &b| {
        boxes[a]
            .min_on_axis(axis)
            .partial_cmp(&boxes[b].min_on_axis(axis))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = indices.len() / 2;
    let (left_indices, right_indices) = indices.split_at_mut(mid);
    let left = build_recursive(nodes, boxes, left_indices);
    let right = build_recursive(nodes, boxes, right_indices);

    nodes.push(BvhNode::Interior { bbox, left, right });
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Vec3;

    fn sphere(x: f32) -> Primitive {
        Primitive::Sphere {
            center: Vec3::new(x, 0.0, 0.0),
            radius: 0.5,
            mat_index: 0,
        }
    }

    #[test]
    fn single_primitive_hits() {
        let prims = vec![sphere(0.0)];
        let bvh = Bvh::build(&prims).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(bvh.hit(&prims, &ray, 0.001, f32::INFINITY).is_some());
    }

    #[test]
    fn finds_nearest_of_many() {
        let prims: Vec<Primitive> = (0..20).map(|i| sphere(i as f32 * 3.0)).collect();
        let bvh = Bvh::build(&prims).unwrap();
        let ray = Ray::new(Vec3::new(-100.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let rec = bvh.hit(&prims, &ray, 0.001, f32::INFINITY).unwrap();
        // nearest sphere centered at x = 0 should be hit first
        assert!((rec.point.x - (-0.5)).abs() < 1e-3);
    }

    #[test]
    fn ray_missing_everything() {
        let prims: Vec<Primitive> = (0..5).map(|i| sphere(i as f32 * 3.0)).collect();
        let bvh = Bvh::build(&prims).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(bvh.hit(&prims, &ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn empty_primitive_list_yields_no_bvh() {
        let prims: Vec<Primitive> = vec![];
        assert!(Bvh::build(&prims).is_none());
    }
}
