// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distance-based grouping, joining, and pruning of raw detected segments
//! into [`LineGroup`]s.

use towerscan_core::geometry::{LineGroup, Segment};

const COLLINEAR_TOLERANCE_DEGREES: f64 = 3.0;

fn endpoint_distance(a: &Segment, b: &Segment) -> f64 {
    let pairs = [(a.p1, b.p1), (a.p1, b.p2), (a.p2, b.p1), (a.p2, b.p2)];
    pairs.iter().map(|(p, q)| p.distance(q)).fold(f64::INFINITY, f64::min)
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Groups `segments` into [`LineGroup`]s: two segments belong to the same
/// group iff the distance between some endpoint of one and some endpoint
/// of the other is at most `d`. Computes the transitive closure of that
/// relation, so segments connected only through a chain of intermediaries
/// still land in the same group.
#[must_use]
pub fn group_lines_by_dist(segments: &[Segment], d: f64) -> Vec<LineGroup> {
    if segments.is_empty() {
        return Vec::new();
    }
    let mut uf = UnionFind::new(segments.len());
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            if endpoint_distance(&segments[i], &segments[j]) <= d {
                uf.union(i, j);
            }
        }
    }

    let mut buckets: std::collections::HashMap<usize, Vec<Segment>> = std::collections::HashMap::new();
    for (i, &segment) in segments.iter().enumerate() {
        let root = uf.find(i);
        buckets.entry(root).or_default().push(segment);
    }
    buckets.into_values().map(LineGroup::new).collect()
}

/// Reduces the segments within a single group by merging any pair that is
/// (a) near-collinear, within a fixed 3-degree tolerance, and (b) has its
/// nearest endpoints within `d`. The merged segment spans the two farthest
/// endpoints among the pair. Repeats to a fixed point (capped at one pass
/// per remaining segment, since each pass removes at least one segment).
#[must_use]
pub fn join_lines_by_dist(segments: &[Segment], d: f64) -> Vec<Segment> {
    let tolerance_radians = COLLINEAR_TOLERANCE_DEGREES.to_radians();
    let mut current = segments.to_vec();

    loop {
        let mut merged_any = false;
        let mut next: Vec<Segment> = Vec::new();
        let mut consumed = vec![false; current.len()];

        for i in 0..current.len() {
            if consumed[i] {
                continue;
            }
            let mut merged = current[i];
            for j in (i + 1)..current.len() {
                if consumed[j] {
                    continue;
                }
                let angle_diff = {
                    let a = merged.angle_ox();
                    let b = current[j].angle_ox();
                    let pi = core::f64::consts::PI;
                    let mut diff = (a - b).rem_euclid(pi);
                    if diff > pi / 2.0 {
                        diff = pi - diff;
                    }
                    diff
                };
                if angle_diff > tolerance_radians {
                    continue;
                }
                if endpoint_distance(&merged, &current[j]) > d {
                    continue;
                }
                let endpoints = [merged.p1, merged.p2, current[j].p1, current[j].p2];
                let (mut far1, mut far2) = (endpoints[0], endpoints[1]);
                let mut best = far1.distance(&far2);
                for a in 0..4 {
                    for b in (a + 1)..4 {
                        let dist = endpoints[a].distance(&endpoints[b]);
                        if dist > best {
                            best = dist;
                            far1 = endpoints[a];
                            far2 = endpoints[b];
                        }
                    }
                }
                merged = Segment::new(far1, far2);
                consumed[j] = true;
                merged_any = true;
            }
            next.push(merged);
        }

        current = next;
        if !merged_any {
            break;
        }
    }
    current
}

/// Removes any group with fewer than `min_count` member segments.
#[must_use]
pub fn del_lines_group_by_size(groups: Vec<LineGroup>, min_count: usize) -> Vec<LineGroup> {
    groups.into_iter().filter(|g| g.segments().len() >= min_count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscan_core::geometry::Point2;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point2::new(x1, y1), Point2::new(x2, y2))
    }

    #[test]
    fn nearby_segments_land_in_one_group() {
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.5, 0.0, 20.0, 0.0), seg(100.0, 100.0, 110.0, 100.0)];
        let groups = group_lines_by_dist(&segments, 1.0);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn transitive_closure_chains_groups_together() {
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.5, 0.0, 20.0, 0.0), seg(20.5, 0.0, 30.0, 0.0)];
        let groups = group_lines_by_dist(&segments, 1.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].segments().len(), 3);
    }

    #[test]
    fn join_merges_collinear_adjacent_segments() {
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.5, 0.0, 20.0, 0.0)];
        let joined = join_lines_by_dist(&segments, 1.0);
        assert_eq!(joined.len(), 1);
        assert!((joined[0].length() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn join_leaves_non_collinear_segments_separate() {
        let segments = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.5, 0.0, 10.5, 10.0)];
        let joined = join_lines_by_dist(&segments, 1.0);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn prune_removes_small_groups() {
        let g1 = LineGroup::new(vec![seg(0.0, 0.0, 1.0, 0.0)]);
        let g2 = LineGroup::new(vec![seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0)]);
        let kept = del_lines_group_by_size(vec![g1, g2], 2);
        assert_eq!(kept.len(), 1);
    }
}
