/// Reorders triangles so that consecutive triangles reuse vertices still in
/// the GPU post-transform cache. Only the triangle order changes; every
/// triangle keeps its own vertex order.
pub trait VertexCacheOptimizer {
    /// `indices` must hold whole triangles with every index below
    /// `vertex_count`.
    fn optimize(&self, indices: &mut [u32], vertex_count: usize, cache_size: usize);
}

/// Sander, Nehab and Barczak, "Fast Triangle Reordering for Vertex Locality
/// and Reduced Overdraw" (SIGGRAPH 2007).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tipsify;

struct Adjacency {
    offsets: Vec<usize>,
    triangles: Vec<usize>,
}

impl Adjacency {
    fn build(indices: &[u32], vertex_count: usize) -> (Self, Vec<usize>) {
        let mut live = vec![0usize; vertex_count];
        for &i in indices {
            live[i as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut sum = 0;
        offsets.push(0);
        for &count in &live {
            sum += count;
            offsets.push(sum);
        }

        let mut fill = offsets.clone();
        let mut triangles = vec![0; indices.len()];
        for (i, &v) in indices.iter().enumerate() {
            let slot = &mut fill[v as usize];
            triangles[*slot] = i / 3;
            *slot += 1;
        }

        (Adjacency { offsets, triangles }, live)
    }

    fn of(&self, v: usize) -> &[usize] {
        &self.triangles[self.offsets[v]..self.offsets[v + 1]]
    }
}

struct Tipsifier {
    live: Vec<usize>,
    cache_time: Vec<usize>,
    dead_end: Vec<usize>,
    time: usize,
    cursor: usize,
    cache_size: usize,
}

impl Tipsifier {
    fn in_cache(&self, v: usize) -> bool {
        self.time - self.cache_time[v] <= self.cache_size
    }

    fn next_vertex(&mut self, candidates: &[usize]) -> Option<usize> {
        let mut best = None;
        let mut priority = 0;
        for &v in candidates {
            if self.live[v] == 0 {
                continue;
            }
            // a vertex that will still be cached after its remaining fans
            // are emitted is preferred, oldest first
            let age = self.time - self.cache_time[v];
            let p = if age.saturating_add(self.live[v].saturating_mul(2)) <= self.cache_size {
                age
            } else {
                0
            };
            if best.is_none() || p > priority {
                best = Some(v);
                priority = p;
            }
        }

        best.or_else(|| self.skip_dead_end())
    }

    fn skip_dead_end(&mut self) -> Option<usize> {
        while let Some(v) = self.dead_end.pop() {
            if self.live[v] > 0 {
                return Some(v);
            }
        }
        while self.cursor < self.live.len() {
            if self.live[self.cursor] > 0 {
                return Some(self.cursor);
            }
            self.cursor += 1;
        }
        None
    }
}

impl VertexCacheOptimizer for Tipsify {
    fn optimize(&self, indices: &mut [u32], vertex_count: usize, cache_size: usize) {
        if indices.len() < 6 || vertex_count == 0 {
            return;
        }

        let (adjacency, live) = Adjacency::build(indices, vertex_count);
        let mut emitted = vec![false; indices.len() / 3];
        let mut output = Vec::with_capacity(indices.len());
        let mut state = Tipsifier {
            live,
            cache_time: vec![0; vertex_count],
            dead_end: vec![],
            time: cache_size.saturating_add(1),
            cursor: 0,
            cache_size,
        };

        let mut fanning = state.skip_dead_end();
        let mut candidates = vec![];
        while let Some(f) = fanning {
            candidates.clear();
            for &t in adjacency.of(f) {
                if emitted[t] {
                    continue;
                }
                emitted[t] = true;
                for &v in &indices[t * 3..t * 3 + 3] {
                    let v = v as usize;
                    output.push(v as u32);
                    state.dead_end.push(v);
                    candidates.push(v);
                    state.live[v] -= 1;
                    if !state.in_cache(v) {
                        state.cache_time[v] = state.time;
                        state.time = state.time.saturating_add(1);
                    }
                }
            }
            fanning = state.next_vertex(&candidates);
        }

        indices.copy_from_slice(&output);
    }
}

/// Average number of vertex transforms per triangle for a FIFO cache of
/// `cache_size` entries. 0.5 is the best case for regular meshes, 3 the worst.
pub fn average_cache_miss_ratio(indices: &[u32], cache_size: usize) -> f32 {
    let triangles = indices.len() / 3;
    if triangles == 0 {
        return 0.0;
    }

    let mut cache = std::collections::VecDeque::with_capacity(cache_size.min(indices.len()));
    let mut misses = 0;
    for &i in indices {
        if !cache.contains(&i) {
            misses += 1;
            if cache.len() == cache_size {
                cache.pop_front();
            }
            cache.push_back(i);
        }
    }
    misses as f32 / triangles as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use genmesh::generators::{IndexedPolygon, SharedVertex};
    use itertools::Itertools;
    use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

    fn triangles(indices: &[u32]) -> Vec<(u32, u32, u32)> {
        indices.iter().copied().tuples().sorted().collect()
    }

    fn grid(n: usize) -> (Vec<u32>, usize) {
        let plane = genmesh::generators::Plane::subdivide(n, n);
        let indices = plane
            .indexed_polygon_iter()
            .flat_map(|q| {
                let (x, y, z, w) = (q.x as u32, q.y as u32, q.z as u32, q.w as u32);
                vec![x, y, z, x, z, w]
            })
            .collect();
        (indices, plane.shared_vertex_count())
    }

    #[test]
    fn test_tipsify_permutes_triangles_only() {
        let (mut indices, vertex_count) = grid(16);
        let original = indices.clone();
        Tipsify.optimize(&mut indices, vertex_count, 24);

        assert_eq!(indices.len(), original.len());
        assert_eq!(triangles(&indices), triangles(&original));
    }

    #[test]
    fn test_tipsify_improves_shuffled_grid() {
        let (indices, vertex_count) = grid(32);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut tris = indices.chunks(3).map(|t| t.to_vec()).collect_vec();
        tris.shuffle(&mut rng);
        let mut shuffled = tris.concat();

        let before = average_cache_miss_ratio(&shuffled, 24);
        Tipsify.optimize(&mut shuffled, vertex_count, 24);
        let after = average_cache_miss_ratio(&shuffled, 24);

        assert!(after < before, "{} should be below {}", after, before);
        assert!(after < 1.0);
    }

    #[test]
    fn test_tipsify_keeps_isolated_vertices_and_small_input() {
        let mut single = vec![0, 1, 2];
        Tipsify.optimize(&mut single, 3, 24);
        assert_eq!(single, vec![0, 1, 2]);

        // vertex 0 and 5 are unused
        let mut indices = vec![1, 2, 3, 3, 2, 4];
        Tipsify.optimize(&mut indices, 6, 24);
        assert_eq!(triangles(&indices), vec![(1, 2, 3), (3, 2, 4)]);
    }

    #[test]
    fn test_tipsify_accepts_unbounded_cache() {
        let (mut indices, vertex_count) = grid(8);
        let original = indices.clone();
        Tipsify.optimize(&mut indices, vertex_count, usize::MAX);
        assert_eq!(triangles(&indices), triangles(&original));

        let ratio = average_cache_miss_ratio(&indices, usize::MAX);
        approx::assert_relative_eq!(
            ratio,
            vertex_count as f32 / (indices.len() / 3) as f32
        );
    }

    #[test]
    fn test_cache_miss_ratio() {
        assert_eq!(average_cache_miss_ratio(&[], 24), 0.0);
        assert_eq!(average_cache_miss_ratio(&[0, 1, 2], 24), 3.0);
        assert_eq!(average_cache_miss_ratio(&[0, 1, 2, 2, 1, 3], 24), 2.0);
        assert_eq!(average_cache_miss_ratio(&[0, 1, 2, 3, 4, 5, 0, 1, 2], 3), 3.0);
    }
}
