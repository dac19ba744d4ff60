//! Breadth-first traversals over a `CsrGraph`.

use std::collections::VecDeque;

use super::CsrGraph;

impl CsrGraph {
    /// Labels every vertex with the index of its connected component.
    ///
    /// Components are numbered in order of their smallest vertex. Returns `(labels, count)`.
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        let n = self.node_count();
        let mut label = vec![usize::MAX; n];
        let mut count = 0;
        let mut queue = VecDeque::new();
        for s in 0..n {
            if label[s] != usize::MAX {
                continue;
            }
            label[s] = count;
            queue.push_back(s);
            while let Some(u) = queue.pop_front() {
                for (_, v) in self.neighbors(u) {
                    if label[v] == usize::MAX {
                        label[v] = count;
                        queue.push_back(v);
                    }
                }
            }
            count += 1;
        }
        (label, count)
    }

    /// Returns `true` if every vertex is reachable from vertex 0.
    pub fn is_connected(&self) -> bool {
        self.connected_components().1 <= 1
    }

    /// BFS order from `start` with the arc used to discover each vertex.
    ///
    /// # Panics
    /// Panics if `start` is out of bounds.
    pub fn bfs_arcs(&self, start: usize) -> Vec<(usize, Option<usize>)> {
        assert!(start < self.node_count(), "start {start} out of bounds");
        let mut seen = vec![false; self.node_count()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        seen[start] = true;
        queue.push_back((start, None));
        while let Some((u, via)) = queue.pop_front() {
            order.push((u, via));
            for (a, v) in self.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    queue.push_back((v, Some(a)));
                }
            }
        }
        order
    }
}
