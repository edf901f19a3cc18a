// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Place forest: the nesting structure of a bigraph.
//!
//! Ancestry is answered in O(1) from pre/post interval labels computed once at
//! construction: `a` is a strict ancestor of `d` exactly when the DFS interval of
//! `d` nests strictly inside that of `a`.

/// Parent/child nesting over the vertices of one bigraph.
#[derive(Debug, Clone)]
pub struct PlaceForest {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    pre: Vec<u32>,
    post: Vec<u32>,
    depth: Vec<u32>,
    descendants: Vec<u32>,
}

impl PlaceForest {
    /// Build the forest, labelling every vertex with its DFS interval.
    ///
    /// Returns a description of the first violation found when the parent
    /// relation is out of range or cyclic.
    pub(crate) fn new(parents: Vec<Option<usize>>) -> Result<Self, String> {
        let n = parents.len();
        let mut children = vec![Vec::new(); n];
        for (child, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                if parent >= n {
                    return Err(format!(
                        "vertex {} has parent {} but there are only {} vertices",
                        child, parent, n
                    ));
                }
                if parent == child {
                    return Err(format!("vertex {} is its own parent", child));
                }
                children[parent].push(child);
            }
        }

        let mut pre = vec![u32::MAX; n];
        let mut post = vec![0u32; n];
        let mut depth = vec![0u32; n];
        let mut descendants = vec![0u32; n];
        let mut clock = 0u32;

        // Iterative DFS from every root; (vertex, next child index)
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for root in (0..n).filter(|&v| parents[v].is_none()) {
            pre[root] = clock;
            clock += 1;
            stack.push((root, 0));
            while let Some(top) = stack.last_mut() {
                let v = top.0;
                if top.1 < children[v].len() {
                    let c = children[v][top.1];
                    top.1 += 1;
                    pre[c] = clock;
                    clock += 1;
                    depth[c] = depth[v] + 1;
                    stack.push((c, 0));
                } else {
                    post[v] = clock;
                    clock += 1;
                    stack.pop();
                    if let Some(&(p, _)) = stack.last() {
                        descendants[p] += descendants[v] + 1;
                    }
                }
            }
        }

        // Anything unreached from a root sits on a parent cycle
        if let Some(v) = (0..n).find(|&v| pre[v] == u32::MAX) {
            return Err(format!("parent relation is cyclic through vertex {}", v));
        }

        Ok(Self {
            parents,
            children,
            pre,
            post,
            depth,
            descendants,
        })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, v: usize) -> Option<usize> {
        self.parents[v]
    }

    pub fn children(&self, v: usize) -> &[usize] {
        &self.children[v]
    }

    /// Number of strict ancestors of `v`.
    pub fn depth(&self, v: usize) -> usize {
        self.depth[v] as usize
    }

    /// Number of strict descendants of `v`.
    pub fn descendant_count(&self, v: usize) -> usize {
        self.descendants[v] as usize
    }

    /// True when `a` is a strict ancestor of `d`.
    #[inline]
    pub fn is_ancestor(&self, a: usize, d: usize) -> bool {
        self.pre[a] < self.pre[d] && self.post[d] < self.post[a]
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&v| self.parents[v].is_none())
    }
}
