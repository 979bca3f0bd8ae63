//! Strongly connected components over graphs keyed by name.
//!
//! Used for the leftmost-call graph of rules and for grammar imports.

use indexmap::{IndexMap, IndexSet};

/// Tarjan's algorithm. Components come out leaves first; members of one
/// component are listed in stack-pop order. Edges to names that are not
/// keys of the graph are ignored.
pub struct SccFinder<'a, E> {
    edges: &'a IndexMap<String, E>,
    index: usize,
    stack: Vec<&'a str>,
    on_stack: IndexSet<&'a str>,
    indices: IndexMap<&'a str, usize>,
    lowlinks: IndexMap<&'a str, usize>,
    sccs: Vec<Vec<String>>,
}

impl<'a, E> SccFinder<'a, E>
where
    &'a E: IntoIterator<Item = &'a String>,
{
    pub fn find(edges: &'a IndexMap<String, E>) -> Vec<Vec<String>> {
        let mut finder = Self {
            edges,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: IndexMap::new(),
            lowlinks: IndexMap::new(),
            sccs: Vec::new(),
        };
        for name in edges.keys() {
            if !finder.indices.contains_key(name.as_str()) {
                finder.strongconnect(name);
            }
        }
        finder.sccs
    }

    fn lowlink(&self, name: &str) -> usize {
        self.lowlinks.get(name).copied().unwrap_or(usize::MAX)
    }

    fn lower(&mut self, name: &str, to: usize) {
        if let Some(low) = self.lowlinks.get_mut(name) {
            *low = (*low).min(to);
        }
    }

    fn strongconnect(&mut self, name: &'a str) {
        self.indices.insert(name, self.index);
        self.lowlinks.insert(name, self.index);
        self.index += 1;
        self.stack.push(name);
        self.on_stack.insert(name);

        let edges = self.edges;
        for target in edges.get(name).into_iter().flatten() {
            if !edges.contains_key(target) {
                continue;
            }
            if !self.indices.contains_key(target.as_str()) {
                self.strongconnect(target);
                let low = self.lowlink(target);
                self.lower(name, low);
            } else if self.on_stack.contains(target.as_str()) {
                let index = self.indices.get(target.as_str()).copied().unwrap_or(usize::MAX);
                self.lower(name, index);
            }
        }

        if Some(self.lowlink(name)) == self.indices.get(name).copied() {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.swap_remove(w);
                scc.push(w.to_string());
                if w == name {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

/// More than one member, or a single member with an edge to itself.
pub fn is_cycle<'a, E>(edges: &'a IndexMap<String, E>, scc: &[String]) -> bool
where
    &'a E: IntoIterator<Item = &'a String>,
{
    match scc {
        [single] => edges
            .get(single)
            .is_some_and(|targets| targets.into_iter().any(|t| t == single)),
        _ => scc.len() > 1,
    }
}
