//! Wait-for graph between deferred entries
//!
//! While a deferred entry X is being initialized, every dereference it makes
//! of another deferred entry Y adds the edge X -> Y. An edge that closes a
//! cycle is rejected: the entries involved could only ever wait on each
//! other. Edges are removed by [`WaitGuard`] once the wait is over, including
//! when the waiting future is dropped.

use crate::RegistryKey;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Directed multigraph of in-progress waits
#[derive(Debug, Default)]
pub(crate) struct WaitGraph {
    edges: HashMap<RegistryKey, Vec<RegistryKey>>,
}

impl WaitGraph {
    /// Add `from -> to`, or return the cycle it would close
    ///
    /// The returned chain starts and ends with `from`.
    pub(crate) fn add(
        &mut self,
        from: &RegistryKey,
        to: &RegistryKey,
    ) -> Result<(), Vec<RegistryKey>> {
        if from == to {
            return Err(vec![from.clone(), to.clone()]);
        }
        if let Some(path) = self.path(to, from) {
            let mut chain = Vec::with_capacity(path.len() + 1);
            chain.push(from.clone());
            chain.extend(path);
            return Err(chain);
        }
        self.edges.entry(from.clone()).or_default().push(to.clone());
        Ok(())
    }

    /// Remove one instance of `from -> to`
    pub(crate) fn remove(&mut self, from: &RegistryKey, to: &RegistryKey) {
        if let Some(targets) = self.edges.get_mut(from) {
            if let Some(idx) = targets.iter().position(|t| t == to) {
                targets.swap_remove(idx);
            }
            if targets.is_empty() {
                self.edges.remove(from);
            }
        }
    }

    /// Number of distinct waiting entries
    pub(crate) fn waiting(&self) -> usize {
        self.edges.len()
    }

    /// Path `start -> ... -> goal` following edges, if any
    fn path(&self, start: &RegistryKey, goal: &RegistryKey) -> Option<Vec<RegistryKey>> {
        let mut visited = HashSet::new();
        let mut stack = vec![vec![start.clone()]];

        while let Some(path) = stack.pop() {
            let last = path.last()?;
            if last == goal {
                return Some(path);
            }
            if !visited.insert(last.clone()) {
                continue;
            }
            for next in self.edges.get(last).into_iter().flatten() {
                if !visited.contains(next) {
                    let mut extended = path.clone();
                    extended.push(next.clone());
                    stack.push(extended);
                }
            }
        }
        None
    }
}

/// RAII handle for one registered wait edge
#[derive(Debug)]
pub(crate) struct WaitGuard<'a> {
    graph: &'a Mutex<WaitGraph>,
    from: RegistryKey,
    to: RegistryKey,
}

impl<'a> WaitGuard<'a> {
    /// Register `from -> to` in `graph`
    pub(crate) fn enter(
        graph: &'a Mutex<WaitGraph>,
        from: &RegistryKey,
        to: &RegistryKey,
    ) -> Result<Self, Vec<RegistryKey>> {
        graph.lock().add(from, to)?;
        Ok(Self {
            graph,
            from: from.clone(),
            to: to.clone(),
        })
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.graph.lock().remove(&self.from, &self.to);
    }
}
