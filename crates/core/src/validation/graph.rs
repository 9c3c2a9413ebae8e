//! Directed graph over rule ids, built from the `alternatives` relation.
//!
//! Used twice: at admission time for cycle detection (a cyclic
//! alternatives graph can never be published) and at evaluation time to
//! derive the order rules are processed in. Both walks share the same
//! adjacency structure. Edges whose target id does not resolve to a
//! rule in the set are tracked separately as dangling references.

use std::collections::HashMap;

use super::rules::RequirementRule;

/// Adjacency-list view of a rule set's alternatives relation.
#[derive(Debug)]
pub struct RuleGraph {
    /// Rule ids in input order. Duplicated ids keep their first node.
    ids: Vec<String>,
    /// Outgoing resolvable edges per node, as indices into `ids`.
    edges: Vec<Vec<usize>>,
    /// `(rule id, missing alternative id)` pairs.
    dangling: Vec<(String, String)>,
}

/// DFS node state for the cycle walk.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    /// Not visited yet.
    White,
    /// Currently on the traversal stack.
    Grey,
    /// Fully explored.
    Black,
}

impl RuleGraph {
    /// Build the adjacency list for a rule set.
    pub fn build(rules: &[RequirementRule]) -> Self {
        let mut ids: Vec<String> = Vec::with_capacity(rules.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(rules.len());
        for rule in rules {
            if !index.contains_key(rule.id.as_str()) {
                index.insert(rule.id.as_str(), ids.len());
                ids.push(rule.id.clone());
            }
        }

        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        let mut dangling = Vec::new();
        for rule in rules {
            let from = index[rule.id.as_str()];
            for alt in &rule.alternatives {
                match index.get(alt.as_str()) {
                    Some(&to) => edges[from].push(to),
                    None => dangling.push((rule.id.clone(), alt.clone())),
                }
            }
        }

        Self {
            ids,
            edges,
            dangling,
        }
    }

    /// Alternative references that do not resolve to a rule in the set.
    pub fn dangling_references(&self) -> &[(String, String)] {
        &self.dangling
    }

    /// Find all cycles in the alternatives graph.
    ///
    /// Depth-first walk keeping an explicit on-stack marking; every edge
    /// into a grey node is a back edge and closes exactly one distinct
    /// cycle, which is reported once as the ordered list of rule ids on
    /// the stack from the re-entered node down (a self-loop yields a
    /// one-element cycle). An acyclic graph returns an empty list.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut marks = vec![Mark::White; self.ids.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        for start in 0..self.ids.len() {
            if marks[start] == Mark::White {
                self.cycle_walk(start, &mut marks, &mut stack, &mut cycles);
            }
        }

        cycles
    }

    fn cycle_walk(
        &self,
        node: usize,
        marks: &mut Vec<Mark>,
        stack: &mut Vec<usize>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        marks[node] = Mark::Grey;
        stack.push(node);

        for &next in &self.edges[node] {
            match marks[next] {
                Mark::Grey => {
                    // Back edge: the cycle is the stack suffix starting
                    // at the re-entered node.
                    let from = stack.iter().position(|&n| n == next).unwrap_or(0);
                    cycles.push(stack[from..].iter().map(|&n| self.ids[n].clone()).collect());
                }
                Mark::White => self.cycle_walk(next, marks, stack, cycles),
                Mark::Black => {}
            }
        }

        stack.pop();
        marks[node] = Mark::Black;
    }

    /// Rule ids in dependency order: a rule appears after every rule its
    /// alternatives chain reaches, so leaf rules come first.
    ///
    /// Assumes the graph is acyclic (the admission gate guarantees it
    /// for published versions); if a cycle is present anyway the walk
    /// still terminates and yields a best-effort order.
    pub fn topological_order(&self) -> Vec<String> {
        let mut visited = vec![false; self.ids.len()];
        let mut order: Vec<usize> = Vec::with_capacity(self.ids.len());

        for start in 0..self.ids.len() {
            if !visited[start] {
                self.post_order(start, &mut visited, &mut order);
            }
        }

        order.into_iter().map(|n| self.ids[n].clone()).collect()
    }

    fn post_order(&self, node: usize, visited: &mut Vec<bool>, order: &mut Vec<usize>) {
        visited[node] = true;
        for &next in &self.edges[node] {
            if !visited[next] {
                self.post_order(next, visited, order);
            }
        }
        order.push(node);
    }
}
