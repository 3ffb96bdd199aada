//! The sealed step graph.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::pipeline::step::Step;

/// A validated, immutable set of steps with one normalized edge direction:
/// dependency -> dependent.
///
/// Built exclusively by [`PipelineBuilder::build`](crate::pipeline::PipelineBuilder::build);
/// by the time a `StepGraph` exists, names are unique, every edge endpoint
/// resolves, and the edge relation is acyclic. Edge storage is ordered, so two builds from the
/// same registrations produce identical edge sets regardless of
/// registration order.
#[derive(Debug)]
pub struct StepGraph {
    /// All steps, keyed by unique name.
    pub(crate) steps: BTreeMap<String, Step>,
    /// Map of step name to the names it depends on.
    pub(crate) dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Map of step name to the names that depend on it.
    pub(crate) dependents: BTreeMap<String, BTreeSet<String>>,
}

impl StepGraph {
    /// Number of steps in the graph.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the graph has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.steps.contains_key(step)
    }

    /// All step names, in lexicographic order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Get the direct dependencies of a step.
    pub fn dependencies_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(step)
    }

    /// Get steps that depend on the given step.
    pub fn dependents_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.dependents.get(step)
    }

    /// Whether the named step is an action-less join point.
    pub fn is_aggregator(&self, step: &str) -> bool {
        self.steps.get(step).is_some_and(Step::is_aggregator)
    }

    /// Get all transitive dependents of a step.
    ///
    /// Returns steps that depend on the given step, directly or indirectly.
    pub fn transitive_dependents(&self, step: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let mut to_visit = vec![step.to_string()];

        while let Some(current) = to_visit.pop() {
            if let Some(dependents) = self.dependents.get(&current) {
                for dep in dependents {
                    if result.insert(dep.clone()) {
                        to_visit.push(dep.clone());
                    }
                }
            }
        }

        result
    }

    /// Find a cycle in the graph, returning the path if one exists.
    pub(crate) fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        let mut state: BTreeMap<&str, State> = self
            .steps
            .keys()
            .map(|s| (s.as_str(), State::Unvisited))
            .collect();

        let mut path: Vec<String> = Vec::new();

        fn dfs<'a>(
            node: &'a str,
            graph: &'a StepGraph,
            state: &mut BTreeMap<&'a str, State>,
            path: &mut Vec<String>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);
            path.push(node.to_string());

            if let Some(deps) = graph.dependencies.get(node) {
                for dep in deps {
                    match state.get(dep.as_str()) {
                        Some(State::Visiting) => {
                            // Found cycle - build the cycle path
                            let cycle_start = path.iter().position(|s| s == dep).unwrap();
                            let mut cycle: Vec<String> = path[cycle_start..].to_vec();
                            cycle.push(dep.clone());
                            return Some(cycle);
                        }
                        Some(State::Unvisited) | None => {
                            if let Some(cycle) = dfs(dep, graph, state, path) {
                                return Some(cycle);
                            }
                        }
                        Some(State::Visited) => {}
                    }
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        let names: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        for step in names {
            if state.get(step) == Some(&State::Unvisited) {
                if let Some(cycle) = dfs(step, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}
