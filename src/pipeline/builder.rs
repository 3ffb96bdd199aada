//! Graph construction and validation.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BelayError, Result};
use crate::pipeline::graph::StepGraph;
use crate::pipeline::source::{ResourceContext, StepSource};
use crate::pipeline::step::{phases, Step};

/// Collects steps and deferred step sources, then seals them into a
/// validated [`StepGraph`].
///
/// The builder is an explicit value threaded through the configuration
/// phase and consumed once by [`build`](Self::build); there is no ambient
/// registry. `new()` seeds the well-known phase aggregators (`install`,
/// `lint`, `test`), so edges against those names always resolve.
pub struct PipelineBuilder {
    steps: Vec<Step>,
    sources: Vec<(ResourceContext, Box<dyn StepSource>)>,
}

impl PipelineBuilder {
    /// Create a builder pre-seeded with the well-known phase aggregators.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        for phase in phases::ALL {
            builder.add_phase(phase);
        }
        builder
    }

    /// Create a builder with no seeded phases.
    ///
    /// For embedders that manage their own join points; edges against the
    /// well-known phase names are not guaranteed to resolve here.
    pub fn empty() -> Self {
        Self {
            steps: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Register a static step.
    pub fn add_step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Register an additional action-less phase aggregator.
    pub fn add_phase(&mut self, name: impl Into<String>) -> &mut Self {
        self.steps.push(Step::aggregator(name));
        self
    }

    /// Register a deferred step source bound to a resource context.
    ///
    /// The source runs at [`build`](Self::build) time, receiving `resource`,
    /// and may yield zero or more steps.
    pub fn add_source(
        &mut self,
        resource: ResourceContext,
        source: impl StepSource + 'static,
    ) -> &mut Self {
        self.sources.push((resource, Box::new(source)));
        self
    }

    /// Expand sources, normalize edges, validate, and seal the graph.
    ///
    /// Validation order: duplicate names, dangling edge references, cycles.
    /// Any error aborts the build; no partial graph is returned.
    pub fn build(self) -> Result<StepGraph> {
        let mut produced = self.steps;
        for (resource, source) in self.sources {
            produced.extend(source.produce(&resource));
        }

        let mut steps: BTreeMap<String, Step> = BTreeMap::new();
        for step in produced {
            let name = step.name.clone();
            if steps.insert(name.clone(), step).is_some() {
                return Err(BelayError::DuplicateStep { name });
            }
        }

        // Reject dangling references before normalizing, so the error names
        // the step that declared the edge.
        for step in steps.values() {
            for target in step.depends_on.iter().chain(step.required_by.iter()) {
                if !steps.contains_key(target) {
                    return Err(BelayError::UnknownStep {
                        step: step.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        // Normalize: `A required_by B` is exactly `B depends_on A`.
        let mut dependencies: BTreeMap<String, BTreeSet<String>> = steps
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();
        let mut dependents: BTreeMap<String, BTreeSet<String>> = steps
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();

        for step in steps.values() {
            for dep in &step.depends_on {
                dependencies
                    .entry(step.name.clone())
                    .or_default()
                    .insert(dep.clone());
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(step.name.clone());
            }
            for target in &step.required_by {
                dependencies
                    .entry(target.clone())
                    .or_default()
                    .insert(step.name.clone());
                dependents
                    .entry(step.name.clone())
                    .or_default()
                    .insert(target.clone());
            }
        }

        let graph = StepGraph {
            steps,
            dependencies,
            dependents,
        };

        if let Some(cycle) = graph.find_cycle() {
            return Err(BelayError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(graph)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
