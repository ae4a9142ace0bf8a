//! Dependency-ordered execution of analyzers.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::analyzer::{AnalysisError, AnalyzerBox};
use crate::config::Config;
use crate::context::LintContext;
use crate::pass::{FactStore, Pass};
use crate::types::LintResult;

/// The selected checks plus everything they require, in topological order.
pub struct AnalyzerGraph {
    order: Vec<AnalyzerBox>,
    selected: HashSet<&'static str>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl AnalyzerGraph {
    /// Builds the graph for `selected` out of `catalogue`. An empty
    /// selection selects every reporting analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate names, unknown names (selected or
    /// required) and dependency cycles.
    pub fn build(catalogue: Vec<AnalyzerBox>, selected: &[&str]) -> Result<Self, AnalysisError> {
        let mut index = HashMap::new();
        for (i, analyzer) in catalogue.iter().enumerate() {
            if index.insert(analyzer.name(), i).is_some() {
                return Err(AnalysisError::Duplicate(analyzer.name().to_owned()));
            }
        }

        let roots: Vec<usize> = if selected.is_empty() {
            (0..catalogue.len())
                .filter(|&i| catalogue[i].reports())
                .collect()
        } else {
            selected
                .iter()
                .map(|name| {
                    index
                        .get(name)
                        .copied()
                        .ok_or_else(|| AnalysisError::UnknownAnalyzer((*name).to_owned()))
                })
                .collect::<Result<_, _>>()?
        };

        let mut marks = HashMap::new();
        let mut order = Vec::new();
        for &root in &roots {
            visit(root, &catalogue, &index, &mut marks, &mut order)?;
        }

        let selected = roots.iter().map(|&i| catalogue[i].name()).collect();
        let mut slots: Vec<Option<AnalyzerBox>> = catalogue.into_iter().map(Some).collect();
        let order = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();

        Ok(Self { order, selected })
    }

    /// Analyzers in execution order.
    pub fn analyzers(&self) -> impl Iterator<Item = &AnalyzerBox> {
        self.order.iter()
    }

    /// Whether `name` was selected (as opposed to pulled in as a requirement).
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Runs the graph once per root package, sequentially.
    #[must_use]
    pub fn run(&self, ctx: &LintContext, roots: &[String]) -> LintResult {
        let active = self.active(&ctx.config);
        let mut result = LintResult::new();

        for root in roots {
            let Some(package) = ctx.registry.get(root) else {
                warn!("Root package {} is not loaded, skipping", root);
                continue;
            };
            debug!("Analyzing package {}", root);

            let mut facts = FactStore::new();
            for analyzer in &self.order {
                let name = analyzer.name();
                if !active.contains(name) {
                    continue;
                }
                if let Some(missing) = analyzer.requires().iter().find(|r| !facts.contains_key(*r)) {
                    debug!("{} skipped for {}: no result from {}", name, root, missing);
                    continue;
                }

                let emit = self.emits(analyzer, &ctx.config);
                let severity = ctx
                    .config
                    .rule_severity(name)
                    .unwrap_or_else(|| analyzer.default_severity());
                let mut pass = Pass::new(name, severity, emit, package, ctx, &facts);
                let outcome = analyzer.run(&mut pass);
                let violations = pass.into_violations();
                result.violations.extend(violations);

                match outcome {
                    Ok(Some(fact)) => {
                        facts.insert(name, fact);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{}", e),
                }
            }

            result.packages_checked += 1;
            result.files_checked += package.files().len();
        }

        result.normalize();
        info!(
            "Analysis complete: {} violation(s) in {} package(s)",
            result.violations.len(),
            result.packages_checked
        );
        result
    }

    fn emits(&self, analyzer: &AnalyzerBox, config: &Config) -> bool {
        analyzer.reports() && self.is_selected(analyzer.name()) && config.is_rule_enabled(analyzer.name())
    }

    /// Analyzers that emit, plus everything an emitting analyzer needs.
    fn active(&self, config: &Config) -> HashSet<&'static str> {
        let mut active = HashSet::new();
        for analyzer in self.order.iter().rev() {
            if self.emits(analyzer, config) || active.contains(analyzer.name()) {
                active.insert(analyzer.name());
                active.extend(analyzer.requires().iter().copied());
            }
        }
        active
    }
}

fn visit(
    i: usize,
    catalogue: &[AnalyzerBox],
    index: &HashMap<&'static str, usize>,
    marks: &mut HashMap<usize, Mark>,
    order: &mut Vec<usize>,
) -> Result<(), AnalysisError> {
    match marks.get(&i) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(AnalysisError::Cycle(catalogue[i].name().to_owned())),
        None => {}
    }
    marks.insert(i, Mark::Visiting);
    for required in catalogue[i].requires() {
        let j = index
            .get(required)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownAnalyzer((*required).to_owned()))?;
        visit(j, catalogue, index, marks, order)?;
    }
    marks.insert(i, Mark::Done);
    order.push(i);
    Ok(())
}
