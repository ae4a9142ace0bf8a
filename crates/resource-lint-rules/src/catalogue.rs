//! The analyzer catalogue handed to the graph.

use resource_lint_core::AnalyzerBox;
use resource_lint_schema::extraction_analyzers;

use crate::{
    AtLeastOneOf, EnumConversion, ExpandFlattenPlacement, FieldOrder, FixedErrorString,
    LicenseHeader, MaxItemsOne, OptionalComputed, PercentNaming, PointerFrom, StringValidation,
    UpdateCoverage,
};

/// Returns every check, without the extraction analyzers they require.
#[must_use]
pub fn all_checks() -> Vec<AnalyzerBox> {
    vec![
        Box::new(StringValidation::new()),
        Box::new(OptionalComputed::new()),
        Box::new(EnumConversion::new()),
        Box::new(PointerFrom::new()),
        Box::new(LicenseHeader::new()),
        Box::new(MaxItemsOne::new()),
        Box::new(AtLeastOneOf::new()),
        Box::new(PercentNaming::new()),
        Box::new(FixedErrorString::new()),
        Box::new(FieldOrder::new()),
        Box::new(UpdateCoverage::new()),
        Box::new(ExpandFlattenPlacement::new()),
    ]
}

/// Returns the full catalogue: extraction analyzers first, then the checks.
#[must_use]
pub fn all_analyzers() -> Vec<AnalyzerBox> {
    let mut analyzers = extraction_analyzers();
    analyzers.extend(all_checks());
    analyzers
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_lint_core::AnalyzerGraph;

    #[test]
    fn test_catalogue_builds_and_lists_checks() {
        let checks: Vec<&str> = all_checks().iter().map(|a| a.name()).collect();
        assert_eq!(checks.len(), 12);
        assert!(all_checks().iter().all(|a| a.reports()));

        let graph = AnalyzerGraph::build(all_analyzers(), &[]).expect("graph");
        for name in &checks {
            assert!(graph.is_selected(name));
        }
        assert!(!graph.is_selected("schema-local"));
    }

    #[test]
    fn test_selecting_one_check_pulls_in_requirements() {
        let graph = AnalyzerGraph::build(all_analyzers(), &["AZNR002"]).expect("graph");
        let order: Vec<&str> = graph.analyzers().map(|a| a.name()).collect();
        assert_eq!(order, vec!["schema-common", "typed-resource", "AZNR002"]);
    }
}
