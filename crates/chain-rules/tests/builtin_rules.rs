//! Built-in rule set behaviour against whole models

use chain_model::{ChainModel, Section};
use chain_rules::{ids, RuleConfigLoader, RuleSource, Severity, Validator};
use chain_test_utils::{binary_section, complete_model, complete_model_without, source_section};
use pretty_assertions::assert_eq;

fn issue_sections(model: &ChainModel, rule_id: &str) -> Vec<String> {
    Validator::builtin()
        .validate(model)
        .by_rule(rule_id)
        .filter_map(|i| i.section.clone())
        .collect()
}

#[test]
fn complete_model_is_clean() {
    let report = Validator::builtin().validate(&complete_model());
    assert!(report.is_clean(), "unexpected issues: {:#?}", report.issues);
}

#[test]
fn one_required_projects_error_per_missing_section() {
    let model = complete_model_without(&["olap", "tests", "designer"]);
    let report = Validator::builtin().validate(&model);
    let issues: Vec<_> = report.by_rule(ids::REQUIRED_PROJECTS).collect();

    assert_eq!(issues.len(), 3);
    assert!(issues.iter().all(|i| i.is_error() && i.auto_fixable));
    assert_eq!(
        issues.iter().filter_map(|i| i.section.as_deref()).collect::<Vec<_>>(),
        vec!["olap", "designer", "tests"]
    );
}

#[test]
fn branch_and_tag_together_is_exactly_one_error() {
    let mut model = complete_model();
    model.section_mut("olap").unwrap().set_tag("Olap_2.5.20512.1");

    let report = Validator::builtin().validate(&model);
    let issues: Vec<_> = report.by_rule(ids::BRANCH_TAG_EXCLUSIVE).collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].section.as_deref(), Some("olap"));
    assert_eq!(report.error_count(), 1);
}

#[test]
fn invalid_mode_is_flagged() {
    let mut model = complete_model();
    model.section_mut("content").unwrap().set_mode("compiled");
    assert_eq!(issue_sections(&model, ids::VALID_MODE), vec!["content"]);
}

#[test]
fn dev_mode_only_checked_when_present() {
    let mut model = complete_model();
    model.section_mut("olap").unwrap().set_dev_mode("sometimes");
    assert_eq!(issue_sections(&model, ids::VALID_DEV_MODE), vec!["olap"]);
}

#[test]
fn build_number_bands() {
    for (version, errors, warnings) in [("15000", 0, 0), ("1", 0, 0), ("45000", 0, 1), ("abc", 1, 0)] {
        let mut model = complete_model();
        model.global.version = Some(version.to_string());
        let report = Validator::builtin().validate(&model);
        let range: Vec<_> = report.by_rule(ids::BUILD_NUMBER_RANGE).collect();
        assert_eq!(
            range.iter().filter(|i| i.severity == Severity::Error).count(),
            errors,
            "errors for {version}"
        );
        assert_eq!(
            range.iter().filter(|i| i.severity == Severity::Warning).count(),
            warnings,
            "warnings for {version}"
        );
    }
}

#[test]
fn example_scenario() {
    let mut model = ChainModel::new();
    model.push_section(source_section("framework", "main"));
    model.push_section(binary_section("app", "Build_1.0.0.1"));

    let report = Validator::builtin().validate(&model);
    assert!(report.by_rule(ids::BRANCH_OR_TAG_REQUIRED).next().is_none());
    assert!(report.by_rule(ids::BRANCH_TAG_EXCLUSIVE).next().is_none());
    assert_eq!(report.by_rule(ids::GLOBAL_VERSION_WHEN_BINARY).count(), 1);

    model.global.version = Some("20000".to_string());
    let report = Validator::builtin().validate(&model);
    assert_eq!(report.by_rule(ids::GLOBAL_VERSION_WHEN_BINARY).count(), 0);
}

#[test]
fn json_rules_replace_builtin_set() {
    let json = r#"{
        "catalog": { "knownSuites": ["nightly"] },
        "rules": [
            { "ruleId": "NeedsFork", "name": "Fork required", "severity": "Warning",
              "ruleType": "PropertyRequired",
              "configuration": { "propertyName": "fork",
                                 "errorMessage": "{SectionName} has no fork" } },
            { "ruleId": "Suites", "severity": "Warning", "ruleType": "IntegrationTests" }
        ]
    }"#;
    let loader = RuleConfigLoader::new(RuleSource::Json(json.to_string()));
    let validator = Validator::from_loader(&loader).unwrap();
    assert_eq!(validator.rule_ids(), vec!["NeedsFork", "Suites"]);

    let mut model = ChainModel::new();
    model.push_section(Section::new("olap").with("fork", "alice/olap"));
    model.push_section(Section::new("content"));
    model.set_integration_test("smoke", true);

    let report = validator.validate(&model);
    let messages: Vec<_> = report.issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "content has no fork",
            "Integration test suite 'smoke' is not known (known: nightly)",
        ]
    );
    assert!(!report.has_errors());
}
