//! End-to-end flows through the service and the filesystem

use chain_core::{
    ChainError, ChainGenerationRequest, ChainService, ChainWriter, ProjectConfig,
    RuleConfigLoader, RuleSource,
};
use chain_file::{ChainFileLayer, ParseError};
use chain_model::DEFAULT_PROJECT_ORDER;
use chain_test_utils::{assignment_lines, ChainFixture, EXAMPLE_SCENARIO, SAMPLE_CHAIN};
use pretty_assertions::assert_eq;

fn service() -> ChainService {
    ChainService::builtin()
        .with_layer(ChainFileLayer::new().with_writer(ChainWriter::new().without_timestamp()))
}

/// Section prefixes of the assignment lines, consecutive duplicates removed
fn section_sequence(text: &str) -> Vec<String> {
    let mut names: Vec<String> = assignment_lines(text)
        .into_iter()
        .filter_map(|line| line.split_once('.').map(|(name, _)| name.to_string()))
        .filter(|name| name != "global")
        .collect();
    names.dedup();
    names
}

#[test]
fn sample_chain_round_trips_unchanged() {
    let fixture = ChainFixture::new(SAMPLE_CHAIN);
    let service = service();
    let model = service.parse(fixture.path()).unwrap();

    assert!(!service.validate(&model).has_errors());
    service.write(fixture.path(), &model).unwrap();
    assert_eq!(fixture.read(), SAMPLE_CHAIN);
}

#[test]
fn fix_all_repairs_file_in_place() {
    let fixture = ChainFixture::new(
        "# partial chain\n\nolap.mode=bogus\nolap.branch=main\nolap.tag=Olap_1.0.1.0\n",
    );
    let service = service();
    let mut model = service.parse(fixture.path()).unwrap();

    let summary = service.fix_all_issues(&mut model);
    assert!(summary.fixed >= 3);
    service.write(fixture.path(), &model).unwrap();

    let text = fixture.read();
    assert!(text.starts_with("# partial chain\n\nframework.mode=source\n"));
    assert!(text.contains("olap.mode=source\n"));
    assert!(text.contains("olap.branch=main\n"));
    assert!(text.contains("#olap.tag=Olap_1.0.1.0\n"));
    assert_eq!(section_sequence(&text), DEFAULT_PROJECT_ORDER.to_vec());

    let mut reparsed = service.parse(fixture.path()).unwrap();
    assert!(!service.validate(&reparsed).has_errors());
    assert_eq!(service.fix_all_issues(&mut reparsed).fixed, 0);
}

#[test]
fn example_scenario_reports_missing_global_version() {
    let service = service();
    let model = service.layer().parse_str(EXAMPLE_SCENARIO);
    assert_eq!(model.section_names(), vec!["framework", "app"]);

    let report = service.validate(&model);
    assert_eq!(report.by_rule("BranchOrTagRequired").count(), 0);
    assert_eq!(report.by_rule("BranchTagExclusive").count(), 0);
    let version: Vec<_> = report.by_rule("GlobalVersionWhenBinary").collect();
    assert_eq!(version.len(), 1);
    assert!(version[0].auto_fixable);
}

#[test]
fn generated_chain_is_written_fresh() {
    let fixture = ChainFixture::new("");
    let service = ChainService::builtin();
    let request = ChainGenerationRequest::new()
        .with_global_version("20512")
        .with_project(ProjectConfig::new("tests", "source").with_tests_unit(false))
        .with_project(ProjectConfig::new("framework", "source").with_dev_mode("binary"))
        .with_project(ProjectConfig::new("olap", "binary").with_tag("Olap_2.5.20512.1"))
        .with_integration_test("smoke", true)
        .with_feature_branch("feature/new-cube");

    let generated = service.generate_file(fixture.path(), &request).unwrap();
    let text = fixture.read();
    assert!(text.starts_with("# Build chain configuration\n"));
    assert!(text.contains("framework.branch=feature/new-cube"));
    assert!(text.contains("tests.smoke.run=true"));
    assert_eq!(section_sequence(&text), vec!["framework", "olap", "tests"]);

    let parsed = service.parse(fixture.path()).unwrap();
    assert_eq!(parsed.sections, generated.sections);
    assert_eq!(parsed.global, generated.global);
    assert_eq!(parsed.integration_tests, generated.integration_tests);
}

#[test]
fn rebase_rewrites_tags_on_disk() {
    let fixture = ChainFixture::new(SAMPLE_CHAIN);
    let service = service();
    let mut model = service.parse(fixture.path()).unwrap();

    let before = service.extract_versions(&model);
    assert_eq!(before.builds(), vec![20512]);
    assert_eq!(service.rebase_versions(&mut model, 21000), before.sections.len());
    service.write(fixture.path(), &model).unwrap();

    let text = fixture.read();
    assert!(text.contains("global.version.binary=21000\n"));
    assert!(text.contains("modeling.tag=Modeling_2.5.21000.3\n"));
    assert!(!text.contains("20512.3"));
    // dev version is not part of a rebase
    assert!(text.contains("global.devs.version.binary=20512\n"));
}

#[test]
fn updates_touch_only_their_lines() {
    let fixture = ChainFixture::new(SAMPLE_CHAIN);
    let service = service();
    let mut model = service.parse(fixture.path()).unwrap();

    service
        .update_branch(&mut model, &["modeling", "dashboards"], "integration")
        .unwrap();
    service.set_integration_test(&mut model, "smoke", false);
    service.write(fixture.path(), &model).unwrap();

    let text = fixture.read();
    let before: Vec<&str> = SAMPLE_CHAIN.lines().collect();
    let changed: Vec<&str> = text.lines().filter(|l| !before.contains(l)).collect();
    assert_eq!(
        changed,
        vec![
            "modeling.branch=integration",
            "#modeling.tag=Modeling_2.5.20512.3",
            "dashboards.branch=integration",
            "#dashboards.tag=Dashboards_2.5.20512.2",
            "tests.smoke.run=false",
        ]
    );
}

#[test]
fn missing_file_is_reported() {
    let fixture = ChainFixture::new("");
    let err = service().parse(fixture.missing_path()).unwrap_err();
    assert!(matches!(err, ChainError::Parse(ParseError::NotFound { .. })));
    assert!(err.is_io());
}

#[test]
fn missing_rule_file_falls_back_to_builtin() {
    let fixture = ChainFixture::new("");
    let loader = RuleConfigLoader::new(RuleSource::File(fixture.missing_path()));
    let service = ChainService::from_loader(&loader).unwrap();
    let model = service.layer().parse_str(SAMPLE_CHAIN);
    assert!(!service.validate(&model).has_errors());
}

#[test]
fn malformed_rule_file_is_a_config_error() {
    let fixture = ChainFixture::new("{ not json");
    let loader = RuleConfigLoader::new(RuleSource::File(fixture.path().to_path_buf()));
    assert!(matches!(
        ChainService::from_loader(&loader),
        Err(ChainError::Config(_))
    ));
}
