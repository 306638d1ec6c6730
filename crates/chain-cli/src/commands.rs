//! Subcommand implementations
//!
//! Each command parses the file, performs one service call and either
//! writes the file back or, for dry runs, prints the resulting text.

use anyhow::Context;
use chain_core::{ChainGenerationRequest, ChainModel, ChainService, ValidationReport};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;

/// How the process should exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// No validation errors remain
    Clean,
    /// At least one validation error remains
    ErrorsRemain,
}

impl Outcome {
    fn of(report: &ValidationReport) -> Self {
        if report.has_errors() {
            Self::ErrorsRemain
        } else {
            Self::Clean
        }
    }
}

/// Which mode property `set-mode` changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModeTarget {
    Base,
    Dev,
}

fn print_json(out: &mut dyn Write, value: &Value) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn report_json(path: &Path, report: &ValidationReport) -> Value {
    json!({
        "file": path.display().to_string(),
        "errors": report.error_count(),
        "warnings": report.warning_count(),
        "issues": report.issues,
        "faults": report.faults,
    })
}

/// Write the model back, or print it for a dry run, then report
fn finish(
    service: &ChainService,
    path: &Path,
    model: &ChainModel,
    dry_run: bool,
    summary: Value,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    if dry_run {
        out.write_all(service.render(model).as_bytes())?;
    } else {
        service
            .write(path, model)
            .with_context(|| format!("writing {}", path.display()))?;
        print_json(out, &summary)?;
    }
    Ok(Outcome::of(&service.validate(model)))
}

fn parse(service: &ChainService, path: &Path) -> anyhow::Result<ChainModel> {
    service
        .parse(path)
        .with_context(|| format!("reading {}", path.display()))
}

pub(crate) fn validate(
    service: &ChainService,
    path: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let model = parse(service, path)?;
    let report = service.validate(&model);
    print_json(out, &report_json(path, &report))?;
    Ok(Outcome::of(&report))
}

pub(crate) fn fix(
    service: &ChainService,
    path: &Path,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let mut model = parse(service, path)?;
    let summary = service.fix_all_issues(&mut model);
    let remaining = service.validate(&model);
    let summary = json!({
        "fixed": summary.fixed,
        "reordered": summary.reordered,
        "remaining": report_json(path, &remaining),
    });
    finish(service, path, &model, dry_run, summary, out)
}

/// Reordering only shows in a regenerated file: the structure-preserving
/// writer never moves existing lines. Comments are not kept.
pub(crate) fn reorder(
    service: &ChainService,
    path: &Path,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let mut model = parse(service, path)?;
    let changed = service.reorder(&mut model);
    model.raw_content = None;
    finish(service, path, &model, dry_run, json!({ "reordered": changed }), out)
}

pub(crate) fn set_branch(
    service: &ChainService,
    path: &Path,
    sections: &[&str],
    branch: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let mut model = parse(service, path)?;
    let changed = service.update_branch(&mut model, sections, branch)?;
    finish(service, path, &model, dry_run, json!({ "changed": changed }), out)
}

pub(crate) fn set_mode(
    service: &ChainService,
    path: &Path,
    sections: &[&str],
    mode: &str,
    target: ModeTarget,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let mut model = parse(service, path)?;
    let changed = match target {
        ModeTarget::Base => service.update_mode(&mut model, sections, mode)?,
        ModeTarget::Dev => service.update_dev_mode(&mut model, sections, mode)?,
    };
    finish(service, path, &model, dry_run, json!({ "changed": changed }), out)
}

pub(crate) fn set_tests(
    service: &ChainService,
    path: &Path,
    sections: &[&str],
    suites: &[&str],
    enabled: bool,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    if sections.is_empty() && suites.is_empty() {
        anyhow::bail!("name at least one section or --suite");
    }
    let mut model = parse(service, path)?;
    let changed = if sections.is_empty() {
        0
    } else {
        service.set_unit_tests(&mut model, sections, enabled)?
    };
    for suite in suites {
        service.set_integration_test(&mut model, suite, enabled);
    }
    let summary = json!({ "changed": changed, "suites": suites });
    finish(service, path, &model, dry_run, summary, out)
}

pub(crate) fn versions(
    service: &ChainService,
    path: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let model = parse(service, path)?;
    print_json(out, &serde_json::to_value(service.extract_versions(&model))?)?;
    Ok(Outcome::Clean)
}

pub(crate) fn rebase(
    service: &ChainService,
    path: &Path,
    build: u64,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let mut model = parse(service, path)?;
    let rewritten = service.rebase_versions(&mut model, build);
    let summary = json!({ "build": build, "tagsRewritten": rewritten });
    finish(service, path, &model, dry_run, summary, out)
}

pub(crate) fn generate(
    service: &ChainService,
    request: &Path,
    output: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let text = std::fs::read_to_string(request)
        .with_context(|| format!("reading {}", request.display()))?;
    let request: ChainGenerationRequest =
        serde_json::from_str(&text).context("decoding generation request")?;
    let model = service.generate_file(output, &request)?;
    let report = service.validate(&model);
    print_json(out, &report_json(output, &report))?;
    Ok(Outcome::of(&report))
}
