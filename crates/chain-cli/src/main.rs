//! chainctl - command-line front end for chain files
//!
//! Every subcommand goes through [`ChainService`]. Results are printed to
//! stdout as JSON (or chain text for dry runs); logs go to stderr.

mod commands;

use anyhow::Context;
use chain_core::{ChainService, RuleConfigLoader, RuleSource};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::Outcome;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Chain file")
}

fn sections_arg() -> Arg {
    Arg::new("sections")
        .num_args(1..)
        .help("Section (project) names")
}

fn dry_run_arg() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Print the resulting file instead of writing it")
}

fn cli() -> Command {
    Command::new("chainctl")
        .version(chain_core::VERSION)
        .about("Validate, fix and edit build chain files")
        .subcommand_required(true)
        .arg(
            Arg::new("rules")
                .long("rules")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON rule configuration (defaults to the built-in rules)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a chain file and print the report")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("fix")
                .about("Apply every automatic fix")
                .arg(file_arg())
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("reorder")
                .about("Rewrite the file with sections in canonical order")
                .arg(file_arg())
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("set-branch")
                .about("Put sections on a branch (drops their tags)")
                .arg(file_arg())
                .arg(
                    Arg::new("branch")
                        .long("branch")
                        .required(true)
                        .help("Branch name"),
                )
                .arg(sections_arg().required(true))
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("set-mode")
                .about("Set the build mode of sections")
                .arg(file_arg())
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .required(true)
                        .value_parser(["source", "binary", "ignore"])
                        .help("Build mode"),
                )
                .arg(
                    Arg::new("dev")
                        .long("dev")
                        .action(ArgAction::SetTrue)
                        .help("Set the developer build mode instead"),
                )
                .arg(sections_arg().required(true))
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("set-tests")
                .about("Toggle unit tests of sections or integration test suites")
                .arg(file_arg())
                .arg(
                    Arg::new("enabled")
                        .long("enabled")
                        .required(true)
                        .value_parser(value_parser!(bool))
                        .help("true or false"),
                )
                .arg(
                    Arg::new("suite")
                        .long("suite")
                        .action(ArgAction::Append)
                        .help("Integration test suite (repeatable)"),
                )
                .arg(sections_arg())
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("versions")
                .about("Print global versions and section tags")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("rebase")
                .about("Move the global version and release tags to a new build")
                .arg(file_arg())
                .arg(
                    Arg::new("build")
                        .long("build")
                        .required(true)
                        .value_parser(value_parser!(u64))
                        .help("New build number"),
                )
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a chain file from a JSON request")
                .arg(
                    Arg::new("request")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON generation request"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Chain file to create"),
                ),
        )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn service(matches: &ArgMatches) -> anyhow::Result<ChainService> {
    let source = match matches.get_one::<PathBuf>("rules") {
        Some(path) => RuleSource::File(path.clone()),
        None => RuleSource::BuiltIn,
    };
    let loader = RuleConfigLoader::new(source);
    ChainService::from_loader(&loader).context("loading rule configuration")
}

fn sections(args: &ArgMatches) -> Vec<&str> {
    args.get_many::<String>("sections")
        .map(|names| names.map(String::as_str).collect())
        .unwrap_or_default()
}

fn run(matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let service = service(matches)?;
    let Some((name, args)) = matches.subcommand() else {
        anyhow::bail!("no subcommand given");
    };
    let file = || {
        args.get_one::<PathBuf>("file")
            .context("missing chain file argument")
    };
    let dry_run = || args.get_flag("dry-run");

    match name {
        "validate" => commands::validate(&service, file()?, out),
        "fix" => commands::fix(&service, file()?, dry_run(), out),
        "reorder" => commands::reorder(&service, file()?, dry_run(), out),
        "set-branch" => {
            let branch = args
                .get_one::<String>("branch")
                .context("missing --branch")?;
            commands::set_branch(&service, file()?, &sections(args), branch, dry_run(), out)
        }
        "set-mode" => {
            let mode = args.get_one::<String>("mode").context("missing --mode")?;
            let target = if args.get_flag("dev") {
                commands::ModeTarget::Dev
            } else {
                commands::ModeTarget::Base
            };
            commands::set_mode(&service, file()?, &sections(args), mode, target, dry_run(), out)
        }
        "set-tests" => {
            let enabled = *args
                .get_one::<bool>("enabled")
                .context("missing --enabled")?;
            let suites: Vec<&str> = args
                .get_many::<String>("suite")
                .map(|s| s.map(String::as_str).collect())
                .unwrap_or_default();
            commands::set_tests(
                &service,
                file()?,
                &sections(args),
                &suites,
                enabled,
                dry_run(),
                out,
            )
        }
        "versions" => commands::versions(&service, file()?, out),
        "rebase" => {
            let build = *args.get_one::<u64>("build").context("missing --build")?;
            commands::rebase(&service, file()?, build, dry_run(), out)
        }
        "generate" => {
            let request = args
                .get_one::<PathBuf>("request")
                .context("missing request file")?;
            let output = args
                .get_one::<PathBuf>("output")
                .context("missing --output")?;
            commands::generate(&service, request, output, out)
        }
        other => anyhow::bail!("unknown subcommand '{other}'"),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&matches, &mut out) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::ErrorsRemain) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_utils::{ChainFixture, SAMPLE_CHAIN};

    fn run_args(args: &[&str]) -> (anyhow::Result<Outcome>, String) {
        let matches = cli().try_get_matches_from(args).unwrap();
        let mut out = Vec::new();
        let outcome = run(&matches, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(cli()
            .try_get_matches_from(["chainctl", "set-mode", "f", "--mode", "compiled", "olap"])
            .is_err());
    }

    #[test]
    fn validate_sample_is_clean() {
        let fixture = ChainFixture::new(SAMPLE_CHAIN);
        let path = fixture.path().to_str().unwrap();
        let (outcome, stdout) = run_args(&["chainctl", "validate", path]);
        assert_eq!(outcome.unwrap(), Outcome::Clean);
        let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(report["errors"], 0);
    }

    #[test]
    fn global_rules_flag_reaches_the_service() {
        let rules = ChainFixture::new("[]");
        let chain = ChainFixture::new("olap.mode=bogus\n");
        let (outcome, stdout) = run_args(&[
            "chainctl",
            "validate",
            chain.path().to_str().unwrap(),
            "--rules",
            rules.path().to_str().unwrap(),
        ]);
        assert_eq!(outcome.unwrap(), Outcome::Clean);
        assert!(stdout.contains("\"issues\": []"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let fixture = ChainFixture::new("");
        let missing = fixture.missing_path();
        let (outcome, _) = run_args(&["chainctl", "versions", missing.to_str().unwrap()]);
        assert!(outcome.is_err());
    }
}
