use crate::cli::LintArgs;
use color_eyre::eyre::{eyre, Result};
use duct::cmd;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Fmt,
    Clippy,
    Test,
    Machete,
}

/// One step of the lint pipeline.
#[derive(Debug, PartialEq, Eq)]
struct Step {
    stage: Stage,
    args: Vec<&'static str>,
    /// Missing tools skip the step instead of failing it.
    optional: bool,
}

impl Step {
    fn display_name(&self) -> String {
        format!("cargo {}", self.args.join(" "))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Passed(String),
    Failed(String),
    Missing,
}

fn stage_args(stage: Stage, fix: bool) -> Vec<&'static str> {
    match (stage, fix) {
        (Stage::Fmt, false) => vec!["fmt", "--all", "--check"],
        (Stage::Fmt, true) => vec!["fmt", "--all"],
        (Stage::Clippy, false) => vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        (Stage::Clippy, true) => vec![
            "clippy",
            "--workspace",
            "--all-targets",
            "--fix",
            "--allow-dirty",
            "--",
            "-D",
            "warnings",
        ],
        (Stage::Test, _) => vec!["test", "--workspace"],
        (Stage::Machete, _) => vec!["machete"],
    }
}

fn skipped(stage: Stage, args: &LintArgs) -> bool {
    match stage {
        Stage::Fmt => args.no_fmt,
        Stage::Clippy => args.no_clippy,
        Stage::Test => args.no_test,
        Stage::Machete => args.no_machete,
    }
}

/// The ordered steps selected by `args`.
fn pipeline(args: &LintArgs) -> Vec<Step> {
    [Stage::Fmt, Stage::Clippy, Stage::Test, Stage::Machete]
        .into_iter()
        .filter(|stage| !skipped(*stage, args))
        .map(|stage| Step {
            stage,
            args: stage_args(stage, args.fix),
            optional: stage == Stage::Machete,
        })
        .collect()
}

fn tool_missing(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("no such command") || lower.contains("unrecognized subcommand")
}

fn classify(success: bool, output: String, optional: bool) -> Outcome {
    match (success, optional && tool_missing(&output)) {
        (true, _) => Outcome::Passed(output),
        (false, true) => Outcome::Missing,
        (false, false) => Outcome::Failed(output),
    }
}

pub fn run(args: &LintArgs) -> Result<()> {
    let log_path = log_path()?;
    let mut log = fs::File::create(&log_path)?;

    for step in pipeline(args) {
        let name = step.display_name();
        println!("==> {name}");

        let output = cmd("cargo", &step.args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        writeln!(log, "=== {name} ===\n{text}")?;

        match classify(output.status.success(), text, step.optional) {
            Outcome::Passed(text) => {
                if args.verbose {
                    print!("{text}");
                }
            }
            Outcome::Missing => println!("[skip] {name} (not installed)"),
            Outcome::Failed(text) => {
                print!("{text}");
                println!("log: {}", log_path.display());
                return Err(eyre!("lint failed at: {name}"));
            }
        }
    }

    println!("log: {}", log_path.display());
    Ok(())
}

fn log_path() -> Result<PathBuf> {
    let target_dir = std::env::current_dir()?.join("target");
    fs::create_dir_all(&target_dir)?;
    Ok(target_dir.join("xtask-lint.log"))
}
