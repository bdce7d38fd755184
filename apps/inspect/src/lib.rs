//! # Arbor inspector
//!
//! Resolves the build-tree configuration for a set of start parameters and
//! reports what the build tree would run with.
//!
//! ```text
//! arbor --config gradle.toml -Dorg.gradle.internal.tooling.parallel=false --model
//! ```

use anyhow::Context;
use arbor::BuildTree;
use arbor::controller::services::work_graph::WorkGraph;
use arbor::controller::{BundleKind, NoticeSink, RecordingNoticeSink};
use arbor::domain::{BuildModelParameters, BuildType, ModelRequirements, StartParameters};
use clap::Parser;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "arbor", version, about = "Inspect the configuration of a build tree")]
pub struct Cli {
    /// Settings file with start parameters (TOML, JSON, YAML, ...)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request a tooling model instead of running tasks
    #[arg(long, conflicts_with = "nested")]
    pub model: bool,

    /// Configure a nested build tree
    #[arg(long)]
    pub nested: bool,

    /// System property, `-Dkey=value` or `-Dkey`
    #[arg(short = 'D', value_name = "KEY[=VALUE]", value_parser = parse_property)]
    pub define: Vec<(String, String)>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to a file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Requested tasks
    pub tasks: Vec<String>,
}

/// Splits `key=value`; a bare `key` gets an empty value.
///
/// # Errors
/// Rejects an empty key.
pub fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    if key.is_empty() {
        return Err(format!("missing property name in `{raw}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// What a build tree resolved to.
#[derive(Debug, Serialize)]
pub struct Report {
    pub build_type: BuildType,
    pub bundle: BundleKind,
    pub parameters: BuildModelParameters,
    pub access_checker: &'static str,
    pub notices: Vec<String>,
    pub work_graph: WorkGraph,
    pub services: Vec<&'static str>,
}

/// Builds the requested build tree and describes it.
///
/// # Errors
/// Fails when the start parameters are incompatible or a service cannot be created.
pub fn inspect(cli: &Cli, start: StartParameters) -> anyhow::Result<Report> {
    let start = cli
        .define
        .iter()
        .fold(start, |start, (key, value)| start.with_system_property(key, value))
        .with_task_names(cli.tasks.iter().cloned());
    debug!(?start, "Start parameters");
    let tasks = start.task_names.clone();

    let sink = Arc::new(RecordingNoticeSink::new());
    let builder = if cli.nested {
        BuildTree::nested(start)
    } else if cli.model {
        BuildTree::for_requirements(ModelRequirements::CreateModel(start))
    } else {
        BuildTree::for_requirements(ModelRequirements::RunTasks(start))
    };
    let tree = builder
        .notice_sink(Arc::clone(&sink) as Arc<dyn NoticeSink>)
        .build()
        .context("Build tree initialization failed")?;

    let access_checker = tree.access_checker()?.variant();
    let work_graph = tree.lifecycle_controller()?.schedule_requested_tasks(&tasks);

    Ok(Report {
        build_type: tree.build_type(),
        bundle: tree.bundle(),
        parameters: *tree.parameters(),
        access_checker,
        notices: sink.notices(),
        work_graph,
        services: tree.registry().names(),
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        writeln!(f, "build type:      {}", self.build_type)?;
        writeln!(f, "bundle:          {}", self.bundle)?;
        writeln!(f, "access checker:  {}", self.access_checker)?;
        writeln!(f, "parameters:")?;
        for (name, value) in [
            ("configure on demand", p.is_configure_on_demand()),
            ("configuration cache", p.is_configuration_cache()),
            ("isolated projects", p.is_isolated_projects()),
            ("intermediate model cache", p.is_intermediate_model_cache()),
            ("parallel configuration", p.is_parallel_configuration()),
            ("parallel tooling actions", p.is_parallel_tooling_actions()),
            ("invalidate coupled projects", p.is_invalidate_coupled_projects()),
        ] {
            writeln!(f, "  {name:<28} {value}")?;
        }
        if !self.notices.is_empty() {
            writeln!(f, "incubating:      {}", self.notices.join(", "))?;
        }
        writeln!(f, "scheduled:       {}", self.work_graph.scheduled.join(" "))?;
        writeln!(f, "services:        {}", self.services.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_split_on_first_equals() {
        assert_eq!(parse_property("a=b=c").unwrap(), ("a".to_owned(), "b=c".to_owned()));
        assert_eq!(parse_property("flag").unwrap(), ("flag".to_owned(), String::new()));
        assert!(parse_property("=true").is_err());
    }

    #[test]
    fn cli_collects_properties_and_tasks() {
        let cli = Cli::try_parse_from([
            "arbor",
            "-Dorg.gradle.internal.tooling.parallel=false",
            "--model",
            "clean",
            "build",
        ])
        .unwrap();

        assert!(cli.model);
        assert_eq!(cli.tasks, ["clean", "build"]);
        assert_eq!(cli.define[0].1, "false");
    }

    #[test]
    fn model_and_nested_conflict() {
        assert!(Cli::try_parse_from(["arbor", "--model", "--nested"]).is_err());
    }
}
