use arbor::domain::{BuildType, StartParameters};
use arbor::kernel::config::load_config;
use arbor_inspect::{Cli, inspect};
use clap::Parser;
use std::fs;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("arbor").chain(args.iter().copied())).unwrap()
}

#[test]
fn settings_file_drives_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "isolated_projects = true\n").unwrap();

    let start: StartParameters = load_config(Some(&path)).unwrap();
    let report = inspect(&cli(&["--model"]), start).unwrap();

    assert_eq!(report.build_type, BuildType::Model);
    assert!(report.parameters.is_isolated_projects());
    assert_eq!(report.notices, ["Isolated projects"]);
    assert_eq!(report.access_checker, "configuration_time_barrier_based");
}

#[test]
fn task_runs_schedule_the_requested_tasks() {
    let start = StartParameters::new().with_configuration_cache(true);
    let args = ["-Dorg.gradle.configuration-cache.internal.task-execution-access-pre-stable", "build"];
    let report = inspect(&cli(&args), start).unwrap();

    assert_eq!(report.work_graph.scheduled, ["build"]);
    assert_eq!(report.access_checker, "task_state_based");
    assert!(report.to_string().contains("bundle:          caching"));
}

#[test]
fn incompatible_settings_fail() {
    let start = StartParameters::new().with_isolated_projects(true).with_configuration_cache(false);

    let err = inspect(&cli(&[]), start).unwrap_err();
    assert!(format!("{err:#}").contains("cannot be disabled when isolated projects is enabled"));
}

#[test]
fn json_report_lists_parameters() {
    let report = inspect(&cli(&["--nested"]), StartParameters::new()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["bundle"], "legacy");
    assert_eq!(json["build_type"], "TASKS");
    assert_eq!(json["parameters"]["intermediate_model_cache"], true);
}

#[test]
fn settings_tasks_are_scheduled_with_cli_tasks() {
    let start = StartParameters::new().with_configuration_cache(true).with_task_names(["assemble"]);

    let from_settings = inspect(&cli(&[]), start.clone()).unwrap();
    let combined = inspect(&cli(&["check"]), start).unwrap();

    assert_eq!(from_settings.work_graph.scheduled, ["assemble"]);
    assert_eq!(combined.work_graph.scheduled, ["assemble", "check"]);
}
