//! Workflow orchestration: sign → notarize → staple.
//!
//! The orchestrator owns the only mutable state of a run: the artifact path
//! handed from stage to stage and whether stapling is still outstanding.
//! Stages run strictly in order and the first failure ends the run.
use crate::args::{build_notarize_args, build_sign_args, build_staple_args, Stage, StageInvocation};
use crate::cli::{PlanArgs, RunArgs};
use crate::error::WorkflowError;
use crate::fetch::HttpArchiveFetcher;
use crate::locator::{locate_release, resolve_tool, ToolRelease};
use crate::options::WorkflowOptions;
use crate::output;
use crate::platform::{PlatformTarget, ReleaseLocation};
use crate::runner::{format_command_line, CommandRunner, ProcessRunner};
use crate::util::{resolve_program, tool_cache_root};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Furthest point a run has reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Signed,
    Notarized,
    Stapled,
    Done,
    Failed,
}

/// Whether the artifact still needs a ticket stapled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StapleState {
    NotRequested,
    Pending,
    /// `notary-submit --staple` already embedded the ticket.
    AppliedByNotarization,
    Applied,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowState {
    artifact_path: String,
    staple: StapleState,
    phase: Phase,
}

impl WorkflowState {
    pub fn new(options: &WorkflowOptions) -> Self {
        Self {
            artifact_path: options.input_path.clone(),
            staple: if options.staple {
                StapleState::Pending
            } else {
                StapleState::NotRequested
            },
            phase: Phase::Idle,
        }
    }

    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    pub fn staple(&self) -> StapleState {
        self.staple
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Build the invocation for `stage`, or explain why it is skipped.
    fn invocation_for(
        &self,
        stage: Stage,
        options: &WorkflowOptions,
    ) -> Result<StageInvocation, &'static str> {
        match stage {
            Stage::Sign if options.sign => Ok(build_sign_args(options)),
            Stage::Sign => Err("sign disabled"),
            Stage::NotarySubmit if options.notarize => {
                Ok(build_notarize_args(options, &self.artifact_path))
            }
            Stage::NotarySubmit => Err("notarize disabled"),
            Stage::Staple => match self.staple {
                StapleState::Pending => Ok(build_staple_args(options, &self.artifact_path)),
                StapleState::NotRequested => Err("staple disabled"),
                StapleState::AppliedByNotarization => Err("already stapled by notary-submit"),
                StapleState::Applied => Err("already stapled"),
            },
        }
    }

    fn complete(&mut self, stage: Stage, options: &WorkflowOptions) {
        match stage {
            Stage::Sign => {
                if let Some(output_path) = &options.output_path {
                    self.artifact_path = output_path.clone();
                }
                self.phase = Phase::Signed;
            }
            Stage::NotarySubmit if options.staple => {
                self.staple = StapleState::AppliedByNotarization;
                self.phase = Phase::Stapled;
            }
            Stage::NotarySubmit => self.phase = Phase::Notarized,
            Stage::Staple => {
                self.staple = StapleState::Applied;
                self.phase = Phase::Stapled;
            }
        }
    }
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct WorkflowReport {
    pub output_path: String,
    pub invocations: Vec<StageInvocation>,
    pub state: WorkflowState,
}

/// A run that halted, with the state it ended in.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct WorkflowFailure {
    pub error: WorkflowError,
    pub state: WorkflowState,
}

/// Run every enabled stage with the tool produced by `resolve`.
///
/// Pre-flight checks run before `resolve`, so configuration errors never
/// trigger a download or a process launch. The resolved tool lives until the
/// last stage has run.
pub fn execute<F>(
    options: &WorkflowOptions,
    resolve: F,
    runner: &mut dyn ProcessRunner,
) -> Result<WorkflowReport, WorkflowFailure>
where
    F: FnOnce() -> Result<ToolRelease, WorkflowError>,
{
    let mut state = WorkflowState::new(options);
    match resolve_and_run(options, resolve, runner, &mut state) {
        Ok(invocations) => {
            state.phase = Phase::Done;
            tracing::info!(output_path = %state.artifact_path(), "workflow complete");
            Ok(WorkflowReport {
                output_path: state.artifact_path().to_string(),
                invocations,
                state,
            })
        }
        Err(error) => {
            tracing::debug!(
                reached = ?state.phase(),
                artifact = %state.artifact_path(),
                "workflow halted"
            );
            state.phase = Phase::Failed;
            Err(WorkflowFailure { error, state })
        }
    }
}

fn resolve_and_run<F>(
    options: &WorkflowOptions,
    resolve: F,
    runner: &mut dyn ProcessRunner,
    state: &mut WorkflowState,
) -> Result<Vec<StageInvocation>, WorkflowError>
where
    F: FnOnce() -> Result<ToolRelease, WorkflowError>,
{
    options.preflight()?;
    let tool = resolve()?;
    tracing::info!(
        version = %tool.version,
        executable = %tool.executable.display(),
        "rcodesign ready"
    );
    run_stages(options, &tool.executable, runner, state)
}

fn run_stages(
    options: &WorkflowOptions,
    program: &Path,
    runner: &mut dyn ProcessRunner,
    state: &mut WorkflowState,
) -> Result<Vec<StageInvocation>, WorkflowError> {
    let mut invocations = Vec::new();
    for stage in Stage::ALL {
        let invocation = match state.invocation_for(stage, options) {
            Ok(invocation) => invocation,
            Err(reason) => {
                tracing::debug!(stage = stage.as_str(), reason, "skipping stage");
                continue;
            }
        };
        runner.run(program, &invocation)?;
        state.complete(stage, options);
        invocations.push(invocation);
    }
    Ok(invocations)
}

/// Accepts every invocation without running it.
struct DryRun;

impl ProcessRunner for DryRun {
    fn run(&mut self, _program: &Path, _invocation: &StageInvocation) -> Result<(), WorkflowError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct PlannedStage {
    stage: Stage,
    argv: Vec<String>,
}

#[derive(Serialize)]
struct WorkflowPlan {
    platform: String,
    release: ReleaseLocation,
    executable: String,
    stages: Vec<PlannedStage>,
    output_path: String,
    phase: Phase,
    staple: StapleState,
}

pub fn run_run(args: RunArgs) -> Result<()> {
    let options = WorkflowOptions::from_inputs(&args.inputs)?;
    let rcodesign_path = args
        .rcodesign_path
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let resolve = || -> Result<ToolRelease, WorkflowError> {
        match rcodesign_path {
            Some(path) => {
                let executable = resolve_program(path)?;
                tracing::info!(executable = %executable.display(), "using preinstalled rcodesign");
                Ok(ToolRelease::preinstalled(&options.rcodesign_version, &executable))
            }
            None => {
                let fetcher = HttpArchiveFetcher::new(tool_cache_root());
                resolve_tool(&fetcher, &options.rcodesign_version, &PlatformTarget::host())
            }
        }
    };
    let report = execute(&options, resolve, &mut CommandRunner)?;
    output::set_output("output_path", &report.output_path).context("record output_path")?;
    println!("{}", report.output_path);
    Ok(())
}

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let options = WorkflowOptions::from_inputs(&args.inputs)?;
    let host = PlatformTarget::host();
    let platform = PlatformTarget::new(
        args.os.unwrap_or(host.os),
        args.arch.unwrap_or(host.arch),
    );
    let release = locate_release(&options.rcodesign_version, &platform)?;
    let executable = release.executable_in(Path::new("<tool-cache>"));
    let tool = ToolRelease::preinstalled(&options.rcodesign_version, &executable);
    let report = execute(&options, || Ok(tool), &mut DryRun)?;

    if args.json {
        let plan = WorkflowPlan {
            platform: platform.to_string(),
            executable: executable.display().to_string(),
            stages: report
                .invocations
                .iter()
                .map(|invocation| PlannedStage {
                    stage: invocation.stage(),
                    argv: invocation.redacted_argv(),
                })
                .collect(),
            release,
            output_path: report.output_path,
            phase: report.state.phase(),
            staple: report.state.staple(),
        };
        let text = serde_json::to_string_pretty(&plan).context("serialize plan")?;
        println!("{text}");
        return Ok(());
    }

    println!("platform: {platform}");
    println!("download: {}", release.url);
    println!("executable: {}", executable.display());
    if report.invocations.is_empty() {
        println!("stages: none enabled");
    }
    for invocation in &report.invocations {
        println!("{}", format_command_line(&executable, invocation));
    }
    println!("output_path: {}", report.output_path);
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
