// ============================================================================
// splice-core/src/pipeline/compose.rs
// ============================================================================
//
// COMPOSITION: One job from validation to cleanup
//
// WORKFLOW:
// 1. Validate the job (input count first, so nothing is probed or spawned
//    for a malformed submission)
// 2. Analyzing: profile every source, plan against the reference
// 3. Repackaging or Preprocessing: zero or more single-input encoder runs
//    into the job workspace
// 4. Composing: one encoder run with the mode's filter graph
// 5. CleaningUp: the workspace is disposed on every path
//
// AI-ASSISTANT-INFO: Composition job state machine

// ---- Internal crate imports ----
use super::Orchestrator;
use super::preprocess::{
    CONFORM_EXTENSION, ConformGeometry, REPACKAGE_EXTENSION, conform_args, repackage_args,
};
use crate::error::{CoreError, CoreResult};
use crate::events::Stage;
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::filters::{DurationPolicy, FilterGraphBuilder, mode_spec, validate_trim};
use crate::job::{CompositionJob, CompositionMode};
use crate::media::MediaStreamProfile;
use crate::reconcile::{self, InputAction, ReconciliationPlan, ReconciliationStrategy};
use crate::temp_files::TempWorkspace;
use crate::utils::{display_name, format_duration};

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// What a finished composition job did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionReport {
    pub output: PathBuf,
    pub mode: String,
    pub strategy: ReconciliationStrategy,
    /// Number of inputs that went through a preprocessing run.
    pub preprocessed_inputs: usize,
    pub expected_duration: f64,
    pub elapsed_seconds: f64,
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> Orchestrator<S, P> {
    /// Runs one composition job to completion.
    ///
    /// Any failure is fatal to the job; the workspace is removed either way
    /// and cleanup problems are only logged.
    pub fn run_composition(&self, job: &CompositionJob) -> CoreResult<CompositionReport> {
        let label = display_name(&job.output);

        if let Err(e) = job.validate() {
            self.sink.error(format!("Rejected {} job: {e}", job.mode.name()));
            self.sink.stage(Stage::Failed, &label);
            return Err(e.into());
        }

        let started = Instant::now();
        let result = TempWorkspace::create(&self.config.workspace_base()).and_then(|mut workspace| {
            let outcome = self.compose(job, &label, &mut workspace, started);
            self.sink.stage(Stage::CleaningUp, &label);
            workspace.dispose_all();
            outcome
        });

        match &result {
            Ok(report) => {
                self.sink.info(format!(
                    "Composed {} in {}",
                    report.output.display(),
                    format_duration(report.elapsed_seconds)
                ));
                self.sink.stage(Stage::Complete, &label);
            }
            Err(CoreError::Cancelled) => {
                self.sink.warn(format!("{label}: cancelled"));
                self.sink.stage(Stage::Failed, &label);
            }
            Err(e) => {
                self.sink.error(format!("{label}: {e}"));
                self.sink.stage(Stage::Failed, &label);
            }
        }
        result
    }

    fn compose(
        &self,
        job: &CompositionJob,
        label: &str,
        workspace: &mut TempWorkspace,
        started: Instant,
    ) -> CoreResult<CompositionReport> {
        self.cancel.check()?;
        self.sink.stage(Stage::Analyzing, label);

        let mut profiles = job
            .sources()
            .iter()
            .map(|source| self.profiler.probe(source))
            .collect::<Result<Vec<_>, _>>()?;

        let reference = profiles
            .get(job.reference_index())
            .cloned()
            .ok_or_else(|| CoreError::OperationFailed("job has no reference input".to_string()))?;

        if let CompositionMode::IntroOutroInsert {
            intro_trim_seconds,
            outro_trim_seconds,
            ..
        } = &job.mode
        {
            validate_trim(reference.duration, *intro_trim_seconds, *outro_trim_seconds)?;
        }

        let plan = reconcile::plan(&profiles, &reference);
        self.report_plan(&plan);

        let preprocessed_inputs = self.preprocess(job, &plan, &mut profiles, workspace, label)?;

        self.cancel.check()?;
        self.sink.stage(Stage::Composing, label);

        let invocation = FilterGraphBuilder::new(&self.config).build(job, &profiles, &plan)?;
        if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.runner()
            .run(&invocation.args, Some(invocation.expected_duration), label)?;

        Ok(CompositionReport {
            output: job.output.clone(),
            mode: job.mode.name().to_string(),
            strategy: plan.strategy,
            preprocessed_inputs,
            expected_duration: invocation.expected_duration,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    fn report_plan(&self, plan: &ReconciliationPlan) {
        for assessment in &plan.inputs {
            if assessment.mismatches.any() {
                log::debug!(
                    "{} differs from reference in: {}",
                    assessment.file.display(),
                    assessment.mismatches.describe().join(", ")
                );
            }
        }
        self.sink
            .info(format!("Reconciliation strategy: {}", plan.strategy));
    }

    /// Runs the plan's preprocessing and rewrites `profiles` to point at the
    /// intermediates. Returns how many inputs were processed.
    fn preprocess(
        &self,
        job: &CompositionJob,
        plan: &ReconciliationPlan,
        profiles: &mut [MediaStreamProfile],
        workspace: &mut TempWorkspace,
        label: &str,
    ) -> CoreResult<usize> {
        let (stage, action, extension) = match plan.strategy {
            ReconciliationStrategy::None => return Ok(0),
            ReconciliationStrategy::FastRepackage => {
                (Stage::Repackaging, InputAction::Repackage, REPACKAGE_EXTENSION)
            }
            ReconciliationStrategy::FullReencode => {
                (Stage::Preprocessing, InputAction::Reencode, CONFORM_EXTENSION)
            }
        };

        let indices = plan.indices_needing(action);
        self.sink.stage(stage, label);
        let background = job
            .geometry
            .background
            .as_deref()
            .unwrap_or(&self.config.default_background);
        // Parallel layouts fit each panel themselves.
        let keep_frame = mode_spec(&job.mode).duration_policy == DurationPolicy::Max;
        let geometry = if keep_frame {
            ConformGeometry::Source
        } else {
            ConformGeometry::Reference {
                aspect: job.geometry.aspect,
                background,
            }
        };

        for (step, &index) in indices.iter().enumerate() {
            self.cancel.check()?;
            let source = &profiles[index];
            let intermediate = workspace.create_file_path(&format!("input{index}"), extension);
            let args = match action {
                InputAction::Repackage => repackage_args(&source.path, &intermediate),
                _ => conform_args(source, &plan.reference, geometry, &intermediate),
            };
            let step_label = format!(
                "{stage} {}/{}: {}",
                step + 1,
                indices.len(),
                source.display_name
            );
            self.runner().run(&args, Some(source.duration), &step_label)?;

            let updated = match action {
                InputAction::Repackage => source.with_path(&intermediate),
                _ if keep_frame => source.retimed(&plan.reference, &intermediate),
                _ => source.conformed(&plan.reference, &intermediate),
            };
            profiles[index] = updated;
        }
        Ok(indices.len())
    }
}
