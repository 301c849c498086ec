//! Build orchestration.
//!
//! Runs the components in order and decides, per step, whether a failure
//! aborts the build or is logged and skipped. Anything that would leave the
//! release itself missing or broken is fatal; launcher scripts, the copy to
//! the destination and retention sweeping are best-effort.

mod phase;

pub use phase::PipelinePhase;

use crate::config::BuildConfig;
use crate::error::{PublishError, Result, ShareError, fs_error};
use crate::packager::{BuildKind, Packager};
use crate::publish::{ArchiveInfo, ReleasePublisher};
use crate::retention::{RetentionSweeper, SweepReport};
use crate::share::{ShareLocator, copy_dir_to_destination, copy_to_destination};
use crate::stage::ArtifactStager;
use crate::version::{BuildVersion, VersionStore};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Remote shares keep a single artifact once more than this many exist
const REMOTE_KEEP_IF_MORE_THAN: usize = 1;

/// Switches for one invocation
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Packaging mode
    pub kind: BuildKind,
    /// Copy the artifact to the destination after building
    pub copy: bool,
    /// Beta build: marker on the version, local beta destination
    pub beta: bool,
    /// Produce a `.zip` archive (otherwise the directory is copied)
    pub compress: bool,
    /// Reuse the stored version instead of advancing it
    pub same_version: bool,
    /// Render launcher scripts
    pub launchers: bool,
    /// Draw progress bars while copying
    pub show_progress: bool,
    /// Build date override; defaults to the local date
    pub today: Option<NaiveDate>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            kind: BuildKind::Native,
            copy: false,
            beta: false,
            compress: true,
            same_version: false,
            launchers: true,
            show_progress: true,
            today: None,
        }
    }
}

/// What a pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Version stamped on this build
    pub version: Option<BuildVersion>,
    /// Renamed primary artifact in the staging area
    pub primary_artifact: Option<PathBuf>,
    /// Versioned release directory
    pub release_dir: Option<PathBuf>,
    /// Archive, when compression ran
    pub archive: Option<ArchiveInfo>,
    /// Where the artifact was copied to
    pub copied_to: Option<PathBuf>,
    /// Local retention outcome
    pub local_sweep: Option<SweepReport>,
    /// Remote retention outcome
    pub remote_sweep: Option<SweepReport>,
    /// Phases reached, in order
    pub phases: Vec<PipelinePhase>,
    /// Recoverable problems that were skipped
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Last phase reached
    pub fn phase(&self) -> PipelinePhase {
        self.phases.last().copied().unwrap_or(PipelinePhase::Idle)
    }

    fn advance(&mut self, phase: PipelinePhase) {
        log::debug!("Pipeline phase: {} -> {}", self.phase(), phase);
        self.phases.push(phase);
    }

    /// Downgrade a failed best-effort step to a warning
    fn best_effort<T>(&mut self, step: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{} failed, continuing: {}", step, e);
                self.warnings.push(format!("{}: {}", step, e));
                None
            }
        }
    }
}

/// Sequential build pipeline over one project configuration
#[derive(Debug)]
pub struct BuildPipeline<'a> {
    config: &'a BuildConfig,
    versions: VersionStore,
    packager: Packager,
    stager: ArtifactStager,
    locator: ShareLocator,
    sweeper: RetentionSweeper,
}

impl<'a> BuildPipeline<'a> {
    /// Wire every component to `config`
    pub fn new(config: &'a BuildConfig) -> Self {
        let layout = config.layout();
        Self {
            versions: VersionStore::new(&layout.version_file),
            packager: Packager::new(config),
            stager: ArtifactStager::new(config),
            locator: ShareLocator::from_config(config),
            sweeper: RetentionSweeper::new(config.project_name.clone(), layout.release_dir),
            config,
        }
    }

    /// Replace the share locator (different candidates or path style)
    pub fn with_locator(mut self, locator: ShareLocator) -> Self {
        self.locator = locator;
        self
    }

    fn publisher(&self, options: &PipelineOptions) -> ReleasePublisher {
        ReleasePublisher::new(self.config).with_launchers(options.launchers)
    }

    fn compute_version(&self, options: &PipelineOptions) -> Result<BuildVersion> {
        if options.same_version {
            if let Some(current) = self.versions.current() {
                let version = current.with_beta(options.beta);
                log::info!("Reusing version {}", version);
                return Ok(version);
            }
            log::warn!("No stored version to reuse; advancing instead");
        }
        let today = options.today.unwrap_or_else(|| chrono::Local::now().date_naive());
        self.versions.read_and_advance_on(today, options.beta)
    }

    /// Destination for this run: the beta directory, or the first reachable share
    pub fn resolve_destination(&self, beta: bool) -> Result<PathBuf> {
        if beta {
            let dir = self.config.beta_destination().ok_or(ShareError::NoHomeDir)?;
            std::fs::create_dir_all(&dir).map_err(fs_error("creating", &dir))?;
            log::info!("Beta build: destination {}", dir.display());
            return Ok(dir);
        }
        self.locator.find_available_destination().ok_or_else(|| {
            ShareError::NoDestination {
                candidates: self.locator.candidates().to_vec(),
            }
            .into()
        })
    }

    fn copy_artifact(
        &self,
        artifact: &Path,
        destination: &Path,
        options: &PipelineOptions,
    ) -> Result<PathBuf> {
        if artifact.is_dir() {
            copy_dir_to_destination(artifact, destination, options.show_progress)
        } else {
            copy_to_destination(artifact, destination, options.show_progress)
        }
    }

    fn sweep_remote(&self, report: &mut BuildReport, destination: &Path, copied: &Path, beta: bool) {
        if beta {
            return;
        }
        let result = self
            .sweeper
            .sweep_remote(destination, copied, REMOTE_KEEP_IF_MORE_THAN);
        report.remote_sweep = report.best_effort("remote retention", result);
    }

    fn sweep_local(&self, report: &mut BuildReport) {
        let result = self.sweeper.sweep_releases(self.config.keep_releases);
        if let Some(sweep) = report.best_effort("local retention", result) {
            for (path, reason) in &sweep.failures {
                report
                    .warnings
                    .push(format!("could not delete {}: {}", path.display(), reason));
            }
            report.local_sweep = Some(sweep);
        }
        report.advance(PipelinePhase::RetentionSwept);
    }

    /// Package, stage, publish, compress, copy and sweep.
    pub async fn run_full_build(&self, options: &PipelineOptions) -> Result<BuildReport> {
        let layout = self.config.layout();
        let publisher = self.publisher(options);
        let mut report = BuildReport::default();
        report.advance(PipelinePhase::Idle);

        layout
            .reset_staging()
            .map_err(fs_error("preparing", &layout.staging_dir))?;

        let version = self.compute_version(options)?;
        report.version = Some(version);
        report.advance(PipelinePhase::VersionComputed);

        self.packager.build(options.kind).await?;
        report.advance(PipelinePhase::Packaged);

        report.primary_artifact = publisher.rename_primary_artifact(options.kind, &version)?;
        if report.primary_artifact.is_none() {
            report
                .warnings
                .push(format!("primary {} artifact not found after packaging", options.kind));
        }

        let staged = self.stager.stage(options.kind.is_alternate())?;
        log::debug!("Staged {} auxiliary files", staged.files_copied);
        report.advance(PipelinePhase::Staged);

        let published = publisher.publish(&layout.staging_dir, &version)?;
        report.warnings.extend(published.warnings);
        let release_dir = published.path;
        report.release_dir = Some(release_dir.clone());
        report.advance(PipelinePhase::Published);

        if options.compress {
            let archive = publisher.compress(&release_dir, &version)?;
            report.archive = Some(archive);
            report.advance(PipelinePhase::Compressed);
        }

        if options.copy {
            let artifact = report
                .archive
                .as_ref()
                .map(|a| a.path.clone())
                .unwrap_or_else(|| release_dir.clone());

            let destination = self.resolve_destination(options.beta);
            if let Some(destination) = report.best_effort("destination lookup", destination) {
                let copied = self.copy_artifact(&artifact, &destination, options);
                if let Some(copied) = report.best_effort("copy to destination", copied) {
                    self.sweep_remote(&mut report, &destination, &copied, options.beta);
                    report.copied_to = Some(copied);
                    report.advance(PipelinePhase::RemoteCopied);
                }
            }
        }

        self.sweep_local(&mut report);
        report.advance(PipelinePhase::Done);
        Ok(report)
    }

    /// Re-publish the most recent archive without building.
    ///
    /// Unlike a full build, a missing archive or an unreachable destination is
    /// fatal here: there is nothing else for the run to do.
    pub fn run_copy_only(&self, options: &PipelineOptions) -> Result<BuildReport> {
        let publisher = self.publisher(options);
        let mut report = BuildReport::default();
        report.advance(PipelinePhase::Idle);

        let latest = publisher
            .latest_archive()?
            .ok_or_else(|| PublishError::NoPriorBuild {
                release_dir: publisher.release_dir().to_path_buf(),
            })?;
        log::info!("Latest archive: {}", latest.display());

        let destination = self.resolve_destination(options.beta)?;
        let copied = self.copy_artifact(&latest, &destination, options)?;
        self.sweep_remote(&mut report, &destination, &copied, options.beta);
        report.copied_to = Some(copied);
        report.advance(PipelinePhase::RemoteCopied);

        self.sweep_local(&mut report);
        report.advance(PipelinePhase::Done);
        Ok(report)
    }
}
