// Artifact writer
//
// Writes rendered artifacts under the output root, skips excluded paths, and
// optionally runs the source formatters over what was written.

use crate::error::{Error, Result};
use crate::generate::Artifact;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Formatter commands run after writing
#[derive(Debug, Clone)]
pub struct Formatters {
    pub clang_format: String,
    pub black: String,
}

impl Default for Formatters {
    fn default() -> Self {
        Self {
            clang_format: "clang-format".to_string(),
            black: "black".to_string(),
        }
    }
}

/// Configuration for the file sink
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output root; artifact paths are relative to it
    pub output_dir: PathBuf,
    /// Glob patterns over artifact paths that are never written
    pub exclude: Vec<String>,
    /// Run formatters over written files
    pub formatters: Option<Formatters>,
    /// Render and count, but touch nothing on disk
    pub dry_run: bool,
    /// Show a progress bar while writing
    pub progress: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            exclude: Vec::new(),
            formatters: None,
            dry_run: false,
            progress: false,
        }
    }
}

/// Writes artifacts to disk
pub struct FileSink {
    config: SinkConfig,
    exclude: Vec<Pattern>,
}

impl FileSink {
    pub fn new(config: SinkConfig) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { config, exclude })
    }

    /// Whether an artifact path matches an exclude pattern
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }

    /// Write every artifact, then format what was written
    pub fn write_all(&self, artifacts: &[Artifact]) -> Result<WriteReport> {
        let mut report = WriteReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        let progress = if self.config.progress && !self.config.dry_run {
            let pb = ProgressBar::new(artifacts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| Error::other(e.to_string()))?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut cpp_files = Vec::new();
        let mut py_files = Vec::new();

        for artifact in artifacts {
            if let Some(ref pb) = progress {
                pb.set_message(artifact.output.display().to_string());
                pb.inc(1);
            }

            if self.is_excluded(&artifact.output) {
                debug!("Excluded {}", artifact.output.display());
                report.excluded += 1;
                continue;
            }

            let path = self.config.output_dir.join(&artifact.output);
            if self.config.dry_run {
                debug!("Would write {}", path.display());
            } else {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &artifact.text)?;
            }
            report.written += 1;

            match path.extension().and_then(|e| e.to_str()) {
                Some("py") => py_files.push(path),
                _ => cpp_files.push(path),
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Writing complete");
        }

        if let (Some(formatters), false) = (&self.config.formatters, self.config.dry_run) {
            report.formatted += run_formatter(&formatters.clang_format, &["-i"], &cpp_files)?;
            report.formatted += run_formatter(&formatters.black, &["-q"], &py_files)?;
        }

        info!("{}", report.summary());
        Ok(report)
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}

/// Run a formatter in place over files, returning how many it touched
fn run_formatter(tool: &str, flags: &[&str], files: &[PathBuf]) -> Result<usize> {
    if files.is_empty() {
        return Ok(0);
    }

    debug!("Running {} over {} files", tool, files.len());
    let output = Command::new(tool)
        .args(flags)
        .args(files)
        .output()
        .map_err(|e| Error::format(tool, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("{} exited with {}", tool, output.status);
        return Err(Error::format(
            tool,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(files.len())
}

/// Report of what was written
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: usize,
    pub excluded: usize,
    pub formatted: usize,
    pub dry_run: bool,
}

impl WriteReport {
    pub fn summary(&self) -> String {
        format!(
            "{} {} artifacts, excluded: {}, formatted: {}",
            if self.dry_run { "Would write" } else { "Wrote" },
            self.written,
            self.excluded,
            self.formatted
        )
    }
}
