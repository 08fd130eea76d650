// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the analysis driver orchestrating the full run.

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use colored::Colorize;
use getset::CopyGetters;

use crate::analysis::gofr::GofrSet;
use crate::analysis::record::{evaluate_frame, field_whitelist, FrameRecord};
use crate::analysis::roles::{classify_frame, RoleRequirements};
use crate::config::{AnalysisConfig, RunConfig};
use crate::errors::{AnalysisError, ConfigError, ParseDumpError};
use crate::io::csv_io::{write_gofr_table, FrameCsvWriter};
use crate::io::dump_io::DumpReader;

/// Process exit codes of the analysis binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// The configuration could not be read or validated.
    BadInput = 1,
    /// An input or output file could not be accessed.
    IoFailure = 2,
    /// The input was readable but chemically or structurally invalid
    /// and no frame produced a result.
    InvalidData = 3,
}

impl ExitCode {
    /// Get the numeric process exit code.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Counters describing the outcome of one analysis run.
#[derive(Debug, Clone, Copy, Default, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct RunSummary {
    /// Frames that passed classification and contributed results.
    frames_analyzed: usize,
    /// Frames rejected by parsing or classification.
    frames_failed: usize,
    /// Input files that were processed to their end.
    files_processed: usize,
    /// Input files abandoned after a bad frame.
    files_aborted: usize,
}

/// Load the configuration from the given file, run the analysis and
/// translate the outcome into a process exit code.
pub fn run(config_path: impl AsRef<Path>) -> ExitCode {
    let config = match AnalysisConfig::from_file(config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            return ExitCode::BadInput;
        }
    };

    match run_analysis(&config) {
        Ok(_) => ExitCode::Success,
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            match error {
                AnalysisError::Config(_) => ExitCode::BadInput,
                AnalysisError::ReadDump(
                    ParseDumpError::FileNotFound(_) | ParseDumpError::LineNotFound(_),
                ) => ExitCode::IoFailure,
                AnalysisError::ReadDump(_) | AnalysisError::Classify(_) => ExitCode::InvalidData,
                AnalysisError::WriteCsv(_) => ExitCode::IoFailure,
                AnalysisError::NoResults => ExitCode::InvalidData,
            }
        }
    }
}

/// Run the full analysis described by the configuration.
///
/// Frames are streamed file by file. A malformed or misclassified frame
/// aborts the current file with a warning and the run continues with the
/// next file; with `skip_bad_frames` only the offending frame is dropped.
/// An unreadable input file aborts the whole run.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunSummary, AnalysisError> {
    let files = resolve_dump_files(&config.run)?;

    let per_frame = config.calc.any_per_frame();
    let requirements = role_requirements(config);
    let fields = field_whitelist(&config.calc, config.chem.carboxyl_carbon_num.is_some());

    let mut gofr = config.gofr.as_ref().map(GofrSet::new);
    let gofr_path = config.run.output_dir.join("gofr.csv");

    let mut combined_writer = if per_frame && config.run.combine_output {
        Some(FrameCsvWriter::create(
            config.run.output_dir.join("analysis_results.csv"),
            fields.clone(),
            true,
        )?)
    } else {
        None
    };

    let mut summary = RunSummary::default();

    for file in &files {
        let mut reader = DumpReader::open(file, config.run.max_timesteps_per_file)?;
        let mut file_writer = if per_frame && !config.run.combine_output {
            Some(FrameCsvWriter::create(
                config.run.output_dir.join(per_file_output_name(file)),
                fields.clone(),
                false,
            )?)
        } else {
            None
        };

        let source_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        let mut buffer: Vec<FrameRecord> = Vec::new();
        let mut since_checkpoint = 0usize;
        let mut aborted = false;

        while let Some(item) = reader.next() {
            let frame = match item {
                Ok(frame) => frame,
                Err(error) => {
                    warn(&format!(
                        "File `{}` could not be fully parsed ({}); skipping the rest of the file.",
                        file.display(),
                        error
                    ));
                    summary.frames_failed += 1;
                    aborted = true;
                    break;
                }
            };

            let roles = match classify_frame(&frame, &config.chem, requirements) {
                Ok(roles) => roles,
                Err(error) => {
                    summary.frames_failed += 1;
                    if config.run.skip_bad_frames {
                        warn(&format!(
                            "Skipping timestep {} of file `{}`: {}",
                            frame.get_timestep(),
                            file.display(),
                            error
                        ));
                        continue;
                    }

                    warn(&format!(
                        "Timestep {} of file `{}` could not be classified ({}); skipping the rest of the file.",
                        frame.get_timestep(),
                        file.display(),
                        error
                    ));
                    aborted = true;
                    break;
                }
            };

            if per_frame {
                let mut record =
                    evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);
                if let Some(ref name) = source_name {
                    record.set_source(name.clone());
                }
                buffer.push(record);
            }

            if let Some(set) = gofr.as_mut() {
                set.accumulate(&roles, frame.get_box());
            }

            summary.frames_analyzed += 1;
            since_checkpoint += 1;

            if since_checkpoint >= config.run.print_every {
                if let Some(writer) = file_writer.as_mut().or(combined_writer.as_mut()) {
                    writer.write_records(&buffer)?;
                }
                buffer.clear();
                since_checkpoint = 0;

                if let Some(set) = gofr.as_ref() {
                    write_gofr_table(&gofr_path, set)?;
                }
            }
        }

        if let Some(writer) = file_writer.as_mut().or(combined_writer.as_mut()) {
            writer.write_records(&buffer)?;
        }

        if reader.was_truncated() {
            warn(&ParseDumpError::TruncatedFrame(Box::from(file.as_path())).to_string());
        }

        if reader.hit_frame_cap() {
            eprintln!(
                "Stopped reading `{}` after {} frames as requested.",
                file.display(),
                reader.get_n_frames_read()
            );
        }

        if aborted {
            summary.files_aborted += 1;
        } else {
            summary.files_processed += 1;
        }
    }

    if summary.frames_analyzed == 0 && summary.frames_failed > 0 {
        return Err(AnalysisError::NoResults);
    }

    if let Some(set) = gofr.as_ref() {
        for name in write_gofr_table(&gofr_path, set)? {
            warn(&format!(
                "No frame contributed to `{}`; the column was left out of the g(r) table.",
                name
            ));
        }
    }

    Ok(summary)
}

/// Derive the classifier requirements of the run. Any water-involving
/// coupling or water g(r) channel makes both water sets mandatory;
/// the generic type-pair channel requires neither.
fn role_requirements(config: &AnalysisConfig) -> RoleRequirements {
    let needs_water = config.calc.needs_water_oxys()
        || config
            .gofr
            .as_ref()
            .is_some_and(|x| x.ho || x.oo || x.hh || x.oh);

    RoleRequirements {
        water_oxys: needs_water,
        water_hs: needs_water,
    }
}

/// Collect the input dump files from `dump_file` and the lines of
/// `dump_list_file`, in that order.
fn resolve_dump_files(run: &RunConfig) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = Vec::new();

    if let Some(ref file) = run.dump_file {
        files.push(file.clone());
    }

    if let Some(ref list) = run.dump_list_file {
        let content = read_to_string(list)
            .map_err(|_| ParseDumpError::FileNotFound(Box::from(list.as_path())))?;

        for line in content.lines() {
            let line = line.trim();
            if !line.is_empty() {
                files.push(PathBuf::from(line));
            }
        }
    }

    if files.is_empty() {
        return Err(AnalysisError::Config(ConfigError::NoInput));
    }

    Ok(files)
}

fn per_file_output_name(file: &Path) -> String {
    match file.file_stem() {
        Some(stem) => format!("{}_results.csv", stem.to_string_lossy()),
        None => String::from("dump_results.csv"),
    }
}

fn warn(message: &str) {
    eprintln!("{}", format!("warning: {}", message).yellow());
}
