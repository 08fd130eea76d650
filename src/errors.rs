// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of errors originating from the `evban_rs` library.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading and parsing a LAMMPS dump file.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseDumpError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` could not be read any further.")]
    LineNotFound(Box<Path>),
    #[error("Malformed dump: expected a section header but found line `{0}`.")]
    MalformedDump(String),
    #[error("Malformed timestep: could not parse line `{0}` as an integer time step.")]
    MalformedTimestep(String),
    #[error("Could not parse line `{0}` as the number of atoms.")]
    MalformedNumAtoms(String),
    #[error("Could not parse line `{0}` as box bounds.")]
    MalformedBoxLine(String),
    #[error("Could not parse line `{0}` as an atom.")]
    MalformedAtomLine(String),
    /// Warning raised when the final frame of a dump file is incomplete.
    /// The offending frame is discarded, not yielded.
    #[error("File `{0}` did not have the full list of atom numbers; its last frame was discarded.")]
    TruncatedFrame(Box<Path>),
}

/// Errors that can occur when classifying the atoms of a frame into chemical roles.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ClassifyError {
    #[error("Expected exactly 2 carboxyl oxygens matching `prot_carboxyl_oxy_atom_nums` but found {0}.")]
    CarboxylOxyCount(usize),
    #[error("Found an excess proton while {0} hydronium atoms are present (expected none).")]
    HydroniumWithProton(usize),
    #[error("Found {0} hydronium atoms but expected exactly 4 (1 oxygen and 3 hydrogens) since no excess proton is present.")]
    HydroniumCount(usize),
    #[error("A requested calculation requires water oxygens but no atom matched `water_o_type`.")]
    NoWaterOxygens,
    #[error("A requested calculation requires water hydrogens but no atom matched `water_h_type`.")]
    NoWaterHydrogens,
}

/// Errors that can occur when loading and validating the analysis configuration.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not parse config file `{0}`: {1}")]
    CouldNotParse(Box<Path>, String),
    #[error("Missing input value for key `{0}`.")]
    MissingKey(&'static str),
    #[error("Invalid value for key `{0}`: {1}")]
    InvalidValue(&'static str, String),
    #[error("No input dump files were specified. Set `dump_file` and/or `dump_list_file`.")]
    NoInput,
}

/// Errors that can occur when writing output CSV files.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum WriteCsvError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into file `{0}`.")]
    CouldNotWrite(Box<Path>),
}

/// Top-level errors returned by the analysis driver.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    ReadDump(#[from] ParseDumpError),
    #[error("{0}")]
    Classify(#[from] ClassifyError),
    #[error("{0}")]
    WriteCsv(#[from] WriteCsvError),
    #[error("No frame in any input file produced a result.")]
    NoResults,
}
