// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! # evban_rs
//!
//! Streaming analysis of LAMMPS dump trajectories of protonatable amino acid
//! residues. `evban_rs` reads dump files frame by frame, classifies the atoms
//! of each frame into chemical roles, and computes empirical valence bond
//! off-diagonal couplings and radial distribution functions, writing the
//! results into csv tables.
//!
//! All geometry respects periodic boundary conditions of an orthorhombic
//! simulation box using the minimum image convention.
//!
//! ## Usage
//!
//! The `evban` binary takes a single yaml configuration file describing the
//! chemistry of the system, the requested calculations and the input
//! trajectories:
//!
//! ```text
//! evban analysis.yaml
//! ```
//!
//! The library exposes the same functionality through
//! [`AnalysisConfig`](crate::config::AnalysisConfig) and
//! [`run_analysis`](crate::driver::run_analysis).

/// Current version of the crate.
pub const EVBAN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod analysis {
    pub mod evb;
    pub mod geometry;
    pub mod gofr;
    pub mod record;
    pub mod roles;
}
pub mod config;
pub mod driver;
pub mod errors;
pub mod io {
    pub mod csv_io;
    pub mod dump_io;
}
pub mod structures {
    pub mod atom;
    pub mod frame;
    pub mod simbox;
    pub mod vector3d;
}

/// Reexported basic structures and functions of the library.
pub mod prelude {
    pub use crate::analysis::evb::{ProtonContact, WaterHij};
    pub use crate::analysis::gofr::{GofrChannel, GofrSet};
    pub use crate::analysis::record::FrameRecord;
    pub use crate::analysis::roles::{classify_frame, RoleRequirements, RoleSets};
    pub use crate::config::AnalysisConfig;
    pub use crate::driver::{run, run_analysis, ExitCode, RunSummary};
    pub use crate::io::dump_io::DumpReader;
    pub use crate::structures::atom::Atom;
    pub use crate::structures::frame::Frame;
    pub use crate::structures::simbox::SimBox;
    pub use crate::structures::vector3d::Vector3D;
}
