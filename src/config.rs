// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of loading and validation of the analysis configuration.

use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use serde::Deserialize;

use crate::errors::ConfigError;

/// Raw option bag deserialized from the configuration file.
/// Only the enumerated keys are recognized; unknown keys are rejected.
/// Validation into [`AnalysisConfig`] happens exactly once, before any
/// input file is touched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawConfig {
    // chemical selectors
    prot_res_mol_num: Option<usize>,
    prot_carboxyl_oxy_atom_nums: Option<Vec<usize>>,
    prot_carboxyl_carbon_atom_num: Option<usize>,
    prot_h_ignore_atom_nums: Vec<usize>,
    prot_h_type: Option<usize>,
    water_o_type: Option<usize>,
    water_h_type: Option<usize>,
    hydronium_o_type: Option<usize>,
    hydronium_h_type: Option<usize>,
    gofr_type1: Option<usize>,
    gofr_type2: Option<usize>,

    // g(r) switches
    calc_ho_gofr: bool,
    calc_oo_gofr: bool,
    calc_hh_gofr: bool,
    calc_oh_gofr: bool,
    calc_type_gofr: bool,
    gofr_r_max: Option<f64>,
    gofr_bin_size: Option<f64>,

    // per-frame calculation flags
    calc_oh_dist: bool,
    calc_hij_da_gauss: bool,
    calc_hij_water_form: bool,
    print_water_terms: bool,
    calc_hij_arq: bool,
    calc_hij_hyd_wat: bool,

    // parameters of the "new" HIJ form; providing any of them activates
    // the calculation and makes all seven of them required
    hij_new_vij: Option<f32>,
    hij_new_gamma: Option<f32>,
    hij_new_alpha: Option<f32>,
    hij_new_a_da: Option<f32>,
    hij_new_r0_sc: Option<f32>,
    hij_new_r0_da: Option<f32>,
    hij_new_lambda: Option<f32>,

    // driver options
    dump_file: Option<PathBuf>,
    dump_list_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    max_timesteps_per_file: Option<usize>,
    print_every: Option<usize>,
    combine_output: bool,
    skip_bad_frames: bool,
}

/// Chemical selectors identifying the roles of atoms in each frame.
#[derive(Debug, Clone)]
pub struct ChemSelectors {
    /// Molecule id of the protonatable residue.
    pub prot_res_mol_num: usize,
    /// Atom ids of the two carboxyl oxygens of the residue.
    pub carboxyl_oxy_nums: HashSet<usize>,
    /// Atom id of the carboxyl carbon, if configured.
    pub carboxyl_carbon_num: Option<usize>,
    /// Reactive-hydrogen atom ids that must never be classified as the excess proton.
    pub prot_h_ignore_nums: HashSet<usize>,
    /// Atom type of the reactive hydrogen.
    pub prot_h_type: usize,
    /// Atom type of water oxygens.
    pub water_o_type: usize,
    /// Atom type of water hydrogens.
    pub water_h_type: usize,
    /// Atom type of the hydronium oxygen.
    pub hydronium_o_type: usize,
    /// Atom type of hydronium hydrogens.
    pub hydronium_h_type: usize,
    /// The two atom types of the generic-pair g(r) channel, if configured.
    pub gofr_types: Option<(usize, usize)>,
}

/// Validated parameters of the parametric "new" HIJ form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewHijParams {
    pub vij: f32,
    pub gamma: f32,
    pub alpha: f32,
    pub a_da: f32,
    pub r0_sc: f32,
    pub r0_da: f32,
    pub lambda: f32,
}

/// Per-frame calculation switches.
#[derive(Debug, Clone, Default)]
pub struct CalcFlags {
    pub oh_dist: bool,
    pub hij_da_gauss: bool,
    pub hij_water_form: bool,
    pub print_water_terms: bool,
    pub hij_arq: bool,
    pub hij_new: Option<NewHijParams>,
    pub hij_hyd_wat: bool,
}

impl CalcFlags {
    /// Returns `true` if any per-frame output is requested.
    pub fn any_per_frame(&self) -> bool {
        self.oh_dist
            || self.hij_da_gauss
            || self.hij_water_form
            || self.hij_arq
            || self.hij_new.is_some()
            || self.hij_hyd_wat
    }

    /// Returns `true` if any requested per-frame quantity involves water oxygens.
    pub fn needs_water_oxys(&self) -> bool {
        self.hij_water_form || self.hij_arq || self.hij_new.is_some() || self.hij_hyd_wat
    }
}

/// Validated g(r) accumulation options. Present only if at least one channel is enabled.
#[derive(Debug, Clone)]
pub struct GofrConfig {
    pub ho: bool,
    pub oo: bool,
    pub hh: bool,
    pub oh: bool,
    pub type_pair: bool,
    /// Cutoff distance of the histograms.
    pub r_max: f64,
    /// Uniform bin width of the histograms.
    pub bin_size: f64,
}

/// Validated driver options.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Dump files to process, in order.
    pub dump_file: Option<PathBuf>,
    /// File listing further dump files, one per line.
    pub dump_list_file: Option<PathBuf>,
    /// Directory into which all output files are written.
    pub output_dir: PathBuf,
    /// Upper bound on the number of frames read from each dump file.
    pub max_timesteps_per_file: Option<usize>,
    /// Checkpoint frequency in frames.
    pub print_every: usize,
    /// Write the per-frame results of all input files into a single CSV.
    pub combine_output: bool,
    /// Downgrade per-frame invariant violations to warn-and-skip
    /// instead of aborting the current file.
    pub skip_bad_frames: bool,
}

/// Immutable, validated configuration of a single analysis run.
///
/// ## Example
/// ```
/// # use evban_rs::config::AnalysisConfig;
/// #
/// let yaml = "
/// prot_res_mol_num: 1
/// prot_carboxyl_oxy_atom_nums: [2, 3]
/// prot_h_type: 5
/// water_o_type: 3
/// water_h_type: 4
/// hydronium_o_type: 6
/// hydronium_h_type: 7
/// calc_oh_dist: true
/// dump_file: trajectory.dump
/// ";
///
/// let config = AnalysisConfig::from_yaml(yaml).unwrap();
/// assert!(config.calc.oh_dist);
/// assert_eq!(config.run.print_every, 100);
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub chem: ChemSelectors,
    pub calc: CalcFlags,
    pub gofr: Option<GofrConfig>,
    pub run: RunConfig,
}

/// Default checkpoint frequency in frames.
const DEFAULT_PRINT_EVERY: usize = 100;

fn require<T>(value: Option<T>, key: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingKey(key))
}

impl AnalysisConfig {
    /// Load and validate the configuration from a YAML file.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&filename)
            .map_err(|_| ConfigError::FileNotFound(Box::from(filename.as_ref())))?;

        serde_yaml::from_str::<RawConfig>(&content)
            .map_err(|e| ConfigError::CouldNotParse(Box::from(filename.as_ref()), e.to_string()))
            .and_then(RawConfig::validate)
    }

    /// Parse and validate the configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<RawConfig>(content)
            .map_err(|e| {
                ConfigError::CouldNotParse(Box::from(Path::new("<string>")), e.to_string())
            })
            .and_then(RawConfig::validate)
    }
}

impl RawConfig {
    /// Validate the raw option bag into an `AnalysisConfig`.
    fn validate(self) -> Result<AnalysisConfig, ConfigError> {
        let oxy_nums = require(
            self.prot_carboxyl_oxy_atom_nums,
            "prot_carboxyl_oxy_atom_nums",
        )?;
        let carboxyl_oxy_nums: HashSet<usize> = oxy_nums.iter().copied().collect();
        if carboxyl_oxy_nums.len() != 2 {
            return Err(ConfigError::InvalidValue(
                "prot_carboxyl_oxy_atom_nums",
                format!("expected exactly two distinct atom ids, got {:?}", oxy_nums),
            ));
        }

        let chem = ChemSelectors {
            prot_res_mol_num: require(self.prot_res_mol_num, "prot_res_mol_num")?,
            carboxyl_oxy_nums,
            carboxyl_carbon_num: self.prot_carboxyl_carbon_atom_num,
            prot_h_ignore_nums: self.prot_h_ignore_atom_nums.into_iter().collect(),
            prot_h_type: require(self.prot_h_type, "prot_h_type")?,
            water_o_type: require(self.water_o_type, "water_o_type")?,
            water_h_type: require(self.water_h_type, "water_h_type")?,
            hydronium_o_type: require(self.hydronium_o_type, "hydronium_o_type")?,
            hydronium_h_type: require(self.hydronium_h_type, "hydronium_h_type")?,
            gofr_types: match (self.gofr_type1, self.gofr_type2) {
                (Some(t1), Some(t2)) => Some((t1, t2)),
                (None, None) => None,
                (None, Some(_)) => return Err(ConfigError::MissingKey("gofr_type1")),
                (Some(_), None) => return Err(ConfigError::MissingKey("gofr_type2")),
            },
        };

        let calc = CalcFlags {
            oh_dist: self.calc_oh_dist,
            hij_da_gauss: self.calc_hij_da_gauss,
            hij_water_form: self.calc_hij_water_form,
            print_water_terms: self.print_water_terms,
            hij_arq: self.calc_hij_arq,
            hij_new: Self::validate_new_hij(
                self.hij_new_vij,
                self.hij_new_gamma,
                self.hij_new_alpha,
                self.hij_new_a_da,
                self.hij_new_r0_sc,
                self.hij_new_r0_da,
                self.hij_new_lambda,
            )?,
            hij_hyd_wat: self.calc_hij_hyd_wat,
        };

        let any_gofr = self.calc_ho_gofr
            || self.calc_oo_gofr
            || self.calc_hh_gofr
            || self.calc_oh_gofr
            || self.calc_type_gofr;

        let gofr = if any_gofr {
            let r_max = require(self.gofr_r_max, "gofr_r_max")?;
            let bin_size = require(self.gofr_bin_size, "gofr_bin_size")?;

            if r_max <= 0.0 || bin_size <= 0.0 || bin_size > r_max {
                return Err(ConfigError::InvalidValue(
                    "gofr_bin_size",
                    format!(
                        "bin size {} and cutoff {} must be positive with bin size <= cutoff",
                        bin_size, r_max
                    ),
                ));
            }

            if self.calc_type_gofr && chem.gofr_types.is_none() {
                return Err(ConfigError::MissingKey("gofr_type1"));
            }

            Some(GofrConfig {
                ho: self.calc_ho_gofr,
                oo: self.calc_oo_gofr,
                hh: self.calc_hh_gofr,
                oh: self.calc_oh_gofr,
                type_pair: self.calc_type_gofr,
                r_max,
                bin_size,
            })
        } else {
            None
        };

        if self.dump_file.is_none() && self.dump_list_file.is_none() {
            return Err(ConfigError::NoInput);
        }

        let print_every = self.print_every.unwrap_or(DEFAULT_PRINT_EVERY);
        if print_every == 0 {
            return Err(ConfigError::InvalidValue(
                "print_every",
                "checkpoint frequency must be at least 1".to_owned(),
            ));
        }

        let run = RunConfig {
            dump_file: self.dump_file,
            dump_list_file: self.dump_list_file,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            max_timesteps_per_file: self.max_timesteps_per_file,
            print_every,
            combine_output: self.combine_output,
            skip_bad_frames: self.skip_bad_frames,
        };

        Ok(AnalysisConfig {
            chem,
            calc,
            gofr,
            run,
        })
    }

    /// Apply the any-implies-all rule to the seven "new" HIJ parameters.
    #[allow(clippy::too_many_arguments)]
    fn validate_new_hij(
        vij: Option<f32>,
        gamma: Option<f32>,
        alpha: Option<f32>,
        a_da: Option<f32>,
        r0_sc: Option<f32>,
        r0_da: Option<f32>,
        lambda: Option<f32>,
    ) -> Result<Option<NewHijParams>, ConfigError> {
        let keys: [(&'static str, Option<f32>); 7] = [
            ("hij_new_vij", vij),
            ("hij_new_gamma", gamma),
            ("hij_new_alpha", alpha),
            ("hij_new_a_da", a_da),
            ("hij_new_r0_sc", r0_sc),
            ("hij_new_r0_da", r0_da),
            ("hij_new_lambda", lambda),
        ];

        if keys.iter().all(|(_, v)| v.is_none()) {
            return Ok(None);
        }

        for (key, value) in &keys {
            if value.is_none() {
                return Err(ConfigError::MissingKey(key));
            }
        }

        Ok(Some(NewHijParams {
            vij: vij.unwrap(),
            gamma: gamma.unwrap(),
            alpha: alpha.unwrap(),
            a_da: a_da.unwrap(),
            r0_sc: r0_sc.unwrap(),
            r0_da: r0_da.unwrap(),
            lambda: lambda.unwrap(),
        }))
    }
}
