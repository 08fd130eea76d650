// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of radial distribution function accumulation.

use std::f64::consts::PI;

use ndarray::Array1;

use crate::analysis::geometry::pair_distances;
use crate::analysis::roles::RoleSets;
use crate::config::GofrConfig;
use crate::structures::{atom::Atom, simbox::SimBox};

/// The pair selections a histogram can be accumulated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GofrPairs {
    /// Reactive hydrogen versus water oxygens.
    ProtonWaterOxys,
    /// Carboxyl oxygens versus water oxygens.
    CarboxylWaterOxys,
    /// Reactive hydrogen versus water hydrogens.
    ProtonWaterHs,
    /// Carboxyl oxygens versus water hydrogens.
    CarboxylWaterHs,
    /// The two configured generic atom types.
    TypePair,
}

impl GofrPairs {
    /// Returns `true` for channels whose source selection spans multiple
    /// atoms; their density normalization uses the pair count `|A| * |B|`
    /// instead of `|B|`.
    fn pair_sum(self) -> bool {
        !matches!(
            self,
            GofrPairs::ProtonWaterOxys | GofrPairs::ProtonWaterHs
        )
    }
}

/// Centre of bin `i`. The product is rounded at the 12th decimal place:
/// a decimal bin width must yield decimal centres.
fn bin_centre(i: usize, bin_size: f64) -> f64 {
    let r = (i as f64 + 0.5) * bin_size;
    (r * 1e12).round() / 1e12
}

/// A single radial distribution histogram with uniform bins on `[0, r_max)`.
#[derive(Debug, Clone)]
pub struct GofrChannel {
    name: &'static str,
    pairs: GofrPairs,
    bin_size: f64,
    /// Density-weighted counts; finalization does not consume them.
    counts: Array1<f64>,
    frames: u64,
}

impl GofrChannel {
    fn new(name: &'static str, pairs: GofrPairs, r_max: f64, bin_size: f64) -> Self {
        let n_bins = (r_max / bin_size).round() as usize;

        GofrChannel {
            name,
            pairs,
            bin_size,
            counts: Array1::zeros(n_bins),
            frames: 0,
        }
    }

    /// Get the output column name of the channel.
    #[inline]
    pub fn get_name(&self) -> &'static str {
        self.name
    }

    /// Get the number of frames accumulated into the channel.
    #[inline]
    pub fn get_n_frames(&self) -> u64 {
        self.frames
    }

    /// Accumulate the distances of one frame into the histogram.
    ///
    /// Every sample is weighted by the inverse number density of the frame.
    /// Pair-sum channels use the pair count `|A| * |B|` as the density
    /// source, the remaining channels the size of the source selection `|B|`.
    fn add_frame(&mut self, atoms_a: &[&Atom], atoms_b: &[&Atom], sbox: &SimBox) {
        let n_sources = if self.pairs.pair_sum() {
            atoms_a.len() * atoms_b.len()
        } else {
            atoms_b.len()
        };

        let density = n_sources as f64 / sbox.volume() as f64;
        let weight = 1.0 / density;

        for dist in pair_distances(atoms_a, atoms_b, sbox) {
            let bin = (dist as f64 / self.bin_size).floor() as usize;
            if bin < self.counts.len() {
                self.counts[bin] += weight;
            }
        }

        self.frames += 1;
    }

    /// Normalize the histogram into g(r) sampled at the bin centres.
    ///
    /// Returns `None` if no frame has been accumulated. Does not modify the
    /// channel, so repeated finalization yields identical results.
    pub fn finalize(&self) -> Option<Array1<f64>> {
        if self.frames == 0 {
            return None;
        }

        let dr = self.bin_size;
        let frames = self.frames as f64;

        Some(Array1::from_iter(self.counts.iter().enumerate().map(
            |(i, count)| {
                let r = bin_centre(i, dr);
                count / (r * r * frames * 4.0 * PI * dr)
            },
        )))
    }
}

/// All radial distribution histograms requested by one analysis run.
/// The channels share a common binning.
#[derive(Debug, Clone)]
pub struct GofrSet {
    channels: Vec<GofrChannel>,
    r_max: f64,
    bin_size: f64,
}

impl GofrSet {
    /// Construct the requested channels with empty histograms.
    pub fn new(config: &GofrConfig) -> Self {
        let mut channels = Vec::new();

        if config.ho {
            channels.push(GofrChannel::new(
                "gofr_hsow",
                GofrPairs::ProtonWaterOxys,
                config.r_max,
                config.bin_size,
            ));
        }
        if config.oo {
            channels.push(GofrChannel::new(
                "gofr_osow",
                GofrPairs::CarboxylWaterOxys,
                config.r_max,
                config.bin_size,
            ));
        }
        if config.hh {
            channels.push(GofrChannel::new(
                "gofr_hshw",
                GofrPairs::ProtonWaterHs,
                config.r_max,
                config.bin_size,
            ));
        }
        if config.oh {
            channels.push(GofrChannel::new(
                "gofr_oshw",
                GofrPairs::CarboxylWaterHs,
                config.r_max,
                config.bin_size,
            ));
        }
        if config.type_pair {
            channels.push(GofrChannel::new(
                "gofr_type",
                GofrPairs::TypePair,
                config.r_max,
                config.bin_size,
            ));
        }

        GofrSet {
            channels,
            r_max: config.r_max,
            bin_size: config.bin_size,
        }
    }

    /// Get the shared bin centres of the channels.
    pub fn bin_centres(&self) -> Vec<f64> {
        let n_bins = (self.r_max / self.bin_size).round() as usize;

        (0..n_bins).map(|i| bin_centre(i, self.bin_size)).collect()
    }

    /// Iterate over the channels of the set.
    pub fn channels_iter(&self) -> impl Iterator<Item = &GofrChannel> {
        self.channels.iter()
    }

    /// Accumulate one classified frame into every channel whose selections
    /// are available. A channel whose precondition fails (no reactive
    /// hydrogen, or an empty generic type selection) skips the frame.
    pub fn accumulate(&mut self, roles: &RoleSets, sbox: &SimBox) {
        for channel in self.channels.iter_mut() {
            match channel.pairs {
                GofrPairs::ProtonWaterOxys => {
                    if let Some(proton) = roles.excess_proton {
                        channel.add_frame(&[proton], &roles.water_oxys, sbox);
                    }
                }
                GofrPairs::CarboxylWaterOxys => {
                    channel.add_frame(&roles.carboxyl_oxys, &roles.water_oxys, sbox);
                }
                GofrPairs::ProtonWaterHs => {
                    if let Some(proton) = roles.excess_proton {
                        channel.add_frame(&[proton], &roles.water_hs, sbox);
                    }
                }
                GofrPairs::CarboxylWaterHs => {
                    channel.add_frame(&roles.carboxyl_oxys, &roles.water_hs, sbox);
                }
                GofrPairs::TypePair => {
                    if !roles.type1.is_empty() && !roles.type2.is_empty() {
                        channel.add_frame(&roles.type1, &roles.type2, sbox);
                    }
                }
            }
        }
    }
}
