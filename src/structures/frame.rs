// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Frame structure and its methods.

use crate::structures::{atom::Atom, simbox::SimBox};

/// One snapshot of the simulated system: an integer time step, the simulation
/// box of the frame, and the ordered atom table. Frames are materialized in
/// full by the dump reader before being handed to the classifier and are
/// released before the next frame is parsed.
#[derive(Debug, Clone)]
pub struct Frame {
    timestep: i64,
    simbox: SimBox,
    atoms: Vec<Atom>,
}

impl Frame {
    /// Create a new Frame structure.
    pub fn new(timestep: i64, simbox: SimBox, atoms: Vec<Atom>) -> Self {
        Frame {
            timestep,
            simbox,
            atoms,
        }
    }

    /// Get the time step at which the frame was recorded.
    #[inline]
    pub fn get_timestep(&self) -> i64 {
        self.timestep
    }

    /// Get the simulation box of the frame.
    #[inline]
    pub fn get_box(&self) -> &SimBox {
        &self.simbox
    }

    /// Get the number of atoms in the frame.
    #[inline]
    pub fn get_n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Immutably iterate over the atoms of the frame in the order
    /// in which they appear in the dump file.
    #[inline]
    pub fn atoms_iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }
}
