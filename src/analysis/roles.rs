// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the classification of frame atoms into chemical roles.

use crate::config::ChemSelectors;
use crate::errors::ClassifyError;
use crate::structures::{atom::Atom, frame::Frame};

/// Which optional role sets must be non-empty for the requested calculations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleRequirements {
    pub water_oxys: bool,
    pub water_hs: bool,
}

/// Atoms of a single frame partitioned into chemical roles.
/// All references borrow from the frame being classified.
#[derive(Debug)]
pub struct RoleSets<'a> {
    /// The two carboxyl oxygens of the protonatable residue.
    pub carboxyl_oxys: [&'a Atom; 2],
    /// The carboxyl carbon, when configured and present.
    pub carboxyl_carbon: Option<&'a Atom>,
    /// The excess proton bound to the residue, when the residue is protonated.
    pub excess_proton: Option<&'a Atom>,
    /// The hydronium oxygen, when a hydronium is present.
    pub hydronium_o: Option<&'a Atom>,
    /// The hydronium hydrogens; empty or exactly three.
    pub hydronium_hs: Vec<&'a Atom>,
    pub water_oxys: Vec<&'a Atom>,
    pub water_hs: Vec<&'a Atom>,
    /// Atoms of the first generic-pair g(r) type.
    pub type1: Vec<&'a Atom>,
    /// Atoms of the second generic-pair g(r) type.
    pub type2: Vec<&'a Atom>,
}

impl<'a> RoleSets<'a> {
    /// Returns `true` if the protonatable residue carries the excess proton.
    #[inline]
    pub fn is_protonated(&self) -> bool {
        self.excess_proton.is_some()
    }
}

/// Partition the atom table of a frame into role sets in a single pass and
/// enforce the per-frame cardinality invariants.
///
/// Exactly one of "excess proton present" and "hydronium of size 4 present"
/// must hold; the hydronium and water sets are disjoint by construction since
/// they are selected by distinct atom types.
pub fn classify_frame<'a>(
    frame: &'a Frame,
    chem: &ChemSelectors,
    requirements: RoleRequirements,
) -> Result<RoleSets<'a>, ClassifyError> {
    let mut carboxyl_oxys = Vec::with_capacity(2);
    let mut carboxyl_carbon = None;
    let mut excess_proton: Option<&Atom> = None;
    let mut hydronium_os = Vec::new();
    let mut hydronium_hs = Vec::new();
    let mut water_oxys = Vec::new();
    let mut water_hs = Vec::new();
    let mut type1 = Vec::new();
    let mut type2 = Vec::new();

    for atom in frame.atoms_iter() {
        let id = atom.get_atom_number();

        if atom.get_molecule_number() == chem.prot_res_mol_num {
            if chem.carboxyl_oxy_nums.contains(&id) {
                carboxyl_oxys.push(atom);
            } else if atom.get_atom_type() == chem.prot_h_type
                && !chem.prot_h_ignore_nums.contains(&id)
                && excess_proton.is_none()
            {
                excess_proton = Some(atom);
            }
        }

        if chem.carboxyl_carbon_num == Some(id) {
            carboxyl_carbon = Some(atom);
        }

        let atom_type = atom.get_atom_type();
        if atom_type == chem.hydronium_o_type {
            hydronium_os.push(atom);
        } else if atom_type == chem.hydronium_h_type {
            hydronium_hs.push(atom);
        } else if atom_type == chem.water_o_type {
            water_oxys.push(atom);
        } else if atom_type == chem.water_h_type {
            water_hs.push(atom);
        }

        if let Some((t1, t2)) = chem.gofr_types {
            if atom_type == t1 {
                type1.push(atom);
            }
            if atom_type == t2 {
                type2.push(atom);
            }
        }
    }

    if carboxyl_oxys.len() != 2 {
        return Err(ClassifyError::CarboxylOxyCount(carboxyl_oxys.len()));
    }

    let n_hydronium = hydronium_os.len() + hydronium_hs.len();
    match excess_proton {
        Some(_) if n_hydronium != 0 => {
            return Err(ClassifyError::HydroniumWithProton(n_hydronium))
        }
        None if hydronium_os.len() != 1 || hydronium_hs.len() != 3 => {
            return Err(ClassifyError::HydroniumCount(n_hydronium))
        }
        _ => (),
    }

    if requirements.water_oxys && water_oxys.is_empty() {
        return Err(ClassifyError::NoWaterOxygens);
    }
    if requirements.water_hs && water_hs.is_empty() {
        return Err(ClassifyError::NoWaterHydrogens);
    }

    Ok(RoleSets {
        carboxyl_oxys: [carboxyl_oxys[0], carboxyl_oxys[1]],
        carboxyl_carbon,
        excess_proton,
        hydronium_o: hydronium_os.first().copied(),
        hydronium_hs,
        water_oxys,
        water_hs,
        type1,
        type2,
    })
}
