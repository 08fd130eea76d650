// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Atom structure and its methods.

use crate::errors::ParseDumpError;
use crate::structures::vector3d::Vector3D;

/// A single atom record from the `ATOMS` section of a dump frame.
/// Atom records are ephemeral: they only live for the duration of their frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom id; unique within a frame.
    atom_number: usize,
    /// Id of the molecule the atom belongs to.
    molecule_number: usize,
    /// LAMMPS atom type.
    atom_type: usize,
    /// Partial charge of the atom.
    charge: f32,
    position: Vector3D,
}

impl Atom {
    /// Create a new Atom structure with the specified properties.
    pub fn new(
        atom_number: usize,
        molecule_number: usize,
        atom_type: usize,
        charge: f32,
        position: Vector3D,
    ) -> Self {
        Atom {
            atom_number,
            molecule_number,
            atom_type,
            charge,
            position,
        }
    }

    /// Parse an atom from a single line of the `ATOMS` section of a dump file.
    /// The line must contain at least seven whitespace-separated fields:
    /// `id mol type q x y z`. Any additional fields are ignored.
    ///
    /// ## Example
    /// ```
    /// # use evban_rs::structures::atom::Atom;
    /// #
    /// let atom = Atom::from_dump_line("4 1 5 0.435 1.25 3.5 -0.75").unwrap();
    /// assert_eq!(atom.get_atom_number(), 4);
    /// assert_eq!(atom.get_atom_type(), 5);
    /// ```
    pub fn from_dump_line(line: &str) -> Result<Self, ParseDumpError> {
        let mut split = line.split_whitespace();
        let parse_err = || ParseDumpError::MalformedAtomLine(line.trim_end().to_owned());

        let atom_number = split
            .next()
            .and_then(|x| x.parse::<usize>().ok())
            .ok_or_else(parse_err)?;
        let molecule_number = split
            .next()
            .and_then(|x| x.parse::<usize>().ok())
            .ok_or_else(parse_err)?;
        let atom_type = split
            .next()
            .and_then(|x| x.parse::<usize>().ok())
            .ok_or_else(parse_err)?;
        let charge = split
            .next()
            .and_then(|x| x.parse::<f32>().ok())
            .ok_or_else(parse_err)?;

        let mut coordinates = [0.0f32; 3];
        for item in coordinates.iter_mut() {
            *item = split
                .next()
                .and_then(|x| x.parse::<f32>().ok())
                .ok_or_else(parse_err)?;
        }

        Ok(Atom::new(
            atom_number,
            molecule_number,
            atom_type,
            charge,
            Vector3D::from(coordinates),
        ))
    }

    /// Get the id of the atom.
    #[inline]
    pub fn get_atom_number(&self) -> usize {
        self.atom_number
    }

    /// Get the id of the molecule the atom belongs to.
    #[inline]
    pub fn get_molecule_number(&self) -> usize {
        self.molecule_number
    }

    /// Get the LAMMPS type of the atom.
    #[inline]
    pub fn get_atom_type(&self) -> usize {
        self.atom_type
    }

    /// Get the partial charge of the atom.
    #[inline]
    pub fn get_charge(&self) -> f32 {
        self.charge
    }

    /// Get the position of the atom.
    #[inline]
    pub fn get_position(&self) -> &Vector3D {
        &self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn from_dump_line() {
        let atom = Atom::from_dump_line("17 3 4 -0.82 2.5 13.75 -1.0").unwrap();

        assert_eq!(atom.get_atom_number(), 17);
        assert_eq!(atom.get_molecule_number(), 3);
        assert_eq!(atom.get_atom_type(), 4);
        assert_approx_eq!(f32, atom.get_charge(), -0.82);
        assert_approx_eq!(f32, atom.get_position().x, 2.5);
        assert_approx_eq!(f32, atom.get_position().y, 13.75);
        assert_approx_eq!(f32, atom.get_position().z, -1.0);
    }

    #[test]
    fn from_dump_line_extra_fields_ignored() {
        let atom = Atom::from_dump_line("1 1 2 0.0 0.0 0.0 0.0 0.1 0.2 0.3").unwrap();
        assert_eq!(atom.get_atom_number(), 1);
    }

    #[test]
    fn from_dump_line_too_few_fields() {
        match Atom::from_dump_line("1 1 2 0.0 0.0 0.0") {
            Err(ParseDumpError::MalformedAtomLine(line)) => {
                assert_eq!(line, "1 1 2 0.0 0.0 0.0")
            }
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn from_dump_line_nonnumeric() {
        assert!(matches!(
            Atom::from_dump_line("1 1 O -0.8 0.0 0.0 0.0"),
            Err(ParseDumpError::MalformedAtomLine(_))
        ));
    }
}
