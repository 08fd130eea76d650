// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of pairwise distance enumeration between atom sets.

use crate::structures::{atom::Atom, simbox::SimBox};

/// Calculate the minimum image distances between all pairs of atoms drawn
/// from two sets. Returns `|atoms_a| * |atoms_b|` distances in row-major
/// order, i.e. all distances from the first atom of `atoms_a` come first.
pub fn pair_distances(atoms_a: &[&Atom], atoms_b: &[&Atom], sbox: &SimBox) -> Vec<f32> {
    let mut distances = Vec::with_capacity(atoms_a.len() * atoms_b.len());

    for a in atoms_a {
        let pos_a = a.get_position();
        for b in atoms_b {
            distances.push(pos_a.distance(b.get_position(), sbox));
        }
    }

    distances
}
