// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the EVB off-diagonal calculators and their shared subroutines.

use getset::CopyGetters;

use crate::analysis::roles::RoleSets;
use crate::config::NewHijParams;
use crate::structures::{atom::Atom, simbox::SimBox, vector3d::Vector3D};

/// Fixed EVB parameters reproduced from the cited literature.
/// These values are part of the implementation contract.
pub mod params {
    // MS-EVB3 water-water coupling (Wu et al., J. Phys. Chem. B 2008).
    /// Constant coupling prefactor (kcal/mol).
    pub const VIJ_WATER: f32 = -23.187_187;
    /// Empirical scale applied on top of the prefactor.
    pub const WATER_SCALE: f32 = 1.1;
    /// Exponent of the q² Gaussian (1/Å²).
    pub const GAMMA_WATER: f32 = 1.830_289_5;
    pub const P_WATER: f32 = 0.232_726;
    /// Width of the O-O Gaussian (1/Å²).
    pub const K_WATER: f32 = 9.562_153;
    /// Centre of the O-O Gaussian (Å).
    pub const D_OO_WATER: f32 = 2.94;
    /// Steepness of the O-O switching function (1/Å).
    pub const BETA_WATER: f32 = 6.017_906_6;
    /// Centre of the O-O switching function (Å).
    pub const R0_OO_WATER: f32 = 3.1;
    pub const P_PRIME_WATER: f32 = 10.883_132_7;
    /// Decay of the repulsive exponential tail (1/Å).
    pub const A_WATER: f32 = 10.038_092_2;
    /// Offset of the repulsive exponential tail (Å).
    pub const R0_EXP_WATER: f32 = 1.813_642_6;

    // Protonatable amino acid couplings (Maupin et al., J. Phys. Chem. A 2006).
    /// GLU donor-acceptor Gaussian: prefactor (kcal/mol), width (1/Å²), centre (Å).
    pub const C1_GLU: f32 = -24.082_7;
    pub const C2_GLU: f32 = 4.772_3;
    pub const C3_GLU: f32 = 1.237_4;
    /// ASP donor-acceptor Gaussian: prefactor (kcal/mol), width (1/Å²), centre (Å).
    pub const C1_ASP: f32 = -23.893_5;
    pub const C2_ASP: f32 = 4.681_4;
    pub const C3_ASP: f32 = 1.247_2;

    // Asymmetric ("arq") amino acid coupling (Maupin et al., J. Phys. Chem. A 2006).
    /// Constant coupling prefactor (kcal/mol).
    pub const VIJ_ARQ: f32 = -20.175_5;
    /// Exponent of the q² Gaussian (1/Å²).
    pub const GAMMA_ARQ: f32 = 2.782_0;
    /// Mixing weight of the two donor-acceptor Gaussians.
    pub const C_ARQ: f32 = 0.201_9;
    pub const ALPHA_ARQ: f32 = 2.858_0;
    pub const A_DA_ARQ: f32 = 2.562_0;
    pub const BETA_ARQ: f32 = 0.977_0;
    pub const B_DA_ARQ: f32 = 2.875_0;
    /// Steepness and centre of the tanh switching term (1/Å, Å).
    pub const EPS_ARQ: f32 = 2.339_0;
    pub const C_DA_ARQ: f32 = 2.468_0;
    /// Geometry of the asymmetric q² term.
    pub const R0_SC_ARQ: f32 = 1.0;
    pub const R0_DA_ARQ: f32 = 2.94;
    pub const LAMBDA_ARQ: f32 = 0.002_5;

    // Weights of the carboxyl centre-of-mass estimate. These are the mass
    // fractions 12.011/44.009 and 15.999/44.009 and intentionally do not
    // sum to 1 over the three atoms; a carboxyl group broken across the
    // periodic boundary is not reassembled before the estimate.
    pub const COM_WEIGHT_C: f32 = 0.272_911_53;
    pub const COM_WEIGHT_O: f32 = 0.363_544_235;
}

/// The reactive hydrogen/carboxyl oxygen contact of one frame.
/// Constructed by [`closest_excess_proton`].
#[derive(Debug, Clone, CopyGetters)]
pub struct ProtonContact<'a> {
    h_star: &'a Atom,
    o_star: &'a Atom,
    /// Shortest reactive H-carboxyl O distance of the frame (Å).
    #[getset(get_copy = "pub")]
    oh_min: f32,
    /// Distance from the other carboxyl oxygen to the same reactive H (Å).
    #[getset(get_copy = "pub")]
    oh_max: f32,
    /// Distance from the reactive H to the carboxyl centre-of-mass estimate;
    /// `None` when no carboxyl carbon is available.
    #[getset(get_copy = "pub")]
    com_h_dist: Option<f32>,
}

impl<'a> ProtonContact<'a> {
    /// Get the reactive hydrogen closest to the carboxyl group.
    #[inline]
    pub fn h_star(&self) -> &'a Atom {
        self.h_star
    }

    /// Get the carboxyl oxygen closest to the reactive hydrogen.
    #[inline]
    pub fn o_star(&self) -> &'a Atom {
        self.o_star
    }

    /// Get `oh_max - oh_min`; non-negative by construction.
    #[inline]
    pub fn oh_diff(&self) -> f32 {
        self.oh_max - self.oh_min
    }
}

/// Find the reactive hydrogen closest to the carboxyl group of the
/// protonatable residue and the associated distances.
///
/// When the residue is protonated, the excess proton is the only candidate;
/// otherwise every hydronium hydrogen is a candidate and the closest one per
/// carboxyl oxygen is retained. Returns `None` if there is no candidate at all.
pub fn closest_excess_proton<'a>(
    roles: &RoleSets<'a>,
    sbox: &SimBox,
) -> Option<ProtonContact<'a>> {
    let candidates: &[&Atom] = match roles.excess_proton {
        Some(ref proton) => std::slice::from_ref(proton),
        None => &roles.hydronium_hs,
    };

    let mut best: Option<(usize, &'a Atom, f32)> = None;
    for (i, oxy) in roles.carboxyl_oxys.iter().enumerate() {
        for &h in candidates {
            let dist = oxy.get_position().distance(h.get_position(), sbox);
            if best.map_or(true, |(_, _, d)| dist < d) {
                best = Some((i, h, dist));
            }
        }
    }

    let (oxy_index, h_star, oh_min) = best?;
    let o_star = roles.carboxyl_oxys[oxy_index];
    let other_oxy = roles.carboxyl_oxys[1 - oxy_index];
    let oh_max = other_oxy
        .get_position()
        .distance(h_star.get_position(), sbox);

    let com_h_dist = roles.carboxyl_carbon.map(|carbon| {
        let com = *carbon.get_position() * params::COM_WEIGHT_C
            + (*roles.carboxyl_oxys[0].get_position() + *roles.carboxyl_oxys[1].get_position())
                * params::COM_WEIGHT_O;
        h_star.get_position().distance(&com, sbox)
    });

    Some(ProtonContact {
        h_star,
        o_star,
        oh_min,
        oh_max,
        com_h_dist,
    })
}

/// Find the acceptor oxygen for the EVB couplings: the hydronium oxygen when
/// a hydronium exists, otherwise the water oxygen closest to `o_star`.
/// Returns `None` when there is neither.
pub fn closest_water_oxygen<'a>(
    roles: &RoleSets<'a>,
    o_star: &Atom,
    sbox: &SimBox,
) -> Option<&'a Atom> {
    if let Some(hydronium_o) = roles.hydronium_o {
        return Some(hydronium_o);
    }

    roles
        .water_oxys
        .iter()
        .map(|oxy| {
            (
                *oxy,
                o_star.get_position().distance(oxy.get_position(), sbox),
            )
        })
        .min_by(|(_, d1), (_, d2)| {
            d1.partial_cmp(d2)
                .expect("FATAL EVBAN ERROR | closest_water_oxygen | Distance should not be NaN.")
        })
        .map(|(oxy, _)| oxy)
}

/// Calculate the symmetric three-body q² term: the squared length of the
/// minimum image vector from the donor-acceptor midpoint to the reactive H.
#[inline]
pub fn q_squared(
    o_donor: &Vector3D,
    o_acceptor: &Vector3D,
    h: &Vector3D,
    sbox: &SimBox,
) -> f32 {
    let midpoint = o_donor.min_image_midpoint(o_acceptor, sbox);
    let q = h.min_image_diff(&midpoint, sbox);
    q.dot(&q)
}

/// Calculate the asymmetric ("arq") three-body q² term.
///
/// The midpoint fraction is rescaled by the donor-acceptor distance:
/// `r_sc = r0_sc - lambda * (d - r0_da)`. Returns `(q², d)` so that callers
/// evaluating a coupling do not compute the donor-acceptor distance twice.
pub fn q_squared_arq(
    o_donor: &Vector3D,
    o_acceptor: &Vector3D,
    h: &Vector3D,
    sbox: &SimBox,
    r0_sc: f32,
    r0_da: f32,
    lambda: f32,
) -> (f32, f32) {
    let d = o_donor.distance(o_acceptor, sbox);
    let r_sc = r0_sc - lambda * (d - r0_da);

    let q = h.min_image_diff(o_donor, sbox)
        - o_acceptor.min_image_diff(o_donor, sbox) * (r_sc / 2.0);

    (q.dot(&q), d)
}

/// Evaluate the GLU and ASP donor-acceptor Gaussian couplings
/// `c1 * exp(-c2 * (r_oh - c3)²)` for the given O-H distance.
/// Returns `(hij_glu, hij_asp)`.
#[inline]
pub fn hij_amino(r_oh: f32) -> (f32, f32) {
    let glu = params::C1_GLU * (-params::C2_GLU * (r_oh - params::C3_GLU).powi(2)).exp();
    let asp = params::C1_ASP * (-params::C2_ASP * (r_oh - params::C3_ASP).powi(2)).exp();
    (glu, asp)
}

/// The MS-EVB3 water-form coupling and its three factors.
#[derive(Debug, Clone, Copy, CopyGetters)]
pub struct WaterHij {
    /// q² Gaussian factor.
    #[getset(get_copy = "pub")]
    a1: f32,
    /// O-O Gaussian enhancement factor.
    #[getset(get_copy = "pub")]
    a2: f32,
    /// O-O switching factor with exponential tail.
    #[getset(get_copy = "pub")]
    a3: f32,
    /// The full coupling (kcal/mol); non-positive.
    #[getset(get_copy = "pub")]
    hij: f32,
}

/// Evaluate the MS-EVB3 water-form coupling for the given q² and O-O distance.
pub fn hij_water(q2: f32, r_oo: f32) -> WaterHij {
    let a1 = (-params::GAMMA_WATER * q2).exp();
    let a2 = 1.0 + params::P_WATER * (-params::K_WATER * (r_oo - params::D_OO_WATER).powi(2)).exp();
    let a3 = 0.5 * (1.0 - (params::BETA_WATER * (r_oo - params::R0_OO_WATER)).tanh())
        + params::P_PRIME_WATER * (-params::A_WATER * (r_oo - params::R0_EXP_WATER)).exp();

    WaterHij {
        a1,
        a2,
        a3,
        hij: params::VIJ_WATER * params::WATER_SCALE * a1 * a2 * a3,
    }
}

/// Evaluate the asymmetric ("arq") amino acid coupling for the given q²
/// and donor-acceptor distance.
pub fn hij_arq(q2: f32, d: f32) -> f32 {
    let gaussians = params::C_ARQ * (-params::ALPHA_ARQ * (d - params::A_DA_ARQ).powi(2)).exp()
        + (1.0 - params::C_ARQ) * (-params::BETA_ARQ * (d - params::B_DA_ARQ).powi(2)).exp();
    let switching = 1.0 + (params::EPS_ARQ * (d - params::C_DA_ARQ)).tanh();

    params::VIJ_ARQ * (-params::GAMMA_ARQ * q2).exp() * gaussians * switching
}

/// The parametric "new" coupling together with its two factors.
#[derive(Debug, Clone, Copy, CopyGetters)]
pub struct NewHij {
    /// g(q²) = exp(-gamma * q²).
    #[getset(get_copy = "pub")]
    g_of_q: f32,
    /// f(d) = exp(-alpha * (d - a_da)²).
    #[getset(get_copy = "pub")]
    f_roo: f32,
    /// The full coupling `vij * g(q²) * f(d)`.
    #[getset(get_copy = "pub")]
    hij: f32,
}

/// Evaluate the parametric "new" coupling with user-provided parameters
/// for the given q² and donor-acceptor distance.
pub fn hij_new(parameters: &NewHijParams, q2: f32, d: f32) -> NewHij {
    let g_of_q = (-parameters.gamma * q2).exp();
    let f_roo = (-parameters.alpha * (d - parameters.a_da).powi(2)).exp();

    NewHij {
        g_of_q,
        f_roo,
        hij: parameters.vij * g_of_q * f_roo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::roles::{classify_frame, RoleRequirements};
    use crate::config::AnalysisConfig;
    use crate::io::dump_io::DumpReader;
    use crate::structures::frame::Frame;
    use float_cmp::assert_approx_eq;

    fn test_config() -> AnalysisConfig {
        AnalysisConfig::from_yaml(
            "
prot_res_mol_num: 1
prot_carboxyl_oxy_atom_nums: [2, 3]
prot_carboxyl_carbon_atom_num: 1
prot_h_type: 5
water_o_type: 3
water_h_type: 4
hydronium_o_type: 6
hydronium_h_type: 7
dump_file: test_files/protonated.dump
",
        )
        .unwrap()
    }

    fn first_frame(file: &str) -> Frame {
        DumpReader::open(file, None)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn proton_contact_protonated() {
        let frame = first_frame("test_files/protonated.dump");
        let config = test_config();
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();

        let contact = closest_excess_proton(&roles, frame.get_box()).unwrap();

        assert_eq!(contact.h_star().get_atom_number(), 4);
        assert_eq!(contact.o_star().get_atom_number(), 2);
        // H sits at (6.8, 5.5, 5.0), O* at (6.0, 5.5, 5.0)
        assert_approx_eq!(f32, contact.oh_min(), 0.8, epsilon = 1e-5);
        assert_approx_eq!(f32, contact.oh_max(), (0.64f32 + 1.0).sqrt(), epsilon = 1e-5);
        assert!(contact.oh_diff() >= 0.0);
        assert!(contact.com_h_dist().is_some());
    }

    #[test]
    fn proton_contact_deprotonated_uses_hydronium() {
        let frame = first_frame("test_files/deprotonated.dump");
        let config = test_config();
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();

        let contact = closest_excess_proton(&roles, frame.get_box()).unwrap();

        // hydronium hydrogen 12 at (6.4, 5.5, 5.0) is closest to oxygen 2 at (6.0, 5.5, 5.0)
        assert_eq!(contact.h_star().get_atom_number(), 12);
        assert_eq!(contact.o_star().get_atom_number(), 2);
        assert_approx_eq!(f32, contact.oh_min(), 0.4, epsilon = 1e-5);
        assert!(contact.oh_diff() >= 0.0);
    }

    #[test]
    fn com_h_dist_missing_without_carbon() {
        let frame = first_frame("test_files/protonated.dump");
        let mut config = test_config();
        config.chem.carboxyl_carbon_num = None;
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();

        let contact = closest_excess_proton(&roles, frame.get_box()).unwrap();
        assert!(contact.com_h_dist().is_none());
    }

    #[test]
    fn acceptor_oxygen_prefers_hydronium() {
        let frame = first_frame("test_files/deprotonated.dump");
        let config = test_config();
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();
        let contact = closest_excess_proton(&roles, frame.get_box()).unwrap();

        let acceptor =
            closest_water_oxygen(&roles, contact.o_star(), frame.get_box()).unwrap();
        assert_eq!(acceptor.get_atom_number(), 11);
    }

    #[test]
    fn acceptor_oxygen_closest_water() {
        let frame = first_frame("test_files/protonated.dump");
        let config = test_config();
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();
        let contact = closest_excess_proton(&roles, frame.get_box()).unwrap();

        // water oxygen 5 at (8.0, 5.5, 5.0) is closer to O* than oxygen 8
        let acceptor =
            closest_water_oxygen(&roles, contact.o_star(), frame.get_box()).unwrap();
        assert_eq!(acceptor.get_atom_number(), 5);
    }

    #[test]
    fn q_squared_zero_at_midpoint() {
        let sbox = crate::structures::simbox::SimBox::from([10.0, 10.0, 10.0]);
        let donor = Vector3D::new(2.0, 2.0, 2.0);
        let acceptor = Vector3D::new(4.0, 2.0, 2.0);
        let h = Vector3D::new(3.0, 2.0, 2.0);

        assert_approx_eq!(f32, q_squared(&donor, &acceptor, &h, &sbox), 0.0);
    }

    #[test]
    fn q_squared_across_boundary() {
        let sbox = crate::structures::simbox::SimBox::from([10.0, 10.0, 10.0]);
        let donor = Vector3D::new(9.5, 2.0, 2.0);
        let acceptor = Vector3D::new(0.5, 2.0, 2.0);
        // the minimum image midpoint is on the boundary at x = 10.0
        let h = Vector3D::new(0.0, 2.0, 2.0);

        assert_approx_eq!(f32, q_squared(&donor, &acceptor, &h, &sbox), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn q_squared_arq_matches_symmetric_form() {
        // with r_sc forced to 1, the asymmetric form reduces to the symmetric one
        let sbox = crate::structures::simbox::SimBox::from([10.0, 10.0, 10.0]);
        let donor = Vector3D::new(2.0, 2.0, 2.0);
        let acceptor = Vector3D::new(4.5, 2.0, 2.0);
        let h = Vector3D::new(3.0, 2.5, 2.0);

        let symmetric = q_squared(&donor, &acceptor, &h, &sbox);
        let (asymmetric, d) = q_squared_arq(&donor, &acceptor, &h, &sbox, 1.0, 0.0, 0.0);

        assert_approx_eq!(f32, symmetric, asymmetric, epsilon = 1e-5);
        assert_approx_eq!(f32, d, 2.5);
    }

    #[test]
    fn hij_amino_peaks_at_gaussian_centre() {
        let (glu_centre, asp_centre) = hij_amino(params::C3_GLU);
        assert_approx_eq!(f32, glu_centre, params::C1_GLU);

        let (glu_off, asp_off) = hij_amino(params::C3_GLU + 0.5);
        assert!(glu_off > glu_centre); // less negative away from the centre
        assert!(asp_off > asp_centre || asp_off > params::C1_ASP);

        assert!(glu_centre < 0.0 && asp_centre < 0.0);
    }

    #[test]
    fn hij_water_sign_convention() {
        let result = hij_water(0.25, 2.6);

        assert!(result.a1() > 0.0 && result.a1() <= 1.0);
        assert!(result.a2() >= 1.0);
        assert!(result.a3() > 0.0);
        assert!(result.hij() < 0.0);
        assert!(result.hij().is_finite());

        assert_approx_eq!(
            f32,
            result.hij(),
            params::VIJ_WATER * params::WATER_SCALE * result.a1() * result.a2() * result.a3(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn hij_water_decays_with_q() {
        let near = hij_water(0.01, 2.6);
        let far = hij_water(2.0, 2.6);
        assert!(near.hij() < far.hij()); // larger magnitude at small q²
    }

    #[test]
    fn hij_arq_finite_and_negative() {
        let value = hij_arq(0.3, 2.7);
        assert!(value.is_finite());
        assert!(value < 0.0);
    }

    #[test]
    fn hij_new_factors() {
        let parameters = crate::config::NewHijParams {
            vij: -21.5,
            gamma: 2.0,
            alpha: 3.5,
            a_da: 2.6,
            r0_sc: 1.0,
            r0_da: 2.9,
            lambda: 0.01,
        };

        let result = hij_new(&parameters, 0.0, 2.6);
        assert_approx_eq!(f32, result.g_of_q(), 1.0);
        assert_approx_eq!(f32, result.f_roo(), 1.0);
        assert_approx_eq!(f32, result.hij(), -21.5);
    }
}
