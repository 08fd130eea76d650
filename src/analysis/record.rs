// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the per-frame result record and its evaluation.

use indexmap::IndexMap;

use crate::analysis::evb;
use crate::analysis::roles::RoleSets;
use crate::config::CalcFlags;
use crate::structures::simbox::SimBox;

/// One row of per-frame results keyed by output field name.
/// Fields keep their insertion order, which follows [`field_whitelist`].
#[derive(Debug, Clone)]
pub struct FrameRecord {
    timestep: i64,
    source: Option<String>,
    values: IndexMap<&'static str, f32>,
}

impl FrameRecord {
    pub fn new(timestep: i64) -> Self {
        FrameRecord {
            timestep,
            source: None,
            values: IndexMap::new(),
        }
    }

    /// Get the timestep the record belongs to.
    #[inline]
    pub fn get_timestep(&self) -> i64 {
        self.timestep
    }

    /// Get the name of the dump file the record originates from, if attached.
    #[inline]
    pub fn get_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Attach the name of the originating dump file.
    pub fn set_source(&mut self, source: String) {
        self.source = Some(source);
    }

    /// Get the value of a field, or `None` if it is missing or unknown.
    #[inline]
    pub fn get_value(&self, field: &str) -> Option<f32> {
        self.values.get(field).copied()
    }

    fn insert(&mut self, field: &'static str, value: f32) {
        self.values.insert(field, value);
    }

    fn insert_opt(&mut self, field: &'static str, value: Option<f32>) {
        if let Some(value) = value {
            self.values.insert(field, value);
        }
    }
}

/// Assemble the ordered list of output fields for the requested calculations.
///
/// `with_com` adds the carboxyl centre-of-mass distance column; it should be
/// set when a carboxyl carbon is configured.
pub fn field_whitelist(calc: &CalcFlags, with_com: bool) -> Vec<&'static str> {
    let mut fields = Vec::new();

    if calc.oh_dist {
        fields.extend(["oh_min", "oh_max", "oh_diff"]);
        if with_com {
            fields.push("com_h_dist");
        }
    }

    if calc.hij_da_gauss {
        fields.extend(["r_oh", "hij_glu", "hij_asp"]);
    }

    if calc.hij_arq {
        fields.extend(["q_dot_arq", "hij_arq"]);
    }

    if calc.hij_new.is_some() {
        fields.extend(["q_dot_new", "g_of_q_new", "f_roo_new", "hij_new"]);
    }

    if calc.hij_water_form {
        fields.extend(["r_oo", "q_dot", "hij_water"]);
        if calc.print_water_terms {
            fields.extend(["hij_a1", "hij_a2", "hij_a3"]);
        }
    }

    if calc.hij_hyd_wat {
        fields.extend(["r_oo_hyd_wat", "r_oh_hyd", "r_oh_wat_hyd", "hij_wat"]);
    }

    fields
}

/// Evaluate the requested per-frame quantities for one classified frame.
///
/// Fields whose chemical precondition does not hold in the frame are left
/// out of the record: the couplings between the residue and water require
/// the excess proton, while the hydronium-water channel requires a hydronium.
pub fn evaluate_frame(
    timestep: i64,
    roles: &RoleSets,
    sbox: &SimBox,
    calc: &CalcFlags,
) -> FrameRecord {
    let mut record = FrameRecord::new(timestep);

    let contact = match evb::closest_excess_proton(roles, sbox) {
        Some(contact) => contact,
        None => return record,
    };

    if calc.oh_dist {
        record.insert("oh_min", contact.oh_min());
        record.insert("oh_max", contact.oh_max());
        record.insert("oh_diff", contact.oh_diff());
        record.insert_opt("com_h_dist", contact.com_h_dist());
    }

    // residue-water couplings are only defined while the residue holds the proton
    if roles.is_protonated() {
        // the donor-acceptor Gaussian needs only the O-H distance
        if calc.hij_da_gauss {
            let (hij_glu, hij_asp) = evb::hij_amino(contact.oh_min());
            record.insert("r_oh", contact.oh_min());
            record.insert("hij_glu", hij_glu);
            record.insert("hij_asp", hij_asp);
        }

        if let Some(acceptor) = evb::closest_water_oxygen(roles, contact.o_star(), sbox) {
            let o_star = contact.o_star().get_position();
            let o_acceptor = acceptor.get_position();
            let h_star = contact.h_star().get_position();

            if calc.hij_arq {
                let (q2, d) = evb::q_squared_arq(
                    o_star,
                    o_acceptor,
                    h_star,
                    sbox,
                    evb::params::R0_SC_ARQ,
                    evb::params::R0_DA_ARQ,
                    evb::params::LAMBDA_ARQ,
                );
                record.insert("q_dot_arq", q2);
                record.insert("hij_arq", evb::hij_arq(q2, d));
            }

            if let Some(ref parameters) = calc.hij_new {
                let (q2, d) = evb::q_squared_arq(
                    o_star,
                    o_acceptor,
                    h_star,
                    sbox,
                    parameters.r0_sc,
                    parameters.r0_da,
                    parameters.lambda,
                );
                let result = evb::hij_new(parameters, q2, d);
                record.insert("q_dot_new", q2);
                record.insert("g_of_q_new", result.g_of_q());
                record.insert("f_roo_new", result.f_roo());
                record.insert("hij_new", result.hij());
            }

            if calc.hij_water_form {
                let q2 = evb::q_squared(o_star, o_acceptor, h_star, sbox);
                let r_oo = o_star.distance(o_acceptor, sbox);
                let result = evb::hij_water(q2, r_oo);

                record.insert("r_oo", r_oo);
                record.insert("q_dot", q2);
                record.insert("hij_water", result.hij());
                if calc.print_water_terms {
                    record.insert("hij_a1", result.a1());
                    record.insert("hij_a2", result.a2());
                    record.insert("hij_a3", result.a3());
                }
            }
        }
    } else if calc.hij_hyd_wat {
        if let Some(hydronium_o) = roles.hydronium_o {
            let water_o = roles
                .water_oxys
                .iter()
                .min_by(|a, b| {
                    let d1 = hydronium_o.get_position().distance(a.get_position(), sbox);
                    let d2 = hydronium_o.get_position().distance(b.get_position(), sbox);
                    d1.partial_cmp(&d2).expect(
                        "FATAL EVBAN ERROR | evaluate_frame | Distance should not be NaN.",
                    )
                })
                .copied();

            if let Some(water_o) = water_o {
                let h = roles
                    .hydronium_hs
                    .iter()
                    .min_by(|a, b| {
                        let d1 = water_o.get_position().distance(a.get_position(), sbox);
                        let d2 = water_o.get_position().distance(b.get_position(), sbox);
                        d1.partial_cmp(&d2).expect(
                            "FATAL EVBAN ERROR | evaluate_frame | Distance should not be NaN.",
                        )
                    })
                    .copied();

                if let Some(h) = h {
                    let r_oo = hydronium_o
                        .get_position()
                        .distance(water_o.get_position(), sbox);
                    let q2 = evb::q_squared(
                        hydronium_o.get_position(),
                        water_o.get_position(),
                        h.get_position(),
                        sbox,
                    );

                    record.insert("r_oo_hyd_wat", r_oo);
                    record.insert(
                        "r_oh_hyd",
                        hydronium_o.get_position().distance(h.get_position(), sbox),
                    );
                    record.insert(
                        "r_oh_wat_hyd",
                        water_o.get_position().distance(h.get_position(), sbox),
                    );
                    record.insert("hij_wat", evb::hij_water(q2, r_oo).hij());
                }
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::roles::{classify_frame, RoleRequirements};
    use crate::config::AnalysisConfig;
    use crate::io::dump_io::DumpReader;
    use crate::structures::frame::Frame;
    use float_cmp::assert_approx_eq;

    fn config_with(extra: &str) -> AnalysisConfig {
        let yaml = format!(
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
{}",
            extra
        );
        AnalysisConfig::from_yaml(&yaml).unwrap()
    }

    fn first_frame(file: &str) -> Frame {
        DumpReader::open(file, None)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn whitelist_order_matches_flags() {
        let config = config_with(
            "calc_oh_dist: true
calc_hij_da_gauss: true
calc_hij_water_form: true
print_water_terms: true",
        );

        let fields = field_whitelist(&config.calc, true);
        assert_eq!(
            fields,
            vec![
                "oh_min",
                "oh_max",
                "oh_diff",
                "com_h_dist",
                "r_oh",
                "hij_glu",
                "hij_asp",
                "r_oo",
                "q_dot",
                "hij_water",
                "hij_a1",
                "hij_a2",
                "hij_a3",
            ]
        );

        let without_com = field_whitelist(&config.calc, false);
        assert!(!without_com.contains(&"com_h_dist"));
    }

    #[test]
    fn whitelist_water_terms_need_water_form() {
        let config = config_with("calc_oh_dist: true\nprint_water_terms: true");
        let fields = field_whitelist(&config.calc, false);
        assert_eq!(fields, vec!["oh_min", "oh_max", "oh_diff"]);
    }

    #[test]
    fn oh_distances_evaluated_for_protonated_frame() {
        let config = config_with("calc_oh_dist: true");
        let frame = first_frame("test_files/protonated.dump");
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        assert_eq!(record.get_timestep(), 1000);
        assert_approx_eq!(f32, record.get_value("oh_min").unwrap(), 0.8, epsilon = 1e-5);
        assert!(record.get_value("oh_diff").unwrap() >= 0.0);
        assert!(record.get_value("com_h_dist").is_some());
        assert!(record.get_value("hij_water").is_none());
    }

    #[test]
    fn water_form_evaluated_for_protonated_frame() {
        let config = config_with("calc_hij_water_form: true\nprint_water_terms: true");
        let frame = first_frame("test_files/protonated.dump");
        let roles = classify_frame(
            &frame,
            &config.chem,
            RoleRequirements {
                water_oxys: true,
                water_hs: false,
            },
        )
        .unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        // O* at (6.0, 5.5, 5.0), closest water O at (8.0, 5.5, 5.0)
        assert_approx_eq!(f32, record.get_value("r_oo").unwrap(), 2.0, epsilon = 1e-5);
        let hij = record.get_value("hij_water").unwrap();
        assert!(hij.is_finite() && hij <= 0.0);
        assert!(record.get_value("hij_a1").is_some());
        assert!(record.get_value("hij_a2").is_some());
        assert!(record.get_value("hij_a3").is_some());
    }

    #[test]
    fn da_gauss_survives_missing_waters() {
        use crate::structures::atom::Atom;
        use crate::structures::simbox::SimBox;
        use crate::structures::vector3d::Vector3D;

        let config = config_with("calc_hij_da_gauss: true\ncalc_hij_water_form: true");

        // the protonated residue alone, not a single water molecule around
        let atoms = vec![
            Atom::new(1, 1, 1, 0.62, Vector3D::new(5.0, 5.0, 5.0)),
            Atom::new(2, 1, 2, -0.76, Vector3D::new(6.0, 5.5, 5.0)),
            Atom::new(3, 1, 2, -0.76, Vector3D::new(6.0, 4.5, 5.0)),
            Atom::new(4, 1, 5, 0.44, Vector3D::new(6.8, 5.5, 5.0)),
        ];
        let frame = Frame::new(100, SimBox::from([10.0, 10.0, 10.0]), atoms);
        let roles = classify_frame(&frame, &config.chem, RoleRequirements::default()).unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        // the Gaussian needs only r_OH and must survive the missing acceptor
        assert_approx_eq!(f32, record.get_value("r_oh").unwrap(), 0.8, epsilon = 1e-5);
        assert!(record.get_value("hij_glu").unwrap() < 0.0);
        assert!(record.get_value("hij_asp").unwrap() < 0.0);
        assert!(record.get_value("hij_water").is_none());
    }

    #[test]
    fn residue_couplings_missing_for_deprotonated_frame() {
        let config = config_with("calc_hij_water_form: true\ncalc_hij_arq: true");
        let frame = first_frame("test_files/deprotonated.dump");
        let roles = classify_frame(
            &frame,
            &config.chem,
            RoleRequirements {
                water_oxys: true,
                water_hs: false,
            },
        )
        .unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        assert!(record.get_value("hij_water").is_none());
        assert!(record.get_value("hij_arq").is_none());
    }

    #[test]
    fn hydronium_water_channel() {
        let config = config_with("calc_hij_hyd_wat: true");
        let frame = first_frame("test_files/deprotonated.dump");
        let roles = classify_frame(
            &frame,
            &config.chem,
            RoleRequirements {
                water_oxys: true,
                water_hs: false,
            },
        )
        .unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        assert!(record.get_value("r_oo_hyd_wat").is_some());
        assert!(record.get_value("r_oh_hyd").is_some());
        assert!(record.get_value("r_oh_wat_hyd").is_some());
        let hij = record.get_value("hij_wat").unwrap();
        assert!(hij.is_finite() && hij <= 0.0);
    }

    #[test]
    fn hydronium_water_channel_missing_when_protonated() {
        let config = config_with("calc_hij_hyd_wat: true");
        let frame = first_frame("test_files/protonated.dump");
        let roles = classify_frame(
            &frame,
            &config.chem,
            RoleRequirements {
                water_oxys: true,
                water_hs: false,
            },
        )
        .unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);
        assert!(record.get_value("hij_wat").is_none());
    }

    #[test]
    fn new_coupling_uses_configured_parameters() {
        let config = config_with(
            "hij_new_vij: -21.5
hij_new_gamma: 2.0
hij_new_alpha: 3.5
hij_new_a_da: 2.6
hij_new_r0_sc: 1.0
hij_new_r0_da: 2.9
hij_new_lambda: 0.0",
        );
        let frame = first_frame("test_files/protonated.dump");
        let roles = classify_frame(
            &frame,
            &config.chem,
            RoleRequirements {
                water_oxys: true,
                water_hs: false,
            },
        )
        .unwrap();

        let record = evaluate_frame(frame.get_timestep(), &roles, frame.get_box(), &config.calc);

        let g = record.get_value("g_of_q_new").unwrap();
        let f = record.get_value("f_roo_new").unwrap();
        let hij = record.get_value("hij_new").unwrap();
        assert_approx_eq!(f32, hij, -21.5 * g * f, epsilon = 1e-4);
    }
}
