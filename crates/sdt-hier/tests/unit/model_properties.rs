//! Structural properties of the encoder, likelihood, models and comparison.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use sdt_core::model::ModelError;
use sdt_core::types::ModelDims;
use sdt_core::{compare_effects, encode_conditions, sdt_rates, LogDensity, SdtModel};
use sdt_hier::{
    apply_matrix_hierarchy_model, apply_participant_intercept_model, Hierarchy, TrialAggregate,
};

fn grid(participants: u32, conditions: u32) -> Vec<TrialAggregate> {
    (1..=participants)
        .flat_map(|p| (0..conditions).map(move |c| TrialAggregate::new(p, c, 40, 25, 40, 10)))
        .collect()
}

#[test]
fn condition_encoding_for_any_width() {
    for width in [1, 2, 4, 6, 9] {
        let cols = encode_conditions(width);
        assert_eq!(cols.len(), width);
        for c in 0..width {
            assert_eq!(cols.stimulus[c], (c % 2) as f64);
            assert_eq!(cols.difficulty[c], (c / 2) as f64);
            assert_eq!(cols.interaction[c], cols.stimulus[c] * cols.difficulty[c]);
        }
    }
}

#[test]
fn rates_stay_inside_open_unit_interval() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let extremes = [-1e6, -745.0, -40.0, 0.0, 40.0, 745.0, 1e6];
    for &d in &extremes {
        for &c in &extremes {
            let r = sdt_rates(d, c);
            assert!(r.hit_rate > 0.0 && r.hit_rate < 1.0, "d={d} c={c}");
            assert!(r.false_alarm_rate > 0.0 && r.false_alarm_rate < 1.0, "d={d} c={c}");
        }
    }
    for _ in 0..1000 {
        let d: f64 = rng.random_range(-50.0..50.0);
        let c: f64 = rng.random_range(-50.0..50.0);
        let r = sdt_rates(d, c);
        assert!(r.hit_rate > 0.0 && r.hit_rate < 1.0);
        assert!(r.false_alarm_rate > 0.0 && r.false_alarm_rate < 1.0);
    }
}

#[test]
fn comparison_probabilities_are_in_unit_interval() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
    for n in [1, 2, 17, 400] {
        let mut draws = || -> Vec<f64> { (0..n).map(|_| rng.random_range(-3.0..3.0)).collect() };
        let (a, b, c, d) = (draws(), draws(), draws(), draws());
        let cmp = compare_effects(&a, &b, &c, &d).unwrap();
        for p in [cmp.d_prime.prob_stimulus_larger, cmp.criterion.prob_stimulus_larger] {
            assert!((0.0..=1.0).contains(&p));
        }
    }
}

#[test]
fn latent_cardinality_matches_declared_dims() {
    for (p, c) in [(1, 4), (3, 4), (5, 2)] {
        let rows = grid(p, c);
        let a = apply_matrix_hierarchy_model(&rows).unwrap();
        let b = apply_participant_intercept_model(&rows).unwrap();
        assert_eq!(a.latent_cardinality(), 2 * (p * c) as usize);
        assert_eq!(b.latent_cardinality(), 2 * p as usize);
        assert_eq!(a.dim(), 10 + a.latent_cardinality());
        assert_eq!(b.dim(), 10 + b.latent_cardinality());
    }

    // Duplicated rows do not change the parameter count.
    let mut rows = grid(2, 4);
    rows.extend(grid(2, 4));
    assert_eq!(apply_matrix_hierarchy_model(&rows).unwrap().latent_cardinality(), 16);
    assert_eq!(apply_participant_intercept_model(&rows).unwrap().latent_cardinality(), 4);

    // Declared dims larger than the data are honoured.
    let model =
        SdtModel::with_dims(Hierarchy::MatrixHierarchy, &grid(1, 2), ModelDims::new(3, 4)).unwrap();
    assert_eq!(model.latent_cardinality(), 24);
}

#[test]
fn declaration_rejects_empty_and_out_of_range_rows() {
    assert!(matches!(
        apply_participant_intercept_model(&[]),
        Err(ModelError::EmptyData)
    ));
    let rows = [TrialAggregate::new(4, 0, 10, 5, 10, 5)];
    assert!(matches!(
        apply_matrix_hierarchy_model(&rows),
        Err(ModelError::IndexOutOfRange { participant_id: 4, .. })
    ));
}

#[test]
fn invalid_counts_give_zero_likelihood() {
    let rows = [TrialAggregate::new(1, 0, 10, 11, 10, 5)];
    for hierarchy in [Hierarchy::MatrixHierarchy, Hierarchy::ParticipantIntercept] {
        let model = hierarchy.build(&rows).unwrap();
        let mut grad = vec![0.0; model.dim()];
        let lp = model.log_density_gradient(&vec![0.0; model.dim()], &mut grad);
        assert_eq!(lp, f64::NEG_INFINITY);
    }
}

#[test]
fn hierarchy_names_parse() {
    assert_eq!("matrix".parse::<Hierarchy>().unwrap(), Hierarchy::MatrixHierarchy);
    assert_eq!("intercept".parse::<Hierarchy>().unwrap(), Hierarchy::ParticipantIntercept);
    assert!("pooled".parse::<Hierarchy>().is_err());
}
