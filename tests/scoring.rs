use invadere::scoring::{Competition, ModelParams, linspace};
use invadere::stats;

fn reference_params() -> ModelParams {
    ModelParams {
        a0: 1.0,
        a1: 0.0,
        opt_f0: 5.0,
        opt_f1: 0.0,
        beta_f0: 0.5,
        beta_f1: 0.0,
        opt_p0: 4.0,
        opt_p1: 0.0,
        beta_p0: 0.3,
        beta_p1: 0.0,
        lambda: 0.0,
        alpha_f: 10.0,
        mism_max: 3.0,
        competition: Competition::Fixed(2.0),
    }
}

#[test]
fn score_at_optima_matches_reference() {
    let par = reference_params();

    // Both mismatches vanish, the gate saturates at one, and the pressure
    // factor is 10 / (1 + 2).
    let score = par.score(0.0, 5.0, 4.0, 10.0);
    assert!((score - 10.0 / 3.0).abs() < 1e-6, "score = {score}");
}

#[test]
fn gate_is_half_at_threshold() {
    let par = ModelParams {
        beta_f0: 0.0,
        beta_p0: 0.0,
        competition: Competition::Fixed(0.0),
        ..reference_params()
    };

    // With the penalty and pressure factors neutralized the score reduces to
    // the gate, which must equal one half at |d_f - opt_f| = mism_max.
    for dist_f in [8.0, 2.0] {
        let score = par.score(0.0, dist_f, 0.0, 1.0);
        assert!((score - 0.5).abs() < 1e-12, "score = {score}");
    }
}

#[test]
fn gate_decreases_past_threshold() {
    let par = ModelParams {
        beta_f0: 0.0,
        beta_p0: 0.0,
        competition: Competition::Fixed(0.0),
        ..reference_params()
    };

    let mut prev = par.score(0.0, 8.0, 0.0, 1.0);
    for dist_f in [8.5, 9.0, 10.0, 12.0] {
        let score = par.score(0.0, dist_f, 0.0, 1.0);
        assert!(score < prev, "gate must decrease, {score} >= {prev}");
        prev = score;
    }

    let far = par.score(0.0, 100.0, 0.0, 1.0);
    assert!(far >= 0.0 && far < 1e-10, "far = {far}");
}

#[test]
fn penalty_symmetric_without_coupling() {
    let par = reference_params();

    for (delta_f, delta_p) in [(1.3, 0.7), (2.0, 0.0), (0.0, 3.1)] {
        let above = par.score(0.0, 5.0 + delta_f, 4.0 + delta_p, 10.0);
        let below = par.score(0.0, 5.0 - delta_f, 4.0 - delta_p, 10.0);
        assert!((above - below).abs() < 1e-12, "{above} != {below}");
    }
}

#[test]
fn coupling_compounds_aligned_mismatches() {
    let par = ModelParams {
        lambda: 0.2,
        ..reference_params()
    };

    // With a positive coupling, same-direction mismatches are penalized
    // beyond independence, opposite-direction mismatches less.
    let aligned = par.score(0.0, 6.0, 5.0, 10.0);
    let opposed = par.score(0.0, 6.0, 3.0, 10.0);
    assert!(aligned < opposed, "{aligned} >= {opposed}");
}

#[test]
fn score_nonnegative_and_finite() {
    let par = reference_params();

    for env in [0.0, 2.5, 5.0] {
        for dist_f in [0.0, 3.3, 5.0, 8.0, 10.0] {
            for dist_p in [0.0, 4.0, 10.0] {
                for press in [0.0, 1.0, 55.0] {
                    let score = par.score(env, dist_f, dist_p, press);
                    assert!(score >= 0.0 && score.is_finite(), "score = {score}");
                }
            }
        }
    }
}

#[test]
fn competition_hook_is_interchangeable() {
    assert_eq!(Competition::Fixed(2.0).index(4.2), 2.0);
    assert_eq!(Competition::Linear { c0: 1.0, c1: 0.5 }.index(2.0), 2.0);

    // A linear index matching the fixed one at a given environment value
    // must leave the score unchanged there.
    let fixed = reference_params();
    let linear = ModelParams {
        competition: Competition::Linear { c0: 1.0, c1: 0.5 },
        ..reference_params()
    };
    let env = 2.0;
    assert_eq!(
        fixed.score(env, 6.0, 3.0, 10.0),
        linear.score(env, 6.0, 3.0, 10.0)
    );
}

#[test]
fn grid_matches_scalar_scores() {
    let par = reference_params();

    let grid_f = [4.0, 5.5, 7.0];
    let grid_p = [3.0, 4.5];
    let score_mat = par.score_grid(1.0, 10.0, &grid_f, &grid_p);

    assert_eq!(score_mat.len(), grid_p.len());
    for (i_p, row) in score_mat.iter().enumerate() {
        assert_eq!(row.len(), grid_f.len());
        for (i_f, &score) in row.iter().enumerate() {
            assert_eq!(score, par.score(1.0, grid_f[i_f], grid_p[i_p], 10.0));
        }
    }
}

#[test]
fn linspace_is_inclusive_and_even() {
    let grid = linspace(0.0, 1.0, 5);
    assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

    let grid = linspace(-2.0, 3.0, 100);
    assert_eq!(grid.len(), 100);
    assert_eq!(grid[0], -2.0);
    assert_eq!(grid[99], 3.0);
}

#[test]
fn median_splits_middle_values() {
    assert_eq!(stats::median(&[3.0, 1.0, 2.0]), 2.0);
    assert_eq!(stats::median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(stats::median(&[5.0]), 5.0);
    assert_eq!(stats::median(&[1.0, f64::NAN, 3.0]), 2.0);
    assert!(stats::median(&[]).is_nan());
}
