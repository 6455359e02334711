use approx::assert_relative_eq;
use mpt_fit::data::{SampleConfig, generate_sample};
use mpt_fit::{FitError, FitOptions, ModelKind, fit_kelvin, fit_observations, fit_power_weighted};

fn sample(model: ModelKind, params: Vec<f64>, noise: f64, seed: u64) -> mpt_fit::Observations {
    generate_sample(&SampleConfig {
        model,
        params,
        points: 60,
        x_min: 0.01,
        x_max: 10.0,
        noise,
        seed,
    })
    .unwrap()
    .observations
}

#[test]
fn straight_fit_recovers_power_law_through_public_api() {
    let obs = sample(ModelKind::PowerLaw, vec![0.35, 0.75], 0.0, 1);
    let fit = fit_power_weighted(obs.x(), obs.y(), None, false).unwrap();
    assert_relative_eq!(fit.optimized_parameters()[0], 0.35, max_relative = 1e-6);
    assert_relative_eq!(fit.optimized_parameters()[1], 0.75, max_relative = 1e-6);
    assert!(fit.squared_diffs().iter().all(|d| *d < 1e-16));
}

#[test]
fn parabolic_fit_with_noise_stays_near_truth() {
    let truth = [1.2, 0.9, -0.05];
    let obs = sample(ModelKind::Parabolic, truth.to_vec(), 0.03, 11);
    let fit = fit_observations(&obs, ModelKind::Parabolic, &FitOptions::default()).unwrap();
    let p = fit.optimized_parameters();
    assert!(fit.summary().converged);
    for (k, (est, t)) in p.iter().zip(truth).enumerate() {
        let se = fit.summary().std_errors[k];
        assert!((est - t).abs() < 5.0 * se, "param {k}: {est} vs {t} (se {se})");
    }
    assert_eq!(fit.cov_matrix().shape(), (3, 3));
    let cov = fit.cov_matrix();
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(cov[(i, j)], cov[(j, i)], max_relative = 1e-9);
        }
    }
}

#[test]
fn two_term_kelvin_fit_separates_time_scales() {
    let truth = vec![1.0, 3.0, 20.0, 0.5];
    let obs = sample(ModelKind::Kelvin { terms: 2 }, truth, 0.0, 3);
    let fit = fit_kelvin(obs.x(), obs.y(), None, 2, &FitOptions::default()).unwrap();
    let mut pairs: Vec<(f64, f64)> = (0..2)
        .map(|i| (fit.optimized_parameters()[i], fit.optimized_parameters()[i + 2]))
        .collect();
    pairs.sort_by(|l, r| l.1.total_cmp(&r.1));
    assert_relative_eq!(pairs[0].0, 3.0, max_relative = 1e-3);
    assert_relative_eq!(pairs[0].1, 0.5, max_relative = 1e-3);
    assert_relative_eq!(pairs[1].0, 1.0, max_relative = 1e-3);
    assert_relative_eq!(pairs[1].1, 20.0, max_relative = 1e-3);
}

#[test]
fn noisy_kelvin_fit_reports_natural_parameter_covariance() {
    let truth = [2.0, 1.5];
    let obs = sample(ModelKind::Kelvin { terms: 1 }, truth.to_vec(), 0.05, 21);
    let fit = fit_kelvin(obs.x(), obs.y(), None, 1, &FitOptions::default()).unwrap();
    let cov = fit.cov_matrix();
    assert_eq!(cov.shape(), (2, 2));
    for i in 0..2 {
        assert!(cov[(i, i)].is_finite() && cov[(i, i)] > 0.0, "cov[{i},{i}] = {}", cov[(i, i)]);
        for j in 0..2 {
            assert!(cov[(i, j)].is_finite());
            assert_relative_eq!(cov[(i, j)], cov[(j, i)], max_relative = 1e-9);
        }
    }
    let p = fit.optimized_parameters();
    for (k, t) in truth.iter().enumerate() {
        let se = fit.summary().std_errors[k];
        assert!(se.is_finite() && se > 0.0);
        assert!((p[k] - t).abs() < 6.0 * se, "param {k}: {} vs {t} (se {se})", p[k]);
    }
}

#[test]
fn validation_runs_before_the_solver() {
    assert!(matches!(
        fit_power_weighted(&[1.0, 2.0, 3.0], &[1.0, 2.0], None, true),
        Err(FitError::LengthMismatch { .. })
    ));
    assert!(matches!(
        fit_power_weighted(&[1.0, f64::NAN], &[1.0, 2.0], None, false),
        Err(FitError::NonFinite(_))
    ));
    assert!(matches!(
        fit_power_weighted(&[-1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], None, false),
        Err(FitError::Domain { .. })
    ));
    let options = FitOptions {
        patience: 0,
        ..FitOptions::default()
    };
    assert!(matches!(
        fit_observations(&sample(ModelKind::PowerLaw, vec![1.0, 1.0], 0.0, 1), ModelKind::PowerLaw, &options),
        Err(FitError::InvalidOption(_))
    ));
}

#[test]
fn result_weights_default_to_ones_and_copy_inputs() {
    let x = vec![0.5, 1.0, 2.0, 4.0];
    let y = vec![0.4, 0.8, 1.7, 3.1];
    let fit = fit_power_weighted(&x, &y, None, false).unwrap();
    assert_eq!(fit.weights(), &[1.0; 4]);
    assert_eq!(fit.original_data().x, x);
    assert_eq!(fit.original_data().y, y);
    assert_eq!(fit.fitted_data().len(), 4);
}
