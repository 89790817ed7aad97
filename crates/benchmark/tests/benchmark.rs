use std::collections::BTreeMap;

use approx::assert_relative_eq;
use fitbench::{
    BenchmarkError, ExitFlag, FittingProblem, Options, OptionsError, ParameterSet, benchmark,
};
use fitbench_controllers::FactoryError;
use fitbench_core::ProblemError;

fn exp_problem() -> FittingProblem {
    FittingProblem::new("exponential growth")
        .with_equation("p0 * exp(p1 * x)")
        .with_data(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![1.0, 2.0, 4.0, 8.0, 16.0])
        .with_function(|x: f64, p: &[f64]| p[0] * (p[1] * x).exp())
        .with_starting_values(ParameterSet::new().with("p0", 6.0).with("p1", 0.1))
}

fn line_problem() -> FittingProblem {
    FittingProblem::new("line through the origin")
        .with_equation("m * x")
        .with_data(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0])
        .with_function(|x: f64, p: &[f64]| p[0] * x)
        .with_starting_values(ParameterSet::new().with("m", 2.0))
}

fn options(software: &str, minimizers: &[&str]) -> Options {
    let map = BTreeMap::from([(
        software.to_owned(),
        minimizers.iter().map(|m| (*m).to_owned()).collect(),
    )]);
    Options::new([software], map)
        .expect("valid options")
        .with_num_runs(2)
        .expect("two runs")
}

#[test]
fn converging_minimizer_beats_the_starting_guess() {
    let results = benchmark(exp_problem(), &options("native", &["gauss_newton"])).expect("run");

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.error_flag, ExitFlag::Converged);
    assert!(result.is_converged());
    assert!(result.chi_sq.is_finite());

    let initial_chi_sq = result
        .problem
        .eval_r_norm(&result.initial_params, None)
        .expect("initial chi-squared");
    assert!(result.chi_sq < initial_chi_sq);

    assert_eq!(result.ini_function_params, "p0=6, p1=0.1");
    assert!(result.fin_function_params.is_some());
    assert_eq!(result.fitted_y.as_ref().map(Vec::len), Some(5));
    assert!(result.runtime.is_finite() && result.runtime >= 0.0);
    assert_eq!(result.message(), "Successfully converged");
}

#[test]
fn levenberg_marquardt_converges() {
    let results = benchmark(exp_problem(), &options("minpack", &["lm"])).expect("run");

    assert_eq!(results[0].error_flag, ExitFlag::Converged);
    assert!(results[0].chi_sq < 1e-8);
}

#[test]
fn zero_iterations_hit_the_limit_for_every_engine() {
    for (software, minimizer) in [
        ("native", "gauss_newton"),
        ("native", "coordinate_search"),
        ("minpack", "lm"),
        ("argmin", "nelder_mead"),
        ("argmin", "lbfgs"),
    ] {
        let options = options(software, &[minimizer]).with_max_iterations(0);
        let results = benchmark(exp_problem(), &options).expect("run");

        let result = &results[0];
        assert_eq!(result.error_flag, ExitFlag::MaxIterations, "{software}/{minimizer}");
        assert!(result.chi_sq.is_infinite(), "{software}/{minimizer}");
        assert!(result.final_params.is_none());
        assert!(result.runtime.is_finite());
    }
}

#[test]
fn failing_minimizer_is_recorded_not_raised() {
    let results =
        benchmark(exp_problem(), &options("native", &["no_such_method", "gauss_newton"]))
            .expect("run continues past the failure");

    assert_eq!(results.len(), 2);
    let failed = &results[0];
    assert_eq!(failed.error_flag, ExitFlag::Exception);
    assert!(failed.final_params.is_none());
    assert!(failed.chi_sq.is_infinite());
    assert!(failed.runtime.is_infinite());
    assert_eq!(results[1].error_flag, ExitFlag::Converged);
}

#[test]
fn every_default_minimizer_completes() {
    let results = benchmark(exp_problem(), &Options::default().with_num_runs(1).expect("one run"))
        .expect("run");

    assert!(!results.is_empty());
    for result in &results {
        let label = format!("{}/{}", result.software, result.minimizer);
        assert!(result.error_flag.completed(), "{label}: {}", result.error_flag);
        if result.error_flag == ExitFlag::Converged {
            let params = result.final_params.as_ref().expect("converged params");
            assert_eq!(params.len(), result.initial_params.len(), "{label}");
        }
        if let Some(params) = &result.final_params {
            let initial_chi_sq = result
                .problem
                .eval_r_norm(&result.initial_params, None)
                .expect("initial chi-squared");
            assert_eq!(params.len(), 2, "{label}");
            assert!(result.chi_sq < initial_chi_sq, "{label}");
        }
    }
}

#[test]
fn starting_at_the_optimum_converges_with_params() {
    for (software, minimizer) in [
        ("native", "gauss_newton"),
        ("minpack", "lm"),
        ("argmin", "lbfgs"),
    ] {
        let results = benchmark(line_problem(), &options(software, &[minimizer])).expect("run");

        let result = &results[0];
        assert_eq!(result.error_flag, ExitFlag::Converged, "{software}/{minimizer}");
        let params = result.final_params.as_ref().expect("converged params");
        assert_relative_eq!(params[0], 2.0, epsilon = 1e-10);
        assert!(result.chi_sq < 1e-12, "{software}/{minimizer}");
    }
}

#[test]
fn one_result_per_starting_point_and_minimizer() {
    let problem = exp_problem()
        .with_starting_values(ParameterSet::new().with("p0", 0.4).with("p1", 0.8));
    let results = benchmark(
        problem,
        &options("native", &["gauss_newton", "coordinate_search"]),
    )
    .expect("run");

    let order: Vec<_> = results
        .iter()
        .map(|r| (r.parameter_set, r.minimizer.as_str()))
        .collect();
    assert_eq!(
        order,
        [
            (0, "gauss_newton"),
            (0, "coordinate_search"),
            (1, "gauss_newton"),
            (1, "coordinate_search"),
        ]
    );
}

#[test]
fn repeated_runs_are_deterministic() {
    let options = options("minpack", &["lm"]);
    let first = benchmark(exp_problem(), &options).expect("first run");
    let second = benchmark(exp_problem(), &options).expect("second run");

    assert_eq!(first[0].error_flag, second[0].error_flag);
    assert_eq!(first[0].chi_sq.to_bits(), second[0].chi_sq.to_bits());
    assert!(first[0].runtime.is_finite() && second[0].runtime.is_finite());
}

#[test]
fn unknown_software_is_a_factory_error() {
    let err = benchmark(exp_problem(), &options("doesnotexist", &["x"])).expect_err("unknown");

    assert!(matches!(
        err,
        BenchmarkError::Factory(FactoryError::NoController { .. })
    ));
}

#[test]
fn software_without_minimizers_is_rejected_before_fitting() {
    let options = Options::new(["native"], BTreeMap::new()).expect("valid options");
    let err = benchmark(exp_problem(), &options).expect_err("no minimizers");

    assert!(matches!(err, BenchmarkError::NoMinimizers { software } if software == "native"));
}

#[test]
fn empty_minimizer_list_is_rejected() {
    let err = benchmark(exp_problem(), &options("native", &[])).expect_err("empty list");
    assert!(matches!(err, BenchmarkError::NoMinimizers { .. }));
}

#[test]
fn incomplete_problem_is_rejected() {
    let problem = FittingProblem::new("no function")
        .with_data(vec![1.0, 2.0], vec![1.0, 2.0])
        .with_starting_values(ParameterSet::new().with("a", 1.0));
    let err = benchmark(problem, &options("native", &["gauss_newton"])).expect_err("no function");

    assert!(matches!(
        err,
        BenchmarkError::Problem(ProblemError::MissingFunction)
    ));
}

#[test]
fn invalid_deserialized_options_are_rejected() {
    let options: Options = toml::from_str("num_runs = 0").expect("parses");
    let err = benchmark(exp_problem(), &options).expect_err("zero runs");

    assert!(matches!(err, BenchmarkError::Options(OptionsError::NoRuns)));
}
