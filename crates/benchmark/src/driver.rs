use std::{sync::Arc, time::Instant};

use fitbench_controllers::{
    Controller, ControllerClass, ControllerError, ExitFlag, create_controller, scope::EngineScope,
};
use fitbench_core::FittingProblem;
use tracing::{info, warn};

use crate::{BenchmarkError, FittingResult, Options, RATIO_TOLERANCE, RepeatTimings};

/// A software whose controller class and minimizer list have been resolved.
struct Selection<'a> {
    class: ControllerClass,
    minimizers: &'a [String],
}

/// Runs every configured minimizer on `problem` from each starting point.
///
/// The problem is verified and its data corrected once before any fit. Each
/// minimizer is timed over `num_runs` repeats of `prepare()` (untimed) and
/// `fit()` (timed), and reported with the mean time. Results are ordered by
/// starting point, then software, then minimizer.
///
/// # Errors
///
/// Configuration errors are raised before any fit runs: invalid options, a
/// software without minimizers, or a software that cannot be resolved.
/// Problem errors and controllers that leave an invalid flag also abort.
/// A minimizer that fails is recorded with [`ExitFlag::Exception`] instead.
pub fn benchmark(
    mut problem: FittingProblem,
    options: &Options,
) -> Result<Vec<FittingResult>, BenchmarkError> {
    options.validate()?;
    let selections = resolve(options)?;

    problem.verify()?;
    problem.correct_data(options.use_errors());
    let problem = Arc::new(problem);

    let num_sets = problem.starting_values.len();
    let mut results = Vec::new();

    for parameter_set in 0..num_sets {
        info!(
            problem = %problem.name,
            "starting value {}/{}",
            parameter_set + 1,
            num_sets
        );

        for selection in &selections {
            let mut controller = selection.class.create(Arc::clone(&problem));
            controller.base_mut().parameter_set = Some(parameter_set);
            controller.set_max_iterations(options.max_iterations());

            for minimizer in selection.minimizers {
                let result = run_minimizer(
                    controller.as_mut(),
                    minimizer,
                    parameter_set,
                    options.num_runs(),
                )?;
                results.push(result);
            }
        }
    }

    Ok(results)
}

fn resolve(options: &Options) -> Result<Vec<Selection<'_>>, BenchmarkError> {
    options
        .software()
        .iter()
        .map(|software| {
            let minimizers = options
                .minimizers(software)
                .filter(|minimizers| !minimizers.is_empty())
                .ok_or_else(|| BenchmarkError::NoMinimizers {
                    software: software.clone(),
                })?;
            let class = create_controller(software)?;
            Ok(Selection { class, minimizers })
        })
        .collect()
}

fn run_minimizer(
    controller: &mut dyn Controller,
    minimizer: &str,
    parameter_set: usize,
    num_runs: usize,
) -> Result<FittingResult, BenchmarkError> {
    let software = controller.software();
    info!(software, minimizer, "fitting");

    controller.base_mut().minimizer = Some(minimizer.to_owned());
    let problem = Arc::clone(controller.base().problem());
    let initial_params = problem.initial_params(parameter_set)?;
    let ini_function_params = problem.get_function_params(&initial_params)?;

    let scope = EngineScope::acquire(software);
    let attempt = timed_runs(controller, num_runs).and_then(|timings| {
        controller.cleanup()?;
        Ok(timings)
    });
    drop(scope);

    let (flag, runtime) = match attempt {
        Ok(timings) => {
            let flag = controller
                .check_attributes()
                .map_err(|source| BenchmarkError::Attribute {
                    software: software.to_owned(),
                    source,
                })?;
            timings.check_ratio(RATIO_TOLERANCE);
            (flag, timings.mean())
        }
        Err(err) => {
            warn!(software, minimizer, error = %err, "fit raised an error");
            (ExitFlag::Exception, f64::INFINITY)
        }
    };

    let base = controller.base();
    let (final_params, fitted_y) = if flag.completed() {
        (base.final_params.clone(), base.results.clone())
    } else {
        (None, None)
    };
    let chi_sq = match &final_params {
        Some(params) => controller.eval_chisq(params, None)?,
        None => f64::INFINITY,
    };
    let fin_function_params = final_params
        .as_deref()
        .map(|params| problem.get_function_params(params))
        .transpose()?;

    Ok(FittingResult {
        problem,
        parameter_set,
        software: software.to_owned(),
        minimizer: minimizer.to_owned(),
        chi_sq,
        runtime,
        initial_params,
        final_params,
        ini_function_params,
        fin_function_params,
        fitted_y,
        error_flag: flag,
    })
}

/// Repeats `prepare()` then a timed `fit()`, returning the fit times.
fn timed_runs(
    controller: &mut dyn Controller,
    num_runs: usize,
) -> Result<RepeatTimings, ControllerError> {
    let mut seconds = Vec::with_capacity(num_runs);
    for _ in 0..num_runs {
        controller.prepare()?;
        let start = Instant::now();
        controller.fit()?;
        seconds.push(start.elapsed().as_secs_f64());
    }
    Ok(RepeatTimings::new(seconds))
}
