use std::{fmt, sync::Arc};

use fitbench_core::FittingProblem;

use crate::{Controller, FactoryError, engines};

/// Every software name this build knows about, with or without its feature.
pub const SOFTWARE: &[&str] = &["argmin", "minpack", "native"];

type Construct = fn(Arc<FittingProblem>) -> Box<dyn Controller>;

/// A registered controller type, ready to construct instances.
#[derive(Clone, Copy)]
pub struct ControllerClass {
    name: &'static str,
    software: &'static str,
    minimizers: &'static [&'static str],
    construct: Construct,
}

impl ControllerClass {
    /// Type name of the controller, e.g. `"MinpackController"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn software(&self) -> &'static str {
        self.software
    }

    #[must_use]
    pub fn minimizers(&self) -> &'static [&'static str] {
        self.minimizers
    }

    /// Creates a controller for `problem`.
    #[must_use]
    pub fn create(&self, problem: Arc<FittingProblem>) -> Box<dyn Controller> {
        (self.construct)(problem)
    }
}

impl fmt::Debug for ControllerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerClass")
            .field("name", &self.name)
            .field("software", &self.software)
            .field("minimizers", &self.minimizers)
            .finish_non_exhaustive()
    }
}

/// Resolves a software name, case-insensitively, to its controller class.
///
/// # Errors
///
/// Returns [`FactoryError::NoController`] for an unknown name, or
/// [`FactoryError::MissingDependency`] if the software is known but its
/// cargo feature is disabled.
pub fn create_controller(software: &str) -> Result<ControllerClass, FactoryError> {
    match software.to_ascii_lowercase().as_str() {
        "argmin" => argmin_class(),
        "minpack" => minpack_class(),
        "native" => Ok(ControllerClass {
            name: "NativeController",
            software: "native",
            minimizers: engines::NativeController::MINIMIZERS,
            construct: |problem| {
                Box::new(engines::NativeController::new(problem)) as Box<dyn Controller>
            },
        }),
        _ => Err(FactoryError::NoController {
            software: software.to_owned(),
        }),
    }
}

#[cfg(feature = "argmin")]
fn argmin_class() -> Result<ControllerClass, FactoryError> {
    Ok(ControllerClass {
        name: "ArgminController",
        software: "argmin",
        minimizers: engines::ArgminController::MINIMIZERS,
        construct: |problem| {
            Box::new(engines::ArgminController::new(problem)) as Box<dyn Controller>
        },
    })
}

#[cfg(not(feature = "argmin"))]
fn argmin_class() -> Result<ControllerClass, FactoryError> {
    Err(FactoryError::MissingDependency {
        software: "argmin".to_owned(),
        feature: "argmin",
    })
}

#[cfg(feature = "minpack")]
fn minpack_class() -> Result<ControllerClass, FactoryError> {
    Ok(ControllerClass {
        name: "MinpackController",
        software: "minpack",
        minimizers: engines::MinpackController::MINIMIZERS,
        construct: |problem| {
            Box::new(engines::MinpackController::new(problem)) as Box<dyn Controller>
        },
    })
}

#[cfg(not(feature = "minpack"))]
fn minpack_class() -> Result<ControllerClass, FactoryError> {
    Err(FactoryError::MissingDependency {
        software: "minpack".to_owned(),
        feature: "minpack",
    })
}

#[cfg(test)]
mod tests {
    use fitbench_core::ParameterSet;

    use super::*;

    #[test]
    fn class_name_starts_with_software() {
        let class = create_controller("native").expect("native is always built");

        assert!(class.name().to_lowercase().starts_with("native"));
        assert_eq!(class.software(), "native");
        assert!(class.minimizers().contains(&"gauss_newton"));
    }

    #[test]
    fn lookup_ignores_case() {
        let class = create_controller("Native").expect("native is always built");
        assert_eq!(class.software(), "native");
    }

    #[test]
    fn unknown_software_is_no_controller() {
        assert_eq!(
            create_controller("doesnotexist").expect_err("unknown software"),
            FactoryError::NoController {
                software: "doesnotexist".into()
            }
        );
    }

    #[cfg(feature = "minpack")]
    #[test]
    fn minpack_resolves_when_enabled() {
        let class = create_controller("minpack").expect("minpack feature is on");
        assert!(class.name().to_lowercase().starts_with("minpack"));
    }

    #[cfg(not(feature = "argmin"))]
    #[test]
    fn disabled_feature_is_missing_dependency() {
        assert!(matches!(
            create_controller("argmin"),
            Err(FactoryError::MissingDependency { feature: "argmin", .. })
        ));
    }

    #[cfg(not(feature = "minpack"))]
    #[test]
    fn disabled_minpack_is_missing_dependency() {
        assert!(matches!(
            create_controller("minpack"),
            Err(FactoryError::MissingDependency { feature: "minpack", .. })
        ));
    }

    #[test]
    fn every_registered_software_resolves_or_reports_missing_dependency() {
        for software in SOFTWARE {
            match create_controller(software) {
                Ok(class) => assert_eq!(class.software(), *software),
                Err(err) => assert!(matches!(err, FactoryError::MissingDependency { .. })),
            }
        }
    }

    #[test]
    fn created_controller_wraps_the_problem() {
        let problem = Arc::new(
            FittingProblem::new("p").with_starting_values(ParameterSet::new().with("a", 1.0)),
        );
        let class = create_controller("native").expect("native is always built");
        let controller = class.create(Arc::clone(&problem));

        assert_eq!(controller.software(), "native");
        assert!(Arc::ptr_eq(controller.base().problem(), &problem));
    }
}
