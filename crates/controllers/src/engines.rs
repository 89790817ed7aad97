//! Concrete controllers, one per fitting engine.

#[cfg(feature = "argmin")]
mod argmin;
#[cfg(feature = "minpack")]
mod minpack;
mod native;

#[cfg(feature = "argmin")]
pub use self::argmin::ArgminController;
#[cfg(feature = "minpack")]
pub use self::minpack::MinpackController;
pub use self::native::NativeController;

/// Looks up `name` in `known`, returning the static name on success.
fn find_minimizer(
    software: &'static str,
    known: &'static [&'static str],
    name: &str,
) -> Result<&'static str, crate::ControllerError> {
    known
        .iter()
        .copied()
        .find(|candidate| *candidate == name)
        .ok_or_else(|| crate::ControllerError::UnknownMinimizer {
            software,
            minimizer: name.to_owned(),
        })
}
