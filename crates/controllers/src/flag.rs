use std::fmt;

use crate::ControllerAttributeError;

/// The normalized outcome of one fit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExitFlag {
    /// The engine reported convergence.
    Converged,

    /// The engine stopped at its iteration or evaluation limit.
    MaxIterations,

    /// The engine ran but did not satisfy its convergence criteria.
    NotConverged,

    /// The attempt raised an error.
    Exception,
}

impl ExitFlag {
    /// Returns the numeric code, from 0 (converged) to 3 (exception).
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Converged => 0,
            Self::MaxIterations => 1,
            Self::NotConverged => 2,
            Self::Exception => 3,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Converged => "Successfully converged",
            Self::MaxIterations => "Software reported maximum number of iterations exceeded",
            Self::NotConverged => "Software run but didn't converge to solution",
            Self::Exception => "Software raised an exception",
        }
    }

    /// Returns true for flags 0 to 2, where the engine ran to completion.
    #[must_use]
    pub fn completed(self) -> bool {
        self != Self::Exception
    }
}

impl TryFrom<i32> for ExitFlag {
    type Error = ControllerAttributeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Converged),
            1 => Ok(Self::MaxIterations),
            2 => Ok(Self::NotConverged),
            3 => Ok(Self::Exception),
            code => Err(ControllerAttributeError::FlagOutOfRange { code }),
        }
    }
}

impl fmt::Display for ExitFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for flag in [
            ExitFlag::Converged,
            ExitFlag::MaxIterations,
            ExitFlag::NotConverged,
            ExitFlag::Exception,
        ] {
            assert_eq!(ExitFlag::try_from(flag.code()), Ok(flag));
        }
    }

    #[test]
    fn out_of_range_code_is_an_attribute_error() {
        assert_eq!(
            ExitFlag::try_from(4),
            Err(ControllerAttributeError::FlagOutOfRange { code: 4 })
        );
        assert!(ExitFlag::try_from(-1).is_err());
    }

    #[test]
    fn only_exception_is_incomplete() {
        assert!(ExitFlag::NotConverged.completed());
        assert!(!ExitFlag::Exception.completed());
        assert_eq!(ExitFlag::Exception.to_string(), "Software raised an exception");
    }
}
