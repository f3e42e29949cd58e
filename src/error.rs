//! Error type shared by every operation on traces.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Storage for steps or domains could not be grown.
    /// The trace is left as it was before the call.
    #[error("allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),
    /// A trace is not a legal path through the state machine,
    /// or its begin/end states are unbalanced.
    #[error("{}", structural_message(.step, .msg))]
    Structural { step: Option<usize>, msg: String },
    /// The trace reaches beyond the model or the sequence it is paired with.
    #[error("{what}: trace needs {trace}, but only {available} available")]
    DimensionMismatch {
        what: &'static str,
        trace: usize,
        available: usize,
    },
    #[error("malformed alignment: {0}")]
    MalformedAlignment(String),
    /// Scoring an empty trace. There is no path, which is not the same as a score of -inf.
    #[error("no path: trace is empty")]
    NoPath,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn structural_message(step: &Option<usize>, msg: &str) -> String {
    match step {
        Some(z) => format!("invalid trace at step {}: {}", z, msg),
        None => format!("invalid trace: {}", msg),
    }
}

impl Error {
    pub(crate) fn structural<S: Into<String>>(step: usize, msg: S) -> Self {
        Error::Structural {
            step: Some(step),
            msg: msg.into(),
        }
    }
    /// The step index a structural error points at, if any.
    pub fn step(&self) -> Option<usize> {
        match self {
            Error::Structural { step, .. } => *step,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn structural_message_cites_step() {
        let err = Error::structural(4, "DG1 must follow G, found L->DG");
        assert_eq!(err.step(), Some(4));
        let msg = format!("{}", err);
        assert!(msg.contains("step 4"), "{}", msg);
        assert!(msg.contains("L->DG"), "{}", msg);
        assert_eq!(Error::NoPath.step(), None);
    }
}
