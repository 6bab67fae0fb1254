use thiserror::Error;

/// Which of the two submission inputs is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    Cbx,
    Hc,
}

impl std::fmt::Display for InputSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSlot::Cbx => f.write_str("CBX"),
            InputSlot::Hc => f.write_str("HC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("both files required, {0} file missing")]
    MissingFile(InputSlot),
    #[error("{name} must be within 0..=100, got {value}")]
    RatioOutOfRange { name: &'static str, value: u32 },
}

/// Why a job could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a job is already in progress")]
    AlreadyRunning,
    #[error("{0}")]
    Transport(String),
}
