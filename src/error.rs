use thiserror::Error;

/// Failures surfaced to the user. Per-parse and per-interpretation errors
/// are captured and suppressed while any sibling succeeds; otherwise the
/// first one wins. Physics-violating goal literals are filtered silently and
/// never reach this type.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("no parse could be interpreted against this world")]
    NoInterpretation,
    #[error("illegal reference: {0}")]
    IllegalReference(String),
    #[error("no sequence of arm actions reaches the goal")]
    NoPlan,
    #[error("search exceeded its time budget")]
    SearchTimeout,
    #[error("invalid world: {0}")]
    InvalidWorld(String),
}
