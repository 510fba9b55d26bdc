use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position ({row}, {col}) is outside the 3x3 board")]
    InvalidPosition { row: u8, col: u8 },
    #[error("Tally state is inconsistent: {reason}")]
    CorruptState { reason: &'static str },
}

pub type Result<T> = core::result::Result<T, GameError>;
