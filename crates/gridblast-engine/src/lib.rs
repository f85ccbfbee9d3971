pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a placement request was rejected.
///
/// All variants are locally recoverable: the board, queue, and score are left
/// untouched when a placement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    /// The referenced piece is not in the active queue, or the footprint
    /// would leave the board or overlap a filled cell.
    #[display("piece cannot be placed at the requested position")]
    InvalidPosition,
    /// Placement attempted while the session is paused.
    #[display("placement attempted while paused")]
    GamePaused,
    /// Placement attempted after the session reached game over.
    #[display("placement attempted after game over")]
    GameOver,
}
