//! Game engine logic and turn orchestration.
//!
//! This module layers the gameplay rules on top of the core data structures:
//!
//! - [`PieceGenerator`] / [`PieceQueue`] - random piece generation and the
//!   3-slot offer queue
//! - [`apply_power`] - area-effect resolution for power cells
//! - [`resolve`] - full-line detection, clearing, and combo scoring
//! - [`GameStats`] - cumulative session counters
//! - [`GameSession`] - the session controller exposed to callers
//!
//! # Turn Flow
//!
//! A turn progresses as follows:
//!
//! 1. The caller picks a queued piece and an origin and calls
//!    [`GameSession::try_place`]
//! 2. The piece is stamped onto the board; each power-tagged cell fires its
//!    effect in stamp order
//! 3. Full rows and columns are cleared and scored, repeating until a pass
//!    clears nothing
//! 4. The queue refills once emptied, and game over is re-evaluated
//!
//! The whole outcome of a placement is computed synchronously in one call and
//! returned as a [`PlacementReport`]; callers replay its sub-events on
//! whatever timeline they choose.

pub use self::{clear::*, game_session::*, game_stats::*, piece_queue::*, power::*};

mod clear;
mod game_session;
mod game_stats;
mod piece_queue;
mod power;
