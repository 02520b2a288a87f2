//! Game rules for N×N grids.
//!
//! Pure functions with no failure modes: every input is a well-formed
//! snapshot produced by the state machine.

pub mod bounds;
pub mod draw;
pub mod win;

pub use bounds::validate_coordinates;
pub use draw::is_full;
pub use win::check_winner;
