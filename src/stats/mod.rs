//! Player statistics: the per-player record and the aggregator that
//! folds completed games into it.

mod aggregator;
mod record;

pub use aggregator::StatsAggregator;
pub use record::{ParticipantResult, PlayerStats};
