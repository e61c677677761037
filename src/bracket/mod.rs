//! Elimination bracket projection: ties, winners and a renderable layout.
//!
//! Everything here is a pure function of the match list; nothing is persisted.

pub mod layout;
pub mod stage;
pub mod tie;

use crate::dao::models::MatchEntity;

pub use self::layout::{BracketLayout, LayoutMetrics};
pub use self::stage::{Stage, StageKey};
pub use self::tie::{DecidedBy, Tie, TieOutcome};

/// Group `matches` into ties and lay them out.
pub fn build_bracket(
    matches: &[MatchEntity],
    entry_stage: Option<Stage>,
    metrics: LayoutMetrics,
) -> BracketLayout {
    layout::layout(tie::group_ties(matches), entry_stage, metrics)
}
