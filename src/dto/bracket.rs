//! Bracket view model served to the renderer.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    bracket::{
        BracketLayout, DecidedBy, LayoutMetrics, StageKey, Tie,
        layout::{Connector, Slot},
        tie::LegScore,
    },
    dto::{common::TeamSummary, validation::validate_metric},
};

/// Optional pixel metrics; defaults are used for missing values.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BracketQuery {
    /// Width of a tie card.
    pub card_width: Option<f64>,
    /// Height of one row unit.
    pub row_height: Option<f64>,
    /// Horizontal gap between columns.
    pub column_gap: Option<f64>,
}

impl Validate for BracketQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("card_width", self.card_width),
            ("row_height", self.row_height),
            ("column_gap", self.column_gap),
        ] {
            if let Some(Err(e)) = value.map(validate_metric) {
                errors.add(field, e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<&BracketQuery> for LayoutMetrics {
    fn from(query: &BracketQuery) -> Self {
        let defaults = LayoutMetrics::default();
        Self {
            card_width: query.card_width.unwrap_or(defaults.card_width),
            row_height: query.row_height.unwrap_or(defaults.row_height),
            column_gap: query.column_gap.unwrap_or(defaults.column_gap),
        }
    }
}

/// Goals of team 1 and team 2.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct PairScore {
    pub team1: u32,
    pub team2: u32,
}

impl From<(u32, u32)> for PairScore {
    fn from((team1, team2): (u32, u32)) -> Self {
        Self { team1, team2 }
    }
}

/// Normalized score of one leg; goals are absent while the leg is pending.
#[derive(Debug, Serialize, ToSchema, Clone, Copy)]
pub struct LegView {
    pub leg: u8,
    pub match_id: Uuid,
    pub team1: Option<u32>,
    pub team2: Option<u32>,
}

impl From<LegScore> for LegView {
    fn from(leg: LegScore) -> Self {
        Self {
            leg: leg.leg,
            match_id: leg.match_id,
            team1: leg.team1,
            team2: leg.team2,
        }
    }
}

/// How a tie was decided.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecidedByView {
    Aggregate,
    Penalties,
}

impl From<DecidedBy> for DecidedByView {
    fn from(value: DecidedBy) -> Self {
        match value {
            DecidedBy::Aggregate => DecidedByView::Aggregate,
            DecidedBy::Penalties => DecidedByView::Penalties,
        }
    }
}

/// A real tie with its resolved outcome.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TieView {
    pub pairing_id: String,
    pub team1: Option<TeamSummary>,
    pub team2: Option<TeamSummary>,
    pub legs: Vec<LegView>,
    pub aggregate: Option<PairScore>,
    pub penalties: Option<PairScore>,
    pub winner: Option<Uuid>,
    pub decided_by: Option<DecidedByView>,
}

impl From<&Tie> for TieView {
    fn from(tie: &Tie) -> Self {
        let outcome = tie.outcome();
        Self {
            pairing_id: tie.pairing_id.clone(),
            team1: outcome.team1.map(Into::into),
            team2: outcome.team2.map(Into::into),
            legs: outcome.legs.into_iter().map(Into::into).collect(),
            aggregate: outcome.aggregate.map(Into::into),
            penalties: outcome.penalties.map(Into::into),
            winner: outcome.winner,
            decided_by: outcome.decided_by.map(Into::into),
        }
    }
}

/// One card of a column; `tie` is absent for placeholders.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SlotView {
    pub index: usize,
    pub row: u32,
    pub x: f64,
    pub y: f64,
    pub tie: Option<TieView>,
}

/// One column of the bracket.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ColumnView {
    /// Canonical stage key, or the raw label for unrecognized stages.
    pub stage: String,
    /// False for trailing columns built from unrecognized labels.
    pub canonical: bool,
    pub slots: Vec<SlotView>,
}

/// Connector point.
#[derive(Debug, Serialize, ToSchema, Clone, Copy)]
pub struct PointView {
    pub x: f64,
    pub y: f64,
}

/// Orthogonal connector between a card and its parent.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ConnectorView {
    pub from_column: usize,
    pub from_slot: usize,
    pub to_slot: usize,
    pub points: Vec<PointView>,
}

impl From<&Connector> for ConnectorView {
    fn from(connector: &Connector) -> Self {
        Self {
            from_column: connector.from_column,
            from_slot: connector.from_slot,
            to_slot: connector.to_slot,
            points: connector
                .points
                .iter()
                .map(|point| PointView {
                    x: point.x,
                    y: point.y,
                })
                .collect(),
        }
    }
}

/// Full bracket of a tournament.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct BracketResponse {
    /// Tournament the bracket belongs to.
    pub tournament_id: Uuid,
    /// Stage columns from the entry stage to the final.
    pub columns: Vec<ColumnView>,
    /// Lines joining each pair of sibling slots to their next-stage slot.
    pub connectors: Vec<ConnectorView>,
    /// Total drawing width.
    pub width: f64,
    /// Total drawing height.
    pub height: f64,
}

impl BracketResponse {
    /// Project a computed layout into its wire shape.
    pub fn from_layout(tournament_id: Uuid, layout: BracketLayout) -> Self {
        let slot_view = |slot: &Slot| SlotView {
            index: slot.index,
            row: slot.row,
            x: slot.x,
            y: slot.y,
            tie: slot
                .tie
                .and_then(|index| layout.ties.get(index))
                .map(TieView::from),
        };

        let columns = layout
            .columns
            .iter()
            .map(|column| {
                let (stage, canonical) = match &column.stage {
                    StageKey::Known(stage) => (stage.key().to_string(), true),
                    StageKey::ThirdPlace => ("third_place".to_string(), false),
                    StageKey::Other(label) => (label.clone(), false),
                };
                ColumnView {
                    stage,
                    canonical,
                    slots: column.slots.iter().map(slot_view).collect(),
                }
            })
            .collect();

        Self {
            tournament_id,
            columns,
            connectors: layout.connectors.iter().map(ConnectorView::from).collect(),
            width: layout.width,
            height: layout.height,
        }
    }
}
