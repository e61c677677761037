//! Column/row placement of ties and the connector paths between them.
//!
//! Rows follow a binary layout: in relative column `c`, slot `i` sits on row
//! `2^c + i * 2^(c+1)`, so every card is centered between its two feeders. A card on row `r`
//! spans `[(r - 1) * row_height, r * row_height)`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::bracket::{
    stage::{Stage, StageKey},
    tie::{Tie, compare_pairing_ids},
};

/// Pixel metrics of the rendered bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Width of a tie card.
    pub card_width: f64,
    /// Height of one row unit.
    pub row_height: f64,
    /// Horizontal gap between two columns.
    pub column_gap: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            card_width: 220.0,
            row_height: 56.0,
            column_gap: 48.0,
        }
    }
}

/// Point of a connector path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// One cell of a column: a real tie or a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Index of the tie in [`BracketLayout::ties`]; `None` for placeholders.
    pub tie: Option<usize>,
    /// Slot index within the column.
    pub index: usize,
    /// Row of the card.
    pub row: u32,
    /// Left edge of the card.
    pub x: f64,
    /// Top edge of the card.
    pub y: f64,
}

impl Slot {
    /// Vertical midpoint of the card.
    pub fn mid_y(&self, metrics: &LayoutMetrics) -> f64 {
        self.y + metrics.row_height / 2.0
    }
}

/// One displayed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Stage of the column.
    pub stage: StageKey,
    /// Slots from top to bottom.
    pub slots: Vec<Slot>,
}

/// Orthogonal path from a card's output edge to its parent's input edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Column of the child card.
    pub from_column: usize,
    /// Slot of the child card.
    pub from_slot: usize,
    /// Slot of the parent card in the next column.
    pub to_slot: usize,
    /// Horizontal, vertical then horizontal segments.
    pub points: [Point; 4],
}

/// Complete positional layout of a bracket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BracketLayout {
    /// Real ties referenced by the slots.
    pub ties: Vec<Tie>,
    /// Displayed columns, left to right.
    pub columns: Vec<Column>,
    /// Connector paths.
    pub connectors: Vec<Connector>,
    /// Overall width.
    pub width: f64,
    /// Overall height.
    pub height: f64,
}

/// Lay out `ties`.
///
/// `entry_stage` is the first main-bracket stage of the tournament; stages between it and the
/// earliest stage holding real ties are shown as placeholder columns.
pub fn layout(ties: Vec<Tie>, entry_stage: Option<Stage>, metrics: LayoutMetrics) -> BracketLayout {
    let mut known: HashMap<Stage, Vec<usize>> = HashMap::new();
    let mut others: Vec<(String, Vec<usize>)> = Vec::new();

    for (index, tie) in ties.iter().enumerate() {
        match &tie.stage {
            StageKey::Known(stage) => known.entry(*stage).or_default().push(index),
            StageKey::ThirdPlace => {}
            StageKey::Other(label) => {
                match others.iter_mut().find(|(existing, _)| existing == label) {
                    Some((_, members)) => members.push(index),
                    None => others.push((label.clone(), vec![index])),
                }
            }
        }
    }

    let chain = stage_chain(&known, entry_stage);
    let slot_counts = slot_counts(&chain, &known);
    let ordered = order_chain(&chain, &slot_counts, &known, &ties);

    let mut columns: Vec<Column> = Vec::with_capacity(chain.len() + others.len());
    for (c, (stage, cells)) in chain.iter().zip(ordered).enumerate() {
        columns.push(Column {
            stage: StageKey::Known(*stage),
            slots: place(c, c, cells, &metrics),
        });
    }
    for (label, mut members) in others {
        members.sort_by(|a, b| compare_pairing_ids(&ties[*a].pairing_id, &ties[*b].pairing_id));
        let c = columns.len();
        columns.push(Column {
            stage: StageKey::Other(label),
            slots: place(c, 0, members.into_iter().map(Some).collect(), &metrics),
        });
    }

    let connectors = connectors(&columns[..chain.len()], &metrics);

    let width = if columns.is_empty() {
        0.0
    } else {
        columns.len() as f64 * (metrics.card_width + metrics.column_gap) - metrics.column_gap
    };
    let height = columns
        .iter()
        .flat_map(|column| column.slots.iter())
        .map(|slot| f64::from(slot.row) * metrics.row_height)
        .fold(0.0, f64::max);

    BracketLayout {
        ties,
        columns,
        connectors,
        width,
        height,
    }
}

/// Main-bracket stages to display, from the first one down to the final.
fn stage_chain(known: &HashMap<Stage, Vec<usize>>, entry_stage: Option<Stage>) -> Vec<Stage> {
    let earliest_main = Stage::ALL
        .iter()
        .copied()
        .filter(|stage| *stage != Stage::Preliminary)
        .find(|stage| known.contains_key(stage));
    let preliminary = known.get(&Stage::Preliminary).map(Vec::len);

    let entry_stage = entry_stage.filter(|stage| *stage != Stage::Preliminary);
    let start = match (earliest_main, entry_stage, preliminary) {
        (Some(real), Some(entry), _) => Some(real.min(entry)),
        (Some(real), None, _) => Some(real),
        (None, Some(entry), Some(_)) => Some(entry),
        (None, None, Some(count)) => Some(Stage::for_ties(count.div_ceil(2))),
        (None, _, None) => None,
    };
    let Some(start) = start else {
        return Vec::new();
    };

    let mut chain = Vec::new();
    if preliminary.is_some() {
        chain.push(Stage::Preliminary);
    }
    let mut stage = Some(start);
    while let Some(current) = stage {
        chain.push(current);
        stage = current.next();
    }
    chain
}

/// Slot count of every column of the chain.
fn slot_counts(chain: &[Stage], known: &HashMap<Stage, Vec<usize>>) -> Vec<usize> {
    let real = |stage: &Stage| known.get(stage).map_or(0, Vec::len);
    let first_real = chain
        .iter()
        .position(|stage| *stage != Stage::Preliminary && real(stage) > 0);

    let mut counts: Vec<usize> = Vec::with_capacity(chain.len());
    for (c, stage) in chain.iter().enumerate() {
        let count = if *stage == Stage::Preliminary {
            real(stage)
        } else {
            match first_real {
                Some(first) if c < first => {
                    real(&chain[first]) << (first - c).min(usize::BITS as usize - 1)
                }
                Some(first) if c == first => real(stage),
                _ => {
                    let previous = counts.last().copied().unwrap_or(0);
                    real(stage).max(previous.div_ceil(2)).max(1)
                }
            }
        };
        counts.push(count);
    }
    counts
}

/// Assign real ties to slots, walking from the final backwards so feeders of a tie land in
/// the two slots under it.
fn order_chain(
    chain: &[Stage],
    counts: &[usize],
    known: &HashMap<Stage, Vec<usize>>,
    ties: &[Tie],
) -> Vec<Vec<Option<usize>>> {
    let team_ids: Vec<Vec<Uuid>> = ties.iter().map(Tie::team_ids).collect();
    let mut ordered: Vec<Vec<Option<usize>>> = vec![Vec::new(); chain.len()];

    for c in (0..chain.len()).rev() {
        let mut members = known.get(&chain[c]).cloned().unwrap_or_default();
        members.sort_by(|a, b| compare_pairing_ids(&ties[*a].pairing_id, &ties[*b].pairing_id));

        let mut cells: Vec<Option<usize>> = vec![None; counts[c].max(members.len())];
        let mut placed = vec![false; members.len()];

        if let Some(parents) = ordered.get(c + 1) {
            for (parent_slot, parent) in parents.iter().enumerate() {
                let Some(parent) = parent else {
                    continue;
                };
                let feeders = members.iter().enumerate().filter(|(position, tie)| {
                    !placed[*position]
                        && team_ids[**tie]
                            .iter()
                            .any(|id| team_ids[*parent].contains(id))
                });
                let wanted: Vec<(usize, usize)> =
                    feeders.map(|(position, tie)| (position, *tie)).take(2).collect();

                for (offset, (position, tie)) in wanted.into_iter().enumerate() {
                    let target = parent_slot * 2 + offset;
                    if cells.get(target).is_some_and(Option::is_none) {
                        cells[target] = Some(tie);
                        placed[position] = true;
                    }
                }
            }
        }

        for (position, tie) in members.iter().enumerate() {
            if placed[position] {
                continue;
            }
            if let Some(free) = cells.iter().position(Option::is_none) {
                cells[free] = Some(*tie);
            }
        }

        ordered[c] = cells;
    }

    ordered
}

/// Position the cells of one column. `c` is the column position, `level` its binary depth.
fn place(c: usize, level: usize, cells: Vec<Option<usize>>, metrics: &LayoutMetrics) -> Vec<Slot> {
    let level = level.min(30) as u32;
    let x = c as f64 * (metrics.card_width + metrics.column_gap);

    cells
        .into_iter()
        .enumerate()
        .map(|(index, tie)| {
            let row = (1u32 << level) + index as u32 * (1u32 << (level + 1));
            Slot {
                tie,
                index,
                row,
                x,
                y: f64::from(row - 1) * metrics.row_height,
            }
        })
        .collect()
}

/// Paths from every main-bracket card to its parent (slot `i / 2` of the next column).
fn connectors(columns: &[Column], metrics: &LayoutMetrics) -> Vec<Connector> {
    columns
        .windows(2)
        .enumerate()
        .flat_map(|(from_column, pair)| {
            let (children, parents) = (&pair[0], &pair[1]);
            children.slots.iter().filter_map(move |child| {
                let parent = parents.slots.get(child.index / 2)?;
                let start_x = child.x + metrics.card_width;
                let mid_x = start_x + metrics.column_gap / 2.0;
                let child_y = child.mid_y(metrics);
                let parent_y = parent.mid_y(metrics);

                Some(Connector {
                    from_column,
                    from_slot: child.index,
                    to_slot: parent.index,
                    points: [
                        Point { x: start_x, y: child_y },
                        Point { x: mid_x, y: child_y },
                        Point { x: mid_x, y: parent_y },
                        Point { x: parent.x, y: parent_y },
                    ],
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::tie::{
        group_ties,
        tests::{played, team},
    };
    use crate::dao::models::TeamRef;

    fn stages(layout: &BracketLayout) -> Vec<StageKey> {
        layout.columns.iter().map(|c| c.stage.clone()).collect()
    }

    fn slot_counts_of(layout: &BracketLayout) -> Vec<usize> {
        layout.columns.iter().map(|c| c.slots.len()).collect()
    }

    fn teams(count: usize) -> Vec<TeamRef> {
        (0..count).map(|i| team(&format!("T{i}"))).collect()
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let layout = layout(Vec::new(), None, LayoutMetrics::default());
        assert!(layout.columns.is_empty());
        assert!(layout.connectors.is_empty());
        assert_eq!(layout.width, 0.0);
    }

    #[test]
    fn semifinals_only_with_entry_stage_synthesize_quarterfinals() {
        let t = teams(4);
        let matches = vec![
            played("1", "Semifinal", None, (&t[0], 2), (&t[1], 1)),
            played("2", "Semifinal", None, (&t[2], 0), (&t[3], 1)),
        ];

        let layout = layout(
            group_ties(&matches),
            Some(Stage::Quarterfinal),
            LayoutMetrics::default(),
        );

        assert_eq!(
            stages(&layout),
            vec![
                StageKey::Known(Stage::Quarterfinal),
                StageKey::Known(Stage::Semifinal),
                StageKey::Known(Stage::Final),
            ]
        );
        assert_eq!(slot_counts_of(&layout), vec![4, 2, 1]);
        assert!(layout.columns[0].slots.iter().all(|s| s.tie.is_none()));
        assert!(layout.columns[1].slots.iter().all(|s| s.tie.is_some()));
        assert!(layout.columns[2].slots[0].tie.is_none());
    }

    #[test]
    fn columns_have_no_gaps_down_to_the_final() {
        let t = teams(6);
        let matches = vec![
            played("1", "Oitavas de final", None, (&t[0], 1), (&t[1], 0)),
            played("2", "Oitavas de final", None, (&t[2], 1), (&t[3], 0)),
            played("3", "Oitavas de final", None, (&t[4], 1), (&t[5], 0)),
            played("9", "Final", None, (&t[0], 1), (&t[2], 0)),
        ];

        let layout = layout(group_ties(&matches), None, LayoutMetrics::default());
        assert_eq!(
            stages(&layout),
            vec![
                StageKey::Known(Stage::RoundOf16),
                StageKey::Known(Stage::Quarterfinal),
                StageKey::Known(Stage::Semifinal),
                StageKey::Known(Stage::Final),
            ]
        );
        let counts = slot_counts_of(&layout);
        assert_eq!(counts, vec![3, 2, 1, 1]);
        for pair in counts.windows(2) {
            assert!(pair[1] >= pair[0].div_ceil(2));
        }
    }

    #[test]
    fn feeders_sit_under_their_parent() {
        let t = teams(8);
        // Pairing ids deliberately out of bracket order.
        let matches = vec![
            played("1", "Quartas", None, (&t[0], 1), (&t[1], 0)),
            played("2", "Quartas", None, (&t[2], 1), (&t[3], 0)),
            played("3", "Quartas", None, (&t[4], 1), (&t[5], 0)),
            played("4", "Quartas", None, (&t[6], 1), (&t[7], 0)),
            played("10", "Semi", None, (&t[0], 0), (&t[4], 1)),
            played("11", "Semi", None, (&t[2], 0), (&t[6], 1)),
        ];

        let layout = layout(group_ties(&matches), None, LayoutMetrics::default());
        let pairing = |column: usize, slot: usize| {
            let tie = layout.columns[column].slots[slot].tie.unwrap();
            layout.ties[tie].pairing_id.clone()
        };

        assert_eq!(pairing(1, 0), "10");
        assert_eq!(pairing(1, 1), "11");
        assert_eq!(
            [pairing(0, 0), pairing(0, 1), pairing(0, 2), pairing(0, 3)],
            ["1", "3", "2", "4"]
        );
    }

    #[test]
    fn rows_follow_the_binary_layout() {
        let t = teams(8);
        let matches: Vec<_> = (0..4)
            .map(|i| {
                played(
                    &i.to_string(),
                    "Quarterfinal",
                    None,
                    (&t[2 * i], 1),
                    (&t[2 * i + 1], 0),
                )
            })
            .collect();

        let layout = layout(group_ties(&matches), None, LayoutMetrics::default());
        let rows: Vec<Vec<u32>> = layout
            .columns
            .iter()
            .map(|c| c.slots.iter().map(|s| s.row).collect())
            .collect();
        assert_eq!(rows, vec![vec![1, 3, 5, 7], vec![2, 6], vec![4]]);
    }

    #[test]
    fn connectors_end_at_card_midpoints() {
        let metrics = LayoutMetrics {
            card_width: 100.0,
            row_height: 40.0,
            column_gap: 20.0,
        };
        let t = teams(4);
        let matches = vec![
            played("1", "Semifinal", None, (&t[0], 1), (&t[1], 0)),
            played("2", "Semifinal", None, (&t[2], 1), (&t[3], 0)),
        ];

        let layout = layout(group_ties(&matches), None, metrics);
        assert_eq!(layout.connectors.len(), 2);

        for connector in &layout.connectors {
            let child = &layout.columns[connector.from_column].slots[connector.from_slot];
            let parent = &layout.columns[connector.from_column + 1].slots[connector.to_slot];
            let [start, bend, turn, end] = connector.points;

            assert_eq!(start.x, child.x + metrics.card_width);
            assert_eq!(start.y, child.mid_y(&metrics));
            assert_eq!(bend.y, start.y);
            assert_eq!(bend.x, turn.x);
            assert_eq!(turn.y, end.y);
            assert_eq!(end.x, parent.x);
            assert_eq!(end.y, parent.mid_y(&metrics));
        }

        // Parent midpoint sits halfway between its feeders.
        let top = layout.connectors[0].points[0].y;
        let bottom = layout.connectors[1].points[0].y;
        assert_eq!(layout.connectors[0].points[3].y, (top + bottom) / 2.0);
        assert_eq!(layout.width, 220.0);
        assert_eq!(layout.height, 120.0);
    }

    #[test]
    fn third_place_is_excluded_and_unknown_stages_trail() {
        let t = teams(6);
        let matches = vec![
            played("1", "Final", None, (&t[0], 1), (&t[1], 0)),
            played("2", "Terceiro lugar", None, (&t[2], 1), (&t[3], 0)),
            played("3", "Repescagem", None, (&t[4], 1), (&t[5], 0)),
        ];

        let layout = layout(group_ties(&matches), None, LayoutMetrics::default());
        assert_eq!(
            stages(&layout),
            vec![
                StageKey::Known(Stage::Final),
                StageKey::Other("Repescagem".into()),
            ]
        );
        assert!(layout.connectors.is_empty());
    }

    #[test]
    fn preliminary_round_precedes_the_main_bracket() {
        let t = teams(6);
        let matches = vec![
            played("1", "Preliminar", None, (&t[0], 1), (&t[1], 0)),
            played("2", "Preliminar", None, (&t[2], 1), (&t[3], 0)),
            played("3", "Preliminar", None, (&t[4], 1), (&t[5], 0)),
        ];

        let layout = layout(group_ties(&matches), None, LayoutMetrics::default());
        assert_eq!(
            stages(&layout),
            vec![
                StageKey::Known(Stage::Preliminary),
                StageKey::Known(Stage::Semifinal),
                StageKey::Known(Stage::Final),
            ]
        );
        assert_eq!(slot_counts_of(&layout), vec![3, 2, 1]);
    }
}
