//! Stage labels: canonical vocabulary and normalization of free-text labels.

use std::fmt;

/// Canonical elimination stages, ordered from the earliest round to the final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Play-in round ahead of the main bracket.
    Preliminary,
    /// 64 teams left.
    RoundOf64,
    /// 32 teams left.
    RoundOf32,
    /// 16 teams left.
    RoundOf16,
    /// Quarter-finals.
    Quarterfinal,
    /// Semi-finals.
    Semifinal,
    /// Final.
    Final,
}

impl Stage {
    /// Every stage in bracket order.
    pub const ALL: [Stage; 7] = [
        Stage::Preliminary,
        Stage::RoundOf64,
        Stage::RoundOf32,
        Stage::RoundOf16,
        Stage::Quarterfinal,
        Stage::Semifinal,
        Stage::Final,
    ];

    /// Stable identifier used in API payloads.
    pub fn key(self) -> &'static str {
        match self {
            Stage::Preliminary => "preliminary",
            Stage::RoundOf64 => "round_of_64",
            Stage::RoundOf32 => "round_of_32",
            Stage::RoundOf16 => "round_of_16",
            Stage::Quarterfinal => "quarterfinal",
            Stage::Semifinal => "semifinal",
            Stage::Final => "final",
        }
    }

    /// Number of ties the stage holds in a full bracket; the preliminary round has no fixed size.
    pub fn capacity(self) -> Option<usize> {
        match self {
            Stage::Preliminary => None,
            Stage::RoundOf64 => Some(32),
            Stage::RoundOf32 => Some(16),
            Stage::RoundOf16 => Some(8),
            Stage::Quarterfinal => Some(4),
            Stage::Semifinal => Some(2),
            Stage::Final => Some(1),
        }
    }

    /// Next stage towards the final.
    pub fn next(self) -> Option<Stage> {
        Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .and_then(|index| Self::ALL.get(index + 1))
            .copied()
    }

    /// Smallest main-bracket stage able to hold `ties` ties.
    pub fn for_ties(ties: usize) -> Stage {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|stage| stage.capacity().is_some_and(|capacity| capacity >= ties))
            .unwrap_or(Stage::RoundOf64)
    }

    /// First main-bracket stage of a knockout with `team_count` teams.
    pub fn entry_for_team_count(team_count: u32) -> Option<Stage> {
        if team_count < 2 {
            return None;
        }
        let ties = usize::try_from(team_count.div_ceil(2)).ok()?;
        Some(Self::for_ties(ties))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of normalizing a raw stage label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StageKey {
    /// Recognized main-bracket stage.
    Known(Stage),
    /// Third-place play-off, left out of the bracket.
    ThirdPlace,
    /// Label matching no known synonym, kept verbatim.
    Other(String),
}

/// Synonyms checked in order; more specific patterns come first because e.g. "quartas de final"
/// also contains "final".
const SYNONYMS: &[(&[&str], Option<Stage>)] = &[
    (&["terceir", "3o lugar", "third", "3rd"], None),
    (&["semi"], Some(Stage::Semifinal)),
    (&["quarta", "quarter"], Some(Stage::Quarterfinal)),
    (
        &["32 avos", "trigesimo", "round of 64", "r64"],
        Some(Stage::RoundOf64),
    ),
    (
        &["16 avos", "dezesseis avos", "round of 32", "r32"],
        Some(Stage::RoundOf32),
    ),
    (&["oitava", "round of 16", "r16"], Some(Stage::RoundOf16)),
    (&["prelim", "play in"], Some(Stage::Preliminary)),
    (&["final"], Some(Stage::Final)),
];

/// Normalize a free-text stage label.
pub fn canonicalize(raw: &str) -> StageKey {
    let normalized = normalize(raw);

    for (patterns, stage) in SYNONYMS {
        if patterns.iter().any(|pattern| normalized.contains(pattern)) {
            return match stage {
                Some(stage) => StageKey::Known(*stage),
                None => StageKey::ThirdPlace,
            };
        }
    }

    StageKey::Other(raw.trim().to_string())
}

/// Lower-case, strip accents and collapse separators into single spaces.
fn normalize(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ª' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'º' | '°' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
