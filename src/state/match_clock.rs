//! Clock and scoring state machine for a single match.
//!
//! Every transition of the phase table goes through [`MatchClock::next_phase`]; the timer
//! running out and the manual "end period" control both reach it through
//! [`MatchClock::request_phase_end`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    dao::models::{EndedIn, MatchPatch, PenaltyRecord},
    state::{
        rules::MatchRules,
        shootout::{Shootout, ShootoutError},
    },
};

/// One of the two sides of a match. Side A is the home team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Side {
    /// Home side.
    #[serde(rename = "a")]
    A,
    /// Away side.
    #[serde(rename = "b")]
    B,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Goals for side A and side B.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Score {
    /// Goals of side A.
    pub a: u32,
    /// Goals of side B.
    pub b: u32,
}

impl Score {
    fn side_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}

/// Phases a match goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchPhase {
    /// First regulation half.
    FirstHalf,
    /// Second regulation half.
    SecondHalf,
    /// First half of extra time.
    ExtraFirst,
    /// Second half of extra time.
    ExtraSecond,
    /// Penalty shoot-out.
    PenaltyShootout,
    /// Result is final.
    Closed,
}

impl MatchPhase {
    /// Whether the phase is timed by the countdown.
    pub fn has_countdown(self) -> bool {
        matches!(
            self,
            MatchPhase::FirstHalf
                | MatchPhase::SecondHalf
                | MatchPhase::ExtraFirst
                | MatchPhase::ExtraSecond
        )
    }
}

/// Why the current period is being ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEndReason {
    /// The countdown reached zero.
    AutoTimeout,
    /// The operator pressed "end period"; nothing happens unless they confirmed.
    ManualConfirm {
        /// Whether the operator confirmed the prompt.
        confirmed: bool,
    },
}

/// Events driving the phase table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The current period is over.
    PeriodEnd,
    /// The shoot-out has a winner.
    ShootoutDecided,
    /// The operator ends the match immediately.
    EndMatch,
    /// The operator reopens a closed match.
    Reopen,
}

/// Audible/visual cue the scoreboard should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A new period starts.
    PeriodStart,
    /// A goal was scored.
    Goal,
    /// The match is over.
    FinalWhistle,
}

/// Side effects requested by a successful clock operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEffect {
    /// The phase changed.
    PhaseChanged {
        /// Previous phase.
        from: MatchPhase,
        /// New phase.
        to: MatchPhase,
    },
    /// Play a cue.
    Cue(Cue),
    /// Write the final result to storage.
    Persist(MatchPatch),
}

/// Error returned when an event has no transition from the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase when the event was received.
    pub from: MatchPhase,
    /// Rejected event.
    pub event: ClockEvent,
}

/// Rejected clock operations. A rejected operation never changes the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    /// The match is closed; only reopening is allowed.
    #[error("the match is closed")]
    Closed,
    /// Regular goals cannot change during the shoot-out.
    #[error("goals cannot be changed during the penalty shoot-out")]
    PenaltyPhase,
    /// The side has no goal to remove.
    #[error("side {0:?} has no goals to remove")]
    GoalsAtZero(Side),
    /// Manual period end was not confirmed.
    #[error("ending the period requires confirmation")]
    ConfirmationRequired,
    /// The match cannot be ended while the shoot-out has no winner.
    #[error("the penalty shoot-out is not decided yet")]
    ShootoutUndecided,
    /// The current phase has no countdown.
    #[error("{0:?} has no countdown")]
    NoCountdown(MatchPhase),
    /// A penalty kick outside the shoot-out.
    #[error("no penalty shoot-out in progress")]
    NotInShootout,
    /// Shoot-out rejected the kick.
    #[error(transparent)]
    Shootout(#[from] ShootoutError),
    /// No transition exists for the event.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Direction of a goal adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalChange {
    /// Add a goal.
    Increment,
    /// Remove a goal.
    Decrement,
}

/// Read-only view of a shoot-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShootoutSnapshot {
    /// Regulation kicks per side.
    pub regulation_kicks: u32,
    /// Tallies in persisted shape.
    pub record: PenaltyRecord,
    /// Side due to kick.
    pub turn: Side,
    /// Whether sudden death is running.
    pub alternating: bool,
    /// Whether a winner is known.
    pub finished: bool,
}

/// Read-only view of the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase.
    pub phase: MatchPhase,
    /// Seconds left in the current period.
    pub seconds_remaining: u32,
    /// Whether the countdown is ticking.
    pub running: bool,
    /// Regular goals.
    pub score: Score,
    /// Ongoing shoot-out, if any.
    pub shootout: Option<ShootoutSnapshot>,
    /// Final shoot-out tallies of a closed match decided on penalties.
    pub penalties: Option<PenaltyRecord>,
    /// Incremented on every successful operation.
    pub version: usize,
}

/// Clock, score and phase of one match.
#[derive(Debug, Clone)]
pub struct MatchClock {
    rules: MatchRules,
    phase: MatchPhase,
    seconds_remaining: u32,
    running: bool,
    score: Score,
    shootout: Option<Shootout>,
    penalties: Option<PenaltyRecord>,
    played_extra_time: bool,
    version: usize,
}

impl MatchClock {
    /// New clock at kick-off.
    pub fn new(rules: MatchRules) -> Self {
        Self {
            rules,
            phase: MatchPhase::FirstHalf,
            seconds_remaining: rules.half_duration_secs,
            running: false,
            score: Score::default(),
            shootout: None,
            penalties: None,
            played_extra_time: false,
            version: 0,
        }
    }

    /// Clock for a stored match. A closed match opens as `Closed`, otherwise play resumes at
    /// kick-off with the stored score.
    pub fn resume(
        rules: MatchRules,
        score: Score,
        closed: bool,
        penalties: Option<PenaltyRecord>,
    ) -> Self {
        let mut clock = Self::new(rules);
        clock.score = score;
        if closed {
            clock.phase = MatchPhase::Closed;
            clock.seconds_remaining = 0;
            clock.penalties = penalties;
        }
        clock
    }

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Whether the countdown is ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the result is final.
    pub fn is_closed(&self) -> bool {
        self.phase == MatchPhase::Closed
    }

    /// Rules the clock was opened with.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Create a snapshot of the clock.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            running: self.running,
            score: self.score,
            shootout: self.shootout.as_ref().map(|shootout| ShootoutSnapshot {
                regulation_kicks: shootout.regulation_kicks(),
                record: shootout.record(),
                turn: shootout.turn(),
                alternating: shootout.is_alternating(),
                finished: shootout.is_finished(),
            }),
            penalties: self.penalties,
            version: self.version,
        }
    }

    /// Start or resume the countdown.
    pub fn start(&mut self) -> Result<(), ClockError> {
        self.ensure_open()?;
        if !self.phase.has_countdown() {
            return Err(ClockError::NoCountdown(self.phase));
        }
        self.running = true;
        self.version += 1;
        Ok(())
    }

    /// Pause the countdown.
    pub fn pause(&mut self) -> Result<(), ClockError> {
        self.ensure_open()?;
        self.running = false;
        self.version += 1;
        Ok(())
    }

    /// Advance the countdown by one second; reaching zero ends the period.
    pub fn tick(&mut self) -> Result<Vec<ClockEffect>, ClockError> {
        if !self.running {
            return Ok(Vec::new());
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        self.version += 1;
        if self.seconds_remaining > 0 {
            return Ok(Vec::new());
        }

        self.running = false;
        self.request_phase_end(PhaseEndReason::AutoTimeout)
    }

    /// Add or remove a regular goal.
    pub fn adjust_goal(
        &mut self,
        side: Side,
        change: GoalChange,
    ) -> Result<Vec<ClockEffect>, ClockError> {
        self.ensure_open()?;
        if self.phase == MatchPhase::PenaltyShootout {
            return Err(ClockError::PenaltyPhase);
        }

        let goals = self.score.side_mut(side);
        let effects = match change {
            GoalChange::Increment => {
                *goals += 1;
                vec![ClockEffect::Cue(Cue::Goal)]
            }
            GoalChange::Decrement => {
                if *goals == 0 {
                    return Err(ClockError::GoalsAtZero(side));
                }
                *goals -= 1;
                Vec::new()
            }
        };
        self.version += 1;
        Ok(effects)
    }

    /// End the current period, following the phase table.
    pub fn request_phase_end(
        &mut self,
        reason: PhaseEndReason,
    ) -> Result<Vec<ClockEffect>, ClockError> {
        if reason == (PhaseEndReason::ManualConfirm { confirmed: false }) {
            return Err(ClockError::ConfirmationRequired);
        }
        self.ensure_open()?;

        let next = self.next_phase(ClockEvent::PeriodEnd)?;
        Ok(self.enter(next))
    }

    /// Close the match immediately.
    pub fn end_match(&mut self) -> Result<Vec<ClockEffect>, ClockError> {
        self.ensure_open()?;
        if self
            .shootout
            .as_ref()
            .is_some_and(|shootout| !shootout.is_finished())
        {
            return Err(ClockError::ShootoutUndecided);
        }

        let next = self.next_phase(ClockEvent::EndMatch)?;
        Ok(self.enter(next))
    }

    /// Record a shoot-out kick for `side`.
    pub fn take_penalty(
        &mut self,
        side: Side,
        converted: bool,
    ) -> Result<Vec<ClockEffect>, ClockError> {
        self.ensure_open()?;
        let shootout = self.shootout.as_mut().ok_or(ClockError::NotInShootout)?;
        shootout.take_kick(side, converted)?;
        self.version += 1;

        if !shootout.is_finished() {
            return Ok(Vec::new());
        }
        let next = self.next_phase(ClockEvent::ShootoutDecided)?;
        Ok(self.enter(next))
    }

    /// Reopen a closed match: back to kick-off with the current score.
    pub fn reopen(&mut self) -> Result<Vec<ClockEffect>, ClockError> {
        let next = self.next_phase(ClockEvent::Reopen)?;
        Ok(self.enter(next))
    }

    /// Compute a transition from an event if the transition is valid.
    fn next_phase(&self, event: ClockEvent) -> Result<MatchPhase, InvalidTransition> {
        let needs_tie_break = self.rules.tie_break.needs_tie_break(self.score);

        let next = match (self.phase, event) {
            (MatchPhase::FirstHalf, ClockEvent::PeriodEnd) => MatchPhase::SecondHalf,
            (MatchPhase::SecondHalf, ClockEvent::PeriodEnd) => {
                match (needs_tie_break, self.rules.extra_time_half_secs) {
                    (true, Some(_)) => MatchPhase::ExtraFirst,
                    (true, None) => MatchPhase::PenaltyShootout,
                    (false, _) => MatchPhase::Closed,
                }
            }
            (MatchPhase::ExtraFirst, ClockEvent::PeriodEnd) => MatchPhase::ExtraSecond,
            (MatchPhase::ExtraSecond, ClockEvent::PeriodEnd) if needs_tie_break => {
                MatchPhase::PenaltyShootout
            }
            (MatchPhase::ExtraSecond, ClockEvent::PeriodEnd) => MatchPhase::Closed,
            (MatchPhase::PenaltyShootout, ClockEvent::ShootoutDecided) => MatchPhase::Closed,
            (phase, ClockEvent::EndMatch) if phase != MatchPhase::Closed => MatchPhase::Closed,
            (MatchPhase::Closed, ClockEvent::Reopen) => MatchPhase::FirstHalf,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }

    /// Move to `next`, seeding its period and collecting the side effects.
    fn enter(&mut self, next: MatchPhase) -> Vec<ClockEffect> {
        let from = self.phase;
        let mut effects = vec![ClockEffect::PhaseChanged { from, to: next }];

        self.phase = next;
        self.running = false;
        self.version += 1;

        match next {
            MatchPhase::FirstHalf => {
                self.seconds_remaining = self.rules.half_duration_secs;
                self.shootout = None;
                self.penalties = None;
                self.played_extra_time = false;
            }
            MatchPhase::SecondHalf => {
                self.seconds_remaining = self.rules.half_duration_secs;
                effects.push(ClockEffect::Cue(Cue::PeriodStart));
            }
            MatchPhase::ExtraFirst | MatchPhase::ExtraSecond => {
                self.seconds_remaining = self.rules.extra_time_half_secs.unwrap_or_default();
                self.played_extra_time = true;
                effects.push(ClockEffect::Cue(Cue::PeriodStart));
            }
            MatchPhase::PenaltyShootout => {
                self.seconds_remaining = 0;
                self.shootout = Some(Shootout::new(self.rules.penalty_kicks));
            }
            MatchPhase::Closed => {
                self.seconds_remaining = 0;
                self.penalties = self.shootout.as_ref().map(Shootout::record);
                effects.push(ClockEffect::Cue(Cue::FinalWhistle));
                effects.push(ClockEffect::Persist(self.final_patch()));
            }
        }

        effects
    }

    /// Storage update describing the current result as final.
    pub fn final_patch(&self) -> MatchPatch {
        let ended_in = if self.penalties.is_some() {
            EndedIn::Penalties
        } else if self.played_extra_time {
            EndedIn::ExtraTime
        } else {
            EndedIn::Regulation
        };

        MatchPatch {
            goals_a: Some(self.score.a),
            goals_b: Some(self.score.b),
            closed: Some(true),
            penalties: self.penalties,
            ended_in: Some(ended_in),
        }
    }

    fn ensure_open(&self) -> Result<(), ClockError> {
        if self.is_closed() {
            Err(ClockError::Closed)
        } else {
            Ok(())
        }
    }
}
