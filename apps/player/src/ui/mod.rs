//! Presentation model.
//!
//! `UiState` is what a page would show: which panel is open, the phase line,
//! the prompt, the one action region that is visible, input fields and
//! status lines. [`crate::GameClient`] publishes it through a `watch`
//! channel; front-ends only read it.

pub mod command;
pub mod render;

use crate::protocol::{Phase, RoundState, ScoreboardRow, SubmissionKind};

pub const PROMPT_PLACEHOLDER: &str = "—";
pub const PHASE_PLACEHOLDER: &str = "Waiting for game state…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Join,
    Game,
}

/// The three mutually exclusive action regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Answer,
    Guess,
    Results,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Answer, Region::Guess, Region::Results];

    /// Region enabled by `phase`; `None` for phases with no player action.
    pub fn for_phase(phase: &Phase) -> Option<Region> {
        match phase {
            Phase::Answer => Some(Region::Answer),
            Phase::Guess => Some(Region::Guess),
            Phase::Results => Some(Region::Results),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }
}

/// Extra round facts the server reports alongside the phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundMeta {
    pub ends_at: Option<String>,
    pub players_connected: Option<u32>,
    pub answers_received: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub name: String,
    pub score: i64,
    pub is_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub view: View,
    pub join_status: Option<StatusLine>,
    pub phase_display: String,
    pub prompt_display: String,
    pub region: Option<Region>,
    pub round_meta: RoundMeta,
    pub answer_input: String,
    pub answer_status: Option<StatusLine>,
    pub guess_input: String,
    pub guess_status: Option<StatusLine>,
    pub results_text: String,
    pub scoreboard: Vec<ScoreLine>,
    /// Set when the latest applied poll failed; cleared by the next success.
    pub poll_error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            view: View::Join,
            join_status: None,
            phase_display: PHASE_PLACEHOLDER.to_string(),
            prompt_display: PROMPT_PLACEHOLDER.to_string(),
            region: None,
            round_meta: RoundMeta::default(),
            answer_input: String::new(),
            answer_status: None,
            guess_input: String::new(),
            guess_status: None,
            results_text: String::new(),
            scoreboard: Vec::new(),
            poll_error: None,
        }
    }
}

impl UiState {
    pub fn is_visible(&self, region: Region) -> bool {
        self.region == Some(region)
    }

    pub fn visible_regions(&self) -> usize {
        Region::ALL.iter().filter(|r| self.is_visible(**r)).count()
    }

    pub fn input(&self, kind: SubmissionKind) -> &str {
        match kind {
            SubmissionKind::Answer => &self.answer_input,
            SubmissionKind::Guess => &self.guess_input,
        }
    }

    pub fn input_mut(&mut self, kind: SubmissionKind) -> &mut String {
        match kind {
            SubmissionKind::Answer => &mut self.answer_input,
            SubmissionKind::Guess => &mut self.guess_input,
        }
    }

    pub fn status(&self, kind: SubmissionKind) -> Option<&StatusLine> {
        match kind {
            SubmissionKind::Answer => self.answer_status.as_ref(),
            SubmissionKind::Guess => self.guess_status.as_ref(),
        }
    }

    pub fn set_status(&mut self, kind: SubmissionKind, status: StatusLine) {
        match kind {
            SubmissionKind::Answer => self.answer_status = Some(status),
            SubmissionKind::Guess => self.guess_status = Some(status),
        }
    }

    /// Switches from the join panel to the game panel.
    pub fn show_game(&mut self, player_name: &str) {
        self.view = View::Game;
        self.join_status = Some(StatusLine::success(format!("Joined as {player_name}")));
    }

    /// Reflects a freshly polled round state.
    pub fn apply_round(&mut self, state: &RoundState) {
        self.phase_display = phase_line(state);
        self.prompt_display = state
            .prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(PROMPT_PLACEHOLDER)
            .to_string();
        self.region = Region::for_phase(&state.phase);
        self.round_meta = RoundMeta {
            ends_at: state.ends_at.clone(),
            players_connected: state.players_connected,
            answers_received: state.answers_received,
        };
        self.poll_error = None;
    }

    /// Marks the display as stale after a failed poll; the last good state stays.
    pub fn apply_poll_error(&mut self, message: String) {
        self.poll_error = Some(message);
    }

    pub fn set_scoreboard(&mut self, rows: &[ScoreboardRow], my_id: Option<&str>) {
        self.scoreboard = rows
            .iter()
            .map(|row| ScoreLine {
                name: row.name.clone(),
                score: row.score,
                is_me: my_id == Some(row.player_id.as_str()),
            })
            .collect();
    }
}

/// `Phase: GUESS Round 3/5`
pub fn phase_line(state: &RoundState) -> String {
    format!(
        "Phase: {} Round {}/{}",
        state.phase, state.round_id, state.round_total
    )
}
