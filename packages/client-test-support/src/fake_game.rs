//! In-memory Majority Rules game with the server's rules.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

pub const MAX_TEXT_LEN: usize = 80;
pub const DEFAULT_ROUNDS: i64 = 3;

pub const PROMPTS: [&str; 4] = [
    "What the iceberg said to the Titanic: ___",
    "The real reason the dinosaurs went extinct: ___",
    "What the yellow Minion is actually saying: ___",
    "The real reason everyone left the group chat: ___",
];

const PHASES: [&str; 4] = ["LOBBY", "ANSWER", "GUESS", "RESULTS"];

/// A rejected request: status, message and optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub error: String,
    pub details: Option<String>,
}

impl Rejection {
    fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone)]
struct Player {
    name: String,
    score: i64,
}

#[derive(Debug, Clone)]
pub struct FakeGame {
    phase: &'static str,
    round_id: i64,
    round_total: i64,
    prompt: Option<String>,
    players: BTreeMap<String, Player>,
    answers: HashMap<i64, BTreeMap<String, String>>,
    guesses: HashMap<i64, BTreeMap<String, String>>,
}

impl Default for FakeGame {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

fn sanitize(raw: &str) -> String {
    raw.trim().chars().take(MAX_TEXT_LEN).collect()
}

impl FakeGame {
    pub fn new(round_total: i64) -> Self {
        Self {
            phase: "LOBBY",
            round_id: 0,
            round_total,
            prompt: None,
            players: BTreeMap::new(),
            answers: HashMap::new(),
            guesses: HashMap::new(),
        }
    }

    fn pick_prompt(&self) -> String {
        let idx = (self.round_id.max(1) - 1) as usize % PROMPTS.len();
        PROMPTS[idx].to_string()
    }

    pub fn join(&mut self, body: &Value) -> Result<Value, Rejection> {
        let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.trim().is_empty() {
            return Err(Rejection::new(400, "Missing or empty 'name'")
                .with_details("body: { \"name\": \"Your Name\" }"));
        }
        let name = sanitize(name);
        let player_id = uuid::Uuid::new_v4().to_string();
        self.players.insert(
            player_id.clone(),
            Player {
                name: name.clone(),
                score: 0,
            },
        );
        Ok(json!({"player_id": player_id, "name": name}))
    }

    pub fn state(&self) -> Value {
        let answers_received = self
            .answers
            .get(&self.round_id)
            .map(BTreeMap::len)
            .unwrap_or(0);
        json!({
            "phase": self.phase,
            "round_id": self.round_id,
            "round_total": self.round_total,
            "prompt": self.prompt,
            "ends_at": null,
            "players_connected": self.players.len(),
            "answers_received": answers_received,
        })
    }

    /// Handles `/api/answer` (`field == "answer"`) and `/api/guess` (`field == "guess"`).
    pub fn submit(&mut self, field: &str, body: &Value) -> Result<Value, Rejection> {
        let (phase, label) = match field {
            "answer" => ("ANSWER", "Answer"),
            _ => ("GUESS", "Guess"),
        };
        if self.phase != phase {
            let plural = if field == "answer" { "Answers" } else { "Guesses" };
            return Err(Rejection::new(
                409,
                format!("{plural} only accepted in {phase} phase"),
            )
            .with_details(format!("current phase: {}", self.phase)));
        }

        let player_id = body
            .get("player_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Rejection::new(400, "Missing 'player_id'"))?;
        let round_id = body
            .get("round_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Rejection::new(400, "Missing 'round_id'"))?;
        let text = body
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Rejection::new(400, format!("Missing '{field}'")))?;

        if !self.players.contains_key(player_id) {
            return Err(Rejection::new(404, "Unknown player_id"));
        }
        if round_id != self.round_id || round_id < 1 {
            return Err(Rejection::new(409, "Invalid or mismatched round_id"));
        }
        let text = sanitize(text);
        if text.is_empty() {
            return Err(Rejection::new(
                400,
                format!("{label} cannot be empty after sanitization"),
            ));
        }

        let book = if field == "answer" {
            &mut self.answers
        } else {
            &mut self.guesses
        };
        let round = book.entry(round_id).or_default();
        if round.contains_key(player_id) {
            return Err(Rejection::new(
                409,
                format!("Already submitted {} {field} for this round", article(field)),
            ));
        }
        round.insert(player_id.to_string(), text);
        Ok(json!({"ok": true, "round_id": round_id}))
    }

    pub fn results(&self, round_id: Option<i64>) -> Result<Value, Rejection> {
        let round_id =
            round_id.ok_or_else(|| Rejection::new(400, "Missing query parameter 'round_id'"))?;
        if self.phase == "ANSWER" || self.phase == "GUESS" {
            return Err(
                Rejection::new(409, "Results available only in RESULTS phase")
                    .with_details(format!("current phase: {}", self.phase)),
            );
        }
        if round_id < 1 || round_id > self.round_id {
            return Err(Rejection::new(404, "Invalid round_id"));
        }

        let answers = self.answers.get(&round_id).cloned().unwrap_or_default();
        if answers.is_empty() {
            return Ok(json!({
                "round_id": round_id,
                "prompt": self.prompt.clone().unwrap_or_default(),
                "breakdown": [],
                "majority_answers": [],
                "total_answers": 0,
            }));
        }

        let breakdown = tally(&answers);
        let total = answers.len();
        let top = breakdown.first().map(|(_, count)| *count).unwrap_or(0);
        let majority: Vec<&str> = breakdown
            .iter()
            .filter(|(_, count)| *count == top)
            .map(|(answer, _)| answer.as_str())
            .collect();
        let rows: Vec<Value> = breakdown
            .iter()
            .map(|(answer, count)| {
                let pct = (1000.0 * *count as f64 / total as f64).round() / 10.0;
                json!({"answer": answer, "count": count, "pct": pct})
            })
            .collect();
        let prompt = if round_id == self.round_id {
            self.prompt.clone()
        } else {
            None
        };

        Ok(json!({
            "round_id": round_id,
            "prompt": prompt.unwrap_or_else(|| "(prompt not stored)".to_string()),
            "breakdown": rows,
            "majority_answers": majority,
            "total_answers": total,
        }))
    }

    pub fn scoreboard(&self) -> Value {
        let mut rows: Vec<(&String, &Player)> = self.players.iter().collect();
        rows.sort_by(|a, b| b.1.score.cmp(&a.1.score).then_with(|| a.1.name.cmp(&b.1.name)));
        Value::Array(
            rows.into_iter()
                .map(|(id, p)| json!({"player_id": id, "name": p.name, "score": p.score}))
                .collect(),
        )
    }

    /// Cycles LOBBY → ANSWER → GUESS → RESULTS → LOBBY.
    pub fn next_phase(&mut self) -> &'static str {
        let idx = PHASES.iter().position(|p| *p == self.phase).unwrap_or(0);
        self.phase = PHASES[(idx + 1) % PHASES.len()];
        match self.phase {
            "ANSWER" => {
                if self.round_id == 0 {
                    self.round_id = 1;
                }
                if self.prompt.is_none() {
                    self.prompt = Some(self.pick_prompt());
                }
            }
            "RESULTS" => self.apply_round_scoring(),
            _ => {}
        }
        self.phase
    }

    fn apply_round_scoring(&mut self) {
        let answers = self.answers.get(&self.round_id).cloned().unwrap_or_default();
        if answers.is_empty() {
            return;
        }
        let breakdown = tally(&answers);
        let top = breakdown.first().map(|(_, count)| *count).unwrap_or(0);
        let majority: Vec<&String> = breakdown
            .iter()
            .filter(|(_, count)| *count == top)
            .map(|(answer, _)| answer)
            .collect();

        for pid in answers.keys() {
            if let Some(player) = self.players.get_mut(pid) {
                player.score += 1;
            }
        }
        let guesses = self.guesses.get(&self.round_id).cloned().unwrap_or_default();
        for (pid, guess) in &guesses {
            if majority.contains(&guess) {
                if let Some(player) = self.players.get_mut(pid) {
                    player.score += 2;
                }
            }
        }
    }
}

fn article(field: &str) -> &'static str {
    if field == "answer" {
        "an"
    } else {
        "a"
    }
}

/// Answer counts, most common first; ties keep first-seen order.
fn tally(answers: &BTreeMap<String, String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for answer in answers.values() {
        match counts.iter_mut().find(|(a, _)| a == answer) {
            Some((_, count)) => *count += 1,
            None => counts.push((answer.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
