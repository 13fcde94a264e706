use std::fmt::Write;

use super::{Region, StatusLine, Tone, UiState, View};

/// Plain-text rendering of the presentation model for terminals.
pub fn render_text(ui: &UiState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Majority Rules ==");

    if let Some(status) = &ui.join_status {
        let _ = writeln!(out, "{}", status_text(status));
    }
    if ui.view == View::Join {
        let _ = writeln!(out, "Enter your name to join.");
        return out;
    }

    let _ = writeln!(out, "{}", ui.phase_display);
    let _ = writeln!(out, "Prompt: {}", ui.prompt_display);

    let meta = meta_line(ui);
    if !meta.is_empty() {
        let _ = writeln!(out, "({meta})");
    }
    if let Some(err) = &ui.poll_error {
        let _ = writeln!(out, "! {err}");
    }

    match ui.region {
        Some(Region::Answer) => {
            let _ = writeln!(out, "> Your answer: `answer <text>`");
        }
        Some(Region::Guess) => {
            let _ = writeln!(out, "> Guess the majority answer: `guess <text>`");
        }
        Some(Region::Results) => {
            let _ = writeln!(out, "> Results are in: `results`");
        }
        None => {}
    }

    for status in [&ui.answer_status, &ui.guess_status].into_iter().flatten() {
        let _ = writeln!(out, "{}", status_text(status));
    }

    if !ui.results_text.is_empty() {
        let _ = writeln!(out, "{}", ui.results_text);
    }

    if !ui.scoreboard.is_empty() {
        let _ = writeln!(out, "Scoreboard:");
        for (rank, line) in ui.scoreboard.iter().enumerate() {
            let marker = if line.is_me { " (you)" } else { "" };
            let _ = writeln!(out, "  {}. {}{} {}", rank + 1, line.name, marker, line.score);
        }
    }
    out
}

fn status_text(status: &StatusLine) -> String {
    match status.tone {
        Tone::Success => status.text.clone(),
        Tone::Error => format!("Error: {}", status.text),
    }
}

fn meta_line(ui: &UiState) -> String {
    let meta = &ui.round_meta;
    let mut parts = Vec::new();
    if let Some(players) = meta.players_connected {
        parts.push(format!("players: {players}"));
    }
    if let Some(answers) = meta.answers_received {
        parts.push(format!("answers: {answers}"));
    }
    if let Some(ends_at) = &meta.ends_at {
        parts.push(format!("ends at: {ends_at}"));
    }
    parts.join(" | ")
}
