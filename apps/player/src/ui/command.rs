/// A line typed into the terminal front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    Guess(String),
    Results,
    Scores,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "commands: answer <text> | guess <text> | results | scores | help | quit";

impl Command {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "answer" | "a" => Command::Answer(rest.to_string()),
            "guess" | "g" => Command::Guess(rest.to_string()),
            "results" | "r" => Command::Results,
            "scores" | "scoreboard" | "s" => Command::Scores,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}
