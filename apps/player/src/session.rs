use crate::logging::RedactedId;

/// Player identity issued by the server at join time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    player_id: String,
    player_name: String,
}

impl Session {
    pub fn new(player_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Player id in a form safe to log.
    pub fn log_id(&self) -> RedactedId<'_> {
        RedactedId(&self.player_id)
    }
}
