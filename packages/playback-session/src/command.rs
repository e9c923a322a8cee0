//! Player commands and their endpoints

use url::Url;

use crate::error::{SessionError, SessionResult};
use crate::state::{PlayState, RepeatState, ShuffleState, StateChange};

/// HTTP verb used by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMethod {
    Post,
    Put,
}

/// Where and how a command is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: CommandMethod,
    /// Path relative to the Web API base
    pub path: &'static str,
    /// Optional single query parameter
    pub query: Option<(&'static str, &'static str)>,
}

impl Endpoint {
    /// Build the absolute URL under `api_url`
    pub fn url(&self, api_url: &str) -> SessionResult<Url> {
        let raw = format!(
            "{}/{}",
            api_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        let parsed = match self.query {
            Some(pair) => Url::parse_with_params(&raw, [pair]),
            None => Url::parse(&raw),
        };
        parsed.map_err(|e| SessionError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

/// The remote-control commands a session can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    SkipNext,
    SkipPrev,
    ShuffleOn,
    ShuffleOff,
    RepeatContext,
    RepeatTrack,
    RepeatOff,
}

impl PlayerCommand {
    /// All commands, in declaration order
    pub const ALL: [PlayerCommand; 9] = [
        PlayerCommand::Play,
        PlayerCommand::Pause,
        PlayerCommand::SkipNext,
        PlayerCommand::SkipPrev,
        PlayerCommand::ShuffleOn,
        PlayerCommand::ShuffleOff,
        PlayerCommand::RepeatContext,
        PlayerCommand::RepeatTrack,
        PlayerCommand::RepeatOff,
    ];

    /// Command that sets shuffle to `state`
    pub fn shuffle(state: ShuffleState) -> Self {
        match state {
            ShuffleState::On => Self::ShuffleOn,
            ShuffleState::Off => Self::ShuffleOff,
        }
    }

    /// Command that sets repeat to `state`
    pub fn repeat(state: RepeatState) -> Self {
        match state {
            RepeatState::Off => Self::RepeatOff,
            RepeatState::Track => Self::RepeatTrack,
            RepeatState::Context => Self::RepeatContext,
        }
    }

    /// Endpoint for this command
    pub fn endpoint(&self) -> Endpoint {
        use CommandMethod::{Post, Put};

        let (method, path, query) = match self {
            Self::Play => (Post, "me/player/play", None),
            Self::Pause => (Post, "me/player/pause", None),
            Self::SkipNext => (Post, "me/player/next", None),
            Self::SkipPrev => (Post, "me/player/previous", None),
            Self::ShuffleOn => (Put, "me/player/shuffle", Some(("state", "true"))),
            Self::ShuffleOff => (Put, "me/player/shuffle", Some(("state", "false"))),
            Self::RepeatContext => (Put, "me/player/repeat", Some(("state", "context"))),
            Self::RepeatTrack => (Put, "me/player/repeat", Some(("state", "track"))),
            Self::RepeatOff => (Put, "me/player/repeat", Some(("state", "off"))),
        };

        Endpoint {
            method,
            path,
            query,
        }
    }

    /// Mirrored-state update applied when the command succeeds
    ///
    /// Skips change nothing locally.
    pub fn state_change(&self) -> Option<StateChange> {
        match self {
            Self::Play => Some(StateChange::Play(PlayState::Playing)),
            Self::Pause => Some(StateChange::Play(PlayState::Paused)),
            Self::SkipNext | Self::SkipPrev => None,
            Self::ShuffleOn => Some(StateChange::Shuffle(ShuffleState::On)),
            Self::ShuffleOff => Some(StateChange::Shuffle(ShuffleState::Off)),
            Self::RepeatContext => Some(StateChange::Repeat(RepeatState::Context)),
            Self::RepeatTrack => Some(StateChange::Repeat(RepeatState::Track)),
            Self::RepeatOff => Some(StateChange::Repeat(RepeatState::Off)),
        }
    }
}
