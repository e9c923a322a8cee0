//! Locally mirrored player state
//!
//! The session believes its own last successful command. No push
//! notifications are consumed, so another client changing the player is
//! only noticed when the currently-playing endpoint is read again (and
//! then only for the play/pause axis).

/// Whether the player is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    Playing,
    #[default]
    Paused,
}

impl PlayState {
    /// Map the API's `is_playing` flag
    pub fn from_is_playing(is_playing: bool) -> Self {
        if is_playing {
            Self::Playing
        } else {
            Self::Paused
        }
    }
}

/// Shuffle mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleState {
    On,
    #[default]
    Off,
}

impl ShuffleState {
    /// The opposite mode
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatState {
    #[default]
    Off,
    Track,
    Context,
}

impl RepeatState {
    /// Next mode in the cycle Off → Context → Track → Off
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Context,
            Self::Context => Self::Track,
            Self::Track => Self::Off,
        }
    }
}

/// Snapshot of all mirrored axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub play: PlayState,
    pub shuffle: ShuffleState,
    pub repeat: RepeatState,
}

/// Update rule attached to a successful command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Play(PlayState),
    Shuffle(ShuffleState),
    Repeat(RepeatState),
}

impl PlaybackState {
    /// Apply a change to the single axis it concerns
    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::Play(play) => self.play = play,
            StateChange::Shuffle(shuffle) => self.shuffle = shuffle,
            StateChange::Repeat(repeat) => self.repeat = repeat,
        }
    }
}
