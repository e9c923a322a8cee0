//! Plain-text rendering of session results

use deckhand_playback_session::{NowPlaying, PlayState, PlaybackState, RepeatState, ShuffleState};

/// `m:ss` for a millisecond duration
pub fn duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn play(state: PlayState) -> &'static str {
    match state {
        PlayState::Playing => "playing",
        PlayState::Paused => "paused",
    }
}

pub fn shuffle(state: ShuffleState) -> &'static str {
    match state {
        ShuffleState::On => "on",
        ShuffleState::Off => "off",
    }
}

pub fn repeat(state: RepeatState) -> &'static str {
    match state {
        RepeatState::Off => "off",
        RepeatState::Track => "track",
        RepeatState::Context => "context",
    }
}

/// One line describing the reported track
pub fn now_playing(now: &NowPlaying, play_state: PlayState) -> String {
    match now {
        NowPlaying::Nothing => "Nothing is playing".to_string(),
        NowPlaying::Playing(track) => format!(
            "[{}] {} - {} ({}) {}/{}",
            play(play_state),
            track.artist_line(),
            track.name,
            track.album_name,
            duration(track.progress_ms),
            duration(track.duration_ms),
        ),
    }
}

pub fn state(state: &PlaybackState) -> String {
    format!(
        "play: {}, shuffle: {}, repeat: {}",
        play(state.play),
        shuffle(state.shuffle),
        repeat(state.repeat)
    )
}
