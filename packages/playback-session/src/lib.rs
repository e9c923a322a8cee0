//! Spotify playback session for Deckhand
//!
//! [`PlaybackSession`] exchanges a long-lived refresh token for access
//! tokens, keeps the current token fresh in a background task, and sends
//! remote-control commands to the Web API. Play/pause, shuffle and repeat
//! are mirrored locally from the session's own successful commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use deckhand_playback_session::{NowPlaying, PlaybackSession};
//! use deckhand_shared_config::{HttpConfig, SpotifyConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let spotify = SpotifyConfig::from_env()?;
//! let session = PlaybackSession::connect(&spotify, &HttpConfig::default()).await?;
//!
//! if let NowPlaying::Playing(track) = session.get_currently_playing().await? {
//!     println!("{} by {}", track.name, track.artist_line());
//! }
//!
//! let repeat = session.toggle_repeat().await?;
//! println!("repeat is now {:?}", repeat);
//! # Ok(())
//! # }
//! ```

mod auth;
mod command;
mod error;
mod models;
mod session;
mod state;

pub use auth::{basic_authorization, refresh_grant_body, AccessToken, FORM_CONTENT_TYPE};
pub use command::{CommandMethod, Endpoint, PlayerCommand};
pub use error::{SessionError, SessionResult};
pub use models::{NowPlaying, Track};
pub use session::PlaybackSession;
pub use state::{PlayState, PlaybackState, RepeatState, ShuffleState, StateChange};
