//! Currently-playing response models

use serde::Deserialize;

use crate::error::{SessionError, SessionResult};

/// Album images are ordered widest first; index 1 is the medium (300px) rendition
const ALBUM_ART_IMAGE_INDEX: usize = 1;

/// Snapshot of the track the player reports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    /// Track name
    pub name: String,
    /// Album name
    pub album_name: String,
    /// Medium-size album art URL, empty when the API has none
    pub album_art_url: String,
    /// Artist names in API order
    pub artists: Vec<String>,
    /// Track length
    pub duration_ms: u64,
    /// Position within the track
    pub progress_ms: u64,
    /// Spotify URI, empty when absent
    pub uri: String,
    /// HTTP status the API answered with
    pub status: u16,
}

impl Track {
    /// Artist names joined for display
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Result of a successful currently-playing query
///
/// A failed query is an `Err`, so "nothing is playing" and "could not
/// ask" are never confused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlaying {
    /// The player reports a track
    Playing(Track),
    /// The player is idle or reports no item
    Nothing,
}

impl NowPlaying {
    /// The track, if any
    pub fn track(&self) -> Option<&Track> {
        match self {
            NowPlaying::Playing(track) => Some(track),
            NowPlaying::Nothing => None,
        }
    }
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct RawCurrentlyPlaying {
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub item: Option<RawItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawItem {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    pub duration_ms: u64,
    pub album: RawAlbum,
    pub artists: Vec<RawArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawImage {
    #[serde(default)]
    pub url: Option<String>,
}

impl RawCurrentlyPlaying {
    /// Parse a currently-playing body
    pub fn parse(body: &[u8]) -> SessionResult<Self> {
        serde_json::from_slice(body).map_err(|e| SessionError::malformed("currently playing", e))
    }

    /// Convert into the public model
    ///
    /// `progress_ms` is only required when an item is present.
    pub fn into_now_playing(self, status: u16) -> SessionResult<NowPlaying> {
        let Some(item) = self.item else {
            return Ok(NowPlaying::Nothing);
        };

        let progress_ms = self.progress_ms.ok_or_else(|| {
            SessionError::MalformedResponse(
                "currently playing: missing field `progress_ms`".to_string(),
            )
        })?;

        let album_art_url = item
            .album
            .images
            .into_iter()
            .nth(ALBUM_ART_IMAGE_INDEX)
            .and_then(|image| image.url)
            .unwrap_or_default();

        Ok(NowPlaying::Playing(Track {
            name: item.name,
            album_name: item.album.name,
            album_art_url,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            duration_ms: item.duration_ms,
            progress_ms,
            uri: item.uri.unwrap_or_default(),
            status,
        }))
    }
}
