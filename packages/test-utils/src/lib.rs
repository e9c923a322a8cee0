//! Shared test utilities for the Deckhand workspace
//!
//! Mock implementations of the Spotify services so session and CLI tests
//! run without network access.
//!
//! # Mock Services
//!
//! - [`MockSpotifyServer`] - Mock accounts service and Web API player endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use deckhand_test_utils::MockSpotifyServer;
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let spotify = MockSpotifyServer::start().await;
//!     spotify.mock_token_success("abc123").await;
//!
//!     // Use spotify.spotify_config() to connect a session
//! }
//! ```

mod spotify;

pub use spotify::{
    CurrentlyPlayingFixture, MockSpotifyServer, TEST_CLIENT_ID, TEST_CLIENT_SECRET,
    TEST_REFRESH_TOKEN,
};
