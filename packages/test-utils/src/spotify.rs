//! Mock Spotify accounts service and Web API
//!
//! Provides a [`MockSpotifyServer`] that serves the token endpoint and the
//! player endpoints from one local server, so a session can be pointed at
//! it through [`MockSpotifyServer::spotify_config`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use deckhand_shared_config::SpotifyConfig;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_CLIENT_ID: &str = "test-client-id";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_REFRESH_TOKEN: &str = "test-refresh-token";

const TOKEN_PATH: &str = "/api/token";
const API_PREFIX: &str = "/v1";
const CURRENTLY_PLAYING_PATH: &str = "/v1/me/player/currently-playing";

/// Mock Spotify server for session tests
///
/// Token mocks only match a correctly formed refresh grant (form content
/// type, Basic credentials for the test client, exact body). API mocks only
/// match the expected bearer token, so a request with a stale or missing
/// token gets wiremock's default 404.
///
/// # Example
///
/// ```rust,ignore
/// use deckhand_test_utils::{CurrentlyPlayingFixture, MockSpotifyServer};
///
/// #[tokio::test]
/// async fn test_now_playing() {
///     let server = MockSpotifyServer::start().await;
///     server.mock_token_success("abc123").await;
///     server
///         .mock_currently_playing("abc123", CurrentlyPlayingFixture::track("Song", "Artist"))
///         .await;
///
///     let config = server.spotify_config();
///     // Connect a session with `config`
/// }
/// ```
pub struct MockSpotifyServer {
    server: MockServer,
}

impl MockSpotifyServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Token endpoint URL
    pub fn token_url(&self) -> String {
        format!("{}{}", self.server.uri(), TOKEN_PATH)
    }

    /// Web API base URL
    pub fn api_url(&self) -> String {
        format!("{}{}", self.server.uri(), API_PREFIX)
    }

    /// Spotify configuration with the test credentials pointed at this server
    pub fn spotify_config(&self) -> SpotifyConfig {
        SpotifyConfig::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REFRESH_TOKEN)
            .with_token_url(self.token_url())
            .with_api_url(self.api_url())
    }

    /// The underlying wiremock server
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// `Authorization` value the token endpoint expects from the test client
    pub fn expected_basic_authorization() -> String {
        let credentials = format!("{}:{}", TEST_CLIENT_ID, TEST_CLIENT_SECRET);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn token_exchange() -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(header(
                "Authorization",
                Self::expected_basic_authorization().as_str(),
            ))
            .and(body_string(format!(
                "grant_type=refresh_token&refresh_token={}",
                TEST_REFRESH_TOKEN
            )))
    }

    fn token_body(access_token: &str) -> serde_json::Value {
        json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "scope": "user-read-playback-state user-modify-playback-state",
            "expires_in": 3600
        })
    }

    /// Mount a token endpoint that always grants `access_token`
    pub async fn mock_token_success(&self, access_token: &str) {
        Self::token_exchange()
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::token_body(access_token)))
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint that grants `access_token` once
    ///
    /// Mount it before a longer-lived token mock to script a sequence.
    pub async fn mock_token_success_once(&self, access_token: &str) {
        Self::token_exchange()
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::token_body(access_token)))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint failure with `status`
    pub async fn mock_token_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid refresh token"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint that answers 200 with `body` verbatim
    pub async fn mock_token_raw(&self, body: &str) {
        Self::token_exchange()
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a currently-playing response for requests bearing `access_token`
    pub async fn mock_currently_playing(
        &self,
        access_token: &str,
        fixture: CurrentlyPlayingFixture,
    ) {
        Mock::given(method("GET"))
            .and(path(CURRENTLY_PLAYING_PATH))
            .and(header("Authorization", bearer(access_token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount a `204 No Content` currently-playing response
    pub async fn mock_currently_playing_nothing(&self, access_token: &str) {
        Mock::given(method("GET"))
            .and(path(CURRENTLY_PLAYING_PATH))
            .and(header("Authorization", bearer(access_token).as_str()))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Mount a currently-playing response with an arbitrary status and body
    pub async fn mock_currently_playing_raw(&self, access_token: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(CURRENTLY_PLAYING_PATH))
            .and(header("Authorization", bearer(access_token).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a `204` answer to a player command
    ///
    /// `endpoint` is relative to the API base, e.g. `me/player/shuffle`.
    /// `state` adds a `state` query matcher.
    pub async fn mock_player_command(
        &self,
        access_token: &str,
        http_method: &str,
        endpoint: &str,
        state: Option<&str>,
    ) {
        self.player_command(http_method, endpoint, state)
            .and(header("Authorization", bearer(access_token).as_str()))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Mount a `204` answer to a player command, once
    pub async fn mock_player_command_once(
        &self,
        access_token: &str,
        http_method: &str,
        endpoint: &str,
        state: Option<&str>,
    ) {
        self.player_command(http_method, endpoint, state)
            .and(header("Authorization", bearer(access_token).as_str()))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Mount a player command failure with `status`, regardless of token
    pub async fn mock_player_command_failure(
        &self,
        http_method: &str,
        endpoint: &str,
        state: Option<&str>,
        status: u16,
    ) {
        self.player_command(http_method, endpoint, state)
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "status": status,
                    "message": "Player command failed: Restriction violated",
                    "reason": "UNKNOWN"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a player command failure with `status`, once
    pub async fn mock_player_command_failure_once(
        &self,
        http_method: &str,
        endpoint: &str,
        state: Option<&str>,
        status: u16,
    ) {
        self.player_command(http_method, endpoint, state)
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    fn player_command(
        &self,
        http_method: &str,
        endpoint: &str,
        state: Option<&str>,
    ) -> wiremock::MockBuilder {
        let builder = Mock::given(method(http_method)).and(path(format!(
            "{}/{}",
            API_PREFIX,
            endpoint.trim_start_matches('/')
        )));
        match state {
            Some(state) => builder.and(query_param("state", state)),
            None => builder,
        }
    }

    /// Number of requests received on `request_path`
    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }

    /// Number of token exchanges received
    pub async fn token_requests(&self) -> usize {
        self.requests_to(TOKEN_PATH).await
    }
}

fn bearer(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Fixture for currently-playing responses
#[derive(Debug, Clone)]
pub struct CurrentlyPlayingFixture {
    pub is_playing: bool,
    pub progress_ms: u64,
    pub name: String,
    pub uri: String,
    pub duration_ms: u64,
    pub album_name: String,
    pub image_urls: Vec<String>,
    pub artists: Vec<String>,
}

impl CurrentlyPlayingFixture {
    /// A playing track with three album images
    pub fn track(name: &str, artist: &str) -> Self {
        let slug = name.to_lowercase().replace(' ', "-");
        Self {
            is_playing: true,
            progress_ms: 30_000,
            name: name.to_string(),
            uri: format!("spotify:track:{}", slug),
            duration_ms: 240_000,
            album_name: format!("{} (Album)", name),
            image_urls: vec![
                format!("https://i.scdn.co/image/{}-640", slug),
                format!("https://i.scdn.co/image/{}-300", slug),
                format!("https://i.scdn.co/image/{}-64", slug),
            ],
            artists: vec![artist.to_string()],
        }
    }

    /// Same track, paused
    pub fn paused(mut self) -> Self {
        self.is_playing = false;
        self
    }

    /// Replace the artist list
    pub fn with_artists(mut self, artists: &[&str]) -> Self {
        self.artists = artists.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Replace the album image URLs
    pub fn with_images(mut self, urls: &[&str]) -> Self {
        self.image_urls = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Convert to the API's JSON shape
    pub fn to_json(&self) -> serde_json::Value {
        let images: Vec<serde_json::Value> = self
            .image_urls
            .iter()
            .map(|url| json!({ "url": url, "height": null, "width": null }))
            .collect();
        let artists: Vec<serde_json::Value> = self
            .artists
            .iter()
            .map(|name| json!({ "name": name, "type": "artist" }))
            .collect();

        json!({
            "timestamp": 1_700_000_000_000u64,
            "is_playing": self.is_playing,
            "progress_ms": self.progress_ms,
            "currently_playing_type": "track",
            "item": {
                "name": self.name,
                "uri": self.uri,
                "duration_ms": self.duration_ms,
                "album": {
                    "name": self.album_name,
                    "images": images
                },
                "artists": artists
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_spotify_server_starts() {
        let server = MockSpotifyServer::start().await;
        assert!(!server.url().is_empty());

        let config = server.spotify_config();
        assert_eq!(config.client_id, TEST_CLIENT_ID);
        assert!(config.token_url.ends_with("/api/token"));
        assert!(config.api_url.ends_with("/v1"));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_token_mock_requires_refresh_grant() {
        let server = MockSpotifyServer::start().await;
        server.mock_token_success("abc123").await;

        let client = reqwest::Client::new();
        let response = client
            .post(server.token_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Authorization", MockSpotifyServer::expected_basic_authorization())
            .body("grant_type=refresh_token&refresh_token=test-refresh-token")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["access_token"], "abc123");

        // Missing credentials fall through to the default 404
        let response = client
            .post(server.token_url())
            .body("grant_type=refresh_token&refresh_token=test-refresh-token")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);

        assert_eq!(server.token_requests().await, 2);
    }

    #[tokio::test]
    async fn test_currently_playing_mock_checks_bearer() {
        let server = MockSpotifyServer::start().await;
        server
            .mock_currently_playing("abc123", CurrentlyPlayingFixture::track("Song", "Artist"))
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/me/player/currently-playing", server.api_url());

        let response = client
            .get(&url)
            .header("Authorization", "Bearer abc123")
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["item"]["name"], "Song");
        assert_eq!(body["item"]["artists"][0]["name"], "Artist");

        let response = client
            .get(&url)
            .header("Authorization", "Bearer stale")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[test]
    fn test_fixture_builders() {
        let fixture = CurrentlyPlayingFixture::track("Karma Police", "Radiohead")
            .paused()
            .with_artists(&["A", "B"])
            .with_images(&["only"]);
        let json = fixture.to_json();
        assert_eq!(json["is_playing"], false);
        assert_eq!(json["item"]["uri"], "spotify:track:karma-police");
        assert_eq!(json["item"]["artists"].as_array().unwrap().len(), 2);
        assert_eq!(json["item"]["album"]["images"].as_array().unwrap().len(), 1);
    }
}
