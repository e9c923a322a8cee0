//! Playback session: token lifecycle and player commands

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use deckhand_shared_config::{HttpConfig, SpotifyConfig};
use deckhand_streaming_http::{ExpectedStatus, StatusCode, StreamingHttpClient};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::auth::{basic_authorization, refresh_grant_body, AccessToken, FORM_CONTENT_TYPE};
use crate::command::{CommandMethod, PlayerCommand};
use crate::error::{SessionError, SessionResult};
use crate::models::{NowPlaying, RawCurrentlyPlaying};
use crate::state::{PlayState, PlaybackState, RepeatState, ShuffleState, StateChange};

const CURRENTLY_PLAYING_PATH: &str = "me/player/currently-playing";

/// 204 means nothing is playing
const CURRENTLY_PLAYING_STATUSES: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// A remote-control session against the Spotify Web API
///
/// Holds the current access token, refreshes it in a background task on a
/// fixed period, and mirrors play/shuffle/repeat state from its own
/// successful commands. The refresh task starts after the first successful
/// token exchange. Dropping the session stops it.
///
/// Calls on one session are serialized per client: the token exchange and
/// the playback API each use their own [`StreamingHttpClient`], and at most
/// one request is in flight on each.
pub struct PlaybackSession {
    inner: Arc<SessionInner>,
    refresher: StdMutex<Option<JoinHandle<()>>>,
}

struct SessionInner {
    config: SpotifyConfig,
    token: RwLock<Option<AccessToken>>,
    token_client: Mutex<StreamingHttpClient>,
    api_client: Mutex<StreamingHttpClient>,
    state: StdMutex<PlaybackState>,
}

impl PlaybackSession {
    /// Build the clients, fetch the first access token and start the refresh task
    ///
    /// Must be called inside a tokio runtime. A failed initial exchange does
    /// not fail construction: it is logged, the token stays unset, no
    /// refresh task is started, and every call returns
    /// [`SessionError::AuthNotReady`]. Check
    /// [`has_access_token`](Self::has_access_token) to surface it and call
    /// [`refresh_access_token`](Self::refresh_access_token) to try again.
    ///
    /// # Errors
    /// `SessionError::Http` if an HTTP client cannot be built or the
    /// credentials do not form a valid header
    pub async fn connect(spotify: &SpotifyConfig, http: &HttpConfig) -> SessionResult<Self> {
        let mut token_client = StreamingHttpClient::new(http)?;
        token_client.set_header(CONTENT_TYPE, FORM_CONTENT_TYPE)?;
        token_client.set_header(
            AUTHORIZATION,
            &basic_authorization(&spotify.client_id, &spotify.client_secret),
        )?;
        let api_client = StreamingHttpClient::new(http)?;

        let inner = Arc::new(SessionInner {
            config: spotify.clone(),
            token: RwLock::new(None),
            token_client: Mutex::new(token_client),
            api_client: Mutex::new(api_client),
            state: StdMutex::new(PlaybackState::default()),
        });

        let session = Self {
            inner,
            refresher: StdMutex::new(None),
        };

        match session.inner.refresh_access_token().await {
            Ok(()) => {
                info!(api_url = %spotify.api_url, "Playback session connected");
                session.ensure_refresher();
            }
            Err(e) => error!(
                error = %e,
                token_url = %spotify.token_url,
                "Initial token exchange failed; call refresh_access_token to retry"
            ),
        }

        Ok(session)
    }

    /// Run the token exchange now and replace the stored token on success
    ///
    /// On failure the previous token, if any, stays in place. The first
    /// success after a failed start also starts the refresh task.
    pub async fn refresh_access_token(&self) -> SessionResult<()> {
        self.inner.refresh_access_token().await?;
        self.ensure_refresher();
        Ok(())
    }

    /// Whether the background refresh task is running
    pub fn is_refreshing(&self) -> bool {
        self.refresher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn ensure_refresher(&self) {
        let mut refresher = self
            .refresher
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if refresher.is_none() {
            *refresher = Some(spawn_refresher(Arc::clone(&self.inner)));
        }
    }

    /// Whether a token exchange has ever succeeded
    pub async fn has_access_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Query the track the player reports
    ///
    /// `Ok(NowPlaying::Nothing)` when the API answers `204` or reports no
    /// item. The mirrored play state follows `is_playing` only when the
    /// body was valid.
    #[instrument(skip(self))]
    pub async fn get_currently_playing(&self) -> SessionResult<NowPlaying> {
        let bearer = self.inner.bearer().await?;
        let url = self.inner.config.api_endpoint(CURRENTLY_PLAYING_PATH);

        let response = {
            let mut client = self.inner.api_client.lock().await;
            client.set_header(AUTHORIZATION, &bearer)?;
            client
                .get(&url, ExpectedStatus::AnyOf(CURRENTLY_PLAYING_STATUSES))
                .await?
        };

        if response.status == StatusCode::NO_CONTENT {
            debug!("Nothing is playing");
            return Ok(NowPlaying::Nothing);
        }

        let raw = RawCurrentlyPlaying::parse(&response.body)?;
        let play = PlayState::from_is_playing(raw.is_playing);
        let now_playing = raw.into_now_playing(response.status.as_u16())?;

        self.inner.apply(StateChange::Play(play));

        if let NowPlaying::Playing(track) = &now_playing {
            debug!(track = %track.name, artists = %track.artist_line(), ?play, "Currently playing");
        }
        Ok(now_playing)
    }

    /// Send a command and, on success, update the state axis it concerns
    ///
    /// On failure the mirrored state is left untouched. No retry is made.
    #[instrument(skip(self))]
    pub async fn send_player_command(&self, command: PlayerCommand) -> SessionResult<()> {
        let bearer = self.inner.bearer().await?;
        let endpoint = command.endpoint();
        let url = endpoint.url(&self.inner.config.api_url)?;

        {
            let mut client = self.inner.api_client.lock().await;
            client.set_header(AUTHORIZATION, &bearer)?;
            match endpoint.method {
                CommandMethod::Post => {
                    client
                        .post(url.as_str(), String::new(), ExpectedStatus::Success)
                        .await?
                }
                CommandMethod::Put => client.put(url.as_str(), ExpectedStatus::Success).await?,
            };
        }

        if let Some(change) = command.state_change() {
            self.inner.apply(change);
        }
        info!(?command, "Player command accepted");
        Ok(())
    }

    pub async fn play(&self) -> SessionResult<()> {
        self.send_player_command(PlayerCommand::Play).await
    }

    pub async fn pause(&self) -> SessionResult<()> {
        self.send_player_command(PlayerCommand::Pause).await
    }

    pub async fn skip_to_next(&self) -> SessionResult<()> {
        self.send_player_command(PlayerCommand::SkipNext).await
    }

    pub async fn skip_to_previous(&self) -> SessionResult<()> {
        self.send_player_command(PlayerCommand::SkipPrev).await
    }

    /// Flip shuffle and return the new mode
    pub async fn toggle_shuffle(&self) -> SessionResult<ShuffleState> {
        let target = self.shuffle_state().toggled();
        self.send_player_command(PlayerCommand::shuffle(target))
            .await?;
        Ok(target)
    }

    /// Advance repeat along Off → Context → Track → Off and return the new mode
    pub async fn toggle_repeat(&self) -> SessionResult<RepeatState> {
        let target = self.repeat_state().next();
        self.send_player_command(PlayerCommand::repeat(target))
            .await?;
        Ok(target)
    }

    pub fn play_state(&self) -> PlayState {
        self.playback_state().play
    }

    pub fn shuffle_state(&self) -> ShuffleState {
        self.playback_state().shuffle
    }

    pub fn repeat_state(&self) -> RepeatState {
        self.playback_state().repeat
    }

    /// Snapshot of all mirrored axes
    pub fn playback_state(&self) -> PlaybackState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the Spotify configuration
    pub fn config(&self) -> &SpotifyConfig {
        &self.inner.config
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        let refresher = self
            .refresher
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = refresher.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("config", &self.inner.config)
            .field("state", &self.playback_state())
            .finish_non_exhaustive()
    }
}

impl SessionInner {
    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    async fn refresh_access_token(&self) -> SessionResult<()> {
        let response = {
            let mut client = self.token_client.lock().await;
            client
                .post(
                    &self.config.token_url,
                    refresh_grant_body(&self.config.refresh_token),
                    ExpectedStatus::OK,
                )
                .await?
        };

        let token = AccessToken::from_response(&response.body)?;
        *self.token.write().await = Some(token);
        info!("Access token refreshed");
        Ok(())
    }

    /// Copy the bearer header value; the lock is released before any request
    async fn bearer(&self) -> SessionResult<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(AccessToken::bearer)
            .ok_or(SessionError::AuthNotReady)
    }

    fn apply(&self, change: StateChange) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(change);
    }
}

fn spawn_refresher(inner: Arc<SessionInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = inner.config.token_refresh_interval;
        debug!(interval_secs = interval.as_secs(), "Token refresh task started");

        loop {
            tokio::time::sleep(interval).await;
            if let Err(e) = inner.refresh_access_token().await {
                warn!(error = %e, "Token refresh failed; keeping previous token");
            }
        }
    }
    .in_current_span())
}
