use async_trait::async_trait;
use rspotify::{
    model::{
        AdditionalType, AlbumId, FullTrack, PlayContextId, PlayableId, PlayableItem, PlaylistId,
        SearchResult, SearchType, TrackId,
    },
    prelude::*,
    scopes, AuthCodeSpotify, Credentials, OAuth,
};

use crate::config::SpotifyConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::types::{Device, Playback, Track};

/// A collection that can be played as a whole
#[derive(Debug, Clone, PartialEq)]
pub enum PlayContext {
    Playlist(String),
    Album(String),
}

/// The slice of the music service the bot drives.
///
/// Every call returns a typed result; handlers decide what to tell the user.
#[async_trait]
pub trait MusicService: Send + Sync {
    async fn devices(&self) -> RemoteResult<Vec<Device>>;

    /// Look up a single track by id or URI
    async fn track(&self, id: &str) -> RemoteResult<Track>;

    /// Single-result track search
    async fn search_track(&self, query: &str) -> RemoteResult<Option<Track>>;

    async fn play_track(&self, uri: &str, device_id: Option<&str>) -> RemoteResult<()>;

    async fn play_context(&self, context: &PlayContext, device_id: Option<&str>)
        -> RemoteResult<()>;

    async fn resume(&self, device_id: Option<&str>) -> RemoteResult<()>;

    async fn pause(&self, device_id: Option<&str>) -> RemoteResult<()>;

    async fn next_track(&self, device_id: Option<&str>) -> RemoteResult<()>;

    async fn previous_track(&self, device_id: Option<&str>) -> RemoteResult<()>;

    async fn seek(&self, position_ms: u64, device_id: Option<&str>) -> RemoteResult<()>;

    /// `None` when the service reports no active playback
    async fn current_playback(&self) -> RemoteResult<Option<Playback>>;
}

/// rspotify-backed implementation using the authorization-code flow
pub struct SpotifyService {
    client: AuthCodeSpotify,
}

impl SpotifyService {
    /// Authorize against Spotify.
    ///
    /// Uses the cached token when there is one, otherwise prints the
    /// authorization URL and waits for the redirect URL on stdin.
    pub async fn connect(config: &SpotifyConfig) -> RemoteResult<Self> {
        let creds = Credentials::new(&config.client_id, &config.client_secret);
        let oauth = OAuth {
            redirect_uri: config.redirect_uri.clone(),
            scopes: scopes!(
                "user-read-playback-state",
                "user-modify-playback-state",
                "user-read-currently-playing"
            ),
            ..Default::default()
        };

        let mut client_config = rspotify::Config {
            token_cached: true,
            token_refreshing: true,
            ..Default::default()
        };
        if let Some(path) = &config.token_cache {
            client_config.cache_path = path.clone();
        }

        let client = AuthCodeSpotify::with_config(creds, oauth, client_config);

        let url = client
            .get_authorize_url(false)
            .map_err(|e| RemoteError::Auth(e.to_string()))?;
        client
            .prompt_for_token(&url)
            .await
            .map_err(|e| RemoteError::Auth(e.to_string()))?;

        log::info!("Spotify authorization complete");

        Ok(Self { client })
    }
}

fn convert_track(track: FullTrack) -> Track {
    Track {
        uri: track.id.as_ref().map(|id| id.uri()).unwrap_or_default(),
        title: track.name,
        artist: track
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default(),
        album: track.album.name,
        duration_ms: track.duration.num_milliseconds().max(0) as u64,
        artwork_url: track.album.images.into_iter().next().map(|image| image.url),
    }
}

#[async_trait]
impl MusicService for SpotifyService {
    async fn devices(&self) -> RemoteResult<Vec<Device>> {
        let devices = self.client.device().await?;
        Ok(devices
            .into_iter()
            .filter_map(|device| {
                // Restricted devices come back without an id and can't be targeted
                device.id.map(|id| Device {
                    id,
                    name: device.name,
                    is_active: device.is_active,
                })
            })
            .collect())
    }

    async fn track(&self, id: &str) -> RemoteResult<Track> {
        let id = TrackId::from_id_or_uri(id)?;
        let track = self.client.track(id, None).await?;
        Ok(convert_track(track))
    }

    async fn search_track(&self, query: &str) -> RemoteResult<Option<Track>> {
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await?;

        match result {
            SearchResult::Tracks(page) => Ok(page.items.into_iter().next().map(convert_track)),
            _ => Ok(None),
        }
    }

    async fn play_track(&self, uri: &str, device_id: Option<&str>) -> RemoteResult<()> {
        let id = TrackId::from_id_or_uri(uri)?;
        self.client
            .start_uris_playback([PlayableId::Track(id)], device_id, None, None)
            .await?;
        Ok(())
    }

    async fn play_context(
        &self,
        context: &PlayContext,
        device_id: Option<&str>,
    ) -> RemoteResult<()> {
        let context_id = match context {
            PlayContext::Playlist(id) => PlayContextId::Playlist(PlaylistId::from_id_or_uri(id)?),
            PlayContext::Album(id) => PlayContextId::Album(AlbumId::from_id_or_uri(id)?),
        };
        self.client
            .start_context_playback(context_id, device_id, None, None)
            .await?;
        Ok(())
    }

    async fn resume(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.client.resume_playback(device_id, None).await?;
        Ok(())
    }

    async fn pause(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.client.pause_playback(device_id).await?;
        Ok(())
    }

    async fn next_track(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.client.next_track(device_id).await?;
        Ok(())
    }

    async fn previous_track(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.client.previous_track(device_id).await?;
        Ok(())
    }

    async fn seek(&self, position_ms: u64, device_id: Option<&str>) -> RemoteResult<()> {
        let position = chrono::Duration::milliseconds(position_ms.min(i64::MAX as u64) as i64);
        self.client.seek_track(position, device_id).await?;
        Ok(())
    }

    async fn current_playback(&self) -> RemoteResult<Option<Playback>> {
        let context = self
            .client
            .current_playback(None, Some(&[AdditionalType::Track]))
            .await?;

        Ok(context.map(|context| Playback {
            item: match context.item {
                Some(PlayableItem::Track(track)) => Some(convert_track(track)),
                _ => None,
            },
            progress_ms: context
                .progress
                .map(|p| p.num_milliseconds().max(0) as u64)
                .unwrap_or(0),
            is_playing: context.is_playing,
        }))
    }
}

/// Pick the output device: the first active one, else the first listed
pub fn select_device(devices: &[Device]) -> Option<&Device> {
    devices
        .iter()
        .find(|device| device.is_active)
        .or_else(|| devices.first())
}

/// List devices, log them, and return the one playback should target
pub async fn discover_device(service: &dyn MusicService) -> RemoteResult<Option<Device>> {
    let devices = service.devices().await?;

    if devices.is_empty() {
        log::warn!("No Spotify devices found. Please open Spotify on your device.");
        return Ok(None);
    }

    log::info!("Spotify connected! Available devices:");
    for device in &devices {
        log::info!("- {} ({})", device.name, device.id);
    }

    let chosen = select_device(&devices).cloned();
    if let Some(device) = &chosen {
        if device.is_active {
            log::info!("Using active device: {}", device.name);
        } else {
            log::info!("Using device: {}", device.name);
        }
    }

    Ok(chosen)
}
