//! In-memory stand-ins for the music service and the chat channel.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::{RemoteError, RemoteResult};
use crate::reply::{Reply, Responder};
use crate::spotify::{MusicService, PlayContext};
use crate::types::{Device, Playback, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Devices,
    Track(String),
    Search(String),
    PlayTrack { uri: String, device: Option<String> },
    PlayContext { context: PlayContext, device: Option<String> },
    Resume(Option<String>),
    Pause(Option<String>),
    Next(Option<String>),
    Previous(Option<String>),
    Seek { position_ms: u64, device: Option<String> },
    CurrentPlayback,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub devices: Vec<Device>,
    /// Lookup table keyed by track id
    pub tracks: HashMap<String, Track>,
    pub search_results: Vec<Track>,
    pub playback: Option<Playback>,
    /// Replaces `playback` once next/previous is called
    pub after_change: Option<Playback>,
    /// Every call fails with this text when set
    pub fail_with: Option<String>,
    /// Only play_track/play_context fail with this text when set
    pub reject_playback: Option<String>,
    pub calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct FakeService {
    pub state: Mutex<FakeState>,
}

impl FakeService {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: Call) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match &state.fail_with {
            Some(message) => Err(RemoteError::Api(message.clone())),
            None => Ok(()),
        }
    }

    fn record_playback(&self, call: Call) -> RemoteResult<()> {
        self.record(call)?;
        match &self.state.lock().reject_playback {
            Some(message) => Err(RemoteError::Api(message.clone())),
            None => Ok(()),
        }
    }

    fn track_changed(&self) {
        let mut state = self.state.lock();
        if let Some(next) = state.after_change.take() {
            state.playback = Some(next);
        }
    }
}

fn owned(device_id: Option<&str>) -> Option<String> {
    device_id.map(str::to_string)
}

#[async_trait]
impl MusicService for FakeService {
    async fn devices(&self) -> RemoteResult<Vec<Device>> {
        self.record(Call::Devices)?;
        Ok(self.state.lock().devices.clone())
    }

    async fn track(&self, id: &str) -> RemoteResult<Track> {
        self.record(Call::Track(id.to_string()))?;
        self.state
            .lock()
            .tracks
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::Api(format!("non existing id: {id}")))
    }

    async fn search_track(&self, query: &str) -> RemoteResult<Option<Track>> {
        self.record(Call::Search(query.to_string()))?;
        Ok(self.state.lock().search_results.first().cloned())
    }

    async fn play_track(&self, uri: &str, device_id: Option<&str>) -> RemoteResult<()> {
        self.record_playback(Call::PlayTrack {
            uri: uri.to_string(),
            device: owned(device_id),
        })
    }

    async fn play_context(
        &self,
        context: &PlayContext,
        device_id: Option<&str>,
    ) -> RemoteResult<()> {
        self.record_playback(Call::PlayContext {
            context: context.clone(),
            device: owned(device_id),
        })
    }

    async fn resume(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.record(Call::Resume(owned(device_id)))
    }

    async fn pause(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.record(Call::Pause(owned(device_id)))
    }

    async fn next_track(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.record(Call::Next(owned(device_id)))?;
        self.track_changed();
        Ok(())
    }

    async fn previous_track(&self, device_id: Option<&str>) -> RemoteResult<()> {
        self.record(Call::Previous(owned(device_id)))?;
        self.track_changed();
        Ok(())
    }

    async fn seek(&self, position_ms: u64, device_id: Option<&str>) -> RemoteResult<()> {
        self.record(Call::Seek {
            position_ms,
            device: owned(device_id),
        })
    }

    async fn current_playback(&self) -> RemoteResult<Option<Playback>> {
        self.record(Call::CurrentPlayback)?;
        Ok(self.state.lock().playback.clone())
    }
}

/// Collects replies instead of sending them anywhere
#[derive(Debug, Default)]
pub struct Collector {
    pub replies: Mutex<Vec<Reply>>,
}

impl Collector {
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }

    /// Text replies only, in order
    pub fn texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .iter()
            .filter_map(|reply| match reply {
                Reply::Text(text) => Some(text.clone()),
                Reply::Embed(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Responder for Collector {
    async fn send(&self, reply: Reply) {
        self.replies.lock().push(reply);
    }
}

pub fn track(id: &str, title: &str, artist: &str) -> Track {
    Track {
        uri: format!("spotify:track:{id}"),
        title: title.to_string(),
        artist: artist.to_string(),
        album: format!("{title} (Single)"),
        duration_ms: 200_000,
        artwork_url: Some(format!("https://i.scdn.co/image/{id}")),
    }
}
