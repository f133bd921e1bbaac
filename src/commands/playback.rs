use crate::link::{self, SpotifyLink};
use crate::reply::{Reply, Responder};
use crate::spotify::{MusicService, PlayContext};
use crate::types::{Playback, Track};

use super::Dispatcher;

const NOT_ESTABLISHED: &str = "Spotify connection not established.";
const NOT_ESTABLISHED_PLAY: &str =
    "Spotify connection not established. Please check your credentials.";
const NOTHING_PLAYING: &str = "Nothing is currently playing.";
const PLAY_USAGE: &str =
    "Please provide a song name or Spotify URL. Usage: =play <song name or Spotify URL>";

const DEFAULT_FORWARD_SECONDS: i64 = 15;

/// Direction for skip/previous
#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
}

impl Step {
    fn changed(self, track: &Track) -> String {
        match self {
            Step::Next => format!("⏭️ Skipped to: {} by {}", track.title, track.artist),
            Step::Previous => format!("⏮️ Went back to: {} by {}", track.title, track.artist),
        }
    }

    fn unknown(self) -> &'static str {
        match self {
            Step::Next => "⏭️ Skipped to next track",
            Step::Previous => "⏮️ Went back to previous track",
        }
    }

    fn error_prefix(self) -> &'static str {
        match self {
            Step::Next => "Error skipping track",
            Step::Previous => "Error going to previous track",
        }
    }
}

impl Dispatcher {
    pub(crate) async fn play(&self, query: Option<&str>, out: &dyn Responder) {
        let Some(remote) = self.remote() else {
            out.send(Reply::text(NOT_ESTABLISHED_PLAY)).await;
            return;
        };

        let Some(query) = query else {
            self.resume(remote.as_ref(), out).await;
            return;
        };

        let track = match link::classify(query) {
            None => {
                out.send(Reply::text(format!("🔍 Searching for: {query}"))).await;
                match remote.search_track(query).await {
                    Ok(Some(track)) => track,
                    Ok(None) => {
                        out.send(Reply::text(format!("No results found for: {query}")))
                            .await;
                        return;
                    }
                    Err(e) => {
                        out.send(Reply::text(format!("Error searching for track: {e}")))
                            .await;
                        return;
                    }
                }
            }
            Some(SpotifyLink::Track(id)) => match remote.track(&id).await {
                Ok(track) => track,
                Err(e) => {
                    out.send(Reply::text(format!("Error processing Spotify URL: {e}")))
                        .await;
                    return;
                }
            },
            Some(SpotifyLink::Playlist(id)) => {
                let context = PlayContext::Playlist(id);
                self.play_context(remote.as_ref(), &context, query, out).await;
                return;
            }
            Some(SpotifyLink::Album(id)) => {
                let context = PlayContext::Album(id);
                self.play_context(remote.as_ref(), &context, query, out).await;
                return;
            }
            Some(SpotifyLink::Unsupported) => {
                out.send(Reply::text(
                    "Unsupported Spotify URL. Please provide a track, playlist, or album URL.",
                ))
                .await;
                return;
            }
        };

        let device_id = self.device_id();
        match remote.play_track(&track.uri, device_id.as_deref()).await {
            Ok(()) => {
                self.state.write().set_track(&track, true);
                out.send(Reply::text(format!(
                    "▶️ Now playing: {} by {}",
                    track.title, track.artist
                )))
                .await;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error playing track: {e}"))).await;
            }
        }
    }

    /// Bare `play`: pick the cached track back up if it is paused
    async fn resume(&self, remote: &dyn MusicService, out: &dyn Responder) {
        let (resumable, device_id) = {
            let state = self.state.read();
            (state.has_track() && !state.is_playing, state.device_id.clone())
        };

        if !resumable {
            out.send(Reply::text(PLAY_USAGE)).await;
            return;
        }

        match remote.resume(device_id.as_deref()).await {
            Ok(()) => {
                let message = {
                    let mut state = self.state.write();
                    state.is_playing = true;
                    format!(
                        "▶️ Resumed playing: {} by {}",
                        state.title.as_deref().unwrap_or_default(),
                        state.artist.as_deref().unwrap_or_default()
                    )
                };
                out.send(Reply::text(message)).await;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error resuming playback: {e}")))
                    .await;
            }
        }
    }

    /// Playlists and albums play as a context; the cached track is left alone
    async fn play_context(
        &self,
        remote: &dyn MusicService,
        context: &PlayContext,
        query: &str,
        out: &dyn Responder,
    ) {
        let kind = match context {
            PlayContext::Playlist(_) => "playlist",
            PlayContext::Album(_) => "album",
        };

        out.send(Reply::text(format!("Loading {kind}: {query}"))).await;

        let device_id = self.device_id();
        match remote.play_context(context, device_id.as_deref()).await {
            Ok(()) => {
                self.state.write().is_playing = true;
                out.send(Reply::text(format!("▶️ Playing {kind}"))).await;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error processing Spotify URL: {e}")))
                    .await;
            }
        }
    }

    pub(crate) async fn pause(&self, out: &dyn Responder) {
        let Some(remote) = self.remote() else {
            out.send(Reply::text(NOT_ESTABLISHED)).await;
            return;
        };

        let (is_playing, device_id) = {
            let state = self.state.read();
            (state.is_playing, state.device_id.clone())
        };

        // Trusts the cache, not a live query
        if !is_playing {
            out.send(Reply::text(NOTHING_PLAYING)).await;
            return;
        }

        match remote.pause(device_id.as_deref()).await {
            Ok(()) => {
                self.state.write().is_playing = false;
                out.send(Reply::text("⏸️ Playback paused")).await;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error pausing playback: {e}")))
                    .await;
            }
        }
    }

    pub(crate) async fn skip(&self, out: &dyn Responder) {
        self.step(Step::Next, out).await;
    }

    pub(crate) async fn previous(&self, out: &dyn Responder) {
        self.step(Step::Previous, out).await;
    }

    async fn step(&self, step: Step, out: &dyn Responder) {
        let Some(remote) = self.remote() else {
            out.send(Reply::text(NOT_ESTABLISHED)).await;
            return;
        };

        let device_id = self.device_id();
        let result = match step {
            Step::Next => remote.next_track(device_id.as_deref()).await,
            Step::Previous => remote.previous_track(device_id.as_deref()).await,
        };
        if let Err(e) = result {
            out.send(Reply::text(format!("{}: {e}", step.error_prefix())))
                .await;
            return;
        }

        // The service needs a moment before it reports the new track
        tokio::time::sleep(self.settle_delay).await;

        match remote.current_playback().await {
            Ok(Some(Playback {
                item: Some(track),
                is_playing,
                ..
            })) => {
                self.state.write().set_track(&track, is_playing);
                out.send(Reply::text(step.changed(&track))).await;
            }
            Ok(_) => {
                out.send(Reply::text(step.unknown())).await;
            }
            Err(e) => {
                out.send(Reply::text(format!("{}: {e}", step.error_prefix())))
                    .await;
            }
        }
    }

    pub(crate) async fn forward(&self, seconds: Option<&str>, out: &dyn Responder) {
        let Some(remote) = self.remote() else {
            out.send(Reply::text(NOT_ESTABLISHED)).await;
            return;
        };

        let seconds = match seconds {
            None => DEFAULT_FORWARD_SECONDS,
            Some(raw) => match raw.parse::<i64>() {
                Ok(seconds) => seconds,
                Err(_) => {
                    out.send(Reply::text(format!("Invalid number of seconds: {raw}")))
                        .await;
                    return;
                }
            },
        };

        let playback = match remote.current_playback().await {
            Ok(Some(playback)) => playback,
            Ok(None) => {
                out.send(Reply::text(NOTHING_PLAYING)).await;
                return;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error forwarding: {e}"))).await;
                return;
            }
        };

        // Past-the-end positions are the service's problem; below zero is not a position
        let position_ms = i64::try_from(playback.progress_ms)
            .unwrap_or(i64::MAX)
            .saturating_add(seconds.saturating_mul(1000))
            .max(0) as u64;

        let device_id = self.device_id();
        match remote.seek(position_ms, device_id.as_deref()).await {
            Ok(()) => {
                out.send(Reply::text(format!("⏩ Forwarded {seconds} seconds")))
                    .await;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error forwarding: {e}"))).await;
            }
        }
    }
}
