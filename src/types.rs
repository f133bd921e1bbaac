/// An output device reported by the music service
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// A single track as returned by lookups, searches and playback queries
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub uri: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
}

/// Snapshot of what the service is currently doing
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub item: Option<Track>,
    pub progress_ms: u64,
    pub is_playing: bool,
}

/// The bot's last-known view of playback.
///
/// `title` and `artist` only mean something while `track_uri` is set.
/// `is_playing` is best effort and is only re-synced after skip/previous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub track_uri: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub is_playing: bool,
    pub device_id: Option<String>,
}

impl PlaybackState {
    /// Replace the track fields and the playing flag wholesale
    pub fn set_track(&mut self, track: &Track, is_playing: bool) {
        self.track_uri = Some(track.uri.clone());
        self.title = Some(track.title.clone());
        self.artist = Some(track.artist.clone());
        self.is_playing = is_playing;
    }

    pub fn has_track(&self) -> bool {
        self.track_uri.is_some()
    }
}
