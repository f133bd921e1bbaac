use url::Url;

/// What a Spotify link points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyLink {
    Track(String),
    Playlist(String),
    Album(String),
    /// Recognizably a Spotify link, but not something we can play
    Unsupported,
}

/// Classify a play query.
///
/// Returns `None` for free text that should go to search, including URLs on
/// other hosts. Accepts `open.spotify.com/<kind>/<id>` links (scheme, locale
/// or `embed` segment and query string optional) and `spotify:<kind>:<id>` URIs.
pub fn classify(query: &str) -> Option<SpotifyLink> {
    let query = query.trim();

    if let Some(rest) = query.strip_prefix("spotify:") {
        let mut parts = rest.split(':');
        return Some(from_parts(parts.next(), parts.next()));
    }

    if !query.contains("spotify.com") {
        return None;
    }

    let with_scheme = if query.contains("://") {
        query.to_string()
    } else {
        format!("https://{query}")
    };

    let Ok(url) = Url::parse(&with_scheme) else {
        return Some(SpotifyLink::Unsupported);
    };

    // "spotify.com" elsewhere in the text (a query parameter, say) doesn't count
    let on_spotify = url
        .host_str()
        .is_some_and(|host| host == "spotify.com" || host.ends_with(".spotify.com"));
    if !on_spotify {
        return None;
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty() && *s != "embed" && !s.starts_with("intl-"));

    Some(from_parts(segments.next(), segments.next()))
}

fn from_parts(kind: Option<&str>, id: Option<&str>) -> SpotifyLink {
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        return SpotifyLink::Unsupported;
    };

    match kind {
        Some("track") => SpotifyLink::Track(id.to_string()),
        Some("playlist") => SpotifyLink::Playlist(id.to_string()),
        Some("album") => SpotifyLink::Album(id.to_string()),
        _ => SpotifyLink::Unsupported,
    }
}
