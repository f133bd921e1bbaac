use crate::reply::{EmbedReply, Reply, Responder};

use super::Dispatcher;

const BAR_LENGTH: u64 = 20;

/// Help entries in display order; topics match by substring on the key
const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "play (p)",
        "Play a song from Spotify. Usage: =play <song name or Spotify URL>",
    ),
    ("pause (pa)", "Pause the currently playing song."),
    ("skip (s)", "Skip to the next song."),
    ("previous (pr)", "Go back to the previous song."),
    (
        "forward (fr)",
        "Fast forward the current song by a specified number of seconds (default: 15).",
    ),
    (
        "now (np)",
        "Display information about the currently playing track.",
    ),
    ("help (h)", "Display this help message."),
];

/// `MM:SS` from milliseconds
pub fn format_clock(ms: u64) -> String {
    format!("{:02}:{:02}", ms / 60_000, (ms % 60_000) / 1000)
}

/// Fixed-width bar with `floor(20 * progress / duration)` filled cells
pub fn progress_bar(progress_ms: u64, duration_ms: u64) -> String {
    let filled = if duration_ms == 0 {
        0
    } else {
        let cells = u128::from(progress_ms) * u128::from(BAR_LENGTH) / u128::from(duration_ms);
        cells.min(u128::from(BAR_LENGTH)) as u64
    };

    let mut bar = "▓".repeat(filled as usize);
    bar.push_str(&"░".repeat((BAR_LENGTH - filled) as usize));
    bar
}

fn help_embed(topic: Option<&str>) -> EmbedReply {
    let mut embed = EmbedReply::new("Spotify Discord Bot Help")
        .description("Here are the available commands:")
        .footer("Prefix: =");

    match topic {
        Some(topic) => {
            let topic = topic.to_lowercase();
            embed = match HELP_TOPICS.iter().find(|(key, _)| key.contains(topic.as_str())) {
                Some((key, description)) => embed.field(format!("={key}"), *description, false),
                None => embed.field(
                    "Command not found",
                    format!("No help available for '{topic}'"),
                    false,
                ),
            };
        }
        None => {
            for (key, description) in HELP_TOPICS {
                embed = embed.field(format!("={key}"), *description, false);
            }
        }
    }

    embed
}

impl Dispatcher {
    pub(crate) async fn now(&self, out: &dyn Responder) {
        let Some(remote) = self.remote() else {
            out.send(Reply::text("Spotify connection not established.")).await;
            return;
        };

        let (track, progress_ms) = match remote.current_playback().await {
            Ok(Some(playback)) => match playback.item {
                Some(track) => (track, playback.progress_ms),
                None => {
                    out.send(Reply::text("Nothing is currently playing.")).await;
                    return;
                }
            },
            Ok(None) => {
                out.send(Reply::text("Nothing is currently playing.")).await;
                return;
            }
            Err(e) => {
                out.send(Reply::text(format!("Error getting current track info: {e}")))
                    .await;
                return;
            }
        };

        let progress = format!(
            "`{} {} {}`",
            format_clock(progress_ms),
            progress_bar(progress_ms, track.duration_ms),
            format_clock(track.duration_ms)
        );

        let mut embed = EmbedReply::new("Now Playing")
            .description(format!("**{}**\nby {}", track.title, track.artist));
        if let Some(url) = track.artwork_url {
            embed = embed.thumbnail(url);
        }
        embed = embed
            .field("Progress", progress, false)
            .field("Album", track.album, true);

        out.send(Reply::Embed(embed)).await;
    }

    /// Static, never touches the music service
    pub(crate) async fn help(&self, topic: Option<&str>, out: &dyn Responder) {
        out.send(Reply::Embed(help_embed(topic))).await;
    }
}
