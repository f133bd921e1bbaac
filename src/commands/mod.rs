mod info;
mod playback;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RemoteResult;
use crate::reply::Responder;
use crate::spotify::{self, MusicService};
use crate::state::SharedState;

/// Every command starts with this
pub const PREFIX: &str = "=";

/// How long skip/previous wait before asking what is playing now
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Skip,
    Previous,
    Forward,
    Now,
    Help,
}

/// Command names and their aliases, case-sensitive
const COMMANDS: &[(Command, &str, &[&str])] = &[
    (Command::Play, "play", &["p"]),
    (Command::Pause, "pause", &["pa"]),
    (Command::Skip, "skip", &["s"]),
    (Command::Previous, "previous", &["pr"]),
    (Command::Forward, "forward", &["fr"]),
    (Command::Now, "now", &["np"]),
    (Command::Help, "help", &["h"]),
];

/// Routes prefixed chat messages to handlers.
///
/// Owns the playback record and the music service handle. The handle is
/// empty until startup authorization succeeds; until then every remote
/// command answers with a not-established message.
pub struct Dispatcher {
    routes: HashMap<&'static str, Command>,
    remote: RwLock<Option<Arc<dyn MusicService>>>,
    state: SharedState,
    settle_delay: Duration,
}

impl Dispatcher {
    pub fn new(state: SharedState) -> Self {
        let mut routes = HashMap::new();
        for (command, name, aliases) in COMMANDS {
            routes.insert(*name, *command);
            for alias in *aliases {
                routes.insert(*alias, *command);
            }
        }

        Self {
            routes,
            remote: RwLock::new(None),
            state,
            settle_delay: SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Make the music service available to handlers
    pub fn install_remote(&self, remote: Arc<dyn MusicService>) {
        *self.remote.write() = Some(remote);
    }

    /// Pick the playback device through `service`, then install it.
    ///
    /// Nothing is installed when device listing fails, so commands keep
    /// answering "not established". An empty device list still installs
    /// the service, with no device id.
    pub async fn establish(&self, service: Arc<dyn MusicService>) -> RemoteResult<()> {
        let device = spotify::discover_device(service.as_ref()).await?;
        self.state.write().device_id = device.map(|device| device.id);
        self.install_remote(service);
        Ok(())
    }

    pub fn is_established(&self) -> bool {
        self.remote.read().is_some()
    }

    fn remote(&self) -> Option<Arc<dyn MusicService>> {
        self.remote.read().clone()
    }

    fn device_id(&self) -> Option<String> {
        self.state.read().device_id.clone()
    }

    /// Split a message into a known command and its (non-empty) argument text
    pub fn parse<'a>(&self, content: &'a str) -> Option<(Command, Option<&'a str>)> {
        let body = content.strip_prefix(PREFIX)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim())),
            None => (body, None),
        };
        let command = *self.routes.get(name)?;
        Some((command, rest.filter(|rest| !rest.is_empty())))
    }

    /// Handle one chat message. Returns false when it was not a command.
    pub async fn dispatch(&self, content: &str, out: &dyn Responder) -> bool {
        let Some((command, args)) = self.parse(content) else {
            return false;
        };

        log::debug!("Dispatching {:?} with args {:?}", command, args);

        // Only play consumes the whole remainder; the rest take one word
        let first_word = args.and_then(|args| args.split_whitespace().next());

        match command {
            Command::Play => self.play(args, out).await,
            Command::Pause => self.pause(out).await,
            Command::Skip => self.skip(out).await,
            Command::Previous => self.previous(out).await,
            Command::Forward => self.forward(first_word, out).await,
            Command::Now => self.now(out).await,
            Command::Help => self.help(first_word, out).await,
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_state;
    use crate::testing::{Call, Collector, FakeService};
    use crate::types::Device;

    #[test]
    fn parses_names_and_aliases() {
        let dispatcher = Dispatcher::new(create_state());
        assert_eq!(dispatcher.parse("=play"), Some((Command::Play, None)));
        assert_eq!(
            dispatcher.parse("=p  daft punk  "),
            Some((Command::Play, Some("daft punk")))
        );
        assert_eq!(dispatcher.parse("=np"), Some((Command::Now, None)));
        assert_eq!(dispatcher.parse("=fr 30"), Some((Command::Forward, Some("30"))));
    }

    #[test]
    fn ignores_unknown_and_unprefixed_messages() {
        let dispatcher = Dispatcher::new(create_state());
        assert_eq!(dispatcher.parse("play something"), None);
        assert_eq!(dispatcher.parse("=volume 10"), None);
        assert_eq!(dispatcher.parse("=PLAY"), None);
        assert_eq!(dispatcher.parse("= play"), None);
    }

    #[tokio::test]
    async fn every_remote_command_reports_not_established() {
        let dispatcher = Dispatcher::new(create_state());
        let out = Collector::default();

        for message in ["=play", "=play x", "=pause", "=skip", "=previous", "=forward", "=now"] {
            assert!(dispatcher.dispatch(message, &out).await);
        }

        let texts = out.texts();
        assert_eq!(texts.len(), 7);
        assert_eq!(
            texts[0],
            "Spotify connection not established. Please check your credentials."
        );
        assert_eq!(texts[1], texts[0]);
        assert!(texts[2..]
            .iter()
            .all(|text| text == "Spotify connection not established."));
    }

    #[tokio::test]
    async fn installed_remote_receives_calls() {
        let dispatcher = Dispatcher::new(create_state()).with_settle_delay(Duration::ZERO);
        let service = Arc::new(FakeService::default());
        dispatcher.install_remote(service.clone());
        assert!(dispatcher.is_established());

        let out = Collector::default();
        dispatcher.dispatch("=now", &out).await;

        assert_eq!(service.calls(), vec![Call::CurrentPlayback]);
        assert_eq!(out.texts(), vec!["Nothing is currently playing."]);
    }

    fn device(id: &str, is_active: bool) -> Device {
        Device {
            id: id.to_string(),
            name: format!("Speaker {id}"),
            is_active,
        }
    }

    #[tokio::test]
    async fn establish_targets_first_active_device() {
        let dispatcher = Dispatcher::new(create_state());
        let service = Arc::new(FakeService::default());
        service.state.lock().devices = vec![
            device("phone", false),
            device("desktop", true),
            device("speaker", true),
        ];

        dispatcher.establish(service.clone()).await.unwrap();

        assert!(dispatcher.is_established());
        assert_eq!(dispatcher.device_id().as_deref(), Some("desktop"));
        assert_eq!(service.calls(), vec![Call::Devices]);
    }

    #[tokio::test]
    async fn establish_with_no_devices_installs_without_target() {
        let dispatcher = Dispatcher::new(create_state());
        let service = Arc::new(FakeService::default());

        dispatcher.establish(service).await.unwrap();

        assert!(dispatcher.is_established());
        assert_eq!(dispatcher.device_id(), None);
    }

    #[tokio::test]
    async fn failed_device_listing_leaves_commands_not_established() {
        let dispatcher = Dispatcher::new(create_state());
        let service = Arc::new(FakeService::default());
        service.state.lock().fail_with = Some("The access token expired".into());

        let err = dispatcher.establish(service.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "The access token expired");
        assert!(!dispatcher.is_established());
        assert_eq!(dispatcher.device_id(), None);

        let out = Collector::default();
        dispatcher.dispatch("=pause", &out).await;
        assert_eq!(out.texts(), vec!["Spotify connection not established."]);
        assert_eq!(service.calls(), vec![Call::Devices]);
    }

    #[tokio::test]
    async fn non_commands_are_not_dispatched() {
        let dispatcher = Dispatcher::new(create_state());
        let out = Collector::default();
        assert!(!dispatcher.dispatch("hello there", &out).await);
        assert!(out.replies().is_empty());
    }
}
