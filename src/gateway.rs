use anyhow::{Context as _, Result};
use serenity::all::{
    ChannelId, Client, Colour, Context, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EventHandler, GatewayIntents, GuildId, Http, Message, Ready,
};
use serenity::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::commands::Dispatcher;
use crate::config::Config;
use crate::error::RemoteResult;
use crate::reply::{EmbedReply, Reply, Responder};
use crate::spotify::{MusicService, SpotifyService};

const EMBED_COLOUR: Colour = Colour::new(0x2E_CC71);

/// Sends replies back to the channel a command came from
struct ChannelResponder {
    http: Arc<Http>,
    channel_id: ChannelId,
}

fn render_embed(embed: EmbedReply) -> CreateEmbed {
    let mut rendered = CreateEmbed::new().title(embed.title).colour(EMBED_COLOUR);
    if let Some(description) = embed.description {
        rendered = rendered.description(description);
    }
    for field in embed.fields {
        rendered = rendered.field(field.name, field.value, field.inline);
    }
    if let Some(url) = embed.thumbnail {
        rendered = rendered.thumbnail(url);
    }
    if let Some(footer) = embed.footer {
        rendered = rendered.footer(CreateEmbedFooter::new(footer));
    }
    rendered
}

#[async_trait]
impl Responder for ChannelResponder {
    async fn send(&self, reply: Reply) {
        let result = match reply {
            Reply::Text(text) => self.channel_id.say(&self.http, text).await,
            Reply::Embed(embed) => {
                let message = CreateMessage::new().embed(render_embed(embed));
                self.channel_id.send_message(&self.http, message).await
            }
        };

        if let Err(e) = result {
            log::error!("Failed to send reply to channel {}: {}", self.channel_id, e);
        }
    }
}

/// Gateway event handler: startup on ready, command dispatch on message
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    config: Config,
    connecting: AtomicBool,
}

impl Handler {
    pub fn new(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            config,
            connecting: AtomicBool::new(false),
        }
    }

    /// Run `connect` and install the service it yields.
    ///
    /// Skipped when a service is already installed or another attempt is in
    /// flight. A failed attempt clears the flag so the next ready can retry.
    /// Returns whether an attempt was made.
    async fn establish_once<F, Fut>(&self, connect: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RemoteResult<Arc<dyn MusicService>>>,
    {
        if self.dispatcher.is_established() || self.connecting.swap(true, Ordering::SeqCst) {
            return false;
        }

        let result = match connect().await {
            Ok(service) => self
                .dispatcher
                .establish(service)
                .await
                .context("Failed to list Spotify devices"),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            log::error!("Error connecting to Spotify: {:#}", e);
            log::error!(
                "Please make sure your Spotify credentials are correct and you have authorized the application."
            );
        }
        self.connecting.store(false, Ordering::SeqCst);

        true
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("{} has connected to Discord!", ready.user.name);

        let guild_id = GuildId::new(self.config.guild_id);
        match guild_id.to_partial_guild(&ctx.http).await {
            Ok(guild) => log::info!("Connected to the following guild: {}", guild.name),
            Err(e) => log::warn!("Could not resolve guild {}: {}", guild_id, e),
        }
        log::info!("Bot owner: {}", self.config.owner_id);

        // Ready fires again on reconnect; authorize only once
        let spotify = &self.config.spotify;
        self.establish_once(move || async move {
            SpotifyService::connect(spotify)
                .await
                .map(|service| Arc::new(service) as Arc<dyn MusicService>)
        })
        .await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let responder = ChannelResponder {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
        };
        self.dispatcher.dispatch(&msg.content, &responder).await;
    }
}

/// Connect to Discord and handle events until the process is killed
pub async fn run(config: Config, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord_token.clone();
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(config, dispatcher))
        .await
        .context("Failed to create Discord client")?;

    client.start().await.context("Discord client stopped")?;

    Ok(())
}
