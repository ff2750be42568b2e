mod admin_log;
mod config;
mod content;
mod context;
mod cooldown;
mod format;
mod intent;
mod openai;
mod router;

use std::sync::Arc;
use std::time::Instant;

use teloxide::prelude::*;
use teloxide::types::{ChatKind, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use content::ContentStore;
use router::MessageRouter;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Portuguese grammar helper:")]
enum Command {
    #[command(description = "ask a grammar question")]
    Ask(String),
    #[command(description = "list available lesson topics")]
    Topics,
    #[command(description = "show the lesson for a topic")]
    Study(String),
    #[command(description = "show the explanation for a topic")]
    Explain(String),
    #[command(description = "show this help")]
    Help,
}

struct BotState {
    config: Config,
    router: MessageRouter,
    bot_username: String,
}

impl BotState {
    async fn new(config: Config, bot: &Bot) -> Self {
        let bot_username = match bot.get_me().await {
            Ok(me) => {
                info!("Bot user ID: {}, username: @{}", me.id, me.username());
                me.username().to_string()
            }
            Err(e) => {
                warn!("Failed to get bot info: {e}");
                String::new()
            }
        };

        let content = ContentStore::new(
            config.lessons_dir.clone(),
            config.explanations_dir.clone(),
        );

        let ai = if config.ai_enabled() {
            info!("AI fallback enabled");
            Some(openai::Client::new(config.openai_api_key.clone()))
        } else {
            info!("AI fallback disabled (no openai_api_key)");
            None
        };

        let router = MessageRouter::new(
            content,
            ai,
            std::time::Duration::from_secs(config.intent_cooldown_secs),
            std::time::Duration::from_secs(config.ai_cooldown_secs),
            std::time::Duration::from_secs(config.context_timeout_secs),
        );

        Self {
            config,
            router,
            bot_username,
        }
    }

    async fn run_command(&self, cmd: Command, user_id: i64, now: Instant) -> String {
        match cmd {
            Command::Ask(question) => {
                let question = question.trim();
                if question.is_empty() {
                    "Usage: /ask <your grammar question>".to_string()
                } else {
                    self.router.ask(user_id, question, now).await
                }
            }
            Command::Topics => self.router.topics(),
            Command::Study(topic) => {
                let topic = topic.trim();
                if topic.is_empty() {
                    "Usage: /study <topic>".to_string()
                } else {
                    self.router.study(topic)
                }
            }
            Command::Explain(topic) => {
                let topic = topic.trim();
                if topic.is_empty() {
                    "Usage: /explain <topic>".to_string()
                } else {
                    self.router.explain(topic)
                }
            }
            Command::Help => Command::descriptions().to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "portubot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Fatal: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("portubot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        let admin_layer = admin_log::AdminLogLayer::new(bot.clone(), log_chat_id);
        registry.with(admin_layer).init();
    } else {
        registry.init();
    }

    info!("🚀 Starting portubot...");
    info!("Loaded config from {config_path}");
    info!("Lessons dir: {:?}", config.lessons_dir);

    let state = Arc::new(BotState::new(config, &bot).await);

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let is_group = matches!(msg.chat.kind, ChatKind::Public(_));
    let is_private = matches!(msg.chat.kind, ChatKind::Private(_));
    if !is_group && !is_private {
        return Ok(());
    }

    // Restrict to allowed groups when configured
    if is_group
        && !state.config.allowed_groups.is_empty()
        && !state.config.allowed_groups.contains(&msg.chat.id)
    {
        return Ok(());
    }

    let user = match msg.from {
        Some(ref u) => u,
        None => return Ok(()),
    };
    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    let user_id = user.id.0 as i64;
    let username = user.username.as_deref().unwrap_or(&user.first_name);
    let now = Instant::now();

    let reply = if text.starts_with('/') {
        match Command::parse(text, &state.bot_username) {
            Ok(cmd) => {
                info!("Command from {username} ({user_id}): {text}");
                Some(state.run_command(cmd, user_id, now).await)
            }
            // Unknown command (or another bot's), stay quiet
            Err(_) => None,
        }
    } else {
        state.router.handle_free_text(user_id, text, now).await
    };

    if let Some(reply) = reply {
        let request = bot
            .send_message(msg.chat.id, &reply)
            .reply_parameters(ReplyParameters::new(msg.id));
        if let Err(e) = request.await {
            warn!("Failed to send reply: {e}");
        }
    }

    Ok(())
}
