use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lisa_gateway::api::{ApiServer, ApiState};
use lisa_gateway::chat::OllamaClient;
use lisa_gateway::voice::{LocalSpeaker, SpeakQueue, SpeechToText, TextToSpeech};
use lisa_gateway::{Config, Responder};

/// Lisa - voice chat gateway for a local language model
#[derive(Parser)]
#[command(name = "lisa", version, about)]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/lisa/config.toml)
    #[arg(short, long, env = "LISA_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(long, env = "LISA_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable spoken replies (for headless servers without audio hardware)
    #[arg(long, env = "LISA_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize a line of text and play it
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hi, I am Lisa. How can I help you?")]
        text: String,
    },
    /// Send one utterance through the dialogue responder
    TestChat {
        /// Message to send
        message: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lisa_gateway=info",
        1 => "info,lisa_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.disable_voice {
        config.voice.enabled = false;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestTts { text } => test_tts(&config, &text).await,
            Command::TestChat { message } => test_chat(&config, &message).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        chat_model = %config.chat.model,
        voice_enabled = config.voice.enabled,
        "starting lisa gateway"
    );

    let backend = OllamaClient::new(
        &config.chat.base_url,
        config.chat.model.clone(),
        config.chat.timeout,
        config.chat.max_retries,
    )?;
    let responder = Responder::new(Arc::new(backend));

    let speaker = build_speaker(&config);
    if speaker.is_none() {
        tracing::info!("replies will be text-only");
    }

    let stt = SpeechToText::new(&config.stt)?;

    let static_dir = config.server.static_dir.filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            tracing::warn!(path = %dir.display(), "static directory not found, chat page disabled");
        }
        exists
    });

    let state = Arc::new(ApiState {
        responder,
        speaker,
        stt: Arc::new(stt),
    });

    ApiServer::new(state, config.server.port, static_dir)
        .run()
        .await?;

    Ok(())
}

/// Build the speak queue, degrading to text-only when audio is unavailable
fn build_speaker(config: &Config) -> Option<SpeakQueue> {
    if !config.voice.enabled {
        return None;
    }

    match TextToSpeech::new(&config.voice).and_then(LocalSpeaker::new) {
        Ok(engine) => Some(SpeakQueue::spawn(engine, config.voice.queue_depth)),
        Err(e) => {
            tracing::warn!(error = %e, "voice output unavailable");
            None
        }
    }
}

/// Synthesize and play one line of text
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Synthesizing: \"{text}\"");

    let tts = TextToSpeech::new(&config.voice)?;
    let audio = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", audio.len());

    let playback = lisa_gateway::voice::AudioPlayback::new()?;
    playback.play_mp3(&audio)?;

    println!("If you heard the speech, TTS is working!");
    Ok(())
}

/// Run one utterance through the responder and print the reply
async fn test_chat(config: &Config, message: &str) -> anyhow::Result<()> {
    let backend = OllamaClient::new(
        &config.chat.base_url,
        config.chat.model.clone(),
        config.chat.timeout,
        config.chat.max_retries,
    )?;
    let responder = Responder::new(Arc::new(backend));

    let reply = responder.respond(message).await?;
    println!("{reply}");
    Ok(())
}
