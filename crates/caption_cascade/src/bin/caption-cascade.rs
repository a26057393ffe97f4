use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use apalis::{layers::sentry::SentryLayer, prelude::*};
use apalis_cron::{CronStream, Tick};
use caption_cascade::{
    gemini::GeminiClient,
    scanner::{default_channels, Channel, ChannelReport, ChannelResultsCache, LatestUploadScanner},
    sources::{
        invidious::{self, InvidiousMirrors},
        mirrors::MirrorPool,
        piped::{self, PipedMirrors},
        primary::PrimaryExtractor,
        transcript_service::TranscriptService,
    },
    tracing::init_tracing_subscriber,
    watch::{digest_new_uploads, UploadDigest},
    yt::ytdlp::YtDlp,
    LanguagePair, Summarizer, TranscriptPipeline, TranscriptPipelineBuilder,
};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use cron::Schedule;
use tokio::sync::Mutex;

#[derive(Parser)]
#[command(
    name = "caption-cascade",
    about = "YouTube transcripts through a fallback cascade, with Gemini market summaries"
)]
struct Cli {
    /// Preferred caption language
    #[arg(long, env = "TARGET_LANG", default_value = "tr")]
    target_lang: String,

    /// Caption language used when the preferred one is missing
    #[arg(long, env = "FALLBACK_LANG", default_value = "en")]
    fallback_lang: String,

    /// Comma separated Invidious base URLs (defaults to the built-in list)
    #[arg(long, env = "INVIDIOUS_INSTANCES", value_delimiter = ',')]
    invidious_instances: Vec<String>,

    /// Comma separated Piped API base URLs (defaults to the built-in list)
    #[arg(long, env = "PIPED_INSTANCES", value_delimiter = ',')]
    piped_instances: Vec<String>,

    /// Timezone that decides what "today" means for channel checks
    #[arg(long, env = "CHANNEL_TIMEZONE", default_value = "Europe/Istanbul")]
    timezone: String,

    /// Gemini API key, required for summaries
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,

    /// Comma separated Gemini models, tried in order
    #[arg(long, env = "GEMINI_MODELS", value_delimiter = ',')]
    models: Vec<String>,

    /// Path to the yt-dlp executable
    #[arg(long, env = "YTDLP_PATH", default_value = "yt-dlp")]
    ytdlp_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the transcript of a video
    Transcript {
        /// Video URL or identifier
        video: String,
        /// Also write the transcript to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch a transcript and summarize it
    Summarize {
        /// Video URL or identifier
        video: String,
    },
    /// Report today's uploads of the watched channels
    Channels {
        /// Channel as NAME=URL, repeatable
        #[arg(long = "channel")]
        channels: Vec<Channel>,
    },
    /// Check channels on a cron schedule and summarize new uploads
    Watch {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 * * * *")]
        schedule: String,
        /// Channel as NAME=URL, repeatable
        #[arg(long = "channel")]
        channels: Vec<Channel>,
    },
    /// List Gemini models usable for summaries
    Models,
}

type Pipeline = TranscriptPipeline<PrimaryExtractor<YtDlp>, TranscriptService, InvidiousMirrors, PipedMirrors>;

#[derive(Clone)]
struct Config {
    languages: LanguagePair,
    invidious_instances: Vec<String>,
    piped_instances: Vec<String>,
    timezone: Tz,
    gemini_api_key: Option<String>,
    models: Vec<String>,
    ytdlp_path: PathBuf,
    channels: Vec<Channel>,
    seen: Arc<Mutex<ChannelResultsCache>>,
}

impl Config {
    fn pipeline(&self) -> Pipeline {
        let client = reqwest::Client::new();
        let or_defaults = |configured: &[String], defaults: &[&str]| -> Vec<String> {
            if configured.is_empty() {
                defaults.iter().map(|s| s.to_string()).collect()
            } else {
                configured.to_vec()
            }
        };

        TranscriptPipelineBuilder::new()
            .languages(self.languages.clone())
            .primary(PrimaryExtractor::new(
                YtDlp::new(&self.ytdlp_path),
                client.clone(),
            ))
            .transcript_service(TranscriptService::new(client.clone()))
            .mirrors_a(InvidiousMirrors::new(MirrorPool::new(
                client.clone(),
                or_defaults(&self.invidious_instances, invidious::DEFAULT_INSTANCES),
            )))
            .mirrors_b(PipedMirrors::new(MirrorPool::new(
                client,
                or_defaults(&self.piped_instances, piped::DEFAULT_INSTANCES),
            )))
            .build()
    }

    fn summarizer(&self) -> anyhow::Result<GeminiClient> {
        let api_key = self
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .context("GEMINI_API_KEY is required for summaries")?;

        let client = GeminiClient::new(api_key).with_language(&self.languages.target);
        if self.models.is_empty() {
            Ok(client)
        } else {
            Ok(client.with_models(self.models.iter().cloned()))
        }
    }

    fn scanner(&self) -> LatestUploadScanner<YtDlp> {
        LatestUploadScanner::new(YtDlp::new(&self.ytdlp_path), self.timezone)
    }
}

async fn print_transcript(config: &Config, video: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let transcript = config.pipeline().fetch_str(video).await?;
    tracing::info!(source = %transcript.source, chars = transcript.text.len(), "Transcript ready");

    if let Some(path) = output {
        std::fs::write(&path, &transcript.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    println!("{}", transcript.text);

    Ok(())
}

async fn summarize(config: &Config, video: &str) -> anyhow::Result<()> {
    let summarizer = config.summarizer()?;
    let transcript = config.pipeline().fetch_str(video).await?;

    match summarizer.summarize(&transcript.text).await {
        Ok(summary) => {
            eprintln!("Summarized with {}", summary.model);
            println!("{}", summary.markdown);
        }
        Err(e) => {
            tracing::error!(error = %e, "Summary failed");
            eprintln!("{e}");
            eprintln!("The transcript is printed below. Run `caption-cascade models` to see usable models.");
            println!("{}", transcript.text);
        }
    }

    Ok(())
}

fn print_report(report: &ChannelReport) {
    let name = &report.channel.name;
    if !report.scan.todays_uploads.is_empty() {
        println!("{name}: {} upload(s) today", report.scan.todays_uploads.len());
        for upload in &report.scan.todays_uploads {
            println!("  [{}] {} {}", upload.kind, upload.title, upload.url);
        }
    } else if let Some(latest) = &report.scan.most_recent {
        println!(
            "{name}: nothing today, latest is {} ({}) {}",
            latest.title, latest.upload_date, latest.url
        );
    } else {
        println!("{name}: no uploads found");
    }
}

async fn check_channels(config: &Config) -> anyhow::Result<()> {
    let mut cache = ChannelResultsCache::default();
    let reports = config.scanner().check_channels(&config.channels, &mut cache).await;
    reports.iter().for_each(print_report);

    Ok(())
}

/// One scheduled check: summarizes today's uploads not handled on an earlier tick
async fn watch_tick(config: &Config) -> anyhow::Result<()> {
    let summarizer = config.summarizer().ok();
    let pipeline = config.pipeline();

    let mut seen = config.seen.lock().await;
    let reports = config.scanner().check_channels(&config.channels, &mut seen).await;
    let digests = digest_new_uploads(&pipeline, summarizer.as_ref(), &reports, &mut seen).await;

    for digest in digests {
        let UploadDigest { channel, upload, summary } = digest;
        match summary {
            Some(summary) => println!(
                "## {channel} | {}\n{}\n\n{}",
                upload.title, upload.url, summary.markdown
            ),
            None => println!("[{channel}] {} {}", upload.title, upload.url),
        }
    }

    Ok(())
}

async fn handle_tick(_tick: Tick, config: Data<Config>) -> anyhow::Result<()> {
    tracing::info!(channels = config.channels.len(), "Running scheduled channel check...");
    watch_tick(&config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let timezone = Tz::from_str(&cli.timezone)
        .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {e}", cli.timezone))?;

    let mut config = Config {
        languages: LanguagePair::new(cli.target_lang, cli.fallback_lang),
        invidious_instances: cli.invidious_instances,
        piped_instances: cli.piped_instances,
        timezone,
        gemini_api_key: cli.gemini_api_key,
        models: cli.models,
        ytdlp_path: cli.ytdlp_path,
        channels: default_channels(),
        seen: Arc::new(Mutex::new(ChannelResultsCache::default())),
    };

    match cli.command {
        Command::Transcript { video, output } => print_transcript(&config, &video, output).await?,
        Command::Summarize { video } => summarize(&config, &video).await?,
        Command::Channels { channels } => {
            if !channels.is_empty() {
                config.channels = channels;
            }
            check_channels(&config).await?;
        }
        Command::Watch { schedule, channels } => {
            if !channels.is_empty() {
                config.channels = channels;
            }
            tracing::info!(%schedule, "Starting channel watch...");
            let schedule = Schedule::from_str(&schedule)?;

            let worker = WorkerBuilder::new("caption-cascade-watch")
                .backend(CronStream::new(schedule))
                .layer(SentryLayer::new())
                .data(config)
                .build(handle_tick);

            worker.run().await?;
        }
        Command::Models => {
            let models = config.summarizer()?.list_models().await?;
            println!("{} model(s) support generateContent:", models.len());
            models.iter().for_each(|m| println!("  {m}"));
        }
    }

    Ok(())
}
