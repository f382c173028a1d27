use std::process;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use flohmarkt::notify::TelegramNotifier;
use flohmarkt::utils::EventStats;
use flohmarkt::{Config, Credentials, DigestFormatter, EventAggregator, Source, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "flohmarkt")]
#[command(about = "Weekly digest of flea markets around Bochum", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build this week's digest, print it and send it to the Telegram chat
    Digest {
        #[arg(long, help = "Print the digest without sending it")]
        dry_run: bool,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Build the digest for the week containing this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        date: Option<NaiveDate>,

        #[arg(long = "source", value_parser = parse_source, help = "Only query these sources")]
        sources: Vec<Source>,
    },
    /// List every market date found, regardless of week
    List {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long = "source", value_parser = parse_source, help = "Only query these sources")]
        sources: Vec<Source>,
    },
}

fn parse_source(s: &str) -> Result<Source, String> {
    Source::from_str(s).map_err(|e| e.to_string())
}

fn selected(sources: Vec<Source>) -> Vec<Source> {
    if sources.is_empty() {
        Source::ALL.to_vec()
    } else {
        sources
    }
}

fn now_in(tz: Tz, date: Option<NaiveDate>) -> DateTime<Tz> {
    match date {
        Some(date) => date
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
            .and_local_timezone(tz)
            .earliest()
            .unwrap_or_else(|| Utc::now().with_timezone(&tz)),
        None => Utc::now().with_timezone(&tz),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = Config::default();

    match cli.command {
        Commands::Digest {
            dry_run,
            date,
            sources,
        } => {
            let notifier = if dry_run {
                None
            } else {
                let credentials = Credentials::from_env().unwrap_or_else(|e| {
                    log::error!("Configuration error: {}", e);
                    process::exit(1);
                });
                Some(
                    TelegramNotifier::new(&config, credentials).unwrap_or_else(|e| {
                        log::error!("Error creating Telegram client: {}", e);
                        process::exit(1);
                    }),
                )
            };

            let scraper = WebScraper::new(&config).unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let aggregator = EventAggregator::new(&config);
            let events = aggregator.run(&scraper, &selected(sources)).await;

            let formatter = DigestFormatter::new(&config);
            let message = formatter.build_digest(&events, now_in(config.timezone, date));

            println!("{}", message);

            if let Some(notifier) = notifier {
                if let Err(e) = notifier.send_message(&message).await {
                    log::error!("Error sending digest: {}", e);
                    process::exit(1);
                }
                log::info!("Digest sent");
            } else {
                log::warn!("Dry run, digest not sent");
            }
        }

        Commands::List { format, sources } => {
            let scraper = WebScraper::new(&config).unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let events = EventAggregator::new(&config)
                .run(&scraper, &selected(sources))
                .await;

            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&events) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        log::error!("Error serializing to JSON: {}", e);
                        process::exit(1);
                    }
                },
                OutputFormat::Text => {
                    if events.is_empty() {
                        println!("No markets to display.");
                    } else {
                        for (i, event) in events.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, event);
                        }
                        print!("{}", EventStats::from_events(&events));
                    }
                }
            }
        }
    }
}
