use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gallery_gate::config::GateConfig;
use gallery_gate::identity::ClientFingerprint;
use gallery_gate::notify::TerminalSink;
use gallery_gate::storage::{JsonFileStore, RecordStore};
use gallery_gate::submission::{CommentForm, ReviewForm, SubmissionController};
use gallery_gate::validation::{escape_html, sanitize};

/// How often expired notification banners are swept.
const DISMISSAL_TICK: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "gallery-gate", version, about = "Gate comments and reviews for a fan gallery")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON record store, overrides the configured path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    client: ClientArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ClientArgs {
    /// User agent of the submitting client
    #[arg(long, global = true, default_value = "gallery-gate-cli")]
    user_agent: String,

    /// Screen size of the submitting client, as WIDTHxHEIGHT
    #[arg(long, global = true, default_value = "0x0", value_parser = parse_screen)]
    screen: (u32, u32),
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a comment on a character page
    Comment {
        #[arg(long)]
        character: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: String,
    },
    /// Submit a review
    Review {
        #[arg(long)]
        title: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        rating: String,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        episodes: Option<String>,
    },
    /// List the comments on a character page
    List {
        #[arg(long)]
        character: String,
    },
    /// List all reviews
    ListReviews,
    /// Print the sanitized form of some text
    Sanitize {
        text: String,
        #[arg(long, default_value_t = 1000)]
        max_len: usize,
    },
}

fn parse_screen(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", value))?;
    let w = w.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let h = h.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    Ok((w, h))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = GateConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.store {
        config.storage.path = path;
    }
    info!(store = %config.storage.path.display(), "Configuration loaded");

    let store = Arc::new(JsonFileStore::new(config.storage.path.clone()));
    let controller = SubmissionController::from_config(&config, store.clone(), Arc::new(TerminalSink));
    let cleanup = controller
        .limiter()
        .spawn_cleanup(config.rate_limits.cleanup_interval());
    let dismissal = controller.presenter().spawn_dismissal(DISMISSAL_TICK);

    let (width, height) = cli.client.screen;
    let client = ClientFingerprint::new(cli.client.user_agent, width, height);

    let code = match cli.command {
        Command::Comment {
            character,
            name,
            text,
        } => {
            let form = CommentForm {
                character_id: character,
                name,
                text,
            };
            exit_code(controller.submit_comment(&client, &form).await.is_accepted())
        }
        Command::Review {
            title,
            summary,
            text,
            kind,
            rating,
            genre,
            status,
            episodes,
        } => {
            let form = ReviewForm {
                form_token: controller.form_token().to_string(),
                title,
                summary,
                review: text,
                kind,
                rating,
                genre,
                status,
                episodes,
            };
            exit_code(controller.submit_review(&client, &form).await.is_accepted())
        }
        Command::List { character } => {
            for comment in store.list_comments(&character).await? {
                println!(
                    "{}  {}: {}",
                    comment.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    escape_html(&comment.author),
                    escape_html(&comment.text)
                );
            }
            ExitCode::SUCCESS
        }
        Command::ListReviews => {
            for review in store.list_reviews().await? {
                println!(
                    "{} [{}] {}/5: {}",
                    escape_html(&review.title),
                    escape_html(&review.kind),
                    escape_html(&review.rating),
                    escape_html(&review.summary)
                );
            }
            ExitCode::SUCCESS
        }
        Command::Sanitize { text, max_len } => {
            println!("{}", sanitize(&text, max_len));
            ExitCode::SUCCESS
        }
    };

    cleanup.abort();
    dismissal.abort();
    Ok(code)
}

fn exit_code(accepted: bool) -> ExitCode {
    if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screen() {
        assert_eq!(parse_screen("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_screen("800X600"), Ok((800, 600)));
        assert!(parse_screen("1920").is_err());
        assert!(parse_screen("wide x tall").is_err());
    }

    #[test]
    fn test_parse_comment_command() {
        let cli = Cli::try_parse_from([
            "gallery-gate",
            "--screen",
            "1280x720",
            "comment",
            "--character",
            "saja",
            "--name",
            "Al",
            "--text",
            "0123456789",
        ])
        .unwrap();

        assert_eq!(cli.client.screen, (1280, 720));
        assert!(matches!(cli.command, Command::Comment { ref character, .. } if character == "saja"));
    }
}
