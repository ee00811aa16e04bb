//! topper-cli - terminal client for the Topper rating service
//!
//! Pages through items in the chosen language and sends votes. When the
//! server suggests no next item, the session picks one locally from the
//! user's rating history.

mod client;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use topper_common::filters::ItemFilter;
use topper_common::localize::localize;
use topper_common::session::{Session, VoteFeedback};
use topper_common::{Item, Locale, RatingValue};

use client::{ApiClient, ClientError};
use commands::{Command, HELP};

const LEADERBOARD_SIZE: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "topper-cli")]
#[command(about = "Browse and rate items from a Topper server")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:3000", env = "TOPPER_SERVER")]
    server: String,

    /// Display language (en, ro, uk, ru)
    #[arg(short, long, default_value = "en", env = "TOPPER_LANG")]
    lang: Locale,

    /// User id sent with votes (a fresh one is generated if omitted)
    #[arg(long, env = "TOPPER_USER_ID")]
    user_id: Option<Uuid>,

    /// Send votes without a user id
    #[arg(long, conflicts_with = "user_id")]
    anonymous: bool,

    /// Only show items of these types (comma separated)
    #[arg(long = "type", value_delimiter = ',')]
    types: Vec<String>,

    /// Only show items in these categories (comma separated)
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<String>,

    /// Only show items from these countries; `global` matches every item
    #[arg(long = "country", value_delimiter = ',')]
    countries: Vec<String>,
}

impl Args {
    fn item_filter(&self) -> ItemFilter {
        ItemFilter {
            types: self.types.iter().cloned().collect(),
            categories: self.categories.iter().cloned().collect(),
            countries: self.countries.iter().cloned().collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not mix with the item display
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "topper_cli=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let user_id = if args.anonymous {
        None
    } else {
        Some(args.user_id.unwrap_or_else(Uuid::new_v4))
    };
    info!(server = %args.server, lang = %args.lang, "Starting topper-cli");

    let client = ApiClient::new(&args.server).context("Failed to build HTTP client")?;
    let filter = args.item_filter();
    let mut session = Session::new(args.lang);
    let mut rng = StdRng::from_entropy();

    let items = client
        .items(args.lang)
        .await
        .with_context(|| format!("Failed to load items from {}", args.server))?;
    session.apply_filter(&filter, items);

    println!("{}", HELP);
    show_current(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Upvote => {
                vote(&client, &mut session, RatingValue::Up, user_id, &mut rng).await
            }
            Command::Downvote => {
                vote(&client, &mut session, RatingValue::Down, user_id, &mut rng).await
            }
            Command::Next => {
                if !session.advance() {
                    println!("(last item)");
                }
                show_current(&session);
            }
            Command::Previous => {
                if !session.previous() {
                    println!("(first item)");
                }
                show_current(&session);
            }
            Command::Stats => show_stats(&session),
            Command::Leaderboard => {
                let lang = session.language();
                match client.leaderboard(lang, LEADERBOARD_SIZE).await {
                    Ok(items) => show_leaderboard(&items, lang),
                    Err(e) => println!("Could not load leaderboard: {}", e),
                }
            }
            Command::Language(lang) => {
                session.set_language(lang);
                match client.items(lang).await {
                    Ok(items) => session.apply_filter(&filter, items),
                    Err(e) => println!("Could not reload items: {}", e),
                }
                show_current(&session);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    show_stats(&session);
    Ok(())
}

async fn vote(
    client: &ApiClient,
    session: &mut Session,
    value: RatingValue,
    user_id: Option<Uuid>,
    rng: &mut StdRng,
) {
    let Some(item_id) = session.current().map(|item| item.id.clone()) else {
        println!("Nothing to rate");
        return;
    };

    match client.rate(&item_id, value, user_id, session.language()).await {
        Ok(reply) => {
            println!("Score for {} is now {}", reply.item.id, reply.item.score);
            let feedback = VoteFeedback {
                score: reply.item.score,
                next_item: reply.next_item,
            };
            session.apply_vote(value, feedback, rng);
            show_current(session);
        }
        Err(ClientError::RateLimited { retry_after_secs }) => {
            println!("Too many votes, wait {}s", retry_after_secs);
        }
        Err(e) => {
            warn!(item_id = %item_id, error = %e, "Vote failed");
            println!("Vote not recorded: {}", e);
        }
    }
}

fn show_current(session: &Session) {
    let (Some(item), Some(idx)) = (session.current(), session.current_index()) else {
        println!("No items.");
        return;
    };
    let view = localize(item, Some(session.language()));

    println!();
    println!("[{}/{}] {}", idx + 1, session.items().len(), view.content_text);
    if !view.source_name.is_empty() {
        println!("    source: {}", view.source_name);
    }
    if !item.source_link.is_empty() {
        println!("    link:   {}", item.source_link);
    }
    println!(
        "    score: {}  votes: {}  category: {}  tags: {}",
        item.score,
        item.votes,
        item.category,
        item.tags.join(", ")
    );
}

fn show_stats(session: &Session) {
    let summary = session.summary();
    println!();
    println!(
        "Ratings: {} ({} up, {} down)",
        summary.total_ratings, summary.positive_ratings, summary.negative_ratings
    );
    if let Some(category) = &summary.favorite_category {
        println!("Favorite category: {}", category);
    }
    if let Some(item_type) = &summary.favorite_type {
        println!("Favorite type: {}", item_type);
    }
    println!("Engagement: {:.1}%", summary.engagement_rate);
}

fn show_leaderboard(items: &[Item], lang: Locale) {
    println!();
    for (rank, item) in items.iter().enumerate() {
        let view = localize(item, Some(lang));
        println!("{:>3}. {:>5}  {}", rank + 1, item.score, view.content_text);
    }
}
