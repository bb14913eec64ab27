// region:    --- Imports
use auction_house::api::{AuctionApi, NoroffClient};
use auction_house::auth::{self, RegisterForm};
use auction_house::bidding::commands::{handle_place_bid, PlaceBidCommand};
use auction_house::config::Config;
use auction_house::error::AppError;
use auction_house::events::{AppEvent, EventBus};
use auction_house::listings::{ListingCollection, ListingSource, SortKey};
use auction_house::manage::{
    self, AlwaysConfirm, Confirm, CreateListingForm, DeleteOutcome, ListingEdit,
};
use auction_house::profile::{self, ProfileEdit};
use auction_house::render::{self, ListingDetailView, ListingPageView, ProfileView};
use auction_house::session::{FileSessionStore, SessionStore};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tokio::sync::broadcast;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Cli
#[derive(Debug, Parser)]
#[command(name = "auction-house", version, about = "Noroff auction house client")]
struct Cli {
    /// API base url
    #[arg(long, env = "AUCTION_API_URL", global = true)]
    api_url: Option<String>,

    /// Noroff API key
    #[arg(long, env = "AUCTION_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with a stud.noroff.no account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        banner: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Browse listings
    Listings {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "none")]
        sort: SortKey,
        #[arg(long)]
        active_only: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Only listings from this seller
        #[arg(long)]
        seller: Option<String>,
    },
    /// Show one listing with its bids
    Listing { id: String },
    /// Place a bid on a listing
    Bid {
        id: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Create a listing
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Comma separated image urls
        #[arg(long, default_value = "")]
        media: String,
        /// RFC 3339 or local YYYY-MM-DDTHH:MM
        #[arg(long)]
        ends_at: String,
    },
    /// Edit one of your listings
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        media_url: Option<String>,
        #[arg(long)]
        media_alt: Option<String>,
    },
    /// Delete one of your listings
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List or search profiles
    Profiles {
        #[arg(long)]
        query: Option<String>,
    },
    /// Show a profile (defaults to your own)
    Profile { name: Option<String> },
    /// Update your avatar, banner or bio
    EditProfile {
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        banner: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Refresh and show your credits
    Credits,
}
// endregion: --- Cli

// region:    --- Confirm
/// 표준 입력으로 삭제 확인
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
// endregion: --- Confirm

// region:    --- Main
#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // logging 초기화 (stdout 은 출력 전용)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().with_overrides(cli.api_url, cli.api_key);
    info!("{:<12} --> API: {}", "Main", config.api_url);

    let api = NoroffClient::try_new(&config)?;
    let sessions = FileSessionStore::new(config.session_file.clone());
    let events = EventBus::default();
    let mut notices = events.subscribe();

    let result = run(cli.command, &api, &sessions, &events).await;
    print_notices(&mut notices);

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{:<12} --> 명령 실패: {:?}", "Main", e);
            match &e {
                AppError::Validation(errors) => {
                    for field in errors {
                        eprintln!("{}", field);
                    }
                }
                _ => eprintln!("{}", e),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// 발행된 이벤트 알림 출력
fn print_notices(notices: &mut broadcast::Receiver<AppEvent>) {
    while let Ok(event) = notices.try_recv() {
        println!("{}", event.notice());
    }
}
// endregion: --- Main

// region:    --- Commands
async fn run(
    command: Command,
    api: &NoroffClient,
    sessions: &FileSessionStore,
    events: &EventBus,
) -> Result<(), AppError> {
    let mut out = io::stdout().lock();
    let now = Utc::now();

    match command {
        Command::Login { email, password } => {
            auth::login(api, sessions, events, &email, &password).await?;
        }
        Command::Register {
            name,
            email,
            password,
            bio,
            avatar,
            banner,
        } => {
            let form = RegisterForm {
                name,
                email,
                password,
                bio,
                avatar,
                banner,
            };
            auth::register(api, sessions, events, form).await?;
        }
        Command::Logout => auth::logout(sessions, events)?,
        Command::Listings {
            search,
            sort,
            active_only,
            page,
            seller,
        } => {
            let source = seller.map_or(ListingSource::All, ListingSource::Profile);
            let mut collection = ListingCollection::new(source);
            collection.load(api, sessions.token().as_deref()).await?;
            collection.apply_filters(&search, sort, active_only);
            collection.page(page);

            let session = sessions.current();
            let view = ListingPageView::build(&collection, session.as_ref(), now);
            render::write_listing_page(&mut out, &view)?;
        }
        Command::Listing { id } => {
            let listing = api.get_listing(&id).await?;
            let session = sessions.current();
            let view = ListingDetailView::build(&listing, session.as_ref(), now);
            render::write_listing_detail(&mut out, &view)?;
        }
        Command::Bid { id, amount } => {
            let mut collection = ListingCollection::new(ListingSource::All);
            let receipt = handle_place_bid(
                PlaceBidCommand::new(id, amount),
                api,
                sessions,
                events,
                &mut collection,
            )
            .await?;
            if let Some(highest) = receipt.highest_bid {
                writeln!(out, "Highest bid is now {} kr.", render::format_amount(highest))?;
            }
        }
        Command::Create {
            title,
            description,
            media,
            ends_at,
        } => {
            let form = CreateListingForm {
                title,
                description,
                media: manage::parse_media_list(&media),
                ends_at,
            };
            let listing = manage::create_listing(api, sessions, events, form).await?;
            writeln!(out, "Listing id: {}", listing.id)?;
        }
        Command::Edit {
            id,
            title,
            description,
            media_url,
            media_alt,
        } => {
            let original = api.get_listing(&id).await?;
            let edit = ListingEdit {
                title,
                description,
                media_url,
                media_alt,
            };
            manage::update_listing(api, sessions, events, &original, &edit).await?;
        }
        Command::Delete { id, yes } => {
            let listing = api.get_listing(&id).await?;
            let outcome = if yes {
                manage::delete_listing(api, sessions, events, &AlwaysConfirm, &listing, None)
                    .await?
            } else {
                manage::delete_listing(api, sessions, events, &StdinConfirm, &listing, None)
                    .await?
            };
            if outcome == DeleteOutcome::Cancelled {
                writeln!(out, "Delete cancelled.")?;
            }
        }
        Command::Profiles { query } => {
            let profiles = profile::find_profiles(api, sessions, query.as_deref()).await?;
            render::write_profiles(&mut out, &profiles)?;
        }
        Command::Profile { name } => {
            let dashboard = profile::load_dashboard(api, sessions, name.as_deref()).await?;
            let session = sessions.current();
            let view = ProfileView::build(&dashboard, session.as_ref(), now);
            render::write_profile(&mut out, &view)?;
        }
        Command::EditProfile { avatar, banner, bio } => {
            let edit = ProfileEdit {
                avatar_url: avatar,
                banner_url: banner,
                bio,
            };
            profile::edit_profile(api, sessions, events, edit).await?;
        }
        Command::Credits => {
            let credits = profile::refresh_credits(api, sessions).await?;
            writeln!(out, "Credits: {} kr", credits)?;
        }
    }
    Ok(())
}
// endregion: --- Commands
