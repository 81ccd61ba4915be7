use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booknetic_client::app::App;
use booknetic_client::config::Config;
use booknetic_client::discovery::normalize;
use booknetic_client::home::{self, HomeError};
use booknetic_client::models::{ContactForm, PostQuery};
use booknetic_client::session::{RestoreOutcome, SessionState};

#[derive(Parser)]
#[command(name = "bkn")]
#[command(about = "Client for WordPress sites running the Booknetic app plugin")]
struct Cli {
    /// Directory holding the local store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current site and session
    Status,
    /// Manage saved sites
    Sites {
        #[command(subcommand)]
        command: SiteCommands,
    },
    /// Log in to the current site
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out of the current site
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Fetch the user from the server instead of the saved session
        #[arg(long)]
        refresh: bool,
    },
    /// Show or change the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Load the home content for the logged-in user
    Home,
    /// List posts
    Posts {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        per_page: u32,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single post
    Post { id: u64 },
    /// List pages
    Pages,
    /// List categories
    Categories,
    /// Send the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// List saved sites
    List,
    /// Check a site for the plugin, save it and make it current
    Add { url: String },
    /// Make a saved site current
    Use { url: String },
    /// Forget a saved site
    Remove { url: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Save the site used when no saved site is current
    SetUrl { url: String },
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "booknetic_client=info,bkn=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load();
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }
    let mut app = App::open(config.clone()).context("Failed to open local store")?;

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            let mut session = app.session();
            let outcome = session.bootstrap();
            match app.registry().current() {
                Some(site) => println!("Site: {} ({})", site.display_name(), site.url),
                None => println!("Site: none selected ({})", app.client().base_url()),
            }
            match outcome {
                Some(RestoreOutcome::Restored(user)) => {
                    println!("Logged in as {}", user.display_name())
                }
                Some(RestoreOutcome::Skipped(reason)) => println!("Not logged in: {}", reason),
                None => println!("Session: {}", session.state().name()),
            }
        }
        Commands::Sites { command } => match command {
            SiteCommands::List => {
                let current = app.registry().current().map(|s| s.url);
                for site in app.registry().list() {
                    let marker = if current.as_deref() == Some(site.url.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}  {}", marker, site.url, site.display_name());
                }
            }
            SiteCommands::Add { url } => {
                let site = app.add_site(&url).await?;
                println!("Connected to {} ({})", site.display_name(), site.url);
            }
            SiteCommands::Use { url } => {
                let site = app.select_site(&url)?;
                println!("Using {} ({})", site.display_name(), site.url);
            }
            SiteCommands::Remove { url } => {
                app.remove_site(&url)?;
                println!("Removed {}", url);
            }
        },
        Commands::Login { username, password } => {
            let mut session = app.session();
            session.bootstrap();
            if let SessionState::Authenticated(user) = session.state() {
                println!("Already logged in as {}", user.display_name());
                return Ok(());
            }
            let user = session.login(&username, &password).await?;
            println!("Welcome, {}", user.display_name());
        }
        Commands::Logout => {
            let mut session = app.session();
            session.bootstrap();
            if session.state() == &SessionState::Unauthenticated {
                println!("Not logged in");
                return Ok(());
            }
            let outcome = session.logout().await?;
            if !outcome.acknowledged {
                tracing::warn!("Server did not confirm logout");
            }
            if !outcome.cleared {
                anyhow::bail!("Could not remove the saved session; it will be restored next time");
            }
            println!("Logged out");
        }
        Commands::Whoami { refresh } => {
            let mut session = app.session();
            session.bootstrap();
            let user = match session.state().user().cloned() {
                None => anyhow::bail!("Not logged in"),
                Some(_) if refresh => session.refresh_user().await?,
                Some(user) => user,
            };
            print_json(&user)?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => print_json(&config)?,
            ConfigCommands::SetUrl { url } => {
                let mut file = Config::load_file();
                file.site_url = Some(normalize(&url));
                let path = file.save()?;
                println!("Saved {}", path.display());
            }
        },
        Commands::Home => {
            let mut session = app.session();
            session.bootstrap();
            let content = match home::load_authenticated_home(&session).await {
                Err(HomeError::NotAuthenticated) => anyhow::bail!("Not logged in"),
                result => result.context("An error occurred while loading data")?,
            };
            print_json(&content)?;
        }
        Commands::Posts {
            page,
            per_page,
            category,
            search,
        } => {
            let posts = app
                .client()
                .posts(&PostQuery {
                    page,
                    per_page,
                    category,
                    search,
                })
                .await?;
            print_json(&posts)?;
        }
        Commands::Post { id } => print_json(&app.client().post(id).await?)?,
        Commands::Pages => print_json(&app.client().pages().await?)?,
        Commands::Categories => print_json(&app.client().categories().await?)?,
        Commands::Contact {
            name,
            email,
            message,
        } => {
            let response = app
                .client()
                .submit_contact(&ContactForm {
                    name,
                    email,
                    message,
                })
                .await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
