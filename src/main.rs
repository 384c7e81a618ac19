// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use bill_splitter::{
    render_entries, render_summary, Config, NewEntryForm, ParticipantInput, RosterChoice, Session,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Split a restaurant bill by dish", long_about = None)]
struct Cli {
    /// Tax percentage (overrides the config file)
    #[arg(long, global = true)]
    tax: Option<f64>,

    /// Tip percentage (overrides the config file)
    #[arg(long, global = true)]
    tip: Option<f64>,

    /// Number of people splitting the whole bill
    #[arg(long, global = true)]
    party_size: Option<usize>,

    /// Comma-separated list of everyone at the table, e.g. "Jason, Celia"
    #[arg(long, global = true)]
    roster: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute shares for dishes given on the command line and exit
    Split(SplitArgs),

    /// Write a default config file
    InitConfig,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// A dish as NAME:PRICE:NAMES, e.g. "Pizza:24.00:Jason, Celia",
    /// or NAME:PRICE:COUNT:NAMES to take the first COUNT names (at most the party size).
    /// Use "*" for NAMES to split with the whole roster.
    #[arg(short, long = "dish", required = true)]
    dishes: Vec<String>,
}

/// Session settings after layering CLI flags over the config file
pub(crate) struct Settings {
    pub tax_percent: f64,
    pub tip_percent: f64,
    pub party_size: usize,
    pub roster: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::InitConfig) = cli.command {
        let path = Config::init_default()?;
        println!("✓ Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::load()?;
    let settings = Settings {
        tax_percent: cli.tax.unwrap_or(config.tax_percent),
        tip_percent: cli.tip.unwrap_or(config.tip_percent),
        party_size: cli.party_size.unwrap_or(config.party_size),
        roster: cli
            .roster
            .as_deref()
            .map(bill_splitter::parse_names)
            .unwrap_or_default(),
    };

    match cli.command {
        Some(Commands::Split(args)) => run_split(&settings, &args.dishes),
        _ => run_ui_mode(settings),
    }
}

/// Build a session from the settings, applying the roster if there is one
pub(crate) fn new_session(settings: &Settings) -> Result<Session> {
    let mut session = Session::new(settings.party_size);
    if !settings.roster.is_empty() {
        session
            .declare_roster(settings.roster.clone())
            .map_err(|errors| anyhow!(join_errors(&errors)))
            .context("Invalid --roster")?;
    }
    Ok(session)
}

/// `*` selects the whole roster, anything else is a comma-separated list
pub(crate) fn participant_input(raw: &str) -> ParticipantInput {
    if raw.trim() == "*" {
        ParticipantInput::Roster {
            selected: vec![RosterChoice::Everyone],
        }
    } else {
        ParticipantInput::FreeForm {
            names: raw.to_string(),
        }
    }
}

/// With a head count, the names become a fixed-count list capped by the party size
pub(crate) fn participant_input_with_count(count: Option<usize>, raw: &str) -> ParticipantInput {
    match count {
        Some(count) => ParticipantInput::FixedCount {
            count,
            names: raw.to_string(),
        },
        None => participant_input(raw),
    }
}

pub(crate) fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn parse_price(text: &str) -> Option<f64> {
    text.trim().trim_start_matches('$').parse().ok()
}

/// Parse `NAME:PRICE:COUNT:NAMES` or `NAME:PRICE:NAMES`. The dish name may
/// itself contain colons; the counted form wins when both COUNT and PRICE parse.
fn parse_dish_arg(raw: &str) -> Result<NewEntryForm> {
    let parts: Vec<&str> = raw.rsplitn(4, ':').collect();

    if let [names, count, price, name] = parts[..] {
        if let (Ok(count), Some(price)) = (count.trim().parse::<usize>(), parse_price(price)) {
            return Ok(NewEntryForm {
                name: name.to_string(),
                price,
                participants: participant_input_with_count(Some(count), names),
            });
        }
    }

    let mut parts = raw.rsplitn(3, ':');
    let (names, price, name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(names), Some(price), Some(name)) => (names, price, name),
        _ => bail!("Expected NAME:PRICE:NAMES, got '{}'", raw),
    };

    let price = parse_price(price)
        .with_context(|| format!("Invalid price '{}' in '{}'", price, raw))?;

    Ok(NewEntryForm {
        name: name.to_string(),
        price,
        participants: participant_input(names),
    })
}

fn run_split(settings: &Settings, dishes: &[String]) -> Result<()> {
    let mut session = new_session(settings)?;

    for raw in dishes {
        let form = parse_dish_arg(raw)?;
        session
            .add_dish(&form)
            .map_err(|errors| anyhow!(join_errors(&errors)))
            .with_context(|| format!("Invalid dish '{}'", raw))?;
    }

    let summary = session
        .summary(settings.tax_percent, settings.tip_percent)
        .map_err(|errors| anyhow!(join_errors(&errors)))?;

    print!("{}", render_entries(session.ledger().entries()));
    println!();
    print!("{}", render_summary(&summary));

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: Settings) -> Result<()> {
    let session = new_session(&settings)?;
    let mut app = ui::App::new(session, settings.tax_percent, settings.tip_percent);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or compute once with: bill-splitter split --dish \"Pizza:24:Jason, Celia\"");
    std::process::exit(1);
}
