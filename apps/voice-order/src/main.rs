use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use menu_catalog::{CatalogIndex, DEFAULT_SEARCH_LIMIT};
use order_intake::{IntakeConfig, IntakeError, OrderIntake, OrderRequest, RawOrderLine};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

mod webhook;

#[derive(Parser, Debug)]
#[command(
    name = "voice-order",
    version,
    about = "Voice ordering intake: transcripts to point-of-sale orders",
    disable_help_subcommand = true
)]
struct Cli {
    /// Intake config file (JSON); defaults apply when it does not exist
    #[arg(long, global = true, default_value = "configs/intake.json")]
    config: String,

    /// Location id, overriding the config file
    #[arg(long, global = true)]
    location: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract and merge order lines from conversation text
    #[command(group(ArgGroup::new("input").required(true).args(["text", "text_file"])))]
    Extract {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        text_file: Option<String>,
    },
    /// Build an order request from text or structured items
    #[command(group(ArgGroup::new("input").required(true).args(["text", "text_file", "items"])))]
    Order {
        /// Catalog snapshot JSON
        #[arg(long)]
        catalog: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        text_file: Option<String>,
        /// JSON array of {name, quantity, modifier_phrases, catalog_object_id}
        #[arg(long)]
        items: Option<String>,
        #[arg(long)]
        customer: Option<String>,
    },
    /// Build an order request from a voice-widget webhook body
    Webhook {
        #[arg(long)]
        catalog: String,
        /// File holding the webhook JSON body
        #[arg(long)]
        payload: String,
    },
    /// Print the menu listing handed to the voice agent
    Menu {
        #[arg(long)]
        catalog: String,
    },
    /// Look up catalog items by name prefix, or modifiers by text
    Search {
        #[arg(long)]
        catalog: String,
        /// Name prefix for items, or words to find in modifier names
        #[arg(long, default_value = "")]
        query: String,
        /// Search modifiers instead of items
        #[arg(long)]
        modifiers: bool,
        /// Maximum number of items returned
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let mut config = IntakeConfig::load(&cli.config)?;
    if let Some(location) = cli.location {
        config.location_id = Some(location);
    }

    match cli.command {
        Commands::Extract { text, text_file } => {
            extract(&config, &read_text(text, text_file.as_deref())?)
        }
        Commands::Order {
            catalog,
            text,
            text_file,
            items,
            customer,
        } => {
            let input = match items {
                Some(path) => OrderInput::Lines(read_items(&path)?),
                None => OrderInput::Text(read_text(text, text_file.as_deref())?),
            };
            order(&config, &catalog, input, customer.as_deref())
        }
        Commands::Webhook { catalog, payload } => webhook_order(&config, &catalog, &payload),
        Commands::Menu { catalog } => menu(&catalog),
        Commands::Search {
            catalog,
            query,
            modifiers,
            limit,
        } => search(&catalog, &query, modifiers, limit),
    }
}

fn setup_tracing() {
    // Best-effort; stdout carries the JSON output, logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

enum OrderInput {
    Text(String),
    Lines(Vec<RawOrderLine>),
}

fn read_text(text: Option<String>, text_file: Option<&str>) -> Result<String> {
    match (text, text_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading transcript: {path}"))
        }
        (None, None) => bail!("either --text or --text-file is required"),
    }
}

fn read_items(path: &str) -> Result<Vec<RawOrderLine>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading items: {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing items: {path}"))
}

fn load_catalog(path: &str) -> Result<CatalogIndex> {
    let index = menu_catalog::load_index_file(Path::new(path))?;
    if index.is_empty() {
        warn!(path, "catalog snapshot is empty; every line will be a custom line");
    }
    Ok(index)
}

fn extract(config: &IntakeConfig, text: &str) -> Result<()> {
    let intake = OrderIntake::new(config)?;
    let lines = intake.canonical_lines(text);
    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}

fn order(
    config: &IntakeConfig,
    catalog: &str,
    input: OrderInput,
    customer: Option<&str>,
) -> Result<()> {
    let index = load_catalog(catalog)?;
    let intake = OrderIntake::new(config)?;
    let request = match input {
        OrderInput::Text(text) => intake.prepare_from_text(&text, &index, customer),
        OrderInput::Lines(lines) => intake.prepare_from_lines(&lines, &index, customer),
    };
    print_request(request)
}

fn webhook_order(config: &IntakeConfig, catalog: &str, payload: &str) -> Result<()> {
    let body = fs::read_to_string(payload).with_context(|| format!("reading payload: {payload}"))?;
    let index = load_catalog(catalog)?;
    let intake = OrderIntake::new(config)?;

    let normalized = webhook::normalize(&body, intake.extractor())?;
    info!(
        format = ?normalized.format,
        customer = %normalized.customer_name,
        lines = normalized.lines.len(),
        "webhook received"
    );
    let request =
        intake.prepare_from_lines(&normalized.lines, &index, Some(&normalized.customer_name));
    print_request(request)
}

fn print_request(request: order_intake::Result<OrderRequest>) -> Result<()> {
    let request = match request {
        Ok(request) => request,
        Err(IntakeError::EmptyOrder) => bail!("nothing to order: no items were recognised"),
        Err(IntakeError::MissingLocation) => {
            bail!("no location id: pass --location or set location_id in the config")
        }
        Err(e) => return Err(e.into()),
    };

    for line in request.custom_lines() {
        warn!(?line, "line not in catalog; review before charging");
    }
    println!("{}", serde_json::to_string_pretty(&request.to_payload())?);
    Ok(())
}

fn menu(catalog: &str) -> Result<()> {
    let index = load_catalog(catalog)?;
    print!("{}", menu_catalog::render_menu_prompt(&index));
    Ok(())
}

fn search(catalog: &str, query: &str, modifiers: bool, limit: usize) -> Result<()> {
    let index = load_catalog(catalog)?;
    let objects = if modifiers {
        serde_json::to_value(index.search_modifiers(query))?
    } else {
        serde_json::to_value(index.search_items(query, limit))?
    };
    info!(query, modifiers, "catalog search");
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "objects": objects }))?
    );
    Ok(())
}
