use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use housing_console::gateway::types::{Availability, GatewayConfig};
use housing_console::models::{PropertyAggregate, StagedImage};
use housing_console::{
    assemble_detail, delete_property, load_dashboard, load_listing, save_property,
    submit_rental_request, submit_review, HttpGateway, InMemoryGateway, ListingFilter,
    PropertyDraft, PropertyGateway, RequesterId,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "housing-console")]
#[command(about = "Manage rental properties through the property API", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the property API (overrides HOUSING_CONSOLE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides HOUSING_CONSOLE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Identifier used when sending rental requests and reviews
    #[arg(long, env = "HOUSING_CONSOLE_REQUESTER")]
    requester: Option<String>,

    /// Use the built-in demo store instead of the API
    #[arg(long)]
    demo: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List properties, optionally filtered
    List {
        /// Substring of the location
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, value_enum, default_value = "all")]
        availability: AvailabilityArg,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,
    },

    /// Show one property with its images, requests and reviews
    Show { id: String },

    /// Dashboard counters and featured properties
    Stats,

    /// Create a property
    Create(PropertyArgs),

    /// Update an existing property
    Update {
        id: String,

        #[command(flatten)]
        fields: PropertyArgs,
    },

    /// Delete a property
    Delete { id: String },

    /// Send a rental request for a property
    Request { id: String },

    /// Review a property
    Review {
        id: String,

        /// Stars, 1 to 5
        #[arg(short, long, default_value_t = 5)]
        rating: u8,

        #[arg(short, long)]
        comment: String,
    },
}

#[derive(Args)]
struct PropertyArgs {
    #[arg(long)]
    location: Option<String>,

    /// Monthly rent
    #[arg(long)]
    price: Option<f64>,

    /// Feature tag, repeatable
    #[arg(long = "feature")]
    features: Vec<String>,

    #[arg(long)]
    available: Option<bool>,

    #[arg(long)]
    description: Option<String>,

    /// Image file to upload, repeatable
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

impl PropertyArgs {
    fn apply(&self, draft: &mut PropertyDraft) {
        if let Some(location) = &self.location {
            draft.location = location.clone();
        }
        if self.price.is_some() {
            draft.price = self.price;
        }
        if !self.features.is_empty() {
            draft.features = self.features.clone();
        }
        if let Some(available) = self.available {
            draft.available = available;
        }
        if let Some(description) = &self.description {
            draft.description = Some(description.clone());
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AvailabilityArg {
    All,
    Available,
    Rented,
}

impl From<AvailabilityArg> for Availability {
    fn from(arg: AvailabilityArg) -> Self {
        match arg {
            AvailabilityArg::All => Availability::All,
            AvailabilityArg::Available => Availability::Available,
            AvailabilityArg::Rented => Availability::Rented,
        }
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn stage_images(paths: &[PathBuf]) -> Result<Vec<StagedImage>> {
    let mut staged = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        staged.push(StagedImage {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string()),
            content_type: content_type_for(path).to_string(),
            bytes,
        });
    }
    Ok(staged)
}

fn requester(cli: &Cli) -> Result<RequesterId> {
    let raw = cli
        .requester
        .clone()
        .context("--requester (or HOUSING_CONSOLE_REQUESTER) is required for this command")?;
    Ok(RequesterId::parse(raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_detail(aggregate: &PropertyAggregate) {
    let property = &aggregate.property;
    println!("{} ({} MXN)", property.location, property.price);
    println!("   ID: {}", property.id);
    println!(
        "   {}",
        if property.available { "Available" } else { "Not available" }
    );
    println!("   Features: {}", property.features.join(", "));
    if let Some(description) = &property.description {
        println!("   {}", description);
    }
    println!("   Images: {}", aggregate.images.len());
    if aggregate.images_unavailable {
        println!("   ⚠️  Some images could not be loaded");
    }
    println!("   Contracts: {}", property.contracts.len());
    println!("   Rental requests: {}", aggregate.rental_requests.len());
    for request in &aggregate.rental_requests {
        println!("     - {} {:?}", request.requester_id, request.status);
    }
    println!("   Reviews: {}", aggregate.reviews.len());
    for review in &aggregate.reviews {
        println!("     - {}★ {}", review.rating.stars(), review.comment);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let gateway: Box<dyn PropertyGateway> = if cli.demo {
        Box::new(InMemoryGateway::with_demo_data())
    } else {
        let mut config = GatewayConfig::from_env();
        if let Some(url) = &cli.api_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &cli.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        let http = HttpGateway::new(config).context("Failed to create HTTP client")?;
        info!(
            "🏠 Housing Console - {} ({}s timeout)",
            http.config().base_url,
            http.config().timeout.as_secs()
        );
        Box::new(http)
    };
    let gateway = gateway.as_ref();

    match &cli.command {
        Command::List {
            search,
            availability,
            min_price,
            max_price,
        } => {
            let filter = ListingFilter {
                search: search.clone(),
                availability: (*availability).into(),
                min_price: *min_price,
                max_price: *max_price,
            };
            let listing = load_listing(gateway, &filter).await?;
            if cli.json {
                return print_json(&listing);
            }
            println!(
                "Showing {} of {} properties\n",
                listing.properties.len(),
                listing.total
            );
            for (i, property) in listing.properties.iter().enumerate() {
                println!("{}. {} ({} MXN)", i + 1, property.location, property.price);
                println!("   ID: {}", property.id);
                println!("   Features: {}", property.features.join(", "));
                println!(
                    "   {}",
                    if property.available { "Available" } else { "Rented" }
                );
                println!();
            }
        }
        Command::Show { id } => {
            let aggregate = assemble_detail(gateway, id).await?;
            if cli.json {
                return print_json(&aggregate);
            }
            print_detail(&aggregate);
        }
        Command::Stats => {
            let dashboard = load_dashboard(gateway).await?;
            if cli.json {
                return print_json(&dashboard);
            }
            let stats = dashboard.stats;
            println!("Total properties:     {}", stats.total_properties);
            println!("Available properties: {}", stats.available_properties);
            println!("Active contracts:     {}", stats.active_contracts);
            println!("Pending requests:     {}", stats.pending_requests);
            println!("\nFeatured:");
            for property in &dashboard.featured {
                println!("  {} ({} MXN) - {}", property.location, property.price, property.id);
            }
        }
        Command::Create(fields) => {
            let mut draft = PropertyDraft::default();
            fields.apply(&mut draft);
            let staged = stage_images(&fields.images).await?;
            let saved = save_property(gateway, None, &draft, &staged).await?;
            info!("✅ Created property {}", saved.id);
            if cli.json {
                return print_json(&saved);
            }
            println!("{}", saved.id);
        }
        Command::Update { id, fields } => {
            let current = gateway
                .get_property(id)
                .await
                .with_context(|| format!("Failed to load property {}", id))?;
            let mut draft = PropertyDraft::from(&current);
            fields.apply(&mut draft);
            let staged = stage_images(&fields.images).await?;
            let saved = save_property(gateway, Some(id.as_str()), &draft, &staged).await?;
            info!("✅ Updated property {}", saved.id);
            if cli.json {
                return print_json(&saved);
            }
            println!("{}", saved.id);
        }
        Command::Delete { id } => {
            delete_property(gateway, id).await?;
            info!("🗑️  Deleted property {}", id);
            if cli.json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{}", id);
        }
        Command::Request { id } => {
            let requester = requester(&cli)?;
            let requests = submit_rental_request(gateway, id, &requester).await?;
            info!("✅ Rental request sent ({} total)", requests.len());
            if cli.json {
                return print_json(&requests);
            }
            println!("{} rental request(s)", requests.len());
        }
        Command::Review {
            id,
            rating,
            comment,
        } => {
            let requester = requester(&cli)?;
            let reviews = submit_review(gateway, id, &requester, *rating, comment).await?;
            info!("✅ Review sent ({} total)", reviews.len());
            if cli.json {
                return print_json(&reviews);
            }
            println!("{} review(s)", reviews.len());
        }
    }

    Ok(())
}
