use anyhow::{Context, Result};
use clap::Parser;
use pkgapi::catalog::{Catalog, CatalogConfig, DEFAULT_ROOT_PATH, DEFAULT_ROOT_URL, LatestPolicy};
use pkgapi::client::{ClientConfig, ContentType, DEFAULT_TIMEOUT, HostInfo, UpdateClient};
use pkgapi::runtime::RealRuntime;
use pkgapi::server::DEFAULT_BIND;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// pkgapi - package catalog service
///
/// Serves release information for packages laid out as
/// `<root>/<type>/<package>/.../release.json`, and queries such a service
/// the way an installed package would.
///
/// Examples:
///   pkgapi serve                          # Serve ./packages on 127.0.0.1:8080
///   pkgapi check plugins/foo 1.2          # Ask the local catalog for updates
///   pkgapi remote --slug foo check 1.2    # Ask a running service
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGAPI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Downloads root directory (also via PKGAPI_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PKGAPI_ROOT",
        value_name = "PATH",
        default_value = DEFAULT_ROOT_PATH,
        global = true
    )]
    pub root: PathBuf,

    /// Public URL the downloads root is served from
    #[arg(
        long = "download-url",
        env = "PKGAPI_DOWNLOAD_URL",
        value_name = "URL",
        default_value = DEFAULT_ROOT_URL,
        global = true
    )]
    pub download_url: String,

    /// Which release counts as latest: last-discovered or highest-version
    #[arg(
        long = "latest-policy",
        env = "PKGAPI_LATEST_POLICY",
        value_name = "POLICY",
        default_value = "last-discovered",
        global = true
    )]
    pub latest_policy: LatestPolicy,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP action endpoint
    Serve(ServeArgs),

    /// List every release manifest under the root
    Index,

    /// Show all versions of a package, or one of them
    Show(ShowArgs),

    /// Show the latest release of a package
    Latest(LatestArgs),

    /// Check whether a newer release than VERSION exists
    Check(CheckArgs),

    /// Query a running service as an installed package would
    Remote(RemoteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PKGAPI_BIND", value_name = "ADDR", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Package slug in the format "type/package"
    #[arg(value_name = "TYPE/PACKAGE")]
    pub slug: String,

    /// A specific version, or "latest"
    pub version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LatestArgs {
    #[arg(value_name = "TYPE/PACKAGE")]
    pub slug: String,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[arg(value_name = "TYPE/PACKAGE")]
    pub slug: String,

    /// Currently installed version
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoteArgs {
    /// Action endpoint of the service
    #[arg(
        long = "api-url",
        env = "PKGAPI_API_URL",
        value_name = "URL",
        default_value = "http://127.0.0.1:8080/"
    )]
    pub api_url: String,

    /// Content type of the package: plugins or themes
    #[arg(long = "type", value_name = "TYPE", default_value = "plugins")]
    pub content_type: ContentType,

    /// Package name without the type prefix
    #[arg(long, value_name = "PACKAGE")]
    pub slug: String,

    /// URL of the site the package is installed in
    #[arg(long = "site-url", value_name = "URL", default_value = "http://localhost")]
    pub site_url: String,

    /// Name the host reports in its user agent
    #[arg(long = "host-name", value_name = "NAME", default_value = "pkgapi")]
    pub host_name: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: RemoteCommands,
}

#[derive(clap::Subcommand, Debug)]
pub enum RemoteCommands {
    /// Decide whether VERSION should be updated
    Check { version: String },

    /// Fetch the latest release
    Latest,

    /// Fetch all versions, or one of them
    Show { version: Option<String> },
}

impl Cli {
    fn catalog(&self) -> Catalog<RealRuntime> {
        let config = CatalogConfig::new(&self.root, &self.download_url)
            .with_latest_policy(self.latest_policy);
        Catalog::new(RealRuntime, config)
    }
}

impl RemoteArgs {
    fn client(&self) -> Result<UpdateClient> {
        UpdateClient::new(ClientConfig {
            api_url: self.api_url.clone(),
            content_type: self.content_type,
            slug: self.slug.clone(),
            host: HostInfo {
                name: self.host_name.clone(),
                version: env!("PKGAPI_VERSION").to_string(),
                url: self.site_url.clone(),
            },
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode response")?;
    println!("{}", text);
    Ok(())
}

async fn remote(args: &RemoteArgs) -> Result<()> {
    let client = args.client()?;
    match &args.command {
        RemoteCommands::Check { version } => print_json(&client.decide(version).await?),
        RemoteCommands::Latest => print_json(&client.latest().await.into_result()?),
        RemoteCommands::Show { version } => {
            let response = client
                .show(&client.qualified_slug(), version.as_deref(), None)
                .await;
            print_json(&response.into_result()?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(args) => pkgapi::server::serve(cli.catalog(), args.bind).await?,
        Commands::Index => print_json(&cli.catalog().list_packages()?)?,
        Commands::Show(args) => {
            print_json(&cli.catalog().show(&args.slug, args.version.as_deref())?)?
        }
        Commands::Latest(args) => print_json(&cli.catalog().latest(&args.slug)?)?,
        Commands::Check(args) => {
            print_json(&cli.catalog().check(&args.slug, Some(&args.version))?)?
        }
        Commands::Remote(args) => remote(args).await?,
    }
    Ok(())
}
