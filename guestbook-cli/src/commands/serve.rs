//! HTTP server command
//!
//! Binds immediately and configures the database in the background.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use guestbook_server::secrets::DB_PASSWORD_SECRET;
use guestbook_server::{ServeOptions, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Directory of static assets served for unmatched paths
    #[arg(long, env = "GUESTBOOK_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Secret Manager secret holding the database password
    #[arg(long, default_value = DB_PASSWORD_SECRET)]
    pub secret_name: String,

    /// Skip the Secret Manager lookup and use DB_PASSWORD directly
    #[arg(long)]
    pub no_secret_manager: bool,
}

impl ServeArgs {
    fn into_options(self) -> ServeOptions {
        // A missing directory is not an error; there is just nothing to serve
        let static_dir = self.static_dir.is_dir().then_some(self.static_dir);

        ServeOptions {
            server: ServerConfig {
                bind_addr: SocketAddr::new(self.host, self.port),
                static_dir,
            },
            secret_name: self.secret_name,
            use_secret_manager: !self.no_secret_manager,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let options = args.into_options();
    tracing::info!(
        bind = %options.server.bind_addr,
        static_dir = ?options.server.static_dir,
        secret_manager = options.use_secret_manager,
        "Starting guestbook server"
    );

    guestbook_server::serve(options)
        .await
        .context("Server error")?;

    Ok(())
}
