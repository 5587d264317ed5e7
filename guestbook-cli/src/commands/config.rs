//! Show the database configuration the server would use

use anyhow::Result;
use clap::Parser;

use guestbook_server::bootstrap::resolve_config;
use guestbook_server::secrets::DB_PASSWORD_SECRET;
use guestbook_server::{build_config, secret_source, DbEnv};

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Look the password up in Secret Manager first (as `serve` does)
    #[arg(long)]
    pub resolve_secret: bool,

    /// Secret Manager secret holding the database password
    #[arg(long, default_value = DB_PASSWORD_SECRET)]
    pub secret_name: String,
}

pub async fn run_config(args: ConfigArgs) -> Result<()> {
    let env = DbEnv::from_env();

    let config = if args.resolve_secret {
        let secrets = secret_source(true);
        resolve_config(&env, secrets.as_ref(), &args.secret_name).await
    } else {
        build_config(&env, None)
    };

    println!("{}", config);
    Ok(())
}
