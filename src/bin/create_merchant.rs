//! Register a merchant account from the command line.

use clap::Parser;
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;

use pushkind_booking::forms::merchants::RegisterMerchantForm;
use pushkind_booking::repository::DieselRepository;
use pushkind_booking::services::merchants::register_merchant;

#[derive(Debug, Parser)]
#[command(name = "create-merchant", about = "Create a merchant account")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "DATABASE_URL", default_value = "app.db")]
    database_url: String,
    #[arg(long)]
    name: String,
    /// Tenant subdomain used by the public booking page.
    #[arg(long)]
    subdomain: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long, env = "MERCHANT_PASSWORD", hide_env_values = true)]
    password: String,
    /// IANA time zone, defaults to Australia/Sydney.
    #[arg(long)]
    timezone: Option<String>,
    /// ISO 4217 code, defaults to AUD.
    #[arg(long)]
    currency: Option<String>,
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok();
    let cli = Cli::parse();

    let pool = match establish_connection_pool(&cli.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let form = RegisterMerchantForm {
        name: cli.name,
        subdomain: cli.subdomain,
        email: cli.email,
        username: cli.username,
        password: cli.password,
        timezone: cli.timezone,
        currency: cli.currency,
    };
    match register_merchant(&repo, form) {
        Ok(merchant) => println!(
            "Created merchant {} ({}) with id {}",
            merchant.name, merchant.subdomain, merchant.id
        ),
        Err(err) => {
            log::error!("Failed to create merchant: {err}");
            std::process::exit(1);
        }
    }
}
