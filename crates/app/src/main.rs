use clap::{Parser, Subcommand};
use engine::LedgerBook;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Debug, Parser)]
#[command(name = "ledgerbook", version, about = "Bookkeeping backend with per-account running balances")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, short, env = "LEDGERBOOK_CONFIG", default_value = "settings")]
    config: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Rebuild the closing balances of one account, or of a whole book.
    Recompute {
        #[arg(long)]
        book: String,
        #[arg(long)]
        account: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerbook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let bind = settings
                .server
                .bind
                .unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, settings.server.port);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            server::run_with_listener(engine, listener).await?;
        }
        Command::Recompute { book, account } => {
            let book = LedgerBook::try_from(book.as_str())?;
            match account {
                Some(account) => {
                    let statement = engine.recompute(book, &account).await?;
                    println!(
                        "{}: {} entries, closing balance {}",
                        statement.account,
                        statement.totals.entry_count,
                        statement.totals.closing_balance
                    );
                }
                None => {
                    let accounts = engine.recompute_book(book).await?;
                    println!("{book}: recomputed {} accounts", accounts.len());
                }
            }
        }
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
