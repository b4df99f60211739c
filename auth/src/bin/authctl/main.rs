use std::io;
use std::io::BufRead;
use std::time::Duration;

use chirpy_auth::AuthConfig;
use chirpy_auth::Authenticator;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "authctl")]
#[command(author, version, long_about = None)]
#[command(about = "Operator tool for chirpy credentials and tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password read from stdin
    Hash,

    /// Check a password read from stdin against a stored hash
    Verify {
        /// Stored PHC hash string
        #[arg(long)]
        hash: String,
    },

    /// Issue a token for a subject
    Issue {
        /// Subject UUID
        #[arg(long)]
        subject: Uuid,

        /// Token lifetime; defaults to the configured TTL
        #[arg(long)]
        ttl_seconds: Option<u64>,
    },

    /// Validate an Authorization header value and print its subject
    Validate {
        /// Full header value, e.g. "Bearer eyJ..."
        #[arg(long)]
        header: String,
    },
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_auth=info,authctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AuthConfig::load()?;

    tracing::debug!(
        ttl_seconds = config.token.ttl_seconds,
        memory_kib = config.password.memory_kib,
        iterations = config.password.iterations,
        parallelism = config.password.parallelism,
        "Configuration loaded"
    );

    let secret = config.signing_secret();
    let authenticator = Authenticator::from_config(&config)?;

    match cli.command {
        Commands::Hash => {
            let hash = authenticator.hash_password(&read_password()?)?;
            println!("{hash}");
        }
        Commands::Verify { hash } => {
            authenticator.verify_password(&hash, &read_password()?)?;
            println!("ok");
        }
        Commands::Issue {
            subject,
            ttl_seconds,
        } => {
            let authenticator = match ttl_seconds {
                Some(seconds) => authenticator.with_token_ttl(Duration::from_secs(seconds)),
                None => authenticator,
            };
            let token = authenticator.issue_token(subject, &secret)?;
            println!("{token}");
        }
        Commands::Validate { header } => {
            let subject = authenticator.authorize(&header, &secret)?;
            println!("{subject}");
        }
    }

    Ok(())
}

fn read_password() -> Result<String, anyhow::Error> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
