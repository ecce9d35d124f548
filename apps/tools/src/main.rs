use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use impersonation::{
    ImpersonationConfig, ImpersonationGrant, TokenService, DEFAULT_EXPIRES_IN, DEFAULT_ISSUER,
};
use release_tools::{icons, lighthouse, version::VersionDescriptor};
use secrecy::SecretString;
use shared::domain::{BarId, RoleName, UserId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "tools", about = "Release and back-office helpers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign, verify or decode impersonation tokens.
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Digest Lighthouse JSON reports.
    Lighthouse {
        #[command(subcommand)]
        command: LighthouseCommand,
    },
    /// Generate the PWA icon set from a raster logo.
    Icons {
        source: PathBuf,
        #[arg(long, default_value = "public/icons")]
        out_dir: PathBuf,
    },
    /// Write the `version.json` descriptor polled by deployed clients.
    StampVersion {
        #[arg(long, default_value = "public/version.json")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    Sign {
        #[command(flatten)]
        signer: SignerArgs,
        #[arg(long)]
        user_id: UserId,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        bar_id: Option<BarId>,
        #[arg(long, default_value = DEFAULT_EXPIRES_IN)]
        expires_in: String,
    },
    Verify {
        #[command(flatten)]
        signer: SignerArgs,
        token: String,
    },
    /// Print the claims without checking the signature.
    Inspect { token: String },
}

#[derive(Args, Debug)]
struct SignerArgs {
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,
    #[arg(long, env = "SUPABASE_URL", default_value = DEFAULT_ISSUER)]
    issuer: Url,
}

impl SignerArgs {
    fn into_service(self) -> TokenService {
        TokenService::new(ImpersonationConfig {
            secret: self.secret.map(SecretString::from),
            issuer: self.issuer,
        })
    }
}

#[derive(Subcommand, Debug)]
enum LighthouseCommand {
    Summary {
        report: PathBuf,
    },
    /// Compare before/after reports listed in a JSON manifest of
    /// `{name, old, new}` entries.
    Compare {
        pages: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Token { command } => run_token(command)?,
        Command::Lighthouse { command } => run_lighthouse(command)?,
        Command::Icons { source, out_dir } => {
            let report = icons::generate_icons(&source, &out_dir)?;
            info!(
                written = report.written.len(),
                failed = report.failed.len(),
                out_dir = %out_dir.display(),
                "icon generation finished"
            );
            for (variant, reason) in &report.failed {
                warn!(file = %variant.file_name(), %reason, "icon skipped");
            }
        }
        Command::StampVersion { out } => {
            let descriptor = VersionDescriptor::from_env(Utc::now());
            descriptor.write_to(&out)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
    }

    Ok(())
}

fn run_token(command: TokenCommand) -> Result<()> {
    match command {
        TokenCommand::Sign {
            signer,
            user_id,
            email,
            role,
            bar_id,
            expires_in,
        } => {
            let Some(role) = RoleName::new(role) else {
                bail!("--role cannot be empty");
            };
            let mut grant = ImpersonationGrant::new(user_id, email, role).expires_in(expires_in);
            if let Some(bar_id) = bar_id {
                grant = grant.for_bar(bar_id);
            }
            let signed = signer
                .into_service()
                .issue(&grant)
                .context("failed to sign impersonation token")?;
            info!(expires_at = %signed.expires_at, "token signed");
            println!("{}", signed.token);
        }
        TokenCommand::Verify { signer, token } => {
            let claims = signer
                .into_service()
                .verify(token.trim())
                .context("token rejected")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        TokenCommand::Inspect { token } => {
            let claims = impersonation::inspect(token.trim())?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }
    Ok(())
}

fn run_lighthouse(command: LighthouseCommand) -> Result<()> {
    match command {
        LighthouseCommand::Summary { report } => {
            let report = lighthouse::LighthouseReport::from_path(&report)?;
            print!("{}", lighthouse::render_summary(&report));
        }
        LighthouseCommand::Compare { pages } => {
            let pairs = lighthouse::load_page_pairs(&pages)?;
            let compared = lighthouse::compare_pages(&pairs);
            if compared.is_empty() {
                bail!("no page in {} could be compared", pages.display());
            }
            print!("{}", lighthouse::render_comparison(&compared));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
