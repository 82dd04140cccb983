//! Walks one session through issue, verify, rotate and replay against the
//! configured store.
//!
//! $ cargo run --bin rotation_demo -- --settings=settings/dev.toml
use clap::Parser;
use utoken::app::App;
use utoken::domain_model::Claims;
use utoken::logger::*;
use utoken::settings::parse_settings;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    settings: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = Logger::new_bootstrap();
    let project_settings = parse_settings(args.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let service = App::try_new(&project_settings).await?.token_service;

    let first = service
        .issue(Claims::new().with_subject("alice").with_audience("svcA"))
        .await?;
    info!(iat = first.claims.iat, exp = first.claims.exp, "issued");

    let claims = service.parse_and_verify(&first.access).await?;
    info!(sub = ?claims.sub, "verified");

    let second = service.rotate(&first.refresh).await?;
    info!(iat = second.claims.iat, "rotated");

    match service.rotate(&first.refresh).await {
        Ok(_) => error!("replayed refresh handle was accepted"),
        Err(e) => info!(error = %e, "replay rejected"),
    }

    let revoked = service.revoke(&second.refresh).await?;
    info!(revoked, "logged out");

    Ok(())
}
