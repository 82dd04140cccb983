use utoken::app::App;
use utoken::domain_model::{AccessToken, Claims, RefreshHandle};
use utoken::logger::*;
use utoken::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let consumes_handle = matches!(cli.command, Command::Refresh { .. } | Command::Revoke { .. });
    if consumes_handle && project_settings.store.backend == "memory" {
        warn!("memory store is per process, handles from earlier runs are unknown here");
    }

    let app = App::try_new(&project_settings).await?;
    let service = app.token_service;

    let output = match cli.command {
        Command::Issue {
            subject,
            audience,
            fields,
        } => {
            let mut template = Claims::new();
            template.sub = subject;
            template.aud = audience;
            let template = fields
                .into_iter()
                .fold(template, |c, (name, value)| c.with_field(name, value));
            serde_json::to_value(service.issue(template).await?)?
        }
        Command::Verify { token } => {
            serde_json::to_value(service.parse_and_verify(&AccessToken(token)).await?)?
        }
        Command::Refresh { handle } => {
            match service.rotate(&RefreshHandle(handle)).await {
                Ok(pair) => serde_json::to_value(pair)?,
                Err(e) if e.requires_reauthentication() => {
                    warn!(error = %e, "session ended, reauthenticate");
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Revoke { handle } => {
            let removed = service.revoke(&RefreshHandle(handle)).await?;
            serde_json::json!({ "revoked": removed })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
