//! persona-settings - settings core for an AI assistant
//!
//! Views and edits the assistant's active persona, rotation interval and
//! model parameters through the settings service, and runs the persona
//! rotation schedule.

mod api;
mod cli;
mod config;
mod error;
mod form;
mod logging;
mod rotation;
mod types;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::api::{HttpSettingsApi, SettingsApi};
use crate::cli::{Cli, Commands, ConfigSubcommand, SetArgs};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::form::{FieldEdit, FormEvent, SettingsForm, TemperatureSlider};
use crate::rotation::{check_consistency, Consistency, RotationScheduler, TickOutcome};
use crate::types::find_persona;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that never reach the service use minimal logging
    match cli.command {
        Commands::Models => {
            logging::init_simple(tracing::Level::WARN)?;
            print!("{}", form::view::render_models(None));
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand);
        }
        _ => {}
    }

    let config_path = match &cli.command {
        Commands::Show { config }
        | Commands::Personas { config }
        | Commands::Rotate { config, .. } => config.clone(),
        Commands::Set(args) => args.config.clone(),
        Commands::Models | Commands::Config { .. } => None,
    };

    let config = AppConfig::load(config_path.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_url = %config.api.base_url,
        "Starting persona-settings"
    );

    let api: Arc<dyn SettingsApi> = Arc::new(HttpSettingsApi::new(config.api.clone())?);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(async {
        match cli.command {
            Commands::Show { .. } => show(api).await,
            Commands::Personas { .. } => list_personas(api).await,
            Commands::Set(args) => set(api, args).await,
            Commands::Rotate { once, .. } => rotate(api, &config, once).await,
            Commands::Models | Commands::Config { .. } => Ok(()),
        }
    })
}

/// Load the form and print it
async fn show(api: Arc<dyn SettingsApi>) -> Result<()> {
    let (form, _events) = SettingsForm::new(api);
    form.load().await?;
    print!("{}", form::view::render(&form.snapshot()));
    Ok(())
}

/// Personas in service order, marking the selected and active ones
async fn list_personas(api: Arc<dyn SettingsApi>) -> Result<()> {
    let (form, _events) = SettingsForm::new(api);
    form.load().await?;

    let state = form.snapshot();
    let selected = state.settings.selected_persona_id.as_deref();

    if state.personas.is_empty() {
        println!("No personas.");
        return Ok(());
    }

    for persona in &state.personas {
        let marker = if Some(persona.id.as_str()) == selected { "*" } else { " " };
        let active = if persona.is_active { "  [active]" } else { "" };
        println!("{} {:<20} {}{}", marker, persona.id, persona.name, active);
    }

    let consistency = check_consistency(&state.personas, &state.settings);
    if matches!(consistency, Consistency::MultipleActive(_) | Consistency::Mismatch { .. }) {
        println!();
        println!("Warning: {}", consistency);
    }

    Ok(())
}

/// Apply the requested edits and save the whole record
async fn set(api: Arc<dyn SettingsApi>, args: SetArgs) -> Result<()> {
    if args.is_empty() {
        return Err(Error::Config(
            "Nothing to change. Pass at least one of --persona, --rotation-interval, --model, --temperature, --max-tokens".to_string(),
        ));
    }

    let (form, mut events) = SettingsForm::new(api);
    form.load().await?;

    if let Some(id) = args.persona {
        if find_persona(&form.personas(), &id).is_none() {
            return Err(Error::PersonaNotFound { id });
        }
        form.edit(FieldEdit::ActivePersona(id))?;
    }
    if let Some(raw) = args.rotation_interval {
        form.edit(FieldEdit::RotationInterval(raw))?;
    }
    if let Some(model) = args.model {
        form.edit(FieldEdit::ModelName(model))?;
    }
    if let Some(raw) = args.temperature {
        form.edit(TemperatureSlider::default().edit(raw))?;
    }
    if let Some(raw) = args.max_tokens {
        form.edit(FieldEdit::MaxTokens(raw))?;
    }

    debug!(settings = ?form.settings(), "Submitting settings");
    let result = form.save().await;
    print_notifications(&mut events);
    result
}

fn print_notifications(events: &mut UnboundedReceiver<FormEvent>) {
    while let Ok(event) = events.try_recv() {
        if let FormEvent::Notify(notification) = event {
            if notification.is_destructive() {
                eprintln!("{}", notification);
            } else {
                println!("{}", notification);
            }
        }
    }
}

/// Run the rotation schedule, or one forced step
async fn rotate(api: Arc<dyn SettingsApi>, config: &AppConfig, once: bool) -> Result<()> {
    let mut scheduler = RotationScheduler::new(api, config.rotation.scheduler_config());

    if !once {
        scheduler.run(std::future::pending::<()>()).await;
        return Ok(());
    }

    match scheduler.rotate_now().await? {
        TickOutcome::Rotated { from, to } => {
            println!(
                "Rotated persona: {} -> {}",
                from.as_deref().unwrap_or("(none)"),
                to
            );
        }
        TickOutcome::Unchanged { persona_id } => {
            println!("Only one persona ({}); nothing to rotate.", persona_id);
        }
        TickOutcome::NotDue { next_due } => {
            println!("Next rotation due at {}", next_due.to_rfc3339());
        }
    }

    Ok(())
}

fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = AppConfig::load(config.as_deref())?;
            print!("{}", cfg.to_toml()?);
        }
        ConfigSubcommand::Init { path, force } => {
            let path = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", path.display());
        }
        ConfigSubcommand::Validate { config } => {
            AppConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
