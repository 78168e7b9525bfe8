//! Guided mode: prompts for everything instead of taking flags.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Password, Select};
use geospy_ai::image::ImageSource;
use geospy_ai::providers::{LocationProvider, create_provider, create_provider_from_env};
use geospy_cli_utils::MultiProgress;

use crate::OutputArgs;

/// Top-level action selection.
enum Action {
    Locate,
    Present,
    Server,
}

impl Action {
    const ALL: &[Self] = &[Self::Locate, Self::Present, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Locate => "Locate an image",
            Self::Present => "Show a saved result",
            Self::Server => "Start server",
        }
    }
}

const PROVIDERS: &[(&str, &str)] = &[("Google Gemini", "gemini"), ("OpenAI", "openai")];

/// Runs the guided flow.
///
/// # Errors
///
/// Returns an error if a prompt fails, the image cannot be loaded, or an
/// export cannot be written.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("GeoSpy");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Locate => locate(multi).await,
        Action::Present => present(),
        Action::Server => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(geospy_server::interactive::run())
            })
            .await??;
            Ok(())
        }
    }
}

/// Uses credentials from the environment, or asks for them.
fn provider() -> Result<Box<dyn LocationProvider>, Box<dyn std::error::Error>> {
    if let Ok(provider) = create_provider_from_env() {
        return Ok(provider);
    }

    let names: Vec<&str> = PROVIDERS.iter().map(|(label, _)| *label).collect();
    let idx = Select::new()
        .with_prompt("AI provider")
        .items(&names)
        .default(0)
        .interact()?;

    let api_key = Password::new().with_prompt("API key").interact()?;

    Ok(create_provider(
        PROVIDERS[idx].1,
        api_key,
        std::env::var("AI_MODEL").ok(),
        std::env::var("AI_BASE_URL").ok(),
    )?)
}

fn optional_text(prompt: &str) -> Result<Option<String>, dialoguer::Error> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

async fn locate(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let provider = provider()?;

    let image: String = Input::new()
        .with_prompt("Image path or URL")
        .interact_text()?;
    let context = optional_text("Additional context (optional)")?;
    let hint = optional_text("Location guess (optional)")?;

    let source = ImageSource::parse(&image);
    let (raw, failure) = crate::locate(multi, provider.as_ref(), &source, context, hint).await?;

    let config = crate::load_config(&OutputArgs::default())?;
    crate::show(&raw, failure.as_ref(), &config, &OutputArgs::default())?;

    if Confirm::new()
        .with_prompt("Save the raw result?")
        .default(false)
        .interact()?
    {
        let path: String = Input::new()
            .with_prompt("Save to")
            .default("geospy_result.json".to_string())
            .interact_text()?;
        crate::save_result(&raw, &PathBuf::from(path))?;
    }

    Ok(())
}

fn present() -> Result<(), Box<dyn std::error::Error>> {
    let path: String = Input::new()
        .with_prompt("Result JSON file")
        .interact_text()?;

    let raw = crate::read_result(&PathBuf::from(path))?;
    let config = crate::load_config(&OutputArgs::default())?;
    crate::show(&raw, None, &config, &OutputArgs::default())
}
