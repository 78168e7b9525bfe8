//! Interactive mode for the server.
//!
//! Prompts for bind address and port, and for an API key when none is
//! present in the environment.

use dialoguer::{Confirm, Input, Password};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Sets `BIND_ADDR`, `PORT`, and (if entered) `GEMINI_API_KEY`, then
/// delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("GeoSpy Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let has_key = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "OPENAI_API_KEY"]
        .iter()
        .any(|var| std::env::var(var).is_ok());

    let api_key = if has_key {
        None
    } else {
        Password::new()
            .with_prompt("Gemini API key (leave empty to disable /api/locate)")
            .allow_empty_password(true)
            .interact()
            .ok()
            .filter(|key| !key.trim().is_empty())
    };

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        if let Some(key) = &api_key {
            std::env::set_var("GEMINI_API_KEY", key.trim());
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
