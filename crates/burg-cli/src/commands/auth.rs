//! Authentication commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use burg_session::{AuthState, Credentials};
use std::io::{self, Write};

fn describe(state: &AuthState) -> String {
    match state {
        AuthState::Authenticated { user, .. } => user
            .email
            .clone()
            .unwrap_or_else(|| user.id.clone()),
        AuthState::TokenOnly { email } => email.clone().unwrap_or_else(|| "unknown".to_string()),
        _ => "nobody".to_string(),
    }
}

/// Login with email and password.
pub async fn login(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.store.initialize().await;

    let state = ctx.store.state();
    if state.is_signed_in() {
        output::print_success(&format!("Already logged in as {}", describe(&state)), format);
        return Ok(());
    }

    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;

    // Prompt for password (hidden)
    let password = rpassword::prompt_password("Password: ")?;

    let credentials = Credentials::new(email.trim(), password);
    if let Err(e) = credentials.validate() {
        output::print_error(&e.login_message(), format);
        return Ok(());
    }

    let outcome = ctx
        .store
        .login(&credentials.email, &credentials.password)
        .await;

    match format {
        OutputFormat::Json => output::print_json(&outcome),
        OutputFormat::Text => match outcome.error() {
            None => println!("Logged in as {}", describe(&ctx.store.state())),
            Some(error) => output::print_error(&format!("Login failed: {}", error), format),
        },
    }

    Ok(())
}

/// Logout and clear the stored session.
pub async fn logout(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.store.logout().await;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Check authentication status.
pub async fn status(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.store.initialize().await;
    print_state(ctx, &ctx.store.state(), format);
    Ok(())
}

/// Validate the session, then re-fetch the user from the backend.
pub async fn whoami(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.store.initialize().await;
    if ctx.store.state().is_signed_in() {
        ctx.store.refresh_user().await;
    }
    print_state(ctx, &ctx.store.state(), format);
    Ok(())
}

fn print_state(ctx: &Context, state: &AuthState, format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "api": ctx.config.api_base_url,
            "auth": state,
        })),
        OutputFormat::Text => {
            output::print_row("API", &ctx.config.api_base_url);
            match state {
                AuthState::Authenticated { user, is_admin } => {
                    output::print_row("Auth", "logged in");
                    output::print_row("User ID", &user.id);
                    output::print_row("Email", user.email.as_deref().unwrap_or("-"));
                    output::print_row("Role", if *is_admin { "admin" } else { "member" });
                }
                AuthState::TokenOnly { email } => {
                    output::print_row("Auth", "logged in (identity not loaded)");
                    output::print_row("Email", email.as_deref().unwrap_or("-"));
                }
                AuthState::Unauthenticated => output::print_row("Auth", "not logged in"),
                AuthState::Uninitialized | AuthState::Loading => {
                    output::print_row("Auth", "checking")
                }
            }
        }
    }
}
