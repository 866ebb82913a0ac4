//! Command handlers.
//!
//! Each handler runs one flow against the shared [`AppContext`] and prints
//! its notification. Failures print one line per message; errors already
//! handled by the 401 recovery print nothing.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod shell;

use digi_storefront::{AppContext, AppError};

use crate::Commands;

/// Run one command. Returns `false` if it failed.
pub async fn execute(ctx: &AppContext, command: Commands) -> bool {
    let result = match command {
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => account::register(ctx, name, email, password, confirm_password).await,
        Commands::VerifyOtp { email, otp } => account::verify_otp(ctx, &email, &otp).await,
        Commands::ResendOtp { email } => account::resend_otp(ctx, &email).await,
        Commands::Login { email, password } => account::login(ctx, email, password).await,
        Commands::Logout => account::logout(ctx).await,
        Commands::ForgotPassword { email } => account::forgot_password(ctx, &email).await,
        Commands::Whoami => {
            account::whoami(ctx);
            Ok(())
        }
        Commands::Profile { name, password } => account::profile(ctx, name, password).await,
        Commands::Orders { action } => catalog::orders(ctx, action).await,
        Commands::Products { action } => catalog::products(ctx, action).await,
        Commands::Cart { action } => cart::run(ctx, action).await,
        Commands::Checkout => cart::checkout(ctx).await,
        Commands::Shell => {
            eprintln!("error: already in a shell");
            return false;
        }
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            print_error(&e);
            false
        }
    }
}

/// Report an error to Sentry if unexpected and print its messages.
pub fn print_error(error: &AppError) {
    error.report();
    if error.is_silent() {
        return;
    }
    for message in error.messages() {
        eprintln!("error: {message}");
    }
}
