//! Account commands.

use digi_storefront::services::{LoginForm, ProfileForm, RegisterForm};
use digi_storefront::{AppContext, Result};
use secrecy::SecretString;

use crate::terminal::notify;

pub async fn register(
    ctx: &AppContext,
    name: String,
    email: String,
    password: String,
    confirm_password: Option<String>,
) -> Result<()> {
    let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
    let form = RegisterForm {
        name,
        email,
        password: SecretString::from(password),
        confirm_password: SecretString::from(confirm_password),
    };

    let notice = ctx.auth().register(&form).await?;
    notify(&notice.message);
    println!("Verify with: digi verify-otp -e {} <otp>", notice.value);
    Ok(())
}

pub async fn verify_otp(ctx: &AppContext, email: &str, otp: &str) -> Result<()> {
    let notice = ctx.auth().verify_otp(otp, email).await?;
    notify(&notice.message);
    Ok(())
}

pub async fn resend_otp(ctx: &AppContext, email: &str) -> Result<()> {
    let notice = ctx.auth().resend_otp(email).await?;
    notify(&notice.message);
    Ok(())
}

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };

    let notice = ctx.auth().login(&form).await?;
    notify(&notice.message);
    println!("Logged in as {}", notice.value.display_name());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let notice = ctx.auth().logout().await?;
    notify(&notice.message);
    Ok(())
}

pub async fn forgot_password(ctx: &AppContext, email: &str) -> Result<()> {
    let notice = ctx.auth().forgot_password(email).await?;
    notify(&notice.message);
    Ok(())
}

pub fn whoami(ctx: &AppContext) {
    match ctx.session().state().user {
        Some(user) => {
            println!("{} <{}>", user.display_name(), user.email);
            if let Some(role) = user.role {
                println!("role: {role}");
            }
        }
        None => println!("Not logged in"),
    }
}

pub async fn profile(ctx: &AppContext, name: String, password: Option<String>) -> Result<()> {
    let form = ProfileForm {
        name,
        password: password.map(SecretString::from),
    };

    let notice = ctx.auth().update_profile(&form).await?;
    notify(&notice.message);
    Ok(())
}
