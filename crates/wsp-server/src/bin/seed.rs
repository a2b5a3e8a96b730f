//! Create a user account
//!
//! Usage: `wsp-seed <login> <password> <read|write>`

use anyhow::{bail, Context, Result};
use tracing::info;

use wsp_api::auth::hash_password;
use wsp_config::AppConfig;
use wsp_core::{Credentials, LoginBody, Role, UserRecord, UserStore, Validate};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [login, password, role] = args.as_slice() else {
        bail!("usage: wsp-seed <login> <password> <read|write>");
    };
    let role: Role = role
        .parse()
        .with_context(|| format!("Invalid role '{role}', expected read or write"))?;

    let Credentials { login, password } = LoginBody {
        login: Some(login.clone()),
        password: Some(password.clone()),
    }
    .validate(chrono::Utc::now())
    .context("Invalid credentials")?;

    let config = AppConfig::load().context("Failed to load configuration")?;
    wsp_obs::init("wsp-seed", &config.log);

    let db = wsp_server::connect(&config.database).await?;
    let auth = wsp_server::auth_settings(&config.auth);
    let password_hash = hash_password(password, auth.hash_cost)
        .await
        .context("Failed to hash password")?;

    db.create_user(&UserRecord {
        login: login.clone(),
        password_hash,
        role,
    })
    .await
    .with_context(|| format!("Failed to create user '{login}'"))?;

    info!(user = %login, %role, "User created");
    db.close().await;
    Ok(())
}
