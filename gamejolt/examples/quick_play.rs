//! Verify the quick play user and list their trophies.
//!
//! ```shell
//! GAMEJOLT_GAME_ID=1234 GAMEJOLT_PRIVATE_KEY=... RUST_LOG=debug \
//!     cargo run --example quick_play
//! ```

use anyhow::{bail, Result};
use gamejolt::{Client, Config, TrophyFilter};
use gamejolt_core::{Context, OsEnv};
use gamejolt_file_read_tokio::TokioFileRead;
use gamejolt_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::new().with_verbose(true).from_env(&ctx);
    let mut client = Client::load(ctx, config).await?;

    if !client.has_quick_play() {
        bail!("no quick play credentials found, start the game from the site");
    }
    if !client.verify_quick_play().await {
        bail!("quick play user could not be verified");
    }

    if let Some(user) = client.verified_user().await {
        println!("playing as {user}");
    }
    for trophy in client
        .get_trophies(TrophyFilter::Achieved)
        .await
        .unwrap_or_default()
    {
        println!("{trophy}");
    }

    if let Some(time) = client.get_server_time().await {
        println!("server time: {:?}", time.to_datetime());
    }
    Ok(())
}
