//! Client for the Game Jolt game API.
//!
//! This crate talks to the Game Jolt game services: user verification,
//! trophies, highscores, the key/value data store, play sessions and the
//! server clock.
//!
//! ## Overview
//!
//! The API answers in one of three wire formats (`xml`, `json` and
//! `keypair`). [`Format`] picks both the format requested and the
//! [`ResponseParser`] used to read the answer, so every operation returns the
//! same typed entities whatever the format. Every request is signed with the
//! game's private key by [`RequestSigner`].
//!
//! The client never opens sockets or files itself: it goes through the
//! collaborators of a [`Context`](gamejolt_core::Context).
//!
//! ## Quick Start
//!
//! ```no_run
//! use gamejolt::{Client, Config, DataStoreScope, NewHighscore};
//! use gamejolt_core::{Context, OsEnv};
//! use gamejolt_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> gamejolt_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::new()
//!         .with_game_id(1234)
//!         .with_private_key("your-private-key");
//!     let mut client = Client::new(ctx, config)?;
//!
//!     if client.verify("CROS", "user-game-token").await {
//!         client.add_highscore(&NewHighscore::new("100 Coins", 100)).await;
//!         client.set_data_store(DataStoreScope::User, "save", "level=3").await;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure values
//!
//! Operations do not return errors. A call that could not be completed,
//! whatever the reason, returns `None`, `false` or `-1`. Lists the service
//! returned empty are `Some(vec![])`. Set [`Config::verbose`] to log why a
//! call failed.

mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod constants;

mod credential;
pub use credential::Credential;

mod data_store;
pub use data_store::{DataStoreOperation, DataStoreRecord, DataStoreScope};

mod format;
pub use format::Format;

mod highscore;
pub use highscore::{Highscore, HighscoreTable, NewHighscore};

pub mod parser;
pub use parser::ResponseParser;

mod property;
pub use property::PropertyBag;

mod provide_credential;
pub use provide_credential::{QuickPlayCredentialProvider, StaticCredentialProvider};

mod server_time;
pub use server_time::ServerTime;

mod sign_request;
pub use sign_request::{ApiRequest, RequestSigner};

mod trophy;
pub use trophy::{Trophy, TrophyDifficulty, TrophyFilter};

mod user;
pub use user::{User, UserStatus, UserType};
