use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use gamejolt::{
    Client, Config, DataStoreOperation, DataStoreScope, Format, NewHighscore,
    StaticCredentialProvider, TrophyFilter,
};
use gamejolt_core::hash::hex_md5;
use gamejolt_core::{Context, Error, HttpSend};
use gamejolt_file_read_tokio::TokioFileRead;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

const PRIVATE_KEY: &str = "5f4dcc3b5aa765d61d8327deb882cf99";

#[derive(Debug)]
enum Reply {
    Body(&'static str),
    Status(StatusCode),
    Unreachable,
}

#[derive(Debug, Clone)]
struct Sent {
    method: Method,
    uri: String,
    body: Bytes,
}

/// HttpSend that answers from a script and records what it was sent.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl MockHttpSend {
    fn reply(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> gamejolt_core::Result<http::Response<Bytes>> {
        self.sent.lock().unwrap().push(Sent {
            method: req.method().clone(),
            uri: req.uri().to_string(),
            body: req.body().clone(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request");
        match reply {
            Reply::Body(body) => Ok(http::Response::new(Bytes::from_static(body.as_bytes()))),
            Reply::Status(status) => {
                let mut resp = http::Response::new(Bytes::new());
                *resp.status_mut() = status;
                Ok(resp)
            }
            Reply::Unreachable => Err(Error::unexpected("connection refused")),
        }
    }
}

fn init(format: Format) -> (MockHttpSend, Client) {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = MockHttpSend::default();
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_file_read(TokioFileRead);
    let config = Config::new()
        .with_game_id(1234)
        .with_private_key(PRIVATE_KEY)
        .with_format(format)
        .with_verbose(true);

    (http, Client::new(ctx, config).unwrap())
}

async fn verified(format: Format) -> (MockHttpSend, Client) {
    let (http, mut client) = init(format);
    http.reply(Reply::Body("success:\"true\"\n"));
    client.set_format(Format::Keypair);
    assert!(client.verify("CROS", "t0k3n").await);
    client.set_format(format);
    (http, client)
}

fn query(uri: &str) -> Vec<(String, String)> {
    let (_, query) = uri.split_once('?').unwrap();
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

fn param(uri: &str, key: &str) -> Option<String> {
    query(uri).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

#[test]
fn test_new_requires_game() {
    let err = Client::new(Context::new(), Config::new().with_game_id(1)).unwrap_err();
    assert_eq!(err.kind(), gamejolt_core::ErrorKind::ConfigInvalid);
}

#[tokio::test]
async fn test_add_highscore_requires_verified_user() {
    let (http, client) = init(Format::Keypair);

    let score = NewHighscore::new("100 Coins", 100).with_table_id(0);
    assert!(!client.add_highscore(&score).await);
    assert!(http.sent().is_empty());
}

#[tokio::test]
async fn test_add_highscore() {
    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body("success:\"true\"\n"));

    let score = NewHighscore::new("100 Coins", 100).with_table_id(0);
    assert!(client.add_highscore(&score).await);

    let sent = http.sent();
    assert_eq!(sent.len(), 2);
    let uri = &sent[1].uri;
    assert_eq!(sent[1].method, Method::GET);
    assert!(uri.starts_with("http://gamejolt.com/api/game/v1_1/scores/add?game_id=1234&"));
    assert_eq!(param(uri, "score").as_deref(), Some("100 Coins"));
    assert_eq!(param(uri, "sort").as_deref(), Some("100"));
    assert_eq!(param(uri, "username").as_deref(), Some("CROS"));
    assert_eq!(param(uri, "table_id"), None);
    assert_eq!(param(uri, "guest"), None);

    let (canonical, signature) = uri.split_once("&signature=").unwrap();
    assert!(canonical.ends_with("&user_token=t0k3n"));
    assert_eq!(signature, hex_md5(format!("{canonical}{PRIVATE_KEY}").as_bytes()));
}

#[tokio::test]
async fn test_add_guest_highscore() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body("success:\"true\"\n"));

    let score = NewHighscore::new("7 Coins", 7)
        .with_table_id(9)
        .with_extra_data("level=2")
        .with_guest("visitor");
    assert!(client.add_highscore(&score).await);

    let uri = &http.sent()[0].uri;
    assert_eq!(param(uri, "guest").as_deref(), Some("visitor"));
    assert_eq!(param(uri, "table_id").as_deref(), Some("9"));
    assert_eq!(param(uri, "extra_data").as_deref(), Some("level=2"));
    assert_eq!(param(uri, "user_token"), None);
}

#[tokio::test]
async fn test_failed_verify_forgets_user() {
    let (http, mut client) = verified(Format::Keypair).await;
    assert!(client.is_verified());

    http.reply(Reply::Body("success:\"false\"\nmessage:\"No such user with the credentials passed in could be found.\"\n"));
    assert!(!client.verify("CROS", "wrong").await);
    assert!(!client.is_verified());
    assert!(!client.open_session().await);
    assert_eq!(http.sent().len(), 2);
}

#[tokio::test]
async fn test_get_highscore_rank() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body("success:\"false\"\nmessage:\"No such table.\"\n"))
        .reply(Reply::Body("success:\"true\"\nrank:\"3\"\n"));

    assert_eq!(client.get_highscore_rank(100, 0).await, -1);
    assert_eq!(client.get_highscore_rank(100, 5).await, 3);

    let sent = http.sent();
    assert_eq!(param(&sent[0].uri, "sort").as_deref(), Some("100"));
    assert_eq!(param(&sent[0].uri, "table_id"), None);
    assert_eq!(param(&sent[1].uri, "table_id").as_deref(), Some("5"));
}

#[tokio::test]
async fn test_get_highscores() {
    let (http, client) = init(Format::Json);
    http.reply(Reply::Body(
        r#"{"response":{"success":"true","scores":[
            {"score":"100 Coins","sort":"100","extra_data":"","user":"CROS","user_id":"1","guest":"","stored":"2 days ago"},
            {"score":"7 Coins","sort":"7","extra_data":"","user":"","user_id":"","guest":"visitor","stored":"1 hour ago"}]}}"#,
    ));

    let scores = client.get_highscores(0, true, 10).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].user_id().unwrap(), Some(1));
    assert!(scores[1].is_guest_highscore().unwrap());
    assert_eq!(scores[1].username(), Some("visitor"));

    let uri = &http.sent()[0].uri;
    assert_eq!(param(uri, "limit").as_deref(), Some("10"));
    assert_eq!(param(uri, "format").as_deref(), Some("json"));

    assert_eq!(client.get_highscores(0, false, 10).await, None);
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test]
async fn test_get_trophies() {
    let (http, client) = verified(Format::Xml).await;
    http.reply(Reply::Body(
        "<response><success>true</success><trophies>\
         <trophy><id>1</id><title>First Steps</title><difficulty>Bronze</difficulty><achieved>2 days ago</achieved></trophy>\
         </trophies></response>",
    ))
    .reply(Reply::Body(
        "<response><success>false</success><message>Bad signature.</message></response>",
    ));

    let trophies = client.get_trophies(TrophyFilter::Achieved).await.unwrap();
    assert_eq!(trophies.len(), 1);
    assert_eq!(trophies[0].title(), Some("First Steps"));
    assert!(trophies[0].is_achieved().unwrap());

    assert_eq!(client.get_trophies(TrophyFilter::All).await, None);

    let sent = http.sent();
    assert_eq!(param(&sent[1].uri, "achieved").as_deref(), Some("true"));
    assert_eq!(param(&sent[1].uri, "format").as_deref(), Some("xml"));
    assert_eq!(param(&sent[2].uri, "achieved"), None);
}

#[tokio::test]
async fn test_data_store_keys() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body("success:\"true\"\n"));

    assert_eq!(client.get_data_store_keys(DataStoreScope::Game).await, Some(vec![]));
    assert_eq!(client.get_data_store_keys(DataStoreScope::User).await, None);
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test]
async fn test_data_store_round_trip() {
    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body("success:\"true\"\n"))
        .reply(Reply::Body("SUCCESS\r\n{\"level\": 3}"))
        .reply(Reply::Body("SUCCESS\r\n15"))
        .reply(Reply::Body("FAILURE\r\nNo item with that key could be found."));

    let record = client
        .set_data_store(DataStoreScope::User, "save", "{\"level\": 3}")
        .await
        .unwrap();
    assert_eq!(record.data(), "{\"level\": 3}");

    let record = client
        .get_data_store(DataStoreScope::User, "save")
        .await
        .unwrap();
    assert_eq!(record.data(), "{\"level\": 3}");
    assert_eq!(record.scope(), DataStoreScope::User);

    let record = client
        .update_data_store(DataStoreScope::Game, "coins", DataStoreOperation::Add, 5)
        .await
        .unwrap();
    assert_eq!(record.to_string(), "DataStore [key=coins, data=15, scope=GAME]");

    assert_eq!(client.get_data_store(DataStoreScope::Game, "gone").await, None);

    let sent = http.sent();
    let set = &sent[1];
    assert_eq!(set.method, Method::POST);
    assert_eq!(&set.body[..], b"data=%7B%22level%22%3A+3%7D");
    assert_eq!(param(&set.uri, "key").as_deref(), Some("save"));
    assert_eq!(param(&set.uri, "data"), None);

    assert_eq!(param(&sent[2].uri, "format").as_deref(), Some("dump"));
    assert_eq!(param(&sent[3].uri, "operation").as_deref(), Some("add"));
    assert_eq!(param(&sent[3].uri, "value").as_deref(), Some("5"));
    assert_eq!(param(&sent[3].uri, "username"), None);
}

#[tokio::test]
async fn test_sessions() {
    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body("success:\"true\"\n"))
        .reply(Reply::Body("success:\"true\"\n"))
        .reply(Reply::Body("success:\"false\"\n"));

    assert!(client.open_session().await);
    assert!(client.ping_session(false).await);
    assert!(!client.close_session().await);

    let sent = http.sent();
    assert!(sent[1].uri.contains("/sessions/open/?"));
    assert_eq!(param(&sent[2].uri, "status").as_deref(), Some("idle"));
}

#[tokio::test]
async fn test_transport_failures() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Unreachable)
        .reply(Reply::Status(StatusCode::BAD_GATEWAY))
        .reply(Reply::Body("REQUEST_FAILED"));

    assert_eq!(client.get_server_time().await, None);
    assert_eq!(client.get_highscore_tables().await, None);
    assert_eq!(client.get_user("CROS").await, None);
}

#[tokio::test]
async fn test_get_server_time() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body(
        "success:\"true\"\ntimestamp:\"1700000000\"\ntimezone:\"America/New_York\"\n\
         year:\"2023\"\nmonth:\"11\"\nday:\"14\"\nhour:\"17\"\nminute:\"13\"\nseconds:\"20\"\n",
    ));

    let time = client.get_server_time().await.unwrap();
    assert_eq!(time.year().unwrap(), 2023);
    assert_eq!(time.to_datetime().unwrap().timestamp(), 1_700_000_000);
}

#[tokio::test]
async fn test_quick_play() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "CROS")?;
    writeln!(file, "t0k3n")?;

    let http = MockHttpSend::default();
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_file_read(TokioFileRead);
    let config = Config::new()
        .with_game_id(1234)
        .with_private_key(PRIVATE_KEY)
        .with_credentials_file(file.path().to_string_lossy());
    let mut client = Client::load(ctx, config).await?;

    assert!(client.has_quick_play());
    assert_eq!(client.quick_play_credential().unwrap().username, "CROS");

    http.reply(Reply::Body("success:\"true\"\n")).reply(Reply::Body(
        "success:\"true\"\nid:\"1\"\ntype:\"Developer\"\nusername:\"CROS\"\nstatus:\"Active\"\n",
    ));
    assert!(client.verify_quick_play().await);
    assert!(client.is_verified());

    let user = client.verified_user().await.unwrap();
    assert_eq!(user.username(), Some("CROS"));
    assert_eq!(user.token(), Some("t0k3n"));

    assert!(client.reload_quick_play().await);
    assert!(!client.is_verified());

    let sent = http.sent();
    assert!(sent[0].uri.contains("/users/auth/?"));
    assert_eq!(param(&sent[1].uri, "username").as_deref(), Some("CROS"));
    Ok(())
}

#[tokio::test]
async fn test_api_version() {
    let (http, mut client) = init(Format::Keypair);
    client.set_api_version("1_2");
    http.reply(Reply::Body("success:\"true\"\n"));

    assert_eq!(client.get_highscore_tables().await, Some(vec![]));
    assert!(http.sent()[0].uri.starts_with("http://gamejolt.com/api/game/v1_2/scores/tables?"));
}

#[tokio::test]
async fn test_new_does_not_read_quick_play() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "CROS")?;
    writeln!(file, "t0k3n")?;

    let ctx = Context::new().with_file_read(TokioFileRead);
    let config = Config::new()
        .with_game_id(1234)
        .with_private_key(PRIVATE_KEY)
        .with_credentials_file(file.path().to_string_lossy());
    let mut client = Client::new(ctx, config)?;

    assert!(!client.has_quick_play());
    assert!(client.reload_quick_play().await);
    assert!(client.has_quick_play());
    Ok(())
}

#[tokio::test]
async fn test_load_without_quick_play_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let ctx = Context::new().with_file_read(TokioFileRead);
    let config = Config::new()
        .with_game_id(1234)
        .with_private_key(PRIVATE_KEY)
        .with_credentials_file(dir.path().join("missing.txt").to_string_lossy());

    let client = Client::load(ctx, config).await?;
    assert!(!client.has_quick_play());
    assert_eq!(client.quick_play_user().await, None);
    Ok(())
}

#[tokio::test]
async fn test_verify_with_provider() {
    let (http, mut client) = init(Format::Keypair);
    http.reply(Reply::Body("success:\"true\"\n"));

    assert!(client.verify_with(&StaticCredentialProvider::new("CROS", "t0k3n")).await);
    assert_eq!(client.verified_credential().unwrap().username, "CROS");

    let uri = &http.sent()[0].uri;
    assert!(uri.contains("/users/auth/?"));
    assert_eq!(param(uri, "username").as_deref(), Some("CROS"));
    assert_eq!(param(uri, "user_token").as_deref(), Some("t0k3n"));

    assert!(!client.verify_with(&StaticCredentialProvider::new("CROS", "")).await);
    assert!(!client.is_verified());
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test]
async fn test_get_user_by_id() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body(
        "success:\"true\"\nid:\"42\"\ntype:\"User\"\nusername:\"ashley\"\nstatus:\"Active\"\n",
    ));

    let user = client.get_user_by_id(42).await.unwrap();
    assert_eq!(user.id().unwrap(), 42);
    assert_eq!(user.username(), Some("ashley"));

    let uri = &http.sent()[0].uri;
    assert!(uri.contains("/users/?"));
    assert_eq!(param(uri, "user_id").as_deref(), Some("42"));
    assert_eq!(param(uri, "username"), None);
}

#[tokio::test]
async fn test_get_and_achieve_trophy() {
    let (http, client) = init(Format::Keypair);
    assert_eq!(client.get_trophy(4).await, None);
    assert!(!client.achieve_trophy(4).await);
    assert!(http.sent().is_empty());

    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body(
        "success:\"true\"\nid:\"4\"\ntitle:\"Boss\"\ndifficulty:\"Gold\"\nachieved:\"false\"\n",
    ))
    .reply(Reply::Body("success:\"true\"\n"))
    .reply(Reply::Body("success:\"true\"\n"));

    let trophy = client.get_trophy(4).await.unwrap();
    assert_eq!(trophy.id().unwrap(), 4);
    assert_eq!(trophy.title(), Some("Boss"));
    assert!(client.achieve_trophy(4).await);
    assert_eq!(client.get_trophy(5).await, None);

    let sent = http.sent();
    assert!(sent[1].uri.contains("/trophies/?"));
    assert_eq!(param(&sent[1].uri, "trophy_id").as_deref(), Some("4"));
    assert_eq!(param(&sent[1].uri, "username").as_deref(), Some("CROS"));
    assert!(sent[2].uri.contains("/trophies/add-achieved?"));
    assert_eq!(param(&sent[2].uri, "trophy_id").as_deref(), Some("4"));
    assert_eq!(param(&sent[2].uri, "user_token").as_deref(), Some("t0k3n"));
    assert_eq!(param(&sent[3].uri, "trophy_id").as_deref(), Some("5"));
}

#[tokio::test]
async fn test_remove_data_store() {
    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body("success:\"true\"\n"))
        .reply(Reply::Body("success:\"false\"\nmessage:\"No item with that key could be found.\"\n"));

    assert!(client.remove_data_store(DataStoreScope::User, "save").await);
    assert!(!client.remove_data_store(DataStoreScope::Game, "gone").await);

    let sent = http.sent();
    assert!(sent[1].uri.contains("/data-store/remove?"));
    assert_eq!(param(&sent[1].uri, "key").as_deref(), Some("save"));
    assert_eq!(param(&sent[1].uri, "username").as_deref(), Some("CROS"));
    assert_eq!(param(&sent[2].uri, "key").as_deref(), Some("gone"));
    assert_eq!(param(&sent[2].uri, "username"), None);
}

#[tokio::test]
async fn test_get_data_store_records_skips_unreadable_items() {
    let (http, client) = init(Format::Keypair);
    http.reply(Reply::Body("success:\"true\"\nkey:\"coins\"\nkey:\"lives\"\nkey:\"level\"\n"))
        .reply(Reply::Body("SUCCESS\r\n15"))
        .reply(Reply::Body("FAILURE\r\nNo item with that key could be found."))
        .reply(Reply::Body("SUCCESS\r\n3"));

    let records = client
        .get_data_store_records(DataStoreScope::Game)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].key(), records[0].data()), ("coins", "15"));
    assert_eq!((records[1].key(), records[1].data()), ("level", "3"));
    assert_eq!(records[1].scope(), DataStoreScope::Game);

    let sent = http.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].uri.contains("/data-store/get-keys?"));
    assert_eq!(param(&sent[2].uri, "key").as_deref(), Some("lives"));
    assert_eq!(param(&sent[3].uri, "format").as_deref(), Some("dump"));

    assert_eq!(client.get_data_store_records(DataStoreScope::User).await, None);
    assert_eq!(http.sent().len(), 4);
}

#[tokio::test]
async fn test_check_session() {
    let (http, client) = init(Format::Keypair);
    assert!(!client.check_session().await);
    assert!(http.sent().is_empty());

    let (http, client) = verified(Format::Keypair).await;
    http.reply(Reply::Body("success:\"true\"\n"))
        .reply(Reply::Body("success:\"false\"\n"));

    assert!(client.check_session().await);
    assert!(!client.check_session().await);

    let sent = http.sent();
    assert!(sent[1].uri.contains("/sessions/check/?"));
    assert_eq!(param(&sent[1].uri, "username").as_deref(), Some("CROS"));
    assert_eq!(param(&sent[1].uri, "user_token").as_deref(), Some("t0k3n"));
}
