// Env values used by the Game Jolt client.
pub const GAMEJOLT_GAME_ID: &str = "GAMEJOLT_GAME_ID";
pub const GAMEJOLT_PRIVATE_KEY: &str = "GAMEJOLT_PRIVATE_KEY";
pub const GAMEJOLT_API_VERSION: &str = "GAMEJOLT_API_VERSION";
pub const GAMEJOLT_FORMAT: &str = "GAMEJOLT_FORMAT";
pub const GAMEJOLT_CREDENTIALS_FILE: &str = "GAMEJOLT_CREDENTIALS_FILE";

// Defaults.
pub const DEFAULT_ENDPOINT: &str = "http://gamejolt.com/api/game/";
pub const DEFAULT_API_VERSION: &str = "1_1";
pub const DEFAULT_CREDENTIALS_FILE: &str = "gjapi-credentials.txt";
pub const DEFAULT_HIGHSCORE_LIMIT: u32 = 100;

// Query parameters with special treatment while signing.
pub const PARAM_FORMAT: &str = "format";
pub const PARAM_GAME_ID: &str = "game_id";
pub const PARAM_SIGNATURE: &str = "signature";
pub const PARAM_USERNAME: &str = "username";
pub const PARAM_USER_TOKEN: &str = "user_token";

/// Format name of the raw `SUCCESS` + payload answers of the data store.
pub const FORMAT_DUMP: &str = "dump";
