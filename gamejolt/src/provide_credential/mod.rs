mod quick_play;
pub use quick_play::QuickPlayCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;
