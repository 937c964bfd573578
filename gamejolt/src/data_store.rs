use std::fmt::{Display, Formatter};

/// Partition of the data store an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataStoreScope {
    /// Items private to the verified user; requests need a verified session.
    User,
    /// Items shared by every player of the game.
    Game,
}

impl DataStoreScope {
    /// Check whether requests in this scope carry the user's credentials.
    pub fn requires_verification(&self) -> bool {
        matches!(self, DataStoreScope::User)
    }
}

impl Display for DataStoreScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataStoreScope::User => f.write_str("USER"),
            DataStoreScope::Game => f.write_str("GAME"),
        }
    }
}

/// Arithmetic or string operation applied by a data store update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStoreOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Append,
    Prepend,
}

impl DataStoreOperation {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataStoreOperation::Add => "add",
            DataStoreOperation::Subtract => "subtract",
            DataStoreOperation::Multiply => "multiply",
            DataStoreOperation::Divide => "divide",
            DataStoreOperation::Append => "append",
            DataStoreOperation::Prepend => "prepend",
        }
    }
}

/// One item of the data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStoreRecord {
    key: String,
    data: String,
    scope: DataStoreScope,
}

impl DataStoreRecord {
    /// Create a record from its parts.
    pub fn new(key: impl Into<String>, data: impl Into<String>, scope: DataStoreScope) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
            scope,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored payload, opaque to the client.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn scope(&self) -> DataStoreScope {
        self.scope
    }
}

impl Display for DataStoreRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DataStore [key={}, data={}, scope={}]",
            self.key, self.data, self.scope
        )
    }
}
