// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use async_trait::async_trait;
use gamejolt_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::constants::*;
use crate::Credential;

/// QuickPlayCredentialProvider loads the identity Game Jolt hands to games
/// started with "Quick Play" from the site.
///
/// The site drops a two line file next to the game: the username on the
/// first line and the game token on the second. The path is resolved from:
///
/// 1. the path given with [`with_credentials_file`](Self::with_credentials_file)
/// 2. the `GAMEJOLT_CREDENTIALS_FILE` environment variable
/// 3. `gjapi-credentials.txt` in the working directory
///
/// A missing or incomplete file is not an error: the game simply was not
/// started through Quick Play.
#[derive(Debug, Default, Clone)]
pub struct QuickPlayCredentialProvider {
    credentials_file: Option<String>,
}

impl QuickPlayCredentialProvider {
    /// Create a new QuickPlayCredentialProvider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    fn resolve_path(&self, ctx: &Context) -> Option<String> {
        let path = match &self.credentials_file {
            Some(path) => path.clone(),
            None => ctx
                .env_var(GAMEJOLT_CREDENTIALS_FILE)
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string()),
        };

        let expanded = ctx.expand_home_dir(&path);
        if expanded.is_none() {
            debug!("failed to expand homedir for path: {path}");
        }
        expanded
    }
}

#[async_trait]
impl ProvideCredential for QuickPlayCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(path) = self.resolve_path(ctx) else {
            return Ok(None);
        };

        let content = match ctx.file_read_as_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("quick play credentials file {path} is not readable: {err:?}");
                return Ok(None);
            }
        };

        let mut lines = content.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(username), Some(token)) if !username.is_empty() && !token.is_empty() => {
                debug!("loaded quick play credentials for {username} from {path}");
                Ok(Some(Credential::new(username, token)))
            }
            _ => {
                debug!("quick play credentials file {path} is incomplete");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamejolt_core::StaticEnv;
    use gamejolt_file_read_tokio::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn ctx(envs: HashMap<String, String>) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    #[tokio::test]
    async fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "CROS")?;
        writeln!(file, "t0k3n  ")?;

        let provider = QuickPlayCredentialProvider::new()
            .with_credentials_file(file.path().to_string_lossy());
        let cred = provider.provide_credential(&ctx(HashMap::new())).await?;

        assert_eq!(cred, Some(Credential::new("CROS", "t0k3n")));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_path_from_env() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "CROS\r\nt0k3n")?;

        let envs = HashMap::from([(
            GAMEJOLT_CREDENTIALS_FILE.to_string(),
            file.path().to_string_lossy().to_string(),
        )]);
        let cred = QuickPlayCredentialProvider::new()
            .provide_credential(&ctx(envs))
            .await?;

        assert_eq!(cred, Some(Credential::new("CROS", "t0k3n")));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_or_incomplete_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("gjapi-credentials.txt");
        let provider = QuickPlayCredentialProvider::new()
            .with_credentials_file(missing.to_string_lossy());
        assert_eq!(provider.provide_credential(&ctx(HashMap::new())).await?, None);

        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "CROS")?;
        let provider = QuickPlayCredentialProvider::new()
            .with_credentials_file(file.path().to_string_lossy());
        assert_eq!(provider.provide_credential(&ctx(HashMap::new())).await?, None);

        Ok(())
    }
}
