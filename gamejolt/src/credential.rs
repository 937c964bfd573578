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

use std::fmt::{Debug, Formatter};

use gamejolt_core::utils::Redact;

/// Credential of a Game Jolt user: the name and the game token they
/// authenticate with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Username of the player.
    pub username: String,
    /// Game token of the player, found in their profile on the site.
    pub token: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Check whether both fields are filled.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.token.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &Redact::from(&self.token))
            .finish()
    }
}
