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

//! Hash related utils.

use md5::Digest;
use md5::Md5;

/// Hex encoded MD5 hash.
///
/// Always 32 lowercase characters, every octet zero padded to two digits.
pub fn hex_md5(content: &[u8]) -> String {
    hex::encode(Md5::digest(content).as_slice())
}

/// Hex encoded MD5 hash of `content` immediately followed by `secret`.
///
/// This is the keyed hash used to sign Game Jolt requests.
pub fn hex_md5_with_secret(content: &str, secret: &str) -> String {
    let mut h = Md5::new();
    h.update(content.as_bytes());
    h.update(secret.as_bytes());

    hex::encode(h.finalize().as_slice())
}
