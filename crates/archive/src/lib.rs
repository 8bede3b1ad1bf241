// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! datasync-archive: SFTP archive client, discovering and parsing remote
//! change files into ordered record streams.

pub mod client;
pub mod error;
pub mod parse;
pub mod sftp;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::ArchiveClient;
pub use error::ArchiveError;
pub use parse::parse_change_file;
pub use sftp::SftpArchiveClient;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeArchiveClient;
