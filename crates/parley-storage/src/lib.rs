// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Parley.
//!
//! Conversations, turns, stream sessions, and tool documents live in a single
//! WAL-mode SQLite database accessed through [`tokio_rusqlite`]. The schema is
//! managed with embedded refinery migrations. [`SqliteStore`] implements the
//! [`parley_core::MessageStore`] trait on top of the typed query modules.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
