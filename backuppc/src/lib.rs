// SPDX-License-Identifier: AGPL-3.0-or-later
//! BackupPC host helper for configuration-management agents
//!
//! Two jobs live here: publishing host facts that describe a BackupPC
//! installation, and compiling the declarative resource catalog for the
//! client and server roles.
//!
//! # Features
//!
//! * **External facts:** `backuppc_hosts` and `backuppc_pubkey_rsa`, read fresh from disk on every run
//! * **Role catalogs:** package/file/service declarations selected by OS family
//! * **Fail fast:** unsupported platforms are rejected before anything is declared

pub mod catalog;
pub mod config;
pub mod error;
pub mod facts;
pub mod logging;

pub use catalog::{Catalog, OsFamily, PlatformParams, Resource};
pub use config::Config;
pub use error::{BackuppcError, Result};
pub use facts::{FactRegistry, FactValue, Facts};
