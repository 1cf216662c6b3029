//! Client for the Hostnine reseller control panel API.
//!
//! # Overview
//! Every remote module is exposed twice: as a `build_*` / `parse_*` pair on
//! `HostnineClient` (host-does-IO, no network access), and as a single
//! method on `Gateway`, which runs the pair through a `Transport`.
//!
//! # Design
//! - Requests are GETs with every parameter, the module selector and the
//!   API key in the query string.
//! - Replies are normalized once in `parse_envelope`: HTML stripped from
//!   the result message, spaces collapsed, the success flag coerced to a
//!   bool.
//! - A missing or rejected key and an unknown module surface as typed
//!   errors by matching the upstream's exact result messages.
//! - Clients hold no mutable state; concurrent calls are independent.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod normalize;
pub mod params;
pub mod types;

pub use client::HostnineClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ErrorKind, TransportError};
pub use gateway::{Gateway, Transport, UreqTransport};
pub use http::{HttpRequest, HttpResponse};
pub use params::{format_filters, is_numeric, strip_numeric_keys, Params};
pub use types::{
    AccountFilters, AccountList, AccountListData, Detail, Envelope, ListMeta, LocationList,
    MessageList, MigrationList, MyAccount, NewsList, PackageList,
};
