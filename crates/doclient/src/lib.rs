//! DigitalOcean APIv2 client.
//!
//! Provides typed resource records and the [`DoClient`] facade for droplet
//! lifecycle management, metadata listings, SSH keys, and DNS domains. All
//! requests go through the authenticated mediator in `doclient-core`; every
//! operation is strictly sequential and surfaces failures through the shared
//! error taxonomy.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod resize;

pub use client::{DoClient, DoClientBuilder};
pub use models::{
    Account, ActionStatus, CreateDroplet, CreateDroplets, Domain, Droplet, DropletActionRequest,
    DropletId, Image, ImageRef, Kernel, KeyRef, NetworkInterface, NetworkKind, Networks, Region,
    Size, Snapshot, SshKey,
};
pub use resize::{ResizeOperation, ResizePhase};

/// Convenient result alias that reuses the shared core error type.
pub type Result<T> = doclient_core::Result<T>;
