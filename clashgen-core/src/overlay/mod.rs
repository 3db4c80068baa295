//! Fixed configuration fragments merged into the document root
//!
//! Every overlay is a typed struct serialized into the engine's key names.
//! Applying one never reads the document; it only replaces keys.

pub mod dns;
pub mod options;
pub mod sniffer;
pub mod tun;

pub use dns::{DnsConfig, EnhancedMode};
pub use options::{BasicOptions, RunMode, StoreOptions};
pub use sniffer::{SniffProtocol, SnifferConfig};
pub use tun::{TunConfig, TunStack};

use crate::document::Document;
use crate::error::Result;

/// A configuration fragment written into a document
pub trait Overlay {
    /// Name used in logs and fragment errors
    fn name(&self) -> &'static str;

    /// Write the fragment; keys already present are replaced
    fn apply(&self, doc: &mut Document) -> Result<()>;
}
