//! Library core for the mailtools command-line utilities.
//!
//! Two binaries are built on top of this crate: `climap`, which searches an
//! IMAP mailbox and optionally downloads matching messages, and `sparks`,
//! which sends transactional email through the SparkPost API. Everything
//! protocol-shaped lives in external crates (`async-imap`, `mail-parser`,
//! `reqwest`); this library only holds the thin session wrapper, the
//! first-attachment extractor, the local message store, and the glue around
//! them.

// --- Modules ---
pub mod cli;
pub mod config;
pub mod imap;
pub mod mime;
pub mod sparkpost;
pub mod store;

// Re-export key types for convenience
pub mod prelude {
    // Config
    pub use crate::config::{ClimapSettings, SettingsError, SparksSettings};

    // IMAP
    pub use crate::imap::error::ImapError;
    pub use crate::imap::session::MailSession;
    pub use crate::imap::types::SearchCriteria;

    // MIME
    pub use crate::mime::{first_attachment, Attachment, MimeError};

    // Local message cache
    pub use crate::store::{MessageStore, StoreError};

    // Common Libs
    pub use log::{debug, error, info, trace, warn};
    pub use thiserror::Error;
}
