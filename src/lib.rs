//! TiGroup (`.tig`) support: bundles of TI calculator files stored in an
//! uncompressed ZIP archive.
//!
//! Entries are classified into *regular* (variables) and *flash* (apps, OS)
//! files by a [`ContentGateway`]; [`TiFiles`] is the built-in one.  Without
//! the default `archive` feature every operation returns
//! [`TigError::Unsupported`].

pub mod error;
pub mod platform;
pub mod config;
pub mod gateway;
pub mod classify;
pub mod tifile;
pub mod staging;
pub mod container;
pub mod extract;
pub mod assemble;
pub mod display;

pub use error::{Result, TigError};
pub use platform::Platform;
pub use config::{TigOptions, TRANSFER_BUFFER_SIZE};
pub use gateway::ContentGateway;
pub use classify::{Category, Content};
pub use tifile::{FlashContent, RegularContent, TiFiles};
pub use container::{Container, Entry, DEFAULT_COMMENT};
pub use extract::extract;
pub use assemble::assemble;
pub use display::{display, display_to, list, EntryInfo, Listing};
