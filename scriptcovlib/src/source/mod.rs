//! Source discovery: find coverage dumps to report on.
//!
//! Dumps are located by walking directories and applying include/exclude
//! glob patterns plus an ignore list of files and directories.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scriptcovlib::source::{discover_dumps, FilterConfig};
//!
//! let filter = FilterConfig::new()
//!     .exclude("**/fixtures/**")?
//!     .ignore("vendor");
//! let dumps = discover_dumps("coverage/", &filter)?;
//! ```

pub mod filter;

pub use filter::{discover_dumps, discover_dumps_in, FilterConfig, DUMP_SUFFIX};
