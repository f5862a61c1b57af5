//! GraphQL multipart protocols.
//!
//! This module holds the stateless core: classification of data lines, the
//! chunk parser shared by every variant, and selection of the variant a
//! response was negotiated with.
//!
//! # Module Organization
//!
//! ```text
//! protocol/
//! ├── constants  - Fixed literals, keys and header names
//! ├── classifier - Data line classification
//! ├── spec       - Per-variant policy (defer, subscription)
//! ├── parser     - Chunk parser
//! ├── registry   - Variant selection
//! └── headers    - Content-Type parsing, Accept formatting
//! ```
//!
//! # Data Flow
//!
//! ```text
//! Content-Type ──► registry ──► ProtocolSpec
//!                                   │
//! chunk ──► split ──► classify ──► parse ──► Outcome::Data / Outcome::Error
//! ```

pub mod constants;

mod classifier;
mod headers;
mod parser;
mod registry;
mod spec;

pub use classifier::DataLine;
pub use headers::{accept_header, content_type_from_headers, parse_content_type, MultipartContentType};
pub use parser::Outcomes;
pub use registry::{select_parser, SpecificationRegistry};
pub use spec::{PayloadRule, ProtocolSpec};
