//! Analytics Core - Copy-Trade Detection and Wallet Performance
//!
//! Pure, synchronous computation over fully fetched trade snapshots. Nothing in
//! this module performs I/O except the export backends.
//!
//! # Architecture
//!
//! ```text
//! Envio GraphQL → RawTrade → normalizer (CanonicalTransaction, exact decimals)
//!     ↓                              ↓
//! TimeWindow (trailing days / UTC day, caller-side filtering)
//!     ↓                              ↓
//! PerformanceSummarizer        PatternMatcher (direction + ±threshold join)
//!     ↓
//! ExportAdapter → ExportWriter → JSON or SQLite backend
//! ```

pub mod export;
pub mod json_writer;
pub mod matcher;
pub mod normalizer;
pub mod sqlite_writer;
pub mod summarizer;
pub mod window;
pub mod writer;
pub mod writer_backend;

pub use export::{ExportAdapter, WalletDayExport};
pub use json_writer::JsonExportWriter;
pub use matcher::{similarity_score, PatternMatch, PatternMatcher, DEFAULT_TIME_THRESHOLD_SECS};
pub use normalizer::{normalize_batch, CanonicalTransaction, NormalizeError, RawTrade, TradeDirection};
pub use sqlite_writer::SqliteExportWriter;
pub use summarizer::{PerformanceSummarizer, PerformanceSummary};
pub use window::{for_wallet, TimeWindow};
pub use writer::ExportWriter;
pub use writer_backend::{ExportBackend, ExportWriterError};
