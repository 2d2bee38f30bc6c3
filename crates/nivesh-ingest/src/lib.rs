//! Upstream fetch and normalization for the nivesh datasets.
//!
//! Upstreams are loosely structured: JSON APIs that rename their fields
//! between deployments, and HTML pages whose tables move around. Everything
//! here coerces that noise into canonical rows:
//! - `normalize`: alias-based field resolution for JSON payloads
//! - `html`: tag-scanning extraction of `<table>` blocks into `RawTable`s
//! - `table`: heuristic selection of the flow table and its columns
//! - `fetch`: warm-up, candidate-endpoint loop, fallback ordering

pub mod error;
pub mod fetch;
pub mod html;
pub mod normalize;
pub mod table;

pub use error::{IngestError, IngestResult};
pub use fetch::{FlowFetcher, FlowSourceConfig};
pub use html::{extract_tables, RawTable};
pub use normalize::{normalize_flow_payload, normalize_flow_record};
pub use table::{extract_flow_rows, select_flow_table, NetColumns, TablePick};
