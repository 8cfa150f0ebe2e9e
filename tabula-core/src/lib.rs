pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod schema;
pub mod value;

pub use config::{DatabaseConfig, ServerConfig};
pub use error::{Error, Result};
pub use request::{Filter, FilterOp, TableRequest, MAX_PER_PAGE, MIN_PER_PAGE};
pub use response::{Status, TablePage, TableResult};
pub use schema::{ColumnMeta, TableSchema};
pub use value::{DecodedRow, ScalarKind, Value};
