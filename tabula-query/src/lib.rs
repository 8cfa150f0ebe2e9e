pub mod backend;
pub mod builder;
pub mod decode;
pub mod engine;
pub mod memory;
pub mod sort;
pub mod validate;

pub use backend::{Backend, RowStream, SqlArg};
pub use builder::{build_statements, quote_ident, BuiltStatements};
pub use engine::Engine;
pub use memory::MemoryBackend;
