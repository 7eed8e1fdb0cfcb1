//! Project-local store of server aliases (`.mcphub.json`).

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{
    StoreDocument, parse_document_str, parse_store, parse_store_document, parse_store_str, to_json,
};
pub use paths::{STORE_FILE_NAME, locate, locate_from, store_path_in};
pub use schema::{SERVERS_KEY, ServerOverride};
pub use store::{ConfigStore, InitReport};
