pub mod requests;

pub use requests::{parse_id, ApiJson};
