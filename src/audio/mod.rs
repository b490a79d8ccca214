pub mod relay;

pub use relay::{AudioRelay, CHUNK_SIZE};
