pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod provider;
pub mod server;
pub mod session;
pub mod transcript;
pub mod transport;

pub use audio::{AudioRelay, CHUNK_SIZE};
pub use catalog::{Catalog, Catalogs};
pub use config::Config;
pub use error::{ParseError, ProtocolError, SessionError, TransportError};
pub use http::{create_router, AppState};
pub use protocol::{ControlHandler, Request, Response, ResultsPush};
pub use provider::{ProviderAdapter, ProviderEvent};
pub use session::{Session, SessionConfig, SessionState, SessionStats};
pub use transcript::{Reconciler, ResultRecord, Segment};
pub use transport::{Frame, Transport, WsTransport};
