// Library root
// -----------
// Client for a content-addressed storage node's HTTP RPC interface. The
// binary (`main.rs`) wraps it in an interactive menu.
//
// Module responsibilities:
// - `api`: the blocking `Client` (add, add_binary, cat) and response types.
// - `multipart`: builds the multipart/form-data bodies sent to `add`.
// - `error`: the `IpfsError` kinds every library call can return.
// - `config`: caller-side node settings read from the environment.
// - `ui`: terminal flows used by the binary; delegates requests to `api`.
pub mod api;
pub mod config;
pub mod error;
pub mod multipart;
pub mod ui;

pub use api::{CatStream, Client, Endpoint, UploadResult, DEFAULT_LOCAL_URL, DEFAULT_TIMEOUT_SECS};
pub use config::NodeConfig;
pub use error::{IpfsError, Result};
pub use multipart::MultipartBuilder;
