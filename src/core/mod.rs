// core logic - crisis screening, context assembly, upstream calls

mod ai;
mod context;
mod crisis;
mod relay;

pub use ai::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, EMPTY_REPLY,
    MAX_ERROR_DETAIL_CHARS, OpenAi, Upstream, UpstreamSettings, prefix_chars,
};
pub use context::{
    ContextAssembler, DEFAULT_MAX_TURNS, Role, SYSTEM_PREAMBLE, Turn, last_user_content,
};
pub use crisis::{CrisisCategory, CrisisDetector};
pub use relay::{Relay, RelayResponse, RetryPolicy, SAFETY_MESSAGE};
