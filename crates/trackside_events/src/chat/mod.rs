//! Player chat: formatting, outbound transport and the routing pipeline.

mod controller;
mod format;
mod transport;

pub use controller::{ChatController, ChatOutcome};
pub use format::{escape_trailing_dollars, strip_styles, ChatMessageFormatter, ChatStyle};
pub use transport::{ChatTransport, RecordingTransport};
