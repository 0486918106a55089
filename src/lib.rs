pub mod convert;
pub mod decode;
pub mod error;
pub mod fix;
pub mod framer;
pub mod sentence;
pub mod session;
pub mod transport;
pub mod tui;

pub use convert::DecodeContext;
pub use decode::{DecodeFailure, DecodeOutcome, decode_sentence};
pub use error::{DecodeError, ReaderError, Result};
pub use fix::{Fix, NoSignal};
pub use framer::SentenceFramer;
pub use sentence::SentenceType;
pub use session::{FixSink, SessionConfig, StreamSession};
