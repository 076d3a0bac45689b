//! Frame processing pipeline components.

mod coordinator;
mod processor;
mod stream;

pub use coordinator::{classify_files, collect_input_files, is_frame_file};
pub use processor::{DetectRequest, DetectResponse, FrameOutcome, SignPipeline};
pub use stream::serve_stream;
