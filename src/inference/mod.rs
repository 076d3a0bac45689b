//! Sign classification on ONNX Runtime.

mod classifier;
mod labels;
mod model;
mod session;
mod utils;

pub use classifier::SignClassifier;
pub use labels::{load_labels, read_labels};
pub use model::{OnnxSignModel, SignModel, StaticModel};
pub use session::{build_session, run_single_input};
pub use utils::{is_probability_vector, softmax};
