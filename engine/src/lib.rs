//! Resolution engine for a "spin the wheel" picker: the candidate store, the
//! spin session protocol and the ambient config and logging around them.
//! The wheel geometry itself lives in `shared::shared_wheel_game`.

pub mod config;
pub mod error;
pub mod games;
pub mod logging;
pub mod services;
pub mod source;

pub use config::EngineConfig;
pub use error::{Error, LoadError, Result};
pub use games::wheel_session::{SpinOutcome, WheelSession};
pub use services::selection_store::SelectionStore;
pub use source::{ByteSource, FileSource, MemorySource};
