//! Bidirectional pump between an SSH channel and a container exec socket —
//! the Bidirectional Pump component.

pub mod error;
pub mod pump;
pub mod writer;

pub use error::{PumpError, Result};
pub use pump::Pump;
pub use writer::ChannelWriter;
