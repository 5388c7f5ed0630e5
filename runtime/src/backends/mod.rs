//! Built-in backends.

mod null;

pub use null::NullVem;
