//! Market-data plumbing: the rolling price window fed to the transform.

pub mod window;

pub use window::{PriceWindowBuffer, WindowError};
