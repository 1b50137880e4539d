//! Built-in widget leaves: value-bearing sub-elements living inside a
//! component's surface, addressed by wid.

pub mod progress;
pub mod upload;

pub use progress::ProgressWidget;
pub use upload::UploadWidget;
