pub mod document;
pub mod event;
pub mod node;

pub use document::{Document, Surface, SurfaceError};
pub use event::{keys, ClickEvent, EventDisposition, KeyEvent, Modifiers, UiEvent, UiEventKind};
pub use node::Node;
