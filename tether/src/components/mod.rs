//! Built-in component leaves.
//!
//! Each leaf couples one kind of rendered element to its server half:
//! a struct holding the [`ComponentCore`](crate::component::ComponentCore)
//! plus whatever per-instance state the element needs, an implementation
//! of [`Component`](crate::component::Component) for the events it cares
//! about, and an inventory registration under the type name the server
//! renders into its init calls.

pub mod badge;
pub mod link;
pub mod modal;
pub mod number_input;
pub mod radio;
pub mod tabs;
pub mod text_input;

pub use badge::Badge;
pub use link::Link;
pub use modal::Modal;
pub use number_input::NumberInput;
pub use radio::Radio;
pub use tabs::TabsLayout;
pub use text_input::TextInput;
