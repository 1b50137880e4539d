//! Registration types for inventory-based component discovery.
//!
//! Leaf types register a factory under the type name the server renders
//! into its init calls; the page looks the factory up when it brings an
//! instance onto a surface.

use crate::component::{Component, ComponentCore};
use crate::context::EventCtx;
use crate::widget::{Widget, WidgetCore};

/// Component registration entry for inventory.
pub struct ComponentRegistration {
    /// Type name the server addresses this component by.
    pub type_name: &'static str,
    /// Factory producing a live instance on an already-bound core.
    pub construct: fn(ComponentCore, &mut EventCtx<'_>) -> Box<dyn Component>,
}

impl ComponentRegistration {
    pub const fn new(
        type_name: &'static str,
        construct: fn(ComponentCore, &mut EventCtx<'_>) -> Box<dyn Component>,
    ) -> Self {
        Self {
            type_name,
            construct,
        }
    }
}

inventory::collect!(ComponentRegistration);

/// Get all registered component types.
pub fn registered_components() -> impl Iterator<Item = &'static ComponentRegistration> {
    inventory::iter::<ComponentRegistration>()
}

pub fn find_component(type_name: &str) -> Option<&'static ComponentRegistration> {
    registered_components().find(|registration| registration.type_name == type_name)
}

/// Widget registration entry for inventory.
pub struct WidgetRegistration {
    pub type_name: &'static str,
    pub construct: fn(WidgetCore, &mut EventCtx<'_>) -> Box<dyn Widget>,
}

impl WidgetRegistration {
    pub const fn new(
        type_name: &'static str,
        construct: fn(WidgetCore, &mut EventCtx<'_>) -> Box<dyn Widget>,
    ) -> Self {
        Self {
            type_name,
            construct,
        }
    }
}

inventory::collect!(WidgetRegistration);

/// Get all registered widget types.
pub fn registered_widgets() -> impl Iterator<Item = &'static WidgetRegistration> {
    inventory::iter::<WidgetRegistration>()
}

pub fn find_widget(type_name: &str) -> Option<&'static WidgetRegistration> {
    registered_widgets().find(|registration| registration.type_name == type_name)
}
