pub mod channel;
pub mod component;
pub mod components;
pub mod context;
pub mod envelope;
pub mod form;
pub mod notice;
pub mod page;
pub mod params;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod transport;
pub mod widget;
pub mod widgets;

pub use page::Page;
pub use runtime::Runtime;

pub mod prelude {
    pub use crate::channel::{Channel, ChannelConfig, ChannelError};
    pub use crate::component::{Component, ComponentCore, Dispatchable, Identifiable};
    pub use crate::components::{Badge, Link, Modal, NumberInput, Radio, TabsLayout, TextInput};
    pub use crate::context::{EventCtx, ResponseCallback};
    pub use crate::envelope::{Cid, Envelope, EventId, EventKind, Wid};
    pub use crate::form::{ChangeCoalescing, CoalesceDecision, Coalescer};
    pub use crate::notice::{Notice, NoticeLevel, NoticeQueue};
    pub use crate::page::{Fragment, HostEvent, InitSpec, Page, PageError};
    pub use crate::params::Params;
    pub use crate::registry::{ComponentRegistration, WidgetRegistration};
    pub use crate::runtime::Runtime;
    pub use crate::session::{Session, SessionEnded, TransactionId};
    pub use crate::transport::{HttpTransport, Loopback, Transport, TransportError};
    pub use crate::widget::{Widget, WidgetCore};
    pub use crate::widgets::{ProgressWidget, UploadWidget};
}
