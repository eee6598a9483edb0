//! Page interaction behaviors for the portfolio site.
//!
//! Every behavior reads and writes the page through the traits in [`page`],
//! so the same code runs against the browser (see the `site_web` app) and the
//! in-memory [`memory::MemoryPage`].

pub mod active_link;
pub mod config;
pub mod contact_form;
pub mod controller;
pub mod error;
pub mod memory;
pub mod navbar;
pub mod page;
pub mod resize;
pub mod smooth_scroll;
pub mod tilt;

pub use config::{PageConfig, Selectors};
pub use contact_form::{ContactForm, Field, FormState};
pub use controller::{InstallReport, PageController};
pub use error::{PageError, ValidationError};
pub use page::{
    Dom, EventKind, EventTarget, Events, Handler, Page, PageEvent, ScrollBehavior, Viewport,
};
