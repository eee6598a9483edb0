use std::rc::Rc;

use foundation::NodeId;
use runtime::{Debounced, TimerHost};
use serde::Serialize;

use crate::config::PageConfig;
use crate::contact_form::{self, ContactForm, FormState};
use crate::page::Page;
use crate::{active_link, navbar, resize, smooth_scroll, tilt};

/// What the controller found on the page and wired up.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub fragment_links: usize,
    pub navbar: bool,
    pub sections: usize,
    pub nav_links: usize,
    pub contact_form: bool,
    pub tilt_cards: usize,
}

/// Page-lifetime owner of all interaction behaviors.
///
/// Each behavior is independent: missing markup for one never prevents the
/// others from being installed. Nothing is ever torn down.
pub struct PageController<P: Page + 'static> {
    page: Rc<P>,
    config: Rc<PageConfig>,
    navbar: Option<NodeId>,
    contact_form: Option<Rc<ContactForm>>,
    resize: Rc<Debounced<()>>,
    report: InstallReport,
}

impl<P: Page + 'static> PageController<P> {
    pub fn install(page: Rc<P>, timers: Rc<dyn TimerHost>, config: PageConfig) -> Self {
        let config = Rc::new(config);

        let fragment_links = smooth_scroll::install(&page, &config);
        let navbar = navbar::install(&page, &config);
        let (sections, nav_links) = active_link::install(&page, &config);
        let contact_form = contact_form::install(&page, &config);
        let tilt_cards = tilt::install(&page, &config);
        let resize = resize::install(&page, timers, &config);

        let report = InstallReport {
            fragment_links,
            navbar: navbar.is_some(),
            sections,
            nav_links,
            contact_form: contact_form.is_some(),
            tilt_cards,
        };
        tracing::info!(
            fragment_links,
            navbar = report.navbar,
            sections,
            nav_links,
            contact_form = report.contact_form,
            tilt_cards,
            "page interactions installed"
        );

        Self {
            page,
            config,
            navbar,
            contact_form,
            resize,
            report,
        }
    }

    pub fn page(&self) -> &Rc<P> {
        &self.page
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn report(&self) -> InstallReport {
        self.report
    }

    pub fn navbar(&self) -> Option<NodeId> {
        self.navbar
    }

    pub fn form_state(&self) -> Option<FormState> {
        self.contact_form.as_ref().map(|f| f.state())
    }

    /// `true` while a resize re-evaluation is waiting for the quiet period.
    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }
}
