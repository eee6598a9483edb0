use std::cell::Cell;
use std::rc::Rc;

use foundation::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PageConfig;
use crate::error::ValidationError;
use crate::page::{Dom, EventKind, EventTarget, Page, PageEvent, Viewport};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// `local@domain.tld`-shaped: no whitespace, a single `@`, and a dot with
/// text on both sides somewhere after it.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    /// Checked in this order; the first empty one is reported.
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Form control `name` attribute.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Absent and empty fields are rejected; whitespace-only values count as
/// filled. Field presence is checked before the email shape.
pub fn validate(
    mut field: impl FnMut(Field) -> Option<String>,
) -> Result<ContactSubmission, ValidationError> {
    let mut take = |f: Field| {
        field(f)
            .filter(|v| !v.is_empty())
            .ok_or(ValidationError::MissingField(f))
    };
    let submission = ContactSubmission {
        name: take(Field::Name)?,
        email: take(Field::Email)?,
        subject: take(Field::Subject)?,
        message: take(Field::Message)?,
    };
    if !is_valid_email(&submission.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(submission)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    /// Transient: reported to the user, then back to `Idle`.
    Rejected,
    /// Native submission is under way; the page navigates away.
    Submitting,
}

/// Submit-time validation and pending state for one contact form.
#[derive(Debug)]
pub struct ContactForm {
    form: NodeId,
    state: Cell<FormState>,
    last_error: Cell<Option<ValidationError>>,
}

impl ContactForm {
    pub fn new(form: NodeId) -> Self {
        Self {
            form,
            state: Cell::new(FormState::Idle),
            last_error: Cell::new(None),
        }
    }

    pub fn node(&self) -> NodeId {
        self.form
    }

    pub fn state(&self) -> FormState {
        self.state.get()
    }

    pub fn last_error(&self) -> Option<ValidationError> {
        self.last_error.get()
    }

    /// Submit handler body. Rejections cancel the native submission and raise
    /// one alert; accepted submissions only flag the button as pending.
    pub fn handle_submit<P: Dom + Viewport + ?Sized>(
        &self,
        page: &P,
        config: &PageConfig,
        event: &PageEvent,
    ) -> FormState {
        self.state.set(FormState::Validating);
        match validate(|f| page.form_field(self.form, f.name())) {
            Err(err) => {
                self.state.set(FormState::Rejected);
                self.last_error.set(Some(err));
                event.prevent_default();
                tracing::debug!(%err, "contact form rejected");
                page.alert(config.alert_message(err));
                self.state.set(FormState::Idle);
                FormState::Rejected
            }
            Ok(_) => {
                self.last_error.set(None);
                match page.query_within(self.form, &config.selectors.submit_button) {
                    Some(button) => {
                        page.set_inner_html(button, &config.submit_pending_html);
                        page.set_disabled(button, true);
                    }
                    None => tracing::debug!("contact form has no submit button"),
                }
                self.state.set(FormState::Submitting);
                tracing::info!("contact form submitting");
                FormState::Submitting
            }
        }
    }
}

/// Wires the first contact form on the page, if there is one.
pub fn install<P: Page + 'static>(
    page: &Rc<P>,
    config: &Rc<PageConfig>,
) -> Option<Rc<ContactForm>> {
    let Some(node) = page.query(&config.selectors.contact_form) else {
        tracing::debug!(selector = %config.selectors.contact_form, "no contact form on page");
        return None;
    };
    let form = Rc::new(ContactForm::new(node));

    let p = page.clone();
    let cfg = config.clone();
    let f = form.clone();
    page.listen(
        EventTarget::Node(node),
        EventKind::Submit,
        Rc::new(move |e: &PageEvent| {
            f.handle_submit(&*p, &cfg, e);
        }),
    );
    Some(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Element, MemoryPage};
    use pretty_assertions::assert_eq;

    const PENDING: &str = r#"<i class="fas fa-spinner fa-spin me-2"></i>Sending..."#;

    struct Fixture {
        page: Rc<MemoryPage>,
        form: Rc<ContactForm>,
        inputs: Vec<NodeId>,
        button: NodeId,
    }

    fn fixture(values: [&str; 4]) -> Fixture {
        let page = Rc::new(MemoryPage::new());
        let node = page.append(None, Element::new("form").class("contact-form"));
        let inputs = Field::ALL
            .iter()
            .zip(values)
            .map(|(f, v)| {
                page.append(
                    Some(node),
                    Element::new("input").attr("name", f.name()).value(v),
                )
            })
            .collect();
        let button = page.append(Some(node), Element::new("button").attr("type", "submit"));
        page.set_inner_html(button, "Send Message");
        let form = install(&page, &Rc::new(PageConfig::default())).unwrap();
        Fixture {
            page,
            form,
            inputs,
            button,
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(is_valid_email("a@b..c"));
        assert!(!is_valid_email("bad@bad"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@b.co "));
    }

    fn values(
        name: Option<&'static str>,
        subject: Option<&'static str>,
    ) -> impl FnMut(Field) -> Option<String> {
        move |f| match f {
            Field::Name => name.map(str::to_string),
            Field::Email => Some("a@b.co".to_string()),
            Field::Subject => subject.map(str::to_string),
            Field::Message => Some("hi".to_string()),
        }
    }

    #[test]
    fn validate_reports_first_missing_field() {
        assert_eq!(
            validate(values(None, None)),
            Err(ValidationError::MissingField(Field::Name))
        );
        assert_eq!(
            validate(values(Some("Ada"), Some(""))),
            Err(ValidationError::MissingField(Field::Subject))
        );
        assert!(validate(values(Some(" "), Some("x"))).is_ok());
    }

    #[test]
    fn missing_fields_win_over_bad_email() {
        let result = validate(|f| match f {
            Field::Email => Some("bad@bad".to_string()),
            Field::Message => None,
            _ => Some("x".to_string()),
        });
        assert_eq!(result, Err(ValidationError::MissingField(Field::Message)));
    }

    #[test]
    fn each_empty_field_rejects_with_one_alert() {
        for i in 0..4 {
            let mut values = ["Ada", "ada@example.com", "Hello", "Hi there"];
            values[i] = "";
            let f = fixture(values);

            let event = f.page.submit(f.form.node());
            assert!(event.default_prevented());
            assert_eq!(f.page.alerts(), vec!["Please fill in all fields.".to_string()]);
            assert_eq!(f.form.state(), FormState::Idle);
            assert_eq!(f.form.last_error(), Some(ValidationError::MissingField(Field::ALL[i])));
            assert!(!f.page.is_disabled(f.button));
            assert_eq!(f.page.inner_html(f.button), "Send Message");
        }
    }

    #[test]
    fn malformed_email_rejects_with_distinct_alert() {
        let f = fixture(["Ada", "bad@bad", "Hello", "Hi"]);
        assert!(f.page.submit(f.form.node()).default_prevented());
        assert_eq!(
            f.page.alerts(),
            vec!["Please enter a valid email address.".to_string()]
        );
    }

    #[test]
    fn rejected_form_can_be_retried() {
        let f = fixture(["Ada", "bad@bad", "Hello", "Hi"]);
        f.page.submit(f.form.node());
        f.page.set_value(f.inputs[1], "ada@b.co");

        let event = f.page.submit(f.form.node());
        assert!(!event.default_prevented());
        assert_eq!(f.page.alerts().len(), 1);
        assert_eq!(f.form.state(), FormState::Submitting);
        assert_eq!(f.form.last_error(), None);
    }

    #[test]
    fn valid_submit_marks_button_pending_and_proceeds() {
        let f = fixture(["Ada", "a@b.co", "Hello", "Hi"]);
        let event = f.page.submit(f.form.node());
        assert!(!event.default_prevented());
        assert!(f.page.alerts().is_empty());
        assert!(f.page.is_disabled(f.button));
        assert_eq!(f.page.inner_html(f.button), PENDING);
        assert_eq!(f.form.state(), FormState::Submitting);
    }

    #[test]
    fn form_without_button_still_submits() {
        let page = Rc::new(MemoryPage::new());
        let node = page.append(None, Element::new("form").class("contact-form"));
        for (f, v) in Field::ALL.iter().zip(["Ada", "a@b.co", "Hello", "Hi"]) {
            page.append(Some(node), Element::new("textarea").attr("name", f.name()).value(v));
        }
        let form = install(&page, &Rc::new(PageConfig::default())).unwrap();
        assert!(!page.submit(node).default_prevented());
        assert_eq!(form.state(), FormState::Submitting);
    }

    #[test]
    fn page_without_form_is_not_wired() {
        let page = Rc::new(MemoryPage::new());
        assert!(install(&page, &Rc::new(PageConfig::default())).is_none());
    }
}
