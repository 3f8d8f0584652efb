use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::notification::{NotificationCenter, NotificationKind};
use crate::page::{EventKind, Page, PageEvent, Target};
use regex::Regex;
use serde_json::json;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

const FORM_ID: &str = "contact-form";
const SENDING_MESSAGE: &str = "Sending your message...";
const SUCCESS_MESSAGE: &str = "Thank you for your message! I will get back to you soon.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields,
    InvalidEmail,
}

impl ValidationError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidEmail => "invalid_email",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MissingFields => "Please fill in all fields",
            Self::InvalidEmail => "Please enter a valid email address",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub fn validate(
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
) -> Result<ContactSubmission, ValidationError> {
    let (Some(name), Some(email), Some(message)) = (
        name.filter(|value| !value.is_empty()),
        email.filter(|value| !value.is_empty()),
        message.filter(|value| !value.is_empty()),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ContactSubmission {
        name,
        email,
        message,
    })
}

/// Client-side only: a valid submission is acknowledged after a fixed delay
/// and nothing leaves the page.
pub struct ContactFormHandler<P: Page> {
    page: Rc<P>,
    notifications: Rc<NotificationCenter<P>>,
    logger: Logger,
    submit_delay_ms: u32,
    form: P::Element,
}

impl<P: Page> ContactFormHandler<P> {
    pub fn new(
        page: Rc<P>,
        notifications: Rc<NotificationCenter<P>>,
        config: &RuntimeConfig,
        logger: Logger,
    ) -> Option<Rc<Self>> {
        let Some(form) = page.element_by_id(FORM_ID) else {
            logger.debug("component_skipped", json!({ "component": "contact_form" }));
            return None;
        };

        Some(Rc::new(Self {
            page,
            notifications,
            logger,
            submit_delay_ms: config.submit_delay_ms,
            form,
        }))
    }

    pub fn install(self: &Rc<Self>) {
        let handler: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Element(self.form.clone()),
            EventKind::Submit,
            Rc::new(move |event: &PageEvent<P::Element>| {
                event.prevent_default();
                if let Some(handler) = handler.upgrade() {
                    handler.submit();
                }
            }),
        );
    }

    pub fn submit(self: &Rc<Self>) {
        let field = |name: &str| self.page.form_value(&self.form, name);

        match validate(field("name"), field("email"), field("message")) {
            Err(error) => {
                self.logger
                    .info("contact_rejected", json!({ "reason": error.as_str() }));
                self.notifications
                    .notify(error.message(), NotificationKind::Error);
            }
            Ok(submission) => {
                self.notifications
                    .notify(SENDING_MESSAGE, NotificationKind::Info);

                let handler = Rc::clone(self);
                self.page.set_timeout(
                    self.submit_delay_ms,
                    Box::new(move || {
                        handler
                            .notifications
                            .notify(SUCCESS_MESSAGE, NotificationKind::Success);
                        handler.page.reset_form(&handler.form);
                        handler.logger.info(
                            "contact_submitted",
                            json!({ "message_len": submission.message.chars().count() }),
                        );
                    }),
                );
            }
        }
    }
}
