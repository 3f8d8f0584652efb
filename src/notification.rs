use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Target};
use serde::Serialize;
use serde_json::json;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const TOAST_STYLE: &str = "position: fixed; top: 100px; right: 20px; padding: 15px 20px; \
     border-radius: 8px; color: white; font-weight: 500; z-index: 10000; max-width: 300px; \
     box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3); transform: translateX(400px); \
     transition: transform 0.3s ease;";
const OFFSCREEN_TRANSFORM: &str = "translateX(400px)";
const ONSCREEN_TRANSFORM: &str = "translateX(0)";
const TOAST_SELECTOR: &str = ".notification";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    /// Unknown names render as `Info`.
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Info => "#6fb3a8",
            Self::Success => "#4CAF50",
            Self::Error => "#f44336",
            Self::Warning => "#ff9800",
        }
    }
}

/// Owns the single toast slot. A new toast evicts the old one outright.
///
/// The auto-dismiss timer of a toast is never cancelled. It only ever acts on
/// the node it was scheduled for, and detaching is guarded by `is_attached`,
/// so a stale timer cannot touch a newer toast.
pub struct NotificationCenter<P: Page> {
    page: Rc<P>,
    logger: Logger,
    show_delay_ms: u32,
    lifetime_ms: u32,
    exit_ms: u32,
    current: RefCell<Option<P::Element>>,
}

impl<P: Page> NotificationCenter<P> {
    pub fn new(page: Rc<P>, config: &RuntimeConfig, logger: Logger) -> Rc<Self> {
        Rc::new(Self {
            page,
            logger,
            show_delay_ms: config.notification_show_delay_ms,
            lifetime_ms: config.notification_lifetime_ms,
            exit_ms: config.notification_exit_ms,
            current: RefCell::new(None),
        })
    }

    pub fn current(&self) -> Option<P::Element> {
        self.current.borrow().clone()
    }

    pub fn notify(self: &Rc<Self>, message: &str, kind: NotificationKind) -> Option<P::Element> {
        self.evict();

        let Some(body) = self.page.body() else {
            self.logger
                .debug("component_skipped", json!({ "component": "notification", "missing": "body" }));
            return None;
        };
        let toast = self.page.create_element("div")?;

        self.page
            .set_class_name(&toast, &format!("notification notification-{}", kind.as_str()));
        self.page.set_text(&toast, message);
        self.page.set_css_text(&toast, TOAST_STYLE);
        self.page.set_style(&toast, "background-color", kind.color());
        self.page.append_child(&body, &toast);
        *self.current.borrow_mut() = Some(toast.clone());

        {
            let page = Rc::clone(&self.page);
            let toast = toast.clone();
            self.page.set_timeout(
                self.show_delay_ms,
                Box::new(move || page.set_style(&toast, "transform", ONSCREEN_TRANSFORM)),
            );
        }

        {
            let center = Rc::clone(self);
            let toast = toast.clone();
            self.page
                .set_timeout(self.lifetime_ms, Box::new(move || center.dismiss(&toast)));
        }

        {
            let center: Weak<Self> = Rc::downgrade(self);
            let target = toast.clone();
            self.page.listen(
                Target::Element(toast.clone()),
                EventKind::Click,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    if let Some(center) = center.upgrade() {
                        center.dismiss(&target);
                    }
                }),
            );
        }

        self.logger.info(
            "notification_shown",
            json!({ "kind": kind, "message_len": message.chars().count() }),
        );

        Some(toast)
    }

    /// Slides `toast` out and detaches it once the transition has run.
    pub fn dismiss(self: &Rc<Self>, toast: &P::Element) {
        self.page.set_style(toast, "transform", OFFSCREEN_TRANSFORM);

        let center = Rc::clone(self);
        let toast = toast.clone();
        self.page
            .set_timeout(self.exit_ms, Box::new(move || center.detach(&toast)));
    }

    fn detach(&self, toast: &P::Element) {
        let mut current = self.current.borrow_mut();
        if current.as_ref() == Some(toast) {
            *current = None;
        }
        drop(current);

        if self.page.is_attached(toast) {
            self.page.remove(toast);
            self.logger.debug("notification_dismissed", json!({}));
        }
    }

    fn evict(&self) {
        if let Some(previous) = self.current.borrow_mut().take() {
            if self.page.is_attached(&previous) {
                self.page.remove(&previous);
            }
        }

        for stray in self.page.query_all(TOAST_SELECTOR) {
            self.page.remove(&stray);
        }
    }
}
