use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Target};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

const TRIGGER_SELECTOR: &str = ".view-certificate";
const MODAL_SELECTOR: &str = ".modal";
const CLOSE_SELECTOR: &str = ".close-modal";
const CERTIFICATE_ATTRIBUTE: &str = "data-certificate";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open,
}

struct Modal<E> {
    element: E,
    state: Cell<ModalState>,
}

/// Certificate dialogs. There is no stack: every open modal is tracked
/// independently and page scroll comes back once none is open.
pub struct ModalController<P: Page> {
    page: Rc<P>,
    logger: Logger,
    modals: RefCell<Vec<Modal<P::Element>>>,
}

impl<P: Page> ModalController<P> {
    pub fn new(page: Rc<P>, logger: Logger) -> Rc<Self> {
        let modals = page
            .query_all(MODAL_SELECTOR)
            .into_iter()
            .map(|element| {
                let state = if page.style(&element, "display") == "flex" {
                    ModalState::Open
                } else {
                    ModalState::Closed
                };
                Modal {
                    element,
                    state: Cell::new(state),
                }
            })
            .collect();

        Rc::new(Self {
            page,
            logger,
            modals: RefCell::new(modals),
        })
    }

    pub fn install(self: &Rc<Self>) {
        for trigger in self.page.query_all(TRIGGER_SELECTOR) {
            let modals = Rc::downgrade(self);
            let button = trigger.clone();
            self.page.listen(
                Target::Element(trigger),
                EventKind::Click,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    let Some(modals) = modals.upgrade() else {
                        return;
                    };
                    if let Some(certificate) = modals.page.attribute(&button, CERTIFICATE_ATTRIBUTE) {
                        modals.open_certificate(&certificate);
                    }
                }),
            );
        }

        for close_button in self.page.query_all(CLOSE_SELECTOR) {
            let modals = Rc::downgrade(self);
            let button = close_button.clone();
            self.page.listen(
                Target::Element(close_button),
                EventKind::Click,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    let Some(modals) = modals.upgrade() else {
                        return;
                    };
                    if let Some(modal) = modals.page.closest(&button, MODAL_SELECTOR) {
                        modals.close(&modal);
                    }
                }),
            );
        }

        let modals: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Window,
            EventKind::Click,
            Rc::new(move |event: &PageEvent<P::Element>| {
                let Some(modals) = modals.upgrade() else {
                    return;
                };
                let Some(target) = event.target() else {
                    return;
                };
                if modals.state_of(target).is_some() {
                    modals.close(target);
                }
            }),
        );

        let modals: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Document,
            EventKind::KeyDown,
            Rc::new(move |event: &PageEvent<P::Element>| {
                if event.key() != Some("Escape") {
                    return;
                }
                if let Some(modals) = modals.upgrade() {
                    modals.close_all();
                }
            }),
        );
    }

    pub fn state_of(&self, element: &P::Element) -> Option<ModalState> {
        self.modals
            .borrow()
            .iter()
            .find(|modal| modal.element == *element)
            .map(|modal| modal.state.get())
    }

    pub fn any_open(&self) -> bool {
        self.modals
            .borrow()
            .iter()
            .any(|modal| modal.state.get() == ModalState::Open)
    }

    /// Opens `{certificate}-modal`. Unknown certificates are ignored.
    pub fn open_certificate(&self, certificate: &str) -> bool {
        let modal_id = format!("{certificate}-modal");
        let Some(element) = self.page.element_by_id(&modal_id) else {
            self.logger
                .debug("modal_missing", json!({ "modal": modal_id }));
            return false;
        };

        self.open(&element);
        true
    }

    pub fn open(&self, element: &P::Element) {
        {
            let mut modals = self.modals.borrow_mut();
            match modals.iter().position(|modal| modal.element == *element) {
                Some(index) => modals[index].state.set(ModalState::Open),
                None => modals.push(Modal {
                    element: element.clone(),
                    state: Cell::new(ModalState::Open),
                }),
            }
        }

        self.page.set_style(element, "display", "flex");
        if let Some(body) = self.page.body() {
            self.page.set_style(&body, "overflow", "hidden");
        }
        self.logger.info(
            "modal_opened",
            json!({ "modal": self.page.attribute(element, "id") }),
        );
    }

    pub fn close(&self, element: &P::Element) {
        let was_open = self
            .modals
            .borrow()
            .iter()
            .find(|modal| modal.element == *element)
            .map(|modal| modal.state.replace(ModalState::Closed) == ModalState::Open)
            .unwrap_or(false);

        self.page.set_style(element, "display", "none");
        self.restore_scroll_if_idle();

        if was_open {
            self.logger.info(
                "modal_closed",
                json!({ "modal": self.page.attribute(element, "id") }),
            );
        }
    }

    pub fn close_all(&self) {
        let open: Vec<P::Element> = self
            .modals
            .borrow()
            .iter()
            .filter(|modal| modal.state.get() == ModalState::Open)
            .map(|modal| modal.element.clone())
            .collect();

        for element in open {
            self.close(&element);
        }
    }

    fn restore_scroll_if_idle(&self) {
        if self.any_open() {
            return;
        }
        if let Some(body) = self.page.body() {
            self.page.set_style(&body, "overflow", "");
        }
    }
}
