use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Rect, Target};
use serde_json::json;
use std::cell::Cell;
use std::rc::{Rc, Weak};

const CARD_SELECTOR: &str = ".card";
const INNER_SELECTOR: &str = ".card-inner";
const BACK_SELECTOR: &str = ".card-back";
const FLIP_BACK_CLASS: &str = "flip-back-btn";
const FLIP_BACK_SELECTOR: &str = ".flip-back-btn";
const FLIPPED_CLASS: &str = "flipped";

const FRONT_TRANSFORM: &str = "rotateY(0deg) rotateX(0deg) translateZ(0px)";
const RESTING_TRANSFORM: &str = "rotateY(0deg) rotateX(0deg) translateZ(0px) scale(1)";
const FLIPPED_TRANSFORM: &str = "rotateY(180deg) translateZ(20px)";
const FRONT_LABEL: &str = "Project card - front view";
const FLIPPED_LABEL: &str = "Project card - flipped to show details";

const SHADOW_VAR: &str = "--shadow-intensity";
const GLOW_VAR: &str = "--glow-opacity";

/// `(rotate_x, rotate_y)` in degrees for a pointer at `(client_x, client_y)`,
/// proportional to the offset from the card centre and capped at `max_degrees`.
pub fn tilt_angles(rect: Rect, client_x: f64, client_y: f64, max_degrees: f64) -> (f64, f64) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return (0.0, 0.0);
    }

    let x = client_x - rect.left - rect.width / 2.0;
    let y = client_y - rect.top - rect.height / 2.0;
    let rotate_x = (-y / (rect.height / 2.0)) * max_degrees;
    let rotate_y = (x / (rect.width / 2.0)) * max_degrees;

    // `+ 0.0` turns -0.0 into 0.0 so the transform never reads "-0.00deg".
    (
        rotate_x.clamp(-max_degrees, max_degrees) + 0.0,
        rotate_y.clamp(-max_degrees, max_degrees) + 0.0,
    )
}

struct Card<E> {
    root: E,
    inner: E,
    flipped: Cell<bool>,
}

pub struct CardInteraction<P: Page> {
    page: Rc<P>,
    logger: Logger,
    tilt_max_degrees: f64,
    cards: Vec<Card<P::Element>>,
}

impl<P: Page> CardInteraction<P> {
    pub fn new(page: Rc<P>, config: &RuntimeConfig, logger: Logger) -> Rc<Self> {
        let cards = page
            .query_all(CARD_SELECTOR)
            .into_iter()
            .filter_map(|root| {
                let Some(inner) = page.query_within(&root, INNER_SELECTOR) else {
                    logger.debug("component_skipped", json!({ "component": "card", "missing": INNER_SELECTOR }));
                    return None;
                };
                Some(Card {
                    root,
                    inner,
                    flipped: Cell::new(false),
                })
            })
            .collect();

        Rc::new(Self {
            page,
            logger,
            tilt_max_degrees: config.tilt_max_degrees,
            cards,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_flipped(&self, index: usize) -> Option<bool> {
        self.cards.get(index).map(|card| card.flipped.get())
    }

    pub fn install(self: &Rc<Self>) {
        for (index, card) in self.cards.iter().enumerate() {
            self.page.set_style(&card.root, SHADOW_VAR, "0.2");
            self.page.set_style(&card.root, GLOW_VAR, "0");

            self.install_flip_back_button(index, card);
            self.listen_card(index, card, EventKind::MouseMove, |cards, index, event| {
                cards.tilt(index, event.client_x(), event.client_y());
            });
            self.listen_card(index, card, EventKind::MouseEnter, |cards, index, _| {
                cards.hover(index, true);
            });
            self.listen_card(index, card, EventKind::MouseLeave, |cards, index, _| {
                cards.hover(index, false);
            });
            self.listen_card(index, card, EventKind::Click, |cards, index, event| {
                let on_flip_back = event
                    .target()
                    .and_then(|target| cards.page.closest(target, FLIP_BACK_SELECTOR))
                    .is_some();
                if !on_flip_back {
                    cards.toggle(index);
                }
            });
            self.listen_card(index, card, EventKind::KeyDown, |cards, index, event| {
                match event.key() {
                    Some("Enter") | Some(" ") => {
                        event.prevent_default();
                        cards.toggle(index);
                    }
                    Some("Escape") if cards.is_flipped(index) == Some(true) => {
                        cards.set_flipped(index, false);
                    }
                    _ => {}
                }
            });
        }

        let cards: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Document,
            EventKind::Click,
            Rc::new(move |event: &PageEvent<P::Element>| {
                let Some(cards) = cards.upgrade() else {
                    return;
                };
                let inside_card = event
                    .target()
                    .and_then(|target| cards.page.closest(target, CARD_SELECTOR))
                    .is_some();
                if !inside_card {
                    cards.reset_all();
                }
            }),
        );
    }

    pub fn toggle(&self, index: usize) {
        if let Some(flipped) = self.is_flipped(index) {
            self.set_flipped(index, !flipped);
        }
    }

    pub fn reset_all(&self) {
        for index in 0..self.cards.len() {
            self.set_flipped(index, false);
        }
    }

    fn set_flipped(&self, index: usize, flipped: bool) {
        let Some(card) = self.cards.get(index) else {
            return;
        };

        let changed = card.flipped.replace(flipped) != flipped;
        self.page.toggle_class(&card.root, FLIPPED_CLASS, flipped);
        if flipped {
            self.page.set_style(&card.inner, "transform", FLIPPED_TRANSFORM);
            self.page.set_attribute(&card.root, "aria-label", FLIPPED_LABEL);
        } else {
            self.page.set_style(&card.inner, "transform", FRONT_TRANSFORM);
            self.page.set_attribute(&card.root, "aria-label", FRONT_LABEL);
        }

        if changed {
            self.logger
                .debug("card_flipped", json!({ "card": index, "flipped": flipped }));
        }
    }

    fn tilt(&self, index: usize, client_x: f64, client_y: f64) {
        let Some(card) = self.cards.get(index) else {
            return;
        };
        if card.flipped.get() {
            return;
        }

        let rect = self.page.bounding_rect(&card.root);
        let (rotate_x, rotate_y) = tilt_angles(rect, client_x, client_y, self.tilt_max_degrees);
        self.page.set_style(
            &card.inner,
            "transform",
            &format!(
                "rotateY({rotate_y:.2}deg) rotateX({rotate_x:.2}deg) translateZ(20px) scale(1.02)"
            ),
        );
        self.page.set_style(&card.root, SHADOW_VAR, "0.4");
    }

    fn hover(&self, index: usize, entering: bool) {
        let Some(card) = self.cards.get(index) else {
            return;
        };
        if card.flipped.get() {
            return;
        }

        if entering {
            self.page.set_style(&card.root, GLOW_VAR, "0.6");
        } else {
            self.page.set_style(&card.inner, "transform", RESTING_TRANSFORM);
            self.page.set_style(&card.root, SHADOW_VAR, "0.2");
            self.page.set_style(&card.root, GLOW_VAR, "0");
        }
    }

    fn install_flip_back_button(self: &Rc<Self>, index: usize, card: &Card<P::Element>) {
        let Some(back) = self.page.query_within(&card.root, BACK_SELECTOR) else {
            return;
        };
        let Some(button) = self.page.create_element("button") else {
            return;
        };

        self.page.set_class_name(&button, FLIP_BACK_CLASS);
        self.page
            .set_attribute(&button, "aria-label", "Flip card back to front");
        if let Some(icon) = self.page.create_element("i") {
            self.page.set_class_name(&icon, "fas fa-undo");
            self.page.append_child(&button, &icon);
        }
        self.page.append_child(&back, &button);

        let cards: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Element(button),
            EventKind::Click,
            Rc::new(move |event: &PageEvent<P::Element>| {
                event.stop_propagation();
                if let Some(cards) = cards.upgrade() {
                    cards.set_flipped(index, false);
                }
            }),
        );
    }

    fn listen_card(
        self: &Rc<Self>,
        index: usize,
        card: &Card<P::Element>,
        kind: EventKind,
        handler: fn(&Self, usize, &PageEvent<P::Element>),
    ) {
        let cards: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Element(card.root.clone()),
            kind,
            Rc::new(move |event: &PageEvent<P::Element>| {
                if let Some(cards) = cards.upgrade() {
                    handler(&cards, index, event);
                }
            }),
        );
    }
}
