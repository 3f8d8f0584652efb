use crate::cards::CardInteraction;
use crate::config::RuntimeConfig;
use crate::contact::ContactFormHandler;
use crate::decorations::DecorationInit;
use crate::logging::Logger;
use crate::modal::ModalController;
use crate::nav::NavController;
use crate::notification::NotificationCenter;
use crate::page::Page;
use crate::scroll_effects::ScrollEffects;
use crate::smooth_scroll::SmoothScroller;
use serde_json::json;
use std::rc::Rc;

/// Every controller for one page session. Handlers only hold weak
/// references, so this value has to outlive the page.
pub struct Portfolio<P: Page> {
    pub notifications: Rc<NotificationCenter<P>>,
    pub scroller: Rc<SmoothScroller<P>>,
    pub nav: Rc<NavController<P>>,
    pub cards: Rc<CardInteraction<P>>,
    pub contact: Option<Rc<ContactFormHandler<P>>>,
    pub modals: Rc<ModalController<P>>,
    pub effects: Rc<ScrollEffects<P>>,
}

impl<P: Page> Portfolio<P> {
    /// Reads overrides from `data-*` attributes on `<body>`.
    pub fn config_from_page(page: &P) -> RuntimeConfig {
        match page.body() {
            Some(body) => RuntimeConfig::from_source(|name| page.attribute(&body, name)),
            None => RuntimeConfig::default(),
        }
    }

    pub fn start(page: Rc<P>, config: &RuntimeConfig) -> Self {
        let logger = Logger::new(config.log_level);

        let notifications = NotificationCenter::new(Rc::clone(&page), config, logger);
        let scroller = SmoothScroller::new(Rc::clone(&page), config, logger);

        let nav = NavController::new(Rc::clone(&page), Rc::clone(&scroller), config, logger);
        nav.install();

        let cards = CardInteraction::new(Rc::clone(&page), config, logger);
        cards.install();

        let contact =
            ContactFormHandler::new(Rc::clone(&page), Rc::clone(&notifications), config, logger);
        if let Some(contact) = contact.as_ref() {
            contact.install();
        }

        let modals = ModalController::new(Rc::clone(&page), logger);
        modals.install();

        let effects = ScrollEffects::new(Rc::clone(&page), Rc::clone(&scroller), config, logger);
        effects.install();

        DecorationInit::install(&page, config, logger);

        logger.info(
            "portfolio_initialized",
            json!({ "cards": cards.len(), "contact_form": contact.is_some(), "config": config }),
        );

        Self {
            notifications,
            scroller,
            nav,
            cards,
            contact,
            modals,
            effects,
        }
    }
}
