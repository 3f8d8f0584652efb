use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Target, VisibilityOptions};
use serde_json::json;
use std::rc::Rc;

const SOCIAL_ICON_SELECTOR: &str = ".social-icons a";
const SKILL_SELECTOR: &str = ".skill-item";
const LOADING_BUTTON_SELECTOR: &str = ".submit-btn, .view-certificate";

const SKILL_OPTIONS: VisibilityOptions = VisibilityOptions {
    threshold: 0.5,
    root_margin: "0px",
};
const SKILL_ANIMATION: &str = "skillPulse 0.5s ease";
const SKILL_KEYFRAMES: &str = "
    @keyframes skillPulse {
        0% { transform: scale(1); }
        50% { transform: scale(1.1); }
        100% { transform: scale(1); }
    }
";
const LOADING_HTML: &str = "<i class=\"fas fa-spinner fa-spin\"></i> Loading...";
const DEFAULT_PLATFORM: &str = "Social Media";

const TOOLTIP_STYLE: &str = "position: absolute; bottom: -30px; left: 50%; \
     transform: translateX(-50%); background: rgba(0,0,0,0.8); color: white; padding: 5px 10px; \
     border-radius: 4px; font-size: 0.8rem; white-space: nowrap; opacity: 0; \
     transition: opacity 0.3s; pointer-events: none;";

/// Tooltip text for a social icon: its second class name, capitalised.
pub fn tooltip_label(classes: &[String]) -> String {
    let Some(platform) = classes.get(1).filter(|value| !value.is_empty()) else {
        return DEFAULT_PLATFORM.to_string();
    };

    let mut chars = platform.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => DEFAULT_PLATFORM.to_string(),
    }
}

/// One-shot decorations that need no state after installation.
pub struct DecorationInit;

impl DecorationInit {
    pub fn install<P: Page>(page: &Rc<P>, config: &RuntimeConfig, logger: Logger) {
        let tooltips = install_tooltips(page);
        let skills = install_skill_pulse(page, config.skill_pulse_ms);
        inject_keyframes(page);
        let buttons = install_loading_buttons(page, config.button_loading_ms);

        logger.debug(
            "decorations_installed",
            json!({ "tooltips": tooltips, "skills": skills, "loading_buttons": buttons }),
        );
    }
}

fn install_tooltips<P: Page>(page: &Rc<P>) -> usize {
    let icons = page.query_all(SOCIAL_ICON_SELECTOR);

    for icon in &icons {
        let Some(tooltip) = page.create_element("span") else {
            continue;
        };
        page.set_class_name(&tooltip, "tooltip");
        page.set_text(&tooltip, &tooltip_label(&page.class_list(icon)));
        page.set_css_text(&tooltip, TOOLTIP_STYLE);
        page.set_style(icon, "position", "relative");
        page.append_child(icon, &tooltip);

        for (kind, opacity) in [(EventKind::MouseEnter, "1"), (EventKind::MouseLeave, "0")] {
            let weak_page = Rc::downgrade(page);
            let tooltip = tooltip.clone();
            page.listen(
                Target::Element(icon.clone()),
                kind,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    if let Some(page) = weak_page.upgrade() {
                        page.set_style(&tooltip, "opacity", opacity);
                    }
                }),
            );
        }
    }

    icons.len()
}

fn install_skill_pulse<P: Page>(page: &Rc<P>, pulse_ms: u32) -> usize {
    let skills = page.query_all(SKILL_SELECTOR);
    if skills.is_empty() {
        return 0;
    }

    let weak_page = Rc::downgrade(page);
    page.observe_visibility_once(
        &skills,
        SKILL_OPTIONS,
        Rc::new(move |skill: &P::Element| {
            let Some(page) = weak_page.upgrade() else {
                return;
            };
            page.set_style(skill, "animation", SKILL_ANIMATION);

            let timer_page = Rc::clone(&page);
            let skill = skill.clone();
            page.set_timeout(
                pulse_ms,
                Box::new(move || timer_page.set_style(&skill, "animation", "")),
            );
        }),
    );

    skills.len()
}

fn inject_keyframes<P: Page>(page: &Rc<P>) {
    let (Some(head), Some(style)) = (page.head(), page.create_element("style")) else {
        return;
    };
    page.set_text(&style, SKILL_KEYFRAMES);
    page.append_child(&head, &style);
}

fn install_loading_buttons<P: Page>(page: &Rc<P>, loading_ms: u32) -> usize {
    let buttons: Vec<P::Element> = page
        .query_all(LOADING_BUTTON_SELECTOR)
        .into_iter()
        .filter(|element| page.closest(element, "button").as_ref() == Some(element))
        .collect();

    for button in &buttons {
        let weak_page = Rc::downgrade(page);
        let target = button.clone();
        page.listen(
            Target::Element(button.clone()),
            EventKind::Click,
            Rc::new(move |_: &PageEvent<P::Element>| {
                let Some(page) = weak_page.upgrade() else {
                    return;
                };
                let original = page.inner_html(&target);
                page.set_inner_html(&target, LOADING_HTML);
                page.set_disabled(&target, true);

                let timer_page = Rc::clone(&page);
                let target = target.clone();
                page.set_timeout(
                    loading_ms,
                    Box::new(move || {
                        timer_page.set_inner_html(&target, &original);
                        timer_page.set_disabled(&target, false);
                    }),
                );
            }),
        );
    }

    buttons.len()
}
