//! DOM presentation
//!
//! Actors, weapons and bars are absolutely positioned elements inside
//! `#game-box`. Tracers and damage popups are created on demand and removed
//! with a timeout.

use glam::Vec2;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::render::{
    ActorId, BULLET_TRACE_MS, ColorToken, DAMAGE_POPUP_MS, FLASH_MS, RenderSink,
};
use crate::{aim_angle, distance};

/// Page setup failures
#[derive(Debug, Error)]
pub enum DomError {
    #[error("no global window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(&'static str),
    #[error("missing element matching '{0}'")]
    MissingSelector(&'static str),
}

fn by_id(document: &Document, id: &'static str) -> Result<HtmlElement, DomError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(DomError::MissingElement(id))
}

fn set_style(el: &HtmlElement, prop: &str, value: &str) {
    let _ = el.style().set_property(prop, value);
}

fn set_shown(el: &HtmlElement, shown: bool, display: &str) {
    set_style(el, "display", if shown { display } else { "none" });
}

/// Remove `el` after `ms` milliseconds
fn remove_later(window: &Window, el: Element, ms: i32) {
    let cb = Closure::once_into_js(move || el.remove());
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms);
}

/// `RenderSink` backed by the page's elements
pub struct DomRenderer {
    window: Window,
    document: Document,
    game_box: HtmlElement,
    player: HtmlElement,
    opponent: HtmlElement,
    player_gun: HtmlElement,
    opponent_gun: HtmlElement,
    player_bar: HtmlElement,
    opponent_bar: HtmlElement,
    overlay: HtmlElement,
    headline: HtmlElement,
    start_btn: HtmlElement,
    flash: HtmlElement,
}

impl DomRenderer {
    pub fn new(window: Window) -> Result<Self, DomError> {
        let document = window.document().ok_or(DomError::NoDocument)?;
        let headline = document
            .query_selector("#overlay h1")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(DomError::MissingSelector("#overlay h1"))?;

        Ok(Self {
            game_box: by_id(&document, "game-box")?,
            player: by_id(&document, "player")?,
            opponent: by_id(&document, "ai")?,
            player_gun: by_id(&document, "player-gun")?,
            opponent_gun: by_id(&document, "ai-gun")?,
            player_bar: by_id(&document, "p-bar")?,
            opponent_bar: by_id(&document, "a-bar")?,
            overlay: by_id(&document, "overlay")?,
            start_btn: by_id(&document, "s-btn")?,
            flash: by_id(&document, "flash")?,
            headline,
            document,
            window,
        })
    }

    pub fn game_box(&self) -> &HtmlElement {
        &self.game_box
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current layout size of the game box, zero before it is laid out
    pub fn measured_size(&self) -> (f32, f32) {
        (
            self.game_box.client_width() as f32,
            self.game_box.client_height() as f32,
        )
    }

    /// Convert client coordinates to game-box coordinates
    pub fn to_local(&self, client_x: i32, client_y: i32) -> Vec2 {
        let rect = self.game_box.get_bounding_client_rect();
        Vec2::new(
            client_x as f32 - rect.left() as f32,
            client_y as f32 - rect.top() as f32,
        )
    }

    fn body(&self, actor: ActorId) -> &HtmlElement {
        match actor {
            ActorId::Player => &self.player,
            ActorId::Opponent => &self.opponent,
        }
    }

    fn gun(&self, actor: ActorId) -> &HtmlElement {
        match actor {
            ActorId::Player => &self.player_gun,
            ActorId::Opponent => &self.opponent_gun,
        }
    }

    fn bar(&self, actor: ActorId) -> &HtmlElement {
        match actor {
            ActorId::Player => &self.player_bar,
            ActorId::Opponent => &self.opponent_bar,
        }
    }

    fn spawn(&self, class: &str) -> Option<HtmlElement> {
        let el = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        el.set_class_name(class);
        Some(el)
    }
}

impl RenderSink for DomRenderer {
    fn set_actor_transform(
        &mut self,
        actor: ActorId,
        pos: Vec2,
        rotation: f32,
        tilt_deg: Option<f32>,
    ) {
        let body = self.body(actor);
        set_style(body, "left", &format!("{}px", pos.x));
        set_style(body, "top", &format!("{}px", pos.y));
        if let Some(tilt) = tilt_deg {
            set_style(body, "transform", &format!("rotate({}deg)", tilt));
        }
        set_style(self.gun(actor), "transform", &format!("rotate({}rad)", rotation));
    }

    fn set_actor_visible(&mut self, actor: ActorId, visible: bool) {
        set_shown(self.body(actor), visible, "block");
    }

    fn set_weapon_visible(&mut self, actor: ActorId, visible: bool) {
        set_shown(self.gun(actor), visible, "block");
    }

    fn set_health_bar(&mut self, actor: ActorId, percent: f32) {
        set_style(self.bar(actor), "width", &format!("{}%", percent.max(0.0)));
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        set_shown(&self.overlay, visible, "flex");
    }

    fn set_overlay_text(&mut self, text: &str, color: ColorToken) {
        self.headline.set_inner_text(text);
        set_style(&self.headline, "color", color.css());
    }

    fn set_start_control_visible(&mut self, visible: bool) {
        set_shown(&self.start_btn, visible, "block");
    }

    fn set_active_mode(&mut self, label: &str) {
        let Ok(buttons) = self.document.query_selector_all(".mode-btn") else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(btn) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let classes = btn.class_list();
            if btn.get_attribute("data-mode").as_deref() == Some(label) {
                let _ = classes.add_1("active");
            } else {
                let _ = classes.remove_1("active");
            }
        }
    }

    fn spawn_bullet_trace(&mut self, from: Vec2, to: Vec2, color: ColorToken) {
        let Some(trace) = self.spawn("bullet") else { return };
        set_style(&trace, "width", &format!("{}px", distance(from, to)));
        set_style(&trace, "left", &format!("{}px", from.x));
        set_style(&trace, "top", &format!("{}px", from.y));
        set_style(&trace, "transform", &format!("rotate({}rad)", aim_angle(from, to)));
        set_style(&trace, "background", color.css());
        if self.game_box.append_child(&trace).is_ok() {
            remove_later(&self.window, trace.into(), BULLET_TRACE_MS);
        }
    }

    fn spawn_damage_popup(&mut self, at: Vec2, amount: i32) {
        let Some(popup) = self.spawn("dmg-popup") else { return };
        popup.set_inner_text(&amount.to_string());
        set_style(&popup, "left", &format!("{}px", at.x));
        set_style(&popup, "top", &format!("{}px", at.y));
        if self.game_box.append_child(&popup).is_ok() {
            remove_later(&self.window, popup.into(), DAMAGE_POPUP_MS);
        }
    }

    fn flash_screen(&mut self, color: ColorToken) {
        set_style(&self.flash, "background", color.css_overlay());
        set_style(&self.flash, "opacity", "1");
        let flash = self.flash.clone();
        let cb = Closure::once_into_js(move || set_style(&flash, "opacity", "0"));
        let _ = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), FLASH_MS);
    }
}
