//! Standoff entry point
//!
//! Wires browser events, the animation frame chain and the opponent's fire
//! interval to the session. The native build plays a scripted headless match.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, KeyboardEvent, MouseEvent};

    use standoff::audio::AudioManager;
    use standoff::dom::{DomError, DomRenderer};
    use standoff::sim::{MatchPhase, ModeConfig};
    use standoff::{FireStatus, FrameStatus, MatchHandle, Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session<DomRenderer, AudioManager>,
        /// Browser handle of the running fire interval
        fire_timer: Option<i32>,
        /// Callback behind `fire_timer`. Outlives its interval until the next
        /// match replaces it, since clearing can happen from inside the call.
        fire_callback: Option<Closure<dyn FnMut()>>,
    }

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    pub fn run() -> Result<(), DomError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Standoff starting...");

        let window = web_sys::window().ok_or(DomError::NoWindow)?;
        let settings = Settings::load();
        let audio = AudioManager::new(&settings);
        let renderer = DomRenderer::new(window)?;

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(settings, renderer, audio),
            fire_timer: None,
            fire_callback: None,
        }));

        setup_input_handlers(&game);
        setup_mode_buttons(&game)?;
        setup_start_button(&game)?;

        log::info!("Standoff ready");
        Ok(())
    }

    /// Parse a mode from a button's data attributes, falling back to presets
    fn mode_from_button(btn: &Element) -> Option<ModeConfig> {
        let label = btn.get_attribute("data-mode")?;
        let interval = btn
            .get_attribute("data-interval")
            .and_then(|v| v.parse::<u32>().ok());
        let damage = btn
            .get_attribute("data-damage")
            .and_then(|v| v.parse::<i32>().ok());

        match (interval, damage) {
            (Some(interval), Some(damage)) => match ModeConfig::new(label, interval, damage) {
                Ok(mode) => Some(mode),
                Err(e) => {
                    log::warn!("Ignoring mode button: {}", e);
                    None
                }
            },
            _ => ModeConfig::preset(&label),
        }
    }

    fn setup_mode_buttons(game: &Rc<RefCell<Game>>) -> Result<(), DomError> {
        let document = game.borrow().session.render().document().clone();
        let buttons = document
            .query_selector_all(".mode-btn")
            .map_err(|_| DomError::MissingSelector(".mode-btn"))?;

        for i in 0..buttons.length() {
            let Some(btn) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let game = game.clone();
            let source = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Some(mode) = mode_from_button(&source) {
                    game.borrow_mut().session.select_mode(mode);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        Ok(())
    }

    fn setup_start_button(game: &Rc<RefCell<Game>>) -> Result<(), DomError> {
        let document = game.borrow().session.render().document().clone();
        let btn = document
            .get_element_by_id("s-btn")
            .ok_or(DomError::MissingElement("s-btn"))?;

        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            start_match(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
        Ok(())
    }

    fn setup_input_handlers(game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let game_box = game.borrow().session.render().game_box().clone();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.key_down(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - aim
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let at = g.session.render().to_local(event.client_x(), event.client_y());
                g.session.pointer_move(at);
            });
            let _ = game_box
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - fire
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                {
                    let mut g = game.borrow_mut();
                    let at = g.session.render().to_local(event.client_x(), event.client_y());
                    g.session.pointer_down(at);
                }
                stop_fire_timer_if_over(&game);
            });
            let _ = game_box
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_match(game: &Rc<RefCell<Game>>) {
        let handle = game.borrow_mut().session.start_match(now_ms());
        let Some(handle) = handle else { return };

        // Drop any interval a previous match left behind
        clear_fire_timer(game);
        start_fire_timer(game, handle);
        request_animation_frame(game.clone(), handle);
    }

    fn start_fire_timer(game: &Rc<RefCell<Game>>, handle: MatchHandle) {
        let Some(window) = web_sys::window() else { return };
        let Ok(delay) = i32::try_from(handle.fire_interval_ms) else {
            log::error!("Fire interval {} ms out of range", handle.fire_interval_ms);
            return;
        };

        let timer_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let status = timer_game.borrow_mut().session.on_opponent_fire(handle);
            if status == FireStatus::Cancelled {
                clear_fire_timer(&timer_game);
            } else {
                stop_fire_timer_if_over(&timer_game);
            }
        });

        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => {
                let mut g = game.borrow_mut();
                g.fire_timer = Some(id);
                // Drops the previous match's callback; its interval is already cleared
                g.fire_callback = Some(closure);
            }
            Err(e) => log::error!("Failed to start opponent timer: {:?}", e),
        }
    }

    fn clear_fire_timer(game: &Rc<RefCell<Game>>) {
        let id = game.borrow_mut().fire_timer.take();
        if let (Some(id), Some(window)) = (id, web_sys::window()) {
            window.clear_interval_with_handle(id);
        }
    }

    fn stop_fire_timer_if_over(game: &Rc<RefCell<Game>>) {
        let over = game.borrow().session.phase() == MatchPhase::Menu;
        if over {
            clear_fire_timer(game);
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, handle: MatchHandle) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game, handle);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, handle: MatchHandle) {
        let status = {
            let mut g = game.borrow_mut();
            let (width, height) = g.session.render().measured_size();
            let viewport = g.session.settings().resolve_viewport(width, height);
            g.session.on_frame(handle, now_ms(), viewport)
        };

        if status == FrameStatus::Continue {
            request_animation_frame(game, handle);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Standoff failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Standoff (native) starting...");
    log::info!("Native mode is headless - use `trunk serve` for the web version");

    demo_match();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one scripted Rifle match on a virtual clock
#[cfg(not(target_arch = "wasm32"))]
fn demo_match() {
    use standoff::audio::Silent;
    use standoff::render::LogRenderer;
    use standoff::sim::ModeConfig;
    use standoff::{FireStatus, FrameStatus, Session, Settings, Viewport};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const PLAYER_TRIGGER_MS: f64 = 450.0;

    let mut session = Session::new(Settings::load(), LogRenderer, Silent);
    session.select_mode(ModeConfig::rifle());
    let Some(handle) = session.start_match(0.0) else {
        return;
    };

    let viewport = Viewport::default();
    let fire_every = handle.fire_interval_ms as f64;
    let (mut next_fire, mut next_trigger) = (fire_every, PLAYER_TRIGGER_MS);
    let mut now = 0.0;

    session.key_down("a");
    loop {
        now += FRAME_MS;
        if session.on_frame(handle, now, viewport) == FrameStatus::Stop {
            break;
        }
        if now >= next_fire {
            next_fire += fire_every;
            if session.on_opponent_fire(handle) == FireStatus::Cancelled {
                break;
            }
        }
        if now >= next_trigger {
            next_trigger += PLAYER_TRIGGER_MS;
            // Aim where the opponent is this frame
            let target = session.state().opponent.center();
            session.pointer_down(target);
        }
    }

    let state = session.state();
    log::info!(
        "Demo finished at {:.0} ms: {:?} (player {}, opponent {})",
        now,
        state.outcome,
        state.player.health,
        state.opponent.health
    );
}
