//! Note Invaders entry point
//!
//! Browser: wires the page (text box, keypad, restart button) to a session and
//! drives it from `requestAnimationFrame`.
//! Native: runs a headless session with an autopilot at the keyboard.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, HtmlMediaElement, Window};

    use note_invaders::input::InputCommand;
    use note_invaders::sim::GameEvent;
    use note_invaders::{Session, Settings, Snapshot};

    /// Page-side state shared by every callback
    struct Host {
        session: Session,
        /// Pending animation frame, if one is scheduled
        frame_handle: Option<i32>,
    }

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    fn window() -> Result<Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
    }

    fn now_ms(window: &Window) -> f64 {
        window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn input_box(document: &Document) -> Option<HtmlInputElement> {
        document
            .get_element_by_id("note-input")?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Note Invaders starting...");

        let window = window()?;
        let document = window.document().ok_or("no document")?;

        let query = window.location().search().unwrap_or_default();
        let settings = Settings::from_query(&query);
        let seed = js_sys::Date::now() as u64;
        let host = Rc::new(RefCell::new(Host {
            session: Session::new(settings, seed, now_ms(&window)),
            frame_handle: None,
        }));

        setup_text_input(&document, host.clone())?;
        setup_keypad(&document, host.clone())?;
        setup_restart_button(&document, host.clone())?;

        let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
        start_loop(host.clone(), frame_cb.clone())?;
        setup_teardown(&window, host, frame_cb);

        if let Some(input) = input_box(&document) {
            let _ = input.focus();
        }

        log::info!("Note Invaders running!");
        Ok(())
    }

    fn setup_text_input(document: &Document, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let Some(input) = input_box(document) else {
            log::warn!("No #note-input element; typing disabled");
            return Ok(());
        };

        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Ok(window) = window() else { return };
            let _ = window.navigator().vibrate_with_duration(100);

            let mut h = host.borrow_mut();
            let now = now_ms(&window);
            h.session
                .handle(InputCommand::Text(input_clone.value()), now);
            // Controlled input: the box always shows the buffer
            input_clone.set_value(&h.session.input().display());
        });
        input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_keypad(document: &Document, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let buttons = document.query_selector_all("[data-key]")?;
        for i in 0..buttons.length() {
            let Some(button) = buttons
                .item(i)
                .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let Some(label) = button.get_attribute("data-key") else {
                continue;
            };
            let Some(command) = InputCommand::from_keypad_label(&label) else {
                log::warn!("Unknown keypad label '{}'", label);
                continue;
            };

            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let Ok(window) = window() else { return };
                let now = now_ms(&window);
                host.borrow_mut().session.handle(command.clone(), now);
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_restart_button(document: &Document, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id("restart-btn") else {
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let Ok(window) = window() else { return };
            let seed = js_sys::Date::now() as u64;
            host.borrow_mut().session.reset(seed, now_ms(&window));

            // Refocus the text box once the button click has settled
            if let Some(input) = window.document().as_ref().and_then(input_box) {
                let focus = Closure::once_into_js(move || {
                    let _ = input.focus();
                });
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    focus.unchecked_ref(),
                    100,
                );
            }
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Schedule the next frame and remember its handle
    fn request_frame(host: &Rc<RefCell<Host>>, frame_cb: &FrameCallback) -> Result<(), JsValue> {
        let cb = frame_cb.borrow();
        let Some(cb) = cb.as_ref() else {
            return Ok(());
        };
        let handle = window()?.request_animation_frame(cb.as_ref().unchecked_ref())?;
        host.borrow_mut().frame_handle = Some(handle);
        Ok(())
    }

    fn start_loop(host: Rc<RefCell<Host>>, frame_cb: FrameCallback) -> Result<(), JsValue> {
        let loop_host = host.clone();
        let loop_cb = frame_cb.clone();
        *frame_cb.borrow_mut() = Some(Closure::new(move |time: f64| {
            {
                let mut h = loop_host.borrow_mut();
                h.frame_handle = None;
                if !h.session.is_running() {
                    return;
                }
                h.session.frame(time);
                let events = h.session.take_events();
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    render(&document, &h.session.snapshot(time));
                    for event in &events {
                        play_cue(&document, event);
                    }
                }
            }
            if let Err(e) = request_frame(&loop_host, &loop_cb) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }));
        request_frame(&host, &frame_cb)
    }

    /// Stop the loop when the page goes away: cancel the pending frame and drop
    /// the callback so nothing fires after teardown.
    fn setup_teardown(window: &Window, host: Rc<RefCell<Host>>, frame_cb: FrameCallback) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut h = host.borrow_mut();
            h.session.stop();
            if let (Some(handle), Some(window)) = (h.frame_handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
            frame_cb.borrow_mut().take();
            log::info!("Game loop stopped");
        });
        let _ =
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Push a snapshot into the page
    fn render(document: &Document, snapshot: &Snapshot) {
        set_text(document, "score", &snapshot.score.to_string());
        set_text(document, "message", snapshot.message.as_deref().unwrap_or(""));

        if let Some(input) = input_box(document) {
            if input.value() != snapshot.typed {
                input.set_value(&snapshot.typed);
            }
            input.set_disabled(snapshot.game_over);
        }

        if let Some(ship) = document.get_element_by_id("ship") {
            let _ = ship.set_attribute(
                "style",
                &format!("transform: rotate({:.1}deg)", snapshot.angle),
            );
        }

        if let Some(field) = document.get_element_by_id("field") {
            let mut html = String::new();
            for p in &snapshot.projectiles {
                let _ = write!(
                    html,
                    r#"<img class="bullet" src="/Assets/SVGs/bullet.svg" alt="Bullet" style="left:{:.2}%;bottom:{:.2}%;transform:translate(-50%,-50%) rotate({:.1}deg)">"#,
                    p.pos.x, p.pos.y, snapshot.angle
                );
            }
            for t in &snapshot.targets {
                let _ = write!(
                    html,
                    r#"<div class="asteroid" style="left:{:.2}%;bottom:{:.2}%"><img src="/Assets/images/notes/{}.png" alt="{}">{}</div>"#,
                    t.pos.x,
                    t.pos.y,
                    t.note,
                    t.note,
                    t.hint.as_deref().unwrap_or("")
                );
            }
            field.set_inner_html(&html);
        }

        set_hidden(document, "game-over", !snapshot.game_over);
        if snapshot.game_over {
            set_text(document, "final-score", &snapshot.score.to_string());
        }
    }

    /// Fire-and-forget sound for a game event
    fn play_cue(document: &Document, event: &GameEvent) {
        let (id, volume) = match event {
            GameEvent::ShotFired { .. } => ("bullet-sound", 0.1),
            GameEvent::Explosion { .. } => ("explosion-sound", 1.0),
            GameEvent::Missed { .. } | GameEvent::GameOver { .. } => return,
        };
        let Some(audio) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok())
        else {
            return;
        };
        audio.set_volume(volume);
        audio.set_current_time(0.0);
        if audio.play().is_err() {
            log::warn!("Could not play #{}", id);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Note Invaders (native) starting...");
    log::info!("Native mode runs headless with an autopilot - serve the web build to play");

    let query = std::env::args().nth(1).unwrap_or_default();
    let settings = note_invaders::Settings::from_query(&query);
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let score = headless::run(settings, seed, headless::MAX_TICKS);
    println!("Final score: {score}");
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use note_invaders::input::InputCommand;
    use note_invaders::note;
    use note_invaders::sim::GameEvent;
    use note_invaders::{Session, Settings};

    /// Two minutes of play at the nominal rate
    pub const MAX_TICKS: u64 = 144 * 120;
    /// Ticks the autopilot waits between keystrokes
    const KEYSTROKE_TICKS: u64 = 20;

    /// Play until game over or `max_ticks`; returns the final score.
    ///
    /// The autopilot always goes for the lowest target it has not shot at yet
    /// and types its note one character per keystroke.
    pub fn run(settings: Settings, seed: u64, max_ticks: u64) -> u64 {
        let mut session = Session::new(settings, seed, 0.0);
        let interval = session.settings().tick_interval_ms();
        let mut now = 0.0;
        let mut pending: Vec<char> = Vec::new();
        let mut typed = String::new();
        let mut aimed: Vec<u32> = Vec::new();
        let mut last_key = 0;

        while !session.is_game_over() && session.state().time_ticks < max_ticks {
            now += interval;
            session.frame(now);
            let ticks = session.state().time_ticks;

            if pending.is_empty() {
                let next = session
                    .state()
                    .targets
                    .iter()
                    .filter(|t| !aimed.contains(&t.id))
                    .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|t| (t.id, note::display_label(t.note())));
                if let Some((id, label)) = next {
                    aimed.push(id);
                    pending = label.chars().rev().collect();
                    typed.clear();
                }
            }

            if ticks >= last_key + KEYSTROKE_TICKS {
                if let Some(c) = pending.pop() {
                    typed.push(c);
                    session.handle(InputCommand::Text(typed.clone()), now);
                    last_key = ticks;
                }
            }

            for event in session.take_events() {
                match event {
                    GameEvent::Explosion { note, .. } => log::info!("Hit {}", note),
                    GameEvent::Missed { typed } => log::warn!("Missed with '{}'", typed),
                    GameEvent::GameOver { score } => log::info!("Game over, score {}", score),
                    GameEvent::ShotFired { .. } => {}
                }
            }
        }

        log::debug!("Final snapshot: {}", session.snapshot(now).to_json());
        session.state().score
    }

}
