//! Asteroids client entry point
//!
//! Browser: wires DOM input, the requestAnimationFrame loop and the WebGPU canvas.
//! Native: headless smoke driver that plays scripted input against a live server.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_client {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

    use asteroids_client::input::KeyBinding;
    use asteroids_client::persistence::SessionFlagStore;
    use asteroids_client::platform::now_ms;
    use asteroids_client::renderer::RenderState;
    use asteroids_client::{
        ClientConfig, FrameLoop, HttpSimulationClient, InputState, LoopControl, RenderFrame,
        Renderer, ScoreUploadGuard, Settings, start_new_game,
    };

    // Page element ids
    const CANVAS_ID: &str = "box1canvas";
    const START_BUTTON_ID: &str = "startGameButton";
    const PAUSE_BUTTON_ID: &str = "pauseGameButton";
    const HITBOX_TOGGLE_ID: &str = "hitboxes";
    const LIVES_ID: &str = "livesDisplayValue";
    const SCORE_ID: &str = "scoreDisplayValue";
    const LEVEL_ID: &str = "levelDisplayValue";
    const TIME_ID: &str = "timeDisplayValue";
    const PAUSED_OVERLAY_ID: &str = "paused-overlay";
    const GAME_OVER_OVERLAY_ID: &str = "game-over-overlay";

    type ClientLoop = FrameLoop<Rc<HttpSimulationClient>, CanvasRenderer, SessionFlagStore>;

    /// GPU canvas plus DOM HUD
    struct CanvasRenderer {
        render_state: Option<RenderState>,
        document: Document,
    }

    impl CanvasRenderer {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", !visible);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, frame: &RenderFrame<'_>) {
            if let Some(snapshot) = frame.snapshot {
                self.set_text(LIVES_ID, &snapshot.lives().to_string());
                self.set_text(SCORE_ID, &snapshot.score.to_string());
                self.set_text(LEVEL_ID, &snapshot.level.to_string());
                self.set_text(TIME_ID, &snapshot.whole_seconds().to_string());
            }
            self.set_visible(PAUSED_OVERLAY_ID, frame.paused);
            self.set_visible(
                GAME_OVER_OVERLAY_ID,
                frame.snapshot.is_some_and(|s| s.is_game_over()),
            );
        }
    }

    impl Renderer for CanvasRenderer {
        fn draw(&mut self, frame: &RenderFrame<'_>) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.draw_frame(frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.update_hud(frame);
        }
    }

    /// A DOM listener that detaches itself when dropped
    struct Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }

    /// Lifetime of the game page: listeners, pending frame, loop generation
    struct Session {
        control: Rc<LoopControl>,
        listeners: RefCell<Vec<Listener>>,
        raf_id: Cell<Option<i32>>,
    }

    impl Session {
        fn listen<F>(&self, target: &EventTarget, event: &'static str, handler: F)
        where
            F: FnMut(web_sys::Event) + 'static,
        {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
            if target
                .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("Failed to attach {} listener", event);
                return;
            }
            self.listeners.borrow_mut().push(Listener {
                target: target.clone(),
                event,
                closure,
            });
        }

        /// Stop scheduling, invalidate in-flight ticks, detach input
        fn tear_down(&self) {
            self.control.tear_down();
            if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            self.listeners.borrow_mut().clear();
        }
    }

    async fn init_gpu(canvas: &HtmlCanvasElement, width: u32, height: u32) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return None;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                None
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Asteroids client starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Rc::new(RefCell::new(Settings::load()));
        let config = ClientConfig::from_location().unwrap_or_else(|e| {
            log::warn!("{}; using default configuration", e);
            ClientConfig::default()
        });
        log::info!(
            "Playing as {}/{} against {}",
            config.identity.username,
            config.identity.profile_name,
            config.api_base_url
        );

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let render_state = init_gpu(&canvas, canvas.width(), canvas.height()).await;

        if let Some(difficulty) = config.difficulty {
            let mut settings = settings.borrow_mut();
            settings.difficulty = difficulty;
            settings.save();
        }
        log::info!("Difficulty: {}", settings.borrow().difficulty.as_str());

        let api = Rc::new(HttpSimulationClient::new(config, settings.borrow().difficulty));
        let input = Rc::new(InputState::new());
        let control = Rc::new(LoopControl::new(settings.borrow().show_hitboxes));
        let session = Rc::new(Session {
            control: Rc::clone(&control),
            listeners: RefCell::new(Vec::new()),
            raf_id: Cell::new(None),
        });

        setup_input_handlers(&session, &document, &window, Rc::clone(&input));
        setup_controls(&session, &document, &api, &control, &settings);
        setup_teardown(&session, &window);

        let frame_loop: ClientLoop = FrameLoop::new(
            api,
            CanvasRenderer {
                render_state,
                document,
            },
            ScoreUploadGuard::new(SessionFlagStore),
            input,
            control,
        );

        // Start game loop
        request_animation_frame(session, frame_loop);

        log::info!("Asteroids client running!");
    }

    fn setup_input_handlers(
        session: &Session,
        document: &Document,
        window: &web_sys::Window,
        input: Rc<InputState>,
    ) {
        // Keyboard
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let input = Rc::clone(&input);
            session.listen(document, event_name, move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Some(action) = KeyBinding::action_for(&event.key(), &event.code()) {
                    // Space would scroll the page
                    event.prevent_default();
                    input.on_key(action, pressed, now_ms());
                }
            });
        }

        // Focus lost: key-ups will not arrive
        session.listen(window, "blur", move |_event| {
            input.release_all();
            log::info!("Input released (window blur)");
        });
    }

    fn setup_controls(
        session: &Session,
        document: &Document,
        api: &Rc<HttpSimulationClient>,
        control: &Rc<LoopControl>,
        settings: &Rc<RefCell<Settings>>,
    ) {
        // Start button
        if let Some(btn) = document.get_element_by_id(START_BUTTON_ID) {
            let api = Rc::clone(api);
            let control = Rc::clone(control);
            session.listen(&btn, "click", move |_event| {
                if control.is_starting() {
                    return;
                }
                let api = Rc::clone(&api);
                let control = Rc::clone(&control);
                wasm_bindgen_futures::spawn_local(async move {
                    // Outcome is logged; the loop resets on its next tick if it succeeded
                    let _ = start_new_game(api.as_ref(), &control).await;
                });
            });
        }

        // Pause button
        if let Some(btn) = document.get_element_by_id(PAUSE_BUTTON_ID) {
            let control = Rc::clone(control);
            let label = btn.clone();
            session.listen(&btn, "click", move |_event| {
                let paused = control.toggle_pause();
                label.set_text_content(Some(if paused { "Resume" } else { "Pause" }));
            });
        }

        // Hitbox toggle (persisted)
        if let Some(el) = document.get_element_by_id(HITBOX_TOGGLE_ID) {
            if let Ok(checkbox) = el.dyn_into::<HtmlInputElement>() {
                checkbox.set_checked(settings.borrow().show_hitboxes);
                let control = Rc::clone(control);
                let settings = Rc::clone(settings);
                let source = checkbox.clone();
                session.listen(&checkbox, "change", move |_event| {
                    let show = source.checked();
                    control.set_show_hitboxes(show);
                    let mut settings = settings.borrow_mut();
                    settings.show_hitboxes = show;
                    settings.save();
                });
            }
        }
    }

    fn setup_teardown(session: &Rc<Session>, window: &web_sys::Window) {
        // Kept outside the session's own listener list: it tears that list down
        let session = Rc::clone(session);
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            session.tear_down();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(session: Rc<Session>, frame_loop: ClientLoop) {
        if !frame_loop.should_rearm() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let pending = Rc::clone(&session);
        let callback = Closure::once_into_js(move |time: f64| {
            pending.raf_id.set(None);
            wasm_bindgen_futures::spawn_local(run_tick(pending, frame_loop, time));
        });
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => session.raf_id.set(Some(id)),
            Err(_) => log::error!("requestAnimationFrame failed; loop stopped"),
        }
    }

    /// One tick, then re-arm; the next frame is never requested while a tick is pending
    async fn run_tick(session: Rc<Session>, mut frame_loop: ClientLoop, time: f64) {
        frame_loop.tick(time).await;
        request_animation_frame(session, frame_loop);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_client::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;
    use std::time::Duration;

    use asteroids_client::persistence::MemoryFlagStore;
    use asteroids_client::platform::now_ms;
    use asteroids_client::{
        Action, ClientConfig, FrameLoop, HttpSimulationClient, InputState, LoopControl,
        RenderFrame, Renderer, ScoreUploadGuard, Settings, TickOutcome, start_new_game,
    };

    const DEFAULT_FRAMES: u32 = 600;
    const FRAME_INTERVAL: Duration = Duration::from_millis(16);

    /// Logs a one-line HUD once per second of frames
    #[derive(Default)]
    struct LogRenderer {
        frames: u64,
    }

    impl Renderer for LogRenderer {
        fn draw(&mut self, frame: &RenderFrame<'_>) {
            self.frames += 1;
            if self.frames % 60 != 0 {
                return;
            }
            if let Some(s) = frame.snapshot {
                log::info!(
                    "lives={} score={} level={} time={}s enemies={} bullets={}",
                    s.lives(),
                    s.score,
                    s.level,
                    s.whole_seconds(),
                    s.enemies.len(),
                    s.bullets.len()
                );
            }
        }
    }

    pub async fn run() -> anyhow::Result<()> {
        let config = ClientConfig::from_env()?;
        let settings = Settings::load();
        let frames = std::env::var("ASTEROIDS_HEADLESS_FRAMES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FRAMES);

        log::info!(
            "Headless run: {} frames as {}/{} against {}",
            frames,
            config.identity.username,
            config.identity.profile_name,
            config.api_base_url
        );

        let difficulty = config.difficulty.unwrap_or(settings.difficulty);
        log::info!("Difficulty: {}", difficulty.as_str());
        let api = Rc::new(HttpSimulationClient::new(config, difficulty));
        let input = Rc::new(InputState::new());
        let control = Rc::new(LoopControl::new(false));

        start_new_game(api.as_ref(), &control).await?;

        let mut frame_loop = FrameLoop::new(
            Rc::clone(&api),
            LogRenderer::default(),
            ScoreUploadGuard::new(MemoryFlagStore::new()),
            Rc::clone(&input),
            Rc::clone(&control),
        );

        // Circle left with fire held
        input.on_key(Action::Fire, true, now_ms());
        input.on_key(Action::Left, true, now_ms());

        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        let mut failures = 0u32;
        for _ in 0..frames {
            interval.tick().await;
            match frame_loop.tick(now_ms()).await {
                TickOutcome::Rendered { game_over: true } => {
                    log::info!("Game over");
                    break;
                }
                TickOutcome::NetworkFailed => failures += 1,
                _ => {}
            }
        }

        control.tear_down();
        if let Some(s) = frame_loop.last_snapshot() {
            log::info!(
                "Final: score={} level={} time={}s ({} failed updates)",
                s.score,
                s.level,
                s.whole_seconds(),
                failures
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Asteroids client (native, headless) starting...");
    headless::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
