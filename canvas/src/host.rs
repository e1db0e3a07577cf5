//! Browser wiring around [`Engine`].
//!
//! Three things drive the engine on the page's single thread: a
//! `requestAnimationFrame` loop that paints and samples the HUD, one
//! long-lived task draining network events, and fire-and-forget access
//! checks. Input handlers are plain methods the page calls from its DOM
//! listeners. Nothing holds the engine borrow across an `.await`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use js_sys::Date;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::HtmlCanvasElement;

use crate::camera::{Point, Viewport};
use crate::engine::{Action, Engine, Notice};
use crate::holdings::HoldingsChecker;
use crate::hud::HudSnapshot;
use crate::input::{Button, Modifiers, WheelDelta};
use crate::net::Connection;
use crate::sync::NetEvent;
use crate::wallet::Wallet;

/// What the host tells the page.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Cursor(String),
    Notice(Notice),
    Hud(HudSnapshot),
}

type Sink = Rc<dyn Fn(HostEvent)>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running engine bound to a canvas and a server.
pub struct Host {
    engine: Rc<RefCell<Engine>>,
    connection: Connection,
    sink: Sink,
    frame: FrameCallback,
    frame_id: Rc<Cell<Option<i32>>>,
}

impl Host {
    /// Bind to `canvas`, connect to `url`, and start painting.
    ///
    /// # Errors
    ///
    /// Returns `Err` without a browser window or 2D canvas context.
    pub fn start(canvas: HtmlCanvasElement, url: &str, sink: impl Fn(HostEvent) + 'static) -> Result<Self, JsValue> {
        let (connection, events) = Connection::connect(url);
        let engine = Rc::new(RefCell::new(Engine::new(canvas, Box::new(connection.transport()))?));
        let sink: Sink = Rc::new(sink);

        spawn_event_consumer(Rc::clone(&engine), events, Rc::clone(&sink));

        let frame: FrameCallback = Rc::new(RefCell::new(None));
        let frame_id = Rc::new(Cell::new(None));
        start_animation(&engine, &sink, &frame, &frame_id)?;

        Ok(Self { engine, connection, sink, frame, frame_id })
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        let actions = self.engine.borrow_mut().set_viewport(viewport);
        self.dispatch(actions);
    }

    pub fn fit_to_ball(&self) {
        let actions = self.engine.borrow_mut().core.fit_to_ball();
        self.dispatch(actions);
    }

    pub fn set_brush(&self, color: &str, size: f64) {
        self.engine.borrow_mut().core.set_brush(color, size);
    }

    pub fn pointer_down(&self, x: f64, y: f64, button: i16, modifiers: Modifiers) {
        let Some(button) = Button::from_dom(button) else {
            return;
        };
        let actions = self.engine.borrow_mut().core.on_pointer_down(Point::new(x, y), button, modifiers);
        self.dispatch(actions);
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        let actions = self.engine.borrow_mut().core.on_pointer_move(Point::new(x, y), Date::now());
        self.dispatch(actions);
    }

    pub fn pointer_up(&self, x: f64, y: f64) {
        let actions = self.engine.borrow_mut().core.on_pointer_up(Point::new(x, y));
        self.dispatch(actions);
    }

    pub fn wheel(&self, x: f64, y: f64, dx: f64, dy: f64) {
        let actions = self.engine.borrow_mut().core.on_wheel(Point::new(x, y), WheelDelta { dx, dy });
        self.dispatch(actions);
    }

    /// Connect `wallet` and check its holdings in the background.
    pub fn connect_wallet(&self, wallet: Rc<dyn Wallet>, checker: Rc<dyn HoldingsChecker>) {
        let engine = Rc::clone(&self.engine);
        let sink = Rc::clone(&self.sink);
        wasm_bindgen_futures::spawn_local(async move {
            let address = match wallet.connect().await {
                Ok(Some(address)) => address,
                Ok(None) => return,
                Err(e) => {
                    let actions = engine.borrow_mut().core.wallet_failed(e.to_string());
                    emit_all(&sink, actions);
                    return;
                }
            };
            engine.borrow_mut().core.wallet_connected(&address);
            let result = checker.check(&address).await;
            let actions = engine.borrow_mut().core.resolve_holdings(&address, result);
            emit_all(&sink, actions);
        });
    }

    /// Disconnect `wallet` and drop back to the demo quota.
    pub fn disconnect_wallet(&self, wallet: Rc<dyn Wallet>) {
        self.engine.borrow_mut().core.wallet_disconnected();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wallet.disconnect().await {
                log::warn!("wallet disconnect failed: {e}");
            }
        });
    }

    /// Stop painting and close the connection.
    pub fn teardown(&self) {
        if let Some(id) = self.frame_id.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancel_animation_frame failed: {e:?}");
                }
            }
        }
        self.frame.borrow_mut().take();
        self.connection.teardown();
    }

    fn dispatch(&self, actions: Vec<Action>) {
        emit_all(&self.sink, actions);
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Forward page-facing actions. Repaints happen on the next frame regardless.
fn emit_all(sink: &Sink, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::SetCursor(cursor) => sink(HostEvent::Cursor(cursor)),
            Action::Notice(notice) => {
                log::info!("{}", notice.message());
                sink(HostEvent::Notice(notice));
            }
            Action::RenderNeeded | Action::StrokeCommitted(_) => {}
        }
    }
}

fn spawn_event_consumer(engine: Rc<RefCell<Engine>>, mut events: UnboundedReceiver<NetEvent>, sink: Sink) {
    wasm_bindgen_futures::spawn_local(async move {
        while let Some(event) = events.next().await {
            let actions = engine.borrow_mut().core.on_net_event(event);
            emit_all(&sink, actions);
        }
        log::debug!("net event stream ended");
    });
}

fn start_animation(
    engine: &Rc<RefCell<Engine>>,
    sink: &Sink,
    frame: &FrameCallback,
    frame_id: &Rc<Cell<Option<i32>>>,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let engine = Rc::clone(engine);
    let sink = Rc::clone(sink);
    let frame_for_cb = Rc::clone(frame);
    let id_for_cb = Rc::clone(frame_id);
    let window_for_cb = window.clone();
    let cb = Closure::wrap(Box::new(move |_ts: f64| {
        let hud = {
            let mut engine = engine.borrow_mut();
            if let Err(e) = engine.render() {
                log::warn!("render failed: {e}");
            }
            engine.core.hud(Date::now())
        };
        if let Some(hud) = hud {
            sink(HostEvent::Hud(hud));
        }

        let next = frame_for_cb
            .borrow()
            .as_ref()
            .map(|cb| window_for_cb.request_animation_frame(cb.as_ref().unchecked_ref()));
        match next {
            Some(Ok(id)) => id_for_cb.set(Some(id)),
            Some(Err(e)) => {
                log::error!("request_animation_frame failed: {e:?}");
                id_for_cb.set(None);
            }
            None => id_for_cb.set(None),
        }
    }) as Box<dyn FnMut(f64)>);

    let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    frame_id.set(Some(id));
    *frame.borrow_mut() = Some(cb);
    Ok(())
}
