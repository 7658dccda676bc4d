//! Change Feed
//!
//! Browser WebSocket subscription to one category's row changes.

use std::cell::RefCell;
use std::rc::Rc;

use daily_tasks::backend::protocol::{
    channel_topic, decode, socket_url, ChangeFilter, Incoming, PhoenixMessage, RefCounter,
};
use daily_tasks::{Category, ChangeEvent};
use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::api::Settings;

/// Milliseconds between heartbeats
const HEARTBEAT_MS: u32 = 25_000;

/// A joined category channel.
///
/// Dropping the feed leaves the channel, detaches every handler and closes
/// the socket; no event is delivered afterwards.
pub struct ChangeFeed {
    ws: WebSocket,
    category: Category,
    join_ref: String,
    refs: Rc<RefCell<RefCounter>>,
    _heartbeat: Interval,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl ChangeFeed {
    /// Open the socket and join `category`'s channel once it is open
    pub fn connect(
        settings: &Settings,
        category: Category,
        on_event: impl Fn(ChangeEvent) + 'static,
    ) -> Result<Self, String> {
        let url = socket_url(&settings.url, &settings.api_key).map_err(|e| e.to_string())?;
        let ws = WebSocket::new(url.as_str())
            .map_err(|e| format!("WebSocket connection failed: {:?}", e))?;

        let refs = Rc::new(RefCell::new(RefCounter::new()));
        let join_ref = refs.borrow_mut().next_ref();
        let filter = ChangeFilter::new(&settings.schema, &settings.table, category);
        let join = PhoenixMessage::join(&filter, &settings.api_key, join_ref.clone());

        // On open: join the channel
        let ws_clone = ws.clone();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            web_sys::console::log_1(&format!("Change feed open for {}", category).into());
            send(&ws_clone, &join);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        // On message
        let topic = channel_topic(category);
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                let text: String = text.into();
                handle_message(&text, &topic, &on_event);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        // On close
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(
                &format!(
                    "Change feed closed: code={}, reason={}",
                    event.code(),
                    event.reason()
                )
                .into(),
            );
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        // On error
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            web_sys::console::error_1(&format!("Change feed error: {:?}", e).into());
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let ws_clone = ws.clone();
        let refs_clone = Rc::clone(&refs);
        let heartbeat = Interval::new(HEARTBEAT_MS, move || {
            if ws_clone.ready_state() == WebSocket::OPEN {
                let msg_ref = refs_clone.borrow_mut().next_ref();
                send(&ws_clone, &PhoenixMessage::heartbeat(msg_ref));
            }
        });

        Ok(Self {
            ws,
            category,
            join_ref,
            refs,
            _heartbeat: heartbeat,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        })
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if self.ws.ready_state() == WebSocket::OPEN {
            let msg_ref = self.refs.borrow_mut().next_ref();
            send(
                &self.ws,
                &PhoenixMessage::leave(self.category, Some(self.join_ref.clone()), msg_ref),
            );
        }

        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
        let _ = self.ws.close();
        web_sys::console::log_1(&format!("Change feed for {} stopped", self.category).into());
    }
}

fn send(ws: &WebSocket, message: &PhoenixMessage) {
    let sent = message
        .to_text()
        .map_err(|e| e.to_string())
        .and_then(|text| ws.send_with_str(&text).map_err(|e| format!("{:?}", e)));
    if let Err(e) = sent {
        web_sys::console::error_1(&format!("Failed to send {}: {}", message.event, e).into());
    }
}

/// Handle one incoming frame
fn handle_message(text: &str, topic: &str, on_event: &dyn Fn(ChangeEvent)) {
    let message = match PhoenixMessage::from_text(text) {
        Ok(message) => message,
        Err(e) => {
            web_sys::console::warn_1(&format!("Unreadable frame: {}", e).into());
            return;
        }
    };

    if message.topic != topic {
        return;
    }

    match decode(&message) {
        Ok(Incoming::Change(event)) => on_event(event),
        Ok(Incoming::Reply { ok: false, detail, .. }) => {
            web_sys::console::error_1(&format!("Channel request refused: {}", detail).into());
        }
        Ok(Incoming::System { status, message }) => {
            web_sys::console::log_1(&format!("Channel {}: {}", status, message).into());
        }
        Ok(Incoming::ChannelClosed { reason }) => {
            web_sys::console::warn_1(&format!("Channel closed: {}", reason).into());
        }
        Ok(_) => {}
        Err(e) => {
            web_sys::console::warn_1(&format!("Bad change payload: {}", e).into());
        }
    }
}
