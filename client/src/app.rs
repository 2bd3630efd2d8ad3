use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, Event, EventTarget, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, HtmlSelectElement,
};

use crate::actions::Dispatcher;
use crate::config::ClientConfig;
use crate::dom::{fit_canvas_to_video, get_element, set_visible, CanvasOverlay, DomControls, DomList};
use crate::logging;
use crate::net::FetchApi;
use crate::ports::Ports;
use crate::reference::ReferenceSpec;

type Session = Rc<Dispatcher<FetchApi>>;

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl 'static + FnMut(Event),
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Click handler that runs one dispatcher action on the event loop.
fn on_click_spawn<F, Fut>(
    button: &HtmlButtonElement,
    session: &Session,
    mut action: F,
) -> Result<(), JsValue>
where
    F: 'static + FnMut(Session) -> Fut,
    Fut: 'static + Future<Output = ()>,
{
    let session = session.clone();
    listen(button.as_ref(), "click", move |_| {
        wasm_bindgen_futures::spawn_local(action(session.clone()));
    })
}

fn read_reference(
    select: &HtmlSelectElement,
    width: &HtmlInputElement,
    height: &HtmlInputElement,
) -> ReferenceSpec {
    ReferenceSpec::from_form(&select.value(), &width.value(), &height.value())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() != Some("loading") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    listen(document.as_ref(), "DOMContentLoaded", move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    })
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let config = ClientConfig::from_window(&window);
    logging::init(config.debug);
    log::info!("Measurement client starting (api base {:?})", config.api_base);

    let video: Element = get_element(&document, "video-stream")?;
    let canvas: HtmlCanvasElement = get_element(&document, "canvas-overlay")?;
    let start_button: HtmlButtonElement = get_element(&document, "start-btn")?;
    let guide_overlay: Element = get_element(&document, "guide-overlay")?;
    let reference_setup: Element = get_element(&document, "reference-setup")?;
    let reference_type: HtmlSelectElement = get_element(&document, "reference-type")?;
    let custom_reference: HtmlElement = get_element(&document, "custom-reference")?;
    let reference_width: HtmlInputElement = get_element(&document, "reference-width")?;
    let reference_height: HtmlInputElement = get_element(&document, "reference-height")?;
    let calibrate_button: HtmlButtonElement = get_element(&document, "calibrate-btn")?;
    let measure_button: HtmlButtonElement = get_element(&document, "measure-btn")?;
    let scan_button: HtmlButtonElement = get_element(&document, "scan-room-btn")?;
    let reset_button: HtmlButtonElement = get_element(&document, "reset-btn")?;
    let status_el: Element = get_element(&document, "status-indicator")?;
    let list_el: Element = get_element(&document, "measurements-list")?;
    let loading: Element = get_element(&document, "loading")?;

    fit_canvas_to_video(&canvas, &video);

    let ports = Ports {
        overlay: Box::new(CanvasOverlay::new(canvas.clone())?),
        list: Box::new(DomList::new(document.clone(), list_el)),
        controls: Box::new(DomControls {
            window: window.clone(),
            status_el,
            reference_setup,
            calibrate_button: calibrate_button.clone(),
            measure_button: measure_button.clone(),
            scan_button: scan_button.clone(),
            reset_button: reset_button.clone(),
        }),
    };
    let session: Session = Rc::new(Dispatcher::new(
        FetchApi::new(window.clone(), config.api_base.clone()),
        ports,
    ));

    {
        let canvas = canvas.clone();
        let video_cb = video.clone();
        let session = session.clone();
        listen(video.as_ref(), "load", move |_| {
            fit_canvas_to_video(&canvas, &video_cb);
            set_visible(&loading, false);
            session.show_ready();
        })?;
    }

    {
        let canvas = canvas.clone();
        let video = video.clone();
        listen(window.as_ref(), "resize", move |_| {
            fit_canvas_to_video(&canvas, &video);
        })?;
    }

    {
        let session = session.clone();
        listen(start_button.as_ref(), "click", move |_| {
            set_visible(&guide_overlay, false);
            session.open_reference_setup();
        })?;
    }

    {
        let select = reference_type.clone();
        listen(reference_type.as_ref(), "change", move |_| {
            let display = if select.value() == "custom" {
                "block"
            } else {
                "none"
            };
            let _ = custom_reference.style().set_property("display", display);
        })?;
    }

    on_click_spawn(&calibrate_button, &session, move |session| {
        let spec = read_reference(&reference_type, &reference_width, &reference_height);
        async move {
            let _ = session.calibrate(&spec).await;
        }
    })?;
    on_click_spawn(&measure_button, &session, |session| async move {
        let _ = session.measure().await;
    })?;
    on_click_spawn(&scan_button, &session, |session| async move {
        let _ = session.toggle_scan().await;
    })?;
    on_click_spawn(&reset_button, &session, |session| async move {
        let _ = session.reset().await;
    })?;

    session.show_ready();
    let initial = session.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(error) = initial.refresh().await {
            log::error!("Initial measurement list fetch failed: {error}");
        }
    });

    Ok(())
}
