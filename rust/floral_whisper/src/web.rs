//! Browser Adapter
//!
//! Binds a DOM `<canvas>` to the drawing surface and exposes the wizard to
//! JavaScript as `BouquetStudio`. DOM events become `PointerEvent`s, the
//! raster is blitted with `putImageData`, and the page is told about changes
//! through the `hooks` functions.
//!
//! RefCell borrows are always released before a hook runs, since hooks may
//! call straight back into the studio.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlCanvasElement, ImageData, MouseEvent, ResizeObserver,
    TouchEvent,
};

use crate::brush::BRUSH_SIZES;
use crate::card::GreetingCard;
use crate::color::PALETTE;
use crate::config::GeneratorConfig;
use crate::error::WizardError;
use crate::gemini::GeminiGenerator;
use crate::hooks;
use crate::input::{CanvasRect, PointerEvent, PointerEventType};
use crate::surface::{placeholder_label, DrawingSurface};
use crate::wizard::{Wizard, WizardState, STEP_LABELS};

type Listener = Closure<dyn FnMut(Event)>;
type Convert = fn(&Event, PointerEventType) -> Option<PointerEvent>;

fn js_error(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Shared state behind the JS handle and the DOM callbacks
struct Studio {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    surface: RefCell<DrawingSurface>,
    wizard: RefCell<Wizard>,
    generator: Rc<GeminiGenerator>,
    listeners: RefCell<Vec<(&'static str, Listener)>>,
    resize: RefCell<Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>>,
}

impl Studio {
    fn container_width(&self) -> f32 {
        self.canvas
            .parent_element()
            .map(|parent| parent.get_bounding_client_rect().width() as f32)
            .unwrap_or_else(|| self.canvas.client_width() as f32)
    }

    fn canvas_rect(&self) -> CanvasRect {
        let rect = self.canvas.get_bounding_client_rect();
        CanvasRect::new(rect.left() as f32, rect.top() as f32)
    }

    /// Resize the surface to the container and match the canvas element to it
    fn initialize_surface(&self) {
        let width = self.container_width();
        self.surface.borrow_mut().initialize(width);
        self.sync_canvas_size();
    }

    /// Re-initialize only when the container width changed
    ///
    /// Setting the canvas height resizes the parent too, so height-only
    /// changes must not wipe the sketch.
    fn handle_resize(&self) {
        let width = self.container_width();
        let resized = self.surface.borrow_mut().resize(width);
        if resized {
            self.sync_canvas_size();
        }
    }

    fn sync_canvas_size(&self) {
        let (w, h) = {
            let surface = self.surface.borrow();
            (surface.raster().width(), surface.raster().height())
        };
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.blit();
    }

    /// Copy the raster into the canvas element
    fn blit(&self) {
        let surface = self.surface.borrow();
        let raster = surface.raster();
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(raster.as_rgba()),
            raster.width(),
            raster.height(),
        );
        let result = image.and_then(|image| self.context.put_image_data(&image, 0.0, 0.0));
        if let Err(err) = result {
            log::error!("Failed to blit sketch: {:?}", err);
        }
    }

    fn handle_pointer(&self, event: PointerEvent) {
        if self.wizard.borrow().state() != WizardState::Drawing {
            return;
        }
        let rect = self.canvas_rect();
        let painted = self.surface.borrow_mut().handle_pointer_event(&event, &rect);
        if painted {
            self.blit();
        }
    }

    fn announce_state(&self) {
        let state = self.wizard.borrow().state();
        hooks::wizard_state_changed(state.as_str(), state.step_index());
    }

    fn announce_sketches(&self) {
        let count = self.wizard.borrow().sketches().len();
        hooks::sketches_changed(count);
    }

    fn flush_notice(&self) {
        let notice = self.wizard.borrow_mut().take_notice();
        if let Some(notice) = notice {
            hooks::notice(notice.message());
        }
    }

    /// Throw for programming errors, turn user errors into notices
    fn report(&self, result: Result<(), WizardError>) -> Result<(), JsValue> {
        match result {
            Ok(()) => Ok(()),
            Err(WizardError::Validation(_)) | Err(WizardError::Generation(_)) => {
                self.flush_notice();
                Ok(())
            }
            Err(err) => Err(js_error(err)),
        }
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        for (kind, listener) in self.listeners.get_mut().drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
        if let Some((observer, _callback)) = self.resize.get_mut().take() {
            observer.disconnect();
        }
        log::info!("Studio detached from canvas");
    }
}

fn mouse_event(event: &Event, event_type: PointerEventType) -> Option<PointerEvent> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(PointerEvent::mouse(
        event_type,
        mouse.client_x() as f32,
        mouse.client_y() as f32,
    ))
}

fn touch_event(event: &Event, event_type: PointerEventType) -> Option<PointerEvent> {
    let touch = event.dyn_ref::<TouchEvent>()?;
    // Keep the page from scrolling while drawing
    event.prevent_default();
    let list = touch.touches();
    let points = (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| [t.client_x() as f32, t.client_y() as f32])
        .collect();
    Some(PointerEvent::touch(event_type, points))
}

const MOUSE_EVENTS: [(&str, PointerEventType); 4] = [
    ("mousedown", PointerEventType::Down),
    ("mousemove", PointerEventType::Move),
    ("mouseup", PointerEventType::Up),
    ("mouseleave", PointerEventType::Leave),
];

const TOUCH_EVENTS: [(&str, PointerEventType); 4] = [
    ("touchstart", PointerEventType::Down),
    ("touchmove", PointerEventType::Move),
    ("touchend", PointerEventType::Up),
    ("touchcancel", PointerEventType::Cancel),
];

fn attach_listeners(studio: &Rc<Studio>) -> Result<(), JsValue> {
    let handlers = MOUSE_EVENTS
        .iter()
        .map(|&(kind, ty)| (kind, ty, mouse_event as Convert))
        .chain(TOUCH_EVENTS.iter().map(|&(kind, ty)| (kind, ty, touch_event as Convert)));

    for (kind, event_type, convert) in handlers {
        let weak: Weak<Studio> = Rc::downgrade(studio);
        let listener = Closure::wrap(Box::new(move |event: Event| {
            let Some(studio) = weak.upgrade() else { return };
            if let Some(pointer) = convert(&event, event_type) {
                studio.handle_pointer(pointer);
            }
        }) as Box<dyn FnMut(Event)>);

        studio
            .canvas
            .add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        studio.listeners.borrow_mut().push((kind, listener));
    }
    Ok(())
}

fn observe_resize(studio: &Rc<Studio>) -> Result<(), JsValue> {
    let Some(parent) = studio.canvas.parent_element() else {
        log::warn!("Canvas has no parent; resize tracking disabled");
        return Ok(());
    };

    let weak = Rc::downgrade(studio);
    let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
        if let Some(studio) = weak.upgrade() {
            studio.handle_resize();
        }
    }) as Box<dyn FnMut(js_sys::Array)>);

    let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
    observer.observe(&parent);
    *studio.resize.borrow_mut() = Some((observer, callback));
    Ok(())
}

fn set_field(target: &js_sys::Object, key: &str, value: &JsValue) {
    if let Err(err) = js_sys::Reflect::set(target, &JsValue::from_str(key), value) {
        log::warn!("Failed to set {}: {:?}", key, err);
    }
}

/// JavaScript handle for one bouquet session
#[wasm_bindgen]
pub struct BouquetStudio {
    inner: Rc<Studio>,
}

#[wasm_bindgen]
impl BouquetStudio {
    /// Attach to the canvas with id `canvas_id`, using `api_key` for the image service
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, api_key: &str) -> Result<BouquetStudio, JsValue> {
        let document = web_sys::window()
            .and_then(|win| win.document())
            .ok_or_else(|| js_error("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| js_error(format!("no element #{canvas_id}")))?
            .dyn_into()
            .map_err(|_| js_error(format!("#{canvas_id} is not a canvas")))?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("2d context unavailable"))?
            .dyn_into()?;

        let generator = GeminiGenerator::new(GeneratorConfig::with_api_key(api_key)).map_err(js_error)?;

        let studio = Rc::new(Studio {
            canvas,
            context,
            surface: RefCell::new(DrawingSurface::new(0.0)),
            wizard: RefCell::new(Wizard::new()),
            generator: Rc::new(generator),
            listeners: RefCell::new(Vec::new()),
            resize: RefCell::new(None),
        });
        studio.initialize_surface();
        attach_listeners(&studio)?;
        observe_resize(&studio)?;

        log::info!("🚀 Bouquet studio attached to #{}", canvas_id);
        Ok(BouquetStudio { inner: studio })
    }

    /// Toolbar swatches as `[{name, value}]`
    pub fn palette() -> js_sys::Array {
        PALETTE
            .iter()
            .map(|swatch| {
                let entry = js_sys::Object::new();
                set_field(&entry, "name", &JsValue::from_str(swatch.name));
                set_field(&entry, "value", &JsValue::from_str(swatch.value));
                JsValue::from(entry)
            })
            .collect()
    }

    /// Brush presets as `[{label, width}]`, smallest first
    pub fn brush_sizes() -> js_sys::Array {
        BRUSH_SIZES
            .iter()
            .map(|preset| {
                let entry = js_sys::Object::new();
                set_field(&entry, "label", &JsValue::from_str(preset.label));
                set_field(&entry, "width", &JsValue::from_f64(preset.width as f64));
                JsValue::from(entry)
            })
            .collect()
    }

    /// Progress stepper captions, indexed by `step_index`
    pub fn step_labels() -> js_sys::Array {
        STEP_LABELS.iter().map(|label| JsValue::from_str(label)).collect()
    }

    pub fn set_color(&self, value: &str) -> Result<(), JsValue> {
        self.inner.surface.borrow_mut().set_color(value).map_err(js_error)
    }

    pub fn set_brush_width(&self, width: f32) -> Result<(), JsValue> {
        self.inner.surface.borrow_mut().set_brush_width(width).map_err(js_error)
    }

    /// Wipe the sketch in progress
    pub fn clear_sketch(&self) {
        self.inner.surface.borrow_mut().reset();
        self.inner.blit();
    }

    pub fn has_content(&self) -> bool {
        self.inner.surface.borrow().has_content()
    }

    /// Export the canvas and add it to the bouquet; returns false if there was nothing to save
    pub fn finish_sketch(&self) -> Result<bool, JsValue> {
        {
            let wizard = self.inner.wizard.borrow();
            if wizard.state() != WizardState::Drawing || !wizard.can_draw_more() {
                return Ok(false);
            }
        }
        let exported = self.inner.surface.borrow_mut().export().map_err(js_error)?;
        let Some(image) = exported else {
            return Ok(false);
        };
        self.inner.blit();
        self.inner.wizard.borrow_mut().add_sketch(image).map_err(js_error)?;
        self.inner.announce_sketches();
        Ok(true)
    }

    pub fn proceed(&self) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().advance_to_details();
        self.inner.report(result)?;
        self.inner.announce_state();
        Ok(())
    }

    pub fn edit_art(&self) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().edit_art();
        self.inner.report(result)?;
        self.inner.surface.borrow_mut().reset();
        self.inner.blit();
        self.inner.announce_state();
        Ok(())
    }

    pub fn set_sender(&self, value: &str) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().set_sender(value);
        self.inner.report(result)
    }

    pub fn set_recipient(&self, value: &str) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().set_recipient(value);
        self.inner.report(result)
    }

    pub fn set_message(&self, value: &str) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().set_message(value);
        self.inner.report(result)
    }

    /// Start generation; the outcome arrives through the state and notice hooks
    pub fn submit(&self) -> Result<(), JsValue> {
        let begun = self.inner.wizard.borrow_mut().begin_submit();
        let request = match begun {
            Ok(request) => request,
            Err(err) => return self.inner.report(Err(err)),
        };
        self.inner.announce_state();

        let studio = Rc::clone(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            let generator = Rc::clone(&studio.generator);
            let (task, _abort) = request.dispatch(&*generator);
            let outcome = task.run().await;

            let finished = studio.wizard.borrow_mut().finish_submit(outcome).map(|_| ());
            if let Err(err) = studio.report(finished) {
                log::error!("Generation result dropped: {:?}", err);
            }
            studio.announce_state();
        });
        Ok(())
    }

    pub fn start_over(&self) -> Result<(), JsValue> {
        let result = self.inner.wizard.borrow_mut().reset();
        self.inner.report(result)?;
        self.inner.surface.borrow_mut().reset();
        self.inner.blit();
        self.inner.announce_sketches();
        self.inner.announce_state();
        Ok(())
    }

    pub fn state(&self) -> String {
        self.inner.wizard.borrow().state().as_str().to_string()
    }

    pub fn step_index(&self) -> usize {
        self.inner.wizard.borrow().state().step_index()
    }

    pub fn sketch_count(&self) -> usize {
        self.inner.wizard.borrow().sketches().len()
    }

    pub fn sketch_data_url(&self, index: usize) -> Option<String> {
        let wizard = self.inner.wizard.borrow();
        wizard.sketches().get(index).map(|sketch| sketch.image().data_url())
    }

    pub fn can_continue(&self) -> bool {
        self.inner.wizard.borrow().can_continue()
    }

    pub fn can_draw_more(&self) -> bool {
        self.inner.wizard.borrow().can_draw_more()
    }

    pub fn proceed_label(&self) -> String {
        self.inner.wizard.borrow().proceed_label()
    }

    pub fn placeholder_label(&self) -> String {
        placeholder_label(self.inner.wizard.borrow().next_flower_index())
    }

    pub fn artifact_data_url(&self) -> Option<String> {
        let wizard = self.inner.wizard.borrow();
        wizard.artifact().map(|artifact| artifact.image().data_url())
    }

    pub fn card_heading(&self) -> String {
        self.card().heading
    }

    pub fn card_message(&self) -> String {
        self.card().message
    }

    pub fn card_signature(&self) -> String {
        self.card().signature
    }

    fn card(&self) -> GreetingCard {
        GreetingCard::from_details(self.inner.wizard.borrow().details())
    }
}
