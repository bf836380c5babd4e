//! FOXCARS Préachat entry point
//!
//! On the web, binds the inspection form to a `FormSession` and pumps its
//! timers. Natively, inspects an exported report file.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlFormElement, KeyboardEvent};

    use foxcars_inspection::platform::dom;
    use foxcars_inspection::platform::print::BrowserPrint;
    use foxcars_inspection::platform::storage::{KeyValueStore, LocalStorage, MemoryStore};
    use foxcars_inspection::platform::time::{Millis, now_ms};
    use foxcars_inspection::platform::Shortcut;
    use foxcars_inspection::{FormEvent, FormSession, Settings};

    type Session = FormSession<Box<dyn KeyValueStore>, BrowserPrint>;

    /// Form page state
    struct App {
        session: Session,
        document: Document,
        form: HtmlFormElement,
        indicator: Option<Element>,
        /// Deadline the pending `setTimeout` was armed for
        armed_for: Option<Millis>,
    }

    impl App {
        /// Push session state into the page
        fn render(&self, now: Millis) {
            dom::render_form(&self.form, self.session.registry());
            if let Some(indicator) = &self.indicator {
                dom::render_status(indicator, self.session.status(now));
            }
            let notifier = self.session.notifier();
            if let Err(e) =
                dom::render_notification(&self.document, notifier.current(now), notifier.phase(now))
            {
                log::warn!("Notification render failed: {:?}", e);
            }
            if let Some(note) = notifier.current(now) {
                log::debug!("Notification #{}: {}", note.id, note.message);
            }
        }
    }

    /// Run `f` on the app, then render and re-arm the timer
    fn with_app(app: &Rc<RefCell<App>>, f: impl FnOnce(&mut App, Millis)) {
        let now = now_ms();
        {
            let mut a = app.borrow_mut();
            f(&mut a, now);
            if let Some(file) = a.session.take_download() {
                if let Err(e) = dom::download(&a.document, &file) {
                    log::warn!("Download failed: {:?}", e);
                }
            }
            a.render(now);
        }
        schedule_tick(app.clone(), now);
    }

    /// Arm one timeout for the session's next deadline
    fn schedule_tick(app: Rc<RefCell<App>>, now: Millis) {
        let Some(deadline) = app.borrow().session.next_deadline(now) else {
            return;
        };
        if app.borrow().armed_for == Some(deadline) {
            return;
        }
        app.borrow_mut().armed_for = Some(deadline);

        let delay = deadline.saturating_sub(now) as i32;
        let window = web_sys::window().unwrap();
        let pump = app.clone();
        let closure = Closure::once(move || {
            pump.borrow_mut().armed_for = None;
            with_app(&pump, |a, now| a.session.tick(now));
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay,
        );
        closure.forget();
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::error!("{} - reports will not survive a reload", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let Some(form) = document
            .get_element_by_id("inspection-form")
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        else {
            log::info!("No inspection form on this page");
            return;
        };

        let settings = Settings::load();
        let registry = dom::read_form(&form);
        let mut session = FormSession::new(registry, open_store(), BrowserPrint, settings);

        let now = now_ms();
        session.restore(now);

        let indicator = dom::create_indicator(&document).ok();
        let app = Rc::new(RefCell::new(App {
            session,
            document,
            form: form.clone(),
            indicator,
            armed_for: None,
        }));
        app.borrow().render(now);
        schedule_tick(app.clone(), now);

        setup_form_listeners(&form, app.clone());
        setup_shortcuts(app.clone());
        setup_commands(app);

        log::info!("FOXCARS Préachat ready - autosave on");
    }

    fn setup_form_listeners(form: &HtmlFormElement, app: Rc<RefCell<App>>) {
        // Input: every keystroke and toggle
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some((field, edit)) = event.target().and_then(|t| dom::read_edit(&t)) else {
                    return;
                };
                with_app(&app, |a, now| a.session.handle(FormEvent::Input { field, edit }, now));
            });
            let _ = form.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Change: edit committed, save immediately
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let field = event
                    .target()
                    .and_then(|t| dom::control_name(&t))
                    .unwrap_or_default();
                with_app(&app, |a, now| a.session.handle(FormEvent::change(field), now));
            });
            let _ = form.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_shortcuts(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let Some(shortcut) = Shortcut::from_key(&event.key(), event.ctrl_key(), event.meta_key())
            else {
                return;
            };
            event.prevent_default();
            log::debug!("Shortcut: {}", shortcut.as_str());
            with_app(&app, |a, now| a.session.handle(FormEvent::Shortcut(shortcut), now));
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Expose a command on `window.FOXCARS` (console) and as a window
    /// global for the page buttons
    fn expose(api: &js_sys::Object, name: &str, global: &str, f: JsValue) {
        let window = web_sys::window().unwrap();
        let _ = js_sys::Reflect::set(api, &JsValue::from_str(name), &f);
        let _ = js_sys::Reflect::set(&window, &JsValue::from_str(global), &f);
    }

    fn setup_commands(app: Rc<RefCell<App>>) {
        let api = js_sys::Object::new();

        let a = app.clone();
        let save = Closure::<dyn FnMut()>::new(move || with_app(&a, |a, now| a.session.save(now)));
        expose(&api, "saveReport", "saveReport", save.into_js_value());

        let a = app.clone();
        let load = Closure::<dyn FnMut()>::new(move || {
            let document = a.borrow().document.clone();
            let target = a.clone();
            let picked = dom::pick_json_file(&document, move |contents| {
                with_app(&target, |a, now| {
                    a.session.import_report(&contents, now);
                });
            });
            if let Err(e) = picked {
                log::warn!("File picker failed: {:?}", e);
            }
        });
        expose(&api, "loadReport", "loadReport", load.into_js_value());

        let a = app.clone();
        let clear = Closure::<dyn FnMut()>::new(move || {
            with_app(&a, |a, now| {
                let confirm = |message: &str| {
                    web_sys::window()
                        .and_then(|w| w.confirm_with_message(message).ok())
                        .unwrap_or(false)
                };
                a.session.clear(confirm, now);
            });
        });
        expose(&api, "clearForm", "clearForm", clear.into_js_value());

        let a = app.clone();
        let pdf = Closure::<dyn FnMut()>::new(move || {
            with_app(&a, |a, now| a.session.generate_document(now))
        });
        expose(&api, "generatePDF", "generatePDF", pdf.into_js_value());

        let a = app.clone();
        let export = Closure::<dyn FnMut()>::new(move || {
            with_app(&a, |a, now| {
                if let Some(file) = a.session.export(now) {
                    if let Err(e) = dom::download(&a.document, &file) {
                        log::warn!("Download failed: {:?}", e);
                    }
                }
            })
        });
        expose(&api, "exportToJSON", "exportToJSON", export.into_js_value());

        let a = app.clone();
        let summary = Closure::<dyn FnMut()>::new(move || {
            a.borrow().session.summary();
        });
        expose(&api, "showDataSummary", "showDataSummary", summary.into_js_value());

        let a = app.clone();
        let progress = Closure::<dyn FnMut()>::new(move || {
            with_app(&a, |a, now| {
                a.session.progress(now);
            })
        });
        expose(&api, "showProgress", "showProgress", progress.into_js_value());

        let a = app.clone();
        let validate = Closure::<dyn FnMut() -> bool>::new(move || {
            let mut valid = false;
            with_app(&a, |a, now| valid = a.session.validate(now).is_ok());
            valid
        });
        expose(&api, "validate", "validateForm", validate.into_js_value());

        let a = app;
        let get_data = Closure::<dyn FnMut() -> JsValue>::new(move || {
            let json = serde_json::to_string(a.borrow().session.current_snapshot()).unwrap_or_default();
            js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL)
        });
        let _ = js_sys::Reflect::set(&api, &JsValue::from_str("getData"), &get_data.into_js_value());

        let window = web_sys::window().unwrap();
        let _ = js_sys::Reflect::set(&window, &JsValue::from_str("FOXCARS"), &api);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("FOXCARS Préachat (native) starting...");
    log::info!("The form itself runs in the browser - build for wasm32 and serve the page");

    let Some(path) = std::env::args().nth(1) else {
        println!("usage: foxcars-inspection <report.json>");
        return;
    };

    if let Err(e) = inspect_report(&path) {
        eprintln!("{}: {}", path, e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Import an exported report into an in-memory session and print its summary
#[cfg(not(target_arch = "wasm32"))]
fn inspect_report(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    use foxcars_inspection::consts::REQUIRED_FIELDS;
    use foxcars_inspection::form::{Field, FieldRegistry};
    use foxcars_inspection::platform::print::NoopRenderer;
    use foxcars_inspection::platform::storage::MemoryStore;
    use foxcars_inspection::platform::time::now_ms;
    use foxcars_inspection::summary::SUMMARY_FIELDS;
    use foxcars_inspection::{FormSession, Settings, summary};

    let contents = std::fs::read_to_string(path)?;

    // Headline and required fields are enough to summarize a report
    let mut registry = FieldRegistry::new();
    for (name, label) in SUMMARY_FIELDS {
        registry.insert(Field::text(name).with_label(label));
    }
    for name in REQUIRED_FIELDS {
        if !registry.contains(name) {
            registry.insert(Field::text(name));
        }
    }

    let mut session = FormSession::new(registry, MemoryStore::new(), NoopRenderer, Settings::default());
    let now = now_ms();
    if !session.import_report(&contents, now) {
        return Err("not a valid inspection report".into());
    }

    let snapshot = session.current_snapshot();
    if let Some(saved_at) = snapshot.saved_at_time() {
        println!("Saved:    {}", summary::format_saved_at(saved_at));
    }
    println!("Fields:   {}", snapshot.len());
    print!("{}", session.summary());

    match session.validate(now) {
        Ok(()) => println!("Required fields: complete"),
        Err(e) => println!("Required fields: {}", e),
    }
    Ok(())
}
