//! DOM binding for the inspection form (WASM only)
//!
//! Reads the live `<form>` into a `FieldRegistry`, writes registry state
//! back into the controls, and renders the autosave indicator and the
//! notification slot.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, EventTarget, HtmlAnchorElement, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlOptionElement, HtmlSelectElement, HtmlTextAreaElement,
};

use crate::form::{Field, FieldKind, FieldRegistry, SaveStatus};
use crate::notify::{Notification, NotificationPhase};
use crate::persistence::ExportFile;
use crate::session::FieldEdit;

/// Border color of a required field left empty
const INVALID_BORDER: &str = "#ef4444";

/// Input types that carry no form data
const SKIPPED_INPUT_TYPES: [&str; 5] = ["button", "submit", "reset", "file", "image"];

fn controls(form: &HtmlFormElement) -> impl Iterator<Item = Element> {
    let elements = form.elements();
    (0..elements.length()).filter_map(move |i| elements.item(i))
}

fn label_of(element: &Element) -> Option<String> {
    let text = element.previous_element_sibling()?.text_content()?;
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn with_label(field: Field, element: &Element) -> Field {
    match label_of(element) {
        Some(label) => field.with_label(label),
        None => field,
    }
}

/// Build the registry from the form's named controls, in document order
pub fn read_form(form: &HtmlFormElement) -> FieldRegistry {
    let mut registry = FieldRegistry::new();

    for element in controls(form) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            let name = input.name();
            let kind = input.type_();
            if name.is_empty() || SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
                continue;
            }
            match kind.as_str() {
                "radio" | "checkbox" => {
                    registry.add_group_member(&name, kind == "radio", &input.value(), input.checked());
                }
                _ => {
                    let mut field = with_label(Field::text(&name).with_default(&input.default_value()), &element);
                    field.apply_value(&input.value());
                    registry.insert(field);
                }
            }
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            let name = select.name();
            if name.is_empty() {
                continue;
            }
            let options: Vec<HtmlOptionElement> = (0..select.length())
                .filter_map(|i| select.item(i))
                .filter_map(|e| e.dyn_into::<HtmlOptionElement>().ok())
                .collect();
            let values: Vec<String> = options.iter().map(|o| o.value()).collect();
            let mut field = Field::select(&name, values);
            if let Some(default) = options.iter().find(|o| o.default_selected()) {
                field = field.with_default(&default.value());
            }
            let mut field = with_label(field, &element);
            field.apply_value(&select.value());
            registry.insert(field);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            let name = area.name();
            if name.is_empty() {
                continue;
            }
            let default = area.default_value().unwrap_or_default();
            let mut field = with_label(Field::text(&name).with_default(&default), &element);
            field.apply_value(&area.value());
            registry.insert(field);
        }
    }

    log::info!("Form has {} named fields", registry.len());
    registry
}

/// Field name and edit carried by an input event target
pub fn read_edit(target: &EventTarget) -> Option<(String, FieldEdit)> {
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        let edit = match input.type_().as_str() {
            "radio" | "checkbox" => FieldEdit::Checked {
                member: input.value(),
                checked: input.checked(),
            },
            _ => FieldEdit::Value(input.value()),
        };
        return Some((input.name(), edit));
    }
    if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
        return Some((select.name(), FieldEdit::Value(select.value())));
    }
    if let Some(area) = target.dyn_ref::<HtmlTextAreaElement>() {
        return Some((area.name(), FieldEdit::Value(area.value())));
    }
    None
}

/// Name of a form control, for change events
pub fn control_name(target: &EventTarget) -> Option<String> {
    read_edit(target).map(|(name, _)| name)
}

fn mark_invalid(element: &HtmlElement, invalid: bool) {
    let color = if invalid { INVALID_BORDER } else { "" };
    let _ = element.style().set_property("border-color", color);
}

/// Write registry state into the controls that differ from it
pub fn render_form(form: &HtmlFormElement, registry: &FieldRegistry) {
    for element in controls(form) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            let Some(field) = registry.get(&input.name()) else {
                continue;
            };
            match &field.kind {
                FieldKind::RadioGroup { members } | FieldKind::CheckboxGroup { members } => {
                    let value = input.value();
                    if let Some(member) = members.iter().find(|m| m.value == value) {
                        if input.checked() != member.checked {
                            input.set_checked(member.checked);
                        }
                    }
                }
                _ => {
                    let value = field.value().unwrap_or_default();
                    if input.value() != value {
                        input.set_value(value);
                    }
                }
            }
            mark_invalid(input, field.invalid);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            let Some(field) = registry.get(&select.name()) else {
                continue;
            };
            let value = field.value().unwrap_or_default();
            if select.value() != value {
                select.set_value(value);
            }
            mark_invalid(select, field.invalid);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            let Some(field) = registry.get(&area.name()) else {
                continue;
            };
            let value = field.value().unwrap_or_default();
            if area.value() != value {
                area.set_value(value);
            }
            mark_invalid(area, field.invalid);
        }
    }
}

/// Create the autosave indicator
pub fn create_indicator(document: &Document) -> Result<Element, JsValue> {
    let indicator = document.create_element("div")?;
    indicator.set_class_name("autosave-indicator");
    let text = document.create_element("span")?;
    text.set_class_name("status-text");
    text.set_text_content(Some("Sauvegarde automatique"));
    indicator.append_child(&text)?;
    if let Some(body) = document.body() {
        body.append_child(&indicator)?;
    }
    Ok(indicator)
}

/// Show the autosave state on the indicator
pub fn render_status(indicator: &Element, status: SaveStatus) {
    match status.label() {
        Some(label) => {
            indicator.set_class_name(&format!("autosave-indicator show {}", status.css_class()));
            if let Ok(Some(text)) = indicator.query_selector(".status-text") {
                text.set_text_content(Some(label));
            }
        }
        None => indicator.set_class_name("autosave-indicator"),
    }
}

/// Keep the single `.save-status` element in step with the notifier
pub fn render_notification(
    document: &Document,
    current: Option<&Notification>,
    phase: NotificationPhase,
) -> Result<(), JsValue> {
    let existing = document.query_selector(".save-status")?;
    let wanted_id = current.map(|n| n.id.to_string());

    let element = match (existing, current) {
        (Some(el), Some(_)) if el.get_attribute("data-id") == wanted_id => el,
        (existing, Some(n)) => {
            if let Some(old) = existing {
                old.remove();
            }
            let el = document.create_element("div")?;
            el.set_attribute("data-id", &n.id.to_string())?;
            let icon = document.create_element("span")?;
            icon.set_text_content(Some(n.kind.icon()));
            let message = document.create_element("span")?;
            message.set_text_content(Some(&n.message));
            el.append_child(&icon)?;
            el.append_child(&message)?;
            if let Some(body) = document.body() {
                body.append_child(&el)?;
            }
            el
        }
        (existing, None) => {
            if let Some(old) = existing {
                old.remove();
            }
            return Ok(());
        }
    };

    if let Some(n) = current {
        let show = if phase == NotificationPhase::Visible { " show" } else { "" };
        element.set_class_name(&format!("save-status {}{}", n.kind.css_class(), show));
    }
    Ok(())
}

/// Offer an exported report as a file download
pub fn download(document: &Document, file: &ExportFile) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(&file.contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(ExportFile::MIME_TYPE);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    link.set_href(&url);
    link.set_download(&file.file_name);
    link.click();

    web_sys::Url::revoke_object_url(&url)?;
    log::info!("Exported {}", file.file_name);
    Ok(())
}

/// Let the user pick a `.json` file and hand its text to `on_loaded`
pub fn pick_json_file(document: &Document, on_loaded: impl Fn(String) + 'static) -> Result<(), JsValue> {
    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_type("file");
    input.set_accept(".json");

    let picker = input.clone();
    let closure = Closure::once(move |_event: web_sys::Event| {
        let Some(file) = picker.files().and_then(|files| files.get(0)) else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            match wasm_bindgen_futures::JsFuture::from(file.text()).await {
                Ok(text) => on_loaded(text.as_string().unwrap_or_default()),
                Err(e) => log::warn!("Could not read {}: {:?}", file.name(), e),
            }
        });
    });
    input.set_onchange(Some(closure.as_ref().unchecked_ref()));
    closure.forget();

    input.click();
    Ok(())
}
