use catalog::{ImageryCatalog, Selection};
use layers::DisplayMode;
use runtime::{ControlError, ControlEvent, ControlId, ControlListener, ControlSource};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

fn dom_err(e: JsValue) -> ControlError {
    ControlError::Dom(format!("{:?}", e))
}

fn lookup<T: JsCast>(
    document: &Document,
    control: ControlId,
    expected: &'static str,
) -> Result<T, ControlError> {
    let id = control.element_id();
    document
        .get_element_by_id(id)
        .ok_or_else(|| ControlError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| ControlError::WrongElementType {
            id: id.to_string(),
            expected,
        })
}

fn append_option(select: &HtmlSelectElement, label: &str, value: &str) -> Result<(), ControlError> {
    let option = HtmlOptionElement::new_with_text_and_value(label, value).map_err(dom_err)?;
    select.append_child(&option).map_err(dom_err)?;
    Ok(())
}

/// The control panel widgets of the page.
#[derive(Debug, Clone)]
pub struct DomControls {
    bottom: HtmlSelectElement,
    top: HtmlSelectElement,
    mode: HtmlSelectElement,
    water_boost: HtmlInputElement,
    opacity: HtmlInputElement,
}

impl DomControls {
    pub fn from_document(document: &Document) -> Result<Self, ControlError> {
        Ok(Self {
            bottom: lookup(document, ControlId::BottomYear, "select")?,
            top: lookup(document, ControlId::TopYear, "select")?,
            mode: lookup(document, ControlId::DisplayMode, "select")?,
            water_boost: lookup(document, ControlId::WaterBoost, "checkbox")?,
            opacity: lookup(document, ControlId::Opacity, "range input")?,
        })
    }

    fn target(&self, control: ControlId) -> &EventTarget {
        match control {
            ControlId::BottomYear => &self.bottom,
            ControlId::TopYear => &self.top,
            ControlId::DisplayMode => &self.mode,
            ControlId::WaterBoost => &self.water_boost,
            ControlId::Opacity => &self.opacity,
        }
    }

    fn listen(
        &self,
        control: ControlId,
        kind: &str,
        event: ControlEvent,
        listener: &ControlListener,
    ) -> Result<(), ControlError> {
        let listener = listener.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            listener(event);
        });
        self.target(control)
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        // Listeners live as long as the page.
        closure.forget();
        Ok(())
    }
}

impl ControlSource for DomControls {
    fn bottom_layer_id(&self) -> String {
        self.bottom.value()
    }

    fn top_layer_id(&self) -> String {
        self.top.value()
    }

    fn display_mode(&self) -> DisplayMode {
        DisplayMode::new(self.mode.value())
    }

    fn water_boost(&self) -> bool {
        self.water_boost.checked()
    }

    fn opacity_raw(&self) -> String {
        self.opacity.value()
    }

    fn populate_years(
        &mut self,
        catalog: &ImageryCatalog,
        selection: Selection<'_>,
    ) -> Result<(), ControlError> {
        for year in catalog.list_years() {
            append_option(&self.bottom, &year.label, &year.layer_id)?;
            append_option(&self.top, &year.label, &year.layer_id)?;
        }
        self.bottom.set_value(&selection.bottom.layer_id);
        self.top.set_value(&selection.top.layer_id);
        Ok(())
    }

    fn populate_display_modes(&mut self, presets: &[(&str, &str)]) -> Result<(), ControlError> {
        if self.mode.length() > 0 {
            return Ok(());
        }
        for (value, label) in presets {
            append_option(&self.mode, label, value)?;
        }
        if let Some((first, _)) = presets.first() {
            self.mode.set_value(first);
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: ControlListener) -> Result<(), ControlError> {
        for control in ControlId::ALL {
            self.listen(control, "change", ControlEvent::Changed(control), &listener)?;
        }
        self.listen(
            ControlId::Opacity,
            "input",
            ControlEvent::Input(ControlId::Opacity),
            &listener,
        )
    }
}
