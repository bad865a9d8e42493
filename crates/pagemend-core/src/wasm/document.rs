//! [`Document`] over the browser DOM.

use crate::dom::{Document, NodeId, SheetRules};
use crate::error::DomError;
use std::cell::RefCell;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleRule, CssStyleSheet, Element, HtmlElement, Node, Window};

/// Human-readable form of a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

fn js_error(value: JsValue) -> DomError {
    DomError::Host(describe(&value))
}

fn untag(elements: &[Element]) {
    let key = JsValue::from_str(SLOT_KEY);
    for element in elements {
        if let Err(err) = js_sys::Reflect::delete_property(element, &key) {
            tracing::debug!(error = %describe(&err), "could not untag element");
        }
    }
}

/// Expando property carrying an element's registry slot.
const SLOT_KEY: &str = "__pagemendSlot";

struct Entry {
    generation: u32,
    element: Option<Element>,
}

/// Elements handed out as [`NodeId`]s. Slots are released when the agent
/// removes or clears a subtree, or when the page detaches the element.
#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    free: Vec<usize>,
}

impl Registry {
    fn get(&self, node: NodeId) -> Option<&Element> {
        let entry = self.entries.get(node.index)?;
        if entry.generation != node.generation {
            return None;
        }
        entry.element.as_ref()
    }

    fn insert(&mut self, element: Element) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.element = Some(element);
                NodeId::new(index, entry.generation)
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    element: Some(element),
                });
                NodeId::new(self.entries.len() - 1, 0)
            }
        }
    }

    /// Drops every entry matching `dead`, returning the released elements.
    fn release_where(&mut self, mut dead: impl FnMut(&Element) -> bool) -> Vec<Element> {
        let mut released = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if !entry.element.as_ref().is_some_and(&mut dead) {
                continue;
            }
            if let Some(element) = entry.element.take() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(index);
                released.push(element);
            }
        }
        released
    }

    fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    registry: RefCell<Registry>,
}

impl WebDocument {
    pub fn from_window(window: Window) -> Result<Self, DomError> {
        let document = window
            .document()
            .ok_or_else(|| DomError::Host("window has no document".into()))?;
        Ok(Self {
            window,
            document,
            registry: RefCell::new(Registry::default()),
        })
    }

    pub fn register(&self, element: Element) -> NodeId {
        let key = JsValue::from_str(SLOT_KEY);
        let mut registry = self.registry.borrow_mut();
        if let Some(index) = js_sys::Reflect::get(&element, &key)
            .ok()
            .and_then(|v| v.as_f64())
        {
            let index = index as usize;
            if let Some(entry) = registry.entries.get(index)
                && entry.element.as_ref() == Some(&element)
            {
                return NodeId::new(index, entry.generation);
            }
        }
        let id = registry.insert(element.clone());
        if let Err(err) = js_sys::Reflect::set(&element, &key, &JsValue::from_f64(id.index() as f64)) {
            tracing::debug!(node = %id, error = %describe(&err), "could not tag element");
        }
        id
    }

    pub fn element(&self, node: NodeId) -> Result<Element, DomError> {
        self.registry
            .borrow()
            .get(node)
            .cloned()
            .ok_or(DomError::NodeNotFound(node))
    }

    /// Number of live handles.
    pub fn registered(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Releases handles of elements the page has taken out of the tree.
    pub fn release_detached(&self) -> usize {
        let released = self
            .registry
            .borrow_mut()
            .release_where(|element| !element.is_connected());
        untag(&released);
        released.len()
    }

    fn release_within(&self, root: &Element, include_root: bool) {
        let released = self.registry.borrow_mut().release_where(|element| {
            let node: &Node = element;
            (include_root || element != root) && root.contains(Some(node))
        });
        untag(&released);
    }

    fn html_element(&self, node: NodeId) -> Result<HtmlElement, DomError> {
        self.element(node)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| DomError::Host(format!("{node} is not an HTML element")))
    }
}

impl Document for WebDocument {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| DomError::invalid_selector(selector, describe(&e)))?;
        let mut out = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(element) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                out.push(self.register(element));
            }
        }
        Ok(out)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document.get_element_by_id(id).map(|e| self.register(e))
    }

    fn body(&self) -> Option<NodeId> {
        self.document.body().map(|b| self.register(Element::from(b)))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).ok().map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node).ok()?.parent_element()?;
        Some(self.register(parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Ok(element) = self.element(node) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|c| self.register(c))
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element(node)?.set_attribute(name, value).map_err(js_error)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.element(node)?.class_list().add_1(class).map_err(js_error)
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.element(node)?.class_list().remove_1(class).map_err(js_error)
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        self.element(node)?.class_list().toggle(class).map_err(js_error)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .ok()
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.element(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.html_element(node)?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let element = self.element(node).ok()?;
        let style = self.window.get_computed_style(&element).ok().flatten()?;
        style
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|_| DomError::InvalidTagName(tag.to_string()))?;
        Ok(self.register(element))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self.element(parent)?;
        let child = self.element(child)?;
        parent.append_child(&child).map(|_| ()).map_err(js_error)
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let anchor = self.element(reference)?;
        let node = self.element(node)?;
        let parent = anchor.parent_node().ok_or(DomError::Detached(reference))?;
        let next = anchor.next_sibling();
        parent
            .insert_before(&node, next.as_ref())
            .map(|_| ())
            .map_err(js_error)
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), DomError> {
        let element = self.element(node)?;
        self.release_within(&element, false);
        element.set_text_content(None);
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), DomError> {
        let element = self.element(node)?;
        self.release_within(&element, true);
        element.remove();
        Ok(())
    }

    fn style_sheets(&self) -> Vec<SheetRules> {
        let sheets = self.document.style_sheets();
        (0..sheets.length())
            .filter_map(|i| sheets.item(i))
            .map(|sheet| {
                let sheet = sheet
                    .dyn_into::<CssStyleSheet>()
                    .map_err(|_| DomError::Host("not a CSS stylesheet".into()))?;
                // Cross-origin sheets throw a SecurityError here.
                let rules = sheet
                    .css_rules()
                    .map_err(|e| DomError::SecurityError(describe(&e)))?;
                Ok((0..rules.length())
                    .filter_map(|j| rules.item(j))
                    .filter_map(|r| r.dyn_into::<CssStyleRule>().ok())
                    .map(|r| r.selector_text())
                    .collect())
            })
            .collect()
    }

    fn has_global_function(&self, name: &str) -> bool {
        js_sys::Reflect::get(self.window.as_ref(), &JsValue::from_str(name))
            .map(|v| v.is_function())
            .unwrap_or(false)
    }

    fn dispatch_event(&mut self, node: NodeId, event_type: &str) -> Result<(), DomError> {
        let event = web_sys::Event::new(event_type).map_err(js_error)?;
        self.element(node)?
            .dispatch_event(&event)
            .map(|_| ())
            .map_err(js_error)
    }
}
