//! In-memory [`Document`] used by the offline driver and the test suites.

use crate::dom::{Document, NodeId, SheetRules};
use crate::error::{DomError, SnapshotError};
use crate::selector::{SelectorList, SelectorTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable description of a page, loadable from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub stylesheets: Vec<StyleSheetSpec>,
    /// Names of functions defined on the page's global object.
    #[serde(default)]
    pub global_functions: Vec<String>,
    pub root: NodeSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    /// Computed values the host would report for this element.
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSheetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Cross-origin sheets still style the page but refuse rule access.
    #[serde(default)]
    pub cross_origin: bool,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSpec {
    pub selector: String,
    #[serde(default)]
    pub declarations: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    computed: BTreeMap<String, String>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            styles: Vec::new(),
            computed: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    fn element(tag: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(ElementData::new(tag)),
        }
    }
}

/// Arena cell. The generation is bumped on release so stale handles miss.
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn initial_value(property: &str) -> Option<&'static str> {
    match property {
        "background-color" => Some("rgba(0, 0, 0, 0)"),
        "box-shadow" => Some("none"),
        "color" => Some("rgb(0, 0, 0)"),
        "border" => Some("0px none rgb(0, 0, 0)"),
        "display" => Some("inline"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    stylesheets: Vec<StyleSheetSpec>,
    global_functions: Vec<String>,
    dispatched: Vec<(NodeId, String)>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty `html` document with `head` and `body`.
    pub fn new() -> Self {
        let mut doc = Self::with_root("html");
        let root = doc.root;
        doc.append_element(root, "head", &[]);
        doc.append_element(root, "body", &[]);
        doc
    }

    fn with_root(tag: &str) -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::element(tag)),
            }],
            free: Vec::new(),
            root: NodeId::new(0, 0),
            stylesheets: Vec::new(),
            global_functions: Vec::new(),
            dispatched: Vec::new(),
        }
    }

    pub fn from_snapshot(snapshot: PageSnapshot) -> Result<Self, DomError> {
        let mut doc = Self::with_root(&snapshot.root.tag);
        let root = doc.root;
        doc.fill(root, &snapshot.root)?;
        doc.stylesheets = snapshot.stylesheets;
        doc.global_functions = snapshot.global_functions;
        Ok(doc)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let snapshot: PageSnapshot = serde_yaml::from_str(yaml)?;
        Ok(Self::from_snapshot(snapshot)?)
    }

    fn fill(&mut self, node: NodeId, spec: &NodeSpec) -> Result<(), DomError> {
        for (name, value) in &spec.attrs {
            self.set_attribute(node, name, value)?;
        }
        self.element_mut(node)?.computed = spec.computed.clone();
        if let Some(text) = &spec.text {
            self.push_text(node, text.clone());
        }
        for child_spec in &spec.children {
            let child = self.create_element(&child_spec.tag)?;
            self.append_child(node, child)?;
            self.fill(child, child_spec)?;
        }
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Live nodes in the arena, text runs and detached elements included.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Creates an element with `attrs` and appends it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.alloc(Node::element(tag));
        for (name, value) in attrs {
            self.write_attr(id, name, value);
        }
        self.attach(parent, id, None);
        id
    }

    pub fn add_stylesheet(&mut self, sheet: StyleSheetSpec) {
        self.stylesheets.push(sheet);
    }

    pub fn define_global_function(&mut self, name: &str) {
        self.global_functions.push(name.to_string());
    }

    /// Every event dispatched through [`Document::dispatch_event`], in order.
    pub fn dispatched_events(&self) -> &[(NodeId, String)] {
        &self.dispatched
    }

    /// Inline style value, ignoring stylesheets and computed fallbacks.
    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?
            .styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        self.write_html(self.root, &mut out);
        out.push('\n');
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else {
            return;
        };
        match &n.data {
            NodeData::Text(text) => out.push_str(&escape(text, false)),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
                }
                if !el.styles.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape(&serialize_styles(&el.styles), true)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &n.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(self.slots.len() - 1, 0)
            }
        }
    }

    /// Frees `id` and its subtree. The caller has already detached it.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            stack.extend(node.children);
        }
    }

    fn push_text(&mut self, parent: NodeId, text: String) {
        let id = self.alloc(Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Text(text),
        });
        self.attach(parent, id, None);
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.node(node)?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match self.node_mut(node).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Ok(el),
            _ => Err(DomError::NodeNotFound(node)),
        }
    }

    fn write_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Ok(el) = self.element_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        if name == "style" {
            el.styles = parse_styles(value);
            return;
        }
        match el.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name, value.to_string())),
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, position: Option<usize>) {
        self.detach(child);
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.node_mut(parent) {
            match position {
                Some(at) if at <= p.children.len() => p.children.insert(at, child),
                _ => p.children.push(child),
            }
        }
    }

    fn check(&self, node: NodeId) -> Result<(), DomError> {
        self.element(node).map(|_| ()).ok_or(DomError::NodeNotFound(node))
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node(n).and_then(|n| n.parent);
        }
        false
    }

    /// Document-order traversal of attached elements.
    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if !matches!(node.data, NodeData::Element(_)) {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

impl SelectorTarget for MemoryDocument {
    fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }
}

impl Document for MemoryDocument {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .filter(|n| list.matches(self, *n))
            .collect())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|n| SelectorTarget::attr(self, *n, "id") == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|n| SelectorTarget::tag(self, *n) == Some("body"))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        SelectorTarget::tag(self, node).map(str::to_string)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_element(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            let el = self.element(node)?;
            return (!el.styles.is_empty()).then(|| serialize_styles(&el.styles));
        }
        SelectorTarget::attr(self, node, &name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.check(node)?;
        self.write_attr(node, name, value);
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.has_class_token(node, class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(node, class) {
            return self.check(node);
        }
        let mut classes = self.attribute(node, "class").unwrap_or_default();
        if !classes.trim().is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self.set_attribute(node, "class", classes.trim())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.check(node)?;
        let Some(classes) = self.attribute(node, "class") else {
            return Ok(());
        };
        let kept: Vec<&str> = classes
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.set_attribute(node, "class", &kept.join(" "))
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        if self.has_class(node, class) {
            self.remove_class(node, class)?;
            Ok(false)
        } else {
            self.add_class(node, class)?;
            Ok(true)
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        match &n.data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element(_) => n.children.iter().map(|c| self.text_content(*c)).collect(),
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.clear_children(node)?;
        if !text.is_empty() {
            self.push_text(node, text.to_string());
        }
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(node)?;
        let property = property.to_ascii_lowercase();
        match el.styles.iter_mut().find(|(p, _)| *p == property) {
            Some((_, v)) => *v = value.to_string(),
            None => el.styles.push((property, value.to_string())),
        }
        Ok(())
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let el = self.element(node)?;
        if let Some(value) = self.inline_style(node, property) {
            return Some(value.to_string());
        }
        let mut from_sheets = None;
        for rule in self.stylesheets.iter().flat_map(|s| &s.rules) {
            let Some(value) = rule.declarations.get(property) else {
                continue;
            };
            if SelectorList::parse(&rule.selector).is_ok_and(|list| list.matches(self, node)) {
                from_sheets = Some(value.clone());
            }
        }
        from_sheets
            .or_else(|| el.computed.get(property).cloned())
            .or_else(|| initial_value(property).map(str::to_string))
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        Ok(self.alloc(Node::element(tag)))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Host(format!(
                "cannot append {child} inside its own subtree"
            )));
        }
        self.attach(parent, child, None);
        Ok(())
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        self.check(reference)?;
        self.check(node)?;
        let parent = self
            .parent_element(reference)
            .ok_or(DomError::Detached(reference))?;
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::Host(format!(
                "cannot insert {node} inside its own subtree"
            )));
        }
        self.detach(node);
        let at = self
            .node(parent)
            .and_then(|p| p.children.iter().position(|c| *c == reference))
            .map(|i| i + 1);
        self.attach(parent, node, at);
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        let children = self
            .node_mut(node)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in children {
            self.release(child);
        }
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        if node == self.root {
            return Err(DomError::Host("cannot remove the document root".into()));
        }
        self.detach(node);
        self.release(node);
        Ok(())
    }

    fn style_sheets(&self) -> Vec<SheetRules> {
        self.stylesheets
            .iter()
            .map(|sheet| {
                if sheet.cross_origin {
                    Err(DomError::SecurityError(
                        sheet.href.clone().unwrap_or_else(|| "<inline>".to_string()),
                    ))
                } else {
                    Ok(sheet.rules.iter().map(|r| r.selector.clone()).collect())
                }
            })
            .collect()
    }

    fn has_global_function(&self, name: &str) -> bool {
        self.global_functions.iter().any(|f| f == name)
    }

    fn dispatch_event(&mut self, node: NodeId, event_type: &str) -> Result<(), DomError> {
        self.check(node)?;
        self.dispatched.push((node, event_type.to_string()));
        Ok(())
    }
}

fn parse_styles(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            (!prop.is_empty() && !value.is_empty()).then(|| (prop, value.to_string()))
        })
        .collect()
}

fn serialize_styles(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
root:
  tag: html
  children:
    - tag: body
      children:
        - tag: nav
          attrs: { class: "navbar top" }
          children:
            - tag: a
              attrs: { href: "#", id: "home" }
              text: Home
        - tag: main
          children:
            - tag: div
              attrs: { class: container }
              children:
                - tag: img
                  attrs: { src: "logo.png" }
"##;

    #[test]
    fn queries_in_document_order() {
        let doc = MemoryDocument::from_yaml(PAGE).unwrap();
        let all = doc.query_selector_all("nav, img, a[href]").unwrap();
        let tags: Vec<_> = all.iter().map(|n| doc.tag_name(*n).unwrap()).collect();
        assert_eq!(tags, vec!["nav", "a", "img"]);
    }

    #[test]
    fn descendant_and_child_combinators() {
        let doc = MemoryDocument::from_yaml(PAGE).unwrap();
        assert_eq!(doc.query_selector_all("main img").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("main > img").unwrap().len(), 0);
        assert_eq!(doc.query_selector_all(".container > img").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all(".navbar.top a#home").unwrap().len(), 1);
    }

    #[test]
    fn detached_nodes_are_not_queryable() {
        let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
        let img = doc.query_selector("img").unwrap().unwrap();
        doc.remove_node(img).unwrap();
        assert!(doc.query_selector("img").unwrap().is_none());
        assert!(doc.attribute(img, "src").is_none());
        assert!(matches!(
            doc.set_attribute(img, "alt", "x"),
            Err(DomError::NodeNotFound(_))
        ));

        let body = doc.body().unwrap();
        let reused = doc.append_element(body, "img", &[]);
        assert_eq!(reused.index(), img.index());
        assert_ne!(reused, img);
        assert!(doc.attribute(img, "src").is_none());
    }

    #[test]
    fn cleared_subtrees_are_released() {
        let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
        let home = doc.element_by_id("home").unwrap();
        let baseline = doc.node_count();
        for n in 0..50 {
            doc.set_text_content(home, &format!("Home {n}")).unwrap();
        }
        assert_eq!(doc.node_count(), baseline);

        let main = doc.query_selector("main").unwrap().unwrap();
        doc.clear_children(main).unwrap();
        assert_eq!(doc.node_count(), baseline - 2);
        assert!(doc.query_selector(".container").unwrap().is_none());
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        assert!(doc.remove_node(root).is_err());
        assert!(doc.body().is_some());
    }

    #[test]
    fn insert_after_places_sibling() {
        let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
        let nav = doc.query_selector("nav").unwrap().unwrap();
        let p = doc.create_element("p").unwrap();
        doc.insert_after(nav, p).unwrap();
        let body = doc.body().unwrap();
        let order: Vec<_> = doc
            .children(body)
            .iter()
            .map(|n| doc.tag_name(*n).unwrap())
            .collect();
        assert_eq!(order, vec!["nav", "p", "main"]);
    }

    #[test]
    fn computed_style_precedence() {
        let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
        let nav = doc.query_selector("nav").unwrap().unwrap();
        assert_eq!(
            doc.computed_style(nav, "background-color").as_deref(),
            Some("rgba(0, 0, 0, 0)")
        );
        doc.add_stylesheet(StyleSheetSpec {
            href: None,
            cross_origin: true,
            rules: vec![RuleSpec {
                selector: ".navbar".into(),
                declarations: BTreeMap::from([("background-color".into(), "#fff".into())]),
            }],
        });
        assert_eq!(doc.computed_style(nav, "background-color").as_deref(), Some("#fff"));
        doc.set_style(nav, "background-color", "red").unwrap();
        assert_eq!(doc.computed_style(nav, "background-color").as_deref(), Some("red"));
    }

    #[test]
    fn serializes_html_with_inline_styles() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let p = doc.append_element(body, "p", &[("class", "hint")]);
        doc.set_text_content(p, "a < b").unwrap();
        doc.set_style(p, "color", "#0078d4").unwrap();
        assert_eq!(
            doc.outer_html(p),
            r#"<p class="hint" style="color: #0078d4;">a &lt; b</p>"#
        );
    }

    #[test]
    fn rejects_cycles() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let root = doc.root();
        assert!(doc.append_child(body, root).is_err());
    }
}
