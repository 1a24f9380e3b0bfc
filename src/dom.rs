use crate::error::{CleanError, Result};
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Non-breaking space as the serializer writes it.
pub const NBSP_ENTITY: &str = "&nbsp;";

/// Decode uploaded bytes into parseable text.
///
/// Word processor exports regularly carry bytes that are not valid UTF-8, or
/// were already mangled into `ï¿½` by a Latin-1 round trip. Both turn into a
/// plain space.
pub fn decode_input(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(CleanError::Parse("document is empty".to_string()));
    }
    let text = String::from_utf8_lossy(bytes)
        .replace("ï¿½", " ")
        .replace('\u{FFFD}', " ");
    let text = text.trim();
    if text.is_empty() {
        return Err(CleanError::Parse("no text could be decoded".to_string()));
    }
    Ok(text.to_string())
}

pub fn parse_to_dom(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

pub fn node_children(h: &Handle) -> Vec<Handle> {
    h.children.borrow().clone()
}

pub fn elem_tag_lower(h: &Handle) -> Option<String> {
    match &h.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_element(h: &Handle, tag: &str) -> bool {
    elem_tag_lower(h).is_some_and(|t| t == tag)
}

pub fn attr(h: &Handle, key: &str) -> Option<String> {
    match &h.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn set_attr(h: &Handle, key: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &h.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    if let Some(a) = attrs.iter_mut().find(|a| &*a.name.local == key) {
        a.value = StrTendril::from_slice(value);
        return;
    }
    attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(key)),
        value: StrTendril::from_slice(value),
    });
}

pub fn remove_attr(h: &Handle, key: &str) {
    if let NodeData::Element { attrs, .. } = &h.data {
        attrs.borrow_mut().retain(|a| &*a.name.local != key);
    }
}

pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(k, v)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*k)),
            value: StrTendril::from_slice(v),
        })
        .collect();
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

pub fn parent_of(h: &Handle) -> Option<Handle> {
    let weak = h.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    h.parent.set(weak);
    parent
}

fn index_in_parent(parent: &Handle, h: &Handle) -> Option<usize> {
    parent.children.borrow().iter().position(|c| Rc::ptr_eq(c, h))
}

/// Siblings after `h`, in order. Empty for a detached node.
pub fn following_siblings(h: &Handle) -> Vec<Handle> {
    let Some(parent) = parent_of(h) else {
        return Vec::new();
    };
    let Some(idx) = index_in_parent(&parent, h) else {
        return Vec::new();
    };
    let siblings = parent.children.borrow()[idx + 1..].to_vec();
    siblings
}

pub fn detach(h: &Handle) {
    if let Some(parent) = parent_of(h) {
        parent.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, h));
    }
    h.parent.set(None);
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn insert_child(parent: &Handle, index: usize, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    let mut children = parent.children.borrow_mut();
    let index = index.min(children.len());
    children.insert(index, child);
}

/// Swap `h` for a text node in its parent, keeping sibling order.
pub fn replace_with_text(h: &Handle, text: &str) {
    let Some(parent) = parent_of(h) else {
        return;
    };
    let Some(idx) = index_in_parent(&parent, h) else {
        return;
    };
    let replacement = new_text(text);
    replacement.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut()[idx] = replacement;
    h.parent.set(None);
}

/// Append text to `parent`, extending a trailing text node if there is one.
pub fn append_text(parent: &Handle, text: &str) {
    if let Some(last) = parent.children.borrow().last() {
        if let NodeData::Text { contents } = &last.data {
            contents.borrow_mut().push_slice(text);
            return;
        }
    }
    append_child(parent, new_text(text));
}

/// Move every child of `from` to the end of `to`.
pub fn adopt_children(to: &Handle, from: &Handle) {
    let moved = std::mem::take(&mut *from.children.borrow_mut());
    for child in moved {
        child.parent.set(None);
        if let NodeData::Text { contents } = &child.data {
            let text = contents.borrow().to_string();
            append_text(to, &text);
            continue;
        }
        append_child(to, child);
    }
}

/// Text node holding only ASCII whitespace. A lone U+00A0 is visible content.
pub fn is_blank_text(h: &Handle) -> bool {
    match &h.data {
        NodeData::Text { contents } => contents.borrow().chars().all(|c| c.is_ascii_whitespace()),
        _ => false,
    }
}

/// Every element under `root` in document order.
pub fn collect_elements(root: &Handle) -> Vec<Handle> {
    fn walk(node: &Handle, out: &mut Vec<Handle>) {
        if let NodeData::Element { .. } = &node.data {
            out.push(node.clone());
        }
        for c in node.children.borrow().iter() {
            walk(c, out);
        }
    }

    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

pub fn find_elem(node: &Handle, tag: &str) -> Option<Handle> {
    if is_element(node, tag) {
        return Some(node.clone());
    }
    for c in node.children.borrow().iter() {
        if let Some(x) = find_elem(c, tag) {
            return Some(x);
        }
    }
    None
}

fn serialize_children(h: &Handle) -> std::io::Result<String> {
    let mut out = Vec::new();
    let node: SerializableHandle = h.clone().into();
    serialize(&mut out, &node, SerializeOpts::default())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Serialized children of `h`, i.e. its inner HTML.
pub fn inner_html(h: &Handle) -> String {
    // Writing into a Vec cannot fail.
    serialize_children(h).unwrap_or_default()
}

pub fn serialize_document(dom: &RcDom) -> Result<String> {
    Ok(serialize_children(&dom.document)?)
}

/// True for inner HTML that renders as nothing: empty or a lone `&nbsp;`.
pub fn is_blank_html(html: &str) -> bool {
    let t = html.trim();
    t.is_empty() || t == NBSP_ENTITY
}
