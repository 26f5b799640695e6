/*!
 * Thin helpers over html5ever and markup5ever_rcdom.
 *
 * Parsing, fragment parsing, serialization and attribute access used by the
 * extractor and the reinjection engine. Node kinds are handled exhaustively
 * through the rcdom `NodeData` variants (Text, Element, Comment, ...).
 */

use std::cell::RefCell;

use html5ever::driver::ParseOpts;
use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::tendril::format_tendril;
use html5ever::{LocalName, namespace_url, ns, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// Parse a full HTML document into a DOM
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Parse an HTML fragment and return its top-level nodes
pub fn parse_fragment_nodes(markup: &str) -> Vec<Handle> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), LocalName::from("div")),
        vec![],
    )
    .one(markup);

    // The fragment parser wraps the parsed nodes in a synthetic html element.
    // The nodes are detached (not cloned) because rcdom's `Drop` strips the
    // children of every node still reachable from the dropped tree.
    let children = dom.document.children.borrow();
    match children.first() {
        Some(root) => std::mem::take(&mut *root.children.borrow_mut()),
        None => Vec::new(),
    }
}

/// Serialize a whole document
pub fn serialize_document(dom: &RcDom) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .expect("Unable to serialize DOM into buffer");
    String::from_utf8_lossy(&buf).to_string()
}

/// Serialize a single node including its own tag (outer markup)
pub fn serialize_outer(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )
    .expect("Unable to serialize DOM node into buffer");
    String::from_utf8_lossy(&buf).to_string()
}

/// Serialize only the children of a node (inner markup)
pub fn serialize_inner(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        },
    )
    .expect("Unable to serialize DOM node into buffer");
    String::from_utf8_lossy(&buf).to_string()
}

/// Get the local tag name of an element node
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Get a node attribute value
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// Set a node attribute, or remove it when `attr_value` is None
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// Get a direct child element by tag name
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// Find the first element with the given tag name, depth-first
pub fn find_first(node: &Handle, node_name: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &node.data {
        if &*name.local == node_name {
            return Some(node.clone());
        }
    }

    for child in node.children.borrow().iter() {
        if let Some(found) = find_first(child, node_name) {
            return Some(found);
        }
    }

    None
}

/// Concatenated text of all Text descendants
pub fn text_content(node: &Handle) -> String {
    fn collect(node: &Handle, out: &mut String) {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            _ => {
                for child in node.children.borrow().iter() {
                    collect(child, out);
                }
            }
        }
    }

    let mut out = String::new();
    collect(node, &mut out);
    out
}

/// Whether the subtree contains any non-whitespace text
pub fn has_visible_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
        _ => node.children.borrow().iter().any(has_visible_text),
    }
}

/// Replace all children with a single text node
pub fn set_text_content(node: &Handle, text: &str) {
    let mut children = node.children.borrow_mut();
    children.clear();
    children.push(new_text(text));
}

/// Create a detached text node
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(text.into()),
    })
}

/// Create a detached comment node
pub fn new_comment(text: &str) -> Handle {
    Node::new(NodeData::Comment {
        contents: text.into(),
    })
}

/// Create a detached element with the given attributes
pub fn new_element(name: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(attr_name, attr_value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*attr_name)),
            value: format_tendril!("{}", attr_value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(), LocalName::from(name)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Pre-order walk over all element nodes.
///
/// Children are snapshotted before descending so the callback may mutate
/// attributes or replace children of the node it is visiting.
pub fn walk_elements(node: &Handle, f: &mut dyn FnMut(&Handle, &str)) {
    if let NodeData::Element { name, .. } = &node.data {
        let local = name.local.to_string();
        f(node, &local);
    }

    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    for child in children {
        walk_elements(&child, f);
    }
}
