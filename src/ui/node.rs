//! Retained view tree. Panels are built as `Node` trees and the widgets in
//! this module's siblings paint them into a ratatui buffer.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Div,
    Select,
    Option,
    Table,
    Row,
    Cell,
    Link,
    Paragraph,
    List,
    ListItem,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub text: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_options(kind: NodeKind, options: &[(&str, &str)]) -> Self {
        let mut node = Self::new(kind);
        node.apply(options);
        node
    }

    /// `text` sets the text content, every other key becomes an attribute.
    pub fn apply(&mut self, options: &[(&str, &str)]) {
        for (key, value) in options {
            if *key == "text" {
                self.text = Some(value.to_string());
            } else {
                self.attrs.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Depth-first, self included.
    pub fn find_by_class(&self, class: &str) -> Option<&Node> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_class(class))
    }

    pub fn find_by_class_mut(&mut self, class: &str) -> Option<&mut Node> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_by_class_mut(class))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    pub fn find_kind(&self, kind: NodeKind) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_kind(kind))
    }

    #[cfg(test)]
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        let own = usize::from(self.kind == kind);
        own + self.children.iter().map(|c| c.count_kind(kind)).sum::<usize>()
    }

    #[cfg(test)]
    pub fn count_class(&self, class: &str) -> usize {
        let own = usize::from(self.has_class(class));
        own + self
            .children
            .iter()
            .map(|c| c.count_class(class))
            .sum::<usize>()
    }

    /// Concatenated text of this node and its descendants.
    #[cfg(test)]
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

pub fn create_and_append<'a>(
    kind: NodeKind,
    parent: &'a mut Node,
    options: &[(&str, &str)],
) -> &'a mut Node {
    let elem = parent.append(Node::new(kind));
    elem.apply(options);
    elem
}

pub const ALERT_CLASS: &str = "alert-error";

/// A single error-styled text node.
pub fn create_alert<'a>(parent: &'a mut Node, message: &str) -> &'a mut Node {
    create_and_append(
        NodeKind::Div,
        parent,
        &[("text", message), ("class", ALERT_CLASS)],
    )
}

pub enum RowContent<'a> {
    Text(Option<&'a str>),
    Node(Node),
}

/// Table row: a `label` cell followed by the content cell. Missing text
/// renders as an empty cell.
pub fn new_row<'a>(table: &'a mut Node, label: &str, content: RowContent<'_>) -> &'a mut Node {
    let row = create_and_append(NodeKind::Row, table, &[]);
    create_and_append(NodeKind::Cell, row, &[("text", label), ("class", "label")]);
    match content {
        RowContent::Text(text) => {
            create_and_append(NodeKind::Cell, row, &[("text", text.unwrap_or(""))]);
        }
        RowContent::Node(node) => {
            let cell = create_and_append(NodeKind::Cell, row, &[]);
            cell.append(node);
        }
    }
    row
}

pub fn make_link(href: &str, text: &str) -> Node {
    Node::with_options(
        NodeKind::Link,
        &[("target", "_blank"), ("href", href), ("text", text)],
    )
}
