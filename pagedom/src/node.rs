use std::collections::HashMap;

/// A single node in a rendered page tree.
///
/// Nodes arrive pre-rendered from the server; this type only keeps the
/// bookkeeping the client runtime needs to find things and write state
/// back. `component` and `widget` mark the subtree a component instance
/// (by cid) or a widget (by wid) is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    // Identity
    pub id: Option<String>,
    pub tag: String,

    // Binding markers (cid / wid namespaces are disjoint)
    pub component: Option<String>,
    pub widget: Option<String>,

    // Presentation state
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,

    // Content
    /// Current value of form-ish nodes (inputs, radio groups).
    pub value: Option<String>,
    pub text: String,
    /// Raw inner markup for regions the server writes wholesale
    /// (previews, suggestion lists).
    pub markup: String,

    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            id: None,
            tag: "div".into(),
            component: None,
            widget: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            value: None,
            text: String::new(),
            markup: String::new(),
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::element("div")
    }

    pub fn span() -> Self {
        Self::element("span")
    }

    pub fn anchor() -> Self {
        Self::element("a")
    }

    pub fn input() -> Self {
        Self {
            tag: "input".into(),
            value: Some(String::new()),
            ..Default::default()
        }
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Bind this subtree to a component instance by cid.
    pub fn component(mut self, cid: impl Into<String>) -> Self {
        self.component = Some(cid.into());
        self
    }

    /// Bind this subtree to a widget by wid.
    pub fn widget(mut self, wid: impl Into<String>) -> Self {
        self.widget = Some(wid.into());
        self
    }

    // Presentation
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    // Content
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    // Children
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(new_children);
        self
    }

    // In-place state

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_owned(), value.into());
    }

    // Subtree queries

    /// Depth-first search for a node by id, including this node.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// First node in this subtree with the given tag, depth-first.
    pub fn first_tag(&self, tag: &str) -> Option<&Node> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.first_tag(tag))
    }

    /// Visit every node in this subtree, including this node.
    pub fn visit(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for c in &self.children {
            c.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for c in &mut self.children {
            c.visit_mut(f);
        }
    }

    /// All nodes in this subtree carrying the given attribute value.
    pub fn find_by_attr(&self, key: &str, value: &str) -> Vec<&Node> {
        let mut hits = Vec::new();
        self.collect_by_attr(key, value, &mut hits);
        hits
    }

    fn collect_by_attr<'a>(&'a self, key: &str, value: &str, hits: &mut Vec<&'a Node>) {
        if self.get_attr(key) == Some(value) {
            hits.push(self);
        }
        for c in &self.children {
            c.collect_by_attr(key, value, hits);
        }
    }
}
