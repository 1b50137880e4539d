use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::node::Node;

/// Generation-checked handle onto the subtree a binding resolves to.
///
/// A `Surface` taken before a fragment replacement no longer resolves
/// afterwards; holders learn the tree moved on instead of silently
/// touching nodes that are no longer theirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    binding: String,
    generation: u64,
}

impl Surface {
    pub fn binding(&self) -> &str {
        &self.binding
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// No node in the tree carries the binding.
    Missing(String),
    /// The bound subtree was replaced after this handle was taken.
    Stale(String),
    /// A node id lookup failed.
    NodeMissing(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Missing(binding) => write!(f, "no node is bound to {binding:?}"),
            SurfaceError::Stale(binding) => {
                write!(f, "surface {binding:?} was replaced, handle is stale")
            }
            SurfaceError::NodeMissing(id) => write!(f, "no node with id {id:?}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// The rendered page tree plus the binding bookkeeping on top of it.
///
/// Bindings are looked up by the `component` (cid) or `widget` (wid)
/// marker on a node; the two namespaces never overlap. Every
/// replacement bumps the generation of the bindings inside the removed
/// subtree, which is what invalidates outstanding [`Surface`] handles.
pub struct Document {
    root: Node,
    generations: HashMap<String, u64>,
    focused: Option<String>,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            generations: HashMap::new(),
            focused: None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Take a handle onto the subtree bound to `binding`.
    pub fn bind(&mut self, binding: &str) -> Result<Surface, SurfaceError> {
        if Self::find_bound(&self.root, binding).is_none() {
            return Err(SurfaceError::Missing(binding.to_owned()));
        }
        let generation = *self
            .generations
            .entry(binding.to_owned())
            .or_insert(1);
        Ok(Surface {
            binding: binding.to_owned(),
            generation,
        })
    }

    /// Resolve a handle, failing if the subtree was replaced since.
    pub fn surface(&self, surface: &Surface) -> Result<&Node, SurfaceError> {
        self.check_generation(surface)?;
        Self::find_bound(&self.root, &surface.binding)
            .ok_or_else(|| SurfaceError::Missing(surface.binding.clone()))
    }

    pub fn surface_mut(&mut self, surface: &Surface) -> Result<&mut Node, SurfaceError> {
        self.check_generation(surface)?;
        Self::find_bound_mut(&mut self.root, &surface.binding)
            .ok_or_else(|| SurfaceError::Missing(surface.binding.clone()))
    }

    fn check_generation(&self, surface: &Surface) -> Result<(), SurfaceError> {
        match self.generations.get(&surface.binding) {
            Some(&current) if current == surface.generation => Ok(()),
            Some(_) => Err(SurfaceError::Stale(surface.binding.clone())),
            None => Err(SurfaceError::Missing(surface.binding.clone())),
        }
    }

    /// Replace the subtree bound to `binding` with freshly rendered
    /// nodes. Returns every binding that lived inside the old subtree,
    /// itself included; all of their outstanding handles are now stale.
    pub fn replace(&mut self, binding: &str, node: Node) -> Result<Vec<String>, SurfaceError> {
        let target = Self::find_bound_mut(&mut self.root, binding)
            .ok_or_else(|| SurfaceError::Missing(binding.to_owned()))?;

        let mut invalidated = Vec::new();
        target.visit(&mut |n| {
            if let Some(cid) = &n.component {
                invalidated.push(cid.clone());
            }
            if let Some(wid) = &n.widget {
                invalidated.push(wid.clone());
            }
        });

        *target = node;

        for stale in &invalidated {
            *self.generations.entry(stale.clone()).or_insert(1) += 1;
        }
        if let Some(focused) = &self.focused {
            if self.find(focused).is_none() {
                self.focused = None;
            }
        }
        debug!("replaced subtree bound to {binding:?} ({} bindings invalidated)", invalidated.len());
        Ok(invalidated)
    }

    // Lookup

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    /// The cid of the nearest enclosing component binding of `id`,
    /// the node itself included.
    pub fn owner_of(&self, id: &str) -> Option<&str> {
        Self::owner_in(&self.root, id, None, |n| n.component.as_deref()).flatten()
    }

    /// The wid of the nearest enclosing widget binding of `id`.
    pub fn widget_owner_of(&self, id: &str) -> Option<&str> {
        Self::owner_in(&self.root, id, None, |n| n.widget.as_deref()).flatten()
    }

    fn owner_in<'a>(
        node: &'a Node,
        id: &str,
        inherited: Option<&'a str>,
        marker: fn(&Node) -> Option<&str>,
    ) -> Option<Option<&'a str>> {
        let current = marker(node).or(inherited);
        if node.id.as_deref() == Some(id) {
            return Some(current);
        }
        node.children
            .iter()
            .find_map(|c| Self::owner_in(c, id, current, marker))
    }

    fn find_bound<'a>(node: &'a Node, binding: &str) -> Option<&'a Node> {
        if node.component.as_deref() == Some(binding) || node.widget.as_deref() == Some(binding) {
            return Some(node);
        }
        node.children.iter().find_map(|c| Self::find_bound(c, binding))
    }

    fn find_bound_mut<'a>(node: &'a mut Node, binding: &str) -> Option<&'a mut Node> {
        if node.component.as_deref() == Some(binding) || node.widget.as_deref() == Some(binding) {
            return Some(node);
        }
        node.children
            .iter_mut()
            .find_map(|c| Self::find_bound_mut(c, binding))
    }

    // Focus

    pub fn focus(&mut self, id: &str) -> Result<(), SurfaceError> {
        if self.find(id).is_none() {
            return Err(SurfaceError::NodeMissing(id.to_owned()));
        }
        self.focused = Some(id.to_owned());
        Ok(())
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    // Node state conveniences

    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.find(id).and_then(|n| n.value.as_deref())
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), SurfaceError> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| SurfaceError::NodeMissing(id.to_owned()))?;
        node.value = Some(value.into());
        Ok(())
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(|n| n.text.as_str())
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<(), SurfaceError> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| SurfaceError::NodeMissing(id.to_owned()))?;
        node.text = text.into();
        Ok(())
    }

    pub fn markup_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(|n| n.markup.as_str())
    }

    pub fn set_markup(&mut self, id: &str, markup: impl Into<String>) -> Result<(), SurfaceError> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| SurfaceError::NodeMissing(id.to_owned()))?;
        node.markup = markup.into();
        Ok(())
    }

    pub fn attr_of(&self, id: &str, key: &str) -> Option<&str> {
        self.find(id).and_then(|n| n.get_attr(key))
    }

    pub fn set_attr(
        &mut self,
        id: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Result<(), SurfaceError> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| SurfaceError::NodeMissing(id.to_owned()))?;
        node.set_attr(key, value);
        Ok(())
    }

    pub fn add_class(&mut self, id: &str, class: &str) -> Result<(), SurfaceError> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| SurfaceError::NodeMissing(id.to_owned()))?;
        node.add_class(class);
        Ok(())
    }
}
