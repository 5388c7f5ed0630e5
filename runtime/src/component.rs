//! Component descriptor tree.
//!
//! A bridge sits at the root; its single child is the VEM that owns the
//! backend. Deeper levels (VEs, filters, fusers) are carried for the backend
//! to inspect during `init`.

use crate::vem::Vem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ComponentKind {
    Bridge,
    Vem,
    Ve,
    Filter,
    Fuser,
}

#[derive(Debug)]
pub struct Component {
    name: String,
    kind: ComponentKind,
    children: Vec<Component>,
    backend: Option<Box<dyn Vem>>,
}

impl Component {
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self { name: name.into(), kind, children: Vec::new(), backend: None }
    }

    pub fn bridge(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Bridge)
    }

    /// VEM component backed by `backend`.
    pub fn vem(name: impl Into<String>, backend: impl Vem + 'static) -> Self {
        Self { backend: Some(Box::new(backend)), ..Self::new(name, ComponentKind::Vem) }
    }

    pub fn with_child(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn children(&self) -> &[Component] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Component] {
        &mut self.children
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Move the backend out of the component.
    pub fn take_backend(&mut self) -> Option<Box<dyn Vem>> {
        self.backend.take()
    }
}
