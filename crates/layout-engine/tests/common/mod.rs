//! Shared builders for engine integration tests.
#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use layout_engine::{EngineCfg, LayoutSession};
use layout_host::{EXPANDED_ATTR, HostTree, MemoryHost, NodeId, OPEN_CLASS, ToggleMode};
use layout_prefs::{MemoryBackend, PreferenceStore, Preferences};

/// Handles to one generated section.
#[derive(Clone, Copy, Debug)]
pub struct Parts {
    pub container: NodeId,
    pub toggle: Option<NodeId>,
    pub body: NodeId,
}

/// A host page with a sections list and a session bound to it.
pub struct Page {
    pub host: Arc<MemoryHost>,
    pub backend: Arc<MemoryBackend>,
    pub list: NodeId,
    pub parts: HashMap<String, Parts>,
    pub session: LayoutSession,
}

/// How a generated section behaves.
#[derive(Clone, Copy, Debug)]
pub struct Spec<'a> {
    pub title: &'a str,
    pub toggle: Option<ToggleMode>,
    pub expanded_attr: bool,
    pub open: bool,
}

impl<'a> Spec<'a> {
    /// Closed section with an immediate toggle that reports `aria-expanded`.
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            toggle: Some(ToggleMode::Immediate),
            expanded_attr: true,
            open: false,
        }
    }

    pub fn mode(mut self, mode: ToggleMode) -> Self {
        self.toggle = Some(mode);
        self
    }

    pub fn no_toggle(mut self) -> Self {
        self.toggle = None;
        self
    }

    pub fn no_expanded_attr(mut self) -> Self {
        self.expanded_attr = false;
        self
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }
}

impl Page {
    pub fn new(specs: &[Spec<'_>]) -> Self {
        Self::with_prefs(specs, None)
    }

    pub fn with_prefs(specs: &[Spec<'_>], prefs: Option<&Preferences>) -> Self {
        let host = Arc::new(MemoryHost::new());
        let main = host.create(host.document(), "main").unwrap();
        let list = host.create(main, "div").unwrap();
        host.add_class(list, "job-details-accordion-list").unwrap();
        let mut parts = HashMap::new();
        for s in specs {
            parts.insert(s.title.to_string(), add_section(&host, list, s));
        }
        let backend = Arc::new(MemoryBackend::new());
        let store = Arc::new(PreferenceStore::with_default_key(Box::new(backend.clone())));
        if let Some(p) = prefs {
            store.save(p).unwrap();
        }
        let session =
            LayoutSession::new(host.clone() as Arc<dyn HostTree>, store, EngineCfg::default())
                .unwrap();
        Self {
            host,
            backend,
            list,
            parts,
            session,
        }
    }

    pub fn part(&self, title: &str) -> Parts {
        self.parts[title]
    }

    /// Titles of the list's recognized children, in host order.
    pub fn host_order(&self) -> Vec<String> {
        self.host
            .children(self.list)
            .into_iter()
            .filter_map(|c| {
                self.parts
                    .iter()
                    .find(|(_, p)| p.container == c)
                    .map(|(t, _)| t.clone())
            })
            .collect()
    }

    pub fn is_open(&self, title: &str) -> bool {
        self.host.has_class(self.part(title).body, OPEN_CLASS)
    }

    pub fn clicks(&self, title: &str) -> u32 {
        self.part(title).toggle.map_or(0, |t| self.host.clicks(t))
    }
}

/// `list > div.st-accordion.accordion > (button > div.custom-accordion-header > p, div[collapse])`.
pub fn add_section(host: &MemoryHost, list: NodeId, s: &Spec<'_>) -> Parts {
    let acc = host.create(list, "div").unwrap();
    host.add_class(acc, "st-accordion").unwrap();
    host.add_class(acc, "accordion").unwrap();
    let header_parent = match s.toggle {
        Some(_) => host.create(acc, "button").unwrap(),
        None => acc,
    };
    let header = host.create(header_parent, "div").unwrap();
    host.add_class(header, "custom-accordion-header").unwrap();
    let p = host.create(header, "p").unwrap();
    host.set_text(p, s.title).unwrap();
    let body = host.create(acc, "div").unwrap();
    host.set_attr(body, "data-testid", "accordion-collapse").unwrap();
    if s.open {
        host.add_class(body, OPEN_CLASS).unwrap();
    }
    let toggle = s.toggle.map(|mode| {
        if s.expanded_attr {
            host.set_attr(header_parent, EXPANDED_ATTR, &s.open.to_string())
                .unwrap();
        }
        host.bind_toggle(header_parent, body, mode).unwrap();
        header_parent
    });
    Parts {
        container: acc,
        toggle,
        body,
    }
}

/// Preferences builder.
pub fn prefs(order: &[&str], hidden: &[&str], open: &[(&str, bool)]) -> Preferences {
    Preferences {
        order: order.iter().map(|s| s.to_string()).collect(),
        hidden: hidden.iter().map(|s| (s.to_string(), true)).collect(),
        open_by_title: open.iter().map(|(t, o)| (t.to_string(), *o)).collect(),
    }
}
