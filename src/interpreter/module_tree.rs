//! The module graph: one node per interpreted source file.
//!
//! Nodes live in an arena and refer to each other by [`ModuleId`]. The import graph
//! may contain cycles (two modules importing each other), so every traversal keeps
//! a visited set.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ahash::AHashMap;

use crate::ast::ExprId;
use crate::interpreter::environment::Environment;

/// Index of a module in the [`ModuleTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

/// Whether a module's top-level statements have finished running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Loading,
    Loaded,
}

/// A single module: its frames, its resolver side-table and its graph edges.
#[derive(Debug)]
pub struct ModuleNode {
    pub path: PathBuf,
    /// Top-level frame; enclosed by the shared built-ins frame.
    pub globals: Rc<RefCell<Environment>>,
    /// Record of what this module exported while being imported. Imports never read
    /// it; an [`ImportedRef`](crate::interpreter::ImportedRef) resolves from `globals`.
    pub exports: Rc<RefCell<Environment>>,
    /// Resolved scope distance per variable-reference expression.
    pub locals: AHashMap<ExprId, usize>,
    pub parent: Option<ModuleId>,
    pub children: Vec<ModuleId>,
    pub state: ModuleState,
}

impl ModuleNode {
    /// Whether this module was imported by another one.
    pub fn is_imported(&self) -> bool {
        self.parent.is_some()
    }
}

/// Arena of module nodes keyed by canonical path.
#[derive(Debug)]
pub struct ModuleTree {
    builtins: Rc<RefCell<Environment>>,
    nodes: Vec<ModuleNode>,
    by_path: HashMap<PathBuf, ModuleId>,
}

impl ModuleTree {
    pub fn new(builtins: Rc<RefCell<Environment>>) -> Self {
        Self {
            builtins,
            nodes: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    pub fn builtins(&self) -> &Rc<RefCell<Environment>> {
        &self.builtins
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ModuleId) -> &ModuleNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: ModuleId) -> &mut ModuleNode {
        &mut self.nodes[id.0]
    }

    /// Look a module up by path anywhere in the arena.
    pub fn lookup(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    /// Create a node whose globals are a fresh child of the built-ins frame.
    pub fn create_child(&mut self, parent: Option<ModuleId>, path: impl Into<PathBuf>) -> ModuleId {
        let path = path.into();
        let id = ModuleId(self.nodes.len());
        self.nodes.push(ModuleNode {
            path: path.clone(),
            globals: Environment::child_of(&self.builtins),
            exports: Rc::new(RefCell::new(Environment::new())),
            locals: AHashMap::new(),
            parent,
            children: Vec::new(),
            state: ModuleState::Loading,
        });
        self.by_path.insert(path, id);
        id
    }

    /// Record that `parent` imports `child`. Repeated edges are ignored.
    pub fn add_child(&mut self, parent: ModuleId, child: ModuleId) {
        let children = &mut self.nodes[parent.0].children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    /// Find an already materialized module reachable from `from`: first `from`
    /// itself and its ancestors toward the root, then every descendant.
    pub fn search_tree(&self, from: ModuleId, path: &Path) -> Option<ModuleId> {
        let mut visited = HashSet::new();
        self.search_from(from, path, &mut visited)
    }

    fn search_from(
        &self,
        id: ModuleId,
        path: &Path,
        visited: &mut HashSet<ModuleId>,
    ) -> Option<ModuleId> {
        if !visited.insert(id) {
            return None;
        }

        let node = self.node(id);
        if node.path == path {
            return Some(id);
        }

        if let Some(parent) = node.parent {
            if let Some(found) = self.search_from(parent, path, visited) {
                return Some(found);
            }
        }

        node.children
            .iter()
            .find_map(|child| self.search_from(*child, path, visited))
    }

    /// Direct child of `id` with the given path.
    pub fn find_child(&self, id: ModuleId, path: &Path) -> Option<ModuleId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ModuleTree {
        ModuleTree::new(Rc::new(RefCell::new(Environment::new())))
    }

    #[test]
    fn test_create_child_shares_builtins() {
        let mut tree = tree();
        tree.builtins()
            .borrow_mut()
            .define_value("clock", crate::interpreter::value::Value::Null);
        let root = tree.create_child(None, "/a/index.sss");
        let child = tree.create_child(Some(root), "/a/lib.sss");

        for id in [root, child] {
            let globals = tree.node(id).globals.clone();
            let enclosing = globals.borrow().enclosing().unwrap();
            assert!(Rc::ptr_eq(&enclosing, tree.builtins()));
        }
        assert_eq!(tree.node(child).parent, Some(root));
        assert!(!tree.node(root).is_imported());
        assert_eq!(tree.node(child).state, ModuleState::Loading);
    }

    #[test]
    fn test_search_tree_up_then_down() {
        let mut tree = tree();
        let root = tree.create_child(None, "/index.sss");
        let a = tree.create_child(Some(root), "/a.sss");
        tree.add_child(root, a);
        let b = tree.create_child(Some(root), "/b.sss");
        tree.add_child(root, b);
        let c = tree.create_child(Some(b), "/c.sss");
        tree.add_child(b, c);

        // From a sibling branch: up to the root, then down into b's subtree.
        assert_eq!(tree.search_tree(a, Path::new("/c.sss")), Some(c));
        assert_eq!(tree.search_tree(c, Path::new("/index.sss")), Some(root));
        assert_eq!(tree.search_tree(c, Path::new("/missing.sss")), None);
    }

    #[test]
    fn test_search_tree_terminates_on_cycles() {
        let mut tree = tree();
        let root = tree.create_child(None, "/index.sss");
        let a = tree.create_child(Some(root), "/a.sss");
        tree.add_child(root, a);
        tree.add_child(a, root);
        tree.add_child(a, root);

        assert_eq!(tree.node(a).children.len(), 1);
        assert_eq!(tree.search_tree(a, Path::new("/none.sss")), None);
    }

    #[test]
    fn test_find_child_is_direct_only() {
        let mut tree = tree();
        let root = tree.create_child(None, "/index.sss");
        let a = tree.create_child(Some(root), "/a.sss");
        tree.add_child(root, a);
        let b = tree.create_child(Some(a), "/b.sss");
        tree.add_child(a, b);

        assert_eq!(tree.find_child(root, Path::new("/a.sss")), Some(a));
        assert_eq!(tree.find_child(root, Path::new("/b.sss")), None);
        assert_eq!(tree.lookup(Path::new("/b.sss")), Some(b));
    }
}
