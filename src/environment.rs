use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::ScopeRef;
use crate::value::{FunctionValue, Value};

/// One level of the runtime environment stack.
#[derive(Debug, Default, Clone)]
pub struct Frame {
    ints: HashMap<String, i64>,
    bools: HashMap<String, bool>,
    funcs: HashMap<String, Rc<FunctionValue>>,
}

/// The environment: a stack of [`Frame`]s, each holding its own int/bool/func
/// bindings rather than one shared map. A `ScopeRef::At(k)` lookup searches
/// from frame `k` down to frame 0; a `ScopeRef::FromTop` lookup searches from
/// the current top of the stack down to frame 0. See [`crate::ast::ScopeRef`].
#[derive(Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { frames: vec![Frame::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop().expect("pop should be balanced with a prior push");
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn search_range(&self, scope: ScopeRef) -> std::ops::RangeInclusive<usize> {
        let top = self.frames.len() - 1;
        match scope {
            ScopeRef::FromTop => 0..=top,
            ScopeRef::At(k) => 0..=k.min(top),
        }
    }

    pub fn define_int(&mut self, name: &str, value: i64) {
        self.frames.last_mut().unwrap().ints.insert(name.to_string(), value);
    }

    pub fn define_bool(&mut self, name: &str, value: bool) {
        self.frames.last_mut().unwrap().bools.insert(name.to_string(), value);
    }

    pub fn define_func(&mut self, name: &str, value: Rc<FunctionValue>) {
        self.frames.last_mut().unwrap().funcs.insert(name.to_string(), value);
    }

    pub fn get_int(&self, name: &str, scope: ScopeRef) -> Option<i64> {
        for i in self.search_range(scope).rev() {
            if let Some(v) = self.frames[i].ints.get(name) {
                return Some(*v);
            }
        }
        None
    }

    pub fn get_bool(&self, name: &str, scope: ScopeRef) -> Option<bool> {
        for i in self.search_range(scope).rev() {
            if let Some(v) = self.frames[i].bools.get(name) {
                return Some(*v);
            }
        }
        None
    }

    pub fn get_func(&self, name: &str, scope: ScopeRef) -> Option<Rc<FunctionValue>> {
        for i in self.search_range(scope).rev() {
            if let Some(v) = self.frames[i].funcs.get(name) {
                return Some(Rc::clone(v));
            }
        }
        None
    }

    /// Resolves per-frame rather than per-type: a name can be shadowed
    /// across nested scopes with a different type (an `Int` outer binding
    /// and a `Bool` inner one of the same name are both legal, separately,
    /// per §3's shadowing invariant), so every frame from `scope` down to 0
    /// must be checked for *any* binding of `name` before moving to the
    /// next frame — checking one map across the whole range first would
    /// return the outer frame's value even when a nearer frame shadows it
    /// under a different type.
    pub fn get(&self, name: &str, scope: ScopeRef) -> Option<Value> {
        for i in self.search_range(scope).rev() {
            if let Some(v) = self.frames[i].ints.get(name) {
                return Some(Value::Int(*v));
            }
            if let Some(v) = self.frames[i].bools.get(name) {
                return Some(Value::Bool(*v));
            }
            if let Some(v) = self.frames[i].funcs.get(name) {
                return Some(Value::Func(Rc::clone(v)));
            }
        }
        None
    }

    /// Mutates the nearest frame (searching from `scope` downward) that
    /// already owns `name`. Panics if none does, since the analyzer only
    /// ever emits `ScopeRef`s for names it already resolved.
    pub fn set_int(&mut self, name: &str, scope: ScopeRef, value: i64) {
        for i in self.search_range(scope).rev() {
            if self.frames[i].ints.contains_key(name) {
                self.frames[i].ints.insert(name.to_string(), value);
                return;
            }
        }
        unreachable!("assignment target '{name}' should have been resolved by the analyzer");
    }

    pub fn set_bool(&mut self, name: &str, scope: ScopeRef, value: bool) {
        for i in self.search_range(scope).rev() {
            if self.frames[i].bools.contains_key(name) {
                self.frames[i].bools.insert(name.to_string(), value);
                return;
            }
        }
        unreachable!("assignment target '{name}' should have been resolved by the analyzer");
    }

    /// Prints the `Ints:`/`Bools:` dump described for a successful run: one
    /// header per kind, covering every frame in stack order. Function
    /// bindings are never dumped; the language gives no script a way to
    /// observe a function value directly.
    pub fn dump(&self) {
        println!("Ints:");
        for frame in &self.frames {
            for (name, value) in &frame.ints {
                println!("{name} = {value}");
            }
        }
        println!("Bools:");
        for frame in &self.frames {
            for (name, value) in &frame.bools {
                println!("{name} = {value}");
            }
        }
    }
}
