//! Runtime values for TripleS.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::ast::FunctionDecl;
use crate::interpreter::class::{Class, Instance};
use crate::interpreter::environment::Environment;
use crate::interpreter::imported::ImportedRef;
use crate::interpreter::module_tree::ModuleId;
use crate::lexer::Token;

/// A runtime value in TripleS.
#[derive(Clone)]
pub enum Value {
    Null,
    /// User-defined class
    Class(Rc<Class>),
    /// Instance of a user-defined class
    Instance(Rc<RefCell<Instance>>),
    /// User-defined function, method or arrow function
    Function(Rc<Function>),
    /// Function implemented in Rust, including bound built-in methods
    NativeFunction(Rc<NativeFunction>),
    /// One of the built-in classes (`Number`, `Array`, ...)
    BuiltinClass(BuiltinClass),
    /// Instance of a built-in class
    Builtin(BuiltinInstance),
    /// Lazy reference to a name exported by another module
    Imported(Rc<ImportedRef>),
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Builtin(BuiltinInstance::Number(n))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Builtin(BuiltinInstance::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Value::Builtin(BuiltinInstance::Boolean(b))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Builtin(BuiltinInstance::Array(Rc::new(RefCell::new(ArrayData::new(
            items,
        )))))
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        let mut map = MapData::default();
        for (key, value) in entries {
            map.insert(key, value);
        }
        Value::Builtin(BuiltinInstance::Map(Rc::new(RefCell::new(map))))
    }

    pub fn error(message: Value) -> Self {
        Value::Builtin(BuiltinInstance::Error(Rc::new(RefCell::new(ErrorData {
            message,
            token: None,
        }))))
    }

    pub fn native(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(Vec<Value>) -> Result<Value, String> + 'static,
    ) -> Self {
        Value::NativeFunction(Rc::new(NativeFunction::new(name, arity, func)))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Builtin(BuiltinInstance::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Builtin(BuiltinInstance::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Builtin(BuiltinInstance::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Builtin(BuiltinInstance::Boolean(b)) => *b,
            _ => true,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Class(_) | Value::BuiltinClass(_) => "Class".to_string(),
            Value::Instance(inst) => inst.borrow().class.name.clone(),
            Value::Function(_) | Value::NativeFunction(_) => "Function".to_string(),
            Value::Builtin(b) => b.class().name().to_string(),
            Value::Imported(_) => "Import".to_string(),
        }
    }

    /// Equality used by built-in `__equal__` methods and container lookups:
    /// structural for built-in instances, identity for everything else.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Builtin(a), Value::Builtin(b)) => a.equals(b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinClass(a), Value::BuiltinClass(b)) => a == b,
            (Value::Imported(a), Value::Imported(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Display form used inside array and map literals: strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::Builtin(BuiltinInstance::String(s)) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Class(class) => write!(f, "<{} class>", class.name),
            Value::Instance(inst) => write!(f, "{}", inst.borrow()),
            Value::Function(func) => write!(f, "{}", func),
            Value::NativeFunction(func) => write!(f, "<{} function>", func.name),
            Value::BuiltinClass(class) => write!(f, "<{} class>", class.name()),
            Value::Builtin(b) => write!(f, "{}", b),
            Value::Imported(import) => match import.cached() {
                Some(value) => write!(f, "{}", value),
                None => write!(f, "<imported {}>", import.name.lexeme),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Builtin(BuiltinInstance::String(s)) => write!(f, "String({:?})", s),
            Value::Builtin(BuiltinInstance::Number(n)) => write!(f, "Number({})", n),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

/// Format a number the way TripleS prints it: integral values have no fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        if n == 0.0 {
            "0".to_string()
        } else {
            format!("{}", n as i128)
        }
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// Built-in classes and instances
// ============================================================================

/// The built-in classes registered in every module's enclosing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinClass {
    String,
    Number,
    Boolean,
    Array,
    Map,
    Logger,
    Error,
}

impl BuiltinClass {
    pub const ALL: [BuiltinClass; 7] = [
        BuiltinClass::String,
        BuiltinClass::Number,
        BuiltinClass::Boolean,
        BuiltinClass::Array,
        BuiltinClass::Map,
        BuiltinClass::Logger,
        BuiltinClass::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinClass::String => "String",
            BuiltinClass::Number => "Number",
            BuiltinClass::Boolean => "Boolean",
            BuiltinClass::Array => "Array",
            BuiltinClass::Map => "Map",
            BuiltinClass::Logger => "Logger",
            BuiltinClass::Error => "Error",
        }
    }
}

impl fmt::Display for BuiltinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Backing storage of an `Array` instance.
#[derive(Debug, Clone)]
pub struct ArrayData {
    pub items: Vec<Value>,
    pub max_size: Option<usize>,
}

impl ArrayData {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            max_size: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.max_size.is_some_and(|max| self.items.len() >= max)
    }
}

/// A hashable form of a map key.
/// Scalars hash by value; any other key is compared with [`Value::equals`] and gets
/// a `Structural` id that only reserves its place in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// Bit pattern of the number, with `-0` folded into `0`.
    Number(u64),
    String(Rc<str>),
    Bool(bool),
    Null,
    Structural(usize),
}

impl HashKey {
    /// Convert a scalar Value to a HashKey. NaN never equals itself, so it has none.
    pub fn from_value(value: &Value) -> Option<HashKey> {
        match value {
            Value::Null => Some(HashKey::Null),
            Value::Builtin(BuiltinInstance::Number(n)) if !n.is_nan() => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                Some(HashKey::Number(n.to_bits()))
            }
            Value::Builtin(BuiltinInstance::String(s)) => Some(HashKey::String(s.clone())),
            Value::Builtin(BuiltinInstance::Boolean(b)) => Some(HashKey::Bool(*b)),
            _ => None,
        }
    }
}

/// Backing storage of a `Map` instance, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    entries: IndexMap<HashKey, (Value, Value)>,
    next_structural: usize,
}

impl MapData {
    fn find_key(&self, key: &Value) -> Option<HashKey> {
        if let Some(hashed) = HashKey::from_value(key) {
            return Some(hashed);
        }
        self.entries
            .iter()
            .find(|(hashed, (stored, _))| {
                matches!(hashed, HashKey::Structural(_)) && stored.equals(key)
            })
            .map(|(hashed, _)| hashed.clone())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        let hashed = self.find_key(key)?;
        self.entries.get(&hashed).map(|(_, value)| value)
    }

    /// Replace the value of an equal key in place, or append a new entry.
    pub fn insert(&mut self, key: Value, value: Value) {
        let hashed = match self.find_key(&key) {
            Some(hashed) => hashed,
            None => {
                self.next_structural += 1;
                HashKey::Structural(self.next_structural)
            }
        };
        match self.entries.entry(hashed) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = value,
            Entry::Vacant(entry) => {
                entry.insert((key, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(key, value)| (key, value))
    }
}

/// Backing storage of an `Error` instance.
#[derive(Debug, Clone)]
pub struct ErrorData {
    pub message: Value,
    /// The `throw` keyword that raised this error, once thrown.
    pub token: Option<Token>,
}

/// An instance of a built-in class.
#[derive(Debug, Clone)]
pub enum BuiltinInstance {
    Number(f64),
    String(Rc<str>),
    Boolean(bool),
    Array(Rc<RefCell<ArrayData>>),
    Map(Rc<RefCell<MapData>>),
    Error(Rc<RefCell<ErrorData>>),
    Logger,
}

impl BuiltinInstance {
    pub fn class(&self) -> BuiltinClass {
        match self {
            BuiltinInstance::Number(_) => BuiltinClass::Number,
            BuiltinInstance::String(_) => BuiltinClass::String,
            BuiltinInstance::Boolean(_) => BuiltinClass::Boolean,
            BuiltinInstance::Array(_) => BuiltinClass::Array,
            BuiltinInstance::Map(_) => BuiltinClass::Map,
            BuiltinInstance::Error(_) => BuiltinClass::Error,
            BuiltinInstance::Logger => BuiltinClass::Logger,
        }
    }

    /// Structural equality: element-wise for arrays, key-wise for maps and by
    /// message for errors.
    pub fn equals(&self, other: &BuiltinInstance) -> bool {
        match (self, other) {
            (BuiltinInstance::Number(a), BuiltinInstance::Number(b)) => a == b,
            (BuiltinInstance::String(a), BuiltinInstance::String(b)) => a == b,
            (BuiltinInstance::Boolean(a), BuiltinInstance::Boolean(b)) => a == b,
            (BuiltinInstance::Array(a), BuiltinInstance::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (Ok(a), Ok(b)) = (a.try_borrow(), b.try_borrow()) else {
                    return false;
                };
                a.items.len() == b.items.len()
                    && a.items.iter().zip(b.items.iter()).all(|(x, y)| x.equals(y))
            }
            (BuiltinInstance::Map(a), BuiltinInstance::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (Ok(a), Ok(b)) = (a.try_borrow(), b.try_borrow()) else {
                    return false;
                };
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|other| other.equals(v)))
            }
            (BuiltinInstance::Error(a), BuiltinInstance::Error(b)) => {
                Rc::ptr_eq(a, b) || a.borrow().message.equals(&b.borrow().message)
            }
            (BuiltinInstance::Logger, BuiltinInstance::Logger) => true,
            _ => false,
        }
    }

    /// Deep copy of containers; scalars are copied by value.
    pub fn deep_clone(&self) -> BuiltinInstance {
        fn clone_value(value: &Value) -> Value {
            match value {
                Value::Builtin(b) => Value::Builtin(b.deep_clone()),
                other => other.clone(),
            }
        }

        match self {
            BuiltinInstance::Array(data) => {
                let data = data.borrow();
                BuiltinInstance::Array(Rc::new(RefCell::new(ArrayData {
                    items: data.items.iter().map(clone_value).collect(),
                    max_size: data.max_size,
                })))
            }
            BuiltinInstance::Map(data) => {
                let mut copy = MapData::default();
                for (k, v) in data.borrow().iter() {
                    copy.insert(clone_value(k), clone_value(v));
                }
                BuiltinInstance::Map(Rc::new(RefCell::new(copy)))
            }
            BuiltinInstance::Error(data) => {
                let data = data.borrow();
                BuiltinInstance::Error(Rc::new(RefCell::new(ErrorData {
                    message: clone_value(&data.message),
                    token: data.token.clone(),
                })))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for BuiltinInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinInstance::Number(n) => write!(f, "{}", format_number(*n)),
            BuiltinInstance::String(s) => write!(f, "{}", s),
            BuiltinInstance::Boolean(b) => write!(f, "{}", b),
            BuiltinInstance::Array(data) => {
                let items: Vec<String> = data.borrow().items.iter().map(Value::repr).collect();
                write!(f, "[{}]", items.join(", "))
            }
            BuiltinInstance::Map(data) => {
                let entries: Vec<String> = data
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            BuiltinInstance::Error(data) => write!(f, "{}", data.borrow().message),
            BuiltinInstance::Logger => write!(f, "<Logger instance>"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// A user-defined function value (closure).
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
    /// Module whose side-table resolves this function's body.
    pub module: ModuleId,
    pub is_initializer: bool,
    /// Name of the class a method was declared in.
    pub class_name: Option<String>,
}

impl Function {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        module: ModuleId,
    ) -> Self {
        Self {
            declaration,
            closure,
            module,
            is_initializer: false,
            class_name: None,
        }
    }

    /// A method of `class_name`; `init` methods are initializers.
    pub fn method(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        module: ModuleId,
        class_name: &str,
    ) -> Self {
        Self {
            is_initializer: declaration.name.lexeme == "init",
            class_name: Some(class_name.to_string()),
            ..Self::new(declaration, closure, module)
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Copy of this function whose closure is a fresh frame binding `this`.
    pub fn bind(&self, instance: Value) -> Function {
        let env = Environment::child_of(&self.closure);
        env.borrow_mut().define_value("this", instance);
        Function {
            declaration: self.declaration.clone(),
            closure: env,
            module: self.module,
            is_initializer: self.is_initializer,
            class_name: self.class_name.clone(),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declaration.anonymous {
            write!(f, "<anonymous function>")
        } else {
            write!(f, "<{} function>", self.name())
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name())
    }
}

/// Signature of a function implemented in Rust. Missing arguments are simply
/// absent from the vector; errors are plain messages that the caller anchors
/// at the call site.
pub type NativeFn = dyn Fn(Vec<Value>) -> Result<Value, String>;

/// Native/builtin function
pub struct NativeFunction {
    pub name: String,
    /// Maximum number of arguments accepted.
    pub arity: usize,
    pub func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, String> + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    pub fn call(&self, arguments: Vec<Value>) -> Result<Value, String> {
        (self.func)(arguments)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.25), "-3.25");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::boolean(false).is_truthy());
        assert!(Value::number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_array_and_map_display() {
        let array = Value::array(vec![Value::number(1.0), Value::string("a"), Value::Null]);
        assert_eq!(array.to_string(), "[1, 'a', null]");
        assert_eq!(Value::array(vec![]).to_string(), "[]");

        let map = Value::map(vec![(Value::string("a"), Value::number(1.0))]);
        assert_eq!(map.to_string(), "{'a': 1}");
        assert_eq!(Value::map(vec![]).to_string(), "{}");
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::array(vec![Value::number(1.0), Value::string("x")]);
        let b = Value::array(vec![Value::number(1.0), Value::string("x")]);
        assert!(a.equals(&b));
        assert!(!a.equals(&Value::array(vec![Value::number(1.0)])));

        let m1 = Value::map(vec![
            (Value::string("a"), Value::number(1.0)),
            (Value::string("b"), Value::number(2.0)),
        ]);
        let m2 = Value::map(vec![
            (Value::string("b"), Value::number(2.0)),
            (Value::string("a"), Value::number(1.0)),
        ]);
        assert!(m1.equals(&m2));

        assert!(Value::error(Value::string("x")).equals(&Value::error(Value::string("x"))));
        assert!(!Value::number(1.0).equals(&Value::string("1")));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let inner = Value::array(vec![Value::number(1.0)]);
        let outer = Value::array(vec![inner.clone()]);
        let Value::Builtin(builtin) = &outer else {
            panic!("Expected builtin")
        };
        let copy = Value::Builtin(builtin.deep_clone());

        if let Value::Builtin(BuiltinInstance::Array(data)) = &inner {
            data.borrow_mut().items.push(Value::number(2.0));
        }
        assert_eq!(outer.to_string(), "[[1, 2]]");
        assert_eq!(copy.to_string(), "[[1]]");
    }

    #[test]
    fn test_map_data_replaces_equal_keys() {
        let mut map = MapData::default();
        map.insert(Value::string("k"), Value::number(1.0));
        map.insert(Value::string("k"), Value::number(2.0));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::string("k")).and_then(Value::as_number), Some(2.0));
    }

    #[test]
    fn test_map_data_keys() {
        let mut map = MapData::default();
        map.insert(Value::number(0.0), Value::string("zero"));
        map.insert(Value::array(vec![Value::number(1.0)]), Value::string("list"));
        map.insert(Value::string("0"), Value::string("text"));

        let negative_zero = map.get(&Value::number(-0.0)).map(Value::to_string);
        assert_eq!(negative_zero.as_deref(), Some("zero"));
        let list = map.get(&Value::array(vec![Value::number(1.0)])).map(Value::to_string);
        assert_eq!(list.as_deref(), Some("list"));
        assert!(map.get(&Value::number(f64::NAN)).is_none());

        map.insert(Value::array(vec![Value::number(1.0)]), Value::Null);
        assert_eq!(map.len(), 3);
        let keys: Vec<String> = map.iter().map(|(k, _)| k.repr()).collect();
        assert_eq!(keys, vec!["0", "[1]", "'0'"]);
    }
}
