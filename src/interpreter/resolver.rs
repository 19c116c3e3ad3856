//! Static scope resolution.
//!
//! A pre-pass over one module that records, for every variable reference that is
//! not a global, how many scopes lie between the use and the declaration. The
//! interpreter creates exactly one frame per resolver scope, so the recorded
//! distance is the number of `enclosing` hops to take at runtime.

use std::collections::HashMap;

use ahash::AHashMap;

use crate::ast::*;
use crate::error::ResolveError;
use crate::lexer::Token;

/// Distance side-table produced for one module.
pub type Locals = AHashMap<ExprId, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver {
    /// name -> "is defined" (false while the initializer is being resolved)
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionKind,
    current_class: ClassKind,
    locals: Locals,
    errors: Vec<ResolveError>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            locals: Locals::default(),
            errors: Vec::new(),
        }
    }

    /// Resolve a whole module. Every error is collected before giving up.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<Locals, Vec<ResolveError>> {
        self.resolve_statements(statements);
        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            Err(self.errors)
        }
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.errors
                        .push(ResolveError::TopLevelReturn(keyword.clone()));
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.errors
                            .push(ResolveError::ReturnFromInitializer(keyword.clone()));
                    }
                    self.resolve_expr(value);
                }
            }

            Stmt::Class(class) => self.resolve_class(class),

            Stmt::Import(import) => {
                for item in &import.items {
                    self.declare(item.binding());
                    self.define(item.binding());
                }
            }

            Stmt::Export(inner) => self.resolve_stmt(inner),

            Stmt::Throw { value, .. } => self.resolve_expr(value),

            Stmt::Try(decl) => {
                self.begin_scope();
                self.resolve_statements(&decl.try_block);
                self.end_scope();

                if let Some(catch_block) = &decl.catch_block {
                    self.begin_scope();
                    if let Some(param) = &decl.catch_param {
                        self.declare(param);
                        self.define(param);
                    }
                    self.resolve_statements(catch_block);
                    self.end_scope();
                }

                if let Some(finally_block) = &decl.finally_block {
                    self.begin_scope();
                    self.resolve_statements(finally_block);
                    self.end_scope();
                }
            }
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(&class.name);
        self.define(&class.name);

        let has_superclass = !class.superclasses.is_empty();
        if has_superclass {
            self.current_class = ClassKind::Subclass;

            for superclass in &class.superclasses {
                if let ExprKind::Variable(name) = &superclass.kind {
                    if name.lexeme == class.name.lexeme {
                        self.errors
                            .push(ResolveError::InheritsFromItself(name.clone()));
                    }
                }
                self.resolve_expr(superclass);
            }

            self.begin_scope();
            let scope = self.innermost();
            scope.insert("super".to_string(), true);
            for superclass in &class.superclasses {
                if let ExprKind::Variable(name) = &superclass.kind {
                    scope.insert(super_binding(&name.lexeme), true);
                }
            }
        }

        self.begin_scope();
        self.innermost().insert("this".to_string(), true);

        for method in &class.methods {
            let kind = if method.name.lexeme == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();
        if has_superclass {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}

            ExprKind::Variable(name) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.errors
                            .push(ResolveError::ReadInOwnInitializer(name.clone()));
                    }
                }
                self.resolve_local(expr.id, name);
            }

            ExprKind::Assign { name, value } => {
                self.resolve_expr(value);
                self.resolve_local(expr.id, name);
            }

            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            ExprKind::Unary { right, .. } => self.resolve_expr(right),

            ExprKind::Grouping(inner) => self.resolve_expr(inner),

            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            ExprKind::Get { object, .. } => self.resolve_expr(object),

            ExprKind::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            ExprKind::GetItem { object, index, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }

            ExprKind::SetItem {
                object,
                index,
                value,
                ..
            } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
                self.resolve_expr(value);
            }

            ExprKind::This(keyword) => {
                if self.current_class == ClassKind::None {
                    self.errors
                        .push(ResolveError::ThisOutsideClass(keyword.clone()));
                    return;
                }
                self.resolve_local(expr.id, keyword);
            }

            ExprKind::Super { keyword, .. } => {
                match self.current_class {
                    ClassKind::None => self
                        .errors
                        .push(ResolveError::SuperOutsideClass(keyword.clone())),
                    ClassKind::Class => self
                        .errors
                        .push(ResolveError::SuperWithoutSuperclass(keyword.clone())),
                    ClassKind::Subclass => {}
                }
                self.resolve_local(expr.id, keyword);
            }

            ExprKind::Array(elements) => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }

            ExprKind::Map(entries) => {
                for (_, value) in entries {
                    self.resolve_expr(value);
                }
            }

            ExprKind::Lambda(decl) => self.resolve_function(decl, FunctionKind::Function),
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        let innermost = self.scopes.len();
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, innermost - 1 - i);
                return;
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn innermost(&mut self) -> &mut HashMap<String, bool> {
        if self.scopes.is_empty() {
            self.begin_scope();
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.errors
                .push(ResolveError::DuplicateInScope(name.clone()));
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
}

/// Name under which a class body sees one of its direct superclasses.
pub fn super_binding(class_name: &str) -> String {
    format!("super({})", class_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn resolve(source: &str) -> Result<Locals, Vec<ResolveError>> {
        Resolver::new().resolve(&parse(source))
    }

    fn messages(source: &str) -> Vec<String> {
        resolve(source)
            .unwrap_err()
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    /// Distances recorded for every reference to `name`, in source order.
    fn distances_of(stmts: &[Stmt], locals: &Locals, name: &str) -> Vec<Option<usize>> {
        fn walk_stmt(stmt: &Stmt, locals: &Locals, name: &str, out: &mut Vec<Option<usize>>) {
            match stmt {
                Stmt::Expression(e) | Stmt::Print(e) => walk_expr(e, locals, name, out),
                Stmt::Var {
                    initializer: Some(e),
                    ..
                } => walk_expr(e, locals, name, out),
                Stmt::Block(stmts) => stmts.iter().for_each(|s| walk_stmt(s, locals, name, out)),
                Stmt::Function(decl) => decl
                    .body
                    .iter()
                    .for_each(|s| walk_stmt(s, locals, name, out)),
                Stmt::Return { value: Some(e), .. } => walk_expr(e, locals, name, out),
                Stmt::While { condition, body } => {
                    walk_expr(condition, locals, name, out);
                    walk_stmt(body, locals, name, out);
                }
                _ => {}
            }
        }
        fn walk_expr(expr: &Expr, locals: &Locals, name: &str, out: &mut Vec<Option<usize>>) {
            match &expr.kind {
                ExprKind::Variable(t) | ExprKind::Assign { name: t, .. } if t.lexeme == name => {
                    out.push(locals.get(&expr.id).copied())
                }
                ExprKind::Binary { left, right, .. } => {
                    walk_expr(left, locals, name, out);
                    walk_expr(right, locals, name, out);
                }
                ExprKind::Call {
                    callee, arguments, ..
                } => {
                    walk_expr(callee, locals, name, out);
                    arguments.iter().for_each(|a| walk_expr(a, locals, name, out));
                }
                _ => {}
            }
        }
        let mut out = Vec::new();
        stmts.iter().for_each(|s| walk_stmt(s, locals, name, &mut out));
        out
    }

    #[test]
    fn test_globals_are_unannotated() {
        let stmts = parse("var a = 1; print a;");
        let locals = Resolver::new().resolve(&stmts).unwrap();
        assert_eq!(distances_of(&stmts, &locals, "a"), vec![None]);
    }

    #[test]
    fn test_distance_counts_scopes() {
        let stmts = parse("{ var a = 1; { { print a; } } print a; }");
        let locals = Resolver::new().resolve(&stmts).unwrap();
        assert_eq!(distances_of(&stmts, &locals, "a"), vec![Some(2), Some(0)]);
    }

    #[test]
    fn test_closure_distance() {
        let stmts = parse("function outer(x) { function inner() { return x; } return inner; }");
        let locals = Resolver::new().resolve(&stmts).unwrap();
        // `x` from inside `inner`: inner's scope, then outer's.
        assert_eq!(distances_of(&stmts, &locals, "x"), vec![Some(1)]);
    }

    #[test]
    fn test_duplicate_in_scope() {
        assert_eq!(
            messages("{ var a = 1; var a = 2; }"),
            vec!["Already a variable with this name in this scope."]
        );
        // Globals are checked at runtime instead.
        assert!(resolve("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_eq!(
            messages("{ var a = a; }"),
            vec!["Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_contextual_keyword_errors() {
        assert_eq!(messages("return 1;"), vec!["Can't return from top-level code."]);
        assert_eq!(
            messages("class A { init() { return 1; } }"),
            vec!["Can't return a value from an initializer."]
        );
        assert_eq!(
            messages("print this;"),
            vec!["Can't use 'this' outside of a class."]
        );
        assert_eq!(
            messages("function f() { super(A).x(); }"),
            vec!["Can't use 'super' outside of a class."]
        );
        assert_eq!(
            messages("class A { f() { super(A).x(); } }"),
            vec!["Can't use 'super' in a class with no superclass."]
        );
        assert_eq!(
            messages("class A extends A {}"),
            vec!["A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let errors = messages("return 1; print this; { var b = 1; var b = 2; }");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_super_and_this_distances() {
        let stmts = parse("class B extends A { f() { return super(A).g(); } }");
        let locals = Resolver::new().resolve(&stmts).unwrap();
        let Stmt::Class(class) = &stmts[0] else {
            panic!("Expected class")
        };
        let Stmt::Return {
            value: Some(value), ..
        } = &class.methods[0].body[0]
        else {
            panic!("Expected return")
        };
        let ExprKind::Call { callee, .. } = &value.kind else {
            panic!("Expected call")
        };
        // function scope -> this scope -> super scope
        assert_eq!(locals.get(&callee.id), Some(&2));
    }

    #[test]
    fn test_empty_return_in_initializer_is_allowed() {
        assert!(resolve("class A { init() { return; } }").is_ok());
    }
}
