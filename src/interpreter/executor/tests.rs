use std::path::Path;

use pretty_assertions::assert_eq;

use super::Interpreter;
use crate::error::ErrorReporter;
use crate::output::Output;

/// Run `source` as a root module; returns (printed lines, reported errors).
fn run(source: &str) -> (Vec<String>, Vec<String>) {
    let out = Output::buffer();
    let err = Output::buffer();
    let mut interpreter = Interpreter::with_output(out.clone(), ErrorReporter::new(err.clone()));
    if let Some(statements) = interpreter.compile(source) {
        interpreter.interpret(Path::new("/test.sss"), &statements);
    }
    (out.lines(), err.lines())
}

fn printed(source: &str) -> Vec<String> {
    let (out, err) = run(source);
    assert!(err.is_empty(), "unexpected errors: {:?}", err);
    out
}

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(printed("print 1 + 1 * 2 / 2 - 1 + 1;"), vec!["2"]);
    assert_eq!(printed("print (1 + 1) * (2 / 2) - (1 + 1) * 2;"), vec!["-2"]);
    assert_eq!(printed("print 5 % -3;"), vec!["2"]);
    assert_eq!(printed("print 1 / 2;"), vec!["0.5"]);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        printed(r#"print "Hello" + " " + "World" + "!";"#),
        vec!["Hello World!"]
    );
}

#[test]
fn test_array_push_and_display() {
    assert_eq!(printed("var a=[1]; a.push(2); print a;"), vec!["[1, 2]"]);
    assert_eq!(printed("print [1, 'a', null];"), vec!["[1, 'a', null]"]);
}

#[test]
fn test_map_literal_display() {
    assert_eq!(printed("print {};"), vec!["{}"]);
    assert_eq!(
        printed("print {a: 1, b: 2, c: 3};"),
        vec!["{'a': 1, 'b': 2, 'c': 3}"]
    );
    assert_eq!(printed("var m = {a: 1}; m['b'] = 'x'; print m['b'];"), vec!["x"]);
}

#[test]
fn test_missing_argument_is_null() {
    assert_eq!(printed("function f(x){return x;} print f();"), vec!["null"]);
}

#[test]
fn test_functions_are_values() {
    let source = "
        function a(b) {
          return b;
        }

        function b() {
        }

        print a(b);
    ";
    assert_eq!(printed(source), vec!["<b function>"]);
}

#[test]
fn test_closures_capture_parameters() {
    let source = "
        function a(b) {
          function c() {
            return b;
          }
          return c;
        }
        print a('Hello World')();
    ";
    assert_eq!(printed(source), vec!["Hello World"]);
}

#[test]
fn test_block_scope_shadows_globals() {
    let source = "
      {
        var a = 1;
        var b = 2;
        var c = 3;
        print a + b + c;
      }
      var a = 4;
      var b = 5;
      var c = 6;
      print a + b + c;
    ";
    assert_eq!(printed(source), vec!["6", "15"]);
}

#[test]
fn test_global_redefinition_is_a_runtime_error() {
    let (out, err) = run("
        var a = 1;
        var a = 2;
        print a;
    ");
    assert!(out.is_empty());
    assert_eq!(
        err,
        vec!["[line 3] Error at 'a': Variable already exists with the name 'a'."]
    );
}

#[test]
fn test_local_redefinition_is_a_resolve_error() {
    let (out, err) = run("
        {
          var a = 2;
          var a = 3;
          print a;
        }
    ");
    assert!(out.is_empty());
    assert_eq!(
        err,
        vec!["[line 4] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn test_too_many_arguments() {
    let (_, err) = run("function f(a) {} f(1, 2);");
    assert_eq!(
        err,
        vec!["[line 1] Error at ')': Expected at most 1 arguments but got 2."]
    );
}

#[test]
fn test_operators_on_nulls() {
    assert_eq!(printed("print null == null; print null != null;"), vec!["true", "false"]);
    let (_, err) = run("print null < null;");
    assert_eq!(
        err,
        vec!["[line 1] Error at '<': Invalid binary operator on nulls."]
    );
}

#[test]
fn test_user_operator_overloading() {
    let source = "
        class V {
          init(n) { this.n = n; }
          __add__(other) { return V(this.n + other.n); }
        }
        print (V(1) + V(2)).n;
    ";
    assert_eq!(printed(source), vec!["3"]);
}

#[test]
fn test_class_and_instance_display() {
    assert_eq!(printed("class a {} print a;"), vec!["<a class>"]);
    assert_eq!(printed("class a {} print a();"), vec!["<a instance>"]);
    assert_eq!(
        printed("class a { init() { this.x = 1; } } print a();"),
        vec!["<a instance> x: 1"]
    );
}

#[test]
fn test_superclass_without_own_init_is_initialized_automatically() {
    let source = "
        class A { init() { this.a = 1; } }
        class B extends A { }
        print B().a;
    ";
    assert_eq!(printed(source), vec!["1"]);
}

#[test]
fn test_superclass_init_must_be_called() {
    let (_, err) = run("
        class A { init() { this.a = 1; } }
        class B extends A { init() { this.b = 2; } }
        B();
    ");
    assert_eq!(
        err,
        vec!["[line 4] Error at ')': Superclass 'A' not initialized"]
    );
}

#[test]
fn test_superclass_without_init_must_still_be_initialized() {
    let (out, err) = run("
        class A { }
        class B extends A { init() { } }
        var b = B();
        print 'ok';
    ");
    assert!(out.is_empty());
    assert_eq!(
        err,
        vec!["[line 4] Error at ')': Superclass 'A' not initialized"]
    );
}

#[test]
fn test_super_init_without_own_init_completes_slot() {
    let source = "
        class A { hello() { return 'hi'; } }
        class B extends A { init() { super(A).init(); this.b = 2; } }
        var b = B();
        print b.hello();
        print b.b;
    ";
    assert_eq!(printed(source), vec!["hi", "2"]);
}

#[test]
fn test_super_init_runs_inherited_initializer() {
    let source = "
        class Base { init() { this.base = 1; } }
        class A extends Base { }
        class B extends A { init() { super(A).init(); } }
        print B().base;
    ";
    assert_eq!(printed(source), vec!["1"]);
}

#[test]
fn test_auto_init_completes_superclasses_without_init() {
    let source = "
        class A { }
        class B { init() { this.b = 1; } }
        class C extends A, B { }
        print C().b;
    ";
    assert_eq!(printed(source), vec!["1"]);
}

#[test]
fn test_multiple_superclasses_initialized_by_name() {
    let source = "
        class A { init(x) { this.x = x; } }
        class B { init(y) { this.y = y; } }
        class C extends A, B {
          init() {
            super(A).init(1);
            super(B).init(2);
          }
        }
        var c = C();
        print c.x + c.y;
    ";
    assert_eq!(printed(source), vec!["3"]);
}

#[test]
fn test_builtin_superclass_backs_instance() {
    let source = "
        class Stack extends Array { }
        var s = Stack();
        s.push(1);
        s.push(2);
        print s.length();
    ";
    assert_eq!(printed(source), vec!["2"]);
}

#[test]
fn test_array_searches_itself() {
    let source = "
        var a = [[1]];
        print a.contains(a);
        a.push(a);
        print a.indexOf(a);
    ";
    assert_eq!(printed(source), vec!["false", "1"]);
}

#[test]
fn test_array_set_out_of_range() {
    let (_, err) = run("var a = [];\na.set(100000000000000000000, 1);");
    assert_eq!(err, vec!["[line 2] Error at ')': Index out of range."]);
}

#[test]
fn test_uncaught_throw() {
    let (out, err) = run("throw Error('This is a error');");
    assert!(out.is_empty());
    assert_eq!(err, vec!["[line 1] Error at 'throw': This is a error"]);
}

#[test]
fn test_catch_inside_function() {
    let source = "
      function throwError() {
        throw Error('This is a error');
      }
      try {
        throwError();
      } catch (e) {
        print(e.getMessage());
      }
    ";
    assert_eq!(printed(source), vec!["This is a error"]);
}

#[test]
fn test_rethrow_from_catch() {
    let (_, err) = run("
      try {
        throw Error('This is a error');
      } catch (e) {
        throw Error('This is a rethrown error');
      }
    ");
    assert_eq!(err, vec!["[line 5] Error at 'throw': This is a rethrown error"]);
}

#[test]
fn test_throw_error_subclass() {
    let (out, err) = run("
      class ThrowError extends Error {
        init(namespace) {
          super(Error).init('[' + namespace + '] This is a error');
        }
      }
      throw ThrowError('Domain');
    ");
    assert!(out.is_empty());
    assert_eq!(
        err,
        vec!["[line 7] Error at 'throw': [Domain] This is a error\n<ThrowError instance>"]
    );
}

#[test]
fn test_only_errors_can_be_thrown() {
    let (_, err) = run("throw 1;");
    assert_eq!(
        err,
        vec!["[line 1] Error at 'throw': Can only throw 'Error' instance, or instances that inherit the 'Error' class."]
    );
}

#[test]
fn test_finally_runs_after_catch() {
    let source = "
      try {
        throw Error('x');
      } catch (e) {
        print 'caught';
      } finally {
        print 'finally';
      }
    ";
    assert_eq!(printed(source), vec!["caught", "finally"]);
}

#[test]
fn test_runtime_errors_skip_catch_but_run_finally() {
    let (out, err) = run("try { nope; } catch (e) { print 'caught'; } finally { print 'finally'; }");
    assert_eq!(out, vec!["finally"]);
    assert_eq!(err, vec!["[line 1] Error at 'nope': Undefined variable 'nope'."]);
}

#[test]
fn test_return_inside_finally_wins() {
    let source = "
      function f() {
        try {
          return 1;
        } finally {
          return 2;
        }
      }
      print f();
    ";
    assert_eq!(printed(source), vec!["2"]);
}

#[test]
fn test_else_if_chain() {
    let source = "
      var n = 2;
      if (n == 1) { print 'one'; } else if (n == 2) { print 'two'; } else { print 'many'; }
    ";
    assert_eq!(printed(source), vec!["two"]);
}

#[test]
fn test_for_loop() {
    assert_eq!(
        printed("var s = 0; for (var i = 0; i < 4; i = i + 1) { s = s + i; } print s;"),
        vec!["6"]
    );
}

#[test]
fn test_lambda() {
    assert_eq!(printed("var add = (a, b) -> a + b; print add(1, 2);"), vec!["3"]);
}

#[test]
fn test_logger_writes_to_output() {
    assert_eq!(printed("Logger().log('hello');"), vec!["hello"]);
}

#[test]
fn test_definitions_survive_between_runs() {
    let out = Output::buffer();
    let mut interpreter = Interpreter::with_output(out.clone(), ErrorReporter::new(Output::buffer()));
    for source in ["var a = 1;", "print a + 1;"] {
        let statements = interpreter.compile(source).unwrap();
        interpreter.interpret(Path::new("/repl"), &statements);
    }
    assert_eq!(out.lines(), vec!["2"]);
}

#[test]
fn test_execution_stops_at_first_error() {
    let (out, err) = run("print 1; nope; print 2;");
    assert_eq!(out, vec!["1"]);
    assert_eq!(err.len(), 1);
}
