//! Interpreter benchmarks for TripleS.

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use triples::error::ErrorReporter;
use triples::interpreter::Interpreter;
use triples::lexer::Scanner;
use triples::output::Output;
use triples::parser::Parser;

const FIB_ITERATIVE: &str = "
function fib(n) {
  var a = 0;
  var b = 1;
  for (var i = 0; i < n; i = i + 1) {
    var t = a + b;
    a = b;
    b = t;
  }
  return a;
}
print fib(30);
";

const LOOP_SUM: &str = "
var sum = 0;
for (var i = 0; i < 10000; i = i + 1) {
  sum = sum + i;
}
print sum;
";

const ARRAY_OPS: &str = "
var a = [];
for (var i = 0; i < 1000; i = i + 1) {
  a.push(i);
}
var total = 0;
while (!a.isEmpty()) {
  total = total + a.pop();
}
print total;
";

const CLASS_OPS: &str = "
class Counter {
  init() { this.count = 0; }
  increment() { this.count = this.count + 1; }
}
class Named extends Counter {
  init(name) {
    super(Counter).init();
    this.name = name;
  }
}
var c = Named('bench');
for (var i = 0; i < 1000; i = i + 1) {
  c.increment();
}
print c.count;
";

const STRING_OPS: &str = "
var s = '';
for (var i = 0; i < 500; i = i + 1) {
  s = s + 'x';
}
print s.length();
";

/// Run a TripleS program from source code, discarding its output.
fn run_program(source: &str) {
    let mut interpreter = Interpreter::with_output(Output::buffer(), ErrorReporter::new(Output::buffer()));
    let statements = interpreter.compile(source).expect("compile error");
    interpreter.interpret(Path::new("/bench.sss"), &statements);
    assert!(!interpreter.reporter().had_error(), "runtime error");
}

fn fibonacci_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("fibonacci");

    group.bench_function("iterative_fib30", |b| {
        b.iter(|| run_program(black_box(FIB_ITERATIVE)))
    });

    group.finish();
}

fn loop_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("loops");

    group.bench_function("sum_10000", |b| b.iter(|| run_program(black_box(LOOP_SUM))));

    group.finish();
}

fn collection_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("collections");

    group.bench_function("array_ops_1000", |b| {
        b.iter(|| run_program(black_box(ARRAY_OPS)))
    });

    group.finish();
}

fn oop_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("oop");

    group.bench_function("class_method_1000", |b| {
        b.iter(|| run_program(black_box(CLASS_OPS)))
    });

    group.finish();
}

fn string_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    group.bench_function("string_concat_500", |b| {
        b.iter(|| run_program(black_box(STRING_OPS)))
    });

    group.finish();
}

/// Benchmark parsing only (no execution).
fn parsing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    group.bench_function("parse_class_program", |b| {
        b.iter(|| {
            let tokens = Scanner::new(black_box(CLASS_OPS)).scan_tokens().unwrap();
            Parser::new(tokens).parse().unwrap()
        })
    });

    group.finish();
}

/// Parameterized fibonacci benchmark for different N values.
fn fibonacci_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("fib_scaling");

    for n in [10, 15, 20].iter() {
        let source = format!(
            r#"
function fib(n) {{
  if (n <= 1) return n;
  return fib(n - 1) + fib(n - 2);
}}
var result = fib({});
"#,
            n
        );

        group.bench_with_input(BenchmarkId::new("recursive", n), &source, |b, src| {
            b.iter(|| run_program(black_box(src)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    fibonacci_benchmarks,
    loop_benchmarks,
    collection_benchmarks,
    oop_benchmarks,
    string_benchmarks,
    parsing_benchmarks,
    fibonacci_scaling,
);

criterion_main!(benches);
