//! TripleS CLI: run a file, evaluate a snippet or start the REPL.

use std::env;
use std::path::Path;
use std::process;
use std::sync::Once;

use triples::error::TriplesError;
use triples::repl::Repl;
use triples::session::Session;

const VERSION: &str = env!("CARGO_PKG_VERSION");

static TRACING_INIT: Once = Once::new();

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Evaluate a string
    Eval { code: String },
    /// Start the REPL
    Repl,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    verbose: bool,
}

fn print_usage() {
    eprintln!("TripleS {} - TripleS Interpreter", VERSION);
    eprintln!();
    eprintln!("Usage: triples [options] [script.sss]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --path <file>   Run a script file");
    eprintln!("  -e <code>           Evaluate code");
    eprintln!("  -v, --verbose       Log module loading (RUST_LOG overrides)");
    eprintln!("  -h, --help          Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  triples                   Start interactive REPL");
    eprintln!("  triples index.sss         Run a script file");
    eprintln!("  triples -p index.sss      Run a script file");
    eprintln!("  triples -e 'print 1 + 1;' Evaluate code directly");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options {
        command: Command::Repl,
        verbose: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--verbose" | "-v" => options.verbose = true,
            "--path" | "-p" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("{} requires a file", arg);
                    print_usage();
                    process::exit(64);
                }
                set_file(&mut options, &args[i]);
            }
            "-e" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-e requires a code argument");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Eval {
                    code: args[i].clone(),
                };
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => set_file(&mut options, arg),
        }
        i += 1;
    }

    options
}

fn set_file(options: &mut Options, file: &str) {
    if let Command::Run { .. } = options.command {
        eprintln!("Only one script file can be specified");
        print_usage();
        process::exit(64);
    }
    options.command = Command::Run {
        file: file.to_string(),
    };
}

/// Install the log subscriber when `RUST_LOG` is set or `--verbose` was passed.
fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("triples=debug")
        } else {
            return;
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    });
}

fn main() {
    let options = parse_args();
    init_tracing(options.verbose);

    match &options.command {
        Command::Repl => run_repl(),
        Command::Run { file } => run_file(file),
        Command::Eval { code } => run_eval(code),
    }
}

fn exit_on_error(result: Result<(), TriplesError>) {
    match result {
        Ok(()) => {}
        Err(TriplesError::Compile) => process::exit(65),
        Err(TriplesError::Runtime) => process::exit(70),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(66);
        }
    }
}

fn run_file(path: &str) {
    exit_on_error(Session::new().run_file(Path::new(path)));
}

fn run_eval(code: &str) {
    exit_on_error(Session::new().run(code));
}

fn run_repl() {
    if let Err(e) = Repl::new().run() {
        eprintln!("Error: {}", e);
        process::exit(74);
    }
}
