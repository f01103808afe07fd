/// Verdict CLI.
/// Resolves a target method, runs the selected engine, prints score lines.

use clap::{Parser as ClapParser, ValueEnum};
use miette::{miette, IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use verdict::cases::{parse_input, InputValue};
use verdict::interpreter::DEFAULT_FUEL;
use verdict::symbolic::{self, SearchOrder, SearchSolver, SymConfig, TrustingSolver};
use verdict::{
    AbstractDomain, AbstractInterpreter, All, Bytecode, Executor, Frontend, Interpreter,
    Interval, JsonSuite, MethodId, Outcome, ParitySet, SignSet, State,
};

#[derive(ClapParser)]
#[command(
    name = "verdict",
    version,
    about = "Outcome analysis for JVM bytecode methods",
    long_about = "verdict — decide which runtime outcomes (ok, assertion error, divide by \
                  zero, out of bounds, null pointer, non-termination) a bytecode method \
                  can reach, and print one confidence line per outcome."
)]
struct Cli {
    /// Target method qualname: pkg.Class.method[:descriptor]
    target: Option<String>,

    /// Analysis engine
    #[arg(long, value_enum, default_value = "symbolic")]
    engine: EngineChoice,

    /// Abstract domain (abstract engine only)
    #[arg(long, value_enum, default_value = "all")]
    domain: DomainChoice,

    /// Case input literal, e.g. "(0, true)" or "([I:1,2,3], 4)"
    #[arg(long)]
    input: Option<String>,

    /// Directory of decoded bytecode documents (falls back to $VERDICT_SUITE)
    #[arg(long)]
    suite: Option<PathBuf>,

    /// Explore the symbolic worklist breadth-first
    #[arg(long)]
    bfs: bool,

    /// Skip path-feasibility checks (assume every path is reachable)
    #[arg(long)]
    no_solver: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print analyzer info and exit
    #[arg(long)]
    info: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineChoice {
    Symbolic,
    Abstract,
    Concrete,
    /// Syntactic opcode screens only — no execution
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DomainChoice {
    Sign,
    Parity,
    Interval,
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if cli.info {
        print_info();
        return Ok(());
    }

    let target = cli
        .target
        .as_deref()
        .ok_or_else(|| miette!("missing target: pkg.Class.method[:descriptor]"))?;
    let method = MethodId::parse(target).map_err(|e| miette!("{e}"))?;
    let input = match cli.input.as_deref() {
        Some(text) => Some(parse_input(text).map_err(|e| miette!("{e}"))?),
        None => None,
    };

    let suite_dir = cli
        .suite
        .clone()
        .or_else(|| std::env::var_os("VERDICT_SUITE").map(PathBuf::from))
        .ok_or_else(|| miette!("no bytecode suite: pass --suite DIR or set VERDICT_SUITE"))?;
    let code = Bytecode::new(Box::new(JsonSuite::new(suite_dir)));

    if cli.debug {
        match code.disassemble(&method) {
            Ok(listing) => tracing::debug!("\n{listing}"),
            Err(e) => tracing::debug!("no disassembly: {e}"),
        }
    }

    let observed = match cli.engine {
        EngineChoice::Concrete => run_concrete(&code, method, input.as_deref())?,
        EngineChoice::Abstract => run_abstract(&code, method, input.as_deref(), cli.domain)?,
        EngineChoice::Symbolic => run_symbolic(&code, method, &cli)?,
        EngineChoice::Baseline => verdict::baseline::run_screens(
            &code,
            &method,
            &verdict::baseline::default_screens(),
        )
        .map_err(|e| miette!("{e}"))?,
    };

    let stdout = std::io::stdout();
    verdict::scorer::write_scores(&mut stdout.lock(), &observed).into_diagnostic()?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Engines
// ----------------------------------------------------------------------------

fn run_concrete(
    code: &Bytecode,
    method: MethodId,
    input: Option<&[InputValue]>,
) -> Result<Vec<Outcome>> {
    // a missing input runs the method on all-zero arguments
    let defaults: Vec<InputValue> = method
        .descriptor
        .params
        .iter()
        .map(|ty| match ty {
            verdict::Type::Array(_) | verdict::Type::Ref => InputValue::Null,
            _ => InputValue::Int(0),
        })
        .collect();
    let args = input.unwrap_or(&defaults);

    let state = State::entry_with_arrays(Arc::new(method), args);
    let mut interp = Interpreter::new(code);
    let outcome = interp.run(state, DEFAULT_FUEL).map_err(|e| miette!("{e}"))?;
    Ok(vec![outcome])
}

fn run_abstract(
    code: &Bytecode,
    method: MethodId,
    input: Option<&[InputValue]>,
    domain: DomainChoice,
) -> Result<Vec<Outcome>> {
    fn go<D: AbstractDomain>(
        code: &Bytecode,
        method: MethodId,
        input: Option<&[InputValue]>,
    ) -> Result<Vec<Outcome>> {
        let args: Vec<D> = method
            .descriptor
            .params
            .iter()
            .enumerate()
            .map(|(i, _)| match input.and_then(|vals| vals.get(i)) {
                Some(InputValue::Int(n)) => D::abstract_value(*n),
                Some(InputValue::Bool(b)) => D::abstract_value(*b as i32),
                Some(InputValue::Char(c)) => D::abstract_value(*c as i32),
                // arrays and nulls have no numeric abstraction here
                _ => D::top(),
            })
            .collect();

        let interp = AbstractInterpreter::<D>::new(code);
        let report = interp.analyze(Arc::new(method), args).map_err(|e| miette!("{e}"))?;
        tracing::info!("abstract classification: {}", report.classification());
        if report.finals.is_empty() {
            // nothing terminal was ever reached: non-termination
            Ok(vec![Outcome::Diverges])
        } else {
            Ok(report.finals)
        }
    }

    match domain {
        DomainChoice::Sign => go::<SignSet>(code, method, input),
        DomainChoice::Parity => go::<ParitySet>(code, method, input),
        DomainChoice::Interval => go::<Interval>(code, method, input),
        DomainChoice::All => go::<All>(code, method, input),
    }
}

fn run_symbolic(code: &Bytecode, method: MethodId, cli: &Cli) -> Result<Vec<Outcome>> {
    let method = Arc::new(method);
    let frontend = Frontend::new(code, Arc::clone(&method));
    let initial = frontend.initial_state();

    let config = SymConfig {
        order: if cli.bfs { SearchOrder::Bfs } else { SearchOrder::Dfs },
        use_solver: !cli.no_solver,
        ..SymConfig::default()
    };
    let solver: Box<dyn symbolic::Solver> = if cli.no_solver {
        Box::new(TrustingSolver)
    } else {
        Box::new(SearchSolver::default())
    };

    let executor = Executor::new(frontend, config, solver);
    let findings = executor.run(initial).map_err(|e| miette!("{e}"))?;

    if std::env::var("SE_JSON").as_deref() == Ok("1") {
        let stdout = std::io::stdout();
        symbolic::export::emit(&mut stdout.lock(), &method, &findings).into_diagnostic()?;
    }

    Ok(findings.iter().map(|f| f.kind).collect())
}

// ----------------------------------------------------------------------------
// Info & logging
// ----------------------------------------------------------------------------

fn print_info() {
    println!("verdict");
    println!("{}", env!("CARGO_PKG_VERSION"));
    println!("verdict");
    println!("concrete,abstract,symbolic,baseline");
    println!("{} {}", std::env::consts::OS, std::env::consts::ARCH);
    let _ = std::io::stdout().flush();
}

fn setup_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("VERDICT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
