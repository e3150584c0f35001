use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cnfrs::cnf::Cnf;
use cnfrs::manager::options::{CnfOptions, Definitions};
use cnfrs::manager::{FormulaManager, Statistics};
use cnfrs::parser;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    None,
}

impl LogLevel {
    fn to_trace(&self) -> Option<tracing::Level> {
        Some(match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::None => return None,
        })
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the file with the propositional formula
    #[arg(value_name = "FORMULA")]
    input: PathBuf,

    /// Where to store the CNF in DIMACS format. Printed to stdout if omitted
    #[arg(value_name = "FILE.cnf")]
    cnf_path: Option<PathBuf>,

    /// Where to store the mapping of atoms to DIMACS variables
    #[arg(value_name = "FILE.sym")]
    symbol_table_path: Option<PathBuf>,

    /// Encode the formula as parsed, without collapsing chains of '&' and '|'
    #[arg(long)]
    no_flatten: bool,

    /// Which directions of the Tseitin definitions to emit.
    #[arg(long, value_enum, default_value_t = Definitions::Polarity)]
    definitions: Definitions,

    /// Print the parsed formula to the stderr.
    #[arg(short = 'f', long)]
    print_formula: bool,

    /// Print timing and size statistics to the stderr.
    #[arg(short, long)]
    print_statistics: bool,

    /// Verbosity level. See `tracing::Level` for more information.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    verbosity: LogLevel,
}

#[derive(Debug, Clone, Default)]
struct RunStatistics {
    parsing: Option<Duration>,
    compilation: Option<Duration>,
    manager: Option<Statistics>,
    variables: Option<usize>,
    clauses: Option<usize>,
}

impl RunStatistics {
    fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if let Some(parsing) = self.parsing {
            writeln!(out, "parsing time    : {parsing:.2?}")?;
        }
        if let Some(compilation) = self.compilation {
            writeln!(out, "compilation time: {compilation:.2?}")?;
        }
        if let Some(variables) = self.variables {
            writeln!(out, "#Variables: {variables}")?;
        }
        if let Some(clauses) = self.clauses {
            writeln!(out, "#Clauses: {clauses}")?;
        }
        if let Some(manager) = &self.manager {
            writeln!(out, "{manager}")?;
        }

        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(level) = args.verbosity.to_trace() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(level)
            .init();
    }

    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("could not read formula from '{}'", args.input.display()))?;

    let options = CnfOptions::builder()
        .flatten(!args.no_flatten)
        .definitions(args.definitions)
        .build();
    let manager = FormulaManager::new(options);
    let mut statistics = RunStatistics::default();

    let parsing_start = Instant::now();
    let formula = parser::parse(&manager, &source)
        .with_context(|| format!("could not parse '{}'", args.input.display()))?;
    statistics.parsing = Some(parsing_start.elapsed());

    if args.print_formula {
        eprintln!("{}", manager.display(formula));
    }

    let compilation_start = Instant::now();
    let cnf = manager
        .to_cnf(formula)
        .context("could not encode the formula to CNF")?;
    statistics.compilation = Some(compilation_start.elapsed());
    statistics.variables = Some(cnf.variables());
    statistics.clauses = Some(cnf.clauses().len());
    statistics.manager = Some(manager.statistics());

    write_cnf(args.cnf_path.as_deref(), &cnf)?;

    if let Some(path) = args.symbol_table_path.as_deref() {
        write_to_file(path, |writer| manager.write_symbol_table(writer))?;
    }

    if args.print_statistics {
        statistics.print(&mut std::io::stderr())?;
    }

    Ok(())
}

fn write_cnf(path: Option<&Path>, cnf: &Cnf) -> Result<()> {
    match path {
        Some(path) => write_to_file(path, |writer| cnf.write_dimacs(writer)),
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            cnf.write_dimacs(&mut writer)?;
            writer.flush()?;
            Ok(())
        }
    }
}

fn write_to_file(
    path: &Path,
    writer: impl Fn(&mut dyn std::io::Write) -> std::io::Result<()>,
) -> Result<()> {
    let f = File::create(path).with_context(|| format!("could not create '{}'", path.display()))?;
    let mut b = BufWriter::new(f);
    writer(&mut b as &mut dyn std::io::Write)
        .and_then(|()| b.flush())
        .with_context(|| format!("could not write '{}'", path.display()))
}
