//! tabset CLI - render table markup to LaTeX or OpenDocument

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use tabset::{render_document, NoteSymbolStyle, OutputFormat, RenderOptions, RenderWarning};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tabset")]
#[command(version)]
#[command(about = "tabset - render table markup to booktabs LaTeX or OpenDocument", long_about = None)]
struct Cli {
    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Latex)]
    format: Format,

    /// Strict mode: fail on invalid column definitions and exit with an error
    /// if any table cannot be rendered
    #[arg(long)]
    strict: bool,

    /// Fraction of the text width used by tables without their own width
    #[arg(long, default_value_t = 0.8)]
    total_width: f64,

    /// Heading level tables are numbered within (0 numbers consecutively)
    #[arg(long, default_value_t = 1)]
    number_within: usize,

    /// Symbol set for numbered table notes
    #[arg(long, value_enum, default_value_t = NoteSymbols::Lion)]
    note_symbols: NoteSymbols,

    /// Quiet mode: suppress warning output to stderr
    #[arg(short, long)]
    quiet: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, ValueEnum)]
enum Format {
    /// booktabs LaTeX
    Latex,
    /// OpenDocument content.xml
    Odt,
}

#[cfg(feature = "cli")]
#[derive(Clone, ValueEnum)]
enum NoteSymbols {
    Chicago,
    Lion,
    Bringhurst,
    Wiley,
}

#[cfg(feature = "cli")]
impl From<NoteSymbols> for NoteSymbolStyle {
    fn from(symbols: NoteSymbols) -> Self {
        match symbols {
            NoteSymbols::Chicago => NoteSymbolStyle::Chicago,
            NoteSymbols::Lion => NoteSymbolStyle::Lion,
            NoteSymbols::Bringhurst => NoteSymbolStyle::Bringhurst,
            NoteSymbols::Wiley => NoteSymbolStyle::Wiley,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    // Read input
    let input = match cli.input_file {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let options = RenderOptions {
        ignore_errors: !cli.strict,
        total_width: cli.total_width,
        number_within: cli.number_within,
        note_symbols: cli.note_symbols.clone().into(),
        ..RenderOptions::default()
    };
    let format = match cli.format {
        Format::Latex => OutputFormat::Latex,
        Format::Odt => OutputFormat::Odt,
    };

    let result = match render_document(&input, format, options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Print warnings to stderr (unless quiet mode)
    if !cli.quiet && !result.warnings.is_empty() {
        print_warnings_to_stderr(&result.warnings);
    }

    // Check strict mode
    if cli.strict && result.failed_tables > 0 {
        eprintln!(
            "Error: {} table(s) could not be rendered in strict mode",
            result.failed_tables
        );
        std::process::exit(1);
    }

    // Output
    match cli.output {
        Some(path) => {
            let mut file = fs::File::create(&path)?;
            writeln!(file, "{}", result.output)?;
            if result.warnings.is_empty() {
                eprintln!("✓ Output written to: {}", path);
            } else {
                eprintln!(
                    "⚠ Output written to: {} ({} warning(s))",
                    path,
                    result.warnings.len()
                );
            }
        }
        None => {
            println!("{}", result.output);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_warnings_to_stderr(warnings: &[RenderWarning]) {
    eprintln!();
    eprintln!("⚠ {} warning(s):", warnings.len());
    for warning in warnings {
        eprintln!("  {}", warning);
    }
    eprintln!();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tabset --features cli");
    eprintln!("  tabset [OPTIONS] [INPUT_FILE]");
}
