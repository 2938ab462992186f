// Datalines CLI - turn a database table into a self-contained DATA step program

mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use datalines_config::Settings;
use datalines_core::naming::default_output_name;
use datalines_core::{ConvertError, DataSourceError, DatasetConverter, TableRef};
use datalines_io::{encode_program, resolve_output_path, write_program, OutputEncoding, SqliteSource};

use exit_codes::{convert_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "datalines")]
#[command(about = "Generate SAS DATA step programs that carry their data inline (DATALINES4)")]
#[command(version)]
struct Cli {
    /// Settings file [default: <config dir>/datalines/settings.json]
    #[arg(long, global = true, env = "DATALINES_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log queries and counts (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress the conversion summary on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the full program, every row included
    #[command(after_help = "\
Examples:
  datalines generate shop.db orders > orders.sas
  datalines generate shop.db main.orders -o out/
  datalines generate shop.db arch.orders --attach arch=archive.db --out-name WORK.OLD_ORDERS")]
    Generate {
        /// SQLite database file
        db: PathBuf,

        /// Table to convert, as LIB.MEMBER or MEMBER
        table: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output data set name [default: WORK.<LIB>_<MEMBER>]
        #[arg(long, value_name = "NAME")]
        out_name: Option<String>,

        /// Write to this file, or <member>.sas inside this directory (default: stdout)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Write ASCII only; other characters become '?'
        #[arg(long)]
        ascii: bool,
    },

    /// Print the program header without data values
    Preview {
        /// SQLite database file
        db: PathBuf,

        /// Table to convert, as LIB.MEMBER or MEMBER
        table: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output data set name [default: WORK.<LIB>_<MEMBER>]
        #[arg(long, value_name = "NAME")]
        out_name: Option<String>,
    },

    /// Print the default output data set name for a table
    DefaultName {
        /// Table, as LIB.MEMBER or MEMBER
        table: String,

        /// Library of the output data set [default: output.library setting]
        #[arg(long)]
        library: Option<String>,
    },

    /// Show the settings file location and effective settings
    Config {
        /// Write a commented default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Expose another database file as library LIB (repeatable)
    #[arg(long = "attach", value_name = "LIB=PATH")]
    attach: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);

    let result = match cli.command {
        Commands::Generate { db, table, source, out_name, output, ascii } => {
            cmd_generate(&settings, db, &table, source, out_name, output, ascii, cli.quiet)
        }
        Commands::Preview { db, table, source, out_name } => {
            cmd_preview(&settings, db, &table, source, out_name)
        }
        Commands::DefaultName { table, library } => cmd_default_name(&settings, &table, library),
        Commands::Config { init } => cmd_config(&settings, config_path, init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Create error from a conversion failure with the matching exit code.
    pub fn convert(err: ConvertError) -> Self {
        let code = convert_exit_code(&err);
        let hint = match &err {
            ConvertError::EmptySchema(_) => {
                Some("check the table name; tables in attached files need LIB.MEMBER".to_string())
            }
            ConvertError::Source(DataSourceError::Open(_)) => {
                Some("is the file a readable SQLite database?".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

fn parse_table(arg: &str, settings: &Settings) -> Result<TableRef, CliError> {
    TableRef::parse(arg, &settings.default_library).ok_or_else(|| {
        CliError::usage(format!("invalid table name '{}'", arg)).with_hint("use LIB.MEMBER or MEMBER")
    })
}

fn parse_attach(arg: &str) -> Result<(String, PathBuf), CliError> {
    match arg.split_once('=') {
        Some((lib, path)) if !lib.trim().is_empty() && !path.trim().is_empty() => {
            Ok((lib.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(CliError::usage(format!("invalid --attach value '{}'", arg))
            .with_hint("expected LIB=PATH, e.g. --attach arch=archive.db")),
    }
}

fn open_source(db: PathBuf, args: &SourceArgs) -> Result<SqliteSource, CliError> {
    let mut source = SqliteSource::open(db);
    for arg in &args.attach {
        let (library, path) = parse_attach(arg)?;
        source = source.attach(library, path);
    }
    Ok(source)
}

fn output_name(out_name: Option<String>, table: &TableRef, settings: &Settings) -> String {
    out_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_output_name(table, &settings.output_library))
}

// ============================================================================
// generate
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    settings: &Settings,
    db: PathBuf,
    table_arg: &str,
    source_args: SourceArgs,
    out_name: Option<String>,
    output: Option<PathBuf>,
    ascii: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let table = parse_table(table_arg, settings)?;
    let source = open_source(db, &source_args)?;
    let out_name = output_name(out_name, &table, settings);

    let encoding = if ascii {
        OutputEncoding::Ascii
    } else {
        OutputEncoding::from_preserve(settings.preserve_encoding)
    };

    log::debug!("converting {} from {} as {}", table, source.path().display(), out_name);
    let mut converter = DatasetConverter::new(table.clone());
    let program = converter.generate_full(&source, &out_name).map_err(CliError::convert)?;

    match output {
        Some(target) => {
            let path = resolve_output_path(&target, &table);
            write_program(&program, &path, encoding).map_err(CliError::io)?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&encode_program(&program, encoding))
                .and_then(|_| handle.flush())
                .map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    if !quiet {
        match (converter.column_count(), converter.row_count()) {
            (Some(columns), Some(rows)) => {
                eprintln!("NOTE: Converted {} columns and {} rows.", columns, rows);
            }
            _ => eprintln!(
                "WARNING: Data rows for {} could not be read; see the comment in the data block.",
                converter.table()
            ),
        }
    }

    Ok(())
}

// ============================================================================
// preview
// ============================================================================

fn cmd_preview(
    settings: &Settings,
    db: PathBuf,
    table_arg: &str,
    source_args: SourceArgs,
    out_name: Option<String>,
) -> Result<(), CliError> {
    let table = parse_table(table_arg, settings)?;
    let source = open_source(db, &source_args)?;
    let out_name = output_name(out_name, &table, settings);

    let mut converter = DatasetConverter::new(table);
    let preview = converter.generate_header_only(&source, &out_name).map_err(CliError::convert)?;

    // The preview ends at `;;;;`; finish the terminal line
    println!("{}", preview);
    io::stdout().flush().map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// default-name / config
// ============================================================================

fn cmd_default_name(settings: &Settings, table_arg: &str, library: Option<String>) -> Result<(), CliError> {
    let table = parse_table(table_arg, settings)?;
    let library = library.unwrap_or_else(|| settings.output_library.clone());
    println!("{}", default_output_name(&table, &library));
    Ok(())
}

fn cmd_config(settings: &Settings, path: PathBuf, init: bool) -> Result<(), CliError> {
    if init {
        let created = Settings::init_at(&path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        if !created {
            eprintln!("note: {} already exists", path.display());
        }
    }

    println!("{}", path.display());
    println!("{}", settings.to_pretty_json().map_err(CliError::io)?);
    Ok(())
}
