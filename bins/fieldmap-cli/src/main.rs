use clap::{Parser, Subcommand, ValueEnum};

use fieldmap::config::FieldmapConfig;
use fieldmap::{FieldMap, Value, ValueKind};

#[derive(Parser)]
#[command(name = "fieldmap", about = "Field map coercion toolkit")]
struct Cli {
    /// Path to TOML configuration file. Defaults apply when absent.
    #[arg(long, global = true, env = "FIELDMAP_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Coerce text into a scalar kind.
    Coerce {
        value: String,
        #[arg(long, value_enum)]
        to: Kind,
    },
    /// Interpret yes/no text as a boolean.
    YesNo { text: String },
    /// Parse a yyyyMMdd number into a date.
    ParseDate { num: i32 },
    /// Format a date as MM/dd/yyyy h:mm:ss tt.
    FormatDate { text: String },
    /// Parse key=value pairs into a JSON object.
    Pairs { text: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Bool,
    I32,
    I64,
    U64,
    F32,
    F64,
    Char,
    Str,
    Date,
    Datetime,
}

impl From<Kind> for ValueKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Bool => ValueKind::Bool,
            Kind::I32 => ValueKind::I32,
            Kind::I64 => ValueKind::I64,
            Kind::U64 => ValueKind::U64,
            Kind::F32 => ValueKind::F32,
            Kind::F64 => ValueKind::F64,
            Kind::Char => ValueKind::Char,
            Kind::Str => ValueKind::Str,
            Kind::Date => ValueKind::Date,
            Kind::Datetime => ValueKind::DateTime,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            tracing::debug!(config = %path, "loading configuration");
            match FieldmapConfig::load(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load config");
                    std::process::exit(1);
                }
            }
        }
        None => FieldmapConfig::default(),
    };

    match run(cli.command, &config) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            std::process::exit(1);
        }
    }
}

fn run(command: Command, config: &FieldmapConfig) -> fieldmap::Result<String> {
    match command {
        Command::Coerce { value, to } => {
            let kind = ValueKind::from(to);
            tracing::debug!(%value, %kind, "coercing");
            Value::Str(value).coerce(kind).map(|v| v.to_string())
        }
        Command::YesNo { text } => Ok(fieldmap::from_yes_no(Some(&text)).to_string()),
        Command::ParseDate { num } => fieldmap::parse_date(num).map(|d| Value::Date(d).to_string()),
        Command::FormatDate { text } => Ok(fieldmap::to_date_time_string(&Value::Str(text))),
        Command::Pairs { text } => {
            let map = FieldMap::parse_pairs(
                &text,
                config.pairs.separator,
                config.pairs.key_value_separator,
            )?;
            tracing::debug!(pairs = map.len(), "parsed pairs");
            Ok(map.to_json().to_string())
        }
    }
}
