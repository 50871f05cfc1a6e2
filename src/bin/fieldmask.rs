//! Field Mask CLI
//!
//! Command-line interface for parsing field masks and applying them to JSON
//! documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use fieldmask::{
    extract_mask, includes_path, load_json_auto, mask_json, parse_fields, MaskContext,
    MaskParams, DEFAULT_EXCLUDES_NAME, DEFAULT_FIELDS_NAME,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fieldmask")]
#[command(about = "Apply partial-response field masks to JSON")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask a JSON document
    Apply {
        /// Document source: file path, `-` for stdin, or URL (http:// or https://)
        input: String,

        /// Fields to keep (e.g. title,author/username)
        #[arg(long, conflicts_with_all = ["excludes", "query"])]
        fields: Option<String>,

        /// Fields to drop (e.g. comments/body)
        #[arg(long, conflicts_with = "query")]
        excludes: Option<String>,

        /// Raw request query string to read the mask from
        #[arg(long)]
        query: Option<String>,

        /// Query parameter holding the include mask
        #[arg(long, env = "FIELDMASK_FIELDS_NAME", default_value = DEFAULT_FIELDS_NAME)]
        fields_name: String,

        /// Query parameter holding the exclude mask
        #[arg(long, env = "FIELDMASK_EXCLUDES_NAME", default_value = DEFAULT_EXCLUDES_NAME)]
        excludes_name: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the parsed tree of a mask as JSON
    Parse {
        /// Mask to parse
        spec: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check whether a dotted field path is selected by a mask
    Check {
        /// Dotted path (e.g. comments.author)
        path: String,

        /// Include mask
        #[arg(long, conflicts_with = "excludes", required_unless_present = "excludes")]
        fields: Option<String>,

        /// Exclude mask
        #[arg(long, conflicts_with = "fields", required_unless_present = "fields")]
        excludes: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Apply {
            input,
            fields,
            excludes,
            query,
            fields_name,
            excludes_name,
            output,
            pretty,
        } => {
            let params = MaskParams::new()
                .fields_name(fields_name)
                .excludes_name(excludes_name);
            build_context(fields, excludes, query.as_deref(), &params)
                .and_then(|ctx| run_apply(&input, &ctx, output, pretty))
        }

        Commands::Parse { spec, pretty } => run_parse(&spec, pretty),

        Commands::Check {
            path,
            fields,
            excludes,
        } => run_check(&path, fields, excludes),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr so stdout carries only JSON.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_context(
    fields: Option<String>,
    excludes: Option<String>,
    query: Option<&str>,
    params: &MaskParams,
) -> Result<MaskContext, u8> {
    if let Some(query) = query {
        return extract_mask(query, params).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        });
    }

    Ok(context_from_flags(fields, excludes))
}

fn context_from_flags(fields: Option<String>, excludes: Option<String>) -> MaskContext {
    match (fields, excludes) {
        (Some(fields), _) => MaskContext::including(parse_fields(fields.as_str())),
        (None, Some(excludes)) => MaskContext::excluding(parse_fields(excludes.as_str())),
        (None, None) => MaskContext::unmasked(),
    }
}

fn run_apply(
    source: &str,
    ctx: &MaskContext,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let document = load_json_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let masked = mask_json(&document, ctx);
    let json_output = to_json(&masked, pretty)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_parse(spec: &str, pretty: bool) -> Result<(), u8> {
    let tree = parse_fields(spec);
    let value = serde_json::to_value(&tree).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", to_json(&value, pretty)?);
    Ok(())
}

fn run_check(path: &str, fields: Option<String>, excludes: Option<String>) -> Result<(), u8> {
    let ctx = context_from_flags(fields, excludes);

    let included = match ctx.mask() {
        Some((tree, is_negated)) => includes_path(path, tree, is_negated),
        None => true,
    };

    if included {
        println!("included");
        Ok(())
    } else {
        println!("excluded");
        Err(1)
    }
}

fn to_json(value: &serde_json::Value, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}
