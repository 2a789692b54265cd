//! jflow CLI - JSON message services from the command line
//!
//! This binary drives the jflow services over files:
//! - split: stream a JSON array into NDJSON lines or per-element files
//! - query: evaluate a JSONPath expression
//! - validate: check a document against a JSON Schema
//! - patch: apply an RFC 6902 patch
//! - diff: generate an RFC 6902 patch between two documents
//! - merge: apply an RFC 7386 merge patch

use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use jflow_core::{Message, Service};
use jflow_services::{
    JsonDiffService, JsonPatchService, JsonPathService, MergeService, PathMapping,
    SchemaValidationService,
};
use jflow_streams::JsonArrayStream;

#[derive(Parser)]
#[command(name = "jflow")]
#[command(about = "JSON message services CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a JSON array into NDJSON on stdout or one file per element
    ///
    /// Examples:
    ///   jflow split batch.json
    ///   jflow split batch.json --output-dir parts/ --buffer-size 65536
    Split {
        /// Input file (JSON array)
        input: PathBuf,
        /// Write one file per element into this directory instead of stdout
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Read-ahead buffer size in bytes
        #[arg(long, default_value = "8192")]
        buffer_size: usize,
    },
    /// Evaluate a JSONPath expression against a document
    ///
    /// Examples:
    ///   jflow query data.json --path '$.items[*].id'
    Query {
        /// Input file (JSON document)
        input: PathBuf,
        /// JSONPath expression
        #[arg(long)]
        path: String,
    },
    /// Validate a document against a JSON Schema
    Validate {
        /// Input file (JSON document)
        input: PathBuf,
        /// Schema file
        #[arg(long)]
        schema: PathBuf,
    },
    /// Apply an RFC 6902 patch to a document
    Patch {
        /// Input file (JSON document)
        input: PathBuf,
        /// Patch file (JSON array of operations)
        #[arg(long)]
        patch: PathBuf,
    },
    /// Produce the RFC 6902 patch transforming document A into document B
    Diff {
        /// Source document
        a: PathBuf,
        /// Target document
        b: PathBuf,
    },
    /// Apply an RFC 7386 merge patch to a document
    Merge {
        /// Input file (JSON document)
        input: PathBuf,
        /// Merge patch file
        #[arg(long = "with")]
        with: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Split {
            input,
            output_dir,
            buffer_size,
        } => cmd_split(&input, output_dir.as_deref(), buffer_size),
        Commands::Query { input, path } => cmd_query(&input, &path),
        Commands::Validate { input, schema } => cmd_validate(&input, &schema),
        Commands::Patch { input, patch } => cmd_patch(&input, &patch),
        Commands::Diff { a, b } => cmd_diff(&a, &b),
        Commands::Merge { input, with } => cmd_merge(&input, &with),
    }
}

fn cmd_split(
    input: &Path,
    output_dir: Option<&Path>,
    buffer_size: usize,
) -> Result<(), Box<dyn Error>> {
    let source = File::open(input)?;
    let cursor = JsonArrayStream::with_buffer_size(source, buffer_size)
        .map_err(|err| err.to_string())?;

    match output_dir {
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for element in cursor {
                serde_json::to_writer(&mut out, &element?)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let mut count = 0usize;
            for element in cursor {
                let path = dir.join(format!("part-{count:05}.json"));
                let mut out = BufWriter::new(File::create(&path)?);
                serde_json::to_writer(&mut out, &element?)?;
                out.flush()?;
                count += 1;
            }
            debug!(count, "wrote split elements");
            println!("{count}");
        }
    }
    Ok(())
}

fn cmd_query(input: &Path, path: &str) -> Result<(), Box<dyn Error>> {
    let mut service = JsonPathService::new(vec![PathMapping::to_payload(path)]);
    service.init()?;

    let mut message = message_from_file(input)?;
    service.apply(&mut message)?;
    println!("{}", message.payload_str()?);
    Ok(())
}

fn cmd_validate(input: &Path, schema: &Path) -> Result<(), Box<dyn Error>> {
    let schema_doc = serde_json::from_str(&fs::read_to_string(schema)?)?;
    let mut service = SchemaValidationService::new(schema_doc);
    service.init()?;

    let mut message = message_from_file(input)?;
    match service.apply(&mut message) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(jflow_core::JflowError::Validation(violations)) => {
            for violation in &violations {
                eprintln!("{violation}");
            }
            Err(format!("{} schema violation(s)", violations.len()).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_patch(input: &Path, patch: &Path) -> Result<(), Box<dyn Error>> {
    let patch_doc = serde_json::from_str(&fs::read_to_string(patch)?)?;
    let mut service = JsonPatchService::new(patch_doc);
    service.init()?;

    let mut message = message_from_file(input)?;
    service.apply(&mut message)?;
    println!("{}", message.payload_str()?);
    Ok(())
}

fn cmd_diff(a: &Path, b: &Path) -> Result<(), Box<dyn Error>> {
    let mut service = JsonDiffService::new("target");
    service.init()?;

    let mut message = message_from_file(a)?;
    message.add_metadata("target", fs::read_to_string(b)?);
    service.apply(&mut message)?;
    println!("{}", message.payload_str()?);
    Ok(())
}

fn cmd_merge(input: &Path, with: &Path) -> Result<(), Box<dyn Error>> {
    let merge_doc = serde_json::from_str(&fs::read_to_string(with)?)?;
    let mut service = MergeService::new(merge_doc);
    service.init()?;

    let mut message = message_from_file(input)?;
    service.apply(&mut message)?;
    println!("{}", message.payload_str()?);
    Ok(())
}

fn message_from_file(path: &Path) -> Result<Message, Box<dyn Error>> {
    Ok(Message::from_text(fs::read_to_string(path)?))
}
