//! Formfill command-line interface
//!
//! ```text
//! formfill fill --template f8621.pdf --keyfile f8621.keys --values data.json --output out.pdf
//! formfill fill-batch --template f8621.pdf --keyfile f8621.keys --values batch.json --output-dir filled/
//! formfill dump-fields f8621.pdf --keyfile-stub
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use formfill::{dump_fields, write_fillable_pdf, FillRequest, TemplateRef};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(version, about = "Fill PDF form templates from readable field values")]
struct Cli {
    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill one template from a value file
    Fill {
        #[command(flatten)]
        template: TemplateArgs,

        /// Flat JSON value file
        #[arg(long)]
        values: PathBuf,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Fill one PDF per entity of a batch value file
    FillBatch {
        #[command(flatten)]
        template: TemplateArgs,

        /// JSON object of entity name -> flat values
        #[arg(long)]
        values: PathBuf,

        /// Directory receiving `<entity>.pdf` files
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// List the widgets of a template
    DumpFields {
        /// Template PDF
        template: PathBuf,

        /// Print keyfile stub lines instead
        #[arg(long)]
        keyfile_stub: bool,
    },
}

#[derive(Args, Debug)]
struct TemplateArgs {
    /// Template PDF, relative paths resolve against --templates-dir
    #[arg(long)]
    template: PathBuf,

    /// Keyfile, relative paths resolve against --keyfiles-dir
    #[arg(long)]
    keyfile: PathBuf,

    #[arg(long, env = "FORMFILL_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    #[arg(long, env = "FORMFILL_KEYFILES_DIR")]
    keyfiles_dir: Option<PathBuf>,
}

impl TemplateArgs {
    fn template_ref(&self) -> TemplateRef {
        TemplateRef::new(
            resolve(self.templates_dir.as_deref(), &self.template),
            resolve(self.keyfiles_dir.as_deref(), &self.keyfile),
        )
    }
}

fn resolve(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fill {
            template,
            values,
            output,
        } => run_fill(&template.template_ref(), &values, &output),
        Command::FillBatch {
            template,
            values,
            output_dir,
        } => run_fill_batch(&template.template_ref(), &values, &output_dir),
        Command::DumpFields {
            template,
            keyfile_stub,
        } => run_dump_fields(&template, keyfile_stub),
    }
}

fn run_fill(template: &TemplateRef, values_path: &Path, output: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(values_path)
        .with_context(|| format!("reading {}", values_path.display()))?;
    let request = FillRequest::from_json(&json)
        .with_context(|| format!("parsing {}", values_path.display()))?;

    let warnings = write_fillable_pdf(template, &request.values, &request.directives, output)
        .with_context(|| format!("filling {}", template.template.display()))?;
    if !warnings.is_empty() {
        tracing::info!("{} warnings for {}", warnings.len(), output.display());
    }
    Ok(())
}

fn run_fill_batch(template: &TemplateRef, values_path: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(values_path)
        .with_context(|| format!("reading {}", values_path.display()))?;
    let batch: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", values_path.display()))?;
    let serde_json::Value::Object(entities) = batch else {
        bail!("{} must be a JSON object of entity -> values", values_path.display());
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let total = entities.len();
    let mut failed = 0;
    for (entity, values) in entities {
        let output = output_dir.join(output_file_name(&entity));
        let result = FillRequest::from_value(values).and_then(|request| {
            write_fillable_pdf(template, &request.values, &request.directives, &output)
        });
        match result {
            Ok(warnings) => tracing::info!(
                "[+] {entity} -> {} ({} warnings)",
                output.display(),
                warnings.len()
            ),
            Err(e) => {
                failed += 1;
                tracing::error!("[-] {entity}: {e}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} entities failed");
    }
    Ok(())
}

fn run_dump_fields(template: &Path, keyfile_stub: bool) -> anyhow::Result<()> {
    let dumps = dump_fields(template).with_context(|| format!("reading {}", template.display()))?;

    if keyfile_stub {
        let mut seen = HashSet::new();
        for dump in dumps.iter().filter(|d| seen.insert(d.name.clone())) {
            println!("{}", dump.keyfile_line());
        }
    } else {
        for dump in &dumps {
            println!("{dump}");
        }
    }
    Ok(())
}

/// `<entity>.pdf`, with path separators replaced
fn output_file_name(entity: &str) -> String {
    let safe: String = entity
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}.pdf")
}
