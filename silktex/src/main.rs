//! SilkTex - LaTeX document outline and typesetting from the command line

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use silktex_core::{
    compile, typeset, Config, DetectionState, Document, Engine, OutputFormat, TypesetterConfig,
};
use std::path::PathBuf;

/// LaTeX document outline and typesetting tool
#[derive(Parser, Debug)]
#[command(name = "silktex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the structure outline of a document
    Outline {
        /// Path to LaTeX file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Also print up to N source lines for each item
        #[arg(long, value_name = "N")]
        context: Option<usize>,
    },
    /// Print the typesetter command that would be run
    Command {
        /// Path to LaTeX file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Compile a document and report scraped log messages
    Compile {
        /// Path to LaTeX file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Probe and list available typesetter engines
    Engines,
}

/// Command-line overrides for persisted typesetter settings
#[derive(Args, Debug)]
struct Overrides {
    /// Typesetter engine (pdflatex, xelatex, lualatex, latexmk, rubber)
    #[arg(long)]
    engine: Option<String>,
    /// Enable SyncTeX
    #[arg(long, overrides_with = "no_synctex")]
    synctex: bool,
    /// Disable SyncTeX
    #[arg(long)]
    no_synctex: bool,
    /// Enable shell escape
    #[arg(long)]
    shell_escape: bool,
    /// Output format (Pdf, DviPdf, DviPsPdf)
    #[arg(long)]
    format: Option<String>,
    /// Build directory for generated files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(engine) = &self.engine {
            // Validate here so a typo fails before anything runs
            Engine::from_name(engine)?;
            config.typesetter.engine = engine.clone();
        }
        if self.synctex {
            config.typesetter.synctex = true;
        } else if self.no_synctex {
            config.typesetter.synctex = false;
        }
        if self.shell_escape {
            config.typesetter.shell_escape = true;
        }
        if let Some(format) = &self.format {
            config.typesetter.output_format = match format.as_str() {
                "Pdf" | "pdf" => OutputFormat::Pdf,
                "DviPdf" | "dvipdf" => OutputFormat::DviPdf,
                "DviPsPdf" | "dvipspdf" => OutputFormat::DviPsPdf,
                other => anyhow::bail!("Unknown output format: {other}"),
            };
        }
        if let Some(dir) = &self.output_dir {
            config.typesetter.output_dir = Some(dir.clone());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Cmd::Outline { file, context } => cmd_outline(&file, context),
        Cmd::Command { file, overrides } => cmd_command(&file, &overrides),
        Cmd::Compile { file, overrides } => cmd_compile(&file, &overrides),
        Cmd::Engines => cmd_engines(),
    }
}

fn cmd_outline(file: &PathBuf, context: Option<usize>) -> Result<()> {
    let doc = Document::load(file)
        .with_context(|| format!("Failed to load document: {}", file.display()))?;

    for item in &doc.outline {
        let indent = "  ".repeat(item.level as usize);
        println!("{:>5}  {}{}", item.line, indent, item.title);

        if let Some(n) = context.filter(|n| *n > 0) {
            let start = item.line - 1;
            for line in doc.lines(start, start + n - 1).lines() {
                println!("       {indent}| {line}");
            }
        }
    }

    Ok(())
}

fn cmd_command(file: &PathBuf, overrides: &Overrides) -> Result<()> {
    let cfg = typesetter_config(file, overrides)?;
    println!("{}", typeset::build_command(&cfg));
    Ok(())
}

fn cmd_compile(file: &PathBuf, overrides: &Overrides) -> Result<()> {
    let cfg = typesetter_config(file, overrides)?;
    let result = compile::run(&cfg)?;

    for msg in &result.messages {
        let location = match (&msg.file, msg.line) {
            (Some(file), Some(line)) => format!("{file}:{line}: "),
            (None, Some(line)) => format!("line {line}: "),
            _ => String::new(),
        };
        println!("{}{:?}: {}", location, msg.level, msg.message);
    }

    if result.success {
        println!("Compilation succeeded");
        Ok(())
    } else {
        println!("Compilation failed");
        std::process::exit(1);
    }
}

fn cmd_engines() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let detection = DetectionState::probe();

    for engine in Engine::ALL {
        let marker = if config.active(engine) { "*" } else { " " };
        let status = if detection.is_available(engine) {
            "installed"
        } else {
            "not found"
        };
        println!("{marker} {:<10} {status}", engine.name());
    }

    Ok(())
}

fn typesetter_config(file: &PathBuf, overrides: &Overrides) -> Result<TypesetterConfig> {
    let mut config = Config::load().context("Failed to load configuration")?;
    overrides.apply(&mut config)?;

    let work_file = file
        .canonicalize()
        .with_context(|| format!("No such document: {}", file.display()))?;

    TypesetterConfig::from_config(&config, &work_file)
}
