//! Typesetter selection and command building

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Helper script used for DVI-staged output formats. It receives engine
/// flags, the output directory, intermediate filenames (DviPsPdf only),
/// and the work file as positional arguments.
const DVI_HELPER: &str = "silktex-dvi2pdf";

/// A LaTeX typesetting engine or wrapper driver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    PdfLatex,
    XeLatex,
    LuaLatex,
    LatexMk,
    Rubber,
}

impl Engine {
    pub const ALL: [Engine; 5] = [
        Engine::PdfLatex,
        Engine::XeLatex,
        Engine::LuaLatex,
        Engine::LatexMk,
        Engine::Rubber,
    ];

    /// Canonical name; identical to the binary name on PATH
    pub fn name(&self) -> &'static str {
        match self {
            Engine::PdfLatex => "pdflatex",
            Engine::XeLatex => "xelatex",
            Engine::LuaLatex => "lualatex",
            Engine::LatexMk => "latexmk",
            Engine::Rubber => "rubber",
        }
    }

    /// Parse a canonical engine name, as stored in configuration
    pub fn from_name(name: &str) -> Result<Self> {
        Engine::ALL
            .into_iter()
            .find(|e| e.name() == name)
            .with_context(|| format!("Unknown typesetter engine: {name}"))
    }

    /// Wrapper drivers delegate the actual engine invocation and take
    /// their flags in a different shape than the direct engines.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Engine::LatexMk | Engine::Rubber)
    }
}

/// Final output format of a compile run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Engine emits PDF directly
    Pdf,
    /// DVI, then dvipdf
    DviPdf,
    /// DVI, then dvips, then ps2pdf
    DviPsPdf,
}

/// Everything needed to build one compile invocation. Immutable per
/// compilation; assembled from persisted configuration plus the active
/// document's path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypesetterConfig {
    pub engine: Engine,
    pub synctex: bool,
    pub shell_escape: bool,
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,
    pub work_file: PathBuf,
    pub base_name: String,
}

impl TypesetterConfig {
    /// Assemble a per-invocation config from persisted settings and the
    /// document being compiled. Fails fast on an unknown engine name or a
    /// pathological work-file path; never produces a silently wrong
    /// command.
    pub fn from_config(config: &Config, work_file: &Path) -> Result<Self> {
        let engine = Engine::from_name(&config.typesetter.engine)?;

        let base_name = work_file
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Work file has no usable name: {}", work_file.display()))?
            .to_string();

        let output_dir = match &config.typesetter.output_dir {
            Some(dir) => dir.clone(),
            None => match work_file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        if base_name.is_empty() {
            bail!("Work file has an empty base name: {}", work_file.display());
        }

        Ok(Self {
            engine,
            synctex: config.typesetter.synctex,
            shell_escape: config.typesetter.shell_escape,
            output_format: config.typesetter.output_format,
            output_dir,
            work_file: work_file.to_path_buf(),
            base_name,
        })
    }
}

/// Build the exact external command string for one compile run.
///
/// Deterministic pure function of the config: structurally equal configs
/// always yield byte-identical command strings. The builder itself never
/// fails; a missing binary only surfaces when the command is executed.
pub fn build_command(cfg: &TypesetterConfig) -> String {
    match cfg.engine {
        Engine::LatexMk => build_latexmk(cfg),
        Engine::Rubber => build_rubber(cfg),
        Engine::PdfLatex | Engine::XeLatex | Engine::LuaLatex => build_direct(cfg),
    }
}

/// Flags common to every direct engine invocation
fn engine_flags(cfg: &TypesetterConfig) -> String {
    let mut flags = String::from("-interaction=nonstopmode -file-line-error -halt-on-error");
    flags.push_str(if cfg.shell_escape {
        " -shell-escape"
    } else {
        " -no-shell-escape"
    });
    flags
}

/// An output-directory flag is redundant (and conflicts with some
/// engines) when the work file already lives in the output directory.
fn needs_output_dir(cfg: &TypesetterConfig) -> bool {
    cfg.work_file.parent() != Some(cfg.output_dir.as_path())
}

fn build_direct(cfg: &TypesetterConfig) -> String {
    let mut flags = engine_flags(cfg);
    if cfg.synctex {
        flags.push_str(" -synctex=1");
    }

    match cfg.output_format {
        OutputFormat::Pdf => {
            let mut cmd = format!("{} {}", cfg.engine.name(), flags);
            if needs_output_dir(cfg) {
                cmd.push_str(&format!(
                    " -output-directory=\"{}\"",
                    cfg.output_dir.display()
                ));
            }
            cmd.push_str(&format!(" \"{}\"", cfg.work_file.display()));
            cmd
        }
        OutputFormat::DviPdf => format!(
            "{} \"{}\" \"{}\" \"{}\"",
            DVI_HELPER,
            flags,
            cfg.output_dir.display(),
            cfg.work_file.display()
        ),
        OutputFormat::DviPsPdf => format!(
            "{} \"{}\" \"{}\" \"{}.dvi\" \"{}.ps\" \"{}\"",
            DVI_HELPER,
            flags,
            cfg.output_dir.display(),
            cfg.base_name,
            cfg.base_name,
            cfg.work_file.display()
        ),
    }
}

fn build_latexmk(cfg: &TypesetterConfig) -> String {
    // latexmk wraps the inner engine, so per-engine flags are spliced
    // into its variable substitution rather than passed at top level.
    // SyncTeX is always written with an explicit value here.
    let synctex = if cfg.synctex { 1 } else { 0 };
    let (mode_flag, inner_var, inner_engine) = match cfg.output_format {
        OutputFormat::Pdf => ("-pdf", "$pdflatex", "pdflatex"),
        OutputFormat::DviPdf => ("-pdfdvi", "$latex", "latex"),
        OutputFormat::DviPsPdf => ("-pdfps", "$latex", "latex"),
    };

    let mut cmd = format!(
        "latexmk -e \"{} = '{} {} -synctex={}'\" {}",
        inner_var,
        inner_engine,
        engine_flags(cfg),
        synctex,
        mode_flag
    );
    if needs_output_dir(cfg) {
        cmd.push_str(&format!(
            " -output-directory=\"{}\"",
            cfg.output_dir.display()
        ));
    }
    cmd.push_str(&format!(" \"{}\"", cfg.work_file.display()));
    cmd
}

fn build_rubber(cfg: &TypesetterConfig) -> String {
    // rubber exposes first-class flags for the wrapped engine, so no
    // variable splice is needed. DVI staging is rubber's own business;
    // only the PostScript route gets a distinct flag.
    let mut cmd = String::from("rubber --force --short --warn all");
    cmd.push_str(match cfg.output_format {
        OutputFormat::Pdf | OutputFormat::DviPdf => " --pdf",
        OutputFormat::DviPsPdf => " --ps",
    });
    if cfg.synctex {
        cmd.push_str(" --synctex");
    }
    if cfg.shell_escape {
        cmd.push_str(" --unsafe");
    }
    if needs_output_dir(cfg) {
        cmd.push_str(&format!(" --into \"{}\"", cfg.output_dir.display()));
    }
    cmd.push_str(&format!(" \"{}\"", cfg.work_file.display()));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(engine: Engine) -> TypesetterConfig {
        TypesetterConfig {
            engine,
            synctex: true,
            shell_escape: false,
            output_format: OutputFormat::Pdf,
            output_dir: PathBuf::from("/tmp/build"),
            work_file: PathBuf::from("/home/user/paper/main.tex"),
            base_name: "main".to_string(),
        }
    }

    #[test]
    fn test_engine_name_round_trip() {
        for engine in Engine::ALL {
            assert_eq!(Engine::from_name(engine.name()).unwrap(), engine);
        }
        assert!(Engine::from_name("tectonic").is_err());
    }

    #[test]
    fn test_pdflatex_flags() {
        let cmd = build_command(&config(Engine::PdfLatex));
        assert!(cmd.starts_with("pdflatex "));
        assert!(cmd.contains("-interaction=nonstopmode"));
        assert!(cmd.contains("-file-line-error"));
        assert!(cmd.contains("-halt-on-error"));
        assert!(cmd.contains("-synctex=1"));
        assert!(cmd.contains("-no-shell-escape"));
        assert!(!cmd.contains(" -shell-escape"));
    }

    #[test]
    fn test_synctex_omitted_when_disabled() {
        let cfg = TypesetterConfig {
            synctex: false,
            ..config(Engine::PdfLatex)
        };
        assert!(!build_command(&cfg).contains("synctex"));
    }

    #[test]
    fn test_shell_escape_enabled() {
        let cfg = TypesetterConfig {
            shell_escape: true,
            ..config(Engine::XeLatex)
        };
        let cmd = build_command(&cfg);
        assert!(cmd.starts_with("xelatex "));
        assert!(cmd.contains(" -shell-escape"));
        assert!(!cmd.contains("-no-shell-escape"));
    }

    #[test]
    fn test_work_file_is_final_quoted_token() {
        for engine in Engine::ALL {
            let cmd = build_command(&config(engine));
            assert!(
                cmd.ends_with(" \"/home/user/paper/main.tex\""),
                "bad tail for {}: {}",
                engine.name(),
                cmd
            );
        }
    }

    #[test]
    fn test_output_dir_flag_present() {
        let cmd = build_command(&config(Engine::PdfLatex));
        assert!(cmd.contains("-output-directory=\"/tmp/build\""));
    }

    #[test]
    fn test_output_dir_flag_skipped_when_in_place() {
        let cfg = TypesetterConfig {
            output_dir: PathBuf::from("/home/user/paper"),
            ..config(Engine::PdfLatex)
        };
        assert!(!build_command(&cfg).contains("-output-directory"));
    }

    #[test]
    fn test_latexmk_splices_synctex() {
        let cfg = TypesetterConfig {
            synctex: false,
            ..config(Engine::LatexMk)
        };
        let cmd = build_command(&cfg);
        // -synctex=0 lives inside the engine substitution, not top-level
        assert!(cmd.contains("-e \"$pdflatex = 'pdflatex"));
        assert!(cmd.contains("-synctex=0'\""));
        assert!(!cmd.contains("' -synctex=0"));
        assert!(cmd.contains(" -pdf "));
    }

    #[test]
    fn test_latexmk_dvi_modes() {
        let dvipdf = TypesetterConfig {
            output_format: OutputFormat::DviPdf,
            ..config(Engine::LatexMk)
        };
        let cmd = build_command(&dvipdf);
        assert!(cmd.contains("$latex = 'latex"));
        assert!(cmd.contains(" -pdfdvi "));

        let dvipspdf = TypesetterConfig {
            output_format: OutputFormat::DviPsPdf,
            ..config(Engine::LatexMk)
        };
        assert!(build_command(&dvipspdf).contains(" -pdfps "));
    }

    #[test]
    fn test_rubber_flags() {
        let cfg = TypesetterConfig {
            shell_escape: true,
            ..config(Engine::Rubber)
        };
        let cmd = build_command(&cfg);
        assert!(cmd.starts_with("rubber "));
        assert!(cmd.contains("--pdf"));
        assert!(cmd.contains("--synctex"));
        assert!(cmd.contains("--unsafe"));
        assert!(cmd.contains("--into \"/tmp/build\""));
    }

    #[test]
    fn test_dvi_helper_positional_args() {
        let cfg = TypesetterConfig {
            output_format: OutputFormat::DviPsPdf,
            ..config(Engine::PdfLatex)
        };
        let cmd = build_command(&cfg);
        assert!(cmd.starts_with("silktex-dvi2pdf "));
        assert!(cmd.contains("\"main.dvi\" \"main.ps\""));
        assert!(cmd.ends_with("\"/home/user/paper/main.tex\""));
    }

    #[test]
    fn test_build_command_deterministic() {
        let a = config(Engine::LatexMk);
        let b = a.clone();
        assert_eq!(build_command(&a), build_command(&b));
    }

    #[test]
    fn test_from_config_defaults_output_dir_to_parent() {
        let config = Config::default();
        let cfg =
            TypesetterConfig::from_config(&config, Path::new("/home/user/paper/main.tex")).unwrap();
        assert_eq!(cfg.engine, Engine::PdfLatex);
        assert_eq!(cfg.base_name, "main");
        assert_eq!(cfg.output_dir, PathBuf::from("/home/user/paper"));
        // In-place build: no output-directory flag expected
        assert!(!build_command(&cfg).contains("-output-directory"));
    }

    #[test]
    fn test_from_config_rejects_unknown_engine() {
        let mut config = Config::default();
        config.typesetter.engine = "tectonic".to_string();
        assert!(TypesetterConfig::from_config(&config, Path::new("main.tex")).is_err());
    }
}
