//! Structure outline extraction from LaTeX source

use regex::Regex;
use std::sync::LazyLock;

/// What kind of document element a structure item represents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureKind {
    Section,
    Figure,
    Table,
    Equation,
    Bibliography,
    Appendix,
    TheoremLike,
}

/// A single entry in the document outline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureItem {
    pub title: String,
    /// Nesting depth: 0 = part ... 6 = subparagraph
    pub level: u8,
    /// 1-based line number of the match
    pub line: usize,
    pub kind: StructureKind,
}

/// Document class, as far as outline depth is concerned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentClass {
    Book,
    Report,
    Memoir,
    Other,
}

impl DocumentClass {
    /// Detect the document class from a `\documentclass` declaration.
    /// Missing or unrecognized declarations map to `Other`.
    pub fn detect(text: &str) -> Self {
        static DOCCLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"\\documentclass(?:\s*\[[^\]]*\])?\s*\{\s*([A-Za-z]+)\s*\}").unwrap()
        });

        match DOCCLASS_RE.captures(text).map(|c| c[1].to_string()) {
            Some(name) if name == "book" => DocumentClass::Book,
            Some(name) if name == "report" => DocumentClass::Report,
            Some(name) if name == "memoir" => DocumentClass::Memoir,
            _ => DocumentClass::Other,
        }
    }

    /// Whether this class supports the `\chapter` level
    pub fn has_chapters(&self) -> bool {
        matches!(
            self,
            DocumentClass::Book | DocumentClass::Report | DocumentClass::Memoir
        )
    }
}

// Sectioning commands, ordered by depth (part=0 ... subparagraph=6)
const SECTION_COMMANDS: [&str; 7] = [
    "part",
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

// Special environments sit one level below subsection and are not
// subject to the chapterless-class depth adjustment.
const SPECIAL_LEVEL: u8 = 4;

/// Caption lookahead window for figure/table environments, in lines
const CAPTION_LOOKAHEAD_LINES: usize = 10;

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // The title argument tolerates one nesting level of braces so that
    // wrappers like \section{\textbf{Intro}} capture fully.
    Regex::new(
        r"\\(part|chapter|section|subsection|subsubsection|paragraph|subparagraph)\*?\s*\{((?:[^{}]|\{[^{}]*\})*)\}",
    )
    .unwrap()
});

static THEOREM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\begin\{(theorem|lemma|corollary|definition|example|remark)\}(?:\s*(?:\[([^\]]*)\]|\{([^}]*)\}))?",
    )
    .unwrap()
});

static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{(figure|table)\*?\}").unwrap());

static CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\caption\s*\{((?:[^{}]|\{[^{}]*\})*)\}").unwrap());

static EQUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(equation|align|gather|multline|eqnarray)\*?\}").unwrap()
});

static BIBLIOGRAPHY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{thebibliography\}|\\bibliography\s*\{").unwrap());

static APPENDIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\appendix\b").unwrap());

static COMMAND_WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[A-Za-z@]+\s*\{([^{}]*)\}").unwrap());

/// Extract the full structure outline from LaTeX source text.
///
/// Pure function: identical text always yields identical output. Malformed
/// LaTeX is never an error; it simply produces fewer (or garbled) matches.
/// Items are returned sorted by ascending line number, ties in discovery
/// order.
pub fn extract_structure(text: &str) -> Vec<StructureItem> {
    let class = DocumentClass::detect(text);
    let mut items = Vec::new();

    scan_sections(text, class, &mut items);
    scan_specials(text, &mut items);

    items.sort_by_key(|item| item.line);
    items
}

/// Sectioning scan: \part through \subparagraph, starred or not
fn scan_sections(text: &str, class: DocumentClass, items: &mut Vec<StructureItem>) {
    for caps in SECTION_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let raw_title = &caps[2];

        let base = SECTION_COMMANDS
            .iter()
            .position(|c| *c == name)
            .unwrap() as u8;

        // Chapterless classes have no depth-1 level, so everything below
        // part moves up one step to keep \section at the top visible level.
        let level = if !class.has_chapters() && base > 0 {
            base - 1
        } else {
            base
        };

        items.push(StructureItem {
            title: clean_title(raw_title),
            level,
            line: line_of(text, whole.start()),
            kind: StructureKind::Section,
        });
    }
}

/// Special-environment scan: theorems, floats, equations, bibliography,
/// appendix
fn scan_specials(text: &str, items: &mut Vec<StructureItem>) {
    for caps in THEOREM_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let label = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| clean_title(m.as_str()));

        let mut title = capitalize(&caps[1]);
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            title.push_str(": ");
            title.push_str(&label);
        }

        items.push(StructureItem {
            title,
            level: SPECIAL_LEVEL,
            line: line_of(text, whole.start()),
            kind: StructureKind::TheoremLike,
        });
    }

    for caps in FLOAT_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let line = line_of(text, whole.start());
        let kind = if &caps[1] == "figure" {
            StructureKind::Figure
        } else {
            StructureKind::Table
        };

        let mut title = capitalize(&caps[1]);
        if let Some(caption) = find_caption(text, whole.end(), line) {
            title.push_str(": ");
            title.push_str(&caption);
        }

        items.push(StructureItem {
            title,
            level: SPECIAL_LEVEL,
            line,
            kind,
        });
    }

    for caps in EQUATION_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        items.push(StructureItem {
            title: capitalize(&caps[1]),
            level: SPECIAL_LEVEL,
            line: line_of(text, whole.start()),
            kind: StructureKind::Equation,
        });
    }

    for m in BIBLIOGRAPHY_RE.find_iter(text) {
        items.push(StructureItem {
            title: "Bibliography".to_string(),
            level: SPECIAL_LEVEL,
            line: line_of(text, m.start()),
            kind: StructureKind::Bibliography,
        });
    }

    for m in APPENDIX_RE.find_iter(text) {
        items.push(StructureItem {
            title: "Appendix".to_string(),
            level: SPECIAL_LEVEL,
            line: line_of(text, m.start()),
            kind: StructureKind::Appendix,
        });
    }
}

/// Find the first `\caption{...}` after `from`, no further than
/// `CAPTION_LOOKAHEAD_LINES` lines below the environment's own line
fn find_caption(text: &str, from: usize, env_line: usize) -> Option<String> {
    let caps = CAPTION_RE.captures(&text[from..])?;
    let whole = caps.get(0).unwrap();
    let caption_line = line_of(text, from + whole.start());

    if caption_line - env_line <= CAPTION_LOOKAHEAD_LINES {
        Some(clean_title(&caps[1]))
    } else {
        None
    }
}

/// 1-based line number of a byte offset
fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Strip a single `\command{inner}` wrapper from title text, keeping the
/// inner text. One pass only; deeper nesting passes through unchanged.
fn clean_title(raw: &str) -> String {
    COMMAND_WRAPPER_RE
        .replace_all(raw, "$1")
        .trim()
        .to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
