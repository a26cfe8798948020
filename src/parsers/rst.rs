//! Source scanner for reStructuredText and Markdown documentation pages.
//!
//! This is not a full reStructuredText parser. It recognizes the constructs
//! that feed a search index and treats everything else as body text:
//!
//! - Section titles (underlined, or over- and underlined, with one punctuation
//!   character; `#` headings in Markdown)
//! - Python domain directives (`py:module`, `py:currentmodule`, `py:function`,
//!   `py:class`, ...) and their bare aliases
//! - `.. index::` directives
//!
//! Directive options, comments, hyperlink targets and `toctree` bodies are not
//! body text.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{IndexEntryDefinition, ObjectDefinition, Section, SourceDocument};
use crate::query::tokenizer::split_query;
use crate::utils::{docname_from_relative, validate_file_size};

/// Title used for pages without any heading
pub const UNTITLED: &str = "<no title>";

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Python object kinds that become index objects
const OBJECT_KINDS: &[&str] =
    &["function", "class", "exception", "attribute", "property", "method", "data"];

const PYTHON_DOMAIN: &str = "py";

/// Read and scan one source file below `root`
///
/// # Errors
///
/// Returns an error if the path is outside `root`, the file cannot be read, is
/// over the size limit, or is not valid UTF-8.
pub fn parse_source_file(root: &Path, path: &Path) -> Result<SourceDocument> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("Source is outside the documentation root: {}", path.display()))?;
    let docname = docname_from_relative(relative)?;
    let filename = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let file = File::open(path)
        .with_context(|| format!("Failed to open source file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut text = String::new();
    BufReader::new(file)
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;

    Ok(parse_source(&docname, &filename, &text))
}

/// Scan the text of one page
pub fn parse_source(docname: &str, filename: &str, text: &str) -> SourceDocument {
    let markdown = filename.ends_with(".md");
    let lines: Vec<&str> = text.lines().collect();
    let mut state = ScanState::new(docname, filename);

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            state.in_options = false;
            i += 1;
            continue;
        }

        if markdown {
            if let Some(open) = state.fence.take() {
                if !closes_fence(trimmed, &open) {
                    state.add_words(trimmed);
                    state.fence = Some(open);
                }
                i += 1;
                continue;
            }
            if let Some(marker) = fence_marker(trimmed) {
                state.fence = Some(marker.to_string());
                state.pending_section = None;
                i += 1;
                continue;
            }
        }

        let indent = indent_of(line);
        if let Some(block_indent) = state.skip_block {
            if indent > block_indent {
                i += 1;
                continue;
            }
            state.skip_block = None;
        }
        if let Some(index_block) = state.index_block.clone() {
            if indent > index_block.indent {
                state.add_index_entries(trimmed, &index_block.anchor);
                i += 1;
                continue;
            }
            state.index_block = None;
        }

        if let Some((title, consumed)) = title_at(&lines, i, markdown) {
            state.add_title(&title);
            i += consumed;
            continue;
        }

        if is_adornment(line) {
            // Transition line
            i += 1;
            continue;
        }

        if !markdown {
            if let Some(directive) = parse_directive(trimmed) {
                state.handle_directive(indent, directive);
                i += 1;
                continue;
            }
            if trimmed.starts_with("..") {
                // Comment or hyperlink target; its indented body is not text either
                state.skip_block = Some(indent);
                i += 1;
                continue;
            }
            if state.in_options && is_option_line(trimmed) {
                i += 1;
                continue;
            }
        }

        state.in_options = false;
        state.pending_section = None;
        state.add_words(trimmed);
        i += 1;
    }

    state.finish()
}

#[derive(Debug, Clone)]
struct IndexBlock {
    indent: usize,
    anchor: String,
}

struct ScanState {
    doc: SourceDocument,
    module: Option<String>,
    /// `(indent, qualified class name)` of enclosing class directives
    classes: Vec<(usize, String)>,
    /// Section whose anchor a directly following module directive takes over
    pending_section: Option<usize>,
    skip_block: Option<usize>,
    index_block: Option<IndexBlock>,
    /// Marker of the open Markdown code fence
    fence: Option<String>,
    in_options: bool,
    index_counter: usize,
    id_counter: usize,
}

struct Directive<'a> {
    name: &'a str,
    argument: &'a str,
}

impl ScanState {
    fn new(docname: &str, filename: &str) -> Self {
        Self {
            doc: SourceDocument {
                docname: docname.to_string(),
                filename: filename.to_string(),
                ..Default::default()
            },
            module: None,
            classes: Vec::new(),
            pending_section: None,
            skip_block: None,
            index_block: None,
            fence: None,
            in_options: false,
            index_counter: 0,
            id_counter: 0,
        }
    }

    fn finish(mut self) -> SourceDocument {
        if self.doc.title.is_empty() {
            self.doc.title = UNTITLED.to_string();
        }
        self.doc
    }

    fn add_words(&mut self, text: &str) {
        let cleaned = strip_inline_markup(text);
        self.doc.words.extend(split_query(&cleaned).into_iter().map(str::to_string));
    }

    fn add_title(&mut self, raw: &str) {
        let title = clean_title(raw);
        self.classes.clear();
        self.pending_section = None;
        self.doc.title_words.extend(split_query(&title).into_iter().map(str::to_string));

        if self.doc.title.is_empty() {
            self.doc.title = title;
            return;
        }

        let mut anchor = slugify(&title);
        if anchor.is_empty() || self.doc.sections.iter().any(|s| s.anchor == anchor) {
            self.id_counter += 1;
            anchor = format!("id{}", self.id_counter);
        }
        self.doc.sections.push(Section { title, anchor });
        self.pending_section = Some(self.doc.sections.len() - 1);
    }

    fn handle_directive(&mut self, indent: usize, directive: Directive<'_>) {
        self.in_options = true;
        self.classes.retain(|(class_indent, _)| *class_indent < indent);
        let name = directive.name.strip_prefix("py:").unwrap_or(directive.name);

        match name {
            "module" => {
                let module = directive.argument.trim().to_string();
                if module.is_empty() {
                    return;
                }
                self.add_module(&module);
            }
            "currentmodule" => {
                let module = directive.argument.trim();
                self.module = if module.is_empty() || module == "None" {
                    None
                } else {
                    Some(module.to_string())
                };
                self.pending_section = None;
            }
            "index" => {
                let anchor = format!("index-{}", self.index_counter);
                self.index_counter += 1;
                self.add_index_entries(directive.argument, &anchor);
                self.index_block = Some(IndexBlock { indent, anchor });
                self.pending_section = None;
            }
            kind if OBJECT_KINDS.contains(&kind) => {
                self.add_object(indent, kind, directive.argument);
                self.pending_section = None;
            }
            "toctree" => {
                self.skip_block = Some(indent);
                self.pending_section = None;
            }
            _ => {
                self.pending_section = None;
            }
        }
    }

    fn add_module(&mut self, module: &str) {
        let anchor = format!("module-{}", module);
        if let Some(pos) = self.pending_section.take() {
            self.doc.sections[pos].anchor = anchor.clone();
        }
        self.module = Some(module.to_string());
        self.doc.objects.push(ObjectDefinition {
            fullname: module.to_string(),
            prefix: parent_of(module).to_string(),
            domain: PYTHON_DOMAIN.to_string(),
            kind: "module".to_string(),
            priority: 0,
            anchor: "-".to_string(),
        });
        for entry in [module, "module"] {
            self.doc.index_entries.push(IndexEntryDefinition {
                entry: entry.to_string(),
                anchor: anchor.clone(),
                is_main: false,
            });
        }
    }

    fn add_object(&mut self, indent: usize, kind: &str, signature: &str) {
        let name = object_name(signature);
        if name.is_empty() {
            return;
        }

        let qualified = match self.classes.last() {
            Some((_, class)) => format!("{}.{}", class, name),
            None => name.to_string(),
        };
        let fullname = match &self.module {
            Some(module) => format!("{}.{}", module, qualified),
            None => qualified.clone(),
        };

        if let Some(entry) = auto_index_entry(kind, &fullname, &qualified, self.module.as_deref()) {
            self.doc.index_entries.push(IndexEntryDefinition {
                entry,
                anchor: fullname.clone(),
                is_main: false,
            });
        }
        self.doc.objects.push(ObjectDefinition {
            prefix: parent_of(&fullname).to_string(),
            fullname,
            domain: PYTHON_DOMAIN.to_string(),
            kind: kind.to_string(),
            priority: 1,
            anchor: String::new(),
        });

        if matches!(kind, "class" | "exception") {
            self.classes.push((indent, qualified));
        }
    }

    fn add_index_entries(&mut self, text: &str, anchor: &str) {
        for (entry, is_main) in parse_index_text(text) {
            self.doc.index_entries.push(IndexEntryDefinition {
                entry,
                anchor: anchor.to_string(),
                is_main,
            });
        }
    }
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// A line made of one repeated punctuation character, starting at column 0
fn is_adornment(line: &str) -> bool {
    let line = line.trim_end();
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    line.chars().count() >= 2 && ADORNMENT_CHARS.contains(first) && chars.all(|c| c == first)
}

/// Title starting at line `i`, with the number of lines it spans
fn title_at(lines: &[&str], i: usize, markdown: bool) -> Option<(String, usize)> {
    let line = lines[i];

    if markdown {
        let hashes = line.chars().take_while(|c| *c == '#').count();
        if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
            let title = line[hashes..].trim().trim_end_matches('#').trim();
            if !title.is_empty() {
                return Some((title.to_string(), 1));
            }
        }
        // Setext headings: text underlined with `=` or `-`, never overlined
        let next = lines.get(i + 1).copied().unwrap_or("");
        if is_adornment(line) || !next.starts_with(['=', '-']) {
            return None;
        }
    }

    let next = lines.get(i + 1).copied().unwrap_or("");

    // Overline, title, underline
    if is_adornment(line) {
        let underline = lines.get(i + 2).copied().unwrap_or("");
        let text = next.trim();
        if !text.is_empty()
            && is_adornment(underline)
            && underline.trim_end() == line.trim_end()
            && !is_adornment(next)
        {
            return Some((text.to_string(), 3));
        }
        return None;
    }

    // Title, underline
    let text = line.trim_end();
    if indent_of(line) == 0
        && is_adornment(next)
        && next.trim_end().chars().count() >= text.chars().count()
    {
        return Some((text.to_string(), 2));
    }

    None
}

/// Opening Markdown code fence: three or more backticks or tildes
fn fence_marker(trimmed: &str) -> Option<&str> {
    let first = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|c| *c == first).count();
    (len >= 3).then(|| &trimmed[..len])
}

/// A closing fence repeats the opening character at least as often, with nothing after it
fn closes_fence(trimmed: &str, open: &str) -> bool {
    fence_marker(trimmed).is_some_and(|marker| {
        marker.starts_with(open) && trimmed[marker.len()..].trim().is_empty()
    })
}

fn parse_directive(trimmed: &str) -> Option<Directive<'_>> {
    let rest = trimmed.strip_prefix(".. ")?;
    let (name, argument) = rest.split_once("::")?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(Directive { name, argument: argument.trim() })
}

/// `:maxdepth: 2`, `:noindex:`, ...
fn is_option_line(trimmed: &str) -> bool {
    trimmed
        .strip_prefix(':')
        .and_then(|rest| rest.split_once(':'))
        .is_some_and(|(name, _)| !name.is_empty() && !name.contains(char::is_whitespace))
}

/// Bare object name from a directive signature
///
/// `export_log_to_csv(log, path)` gives `export_log_to_csv`, `csv_dir: str`
/// gives `csv_dir`, and `async fetch()` gives `fetch`.
fn object_name(signature: &str) -> &str {
    let end = signature.find(['(', ':', '=', '[']).unwrap_or(signature.len());
    signature[..end].split_whitespace().last().unwrap_or("")
}

/// Everything before the last dot of a dotted name
fn parent_of(fullname: &str) -> &str {
    fullname.rsplit_once('.').map(|(parent, _)| parent).unwrap_or("")
}

/// The entry the Python domain adds to the general index for an object
fn auto_index_entry(
    kind: &str,
    fullname: &str,
    qualified: &str,
    module: Option<&str>,
) -> Option<String> {
    let (owner, short) = match fullname.rsplit_once('.') {
        Some((owner, short)) => (owner, short),
        None => ("", fullname),
    };
    let nested = qualified.contains('.');

    let entry = match (kind, module) {
        ("function", Some(m)) => format!("{}() (in module {})", short, m),
        ("function", None) => format!("{}() (built-in function)", short),
        ("class", Some(m)) if !nested => format!("{} (class in {})", short, m),
        ("exception", Some(m)) if !nested => format!("{} (exception in {})", short, m),
        ("class" | "exception", None) if !nested => format!("{} (built-in {})", short, kind),
        ("data", Some(m)) => format!("{} (in module {})", short, m),
        ("data", None) => format!("{} (built-in variable)", short),
        ("method", _) => format!("{}() ({} method)", short, owner),
        ("attribute" | "property", _) => format!("{} ({} {})", short, owner, kind),
        ("class" | "exception", _) => format!("{} ({} {})", short, owner, kind),
        _ => return None,
    };
    Some(entry)
}

/// Entries named by an `index` directive argument or body line
///
/// A leading `!` marks the main entry for a topic.
fn parse_index_text(text: &str) -> Vec<(String, bool)> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let (is_main, text) = match text.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };

    let typed = text.split_once(':').filter(|(kind, _)| {
        matches!(kind.trim(), "single" | "pair" | "triple" | "see" | "seealso")
    });

    let parts = |value: &str| -> Vec<String> {
        value.split(';').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect()
    };

    let entries = match typed {
        Some((kind, value)) => {
            let value = value.trim();
            let (is_main, value) = match value.strip_prefix('!') {
                Some(rest) => (true, rest.trim_start()),
                None => (is_main, value),
            };
            let names = parts(value);
            let names = match kind.trim() {
                "single" | "see" | "seealso" => names.into_iter().take(1).collect(),
                _ => names,
            };
            return names.into_iter().map(|name| (name, is_main)).collect();
        }
        None => text
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>(),
    };

    entries.into_iter().map(|entry| (entry, is_main)).collect()
}

/// Drop interpreted-text roles and inline markup characters
///
/// ``:func:`load_event_log` `` reads as `load_event_log`.
fn strip_inline_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(':') {
        let after = &rest[start + 1..];
        let role_len = after.find(":`").filter(|len| {
            *len > 0 && after[..*len].chars().all(|c| c.is_alphanumeric() || c == ':' || c == '-')
        });
        match role_len {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &after[len + 1..];
            }
            None => {
                out.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out.chars().map(|c| if matches!(c, '`' | '*') { ' ' } else { c }).collect()
}

/// Title text as rendered: markup removed, apostrophes typographic
fn clean_title(raw: &str) -> String {
    let stripped = strip_inline_markup(raw);
    let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    let chars: Vec<char> = stripped.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let between_letters = i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
            if c == '\'' && between_letters { '\u{2019}' } else { c }
        })
        .collect()
}

/// Section anchor: lowercase ASCII letters and digits joined by single hyphens
///
/// Accented Latin letters fold to their base letter (`Café` gives `cafe`) and
/// combining marks vanish. Other characters separate words. Leading digits and
/// hyphens are dropped, as HTML ids must start with a letter.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            push_slug_char(&mut slug, &mut pending_dash, c);
        } else if let Some(folded) = fold_latin(c) {
            for c in folded.chars() {
                push_slug_char(&mut slug, &mut pending_dash, c);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn push_slug_char(slug: &mut String, pending_dash: &mut bool, c: char) {
    if slug.is_empty() && c.is_ascii_digit() {
        return;
    }
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.push(c);
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// ASCII spelling of a lowercase accented Latin letter
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "sz",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}
