// Copyright © 2022 The Radicle Link Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for the git configuration dialect.
//!
//! The same dialect is used by the repository `config` file and by the
//! `.gitmodules` manifest, so the parser is shared. Values are kept as an
//! ordered multimap: scalar lookup returns the last value assigned to a
//! key, enumeration preserves every assignment in file order. Section and
//! variable names are case-insensitive (stored lowercased), subsection
//! names are case-sensitive.

use std::{
    path::{Path, PathBuf},
    str::{Chars, FromStr},
};

/// Maximum nesting of `include.path` directives before we give up.
pub const MAX_INCLUDE_DEPTH: usize = 10;

pub mod error {
    use std::{io, path::PathBuf};

    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Parse {
        #[error("malformed section header on line {0}")]
        SectionHeader(usize),

        #[error("malformed variable name on line {0}")]
        VariableName(usize),

        #[error("invalid escape sequence on line {0}")]
        Escape(usize),

        #[error("unterminated quoted string on line {0}")]
        UnterminatedQuote(usize),
    }

    #[derive(Debug, Error)]
    pub enum Load {
        #[error("failed to read config file {}", path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: io::Error,
        },

        #[error("{}: {source}", path.display())]
        Parse {
            path: PathBuf,
            #[source]
            source: Parse,
        },

        #[error("include depth exceeded at {}", path.display())]
        IncludeDepth { path: PathBuf },
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub section: String,
    pub subsection: Option<String>,
    pub key: String,
    pub value: String,
}

/// An immutable view of one configuration file (plus its includes).
#[derive(Clone, Debug, Default)]
pub struct Config {
    entries: Vec<Entry>,
}

impl Config {
    /// Read and parse `path`, chasing `include.path` directives.
    ///
    /// Included entries are spliced in at the position of the directive,
    /// so later files override earlier ones exactly as git sees them.
    /// A missing include target is skipped, matching git.
    pub fn load(path: &Path) -> Result<Self, error::Load> {
        let entries = load_entries(path, MAX_INCLUDE_DEPTH)?;
        Ok(Self { entries })
    }

    /// Read and parse `path` without processing includes.
    ///
    /// The `.gitmodules` manifest is read this way: git does not expand
    /// includes there.
    pub fn load_plain(path: &Path) -> Result<Self, error::Load> {
        let text = read_file(path)?;
        let entries = parse(&text).map_err(|source| error::Load::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { entries })
    }

    /// The last value assigned to `(section, subsection, key)`, if any.
    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        self.get_all(section, subsection, key).next_back()
    }

    /// Every value assigned to `(section, subsection, key)`, in file order.
    pub fn get_all<'a>(
        &'a self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
    ) -> impl DoubleEndedIterator<Item = &'a str> {
        let section = section.to_lowercase();
        let key = key.to_lowercase();
        let subsection = subsection.map(str::to_owned);
        self.entries.iter().filter_map(move |e| {
            (e.section == section && e.subsection.as_deref() == subsection.as_deref() && e.key == key)
                .then(|| e.value.as_str())
        })
    }

    /// All variable names present under `(section, subsection)`, in file
    /// order, with duplicates removed.
    pub fn keys<'a>(&'a self, section: &str, subsection: Option<&'a str>) -> Vec<&'a str> {
        let section = section.to_lowercase();
        let mut seen = Vec::new();
        for e in &self.entries {
            if e.section == section
                && e.subsection.as_deref() == subsection
                && !seen.contains(&e.key.as_str())
            {
                seen.push(e.key.as_str())
            }
        }
        seen
    }

    /// Distinct subsection names of `section`, in first-seen order.
    ///
    /// Together with [`Config::get`]'s last-value-wins rule this gives the
    /// manifest aggregation semantics: groups keep the order their names
    /// first appear in, while a later block's assignment of a key
    /// overrides an earlier block's, key by key.
    pub fn subsections<'a>(&'a self, section: &str) -> Vec<&'a str> {
        let section = section.to_lowercase();
        let mut seen = Vec::new();
        for e in &self.entries {
            if e.section == section {
                if let Some(sub) = e.subsection.as_deref() {
                    if !seen.contains(&sub) {
                        seen.push(sub)
                    }
                }
            }
        }
        seen
    }
}

impl FromStr for Config {
    type Err = error::Parse;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text).map(|entries| Self { entries })
    }
}

fn read_file(path: &Path) -> Result<String, error::Load> {
    std::fs::read_to_string(path).map_err(|source| error::Load::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_entries(path: &Path, depth: usize) -> Result<Vec<Entry>, error::Load> {
    if depth == 0 {
        return Err(error::Load::IncludeDepth {
            path: path.to_path_buf(),
        });
    }

    let text = read_file(path)?;
    let parsed = parse(&text).map_err(|source| error::Load::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut entries = Vec::with_capacity(parsed.len());
    for entry in parsed {
        if entry.section == "include" && entry.subsection.is_none() && entry.key == "path" {
            match include_target(&base, &entry.value) {
                Some(target) if target.is_file() => {
                    entries.extend(load_entries(&target, depth - 1)?)
                },
                target => {
                    tracing::debug!(path = %entry.value, ?target, "skipping unreadable include")
                },
            }
        } else {
            entries.push(entry)
        }
    }
    Ok(entries)
}

fn include_target(base: &Path, value: &str) -> Option<PathBuf> {
    if let Some(rest) = value.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    let path = Path::new(value);
    Some(if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    })
}

struct Parser<'a> {
    chars: std::iter::Peekable<Chars<'a>>,
    line: usize,
}

pub(crate) fn parse(text: &str) -> Result<Vec<Entry>, error::Parse> {
    Parser {
        chars: text.chars().peekable(),
        line: 1,
    }
    .run()
}

impl<'a> Parser<'a> {
    fn run(mut self) -> Result<Vec<Entry>, error::Parse> {
        let mut entries = Vec::new();
        let mut section: Option<(String, Option<String>)> = None;

        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.bump();
                },
                c if c.is_whitespace() => {
                    self.bump();
                },
                '#' | ';' => self.skip_comment(),
                '[' => {
                    self.bump();
                    section = Some(self.section_header()?);
                },
                c if c.is_ascii_alphabetic() => {
                    let (sect, sub) = section
                        .clone()
                        .ok_or(error::Parse::VariableName(self.line))?;
                    let key = self.variable_name()?;
                    let value = self.variable_value()?;
                    entries.push(Entry {
                        section: sect,
                        subsection: sub,
                        key,
                        value,
                    });
                },
                _ => return Err(error::Parse::VariableName(self.line)),
            }
        }
        Ok(entries)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// `name]`, `name "sub"]` or the deprecated `name.sub]`, with the
    /// opening bracket already consumed.
    fn section_header(&mut self) -> Result<(String, Option<String>), error::Parse> {
        let line = self.line;
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                name.push(c.to_ascii_lowercase());
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(error::Parse::SectionHeader(line));
        }

        // Deprecated `[section.subsection]`: the subsection is
        // case-insensitive in this form only, hence already lowercased.
        let (name, mut subsection) = match name.split_once('.') {
            Some((s, sub)) => (s.to_owned(), Some(sub.to_owned())),
            None => (name, None),
        };

        while matches!(self.chars.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }

        if self.chars.peek() == Some(&'"') {
            if subsection.is_some() {
                return Err(error::Parse::SectionHeader(line));
            }
            self.bump();
            subsection = Some(self.quoted_subsection(line)?);
            while matches!(self.chars.peek(), Some(' ') | Some('\t')) {
                self.bump();
            }
        }

        if self.bump() != Some(']') {
            return Err(error::Parse::SectionHeader(line));
        }
        self.rest_of_line(line)?;

        Ok((name, subsection))
    }

    fn quoted_subsection(&mut self, line: usize) -> Result<String, error::Parse> {
        let mut sub = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(error::Parse::UnterminatedQuote(line)),
                Some('"') => return Ok(sub),
                Some('\\') => match self.bump() {
                    // Inside a subsection the backslash simply drops.
                    Some(c) if c != '\n' => sub.push(c),
                    _ => return Err(error::Parse::Escape(line)),
                },
                Some(c) => sub.push(c),
            }
        }
    }

    /// Only whitespace or a comment may follow on the same line.
    fn rest_of_line(&mut self, line: usize) -> Result<(), error::Parse> {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.bump();
                    return Ok(());
                },
                '#' | ';' => {
                    self.skip_comment();
                },
                c if c.is_whitespace() => {
                    self.bump();
                },
                _ => return Err(error::Parse::SectionHeader(line)),
            }
        }
        Ok(())
    }

    fn variable_name(&mut self) -> Result<String, error::Parse> {
        let line = self.line;
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                name.push(c.to_ascii_lowercase());
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(error::Parse::VariableName(line));
        }
        Ok(name)
    }

    /// Everything after the variable name: `= value`, or nothing, which
    /// is git's boolean-true shorthand.
    fn variable_value(&mut self) -> Result<String, error::Parse> {
        let line = self.line;
        while matches!(self.chars.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
        match self.chars.peek() {
            None | Some('\n') => return Ok("true".to_owned()),
            Some('#') | Some(';') => {
                self.skip_comment();
                return Ok("true".to_owned());
            },
            Some('=') => {
                self.bump();
            },
            _ => return Err(error::Parse::VariableName(line)),
        }

        while matches!(self.chars.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }

        let mut value = String::new();
        let mut in_quotes = false;
        // Index into `value` where a run of trailing unquoted whitespace
        // starts; unquoted trailing whitespace is trimmed.
        let mut trailing_ws: Option<usize> = None;

        loop {
            match self.chars.peek() {
                None | Some(&'\n') => {
                    if in_quotes {
                        return Err(error::Parse::UnterminatedQuote(line));
                    }
                    self.bump();
                    break;
                },
                Some(&'#') | Some(&';') if !in_quotes => {
                    self.skip_comment();
                },
                Some(&'"') => {
                    in_quotes = !in_quotes;
                    trailing_ws = None;
                    self.bump();
                },
                Some(&'\\') => {
                    self.bump();
                    let escaped = match self.bump() {
                        Some('\n') => continue, // line continuation
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        _ => return Err(error::Parse::Escape(self.line)),
                    };
                    value.push(escaped);
                    trailing_ws = None;
                },
                Some(&c) => {
                    if !in_quotes && (c == ' ' || c == '\t') {
                        trailing_ws.get_or_insert(value.len());
                    } else {
                        trailing_ws = None;
                    }
                    value.push(c);
                    self.bump();
                },
            }
        }

        if let Some(at) = trailing_ws {
            value.truncate(at)
        }
        Ok(value)
    }
}
