//! Tokenizer for the line-oriented scene file.
//!
//! ```text
//! # comment
//! Mesh: Cube
//! v 1 -1 0
//! vn 0 0 1
//! vt 0.5 0.5
//! MeshEnd
//! MeshEntity: Cube.001
//! Mesh: Cube
//! Position: 0 0 1
//! MeshEntityEnd
//! Sky:
//! SkyImagePath: Sky/sky.exr
//! SkyEnd
//! ```
//!
//! A block opens with `<Kind>: <name>` and closes with `<Kind>End`. Inside,
//! each line is a field: `Key: values...`, or `key values...` for the
//! per-corner mesh streams. This module only splits the text into
//! [`Record`]s; [`crate::assets::description`] gives the fields meaning.

use crate::errors::{Result, UmbraError};

/// One `Key: values` line inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    /// Everything after the key, trimmed.
    pub raw: String,
    /// 1-based source line.
    pub line: usize,
}

impl Field {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.raw.split_whitespace()
    }

    fn error(&self, message: impl Into<String>) -> UmbraError {
        UmbraError::SceneParse {
            line: self.line,
            message: format!("{}: {}", self.key, message.into()),
        }
    }

    /// Parses exactly `N` floats.
    pub fn floats<const N: usize>(&self) -> Result<[f32; N]> {
        self.floats_with_tail::<N>(0).map(|(values, _)| values)
    }

    /// Parses `N` leading floats followed by at most `max_tail` extra tokens,
    /// which are returned unparsed.
    pub fn floats_with_tail<const N: usize>(&self, max_tail: usize) -> Result<([f32; N], Vec<&str>)> {
        let tokens: Vec<&str> = self.values().collect();
        if tokens.len() < N || tokens.len() > N + max_tail {
            return Err(self.error(format!("expected {N} numbers, found {} tokens", tokens.len())));
        }
        let mut out = [0.0; N];
        for (slot, token) in out.iter_mut().zip(&tokens) {
            *slot = token
                .parse()
                .map_err(|_| self.error(format!("'{token}' is not a number")))?;
        }
        Ok((out, tokens[N..].to_vec()))
    }

    pub fn float(&self) -> Result<f32> {
        self.floats::<1>().map(|[v]| v)
    }

    /// `0`/`1` flag.
    pub fn flag(&self) -> Result<bool> {
        match self.raw.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.error(format!("expected 0 or 1, found '{other}'"))),
        }
    }

    pub fn text(&self) -> Result<&str> {
        if self.raw.is_empty() {
            Err(self.error("missing value"))
        } else {
            Ok(&self.raw)
        }
    }
}

/// A `<Kind>: <name> ... <Kind>End` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: String,
    pub name: String,
    /// 1-based line of the header.
    pub line: usize,
    pub fields: Vec<Field>,
}

impl Record {
    /// First field named `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// First field named `key`, or a parse error naming the record.
    pub fn required(&self, key: &str) -> Result<&Field> {
        self.field(key).ok_or_else(|| UmbraError::SceneParse {
            line: self.line,
            message: format!("{} '{}' is missing '{key}'", self.kind, self.name),
        })
    }

    /// All fields named `key`, in file order.
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.key == key)
    }
}

/// Splits a scene file into records.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut current: Option<Record> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match current.as_mut() {
            None => {
                let Some((kind, name)) = line.split_once(':') else {
                    return Err(UmbraError::SceneParse {
                        line: line_no,
                        message: format!("expected a block header, found '{line}'"),
                    });
                };
                let kind = kind.trim();
                if kind.is_empty() || kind.contains(char::is_whitespace) {
                    return Err(UmbraError::SceneParse {
                        line: line_no,
                        message: format!("invalid block kind '{kind}'"),
                    });
                }
                current = Some(Record {
                    kind: kind.to_string(),
                    name: name.trim().to_string(),
                    line: line_no,
                    fields: Vec::new(),
                });
            }
            Some(record) => {
                if line.strip_suffix("End") == Some(record.kind.as_str()) {
                    records.extend(current.take());
                    continue;
                }
                record.fields.push(split_field(line, line_no));
            }
        }
    }

    if let Some(open) = current {
        return Err(UmbraError::SceneParse {
            line: open.line,
            message: format!("{} '{}' has no {}End", open.kind, open.name, open.kind),
        });
    }
    Ok(records)
}

fn split_field(line: &str, line_no: usize) -> Field {
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    // `Key: value` or `Key:value`
    let (key, raw) = match line.split_once(':') {
        Some((key, raw)) if !key.contains(char::is_whitespace) => (key, raw),
        _ => (head, rest),
    };
    Field {
        key: key.to_string(),
        raw: raw.trim().to_string(),
        line: line_no,
    }
}
