//! Configuration loading from files, streams and pre-parsed maps.
//!
//! Two on-disk formats are understood:
//! - `.toml` files; nested tables flatten to dotted keys (`[http] Retry = 2` → `http.Retry`)
//! - anything else is read as a key=value properties file

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::error::{ConfigResult, ConfigurationError};
use crate::config::ConfigurationMap;

/// Where a configuration comes from.
pub enum ConfigSource {
    /// A properties or TOML file on disk.
    File(PathBuf),
    /// A readable stream in properties syntax.
    Reader(Box<dyn Read + Send>),
    /// Values that are already parsed.
    Map(ConfigurationMap),
}

impl ConfigSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }
}

impl std::fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Map(map) => f.debug_tuple("Map").field(&map.len()).finish(),
        }
    }
}

impl From<ConfigurationMap> for ConfigSource {
    fn from(map: ConfigurationMap) -> Self {
        Self::Map(map)
    }
}

/// Read a source into a raw (not yet defaulted) configuration map.
pub fn load(source: ConfigSource) -> ConfigResult<ConfigurationMap> {
    match source {
        ConfigSource::File(path) => load_file(&path),
        ConfigSource::Reader(mut reader) => {
            let mut content = String::new();
            reader
                .read_to_string(&mut content)
                .map_err(|source| ConfigurationError::Io { path: None, source })?;
            parse_properties(&content)
        }
        ConfigSource::Map(map) => Ok(map),
    }
}

/// Load a configuration file, choosing the format by extension.
pub fn load_file(path: &Path) -> ConfigResult<ConfigurationMap> {
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: Some(path.to_path_buf()),
        source,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml(&content)
    } else {
        parse_properties(&content)
    }
}

/// Parse properties syntax: `key=value`, `key: value` or `key value`,
/// `#`/`!` comments, trailing-backslash continuations and backslash escapes.
pub fn parse_properties(input: &str) -> ConfigResult<ConfigurationMap> {
    let mut map = ConfigurationMap::new();
    let mut lines = input.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let mut logical = raw.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }

        while has_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        map.insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(map)
}

fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> ConfigResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| ConfigurationError::Parse {
                        line,
                        reason: format!("malformed \\u escape '\\u{hex}'"),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Parse a TOML document, flattening nested tables into dotted keys.
pub fn parse_toml(input: &str) -> ConfigResult<ConfigurationMap> {
    let table: toml::Table =
        toml::from_str(input).map_err(|e| ConfigurationError::Toml(e.to_string()))?;
    let mut map = ConfigurationMap::new();
    flatten_table("", &table, &mut map)?;
    Ok(map)
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut ConfigurationMap) -> ConfigResult<()> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&full_key, inner, out)?,
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            toml::Value::Integer(i) => {
                out.insert(full_key, i.to_string());
            }
            toml::Value::Float(f) => {
                out.insert(full_key, f.to_string());
            }
            toml::Value::Boolean(b) => {
                out.insert(full_key, b.to_string());
            }
            toml::Value::Array(_) | toml::Value::Datetime(_) => {
                return Err(ConfigurationError::Toml(format!(
                    "unsupported value type for '{full_key}'"
                )));
            }
        }
    }
    Ok(())
}
