// src/core/aliases.rs

use crate::core::arg_parser::split_words;
use crate::core::errors::ShellError;
use crate::models::Builtin;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    /// `alias <name>='<body>'`, the only accepted definition form.
    static ref ALIAS_DEFINITION: Regex =
        Regex::new(r"^\s*alias\s+([A-Za-z0-9_]+)='([^']*)'\s*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub body: String,
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, t!("alias.entry"), name = self.name, body = self.body)
    }
}

/// User-defined command aliases, kept in definition order.
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a full `alias name='body'` command line and registers it.
    pub fn define_from_line(&mut self, line: &str) -> Result<(), ShellError> {
        let captures = ALIAS_DEFINITION
            .captures(line)
            .ok_or_else(|| ShellError::parse("alias", "invalid alias format"))?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());
        self.define(name, body)
    }

    /// Registers `name`, which must be a free word that is not a builtin.
    pub fn define(&mut self, name: &str, body: &str) -> Result<(), ShellError> {
        let valid_name =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(ShellError::parse("alias", "invalid alias format"));
        }
        if Builtin::is_reserved(name) || self.contains(name) {
            return Err(ShellError::argument(
                "alias",
                format!("{name} already exists or is a reserved command"),
            ));
        }
        log::debug!("Defining alias '{}' as '{}'", name, body);
        self.entries.push(Alias {
            name: name.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), ShellError> {
        let position = self
            .entries
            .iter()
            .position(|alias| alias.name == name)
            .ok_or_else(|| ShellError::lookup("unalias", format!("{name} alias does not exist")))?;
        self.entries.remove(position);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|alias| alias.name == name)
            .map(|alias| alias.body.as_str())
    }

    /// Aliases in the order they were defined.
    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.entries.iter()
    }

    /// Replaces a leading alias with its body and re-appends the remaining words.
    /// Lines that do not start with an alias come back unchanged.
    pub fn expand(&self, line: &str) -> String {
        let words = split_words(line);
        let Some((first, rest)) = words.split_first() else {
            return line.to_string();
        };
        match self.get(first) {
            Some(body) => {
                let mut expanded = body.to_string();
                for word in rest {
                    expanded.push(' ');
                    expanded.push_str(word);
                }
                log::debug!("Alias expansion: '{}' -> '{}'", line, expanded);
                expanded
            }
            None => line.to_string(),
        }
    }
}
