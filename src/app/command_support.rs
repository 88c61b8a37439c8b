use crate::config::{default_state_root, load_library_catalog, ConfigError};
use crate::ebo::UserRef;
use crate::gateway::FileEboStore;
use crate::library::LibraryCatalog;
use crate::runtime::{bootstrap_state_root, StatePaths};
use std::path::{Path, PathBuf};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Splits `--flag value` pairs from positional arguments.
pub fn split_flags(args: &[String]) -> Result<(Vec<String>, Vec<(String, String)>), String> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(name) = arg.strip_prefix("--") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| format!("--{name} requires a value"))?;
            flags.push((name.to_string(), value.clone()));
            i += 2;
        } else {
            positional.push(arg.clone());
            i += 1;
        }
    }
    Ok((positional, flags))
}

pub fn flag_value<'a>(flags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    flags
        .iter()
        .rev()
        .find(|(flag, _)| flag == name)
        .map(|(_, value)| value.as_str())
}

pub fn required_flag<'a>(flags: &'a [(String, String)], name: &str) -> Result<&'a str, String> {
    flag_value(flags, name).ok_or_else(|| format!("missing required flag --{name}"))
}

pub fn reject_unknown_flags(flags: &[(String, String)], known: &[&str]) -> Result<(), String> {
    match flags.iter().find(|(name, _)| !known.contains(&name.as_str())) {
        Some((name, _)) => Err(format!("unknown flag --{name}")),
        None => Ok(()),
    }
}

pub fn ensure_state_root(state_root: Option<&str>) -> Result<StatePaths, String> {
    let root = match state_root {
        Some(raw) => PathBuf::from(raw),
        None => default_state_root().map_err(map_config_err)?,
    };
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

/// The catalog next to the state, or an empty one when none was installed.
pub fn load_catalog_or_default(path: &Path) -> Result<LibraryCatalog, String> {
    if !path.exists() {
        return Ok(LibraryCatalog::default());
    }
    load_library_catalog(path).map_err(map_config_err)
}

pub fn open_store(paths: &StatePaths, user: Option<UserRef>) -> Result<FileEboStore, String> {
    let catalog = load_catalog_or_default(&paths.catalog_file())?;
    Ok(FileEboStore::new(&paths.root, catalog, user))
}
