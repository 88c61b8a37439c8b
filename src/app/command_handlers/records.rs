use crate::app::command_support::{
    ensure_state_root, flag_value, open_store, reject_unknown_flags, split_flags,
};
use crate::gateway::EboGateway;
use crate::runtime::{append_wizard_log, StatePaths};
use crate::shared::ids::EboId;

fn single_ebo_id(args: &[String], usage: &str) -> Result<(EboId, StatePaths), String> {
    let (positional, flags) = split_flags(args)?;
    reject_unknown_flags(&flags, &["state-root"])?;
    if positional.len() != 1 {
        return Err(format!("usage: {usage}"));
    }
    let ebo_id = EboId::parse(&positional[0])?;
    let paths = ensure_state_root(flag_value(&flags, "state-root"))?;
    Ok((ebo_id, paths))
}

pub fn cmd_show(args: &[String]) -> Result<String, String> {
    let (ebo_id, paths) = single_ebo_id(args, "show <ebo-id> [--state-root <dir>]")?;
    let store = open_store(&paths, None)?;
    let record = store.load(&ebo_id).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&record).map_err(|e| format!("failed to encode ebo: {e}"))
}

pub fn cmd_delete(args: &[String]) -> Result<String, String> {
    let (ebo_id, paths) = single_ebo_id(args, "delete <ebo-id> [--state-root <dir>]")?;
    let store = open_store(&paths, None)?;
    match store.delete_ebo(&ebo_id) {
        Ok(true) => {
            append_wizard_log(&paths, "info", "ebo.delete", &format!("deleted ebo {ebo_id}"));
            Ok(format!("deleted ebo {ebo_id}"))
        }
        Ok(false) => Err(format!("ebo `{ebo_id}` does not exist")),
        Err(err) => {
            append_wizard_log(&paths, "error", "ebo.delete", &err.to_string());
            Err(err.to_string())
        }
    }
}

pub fn cmd_reopen(args: &[String]) -> Result<String, String> {
    let (ebo_id, paths) = single_ebo_id(args, "reopen <ebo-id> [--state-root <dir>]")?;
    let store = open_store(&paths, None)?;
    match store.reopen_ebo(&ebo_id) {
        Ok(record) => {
            let message = format!("ebo {} is {}", record.id, record.status);
            append_wizard_log(&paths, "info", "ebo.reopen", &message);
            Ok(message)
        }
        Err(err) => {
            append_wizard_log(&paths, "error", "ebo.reopen", &err.to_string());
            Err(err.to_string())
        }
    }
}

pub fn cmd_list(args: &[String]) -> Result<String, String> {
    let (positional, flags) = split_flags(args)?;
    reject_unknown_flags(&flags, &["state-root"])?;
    if !positional.is_empty() {
        return Err("usage: list [--state-root <dir>]".to_string());
    }
    let paths = ensure_state_root(flag_value(&flags, "state-root"))?;
    let store = open_store(&paths, None)?;
    let records = store.list().map_err(|e| e.to_string())?;
    if records.is_empty() {
        return Ok("no ebos".to_string());
    }
    Ok(records
        .iter()
        .map(|record| {
            let created_by = record
                .created_by
                .as_ref()
                .map(|user| user.name.as_str())
                .unwrap_or("-");
            format!("{}\t{}\t{}", record.id, record.status, created_by)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
