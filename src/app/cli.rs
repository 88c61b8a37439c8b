#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Show,
    Delete,
    Reopen,
    List,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "show" => CliVerb::Show,
        "delete" => CliVerb::Delete,
        "reopen" => CliVerb::Reopen,
        "list" => CliVerb::List,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run --script <json> [--tenant <yaml>] [--catalog <json>] [--ebo <id>]".to_string(),
        "                                       Replay scripted wizard actions against the store"
            .to_string(),
        "                                       Tenant and catalog default to tenant.yaml and"
            .to_string(),
        "                                       catalog.json in the state root".to_string(),
        "  show <ebo-id>                        Print a stored EBO as JSON".to_string(),
        "  delete <ebo-id>                      Delete a stored EBO".to_string(),
        "  reopen <ebo-id>                      Reopen a completed EBO".to_string(),
        "  list                                 List stored EBOs with their status".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Every command accepts --state-root <dir> (default: $HOME/.ebo-wizard).".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
