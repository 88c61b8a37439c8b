use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod records;
pub mod run;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Run => run::cmd_run(&args[1..]),
        CliVerb::Show => records::cmd_show(&args[1..]),
        CliVerb::Delete => records::cmd_delete(&args[1..]),
        CliVerb::Reopen => records::cmd_reopen(&args[1..]),
        CliVerb::List => records::cmd_list(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
