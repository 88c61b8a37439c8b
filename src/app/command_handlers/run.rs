use crate::app::command_support::{
    ensure_state_root, flag_value, map_config_err, reject_unknown_flags, required_flag,
    split_flags,
};
use crate::app::script::WizardScript;
use crate::config::{load_library_catalog, load_tenant_config};
use crate::gateway::FileEboStore;
use crate::runtime::{RunnerError, WizardRunner};
use crate::shared::ids::EboId;
use crate::steps::photo_upload::PassThroughDownscaler;
use crate::wizard::{Wizard, WizardEffect, WizardInit};
use chrono::Utc;
use std::path::{Path, PathBuf};

const RUN_USAGE: &str = "usage: run --script <json> [--tenant <yaml>] [--catalog <json>] \
     [--ebo <id>] [--state-root <dir>]";

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    let (positional, flags) = split_flags(args)?;
    reject_unknown_flags(&flags, &["tenant", "catalog", "script", "ebo", "state-root"])?;
    if !positional.is_empty() {
        return Err(RUN_USAGE.to_string());
    }
    let script = WizardScript::from_path(Path::new(required_flag(&flags, "script")?))?;
    let paths = ensure_state_root(flag_value(&flags, "state-root"))?;
    let tenant_path = flag_value(&flags, "tenant")
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.tenant_file());
    let catalog_path = flag_value(&flags, "catalog")
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.catalog_file());
    let tenant = load_tenant_config(&tenant_path).map_err(map_config_err)?;
    let catalog = load_library_catalog(&catalog_path).map_err(map_config_err)?;
    let now = script.now.unwrap_or_else(Utc::now);

    let store = FileEboStore::new(&paths.root, catalog.clone(), script.user.clone());
    let saved = match flag_value(&flags, "ebo") {
        Some(raw) => Some(store.load(&EboId::parse(raw)?).map_err(|e| e.to_string())?),
        None => None,
    };
    let (wizard, effects) = Wizard::init(
        tenant,
        WizardInit {
            saved,
            opcos: catalog.opcos.clone(),
            current_user: script.user.clone(),
        },
    )
    .map_err(|e| e.to_string())?;

    let downscaler = PassThroughDownscaler;
    let mut runner = WizardRunner::new(wizard, &store, &store, &downscaler, paths);
    let mut lines = Vec::new();
    let surfaced = runner.start(effects, now).map_err(|e| e.to_string())?;
    lines.extend(surfaced.iter().map(describe_effect));

    for action in script.actions {
        let name = action.name();
        match runner.dispatch_at(action, now) {
            Ok(surfaced) => lines.extend(surfaced.iter().map(describe_effect)),
            Err(RunnerError::Wizard(err)) => lines.push(format!("rejected {name}: {err}")),
            Err(err) => return Err(err.to_string()),
        }
    }

    lines.extend(describe_wizard(&runner.wizard, now));
    Ok(lines.join("\n"))
}

pub fn describe_effect(effect: &WizardEffect) -> String {
    match effect {
        WizardEffect::ShowAlert { message, .. } => format!("alert: {message}"),
        WizardEffect::FocusElement { element_id } => format!("focus: {element_id}"),
        WizardEffect::ConfirmActivityRemoval { removed } => format!(
            "confirm removal: {}",
            removed
                .iter()
                .map(|task| format!("{}#{}/{}", task.activity_name, task.instance_id, task.task_id))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        WizardEffect::PromptRecommendedHazards {
            sub_step,
            hazard_ids,
        } => format!(
            "recommended hazards for {}: {}",
            sub_step.completed_key(),
            hazard_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        WizardEffect::Redirect => "redirect".to_string(),
        other => format!("effect: {other:?}"),
    }
}

fn describe_wizard(wizard: &Wizard, now: chrono::DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        format!(
            "ebo: {}",
            wizard
                .ebo_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "(unsaved)".to_string())
        ),
        format!("status: {}", wizard.status),
        format!(
            "step: {}{}",
            wizard.current_step,
            wizard
                .sub_step
                .as_ref()
                .map(|sub_step| format!(" ({})", sub_step.completed_key()))
                .unwrap_or_default()
        ),
        format!(
            "badges: {}",
            wizard
                .badges(now)
                .iter()
                .map(|(step, badge)| format!("{step}={badge}"))
                .collect::<Vec<_>>()
                .join(" ")
        ),
    ];
    if let Some(error) = &wizard.form_error {
        lines.push(format!("form error: {}", error.message));
    }
    let unsaved = wizard.unsaved_steps();
    if !unsaved.is_empty() {
        lines.push(format!(
            "unsaved: {}",
            unsaved
                .iter()
                .map(|step| step.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    lines
}
