//! Manual device command handlers.

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;
use tracing::info;

use awning_api::{BondAction, BondClient};
use awning_config::Settings;
use awning_core::{DeviceError, DeviceState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Bridge client built from the bridge settings alone.
pub fn client(settings: &Settings) -> Result<BondClient, CliError> {
    settings.bridge()?.client().map_err(CliError::ClientSetup)
}

// ── Actions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manual {
    Open,
    Close,
    Stop,
    Toggle,
}

impl Manual {
    fn action(self) -> BondAction {
        match self {
            Self::Open => BondAction::Open,
            Self::Close => BondAction::Close,
            Self::Stop => BondAction::Stop,
            Self::Toggle => BondAction::ToggleOpen,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
            Self::Toggle => "toggle",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Self::Open => "Awning is opening",
            Self::Close => "Awning is closing",
            Self::Stop => "Awning stopped",
            Self::Toggle => "Awning toggled",
        }
    }
}

#[derive(Serialize)]
struct ActionView<'a> {
    action: &'static str,
    device_id: &'a str,
}

pub async fn act(
    client: &BondClient,
    manual: Manual,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    info!(action = manual.name(), device_id = client.device_id(), "sending command");
    client
        .send_action(manual.action())
        .await
        .map_err(|e| DeviceError::new(manual.name(), e))?;

    let view = ActionView {
        action: manual.action().as_str(),
        device_id: client.device_id(),
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &view, |_| {
        if color {
            format!("{} {}", "✓".green().bold(), manual.done())
        } else {
            format!("✓ {}", manual.done())
        }
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Status ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    state: String,
    /// Raw `open` field from the bridge.
    open: Option<i64>,
}

fn status_line(state: DeviceState, color: bool) -> String {
    let label = state.to_string();
    match (state, color) {
        (DeviceState::Open, true) => format!("Awning is {}", label.green().bold()),
        (DeviceState::Closed, true) => format!("Awning is {}", label.blue().bold()),
        (DeviceState::Unknown(_), true) => format!("Awning state: {}", label.yellow()),
        (DeviceState::Open | DeviceState::Closed, false) => format!("Awning is {label}"),
        (DeviceState::Unknown(_), false) => format!("Awning state: {label}"),
    }
}

pub async fn status(client: &BondClient, global: &GlobalOpts) -> Result<(), CliError> {
    let code = client
        .get_state()
        .await
        .map_err(|e| DeviceError::new("get state", e))?;
    let state = DeviceState::from_code(code);

    let view = StatusView {
        state: state.to_string(),
        open: code,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &view, |_| status_line(state, color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Info ────────────────────────────────────────────────────────────

/// Fields shown first, in this order, with friendlier labels.
const KNOWN_FIELDS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("type", "Type"),
    ("location", "Location"),
    ("template", "Template"),
    ("addr", "Address"),
    ("freq", "Frequency"),
    ("actions", "Actions"),
    ("properties", "Properties"),
    ("commands", "Commands"),
];

#[derive(Debug, PartialEq, Eq, Tabled)]
struct FieldRow {
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lists are joined, objects are summarized by size.
fn format_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => format!("{} items", map.len()),
        other => scalar_text(other),
    }
}

/// `last_seen_ts` -> `Last Seen Ts`.
fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = !ch.is_alphabetic();
    }
    out
}

fn info_rows(info: &Value) -> Vec<FieldRow> {
    let Some(map) = info.as_object() else {
        return vec![FieldRow {
            property: "Value".into(),
            value: format_value(info),
        }];
    };

    let known = KNOWN_FIELDS.iter().filter_map(|(key, label)| {
        map.get(*key).map(|value| FieldRow {
            property: (*label).to_owned(),
            value: format_value(value),
        })
    });
    let rest = map
        .iter()
        .filter(|(key, _)| !KNOWN_FIELDS.iter().any(|(known, _)| *known == key.as_str()))
        .map(|(key, value)| FieldRow {
            property: title_case(key),
            value: format_value(value),
        });
    known.chain(rest).collect()
}

fn info_detail(info: &Value, color: bool) -> String {
    let title = if color {
        "Device Information".cyan().bold().to_string()
    } else {
        "Device Information".to_owned()
    };
    format!("{title}\n{}", output::render_table(&info_rows(info)))
}

pub async fn info(client: &BondClient, global: &GlobalOpts) -> Result<(), CliError> {
    let info = client
        .get_info()
        .await
        .map_err(|e| DeviceError::new("get info", e))?;
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &info, |v| info_detail(v, color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn row(property: &str, value: &str) -> FieldRow {
        FieldRow {
            property: property.into(),
            value: value.into(),
        }
    }

    #[test]
    fn known_fields_come_first_with_labels() {
        let info = json!({
            "zeta": 1,
            "actions": ["Open", "Close", "Stop"],
            "name": "Patio Awning",
            "addr": "1234",
            "properties": {"a": 1, "b": 2},
        });
        assert_eq!(
            info_rows(&info),
            vec![
                row("Name", "Patio Awning"),
                row("Address", "1234"),
                row("Actions", "Open, Close, Stop"),
                row("Properties", "2 items"),
                row("Zeta", "1"),
            ]
        );
    }

    #[test]
    fn remaining_keys_are_title_cased() {
        assert_eq!(title_case("last_seen_ts"), "Last Seen Ts");
        assert_eq!(title_case("FW_VER"), "Fw Ver");
        assert_eq!(title_case("addr2x"), "Addr2X");
    }

    #[test]
    fn scalars_render_without_quotes() {
        assert_eq!(format_value(&json!("MS")), "MS");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!([1, "a"])), "1, a");
        assert_eq!(format_value(&json!(null)), "null");
    }

    #[test]
    fn non_object_info_still_renders() {
        assert_eq!(info_rows(&json!("odd")), vec![row("Value", "odd")]);
    }

    #[test]
    fn status_line_without_color() {
        assert_eq!(status_line(DeviceState::Open, false), "Awning is OPEN");
        assert_eq!(status_line(DeviceState::Closed, false), "Awning is CLOSED");
        assert_eq!(
            status_line(DeviceState::Unknown(Some(2)), false),
            "Awning state: unknown (open=2)"
        );
    }

    #[test]
    fn manual_commands_map_to_bridge_actions() {
        assert_eq!(Manual::Toggle.action(), BondAction::ToggleOpen);
        assert_eq!(Manual::Stop.action().as_str(), "Stop");
        assert_eq!(Manual::Close.name(), "close");
    }
}
