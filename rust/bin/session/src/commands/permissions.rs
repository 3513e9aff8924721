//! `permissions`: build a snapshot from a raw payload and query it.

use anyhow::Result;
use openerp_session::{PermissionPayload, PermissionSnapshot};

/// Split `module:action`.
pub fn parse_check(check: &str) -> Result<(&str, &str)> {
    match check.split_once(':') {
        Some((module, action)) if !module.is_empty() && !action.is_empty() => Ok((module, action)),
        _ => anyhow::bail!("expected MODULE:ACTION, got \"{}\"", check),
    }
}

/// Module table: one module per line with its granted actions.
pub fn render_table(snapshot: &PermissionSnapshot) -> String {
    if snapshot.is_admin() {
        return "administrator: all modules, all actions".to_string();
    }
    if snapshot.modules().is_empty() {
        return "no permissions".to_string();
    }

    let width = snapshot
        .modules()
        .keys()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("MODULE".len());

    let mut lines = vec![format!("{:<width$}  ACTIONS", "MODULE")];
    for (module, grant) in snapshot.modules() {
        let actions = if grant.is_empty() {
            "-".to_string()
        } else {
            grant.actions().collect::<Vec<_>>().join(", ")
        };
        lines.push(format!("{:<width$}  {}", module, actions));
    }
    lines.join("\n")
}

/// Build a snapshot from `body` and print it, or answer a single check.
pub fn permissions(body: &str, check: Option<&str>, json_output: bool) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| anyhow::anyhow!("invalid JSON: {}", e))?;

    if PermissionPayload::from_value(Some(&value)) == PermissionPayload::Malformed {
        eprintln!("warning: payload is malformed, every permission is denied");
    }
    let snapshot = PermissionSnapshot::build(Some(&value));

    if let Some(check) = check {
        let (module, action) = parse_check(check)?;
        let allowed = snapshot.has_permission(module, action);
        if json_output {
            println!(
                "{}",
                serde_json::json!({"module": module, "action": action, "allowed": allowed})
            );
        } else {
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        return Ok(());
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", render_table(&snapshot));
    }
    Ok(())
}
