//! `whoami`: how the backend sees the caller.

use serde::Serialize;

use birdwatch_core::{GateState, Session, UserRole};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Whoami {
    backend: String,
    principal: Option<String>,
    gate: GateState,
    role: Option<UserRole>,
    display_name: Option<String>,
}

fn detail(w: &Whoami, color: bool) -> String {
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_owned();
    [
        format!("Backend:   {}", w.backend),
        format!("Principal: {}", or_dash(w.principal.as_deref())),
        format!("Access:    {}", output::gate_label(w.gate, color)),
        format!("Role:      {}", or_dash(w.role.map(|r| r.to_string()).as_deref())),
        format!("Name:      {}", or_dash(w.display_name.as_deref())),
    ]
    .join("\n")
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let identity = session.identity().await;

    // Role and profile are informational; a failed lookup still shows the gate.
    let role = match session.caller_role().await.into_result() {
        Ok(role) => Some(*role),
        Err(e) => {
            tracing::debug!(error = %e, "caller role unavailable");
            None
        }
    };
    let display_name = match session.caller_profile().await.into_result() {
        Ok(profile) => Option::as_ref(&profile).map(|p| p.name.clone()),
        Err(e) => {
            tracing::debug!(error = %e, "caller profile unavailable");
            None
        }
    };

    let summary = Whoami {
        backend: session.config().backend_url.to_string(),
        principal: identity.map(|i| i.principal().to_owned()),
        gate: session.gate_state(),
        role,
        display_name,
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &summary,
        |w| detail(w, color),
        |w| w.gate.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
