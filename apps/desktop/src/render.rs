use code_entry::{ControllerSnapshot, VerificationState};

pub fn render_cells(snapshot: &ControllerSnapshot) -> String {
    snapshot
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let ch = cell.unwrap_or('_');
            if snapshot.focus == Some(index) {
                format!("<{ch}>")
            } else {
                format!("[{ch}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_snapshot(snapshot: &ControllerSnapshot) -> String {
    let mut lines = Vec::new();

    if !snapshot.destination.is_empty() {
        lines.push(format!("Code sent to {}", snapshot.destination));
    }
    lines.push(render_cells(snapshot));

    match &snapshot.verification {
        VerificationState::Pending => lines.push("Verifying...".to_string()),
        VerificationState::Verified => lines.push("Verified.".to_string()),
        VerificationState::Idle | VerificationState::Failed(_) => {}
    }
    if let Some(error) = &snapshot.error {
        lines.push(format!("! {}", error.message()));
    }

    let resend = if snapshot.cooldown_remaining > 0 {
        format!("Resend available in {}s", snapshot.cooldown_remaining)
    } else if snapshot.can_resend {
        "Enter `resend` for a new code".to_string()
    } else {
        "Sending a new code...".to_string()
    };
    lines.push(resend);

    lines.join("\n")
}

/// Countdown-only changes are redrawn every ten seconds and when the cooldown
/// ends; anything else is redrawn immediately.
pub fn should_redraw(previous: Option<&ControllerSnapshot>, next: &ControllerSnapshot) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    let countdown_only = ControllerSnapshot {
        cooldown_remaining: next.cooldown_remaining,
        can_resend: next.can_resend,
        ..previous.clone()
    } == *next;

    !countdown_only || next.cooldown_remaining % 10 == 0
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
