use super::*;

use anyhow::anyhow;
use code_entry::{CodeEntryController, EntrySettings};

fn controller() -> CodeEntryController {
    CodeEntryController::new("a***@example.com", &EntrySettings::default())
}

#[test]
fn cells_mark_focus_and_empty_slots() {
    let mut controller = controller();
    controller.paste("12");

    assert_eq!(
        render_cells(&controller.snapshot()),
        "[1] [2] <_> [_] [_] [_]"
    );
}

#[test]
fn rejected_code_shows_message_and_countdown() {
    let mut controller = controller();
    controller.paste("123456");
    controller.complete_verification(Err(anyhow!("Invalid code")));

    let text = render_snapshot(&controller.snapshot());
    assert_eq!(
        text,
        "Code sent to a***@example.com\n<_> [_] [_] [_] [_] [_]\n! Invalid code\nResend available in 60s"
    );
}

#[test]
fn pending_and_resend_states_are_described() {
    let mut controller = controller();
    controller.paste("123456");
    assert!(render_snapshot(&controller.snapshot()).contains("Verifying..."));

    while controller.tick() {}
    assert!(render_snapshot(&controller.snapshot()).contains("Enter `resend`"));

    controller.request_resend().expect("resend");
    assert!(render_snapshot(&controller.snapshot()).contains("Sending a new code..."));
}

#[test]
fn countdown_ticks_are_throttled() {
    let mut controller = controller();
    let first = controller.snapshot();
    assert!(should_redraw(None, &first));

    controller.tick();
    let tick = controller.snapshot();
    assert!(!should_redraw(Some(&first), &tick));

    for _ in 0..9 {
        controller.tick();
    }
    let fifty = controller.snapshot();
    assert_eq!(fifty.cooldown_remaining, 50);
    assert!(should_redraw(Some(&tick), &fifty));

    controller.enter_char(0, '4').expect("digit");
    assert!(should_redraw(Some(&fifty), &controller.snapshot()));
}
