//! Plain-text rendering of a roll session.

use super::engine::{EngineSession, EngineState};
use crate::dice::RollMode;

/// Render `session` into at most `height` lines of at most `width` characters.
pub fn render_session(session: &EngineSession, width: usize, height: usize) -> String {
    if width == 0 || height == 0 {
        return String::new();
    }

    let lines = match session.state {
        EngineState::Idle => return String::new(),
        EngineState::AdvantagePrompt => prompt_lines(session),
        EngineState::CustomRollConfig => custom_lines(session),
        EngineState::Animating => animating_lines(session),
        EngineState::Showing => showing_lines(session),
    };

    lines
        .into_iter()
        .take(height)
        .map(|line| line.chars().take(width).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn title(session: &EngineSession) -> String {
    match &session.request {
        Some(request) => format!("{} ({})", request.label, request.notation()),
        None => "Roll".to_string(),
    }
}

fn prompt_lines(session: &EngineSession) -> Vec<String> {
    vec![
        title(session),
        String::new(),
        "[n] Normal  [a] Advantage  [d] Disadvantage".to_string(),
        "[Esc] Cancel".to_string(),
    ]
}

fn custom_lines(session: &EngineSession) -> Vec<String> {
    let Some(custom) = session.custom else {
        return Vec::new();
    };

    vec![
        "Custom Roll".to_string(),
        String::new(),
        format!("  {}  x {}", custom.die, custom.quantity),
        format!("  = {}", custom.expression()),
        String::new(),
        "[</>] Die  [+/-] Quantity  [Enter] Roll  [Esc] Cancel".to_string(),
    ]
}

fn dice_row(values: &[u32], dropped_from: usize) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i >= dropped_from {
                format!("({v:>2})")
            } else {
                format!("[{v:>2}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn animating_lines(session: &EngineSession) -> Vec<String> {
    let animation = &session.animation;
    vec![
        title(session),
        String::new(),
        dice_row(&animation.display_values, animation.dropped_from),
        String::new(),
        format!(
            "Rolling... {}/{}",
            animation.frame.min(animation.total_frames),
            animation.total_frames
        ),
        "[Esc] Cancel".to_string(),
    ]
}

fn showing_lines(session: &EngineSession) -> Vec<String> {
    let mut lines = vec![title(session), String::new()];

    match session.mode {
        RollMode::Normal => {}
        mode => lines.push(format!("({})", mode.name())),
    }

    lines.push(dice_row(
        &session.animation.display_values,
        session.animation.dropped_from,
    ));

    if let Some(outcome) = &session.outcome {
        lines.push(String::new());
        lines.push(format!("Total: {}", outcome.total));
        lines.push(outcome.dice_display());
    }

    if let Some(entry) = &session.entry {
        if entry.critical_success {
            lines.push("NAT 20! CRITICAL!".to_string());
        } else if entry.critical_failure {
            lines.push("NAT 1! FUMBLE!".to_string());
        }
    }

    lines.push(String::new());
    match &session.follow_up {
        Some(next) => {
            lines.push(format!("[Enter] Roll {}  [s] Skip", next.label));
        }
        None => lines.push("Press any key".to_string()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{EngineConfig, EngineInput, RollEngine, RollRequest};

    #[test]
    fn test_idle_renders_nothing() {
        let engine = RollEngine::new(EngineConfig::default().with_seed(1));
        assert_eq!(engine.render(80, 24), "");
    }

    #[test]
    fn test_prompt_render() {
        let mut engine = RollEngine::new(EngineConfig::default().with_seed(1));
        engine.submit(
            RollRequest::new("Perception", "1d20")
                .with_modifier(4)
                .prompt_for_advantage(),
        );
        let text = engine.render(80, 24);
        assert!(text.starts_with("Perception (1d20+4)"));
        assert!(text.contains("Advantage"));
    }

    #[test]
    fn test_custom_render() {
        let mut engine = RollEngine::new(EngineConfig::default().with_seed(1));
        engine.open_custom_roll();
        engine.handle_input(EngineInput::AdjustQuantity(2));
        assert!(engine.render(80, 24).contains("= 3d4"));
    }

    #[test]
    fn test_render_respects_bounds() {
        let mut engine = RollEngine::new(EngineConfig::default().with_seed(1));
        engine.submit(RollRequest::new("Fireball", "8d6"));
        let text = engine.render(10, 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(engine.render(0, 3), "");
    }

    #[test]
    fn test_showing_render_has_total() {
        let mut engine = RollEngine::new(EngineConfig::default().with_seed(1));
        engine.submit(RollRequest::new("Hit Dice", "1d10").with_modifier(2));
        while engine.tick().len() == 1 {}
        let total = engine.session().outcome.as_ref().unwrap().total;
        let text = engine.render(80, 24);
        assert!(text.contains(&format!("Total: {total}")));
        assert!(text.contains("Press any key"));
    }
}
