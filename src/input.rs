use crate::geometry::PanDirection;
use crate::sim::Action;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(ev: &InputEvent) -> Option<Action> {
    // raw mode swallows SIGINT
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C')) && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match ev.key {
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::ToggleLabels),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Left => Some(Action::Pan(PanDirection::Left)),
        KeyCode::Right => Some(Action::Pan(PanDirection::Right)),
        KeyCode::Up => Some(Action::Pan(PanDirection::Up)),
        KeyCode::Down => Some(Action::Pan(PanDirection::Down)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: KeyCode) -> InputEvent {
        InputEvent {
            key,
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn letters_toggle_overlays_in_either_case() {
        for c in ['l', 'L'] {
            assert_eq!(map_event_to_action(&key(KeyCode::Char(c))), Some(Action::ToggleLabels));
        }
        for c in ['h', 'H'] {
            assert_eq!(map_event_to_action(&key(KeyCode::Char(c))), Some(Action::ToggleHelp));
        }
    }

    #[test]
    fn every_exit_key_quits() {
        assert_eq!(map_event_to_action(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map_event_to_action(&key(KeyCode::Char('q'))), Some(Action::Quit));
        let ctrl_c = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        assert_eq!(map_event_to_action(&ctrl_c), Some(Action::Quit));
        // plain c is nothing
        assert_eq!(map_event_to_action(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn arrows_pan() {
        assert_eq!(
            map_event_to_action(&key(KeyCode::Left)),
            Some(Action::Pan(PanDirection::Left))
        );
        assert_eq!(
            map_event_to_action(&key(KeyCode::Down)),
            Some(Action::Pan(PanDirection::Down))
        );
        assert_eq!(map_event_to_action(&key(KeyCode::Enter)), None);
    }
}
