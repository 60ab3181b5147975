//! Display utilities for the pomotimer CLI.
//!
//! This module provides formatted output for:
//! - Control acknowledgements
//! - Error messages
//! - Status display

use crate::types::{IpcResponse, TimerSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a toggle.
    pub fn show_toggle_success(response: &IpcResponse) {
        let marker = match &response.data {
            Some(data) if data.running => ">",
            _ => "||",
        };
        println!("{} {}", marker, response.message);

        if let Some(data) = &response.data {
            println!("  {} {}", data.phase.label(), data.display);
        }
    }

    /// Shows the result of a reset.
    pub fn show_reset_success(response: &IpcResponse) {
        println!("[] {}", response.message);

        if let Some(data) = &response.data {
            println!("  {} {}", data.phase.label(), data.display);
        }
    }

    /// Shows the result of a length change.
    pub fn show_adjust_success(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(data) = &response.data {
            println!("  {}", Self::lengths_line(data));
        }
    }

    /// Shows the result of a dismiss.
    pub fn show_dismiss_success(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows the result of a shutdown request.
    pub fn show_shutdown_success(response: &IpcResponse) {
        println!("[] {}", response.message);
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("No timer state available"),
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Returns the label of the start/pause control for the given running flag.
    pub fn control_label(running: bool) -> &'static str {
        if running {
            "Pause"
        } else {
            "Start"
        }
    }

    /// Renders the status panel.
    pub fn status_lines(data: &TimerSnapshot) -> Vec<String> {
        let mut lines = vec![
            data.phase.label().to_string(),
            "─────────────".to_string(),
            data.display.clone(),
            format!("[{}]", Self::control_label(data.running)),
            Self::lengths_line(data),
        ];

        if let Some(message) = &data.notification {
            lines.push(format!("! {}", message));
        }
        lines
    }

    fn lengths_line(data: &TimerSnapshot) -> String {
        format!(
            "Session: {} min / Break: {} min",
            data.session_minutes, data.break_minutes
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Phase, TimerState};

    fn idle_snapshot() -> TimerSnapshot {
        TimerSnapshot::from_timer_state(&TimerState::new())
    }

    fn completed_snapshot() -> TimerSnapshot {
        let mut state = TimerState::new();
        state.toggle();
        for _ in 0..=1500 {
            state.tick();
        }
        TimerSnapshot::from_timer_state(&state)
    }

    // ------------------------------------------------------------------------
    // Status Rendering Tests
    // ------------------------------------------------------------------------

    mod status_lines_tests {
        use super::*;

        #[test]
        fn test_control_label() {
            assert_eq!(Display::control_label(false), "Start");
            assert_eq!(Display::control_label(true), "Pause");
        }

        #[test]
        fn test_idle_status() {
            let lines = Display::status_lines(&idle_snapshot());

            assert_eq!(lines[0], "Session");
            assert_eq!(lines[2], "25:00");
            assert_eq!(lines[3], "[Start]");
            assert_eq!(lines[4], "Session: 25 min / Break: 5 min");
            assert_eq!(lines.len(), 5);
        }

        #[test]
        fn test_running_status_shows_pause() {
            let mut snapshot = idle_snapshot();
            snapshot.running = true;

            let lines = Display::status_lines(&snapshot);
            assert_eq!(lines[3], "[Pause]");
        }

        #[test]
        fn test_completed_status_shows_notification() {
            let snapshot = completed_snapshot();
            assert_eq!(snapshot.phase, Phase::Break);

            let lines = Display::status_lines(&snapshot);
            assert_eq!(lines[0], "Break");
            assert_eq!(lines[2], "05:00");
            assert_eq!(lines[3], "[Start]");
            assert_eq!(lines.last().unwrap(), "! Time to take a break!");
        }
    }

    // ------------------------------------------------------------------------
    // Display Output Tests
    // ------------------------------------------------------------------------

    mod display_tests {
        use super::*;

        #[test]
        fn test_show_toggle_running() {
            let mut snapshot = idle_snapshot();
            snapshot.running = true;
            let response = IpcResponse::success("Timer started", Some(snapshot));
            Display::show_toggle_success(&response);
        }

        #[test]
        fn test_show_toggle_without_data() {
            let response = IpcResponse::success("Timer paused", None);
            Display::show_toggle_success(&response);
        }

        #[test]
        fn test_show_reset() {
            let response = IpcResponse::success("Timer reset", Some(idle_snapshot()));
            Display::show_reset_success(&response);
        }

        #[test]
        fn test_show_adjust() {
            let response =
                IpcResponse::success("Session length set to 26 min", Some(idle_snapshot()));
            Display::show_adjust_success(&response);
        }

        #[test]
        fn test_show_dismiss_and_shutdown() {
            Display::show_dismiss_success(&IpcResponse::success("Notification dismissed", None));
            Display::show_shutdown_success(&IpcResponse::success("Daemon shutting down", None));
        }

        #[test]
        fn test_show_status_no_data() {
            let response = IpcResponse::success("", None);
            Display::show_status(&response);
        }

        #[test]
        fn test_show_error() {
            Display::show_error("Test error message");
        }
    }
}
