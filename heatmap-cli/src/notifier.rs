//! Terminal notification surface.

use colored::*;

use heatmap_core::notify::{Notification, NotificationKind};
use heatmap_core::traits::Notifier;

/// Prints notifications to stderr, coloured by kind.
///
/// Stdout is left for command output so it can be piped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn render(notification: &Notification) -> String {
        let message = notification.message.as_str();
        match notification.kind {
            NotificationKind::Success => format!("{} {}", "✅".green(), message.green()),
            NotificationKind::Info => format!("{} {}", "ℹ️ ".cyan(), message.cyan()),
            NotificationKind::Warning => format!("{} {}", "⚠️ ".yellow(), message.yellow()),
            NotificationKind::Error => format!("{} {}", "❌".red(), message.red().bold()),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", Self::render(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_message() {
        colored::control::set_override(false);
        let line = ConsoleNotifier::render(&Notification::error("Failed to load data: boom"));
        assert!(line.ends_with("Failed to load data: boom"));
        let line = ConsoleNotifier::render(&Notification::info("Showing all 3 locations"));
        assert!(line.contains("Showing all 3 locations"));
    }
}
