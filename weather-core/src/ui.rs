//! Seams to the host UI: blocking alerts and the info dialog.

/// Shows a blocking, user-facing message.
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Info dialog shown at start-up and dismissed after a successful fetch.
pub trait Modal {
    fn show(&mut self);
    fn hide(&mut self);
}
