use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Await a backend call behind a spinner; no spinner in JSON mode
pub async fn with_spinner<T, E, F>(enabled: bool, message: &str, done: &str, task: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    if !enabled {
        return task.await;
    }

    let pb = create_spinner(message);
    let result = task.await;
    match &result {
        Ok(_) => finish_success(&pb, done),
        Err(_) => finish_error(&pb, message.trim_end_matches('.')),
    }
    result
}
