use console::style;
use geruest_core::GeruestError;
use std::fmt;

/// Error banner with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Banner for a domain error; the headline is always [`GeruestError::user_message`]
pub fn from_geruest(error: &GeruestError) -> CliError {
    let banner = CliError::new(error.user_message());

    match error {
        GeruestError::AddressNotFound { .. } => banner
            .with_suggestion("Check spelling, or add postcode and town: \"Bundesplatz 3, 3005 Bern\"")
            .with_help("Run: geruest lookup --help"),
        GeruestError::NoFacadesSelected => banner
            .with_suggestion("Pass --facades with at least one index from 'geruest facades <address>'")
            .with_help("Run: geruest takeoff --help"),
        GeruestError::InvalidFacadeIndex { .. } => banner
            .with_context("Facades of 0.5 m or less cannot be selected.")
            .with_suggestion("List selectable facades: geruest facades <address>"),
        GeruestError::BackendUnavailable { reason, remediation } => banner
            .with_context(reason.clone())
            .with_suggestion(remediation.clone())
            .with_suggestion("Check the configured URL: geruest config"),
        GeruestError::BackendStatus { body, .. } => {
            let banner = banner.with_suggestion("Re-run the command");
            if body.is_empty() {
                banner
            } else {
                banner.with_context(body.clone())
            }
        }
        GeruestError::Timeout { .. } => banner
            .with_suggestion("Re-run the command; finished drawings are cached")
            .with_suggestion("Raise the limit: GERUEST_DRAWING_TIMEOUT=300"),
        GeruestError::ConfigInvalid { key, reason } => banner
            .with_context(format!("Key: {}\nReason: {}", key, reason))
            .with_suggestion("Check geruest.toml and GERUEST_* environment variables")
            .with_help("Run: geruest config"),
        GeruestError::DomainStatus { status, debug: Some(debug), .. } => banner.with_context(format!(
            "Status: {}\nKacheln geprüft: {}, Gebäude in Kachel: {}, Messpunkte: {}",
            status, debug.tiles_checked, debug.buildings_in_tile, debug.points_sampled
        )),
        GeruestError::InvalidGeometry { .. } => banner
            .with_suggestion("Use the backend's facade list instead (omit --derive)"),
        _ => banner,
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return CliError {
            message: cli_error.message.clone(),
            context: cli_error.context.clone(),
            suggestions: cli_error.suggestions.clone(),
            help_command: cli_error.help_command.clone(),
        };
    }

    if let Some(domain) = error.downcast_ref::<GeruestError>() {
        return from_geruest(domain);
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") || message.contains("Permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geruest_core::models::HeightDebug;

    #[test]
    fn test_domain_error_uses_user_message() {
        let err = anyhow::Error::new(GeruestError::NoFacadesSelected);
        let banner = from_anyhow(err);
        assert!(banner.message.contains("select at least one facade"));
        assert!(!banner.suggestions.is_empty());
    }

    #[test]
    fn test_context_does_not_hide_domain_error() {
        let err = anyhow::Error::new(GeruestError::Timeout { after_secs: 120 })
            .context("Generating drawings");
        let banner = from_anyhow(err);
        assert!(banner.message.contains("120"));
    }

    #[test]
    fn test_height_import_failure_shows_counters() {
        let err = GeruestError::DomainStatus {
            status: "no_heights_found".to_string(),
            message: "Gebäude nicht im Höhenmodell".to_string(),
            debug: Some(HeightDebug { tiles_checked: 1, buildings_in_tile: 412, points_sampled: 0 }),
        };
        let banner = from_geruest(&err);
        assert_eq!(banner.message, "Gebäude nicht im Höhenmodell");
        assert!(banner.context.as_deref().is_some_and(|c| c.contains("412")));
    }

    #[test]
    fn test_plain_error_passes_through() {
        let banner = from_anyhow(anyhow::anyhow!("something odd"));
        assert_eq!(banner.message, "something odd");
    }
}
