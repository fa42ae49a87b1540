use serde::Deserialize;
use std::{fmt, str::FromStr};

/// How validation errors are rendered for the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFormat {
    /// ANSI colors and the call site echo.
    Pretty,
    /// Same content as `Pretty`, without colors.
    #[default]
    Colorless,
    /// Only the error sentences.
    Minimal,
}

impl ErrorFormat {
    pub fn show_colors(self) -> bool {
        matches!(self, ErrorFormat::Pretty)
    }
}

impl FromStr for ErrorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(ErrorFormat::Pretty),
            "colorless" => Ok(ErrorFormat::Colorless),
            "minimal" => Ok(ErrorFormat::Minimal),
            other => Err(format!("Invalid error format `{other}`, expected pretty, colorless or minimal")),
        }
    }
}

impl fmt::Display for ErrorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorFormat::Pretty => f.write_str("pretty"),
            ErrorFormat::Colorless => f.write_str("colorless"),
            ErrorFormat::Minimal => f.write_str("minimal"),
        }
    }
}

/// Removes ANSI escape sequences.
pub fn strip_ansi(s: &str) -> String {
    match strip_ansi_escapes::strip(s.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => s.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn error_format_parses_from_config_strings() {
        assert_eq!("minimal".parse::<ErrorFormat>(), Ok(ErrorFormat::Minimal));
        assert!("loud".parse::<ErrorFormat>().is_err());
        assert_eq!(ErrorFormat::default(), ErrorFormat::Colorless);
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        colored::control::set_override(true);
        let painted = format!("{} and {}", "red".bright_red(), "bold".bold());

        assert_eq!(strip_ansi(&painted), "red and bold");
    }
}
