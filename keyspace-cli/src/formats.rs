use std::str::FromStr;

use keyspace::DeletionPolicy;

/// Output format of report-style commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Aligned, human-readable tables.
    #[default]
    Text,
    /// One pretty-printed JSON document.
    Json,
    /// One row per (locale, category), with a header.
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!(
                "Unknown report format: '{}'. Supported formats: text, json, csv",
                s
            )),
        }
    }
}

/// `--policy` values, mapped onto the library's [`DeletionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PolicyArg {
    /// Drop keys the reference locale no longer has.
    Delete,
    /// Keep keys the reference locale no longer has.
    Preserve,
}

impl From<PolicyArg> for DeletionPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Delete => DeletionPolicy::DeleteMissing,
            PolicyArg::Preserve => DeletionPolicy::PreserveMissing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_policy_arg_maps_to_library_policy() {
        assert_eq!(
            DeletionPolicy::from(PolicyArg::Preserve),
            DeletionPolicy::PreserveMissing
        );
        assert_eq!(
            DeletionPolicy::from(PolicyArg::Delete),
            DeletionPolicy::DeleteMissing
        );
    }
}
