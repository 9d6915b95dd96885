use serde::{Deserialize, Serialize};

/// Output format of a generated report artifact.
///
/// The wire and storage representation is the lowercase string
/// (`"pdf"` / `"csv"`); rendering itself happens in the external
/// generator — this core only routes the value through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ReportFormat::Pdf),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}
