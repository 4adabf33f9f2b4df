//! # Data & Methods Tab
//!
//! Static dataset sheet shown for every record.

use crate::{Record, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetField {
    pub label: &'static str,
    pub value: &'static str,
}

/// A downloadable bundle offered by the tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadOption {
    #[default]
    RawData,
    ProcessedData,
    Metadata,
    AnalysisScripts,
}

impl DownloadOption {
    pub const ALL: [DownloadOption; 4] = [
        DownloadOption::RawData,
        DownloadOption::ProcessedData,
        DownloadOption::Metadata,
        DownloadOption::AnalysisScripts,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RawData => "Download Raw Data",
            Self::ProcessedData => "Download Processed Data",
            Self::Metadata => "Download Metadata",
            Self::AnalysisScripts => "Download Analysis Scripts",
        }
    }

    /// Archive name for a record's bundle: `GLDS-394-raw-data.zip`.
    #[must_use]
    pub fn file_name(self, record: &Record) -> String {
        let stem = record
            .osdr_id
            .clone()
            .unwrap_or_else(|| format!("record-{}", record.id));
        let suffix = match self {
            Self::RawData => "raw-data.zip",
            Self::ProcessedData => "processed-data.zip",
            Self::Metadata => "metadata.json",
            Self::AnalysisScripts => "analysis-scripts.zip",
        };
        format!("{stem}-{suffix}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSheet {
    pub record: RecordId,
    pub osdr_id: Option<String>,
    pub info: Vec<SheetField>,
    pub conditions: Vec<SheetField>,
    pub downloads: Vec<DownloadOption>,
}

const fn field(label: &'static str, value: &'static str) -> SheetField {
    SheetField { label, value }
}

impl DatasetSheet {
    #[must_use]
    pub fn for_record(record: &Record) -> Self {
        Self {
            record: record.id,
            osdr_id: record.osdr_id.clone(),
            info: vec![
                field("Data Type", "Transcriptomic, Proteomic"),
                field("Sample Size", "24 biological replicates"),
                field("Platform", "RNA-seq, Mass Spectrometry"),
                field("File Format", "FASTQ, RAW, CSV"),
                field("Size", "2.3 GB"),
                field("Access Level", "Public"),
            ],
            conditions: vec![
                field("Microgravity Exposure", "48 hours"),
                field("Temperature", "22°C ± 1°C"),
                field("Humidity", "70% ± 5%"),
                field("Light Cycle", "16h light / 8h dark"),
            ],
            downloads: DownloadOption::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    #[test]
    fn sheet_lists_info_conditions_and_downloads() {
        let catalog = Catalog::builtin();
        let sheet = DatasetSheet::for_record(&catalog.records()[1]);

        assert_eq!(sheet.record, RecordId(2));
        assert_eq!(sheet.osdr_id.as_deref(), Some("GLDS-401"));
        assert_eq!(sheet.info.len(), 6);
        assert_eq!(sheet.conditions[0].value, "48 hours");
        assert_eq!(sheet.downloads.first().map(|d| d.label()), Some("Download Raw Data"));
    }

    #[test]
    fn download_names_fall_back_to_record_id() {
        let catalog = Catalog::builtin();
        assert_eq!(
            DownloadOption::RawData.file_name(&catalog.records()[0]),
            "GLDS-394-raw-data.zip"
        );
        assert_eq!(
            DownloadOption::Metadata.file_name(&catalog.records()[2]),
            "record-3-metadata.json"
        );
    }
}
