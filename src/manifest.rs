use serde::Serialize;

use crate::error::GfetchError;

pub const NAME_COLUMN: &str = "Name";
pub const GROUP_COLUMN: &str = "Group";
pub const SUBGROUP_COLUMN: &str = "SubGroup";
pub const STATUS_COLUMN: &str = "Status";
pub const TAXID_COLUMN: &str = "TaxID";
pub const FTP_PATH_COLUMN: &str = "FTP Path";

pub const NO_DATA: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularRecord {
    pub name: String,
    pub group: String,
    pub subgroup: String,
    pub status: String,
    pub taxonomy_id: String,
    pub ftp_path: String,
    pub sequence_id: String,
    #[serde(skip)]
    pub fields: Vec<String>,
}

impl TabularRecord {
    pub fn has_data(&self) -> bool {
        self.ftp_path != NO_DATA
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    columns: Vec<String>,
    records: Vec<TabularRecord>,
}

struct ColumnIndex {
    name: usize,
    group: usize,
    subgroup: usize,
    status: usize,
    taxonomy_id: usize,
    ftp_path: usize,
    sequence_id: usize,
}

impl ColumnIndex {
    fn locate(columns: &[String], sequence_column: &str) -> Result<Self, GfetchError> {
        let find = |wanted: &str| {
            columns
                .iter()
                .position(|column| column == wanted)
                .ok_or_else(|| GfetchError::ManifestParse(format!("missing column '{wanted}'")))
        };
        Ok(Self {
            name: find(NAME_COLUMN)?,
            group: find(GROUP_COLUMN)?,
            subgroup: find(SUBGROUP_COLUMN)?,
            status: find(STATUS_COLUMN)?,
            taxonomy_id: find(TAXID_COLUMN)?,
            ftp_path: find(FTP_PATH_COLUMN)?,
            sequence_id: find(sequence_column)?,
        })
    }

    fn record(&self, fields: Vec<String>) -> TabularRecord {
        TabularRecord {
            name: fields[self.name].clone(),
            group: fields[self.group].clone(),
            subgroup: fields[self.subgroup].clone(),
            status: fields[self.status].clone(),
            taxonomy_id: fields[self.taxonomy_id].clone(),
            ftp_path: fields[self.ftp_path].clone(),
            sequence_id: fields[self.sequence_id].clone(),
            fields,
        }
    }
}

impl Manifest {
    pub fn parse(
        text: &str,
        header_skip: usize,
        sequence_column: &str,
    ) -> Result<Self, GfetchError> {
        let body = text.get(header_skip..).ok_or_else(|| {
            GfetchError::ManifestParse(format!(
                "cannot skip {header_skip} header bytes of a {} byte manifest",
                text.len()
            ))
        })?;

        let mut lines = body
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')));

        let header = match lines.next() {
            Some((_, line)) if !line.trim().is_empty() => line,
            _ => return Err(GfetchError::ManifestParse("missing header row".to_string())),
        };
        let columns: Vec<String> = header.split('\t').map(str::to_string).collect();
        let index = ColumnIndex::locate(&columns, sequence_column)?;

        let mut records = Vec::new();
        for (line_no, line) in lines {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
            if fields.len() != columns.len() {
                return Err(GfetchError::ManifestParse(format!(
                    "line {line_no}: expected {} fields, found {}",
                    columns.len(),
                    fields.len()
                )));
            }
            records.push(index.record(fields));
        }

        tracing::debug!(
            records = records.len(),
            columns = columns.len(),
            "parsed manifest"
        );
        Ok(Self { columns, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[TabularRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
