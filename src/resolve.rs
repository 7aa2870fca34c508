use crate::config::Config;
use crate::error::GfetchError;
use crate::manifest::TabularRecord;

const VERSION_SUFFIX_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct TransferJob<'m> {
    pub record: &'m TabularRecord,
    pub remote_path: String,
    pub local_filename: String,
}

#[derive(Debug, Clone)]
pub struct AssetPathResolver {
    base_dir: String,
    extension: String,
}

impl AssetPathResolver {
    pub fn new(base_dir: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_dir, &config.sequence_extension)
    }

    pub fn resolve<'m>(&self, record: &'m TabularRecord) -> Result<TransferJob<'m>, GfetchError> {
        let local_filename = self.local_filename(record)?;
        let remote_path = join_remote(&[&self.base_dir, &record.ftp_path, &local_filename]);
        Ok(TransferJob {
            record,
            remote_path,
            local_filename,
        })
    }

    fn local_filename(&self, record: &TabularRecord) -> Result<String, GfetchError> {
        let sequence_id = record.sequence_id.as_str();
        let count = sequence_id.chars().count();
        if count <= VERSION_SUFFIX_LEN {
            return Err(GfetchError::MalformedRecord {
                taxonomy_id: record.taxonomy_id.clone(),
                reason: format!("sequence id '{sequence_id}' is too short to name a file"),
            });
        }
        let stem: String = sequence_id.chars().take(count - VERSION_SUFFIX_LEN).collect();
        Ok(format!("{stem}{}", self.extension))
    }
}

pub fn join_remote(segments: &[&str]) -> String {
    let mut joined = String::new();
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        if joined.is_empty() {
            joined.push_str(segment.trim_end_matches('/'));
            continue;
        }
        joined.push('/');
        joined.push_str(segment.trim_matches('/'));
    }
    joined
}
