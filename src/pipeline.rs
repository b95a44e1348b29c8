use std::path::PathBuf;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::config::PipelineConfig;
use crate::enrich::enrich_rows;
use crate::error::Result;
use crate::flatten::{MergeRules, chunk_rows, merge_chunks};
use crate::io::csv_write;
use crate::io::excel_read;
use crate::io::media::MediaFetcher;
use crate::model::{MergedRecord, Row};

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub rows: usize,
    pub chunks: usize,
    pub downloads_ok: usize,
    pub downloads_failed: usize,
    pub output: PathBuf,
}

/// Reads the workbook, downloads the media of every row, merges rows chunk
/// by chunk and writes the CSV export.
///
/// Download failures are counted in the report; reading, directory creation
/// and writing failures abort the run.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %config.input.display(), output_dir = %config.output_dir.display())
)]
pub async fn run<F: MediaFetcher>(config: &PipelineConfig, fetcher: &F) -> Result<RunReport> {
    config.validate()?;

    let rows = excel_read::read_rows(&config.input)?;
    info!(row_count = rows.len(), "read rows from workbook");

    fs::create_dir_all(config.photos_dir()).await?;
    fs::create_dir_all(config.qrcodes_dir()).await?;

    let enriched = enrich_rows(rows, fetcher, config).await;
    info!(
        downloads_ok = enriched.downloads_ok,
        downloads_failed = enriched.downloads_failed,
        "media downloads finished"
    );

    let row_count = enriched.rows.len();
    let records = build_records(enriched.rows, config)?;
    debug!(record_count = records.len(), "chunks merged");

    let output = config.output_path();
    csv_write::write_csv(&output, &records)?;
    info!(output = %output.display(), "export written");

    Ok(RunReport {
        rows: row_count,
        chunks: records.len(),
        downloads_ok: enriched.downloads_ok,
        downloads_failed: enriched.downloads_failed,
        output,
    })
}

/// Groups enriched rows by `chunk_size` and merges every group into one record.
pub fn build_records(rows: Vec<Row>, config: &PipelineConfig) -> Result<Vec<MergedRecord>> {
    let chunks = chunk_rows(&rows, config.chunk_size)?;
    let media_columns = [config.photo_column.as_str(), config.qrcode_column.as_str()];
    let rules = MergeRules {
        name_column: &config.name_column,
        name_threshold: config.name_threshold,
        media_columns: &media_columns,
    };
    Ok(merge_chunks(&chunks, &rules))
}
