use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{PathPolicy, PipelineConfig};
use crate::io::media::MediaFetcher;
use crate::model::Row;

/// Rows after media download, with download counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enriched {
    pub rows: Vec<Row>,
    pub downloads_ok: usize,
    pub downloads_failed: usize,
}

struct MediaSlot<'a> {
    column: &'a str,
    dir: PathBuf,
    prefix: &'static str,
}

impl MediaSlot<'_> {
    fn file_name(&self, row_index: usize) -> String {
        format!("{}{row_index}.jpg", self.prefix)
    }
}

/// Downloads the photo and QR code of every row, one at a time in row order,
/// and rewrites both columns to the local file path according to the
/// configured [`PathPolicy`].
///
/// Files are named `image<N>.jpg` and `qrcode<N>.jpg` where `N` is the 1-based
/// row index across the whole input. Download failures are logged and counted
/// but never abort the batch.
pub async fn enrich_rows<F: MediaFetcher>(
    rows: Vec<Row>,
    fetcher: &F,
    config: &PipelineConfig,
) -> Enriched {
    let slots = [
        MediaSlot {
            column: &config.photo_column,
            dir: config.photos_dir(),
            prefix: "image",
        },
        MediaSlot {
            column: &config.qrcode_column,
            dir: config.qrcodes_dir(),
            prefix: "qrcode",
        },
    ];

    let mut enriched = Enriched::default();
    for (index, mut row) in rows.into_iter().enumerate() {
        let row_index = index + 1;
        for slot in &slots {
            let file_name = slot.file_name(row_index);
            let fetched = match row.non_empty(slot.column) {
                Some(url) => match fetcher.fetch(url, &slot.dir, &file_name).await {
                    Ok(path) => {
                        info!(row = row_index, path = %path.display(), "{} downloaded", slot.column);
                        enriched.downloads_ok += 1;
                        true
                    }
                    Err(error) => {
                        warn!(row = row_index, column = slot.column, %error, "download failed");
                        enriched.downloads_failed += 1;
                        false
                    }
                },
                None => false,
            };
            row = substitute_path(
                row,
                slot.column,
                &slot.dir.join(&file_name),
                fetched,
                config.path_policy,
            );
        }
        enriched.rows.push(row);
    }
    enriched
}

/// Applies the path substitution for one media column.
///
/// With [`PathPolicy::Always`] the local path replaces the column whatever
/// happened to the download, so a row may point at a file that does not
/// exist.
pub fn substitute_path(
    row: Row,
    column: &str,
    local: &Path,
    fetched: bool,
    policy: PathPolicy,
) -> Row {
    match policy {
        PathPolicy::Always => row.with_value(column, local.to_string_lossy()),
        PathPolicy::OnSuccess if fetched => row.with_value(column, local.to_string_lossy()),
        PathPolicy::OnSuccess => row,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{Result, ToolError};

    /// Records every call and fails for URLs containing `broken`.
    #[derive(Default)]
    struct RecordingFetcher {
        calls: Mutex<Vec<(String, PathBuf, String)>>,
    }

    impl MediaFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str, dir: &Path, file_name: &str) -> Result<PathBuf> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((url.to_string(), dir.to_path_buf(), file_name.to_string()));
            if url.contains("broken") {
                return Err(ToolError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(dir.join(file_name))
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::from_pairs([
                ("nomComplet", "Jean Dupont"),
                ("photo", "https://cdn/a.jpg"),
                ("qrcode", "https://cdn/qa.png"),
            ]),
            Row::from_pairs([
                ("nomComplet", "Anne Martin"),
                ("photo", ""),
                ("qrcode", "https://cdn/broken.png"),
            ]),
        ]
    }

    #[tokio::test]
    async fn downloads_in_row_order_with_global_numbering() {
        let fetcher = RecordingFetcher::default();
        let config = PipelineConfig::new("in.xlsx", "/out");
        let enriched = enrich_rows(rows(), &fetcher, &config).await;

        let calls = fetcher.calls.lock().expect("calls lock");
        let names: Vec<&str> = calls.iter().map(|(_, _, name)| name.as_str()).collect();
        assert_eq!(names, vec!["image1.jpg", "qrcode1.jpg", "qrcode2.jpg"]);
        assert_eq!(calls[0].1, Path::new("/out/photos"));
        assert_eq!(calls[2].1, Path::new("/out/qrcodes"));
        assert_eq!(enriched.downloads_ok, 2);
        assert_eq!(enriched.downloads_failed, 1);
    }

    #[tokio::test]
    async fn always_policy_substitutes_even_on_failure_or_absence() {
        let fetcher = RecordingFetcher::default();
        let config = PipelineConfig::new("in.xlsx", "/out");
        let enriched = enrich_rows(rows(), &fetcher, &config).await;

        let second = &enriched.rows[1];
        let photo = Path::new("/out/photos/image2.jpg").to_string_lossy();
        let qrcode = Path::new("/out/qrcodes/qrcode2.jpg").to_string_lossy();
        assert_eq!(second.get("photo"), Some(&*photo));
        assert_eq!(second.get("qrcode"), Some(&*qrcode));
    }

    #[tokio::test]
    async fn on_success_policy_keeps_original_values_on_failure() {
        let fetcher = RecordingFetcher::default();
        let config = PipelineConfig {
            path_policy: PathPolicy::OnSuccess,
            ..PipelineConfig::new("in.xlsx", "/out")
        };
        let enriched = enrich_rows(rows(), &fetcher, &config).await;

        let first = &enriched.rows[0];
        let photo = Path::new("/out/photos/image1.jpg").to_string_lossy();
        assert_eq!(first.get("photo"), Some(&*photo));

        let second = &enriched.rows[1];
        assert_eq!(second.get("photo"), Some(""));
        assert_eq!(second.get("qrcode"), Some("https://cdn/broken.png"));
    }

    #[tokio::test]
    async fn always_policy_adds_missing_media_columns() {
        let fetcher = RecordingFetcher::default();
        let config = PipelineConfig::new("in.xlsx", "/out");
        let input = vec![Row::from_pairs([("nomComplet", "Jean Dupont")])];
        let enriched = enrich_rows(input, &fetcher, &config).await;

        assert!(fetcher.calls.lock().expect("calls lock").is_empty());
        let columns: Vec<&str> = enriched.rows[0].iter().map(|(column, _)| column).collect();
        assert_eq!(columns, vec!["nomComplet", "photo", "qrcode"]);
    }

    #[tokio::test]
    async fn whitespace_urls_are_still_attempted() {
        let fetcher = RecordingFetcher::default();
        let config = PipelineConfig::new("in.xlsx", "/out");
        let input = vec![Row::from_pairs([("photo", " "), ("qrcode", "")])];
        let enriched = enrich_rows(input, &fetcher, &config).await;

        let calls = fetcher.calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, " ");
        assert_eq!(calls[0].2, "image1.jpg");
        assert_eq!(enriched.downloads_ok, 1);
    }
}
