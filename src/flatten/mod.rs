//! Regrouping of rows into fixed-size chunks and flattening of each chunk
//! into a single record with position-suffixed column names.

use crate::error::{Result, ToolError};
use crate::model::{MergedRecord, Row};

/// Prefix marking media columns in the merged output.
pub const MEDIA_MARKER: char = '@';

/// Splits `rows` into consecutive groups of `size`; the last group may be
/// shorter. Concatenating the groups yields the input again.
pub fn chunk_rows<T: Clone>(rows: &[T], size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(ToolError::InvalidArgument(
            "chunk size must be greater than 0".to_string(),
        ));
    }
    Ok(rows.chunks(size).map(<[T]>::to_vec).collect())
}

/// Rules applied while merging a chunk.
#[derive(Debug, Clone, Copy)]
pub struct MergeRules<'a> {
    pub name_column: &'a str,
    pub name_threshold: usize,
    pub media_columns: &'a [&'a str],
}

impl MergeRules<'_> {
    /// Synthetic column name for `column` at 1-based chunk `position`.
    pub fn synthetic_name(&self, column: &str, position: usize) -> String {
        if self.media_columns.contains(&column) {
            format!("{MEDIA_MARKER}{column}{position}")
        } else {
            format!("{column}{position}")
        }
    }

    /// Returns the row with its display name abbreviated when it is long enough.
    pub fn normalize(&self, row: Row) -> Row {
        let abbreviated = match row.get(self.name_column) {
            Some(name) if name.chars().count() >= self.name_threshold => abbreviate_name(name),
            _ => return row,
        };
        row.with_value(self.name_column, abbreviated)
    }
}

/// Merges every chunk into one record, in chunk order.
pub fn merge_chunks(chunks: &[Vec<Row>], rules: &MergeRules<'_>) -> Vec<MergedRecord> {
    chunks.iter().map(|chunk| merge_chunk(chunk, rules)).collect()
}

/// Merges the rows of one chunk, numbering each column by the row's 1-based
/// position inside the chunk. Each row goes through [`MergeRules::normalize`]
/// first, so the export carries the abbreviated display name.
pub fn merge_chunk(chunk: &[Row], rules: &MergeRules<'_>) -> MergedRecord {
    let mut merged = MergedRecord::new();
    for (index, row) in chunk.iter().enumerate() {
        let row = rules.normalize(row.clone());
        for (column, value) in row.iter() {
            merged.insert(rules.synthetic_name(column, index + 1), value);
        }
    }
    merged
}

/// Keeps the first and last token of a space-separated name and reduces every
/// token in between to its initial followed by `.`.
///
/// `"Jean Baptiste Marie Dupont"` becomes `"Jean B. M. Dupont"`.
pub fn abbreviate_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split(' ').collect();
    let Some((first, rest)) = tokens.split_first() else {
        return name.to_string();
    };
    let Some((last, middle)) = rest.split_last() else {
        return (*first).to_string();
    };

    let mut abbreviated = (*first).to_string();
    for token in middle {
        abbreviated.push(' ');
        abbreviated.extend(token.chars().next());
        abbreviated.push('.');
    }
    abbreviated.push(' ');
    abbreviated.push_str(last);
    abbreviated
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA: [&str; 2] = ["photo", "qrcode"];

    fn rules() -> MergeRules<'static> {
        MergeRules {
            name_column: "nomComplet",
            name_threshold: 18,
            media_columns: &MEDIA,
        }
    }

    fn person(name: &str, n: usize) -> Row {
        Row::from_pairs([
            ("nomComplet", name.to_string()),
            ("photo", format!("/out/photos/image{n}.jpg")),
            ("qrcode", format!("/out/qrcodes/qrcode{n}.jpg")),
            ("email", format!("p{n}@example.com")),
        ])
    }

    #[test]
    fn chunk_counts_and_order_are_preserved() {
        for total in 0..25usize {
            for size in 1..12usize {
                let items: Vec<usize> = (0..total).collect();
                let chunks = chunk_rows(&items, size).expect("valid size");
                assert_eq!(chunks.len(), total.div_ceil(size));
                if let Some((last, full)) = chunks.split_last() {
                    assert!(full.iter().all(|chunk| chunk.len() == size));
                    assert!(!last.is_empty() && last.len() <= size);
                }
                let flattened: Vec<usize> = chunks.into_iter().flatten().collect();
                assert_eq!(flattened, items);
            }
        }
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        assert!(matches!(
            chunk_rows(&[1, 2, 3], 0),
            Err(ToolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn long_names_are_abbreviated() {
        assert_eq!(abbreviate_name("Jean Baptiste Marie Dupont"), "Jean B. M. Dupont");
        assert_eq!(abbreviate_name("Anne Marie Claire Lefevre"), "Anne M. C. Lefevre");
    }

    #[test]
    fn names_below_threshold_are_untouched() {
        let row = rules().normalize(person("Jean Dupont", 1));
        assert_eq!(row.get("nomComplet"), Some("Jean Dupont"));
    }

    #[test]
    fn threshold_is_inclusive() {
        // 18 characters exactly.
        let row = rules().normalize(person("Ana Maria Santosss", 1));
        assert_eq!(row.get("nomComplet"), Some("Ana M. Santosss"));
    }

    #[test]
    fn two_token_names_keep_their_shape() {
        assert_eq!(
            abbreviate_name("Maximiliano Villalobos"),
            "Maximiliano Villalobos"
        );
        assert_eq!(abbreviate_name("Cher"), "Cher");
    }

    #[test]
    fn long_single_word_names_are_kept_once() {
        let row = rules().normalize(person("Bartholomew-Alexandre", 1));
        assert_eq!(row.get("nomComplet"), Some("Bartholomew-Alexandre"));
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        // 17 characters, more than 18 bytes in UTF-8.
        let row = rules().normalize(person("Léa Zoé Bérangère", 1));
        assert_eq!(row.get("nomComplet"), Some("Léa Zoé Bérangère"));

        // 18 characters.
        let row = rules().normalize(person("Léa Zoé Bérangèree", 1));
        assert_eq!(row.get("nomComplet"), Some("Léa Z. Bérangèree"));
    }

    #[test]
    fn media_columns_carry_marker_at_every_position() {
        let chunk: Vec<Row> = (1..=3).map(|n| person("Jean Dupont", n)).collect();
        let merged = merge_chunk(&chunk, &rules());
        assert_eq!(
            merged.get("@photo3").map(|value| value.render()),
            Some("/out/photos/image3.jpg".to_string())
        );
        assert!(merged.get("@qrcode1").is_some());
        assert!(merged.get("photo1").is_none());
        assert!(merged.get("email2").is_some());
    }

    #[test]
    fn merged_width_is_chunk_size_times_row_width() {
        let chunk: Vec<Row> = (1..=7).map(|n| person("Jean Dupont", n)).collect();
        let width = chunk[0].len();
        let merged = merge_chunk(&chunk, &rules());
        assert_eq!(merged.len(), 7 * width);
    }

    #[test]
    fn abbreviation_is_applied_to_rows_and_output() {
        let long = person("Anne Marie Claire Lefevre", 2);
        let normalized = rules().normalize(long.clone());
        assert_eq!(normalized.get("nomComplet"), Some("Anne M. C. Lefevre"));

        let chunk = vec![person("Jean Dupont", 1), long];
        let merged = merge_chunk(&chunk, &rules());
        assert_eq!(
            merged.get("nomComplet2").map(|value| value.render()),
            Some("Anne M. C. Lefevre".to_string())
        );
        assert_eq!(
            merged.get("nomComplet1").map(|value| value.render()),
            Some("Jean Dupont".to_string())
        );
    }

    #[test]
    fn merge_chunks_keeps_chunk_order() {
        let rows: Vec<Row> = (1..=5).map(|n| person("Jean Dupont", n)).collect();
        let chunks = chunk_rows(&rows, 2).expect("valid size");
        let merged = merge_chunks(&chunks, &rules());
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[2].get("email1").map(|value| value.render()),
            Some("p5@example.com".to_string())
        );
    }
}
