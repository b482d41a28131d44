//! CSV ingestion for `source,target,relation,weight` rows.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::Relation;
use crate::error::{KgError, Result};

/// Result of reading a knowledge CSV.
#[derive(Debug, Default)]
pub struct CsvLoad {
    /// Well-formed rows, in file order
    pub relations: Vec<Relation>,
    /// Rows dropped for a parse error or an empty endpoint
    pub skipped: usize,
}

struct Columns {
    source: usize,
    target: usize,
    relation: usize,
    weight: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let required = |name: &str| {
            find(name).ok_or_else(|| KgError::Parse(format!("missing CSV column: {}", name)))
        };

        Ok(Self {
            source: required("source")?,
            target: required("target")?,
            relation: required("relation")?,
            weight: find("weight"),
        })
    }
}

/// Coerce a raw weight cell to an integer.
///
/// Integers parse as-is, finite decimals are truncated, anything else is 1.
pub fn parse_weight(raw: Option<&str>) -> i64 {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return 1,
    };

    if let Ok(w) = raw.parse::<i64>() {
        return w;
    }
    match raw.parse::<f64>() {
        Ok(w) if w.is_finite() => w.trunc() as i64,
        _ => 1,
    }
}

/// Read relation rows from CSV. Malformed rows are skipped, a missing
/// header column is an error.
pub fn read_relations<R: Read>(reader: R) -> Result<CsvLoad> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut load = CsvLoad::default();
    for (line_num, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Skipping CSV line {}: {}", line_num + 2, e);
                load.skipped += 1;
                continue;
            }
        };

        let source = record.get(columns.source).unwrap_or("");
        let target = record.get(columns.target).unwrap_or("");
        if source.is_empty() || target.is_empty() {
            log::debug!("Skipping CSV line {}: empty source or target", line_num + 2);
            load.skipped += 1;
            continue;
        }

        let relation = record.get(columns.relation).unwrap_or("");
        let weight = parse_weight(columns.weight.and_then(|idx| record.get(idx)));

        load.relations.push(Relation::new(source, relation, target, weight));
    }

    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(Some("9")), 9);
        assert_eq!(parse_weight(Some(" 7 ")), 7);
        assert_eq!(parse_weight(Some("8.0")), 8);
        assert_eq!(parse_weight(Some("6.9")), 6);
        assert_eq!(parse_weight(Some("high")), 1);
        assert_eq!(parse_weight(Some("NaN")), 1);
        assert_eq!(parse_weight(Some("")), 1);
        assert_eq!(parse_weight(None), 1);
    }

    #[test]
    fn test_read_basic_rows() {
        let csv = "source,target,relation,weight\n\
                   Vue,Vue3,evolves_to,9\n\
                   React,JSX,uses,8\n";
        let load = read_relations(csv.as_bytes()).unwrap();
        assert_eq!(load.relations.len(), 2);
        assert_eq!(load.skipped, 0);
        assert_eq!(load.relations[0], Relation::new("Vue", "evolves_to", "Vue3", 9));
    }

    #[test]
    fn test_weight_column_optional() {
        let csv = "source,target,relation\nHTML,CSS,pairs_with\n";
        let load = read_relations(csv.as_bytes()).unwrap();
        assert_eq!(load.relations[0].weight, 1);
    }

    #[test]
    fn test_short_and_empty_rows_skipped() {
        let csv = "source,target,relation,weight\n\
                   Vue\n\
                   ,Vue3,evolves_to,9\n\
                   Vite,Rollup,built_on,bad\n";
        let load = read_relations(csv.as_bytes()).unwrap();
        assert_eq!(load.relations.len(), 1);
        assert_eq!(load.skipped, 2);
        assert_eq!(load.relations[0].weight, 1);
    }

    #[test]
    fn test_columns_found_in_any_order() {
        let csv = "weight,relation,target,source\n5,depends_on,Node.js,npm\n";
        let load = read_relations(csv.as_bytes()).unwrap();
        assert_eq!(load.relations[0], Relation::new("npm", "depends_on", "Node.js", 5));
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "from,to,relation\nA,B,r\n";
        let err = read_relations(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, KgError::Parse(_)));
        assert!(err.to_string().contains("source"));
    }
}
