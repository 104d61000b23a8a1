//! The analysis engine: a pure transformation from a file on disk plus its
//! declared type to table metadata and per-column summary statistics.
//!
//! The engine performs no I/O beyond reading the one path it is given and
//! never touches the database; persistence belongs to the orchestrator.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader as _};
use polars::prelude::*;

use crate::features::analytics::models::{
    Analysis, AnalysisMetadata, ColumnSummary, ColumnType, EngineError, NumericSummary,
};
use crate::features::files::models::FileType;

/// Analyze a tabular file. Dispatch is exhaustive over the declared type;
/// adding a variant without a parsing strategy fails to compile.
pub fn analyze(path: &Path, declared_type: FileType) -> Result<Analysis, EngineError> {
    let df = match declared_type {
        FileType::Csv => load_csv(path)?,
        FileType::Xlsx | FileType::Xls => load_excel(path)?,
        FileType::Json => load_json(path)?,
        FileType::Txt => return Err(EngineError::UnsupportedType(declared_type)),
    };

    let df = refine_column_types(df);
    profile(&df)
}

fn load_csv(path: &Path) -> Result<DataFrame, EngineError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| EngineError::Parse(e.to_string()))
}

fn load_json(path: &Path) -> Result<DataFrame, EngineError> {
    let raw = std::fs::read(path).map_err(|e| EngineError::Parse(e.to_string()))?;

    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|e| EngineError::Parse(e.to_string()))?;

    match value {
        // Array of flat objects: polars handles record orientation directly
        serde_json::Value::Array(_) => JsonReader::new(std::io::Cursor::new(raw))
            .finish()
            .map_err(|e| EngineError::Parse(e.to_string())),
        // Columnar object: one array of values per column name
        serde_json::Value::Object(map) => {
            let mut columns = Vec::with_capacity(map.len());
            for (name, values) in map {
                let serde_json::Value::Array(values) = values else {
                    return Err(EngineError::Parse(format!(
                        "expected an array of values for column '{}'",
                        name
                    )));
                };
                columns.push(column_from_json_values(&name, &values));
            }
            DataFrame::new(columns).map_err(|e| EngineError::Parse(e.to_string()))
        }
        _ => Err(EngineError::Parse(
            "expected a JSON array of objects or an object of arrays".to_string(),
        )),
    }
}

/// Build a typed column from raw JSON values: booleans, integers and floats
/// keep their type when the column is homogeneous, everything else falls
/// back to text. All-null columns are treated as numeric-with-no-values.
fn column_from_json_values(name: &str, values: &[serde_json::Value]) -> Column {
    use serde_json::Value;

    let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();

    if non_null.iter().all(|v| v.is_boolean()) && !non_null.is_empty() {
        let data: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
        return Column::new(name.into(), data);
    }

    if non_null.iter().all(|v| v.is_i64()) && !non_null.is_empty() {
        let data: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
        return Column::new(name.into(), data);
    }

    if non_null.iter().all(|v| v.is_number()) {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        return Column::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .iter()
        .map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Column::new(name.into(), data)
}

fn load_excel(path: &Path) -> Result<DataFrame, EngineError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| EngineError::Parse(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::Parse("workbook contains no sheets".to_string()))?
        .map_err(|e| EngineError::Parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match excel_cell_to_string(cell) {
                Some(s) => s,
                None => format!("column_{}", i),
            })
            .collect(),
        None => Vec::new(),
    };

    let body: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let values: Vec<Option<String>> = body
            .iter()
            .map(|row| row.get(idx).and_then(excel_cell_to_string))
            .collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    DataFrame::new(columns).map_err(|e| EngineError::Parse(e.to_string()))
}

fn excel_cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        // Error cells (#DIV/0! and friends) count as missing
        Data::Error(_) => None,
    }
}

/// Try to promote string columns to a more specific type. Excel and
/// columnar-JSON loads arrive as text; CSV columns that dodge schema
/// inference benefit too. A cast wins when every non-null value survives
/// it; datetimes use a looser majority rule since real-world timestamp
/// columns tend to carry a few strays.
fn refine_column_types(mut df: DataFrame) -> DataFrame {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    for name in names {
        let Ok(col) = df.column(&name) else { continue };
        let series = col.as_materialized_series().clone();
        if series.dtype() != &DataType::String {
            continue;
        }

        let non_null = series.len() - series.null_count();
        if non_null == 0 {
            continue;
        }

        let exact_targets = [DataType::Int64, DataType::Float64, DataType::Boolean];
        let mut replaced = false;
        for target in &exact_targets {
            if let Ok(casted) = series.cast(target) {
                if casted.null_count() == series.null_count() {
                    let _ = df.replace(&name, casted);
                    replaced = true;
                    break;
                }
            }
        }

        if !replaced {
            if let Ok(casted) = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None)) {
                if casted.null_count() < series.len() / 2 {
                    let _ = df.replace(&name, casted);
                }
            }
        }
    }

    df
}

fn profile(df: &DataFrame) -> Result<Analysis, EngineError> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let mut dtypes = BTreeMap::new();
    let mut results = BTreeMap::new();

    for col in df.get_columns() {
        let name = col.name().to_string();
        let series = normalize_nan(col.as_materialized_series());
        let dtype = column_type(series.dtype());

        let missing_count = series.null_count() as u64;
        let unique_count = series.drop_nulls().n_unique().unwrap_or(0) as u64;

        let summary = if dtype.is_numeric() {
            Some(numeric_summary(&series)?)
        } else {
            None
        };

        dtypes.insert(name.clone(), dtype);
        results.insert(
            name,
            ColumnSummary {
                dtype,
                missing_count,
                unique_count,
                summary,
            },
        );
    }

    Ok(Analysis {
        metadata: AnalysisMetadata {
            columns,
            row_count: df.height() as u64,
            column_count: df.width() as u64,
            dtypes,
            estimated_size_bytes: df.estimated_size() as u64,
        },
        results,
    })
}

/// Collapse NaN into null for float columns so "missing" means one thing
/// throughout the results.
fn normalize_nan(series: &Series) -> Series {
    if !series.dtype().is_float() {
        return series.clone();
    }

    let Ok(casted) = series.cast(&DataType::Float64) else {
        return series.clone();
    };
    let Ok(ca) = casted.f64() else {
        return series.clone();
    };

    let cleaned: Float64Chunked = ca
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    cleaned.with_name(series.name().clone()).into_series()
}

fn column_type(dtype: &DataType) -> ColumnType {
    if dtype.is_integer() {
        ColumnType::Integer
    } else if dtype.is_float() {
        ColumnType::Float
    } else if dtype.is_bool() {
        ColumnType::Boolean
    } else if dtype.is_temporal() {
        ColumnType::Datetime
    } else {
        ColumnType::Text
    }
}

/// Summary statistics over the non-null values of a numeric column.
/// Aggregations over an all-null column come back as None across the board.
fn numeric_summary(series: &Series) -> Result<NumericSummary, EngineError> {
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|e| EngineError::Parse(e.to_string()))?;
    let ca = casted.f64().map_err(|e| EngineError::Parse(e.to_string()))?;

    Ok(NumericSummary {
        mean: ca.mean(),
        median: ca.median(),
        std: ca.std(1),
        min: ca.min(),
        max: ca.max(),
        q25: ca.quantile(0.25, QuantileMethod::Linear).unwrap_or(None),
        q75: ca.quantile(0.75, QuantileMethod::Linear).unwrap_or(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn write_temp(contents: &str, ext: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("engine-test-{}.{}", Uuid::new_v4(), ext));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_csv_with_missing_numeric_value() {
        // 3 columns, 4 rows; "score" has one missing entry
        let path = write_temp(
            "name,score,city\nalice,1.5,Berlin\nbob,,Paris\ncarol,3.0,Berlin\ndave,4.5,Oslo\n",
            "csv",
        );

        let analysis = analyze(&path, FileType::Csv).unwrap();

        assert_eq!(analysis.metadata.row_count, 4);
        assert_eq!(analysis.metadata.column_count, 3);
        assert_eq!(analysis.metadata.columns, vec!["name", "score", "city"]);

        let score = &analysis.results["score"];
        assert_eq!(score.missing_count, 1);
        assert_eq!(score.unique_count, 3);

        let summary = score.summary.as_ref().unwrap();
        assert_eq!(summary.min, Some(1.5));
        assert_eq!(summary.max, Some(4.5));
        assert_eq!(summary.mean, Some(3.0));
        assert_eq!(summary.median, Some(3.0));

        // Non-numeric columns carry no statistical summary
        let city = &analysis.results["city"];
        assert!(city.summary.is_none());
        assert_eq!(city.unique_count, 3);
        assert_eq!(city.missing_count, 0);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_quantile_and_mean_ordering() {
        let path = write_temp("v\n10\n2\n7\n4\n9\n1\n", "csv");

        let analysis = analyze(&path, FileType::Csv).unwrap();
        let summary = analysis.results["v"].summary.clone().unwrap();

        let (q25, median, q75) = (
            summary.q25.unwrap(),
            summary.median.unwrap(),
            summary.q75.unwrap(),
        );
        assert!(q25 <= median && median <= q75);

        let (min, mean, max) = (
            summary.min.unwrap(),
            summary.mean.unwrap(),
            summary.max.unwrap(),
        );
        assert!(min <= mean && mean <= max);
        assert!(summary.std.unwrap() > 0.0);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_sample_stddev_uses_n_minus_one() {
        let path = write_temp("v\n2\n4\n", "csv");

        let analysis = analyze(&path, FileType::Csv).unwrap();
        let summary = analysis.results["v"].summary.clone().unwrap();

        // Sample stddev of {2, 4} is sqrt(2), not 1
        assert!((summary.std.unwrap() - 2.0_f64.sqrt()).abs() < 1e-12);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_all_null_numeric_column_yields_empty_summary() {
        let path = write_temp(r#"{"x": [null, null, null], "y": [1, 2, 3]}"#, "json");

        let analysis = analyze(&path, FileType::Json).unwrap();

        let x = &analysis.results["x"];
        assert_eq!(x.missing_count, 3);
        assert_eq!(x.unique_count, 0);
        let summary = x.summary.as_ref().unwrap();
        assert!(summary.mean.is_none());
        assert!(summary.median.is_none());
        assert!(summary.std.is_none());
        assert!(summary.min.is_none());
        assert!(summary.max.is_none());
        assert!(summary.q25.is_none());
        assert!(summary.q75.is_none());

        let y = analysis.results["y"].summary.as_ref().unwrap();
        assert_eq!(y.mean, Some(2.0));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_json_array_of_objects() {
        let path = write_temp(
            r#"[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}, {"a": 3, "b": "x"}]"#,
            "json",
        );

        let analysis = analyze(&path, FileType::Json).unwrap();

        assert_eq!(analysis.metadata.row_count, 3);
        assert_eq!(analysis.metadata.column_count, 2);
        assert!(analysis.results["a"].summary.is_some());
        assert!(analysis.results["b"].summary.is_none());
        assert_eq!(analysis.results["b"].unique_count, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_txt_is_unsupported() {
        let path = write_temp("free-form notes\n", "txt");

        let err = analyze(&path, FileType::Txt).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedType(FileType::Txt)));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let path = write_temp("{not json", "json");

        let err = analyze(&path, FileType::Json).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let path = std::env::temp_dir().join("engine-test-does-not-exist.csv");
        let err = analyze(&path, FileType::Csv).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_engine_is_deterministic() {
        let path = write_temp("a,b\n1,x\n2,y\n3,\n", "csv");

        let first = analyze(&path, FileType::Csv).unwrap();
        let second = analyze(&path, FileType::Csv).unwrap();
        assert_eq!(first, second);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_boolean_column_has_no_summary() {
        let path = write_temp("flag\ntrue\nfalse\ntrue\n", "csv");

        let analysis = analyze(&path, FileType::Csv).unwrap();
        let flag = &analysis.results["flag"];
        assert_eq!(flag.dtype, ColumnType::Boolean);
        assert!(flag.summary.is_none());
        assert_eq!(flag.unique_count, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_count_never_exceeds_row_count() {
        let path = write_temp("a,b\n,\n,\n1,x\n", "csv");

        let analysis = analyze(&path, FileType::Csv).unwrap();
        for column in analysis.results.values() {
            assert!(column.missing_count <= analysis.metadata.row_count);
        }

        std::fs::remove_file(path).ok();
    }
}
