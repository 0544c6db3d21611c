use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::ReadError;
use super::model::{AxisSelector, Dataset, Projection, Record};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – a `position` column of semicolon-separated floats, or `x`, `y`, `z` columns
/// * `.parquet` – a `position` list column of Float64 or Float32
/// * anything else, including no extension – JSON `[{ "position": [x, y, z] }, ...]`
pub fn load_file(path: &Path) -> Result<Dataset, ReadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        _ => load_json(path)?,
    };

    log::info!(
        "Loaded {} positions from {}",
        dataset.len(),
        dataset.source
    );
    Ok(dataset)
}

/// Load `path` and project its positions through `selector`.
pub fn read_positions(path: &Path, selector: AxisSelector) -> Result<Projection, ReadError> {
    Ok(load_file(path)?.project(selector))
}

/// Like [`read_positions`], with the selector given by name.
///
/// Unknown names fail with [`ReadError::InvalidAxis`] before the file is touched.
pub fn read_positions_named(path: &Path, selector: &str) -> Result<Projection, ReadError> {
    let selector: AxisSelector = selector.parse()?;
    read_positions(path, selector)
}

fn source_label(path: &Path) -> String {
    path.display().to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// [
///   { "position": [1.0, 2.0, 3.0] },
///   { "position": [4.0, 5.0, 6.0], "velocity": [0.0, 0.0, 0.0] },
///   ...
/// ]
/// ```
///
/// Keys other than `position` are ignored, as are position components past the third.
fn load_json(path: &Path) -> Result<Dataset, ReadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| ReadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = root
        .as_array()
        .ok_or_else(|| ReadError::NotAnArray(path.to_path_buf()))?;

    let mut records = Vec::with_capacity(rows.len());
    let mut with_extra = 0usize;

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| ReadError::malformed(i, "not a JSON object"))?;

        let components = obj
            .get("position")
            .ok_or_else(|| ReadError::malformed(i, "missing 'position'"))?
            .as_array()
            .ok_or_else(|| ReadError::malformed(i, "'position' is not an array"))?;

        if components.len() > 3 {
            with_extra += 1;
        }
        records.push(Record {
            position: json_triple(components, i)?,
        });
    }

    if with_extra > 0 {
        log::debug!(
            "{}: {with_extra} positions carry more than 3 components, extras ignored",
            path.display()
        );
    }

    Ok(Dataset::new(source_label(path), records))
}

fn json_triple(components: &[JsonValue], row: usize) -> Result<[f64; 3], ReadError> {
    if components.len() < 3 {
        return Err(ReadError::malformed(
            row,
            format!("'position' has {} components, expected 3", components.len()),
        ));
    }
    let mut out = [0.0; 3];
    for (j, slot) in out.iter_mut().enumerate() {
        *slot = components[j]
            .as_f64()
            .ok_or_else(|| ReadError::malformed(row, format!("position[{j}]: not a number")))?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, then either
/// * a `position` column with semicolon-separated floats: `"1.0;2.0;3.0"`, or
/// * separate `x`, `y` and `z` columns.
///
/// All other columns are ignored.
fn load_csv(path: &Path) -> Result<Dataset, ReadError> {
    let csv_err = |source| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let layout = match (column("position"), column("x"), column("y"), column("z")) {
        (Some(p), _, _, _) => CsvLayout::Packed(p),
        (None, Some(x), Some(y), Some(z)) => CsvLayout::Split([x, y, z]),
        _ => {
            return Err(ReadError::malformed(
                0,
                "CSV needs a 'position' column or 'x', 'y', 'z' columns",
            ))
        }
    };

    let mut records = Vec::new();
    let mut with_extra = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;

        let position = match layout {
            CsvLayout::Packed(idx) => {
                let (position, extra) =
                    parse_packed_position(record.get(idx).unwrap_or(""), row_no)?;
                if extra {
                    with_extra += 1;
                }
                position
            }
            CsvLayout::Split(cols) => {
                let mut out = [0.0; 3];
                for (axis, (slot, idx)) in out.iter_mut().zip(cols).enumerate() {
                    let tok = record.get(idx).unwrap_or("").trim();
                    *slot = tok.parse::<f64>().map_err(|_| {
                        ReadError::malformed(
                            row_no,
                            format!("{}: '{tok}' is not a number", ["x", "y", "z"][axis]),
                        )
                    })?;
                }
                out
            }
        };

        records.push(Record { position });
    }

    if with_extra > 0 {
        log::debug!(
            "{}: {with_extra} positions carry more than 3 components, extras ignored",
            path.display()
        );
    }

    Ok(Dataset::new(source_label(path), records))
}

#[derive(Clone, Copy)]
enum CsvLayout {
    Packed(usize),
    Split([usize; 3]),
}

/// Parse the first three of the semicolon-separated tokens in `s`.
///
/// Returns the triple and whether further tokens followed; those are not parsed.
fn parse_packed_position(s: &str, row: usize) -> Result<([f64; 3], bool), ReadError> {
    let tokens: Vec<&str> = s.split(';').collect();
    if tokens.len() < 3 {
        return Err(ReadError::malformed(
            row,
            format!("'position' has {} components, expected 3", tokens.len()),
        ));
    }
    let mut out = [0.0; 3];
    for (j, (slot, tok)) in out.iter_mut().zip(&tokens).enumerate() {
        *slot = tok.trim().parse::<f64>().map_err(|_| {
            ReadError::malformed(row, format!("position[{j}]: '{tok}' is not a number"))
        })?;
    }
    Ok((out, tokens.len() > 3))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a `position` column of type
/// List<Float64|Float32> or LargeList<Float64|Float32>.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, ReadError> {
    let parquet_err = |reason: String| ReadError::Parquet {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| builder.build())
        .map_err(|e| parquet_err(e.to_string()))?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_err(e.to_string()))?;
        let pos_idx = batch
            .schema()
            .index_of("position")
            .map_err(|_| parquet_err("missing 'position' column".to_string()))?;
        let col = batch.column(pos_idx);

        for local in 0..batch.num_rows() {
            let row = records.len();
            let values =
                extract_f64_list(col, local).map_err(|reason| ReadError::malformed(row, reason))?;
            if values.len() < 3 {
                return Err(ReadError::malformed(
                    row,
                    format!("'position' has {} components, expected 3", values.len()),
                ));
            }
            records.push(Record {
                position: [values[0], values[1], values[2]],
            });
        }
    }

    Ok(Dataset::new(source_label(path), records))
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>, String> {
    if col.is_null(row) {
        return Err("null 'position'".to_string());
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .ok_or("expected LargeListArray")?
            .value(row),
        other => return Err(format!("expected List or LargeList column, got {other:?}")),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        Err(format!(
            "list inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use arrow::array::{
        ArrayRef, Float32Builder, Float64Builder, Int32Array, Int32Builder, LargeListBuilder,
        ListBuilder,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const TWO_RECORDS: &str = r#"[{"position":[1,2,3]}, {"position":[4,5,6]}]"#;

    #[test]
    fn test_read_positions_scenario() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.json", TWO_RECORDS);

        assert_eq!(
            read_positions_named(&path, "x").unwrap(),
            Projection::Axis(vec![1.0, 4.0])
        );
        assert_eq!(
            read_positions_named(&path, "y").unwrap(),
            Projection::Axis(vec![2.0, 5.0])
        );
        assert_eq!(
            read_positions_named(&path, "all").unwrap(),
            Projection::Points(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
        );
    }

    #[test]
    fn test_read_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.json", TWO_RECORDS);

        let first = load_file(&path).unwrap();
        let second = load_file(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.source, path.display().to_string());
    }

    #[test]
    fn test_unknown_selector_fails_explicitly() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.json", TWO_RECORDS);

        let err = read_positions_named(&path, "q").unwrap_err();
        assert!(matches!(err, ReadError::InvalidAxis(ref s) if s == "q"));

        // Checked before any I/O.
        let missing = dir.path().join("missing.json");
        let err = read_positions_named(&missing, "q").unwrap_err();
        assert!(matches!(err, ReadError::InvalidAxis(_)));
    }

    #[test]
    fn test_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.json", "[]");
        for sel in ["all", "x", "y", "z"] {
            assert!(read_positions_named(&path, sel).unwrap().is_empty());
        }
    }

    #[test]
    fn test_extra_components_and_fields_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "extra.json",
            r#"[{"position":[1.5,2,3,9,"w"], "id": 7, "name": "p0"}]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.get(0), Some([1.5, 2.0, 3.0]));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn test_parse_failures() {
        let dir = TempDir::new().unwrap();

        let path = write_file(&dir, "bad.json", "[{\"position\": [1, 2");
        assert!(matches!(load_file(&path).unwrap_err(), ReadError::Json { .. }));

        let path = write_file(&dir, "obj.json", r#"{"position":[1,2,3]}"#);
        assert!(matches!(load_file(&path).unwrap_err(), ReadError::NotAnArray(_)));
    }

    #[test]
    fn test_malformed_records() {
        let dir = TempDir::new().unwrap();
        let cases = [
            (r#"[{"position":[1,2,3]}, {"pos":[1,2,3]}]"#, 1),
            (r#"[{"position":[1,2]}]"#, 0),
            (r#"[{"position":[1,"two",3]}]"#, 0),
            (r#"[{"position":"1,2,3"}]"#, 0),
            (r#"[{"position":[1,2,3]}, 5]"#, 1),
        ];
        for (i, (json, bad_row)) in cases.iter().enumerate() {
            let path = write_file(&dir, &format!("case{i}.json"), json);
            match load_file(&path).unwrap_err() {
                ReadError::MalformedRecord { row, .. } => assert_eq!(row, *bad_row, "{json}"),
                other => panic!("{json}: unexpected error {other}"),
            }
        }
    }

    #[test]
    fn test_other_extensions_read_as_json() {
        let dir = TempDir::new().unwrap();
        for name in ["positions", "p.dat", "points.txt"] {
            let path = write_file(&dir, name, r#"[{"position":[1,2,3]}]"#);
            assert_eq!(
                read_positions(&path, AxisSelector::X).unwrap(),
                Projection::Axis(vec![1.0]),
                "{name}"
            );
        }

        let path = write_file(&dir, "notes.txt", "x y z");
        assert!(matches!(load_file(&path).unwrap_err(), ReadError::Json { .. }));
    }

    #[test]
    fn test_csv_layouts() {
        let dir = TempDir::new().unwrap();

        let packed = write_file(&dir, "packed.csv", "id,position\n0,1;2;3\n1,4;5;6;7\n");
        let ds = load_file(&packed).unwrap();
        assert_eq!(ds.positions().collect::<Vec<_>>(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let split = write_file(&dir, "split.csv", "z,y,x\n3,2,1\n6,5,4\n");
        let ds = load_file(&split).unwrap();
        assert_eq!(ds.axis(AxisSelector::X), vec![1.0, 4.0]);
        assert_eq!(ds.axis(AxisSelector::Z), vec![3.0, 6.0]);

        let bad = write_file(&dir, "bad.csv", "x,y,z\n1,two,3\n");
        assert!(matches!(
            load_file(&bad).unwrap_err(),
            ReadError::MalformedRecord { row: 0, .. }
        ));

        let extra = write_file(&dir, "extra.csv", "position\n1;2;3;w\n");
        let ds = load_file(&extra).unwrap();
        assert_eq!(ds.get(0), Some([1.0, 2.0, 3.0]));

        let short = write_file(&dir, "short.csv", "id,position\n0,1;2;3\n1,4;5\n");
        match load_file(&short).unwrap_err() {
            ReadError::MalformedRecord { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("2 components"), "{reason}");
            }
            other => panic!("unexpected error {other}"),
        }

        let no_cols = write_file(&dir, "nocols.csv", "a,b\n1,2\n");
        assert!(matches!(
            load_file(&no_cols).unwrap_err(),
            ReadError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn test_parquet_position_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.parquet");

        let mut builder = ListBuilder::new(Float64Builder::new());
        for row in [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]] {
            builder.values().append_slice(&row);
            builder.append(true);
        }
        let positions = builder.finish();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "position",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        )]));
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(positions)]).unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert_eq!(
            read_positions(&path, AxisSelector::Y).unwrap(),
            Projection::Axis(vec![2.0, 5.0])
        );
    }

    #[test]
    fn test_extract_large_list_float32() {
        let mut builder = LargeListBuilder::new(Float32Builder::new());
        builder.values().append_slice(&[1.5, 2.5, 3.5]);
        builder.append(true);
        builder.append(false);
        let col: ArrayRef = Arc::new(builder.finish());

        assert_eq!(extract_f64_list(&col, 0).unwrap(), vec![1.5, 2.5, 3.5]);
        assert!(extract_f64_list(&col, 1).unwrap_err().contains("null"));
    }

    #[test]
    fn test_extract_rejects_other_types() {
        let mut builder = ListBuilder::new(Int32Builder::new());
        builder.values().append_slice(&[1, 2, 3]);
        builder.append(true);
        let ints: ArrayRef = Arc::new(builder.finish());
        assert!(extract_f64_list(&ints, 0)
            .unwrap_err()
            .contains("expected Float64 or Float32"));

        let flat: ArrayRef = Arc::new(Int32Array::from(vec![1]));
        assert!(extract_f64_list(&flat, 0)
            .unwrap_err()
            .contains("expected List or LargeList"));
    }
}
