use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray,
    ListArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Instruments, StationDataset, StationRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a station table.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// I/O error opening or reading the file
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the header
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    /// A row could not be interpreted. `row` is the 1-based line of the
    /// file for CSV and the 1-based record number otherwise.
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DataLoadError>;

fn invalid_row(row: usize, message: impl Into<String>) -> DataLoadError {
    DataLoadError::InvalidRow {
        row,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

const PROJECT: &str = "Project_Name";
const STATION: &str = "Station";
const PLATFORM: &str = "Platform";
const INSTRUMENT_TYPE: &str = "Instrument_Type";
const LAT: &str = "Lat";
const LON: &str = "Lon";

/// Normalise a header for matching: drop a unit suffix such as `" (°S)"`
/// and compare case-insensitively.
fn canonical_header(header: &str) -> String {
    let base = match header.find('(') {
        Some(idx) => &header[..idx],
        None => header,
    };
    base.trim().to_ascii_lowercase()
}

/// Positions of the six required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    project: usize,
    station: usize,
    platform: usize,
    instrument_type: usize,
    lat: usize,
    lon: usize,
}

impl ColumnIndex {
    fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let names: Vec<String> = headers.into_iter().map(canonical_header).collect();
        let find = |wanted: &'static str| {
            let key = wanted.to_ascii_lowercase();
            names
                .iter()
                .position(|h| *h == key)
                .ok_or(DataLoadError::MissingColumn(wanted))
        };
        Ok(ColumnIndex {
            project: find(PROJECT)?,
            station: find(STATION)?,
            platform: find(PLATFORM)?,
            instrument_type: find(INSTRUMENT_TYPE)?,
            lat: find(LAT)?,
            lon: find(LON)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a station table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, `Instrument_Type` as a separated list
/// * `.json`    – `[{ "Project_Name": "...", "Lat": -30.1, ... }, ...]`
/// * `.parquet` – string columns plus numeric `Lat` / `Lon`
pub fn load_file(path: &Path) -> Result<StationDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataLoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::debug!(
        "{}: {} stations across {} projects",
        path.display(),
        dataset.len(),
        dataset.project_names().len()
    );
    Ok(dataset)
}

fn io_error(path: &Path, source: std::io::Error) -> DataLoadError {
    DataLoadError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn parse_coordinate(raw: &str, row: usize, col: &'static str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid_row(row, format!("{col} '{raw}' is not a number")))?;
    check_coordinate(value, row, col)
}

/// Reject values that cannot be placed on the map.
fn check_coordinate(value: f64, row: usize, col: &'static str) -> Result<f64> {
    let limit = if col == LAT { 90.0 } else { 180.0 };
    if !value.is_finite() || value.abs() > limit {
        return Err(invalid_row(
            row,
            format!("{col} {value} is outside [-{limit}, {limit}]"),
        ));
    }
    Ok(value)
}

fn require_text(raw: &str, row: usize, col: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid_row(row, format!("empty {col}")));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with (at least) the six required columns, in any
/// order. Extra columns are ignored.
pub fn load_csv(path: &Path) -> Result<StationDataset> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    read_csv(file)
}

fn read_csv<R: std::io::Read>(input: R) -> Result<StationDataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let columns = ColumnIndex::resolve(reader.headers()?.iter())?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // Line 1 is the header.
        let row_no = i + 2;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(StationRecord {
            project: require_text(cell(columns.project), row_no, PROJECT)?,
            station: require_text(cell(columns.station), row_no, STATION)?,
            platform: cell(columns.platform).to_string(),
            instruments: Instruments::parse(cell(columns.instrument_type)),
            lat: parse_coordinate(cell(columns.lat), row_no, LAT)?,
            lon: parse_coordinate(cell(columns.lon), row_no, LON)?,
        });
    }

    Ok(StationDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Project_Name": "Integrated Ecosystem Programme: Southern Benguela",
///     "Station": "IEP-01",
///     "Platform": "RV Algoa",
///     "Instrument_Type": ["CTD", "TSG"],
///     "Lat": -33.9,
///     "Lon": 18.2
///   }
/// ]
/// ```
pub fn load_json(path: &Path) -> Result<StationDataset> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    read_json(&text)
}

fn read_json(text: &str) -> Result<StationDataset> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| invalid_row(1, "expected a top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let i = i + 1;
        let obj = row
            .as_object()
            .ok_or_else(|| invalid_row(i, "not a JSON object"))?;

        let fields: BTreeMap<String, &JsonValue> = obj
            .iter()
            .map(|(k, v)| (canonical_header(k), v))
            .collect();
        let field = |name: &'static str| {
            fields
                .get(&name.to_ascii_lowercase())
                .copied()
                .ok_or(DataLoadError::MissingColumn(name))
        };

        records.push(StationRecord {
            project: require_text(&json_text(field(PROJECT)?), i, PROJECT)?,
            station: require_text(&json_text(field(STATION)?), i, STATION)?,
            platform: json_text(field(PLATFORM)?),
            instruments: json_instruments(field(INSTRUMENT_TYPE)?),
            lat: json_coordinate(field(LAT)?, i, LAT)?,
            lon: json_coordinate(field(LON)?, i, LON)?,
        });
    }

    Ok(StationDataset::from_records(records))
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_instruments(val: &JsonValue) -> Instruments {
    match val {
        JsonValue::Array(items) => items
            .iter()
            .map(json_text)
            .filter(|s| !s.is_empty())
            .collect(),
        other => Instruments::parse(&json_text(other)),
    }
}

fn json_coordinate(val: &JsonValue, row: usize, col: &'static str) -> Result<f64> {
    match val {
        JsonValue::Number(n) => {
            let value = n
                .as_f64()
                .ok_or_else(|| invalid_row(row, format!("{col} is out of range")))?;
            check_coordinate(value, row, col)
        }
        JsonValue::String(s) => parse_coordinate(s, row, col),
        other => Err(invalid_row(row, format!("{col} {other} is not a number"))),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a station table.
///
/// Expected schema:
/// - `Project_Name`, `Station`, `Platform`: Utf8 / LargeUtf8
/// - `Instrument_Type`: Utf8 (separated list) or List<Utf8 / LargeUtf8>
/// - `Lat`, `Lon`: Float64 / Float32 / Int64 / Int32
pub fn load_parquet(path: &Path) -> Result<StationDataset> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    // Resolve against the file schema so that empty files are checked too.
    let columns =
        ColumnIndex::resolve(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();

        for row in 0..batch.num_rows() {
            let row_no = offset + row + 1;
            records.push(StationRecord {
                project: require_text(
                    &arrow_text(batch.column(columns.project), row),
                    row_no,
                    PROJECT,
                )?,
                station: require_text(
                    &arrow_text(batch.column(columns.station), row),
                    row_no,
                    STATION,
                )?,
                platform: arrow_text(batch.column(columns.platform), row),
                instruments: arrow_instruments(
                    batch.column(columns.instrument_type),
                    row,
                    row_no,
                )?,
                lat: arrow_f64(batch.column(columns.lat), row, row_no, LAT)?,
                lon: arrow_f64(batch.column(columns.lon), row, row_no, LON)?,
            });
        }
    }

    Ok(StationDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Read a string cell; nulls and non-string columns become text.
fn arrow_text(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).trim().to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).trim().to_string(),
        DataType::Int64 => col.as_primitive::<arrow::datatypes::Int64Type>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<arrow::datatypes::Int32Type>().value(row).to_string(),
        other => format!("{other:?}"),
    }
}

fn arrow_instruments(col: &Arc<dyn Array>, row: usize, row_no: usize) -> Result<Instruments> {
    if col.is_null(row) {
        return Ok(Instruments::default());
    }
    let values = match col.data_type() {
        DataType::List(_) => col.as_any().downcast_ref::<ListArray>().map(|l| l.value(row)),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .map(|l| l.value(row)),
        _ => return Ok(Instruments::parse(&arrow_text(col, row))),
    };
    let items: Option<Vec<&str>> = values.as_ref().and_then(|v| {
        if let Some(strings) = v.as_string_opt::<i32>() {
            Some(strings.iter().flatten().collect())
        } else {
            v.as_string_opt::<i64>()
                .map(|strings| strings.iter().flatten().collect())
        }
    });
    match items {
        Some(items) => Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()),
        None => Err(invalid_row(
            row_no,
            format!(
                "{INSTRUMENT_TYPE} column has type {:?}, expected a list of strings",
                col.data_type()
            ),
        )),
    }
}

fn arrow_f64(col: &Arc<dyn Array>, row: usize, row_no: usize, name: &'static str) -> Result<f64> {
    if col.is_null(row) {
        return Err(invalid_row(row_no, format!("null {name}")));
    }
    let any = col.as_any();
    let value = if let Some(arr) = any.downcast_ref::<Float64Array>() {
        arr.value(row)
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        arr.value(row) as f64
    } else if matches!(col.data_type(), DataType::Utf8 | DataType::LargeUtf8) {
        return parse_coordinate(&arrow_text(col, row), row_no, name);
    } else {
        return Err(invalid_row(
            row_no,
            format!("{name} column has type {:?}", col.data_type()),
        ));
    };
    check_coordinate(value, row_no, name)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        ArrayRef, Float64Array, Int32Builder, LargeStringBuilder, ListBuilder, StringArray,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;

    const HEADER: &str = "Project_Name,Station,Platform,Instrument_Type,Lat (°S),Lon (°E)";

    #[test]
    fn csv_with_unit_suffixed_headers_loads() {
        let text = format!(
            "{HEADER}\n\
             A,A-01,RV Algoa,\"CTD, TSG\",-30.0,20.0\n\
             B,B-01,SA Agulhas II,TSG,-31.5,22.25\n"
        );
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.project, "A");
        assert_eq!(first.instruments.to_string(), "CTD, TSG");
        assert_eq!((first.lat, first.lon), (-30.0, 20.0));
        assert_eq!(ds.records[1].platform, "SA Agulhas II");
    }

    #[test]
    fn csv_missing_column_is_reported_by_name() {
        let err = read_csv("Project_Name,Station,Platform,Lat,Lon\nA,1,P,-30,20\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("Instrument_Type")));
    }

    #[test]
    fn csv_bad_coordinate_names_the_row() {
        let text = format!("{HEADER}\nA,A-01,P,CTD,-30.0,20.0\nA,A-02,P,CTD,south,20.0\n");
        match read_csv(text.as_bytes()) {
            Err(DataLoadError::InvalidRow { row, message }) => {
                assert_eq!(row, 3, "header is line 1, A-02 is line 3");
                assert!(message.contains("south"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn csv_rejects_unplottable_coordinates() {
        for (lat, lon) in [("NaN", "20.0"), ("-30.0", "inf"), ("-91.0", "20.0"), ("-30.0", "180.5")] {
            let text = format!("{HEADER}\nA,A-01,P,CTD,{lat},{lon}\n");
            match read_csv(text.as_bytes()) {
                Err(DataLoadError::InvalidRow { row, .. }) => assert_eq!(row, 2),
                other => panic!("({lat}, {lon}): expected InvalidRow, got {other:?}"),
            }
        }
        let edge = format!("{HEADER}\nA,A-01,P,CTD,-90.0,180.0\n");
        assert_eq!(read_csv(edge.as_bytes()).unwrap().records[0].lon, 180.0);
    }

    #[test]
    fn json_rejects_unplottable_coordinates() {
        let text = r#"[
            {"Project_Name": "A", "Station": "1", "Platform": "P",
             "Instrument_Type": "CTD", "Lat": -30, "Lon": 20},
            {"Project_Name": "A", "Station": "2", "Platform": "P",
             "Instrument_Type": "CTD", "Lat": 95.5, "Lon": 20}
        ]"#;
        assert!(matches!(
            read_json(text),
            Err(DataLoadError::InvalidRow { row: 2, .. })
        ));
        let text = r#"[{"Project_Name": "A", "Station": "1", "Platform": "P",
                        "Instrument_Type": "CTD", "Lat": "-30", "Lon": "NaN"}]"#;
        assert!(matches!(
            read_json(text),
            Err(DataLoadError::InvalidRow { row: 1, .. })
        ));
    }

    #[test]
    fn json_accepts_list_and_string_instruments() {
        let text = r#"[
            {"Project_Name": "A", "Station": "1", "Platform": "P",
             "Instrument_Type": ["CTD", "Bongo"], "Lat": -30, "Lon": 20.5},
            {"Project_Name": "B", "Station": 2, "Platform": null,
             "Instrument_Type": "TSG", "Lat (°S)": "-31.0", "Lon": 22}
        ]"#;
        let ds = read_json(text).unwrap();
        assert_eq!(ds.records[0].instruments.to_string(), "Bongo, CTD");
        assert_eq!(ds.records[1].station, "2");
        assert_eq!(ds.records[1].platform, "");
        assert_eq!(ds.records[1].lat, -31.0);
    }

    #[test]
    fn json_row_without_lon_fails() {
        let text = r#"[{"Project_Name": "A", "Station": "1", "Platform": "P",
                        "Instrument_Type": "CTD", "Lat": -30}]"#;
        assert!(matches!(
            read_json(text),
            Err(DataLoadError::MissingColumn("Lon"))
        ));
    }

    #[test]
    fn unsupported_extension_and_missing_file() {
        let dir = tempdir().unwrap();
        let xlsx = dir.path().join("stations.xlsx");
        std::fs::write(&xlsx, b"").unwrap();
        assert!(matches!(
            load_file(&xlsx),
            Err(DataLoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
        assert!(matches!(
            load_file(&dir.path().join("absent.csv")),
            Err(DataLoadError::Io { .. })
        ));
    }

    #[test]
    fn csv_file_round_trip_through_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "A,A-01,RV Algoa,CTD,-30.0,20.0").unwrap();
        drop(file);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.project_names(), ["A".to_string()]);
    }

    #[test]
    fn parquet_file_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Project_Name", DataType::Utf8, false),
            Field::new("Station", DataType::Utf8, false),
            Field::new("Platform", DataType::Utf8, true),
            Field::new("Instrument_Type", DataType::Utf8, true),
            Field::new("Lat", DataType::Float64, false),
            Field::new("Lon", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["A-01", "B-01"])),
                Arc::new(StringArray::from(vec![Some("RV Algoa"), None])),
                Arc::new(StringArray::from(vec!["CTD;ADCP", "TSG"])),
                Arc::new(Float64Array::from(vec![-30.0, -31.0])),
                Arc::new(Float64Array::from(vec![20.0, 22.0])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].instruments.to_string(), "ADCP, CTD");
        assert_eq!(ds.records[1].platform, "");
        assert_eq!(ds.records[1].lon, 22.0);
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    fn station_batch(instruments: ArrayRef, lat: f64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Project_Name", DataType::Utf8, false),
            Field::new("Station", DataType::Utf8, false),
            Field::new("Platform", DataType::Utf8, false),
            Field::new("Instrument_Type", instruments.data_type().clone(), true),
            Field::new("Lat", DataType::Float64, false),
            Field::new("Lon", DataType::Float64, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(StringArray::from(vec!["A-01"])),
                Arc::new(StringArray::from(vec!["RV Algoa"])),
                instruments,
                Arc::new(Float64Array::from(vec![lat])),
                Arc::new(Float64Array::from(vec![20.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_parquet_without_required_columns_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("Foo", DataType::Utf8, false)]));
        write_parquet(&path, &RecordBatch::new_empty(schema));

        assert!(matches!(
            load_file(&path),
            Err(DataLoadError::MissingColumn("Project_Name"))
        ));
    }

    #[test]
    fn parquet_list_of_large_strings_loads() {
        let mut builder = ListBuilder::new(LargeStringBuilder::new());
        builder.values().append_value("TSG");
        builder.values().append_value("CTD");
        builder.append(true);
        let instruments: ArrayRef = Arc::new(builder.finish());

        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.parquet");
        write_parquet(&path, &station_batch(instruments, -30.0));

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records[0].instruments.to_string(), "CTD, TSG");
    }

    #[test]
    fn parquet_list_of_numbers_is_rejected() {
        let mut builder = ListBuilder::new(Int32Builder::new());
        builder.values().append_value(7);
        builder.append(true);
        let instruments: ArrayRef = Arc::new(builder.finish());

        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.parquet");
        write_parquet(&path, &station_batch(instruments, -30.0));

        assert!(matches!(
            load_file(&path),
            Err(DataLoadError::InvalidRow { row: 1, .. })
        ));
    }

    #[test]
    fn parquet_rejects_non_finite_latitude() {
        let instruments: ArrayRef = Arc::new(StringArray::from(vec!["CTD"]));
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.parquet");
        write_parquet(&path, &station_batch(instruments, f64::NAN));

        match load_file(&path) {
            Err(DataLoadError::InvalidRow { row, message }) => {
                assert_eq!(row, 1);
                assert!(message.contains("Lat"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }
}
