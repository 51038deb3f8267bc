// Tests for EnergyExtractor: header skip, column schema, date and decimal coercion

use calamine::{Data, Range};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use energy_report::importers::energy_extractor::SOURCE_DATE_FORMAT;
use energy_report::importers::workbook_reader::grid_from_range;
use energy_report::importers::{EnergyExtractor, ExtractError, ExtractorConfig};
use energy_report::models::{CellValue, Grid, Measurement, RecordDate, Workbook};
use serde_json::json;

fn text(s: &str) -> CellValue {
    CellValue::from(s)
}

/// Four metadata rows like the real export, followed by `data`
fn sheet_with_data(data: Vec<Vec<CellValue>>) -> Grid {
    let mut grid: Grid = vec![
        vec![text("Energiedaten Export")],
        vec![text("Zählpunkt"), text("AT0010000000000000001000000000001")],
        vec![],
        vec![text("Datum"), text("Verbrauch [kWh]"), text("Einspeisung [kWh]")],
    ];
    grid.extend(data);
    grid
}

fn extractor(sheet: &str) -> EnergyExtractor {
    EnergyExtractor::new(ExtractorConfig::new(sheet))
}

#[test]
fn test_reference_row_in_vienna() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![vec![
            text("19.01.2025 08:00:00"),
            text("12,5"),
            text("3"),
        ]]),
    );

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        serde_json::to_value(&records[0]).unwrap(),
        json!({"date": "2025-01-19T07:00:00.000Z", "consumption": 12.5, "generation": 3})
    );
}

#[test]
fn test_sheet_not_found() {
    let workbook = Workbook::new().with_sheet("Sheet1", sheet_with_data(vec![vec![]]));

    let result = extractor("Sheet2").extract(&workbook);

    match result.unwrap_err() {
        ExtractError::SheetNotFound(sheet) => assert_eq!(sheet, "Sheet2"),
        other => panic!("Expected SheetNotFound error, got {other:?}"),
    }
}

#[test]
fn test_insufficient_data() {
    for rows in 0..5 {
        let grid: Grid = (0..rows).map(|_| vec![text("x")]).collect();
        let workbook = Workbook::new().with_sheet("Energiedaten", grid);

        match extractor("Energiedaten").extract(&workbook).unwrap_err() {
            ExtractError::InsufficientData {
                sheet,
                rows: found,
                required,
            } => {
                assert_eq!(sheet, "Energiedaten");
                assert_eq!(found, rows);
                assert_eq!(required, 5);
            }
            other => panic!("Expected InsufficientData error, got {other:?}"),
        }
    }
}

#[test]
fn test_exactly_five_rows_yields_one_record() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![vec![text("01.01.2025 00:00:00"), text("1"), text("0")]]),
    );

    assert_eq!(extractor("Energiedaten").extract(&workbook).unwrap().len(), 1);
}

#[test]
fn test_record_count_and_order_follow_rows() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    for data_rows in [1usize, 2, 17, 96] {
        let data = (0..data_rows)
            .map(|i| {
                let wall = start + Duration::minutes(15 * i as i64);
                vec![
                    text(&wall.format(SOURCE_DATE_FORMAT).to_string()),
                    CellValue::Number(i as f64),
                    CellValue::Number(0.0),
                ]
            })
            .collect();
        let grid = sheet_with_data(data);
        let total_rows = grid.len();
        let workbook = Workbook::new().with_sheet("Energiedaten", grid);

        let records = extractor("Energiedaten").extract(&workbook).unwrap();

        assert_eq!(records.len(), total_rows - 4);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.consumption, Measurement::Value(i as f64));
        }
        assert!(records
            .windows(2)
            .all(|w| w[0].date.instant() < w[1].date.instant()));
    }
}

#[test]
fn test_header_rows_are_never_inspected() {
    // A valid-looking data row inside the header block is still skipped
    let grid: Grid = vec![
        vec![text("01.01.2025 00:00:00"), text("99"), text("99")],
        vec![],
        vec![],
        vec![],
        vec![text("02.01.2025 00:00:00"), text("1"), text("2")],
    ];
    let workbook = Workbook::new().with_sheet("Energiedaten", grid);

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].consumption, Measurement::Value(1.0));
}

#[test]
fn test_custom_header_rows() {
    let grid: Grid = vec![
        vec![text("Datum"), text("Verbrauch"), text("Einspeisung")],
        vec![text("02.01.2025 00:00:00"), text("1"), text("2")],
    ];
    let workbook = Workbook::new().with_sheet("Daten", grid);
    let config = ExtractorConfig::new("Daten").with_header_rows(1);

    let records = EnergyExtractor::new(config).extract(&workbook).unwrap();

    assert_eq!(records.len(), 1);
}

#[test]
fn test_dates_round_trip_through_source_timezone() {
    let tz = chrono_tz::Europe::Vienna;
    let hours = [0u32, 1, 6, 12, 18, 23];

    let mut wall_clock = Vec::new();
    let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    while day < NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() {
        for hour in hours {
            let naive = day.and_hms_opt(hour, 15, 30).unwrap();
            wall_clock.push(naive.format(SOURCE_DATE_FORMAT).to_string());
        }
        day = day.succ_opt().unwrap();
    }

    let data = wall_clock
        .iter()
        .map(|s| vec![text(s), text("0"), text("0")])
        .collect();
    let workbook = Workbook::new().with_sheet("Energiedaten", sheet_with_data(data));

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    for (original, record) in wall_clock.iter().zip(&records) {
        let instant = record.date.instant().expect("date should parse");
        let back = instant
            .with_timezone(&tz)
            .format(SOURCE_DATE_FORMAT)
            .to_string();
        assert_eq!(&back, original);
    }
}

#[test]
fn test_summer_time_offset() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![vec![text("01.07.2024 00:15:00"), text("0,1"), text("0")]]),
    );

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(
        records[0].date,
        RecordDate::Instant(Utc.with_ymd_and_hms(2024, 6, 30, 22, 15, 0).unwrap())
    );
}

#[test]
fn test_configured_source_timezone() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![vec![text("19.01.2025 08:00:00"), text("1"), text("0")]]),
    );
    let config = ExtractorConfig::default().with_timezone(chrono_tz::Asia::Tokyo);

    let records = EnergyExtractor::new(config).extract(&workbook).unwrap();

    assert_eq!(
        records[0].date.instant(),
        Some(Utc.with_ymd_and_hms(2025, 1, 18, 23, 0, 0).unwrap())
    );
}

#[test]
fn test_unmatched_dates_pass_through_unchanged() {
    let cells = vec![
        text("2025-01-19 08:00:00"),
        text("19.01.2025"),
        text("19.1.2025 08:00:00"),
        text("31.02.2025 08:00:00"),
        text("Summe"),
        text(""),
        CellValue::Number(45676.333),
        CellValue::Empty,
    ];
    let data = cells
        .iter()
        .map(|c| vec![c.clone(), text("1"), text("1")])
        .collect();
    let workbook = Workbook::new().with_sheet("Energiedaten", sheet_with_data(data));

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records.len(), cells.len());
    for (cell, record) in cells.into_iter().zip(records) {
        assert_eq!(record.date, RecordDate::Raw(cell));
    }
}

#[test]
fn test_comma_decimals_match_period_decimals() {
    let pairs = [("12,5", "12.5"), ("0,25", "0.25"), ("-1,75", "-1.75"), ("100", "100")];
    let data = pairs
        .iter()
        .map(|(comma, period)| vec![text("19.01.2025 08:00:00"), text(comma), text(period)])
        .collect();
    let workbook = Workbook::new().with_sheet("Energiedaten", sheet_with_data(data));

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    for record in records {
        assert!(record.consumption.value().is_some());
        assert_eq!(record.consumption, record.generation);
    }
}

#[test]
fn test_numeric_cells_pass_through() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![vec![
            text("19.01.2025 08:00:00"),
            CellValue::Number(0.123),
            CellValue::Number(-4.0),
        ]]),
    );

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records[0].consumption, Measurement::Value(0.123));
    assert_eq!(records[0].generation, Measurement::Value(-4.0));
}

#[test]
fn test_unparsable_and_missing_quantities_do_not_abort() {
    let workbook = Workbook::new().with_sheet(
        "Energiedaten",
        sheet_with_data(vec![
            vec![text("19.01.2025 08:00:00"), text("n/a")],
            vec![text("19.01.2025 08:15:00"), text("1,5"), text("0")],
        ]),
    );

    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].consumption, Measurement::Raw(text("n/a")));
    assert_eq!(records[0].generation, Measurement::Raw(CellValue::Empty));
    assert_eq!(
        serde_json::to_value(&records[0]).unwrap(),
        json!({"date": "2025-01-19T07:00:00.000Z", "consumption": null, "generation": null})
    );
    assert_eq!(records[1].consumption, Measurement::Value(1.5));
}

#[test]
fn test_extract_from_calamine_range_with_column_offset() {
    // Used range starts at B1: the export left column A empty
    let mut range = Range::new((0, 1), (5, 3));
    range.set_value((0, 1), Data::String("Energiedaten Export".to_string()));
    range.set_value((3, 1), Data::String("Datum".to_string()));
    range.set_value((4, 1), Data::String("19.01.2025 08:00:00".to_string()));
    range.set_value((4, 2), Data::String("12,5".to_string()));
    range.set_value((4, 3), Data::Int(3));
    range.set_value((5, 1), Data::String("19.01.2025 08:15:00".to_string()));
    range.set_value((5, 2), Data::Float(1.25));

    let workbook = Workbook::new().with_sheet("Energiedaten", grid_from_range(&range));
    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    // Columns count from B, the first used column
    assert_eq!(records.len(), 2);
    assert_eq!(
        serde_json::to_value(&records[0]).unwrap(),
        json!({"date": "2025-01-19T07:00:00.000Z", "consumption": 12.5, "generation": 3})
    );
    assert_eq!(records[1].consumption, Measurement::Value(1.25));
    assert_eq!(records[1].generation, Measurement::Raw(CellValue::Empty));
}

#[test]
fn test_extract_from_calamine_range_with_row_offset() {
    // Row 1 is empty; the four header lines are rows 2-5
    let mut range = Range::new((1, 0), (6, 2));
    range.set_value((1, 0), Data::String("Energiedaten Export".to_string()));
    range.set_value((2, 0), Data::String("Zählpunkt".to_string()));
    range.set_value((3, 0), Data::String("Zeitraum".to_string()));
    range.set_value((4, 0), Data::String("Datum".to_string()));
    range.set_value((4, 1), Data::String("Verbrauch [kWh]".to_string()));
    range.set_value((5, 0), Data::String("19.01.2025 08:00:00".to_string()));
    range.set_value((5, 1), Data::Float(12.5));
    range.set_value((5, 2), Data::Float(3.0));
    range.set_value((6, 0), Data::String("19.01.2025 08:15:00".to_string()));
    range.set_value((6, 1), Data::Float(1.25));
    range.set_value((6, 2), Data::Float(0.0));

    let workbook = Workbook::new().with_sheet("Energiedaten", grid_from_range(&range));
    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| matches!(r.date, RecordDate::Instant(_))));
    assert_eq!(records[0].consumption, Measurement::Value(12.5));
    assert_eq!(records[1].consumption, Measurement::Value(1.25));
}

#[test]
fn test_extract_from_calamine_range_at_a1() {
    let mut range = Range::new((0, 0), (4, 2));
    range.set_value((0, 0), Data::String("Export".to_string()));
    range.set_value((4, 0), Data::String("19.01.2025 08:00:00".to_string()));
    range.set_value((4, 1), Data::String("12,5".to_string()));
    range.set_value((4, 2), Data::Float(3.0));

    let workbook = Workbook::new().with_sheet("Energiedaten", grid_from_range(&range));
    let records = extractor("Energiedaten").extract(&workbook).unwrap();

    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([{"date": "2025-01-19T07:00:00.000Z", "consumption": 12.5, "generation": 3}])
    );
}
