//! パフォーマンスベンチマーク
//!
//! このモジュールは、xlsxgridクレートのパフォーマンスを測定するためのベンチマークを提供します。
//!
//! 実装するベンチマーク:
//! - 列コーデック（列文字列と列番号の相互変換）
//! - メモリ上のソースからのグリッド構築（XLSX解析を含まない）
//! - XLSXファイルからのグリッド構築
//! - 複数シートの並列構築
//!
//! フィクスチャはrust_xlsxwriterでメモリ上に生成するため、事前準備は不要です。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Cursor;
use xlsxgrid::{build_grid, index_to_letter, letter_to_index, GridBuilder, MemorySource, MAX_COLUMNS};

const BENCH_COLUMNS: u16 = 12;

/// 指定行数の表を持つシートを書き込む
fn write_table(workbook: &mut Workbook, name: &str, rows: u32) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    let fill = Format::new().set_background_color(0xFFFF00);

    for col in 0..BENCH_COLUMNS {
        worksheet.write_string(0, col, format!("Header{}", col))?;
    }
    for row in 1..=rows {
        worksheet.write_string(row, 0, format!("P{:06}", row))?;
        worksheet.write_number(row, 1, row as f64 * 1.5)?;
        worksheet.write_boolean(row, 2, row % 2 == 0)?;
        for col in 3..BENCH_COLUMNS {
            worksheet.write_number(row, col, (row * col as u32) as f64)?;
        }
    }
    // 末尾の空行（トリム対象）
    for row in rows + 1..=rows + 50 {
        worksheet.write_blank(row, 0, &fill)?;
    }
    Ok(())
}

/// 単一シートのワークブックを生成
fn generate_workbook(rows: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    write_table(&mut workbook, "Data", rows)?;
    workbook.save_to_buffer()
}

/// 複数シートのワークブックを生成
fn generate_multi_sheet_workbook(sheets: usize, rows: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    for i in 0..sheets {
        write_table(&mut workbook, &format!("Sheet{}", i + 1), rows)?;
    }
    workbook.save_to_buffer()
}

/// メモリ上のソースを生成
fn generate_memory_source(rows: usize) -> MemorySource {
    let table = (0..rows).map(|row| {
        (0..BENCH_COLUMNS as usize)
            .map(|col| format!("{}", row * col))
            .collect::<Vec<_>>()
    });
    MemorySource::new().with_text_sheet("Data", table)
}

/// 列コーデック
fn benchmark_column_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_codec");
    group.throughput(Throughput::Elements(MAX_COLUMNS as u64));

    group.bench_function("index_to_letter_all_columns", |b| {
        b.iter(|| {
            for index in 1..=MAX_COLUMNS {
                black_box(index_to_letter(black_box(index)).unwrap());
            }
        });
    });

    let letters: Vec<String> = (1..=MAX_COLUMNS)
        .map(|index| index_to_letter(index).unwrap())
        .collect();
    group.bench_function("letter_to_index_all_columns", |b| {
        b.iter(|| {
            for letter in &letters {
                black_box(letter_to_index(black_box(letter)).unwrap());
            }
        });
    });

    group.finish();
}

/// メモリ上のソースからのグリッド構築
fn benchmark_memory_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_source");

    for rows in [1_000usize, 10_000] {
        let mut source = generate_memory_source(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("build_grid", rows), &rows, |b, _| {
            b.iter(|| black_box(build_grid(&mut source, "Data", 0, "L").unwrap()));
        });
    }

    group.finish();
}

/// XLSXファイルからのグリッド構築
fn benchmark_xlsx_load(c: &mut Criterion) {
    let data = match generate_workbook(10_000) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Warning: Failed to generate workbook: {}. Skipping benchmark.", e);
            return;
        }
    };

    let loader = GridBuilder::new().build().unwrap();
    let fixed_width = GridBuilder::new().with_max_col("L").build().unwrap();

    let mut group = c.benchmark_group("xlsx_load");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10); // XLSX解析は時間がかかるため、10回のサンプル

    group.bench_function("load_10k_rows_auto_width", |b| {
        b.iter(|| {
            let grid = loader
                .load_xlsx(Cursor::new(black_box(&data)), "Data")
                .unwrap();
            black_box(grid)
        });
    });

    group.bench_function("load_10k_rows_fixed_width", |b| {
        b.iter(|| {
            let grid = fixed_width
                .load_xlsx(Cursor::new(black_box(&data)), "Data")
                .unwrap();
            black_box(grid)
        });
    });

    group.finish();
}

/// 複数シートの並列構築
fn benchmark_parallel_sheets(c: &mut Criterion) {
    let data = match generate_multi_sheet_workbook(8, 2_000) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Warning: Failed to generate workbook: {}. Skipping benchmark.", e);
            return;
        }
    };
    let sheets: Vec<String> = (1..=8).map(|i| format!("Sheet{}", i)).collect();
    let loader = GridBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("parallel_sheets");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    group.bench_function("load_8_sheets_parallel", |b| {
        b.iter(|| {
            let grids = loader
                .load_xlsx_sheets(Cursor::new(black_box(&data)), &sheets)
                .unwrap();
            black_box(grids)
        });
    });

    group.bench_function("load_8_sheets_sequential", |b| {
        b.iter(|| {
            for sheet in &sheets {
                let grid = loader
                    .load_xlsx(Cursor::new(black_box(&data)), sheet)
                    .unwrap();
                black_box(grid);
            }
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .warm_up_time(std::time::Duration::from_secs(3));
    targets = benchmark_column_codec, benchmark_memory_source, benchmark_xlsx_load, benchmark_parallel_sheets
}

criterion_main!(benches);
