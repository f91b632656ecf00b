//! Security Tests
//!
//! ZIP bomb、パストラバーサル、入力サイズ上限への対策を検証します。

use std::io::{Cursor, Write};
use xlsxgrid::{GridBuilder, SecurityConfig, XlsxGridError, XlsxSource};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// 任意のエントリを持つZIPアーカイブを作成
fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    zip_data
}

/// 有効な最小限のワークブック
fn valid_workbook() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "ok").unwrap();
    workbook.save_to_buffer().unwrap()
}

/// ZIP bomb攻撃のテスト: ファイル数の上限
#[test]
fn test_zip_bomb_too_many_files() {
    let names: Vec<String> = (0..11).map(|i| format!("xl/file{}.xml", i)).collect();
    let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"test"[..])).collect();
    let zip_data = build_zip(&entries);

    let security = SecurityConfig {
        max_file_count: 10,
        ..SecurityConfig::default()
    };
    match XlsxSource::from_bytes_with_config(zip_data, &security) {
        Err(XlsxGridError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
        Err(e) => panic!("Unexpected error: {:?}", e),
        Ok(_) => panic!("Expected SecurityViolation"),
    }
}

/// ZIP bomb攻撃のテスト: 単一ファイルの展開後サイズ
#[test]
fn test_zip_bomb_large_entry() {
    let large = vec![0u8; 2048];
    let zip_data = build_zip(&[("xl/large_file.xml", large.as_slice())]);

    let security = SecurityConfig {
        max_file_size: 1024,
        ..SecurityConfig::default()
    };
    match XlsxSource::from_bytes_with_config(zip_data, &security) {
        Err(XlsxGridError::SecurityViolation(msg)) => assert!(msg.contains("exceeds maximum size")),
        Err(e) => panic!("Unexpected error: {:?}", e),
        Ok(_) => panic!("Expected SecurityViolation"),
    }
}

/// パストラバーサル攻撃のテスト: `..`を含むパス
#[test]
fn test_path_traversal_dotdot() {
    let zip_data = build_zip(&[("xl/../../etc/passwd", &b"root"[..])]);

    match XlsxSource::from_bytes(zip_data) {
        Err(XlsxGridError::SecurityViolation(msg)) => assert!(msg.contains("Invalid ZIP path")),
        Err(e) => panic!("Unexpected error: {:?}", e),
        Ok(_) => panic!("Expected SecurityViolation"),
    }
}

/// パストラバーサル攻撃のテスト: 絶対パス
#[test]
fn test_path_traversal_absolute_path() {
    let zip_data = build_zip(&[("/etc/passwd", &b"root"[..])]);
    assert!(matches!(
        XlsxSource::from_bytes(zip_data),
        Err(XlsxGridError::SecurityViolation(_))
    ));
}

/// 入力ファイルサイズの上限
#[test]
fn test_input_file_size_limit() {
    let data = valid_workbook();
    let loader = GridBuilder::new()
        .with_security_config(SecurityConfig {
            max_input_file_size: (data.len() - 1) as u64,
            ..SecurityConfig::default()
        })
        .build()
        .unwrap();

    match loader.load_xlsx(Cursor::new(data), "Sheet1") {
        Err(XlsxGridError::SecurityViolation(msg)) => assert!(msg.contains("Input file size")),
        other => panic!("Unexpected result: {:?}", other.map(|g| g.len())),
    }
}

/// 0の制限はビルド時に拒否される
#[test]
fn test_zero_limits_rejected() {
    let result = GridBuilder::new()
        .with_security_config(SecurityConfig {
            max_decompressed_size: 0,
            ..SecurityConfig::default()
        })
        .build();
    assert!(matches!(result, Err(XlsxGridError::Config(_))));
}

/// 正常なファイルはデフォルト設定で処理できる
#[test]
fn test_valid_file_processing() {
    let loader = GridBuilder::new().build().unwrap();
    let grid = loader.load_xlsx(Cursor::new(valid_workbook()), "Sheet1").unwrap();
    assert_eq!(grid.value("A", 1).unwrap(), "ok");
}
