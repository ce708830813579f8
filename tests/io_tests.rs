//! Tests for the I/O helpers
//!
//! These tests verify:
//! - RecordCursor sequential reads, save/restore and truncation detection
//! - Rewinds inside the read buffer do not touch the underlying reader
//! - Read and write failures name the path that failed
//! - RecordWriter terminator handling
//! - Line reader callbacks, early stop and error classification

use std::cell::Cell;
use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use diskjoin::io::{read_from, read_from_write_to, RecordCursor, RecordWriter};
use diskjoin::JoinError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const WIDTH: usize = 26;

fn record(key: u64) -> String {
    format!("{:09},V{:013}\n", key, key)
}

fn records(keys: &[u64]) -> Vec<u8> {
    keys.iter().map(|&k| record(k)).collect::<String>().into_bytes()
}

/// Reader that counts calls reaching the underlying source
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    reads: Rc<Cell<usize>>,
}

impl CountingReader {
    fn new(data: Vec<u8>) -> (Self, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let reader = Self {
            inner: Cursor::new(data),
            reads: Rc::clone(&reads),
        };
        (reader, reads)
    }
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(buf)
    }
}

impl Seek for CountingReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Reader whose every read fails
struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk failure"))
    }
}

impl Seek for FailingReader {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

/// Writer whose every write fails
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn setup_temp_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("table.csv");
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

// =============================================================================
// RecordCursor Tests
// =============================================================================

#[test]
fn test_cursor_reads_records_in_order() {
    let mut cursor = RecordCursor::new(Cursor::new(records(&[1, 2, 3])), WIDTH, "test");
    let mut buf = vec![0u8; WIDTH];

    for key in 1..=3 {
        assert!(cursor.read_record(&mut buf).unwrap());
        assert_eq!(buf, record(key).into_bytes());
    }
    assert!(!cursor.read_record(&mut buf).unwrap());
    assert_eq!(cursor.records_read(), 3);
}

#[test]
fn test_cursor_empty_input() {
    let mut cursor = RecordCursor::new(Cursor::new(Vec::new()), WIDTH, "empty");
    let mut buf = vec![0u8; WIDTH];

    assert!(!cursor.read_record(&mut buf).unwrap());
    assert_eq!(cursor.records_read(), 0);
}

#[test]
fn test_cursor_save_restore() {
    let mut cursor = RecordCursor::new(Cursor::new(records(&[10, 20, 30, 40])), WIDTH, "test");
    let mut buf = vec![0u8; WIDTH];

    cursor.read_record(&mut buf).unwrap();
    let saved = cursor.save();

    cursor.read_record(&mut buf).unwrap();
    cursor.read_record(&mut buf).unwrap();
    assert_eq!(buf, record(30).into_bytes());

    cursor.restore(saved).unwrap();
    assert_eq!(cursor.records_read(), 1);
    cursor.read_record(&mut buf).unwrap();
    assert_eq!(buf, record(20).into_bytes());
}

#[test]
fn test_cursor_restore_after_end_of_input() {
    let mut cursor = RecordCursor::new(Cursor::new(records(&[1, 2])), WIDTH, "test");
    let mut buf = vec![0u8; WIDTH];

    let start = cursor.save();
    while cursor.read_record(&mut buf).unwrap() {}

    cursor.restore(start).unwrap();
    assert!(cursor.read_record(&mut buf).unwrap());
    assert_eq!(buf, record(1).into_bytes());
}

#[test]
fn test_cursor_rewinds_over_many_records() {
    let keys: Vec<u64> = (0..2000).collect();
    let mut cursor = RecordCursor::new(Cursor::new(records(&keys)), WIDTH, "big");
    let mut buf = vec![0u8; WIDTH];

    let saved = cursor.save();
    for _ in 0..2000 {
        assert!(cursor.read_record(&mut buf).unwrap());
    }
    cursor.restore(saved).unwrap();

    cursor.read_record(&mut buf).unwrap();
    assert_eq!(buf, record(0).into_bytes());
}

#[test]
fn test_cursor_truncated_record() {
    let mut data = records(&[1]);
    data.extend_from_slice(b"0000000");
    let mut cursor = RecordCursor::new(Cursor::new(data), WIDTH, "short");
    let mut buf = vec![0u8; WIDTH];

    assert!(cursor.read_record(&mut buf).unwrap());
    match cursor.read_record(&mut buf) {
        Err(JoinError::MalformedRecord { context, .. }) => assert_eq!(context, "short"),
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_cursor_restore_within_buffer_reuses_it() {
    let keys: Vec<u64> = (0..100).collect();
    let (reader, reads) = CountingReader::new(records(&keys));
    let mut cursor = RecordCursor::new(reader, WIDTH, "counted");
    let mut buf = vec![0u8; WIDTH];

    // Save, scan two records ahead, rewind: the pattern of a duplicate scan
    for _ in 0..98 {
        let saved = cursor.save();
        cursor.read_record(&mut buf).unwrap();
        cursor.read_record(&mut buf).unwrap();
        cursor.restore(saved).unwrap();
        assert!(cursor.read_record(&mut buf).unwrap());
    }

    // All 2600 bytes arrive with the first buffer fill
    assert!(reads.get() <= 2, "underlying reads: {}", reads.get());
}

#[test]
fn test_cursor_read_failure_names_source() {
    let mut cursor = RecordCursor::new(FailingReader, WIDTH, "/data/input_A.csv");
    let mut buf = vec![0u8; WIDTH];

    match cursor.read_record(&mut buf) {
        Err(JoinError::InputUnreadable { path, .. }) => {
            assert_eq!(path, Path::new("/data/input_A.csv"))
        }
        other => panic!("expected InputUnreadable, got {:?}", other),
    }
}

// =============================================================================
// RecordWriter Tests
// =============================================================================

#[test]
fn test_writer_appends_terminator_to_lines() {
    let mut writer = RecordWriter::new(Vec::new(), b'\n', "memory");

    writer.write_line(b"abc").unwrap();
    writer.write_record(b"def\n").unwrap();
    writer.write_block(b"g\nh\n", 2).unwrap();

    assert_eq!(writer.written(), 4);
    assert_eq!(writer.finish().unwrap(), b"abc\ndef\ng\nh\n".to_vec());
}

#[test]
fn test_writer_failure_names_destination() {
    let mut writer = RecordWriter::new(FailingWriter, b'\n', "/data/output.csv");

    match writer.write_line(b"abc") {
        Err(JoinError::OutputUnwritable { path, .. }) => {
            assert_eq!(path, Path::new("/data/output.csv"))
        }
        other => panic!("expected OutputUnwritable, got {:?}", other),
    }
    assert_eq!(writer.written(), 0);
}

// =============================================================================
// Line Reader Tests
// =============================================================================

#[test]
fn test_read_from_visits_every_line() {
    let (_temp, path) = setup_temp_file("a,1\nb,2\nc,3\n");
    let mut seen = Vec::new();

    let stats = read_from(&path, |line| {
        seen.push(line.to_string());
        Ok(true)
    })
    .unwrap();

    assert_eq!(seen, vec!["a,1", "b,2", "c,3"]);
    assert_eq!(stats.lines, 3);
    assert!(!stats.stopped_early);
}

#[test]
fn test_read_from_stops_early() {
    let (_temp, path) = setup_temp_file("a\nb\nc\n");
    let mut seen = 0;

    let stats = read_from(&path, |_| {
        seen += 1;
        Ok(seen < 2)
    })
    .unwrap();

    assert_eq!(seen, 2);
    assert_eq!(stats.lines, 2);
    assert!(stats.stopped_early);
}

#[test]
fn test_read_from_propagates_callback_error() {
    let (_temp, path) = setup_temp_file("a\nb\n");

    let result = read_from(&path, |_| Err(JoinError::malformed("test", "bad line")));

    assert!(matches!(result, Err(JoinError::MalformedRecord { .. })));
}

#[test]
fn test_read_from_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.csv");

    let result = read_from(&path, |_| Ok(true));

    match result {
        Err(JoinError::InputNotFound { path: p }) => assert_eq!(p, path),
        other => panic!("expected InputNotFound, got {:?}", other),
    }
}

#[test]
fn test_read_from_write_to() {
    let (temp, src) = setup_temp_file("x\ny\n");
    let dst = temp.path().join("out.csv");

    let stats = read_from_write_to(&src, &dst, |line, writer| {
        writeln!(writer, "{}{}", line, line)?;
        Ok(true)
    })
    .unwrap();

    assert_eq!(stats.lines, 2);
    assert_eq!(fs::read_to_string(&dst).unwrap(), "xx\nyy\n");
}

#[test]
fn test_read_from_write_to_empty_input_creates_output() {
    let (temp, src) = setup_temp_file("");
    let dst = temp.path().join("out.csv");

    let stats = read_from_write_to(&src, &dst, |_, _| Ok(true)).unwrap();

    assert_eq!(stats.lines, 0);
    assert!(dst.exists());
    assert_eq!(fs::read_to_string(&dst).unwrap(), "");
}

#[test]
fn test_read_from_write_to_unwritable_output() {
    let (temp, src) = setup_temp_file("x\n");
    let dst = temp.path().join("no_such_dir").join("out.csv");

    let result = read_from_write_to(&src, &dst, |_, _| Ok(true));

    assert!(matches!(result, Err(JoinError::OutputUnwritable { .. })));
}
