//! Table writers
//!
//! CSV columns follow [`GameTableRecord`] field order. Members are rendered as
//! a tuple literal of quoted ids (`()`, `('0',)`, `('0', '1')`) so that one
//! cell holds the whole coalition.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use nkgames_common::GameTableRecord;
use tracing::debug;

/// CSV header row
pub const CSV_HEADER: &str = "coalition_id,members,size,mean_value,std_value,runs,notes";

/// Supported output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Write `table` to `path`, creating parent directories as needed
pub fn write_table(table: &[GameTableRecord], path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(table, &mut writer)?,
        OutputFormat::Json => write_json(table, &mut writer)?,
    }
    writer.flush()?;
    debug!(path = %path.display(), ?format, "Table written");
    Ok(())
}

pub fn write_csv<W: Write>(table: &[GameTableRecord], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for record in table {
        writeln!(
            writer,
            "{},{},{},{:?},{:?},{},{}",
            record.coalition_id,
            csv_field(&members_literal(&record.members)),
            record.size,
            record.mean_value,
            record.std_value,
            record.runs,
            csv_field(&record.notes),
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(table: &[GameTableRecord], writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, table)?;
    writeln!(writer)?;
    Ok(())
}

/// `('a', 'b')`, with the trailing comma a one-element tuple needs
pub fn members_literal(members: &[String]) -> String {
    let quoted: Vec<String> = members
        .iter()
        .map(|m| format!("'{}'", m.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    match quoted.len() {
        1 => format!("({},)", quoted[0]),
        _ => format!("({})", quoted.join(", ")),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, members: &[&str], notes: &str) -> GameTableRecord {
        GameTableRecord {
            coalition_id: id,
            members: members.iter().map(|m| m.to_string()).collect(),
            size: members.len(),
            mean_value: 0.5,
            std_value: 0.0,
            runs: 2,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_members_literal() {
        assert_eq!(members_literal(&[]), "()");
        assert_eq!(members_literal(&["0".to_string()]), "('0',)");
        assert_eq!(
            members_literal(&["0".to_string(), "1".to_string()]),
            "('0', '1')"
        );
    }

    #[test]
    fn test_csv_rows() {
        let table = vec![
            record(0, &[], "scenario=x;empty coalition"),
            record(1, &["0"], "plain"),
            record(2, &["0", "1"], "say \"hi\""),
        ];
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0,(),0,0.5,0.0,2,scenario=x;empty coalition");
        assert_eq!(lines[2], "1,\"('0',)\",1,0.5,0.0,2,plain");
        assert_eq!(lines[3], "2,\"('0', '1')\",2,0.5,0.0,2,\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_json_round_trips() {
        let table = vec![record(0, &[], "n"), record(1, &["rnd"], "n")];
        let mut buf = Vec::new();
        write_json(&table, &mut buf).unwrap();
        let parsed: Vec<GameTableRecord> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_write_table_creates_parents() {
        let dir = std::env::temp_dir().join(format!("nk-games-output-{}", std::process::id()));
        let path = dir.join("nested").join("table.csv");
        write_table(&[record(0, &[], "n")], &path, OutputFormat::Csv).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        fs::remove_dir_all(&dir).unwrap();
    }
}
