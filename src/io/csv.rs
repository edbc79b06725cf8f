use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use log::warn;

// ---------------------------------------------------------------------------
// Tracking-error log (recorder side)
// ---------------------------------------------------------------------------

/// Append-only per-step record of follower tracking errors.
///
/// Column order follows the follower id list fixed at construction. An id
/// with no value for a step records an empty cell.
#[derive(Debug, Clone)]
pub struct TrackingLog {
    follower_ids: Vec<u32>,
    rows: Vec<LogRow>,
}

#[derive(Debug, Clone)]
struct LogRow {
    step: usize,
    errors: Vec<Option<f64>>,
}

impl TrackingLog {
    pub fn new(follower_ids: Vec<u32>) -> Self {
        Self {
            follower_ids,
            rows: Vec::new(),
        }
    }

    pub fn follower_ids(&self) -> &[u32] {
        &self.follower_ids
    }

    /// Number of recorded data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Record the errors for one step, keyed by follower id.
    pub fn add_entry(&mut self, step: usize, errors: &[(u32, f64)]) {
        let row = self
            .follower_ids
            .iter()
            .map(|fid| errors.iter().find(|(id, _)| id == fid).map(|(_, e)| *e))
            .collect();
        self.rows.push(LogRow { step, errors: row });
    }

    /// Header row (`Step` plus one error column per follower) followed by
    /// one row per recorded step.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "Step")?;
        for fid in &self.follower_ids {
            write!(writer, ",Follower_{fid}_Error")?;
        }
        writeln!(writer)?;

        for row in &self.rows {
            write!(writer, "{}", row.step)?;
            for error in &row.errors {
                match error {
                    Some(e) => write!(writer, ",{e:.4}")?,
                    None => write!(writer, ",")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_csv(&mut file)
    }
}

// ---------------------------------------------------------------------------
// Error-series reader (plotting side)
// ---------------------------------------------------------------------------

/// One named error column loaded back from a CSV log. Points are
/// `[step, error]` pairs, ready for charting.
#[derive(Debug, Clone)]
pub struct ErrorColumn {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Parse a tracking-error CSV: every column whose header contains `Error`
/// becomes a series against the `Step` column. Malformed data rows are
/// skipped with a warning; empty cells are treated as gaps.
pub fn read_error_series<R: Read>(reader: R) -> io::Result<Vec<ErrorColumn>> {
    let mut lines = BufReader::new(reader).lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "tracking log is empty",
            ))
        }
    };

    let names: Vec<&str> = header.split(',').collect();
    if names.first().map(|n| n.trim()) != Some("Step") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "first column must be Step",
        ));
    }

    let error_cols: Vec<(usize, String)> = names
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, name)| name.contains("Error"))
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .collect();

    let mut columns: Vec<ErrorColumn> = error_cols
        .iter()
        .map(|(_, name)| ErrorColumn {
            name: name.clone(),
            points: Vec::new(),
        })
        .collect();

    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let step = match cells.first().and_then(|c| c.trim().parse::<f64>().ok()) {
            Some(step) => step,
            None => {
                warn!("skipping malformed row {} in tracking log", line_no + 2);
                continue;
            }
        };
        for (column, (cell_idx, _)) in columns.iter_mut().zip(&error_cols) {
            if let Some(value) = cells
                .get(*cell_idx)
                .and_then(|c| c.trim().parse::<f64>().ok())
            {
                column.points.push([step, value]);
            }
        }
    }

    Ok(columns)
}

pub fn read_error_series_file(path: impl AsRef<Path>) -> io::Result<Vec<ErrorColumn>> {
    read_error_series(std::fs::File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_plus_one_row_per_step() {
        let mut log = TrackingLog::new(vec![1, 2, 3, 4]);
        for step in 1..=5 {
            log.add_entry(step, &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        }

        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 6, "header + 5 data rows");
        assert_eq!(
            lines[0],
            "Step,Follower_1_Error,Follower_2_Error,Follower_3_Error,Follower_4_Error"
        );
        assert!(lines[1].starts_with("1,1.0000,"));
    }

    #[test]
    fn missing_follower_value_leaves_an_empty_cell() {
        let mut log = TrackingLog::new(vec![1, 2]);
        log.add_entry(1, &[(2, 7.5)]);

        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().nth(1), Some("1,,7.5000"));
    }

    #[test]
    fn reader_round_trips_the_writer() {
        let mut log = TrackingLog::new(vec![1, 2]);
        log.add_entry(1, &[(1, 10.0), (2, 20.0)]);
        log.add_entry(2, &[(1, 11.0), (2, 21.0)]);

        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let columns = read_error_series(&buf[..]).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "Follower_1_Error");
        assert_eq!(columns[0].points, vec![[1.0, 10.0], [2.0, 11.0]]);
        assert_eq!(columns[1].points[1], [2.0, 21.0]);
    }

    #[test]
    fn reader_skips_malformed_rows() {
        let csv = "Step,Follower_1_Error\n1,5.0\nnot-a-step,9.9\n3,6.0\n";
        let columns = read_error_series(csv.as_bytes()).unwrap();
        assert_eq!(columns[0].points, vec![[1.0, 5.0], [3.0, 6.0]]);
    }

    #[test]
    fn reader_rejects_a_foreign_header() {
        let csv = "time,altitude\n0.0,1.0\n";
        assert!(read_error_series(csv.as_bytes()).is_err());
    }

    #[test]
    fn empty_cells_become_gaps() {
        let csv = "Step,Follower_1_Error,Follower_2_Error\n1,,2.0\n2,1.5,\n";
        let columns = read_error_series(csv.as_bytes()).unwrap();
        assert_eq!(columns[0].points, vec![[2.0, 1.5]]);
        assert_eq!(columns[1].points, vec![[1.0, 2.0]]);
    }
}
