//! Tab-separated table writers.
//!
//! Every table row starts with its one-based draw count followed by one
//! `\t`-prefixed cell per column. Cells past a column's span stay empty so
//! each row keeps the same number of separators.

use std::io::{self, Write};

use pullcalc_engine::constants::TABLE_FRACTION_DIGITS;
use pullcalc_engine::{JointDistributions, LevelDistributions, Pmf, ResourceTables, to_fixed};

fn write_rows<W: Write>(out: &mut W, columns: &[&Pmf], rows: usize) -> io::Result<()> {
    for row in 0..rows {
        write!(out, "{}", row + 1)?;
        for column in columns {
            match column.get(row) {
                Some(value) => write!(out, "\t{}", to_fixed(value, TABLE_FRACTION_DIGITS))?,
                None => write!(out, "\t")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One column per copy level, `max_span` rows.
pub fn write_level_table<W: Write>(out: &mut W, levels: &LevelDistributions) -> io::Result<()> {
    let columns: Vec<&Pmf> = levels.iter().collect();
    write_rows(out, &columns, levels.max_span())
}

/// One column per `(primary, secondary)` level pair, primary-major.
pub fn write_joint_table<W: Write>(out: &mut W, joint: &JointDistributions) -> io::Result<()> {
    let mut columns = Vec::with_capacity(joint.primary_levels() * joint.secondary_levels());
    for a in 0..joint.primary_levels() {
        for b in 0..joint.secondary_levels() {
            if let Some(cell) = joint.get(a, b) {
                columns.push(cell);
            }
        }
    }
    write_rows(out, &columns, joint.max_span())
}

/// Hazard sequence, three blank lines, then the first-occurrence distribution.
pub fn write_debug_table<W: Write>(out: &mut W, tables: &ResourceTables) -> io::Result<()> {
    for (index, hazard) in tables.hazards().iter().enumerate() {
        writeln!(out, "{index}\t{}", to_fixed(hazard, TABLE_FRACTION_DIGITS))?;
    }
    write!(out, "\n\n\n")?;
    for (index, value) in tables.occurrence().iter().enumerate() {
        writeln!(out, "{index}\t{}", to_fixed(value, TABLE_FRACTION_DIGITS))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullcalc_engine::numbers::decimal;
    use pullcalc_engine::{
        EngineConfig, PitySchedule, Precision, PullEngine, ResourceConfig, SelectionRule,
    };

    fn coin_levels(count: usize) -> LevelDistributions {
        let coin = Pmf::from_values(vec![decimal(5, 1), decimal(5, 1)]);
        LevelDistributions::accumulate(&coin, count, 2, Precision::new(30)).unwrap()
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn level_table_blanks_cells_past_span() {
        let levels = coin_levels(2);
        let text = render(|out| write_level_table(out, &levels));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "1\t0.500000000000000000000000\t0.000000000000000000000000"
        );
        assert_eq!(lines[0].split('\t').count(), 3);
        assert!(lines[2].starts_with("3\t\t"));
        assert!(lines[3].ends_with("\t0.250000000000000000000000"));
    }

    #[test]
    fn joint_table_has_one_column_per_pair() {
        let primary = coin_levels(2);
        let secondary = coin_levels(1);
        let joint =
            JointDistributions::accumulate(&primary, &secondary, Precision::new(30)).unwrap();
        let text = render(|out| write_joint_table(out, &joint));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), joint.max_span());
        assert!(lines.iter().all(|line| line.split('\t').count() == 3));
        // Pair (0, 0) spans four draws, pair (1, 0) spans six.
        assert!(lines[4].starts_with("5\t\t"));
        assert!(!lines[4].ends_with('\t'));
    }

    fn tiny_engine() -> PullEngine {
        PullEngine::new(EngineConfig {
            precision: Precision::new(40),
            primary: ResourceConfig {
                label: "alpha".to_string(),
                schedule: PitySchedule::soft_pity(5, decimal(2, 1), 2, decimal(3, 1)),
                selection: SelectionRule::FiftyFifty,
                levels: 3,
            },
            secondary: ResourceConfig {
                label: "beta".to_string(),
                schedule: PitySchedule::soft_pity(4, decimal(25, 2), 1, decimal(25, 2)),
                selection: SelectionRule::fate_point_preset(),
                levels: 2,
            },
        })
        .unwrap()
    }

    #[test]
    fn repeated_joint_export_is_byte_identical() {
        let mut engine = tiny_engine();
        let mut first = Vec::new();
        write_joint_table(&mut first, engine.compute_joint().unwrap()).unwrap();
        let mut second = Vec::new();
        write_joint_table(&mut second, engine.compute_joint().unwrap()).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn debug_table_separates_sections() {
        let config = ResourceConfig {
            label: "tiny".to_string(),
            schedule: PitySchedule::soft_pity(3, decimal(5, 1), 1, decimal(25, 2)),
            selection: SelectionRule::FiftyFifty,
            levels: 1,
        };
        let tables = ResourceTables::compute(&config, Precision::new(30)).unwrap();
        let text = render(|out| write_debug_table(out, &tables));
        let (hazards, occurrence) = text.split_once("\n\n\n\n").unwrap();
        assert_eq!(hazards.lines().count(), 3);
        assert_eq!(hazards.lines().next(), Some("0\t0.500000000000000000000000"));
        assert_eq!(occurrence.lines().count(), 3);
        assert!(occurrence.starts_with("0\t0.5"));
        assert!(occurrence.ends_with('\n'));
    }
}
