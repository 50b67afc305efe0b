use anyhow::{Result, bail};

/// A stage the exporter can compute and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportStage {
    Primary,
    Secondary,
    Joint,
}

impl ExportStage {
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Joint];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Primary => "primary-levels.tsv",
            Self::Secondary => "secondary-levels.tsv",
            Self::Joint => "joint-levels.tsv",
        }
    }
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse `primary,secondary,joint` (or `all`) into a sorted, deduplicated stage list.
pub fn parse_stages(arg: &str) -> Result<Vec<ExportStage>> {
    let mut stages = Vec::new();
    for token in split_csv(arg) {
        match token.to_ascii_lowercase().as_str() {
            "all" => stages.extend(ExportStage::ALL),
            "primary" => stages.push(ExportStage::Primary),
            "secondary" => stages.push(ExportStage::Secondary),
            "joint" => stages.push(ExportStage::Joint),
            other => bail!("unknown stage '{other}' (expected primary, secondary, joint or all)"),
        }
    }
    if stages.is_empty() {
        bail!("no stages selected");
    }
    stages.sort_unstable();
    stages.dedup();
    Ok(stages)
}
