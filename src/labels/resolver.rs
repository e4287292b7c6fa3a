use anyhow::{anyhow, Result};

use crate::record::{ResolvedTruthRecord, TruthRecord, NO_BLOCK};

/// What to do with a truth label outside the known vocabulary, or a missing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLabelPolicy {
    /// Treat the row as normal (label 0)
    #[default]
    DefaultNormal,
    /// Treat the row as anomalous (label 1)
    DefaultAnomaly,
    /// Abort the labeling run
    FailFast,
}

/// A raw truth label sorted into the known vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLabel<'a> {
    Normal,
    Anomaly,
    Missing,
    Unrecognized(&'a str),
}

impl<'a> RawLabel<'a> {
    /// `Normal`/`normal`/`0` and `Anomaly`/`anomaly`/`1`; numeric forms such as
    /// `1.0` or ` 1` count as their integer value. Words must match exactly.
    /// Anything else is unrecognized.
    pub fn classify(raw: Option<&'a str>) -> Self {
        let value = match raw {
            None => return RawLabel::Missing,
            Some(value) if value.is_empty() => return RawLabel::Missing,
            Some(value) => value,
        };

        match value {
            "Normal" | "normal" => RawLabel::Normal,
            "Anomaly" | "anomaly" => RawLabel::Anomaly,
            _ => match value.trim().parse::<f64>() {
                Ok(n) if n == 0.0 => RawLabel::Normal,
                Ok(n) if n == 1.0 => RawLabel::Anomaly,
                _ => RawLabel::Unrecognized(value),
            },
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RawLabel::Normal | RawLabel::Anomaly)
    }
}

/// Normalizes truth rows: 0/1 labels and non-empty block ids
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver {
    policy: UnknownLabelPolicy,
}

impl LabelResolver {
    pub fn new(policy: UnknownLabelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownLabelPolicy {
        self.policy
    }

    /// Map a raw label to 0 or 1; only `FailFast` can fail
    pub fn resolve_label(&self, raw: Option<&str>) -> Result<u8> {
        match RawLabel::classify(raw) {
            RawLabel::Normal => Ok(0),
            RawLabel::Anomaly => Ok(1),
            other => match self.policy {
                UnknownLabelPolicy::DefaultNormal => Ok(0),
                UnknownLabelPolicy::DefaultAnomaly => Ok(1),
                UnknownLabelPolicy::FailFast => match other {
                    RawLabel::Unrecognized(value) => {
                        Err(anyhow!("Unrecognized truth label '{}'", value))
                    }
                    _ => Err(anyhow!("Missing truth label")),
                },
            },
        }
    }

    pub fn resolve_block_id(raw: Option<&str>) -> String {
        match raw {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => NO_BLOCK.to_string(),
        }
    }

    pub fn resolve(&self, record: &TruthRecord) -> Result<ResolvedTruthRecord> {
        let block_id = Self::resolve_block_id(record.block_id.as_deref());
        let label = self.resolve_label(record.label.as_deref()).map_err(|e| {
            anyhow!("{} for block '{}'", e, block_id)
        })?;
        Ok(ResolvedTruthRecord { block_id, label })
    }

    /// Resolve a whole truth table, counting labels that needed the policy
    pub fn resolve_all<'a, I>(&self, records: I) -> Result<ResolvedTruth>
    where
        I: IntoIterator<Item = &'a TruthRecord>,
    {
        let mut resolved = ResolvedTruth::default();
        for (row, record) in records.into_iter().enumerate() {
            if !RawLabel::classify(record.label.as_deref()).is_known() {
                resolved.unknown_labels += 1;
            }
            let record = self
                .resolve(record)
                .map_err(|e| anyhow!("Truth table row {}: {}", row + 1, e))?;
            resolved.records.push(record);
        }
        Ok(resolved)
    }
}

/// Output of [`LabelResolver::resolve_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTruth {
    pub records: Vec<ResolvedTruthRecord>,
    pub unknown_labels: u64,
}

impl From<&ResolvedTruthRecord> for TruthRecord {
    fn from(record: &ResolvedTruthRecord) -> Self {
        TruthRecord {
            block_id: Some(record.block_id.clone()),
            label: Some(record.label.to_string()),
        }
    }
}
