//! Provenance tracking for extracted records

use std::fmt;

/// An extraction stage that can contribute to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Pattern rules ran over document text
    PrintedRegex,
    /// No document text was available for the pattern rules
    NoTextForRegex,
    /// Digit recognition over the top-right corner replaced the acta number
    HandwrittenRoi,
    /// The vision model corrected one or more fields
    VisionAi,
    /// The text model filled one or more gaps
    TextAiComplement,
}

impl Stage {
    /// Label written to logs and the provenance trail
    pub fn label(&self) -> &'static str {
        match self {
            Stage::PrintedRegex => "PrintedRegex",
            Stage::NoTextForRegex => "NoTextForRegex",
            Stage::HandwrittenRoi => "HandwrittenROI",
            Stage::VisionAi => "VisionAI",
            Stage::TextAiComplement => "TextAIComplement",
        }
    }
}

/// Accumulating audit trail of the stages that shaped a record.
///
/// The trail starts with a base stage (text or no text) and appends each
/// later stage at most once, in the order it altered the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    stages: Vec<Stage>,
}

impl Provenance {
    /// Start a trail from its base stage
    pub fn starting_with(base: Stage) -> Self {
        Self { stages: vec![base] }
    }

    /// Base trail for a document with or without usable text
    pub fn for_text(has_text: bool) -> Self {
        if has_text {
            Self::starting_with(Stage::PrintedRegex)
        } else {
            Self::starting_with(Stage::NoTextForRegex)
        }
    }

    /// Record that `stage` altered the record
    pub fn push(&mut self, stage: Stage) {
        if !self.stages.contains(&stage) {
            self.stages.push(stage);
        }
    }

    /// Whether `stage` appears in the trail
    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Stages in the order they were recorded
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.stages.iter().map(Stage::label).collect();
        f.write_str(&labels.join("+"))
    }
}
