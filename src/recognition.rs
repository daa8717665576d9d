//! Stone recognition boundary
//!
//! The camera and the classifier live outside this crate; what arrives here
//! is a stream of samples (a class label with a confidence, or nothing).
//! Single frames are noisy, so a detection only confirms after a run of
//! consecutive agreeing samples above the confidence floor. Anything else
//! resets the run and clears the current detection.

use crate::stones::StoneKind;

/// One classifier output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Recognized kind, or `None` for the model's no-stone class and
    /// unknown labels
    pub kind: Option<StoneKind>,
    pub confidence: f32,
}

impl Sample {
    pub fn none() -> Self {
        Self {
            kind: None,
            confidence: 0.0,
        }
    }

    /// Build a sample straight from a classifier label
    pub fn from_label(label: &str, confidence: f32) -> Self {
        Self {
            kind: StoneKind::from_label(label),
            confidence,
        }
    }
}

/// Stability filter over the classifier stream
pub struct RecognitionFilter {
    confidence_threshold: f32,
    stability_count: u32,
    candidate: Option<StoneKind>,
    run: u32,
    detected: Option<StoneKind>,
    confidence: f32,
    /// Classifier reported itself broken (model failed to load). Distinct
    /// from "searching": the screen shows a persistent message instead of
    /// the scanning prompt.
    failed: bool,
}

impl RecognitionFilter {
    pub fn new(confidence_threshold: f32, stability_count: u32) -> Self {
        Self {
            confidence_threshold,
            stability_count,
            candidate: None,
            run: 0,
            detected: None,
            confidence: 0.0,
            failed: false,
        }
    }

    /// Currently confirmed detection, if any
    pub fn detected(&self) -> Option<StoneKind> {
        self.detected
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Mark the classifier as unavailable. The (out-of-scope) collaborator
    /// retries loading; a later healthy sample clears the flag.
    pub fn mark_failed(&mut self) {
        self.failed = true;
        self.reset();
    }

    /// Feed one sample. Returns a newly confirmed detection, once per
    /// confirmation.
    pub fn observe(&mut self, sample: Sample) -> Option<StoneKind> {
        self.failed = false;
        let qualifying = match sample.kind {
            Some(_) => sample.confidence >= self.confidence_threshold,
            None => false,
        };
        if !qualifying {
            self.reset();
            return None;
        }

        let kind = sample.kind;
        if self.candidate == kind {
            self.run += 1;
        } else {
            self.candidate = kind;
            self.run = 1;
        }

        if self.run >= self.stability_count && self.detected != kind {
            self.detected = kind;
            self.confidence = sample.confidence;
            log::debug!("stone confirmed: {:?} ({:.2})", kind, sample.confidence);
            return kind;
        }
        if self.detected == kind {
            self.confidence = sample.confidence;
        }
        None
    }

    fn reset(&mut self) {
        self.candidate = None;
        self.run = 0;
        self.detected = None;
        self.confidence = 0.0;
    }
}
