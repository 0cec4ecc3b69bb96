use crate::request::OperationRequest;
use crate::syntax::{ParseError, ParseState};
use std::time::Duration;

/// Outcome of [`super::probe_line`]: how far parsing got, and why it stopped
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub state: ParseState,
    pub error: Option<ParseError>,
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A line taken all the way to its request document
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub state: ParseState,
    pub request: OperationRequest,
    pub event_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::REQUEST_BUILT,
            "Operation request built",
            "operation" => self.request.operation(),
            "address" => self.request.address(),
            "arguments" => self.request.arguments().len(),
            "events" => self.event_count,
            "duration_us" => self.processing_duration.as_micros()
        );
    }
}
