//! Lexical/syntactic analysis state.

use crate::api::{AnalyzeResponse, LexicalAnalysis, SyntacticAnalysis};
use crate::error::ConsoleError;

/// The one live analysis shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// Sections returned by the service. Either may be absent.
    Report {
        lexical: Option<LexicalAnalysis>,
        syntactic: Option<SyntacticAnalysis>,
    },
    /// The request failed or the service answered with an error.
    Failure { message: String },
}

impl AnalysisResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl From<AnalyzeResponse> for AnalysisResult {
    fn from(response: AnalyzeResponse) -> Self {
        match response {
            AnalyzeResponse {
                lexical: None,
                syntactic: None,
                error: Some(message),
            } => Self::Failure { message },
            AnalyzeResponse {
                lexical, syntactic, ..
            } => Self::Report { lexical, syntactic },
        }
    }
}

/// Holds the current analysis and counts outstanding analyze requests.
#[derive(Debug, Default)]
pub struct AnalysisInvoker {
    result: Option<AnalysisResult>,
    pending: usize,
}

impl AnalysisInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// True while at least one analyze request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Decides whether `text` should be analyzed.
    ///
    /// Returns the exact text to send, or `None` for a blank buffer.
    pub fn begin(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        self.pending += 1;
        Some(text.to_string())
    }

    /// Applies the outcome of an analyze request, replacing the prior result.
    pub fn complete(&mut self, outcome: std::result::Result<AnalyzeResponse, ConsoleError>) {
        self.pending = self.pending.saturating_sub(1);
        self.result = Some(match outcome {
            Ok(response) => response.into(),
            Err(e) => AnalysisResult::failure(e.detail()),
        });
    }

    /// Replaces the result directly (analysis embedded in an execute response).
    pub fn set(&mut self, result: AnalysisResult) {
        self.result = Some(result);
    }

    pub fn clear(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_not_sent() {
        let mut invoker = AnalysisInvoker::new();
        assert_eq!(invoker.begin("   \n"), None);
        assert!(!invoker.is_pending());
    }

    #[test]
    fn exact_text_is_sent() {
        let mut invoker = AnalysisInvoker::new();
        assert_eq!(invoker.begin("  USE shop;\n").as_deref(), Some("  USE shop;\n"));
        assert!(invoker.is_pending());
    }

    #[test]
    fn transport_failure_becomes_failure_block() {
        let mut invoker = AnalysisInvoker::new();
        invoker.begin("SELECT 1;");
        invoker.complete(Err(ConsoleError::transport("connection refused")));
        assert_eq!(
            invoker.result(),
            Some(&AnalysisResult::failure("connection refused"))
        );
        assert!(!invoker.is_pending());
    }

    #[test]
    fn error_body_becomes_failure() {
        let response = AnalyzeResponse {
            error: Some("No command provided".to_string()),
            ..AnalyzeResponse::default()
        };
        assert_eq!(
            AnalysisResult::from(response),
            AnalysisResult::failure("No command provided")
        );
    }

    #[test]
    fn partial_report_is_kept() {
        let response = AnalyzeResponse {
            syntactic: Some(SyntacticAnalysis {
                valid: true,
                message: "Valid syntax".to_string(),
                statement_type: None,
            }),
            ..AnalyzeResponse::default()
        };
        match AnalysisResult::from(response) {
            AnalysisResult::Report { lexical, syntactic } => {
                assert!(lexical.is_none());
                assert!(syntactic.unwrap().valid);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_result_replaces_old() {
        let mut invoker = AnalysisInvoker::new();
        invoker.set(AnalysisResult::failure("old"));
        invoker.complete(Ok(AnalyzeResponse::default()));
        assert!(!invoker.result().unwrap().is_failure());
    }
}
