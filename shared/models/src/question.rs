use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Properties;

/// Natural-language question (`POST /api/graph/question`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: Option<String>,
}

/// Stages of the question pipeline, used to say which one failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Question to formal query
    Translate,
    /// Formal query against the graph store
    Execute,
    /// Raw result back to natural language
    Verbalize,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::Execute => write!(f, "execute"),
            Self::Verbalize => write!(f, "verbalize"),
        }
    }
}

/// Outcome of one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub formal_query: String,
    pub raw_result: Vec<Properties>,
    pub answer: String,
    /// Set when a text-generation stage failed and `answer` carries the failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<PipelineStage>,
}
