#[derive(Debug, thiserror::Error)]
pub enum AxisError {
    #[error("Something went wrong with axis scaling: axis {id} has m={m}, b={b}, length={length}")]
    NonFiniteScale {
        id: String,
        m: f64,
        b: f64,
        length: f64,
    },

    #[error("Invalid axis id or name: `{0}`")]
    InvalidAxisId(String),

    #[error("Invalid dtick: `{0}`")]
    InvalidDtick(String),

    #[error("Invalid tick format `{format}`: {reason}")]
    InvalidTickFormat { format: String, reason: String },

    #[error("Unsupported calendar: `{0}`")]
    UnsupportedCalendar(String),

    #[error("Invalid layout attribute `{attr}`: {reason}")]
    InvalidLayout { attr: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AxisError {
    pub fn invalid_layout(attr: impl Into<String>, reason: impl Into<String>) -> Self {
        AxisError::InvalidLayout {
            attr: attr.into(),
            reason: reason.into(),
        }
    }
}
