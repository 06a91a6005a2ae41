use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid value for parameter '{param}': {value}")]
    InvalidParameterFormat { param: String, value: String },

    #[error("Malformed list for parameter '{param}'")]
    MalformedList { param: String },

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

impl QueryError {
    pub fn invalid_format(param: impl Into<String>, value: impl Into<String>) -> Self {
        QueryError::InvalidParameterFormat { param: param.into(), value: value.into() }
    }

    pub fn malformed_list(param: impl Into<String>) -> Self {
        QueryError::MalformedList { param: param.into() }
    }
}
