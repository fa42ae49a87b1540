use thiserror::Error;

#[derive(Debug, Error)]
pub enum DmmfError {
    #[error("Could not find {kind} `{name}` in the DMMF")]
    NotFound { kind: &'static str, name: String },

    #[error("The DMMF does not declare a `{0}` root type")]
    MissingRootType(&'static str),

    #[error("Invalid DMMF: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl DmmfError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        DmmfError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
