//! Error types shared across the pipeline stages.

/// Problems with the run configuration, always fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An MOI label outside of the closed set of simplified MOIs.
    #[error("MOI label {0:?} is not addressed by any inheritance test")]
    UnmappedMoi(String),
    /// No inheritance runner has been set up for the given MOI.
    #[error("no inheritance runner was set up for MOI {0}")]
    MissingRunner(String),
    /// Other inconsistencies in the configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Inconsistencies in the input data, logged and skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("gene {gene} of variant {variant} is not on the panel")]
    GeneNotInPanel { gene: String, variant: String },
    #[error("sample {sample} has both het. and hom. call at variant {variant}")]
    ConflictingZygosity { sample: String, variant: String },
    #[error("sample {sample} of variant {variant} is not in the pedigree")]
    UnknownSample { sample: String, variant: String },
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn config_error_names_label() {
        let err = super::ConfigError::UnmappedMoi("Mitochondrial".into());
        assert_eq!(
            err.to_string(),
            "MOI label \"Mitochondrial\" is not addressed by any inheritance test"
        );
    }

    #[test]
    fn data_error_names_gene() {
        let err = super::DataError::GeneNotInPanel {
            gene: "ENSG00000123".into(),
            variant: "1-10-A-G".into(),
        };
        assert_eq!(
            err.to_string(),
            "gene ENSG00000123 of variant 1-10-A-G is not on the panel"
        );
    }
}
