#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("invalid pattern {pattern:?}: {detail}")]
    InvalidPatternSyntax { pattern: String, detail: String },
    #[error("unsupported wildcard range in {pattern:?}: {detail}")]
    UnsupportedRange { pattern: String, detail: String },
    #[error("unsupported IP version {0}, expected 4 or 6")]
    UnsupportedIpVersion(u8),
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
