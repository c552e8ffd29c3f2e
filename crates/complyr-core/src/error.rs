use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_keep_their_message() {
        let err: CoreError = anyhow::anyhow!("subscription database unreachable").into();
        assert!(matches!(err, CoreError::Store(_)));
        assert_eq!(err.to_string(), "store error: subscription database unreachable");
    }
}
