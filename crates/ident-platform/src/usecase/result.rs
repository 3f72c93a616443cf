//! Use Case Result Type
//!
//! Success is only constructed inside the crate: mutations obtain it from
//! `UnitOfWork::commit`, reads from their query use case.

use super::error::UseCaseError;

#[derive(Debug)]
#[must_use]
pub enum UseCaseResult<T> {
    Success(T),
    Failure(UseCaseError),
}

impl<T> UseCaseResult<T> {
    /// Any code may report a failure.
    pub fn failure(error: UseCaseError) -> Self {
        UseCaseResult::Failure(error)
    }

    pub(crate) fn success(value: T) -> Self {
        UseCaseResult::Success(value)
    }

    /// Lift a read path that used `?` internally.
    pub(crate) fn from_read(result: Result<T, UseCaseError>) -> Self {
        match result {
            Ok(value) => UseCaseResult::Success(value),
            Err(error) => UseCaseResult::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UseCaseResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UseCaseResult::Failure(_))
    }

    /// Panics with the error code on failure.
    pub fn unwrap(self) -> T {
        match self {
            UseCaseResult::Success(v) => v,
            UseCaseResult::Failure(e) => panic!("use case failed with {}: {}", e.code(), e.message()),
        }
    }

    /// Panics when the use case succeeded.
    pub fn unwrap_err(self) -> UseCaseError {
        match self {
            UseCaseResult::Success(_) => panic!("use case succeeded, expected a failure"),
            UseCaseResult::Failure(e) => e,
        }
    }

    pub fn map<U, F>(self, f: F) -> UseCaseResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            UseCaseResult::Success(v) => UseCaseResult::Success(f(v)),
            UseCaseResult::Failure(e) => UseCaseResult::Failure(e),
        }
    }

    pub fn error(&self) -> Option<&UseCaseError> {
        match self {
            UseCaseResult::Success(_) => None,
            UseCaseResult::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<T, UseCaseError> {
        self.into()
    }
}

impl<T> From<UseCaseResult<T>> for Result<T, UseCaseError> {
    fn from(result: UseCaseResult<T>) -> Self {
        match result {
            UseCaseResult::Success(v) => Ok(v),
            UseCaseResult::Failure(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_read() {
        let ok: UseCaseResult<u32> = UseCaseResult::from_read(Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let failed: UseCaseResult<u32> =
            UseCaseResult::from_read(Err(UseCaseError::domain_not_found("d-1")));
        assert_eq!(failed.error().map(|e| e.code()), Some("DOMAIN_NOT_FOUND"));
    }

    #[test]
    fn test_map_keeps_failure() {
        let result: UseCaseResult<i32> =
            UseCaseResult::failure(UseCaseError::validation("CODE", "message"));
        let mapped = result.map(|v| v * 2);
        assert!(mapped.is_failure());
        assert_eq!(mapped.unwrap_err().code(), "CODE");
    }
}
