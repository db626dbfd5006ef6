use crate::error::CommonError;

/// Result type for resource lookups and other shared operations
pub type CommonResult<T> = Result<T, CommonError>;
