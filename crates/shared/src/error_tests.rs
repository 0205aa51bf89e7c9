use rstest::rstest;

use crate::error::AppError;

#[rstest]
#[case(AppError::Unauthorized("x".into()), 401, "UNAUTHORIZED")]
#[case(AppError::Forbidden("x".into()), 403, "FORBIDDEN")]
#[case(AppError::NotFound("x".into()), 404, "NOT_FOUND")]
#[case(AppError::Validation("x".into()), 400, "VALIDATION_ERROR")]
#[case(AppError::BusinessRule("x".into()), 422, "BUSINESS_RULE_VIOLATION")]
#[case(AppError::Conflict("x".into()), 409, "CONFLICT")]
#[case(AppError::Database("x".into()), 500, "DATABASE_ERROR")]
#[case(AppError::Internal("x".into()), 500, "INTERNAL_ERROR")]
fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
    assert_eq!(err.is_server_error(), status >= 500);
}

#[test]
fn test_business_rule_message_is_passed_through() {
    let err = AppError::BusinessRule("Only draft entries can be posted".into());
    assert_eq!(err.to_string(), "Only draft entries can be posted");
}

#[test]
fn test_not_found_helper() {
    let err = AppError::not_found("Invoice", "abc");
    assert_eq!(err.to_string(), "Not found: Invoice abc");
}
