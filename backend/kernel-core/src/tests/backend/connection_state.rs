// Unit tests for per-connection secret validation

use crate::backend::connection_state::ConnectionState;

use common::RedactedSecret;

/// **VALUE**: Verifies a wrong secret leaves the connection unauthenticated.
///
/// **WHY THIS MATTERS**: Any local process can reach the backend port. The secret is the
/// only thing stopping it from driving the backend.
///
/// **BUG THIS CATCHES**: Would catch `validate_secret` comparing prefixes or ignoring input.
#[test]
fn given_wrong_secret_when_validated_then_rejected() {
    // GIVEN: A connection expecting a secret
    let mut state = ConnectionState::new(Some(RedactedSecret::new("expected")));

    // WHEN: Presenting the wrong one
    let accepted = state.validate_secret("expecte");

    // THEN: Rejected and unauthenticated
    assert!(!accepted);
    assert!(!state.is_authenticated());
}

#[test]
fn given_correct_secret_when_validated_then_authenticated() {
    let mut state = ConnectionState::new(Some(RedactedSecret::new("expected")));

    assert!(state.validate_secret("expected"));
    assert!(state.is_authenticated());
}

/// **VALUE**: Verifies secrets-disabled backends accept any handshake.
///
/// **WHY THIS MATTERS**: Pre-2.4.3 SparkR clients send no secret at all.
///
/// **BUG THIS CATCHES**: Would catch `None` being treated as "reject everything".
#[test]
fn given_no_expected_secret_when_validated_then_accepted() {
    let mut state = ConnectionState::new(None);

    assert!(state.validate_secret(""));
    assert!(state.is_authenticated());
}
