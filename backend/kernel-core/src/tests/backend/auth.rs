// Unit tests for the SparkR authentication string format

use crate::backend::auth::{MAX_AUTH_STRING_LEN, read_string, write_string};
use crate::error::frame::FrameError;

/// **VALUE**: Pins the exact bytes SparkR's `writeString` puts on the wire.
///
/// **WHY THIS MATTERS**: `SparkR:::connectBackend` reads the backend's reply with
/// `readString`; anything other than length-with-NUL, bytes, NUL fails the kernel's
/// connect with "Unexpected reply from server".
///
/// **BUG THIS CATCHES**: Would catch dropping the NUL terminator or not counting it
/// in the length.
#[tokio::test]
async fn given_ok_reply_when_written_then_matches_sparkr_layout() {
    // GIVEN
    let mut wire: Vec<u8> = Vec::new();

    // WHEN
    write_string(&mut wire, "ok").await.unwrap();

    // THEN: i32 BE length 3, "ok", NUL
    assert_eq!(wire, vec![0, 0, 0, 3, b'o', b'k', 0]);
}

/// **VALUE**: Verifies a secret written the way SparkR writes it reads back without the NUL.
///
/// **BUG THIS CATCHES**: Would catch the terminator being kept, which makes every real
/// kernel's secret compare unequal.
#[tokio::test]
async fn given_sparkr_encoded_secret_when_read_then_terminator_stripped() {
    let secret = "0123456789abcdef";
    let mut wire = ((secret.len() + 1) as i32).to_be_bytes().to_vec();
    wire.extend_from_slice(secret.as_bytes());
    wire.push(0);

    let read = read_string(&mut wire.as_slice(), MAX_AUTH_STRING_LEN)
        .await
        .unwrap();

    assert_eq!(read, secret);
}

/// **VALUE**: Verifies an unauthenticated peer cannot make the backend allocate large buffers.
///
/// **BUG THIS CATCHES**: Would catch the length check moving after the allocation.
#[tokio::test]
async fn given_length_above_cap_when_read_then_too_large() {
    let wire = ((MAX_AUTH_STRING_LEN + 1) as i32).to_be_bytes();

    let result = read_string(&mut &wire[..], MAX_AUTH_STRING_LEN).await;

    assert!(matches!(result, Err(FrameError::TooLarge { .. })));
}

#[tokio::test]
async fn given_negative_length_when_read_then_malformed() {
    let wire = (-5i32).to_be_bytes();

    let result = read_string(&mut &wire[..], MAX_AUTH_STRING_LEN).await;

    assert!(matches!(result, Err(FrameError::Malformed { .. })));
}
