//! Identifiers for records created on the local store.

use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_DIGITS: usize = 12;

/// Base-36 millisecond timestamp followed by twelve random base-36 digits.
///
/// Ids sort roughly by creation time and are collision-resistant within a
/// single store; they are not UUIDs.
pub fn generate_id() -> String {
    let millis = u128::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    let mut id = to_base36(millis);
    let mut entropy = Uuid::new_v4().as_u128();
    for _ in 0..RANDOM_DIGITS {
        id.push(ALPHABET[(entropy % 36) as usize] as char);
        entropy /= 36;
    }
    id
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    digits.iter().rev().collect()
}
