// Question identifier generation.

use uuid::Uuid;

/// Fresh question identifier: a random 128-bit UUID in hyphenated form.
pub fn question_id() -> String {
    Uuid::new_v4().to_string()
}
