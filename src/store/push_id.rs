use chrono::Utc;
use std::sync::Mutex;

use super::StoreError;

/// Lexicographically ordered alphabet: ids compare the same way as their timestamps
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIMESTAMP_LEN: usize = 8;
const RANDOM_LEN: usize = 12;

#[derive(Debug, Default)]
struct PushState {
    last_millis: Option<i64>,
    last_random: [u8; RANDOM_LEN],
}

/// Generates 20-character push ids: 8 timestamp chars followed by 12 random chars.
///
/// Ids issued within the same millisecond (or while the clock runs backwards)
/// reuse the previous random tail incremented by one, so every id sorts after
/// the one issued before it.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    state: Mutex<PushState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> Result<String, StoreError> {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&self, now_millis: i64) -> Result<String, StoreError> {
        if now_millis < 0 {
            return Err(StoreError::IdGeneration(format!(
                "timestamp {} predates the epoch",
                now_millis
            )));
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::IdGeneration("push id state poisoned".to_string()))?;

        let last_millis = state.last_millis;
        let millis = match last_millis {
            Some(last) if now_millis <= last => {
                increment(&mut state.last_random)?;
                last
            }
            _ => {
                for slot in state.last_random.iter_mut() {
                    *slot = rand::random_range(0..64u8);
                }
                now_millis
            }
        };
        state.last_millis = Some(millis);

        let mut id = String::with_capacity(TIMESTAMP_LEN + RANDOM_LEN);
        let mut timestamp = [0u8; TIMESTAMP_LEN];
        let mut remaining = millis;
        for slot in timestamp.iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }
        id.extend(timestamp.iter().map(|&c| c as char));
        id.extend(
            state
                .last_random
                .iter()
                .map(|&index| PUSH_CHARS[index as usize] as char),
        );

        Ok(id)
    }
}

fn increment(random: &mut [u8; RANDOM_LEN]) -> Result<(), StoreError> {
    for slot in random.iter_mut().rev() {
        if *slot < 63 {
            *slot += 1;
            return Ok(());
        }
        *slot = 0;
    }
    Err(StoreError::IdGeneration(
        "push id space exhausted for this millisecond".to_string(),
    ))
}
