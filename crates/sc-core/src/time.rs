use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub type EpochMillis = u64;

static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

pub fn now_epoch_millis() -> EpochMillis {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as EpochMillis
}

/// Wall-clock millis, bumped past the previously issued token so that two
/// calls in the same millisecond (or across a clock step back) still yield
/// strictly increasing values.
pub fn next_time_token() -> u64 {
    let now = now_epoch_millis();
    let mut last = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TOKEN.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_strictly_increase() {
        let mut previous = next_time_token();
        for _ in 0..1_000 {
            let token = next_time_token();
            assert!(token > previous);
            previous = token;
        }
    }

    #[test]
    fn tokens_track_wall_clock() {
        let before = now_epoch_millis();
        assert!(next_time_token() >= before);
    }
}
