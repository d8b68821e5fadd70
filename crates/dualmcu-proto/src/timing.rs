//! Millisecond <-> node-internal (1/128 s) time conversion (§6.4).
//!
//! The node's clock runs in 1/128 s ticks; `travel_time` and
//! `buffering_delay` are carried in that unit on the wire
//! (`payloads::dsap::DataRxInd`/`BufferingDelay`). Every public API that
//! accepts or reports one of these quantities does so in milliseconds
//! instead, converting at the boundary with the two functions below.
//!
//! Grounded in `util.h`'s `internal_time_to_ms`/`ms_to_internal_time`: full
//! precision below a threshold, a division-first fallback above it so the
//! multiply can never overflow `u32`.

/// Largest internal time for which `internal_time * 1000` fits in a `u32`.
const MAX_INTERNAL_TIME_FOR_FULL_PRECISION: u32 = u32::MAX / 1000;

/// Largest millisecond time for which `time_in_ms << 7` fits in a `u32`.
const MAX_MS_TIME_FOR_FULL_PRECISION: u32 = u32::MAX / 128;

/// Converts a node-internal time (1/128 s ticks) to milliseconds.
///
/// Below [`MAX_INTERNAL_TIME_FOR_FULL_PRECISION`] the conversion is exact;
/// above it, the division by 128 happens first, losing sub-128-tick
/// precision in exchange for never overflowing.
#[must_use]
pub fn internal_time_to_ms(internal_time: u32) -> u32 {
    if internal_time < MAX_INTERNAL_TIME_FOR_FULL_PRECISION {
        (internal_time * 1000) >> 7
    } else {
        (internal_time >> 7) * 1000
    }
}

/// Converts a time in milliseconds to a node-internal time (1/128 s ticks).
///
/// Below [`MAX_MS_TIME_FOR_FULL_PRECISION`] the conversion is exact; above
/// it, the division by 1000 happens first, losing sub-millisecond
/// precision in exchange for never overflowing.
#[must_use]
pub fn ms_to_internal_time(time_in_ms: u32) -> u32 {
    if time_in_ms < MAX_MS_TIME_FOR_FULL_PRECISION {
        (time_in_ms << 7) / 1000
    } else {
        (time_in_ms / 1000) >> 7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_one_second() {
        assert_eq!(internal_time_to_ms(128), 1000);
        assert_eq!(ms_to_internal_time(1000), 128);
    }

    #[test]
    fn zero_round_trips() {
        assert_eq!(internal_time_to_ms(0), 0);
        assert_eq!(ms_to_internal_time(0), 0);
    }

    #[test]
    fn thresholds_match_the_original() {
        assert_eq!(MAX_INTERNAL_TIME_FOR_FULL_PRECISION, u32::MAX / 1000);
        assert_eq!(MAX_MS_TIME_FOR_FULL_PRECISION, u32::MAX / 128);
    }

    #[test]
    fn degrades_instead_of_overflowing_above_the_threshold() {
        let big_internal = MAX_INTERNAL_TIME_FOR_FULL_PRECISION + 1;
        assert_eq!(internal_time_to_ms(big_internal), (big_internal >> 7) * 1000);

        let big_ms = MAX_MS_TIME_FOR_FULL_PRECISION + 1;
        assert_eq!(ms_to_internal_time(big_ms), (big_ms / 1000) >> 7);
    }
}
