use proptest::prelude::*;

/// Positive step counts, small enough to enumerate every index
pub fn step_count_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![1u64..=64, 65u64..=10_000, Just(1_000_000u64)]
}

/// Worker counts, including groups larger than the step count
pub fn worker_count_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), 2usize..=16, 17usize..=256]
}

/// Step counts the configuration layer must reject
pub fn non_positive_steps_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), i64::MIN..0]
}
