use proptest::prelude::*;

/// Tokens that should always be accepted: non-empty, no surrounding whitespace
pub fn valid_token_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_:.-]{0,40}"
}

/// Tokens that must always be rejected: empty or whitespace only
pub fn blank_token_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

/// Pairs of distinct valid tokens
pub fn distinct_token_pair_strategy() -> impl Strategy<Value = (String, String)> {
    (valid_token_strategy(), valid_token_strategy()).prop_filter("tokens must differ", |(a, b)| a != b)
}
