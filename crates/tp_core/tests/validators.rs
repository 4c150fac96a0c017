//! Property tests for field validators.

use tp_core::common::{abs_diff_eq, parse_id, parse_time, IdPrefix, TimeOpts};
use tp_test_utils::proptest::prelude::*;
use tp_test_utils::strategies::{arb_bad_var_id, arb_time_literal, arb_var_id};

proptest! {
    #[test]
    fn test_time_literal_seconds((raw, seconds) in arb_time_literal()) {
        let parsed = parse_time(&raw, "t", TimeOpts::at_least(0.0)).unwrap();
        prop_assert!(abs_diff_eq(parsed, seconds), "{raw} parsed as {parsed}, expected {seconds}");
    }

    #[test]
    fn test_var_id_accepted(id in arb_var_id()) {
        prop_assert_eq!(parse_id(&id, IdPrefix::Var, "v").unwrap(), id);
    }

    #[test]
    fn test_bad_var_id_rejected(id in arb_bad_var_id()) {
        prop_assert!(parse_id(&id, IdPrefix::Var, "v").is_err());
    }
}
