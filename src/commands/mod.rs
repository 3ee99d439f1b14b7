/*!
 * Driver commands
 *
 * Each command is a single forward sequence: the first failing step aborts
 * the rest and its error is returned to the caller.
 */

mod reset_password;
mod roundtrip;

pub use reset_password::run_reset_password;
pub use roundtrip::{run_roundtrip, RoundTripReport};
