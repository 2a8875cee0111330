/*!

Channel-based diagnostic logging with global control over verbosity. Messages are tagged
with the channel they belong to so that, say, the rewrite loop can be traced without
drowning in solver chatter.

*/

use std::sync::atomic::{AtomicI32, Ordering};

use strum_macros::{Display, IntoStaticStr};
use yansi::Paint;

/// The subsystem a diagnostic message belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, IntoStaticStr)]
pub enum Channel {
  Debug,
  Match,
  Rewrite,
}

static VERBOSITY: AtomicI32 = AtomicI32::new(0);

pub fn set_verbosity(new_value: i32) {
  VERBOSITY.store(new_value, Ordering::Relaxed);
}

pub fn verbosity() -> i32 {
  VERBOSITY.load(Ordering::Relaxed)
}

/// Only emits the message if the verbosity level is at least `level`.
pub fn log(channel: Channel, level: i32, message: &str) {
  if verbosity() >= level {
    let tag = match channel {
      Channel::Debug   => Paint::yellow("Debug"),
      Channel::Match   => Paint::cyan("Match"),
      Channel::Rewrite => Paint::green("Rewrite"),
    };
    println!("[{}] {}", tag, message);
  }
}
