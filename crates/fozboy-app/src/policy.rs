use fozboy_config::{InputConfig, InputPolicyKind};
use fozboy_core::input::{InputPolicy, ReleaseTimer};

/// Turn the configured policy into the one the input machine runs.
///
/// `auto` trusts release events only when the terminal accepted the
/// keyboard enhancement flags.
pub fn resolve(config: &InputConfig, keyboard_enhanced: bool) -> InputPolicy {
    let timer = ReleaseTimer::from_rate(config.tick_hz, config.release_ticks);
    match config.policy {
        InputPolicyKind::Edge => InputPolicy::EdgeTriggered,
        InputPolicyKind::Timeout => InputPolicy::TimeoutRelease(timer),
        InputPolicyKind::Auto if keyboard_enhanced => InputPolicy::EdgeTriggered,
        InputPolicyKind::Auto => InputPolicy::TimeoutRelease(timer),
    }
}
