//! Property-based tests for `.rdp` profile rendering

use proptest::prelude::*;
use rdpman_core::{RdpSettings, ScreenMode};

use super::arb_hostname;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every profile has the same eleven CRLF-terminated records, with the
    /// address and user first
    #[test]
    fn prop_profile_has_fixed_records(
        host in arb_hostname(),
        port in prop::option::of(1u16..),
        user in "[a-z][a-z0-9._]{0,15}",
        fullscreen in any::<bool>(),
        width in 640u32..7680,
        height in 480u32..4320,
    ) {
        let address = port.map_or_else(|| host.clone(), |p| format!("{host}:{p}"));
        let mode = if fullscreen { ScreenMode::FullScreen } else { ScreenMode::Windowed };
        let settings = RdpSettings::new(address.clone(), user.clone())
            .with_screen_mode(mode)
            .with_resolution(width, height);

        let file = settings.to_rdp_file();
        prop_assert!(file.ends_with("\r\n"));
        let lines: Vec<&str> = file.split_terminator("\r\n").collect();
        prop_assert_eq!(lines.len(), 11);
        prop_assert_eq!(lines[0], format!("full address:s:{address}"));
        prop_assert_eq!(lines[1], format!("username:s:{user}"));
        prop_assert_eq!(lines[2], format!("screen mode id:i:{}", mode.id()));
        for line in &lines {
            prop_assert!(line.split(':').count() >= 3, "malformed record {}", line);
        }
        prop_assert_eq!(settings.host(), host.as_str());
    }
}
