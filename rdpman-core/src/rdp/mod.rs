//! Native remote-desktop client integration
//!
//! [`RdpSettings`] holds the resolved session settings and renders them as an
//! `.rdp` profile. [`RdpLauncher`] registers the credential with the OS
//! credential manager and starts the native client.

mod launcher;

pub use launcher::{
    CommandRunner, LaunchOutcome, LaunchPlan, PlannedCommand, RdpLauncher, SystemRunner,
};

use std::fmt::Write as _;

use crate::config::RdpDefaults;

/// Window mode of the session (`screen mode id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    /// Windowed session
    #[default]
    Windowed,
    /// Full-screen session
    FullScreen,
}

impl ScreenMode {
    /// Numeric value used in `.rdp` files
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Windowed => 1,
            Self::FullScreen => 2,
        }
    }
}

/// Resolved settings for one remote-desktop session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdpSettings {
    /// Host to connect to, optionally with `:port`
    pub full_address: String,
    /// Login name
    pub username: String,
    /// Window mode
    pub screen_mode: ScreenMode,
    /// Desktop width in pixels
    pub desktop_width: u32,
    /// Desktop height in pixels
    pub desktop_height: u32,
    /// Color depth
    pub session_bpp: u8,
    /// Server authentication level (0 connect anyway, 1 refuse, 2 warn)
    pub authentication_level: u8,
    /// Ask for credentials on the client side
    pub prompt_for_credentials: bool,
    /// Share the clipboard
    pub redirect_clipboard: bool,
    /// Share local printers
    pub redirect_printers: bool,
    /// Drives to redirect (`*` for all, empty for none)
    pub drives_to_redirect: String,
}

impl RdpSettings {
    /// Creates settings for a host and user with built-in defaults
    #[must_use]
    pub fn new(full_address: impl Into<String>, username: impl Into<String>) -> Self {
        Self::from_defaults(full_address, username, &RdpDefaults::default())
    }

    /// Creates settings for a host and user from configured defaults
    #[must_use]
    pub fn from_defaults(
        full_address: impl Into<String>,
        username: impl Into<String>,
        defaults: &RdpDefaults,
    ) -> Self {
        Self {
            full_address: full_address.into(),
            username: username.into(),
            screen_mode: if defaults.fullscreen {
                ScreenMode::FullScreen
            } else {
                ScreenMode::Windowed
            },
            desktop_width: defaults.width,
            desktop_height: defaults.height,
            session_bpp: defaults.bpp,
            authentication_level: defaults.authentication_level,
            prompt_for_credentials: defaults.prompt_for_credentials,
            redirect_clipboard: defaults.redirect_clipboard,
            redirect_printers: defaults.redirect_printers,
            drives_to_redirect: defaults.drives.clone(),
        }
    }

    /// Sets the window mode
    #[must_use]
    pub const fn with_screen_mode(mut self, mode: ScreenMode) -> Self {
        self.screen_mode = mode;
        self
    }

    /// Sets the desktop resolution
    #[must_use]
    pub const fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.desktop_width = width;
        self.desktop_height = height;
        self
    }

    /// Host part of `full_address`, without a port
    #[must_use]
    pub fn host(&self) -> &str {
        // Bracketed IPv6 literals keep their colons
        if let Some(rest) = self.full_address.strip_prefix('[') {
            return rest.split(']').next().unwrap_or(rest);
        }
        match self.full_address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => host,
            _ => &self.full_address,
        }
    }

    /// Renders the `.rdp` profile, one `key:type:value` record per line
    #[must_use]
    pub fn to_rdp_file(&self) -> String {
        let mut out = String::new();
        let mut line = |key: &str, kind: char, value: &dyn std::fmt::Display| {
            let _ = write!(out, "{key}:{kind}:{value}\r\n");
        };

        line("full address", 's', &self.full_address);
        line("username", 's', &self.username);
        line("screen mode id", 'i', &self.screen_mode.id());
        line("desktopwidth", 'i', &self.desktop_width);
        line("desktopheight", 'i', &self.desktop_height);
        line("session bpp", 'i', &self.session_bpp);
        line("authentication level", 'i', &self.authentication_level);
        line("prompt for credentials", 'i', &u8::from(self.prompt_for_credentials));
        line("redirectclipboard", 'i', &u8::from(self.redirect_clipboard));
        line("redirectprinters", 'i', &u8::from(self.redirect_printers));
        line("drivestoredirect", 's', &self.drives_to_redirect);

        out
    }
}
