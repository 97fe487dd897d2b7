//! User-agent parsing
//!
//! Detection is by case-insensitive substring, checked in a fixed priority
//! order. Versions are read from the raw string.

use std::fmt;
use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
    Safari,
    Opera,
    #[serde(rename = "IE")]
    InternetExplorer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Os {
    Windows,
    #[serde(rename = "MacOS")]
    MacOs,
    Linux,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    #[serde(rename = "iPhone")]
    IPhone,
    #[serde(rename = "iPad")]
    IPad,
    #[serde(rename = "iPod")]
    IPod,
    Android,
    BlackBerry,
    #[serde(rename = "Windows Phone")]
    WindowsPhone,
    Unknown,
}

impl DeviceType {
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        let mobile = ["android", "blackberry", "iphone", "ipad", "ipod", "opera mini", "iemobile"];
        if mobile.iter().any(|marker| ua.contains(marker)) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl Browser {
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        [
            ("chrome", Self::Chrome),
            ("firefox", Self::Firefox),
            ("edge", Self::Edge),
            ("safari", Self::Safari),
            ("opera", Self::Opera),
            ("msie", Self::InternetExplorer),
        ]
        .into_iter()
        .find(|(marker, _)| ua.contains(marker))
        .map_or(Self::Unknown, |(_, browser)| browser)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "Chrome",
            Self::Firefox => "Firefox",
            Self::Edge => "Edge",
            Self::Safari => "Safari",
            Self::Opera => "Opera",
            Self::InternetExplorer => "IE",
            Self::Unknown => UNKNOWN,
        }
    }

    /// Version token that follows the browser name, e.g. `Chrome/120.0.1`
    pub fn version(&self, user_agent: &str) -> Option<String> {
        match self {
            Self::Unknown => None,
            Self::InternetExplorer => version_after(user_agent, "MSIE ", false),
            named => version_after(user_agent, &format!("{}/", named.as_str()), false),
        }
    }
}

impl Os {
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("windows") {
            Self::Windows
        } else if ua.contains("mac") {
            Self::MacOs
        } else if ua.contains("linux") {
            Self::Linux
        } else if ua.contains("android") {
            Self::Android
        } else if ["iphone", "ipad", "ipod"].iter().any(|marker| ua.contains(marker)) {
            Self::Ios
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "MacOS",
            Self::Linux => "Linux",
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Unknown => UNKNOWN,
        }
    }

    /// Version token after the OS name; underscores become dots
    pub fn version(&self, user_agent: &str) -> Option<String> {
        let raw = match self {
            Self::Unknown => None,
            Self::MacOs => version_after(user_agent, "Mac OS X ", true),
            Self::Ios => version_after(user_agent, "OS ", true),
            named => version_after(user_agent, &format!("{} ", named.as_str()), false),
        }?;
        Some(raw.replace('_', "."))
    }
}

impl Device {
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        [
            ("iphone", Self::IPhone),
            ("ipad", Self::IPad),
            ("ipod", Self::IPod),
            ("android", Self::Android),
            ("blackberry", Self::BlackBerry),
            ("windows phone", Self::WindowsPhone),
        ]
        .into_iter()
        .find(|(marker, _)| ua.contains(marker))
        .map_or(Self::Unknown, |(_, device)| device)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IPhone => "iPhone",
            Self::IPad => "iPad",
            Self::IPod => "iPod",
            Self::Android => "Android",
            Self::BlackBerry => "BlackBerry",
            Self::WindowsPhone => "Windows Phone",
            Self::Unknown => UNKNOWN,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(DeviceType, Browser, Os, Device);

/// Everything derivable from a user-agent string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub device_type: DeviceType,
    pub browser: Browser,
    pub browser_version: String,
    pub os: Os,
    pub os_version: String,
    pub device: Device,
}

impl ClientInfo {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let browser = Browser::detect(user_agent);
        let os = Os::detect(user_agent);

        Self {
            device_type: DeviceType::detect(user_agent),
            browser,
            browser_version: browser.version(user_agent).unwrap_or_else(|| UNKNOWN.to_string()),
            os,
            os_version: os.version(user_agent).unwrap_or_else(|| UNKNOWN.to_string()),
            device: Device::detect(user_agent),
        }
    }
}

/// Digits and dots (and underscores if allowed) directly after the first
/// occurrence of `prefix`. Matching is case-sensitive.
fn version_after(haystack: &str, prefix: &str, allow_underscore: bool) -> Option<String> {
    let start = haystack.find(prefix)? + prefix.len();
    let version: String = haystack[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || (allow_underscore && *c == '_'))
        .collect();

    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.6099.109 Safari/537.36";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
        (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const IE_LEGACY: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows 7.1; Trident/4.0)";

    #[test]
    fn chrome_on_windows() {
        let info = ClientInfo::from_user_agent(CHROME_WINDOWS);
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, Browser::Chrome);
        assert_eq!(info.browser_version, "120.0.6099.109");
        assert_eq!(info.os, Os::Windows);
        // "Windows NT 10.0" has no version directly after "Windows ".
        assert_eq!(info.os_version, "Unknown");
        assert_eq!(info.device, Device::Unknown);
    }

    #[test]
    fn safari_on_mac_reads_underscored_version() {
        let info = ClientInfo::from_user_agent(SAFARI_MAC);
        assert_eq!(info.browser, Browser::Safari);
        assert_eq!(info.browser_version, "605.1.15");
        assert_eq!(info.os, Os::MacOs);
        assert_eq!(info.os_version, "10.15.7");
    }

    #[test]
    fn firefox_on_linux() {
        let info = ClientInfo::from_user_agent(FIREFOX_LINUX);
        assert_eq!(info.browser, Browser::Firefox);
        assert_eq!(info.browser_version, "121.0");
        assert_eq!(info.os, Os::Linux);
        assert_eq!(info.os_version, "Unknown");
    }

    #[test]
    fn iphone_is_mobile_and_matches_mac_first() {
        let info = ClientInfo::from_user_agent(IPHONE);
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.device, Device::IPhone);
        assert_eq!(info.os, Os::MacOs);
        assert_eq!(info.os_version, "Unknown");
    }

    #[test]
    fn legacy_internet_explorer() {
        let info = ClientInfo::from_user_agent(IE_LEGACY);
        assert_eq!(info.browser, Browser::InternetExplorer);
        assert_eq!(info.browser_version, "8.0");
        assert_eq!(info.os_version, "7.1");
    }

    #[test]
    fn empty_agent_is_unknown_desktop() {
        let info = ClientInfo::from_user_agent("");
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, Browser::Unknown);
        assert_eq!(info.browser_version, "Unknown");
        assert_eq!(info.os, Os::Unknown);
        assert_eq!(info.device, Device::Unknown);
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_value(ClientInfo::from_user_agent(IE_LEGACY)).unwrap();
        assert_eq!(json["browser"], "IE");
        assert_eq!(json["device_type"], "desktop");
        assert_eq!(Os::Ios.to_string(), "iOS");
    }
}
