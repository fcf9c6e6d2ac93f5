//! Line-oriented parsers for adb text output
//!
//! adb has no structured output mode for these commands, so each parser works
//! on substrings of individual lines. Malformed input is reported as a
//! [`ParseError`] instead of panicking.

use thiserror::Error;

use super::client::DeviceProperties;

/// Text printed by `adb version` on its first line
pub const VERSION_BANNER: &str = "Android Debug Bridge version";

/// Header printed by `adb devices`
pub const DEVICES_HEADER: &str = "List of devices attached";

/// Marker present on lines of devices that are online and authorized
pub const DEVICE_STATUS_MARKER: &str = "\tdevice";

/// Substring printed by `adb push` on success
pub const PUSH_SUCCESS_MARKER: &str = "pushed";

pub const PRODUCT_NAME_KEY: &str = "ro.product.name";
pub const PRODUCT_MODEL_KEY: &str = "ro.product.model";

const PROPERTY_SEPARATOR: &str = ": ";

/// Output from adb that does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected `{command}` output on line {line_no}: {reason} ({line:?})")]
pub struct ParseError {
    pub command: &'static str,
    pub line_no: usize,
    pub line: String,
    pub reason: &'static str,
}

/// Return the banner line of `adb version` output, if present
pub fn parse_version(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find(|line| line.contains(VERSION_BANNER))
        .map(str::trim)
}

/// Extract identifiers of online devices from `adb devices` output.
///
/// The first line is always skipped. Devices in any state other than
/// `device` (offline, unauthorized, ...) are left out.
pub fn parse_devices(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter(|line| *line != DEVICES_HEADER && line.contains(DEVICE_STATUS_MARKER))
        .map(|line| line.split('\t').next().unwrap_or_default().to_string())
        .collect()
}

/// Pick the product name and model out of `adb shell getprop` output.
///
/// Keys are matched as substrings and the value is everything after the first
/// `": "`. A later matching line overrides an earlier one; a key that never
/// matches leaves its field empty.
pub fn parse_properties(device_id: &str, stdout: &str) -> Result<DeviceProperties, ParseError> {
    let mut properties = DeviceProperties {
        device_id: device_id.to_string(),
        ..Default::default()
    };

    for (idx, line) in stdout.lines().enumerate() {
        let field = if line.contains(PRODUCT_NAME_KEY) {
            &mut properties.product_name
        } else if line.contains(PRODUCT_MODEL_KEY) {
            &mut properties.model
        } else {
            continue;
        };

        let (_, value) = line
            .split_once(PROPERTY_SEPARATOR)
            .ok_or_else(|| ParseError {
                command: "getprop",
                line_no: idx + 1,
                line: line.to_string(),
                reason: "property line has no `: ` separator",
            })?;
        *field = value.to_string();
    }

    Ok(properties)
}

/// Return the line of `adb push` output reporting success, if any
pub fn parse_push(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find(|line| line.contains(PUSH_SUCCESS_MARKER))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let out = "Android Debug Bridge version 1.0.41\nVersion 34.0.5-10900879\n";
        assert_eq!(
            parse_version(out),
            Some("Android Debug Bridge version 1.0.41")
        );
        assert_eq!(parse_version("hdc 1.2.0\n"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_parse_devices_skips_header_and_offline() {
        let out = "List of devices attached\nABC123\tdevice\nXYZ999\toffline\n";
        assert_eq!(parse_devices(out), vec!["ABC123".to_string()]);
    }

    #[test]
    fn test_parse_devices_keeps_tool_order() {
        let out = "List of devices attached\n\
                   emulator-5554\tdevice\n\
                   R58M123\tunauthorized\n\
                   192.168.1.20:5555\tdevice\n\n";
        assert_eq!(
            parse_devices(out),
            vec!["emulator-5554".to_string(), "192.168.1.20:5555".to_string()]
        );
    }

    #[test]
    fn test_parse_devices_empty() {
        assert!(parse_devices("").is_empty());
        assert!(parse_devices("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_parse_devices_daemon_banner_before_header() {
        // First run of the server prints its startup lines ahead of the header
        let out = "* daemon started successfully\nList of devices attached\nA1\tdevice\r\n";
        assert_eq!(parse_devices(out), vec!["A1".to_string()]);
    }

    #[test]
    fn test_parse_properties() {
        let out = "[ro.boot.mode]: normal\n[ro.product.name]: myphone\n[ro.product.model]: Pixel7\n";
        let props = parse_properties("ABC123", out).unwrap();
        assert_eq!(props.device_id, "ABC123");
        assert_eq!(props.product_name, "myphone");
        assert_eq!(props.model, "Pixel7");
    }

    #[test]
    fn test_parse_properties_missing_keys_are_empty() {
        let props = parse_properties("A1", "[ro.build.type]: user\n").unwrap();
        assert_eq!(props.product_name, "");
        assert_eq!(props.model, "");
    }

    #[test]
    fn test_parse_properties_last_match_wins() {
        let out = "[ro.product.model]: first\n[ro.product.model_alias]: second\n";
        let props = parse_properties("A1", out).unwrap();
        assert_eq!(props.model, "second");
    }

    #[test]
    fn test_parse_properties_value_after_first_separator() {
        let props = parse_properties("A1", "[ro.product.name]: [a: b]\n").unwrap();
        assert_eq!(props.product_name, "[a: b]");
    }

    #[test]
    fn test_parse_properties_malformed_line() {
        let err = parse_properties("A1", "[ro.boot.mode]: normal\n[ro.product.name]\n").unwrap_err();
        assert_eq!(err.command, "getprop");
        assert_eq!(err.line_no, 2);
        assert_eq!(err.line, "[ro.product.name]");
    }

    #[test]
    fn test_parse_push() {
        let out = "/tmp/server.jar: 1 file pushed, 0 skipped. 52.4 MB/s (66007 bytes in 0.001s)\n";
        assert!(parse_push(out).is_some());
        assert_eq!(parse_push("adb: error: failed to stat local file\n"), None);
    }
}
