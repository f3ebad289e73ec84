// Prompt and output detection for IOS-style CLIs.
//
// A shell channel gives back a raw byte stream: banner, command echo,
// output, and finally the prompt again. Everything here is pure string
// work on that stream, separated from the channel plumbing so it can be
// tested without a device.

use regex::Regex;

/// Privilege level implied by the shape of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptLevel {
    /// `hostname>` -- user EXEC, most configuration commands unavailable.
    UserExec,
    /// `hostname#` -- privileged EXEC.
    PrivilegedExec,
    /// `hostname(config…)#` -- global or sub configuration mode.
    ConfigMode,
}

/// Compiled matchers for prompt and password lines.
///
/// The prompt pattern follows the scrapli convention: anchor on the last
/// line of the buffer only, so `>` or `#` inside banners and command
/// output never terminate a read early.
#[derive(Debug, Clone)]
pub struct PromptMatcher {
    prompt: Regex,
    password: Regex,
}

impl PromptMatcher {
    pub fn new() -> Self {
        Self {
            prompt: Regex::new(r"^[[:alnum:]][\w.@/:+-]{0,62}(?:\([\w.+-]+\))?[>#]$")
                .expect("prompt pattern is valid"),
            password: Regex::new(r"(?i)password\s*:?$").expect("password pattern is valid"),
        }
    }

    /// Classify the prompt at the tail of `buffer`, if one is present.
    pub fn classify(&self, buffer: &str) -> Option<PromptLevel> {
        let tail = tail_line(buffer);
        if !self.prompt.is_match(tail) {
            return None;
        }
        if tail.ends_with('>') {
            Some(PromptLevel::UserExec)
        } else if tail.contains("(config") {
            Some(PromptLevel::ConfigMode)
        } else {
            Some(PromptLevel::PrivilegedExec)
        }
    }

    /// Whether the tail of `buffer` is a password challenge (`Password:`).
    pub fn is_password_challenge(&self, buffer: &str) -> bool {
        self.password.is_match(tail_line(buffer))
    }

    /// Strip the command echo and the trailing prompt from a raw exchange.
    ///
    /// What remains is the device's actual response, the part worth
    /// scanning for failure markers and recording in reports.
    pub fn clean_output(&self, raw: &str, command: &str) -> String {
        let mut lines: Vec<&str> = raw.lines().map(|l| l.trim_end_matches('\r')).collect();
        if lines.first().is_some_and(|l| l.contains(command.trim())) {
            lines.remove(0);
        }
        while lines
            .last()
            .is_some_and(|l| self.prompt.is_match(l.trim_end()))
        {
            lines.pop();
        }
        lines.join("\n").trim().to_string()
    }
}

impl Default for PromptMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// First failure marker present in `output`, if any.
pub fn first_failure_marker<'a>(output: &str, markers: &'a [String]) -> Option<&'a str> {
    markers
        .iter()
        .find(|marker| output.contains(marker.as_str()))
        .map(String::as_str)
}

/// Last line of the buffer, with line endings and padding removed.
fn tail_line(buffer: &str) -> &str {
    buffer.rsplit('\n').next().unwrap_or_default().trim()
}
