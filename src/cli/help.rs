//! Usage text shown when the command line cannot be used as given

use crate::config::EnvManager;
use colored::*;

/// Flag summary rendered under "[optional flags]"
const FLAGS: &[(&str, &str)] = &[
    ("-4", "use IPv4 only."),
    ("-6", "use IPv6 only."),
    ("-r <n>", "retry resolving target's hostname after <n> number of failed probes. e.g. -r 10 for 10 failed probes."),
    ("-c <n>", "do n probes and quit, regardless of the result. If c is 0 (default), no limit will be applied."),
    ("-j", "output in JSON format."),
    ("--pretty", "use indentation when using json output format. No effect without the -j flag."),
    ("-v", "show version."),
    ("-u", "check for updates."),
    ("--no-color", "disable colored output."),
    ("--debug", "print diagnostic logs to stderr."),
];

/// Renders the usage screen
pub struct HelpSystem {
    executable: String,
}

impl HelpSystem {
    pub fn new() -> Self {
        let executable = std::env::args()
            .next()
            .and_then(|path| {
                std::path::Path::new(&path)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| crate::PKG_NAME.to_string());
        Self::with_executable(executable)
    }

    pub fn with_executable<S: Into<String>>(executable: S) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Full usage screen: version header, invocation example and flags
    pub fn display_usage(&self, use_colors: bool) -> String {
        let mut help = String::new();
        help.push_str(&self.format_header(use_colors));
        help.push_str(&self.format_invocation(use_colors));
        help.push_str(&Self::format_section("[optional flags]", FLAGS, use_colors));
        help.push_str(&Self::format_section(
            "[environment]",
            EnvManager::supported_variables(),
            use_colors,
        ));
        help
    }

    fn format_header(&self, use_colors: bool) -> String {
        let header = format!("TCPING version {}", crate::VERSION);
        if use_colors {
            format!("\n{}\n\n", header.bright_cyan())
        } else {
            format!("\n{}\n\n", header)
        }
    }

    fn format_invocation(&self, use_colors: bool) -> String {
        let lines = [
            format!("Try running {} like:", self.executable),
            format!("{} <hostname/ip> <port number>. For example:", self.executable),
            format!("{} www.example.com 443", self.executable),
        ];

        lines
            .iter()
            .map(|line| {
                if use_colors {
                    format!("{}\n", line.red())
                } else {
                    format!("{}\n", line)
                }
            })
            .collect()
    }

    fn format_section(title: &str, entries: &[(&str, &str)], use_colors: bool) -> String {
        let mut section = if use_colors {
            format!("\n{}\n", title.yellow())
        } else {
            format!("\n{}\n", title)
        };

        for (name, description) in entries {
            let line = format!("  {} : {}", name, description);
            if use_colors {
                section.push_str(&format!("{}\n", line.yellow()));
            } else {
                section.push_str(&line);
                section.push('\n');
            }
        }
        section
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}
