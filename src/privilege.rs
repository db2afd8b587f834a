//! Privilege resolution: decide once whether system-mutating commands need
//! an elevation prefix.

/// Command used to elevate when the process is not already root.
pub const ELEVATION_COMMAND: &str = "sudo";

/// Snapshot of the process's privilege level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    is_root: bool,
    prefix: Vec<String>,
}

impl Privilege {
    /// Inspect the effective user id of the current process.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_is_root(effective_user_is_root())
    }

    /// Build a privilege context from an explicit root flag.
    #[must_use]
    pub fn from_is_root(is_root: bool) -> Self {
        let prefix = if is_root {
            Vec::new()
        } else {
            vec![ELEVATION_COMMAND.to_string()]
        };
        Self { is_root, prefix }
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }

    /// The elevation prefix joined with spaces; empty when running as root.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.prefix.join(" ")
    }

    /// Rewrite `program args…` so that it runs with administrative rights.
    ///
    /// Returns the program to spawn and its full argument list.
    #[must_use]
    pub fn command<'a>(&'a self, program: &'a str, args: &[&'a str]) -> (&'a str, Vec<&'a str>) {
        match self.prefix.split_first() {
            None => (program, args.to_vec()),
            Some((elevate, rest)) => {
                let mut full: Vec<&str> = rest.iter().map(String::as_str).collect();
                full.push(program);
                full.extend_from_slice(args);
                (elevate.as_str(), full)
            }
        }
    }
}

#[cfg(unix)]
fn effective_user_is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
const fn effective_user_is_root() -> bool {
    false
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn root_has_empty_prefix() {
        let p = Privilege::from_is_root(true);
        assert!(p.is_root());
        assert_eq!(p.prefix(), "");
    }

    #[test]
    fn non_root_has_sudo_prefix() {
        let p = Privilege::from_is_root(false);
        assert!(!p.is_root());
        assert_eq!(p.prefix(), "sudo");
    }

    #[test]
    fn root_command_is_unchanged() {
        let p = Privilege::from_is_root(true);
        let (program, args) = p.command("apt-get", &["install", "-y", "tmux"]);
        assert_eq!(program, "apt-get");
        assert_eq!(args, vec!["install", "-y", "tmux"]);
    }

    #[test]
    fn non_root_command_is_wrapped() {
        let p = Privilege::from_is_root(false);
        let (program, args) = p.command("apt-get", &["install", "-y", "tmux"]);
        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["apt-get", "install", "-y", "tmux"]);
    }

    #[test]
    fn detect_agrees_with_prefix() {
        let p = Privilege::detect();
        assert_eq!(p.is_root(), p.prefix().is_empty());
    }
}
