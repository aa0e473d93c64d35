//! OS process inspection and termination.

pub mod command;
pub mod elevation;
pub mod platform;
pub mod terminator;
pub mod tree;

pub use command::{CommandOutput, CommandRunner, ShellRunner};
pub use elevation::{TenantElevation, DEFAULT_TENANT};
pub use platform::Platform;
pub use terminator::{KillOutcome, ProcessTerminator};
pub use tree::ProcessTreeResolver;

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted process table standing in for the OS.

    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{CommandOutput, CommandRunner};
    use crate::error::ProcessError;

    #[derive(Default)]
    pub struct FakeRunner {
        trees: Mutex<HashMap<i32, String>>,
        live: Mutex<BTreeSet<i32>>,
        ignore_sigint: Mutex<BTreeSet<i32>>,
        ignore_sigkill: Mutex<BTreeSet<i32>>,
        deny_sudo: bool,
        commands: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        /// Register a process tree; every listed pid starts alive.
        pub fn with_tree(self, root: i32, output: &str, pids: &[i32]) -> Self {
            self.trees.lock().unwrap().insert(root, output.to_string());
            self.live.lock().unwrap().extend(pids);
            self
        }

        pub fn ignoring_sigint(self, pids: &[i32]) -> Self {
            self.ignore_sigint.lock().unwrap().extend(pids);
            self
        }

        pub fn ignoring_sigkill(self, pids: &[i32]) -> Self {
            self.ignore_sigkill.lock().unwrap().extend(pids);
            self
        }

        /// Fail every `sudo` command without running it.
        pub fn denying_sudo(mut self) -> Self {
            self.deny_sudo = true;
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.commands()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        fn pids(args: &str) -> Vec<i32> {
            args.split(|c: char| c == ' ' || c == ',')
                .filter_map(|p| p.trim().parse().ok())
                .collect()
        }

        fn signal(&self, args: &str, ignored: &Mutex<BTreeSet<i32>>) -> CommandOutput {
            let ignored = ignored.lock().unwrap();
            let mut live = self.live.lock().unwrap();
            let mut all_found = true;
            for pid in Self::pids(args) {
                all_found &= live.contains(&pid);
                if !ignored.contains(&pid) {
                    live.remove(&pid);
                }
            }
            CommandOutput {
                success: all_found,
                stdout: String::new(),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn execute(&self, command: &str) -> Result<CommandOutput, ProcessError> {
            self.commands.lock().unwrap().push(command.to_string());

            let mut line = command;
            if let Some(rest) = line.strip_prefix("sudo -u ") {
                if self.deny_sudo {
                    return Ok(CommandOutput::failed());
                }
                line = rest.split_once(' ').map(|(_, cmd)| cmd).unwrap_or("");
            }

            if let Some(args) = line.strip_prefix("pstree ") {
                let root = Self::pids(args).last().copied().unwrap_or(0);
                let output = self.trees.lock().unwrap().get(&root).cloned();
                return Ok(match output {
                    Some(out) if self.live.lock().unwrap().contains(&root) => {
                        CommandOutput::ok(out)
                    }
                    _ => CommandOutput::failed(),
                });
            }
            if let Some(args) = line.strip_prefix("ps -p ") {
                let live = self.live.lock().unwrap();
                let listed: Vec<i32> = Self::pids(args)
                    .into_iter()
                    .filter(|p| live.contains(p))
                    .collect();
                if listed.is_empty() {
                    return Ok(CommandOutput::failed());
                }
                let mut out = String::from("  PID TTY          TIME CMD\n");
                for pid in listed {
                    out.push_str(&format!("{pid:>5} ?        00:00:00 sleep\n"));
                }
                return Ok(CommandOutput::ok(out));
            }
            if let Some(args) = line.strip_prefix("kill -s SIGINT ") {
                return Ok(self.signal(args, &self.ignore_sigint));
            }
            if let Some(args) = line.strip_prefix("kill -s SIGKILL ") {
                return Ok(self.signal(args, &self.ignore_sigkill));
            }
            Ok(CommandOutput::failed())
        }
    }
}
