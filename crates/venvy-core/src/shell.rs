use std::path::Path;
use std::time::Duration;

use crate::error::VenvError;
use crate::process::run_with_timeout;

const REVEAL_TIMEOUT: Duration = Duration::from_secs(5);
#[cfg(target_os = "macos")]
const ACTIVATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shows the environment in the platform file manager. Only a failure to
/// start the OS tool is an error; the tool's own exit status is ignored,
/// matching how these integrations behave when driven interactively.
pub fn reveal(path: &Path) -> Result<(), VenvError> {
    #[cfg(target_os = "macos")]
    {
        spawn_tool("open", &["-R", &path.display().to_string()])
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        spawn_tool("xdg-open", &[&path.display().to_string()])
    }
    #[cfg(windows)]
    {
        spawn_tool("explorer", &[&format!("/select,{}", path.display())])
    }
}

/// Opens a terminal window with the environment activated. macOS only; the
/// activate script must exist before anything is spawned.
pub fn activate_in_terminal(env: &Path) -> Result<(), VenvError> {
    let activate = env.join("bin").join("activate");
    if !activate.is_file() {
        return Err(VenvError::ToolInvocationFailed {
            tool: "terminal".to_string(),
            message: format!("activate script not found: {}", activate.display()),
        });
    }
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            "tell application \"Terminal\"\n    do script \"source {}\"\n    activate\nend tell",
            sh_quote(&activate.display().to_string())
        );
        run_with_timeout(Path::new("/usr/bin/osascript"), &["-e", &script], ACTIVATE_TIMEOUT)
            .map_err(|err| VenvError::ToolInvocationFailed {
                tool: "osascript".to_string(),
                message: err.to_string(),
            })?;
        Ok(())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(VenvError::ToolInvocationFailed {
            tool: "terminal".to_string(),
            message: "terminal activation is only supported on macOS".to_string(),
        })
    }
}

fn spawn_tool(tool: &str, args: &[&str]) -> Result<(), VenvError> {
    run_with_timeout(Path::new(tool), args, REVEAL_TIMEOUT).map_err(|err| {
        VenvError::ToolInvocationFailed {
            tool: tool.to_string(),
            message: err.to_string(),
        }
    })?;
    Ok(())
}

/// Single-quote shell quoting, enough for paths embedded in an osascript
/// `do script` line.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn sh_quote(text: &str) -> String {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphanumeric() || b"/._-".contains(&b)) {
        return text.to_string();
    }
    format!("'{}'", text.replace('\'', r"'\''"))
}
