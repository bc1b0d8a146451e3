//! Terminal launcher: prints the authorization URL for the user to open.

use std::io::{self, Write};

use parking_lot::Mutex;
use unilogin_application::{LaunchError, LaunchRequest, Launcher};

pub struct ConsoleLauncher {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleLauncher {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl Launcher for ConsoleLauncher {
    fn launch(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        let mut out = self.out.lock();
        writeln!(
            out,
            "Open this URL to sign in with {}:\n\n  {}\n",
            request.provider.display_name(),
            request.url
        )
        .and_then(|()| out.flush())
        .map_err(|e| LaunchError::Unavailable(e.to_string()))
    }
}
