use std::error::Error;

use tracing::{debug, error, info, trace, warn, Level};

/// Sink for faults the loader isolates instead of propagating
pub trait LoadLogger {
    fn warning(&self, level: Level, message: &str, cause: &(dyn Error + 'static));
}

/// Forwards loader diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LoadLogger for TracingLogger {
    fn warning(&self, level: Level, message: &str, cause: &(dyn Error + 'static)) {
        if level == Level::ERROR {
            error!("{}: {}", message, cause);
        } else if level == Level::WARN {
            warn!("{}: {}", message, cause);
        } else if level == Level::INFO {
            info!("{}: {}", message, cause);
        } else if level == Level::DEBUG {
            debug!("{}: {}", message, cause);
        } else {
            trace!("{}: {}", message, cause);
        }
    }
}
