use std::time::Duration;
use tester_core::{instrumented, StageContext, TesterError};

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Waits until the server accepts a TCP connection.
///
/// The server may still be starting, so refused connections are retried
/// until the stage timeout cancels us.
pub async fn bind_to_port(ctx: StageContext) -> Result<(), TesterError> {
    let addr = ctx.executable().addr().to_string();
    let logger = ctx.logger();
    logger.info(format_args!("Connecting to {}...", addr));

    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match instrumented::connect(&ctx, &addr, "").await {
            Ok(_client) => {
                logger.success("Connection successful");
                return Ok(());
            }
            Err(err @ resp_wire::RespError::Cancelled) => return Err(err.into()),
            Err(err) => {
                logger.debug(format_args!("Connection attempt {} failed: {}", attempts, err));
                ctx.sleep(RETRY_INTERVAL).await?;
            }
        }
    }
}
