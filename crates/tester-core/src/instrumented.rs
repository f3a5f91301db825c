//! RESP clients whose traffic is written to a stage logger
use crate::logger::StageLogger;
use crate::stage::StageContext;
use resp_wire::{RespClient, RespClientCallbacks, RespError};

/// Callbacks that log every command, byte chunk and decoded value.
///
/// Commands are logged at info level as `$ redis-cli ...`; raw bytes and
/// values only show up in debug mode.
pub fn logging_callbacks(logger: &StageLogger, client_id: &str) -> RespClientCallbacks {
    let prefix = if client_id.is_empty() {
        String::new()
    } else {
        format!("{}: ", client_id)
    };

    let (l1, p1) = (logger.clone(), prefix.clone());
    let (l2, p2) = (logger.clone(), prefix.clone());
    let (l3, p3) = (logger.clone(), prefix.clone());
    let (l4, p4) = (logger.clone(), prefix);

    RespClientCallbacks::none()
        .on_send_command(move |command, args| {
            if args.is_empty() {
                l1.info(format_args!("{}$ redis-cli {}", p1, command));
            } else {
                l1.info(format_args!("{}$ redis-cli {} {}", p1, command, args.join(" ")));
            }
        })
        .on_bytes_sent(move |bytes| {
            l2.debug(format_args!("{}Sent bytes: {:?}", p2, String::from_utf8_lossy(bytes)));
        })
        .on_bytes_received(move |bytes| {
            l3.debug(format_args!("{}Received bytes: {:?}", p3, String::from_utf8_lossy(bytes)));
        })
        .on_value_read(move |value| {
            l4.debug(format_args!("{}Received RESP value: {}", p4, value.formatted_string()));
        })
}

/// Connects to `addr` with logging callbacks bound to the stage logger.
///
/// The client follows the stage's cancellation token, so a timed-out stage
/// aborts its pending reads. Connection errors are returned as-is.
pub async fn connect(ctx: &StageContext, addr: &str, client_id: &str) -> Result<RespClient, RespError> {
    let callbacks = logging_callbacks(ctx.logger(), client_id);
    let token = ctx.cancellation_token().clone();

    let client = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(RespError::Cancelled),
        res = RespClient::connect_with_callbacks(addr, callbacks) => res?,
    };
    Ok(client.with_cancellation(token))
}

/// [`connect`] against the executable's own address.
pub async fn connect_to_executable(ctx: &StageContext, client_id: &str) -> Result<RespClient, RespError> {
    let addr = ctx.executable().addr().to_string();
    connect(ctx, &addr, client_id).await
}
