use crate::assertions::expect_simple_string;
use tester_core::{instrumented, StageContext, TesterError};

const CLIENT_COUNT: usize = 3;
const ROUNDS: usize = 2;

/// Keeps several connections open and interleaves PINGs across them.
pub async fn multiple_clients(ctx: StageContext) -> Result<(), TesterError> {
    let mut clients = Vec::with_capacity(CLIENT_COUNT);
    for i in 1..=CLIENT_COUNT {
        let id = format!("client-{}", i);
        clients.push(instrumented::connect_to_executable(&ctx, &id).await?);
    }

    for _ in 0..ROUNDS {
        for client in clients.iter_mut() {
            let reply = client.send_and_read("PING", &[]).await?;
            expect_simple_string(&reply, "PONG")?;
        }
    }

    ctx.logger()
        .success(format_args!("{} clients each received {} PONGs", CLIENT_COUNT, ROUNDS));
    Ok(())
}
