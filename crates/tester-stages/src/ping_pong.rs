use crate::assertions::expect_simple_string;
use tester_core::{instrumented, StageContext, TesterError};

pub async fn ping_pong(ctx: StageContext) -> Result<(), TesterError> {
    let mut client = instrumented::connect_to_executable(&ctx, "").await?;

    for _ in 0..2 {
        let reply = client.send_and_read("PING", &[]).await?;
        expect_simple_string(&reply, "PONG")?;
        ctx.logger().success("Received \"PONG\"");
    }
    Ok(())
}
